use async_trait::async_trait;

/// Fire-and-forget alert sink. Implementations log failures; nothing
/// propagates back into the pipeline.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_alert(&self, text: &str);
}
