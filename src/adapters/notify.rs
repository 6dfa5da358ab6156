//! Notification sinks.

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::Notifier;

/// Notifier that emits alerts as structured log events. The default sink;
/// deployments wanting chat alerts implement the port against their channel.
#[derive(Debug, Default, Clone)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn send_alert(&self, text: &str) {
        info!(alert = text, "alert");
    }
}

/// Notifier that drops everything. Useful in tests.
#[derive(Debug, Default, Clone)]
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn send_alert(&self, _text: &str) {}
}
