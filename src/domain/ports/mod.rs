//! Ports: trait seams between the core and its collaborators.

pub mod filing_registry;
pub mod learning_repository;
pub mod notifier;
pub mod record_store;
pub mod report_repository;
pub mod text_completion;

pub use filing_registry::FilingRegistry;
pub use learning_repository::LearningRepository;
pub use notifier::Notifier;
pub use record_store::RecordStore;
pub use report_repository::ReportRepository;
pub use text_completion::TextCompletion;
