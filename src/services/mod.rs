//! Service layer: precedence decisions, numeric normalization, the learning
//! store, and the investigation pipeline.

pub mod investigation;
pub mod learning;
pub mod numeric;
pub mod precedence;

pub use investigation::InvestigationAgent;
pub use learning::LearningStore;
pub use precedence::FilingPrecedenceManager;
