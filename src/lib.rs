//! Precedent - SPAC Data-Quality Engine
//!
//! Precedent keeps a database of SPAC records synchronized with ground truth
//! extracted from regulatory filings. Its core is a filing-precedence and
//! conflict-resolution engine: given filings of different types and dates that
//! disagree about the same fact, it decides which value is authoritative,
//! investigates structural anomalies down to a confirmed root cause, and feeds
//! every outcome back into a persistent learning store that biases future
//! extraction strategy.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Pure business logic, domain models, and ports
//! - **Service Layer** (`services`): Precedence decisions, numeric
//!   normalization, the learning store, and the investigation pipeline
//! - **Adapter Layer** (`adapters`): SQLite persistence, the EDGAR filing
//!   registry client, text-completion backends, and notification sinks
//! - **Infrastructure Layer** (`infrastructure`): Configuration and logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use precedent::services::FilingPrecedenceManager;
//!
//! let manager = FilingPrecedenceManager::default();
//! let decision = manager.decide("trust_value", &current, &proposed);
//! if decision.should_update {
//!     manager.apply(&mut record, field, &decision, &proposed);
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    Anomaly, AnomalyKind, Config, DatabaseConfig, Diagnosis, Evidence, FieldCategory, FieldSlot,
    FieldValue, FixResult, Hypothesis, IssueType, LearningCase, LessonBundle, LoggingConfig,
    PreventionMeasure, ProposedUpdate, RootCause, SearchStrategy, SpacRecord, SpacStatus,
    TrackedField, UpdateDecision, VerificationStep,
};
pub use domain::ports::{
    FilingRegistry, LearningRepository, Notifier, RecordStore, ReportRepository, TextCompletion,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{FilingPrecedenceManager, InvestigationAgent, LearningStore};
