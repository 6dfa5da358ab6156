//! Domain models for the Precedent engine.

pub mod anomaly;
pub mod config;
pub mod diagnosis;
pub mod evidence;
pub mod filing;
pub mod hypothesis;
pub mod investigation;
pub mod learning;
pub mod record;

pub use anomaly::{Anomaly, AnomalyKind, AnomalySeverity, InvestigationContext, ReportedIssue, ResearchFinding};
pub use config::{
    BackendConfig, Config, DatabaseConfig, InvestigationConfig, LoggingConfig, PrecedenceConfig,
    RegistryConfig, RetryConfig,
};
pub use diagnosis::{Diagnosis, FixResult, PreventionMeasure};
pub use evidence::Evidence;
pub use filing::{CompanyProfile, FieldCategory, FilingRef, PrecedenceRules, UpdateDecision, BLANK_CHECK_SIC};
pub use hypothesis::{Hypothesis, RootCause, VerificationStep};
pub use investigation::{
    DeadlineResolution, DeadlineScan, InvestigationReport, ReportStatus, ScanWindow,
};
pub use learning::{CaseStatus, IssueType, LearningCase, LessonBundle, SearchStrategy};
pub use record::{FieldSlot, FieldValue, ProposedUpdate, SpacRecord, SpacStatus, TrackedField};
