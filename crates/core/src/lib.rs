//! # Triage Core
//!
//! Core logic for the surgical patient-triage dashboard.
//!
//! This crate contains the pure domain rules and the in-memory dashboard state:
//! - Patient wire model and lenient decoding
//! - Filter predicate, triage classifier and per-bucket ordering
//! - Summary statistics and the dashboard aggregator
//! - Periodic refresh with an injectable period
//! - Ports for the backend, chat assistant, mail, HIE and scheduling, with in-memory fakes
//!
//! **No API concerns**: HTTP clients and servers belong in `triage-api-client` and `triage-api-rest`.

pub mod config;
pub mod constants;
pub mod dashboard;
pub mod documents;
pub mod error;
pub mod filter;
pub mod patient;
pub mod ports;
pub mod refresh;
pub mod review;
pub mod stats;
pub mod triage;

pub use config::TriageConfig;
pub use dashboard::{build_view, DashboardView, PatientDetail, TriageDashboard};
pub use documents::EmailDraft;
pub use error::{TriageError, TriageResult};
pub use filter::{FilterCriteria, ReviewStatusFilter, Selection};
pub use patient::{Patient, ReviewStatus};
pub use refresh::{spawn_refresh, ScheduledTask};
pub use stats::SummaryStats;
pub use triage::{classify, Bucket, TriageBuckets};

// Re-export the validated primitives so callers need only one dependency.
pub use triage_types::{PatientId, Timestamp};
