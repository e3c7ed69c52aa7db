//! Integration ports.
//!
//! Every external collaborator sits behind an object-safe async trait so
//! that services can run against the real adapter or an in-memory fake.
//! The HTTP adapters live in the `triage-api-client` crate; the fakes live
//! here next to their traits.

pub mod backend;
pub mod chat;
pub mod hie;
pub mod mail;
pub mod scheduling;

pub use backend::{InMemoryBackend, PatientBackend};
pub use chat::{ChatAssistant, ChatResponse, KeywordChatAssistant};
pub use hie::{DirectoryHieGateway, HieGateway, HieSource, SourceKind};
pub use mail::{DeliveryReceipt, DocumentMailer, OutboxMailer};
pub use scheduling::{Booking, BusinessHoursScheduler, SchedulingProvider, TimeSlot};
