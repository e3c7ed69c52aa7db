//! # API Client
//!
//! `reqwest` adapters for the external triage backend.
//!
//! Implements the `triage-core` ports that talk HTTP:
//! - [`HttpPatientBackend`]: `GET /api/patients` and per-patient status updates
//! - [`HttpChatAssistant`]: `POST /api/chat-completion`
//!
//! Failed responses are turned into `TriageError::Http` using the optional
//! `message` field of the JSON body; a missing or unparseable body is fine.

#![warn(rust_2018_idioms)]

pub mod backend;
pub mod chat;
mod http;

pub use backend::HttpPatientBackend;
pub use chat::HttpChatAssistant;
