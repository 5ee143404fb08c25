//! Session-scoped API client for the notesheet backend.
//!
//! # Overview
//! Exchanges credentials for a server session, attaches that session to
//! supporting-document lookups, and creates PDF notes. Every operation
//! resolves to an `ApiOutcome`, so callers (the CLI shell, scripts, tests)
//! display failures the same way regardless of which call produced them.
//!
//! # Design
//! - `ServiceClient` is stateless: `build_*` produces an `HttpRequest`,
//!   `parse_*` consumes an `HttpResponse`. No I/O.
//! - `SessionApiClient` holds the one piece of mutable state (the session)
//!   and runs round trips through a `Transport`.
//! - `HttpTransport` is the reqwest implementation; tests swap in scripted
//!   transports or point it at the mock server.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod session;
pub mod transport;
pub mod types;

pub use client::{ServiceClient, SESSION_HEADER};
pub use error::{ApiError, ApiOutcome};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use session::SessionApiClient;
pub use transport::{HttpClientConfig, HttpTransport, Transport};
pub use types::{Credentials, DocumentList, PdfNoteResult, Session, SupportingDocument};
