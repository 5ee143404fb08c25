//! Session-holding client for the notesheet backend.
//!
//! # Design
//! `SessionApiClient` owns the only mutable state in the system: the held
//! `Session` and the last raw response. Every operation takes `&mut self`, so
//! overlapping calls on one client cannot happen and the session is always
//! replaced wholesale by the call that last completed. Request construction and
//! response parsing are delegated to the stateless `ServiceClient`; the round
//! trip itself goes through a `Transport`.

use tracing::{debug, info, warn};

use crate::client::ServiceClient;
use crate::error::{ApiError, ApiOutcome};
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{HttpClientConfig, HttpTransport, Transport};
use crate::types::{Credentials, DocumentList, PdfNoteResult, Session};

pub struct SessionApiClient<T = HttpTransport> {
    service: ServiceClient,
    transport: T,
    session: Option<Session>,
    last_response: Option<HttpResponse>,
}

impl SessionApiClient<HttpTransport> {
    /// Client over a fresh reqwest transport.
    pub fn connect(base_url: &str, config: &HttpClientConfig) -> Result<Self, ApiError> {
        Ok(Self::new(base_url, HttpTransport::new(config)?))
    }
}

impl<T: Transport> SessionApiClient<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        Self {
            service: ServiceClient::new(base_url),
            transport,
            session: None,
            last_response: None,
        }
    }

    pub fn base_url(&self) -> &str {
        self.service.base_url()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    /// The most recent response received, whatever its outcome.
    pub fn last_response(&self) -> Option<&HttpResponse> {
        self.last_response.as_ref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Exchange credentials for a session.
    ///
    /// On success the new session replaces any held one. On any failure the
    /// held session is cleared.
    pub async fn login(&mut self, username: &str, password: &str) -> ApiOutcome<Session> {
        let credentials = Credentials::new(username, password);
        let outcome = self.request_session(&credentials).await;
        match &outcome {
            Ok(session) => {
                info!(
                    user = %session.user_name,
                    remaining_minutes = session.remaining_minutes,
                    cached = session.cached,
                    "session established"
                );
                self.session = Some(session.clone());
            }
            Err(err) => {
                warn!(user = %credentials.username, error = %err, "login failed");
                self.session = None;
            }
        }
        outcome
    }

    /// Forget the held session and the last response. Purely local.
    pub fn logout(&mut self) {
        if let Some(session) = self.session.take() {
            info!(user = %session.user_name, "session dropped");
        }
        self.last_response = None;
    }

    /// List the supporting documents of a work item using the held session.
    pub async fn list_supporting_documents(
        &mut self,
        workitem_id: &str,
        process_instance_id: &str,
    ) -> ApiOutcome<DocumentList> {
        let session_id = self
            .session
            .as_ref()
            .map(|session| session.session_id.clone())
            .unwrap_or_default();
        self.list_supporting_documents_as(&session_id, workitem_id, process_instance_id)
            .await
    }

    /// Same as `list_supporting_documents` but with an explicit session id.
    /// The held session is neither consulted nor modified.
    pub async fn list_supporting_documents_as(
        &mut self,
        session_id: &str,
        workitem_id: &str,
        process_instance_id: &str,
    ) -> ApiOutcome<DocumentList> {
        if session_id.is_empty() {
            warn!("supporting documents requested without a session");
            return Err(ApiError::NoSession);
        }
        let request = self.service.build_list_supporting_documents(
            session_id,
            workitem_id,
            process_instance_id,
        )?;
        let outcome = match self.round_trip(request).await {
            Ok(response) => self.service.parse_list_supporting_documents(response),
            Err(err) => Err(err),
        };
        log_outcome("supporting documents", &outcome, |list| {
            debug!(count = list.count, returned = list.documents.len(), "documents listed");
        });
        outcome
    }

    /// Create a PDF note for a work item. Never sends the session id.
    pub async fn create_pdf_note(
        &mut self,
        workitem_id: &str,
        process_instance_id: &str,
    ) -> ApiOutcome<PdfNoteResult> {
        let request = self
            .service
            .build_create_pdf_note(workitem_id, process_instance_id)?;
        let outcome = match self.round_trip(request).await {
            Ok(response) => self.service.parse_create_pdf_note(response),
            Err(err) => Err(err),
        };
        log_outcome("pdf note", &outcome, |note| {
            info!(
                note_index = %note.notedocument_index,
                version = %note.new_version,
                "pdf note created"
            );
        });
        outcome
    }

    async fn request_session(&mut self, credentials: &Credentials) -> ApiOutcome<Session> {
        let request = self.service.build_login(credentials)?;
        let response = self.round_trip(request).await?;
        self.service.parse_login(response)
    }

    async fn round_trip(&mut self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.last_response = None;
        debug!(method = request.method.as_str(), path = %request.path, "sending request");
        let response = self.transport.execute(request).await?;
        debug!(status = response.status, "response received");
        self.last_response = Some(response.clone());
        Ok(response)
    }
}

fn log_outcome<P>(operation: &str, outcome: &ApiOutcome<P>, on_success: impl FnOnce(&P)) {
    match outcome {
        Ok(payload) => on_success(payload),
        Err(err) => warn!(operation, error = %err, "request failed"),
    }
}
