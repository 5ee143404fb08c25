//! Stateless HTTP request builder and response parser for the notesheet API.
//!
//! # Design
//! `ServiceClient` holds only a `base_url`. Each endpoint is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method that
//! consumes an `HttpResponse`; `SessionApiClient` runs the round trip in
//! between and owns the session state.
//!
//! The backend wraps every answer in a `{ "success": bool, "error"?: string }`
//! envelope and uses it on 4xx/5xx responses too, so parsing keys off the
//! `success` field rather than the status code.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CaseQuery, Credentials, DocumentList, PdfNoteResult, Session};

/// Request header that carries the interactive session identifier.
pub const SESSION_HEADER: &str = "sessionId";

const LOGIN_FALLBACK: &str = "Login failed";
const API_FALLBACK: &str = "API call failed";

/// Synchronous, stateless request builder for the notesheet API.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    base_url: String,
}

impl ServiceClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_login(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(credentials)
            .map_err(|e| ApiError::Transport(format!("could not encode credentials: {e}")))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/session", self.base_url),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    /// The session identifier travels as a header, never in the query or body.
    pub fn build_list_supporting_documents(
        &self,
        session_id: &str,
        workitem_id: &str,
        process_instance_id: &str,
    ) -> Result<HttpRequest, ApiError> {
        let query = case_query(workitem_id, process_instance_id)?;
        Ok(HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/supportingdocs/list?{query}", self.base_url),
            headers: vec![(SESSION_HEADER.to_string(), session_id.to_string())],
            body: None,
        })
    }

    /// Runs under the backend's service account, so no session header is sent.
    pub fn build_create_pdf_note(
        &self,
        workitem_id: &str,
        process_instance_id: &str,
    ) -> Result<HttpRequest, ApiError> {
        let query = case_query(workitem_id, process_instance_id)?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/notesheet/createpdfnote?{query}", self.base_url),
            headers: Vec::new(),
            body: None,
        })
    }

    pub fn parse_login(&self, response: HttpResponse) -> Result<Session, ApiError> {
        parse_envelope(&response, LOGIN_FALLBACK)
    }

    pub fn parse_list_supporting_documents(
        &self,
        response: HttpResponse,
    ) -> Result<DocumentList, ApiError> {
        parse_envelope(&response, API_FALLBACK)
    }

    pub fn parse_create_pdf_note(&self, response: HttpResponse) -> Result<PdfNoteResult, ApiError> {
        parse_envelope(&response, API_FALLBACK)
    }
}

fn case_query(workitem_id: &str, process_instance_id: &str) -> Result<String, ApiError> {
    serde_urlencoded::to_string(CaseQuery {
        workitem_id,
        process_instance_id,
    })
    .map_err(|e| ApiError::Transport(format!("could not encode query: {e}")))
}

/// Decode the body, then decide on the envelope's `success` flag.
///
/// A body that is not JSON counts as a transport failure. JSON that is not an
/// envelope object is treated as an unsuccessful answer without a message.
fn parse_envelope<T: DeserializeOwned>(response: &HttpResponse, fallback: &str) -> Result<T, ApiError> {
    let value: Value = serde_json::from_str(&response.body).map_err(|e| {
        ApiError::Transport(format!(
            "invalid response body (HTTP {}): {e}",
            response.status
        ))
    })?;

    let success = value.get("success").and_then(Value::as_bool).unwrap_or(false);
    if !success {
        let message = value
            .get("error")
            .and_then(Value::as_str)
            .filter(|msg| !msg.is_empty())
            .unwrap_or(fallback);
        return Err(ApiError::Application(message.to_string()));
    }

    serde_json::from_value(value)
        .map_err(|e| ApiError::Transport(format!("unexpected response shape: {e}")))
}
