use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{info, warn};

/// Header carrying the interactive session id. Header lookups are
/// case-insensitive, the client sends `sessionId`.
pub const SESSION_HEADER: &str = "sessionid";

pub const SESSION_TIMEOUT: Duration = Duration::from_secs(25 * 60);

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub document_index: String,
    pub document_name: String,
    pub document_type: String,
    pub document_size: String,
    pub created_date_time: String,
    pub modified_date_time: String,
    pub version_no: String,
    pub owner: String,
    pub comment: String,
}

/// A work item case: its attachment folder and its notesheet.
#[derive(Clone, Debug)]
pub struct WorkItem {
    pub folder_id: String,
    pub documents: Vec<Document>,
    pub original_doc_index: String,
    pub notedocument_index: String,
    pub note_revisions: u32,
}

#[derive(Clone, Debug)]
struct CachedSession {
    session_id: i64,
    created_at: Instant,
}

impl CachedSession {
    fn is_valid(&self, timeout: Duration) -> bool {
        self.created_at.elapsed() < timeout
    }

    fn remaining_minutes(&self, timeout: Duration) -> u64 {
        timeout
            .saturating_sub(self.created_at.elapsed())
            .as_secs()
            .div_ceil(60)
    }
}

/// In-memory stand-in for the workflow backend.
#[derive(Debug)]
pub struct Backend {
    users: HashMap<String, String>,
    sessions: HashMap<String, CachedSession>,
    next_session_id: i64,
    session_timeout: Duration,
    work_items: HashMap<(String, String), WorkItem>,
}

impl Default for Backend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend {
    pub fn new() -> Self {
        Self {
            users: HashMap::new(),
            sessions: HashMap::new(),
            next_session_id: 7001,
            session_timeout: SESSION_TIMEOUT,
            work_items: HashMap::new(),
        }
    }

    /// Two users and two cases, enough to exercise every endpoint by hand.
    pub fn seeded() -> Self {
        Self::new()
            .with_user("supervisor", "secret")
            .with_user("auditor", "secret")
            .with_work_item(
                "1",
                "e-Notes-000000000008-process",
                WorkItem {
                    folder_id: "1234".to_string(),
                    documents: vec![
                        document("1670", "Invoice.pdf", "pdf", "245678", "keerthi", "Supporting invoice"),
                        document("1671", "Contract.docx", "docx", "156789", "admin", ""),
                    ],
                    original_doc_index: "1646".to_string(),
                    notedocument_index: "1650".to_string(),
                    note_revisions: 0,
                },
            )
            .with_work_item(
                "1",
                "e-Notes-000000000045-process",
                WorkItem {
                    folder_id: "1301".to_string(),
                    documents: vec![document("1702", "Scan.tiff", "tiff", "", "supervisor", "")],
                    original_doc_index: "1690".to_string(),
                    notedocument_index: "1695".to_string(),
                    note_revisions: 0,
                },
            )
    }

    pub fn with_user(mut self, user_name: &str, password: &str) -> Self {
        self.users.insert(user_name.to_string(), password.to_string());
        self
    }

    pub fn with_work_item(mut self, workitem_id: &str, process_instance_id: &str, item: WorkItem) -> Self {
        self.work_items
            .insert((workitem_id.to_string(), process_instance_id.to_string()), item);
        self
    }

    pub fn with_session_timeout(mut self, timeout: Duration) -> Self {
        self.session_timeout = timeout;
        self
    }

    /// Reuse a still-valid cached session for the user, or open a new one.
    fn open_session(&mut self, user_name: &str) -> CachedSession {
        if let Some(cached) = self.sessions.get(user_name) {
            if cached.is_valid(self.session_timeout) {
                return cached.clone();
            }
        }
        let session = CachedSession {
            session_id: self.next_session_id,
            created_at: Instant::now(),
        };
        self.next_session_id += 1;
        self.sessions.insert(user_name.to_string(), session.clone());
        session
    }

    fn is_live_session(&self, session_id: i64) -> bool {
        self.sessions
            .values()
            .any(|s| s.session_id == session_id && s.is_valid(self.session_timeout))
    }
}

pub fn document(index: &str, name: &str, kind: &str, size: &str, owner: &str, comment: &str) -> Document {
    Document {
        document_index: index.to_string(),
        document_name: name.to_string(),
        document_type: kind.to_string(),
        document_size: size.to_string(),
        created_date_time: "2025-01-15 10:30:00".to_string(),
        modified_date_time: "2025-01-15 10:30:00".to_string(),
        version_no: "1.0".to_string(),
        owner: owner.to_string(),
        comment: comment.to_string(),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_name: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseParams {
    #[serde(default)]
    pub workitem_id: String,
    #[serde(default)]
    pub process_instance_id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub success: bool,
    pub session_id: i64,
    pub user_name: String,
    pub remaining_minutes: u64,
    pub cached: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentsResponse {
    pub success: bool,
    pub workitem_id: String,
    pub process_instance_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    pub count: usize,
    pub documents: Vec<Document>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfNoteResponse {
    pub success: bool,
    pub original_doc_index: String,
    pub notedocument_index: String,
    pub new_version: String,
    pub pdf_path: String,
    pub comments_path: String,
    pub annotations_preserved: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

type Failure = (StatusCode, Json<ErrorResponse>);

fn failure(status: StatusCode, message: impl Into<String>) -> Failure {
    (
        status,
        Json(ErrorResponse {
            success: false,
            error: message.into(),
        }),
    )
}

pub type Db = Arc<RwLock<Backend>>;

pub fn app() -> Router {
    app_with(Backend::seeded())
}

pub fn app_with(backend: Backend) -> Router {
    let db: Db = Arc::new(RwLock::new(backend));
    Router::new()
        .route("/session", post(create_session))
        .route("/supportingdocs/list", get(list_supporting_documents))
        .route("/notesheet/createpdfnote", post(create_pdf_note))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, backend: Backend) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(backend)).await
}

async fn create_session(
    State(db): State<Db>,
    Json(input): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, Failure> {
    let (Some(user_name), Some(password)) = (input.user_name, input.password) else {
        return Err(failure(StatusCode::BAD_REQUEST, "Missing userName or password"));
    };

    let mut backend = db.write().await;
    if backend.users.get(&user_name) != Some(&password) {
        warn!(%user_name, "authentication failed");
        return Err(failure(StatusCode::UNAUTHORIZED, "Authentication failed"));
    }

    let session = backend.open_session(&user_name);
    info!(%user_name, session_id = session.session_id, "session issued");
    Ok(Json(SessionResponse {
        success: true,
        session_id: session.session_id,
        user_name,
        remaining_minutes: session.remaining_minutes(backend.session_timeout),
        cached: true,
    }))
}

async fn list_supporting_documents(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(params): Query<CaseParams>,
) -> Result<Json<DocumentsResponse>, Failure> {
    let session_id = headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<i64>().ok())
        .ok_or_else(|| failure(StatusCode::BAD_REQUEST, "Missing or invalid header: sessionId"))?;
    require_params(&params)?;

    let backend = db.read().await;
    if !backend.is_live_session(session_id) {
        return Err(failure(StatusCode::OK, "Invalid session"));
    }

    let key = (params.workitem_id.clone(), params.process_instance_id.clone());
    let response = match backend.work_items.get(&key) {
        Some(item) => DocumentsResponse {
            success: true,
            workitem_id: params.workitem_id,
            process_instance_id: params.process_instance_id,
            folder_id: Some(item.folder_id.clone()),
            count: item.documents.len(),
            documents: item.documents.clone(),
            message: None,
        },
        None => DocumentsResponse {
            success: true,
            workitem_id: params.workitem_id,
            process_instance_id: params.process_instance_id,
            folder_id: None,
            count: 0,
            documents: Vec::new(),
            message: Some("No AttachmentFolderId found in work item attributes".to_string()),
        },
    };
    Ok(Json(response))
}

async fn create_pdf_note(
    State(db): State<Db>,
    Query(params): Query<CaseParams>,
) -> Result<Json<PdfNoteResponse>, Failure> {
    if params.workitem_id.is_empty() || params.process_instance_id.is_empty() {
        return Err(failure(
            StatusCode::BAD_REQUEST,
            "Missing required parameters: workitemId, processInstanceId",
        ));
    }

    let mut backend = db.write().await;
    let key = (params.workitem_id.clone(), params.process_instance_id.clone());
    let Some(item) = backend.work_items.get_mut(&key) else {
        return Err(failure(
            StatusCode::OK,
            format!("Notesheet not found for work item {}", params.process_instance_id),
        ));
    };

    item.note_revisions += 1;
    let version = format!("1.{}", item.note_revisions);
    let base = format!("/var/notesheet/{}", params.process_instance_id);
    info!(process_instance_id = %params.process_instance_id, %version, "pdf note created");
    Ok(Json(PdfNoteResponse {
        success: true,
        original_doc_index: item.original_doc_index.clone(),
        notedocument_index: item.notedocument_index.clone(),
        pdf_path: format!("{base}/notesheet_v{version}.pdf"),
        comments_path: format!("{base}/comments_v{version}.json"),
        new_version: version,
        annotations_preserved: true,
    }))
}

fn require_params(params: &CaseParams) -> Result<(), Failure> {
    if params.workitem_id.trim().is_empty() {
        return Err(failure(StatusCode::BAD_REQUEST, "Missing required parameter: workitemId"));
    }
    if params.process_instance_id.trim().is_empty() {
        return Err(failure(
            StatusCode::BAD_REQUEST,
            "Missing required parameter: processInstanceId",
        ));
    }
    Ok(())
}
