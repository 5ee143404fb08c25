use std::time::Duration;

use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{
    app, app_with, document, Backend, DocumentsResponse, ErrorResponse, PdfNoteResponse,
    SessionResponse, WorkItem,
};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn login_request(body: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri("/session")
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn list_request(uri: &str, session_id: Option<&str>) -> Request<String> {
    let mut builder = Request::builder().uri(uri);
    if let Some(id) = session_id {
        builder = builder.header("sessionId", id);
    }
    builder.body(String::new()).unwrap()
}

fn pdf_note_request(uri: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(String::new())
        .unwrap()
}

const CASE_8: &str = "workitemId=1&processInstanceId=e-Notes-000000000008-process";

// --- session ---

#[tokio::test]
async fn login_returns_numeric_session() {
    let resp = app()
        .oneshot(login_request(r#"{"userName":"supervisor","password":"secret"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let session: SessionResponse = body_json(resp).await;
    assert!(session.success);
    assert_eq!(session.user_name, "supervisor");
    assert_eq!(session.remaining_minutes, 25);
    assert!(session.cached);
}

#[tokio::test]
async fn login_wrong_password_returns_401_envelope() {
    let resp = app()
        .oneshot(login_request(r#"{"userName":"supervisor","password":"nope"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let err: ErrorResponse = body_json(resp).await;
    assert!(!err.success);
    assert_eq!(err.error, "Authentication failed");
}

#[tokio::test]
async fn login_missing_password_returns_400() {
    let resp = app()
        .oneshot(login_request(r#"{"userName":"supervisor"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let err: ErrorResponse = body_json(resp).await;
    assert_eq!(err.error, "Missing userName or password");
}

// --- supporting documents ---

#[tokio::test]
async fn list_without_session_header_returns_400() {
    let resp = app()
        .oneshot(list_request(&format!("/supportingdocs/list?{CASE_8}"), None))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_with_unknown_session_reports_failure_with_200() {
    let resp = app()
        .oneshot(list_request(&format!("/supportingdocs/list?{CASE_8}"), Some("1")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let err: ErrorResponse = body_json(resp).await;
    assert!(!err.success);
    assert_eq!(err.error, "Invalid session");
}

#[tokio::test]
async fn list_with_expired_session_reports_failure() {
    use tower::Service;

    let backend = Backend::seeded().with_session_timeout(Duration::ZERO);
    let mut app = app_with(backend).into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(login_request(r#"{"userName":"supervisor","password":"secret"}"#))
        .await
        .unwrap();
    let session: SessionResponse = body_json(resp).await;
    assert_eq!(session.remaining_minutes, 0);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(list_request(
            &format!("/supportingdocs/list?{CASE_8}"),
            Some(&session.session_id.to_string()),
        ))
        .await
        .unwrap();
    let err: ErrorResponse = body_json(resp).await;
    assert_eq!(err.error, "Invalid session");
}

#[tokio::test]
async fn list_missing_workitem_returns_400() {
    let resp = app()
        .oneshot(list_request(
            "/supportingdocs/list?processInstanceId=e-Notes-000000000008-process",
            Some("7001"),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let err: ErrorResponse = body_json(resp).await;
    assert_eq!(err.error, "Missing required parameter: workitemId");
}

// --- pdf note ---

#[tokio::test]
async fn pdf_note_requires_no_session() {
    let resp = app()
        .oneshot(pdf_note_request(&format!("/notesheet/createpdfnote?{CASE_8}")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let note: PdfNoteResponse = body_json(resp).await;
    assert!(note.success);
    assert_eq!(note.original_doc_index, "1646");
    assert_eq!(note.new_version, "1.1");
    assert!(note.pdf_path.ends_with(".pdf"));
}

#[tokio::test]
async fn pdf_note_unknown_case_reports_failure() {
    let resp = app()
        .oneshot(pdf_note_request(
            "/notesheet/createpdfnote?workitemId=9&processInstanceId=missing",
        ))
        .await
        .unwrap();

    let err: ErrorResponse = body_json(resp).await;
    assert!(!err.success);
    assert!(err.error.contains("missing"));
}

#[tokio::test]
async fn pdf_note_missing_params_returns_400() {
    let resp = app()
        .oneshot(pdf_note_request("/notesheet/createpdfnote?workitemId=1"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- full session lifecycle ---

#[tokio::test]
async fn session_lifecycle() {
    use tower::Service;

    let backend = Backend::new().with_user("clerk", "pw").with_work_item(
        "3",
        "case-3",
        WorkItem {
            folder_id: "55".to_string(),
            documents: vec![document("9", "Memo.pdf", "pdf", "2048", "clerk", "")],
            original_doc_index: "10".to_string(),
            notedocument_index: "11".to_string(),
            note_revisions: 0,
        },
    );
    let mut app = app_with(backend).into_service();

    // login
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(login_request(r#"{"userName":"clerk","password":"pw"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let session: SessionResponse = body_json(resp).await;
    let session_id = session.session_id.to_string();

    // second login reuses the cached session
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(login_request(r#"{"userName":"clerk","password":"pw"}"#))
        .await
        .unwrap();
    let again: SessionResponse = body_json(resp).await;
    assert_eq!(again.session_id, session.session_id);

    // list
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(list_request(
            "/supportingdocs/list?workitemId=3&processInstanceId=case-3",
            Some(&session_id),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let docs: DocumentsResponse = body_json(resp).await;
    assert_eq!(docs.count, 1);
    assert_eq!(docs.documents[0].document_name, "Memo.pdf");
    assert_eq!(docs.folder_id.as_deref(), Some("55"));

    // unknown case still succeeds, with no documents
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(list_request(
            "/supportingdocs/list?workitemId=4&processInstanceId=case-4",
            Some(&session_id),
        ))
        .await
        .unwrap();
    let docs: DocumentsResponse = body_json(resp).await;
    assert!(docs.success);
    assert_eq!(docs.count, 0);
    assert!(docs.message.is_some());

    // pdf note versions advance per call
    for expected in ["1.1", "1.2"] {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(pdf_note_request(
                "/notesheet/createpdfnote?workitemId=3&processInstanceId=case-3",
            ))
            .await
            .unwrap();
        let note: PdfNoteResponse = body_json(resp).await;
        assert_eq!(note.new_version, expected);
        assert_eq!(note.notedocument_index, "11");
    }
}
