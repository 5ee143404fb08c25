//! Plain-text rendering of client outcomes for the terminal.

use std::io::{self, Write};

use notesheet_core::{ApiError, DocumentList, HttpResponse, PdfNoteResult, Session};

/// Human-readable size for a string-encoded byte count.
///
/// Empty input renders as `-`; input that is not an integer is shown as-is.
pub fn format_file_size(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return "-".to_string();
    }
    let Ok(size) = trimmed.parse::<i64>() else {
        return raw.to_string();
    };
    if size < 1024 {
        format!("{size} B")
    } else if size < 1024 * 1024 {
        format!("{:.1} KB", size as f64 / 1024.0)
    } else {
        format!("{:.1} MB", size as f64 / (1024.0 * 1024.0))
    }
}

pub fn render_session<W: Write>(out: &mut W, session: &Session) -> io::Result<()> {
    writeln!(out, "Logged in successfully!")?;
    render_session_details(out, session)
}

pub fn render_session_details<W: Write>(out: &mut W, session: &Session) -> io::Result<()> {
    writeln!(out, "  Session ID: {}", session.session_id)?;
    writeln!(out, "  User:       {}", session.user_name)?;
    writeln!(out, "  Remaining:  {} minutes", session.remaining_minutes)?;
    writeln!(out, "  Cached:     {}", yes_no(session.cached))
}

pub fn render_documents<W: Write>(out: &mut W, list: &DocumentList) -> io::Result<()> {
    writeln!(out, "Success: {} document(s) found", list.count)?;
    if let Some(message) = &list.message {
        writeln!(out, "  {message}")?;
    }
    if list.documents.is_empty() {
        return Ok(());
    }

    let header = ["Index", "Name", "Type", "Size", "Version", "Owner", "Created"];
    let rows: Vec<[String; 7]> = list
        .documents
        .iter()
        .map(|doc| {
            [
                doc.document_index.clone(),
                doc.document_name.clone(),
                doc.document_type.clone(),
                format_file_size(&doc.document_size),
                doc.version_no.clone(),
                doc.owner.clone(),
                doc.created_date_time.clone(),
            ]
        })
        .collect();

    let mut widths = header.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    write_row(out, &header.map(str::to_string), &widths)?;
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    writeln!(out, "{}", rule.join("-+-"))?;
    for row in &rows {
        write_row(out, row, &widths)?;
    }
    Ok(())
}

pub fn render_pdf_note<W: Write>(out: &mut W, note: &PdfNoteResult) -> io::Result<()> {
    writeln!(out, "Success: PDF note created")?;
    writeln!(out, "  Original Doc Index:    {}", note.original_doc_index)?;
    writeln!(out, "  Note Document Index:   {}", note.notedocument_index)?;
    writeln!(out, "  New Version:           {}", note.new_version)?;
    writeln!(out, "  PDF Path:              {}", note.pdf_path)?;
    writeln!(out, "  Comments Path:         {}", note.comments_path)?;
    writeln!(out, "  Annotations Preserved: {}", yes_no(note.annotations_preserved))
}

/// Pretty-print the body when it is JSON, otherwise show it verbatim.
pub fn render_raw<W: Write>(out: &mut W, response: &HttpResponse) -> io::Result<()> {
    match response.header("content-type") {
        Some(content_type) => writeln!(out, "HTTP {} ({content_type})", response.status)?,
        None => writeln!(out, "HTTP {}", response.status)?,
    }
    match serde_json::from_str::<serde_json::Value>(&response.body) {
        Ok(value) => {
            let pretty = serde_json::to_string_pretty(&value).map_err(io::Error::other)?;
            writeln!(out, "{pretty}")
        }
        Err(_) => writeln!(out, "{}", response.body),
    }
}

pub fn render_failure<W: Write>(out: &mut W, err: &ApiError) -> io::Result<()> {
    writeln!(out, "Failed: {err}")
}

fn write_row<W: Write>(out: &mut W, cells: &[String; 7], widths: &[usize; 7]) -> io::Result<()> {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    writeln!(out, "{}", padded.join(" | ").trim_end())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

#[cfg(test)]
mod tests {
    use notesheet_core::SupportingDocument;

    use super::*;

    fn rendered(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn doc(name: &str, size: &str) -> SupportingDocument {
        SupportingDocument {
            document_index: "1670".to_string(),
            document_name: name.to_string(),
            document_type: "pdf".to_string(),
            document_size: size.to_string(),
            version_no: "1.0".to_string(),
            owner: "keerthi".to_string(),
            created_date_time: "2025-01-15 10:30:00".to_string(),
            modified_date_time: None,
            comment: None,
        }
    }

    #[test]
    fn file_sizes() {
        assert_eq!(format_file_size(""), "-");
        assert_eq!(format_file_size("  "), "-");
        assert_eq!(format_file_size("512"), "512 B");
        assert_eq!(format_file_size("1023"), "1023 B");
        assert_eq!(format_file_size("1024"), "1.0 KB");
        assert_eq!(format_file_size("245678"), "239.9 KB");
        assert_eq!(format_file_size("1048576"), "1.0 MB");
        assert_eq!(format_file_size("5767168"), "5.5 MB");
        assert_eq!(format_file_size("unknown"), "unknown");
    }

    #[test]
    fn documents_table_has_header_and_rows() {
        let list = DocumentList {
            count: 2,
            documents: vec![doc("Invoice.pdf", "245678"), doc("A-much-longer-name.pdf", "")],
            folder_id: Some("1234".to_string()),
            message: None,
        };
        let text = rendered(|out| render_documents(out, &list));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Success: 2 document(s) found");
        assert!(lines[1].starts_with("Index | Name"));
        assert!(lines[2].starts_with("------"));
        assert!(lines[3].contains("Invoice.pdf"));
        assert!(lines[3].contains("239.9 KB"));
        assert!(lines[4].contains("A-much-longer-name.pdf | pdf  | -"));
        // Columns line up.
        assert_eq!(lines[3].find(" | pdf"), lines[4].find(" | pdf"));
    }

    #[test]
    fn empty_list_shows_message_only() {
        let list = DocumentList {
            count: 0,
            documents: Vec::new(),
            folder_id: None,
            message: Some("No AttachmentFolderId found in work item attributes".to_string()),
        };
        let text = rendered(|out| render_documents(out, &list));
        assert_eq!(
            text,
            "Success: 0 document(s) found\n  No AttachmentFolderId found in work item attributes\n"
        );
    }

    #[test]
    fn session_details() {
        let session = Session {
            session_id: "7001".to_string(),
            user_name: "supervisor".to_string(),
            remaining_minutes: 25,
            cached: true,
        };
        let text = rendered(|out| render_session(out, &session));
        assert!(text.contains("Session ID: 7001"));
        assert!(text.contains("Remaining:  25 minutes"));
        assert!(text.contains("Cached:     Yes"));
    }

    #[test]
    fn raw_json_is_pretty_printed() {
        let response = HttpResponse {
            status: 401,
            headers: Vec::new(),
            body: r#"{"success":false,"error":"Authentication failed"}"#.to_string(),
        };
        let text = rendered(|out| render_raw(out, &response));
        assert!(text.starts_with("HTTP 401\n{\n"));
        assert!(text.contains("  \"error\": \"Authentication failed\""));
    }

    #[test]
    fn raw_status_line_shows_content_type() {
        let response = HttpResponse {
            status: 200,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: r#"{"success":true}"#.to_string(),
        };
        let text = rendered(|out| render_raw(out, &response));
        assert!(text.starts_with("HTTP 200 (application/json)\n{\n"));
    }

    #[test]
    fn raw_non_json_is_verbatim() {
        let response = HttpResponse {
            status: 502,
            headers: Vec::new(),
            body: "Bad Gateway".to_string(),
        };
        assert_eq!(rendered(|out| render_raw(out, &response)), "HTTP 502\nBad Gateway\n");
    }

    #[test]
    fn failure_line() {
        let text = rendered(|out| render_failure(out, &ApiError::NoSession));
        assert_eq!(text, "Failed: Please login first to get a session ID\n");
    }
}
