//! End-to-end tests: the real router and translation client exercised
//! against a local stand-in for the remote translation service.

use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use docx_rs::{
    DocumentChild, Paragraph, ParagraphChild, Run, RunChild, Table, TableCell, TableCellContent,
    TableChild, TableRow, TableRowChild,
};
use serde_json::{json, Value};

use docx_translator::server::api::{router, AppState};
use docx_translator::{DocxProcessor, TranslationClient, TranslatorConfig};

/// Shared state of the stand-in translation service
#[derive(Clone)]
struct MockService {
    hits: Arc<AtomicUsize>,
    fail: bool,
}

async fn translate_stub(State(svc): State<MockService>, Json(body): Json<Value>) -> Response {
    svc.hits.fetch_add(1, Ordering::Relaxed);

    if svc.fail {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let text = body["text"].as_str().unwrap_or_default();
    let translated = match text {
        "Привет" => "Сәлем",
        "Мир" => "Әлем",
        other => other,
    };
    Json(json!({ "translated_text": translated })).into_response()
}

/// Spawn the stand-in service, returning its base URL and hit counter
async fn spawn_mock(fail: bool) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let svc = MockService {
        hits: hits.clone(),
        fail,
    };
    let app = Router::new()
        .route("/translate/ru-kk/", post(translate_stub))
        .route("/translate/kk-ru/", post(translate_stub))
        .with_state(svc);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    (format!("http://{}/translate", addr), hits)
}

/// Spawn the service under test against the given translation base URL
async fn spawn_app(api_base: String) -> SocketAddr {
    let config = TranslatorConfig {
        api_base,
        timeout_ms: 5_000,
        max_table_depth: 16,
    };
    let client = TranslationClient::new(config).unwrap();
    let state = Arc::new(AppState::new(DocxProcessor::new(client)));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    addr
}

/// One bold paragraph "Привет" plus a 1x1 table whose cell says "Мир"
fn sample_docx() -> Vec<u8> {
    let docx = docx_rs::Docx::new()
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Привет").bold()))
        .add_table(Table::new(vec![TableRow::new(vec![TableCell::new()
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Мир")))])]));

    let mut buf = Cursor::new(Vec::new());
    docx.build().pack(&mut buf).unwrap();
    buf.into_inner()
}

async fn upload(
    addr: SocketAddr,
    direction: &str,
    filename: &str,
    bytes: Vec<u8>,
) -> reqwest::Response {
    let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
    let form = reqwest::multipart::Form::new().part("file", part);

    reqwest::Client::new()
        .post(format!(
            "http://{}/translate-docx/?direction={}",
            addr, direction
        ))
        .multipart(form)
        .send()
        .await
        .unwrap()
}

/// (text, bold) of every run of the paragraph
fn run_info(paragraph: &Paragraph) -> Vec<(String, bool)> {
    paragraph
        .children
        .iter()
        .filter_map(|child| match child {
            ParagraphChild::Run(run) => {
                let text = run
                    .children
                    .iter()
                    .filter_map(|rc| match rc {
                        RunChild::Text(t) => Some(t.text.as_str()),
                        _ => None,
                    })
                    .collect::<String>();
                Some((text, run.run_property.bold.is_some()))
            }
            _ => None,
        })
        .collect()
}

/// Runs of the nth top-level paragraph
fn paragraph_runs(children: &[DocumentChild], index: usize) -> Vec<(String, bool)> {
    let paragraphs: Vec<&Paragraph> = children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(p) => Some(p.as_ref()),
            _ => None,
        })
        .collect();
    run_info(paragraphs[index])
}

/// Runs of the first paragraph of the first cell of the first table
fn first_table_cell_runs(children: &[DocumentChild]) -> Vec<(String, bool)> {
    for child in children {
        if let DocumentChild::Table(table) = child {
            let TableChild::TableRow(row) = &table.rows[0];
            let TableRowChild::TableCell(cell) = &row.cells[0];
            for content in &cell.children {
                if let TableCellContent::Paragraph(p) = content {
                    return run_info(p);
                }
            }
        }
    }
    Vec::new()
}

#[tokio::test]
async fn translates_document_end_to_end() {
    let (base, hits) = spawn_mock(false).await;
    let addr = spawn_app(base).await;

    let response = upload(addr, "ru-kk", "report.docx", sample_docx()).await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let disposition = response
        .headers()
        .get(reqwest::header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(
        disposition,
        "attachment; filename*=UTF-8''translated_report.docx"
    );

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(
        content_type,
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    );

    let bytes = response.bytes().await.unwrap();
    let docx = docx_rs::read_docx(&bytes).unwrap();
    let children = &docx.document.children;

    assert_eq!(
        paragraph_runs(children, 0),
        vec![("Сәлем".to_string(), true)]
    );
    assert_eq!(
        first_table_cell_runs(children),
        vec![("Әлем".to_string(), false)]
    );
    assert_eq!(hits.load(Ordering::Relaxed), 2);
}

#[tokio::test]
async fn keeps_original_text_when_service_fails() {
    let (base, hits) = spawn_mock(true).await;
    let addr = spawn_app(base).await;

    let response = upload(addr, "ru-kk", "report.docx", sample_docx()).await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let bytes = response.bytes().await.unwrap();
    let docx = docx_rs::read_docx(&bytes).unwrap();
    let children = &docx.document.children;

    assert_eq!(
        paragraph_runs(children, 0),
        vec![("Привет".to_string(), true)]
    );
    assert_eq!(
        first_table_cell_runs(children),
        vec![("Мир".to_string(), false)]
    );
    assert_eq!(hits.load(Ordering::Relaxed), 2);
}

#[tokio::test]
async fn rejects_unsupported_direction_before_parsing() {
    let (base, hits) = spawn_mock(false).await;
    let addr = spawn_app(base).await;

    let response = upload(addr, "en-fr", "report.docx", sample_docx()).await;
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "invalid_direction");
    assert_eq!(body["error"]["type"], "invalid_request_error");
    assert_eq!(hits.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn rejects_invalid_document_bytes() {
    let (base, hits) = spawn_mock(false).await;
    let addr = spawn_app(base).await;

    let response = upload(addr, "ru-kk", "report.docx", b"not a docx".to_vec()).await;
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "invalid_document");
    assert_eq!(hits.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn rejects_upload_without_file_field() {
    let (base, hits) = spawn_mock(false).await;
    let addr = spawn_app(base).await;

    let form = reqwest::multipart::Form::new().text("comment", "no file here");
    let response = reqwest::Client::new()
        .post(format!("http://{}/translate-docx/?direction=ru-kk", addr))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "missing_file");
    assert_eq!(hits.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn encodes_non_ascii_filenames() {
    let (base, _hits) = spawn_mock(false).await;
    let addr = spawn_app(base).await;

    let response = upload(addr, "ru-kk", "отчёт.docx", sample_docx()).await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let disposition = response
        .headers()
        .get(reqwest::header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename*=UTF-8''translated_%"));
    assert!(disposition.is_ascii());
    assert!(disposition.ends_with(".docx"));
}

#[tokio::test]
async fn health_reports_failure_counter() {
    let (base, _hits) = spawn_mock(true).await;
    let addr = spawn_app(base).await;

    upload(addr, "ru-kk", "report.docx", sample_docx()).await;

    let body: Value = reqwest::get(format!("http://{}/", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "docx-translator");
    assert_eq!(body["translation_failures"], 2);
}
