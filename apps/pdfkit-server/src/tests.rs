//! Tests for the PDF toolkit server
//!
//! Two layers:
//! - proptest properties over the planner and session laws
//! - API tests driving the real router with axum-test

use lopdf::{content::Content, content::Operation, Dictionary, Document, Object, Stream};

/// Build a small valid PDF with `num_pages` pages of identifiable text.
fn sample_pdf(num_pages: u32, prefix: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
        ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
    ]));
    let mut font_dict = Dictionary::new();
    font_dict.set("F1", Object::Reference(font_id));
    let mut resources = Dictionary::new();
    resources.set("Font", Object::Dictionary(font_dict));
    let resources_id = doc.add_object(Object::Dictionary(resources));

    let mut page_ids = Vec::new();
    for n in 1..=num_pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new(
                    "Tf",
                    vec![Object::Name(b"F1".to_vec()), Object::Integer(12)],
                ),
                Operation::new("Td", vec![Object::Integer(72), Object::Integer(720)]),
                Operation::new(
                    "Tj",
                    vec![Object::String(
                        format!("{} page {}", prefix, n).into_bytes(),
                        lopdf::StringFormat::Literal,
                    )],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            content.encode().unwrap(),
        ));

        let page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ]),
            ),
            ("Resources", Object::Reference(resources_id)),
            ("Contents", Object::Reference(content_id)),
        ]);
        page_ids.push(doc.add_object(page));
    }

    let pages = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(num_pages as i64)),
        (
            "Kids",
            Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
        ),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]);
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

mod property_tests {
    use super::sample_pdf;
    use pdfkit_core::{plan_ranges, ExportFormat, FileUpload, MergeSession, SplitMode};
    use proptest::prelude::*;

    fn upload(name: &str, bytes: Vec<u8>) -> FileUpload {
        FileUpload {
            filename: name.to_string(),
            content_type: "application/pdf".to_string(),
            bytes,
        }
    }

    proptest! {
        /// Property: ranges mode produces ceil(pages / chunk) outputs that
        /// cover every page exactly once.
        #[test]
        fn ranges_mode_count_and_coverage(pages in 1u32..200, chunk in 1u32..20) {
            let mode = SplitMode::Ranges { pages_per_file: chunk };
            let ranges = plan_ranges(&mode, pages).unwrap();

            prop_assert_eq!(ranges.len() as u32, pages.div_ceil(chunk));

            let total: u32 = ranges.iter().map(|r| r.page_count()).sum();
            prop_assert_eq!(total, pages);

            for pair in ranges.windows(2) {
                prop_assert_eq!(pair[1].start, pair[0].end + 1);
            }
        }

        /// Property: individual mode always produces one output per page.
        #[test]
        fn individual_mode_output_count(pages in 1u32..200) {
            let ranges = plan_ranges(&SplitMode::Individual, pages).unwrap();
            prop_assert_eq!(ranges.len() as u32, pages);
            prop_assert!(ranges.iter().all(|r| r.page_count() == 1));
        }

        /// Property: a custom range is accepted exactly when
        /// 1 <= start <= end <= pages.
        #[test]
        fn custom_range_validation(start in 0u32..12, end in 0u32..12, pages in 1u32..10) {
            let mode = SplitMode::Custom { ranges: vec![(start, end)] };
            let result = plan_ranges(&mode, pages);
            let valid = start >= 1 && start <= end && end <= pages;
            prop_assert_eq!(result.is_ok(), valid);
        }

        /// Property: moving an entry and moving it back restores the
        /// original order.
        #[test]
        fn reorder_is_an_involution(len in 2usize..5, from in 0usize..5, to in 0usize..5) {
            prop_assume!(from < len && to < len);

            let mut session = MergeSession::default();
            let files = (0..len)
                .map(|i| upload(&format!("doc{}.pdf", i), sample_pdf(1, &format!("D{}", i))))
                .collect();
            let outcome = session.add_files(files);
            prop_assert!(outcome.rejected.is_empty());

            let original: Vec<String> = session.documents().map(|d| d.filename).collect();
            session.reorder(from, to).unwrap();
            session.reorder(to, from).unwrap();
            let restored: Vec<String> = session.documents().map(|d| d.filename).collect();
            prop_assert_eq!(original, restored);
        }

        /// Property: only "txt" and "docx" parse as export formats.
        #[test]
        fn export_format_parsing(input in "[a-z]{1,6}") {
            let parsed = input.parse::<ExportFormat>();
            let expected = matches!(input.as_str(), "txt" | "docx");
            prop_assert_eq!(parsed.is_ok(), expected);
        }
    }
}

mod api_tests {
    use super::sample_pdf;
    use crate::{api, AppState};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;

    fn test_server() -> TestServer {
        let state = Arc::new(AppState::new(Duration::from_secs(3600)));
        TestServer::new(api::router(state)).unwrap()
    }

    async fn create_session(server: &TestServer) -> String {
        let res = server.post("/api/sessions").await;
        assert_eq!(res.status_code(), StatusCode::OK);
        let body: Value = res.json();
        body["session_id"].as_str().unwrap().to_string()
    }

    fn file_entry(name: &str, pages: u32, prefix: &str) -> Value {
        json!({
            "filename": name,
            "data_base64": BASE64.encode(sample_pdf(pages, prefix)),
        })
    }

    #[tokio::test]
    async fn health_reports_service() {
        let server = test_server();
        let res = server.get("/health").await;
        assert_eq!(res.status_code(), StatusCode::OK);

        let body: Value = res.json();
        assert_eq!(body["service"], "pdfkit-server");
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn merge_flow_end_to_end() {
        let server = test_server();
        let id = create_session(&server).await;

        let res = server
            .post(&format!("/api/sessions/{}/merge/files", id))
            .json(&json!({ "files": [
                file_entry("a.pdf", 3, "DocA"),
                file_entry("b.pdf", 5, "DocB"),
            ]}))
            .await;
        assert_eq!(res.status_code(), StatusCode::OK);
        let body: Value = res.json();
        assert_eq!(body["count"], 2);
        assert_eq!(body["rejected"].as_array().unwrap().len(), 0);

        let res = server
            .post(&format!("/api/sessions/{}/merge/process", id))
            .await;
        assert_eq!(res.status_code(), StatusCode::OK);
        let body: Value = res.json();
        assert_eq!(body["output"]["page_count"], 8);
        assert_eq!(body["output"]["filename"], "merged-document.pdf");

        let res = server
            .get(&format!("/api/sessions/{}/merge/download", id))
            .await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert!(res.as_bytes().starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn merge_with_one_file_is_rejected() {
        let server = test_server();
        let id = create_session(&server).await;

        server
            .post(&format!("/api/sessions/{}/merge/files", id))
            .json(&json!({ "files": [file_entry("only.pdf", 2, "Doc")] }))
            .await;

        let res = server
            .post(&format!("/api/sessions/{}/merge/process", id))
            .await;
        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = res.json();
        assert_eq!(body["code"], "INSUFFICIENT_INPUTS");
    }

    #[tokio::test]
    async fn merge_rejects_non_pdf_entries_individually() {
        let server = test_server();
        let id = create_session(&server).await;

        let res = server
            .post(&format!("/api/sessions/{}/merge/files", id))
            .json(&json!({ "files": [
                file_entry("good.pdf", 1, "Doc"),
                { "filename": "bad.txt", "data_base64": BASE64.encode(b"plain text") },
            ]}))
            .await;
        assert_eq!(res.status_code(), StatusCode::OK);

        let body: Value = res.json();
        assert_eq!(body["count"], 1);
        assert_eq!(body["rejected"][0]["filename"], "bad.txt");
    }

    #[tokio::test]
    async fn merge_download_before_process_is_not_ready() {
        let server = test_server();
        let id = create_session(&server).await;

        let res = server
            .get(&format!("/api/sessions/{}/merge/download", id))
            .await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
        let body: Value = res.json();
        assert_eq!(body["code"], "OUTPUT_NOT_READY");
    }

    #[tokio::test]
    async fn split_flow_with_equal_ranges() {
        let server = test_server();
        let id = create_session(&server).await;

        let res = server
            .post(&format!("/api/sessions/{}/split/file", id))
            .json(&file_entry("big.pdf", 10, "Doc"))
            .await;
        assert_eq!(res.status_code(), StatusCode::OK);
        let body: Value = res.json();
        assert_eq!(body["file"]["page_count"], 10);

        let res = server
            .post(&format!("/api/sessions/{}/split/process", id))
            .json(&json!({"mode": "ranges", "pages_per_file": 4}))
            .await;
        assert_eq!(res.status_code(), StatusCode::OK);
        let body: Value = res.json();
        assert_eq!(body["count"], 3);
        let counts: Vec<u64> = body["outputs"]
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o["page_count"].as_u64().unwrap())
            .collect();
        assert_eq!(counts, vec![4, 4, 2]);

        let res = server
            .get(&format!("/api/sessions/{}/split/download/2", id))
            .await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert!(res.as_bytes().starts_with(b"%PDF-"));

        let res = server
            .get(&format!("/api/sessions/{}/split/download/3", id))
            .await;
        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = res.json();
        assert_eq!(body["code"], "INDEX_OUT_OF_RANGE");
    }

    #[tokio::test]
    async fn split_custom_range_out_of_bounds_fails() {
        let server = test_server();
        let id = create_session(&server).await;

        server
            .post(&format!("/api/sessions/{}/split/file", id))
            .json(&file_entry("doc.pdf", 5, "Doc"))
            .await;

        let res = server
            .post(&format!("/api/sessions/{}/split/process", id))
            .json(&json!({"mode": "custom", "ranges": [[0, 3]]}))
            .await;
        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = res.json();
        assert_eq!(body["code"], "INVALID_RANGE");
    }

    #[tokio::test]
    async fn convert_flow_extract_edit_export() {
        let server = test_server();
        let id = create_session(&server).await;

        server
            .post(&format!("/api/sessions/{}/convert/file", id))
            .json(&file_entry("report.pdf", 2, "Report"))
            .await;

        let res = server
            .post(&format!("/api/sessions/{}/convert/extract", id))
            .await;
        assert_eq!(res.status_code(), StatusCode::OK);
        let body: Value = res.json();
        let text = body["text"].as_str().unwrap();
        assert!(text.contains("--- Page 1 ---"));

        let edited = "replacement line one\nline two";
        let res = server
            .put(&format!("/api/sessions/{}/convert/text", id))
            .json(&json!({"text": edited}))
            .await;
        assert_eq!(res.status_code(), StatusCode::OK);

        let res = server
            .get(&format!("/api/sessions/{}/convert/export/txt", id))
            .await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.text(), edited);

        let res = server
            .get(&format!("/api/sessions/{}/convert/export/docx", id))
            .await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert!(res.as_bytes().starts_with(b"PK\x03\x04"));
    }

    #[tokio::test]
    async fn convert_export_before_extract_fails() {
        let server = test_server();
        let id = create_session(&server).await;

        server
            .post(&format!("/api/sessions/{}/convert/file", id))
            .json(&file_entry("doc.pdf", 1, "Doc"))
            .await;

        let res = server
            .get(&format!("/api/sessions/{}/convert/export/txt", id))
            .await;
        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = res.json();
        assert_eq!(body["code"], "NO_TEXT_AVAILABLE");
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let server = test_server();
        let res = server
            .post("/api/sessions/not-a-session/merge/process")
            .await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
        let body: Value = res.json();
        assert_eq!(body["code"], "SESSION_NOT_FOUND");
    }

    #[tokio::test]
    async fn delete_session_then_access_fails() {
        let server = test_server();
        let id = create_session(&server).await;

        let res = server.delete(&format!("/api/sessions/{}", id)).await;
        assert_eq!(res.status_code(), StatusCode::OK);

        let res = server
            .get(&format!("/api/sessions/{}/merge/files", id))
            .await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_export_format_is_invalid_request() {
        let server = test_server();
        let id = create_session(&server).await;

        let res = server
            .get(&format!("/api/sessions/{}/convert/export/pdf", id))
            .await;
        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = res.json();
        assert_eq!(body["code"], "INVALID_REQUEST");
    }
}
