//! End-to-end tests against a mock conversion service.
//!
//! Each test starts its own `wiremock` server, so they run offline and in
//! parallel. Files are written into per-test temp directories.

use docconv::{
    validate_word_document, CandidateFile, ClientConfig, ConversionClient,
    ConversionProgressCallback, Converter, DirectorySink, DocConvError, Direction, Host,
    PanelStatus, Tab, ValidationError, WordFormat, MAX_UPLOAD_BYTES,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

// ── Test helpers ─────────────────────────────────────────────────────────────

fn client_for(server: &MockServer) -> ConversionClient {
    let config = ClientConfig::builder()
        .base_url(server.uri())
        .build()
        .unwrap();
    ConversionClient::new(config).unwrap()
}

fn docx(name: &str) -> CandidateFile {
    CandidateFile::from_bytes(name, DOCX_MIME, b"PK fake docx body".to_vec())
}

fn pdf(name: &str) -> CandidateFile {
    CandidateFile::from_bytes(name, "application/pdf", b"%PDF-1.4 fake".to_vec())
}

#[derive(Default)]
struct RecordingCallback {
    events: Mutex<Vec<String>>,
}

impl RecordingCallback {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl ConversionProgressCallback for RecordingCallback {
    fn on_upload_start(&self, file_name: &str, size: u64) {
        self.events
            .lock()
            .unwrap()
            .push(format!("upload {file_name} {size}"));
    }

    fn on_response(&self, status: u16) {
        self.events.lock().unwrap().push(format!("status {status}"));
    }

    fn on_conversion_complete(&self, file_name: &str, bytes: u64) {
        self.events
            .lock()
            .unwrap()
            .push(format!("done {file_name} {bytes}"));
    }

    fn on_conversion_error(&self, message: &str) {
        self.events.lock().unwrap().push(format!("error {message}"));
    }
}

// ── Client ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn word_to_pdf_uses_server_file_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/document/convert"))
        .and(body_string_contains("name=\"file\""))
        .and(body_string_contains("filename=\"resume.docx\""))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Disposition", "attachment; filename=\"report.pdf\"")
                .insert_header("Content-Type", "application/pdf")
                .set_body_bytes(b"%PDF-1.7 converted".to_vec()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let artifact = client_for(&server)
        .convert(&docx("resume.docx"), Direction::WordToPdf)
        .await
        .unwrap();

    assert_eq!(artifact.file_name(), "report.pdf");
    assert_eq!(artifact.bytes(), b"%PDF-1.7 converted");
    assert_eq!(artifact.content_type(), Some("application/pdf"));
}

#[tokio::test]
async fn missing_disposition_falls_back_to_default_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/document/convert"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/document/convert-to-word"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK".to_vec()))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let a = client
        .convert(&docx("a.docx"), Direction::WordToPdf)
        .await
        .unwrap();
    let b = client
        .convert(&pdf("b.pdf"), Direction::PdfToWord(WordFormat::Docx))
        .await
        .unwrap();

    assert_eq!(a.file_name(), "converted.pdf");
    assert_eq!(b.file_name(), "converted.docx");
}

#[tokio::test]
async fn pdf_to_word_sends_target_format() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/document/convert-to-word"))
        .and(query_param("targetFormat", "doc"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"legacy".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let artifact = client_for(&server)
        .convert(&pdf("scan.pdf"), Direction::PdfToWord(WordFormat::Doc))
        .await
        .unwrap();
    assert_eq!(artifact.file_name(), "converted.doc");
}

#[tokio::test]
async fn server_detail_becomes_the_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(serde_json::json!({ "detail": "bad format" })),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .convert(&docx("a.docx"), Direction::WordToPdf)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "bad format");
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn unparseable_error_body_is_generic() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .convert(&docx("a.docx"), Direction::WordToPdf)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Conversion failed");
}

#[tokio::test]
async fn unreachable_service_is_a_request_error() {
    // Port 1 on loopback refuses connections.
    let config = ClientConfig::builder()
        .base_url("http://127.0.0.1:1")
        .build()
        .unwrap();
    let err = ConversionClient::new(config)
        .unwrap()
        .convert(&docx("a.docx"), Direction::WordToPdf)
        .await
        .unwrap_err();

    match err {
        DocConvError::Request { message } => assert!(!message.is_empty()),
        other => panic!("expected Request, got {other:?}"),
    }
}

#[tokio::test]
async fn slow_service_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let config = ClientConfig::builder()
        .base_url(server.uri())
        .request_timeout_secs(1)
        .build()
        .unwrap();
    let err = ConversionClient::new(config)
        .unwrap()
        .convert(&docx("a.docx"), Direction::WordToPdf)
        .await
        .unwrap_err();

    assert!(matches!(err, DocConvError::Timeout { secs: 1 }));
    assert_eq!(err.to_string(), "Request timed out after 1s");
}

#[tokio::test]
async fn huge_content_length_is_a_failure_not_an_abort() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        // Drain the multipart request up to its closing boundary.
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        while !request.windows(4).any(|w| w == b"--\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 4000000000000000000\r\n\r\nabc")
            .await
            .unwrap();
        socket.shutdown().await.ok();
    });

    let config = ClientConfig::builder()
        .base_url(format!("http://{addr}"))
        .build()
        .unwrap();
    let outcome = ConversionClient::new(config)
        .unwrap()
        .convert(&docx("a.docx"), Direction::WordToPdf)
        .await;

    assert!(matches!(outcome, Err(DocConvError::Request { .. })));
    server.await.unwrap();
}

#[tokio::test]
async fn unparseable_content_type_still_uploads() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/document/convert"))
        .and(body_string_contains("application/octet-stream"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let file = CandidateFile::from_bytes("resume.docx", "docx", b"PK body".to_vec());
    validate_word_document(Some(&file)).unwrap();

    let artifact = client_for(&server)
        .convert(&file, Direction::WordToPdf)
        .await
        .unwrap();
    assert_eq!(artifact.file_name(), "converted.pdf");
}

#[tokio::test]
async fn raw_utf8_disposition_name_is_kept() {
    let server = MockServer::start().await;
    let disposition = reqwest::header::HeaderValue::from_bytes(
        "attachment; filename=\"résumé.pdf\"".as_bytes(),
    )
    .unwrap();
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Disposition", disposition)
                .set_body_bytes(b"%PDF".to_vec()),
        )
        .mount(&server)
        .await;

    let artifact = client_for(&server)
        .convert(&docx("résumé.docx"), Direction::WordToPdf)
        .await
        .unwrap();
    assert_eq!(artifact.file_name(), "résumé.pdf");
}

#[tokio::test]
async fn supported_formats_are_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/document/formats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "sourceFormats": [".doc", ".docx"],
            "targetFormats": [".pdf"]
        })))
        .mount(&server)
        .await;

    let formats = client_for(&server).supported_formats().await.unwrap();
    assert_eq!(formats.source_formats, vec![".doc", ".docx"]);
    assert_eq!(formats.target_formats, vec![".pdf"]);
}

#[tokio::test]
async fn progress_callback_sees_the_exchange() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Disposition", "attachment; filename=out.pdf")
                .set_body_bytes(vec![7u8; 64]),
        )
        .mount(&server)
        .await;

    let recorder = Arc::new(RecordingCallback::default());
    let config = ClientConfig::builder()
        .base_url(server.uri())
        .progress_callback(recorder.clone() as Arc<dyn ConversionProgressCallback>)
        .build()
        .unwrap();
    ConversionClient::new(config)
        .unwrap()
        .convert(&docx("in.docx"), Direction::WordToPdf)
        .await
        .unwrap();

    assert_eq!(
        recorder.events(),
        vec![
            "upload in.docx 17".to_string(),
            "status 200".to_string(),
            "done out.pdf 64".to_string(),
        ]
    );
}

// ── Admission ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn oversized_file_on_disk_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("huge.docx");
    // Sparse: no 50 MB of real writes.
    let file = std::fs::File::create(&path).unwrap();
    file.set_len(MAX_UPLOAD_BYTES + 1).unwrap();
    drop(file);

    let candidate = CandidateFile::open(&path).await.unwrap();
    let err = validate_word_document(Some(&candidate)).unwrap_err();
    assert_eq!(err, ValidationError::TooLarge {
        size: MAX_UPLOAD_BYTES + 1,
        max: MAX_UPLOAD_BYTES,
    });
    assert_eq!(err.to_string(), "File size must be less than 50MB");
}

#[tokio::test]
async fn rejected_file_never_reaches_the_service() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut host = Host::new(
        Arc::new(client_for(&server)),
        Arc::new(DirectorySink::new(dir.path())),
    );
    let panel = host.active_panel_mut();
    let err = panel.select_file(Some(pdf("scan.pdf"))).unwrap_err();

    assert_eq!(
        err.to_string(),
        "Invalid file format. Allowed formats: .doc, .docx"
    );
    assert_eq!(panel.status(), PanelStatus::Error);
    assert_eq!(panel.convert().await, PanelStatus::Error);
}

// ── Host + panel + sink ──────────────────────────────────────────────────────

#[tokio::test]
async fn resume_is_converted_and_saved() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/document/convert"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Disposition", "attachment; filename=\"resume.pdf\"")
                .set_body_bytes(b"%PDF-1.7 resume".to_vec()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let input_dir = TempDir::new().unwrap();
    let input = input_dir.path().join("resume.docx");
    std::fs::write(&input, vec![b'x'; 2048]).unwrap();

    let out_dir = TempDir::new().unwrap();
    let mut host = Host::new(
        Arc::new(client_for(&server)),
        Arc::new(DirectorySink::new(out_dir.path())),
    );
    assert_eq!(host.active_tab(), Tab::WordToPdf);

    let panel = host.active_panel_mut();
    let candidate = CandidateFile::open(&input).await.unwrap();
    assert_eq!(candidate.content_type(), DOCX_MIME);
    panel.select_file(Some(candidate)).unwrap();

    assert_eq!(panel.convert().await, PanelStatus::Success);
    let saved = out_dir.path().join("resume.pdf");
    assert_eq!(panel.delivered_to(), Some(saved.as_path()));
    assert_eq!(std::fs::read(&saved).unwrap(), b"%PDF-1.7 resume");
    assert!(panel.error_message().is_none());
    // Kept for another attempt.
    assert_eq!(panel.file().map(CandidateFile::name), Some("resume.docx"));
}

#[tokio::test]
async fn server_error_leaves_panel_ready_to_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(serde_json::json!({ "title": "Unprocessable" })),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK".to_vec()))
        .mount(&server)
        .await;

    let out_dir = TempDir::new().unwrap();
    let mut host = Host::new(
        Arc::new(client_for(&server)),
        Arc::new(DirectorySink::new(out_dir.path())),
    );
    host.select_tab(Tab::PdfToWord);
    let panel = host.active_panel_mut();
    panel.select_file(Some(pdf("scan.pdf"))).unwrap();

    assert_eq!(panel.convert().await, PanelStatus::Error);
    assert_eq!(panel.error_message(), Some("Unprocessable"));
    assert!(panel.can_convert());

    assert_eq!(panel.convert().await, PanelStatus::Success);
    assert_eq!(
        panel.delivered_to(),
        Some(out_dir.path().join("converted.docx").as_path())
    );
}

#[tokio::test]
async fn client_is_usable_through_the_converter_seam() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF".to_vec()))
        .mount(&server)
        .await;

    let converter: Arc<dyn Converter> = Arc::new(client_for(&server));
    let artifact = converter
        .convert(&docx("a.docx"), Direction::WordToPdf)
        .await
        .unwrap();
    assert_eq!(artifact.len(), 4);
}
