//! HTTP boundary tests against a local mock conversion service.

use docconv_upload::{
    collect_candidates, download, download_batch, fetch_capabilities, submit, FileRef, Outcome,
    Quality, SelectionMode, Submission, SupportedFormat, UploadConfig, UploadCoordinator,
    UploadError,
};
use httpmock::prelude::*;
use std::path::Path;

fn config_for(server: &MockServer) -> UploadConfig {
    UploadConfig::builder()
        .endpoint(server.url("/upload"))
        .timeout_secs(10)
        .build()
        .unwrap()
}

fn write_file(dir: &Path, name: &str, contents: &str) -> FileRef {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    FileRef::from_path(&path).unwrap()
}

#[tokio::test]
async fn single_upload_follows_redirect_to_preview() {
    let server = MockServer::start_async().await;
    let upload = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/upload")
                .body_contains("name=\"targetFormat\"")
                .body_contains("name=\"quality\"")
                .body_contains("filename=\"report.docx\"")
                .body_contains("quarterly numbers");
            then.status(302)
                .header("Location", "/preview/3f2a_report.pdf");
        })
        .await;
    let preview = server
        .mock_async(|when, then| {
            when.method(GET).path("/preview/3f2a_report.pdf");
            then.status(200).body("<html>preview</html>");
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = write_file(dir.path(), "report.docx", "quarterly numbers");
    let config = config_for(&server);

    let mut coordinator = UploadCoordinator::new(&config);
    coordinator.accept_candidates(vec![file]).unwrap();
    coordinator.select_format(SupportedFormat::Pdf).unwrap();
    let submission = coordinator.begin_submission().unwrap();

    let receipt = submit(&submission, &config).await.unwrap();
    coordinator.finish_submission();

    upload.assert_async().await;
    preview.assert_async().await;
    assert_eq!(receipt.status, 200);
    assert!(receipt.succeeded());
    assert_eq!(
        receipt.outcome,
        Outcome::Preview {
            filename: "3f2a_report.pdf".into()
        }
    );
    assert!(coordinator.can_submit());
}

#[tokio::test]
async fn batch_upload_reports_results_page() {
    let server = MockServer::start_async().await;
    let body = r#"<html><body>
        <a href="/batch_download/1234abcd-0000-4000-8000-000000000000">Download all</a>
        <a href="/download/aa_a.pdf">a.pdf</a>
        <a href="/download/bb_b.pdf">b.pdf</a>
    </body></html>"#;
    let upload = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/upload")
                .body_contains("filename=\"a.odt\"")
                .body_contains("filename=\"b.txt\"");
            then.status(200).body(body);
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "a.odt", "alpha");
    write_file(dir.path(), "b.txt", "beta");
    let candidates = collect_candidates(&[dir.path()]).unwrap();

    let config = config_for(&server);
    let mut coordinator = UploadCoordinator::new(&config);
    coordinator.accept_candidates(candidates).unwrap();
    coordinator.select_format(SupportedFormat::Pdf).unwrap();
    let submission = coordinator.begin_submission().unwrap();
    assert_eq!(submission.mode, SelectionMode::Batch);

    let receipt = submit(&submission, &config).await.unwrap();

    upload.assert_async().await;
    assert_eq!(
        receipt.outcome,
        Outcome::BatchResults {
            batch_id: "1234abcd-0000-4000-8000-000000000000".into(),
            files: vec!["aa_a.pdf".into(), "bb_b.pdf".into()],
        }
    );
}

#[tokio::test]
async fn conversion_failure_returns_to_form_with_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/upload");
            then.status(302).header("Location", "/");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(200).body(
                r#"<div class="alert alert-danger" role="alert">
                    Conversion failed:   unsupported source
                </div>"#,
            );
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let submission = Submission {
        mode: SelectionMode::Single,
        files: vec![write_file(dir.path(), "notes.txt", "hello")],
        target_format: SupportedFormat::Pdf,
        quality: Quality::High,
    };

    let receipt = submit(&submission, &config_for(&server)).await.unwrap();
    assert!(!receipt.succeeded());
    assert_eq!(
        receipt.outcome,
        Outcome::Returned {
            message: Some("Conversion failed: unsupported source".into())
        }
    );
}

#[tokio::test]
async fn server_error_status_is_rejected() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/upload");
            then.status(413)
                .body(r#"<p class="alert">File too large</p>"#);
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let submission = Submission {
        mode: SelectionMode::Single,
        files: vec![write_file(dir.path(), "big.pdf", "%PDF")],
        target_format: SupportedFormat::Docx,
        quality: Quality::Medium,
    };

    let err = submit(&submission, &config_for(&server)).await.unwrap_err();
    match err {
        UploadError::ServerRejected { status, message } => {
            assert_eq!(status, 413);
            assert_eq!(message.as_deref(), Some("File too large"));
        }
        other => panic!("expected ServerRejected, got {other:?}"),
    }
}

#[tokio::test]
async fn file_without_local_source_is_refused_before_sending() {
    let server = MockServer::start_async().await;
    let upload = server
        .mock_async(|when, then| {
            when.method(POST).path("/upload");
            then.status(200);
        })
        .await;

    let submission = Submission {
        mode: SelectionMode::Single,
        files: vec![FileRef::new("dropped.docx", 10)],
        target_format: SupportedFormat::Pdf,
        quality: Quality::Medium,
    };

    let err = submit(&submission, &config_for(&server)).await.unwrap_err();
    assert!(matches!(err, UploadError::MissingSource { ref name } if name == "dropped.docx"));
    upload.assert_hits_async(0).await;
}

#[tokio::test]
async fn capabilities_are_read_from_check_formats() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/check_formats");
            then.status(200)
                .header("content-type", "application/json")
                .body(
                    r#"{"supported_formats":["docx","odt"],
                        "conversion_formats":["docx","pdf","xyz"],
                        "quality_settings":["high","medium","low"]}"#,
                );
        })
        .await;

    let caps = fetch_capabilities(&config_for(&server)).await.unwrap();

    mock.assert_async().await;
    assert_eq!(caps.quality_settings, ["high", "medium", "low"]);
    assert_eq!(caps.targets(), [SupportedFormat::Pdf, SupportedFormat::Docx]);
}

#[tokio::test]
async fn malformed_capabilities_are_unexpected() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/check_formats");
            then.status(200).body("<html>not json</html>");
        })
        .await;

    let err = fetch_capabilities(&config_for(&server)).await.unwrap_err();
    assert!(matches!(err, UploadError::UnexpectedResponse { .. }));
}

#[tokio::test]
async fn download_uses_content_disposition_name() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/download/3f2a_report.pdf");
            then.status(200)
                .header("Content-Disposition", "attachment; filename=report.pdf")
                .body("%PDF-1.7 converted");
        })
        .await;

    let out = tempfile::tempdir().unwrap();
    let path = download(&config_for(&server), "3f2a_report.pdf", out.path())
        .await
        .unwrap();

    assert_eq!(path, out.path().join("report.pdf"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "%PDF-1.7 converted");
}

#[tokio::test]
async fn batch_download_falls_back_to_archive_name() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/batch_download/1234abcd-0000-4000-8000-000000000000");
            then.status(200).body("PK\u{3}\u{4}zip");
        })
        .await;

    let out = tempfile::tempdir().unwrap();
    let path = download_batch(
        &config_for(&server),
        "1234abcd-0000-4000-8000-000000000000",
        out.path(),
    )
    .await
    .unwrap();

    assert_eq!(path, out.path().join("converted_documents_1234abcd.zip"));
    assert!(path.exists());
}

#[tokio::test]
async fn expired_download_is_unexpected_response() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/download/gone.pdf");
            then.status(302).header("Location", "/");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(200)
                .body(r#"<div class="alert alert-warning">File not found or has expired</div>"#);
        })
        .await;

    let out = tempfile::tempdir().unwrap();
    let err = download(&config_for(&server), "gone.pdf", out.path())
        .await
        .unwrap_err();

    match err {
        UploadError::UnexpectedResponse { detail, .. } => {
            assert_eq!(detail, "File not found or has expired");
        }
        other => panic!("expected UnexpectedResponse, got {other:?}"),
    }
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
}
