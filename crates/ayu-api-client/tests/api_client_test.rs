use ayu_api_client::ApiClient;
use ayu_core::models::{FileEntry, FormSchema, RawFile, SubmissionRequest};
use ayu_core::{IntakeConfig, IntakeTransport, TransportFailure};
use mockito::Matcher;

fn request() -> SubmissionRequest {
    let schema = FormSchema::patient_intake();
    let mut values = schema.default_values();
    values.set_text(&schema, "fullName", "Asha Devi").unwrap();
    values.set_checked(&schema, "dataConsent", true).unwrap();

    let photos = vec![FileEntry::from_raw(RawFile::new(
        "arm.jpg",
        "image/jpeg",
        b"jpeg-bytes".to_vec(),
    ))];
    let reports = vec![FileEntry::from_raw(RawFile::new(
        "lab.pdf",
        "application/pdf",
        b"%PDF-1.4".to_vec(),
    ))];
    SubmissionRequest::build(&values, &photos, &reports, chrono::Utc::now())
}

fn client(server: &mockito::ServerGuard) -> ApiClient {
    ApiClient::new(server.url(), None).unwrap()
}

#[tokio::test]
async fn test_submit_sends_multipart_in_payload_order() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/submit-patient-data")
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data; boundary=".to_string()),
        )
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(
                r#"(?s)name="fullName".*name="photo_0".*name="report_0".*name="submissionTime""#
                    .to_string(),
            ),
            Matcher::Regex(r#"name="photo_0"; filename="arm\.jpg""#.to_string()),
            Matcher::Regex(r"(?i)content-type: application/pdf".to_string()),
            Matcher::Regex(r#"name="dataConsent"\r\n\r\ntrue"#.to_string()),
            Matcher::Regex(r#"name="photoCount"\r\n\r\n1"#.to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"success":true,"message":"Patient data submitted successfully","submissionId":"20240301093000","photosUploaded":1,"reportsUploaded":1}"#,
        )
        .create_async()
        .await;

    let receipt = client(&server).submit(request()).await.unwrap();
    assert!(receipt.success);
    assert_eq!(receipt.submission_id.as_deref(), Some("20240301093000"));
    assert_eq!(receipt.photos_uploaded, Some(1));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_error_status_uses_error_field() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/submit-patient-data")
        .with_status(500)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":"db down"}"#)
        .create_async()
        .await;

    let err = client(&server).submit(request()).await.unwrap_err();
    assert_eq!(
        err,
        TransportFailure::Rejected {
            status: 500,
            reason: "db down".to_string()
        }
    );
}

#[tokio::test]
async fn test_error_status_without_json_falls_back() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/submit-patient-data")
        .with_status(502)
        .with_body("<html>Bad Gateway</html>")
        .create_async()
        .await;

    let err = client(&server).submit(request()).await.unwrap_err();
    assert_eq!(err.reason(), "Submission failed");
    assert!(matches!(err, TransportFailure::Rejected { status: 502, .. }));
}

#[tokio::test]
async fn test_success_with_garbage_body_is_malformed() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/submit-patient-data")
        .with_status(200)
        .with_body("ok")
        .create_async()
        .await;

    let err = client(&server).submit(request()).await.unwrap_err();
    assert!(matches!(err, TransportFailure::MalformedResponse(_)));
}

#[tokio::test]
async fn test_unreachable_endpoint() {
    // Nothing listens on the discard port
    let client = ApiClient::new("http://127.0.0.1:9", None).unwrap();
    let err = client.submit(request()).await.unwrap_err();
    assert!(matches!(err, TransportFailure::Unreachable(_)));
}

#[tokio::test]
async fn test_configured_submit_path_is_used() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/intake")
        .with_status(200)
        .with_body(r#"{"success":true}"#)
        .create_async()
        .await;

    let config = IntakeConfig {
        api_url: format!("{}/", server.url()),
        submit_path: "/intake".to_string(),
        ..IntakeConfig::default()
    };
    let client = ApiClient::from_config(&config).unwrap();
    assert_eq!(client.base_url(), server.url());

    client.submit(request()).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_health_probe() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/health")
        .with_status(200)
        .with_body(r#"{"status":"healthy","message":"Server is running","timestamp":"2024-03-01T09:30:00"}"#)
        .create_async()
        .await;

    let client = client(&server);
    let status = client.health().await.unwrap();
    assert_eq!(status.status, "healthy");
    assert!(IntakeTransport::health(&client).await.is_ok());
}

#[tokio::test]
async fn test_health_probe_failure_is_unreachable() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/health")
        .with_status(503)
        .create_async()
        .await;

    let result = IntakeTransport::health(&client(&server)).await;
    assert!(matches!(result, Err(TransportFailure::Unreachable(_))));
}

#[tokio::test]
async fn test_list_and_get_submissions() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/submissions")
        .with_status(200)
        .with_body(r#"{"success":true,"count":1,"submissions":[{"submission_id":"20240301093000","patient_name":"Asha Devi"}]}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/api/submission/20240301093000")
        .with_status(200)
        .with_body(r#"{"success":true,"submission":{"fullName":"Asha Devi"}}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/api/submission/missing")
        .with_status(404)
        .with_body(r#"{"error":"Submission not found"}"#)
        .create_async()
        .await;

    let client = client(&server);
    let list = client.list_submissions().await.unwrap();
    assert_eq!(list.count, 1);
    assert_eq!(list.submissions[0]["patient_name"], "Asha Devi");

    let stored = client.get_submission("20240301093000").await.unwrap();
    assert_eq!(stored.submission["fullName"], "Asha Devi");

    let err = client.get_submission("missing").await.unwrap_err();
    assert!(format!("{:#}", err).contains("404"));
    assert!(client.get_submission("  ").await.is_err());
}
