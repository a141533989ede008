use gini_core::client::{DetailedFeedback, Upload, WebDocumentAction};
use gini_core::models::{DocumentStatus, Message, Thumbs, WebResult};
use gini_core::{Config, Endpoint, Error, Identity, WebhookClient, Webhooks};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn identity() -> Identity {
    Identity::anonymous("user_1".into(), "session_1".into())
}

fn client(server: &MockServer, endpoints: &[(Endpoint, &str)]) -> WebhookClient {
    let config = endpoints.iter().fold(Config::default(), |config, (endpoint, route)| {
        let url = Url::parse(&format!("{}{route}", server.uri())).unwrap();
        config.with_endpoint(*endpoint, url)
    });
    WebhookClient::new(config)
}

#[tokio::test]
async fn lists_documents_from_registry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/docs"))
        .and(body_partial_json(json!({"action": "list", "userId": "user_1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "documents": [
                {"id": 1, "file_name": "a.pdf", "file_size": 1024, "drive_id": "d1", "type": "knowledge"},
                {"id": 2, "file_name": "b.txt", "source": "web"}
            ]
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, &[(Endpoint::Documents, "/docs")]);
    let docs = client.list_documents(&identity()).await.unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].name, "a.pdf");
    assert_eq!(docs[0].size, "1.0 KB");
    assert!(docs[0].added_to_knowledge);
    assert_eq!(docs[1].status, DocumentStatus::Ready);
    assert_eq!(docs[1].size, "N/A");
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/text"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let client = client(&server, &[(Endpoint::Text, "/text")]);
    let err = client.post(Endpoint::Text, json!({})).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Status {
            endpoint: Endpoint::Text,
            status: 502
        }
    ));
    assert_eq!(err.to_string(), "Text webhook error: 502");
}

#[tokio::test]
async fn unconfigured_endpoint_fails_without_a_request() {
    let server = MockServer::start().await;
    let client = client(&server, &[]);
    let err = client.list_history(&identity()).await.unwrap_err();
    assert!(matches!(err, Error::NotConfigured(Endpoint::History)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn upload_sends_base64_then_registers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(body_partial_json(json!({
            "fileName": "notes.txt",
            "fileData": "aGVsbG8=",
            "fileSize": 5,
            "addToKnowledge": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"fileId": "drive-9"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/docs"))
        .and(body_partial_json(json!({
            "action": "register",
            "document": {"fileName": "notes.txt", "driveId": "drive-9", "type": "knowledge", "source": "upload"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(
        &server,
        &[(Endpoint::Upload, "/upload"), (Endpoint::Documents, "/docs")],
    );
    let upload = Upload {
        name: "notes.txt".into(),
        mime: "text/plain".into(),
        bytes: b"hello".to_vec(),
        add_to_knowledge: true,
    };
    let receipt = client.upload(&identity(), &upload).await.unwrap();
    assert_eq!(receipt.file_id.as_deref(), Some("drive-9"));
}

#[tokio::test]
async fn stored_upload_survives_registry_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"fileId": "drive-9"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/docs"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(
        &server,
        &[(Endpoint::Upload, "/upload"), (Endpoint::Documents, "/docs")],
    );
    let upload = Upload {
        name: "notes.txt".into(),
        mime: "text/plain".into(),
        bytes: b"hello".to_vec(),
        add_to_knowledge: false,
    };
    let receipt = client.upload(&identity(), &upload).await.unwrap();
    assert_eq!(receipt.file_id.as_deref(), Some("drive-9"));
}

#[tokio::test]
async fn upload_without_registry_still_returns_receipt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"fileId": "drive-3"})))
        .mount(&server)
        .await;

    let client = client(&server, &[(Endpoint::Upload, "/upload")]);
    let upload = Upload {
        name: "a.csv".into(),
        mime: "text/csv".into(),
        bytes: b"x,y".to_vec(),
        add_to_knowledge: false,
    };
    let receipt = client.upload(&identity(), &upload).await.unwrap();
    assert_eq!(receipt.file_id.as_deref(), Some("drive-3"));
}

#[tokio::test]
async fn web_document_and_feedback_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/web"))
        .and(body_partial_json(json!({
            "action": "addToChat",
            "document": {"title": "Chromene review", "pdfUrl": "https://example.org/c.pdf"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 5, "fileId": "f5"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/feedback"))
        .and(body_partial_json(json!({"feedbackType": "quick", "thumbsRating": "up", "messageId": "gini_1"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/feedback"))
        .and(body_partial_json(json!({"feedbackType": "detailed", "rating": 4, "comment": "Useful"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(
        &server,
        &[(Endpoint::WebDocument, "/web"), (Endpoint::Feedback, "/feedback")],
    );
    let result = WebResult {
        id: Some("r1".into()),
        title: "Chromene review".into(),
        source: None,
        year: None,
        authors: None,
        summary: None,
        url: None,
        pdf_url: Some("https://example.org/c.pdf".into()),
    };
    let receipt = client
        .add_web_document(&identity(), &result, WebDocumentAction::AddToChat)
        .await
        .unwrap();
    assert_eq!(receipt.file_id.as_deref(), Some("f5"));

    client
        .quick_feedback(&identity(), "gini_1", Thumbs::Up)
        .await
        .unwrap();
    client
        .detailed_feedback(
            &identity(),
            "gini_1",
            &DetailedFeedback {
                rating: 4,
                comment: "Useful".into(),
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn history_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/history"))
        .and(body_partial_json(json!({"action": "list"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "conversations": [
                {"id": "c1", "title": "Caffeine", "messageCount": 4, "favorite": true},
                {"title": "missing id"}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/history"))
        .and(body_partial_json(json!({"action": "save", "title": "Caffeine", "messageCount": 1})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"conversationId": 77}])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/history"))
        .and(body_partial_json(json!({"action": "load", "conversationId": "c1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"type": "user", "content": "Show caffeine structure", "timestamp": "2024-01-01T00:00:00Z"},
            {"type": "bot", "content": "<p>Here it is</p>", "isHTML": true, "messageId": "gini_5"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/history"))
        .and(body_partial_json(json!({"action": "toggleFavorite", "favorite": false})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, &[(Endpoint::History, "/history")]);
    let identity = identity();

    let conversations = client.list_history(&identity).await.unwrap();
    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0].message_count, 4);
    assert!(conversations[0].favorite);

    let saved = client
        .save_history(
            &identity,
            None,
            "Caffeine",
            &[Message::user(1, "Show caffeine structure", chrono::Utc::now())],
        )
        .await
        .unwrap();
    assert_eq!(saved.as_deref(), Some("77"));

    let messages = client.load_history(&identity, "c1").await.unwrap();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].is_user());
    assert!(messages[1].is_html);
    assert_eq!(messages[1].reply_id.as_deref(), Some("gini_5"));

    client.toggle_favorite(&identity, "c1", false).await.unwrap();
}
