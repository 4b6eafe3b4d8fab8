use reqwest::StatusCode;
use serde_json::json;
use wa_bulk_sender::routes::{ErrorBody, SendResponse};
use wiremock::matchers::{any, body_partial_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{PHONE_NUMBER_ID, spawn_app, spawn_app_without_credentials};

fn messages_path() -> String {
    format!("/{}/messages", PHONE_NUMBER_ID)
}

#[tokio::test]
async fn send_returns_a_400_for_an_empty_recipient_list() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app
        .post_send(&json!({ "recipients": [], "message": "x" }))
        .await;

    // Assert
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = response.json().await.unwrap();
    assert!(!body.error.is_empty());
}

#[tokio::test]
async fn send_returns_a_400_when_fields_are_missing_or_empty() {
    // Arrange
    let app = spawn_app().await;
    let test_cases = vec![
        (json!({ "message": "hello" }), "missing recipients"),
        (json!({ "recipients": ["14155552671"] }), "missing message"),
        (
            json!({ "recipients": ["14155552671"], "message": "" }),
            "empty message",
        ),
        (
            json!({ "recipients": ["14155552671"], "message": "   " }),
            "blank message",
        ),
        (
            json!({ "recipients": "14155552671", "message": "hello" }),
            "recipients not an array",
        ),
    ];

    for (body, description) in test_cases {
        // Act
        let response = app.post_send(&body).await;

        // Assert
        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not return a 400 Bad Request when the payload was {}.",
            description
        );
        let body: ErrorBody = response.json().await.unwrap();
        assert!(!body.error.is_empty());
    }
}

#[tokio::test]
async fn send_returns_a_400_for_a_body_that_is_not_json() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app
        .api_client
        .post(format!("{}/api/send", &app.address))
        .header("Content-Type", "application/json")
        .body("recipients=14155552671")
        .send()
        .await
        .expect("Failed to execute request.");

    // Assert
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn send_returns_a_501_without_credentials() {
    // Arrange
    let app = spawn_app_without_credentials().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.messaging_server)
        .await;

    // Act
    let response = app
        .post_send(&json!({ "recipients": ["14155552671"], "message": "hello" }))
        .await;

    // Assert
    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    let body: ErrorBody = response.json().await.unwrap();
    assert!(!body.error.is_empty());
}

#[tokio::test]
async fn invalid_payload_wins_over_missing_credentials() {
    // Arrange
    let app = spawn_app_without_credentials().await;

    // Act
    let response = app
        .post_send(&json!({ "recipients": [], "message": "x" }))
        .await;

    // Assert
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn send_calls_the_messaging_api_once_per_recipient() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(path(messages_path()))
        .and(method("POST"))
        .and(header("Authorization", "Bearer test-access-token"))
        .and(body_partial_json(json!({
            "messaging_product": "whatsapp",
            "type": "text",
            "text": { "body": "Hi there!" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": [{ "id": "wamid.OK" }]
        })))
        .expect(2)
        .mount(&app.messaging_server)
        .await;

    // Act
    let response = app
        .post_send(&json!({
            "recipients": ["+14155552671", "447911123456"],
            "message": "Hi there!"
        }))
        .await;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let body: SendResponse = response.json().await.unwrap();
    assert_eq!(body.count, 2);
    assert_eq!(body.results.len(), 2);
    assert_eq!(body.results[0].to, "+14155552671");
    assert_eq!(body.results[0].id.as_deref(), Some("wamid.OK"));
    assert!(body.results.iter().all(|result| result.ok));
}

#[tokio::test]
async fn send_sends_recipients_in_request_order() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": [{ "id": "wamid.OK" }]
        })))
        .mount(&app.messaging_server)
        .await;

    // Act
    app.post_send(&json!({
        "recipients": ["5511999999999", "14155552671", "447911123456"],
        "message": "hello"
    }))
    .await;

    // Assert
    let received = app.messaging_server.received_requests().await.unwrap();
    let sent_to: Vec<String> = received
        .iter()
        .map(|request| {
            let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
            body["to"].as_str().unwrap().to_owned()
        })
        .collect();
    assert_eq!(sent_to, vec!["5511999999999", "14155552671", "447911123456"]);
}

#[tokio::test]
async fn a_failing_recipient_does_not_stop_the_others() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(body_partial_json(json!({ "to": "14155552671" })))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "message": "Recipient phone number not in allowed list" }
        })))
        .expect(1)
        .mount(&app.messaging_server)
        .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": [{ "id": "wamid.OK" }]
        })))
        .expect(1)
        .mount(&app.messaging_server)
        .await;

    // Act
    let response = app
        .post_send(&json!({
            "recipients": ["14155552671", "447911123456"],
            "message": "hello"
        }))
        .await;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let body: SendResponse = response.json().await.unwrap();
    assert_eq!(body.count, 1);
    assert!(!body.results[0].ok);
    assert_eq!(
        body.results[0].error,
        Some(json!({ "error": { "message": "Recipient phone number not in allowed list" } }))
    );
    assert!(body.results[1].ok);
}

#[tokio::test]
async fn malformed_numbers_are_recorded_without_calling_the_api() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": [{ "id": "wamid.OK" }]
        })))
        .expect(1)
        .mount(&app.messaging_server)
        .await;

    // Act
    let response = app
        .post_send(&json!({
            "recipients": ["12345", "14155552671"],
            "message": "hello"
        }))
        .await;

    // Assert
    let body: SendResponse = response.json().await.unwrap();
    assert_eq!(body.count, 1);
    assert_eq!(body.results[0].to, "12345");
    assert!(!body.results[0].ok);
    assert!(body.results[0].error.is_some());
}
