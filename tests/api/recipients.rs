use linkify::{LinkFinder, LinkKind};
use reqwest::StatusCode;
use serde_json::{Value, json};

use crate::helpers::spawn_app_without_credentials;

#[tokio::test]
async fn parse_returns_deduplicated_recipients_in_order() {
    // Arrange
    let app = spawn_app_without_credentials().await;

    // Act
    let response = app
        .post_parse("447911123456,+5511999999999,447911123456")
        .await;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["count"], 2);
    assert_eq!(body["recipients"], json!(["447911123456", "5511999999999"]));
    assert_eq!(body["duplicates"], 1);
    assert_eq!(body["rejected"], json!([]));
}

#[tokio::test]
async fn parse_reports_rejected_tokens_next_to_the_accepted_ones() {
    // Arrange
    let app = spawn_app_without_credentials().await;

    // Act
    let response = app
        .post_parse("name;phone\n12345\n+1 (415) 555-2671\n1234567890123456")
        .await;

    // Assert
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["recipients"], json!(["14155552671"]));
    let rejected: Vec<&str> = body["rejected"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["token"].as_str().unwrap())
        .collect();
    assert_eq!(rejected, vec!["name", "phone", "12345", "1234567890123456"]);
}

#[tokio::test]
async fn parse_accepts_an_empty_body() {
    // Arrange
    let app = spawn_app_without_credentials().await;

    // Act
    let response = app.post_parse("").await;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn export_returns_one_link_per_recipient_as_a_download() {
    // Arrange
    let app = spawn_app_without_credentials().await;

    // Act
    let response = app
        .post_export(&json!({
            "text": "+14155552671\n14155552671\n447911123456",
            "message": "Hi there!"
        }))
        .await;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get("Content-Disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned();
    assert!(disposition.starts_with("attachment"));
    let body = response.text().await.unwrap();
    assert_eq!(
        body.lines().collect::<Vec<_>>(),
        vec![
            "https://wa.me/14155552671?text=Hi%20there%21",
            "https://wa.me/447911123456?text=Hi%20there%21",
        ]
    );

    let links: Vec<_> = LinkFinder::new()
        .links(&body)
        .filter(|l| *l.kind() == LinkKind::Url)
        .collect();
    assert_eq!(links.len(), 2);
}

#[tokio::test]
async fn export_returns_a_400_for_an_empty_message() {
    // Arrange
    let app = spawn_app_without_credentials().await;

    // Act
    let response = app
        .post_export(&json!({ "text": "14155552671", "message": "" }))
        .await;

    // Assert
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
