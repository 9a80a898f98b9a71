//! Outbound Slack client tests against a mock server.

use deploy_relay::api::create_router;
use deploy_relay::error::DeliveryError;
use deploy_relay::message::{OutboundMessage, render_blocks};
use deploy_relay::notifier::{Notifier, SlackNotifier, TokenSource};
use deploy_relay::webhook::DeployEvent;
use deploy_relay::{AppState, DeliveryConfig, DeliveryMode, RelayConfig};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn delivery_config(api_url: String) -> DeliveryConfig {
    DeliveryConfig {
        mode: DeliveryMode::Api,
        timeout_secs: 1,
        api_url,
        token_env: "DEPLOY_RELAY_TEST_UNUSED".to_string(),
    }
}

fn text_message(text: &str) -> OutboundMessage {
    OutboundMessage::Text {
        text: text.to_string(),
    }
}

fn sample_event() -> DeployEvent {
    DeployEvent {
        name: Some("site".to_string()),
        context: Some("production".to_string()),
        branch: Some("master".to_string()),
        committer: Some("alice".to_string()),
        commit_url: Some("http://x/1".to_string()),
        ssl_url: Some("https://site.example".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn webhook_post_succeeds_on_literal_ok() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/services/T0/B1"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "text": "hello" })))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let notifier = SlackNotifier::new(&delivery_config(mock_server.uri())).unwrap();
    let url = format!("{}/services/T0/B1", mock_server.uri());

    notifier.send(&url, &text_message("hello")).await.unwrap();
}

#[tokio::test]
async fn webhook_post_fails_on_other_body() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no_service"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let notifier = SlackNotifier::new(&delivery_config(mock_server.uri())).unwrap();
    let err = notifier
        .send(&mock_server.uri(), &text_message("hello"))
        .await
        .unwrap_err();

    assert!(matches!(err, DeliveryError::Rejected(ref body) if body.contains("no_service")));
}

#[tokio::test]
async fn api_post_sends_bearer_token_and_blocks() {
    let mock_server = MockServer::start().await;
    let message = render_blocks("C835A5T0U", &sample_event());

    Mock::given(method("POST"))
        .and(path("/api/chat.postMessage"))
        .and(header("authorization", "Bearer xoxb-test"))
        .and(header("content-type", "application/json"))
        .and(body_json(message.payload()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let notifier = SlackNotifier::new(&delivery_config(format!(
        "{}/api/chat.postMessage",
        mock_server.uri()
    )))
    .unwrap()
    .with_token(TokenSource::Static("xoxb-test".to_string()));

    notifier.send("C835A5T0U", &message).await.unwrap();
}

#[tokio::test]
async fn api_post_reads_token_from_configured_env_var() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat.postMessage"))
        .and(header("authorization", "Bearer xoxb-env"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let token_env = "DEPLOY_RELAY_TEST_ENV_TOKEN";
    // Only this test touches this variable.
    unsafe { std::env::set_var(token_env, "xoxb-env") };

    let mut config = delivery_config(format!("{}/api/chat.postMessage", mock_server.uri()));
    config.token_env = token_env.to_string();
    let notifier = SlackNotifier::new(&config).unwrap();

    notifier
        .send("C1", &render_blocks("C1", &sample_event()))
        .await
        .unwrap();
}

#[tokio::test]
async fn api_post_fails_when_ok_is_false() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "ok": false, "error": "invalid_auth" })),
        )
        .mount(&mock_server)
        .await;

    let notifier = SlackNotifier::new(&delivery_config(mock_server.uri()))
        .unwrap()
        .with_token(TokenSource::Static(String::new()));
    let err = notifier
        .send("C1", &render_blocks("C1", &sample_event()))
        .await
        .unwrap_err();

    assert!(matches!(err, DeliveryError::Rejected(ref reason) if reason == "invalid_auth"));
}

#[tokio::test]
async fn api_post_fails_on_malformed_response() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let notifier = SlackNotifier::new(&delivery_config(mock_server.uri())).unwrap();
    let err = notifier
        .send("C1", &render_blocks("C1", &sample_event()))
        .await
        .unwrap_err();

    assert!(matches!(err, DeliveryError::MalformedResponse(_)));
}

#[tokio::test]
async fn slow_response_times_out() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("ok")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let notifier = SlackNotifier::new(&delivery_config(mock_server.uri())).unwrap();
    let err = notifier
        .send(&mock_server.uri(), &text_message("hello"))
        .await
        .unwrap_err();

    assert!(matches!(err, DeliveryError::Transport(ref e) if e.is_timeout()));
}

#[tokio::test]
async fn end_to_end_delivery_failure_is_500_with_single_attempt() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(500).set_body_string("server_error"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = RelayConfig::from_toml(&format!(
        "[delivery]\ntimeout_secs = 1\n\n[channels]\nops = \"{}/hook\"\n",
        mock_server.uri()
    ))
    .unwrap();
    let notifier = SlackNotifier::new(&config.delivery).unwrap();
    let app = create_router(Arc::new(AppState::new(config, Arc::new(notifier))));

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/?channel=ops")
        .body(axum::body::Body::from(r#"{"name":"site"}"#))
        .unwrap();
    let response = app.oneshot(request).await.expect("failed to make request");

    assert_eq!(
        response.status(),
        axum::http::StatusCode::INTERNAL_SERVER_ERROR
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"500 - Failed to send slack notification");
}

#[tokio::test]
async fn end_to_end_suppression_makes_no_outbound_call() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = RelayConfig::from_toml(&format!(
        "[routing]\nstatus_channel = \"deploy-status\"\n\n[channels]\ndeploy-status = \"{}/hook\"\n",
        mock_server.uri()
    ))
    .unwrap();
    let notifier = SlackNotifier::new(&config.delivery).unwrap();
    let app = create_router(Arc::new(AppState::new(config, Arc::new(notifier))));

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/?channel=deploy-status")
        .body(axum::body::Body::from(
            r#"{"site_id":"s1","context":"branch-deploy","branch":"feature"}"#,
        ))
        .unwrap();
    let response = app.oneshot(request).await.expect("failed to make request");

    assert_eq!(response.status(), axum::http::StatusCode::OK);
}

#[tokio::test]
async fn webhook_transport_error_omits_webhook_url() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("ok")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let notifier = SlackNotifier::new(&delivery_config(mock_server.uri())).unwrap();
    let url = format!("{}/services/T0/B1/secret-token", mock_server.uri());
    let err = notifier.send(&url, &text_message("hello")).await.unwrap_err();

    let DeliveryError::Transport(ref transport) = err else {
        panic!("expected transport error, got {err:?}");
    };
    assert!(transport.url().is_none());
    assert!(!err.to_string().contains("secret-token"), "error: {err}");
}
