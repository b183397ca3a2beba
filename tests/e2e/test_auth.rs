use crate::e2e::helpers;

use helpers::{assertions::assert_tts_response, TestContext, TEST_API_KEY};
use hyper::StatusCode;
use serde_json::json;
use test_context::test_context;

#[tokio::test]
async fn it_should_reject_missing_api_key() {
    let ctx = TestContext::with_api_key().await;

    let response = ctx
        .client
        .post("/tts", &json!({ "text": "שלום" }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::UNAUTHORIZED)
        .assert_error_message("Missing API key");
    assert!(ctx.tts.calls.lock().is_empty());
}

#[tokio::test]
async fn it_should_reject_wrong_api_key() {
    let ctx = TestContext::with_api_key().await;

    let response = ctx
        .client
        .post_with_auth("/tts", &json!({ "text": "שלום" }), "wrong-key")
        .await
        .unwrap();

    response
        .assert_status(StatusCode::UNAUTHORIZED)
        .assert_error_message("Invalid API key");
}

#[tokio::test]
async fn it_should_accept_bearer_api_key() {
    let ctx = TestContext::with_api_key().await;

    let response = ctx
        .client
        .post_with_auth("/tts", &json!({ "text": "שלום" }), TEST_API_KEY)
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_tts_response(response.body.as_ref().unwrap());
}

#[tokio::test]
async fn it_should_accept_api_key_header() {
    let ctx = TestContext::with_api_key().await;

    let response = ctx
        .client
        .post_with_headers("/tts", &json!({ "text": "שלום" }), &[("x-api-key", TEST_API_KEY)])
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_not_require_api_key_when_unset(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/tts", &json!({ "text": "שלום" }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
}
