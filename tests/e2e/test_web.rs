use crate::e2e::helpers;

use helpers::{TestContext, INDEX_HTML};
use hyper::StatusCode;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_serve_demo_page_at_root(ctx: &TestContext) {
    let response = ctx.client.get("/").await.unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.text(), INDEX_HTML);
    assert!(response
        .header("content-type")
        .is_some_and(|v| v.starts_with("text/html")));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_serve_static_assets(ctx: &TestContext) {
    let response = ctx.client.get("/app.js").await.unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.text(), "console.log('tts');");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_not_found_for_unknown_paths(ctx: &TestContext) {
    let response = ctx.client.get("/missing.css").await.unwrap();

    response.assert_status(StatusCode::NOT_FOUND);
}
