use crate::helpers::client::TestApp;

#[tokio::test]
async fn test_proxy_forwards_parameters_in_order() {
    let app = TestApp::start().await;

    let response = app
        .http
        .get(app.url("/api/nuance?endpoint=%2Fecho&a=1&b=2"))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*",
        "successful proxy responses carry CORS headers too"
    );

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["query"], "a=1&b=2");
}

#[tokio::test]
async fn test_proxy_relays_upstream_status() {
    let app = TestApp::start().await;

    let (status, body) = app.get_json("/api/nuance?endpoint=%2Fno%2Fsuch%2Froute").await;

    assert_eq!(status, 404);
    assert_eq!(body["error"], "API request failed: Not Found");
}

#[tokio::test]
async fn test_proxy_post_ignores_extra_query_parameters() {
    let app = TestApp::start().await;

    let response = app
        .http
        .post(app.url("/api/nuance?endpoint=%2Fecho&a=1&b=2"))
        .json(&serde_json::json!({}))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["query"], "", "POST must not forward query parameters");
}

#[tokio::test]
async fn test_proxy_posts_body_through() {
    let app = TestApp::start().await;

    let response = app
        .http
        .post(app.url("/api/nuance?endpoint=%2Ftopic%2Fcheck"))
        .json(&serde_json::json!({
            "content": "a post about decentralized inference",
            "topic": "bittensor"
        }))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["relevant"], true);
    assert_eq!(
        body["received"]["content"],
        "a post about decentralized inference"
    );
    assert_eq!(body["received"]["topic"], "bittensor");
}

#[tokio::test]
async fn test_client_timeout_cuts_slow_upstream() {
    let app = TestApp::start().await;

    // 200ms budget against an upstream route that takes 2s.
    let api = app
        .api
        .clone()
        .with_timeout(std::time::Duration::from_millis(200));

    let result = api.verify_account("slow", "someaccount").await;
    assert!(result.is_err(), "slow upstream must time out, not hang");
}
