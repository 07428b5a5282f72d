use crate::helpers::client::TestApp;

/// End-to-end shape check: upstream `{uid, handle, node_hotkey, ...}`
/// comes out of `/miners` as the canonical leaderboard record with a
/// response-order rank and derived totals.
#[tokio::test]
async fn test_miners_view_normalizes_leaderboard() {
    let app = TestApp::start().await;

    let (status, body) = app.get_json("/miners").await;

    assert_eq!(status, 200);
    let miners = body.as_array().expect("array of miners");
    assert_eq!(miners.len(), 1);

    let first = &miners[0];
    assert_eq!(first["rank"], 1);
    assert_eq!(first["hotkey"], "abc");
    assert_eq!(first["username"], "foo");
    assert_eq!(first["total_posts"], 5);
    assert_eq!(first["total_interactions"], 5);
    assert!(first.get("handle").is_none(), "raw field names must not leak");
    assert!(first.get("node_hotkey").is_none());
}

#[tokio::test]
async fn test_dashboard_composite() {
    let app = TestApp::start().await;

    let (status, body) = app.get_json("/dashboard").await;

    assert_eq!(status, 200);
    assert_eq!(body["stats"]["total_miners"], 10);
    assert_eq!(body["stats"]["total_posts"], 100);
    assert_eq!(body["stats"]["network_activity"]["approximated"], true);
    assert_eq!(body["leaderboard"].as_array().unwrap().len(), 1);

    let featured = body["featured_content"].as_array().unwrap();
    assert_eq!(featured.len(), 1);
    // like 3 + retweet 2
    assert_eq!(featured[0]["score"], 5);
    // reply 1 + retweet 2 + like 3
    assert_eq!(featured[0]["interactions_count"], 6);
}

#[tokio::test]
async fn test_stats_view() {
    let app = TestApp::start().await;

    let (status, body) = app.get_json("/stats").await;

    assert_eq!(status, 200);
    assert_eq!(body["total_interactions"], 300);
    // 400 likes over 100 posts
    assert_eq!(body["avg_quality_score"], 4.0);
}

/// The breakdown endpoint answers 500 in this fixture; the profile must
/// still load with the breakdown absent.
#[tokio::test]
async fn test_profile_survives_breakdown_failure() {
    let app = TestApp::start().await;

    let (status, body) = app.get_json("/miners/abc").await;

    assert_eq!(status, 200);
    assert_eq!(body["stats"]["hotkey"], "abc");
    assert_eq!(body["stats"]["username"], "foo");
    assert!(
        body["stats"].get("rank").is_none(),
        "single-miner stats carry no rank"
    );
    assert!(body["score_breakdown"].is_null());
    assert_eq!(body["recent_posts"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_miners_search_filters_by_query() {
    let app = TestApp::start().await;

    let (status, body) = app.get_json("/miners?q=foo").await;
    assert_eq!(status, 200);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = app.get_json("/miners?q=nobody").await;
    assert_eq!(status, 200);
    assert_eq!(body.as_array().unwrap().len(), 0);
}
