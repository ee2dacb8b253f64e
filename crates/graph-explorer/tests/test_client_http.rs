use anyhow::Result;
use clap::Parser;
use serde_json::json;
use wiremock::matchers::{any, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use skygraph_core::cli::Cli;
use skygraph_core::{analyze, fetch_social_graph, BskyClient, Error};

fn client_for(server: &MockServer) -> BskyClient {
    BskyClient::with_base_urls(&server.uri(), &server.uri()).unwrap()
}

fn entry(name: &str) -> serde_json::Value {
    json!({
        "did": format!("did:plc:{name}"),
        "handle": format!("{name}.bsky.social"),
        "displayName": name,
        "indexedAt": "2024-01-01T00:00:00Z"
    })
}

fn profile(name: &str) -> serde_json::Value {
    json!({
        "did": format!("did:plc:{name}"),
        "handle": format!("{name}.bsky.social"),
        "displayName": name,
        "description": "test account",
        "followersCount": 3,
        "followsCount": 3,
        "postsCount": 10
    })
}

#[tokio::test]
async fn test_pagination_concatenates_pages_in_order() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/app.bsky.graph.getFollowers"))
        .and(query_param("actor", "alice.bsky.social"))
        .and(query_param("limit", "100"))
        .and(query_param_is_missing("cursor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "followers": [entry("a"), entry("b")],
            "cursor": "page2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/app.bsky.graph.getFollowers"))
        .and(query_param("cursor", "page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "followers": [entry("c"), entry("d")],
            "cursor": "page3"
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Final page: the server omits the cursor.
    Mock::given(method("GET"))
        .and(path("/app.bsky.graph.getFollowers"))
        .and(query_param("cursor", "page3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "followers": [entry("e")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let followers = client.get_followers("alice.bsky.social").await?;

    let handles: Vec<&str> = followers.iter().map(|e| e.handle.as_str()).collect();
    assert_eq!(
        handles,
        [
            "a.bsky.social",
            "b.bsky.social",
            "c.bsky.social",
            "d.bsky.social",
            "e.bsky.social"
        ]
    );

    // Exactly three calls were made; drop-time verification enforces the
    // expect(1) on each page mock.
    server.verify().await;
    Ok(())
}

#[tokio::test]
async fn test_empty_page_terminates_even_with_cursor() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/app.bsky.graph.getFollows"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "follows": [],
            "cursor": "more"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let follows = client.get_follows("alice.bsky.social").await?;

    assert!(follows.is_empty());
    server.verify().await;
    Ok(())
}

#[tokio::test]
async fn test_profile_failure_skips_graph_endpoints() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/app.bsky.actor.getProfile"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "InvalidRequest",
            "message": "Profile not found"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/app.bsky.graph.getFollowers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "followers": [] })))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/app.bsky.graph.getFollows"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "follows": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = fetch_social_graph(&client, "ghost.bsky.social").await.unwrap_err();

    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Profile not found");
        }
        other => panic!("expected Api error, got {other:?}"),
    }

    server.verify().await;
    Ok(())
}

#[tokio::test]
async fn test_login_attaches_bearer_token() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/com.atproto.server.createSession"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessJwt": "test-jwt",
            "did": "did:plc:me",
            "handle": "me.bsky.social"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/app.bsky.actor.getProfile"))
        .and(header("authorization", "Bearer test-jwt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile("alice")))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    assert!(!client.is_authenticated());

    client.login("me.bsky.social", "app-password").await?;
    assert!(client.is_authenticated());

    let profile = client.get_profile("alice.bsky.social").await?;
    assert_eq!(profile.handle, "alice.bsky.social");

    server.verify().await;
    Ok(())
}

#[tokio::test]
async fn test_api_error_surfaces_status_and_message() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/app.bsky.actor.getProfile"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": "RateLimitExceeded",
            "message": "Rate limit exceeded"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.get_profile("alice.bsky.social").await.unwrap_err();

    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 429);
            assert_eq!(message, "Rate limit exceeded");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_fetch_and_analyze_end_to_end() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/app.bsky.actor.getProfile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile("alice")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/app.bsky.graph.getFollowers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "followers": [entry("a"), entry("b"), entry("c")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/app.bsky.graph.getFollows"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "follows": [entry("b"), entry("c"), entry("d")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let graph = fetch_social_graph(&client, "alice.bsky.social").await?;
    let rels = analyze(&graph.followers, &graph.follows);

    assert_eq!(graph.profile.did, "did:plc:alice");
    let mutuals: Vec<&str> = rels.mutuals.iter().map(|e| e.did.as_str()).collect();
    assert_eq!(mutuals, ["did:plc:b", "did:plc:c"]);
    assert_eq!(rels.fans[0].did, "did:plc:a");
    assert_eq!(rels.not_following_back[0].did, "did:plc:d");

    server.verify().await;
    Ok(())
}

#[tokio::test]
async fn test_unsupported_export_fails_before_any_http_call() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let cli = Cli::try_parse_from(["skygraph", "--actor", "alice.bsky.social", "--export", "xml"])?;
    let err = cli.into_options().unwrap_err();
    assert!(matches!(err, Error::Config(_)));

    server.verify().await;
    Ok(())
}
