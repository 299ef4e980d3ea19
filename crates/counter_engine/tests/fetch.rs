use counter_engine::{ApiSettings, BatchSource, FailureKind, ListingPost, RedditSource};
use pretty_assertions::assert_eq;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings_for(server: &MockServer) -> ApiSettings {
    ApiSettings {
        token_url: format!("{}/api/v1/access_token", server.uri()),
        api_base: server.uri(),
        community: "countwitheveryone".to_string(),
        username: "counter".to_string(),
        password: "pw".to_string(),
        client_id: "id".to_string(),
        client_secret: "secret".to_string(),
        ..ApiSettings::default()
    }
}

fn token_body(token: &str) -> serde_json::Value {
    serde_json::json!({
        "access_token": token,
        "token_type": "bearer",
        "expires_in": 86400,
        "scope": "*"
    })
}

fn listing_body(titles: &[(&str, Option<&str>)]) -> serde_json::Value {
    let children: Vec<_> = titles
        .iter()
        .map(|(title, distinguished)| {
            serde_json::json!({
                "kind": "t3",
                "data": { "title": title, "distinguished": distinguished }
            })
        })
        .collect();
    serde_json::json!({ "kind": "Listing", "data": { "children": children } })
}

async fn mount_token(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .and(body_string_contains("grant_type=password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body(token)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn fetches_listing_with_bearer_token() {
    let server = MockServer::start().await;
    mount_token(&server, "tok").await;
    Mock::given(method("GET"))
        .and(path("/r/countwitheveryone/new"))
        .and(query_param("limit", "25"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing_body(&[
            ("12", None),
            ("Please read the rules", Some("moderator")),
            ("11", None),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let source = RedditSource::new(settings_for(&server)).unwrap();
    let posts = source.fetch_batch().await.expect("fetch ok");

    assert_eq!(
        posts,
        vec![
            ListingPost {
                title: "12".to_string(),
                distinguished: None,
            },
            ListingPost {
                title: "Please read the rules".to_string(),
                distinguished: Some("moderator".to_string()),
            },
            ListingPost {
                title: "11".to_string(),
                distinguished: None,
            },
        ]
    );
}

#[tokio::test]
async fn token_is_reused_between_cycles() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/r/countwitheveryone/new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing_body(&[("1", None)])))
        .expect(2)
        .mount(&server)
        .await;

    let source = RedditSource::new(settings_for(&server)).unwrap();
    source.fetch_batch().await.unwrap();
    source.fetch_batch().await.unwrap();
}

#[tokio::test]
async fn rejected_token_is_refreshed_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("stale")))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("fresh")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/r/countwitheveryone/new"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/r/countwitheveryone/new"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing_body(&[("7", None)])))
        .mount(&server)
        .await;

    let source = RedditSource::new(settings_for(&server)).unwrap();
    let posts = source.fetch_batch().await.expect("fetch after refresh");
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].title, "7");
}

#[tokio::test]
async fn grant_error_body_is_an_auth_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "error": "invalid_grant" })),
        )
        .mount(&server)
        .await;

    let source = RedditSource::new(settings_for(&server)).unwrap();
    let err = source.fetch_batch().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Auth);
    assert_eq!(err.message, "invalid_grant");
}

#[tokio::test]
async fn unauthorized_grant_is_an_auth_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let source = RedditSource::new(settings_for(&server)).unwrap();
    let err = source.fetch_batch().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Auth);
}

#[tokio::test]
async fn listing_server_error_is_reported() {
    let server = MockServer::start().await;
    mount_token(&server, "tok").await;
    Mock::given(method("GET"))
        .and(path("/r/countwitheveryone/new"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let source = RedditSource::new(settings_for(&server)).unwrap();
    let err = source.fetch_batch().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(503));
}

#[tokio::test]
async fn post_limit_is_clamped_in_the_query() {
    let server = MockServer::start().await;
    mount_token(&server, "tok").await;
    Mock::given(method("GET"))
        .and(path("/r/countwitheveryone/new"))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing_body(&[])))
        .expect(1)
        .mount(&server)
        .await;

    let settings = ApiSettings {
        post_limit: 250,
        ..settings_for(&server)
    };
    let source = RedditSource::new(settings).unwrap();
    assert!(source.fetch_batch().await.unwrap().is_empty());
}

#[tokio::test]
async fn oversized_listing_is_rejected() {
    let server = MockServer::start().await;
    mount_token(&server, "tok").await;
    Mock::given(method("GET"))
        .and(path("/r/countwitheveryone/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(256)))
        .mount(&server)
        .await;

    let settings = ApiSettings {
        max_bytes: 100,
        ..settings_for(&server)
    };
    let source = RedditSource::new(settings).unwrap();
    let err = source.fetch_batch().await.unwrap_err();
    assert!(matches!(err.kind, FailureKind::TooLarge { max_bytes: 100, .. }));
}
