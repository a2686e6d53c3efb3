use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use tower::ServiceExt;
use wingbeat::config::Config;

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.auth.signing_key = "integration-test-signing-key".to_string();
    // Fast hashing params; these tests exercise flows, not KDF strength.
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;

    let state = wingbeat::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    wingbeat::api::router(state).await
}

async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::json!({}));
    (status, json)
}

async fn post_json_auth(
    app: &Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::json!({}));
    (status, json)
}

async fn get_json(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    let response = app
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::json!({}));
    (status, json)
}

async fn register(app: &Router, username: &str, is_web: bool) -> serde_json::Value {
    let (status, body) = post_json(
        app,
        "/api/auth/register",
        serde_json::json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "a-strong-password",
            "is_web": is_web,
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], serde_json::json!(true));
    body["data"].clone()
}

#[tokio::test]
async fn test_register_returns_session_and_zero_scores() {
    let app = spawn_app().await;

    let data = register(&app, "ana", true).await;

    assert!(data["access_token"].is_string());
    assert!(data["refresh_token"].is_string());
    assert_eq!(data["user"]["username"], "ana");
    assert_eq!(data["user"]["platform_reach"], 1);
    assert_eq!(data["platform_achievement"], serde_json::json!(false));
    assert_eq!(data["score"]["best_score_solo"], 0);
    assert_eq!(data["score"]["total_games"], 0);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = spawn_app().await;
    register(&app, "ana", true).await;

    // Same username, different email.
    let (status, body) = post_json(
        &app,
        "/api/auth/register",
        serde_json::json!({
            "username": "ana",
            "email": "other@example.com",
            "password": "a-strong-password",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], serde_json::json!(false));

    // Same email, different username.
    let (status, _) = post_json(
        &app,
        "/api/auth/register",
        serde_json::json!({
            "username": "ana2",
            "email": "ana@example.com",
            "password": "a-strong-password",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_and_platform_achievement() {
    let app = spawn_app().await;
    register(&app, "ana", true).await;

    // Wrong password never reveals which part failed.
    let (status, _) = post_json(
        &app,
        "/api/auth/login",
        serde_json::json!({"login": "ana", "password": "wrong", "is_web": true}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // First mobile login after a web registration completes the pair.
    let (status, body) = post_json(
        &app,
        "/api/auth/login",
        serde_json::json!({"login": "ana", "password": "a-strong-password", "is_web": false}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["platform_achievement"], serde_json::json!(true));
    assert_eq!(body["data"]["user"]["platform_reach"], 3);
    assert_eq!(
        body["data"]["score"]["achievements"]["dual_platform"],
        serde_json::json!(true)
    );

    // Grant-once: a repeat login from either platform stays quiet.
    let (_, body) = post_json(
        &app,
        "/api/auth/login",
        serde_json::json!({"login": "ana", "password": "a-strong-password", "is_web": true}),
    )
    .await;
    assert_eq!(body["data"]["platform_achievement"], serde_json::json!(false));
    assert_eq!(body["data"]["user"]["platform_reach"], 3);
}

#[tokio::test]
async fn test_username_uniqueness_ignores_case() {
    let app = spawn_app().await;
    register(&app, "ana", true).await;

    let (status, body) = post_json(
        &app,
        "/api/auth/register",
        serde_json::json!({
            "username": "Ana",
            "email": "other@example.com",
            "password": "a-strong-password",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], serde_json::json!(false));
}

#[tokio::test]
async fn test_login_accepts_differently_cased_username() {
    let app = spawn_app().await;
    register(&app, "ana", true).await;

    let (status, body) = post_json(
        &app,
        "/api/auth/login",
        serde_json::json!({"login": "ANA", "password": "a-strong-password"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Stored casing is what the identity registered with.
    assert_eq!(body["data"]["user"]["username"], "ana");
}

#[tokio::test]
async fn test_login_accepts_email() {
    let app = spawn_app().await;
    register(&app, "ana", false).await;

    let (status, body) = post_json(
        &app,
        "/api/auth/login",
        serde_json::json!({"login": "ana@example.com", "password": "a-strong-password"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["username"], "ana");
}

#[tokio::test]
async fn test_score_flow_requires_bearer_and_merges_monotonically() {
    let app = spawn_app().await;
    let session = register(&app, "ana", true).await;
    let token = session["access_token"].as_str().unwrap();

    let (status, _) = get_json(&app, "/api/score", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = get_json(&app, "/api/score", Some(token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["best_score_solo"], 0);

    let (status, body) = post_json_auth(
        &app,
        "/api/score",
        token,
        serde_json::json!({
            "best_score_solo": 25,
            "best_score_duo": 4,
            "total_flaps": 900,
            "total_gates_cleared": 120,
            "total_games": 14,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["best_score_solo"], 25);

    // A stale lower report cannot regress stored progress.
    let (_, body) = post_json_auth(
        &app,
        "/api/score",
        token,
        serde_json::json!({
            "best_score_solo": 3,
            "best_score_duo": 9,
            "total_flaps": 1,
            "total_gates_cleared": 1,
            "total_games": 1,
        }),
    )
    .await;
    assert_eq!(body["data"]["best_score_solo"], 25);
    assert_eq!(body["data"]["best_score_duo"], 9);
    assert_eq!(body["data"]["total_flaps"], 900);
}

#[tokio::test]
async fn test_achievements_merge() {
    let app = spawn_app().await;
    let session = register(&app, "ana", true).await;
    let token = session["access_token"].as_str().unwrap();

    let (status, body) = post_json_auth(
        &app,
        "/api/achievements",
        token,
        serde_json::json!({"achievements": {"first_flight": true}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["first_flight"], serde_json::json!(true));

    let (_, body) = post_json_auth(
        &app,
        "/api/achievements",
        token,
        serde_json::json!({"achievements": {"gate_master": true}}),
    )
    .await;
    assert_eq!(body["data"]["first_flight"], serde_json::json!(true));
    assert_eq!(body["data"]["gate_master"], serde_json::json!(true));
}

#[tokio::test]
async fn test_refresh_rotates_and_kills_old_pair() {
    let app = spawn_app().await;
    let session = register(&app, "ana", true).await;
    let old_access = session["access_token"].as_str().unwrap().to_string();
    let old_refresh = session["refresh_token"].as_str().unwrap().to_string();

    let (status, body) = post_json(
        &app,
        "/api/auth/refresh",
        serde_json::json!({"access_token": old_access, "refresh_token": old_refresh}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let new_access = body["data"]["access_token"].as_str().unwrap().to_string();
    assert_ne!(new_access, old_access);

    // Old access token no longer authenticates, even though its signature
    // and expiry are still fine.
    let (status, _) = get_json(&app, "/api/score", Some(&old_access)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // And the old pair cannot be refreshed again.
    let (status, _) = post_json(
        &app,
        "/api/auth/refresh",
        serde_json::json!({"access_token": old_access, "refresh_token": old_refresh}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = get_json(&app, "/api/score", Some(&new_access)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_leaderboard_submit_and_public_view() {
    let app = spawn_app().await;
    let session = register(&app, "ana", true).await;
    let token = session["access_token"].as_str().unwrap();

    // Submitting needs a bearer token.
    let (status, _) = post_json(&app, "/api/leaderboard/solo", serde_json::json!({"score": 7})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) =
        post_json_auth(&app, "/api/leaderboard/solo", token, serde_json::json!({"score": 7})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["score"], 7);
    assert_eq!(body["data"]["user_name"], "ana");
    assert_eq!(body["data"]["user_id"], session["user"]["id"]);

    // Reading the board is public.
    let (status, body) = get_json(&app, "/api/leaderboard/solo?top_n=5", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // Entries live in their own mode.
    let (_, body) = get_json(&app, "/api/leaderboard/duo", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    let (status, _) = get_json(&app, "/api/leaderboard/trio", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_account_removal_unknown_email() {
    let app = spawn_app().await;

    let (status, body) = post_json(
        &app,
        "/api/account/remove",
        serde_json::json!({"email": "nobody@example.com"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], serde_json::json!(false));
}

#[tokio::test]
async fn test_auth_me() {
    let app = spawn_app().await;
    let session = register(&app, "ana", true).await;
    let token = session["access_token"].as_str().unwrap();

    let (status, body) = get_json(&app, "/api/auth/me", Some(token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "ana");
    assert_eq!(body["data"]["email"], "ana@example.com");

    let (status, _) = get_json(&app, "/api/auth/me", Some("not-a-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
