mod common;

use axum::http::StatusCode;
use common::spawn_app;
use serde_json::json;

fn registration(email: &str, user_name: &str) -> serde_json::Value {
    json!({
        "email": email,
        "user_name": user_name,
        "organization": "Geodesy Lab",
        "password": "hunter22",
        "password2": "hunter22"
    })
}

#[tokio::test]
async fn registration_creates_inactive_account() {
    let app = spawn_app().await;

    let (status, body) = app
        .post_json(
            "/api/users/register/",
            registration("Ann@Example.ORG", "ann"),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["message"], "User created successfully");
    assert_eq!(body["user"]["email"], "Ann@example.org");
    assert_eq!(body["user"]["is_active"], false);
    assert_eq!(body["user"]["is_staff"], false);
    assert!(body["user"].get("password").is_none());

    // inactive accounts cannot log in
    let (status, body) = app
        .post_json(
            "/api/token/",
            json!({"email": "Ann@example.org", "password": "hunter22"}),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["detail"],
        "No active account found with the given credentials"
    );
}

#[tokio::test]
async fn registration_rejects_bad_input() {
    let app = spawn_app().await;

    let mut mismatch = registration("a@example.org", "a");
    mismatch["password2"] = json!("other");
    let (status, body) = app.post_json("/api/users/register/", mismatch, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Passwords don't match");

    let mut numeric = registration("n@example.org", "n");
    numeric["password2"] = json!(12345);
    let (status, body) = app.post_json("/api/users/register/", numeric, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{body}");

    let (status, _) = app
        .post_json("/api/users/register/", registration("not-an-email", "b"), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post_json("/api/users/register/", registration("c@example.org", "c"), None)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app
        .post_json("/api/users/register/", registration("c@example.org", "c2"), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app
        .post_json("/api/users/register/", registration("d@example.org", "c"), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn profile_requires_a_valid_access_token() {
    let app = spawn_app().await;

    let (status, _) = app.get("/api/users/me/", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/api/users/me/", Some("garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, token) = app.user_with_token("bob@example.org", false).await;
    let (status, body) = app.get("/api/users/me/", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "bob@example.org");
    assert_eq!(body["user_name"], "bob");
}

#[tokio::test]
async fn refresh_token_issues_new_access_token() {
    let app = spawn_app().await;
    app.user_with_token("eve@example.org", false).await;

    let (status, pair) = app
        .post_json(
            "/api/token/",
            json!({"email": "eve@example.org", "password": "s3cret-pass"}),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post_json(
            "/api/token/refresh/",
            json!({"refresh": pair["refresh"]}),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let access = body["access"].as_str().unwrap();
    let (status, _) = app.get("/api/users/me/", Some(access)).await;
    assert_eq!(status, StatusCode::OK);

    // an access token is not accepted as a refresh token
    let (status, _) = app
        .post_json("/api/token/refresh/", json!({"refresh": pair["access"]}), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn user_admin_endpoints_require_staff() {
    let app = spawn_app().await;
    let (user_id, user_token) = app.user_with_token("user@example.org", false).await;
    let (_, admin_token) = app.user_with_token("admin@example.org", true).await;

    let (status, _) = app.get("/api/users/users/", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.get("/api/users/users/", Some(&user_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.get("/api/users/users/", Some(&admin_token)).await;
    assert_eq!(status, StatusCode::OK);
    let emails: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["email"].as_str().unwrap())
        .collect();
    assert_eq!(emails, ["admin@example.org", "user@example.org"]);

    let (status, body) = app
        .get(&format!("/api/users/users/{user_id}/"), Some(&admin_token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "user@example.org");

    let (status, body) = app.get("/api/users/users/9999/", Some(&admin_token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn staff_can_deactivate_users() {
    let app = spawn_app().await;
    let (user_id, user_token) = app.user_with_token("carl@example.org", false).await;
    let (_, admin_token) = app.user_with_token("root@example.org", true).await;

    let (status, body) = app
        .patch_json(
            &format!("/api/users/users/{user_id}/"),
            json!({"is_active": false}),
            &admin_token,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_active"], false);
    assert_eq!(body["is_staff"], false);

    // the deactivated user's token stops working
    let (status, _) = app.get("/api/users/me/", Some(&user_token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
