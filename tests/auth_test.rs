mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use common::{body_json, body_text, session_cookie_of, setup};
use tower::ServiceExt;

#[tokio::test]
async fn test_register_login_and_identify() {
    let app = setup().await;

    assert_eq!(app.register("alice", "password123").await, StatusCode::SEE_OTHER);

    let response = app
        .post_form("/login", "username=alice&password=password123")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");

    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Path=/"));

    let cookie = session_cookie_of(&response).unwrap();
    let (status, json) = app.get_json("/api/user", &cookie).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["username"], "alice");
    assert!(json["id"].as_i64().unwrap() > 0);
    assert!(json.get("session_id").is_none());
}

#[tokio::test]
async fn test_register_redirects_to_login() {
    let app = setup().await;

    let response = app
        .post_form("/register", "username=bob&password=secret1")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login");
}

#[tokio::test]
async fn test_duplicate_username_rejected() {
    let app = setup().await;

    assert_eq!(app.register("alice", "password123").await, StatusCode::SEE_OTHER);

    let response = app
        .post_form("/register", "username=alice&password=another456")
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(body_text(response).await.contains("Username already exists"));

    // The original password still works
    app.login("alice", "password123").await;
}

#[tokio::test]
async fn test_short_credentials_rejected() {
    let app = setup().await;

    let response = app.post_form("/register", "username=ab&password=password123").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("at least 3 characters"));

    assert_eq!(app.register("carol", "12345").await, StatusCode::BAD_REQUEST);

    // Boundary lengths are accepted
    assert_eq!(app.register("abc", "123456").await, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_invalid_login() {
    let app = setup().await;
    app.register("alice", "password123").await;

    let response = app.post_form("/login", "username=alice&password=wrongpass").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie_of(&response).is_none());
    assert!(body_text(response).await.contains("Invalid username or password"));

    let response = app.post_form("/login", "username=nobody&password=password123").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_api_requires_session() {
    let app = setup().await;

    for uri in ["/api/user", "/api/images", "/api/tags", "/api/images/1"] {
        let response = app.get(uri, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        let json = body_json(response).await;
        assert_eq!(json["error"], "Authentication required");
    }

    let response = app
        .get("/api/user", Some("gallery_session=not-a-valid-token"))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bearer_token_accepted() {
    let app = setup().await;
    let cookie = app.register_and_login("alice").await;
    let token = cookie.trim_start_matches("gallery_session=");

    let response = app
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/user")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_gallery_page_redirects_without_session() {
    let app = setup().await;

    let response = app.get("/", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login");

    let cookie = app.register_and_login("alice").await;
    let response = app.get("/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("alice"));
}

#[tokio::test]
async fn test_login_and_register_pages_render() {
    let app = setup().await;

    let response = app.get("/login", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("action=\"/login\""));

    let response = app.get("/register", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("action=\"/register\""));
}

#[tokio::test]
async fn test_logout_revokes_session() {
    let app = setup().await;
    let cookie = app.register_and_login("alice").await;

    let (status, _) = app.get_json("/api/user", &cookie).await;
    assert_eq!(status, StatusCode::OK);

    let response = app.get("/logout", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login");
    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.contains("Max-Age=0"));

    // The token is still well-formed but its session is gone
    let (status, _) = app.get_json("/api/user", &cookie).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_without_session() {
    let app = setup().await;

    let response = app.get("/logout", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login");
}

#[tokio::test]
async fn test_health_and_openapi() {
    let app = setup().await;

    let response = app.get("/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["database"], "connected");

    let response = app.get("/api-docs/openapi.json", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["paths"].get("/upload").is_some());
    assert!(json["paths"].get("/api/images/{id}").is_some());
}
