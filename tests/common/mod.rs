#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use http_body_util::BodyExt;
use image_gallery::config::AppConfig;
use image_gallery::infrastructure::{database, storage};
use image_gallery::{AppState, create_app};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use std::path::PathBuf;
use tempfile::TempDir;
use tower::ServiceExt;

pub const BOUNDARY: &str = "---------------------------gallerytestboundary";

pub struct TestApp {
    pub app: Router,
    pub db: DatabaseConnection,
    pub upload_dir: PathBuf,
    pub config: AppConfig,
    // Keeps the database file and upload directory alive for the test
    _dir: TempDir,
}

pub async fn setup() -> TestApp {
    let dir = TempDir::new().unwrap();
    let upload_dir = dir.path().join("uploads");

    let mut config = AppConfig::development();
    config.database_url = format!("sqlite://{}?mode=rwc", dir.path().join("gallery.db").display());
    config.upload_dir = upload_dir.clone();

    let db = database::setup_database(&config.database_url).await.unwrap();
    let storage_service = storage::setup_storage(&upload_dir).await.unwrap();

    let state = AppState::new(db.clone(), storage_service, config.clone());

    TestApp {
        app: create_app(state),
        db,
        upload_dir,
        config,
        _dir: dir,
    }
}

impl TestApp {
    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(req).await.unwrap()
    }

    pub async fn post_form(&self, uri: &str, body: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn register(&self, username: &str, password: &str) -> StatusCode {
        self.post_form(
            "/register",
            &format!("username={username}&password={password}"),
        )
        .await
        .status()
    }

    /// Logs in and returns the `name=value` pair to send back as `Cookie`.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .post_form("/login", &format!("username={username}&password={password}"))
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        session_cookie_of(&response).expect("login did not set a session cookie")
    }

    pub async fn register_and_login(&self, username: &str) -> String {
        assert_eq!(self.register(username, "password123").await, StatusCode::SEE_OTHER);
        self.login(username, "password123").await
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn get_json(&self, uri: &str, cookie: &str) -> (StatusCode, Value) {
        let response = self.get(uri, Some(cookie)).await;
        let status = response.status();
        (status, body_json(response).await)
    }

    pub async fn put_json(&self, uri: &str, cookie: &str, body: Value) -> (StatusCode, Value) {
        let response = self
            .send(
                Request::builder()
                    .method("PUT")
                    .uri(uri)
                    .header(header::COOKIE, cookie)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await;
        let status = response.status();
        (status, body_json(response).await)
    }

    /// PUT with an arbitrary body and optional content type.
    pub async fn put_raw(
        &self,
        uri: &str,
        cookie: &str,
        content_type: Option<&str>,
        body: &str,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("PUT")
            .uri(uri)
            .header(header::COOKIE, cookie);
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        let response = self
            .send(builder.body(Body::from(body.to_string())).unwrap())
            .await;
        let status = response.status();
        (status, body_json(response).await)
    }

    pub async fn delete(&self, uri: &str, cookie: &str) -> (StatusCode, Value) {
        let response = self
            .send(
                Request::builder()
                    .method("DELETE")
                    .uri(uri)
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        let status = response.status();
        (status, body_json(response).await)
    }

    pub async fn upload(&self, cookie: &str, form: UploadParts<'_>) -> (StatusCode, Value) {
        let response = self
            .send(
                Request::builder()
                    .method("POST")
                    .uri("/upload")
                    .header(header::COOKIE, cookie)
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={BOUNDARY}"),
                    )
                    .body(Body::from(form.to_body()))
                    .unwrap(),
            )
            .await;
        let status = response.status();
        (status, body_json(response).await)
    }

    /// Uploads a small PNG and returns the new image id.
    pub async fn upload_image(&self, cookie: &str, title: &str, description: &str, tags: &str) -> i64 {
        let (status, json) = self
            .upload(
                cookie,
                UploadParts {
                    file: Some(("photo.png", &b"\x89PNG fake image bytes"[..])),
                    title: Some(title),
                    description: Some(description),
                    tags: Some(tags),
                },
            )
            .await;
        assert_eq!(status, StatusCode::OK, "upload failed: {json}");
        json["id"].as_i64().unwrap()
    }

    pub fn stored_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.upload_dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| !n.starts_with('.'))
            .collect();
        names.sort();
        names
    }
}

#[derive(Default)]
pub struct UploadParts<'a> {
    pub file: Option<(&'a str, &'a [u8])>,
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub tags: Option<&'a str>,
}

impl UploadParts<'_> {
    pub fn to_body(&self) -> Vec<u8> {
        let mut body = Vec::new();

        if let Some((filename, data)) = self.file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }

        for (name, value) in [
            ("title", self.title),
            ("description", self.description),
            ("tags", self.tags),
        ] {
            if let Some(value) = value {
                body.extend_from_slice(
                    format!(
                        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                    )
                    .as_bytes(),
                );
            }
        }

        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }
}

pub fn session_cookie_of(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .find(|pair| pair.starts_with("gallery_session=") && pair.len() > "gallery_session=".len())
        .map(str::to_string)
}

pub async fn body_json(response: Response<Body>) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    if body.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&body).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()))
}

pub async fn body_text(response: Response<Body>) -> String {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&body).into_owned()
}
