use std::net::SocketAddr;
use std::sync::Arc;

use ::common::storage::filesystem::FilesystemAssetStore;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use tempfile::TempDir;

use ozinshe_server::config::{
    AppConfig, AuthConfig, CorsConfig, DatabaseConfig, Platform, ServerConfig, StorageConfig,
};
use ozinshe_server::state::AppState;

pub const ADMIN_EMAIL: &str = "admin@ozinshe.test";
pub const ADMIN_PASSWORD: &str = "admin-password";
pub const JWT_SECRET: &str = "test-secret-for-integration-tests";

/// Upload limits small enough to exceed in a test.
pub const MAX_IMAGE_SIZE: u64 = 64 * 1024;
pub const MAX_VIDEO_SIZE: u64 = 256 * 1024;

/// Smallest bytes that are labelled as the respective types; content is
/// never decoded.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake png body";
pub const MP4_BYTES: &[u8] = b"\x00\x00\x00\x18ftypmp42fake mp4 body";

pub mod routes {
    pub const HEALTH: &str = "/health";
    pub const USERS: &str = "/v1/users";
    pub const PROFILE: &str = "/v1/users/profile";
    pub const PROFILE_PASSWORD: &str = "/v1/users/profile/password";
    pub const SIGN_IN: &str = "/v1/auth/sign-in";
    pub const REFRESH: &str = "/v1/auth/refresh";
    pub const LOGOUT: &str = "/v1/auth/logout";
    pub const ROLES: &str = "/v1/roles";
    pub const GENRES: &str = "/v1/genres";
    pub const AGE_CATEGORIES: &str = "/v1/age-categories";
    pub const TYPES: &str = "/v1/types";
    pub const PROJECTS: &str = "/v1/projects";
    pub const SEARCH: &str = "/v1/projects/search";
    pub const IMAGES: &str = "/v1/projects/images";
    pub const VIDEOS: &str = "/v1/projects/videos";

    pub fn user(id: i32) -> String {
        format!("/v1/users/{id}")
    }

    pub fn role(id: i32) -> String {
        format!("/v1/roles/{id}")
    }

    pub fn genre(id: i32) -> String {
        format!("/v1/genres/{id}")
    }

    pub fn age_category(id: i32) -> String {
        format!("/v1/age-categories/{id}")
    }

    pub fn project_type(id: i32) -> String {
        format!("/v1/types/{id}")
    }

    pub fn project(id: i32) -> String {
        format!("/v1/projects/{id}")
    }

    pub fn cover(project_id: i32) -> String {
        format!("/v1/projects/{project_id}/cover")
    }

    pub fn image(id: &str) -> String {
        format!("/v1/projects/images/{id}")
    }

    pub fn show_image(id: &str) -> String {
        format!("/v1/projects/images/show/{id}")
    }

    pub fn video(id: &str) -> String {
        format!("/v1/projects/videos/{id}")
    }

    pub fn play_video(id: &str) -> String {
        format!("/v1/projects/videos/play/{id}")
    }
}

/// A running test server backed by a fresh SQLite file and upload
/// directories inside a temp dir.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
    pub dir: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Raw response body.
    pub bytes: Vec<u8>,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
    pub headers: reqwest::header::HeaderMap,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());

        let app_config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors: CorsConfig {
                    allow_origins: vec![],
                    max_age: 3600,
                },
            },
            database: DatabaseConfig {
                url: db_url.clone(),
            },
            platform: Platform::Hosted,
            storage: StorageConfig {
                images_dir: dir.path().join("images"),
                videos_dir: dir.path().join("videos"),
                max_image_size: MAX_IMAGE_SIZE,
                max_video_size: MAX_VIDEO_SIZE,
            },
            auth: AuthConfig {
                jwt_secret: JWT_SECRET.to_string(),
                access_token_ttl_secs: 24 * 60 * 60,
                refresh_token_ttl_secs: 60 * 24 * 60 * 60,
                admin_email: Some(ADMIN_EMAIL.to_string()),
                admin_password: Some(ADMIN_PASSWORD.to_string()),
            },
        };

        let db = ozinshe_server::database::init_db(&db_url, app_config.platform)
            .await
            .expect("Failed to initialize test database");
        ozinshe_server::seed::seed_roles(&db)
            .await
            .expect("Failed to seed roles");
        ozinshe_server::seed::seed_admin(&db, &app_config.auth)
            .await
            .expect("Failed to seed admin");

        let images = FilesystemAssetStore::new(
            app_config.storage.images_dir.clone(),
            app_config.storage.max_image_size,
        )
        .await
        .expect("Failed to create image store");
        let videos = FilesystemAssetStore::new(
            app_config.storage.videos_dir.clone(),
            app_config.storage.max_video_size,
        )
        .await
        .expect("Failed to create video store");

        let state = AppState {
            db: db.clone(),
            config: app_config,
            images: Arc::new(images),
            videos: Arc::new(videos),
        };

        let app = ozinshe_server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().expect("Failed to get local address");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server error");
        });

        Self {
            addr,
            client: Client::new(),
            db,
            dir,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Number of stored files in an upload directory, ignoring the temp dir.
    pub fn stored_files(&self, kind: &str) -> usize {
        std::fs::read_dir(self.dir.path().join(kind))
            .expect("Failed to read upload dir")
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name() != ".tmp")
            .count()
    }

    pub async fn post_without_token(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn post_with_token(&self, path: &str, body: &Value, token: &str) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn get_without_token(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn get_with_token(&self, path: &str, token: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn get_with_header(&self, path: &str, authorization: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .header("Authorization", authorization)
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn put_with_token(&self, path: &str, body: &Value, token: &str) -> TestResponse {
        let res = self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("Failed to send PUT request");

        TestResponse::from_response(res).await
    }

    pub async fn patch_with_token(&self, path: &str, body: &Value, token: &str) -> TestResponse {
        let res = self
            .client
            .patch(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("Failed to send PATCH request");

        TestResponse::from_response(res).await
    }

    pub async fn delete_with_token(&self, path: &str, token: &str) -> TestResponse {
        let res = self
            .client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to send DELETE request");

        TestResponse::from_response(res).await
    }

    /// Send a multipart form with one file part plus text parts.
    pub async fn upload_with_token(
        &self,
        path: &str,
        file_field: &str,
        file: (&str, &str, &[u8]),
        fields: &[(&str, String)],
        token: &str,
    ) -> TestResponse {
        let (file_name, mime, bytes) = file;
        let part = Part::bytes(bytes.to_vec())
            .file_name(file_name.to_string())
            .mime_str(mime)
            .expect("Failed to set MIME type");

        let mut form = Form::new();
        for (name, value) in fields {
            form = form.text(name.to_string(), value.clone());
        }
        let form = form.part(file_field.to_string(), part);

        let res = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .expect("Failed to send multipart upload request");

        TestResponse::from_response(res).await
    }

    pub async fn upload_image(&self, project_id: i32, token: &str) -> TestResponse {
        self.upload_with_token(
            routes::IMAGES,
            "image",
            ("poster.png", "image/png", PNG_BYTES),
            &[("project_id", project_id.to_string())],
            token,
        )
        .await
    }

    pub async fn upload_video(&self, project_id: i32, token: &str) -> TestResponse {
        self.upload_with_token(
            routes::VIDEOS,
            "video",
            ("episode.mp4", "video/mp4", MP4_BYTES),
            &[
                ("project_id", project_id.to_string()),
                ("season", "2".to_string()),
                ("episode", "5".to_string()),
            ],
            token,
        )
        .await
    }

    /// Sign in and return the full token response.
    pub async fn sign_in(&self, email: &str, password: &str) -> TestResponse {
        self.post_without_token(routes::SIGN_IN, &json!({"email": email, "password": password}))
            .await
    }

    /// Sign in as the seeded administrator and return the access token.
    pub async fn admin_token(&self) -> String {
        let res = self.sign_in(ADMIN_EMAIL, ADMIN_PASSWORD).await;
        assert_eq!(res.status, 200, "Admin sign-in failed: {}", res.text);
        res.access_token()
    }

    /// Id of the seeded administrator.
    pub async fn admin_id(&self) -> i32 {
        let token = self.admin_token().await;
        self.get_with_token(routes::PROFILE, &token).await.id()
    }

    /// Register a user and return their id.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> i32 {
        let res = self
            .post_without_token(
                routes::USERS,
                &json!({"name": name, "email": email, "password": password}),
            )
            .await;
        assert_eq!(res.status, 201, "Registration failed: {}", res.text);
        res.id()
    }

    /// Register a user, sign in and return `(user_id, access_token)`.
    pub async fn create_authenticated_user(&self, email: &str) -> (i32, String) {
        let id = self.register("Test User", email, "securepass").await;
        let res = self.sign_in(email, "securepass").await;
        assert_eq!(res.status, 200, "Sign-in failed: {}", res.text);
        (id, res.access_token())
    }

    /// Create a lookup entry (genre, age category or type) and return its id.
    pub async fn create_lookup(&self, path: &str, title: &str, token: &str) -> i32 {
        let res = self
            .post_with_token(path, &json!({"title": title}), token)
            .await;
        assert_eq!(res.status, 201, "create {path} failed: {}", res.text);
        res.id()
    }

    /// Create a role with the same level on every family and return its id.
    pub async fn create_role(&self, title: &str, level: i32, token: &str) -> i32 {
        let res = self
            .post_with_token(routes::ROLES, &role_body(title, level), token)
            .await;
        assert_eq!(res.status, 201, "create_role failed: {}", res.text);
        res.id()
    }

    /// Create a project via the API and return its id.
    pub async fn create_project(
        &self,
        token: &str,
        title: &str,
        type_id: i32,
        genre_ids: &[i32],
        age_category_ids: &[i32],
    ) -> i32 {
        let res = self
            .post_with_token(
                routes::PROJECTS,
                &project_body(title, type_id, genre_ids, age_category_ids),
                token,
            )
            .await;
        assert_eq!(res.status, 201, "create_project failed: {}", res.text);
        res.id()
    }
}

pub fn role_body(title: &str, level: i32) -> Value {
    json!({
        "title": title,
        "projects": level,
        "genres": level,
        "age_categories": level,
        "types": level,
        "users": level,
        "roles": level,
    })
}

pub fn project_body(title: &str, type_id: i32, genre_ids: &[i32], age_category_ids: &[i32]) -> Value {
    json!({
        "title": title,
        "description": format!("About {title}"),
        "type_id": type_id,
        "duration_in_mins": 90,
        "release_year": 2020,
        "director": "Director",
        "producer": "Producer",
        "keywords": "steppe, history",
        "genre_ids": genre_ids,
        "age_category_ids": age_category_ids,
    })
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let headers = res.headers().clone();
        let bytes = res.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        Self {
            status,
            text,
            bytes,
            body,
            headers,
        }
    }

    pub fn id(&self) -> i32 {
        self.body["id"]
            .as_i64()
            .expect("response body should contain 'id'") as i32
    }

    pub fn asset_id(&self) -> String {
        self.body["id"]
            .as_str()
            .expect("response body should contain a string 'id'")
            .to_string()
    }

    pub fn access_token(&self) -> String {
        self.body["access_token"]
            .as_str()
            .expect("response should contain an access_token")
            .to_string()
    }

    pub fn refresh_token(&self) -> String {
        self.body["refresh_token"]
            .as_str()
            .expect("response should contain a refresh_token")
            .to_string()
    }

    pub fn header(&self, name: &str) -> &str {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    /// Ids of the objects in a JSON array field, in order.
    pub fn ids_of(&self, field: &str) -> Vec<i64> {
        self.body[field]
            .as_array()
            .map(|items| items.iter().filter_map(|i| i["id"].as_i64()).collect())
            .unwrap_or_default()
    }
}
