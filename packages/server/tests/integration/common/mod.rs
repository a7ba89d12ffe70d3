use std::net::SocketAddr;

use reqwest::Client;
use chrono::{Duration, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde_json::{Value, json};
use tempfile::TempDir;

use voting_server::config::{AppConfig, AuthConfig, CorsConfig, DatabaseConfig, ServerConfig};
use voting_server::entity::{session, user, vote};
use voting_server::state::AppState;

pub const ADMIN_PASSWORD: &str = "admin123";
pub const COOKIE_NAME: &str = "voting_session";

pub mod routes {
    pub const HEALTH: &str = "/api/health";
    pub const REGISTER: &str = "/api/register";
    pub const LOGIN: &str = "/api/login";
    pub const LOGOUT: &str = "/api/logout";
    pub const ME: &str = "/api/me";
    pub const CANDIDATES: &str = "/api/candidates";
    pub const VOTE: &str = "/api/vote";
    pub const ADMIN_LOGIN: &str = "/api/admin/login";
    pub const ADMIN_CANDIDATES: &str = "/api/admin/candidates";
    pub const ADMIN_VOTES: &str = "/api/admin/votes";
    pub const OPENAPI: &str = "/api-docs/openapi.json";
}

/// A running test server backed by its own SQLite file.
pub struct TestApp {
    pub addr: SocketAddr,
    pub db: DatabaseConnection,
    _dir: TempDir,
}

/// One browser: a client with its own cookie jar.
pub struct TestSession {
    pub client: Client,
    base: String,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Spawn with `configure` applied to the test config before startup.
    pub async fn spawn_with(configure: impl FnOnce(&mut AppConfig)) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_url = format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("voting.db").display()
        );

        let mut app_config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors: CorsConfig {
                    allow_origins: vec!["http://localhost:3000".to_string()],
                    max_age: 3600,
                },
            },
            database: DatabaseConfig {
                url: db_url,
                max_connections: 5,
                min_connections: 1,
            },
            auth: AuthConfig {
                admin_password: ADMIN_PASSWORD.to_string(),
                session_ttl_secs: 3600,
                cookie_name: COOKIE_NAME.to_string(),
                secure_cookie: false,
            },
        };
        configure(&mut app_config);

        let db = voting_server::database::init_db(&app_config.database)
            .await
            .expect("Failed to initialize test database");

        let state = AppState {
            db: db.clone(),
            config: app_config,
        };

        let app = voting_server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            db,
            _dir: dir,
        }
    }

    /// Open a fresh browser session with an empty cookie jar.
    pub fn session(&self) -> TestSession {
        TestSession {
            client: Client::builder()
                .cookie_store(true)
                .build()
                .expect("Failed to build HTTP client"),
            base: format!("http://{}", self.addr),
        }
    }

    /// Register `username` and return a session logged in as that user.
    pub async fn logged_in_user(&self, username: &str, password: &str) -> TestSession {
        let session = self.session();
        session.register(username, password).await;

        let res = session
            .post(
                routes::LOGIN,
                &json!({"username": username, "password": password}),
            )
            .await;
        assert_eq!(res.status, 200, "Login failed: {}", res.text);
        session
    }

    /// Return a session carrying only the admin flag.
    pub async fn admin(&self) -> TestSession {
        let session = self.session();
        session.admin_login().await;
        session
    }

    /// Create a candidate through an admin session and return its `id`.
    pub async fn create_candidate(&self, admin: &TestSession, name: &str) -> i32 {
        let res = admin
            .post(routes::ADMIN_CANDIDATES, &candidate_body(name))
            .await;
        assert_eq!(res.status, 201, "create_candidate failed: {}", res.text);
        res.id()
    }

    pub async fn user_id(&self, username: &str) -> i32 {
        user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .expect("DB query failed")
            .expect("User not found")
            .id
    }

    pub async fn votes_of(&self, user_id: i32) -> Vec<vote::Model> {
        vote::Entity::find()
            .filter(vote::Column::UserId.eq(user_id))
            .all(&self.db)
            .await
            .expect("DB query failed")
    }

    pub async fn sessions_of(&self, user_id: i32) -> Vec<session::Model> {
        session::Entity::find()
            .filter(session::Column::UserId.eq(user_id))
            .all(&self.db)
            .await
            .expect("DB query failed")
    }

    /// Move the expiry of every session held by `user_id` into the past.
    pub async fn expire_sessions_of(&self, user_id: i32) {
        session::Entity::update_many()
            .col_expr(
                session::Column::ExpiresAt,
                Expr::value(Utc::now() - Duration::minutes(1)),
            )
            .filter(session::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .expect("DB update failed");
    }
}

impl TestSession {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn post_empty(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn register(&self, username: &str, password: &str) {
        let res = self
            .post(
                routes::REGISTER,
                &json!({
                    "username": username,
                    "password": password,
                    "confirmPassword": password,
                }),
            )
            .await;
        assert_eq!(res.status, 201, "Registration failed: {}", res.text);
    }

    pub async fn admin_login(&self) {
        let res = self
            .post(routes::ADMIN_LOGIN, &json!({"password": ADMIN_PASSWORD}))
            .await;
        assert_eq!(res.status, 200, "Admin login failed: {}", res.text);
    }

    pub async fn vote(&self, candidate_id: i32) -> TestResponse {
        self.post(routes::VOTE, &json!({"candidateId": candidate_id}))
            .await
    }
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }

    pub fn id(&self) -> i32 {
        self.body["id"]
            .as_i64()
            .expect("response body should contain 'id'") as i32
    }
}

pub fn candidate_body(name: &str) -> Value {
    json!({
        "name": name,
        "photoUrl": format!("https://example.com/{name}.jpg"),
        "gender": "M",
        "age": 30,
        "description": format!("{name} for president"),
    })
}
