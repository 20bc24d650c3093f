// tests/common/mod.rs

#![allow(dead_code)]

use std::sync::Arc;

use eco_learn::{
    config::{Config, StoreBackend},
    routes,
    seed::seed_demo_catalog,
    state::AppState,
    store::{MemoryStore, Store},
};
use serde_json::Value;

pub const PASSWORD: &str = "password123";

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub store: Arc<MemoryStore>,
}

pub fn test_config() -> Config {
    Config {
        database_url: None,
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        cors_origins: vec!["http://localhost:5173".to_string()],
        store_backend: StoreBackend::Memory,
        seed_demo_data: false,
        log_dir: "logs".to_string(),
    }
}

pub fn test_state(store: Arc<MemoryStore>) -> AppState {
    let store: Arc<dyn Store> = store;
    AppState::new(store, test_config())
}

/// Spawns the app over a fresh in-memory store on a random port.
pub async fn spawn_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let app = routes::create_router(test_state(store.clone()));

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
        store,
    }
}

/// Same as [`spawn_app`] with the demo catalog loaded.
pub async fn spawn_app_with_catalog() -> TestApp {
    let app = spawn_app().await;
    seed_demo_catalog(app.store.as_ref()).await.unwrap();
    app
}

pub fn unique_email(prefix: &str) -> String {
    format!("{}_{}@eco.test", prefix, &uuid::Uuid::new_v4().to_string()[..8])
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> reqwest::Response {
        let mut request = self.client.post(self.url(path)).json(&body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("Failed to execute request")
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> reqwest::Response {
        let mut request = self.client.get(self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("Failed to execute request")
    }

    pub async fn get_data(&self, path: &str, token: &str) -> Value {
        let response = self.get(path, Some(token)).await;
        assert_eq!(response.status().as_u16(), 200, "GET {path}");
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["success"], true);
        body["data"].clone()
    }

    /// Registers an account and returns `(token, user)`.
    pub async fn register_with(&self, body: Value) -> (String, Value) {
        let response = self.post("/api/auth/register", None, body).await;
        assert_eq!(response.status().as_u16(), 201);
        let body: Value = response.json().await.unwrap();
        let token = body["data"]["token"].as_str().expect("Token not found").to_string();
        (token, body["data"]["user"].clone())
    }

    pub async fn register(&self, name: &str, role: &str) -> (String, Value) {
        self.register_with(serde_json::json!({
            "name": name,
            "email": unique_email(role),
            "password": PASSWORD,
            "role": role,
        }))
        .await
    }

    /// Id of the first module whose title matches.
    pub async fn module_id(&self, token: &str, title: &str) -> i64 {
        let modules = self.get_data("/api/modules", token).await;
        modules
            .as_array()
            .unwrap()
            .iter()
            .find(|m| m["title"] == title)
            .and_then(|m| m["id"].as_i64())
            .unwrap_or_else(|| panic!("module {title} not seeded"))
    }

    pub async fn submit(&self, token: &str, module_id: i64, answers: &[i32]) -> reqwest::Response {
        self.post(
            &format!("/api/modules/{}/submit", module_id),
            Some(token),
            serde_json::json!({ "answers": answers, "timeSpent": 120 }),
        )
        .await
    }
}
