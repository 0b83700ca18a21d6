#![allow(dead_code)]

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::{json, Value};
use taskflow::config::Config;
use taskflow::session::Session;
use taskflow::storage::TokenStore;
use taskflow::AppContext;
use tempfile::TempDir;
use wiremock::MockServer;

pub const USER_ID: &str = "7d3e9a10-user";
pub const EMAIL: &str = "ada@example.com";

/// Unsigned JWT carrying `sub` and `email`; the client never verifies signatures.
pub fn make_token(sub: &str, email: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let claims = URL_SAFE_NO_PAD.encode(json!({ "sub": sub, "email": email, "exp": 4102444800u64 }).to_string());
    format!("{}.{}.sig", header, claims)
}

pub fn session() -> Session {
    Session::from_token(&make_token(USER_ID, EMAIL)).unwrap()
}

/// A context pointed at `server` with its token file in a fresh temp dir.
pub fn context(server: &MockServer) -> (AppContext, TempDir) {
    let tmp = TempDir::new().unwrap();
    let store = TokenStore::new(tmp.path().join("access_token"));
    let config = Config {
        api_url: server.uri(),
        ..Config::default()
    };
    (AppContext::with_store(config, store), tmp)
}

pub fn signed_in_context(server: &MockServer) -> (AppContext, TempDir) {
    let (ctx, tmp) = context(server);
    ctx.auth.store().save(&make_token(USER_ID, EMAIL)).unwrap();
    (ctx, tmp)
}

pub fn task_json(id: i64, title: &str, completed: bool) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": "",
        "completed": completed,
        "priority": "high",
        "due_date": "2030-05-01T12:00:00",
        "is_overdue": false,
        "user_id": USER_ID,
        "created_at": "2025-01-01T10:00:00.123456",
        "updated_at": null
    })
}
