use super::spawn_server;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{Method, StatusCode, Uri},
};
use serde_json::{Map, Value, json};
use std::sync::{Arc, Mutex};

const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";
const SESSION_ID: &str = "sess-1";

/// One WebDriver command as seen by the stand-in.
#[derive(Debug, Clone)]
pub struct Command {
    pub method: Method,
    pub path: String,
    pub body: Value,
}

/// Minimal W3C WebDriver endpoint covering the commands the Kite login uses.
#[derive(Clone)]
pub struct MockWebDriver {
    pub commands: Arc<Mutex<Vec<Command>>>,
    pub current_url: String,
    pub fail_navigation: bool,
}

impl MockWebDriver {
    /// The browser always reports `current_url` as its location.
    pub fn at(current_url: &str) -> Self {
        Self {
            commands: Arc::default(),
            current_url: current_url.to_string(),
            fail_navigation: false,
        }
    }

    pub fn failing_navigation() -> Self {
        Self {
            fail_navigation: true,
            ..Self::at("about:blank")
        }
    }

    pub async fn spawn(&self) -> String {
        let app = Router::new().fallback(command).with_state(self.clone());
        let addr = spawn_server(app).await;
        format!("http://{addr}")
    }

    pub fn commands(&self) -> Vec<Command> {
        self.commands.lock().expect("poisoned").clone()
    }

    pub fn session_deleted(&self) -> bool {
        self.commands()
            .iter()
            .any(|c| c.method == Method::DELETE && c.path == format!("/session/{SESSION_ID}"))
    }

    /// Position of the first command matching `method` + `path_suffix`.
    pub fn position(&self, method: Method, path_suffix: &str) -> Option<usize> {
        self.commands()
            .iter()
            .position(|c| c.method == method && c.path.ends_with(path_suffix))
    }

    /// Text typed into the element with the given id.
    pub fn typed_into(&self, element: &str) -> Option<String> {
        let suffix = format!("/element/{element}/value");
        self.commands()
            .iter()
            .find(|c| c.method == Method::POST && c.path.ends_with(&suffix))
            .and_then(|c| c.body.get("text").and_then(Value::as_str).map(str::to_string))
    }
}

fn ok(value: Value) -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "value": value })))
}

fn wd_error(status: StatusCode, error: &str, message: &str) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({
            "value": { "error": error, "message": message, "stacktrace": "" }
        })),
    )
}

/// Element ids are derived from the selector so tests can tell fields apart.
fn element_for(selector: &str) -> Option<&'static str> {
    if selector.contains("userid") {
        Some("el-userid")
    } else if selector.contains("password") {
        Some("el-password")
    } else if selector.contains("totp") {
        Some("el-totp")
    } else if selector.contains("submit") {
        Some("el-submit")
    } else {
        None
    }
}

async fn command(
    State(driver): State<MockWebDriver>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let path = uri.path().to_string();
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    driver.commands.lock().expect("poisoned").push(Command {
        method: method.clone(),
        path: path.clone(),
        body: body.clone(),
    });

    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    match (method.as_str(), segments.as_slice()) {
        ("POST", ["session"]) => ok(json!({
            "sessionId": SESSION_ID,
            "capabilities": { "browserName": "chrome" }
        })),
        ("DELETE", ["session", _]) => ok(Value::Null),
        ("GET", ["session", _, "url"]) => ok(json!(driver.current_url)),
        ("POST", ["session", _, "url"]) if driver.fail_navigation => wd_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "unknown error",
            "net::ERR_NAME_NOT_RESOLVED",
        ),
        ("POST", ["session", _, "url"]) => ok(Value::Null),
        ("POST", ["session", _, "element"]) => {
            let selector = body.get("value").and_then(Value::as_str).unwrap_or_default();
            match element_for(selector) {
                Some(id) => {
                    let mut element = Map::new();
                    element.insert(ELEMENT_KEY.to_string(), json!(id));
                    ok(Value::Object(element))
                }
                None => wd_error(StatusCode::NOT_FOUND, "no such element", selector),
            }
        }
        ("POST", ["session", _, "element", _, "clear" | "click" | "value"]) => {
            ok(Value::Null)
        }
        _ => wd_error(StatusCode::NOT_FOUND, "unknown command", &path),
    }
}
