//! Order-management API client.
//!
//! Every authenticated call goes through [`ApiClient::send`], which attaches
//! the stored bearer credential and a JSON content type, then maps the HTTP
//! outcome onto [`ConsoleError`]. Calls are single best-effort attempts: no
//! retry, no timeout, no cancellation.

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::config::normalize_api_url;
use crate::error::{ConsoleError, Result};
use crate::storage::CredentialStore;

/// Longest plain-text error body carried into a message.
const MAX_ERROR_BODY_CHARS: usize = 300;

// ---------------------------------------------------------------------------
// Response interpretation
// ---------------------------------------------------------------------------

/// Pull a human-readable message out of an error body.
fn error_message(status: StatusCode, body: &str) -> String {
    let trimmed = body.trim();
    if let Ok(json) = serde_json::from_str::<Value>(trimmed) {
        let from_json = match &json {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Object(_) => ["message", "error", "title", "detail"]
                .iter()
                .find_map(|k| json.get(*k).and_then(Value::as_str))
                .map(|s| s.trim().to_string()),
            _ => None,
        };
        if let Some(msg) = from_json.filter(|m| !m.is_empty()) {
            return msg;
        }
    } else if !trimmed.is_empty() && !trimmed.starts_with('<') {
        return trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect();
    }

    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()))
}

/// Map a finished HTTP exchange onto the console's result type.
///
/// `204 No Content` and empty success bodies resolve to `Value::Null` without
/// touching the JSON parser.
pub(crate) fn interpret_response(status: StatusCode, body: &str) -> Result<Value> {
    if !status.is_success() {
        return Err(ConsoleError::Request {
            status: status.as_u16(),
            message: error_message(status, body),
        });
    }
    if status == StatusCode::NO_CONTENT || body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| ConsoleError::Response(format!("invalid JSON: {e}")))
}

/// Deserialize a successful response body into a typed model.
pub(crate) fn parse_json<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| ConsoleError::Response(e.to_string()))
}

/// Accept the shapes the login endpoint has been seen to return: a JSON
/// string, an object carrying the token, or the bare token as text.
pub(crate) fn extract_login_token(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    let token = match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::String(s)) => Some(s),
        Ok(obj @ Value::Object(_)) => ["token", "accessToken", "access_token", "jwt"]
            .iter()
            .find_map(|k| obj.get(*k).and_then(Value::as_str))
            .map(str::to_string),
        Ok(_) => None,
        Err(_) => Some(trimmed.to_string()),
    };
    token
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Body of `POST /authentication/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub role: String,
}

impl LoginRequest {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.trim().to_string(),
            password: password.to_string(),
            // The backend ignores this field but requires it to be present.
            role: "string".to_string(),
        }
    }
}

/// Shared HTTP gateway. One per process; cheap to borrow per call.
pub struct ApiClient {
    http: Client,
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
}

impl ApiClient {
    pub fn new(base_url: &str, credentials: Arc<dyn CredentialStore>) -> Result<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| ConsoleError::Network(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: normalize_api_url(base_url),
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Handle for one resource family, e.g. `"orders"`.
    pub fn resource(&self, family: &'static str) -> Resource<'_> {
        Resource {
            client: self,
            family,
        }
    }

    /// Exchange username and password for a credential. Does not store it.
    pub async fn login(&self, request: &LoginRequest) -> Result<String> {
        let url = format!("{}/authentication/login", self.base_url);
        let started = Instant::now();
        let resp = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| network_error(&self.base_url, &e))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| network_error(&self.base_url, &e))?;
        debug!(
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "POST /authentication/login"
        );

        if !status.is_success() {
            let message = error_message(status, &body);
            warn!(status = status.as_u16(), error = %message, "login rejected");
            return Err(ConsoleError::Request {
                status: status.as_u16(),
                message,
            });
        }
        extract_login_token(&body)
            .ok_or_else(|| ConsoleError::Response("login response carried no token".into()))
    }

    /// Perform an authenticated request. `path` is relative to the base URL
    /// and starts with a slash, e.g. `/orders/12/details`.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<Value> {
        let credential = self.credentials.load().ok_or(ConsoleError::AuthMissing)?;
        let url = format!("{}{}", self.base_url, path);

        let mut req = self
            .http
            .request(method.clone(), &url)
            .bearer_auth(&credential)
            .header("Content-Type", "application/json");
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(b) = body {
            req = req.json(&b);
        }

        let started = Instant::now();
        let resp = req
            .send()
            .await
            .map_err(|e| network_error(&self.base_url, &e))?;
        let status = resp.status();
        let text = if status == StatusCode::NO_CONTENT {
            String::new()
        } else {
            resp.text()
                .await
                .map_err(|e| network_error(&self.base_url, &e))?
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let result = interpret_response(status, &text);
        match &result {
            Ok(_) => debug!(%method, path, status = status.as_u16(), elapsed_ms, "api request"),
            Err(e) => warn!(%method, path, status = status.as_u16(), elapsed_ms, error = %e, "api request failed"),
        }
        result
    }
}

/// Convert a `reqwest::Error` into a user-facing message.
fn network_error(base: &str, err: &reqwest::Error) -> ConsoleError {
    let message = if err.is_connect() {
        format!("Cannot reach the order service at {base}")
    } else if err.is_timeout() {
        format!("Connection to {base} timed out")
    } else if err.is_builder() {
        format!("Invalid order service URL: {base}")
    } else {
        format!("Network error communicating with {base}: {err}")
    };
    ConsoleError::Network(message)
}

// ---------------------------------------------------------------------------
// Resource families
// ---------------------------------------------------------------------------

/// Gateway bound to one resource family (`/orders`, `/products`, ...).
#[derive(Clone, Copy)]
pub struct Resource<'a> {
    client: &'a ApiClient,
    family: &'static str,
}

impl<'a> Resource<'a> {
    fn path(&self, suffix: &str) -> String {
        format!("/{}{}", self.family, suffix)
    }

    pub async fn get(&self, suffix: &str, query: &[(&str, String)]) -> Result<Value> {
        self.client
            .send(Method::GET, &self.path(suffix), query, None)
            .await
    }

    pub async fn post<B: Serialize>(
        &self,
        suffix: &str,
        query: &[(&str, String)],
        body: &B,
    ) -> Result<Value> {
        let body = to_body(body)?;
        self.client
            .send(Method::POST, &self.path(suffix), query, Some(body))
            .await
    }

    pub async fn put<B: Serialize>(
        &self,
        suffix: &str,
        query: &[(&str, String)],
        body: &B,
    ) -> Result<Value> {
        let body = to_body(body)?;
        self.client
            .send(Method::PUT, &self.path(suffix), query, Some(body))
            .await
    }

    pub async fn delete(&self, suffix: &str) -> Result<()> {
        self.client
            .send(Method::DELETE, &self.path(suffix), &[], None)
            .await
            .map(|_| ())
    }
}

fn to_body<B: Serialize>(body: &B) -> Result<Value> {
    serde_json::to_value(body).map_err(|e| ConsoleError::validation(format!("Invalid request body: {e}")))
}

// ---------------------------------------------------------------------------
// Loopback HTTP server for tests
// ---------------------------------------------------------------------------


#[cfg(test)]
mod tests {
    use super::test_server::{json, no_content, serve, truncated};
    use super::*;
    use crate::storage::MemoryStore;

    fn client(base: &str, credential: Option<&str>) -> ApiClient {
        let store = match credential {
            Some(c) => MemoryStore::with_credential(c),
            None => MemoryStore::new(),
        };
        ApiClient::new(base, Arc::new(store)).expect("client")
    }

    #[test]
    fn no_content_is_empty_success() {
        let value = interpret_response(StatusCode::NO_CONTENT, "").expect("204 is success");
        assert_eq!(value, Value::Null);
        // Even a stray body on 204 is not parsed.
        let value = interpret_response(StatusCode::NO_CONTENT, "not json").expect("204");
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn error_message_prefers_json_message() {
        let err = interpret_response(
            StatusCode::BAD_REQUEST,
            r#"{"message":"PO number already used"}"#,
        )
        .expect_err("400 fails");
        match err {
            ConsoleError::Request { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "PO number already used");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn error_message_falls_back_to_text_then_reason() {
        let err = interpret_response(StatusCode::CONFLICT, "Store has orders").expect_err("409");
        assert_eq!(err.to_string(), "Store has orders (HTTP 409)");

        let err = interpret_response(StatusCode::NOT_FOUND, "").expect_err("404");
        assert_eq!(err.to_string(), "Not Found (HTTP 404)");

        let err = interpret_response(StatusCode::BAD_GATEWAY, "<html>oops</html>").expect_err("502");
        assert_eq!(err.to_string(), "Bad Gateway (HTTP 502)");
    }

    #[test]
    fn invalid_success_json_is_a_response_error() {
        let err = interpret_response(StatusCode::OK, "{oops").expect_err("bad json");
        assert!(matches!(err, ConsoleError::Response(_)));
    }

    #[test]
    fn login_token_shapes() {
        assert_eq!(extract_login_token(r#""a.b.c""#).as_deref(), Some("a.b.c"));
        assert_eq!(extract_login_token(r#"{"token":"a.b.c"}"#).as_deref(), Some("a.b.c"));
        assert_eq!(extract_login_token("a.b.c\n").as_deref(), Some("a.b.c"));
        assert_eq!(extract_login_token(""), None);
        assert_eq!(extract_login_token("42"), None);
    }

    #[tokio::test]
    async fn missing_credential_fails_before_network() {
        // Port 9 (discard) on loopback: nothing should ever be sent there.
        let api = client("http://127.0.0.1:9/api", None);
        let err = api.resource("orders").get("", &[]).await.expect_err("no credential");
        assert!(matches!(err, ConsoleError::AuthMissing));
    }

    #[tokio::test]
    async fn attaches_bearer_and_json_headers() {
        let (base, server) = serve(vec![json("200 OK", r#"[{"storeId":1,"name":"A"}]"#)]);
        let api = client(&base, Some("aaa.bbb.ccc"));

        let value = api.resource("stores").get("", &[]).await.expect("list stores");
        assert_eq!(value[0]["name"], "A");

        let captured = server.join().expect("server thread");
        assert_eq!(captured[0].request_line, "GET /api/stores HTTP/1.1");
        assert_eq!(captured[0].header("authorization"), Some("Bearer aaa.bbb.ccc"));
        assert_eq!(captured[0].header("content-type"), Some("application/json"));
    }

    #[tokio::test]
    async fn delete_with_no_content_resolves_empty() {
        let (base, server) = serve(vec![no_content()]);
        let api = client(&base, Some("aaa.bbb.ccc"));

        api.resource("stores").delete("/4").await.expect("204 delete succeeds");

        let captured = server.join().expect("server thread");
        assert_eq!(captured[0].request_line, "DELETE /api/stores/4 HTTP/1.1");
    }

    #[tokio::test]
    async fn query_and_body_are_sent() {
        let (base, server) = serve(vec![json("201 Created", r#"{"orderId":55}"#)]);
        let api = client(&base, Some("aaa.bbb.ccc"));

        let value = api
            .resource("orders")
            .post(
                "",
                &[("storeId", "3".to_string()), ("salespersonId", "7".to_string())],
                &serde_json::json!({ "poNumber": "PO-1" }),
            )
            .await
            .expect("create");
        assert_eq!(value["orderId"], 55);

        let captured = server.join().expect("server thread");
        assert_eq!(
            captured[0].request_line,
            "POST /api/orders?storeId=3&salespersonId=7 HTTP/1.1"
        );
        let body: Value = serde_json::from_str(&captured[0].body).expect("json body");
        assert_eq!(body["poNumber"], "PO-1");
    }

    #[tokio::test]
    async fn login_posts_credentials_without_bearer() {
        let (base, server) = serve(vec![json("200 OK", r#""aaa.bbb.ccc""#)]);
        let api = client(&base, None);

        let token = api
            .login(&LoginRequest::new("seller@orderit.app", "secret"))
            .await
            .expect("login");
        assert_eq!(token, "aaa.bbb.ccc");

        let captured = server.join().expect("server thread");
        assert_eq!(captured[0].request_line, "POST /api/authentication/login HTTP/1.1");
        assert_eq!(captured[0].header("authorization"), None);
        let body: Value = serde_json::from_str(&captured[0].body).expect("json body");
        assert_eq!(body["username"], "seller@orderit.app");
        assert_eq!(body["role"], "string");
    }

    #[tokio::test]
    async fn login_rejection_surfaces_status() {
        let (base, server) = serve(vec![json("401 Unauthorized", r#"{"message":"Invalid credentials"}"#)]);
        let api = client(&base, None);
        let err = api
            .login(&LoginRequest::new("x", "y"))
            .await
            .expect_err("rejected");
        assert_eq!(err.to_string(), "Invalid credentials (HTTP 401)");
        server.join().expect("server thread");
    }

    #[tokio::test]
    async fn cut_off_body_is_a_network_error() {
        let (base, server) = serve(vec![truncated("200 OK", r#"[{"storeId":1"#)]);
        let api = client(&base, Some("aaa.bbb.ccc"));

        let err = api.resource("stores").get("", &[]).await.expect_err("body cut off");
        assert!(matches!(err, ConsoleError::Network(_)), "got {err:?}");
        server.join().expect("server thread");
    }

    #[tokio::test]
    async fn cut_off_login_body_is_a_network_error() {
        let (base, server) = serve(vec![truncated("200 OK", r#""aaa.bb"#)]);
        let api = client(&base, None);

        let err = api
            .login(&LoginRequest::new("x", "y"))
            .await
            .expect_err("body cut off");
        assert!(matches!(err, ConsoleError::Network(_)), "got {err:?}");
        server.join().expect("server thread");
    }
}
