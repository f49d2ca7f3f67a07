use serde_json::Value;
use std::sync::Mutex;
use tauri::Emitter;
use tracing::warn;

use super::{end_session, lock, sync_router, SESSION_CHANGED_EVENT};
use crate::api::ApiClient;
use crate::navigation::Router;
use crate::order_draft::OrderDraft;
use crate::session::{SessionController, SessionSnapshot};
use crate::views::ViewState;

/// Extract `(username, password)` from the login form payload, which may
/// use `username` or `email` for the user name.
fn parse_login_payload(payload: &Value) -> Option<(String, String)> {
    let username = ["username", "email", "userName"]
        .iter()
        .find_map(|k| payload.get(*k).and_then(Value::as_str))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())?;
    let password = payload.get("password").and_then(Value::as_str)?.to_string();
    Some((username, password))
}

#[tauri::command]
pub async fn auth_login(
    arg0: Option<Value>,
    app: tauri::AppHandle,
    api: tauri::State<'_, ApiClient>,
    session: tauri::State<'_, SessionController>,
    router: tauri::State<'_, Mutex<Router>>,
    draft: tauri::State<'_, Mutex<OrderDraft>>,
    views: tauri::State<'_, Mutex<ViewState>>,
) -> Result<SessionSnapshot, String> {
    let (username, password) = arg0
        .as_ref()
        .and_then(parse_login_payload)
        .ok_or("Username and password are required")?;

    session
        .login(&api, &username, &password)
        .await
        .map_err(|e| e.to_string())?;

    sync_router(&session, &router)?;
    lock(&router)?.reset();
    lock(&draft)?.clear();
    lock(&views)?.reset();

    let snapshot = session.snapshot();
    if let Err(e) = app.emit(SESSION_CHANGED_EVENT, &snapshot) {
        warn!(error = %e, "failed to emit session change");
    }
    Ok(snapshot)
}

#[tauri::command]
pub async fn auth_logout(
    app: tauri::AppHandle,
    session: tauri::State<'_, SessionController>,
    router: tauri::State<'_, Mutex<Router>>,
    draft: tauri::State<'_, Mutex<OrderDraft>>,
    views: tauri::State<'_, Mutex<ViewState>>,
) -> Result<(), String> {
    end_session(&app, &session, &router, &draft, &views)
}

#[tauri::command]
pub async fn auth_get_session(
    session: tauri::State<'_, SessionController>,
) -> Result<SessionSnapshot, String> {
    Ok(session.snapshot())
}
