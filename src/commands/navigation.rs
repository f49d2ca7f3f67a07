use serde::Serialize;
use std::sync::Mutex;

use super::{end_session, lock, sync_router};
use crate::navigation::{NavigationEntry, NavigationOutcome, Router};
use crate::order_draft::OrderDraft;
use crate::session::SessionController;
use crate::views::ViewState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentPage {
    pathname: String,
    title: &'static str,
}

#[tauri::command]
pub async fn nav_get_menu(
    session: tauri::State<'_, SessionController>,
    router: tauri::State<'_, Mutex<Router>>,
) -> Result<Vec<NavigationEntry>, String> {
    sync_router(&session, &router)?;
    Ok(lock(&router)?.menu().to_vec())
}

#[tauri::command]
pub async fn nav_navigate(
    path: String,
    app: tauri::AppHandle,
    session: tauri::State<'_, SessionController>,
    router: tauri::State<'_, Mutex<Router>>,
    draft: tauri::State<'_, Mutex<OrderDraft>>,
    views: tauri::State<'_, Mutex<ViewState>>,
) -> Result<NavigationOutcome, String> {
    sync_router(&session, &router)?;
    let outcome = lock(&router)?.navigate(&path);
    if outcome == NavigationOutcome::Logout {
        end_session(&app, &session, &router, &draft, &views)?;
    }
    Ok(outcome)
}

#[tauri::command]
pub async fn nav_get_current(
    router: tauri::State<'_, Mutex<Router>>,
) -> Result<CurrentPage, String> {
    let router = lock(&router)?;
    Ok(CurrentPage {
        pathname: router.pathname().to_string(),
        title: router.title(),
    })
}
