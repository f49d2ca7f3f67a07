//! Tauri IPC commands.
//!
//! Commands return `Result<T, String>`; the frontend shows the error text as
//! a blocking notice. Shared state lives behind `std::sync::Mutex`, so a
//! command never keeps a guard across an `.await`: take what the request
//! needs, release, await, then lock again to apply the result.

use std::sync::{Mutex, MutexGuard};
use tauri::Emitter;
use tracing::warn;

use crate::navigation::Router;
use crate::order_draft::OrderDraft;
use crate::session::SessionController;
use crate::views::ViewState;

pub mod auth;
pub mod diagnostics;
pub mod draft;
pub mod navigation;
pub mod orders;
pub mod products;
pub mod stores;
pub mod views;

/// Emitted with the new session snapshot after login and logout.
pub(crate) const SESSION_CHANGED_EVENT: &str = "session_changed";

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, String> {
    mutex.lock().map_err(|e| e.to_string())
}

/// Bring the router's menu in line with the current session role.
pub(crate) fn sync_router(session: &SessionController, router: &Mutex<Router>) -> Result<(), String> {
    lock(router)?.set_role(session.role(), session.is_authenticated());
    Ok(())
}

pub(crate) fn salesperson_id(session: &SessionController) -> Result<i64, String> {
    session
        .salesperson_id()
        .ok_or_else(|| crate::error::ConsoleError::AuthMissing.to_string())
}

/// Logout transition shared by `auth_logout` and navigating to `/logout`.
pub(crate) fn end_session(
    app: &tauri::AppHandle,
    session: &SessionController,
    router: &Mutex<Router>,
    draft: &Mutex<OrderDraft>,
    views: &Mutex<ViewState>,
) -> Result<(), String> {
    let cleared = session.logout();
    {
        let mut router = lock(router)?;
        router.set_role(None, false);
        router.reset();
    }
    lock(draft)?.clear();
    lock(views)?.reset();
    if let Err(e) = app.emit(SESSION_CHANGED_EVENT, session.snapshot()) {
        warn!(error = %e, "failed to emit session change");
    }
    cleared.map_err(|e| e.to_string())
}
