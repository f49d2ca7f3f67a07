//! OrderIt Console - order management backend
//!
//! Owns the session, role-based navigation, the order draft and every call
//! to the order-management REST API. With the `desktop` feature the crate
//! also provides the Tauri v2 shell whose IPC commands the web frontend
//! calls via `@tauri-apps/api/core::invoke()`. Without it the library runs
//! headless.

use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod api;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod models;
pub mod navigation;
pub mod order_draft;
pub mod orders;
pub mod products;
pub mod session;
pub mod storage;
pub mod stores;
pub mod token;
pub mod views;

#[cfg(feature = "desktop")]
mod commands;

pub use api::ApiClient;
pub use config::ConsoleConfig;
pub use error::{ConsoleError, Result};
pub use session::SessionController;

const DEFAULT_LOG_FILTER: &str = "info,orderit_console_lib=debug";

/// Initialize structured logging (console + daily rolling file).
///
/// Old log files are pruned first. Calling this twice is harmless: the
/// second subscriber is simply not installed.
pub fn init_logging(config: &ConsoleConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    diagnostics::prune_old_logs(config);

    let log_dir = diagnostics::get_log_dir(config);
    std::fs::create_dir_all(&log_dir).ok();

    let file_appender = tracing_appender::rolling::daily(&log_dir, diagnostics::LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);
    let console_layer = fmt::layer().with_target(true);
    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .is_ok();

    if installed {
        // Dropping the guard flushes and stops the writer; the app logs until exit.
        std::mem::forget(guard);
        info!(log_dir = %log_dir.display(), "logging initialized");
    }
}

#[cfg(feature = "desktop")]
pub fn run() {
    use std::sync::{Arc, Mutex};

    use navigation::Router;
    use order_draft::OrderDraft;
    use storage::{CredentialStore, KeyringStore};
    use views::ViewState;

    let config = ConsoleConfig::from_env();
    init_logging(&config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        git_sha = env!("BUILD_GIT_SHA"),
        built = env!("BUILD_TIMESTAMP"),
        api_url = %config.api_url,
        "Starting OrderIt Console"
    );

    tauri::Builder::default()
        .setup(move |app| {
            use tauri::Manager;

            let credentials: Arc<dyn CredentialStore> = Arc::new(KeyringStore::new());
            let api = ApiClient::new(&config.api_url, credentials.clone())?;

            let session = SessionController::new(credentials);
            session.bootstrap();
            let router = Router::new(session.role());
            info!(api_url = %api.base_url(), "API client ready");

            app.manage(api);
            app.manage(session);
            app.manage(Mutex::new(router));
            app.manage(Mutex::new(OrderDraft::new()));
            app.manage(Mutex::new(ViewState::default()));

            info!("Session, navigation and API client registered");
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Session
            commands::auth::auth_login,
            commands::auth::auth_logout,
            commands::auth::auth_get_session,
            // Navigation
            commands::navigation::nav_get_menu,
            commands::navigation::nav_navigate,
            commands::navigation::nav_get_current,
            // Order composition
            commands::draft::draft_get,
            commands::draft::draft_add_line,
            commands::draft::draft_remove_line,
            commands::draft::draft_select_store,
            commands::draft::draft_set_po_number,
            commands::draft::draft_submit,
            // Orders
            commands::orders::orders_list,
            commands::orders::orders_list_mine,
            commands::orders::orders_get,
            commands::orders::orders_update,
            commands::orders::orders_delete,
            commands::orders::orders_set_display_status,
            commands::orders::orders_set_status_filter,
            commands::orders::order_details_list,
            commands::orders::order_details_get,
            commands::orders::order_details_update,
            commands::orders::order_details_delete,
            commands::orders::order_details_delete_all,
            // Products
            commands::products::products_list,
            commands::products::products_get,
            commands::products::products_create,
            commands::products::products_update,
            commands::products::products_delete,
            commands::products::products_lookups,
            commands::products::products_set_category_filter,
            // Stores
            commands::stores::stores_list,
            commands::stores::stores_get,
            commands::stores::stores_create,
            commands::stores::stores_update,
            commands::stores::stores_delete,
            // Views
            commands::views::view_modal_get,
            commands::views::view_modal_set,
            // Diagnostics
            commands::diagnostics::diagnostics_get_about,
        ])
        .run(tauri::generate_context!())
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "error while running OrderIt Console");
            std::process::exit(1);
        });
}
