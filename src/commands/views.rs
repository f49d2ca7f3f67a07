use std::sync::Mutex;

use super::lock;
use crate::views::{ModalState, ViewKind, ViewState};

#[tauri::command]
pub async fn view_modal_get(
    view: ViewKind,
    views: tauri::State<'_, Mutex<ViewState>>,
) -> Result<ModalState, String> {
    Ok(lock(&views)?.modal(view))
}

#[tauri::command]
pub async fn view_modal_set(
    view: ViewKind,
    modal: ModalState,
    views: tauri::State<'_, Mutex<ViewState>>,
) -> Result<ModalState, String> {
    let mut views = lock(&views)?;
    views.set_modal(view, modal);
    Ok(views.modal(view))
}
