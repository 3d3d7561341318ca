//! Page session route handlers.
//!
//! A page creates a session on load and then drives category selection,
//! retries and the mobile menu through it.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use green_earth_core::CategorySelection;
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use super::views::{ListingView, MenuView, SessionView};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::session::{MenuAction, StorefrontSession};
use crate::state::AppState;

/// Select category request body.
#[derive(Debug, Deserialize)]
pub struct SelectCategoryRequest {
    /// `"all"` or a category id.
    pub category: CategorySelection,
}

/// Menu interaction request body.
#[derive(Debug, Deserialize)]
pub struct MenuRequest {
    pub action: MenuAction,
}

/// Look up an open session.
pub(super) async fn find_session(state: &AppState, id: Uuid) -> Result<Arc<StorefrontSession>> {
    state
        .sessions()
        .get(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("session {id}")))
}

/// Turn a JSON body rejection into a 400.
pub(super) fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// Open a session: load categories and all products.
#[instrument(skip(state))]
pub async fn create(State(state): State<AppState>) -> (StatusCode, Json<SessionView>) {
    let session = Arc::new(StorefrontSession::new(Arc::clone(state.catalog())));
    let snapshot = session.initialize().await;
    let id = state.sessions().insert(session).await;

    tracing::info!(session_id = %id, "session opened");
    (StatusCode::CREATED, Json(SessionView::new(id, &snapshot)))
}

/// Current page state.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<SessionView>> {
    let session = find_session(&state, id).await?;
    let snapshot = session.snapshot().await;
    Ok(Json(SessionView::new(id, &snapshot)))
}

/// End a session.
#[instrument(skip(state))]
pub async fn destroy(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    if state.sessions().remove(&id).await {
        tracing::info!(session_id = %id, "session closed");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("session {id}")))
    }
}

/// Switch the category filter.
#[instrument(skip(state, payload))]
pub async fn select_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: std::result::Result<Json<SelectCategoryRequest>, JsonRejection>,
) -> Result<Json<ListingView>> {
    let request = json_body(payload)?;
    let session = find_session(&state, id).await?;

    let selection = request.category.to_string();
    add_breadcrumb(
        "catalog",
        "Selected category",
        Some(&[("category", selection.as_str())]),
    );

    let listing = session.select_category(request.category).await;
    Ok(Json(ListingView::from(&listing)))
}

/// Current product grid.
#[instrument(skip(state))]
pub async fn products(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ListingView>> {
    let session = find_session(&state, id).await?;
    Ok(Json(ListingView::from(&session.listing().await)))
}

/// Refetch the product grid for the current selection.
#[instrument(skip(state))]
pub async fn retry_products(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ListingView>> {
    let session = find_session(&state, id).await?;
    let listing = session.reload_products().await;
    Ok(Json(ListingView::from(&listing)))
}

/// Mobile menu interaction.
#[instrument(skip(state, payload))]
pub async fn menu(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: std::result::Result<Json<MenuRequest>, JsonRejection>,
) -> Result<Json<MenuView>> {
    let request = json_body(payload)?;
    let session = find_session(&state, id).await?;
    Ok(Json(MenuView::from(session.menu(request.action).await)))
}
