//! States lookup route.
//!
//! Public: the frontend needs the list before a user has signed in.

use axum::extract::State;
use serde::Serialize;

use crate::db::StateRepository;
use crate::error::Result;
use crate::models::StateRecord;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StateList {
    pub states: Vec<StateRecord>,
}

/// `GET /states` - active states in storage order.
pub async fn index(State(state): State<AppState>) -> Result<ApiResponse<StateList>> {
    let states = StateRepository::new(state.pool()).list_active().await?;

    Ok(ApiResponse::ok("States fetched successfully", StateList { states }))
}
