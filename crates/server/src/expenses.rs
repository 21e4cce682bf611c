//! Expense API endpoints

use api_types::expense::{ExpenseCreated, ExpenseNew};
use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::Utc;
use engine::User;

use crate::{ServerError, server::ServerState};

/// Handle requests for recording an expense paid by the caller
pub async fn expense_new(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseCreated>), ServerError> {
    let others = payload.users.iter().map(|u| u.id).collect();
    let expense = engine::ExpenseNew::new(
        user.id,
        others,
        payload.amount,
        &payload.description,
        payload.created_at.with_timezone(&Utc),
    )?;

    let id = state.engine.add_expense(expense).await?;

    Ok((StatusCode::CREATED, Json(ExpenseCreated { id })))
}
