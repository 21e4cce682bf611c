//! User API endpoints

use api_types::user::{UserNew, UserView, UsersResponse};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::User;

use crate::{ServerError, server::ServerState};

fn view(user: User) -> UserView {
    UserView {
        id: user.id,
        email: user.email,
    }
}

/// Handle requests for listing every registered user
pub async fn list(
    _: Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<UsersResponse>, ServerError> {
    let users = state.engine.users().await?;

    Ok(Json(UsersResponse {
        users: users.into_iter().map(view).collect(),
    }))
}

/// Handle requests for registering a new user
pub async fn user_new(
    _: Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<UserNew>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let user = state
        .engine
        .register_user(&payload.email, &payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(view(user))))
}
