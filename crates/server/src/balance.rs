use api_types::balance::{Balance, Debt};
use axum::{Extension, Json, extract::State};
use engine::User;

use crate::{ServerError, server::ServerState};

fn debts(debts: Vec<engine::Debt>) -> Vec<Debt> {
    debts
        .into_iter()
        .map(|debt| Debt {
            user_id: debt.user_id,
            amount: debt.amount,
        })
        .collect()
}

/// Handle requests for the caller's balance
pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Balance>, ServerError> {
    let balance = state.engine.balance(user.id).await?;

    Ok(Json(Balance {
        balance: balance.balance,
        debit: debts(balance.debit),
        credit: debts(balance.credit),
    }))
}
