//! Durable record of expenses.
//!
//! [`ExpenseStore`] is the narrow interface the balance cache and the engine
//! consume; [`SqlExpenseStore`] implements it on top of the `expenses` and
//! `expense_users` tables.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{
    DatabaseConnection, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::{Query, SelectStatement},
};

use crate::{Expense, ExpenseNew, ResultEngine, UserId, expense_users, expenses};

#[async_trait]
pub trait ExpenseStore: Send + Sync {
    /// Durably record `expense` with its full participant set and return the
    /// assigned id. The expense is visible to every reader once this returns.
    async fn append(&self, expense: &ExpenseNew) -> ResultEngine<i32>;

    /// Every expense `user_id` paid for or shares, in a stable order.
    async fn list_for_user(&self, user_id: UserId) -> ResultEngine<Vec<Expense>>;
}

#[derive(Clone, Debug)]
pub struct SqlExpenseStore {
    database: DatabaseConnection,
}

impl SqlExpenseStore {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }
}

/// Ids of the expenses `user_id` participates in.
fn participating_expenses(user_id: UserId) -> SelectStatement {
    Query::select()
        .column(expense_users::Column::ExpenseId)
        .from(expense_users::Entity)
        .and_where(expense_users::Column::UserId.eq(user_id))
        .to_owned()
}

#[async_trait]
impl ExpenseStore for SqlExpenseStore {
    async fn append(&self, expense: &ExpenseNew) -> ResultEngine<i32> {
        let db_tx = self.database.begin().await?;

        let model = expenses::ActiveModel::from(expense).insert(&db_tx).await?;
        let participants = expense
            .participants()
            .map(|user_id| expense_users::ActiveModel {
                expense_id: sea_orm::ActiveValue::Set(model.id),
                user_id: sea_orm::ActiveValue::Set(user_id),
            });
        expense_users::Entity::insert_many(participants)
            .exec_without_returning(&db_tx)
            .await?;

        db_tx.commit().await?;
        Ok(model.id)
    }

    async fn list_for_user(&self, user_id: UserId) -> ResultEngine<Vec<Expense>> {
        let expense_models = expenses::Entity::find()
            .filter(expenses::Column::Id.in_subquery(participating_expenses(user_id)))
            .order_by_asc(expenses::Column::CreatedAt)
            .order_by_asc(expenses::Column::Id)
            .all(&self.database)
            .await?;

        let participant_models = expense_users::Entity::find()
            .filter(expense_users::Column::ExpenseId.in_subquery(participating_expenses(user_id)))
            .all(&self.database)
            .await?;

        let mut participants: HashMap<i32, Vec<UserId>> = HashMap::new();
        for row in participant_models {
            participants
                .entry(row.expense_id)
                .or_default()
                .push(row.user_id);
        }

        Ok(expense_models
            .into_iter()
            .map(|model| {
                let users = participants.remove(&model.id).unwrap_or_default();
                model.into_expense(&users)
            })
            .collect())
    }
}
