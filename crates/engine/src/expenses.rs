//! Expense primitives.
//!
//! An [`Expense`] is paid by its owner and shared with at least one other
//! user. The owner is always an implicit participant: the stored participant
//! set is `{owner} ∪ others`, each user exactly once.
//!
//! Expenses are immutable once created.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine, UserId};

/// A recorded expense.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i32,
    /// User who paid for the expense.
    pub owner_id: UserId,
    /// The other users sharing the expense, never including the owner.
    pub others: Vec<UserId>,
    pub amount: f64,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// Number of users sharing the expense, owner included.
    pub fn participant_count(&self) -> usize {
        self.others.len() + 1
    }

    /// What each participant owes for this expense.
    pub fn share(&self) -> f64 {
        self.amount / self.participant_count() as f64
    }

    /// Whether `user_id` paid for or shares this expense.
    pub fn involves(&self, user_id: UserId) -> bool {
        self.owner_id == user_id || self.others.contains(&user_id)
    }
}

/// A validated expense that has not been stored yet.
#[derive(Clone, Debug, PartialEq)]
pub struct ExpenseNew {
    owner_id: UserId,
    others: Vec<UserId>,
    amount: f64,
    description: String,
    created_at: DateTime<Utc>,
}

impl ExpenseNew {
    /// Validate and build a new expense.
    ///
    /// The description is trimmed and must not be empty, the amount must be
    /// a positive finite number, and `others` must be a non-empty list of
    /// distinct users not containing `owner_id`.
    pub fn new(
        owner_id: UserId,
        others: Vec<UserId>,
        amount: f64,
        description: &str,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        let description = description.trim();
        if description.is_empty() {
            return Err(EngineError::InvalidExpense(
                "description must not be empty".to_string(),
            ));
        }
        if !amount.is_finite() || amount <= 0.0 {
            return Err(EngineError::InvalidExpense(
                "amount must be positive".to_string(),
            ));
        }
        if others.is_empty() {
            return Err(EngineError::InvalidExpense(
                "at least one other user must be included in an expense".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(others.len());
        for user_id in &others {
            if *user_id == owner_id {
                return Err(EngineError::InvalidExpense(
                    "user list must not include self".to_string(),
                ));
            }
            if !seen.insert(*user_id) {
                return Err(EngineError::InvalidExpense(format!(
                    "duplicate user {user_id} in user list"
                )));
            }
        }

        Ok(Self {
            owner_id,
            others,
            amount,
            description: description.to_string(),
            created_at,
        })
    }

    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    pub fn others(&self) -> &[UserId] {
        &self.others
    }

    /// Owner first, then the other participants.
    pub fn participants(&self) -> impl Iterator<Item = UserId> + '_ {
        std::iter::once(self.owner_id).chain(self.others.iter().copied())
    }

    /// The stored form of this expense once the store assigned `id`.
    pub fn into_expense(self, id: i32) -> Expense {
        Expense {
            id,
            owner_id: self.owner_id,
            others: self.others,
            amount: self.amount,
            description: self.description,
            created_at: self.created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub owner_id: i32,
    pub description: String,
    pub amount: f64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::expense_users::Entity")]
    ExpenseUsers,
}

impl Related<super::expense_users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExpenseUsers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ExpenseNew> for ActiveModel {
    fn from(expense: &ExpenseNew) -> Self {
        Self {
            id: ActiveValue::NotSet,
            owner_id: ActiveValue::Set(expense.owner_id),
            description: ActiveValue::Set(expense.description.clone()),
            amount: ActiveValue::Set(expense.amount),
            created_at: ActiveValue::Set(expense.created_at),
        }
    }
}

impl Model {
    /// Attach the participant set loaded from `expense_users`.
    pub(crate) fn into_expense(self, participants: &[UserId]) -> Expense {
        let mut others: Vec<UserId> = participants
            .iter()
            .copied()
            .filter(|user_id| *user_id != self.owner_id)
            .collect();
        others.sort_unstable();
        others.dedup();

        Expense {
            id: self.id,
            owner_id: self.owner_id,
            others,
            amount: self.amount,
            description: self.description,
            created_at: self.created_at,
        }
    }
}
