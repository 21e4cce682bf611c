//! Core of the expense splitter: users, the expense log, balance
//! computation and the balance cache, tied together by [`Engine`].

pub use cache::{
    BalanceCache, BalanceStore, DEFAULT_TTL, InvalidationPolicy, MemoryBalanceStore,
    RedisBalanceStore,
};
pub use error::EngineError;
pub use expenses::{Expense, ExpenseNew};
pub use ledger::{Balance, Debt, EPSILON, PairLedger, UserPair, compute_balance};
pub use ops::{Engine, EngineBuilder};
pub use store::{ExpenseStore, SqlExpenseStore};
pub use users::{User, UserId};

mod cache;
mod error;
mod expense_users;
mod expenses;
mod ledger;
mod ops;
mod store;
mod users;

pub type ResultEngine<T> = Result<T, EngineError>;
