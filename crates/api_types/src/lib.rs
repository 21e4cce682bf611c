use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct UserView {
        pub id: i32,
        pub email: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UsersResponse {
        pub users: Vec<UserView>,
    }
}

pub mod expense {
    use super::*;

    /// A participant reference inside an expense body.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct UserRef {
        pub id: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub description: String,
        pub amount: f64,
        /// RFC3339 timestamp, including timezone offset.
        pub created_at: DateTime<FixedOffset>,
        /// Users sharing the expense with the caller, never the caller itself.
        pub users: Vec<UserRef>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseCreated {
        pub id: i32,
    }
}

pub mod balance {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    pub struct Debt {
        pub user_id: i32,
        pub amount: f64,
    }

    /// The caller's net position.
    ///
    /// `debit` lists what the caller owes, `credit` what is owed to them.
    /// Amounts in both lists are positive.
    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    pub struct Balance {
        pub balance: f64,
        pub debit: Vec<Debt>,
        pub credit: Vec<Debt>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expense_accepts_rfc3339_with_offset() {
        let body = r#"{
            "description": "Food",
            "amount": 42.0,
            "created_at": "2026-01-01T12:00:00+02:00",
            "users": [{"id": 2}, {"id": 3}]
        }"#;
        let expense: expense::ExpenseNew = serde_json::from_str(body).unwrap();
        assert_eq!(expense.users, vec![expense::UserRef { id: 2 }, expense::UserRef { id: 3 }]);
        assert_eq!(expense.created_at.to_rfc3339(), "2026-01-01T12:00:00+02:00");
    }

    #[test]
    fn balance_wire_shape() {
        let balance = balance::Balance {
            balance: 28.0,
            debit: vec![],
            credit: vec![balance::Debt {
                user_id: 2,
                amount: 14.0,
            }],
        };
        assert_eq!(
            serde_json::to_value(&balance).unwrap(),
            serde_json::json!({
                "balance": 28.0,
                "debit": [],
                "credit": [{"user_id": 2, "amount": 14.0}]
            })
        );
    }
}
