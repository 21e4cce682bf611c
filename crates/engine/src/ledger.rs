//! Balance computation over a history of shared expenses.
//!
//! [`compute_balance`] replays every expense a user took part in and reduces
//! it to a single [`Balance`]: the user's signed net total plus, per
//! counterparty, one netted figure of who owes whom.
//!
//! Pairwise debts are kept in a [`PairLedger`], keyed by an unordered
//! [`UserPair`]. Both directions between two users land on the same signed
//! entry, so alternating payers converge to one net amount instead of a list
//! of gross entries.
//!
//! Amounts are `f64` and are never rounded here; rounding is a presentation
//! concern.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Expense, UserId};

/// Net amounts at or below this magnitude are treated as settled and left
/// out of the debit/credit lists.
pub const EPSILON: f64 = 1e-9;

/// Money owed between the subject and one counterparty.
///
/// `amount` is always a magnitude: whether the subject owes it or is owed it
/// is given by the list (`debit` or `credit`) the debt appears in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    pub user_id: UserId,
    pub amount: f64,
}

/// A user's balance.
///
/// `balance == sum(credit) - sum(debit)`, and every counterparty appears at
/// most once across both lists.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub balance: f64,
    /// Money this user owes to other users.
    pub debit: Vec<Debt>,
    /// Money other users owe this user.
    pub credit: Vec<Debt>,
}

impl Balance {
    fn from_ledger(balance: f64, ledger: &PairLedger, subject: UserId) -> Self {
        let mut counterparties: Vec<(UserId, f64)> = ledger.counterparties(subject).collect();
        counterparties.sort_by_key(|(user_id, _)| *user_id);

        let mut debit = Vec::new();
        let mut credit = Vec::new();
        for (user_id, owed) in counterparties {
            if owed.abs() <= EPSILON {
                continue;
            }
            if owed > 0.0 {
                debit.push(Debt {
                    user_id,
                    amount: owed,
                });
            } else {
                credit.push(Debt {
                    user_id,
                    amount: -owed,
                });
            }
        }

        Self {
            balance,
            debit,
            credit,
        }
    }
}

/// Unordered pair of users.
///
/// `UserPair::new(a, b)` and `UserPair::new(b, a)` are the same key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserPair {
    low: UserId,
    high: UserId,
}

impl UserPair {
    pub fn new(a: UserId, b: UserId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    /// The member of the pair that is not `user_id`, if `user_id` belongs to it.
    pub fn other(&self, user_id: UserId) -> Option<UserId> {
        if self.low == user_id {
            Some(self.high)
        } else if self.high == user_id {
            Some(self.low)
        } else {
            None
        }
    }
}

/// Signed running totals between pairs of users.
///
/// Each entry stores how much the pair's `low` user owes the `high` user; a
/// negative value means the debt runs the other way.
#[derive(Clone, Debug, Default)]
pub struct PairLedger {
    entries: HashMap<UserPair, f64>,
}

impl PairLedger {
    /// Record that `debtor` owes `creditor` `amount` more than before.
    pub fn record(&mut self, debtor: UserId, creditor: UserId, amount: f64) {
        if debtor == creditor {
            return;
        }
        let pair = UserPair::new(debtor, creditor);
        let signed = if pair.low == debtor { amount } else { -amount };
        self.entries
            .entry(pair)
            .and_modify(|balance| *balance += signed)
            .or_insert(signed);
    }

    /// How much `debtor` owes `creditor`. Negative when `creditor` is the one
    /// owing.
    pub fn owed(&self, debtor: UserId, creditor: UserId) -> f64 {
        let pair = UserPair::new(debtor, creditor);
        let amount = self.entries.get(&pair).copied().unwrap_or_default();
        if pair.low == debtor { amount } else { -amount }
    }

    /// Every counterparty of `subject` with the amount `subject` owes them
    /// (negative when they owe `subject`).
    pub fn counterparties(&self, subject: UserId) -> impl Iterator<Item = (UserId, f64)> + '_ {
        self.entries.iter().filter_map(move |(pair, amount)| {
            let other = pair.other(subject)?;
            let owed = if pair.low == subject { *amount } else { -*amount };
            Some((other, owed))
        })
    }
}

/// Calculate who owes what, and the net balance, for `subject`.
///
/// Expenses `subject` did not take part in contribute nothing. The result
/// does not depend on the order of `expenses`.
pub fn compute_balance(expenses: &[Expense], subject: UserId) -> Balance {
    let mut balance = 0.0;
    let mut ledger = PairLedger::default();

    for expense in expenses.iter().filter(|e| e.involves(subject)) {
        let share = expense.share();

        if expense.owner_id == subject {
            balance += (expense.participant_count() - 1) as f64 * share;
        } else {
            balance -= share;
        }

        for debtor in &expense.others {
            ledger.record(*debtor, expense.owner_id, share);
        }
    }

    Balance::from_ledger(balance, &ledger, subject)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn expense(id: i32, owner_id: UserId, others: &[UserId], amount: f64) -> Expense {
        Expense {
            id,
            owner_id,
            others: others.to_vec(),
            amount,
            description: format!("expense {id}"),
            created_at: Utc::now(),
        }
    }

    fn assert_close(got: f64, wanted: f64) {
        assert!(
            (got - wanted).abs() <= EPSILON,
            "wanted {wanted}, got {got}"
        );
    }

    fn assert_debts(got: &[Debt], wanted: &[(UserId, f64)]) {
        assert_eq!(got.len(), wanted.len(), "debts mismatch: {got:?}");
        for (debt, (user_id, amount)) in got.iter().zip(wanted) {
            assert_eq!(debt.user_id, *user_id);
            assert_close(debt.amount, *amount);
        }
    }

    fn meal() -> Expense {
        expense(1, 1, &[2, 3], 42.0)
    }

    fn coffee() -> Expense {
        expense(2, 2, &[1], 8.0)
    }

    #[test]
    fn meal_is_split_between_three() {
        let expenses = [meal()];

        let owner = compute_balance(&expenses, 1);
        assert_close(owner.balance, 28.0);
        assert!(owner.debit.is_empty());
        assert_debts(&owner.credit, &[(2, 14.0), (3, 14.0)]);

        for guest in [2, 3] {
            let balance = compute_balance(&expenses, guest);
            assert_close(balance.balance, -14.0);
            assert_debts(&balance.debit, &[(1, 14.0)]);
            assert!(balance.credit.is_empty());
        }
    }

    #[test]
    fn coffee_alone() {
        let expenses = [coffee()];

        let one = compute_balance(&expenses, 1);
        assert_close(one.balance, -4.0);
        assert_debts(&one.debit, &[(2, 4.0)]);

        let two = compute_balance(&expenses, 2);
        assert_close(two.balance, 4.0);
        assert_debts(&two.credit, &[(1, 4.0)]);

        assert_eq!(compute_balance(&expenses, 3), Balance::default());
    }

    #[test]
    fn meal_and_coffee_net_out() {
        let expenses = [meal(), coffee()];

        let one = compute_balance(&expenses, 1);
        assert_close(one.balance, 24.0);
        assert!(one.debit.is_empty());
        assert_debts(&one.credit, &[(2, 10.0), (3, 14.0)]);

        let two = compute_balance(&expenses, 2);
        assert_close(two.balance, -10.0);
        assert_debts(&two.debit, &[(1, 10.0)]);
        assert!(two.credit.is_empty());

        let three = compute_balance(&expenses, 3);
        assert_close(three.balance, -14.0);
        assert_debts(&three.debit, &[(1, 14.0)]);
    }

    #[test]
    fn user_without_expenses_has_empty_balance() {
        assert_eq!(compute_balance(&[meal(), coffee()], 42), Balance::default());
        assert_eq!(compute_balance(&[], 1), Balance::default());
    }

    #[test]
    fn settled_counterparties_are_dropped() {
        let expenses = [expense(1, 1, &[2], 10.0), expense(2, 2, &[1], 10.0)];

        let balance = compute_balance(&expenses, 1);
        assert_close(balance.balance, 0.0);
        assert!(balance.debit.is_empty());
        assert!(balance.credit.is_empty());
    }

    #[test]
    fn fractional_shares_are_not_rounded() {
        let expenses = [expense(1, 1, &[2, 3], 10.0)];

        let balance = compute_balance(&expenses, 2);
        assert_close(balance.balance, -10.0 / 3.0);
        assert_debts(&balance.debit, &[(1, 10.0 / 3.0)]);
    }

    #[test]
    fn pair_ledger_is_symmetric() {
        let mut ledger = PairLedger::default();
        ledger.record(3, 1, 5.0);
        ledger.record(1, 3, 2.0);

        assert_close(ledger.owed(3, 1), 3.0);
        assert_close(ledger.owed(1, 3), -3.0);
        assert_close(ledger.owed(1, 2), 0.0);

        ledger.record(4, 4, 100.0);
        assert_eq!(ledger.counterparties(4).count(), 0);
    }

    #[test]
    fn user_pair_is_unordered() {
        assert_eq!(UserPair::new(1, 2), UserPair::new(2, 1));
        assert_eq!(UserPair::new(1, 2).other(1), Some(2));
        assert_eq!(UserPair::new(1, 2).other(3), None);
    }
}
