use crate::{
    ExpenseNew, InvalidationPolicy, ResultEngine, UserId, compute_balance, store::ExpenseStore,
};

use super::Engine;

impl Engine {
    /// Record a new expense and refresh the submitter's cached balance.
    ///
    /// Every participant must be a registered user. Once the expense is
    /// stored the owner's balance is recomputed from the full log and written
    /// to the cache, so the owner reads their own write. Other participants
    /// are only refreshed under [`InvalidationPolicy::InvalidateParticipants`].
    pub async fn add_expense(&self, expense: ExpenseNew) -> ResultEngine<i32> {
        let participants: Vec<UserId> = expense.participants().collect();
        self.require_users(&participants).await?;

        let id = self.expenses.append(&expense).await?;
        tracing::info!(
            expense_id = id,
            owner_id = expense.owner_id(),
            participants = participants.len(),
            "expense recorded"
        );

        let owner_id = expense.owner_id();
        let history = self.expenses.list_for_user(owner_id).await?;
        self.balances
            .put(owner_id, &compute_balance(&history, owner_id))
            .await?;

        if self.invalidation == InvalidationPolicy::InvalidateParticipants {
            for user_id in expense.others() {
                self.balances.invalidate(*user_id).await?;
            }
        }

        Ok(id)
    }
}
