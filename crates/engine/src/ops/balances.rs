use crate::{Balance, ResultEngine, UserId};

use super::Engine;

impl Engine {
    /// Net position of `user_id`, served from the balance cache when fresh.
    pub async fn balance(&self, user_id: UserId) -> ResultEngine<Balance> {
        self.balances.get(&self.expenses, user_id).await
    }
}
