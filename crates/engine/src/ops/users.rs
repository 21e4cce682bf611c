use sea_orm::{ActiveValue, QueryFilter, QueryOrder, SqlErr, prelude::*};

use crate::{
    EngineError, ResultEngine, User, UserId,
    users::{self, hash_password, normalize_email, verify_password},
};

use super::Engine;

impl Engine {
    /// Register a new user and return it.
    ///
    /// The email is trimmed and must be unique; the password is stored as an
    /// Argon2 hash.
    pub async fn register_user(&self, email: &str, password: &str) -> ResultEngine<User> {
        let email = normalize_email(email)?;
        let password = hash_password(password).await?;

        let exists = users::Entity::find()
            .filter(users::Column::Email.eq(email.as_str()))
            .one(&self.database)
            .await?
            .is_some();
        if exists {
            return Err(EngineError::ExistingKey(email));
        }

        let model = users::ActiveModel {
            id: ActiveValue::NotSet,
            email: ActiveValue::Set(email.clone()),
            password: ActiveValue::Set(password),
        };
        let model = match model.insert(&self.database).await {
            Ok(model) => model,
            // Lost a race against a concurrent registration.
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                return Err(EngineError::ExistingKey(email));
            }
            Err(err) => return Err(err.into()),
        };

        tracing::info!(user_id = model.id, "user registered");
        Ok(model.into())
    }

    /// Check credentials and return the matching user.
    ///
    /// Unknown emails and wrong passwords are indistinguishable to the caller.
    pub async fn authenticate(&self, email: &str, password: &str) -> ResultEngine<User> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email.trim()))
            .one(&self.database)
            .await?
            .ok_or(EngineError::Unauthorized)?;

        verify_password(password, &model.password).await?;
        Ok(model.into())
    }

    /// All users, ordered by email.
    pub async fn users(&self) -> ResultEngine<Vec<User>> {
        let models = users::Entity::find()
            .order_by_asc(users::Column::Email)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(User::from).collect())
    }

    pub async fn user(&self, user_id: UserId) -> ResultEngine<User> {
        users::Entity::find_by_id(user_id)
            .one(&self.database)
            .await?
            .map(User::from)
            .ok_or_else(|| EngineError::KeyNotFound(format!("user {user_id} not exists")))
    }

    /// Fail with `InvalidExpense` on the first id that has no user row.
    pub(crate) async fn require_users(&self, user_ids: &[UserId]) -> ResultEngine<()> {
        let found: Vec<UserId> = users::Entity::find()
            .filter(users::Column::Id.is_in(user_ids.iter().copied()))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|model| model.id)
            .collect();

        match user_ids.iter().find(|user_id| !found.contains(user_id)) {
            Some(missing) => Err(EngineError::InvalidExpense(format!(
                "unknown user id {missing}"
            ))),
            None => Ok(()),
        }
    }
}
