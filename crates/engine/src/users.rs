//! Users table and credential helpers.
//!
//! Passwords are stored as Argon2 PHC strings and never leave the engine.

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// Identifier of a user, assigned by the database.
pub type UserId = i32;

const MIN_PASSWORD_LEN: usize = 6;
const MAX_EMAIL_LEN: usize = 254;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    pub password: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
        }
    }
}

/// Trim and check the shape of an email address.
pub(crate) fn normalize_email(value: &str) -> ResultEngine<String> {
    let email = value.trim();
    if email.len() < 3 || email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return Err(EngineError::InvalidUser("invalid email address".to_string()));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(EngineError::InvalidUser("invalid email address".to_string()));
    };
    let domain_ok = !domain.is_empty()
        && !domain.contains('@')
        && domain
            .split('.')
            .all(|label| !label.is_empty() && !label.starts_with('-') && !label.ends_with('-'));
    if local.is_empty() || !domain_ok {
        return Err(EngineError::InvalidUser("invalid email address".to_string()));
    }

    Ok(email.to_string())
}

/// Hash `password` on the blocking pool; Argon2 takes tens of milliseconds.
pub(crate) async fn hash_password(password: &str) -> ResultEngine<String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(EngineError::InvalidUser(format!(
            "invalid password: it must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let password = password.to_string();
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| EngineError::PasswordHash(err.to_string()))
    })
    .await
    .map_err(|err| EngineError::PasswordHash(err.to_string()))?
}

/// Check `password` against a stored PHC string on the blocking pool.
pub(crate) async fn verify_password(password: &str, stored: &str) -> ResultEngine<()> {
    let password = password.to_string();
    let stored = stored.to_string();
    tokio::task::spawn_blocking(move || {
        let hash =
            PasswordHash::new(&stored).map_err(|err| EngineError::PasswordHash(err.to_string()))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .map_err(|_| EngineError::Unauthorized)
    })
    .await
    .map_err(|err| EngineError::PasswordHash(err.to_string()))?
}
