use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use chrono::Utc;
use password_hash::rand_core::OsRng;
use sea_orm::Set;
use uuid::Uuid;

use crate::{
    dto::auth::RegisterRequest,
    entity::users::{self, Role},
    error::{AppError, AppResult, is_unique_violation},
    models::User,
    repository::UserRepository,
    state::AppState,
};

pub const EMAIL_TAKEN: &str = "Email already exists";

/// Create a customer account.
///
/// The duplicate check up front gives the friendly error in the common case; the
/// unique index on `users.email` settles concurrent registrations, and its
/// violation is reported with the same message.
pub async fn register_user(state: &AppState, payload: RegisterRequest) -> AppResult<User> {
    let RegisterRequest {
        name,
        email,
        password,
        phone,
        address,
        role: _,
    } = payload;

    let email = normalize_email(&email)?;
    if password.is_empty() {
        return Err(AppError::BadRequest("password must not be empty".into()));
    }

    let users = UserRepository::new(&state.orm);
    if users.find_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict(EMAIL_TAKEN.into()));
    }

    let password_hash = hash_password(&password)?;

    let active = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.trim().to_string()),
        email: Set(email),
        password_hash: Set(password_hash),
        phone: Set(phone),
        role: Set(Role::Customer),
        address: Set(address),
        created_at: Set(Utc::now().into()),
    };

    let user = users.insert(active).await.map_err(|err| {
        if is_unique_violation(&err) {
            AppError::Conflict(EMAIL_TAKEN.into())
        } else {
            AppError::from(err)
        }
    })?;

    tracing::info!(user_id = %user.id, "user registered");
    Ok(user.into())
}

pub async fn find_by_email(state: &AppState, email: &str) -> AppResult<Option<User>> {
    let email = email.trim().to_lowercase();
    let user = UserRepository::new(&state.orm)
        .find_by_email(&email)
        .await?
        .map(User::from);
    Ok(user)
}

pub async fn get_user(state: &AppState, id: Uuid) -> AppResult<User> {
    UserRepository::new(&state.orm)
        .find_by_id(id)
        .await?
        .map(User::from)
        .ok_or(AppError::NotFound("User"))
}

/// Argon2 PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

fn normalize_email(email: &str) -> AppResult<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::BadRequest("a valid email is required".into()));
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  A@X.com ").unwrap(), "a@x.com");
    }

    #[test]
    fn emails_without_at_are_rejected() {
        assert!(matches!(
            normalize_email("not-an-email"),
            Err(AppError::BadRequest(_))
        ));
        assert!(normalize_email("   ").is_err());
    }

    #[test]
    fn hashes_are_salted() {
        let first = hash_password("secret").unwrap();
        let second = hash_password("secret").unwrap();
        assert_ne!(first, "secret");
        assert_ne!(first, second);
        assert!(first.starts_with("$argon2"));
    }
}
