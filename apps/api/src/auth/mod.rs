//! Sign-in: Lark OAuth for members, password accounts for members and coaches.

pub mod handlers;
pub mod page;

use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::credentials::verify_password_blocking;
use crate::errors::AppError;
use crate::lark::RecordStore;
use crate::models::user::{find_user, User};

const OAUTH_STATE_LEN: usize = 24;
pub const MIN_PASSWORD_LEN: usize = 8;
const BAD_CREDENTIALS: &str = "Incorrect email or password";

/// Looks the user up by email and checks the password.
///
/// Unknown email and wrong password give the same 401. A user row with no stored
/// hash is a misconfigured account, not a failed login.
pub async fn authenticate(
    store: &dyn RecordStore,
    users_table: &str,
    email: &str,
    password: &str,
) -> Result<User, AppError> {
    let email = email.trim().to_lowercase();
    let user = find_user(store, users_table, "email", &email)
        .await?
        .ok_or_else(|| AppError::Unauthorized(BAD_CREDENTIALS.into()))?;

    let valid = verify_password_blocking(password.to_string(), user.password_hash.clone()).await?;
    if !valid {
        return Err(AppError::Unauthorized(BAD_CREDENTIALS.into()));
    }
    Ok(user)
}

/// Opaque value round-tripped through the OAuth redirect.
pub fn new_oauth_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(OAUTH_STATE_LEN)
        .map(char::from)
        .collect()
}

/// Trimmed, lowercased email, or `None` when it is blank or has no `@`.
pub fn normalize_email(raw: &str) -> Option<String> {
    let email = raw.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Some(email),
        _ => None,
    }
}
