use tracing::{error, warn};

use super::jwt::JwtKeys;
use crate::{
    error::{AppError, AuthError},
    users::{password::verify_password, services::UserService},
};

/// Exchanges an email/password pair for a session token.
#[derive(Clone)]
pub struct Authenticator {
    users: UserService,
    keys: JwtKeys,
}

impl Authenticator {
    pub fn new(users: UserService, keys: JwtKeys) -> Self {
        Self { users, keys }
    }

    /// Unknown email and wrong password fail with the same
    /// [`AuthError::InvalidCredentials`].
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<String, AppError> {
        let Some(user) = self.users.find_by_email(email).await? else {
            warn!(email, "login unknown email");
            return Err(AuthError::InvalidCredentials.into());
        };

        let ok = verify_password(password, &user.password_hash).unwrap_or_else(|e| {
            error!(error = %e, user_id = user.id, "stored password hash unreadable");
            false
        });
        if !ok {
            warn!(email, user_id = user.id, "login invalid password");
            return Err(AuthError::InvalidCredentials.into());
        }

        Ok(self.keys.issue(&user)?)
    }
}
