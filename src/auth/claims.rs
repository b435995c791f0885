use serde::{Deserialize, Serialize};

/// JWT payload of a session token.
///
/// Absent fields deserialize to their defaults so that a signed token with a
/// missing `exp`, `iss` or `sub` is reported by the required-claim check.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Claims {
    pub iss: String,   // issuer
    pub sub: String,   // user ID as text
    pub email: String, // user email
    pub iat: usize,    // issued at (unix timestamp)
    pub exp: usize,    // expires at (unix timestamp)
}

impl Claims {
    /// Id of the user the token was issued to.
    pub fn subject_id(&self) -> &str {
        &self.sub
    }
}
