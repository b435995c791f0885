use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};

use super::claims::Claims;
use crate::{config::JwtConfig, error::AuthError, state::AppState, users::repo_types::User};

const BEARER_PREFIX: &str = "Bearer ";
const ALGORITHM: Algorithm = Algorithm::HS512;

/// Signing and verification keys derived once from [`JwtConfig`].
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            ttl: Duration::days(cfg.ttl_days),
        }
    }

    /// Signs a fresh token for `user`, valid for the configured window.
    pub fn issue(&self, user: &User) -> anyhow::Result<String> {
        self.issue_at(user.id, &user.email, OffsetDateTime::now_utc())
    }

    pub(crate) fn issue_at(
        &self,
        user_id: i64,
        email: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<String> {
        let issued_ms = now.unix_timestamp_nanos() / 1_000_000;
        let expires_ms = issued_ms + self.ttl.whole_milliseconds();
        let claims = Claims {
            iss: self.issuer.clone(),
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: (issued_ms / 1000) as usize,
            exp: (expires_ms / 1000) as usize,
        };
        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding)?;
        debug!(user_id, "jwt signed");
        Ok(token)
    }

    /// Checks a raw `authorization` header value and returns its claims.
    ///
    /// The value must start with the literal `Bearer `; anything else, or a
    /// token that cannot be decoded, is [`AuthError::MalformedToken`]. A
    /// token that decodes but fails signature, issuer or expiry checks is
    /// [`AuthError::InvalidToken`].
    pub fn validate(&self, raw: &str) -> Result<Claims, AuthError> {
        let token = raw
            .strip_prefix(BEARER_PREFIX)
            .ok_or_else(|| {
                warn!("authorization value without bearer prefix");
                AuthError::MalformedToken("token must start with 'Bearer '".into())
            })?
            .trim();

        let mut validation = Validation::new(ALGORITHM);
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            warn!(error = %e, "jwt rejected");
            match e.kind() {
                ErrorKind::InvalidToken
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_) => AuthError::MalformedToken(format!("undecodable token: {e}")),
                _ => AuthError::InvalidToken(e),
            }
        })?;
        debug!(sub = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(secret: &str, issuer: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            ttl_days: 7,
        }
    }

    fn keys() -> JwtKeys {
        JwtKeys::new(&cfg("test-secret", "ACME.COM"))
    }

    fn bearer(token: &str) -> String {
        format!("Bearer {token}")
    }

    #[test]
    fn issued_token_validates_and_names_subject() {
        let keys = keys();
        let token = keys
            .issue_at(7, "a@x.com", OffsetDateTime::now_utc())
            .expect("sign");
        let claims = keys.validate(&bearer(&token)).expect("validate");
        assert_eq!(claims.subject_id(), "7");
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.iss, "ACME.COM");
    }

    #[test]
    fn expiry_is_seven_days_after_issue() {
        let keys = keys();
        let now = OffsetDateTime::now_utc();
        let token = keys.issue_at(7, "a@x.com", now).expect("sign");
        let claims = keys.validate(&bearer(&token)).expect("validate");
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
        assert_eq!(claims.iat as i64, now.unix_timestamp());
    }

    #[test]
    fn token_still_valid_late_in_window() {
        let keys = keys();
        let issued = OffsetDateTime::now_utc() - Duration::days(6) - Duration::hours(23);
        let token = keys.issue_at(7, "a@x.com", issued).expect("sign");
        assert!(keys.validate(&bearer(&token)).is_ok());
    }

    #[test]
    fn token_past_window_is_invalid_not_malformed() {
        let keys = keys();
        let issued = OffsetDateTime::now_utc() - Duration::days(7) - Duration::minutes(1);
        let token = keys.issue_at(7, "a@x.com", issued).expect("sign");
        match keys.validate(&bearer(&token)) {
            Err(AuthError::InvalidToken(e)) => {
                assert!(matches!(e.kind(), ErrorKind::ExpiredSignature))
            }
            other => panic!("expected expired token, got {other:?}"),
        }
    }

    #[test]
    fn missing_prefix_is_malformed() {
        let keys = keys();
        let token = keys
            .issue_at(7, "a@x.com", OffsetDateTime::now_utc())
            .expect("sign");
        for raw in [
            token.clone(),
            format!("bearer {token}"),
            format!("Bearer{token}"),
            format!(" Bearer {token}"),
            String::new(),
        ] {
            assert!(
                matches!(keys.validate(&raw), Err(AuthError::MalformedToken(_))),
                "{raw:?} should be malformed"
            );
        }
    }

    #[test]
    fn surrounding_whitespace_after_prefix_is_ignored() {
        let keys = keys();
        let token = keys
            .issue_at(7, "a@x.com", OffsetDateTime::now_utc())
            .expect("sign");
        assert!(keys.validate(&format!("Bearer   {token}  ")).is_ok());
    }

    #[test]
    fn garbage_after_prefix_is_malformed() {
        assert!(matches!(
            keys().validate("Bearer not-a-jwt"),
            Err(AuthError::MalformedToken(_))
        ));
    }

    #[test]
    fn foreign_secret_fails_signature() {
        let other = JwtKeys::new(&cfg("another-secret", "ACME.COM"));
        let token = other
            .issue_at(7, "a@x.com", OffsetDateTime::now_utc())
            .expect("sign");
        match keys().validate(&bearer(&token)) {
            Err(AuthError::InvalidToken(e)) => assert!(matches!(e.kind(), ErrorKind::InvalidSignature)),
            other => panic!("expected signature failure, got {other:?}"),
        }
    }

    #[test]
    fn swapped_signature_fails_signature() {
        let keys = keys();
        let now = OffsetDateTime::now_utc();
        let victim = keys.issue_at(7, "a@x.com", now).expect("sign");
        let attacker = keys.issue_at(8, "b@x.com", now).expect("sign");
        let (victim_body, _) = victim.rsplit_once('.').expect("three segments");
        let (_, attacker_sig) = attacker.rsplit_once('.').expect("three segments");
        let forged = format!("{victim_body}.{attacker_sig}");
        assert!(matches!(
            keys.validate(&bearer(&forged)),
            Err(AuthError::InvalidToken(_))
        ));
    }

    fn sign_raw(alg: Algorithm, claims: &serde_json::Value) -> String {
        encode(
            &Header::new(alg),
            claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .expect("sign")
    }

    fn in_a_day() -> i64 {
        (OffsetDateTime::now_utc() + Duration::days(1)).unix_timestamp()
    }

    #[test]
    fn signed_token_missing_a_required_claim_is_invalid() {
        let no_sub = serde_json::json!({
            "iss": "ACME.COM",
            "email": "a@x.com",
            "iat": OffsetDateTime::now_utc().unix_timestamp(),
            "exp": in_a_day(),
        });
        let no_exp = serde_json::json!({
            "iss": "ACME.COM",
            "sub": "7",
            "email": "a@x.com",
        });
        for (claims, missing) in [(no_sub, "sub"), (no_exp, "exp")] {
            let token = sign_raw(ALGORITHM, &claims);
            match keys().validate(&bearer(&token)) {
                Err(AuthError::InvalidToken(e)) => assert!(
                    matches!(e.kind(), ErrorKind::MissingRequiredClaim(c) if c == missing),
                    "unexpected kind {:?}",
                    e.kind()
                ),
                other => panic!("expected missing {missing}, got {other:?}"),
            }
        }
    }

    #[test]
    fn token_signed_with_other_algorithm_is_invalid() {
        let token = sign_raw(
            Algorithm::HS256,
            &serde_json::json!({
                "iss": "ACME.COM",
                "sub": "7",
                "email": "a@x.com",
                "iat": OffsetDateTime::now_utc().unix_timestamp(),
                "exp": in_a_day(),
            }),
        );
        match keys().validate(&bearer(&token)) {
            Err(AuthError::InvalidToken(e)) => {
                assert!(matches!(e.kind(), ErrorKind::InvalidAlgorithm))
            }
            other => panic!("expected algorithm failure, got {other:?}"),
        }
    }

    #[test]
    fn foreign_issuer_is_rejected() {
        let other = JwtKeys::new(&cfg("test-secret", "EVIL.COM"));
        let token = other
            .issue_at(7, "a@x.com", OffsetDateTime::now_utc())
            .expect("sign");
        match keys().validate(&bearer(&token)) {
            Err(AuthError::InvalidToken(e)) => assert!(matches!(e.kind(), ErrorKind::InvalidIssuer)),
            other => panic!("expected issuer failure, got {other:?}"),
        }
    }
}
