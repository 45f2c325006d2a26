use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub email: String,
    pub role: String,
    pub exp: i64,    // expiration time
    pub iat: i64,    // issued at
    pub jti: String, // JWT ID
}

impl Claims {
    pub fn new(user_id: i64, email: String, role: String, expiration_hours: u64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(expiration_hours as i64);

        Self {
            sub: user_id.to_string(),
            email,
            role,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

pub fn create_access_token(
    user_id: i64,
    email: String,
    role: String,
    secret: &str,
    expiration_hours: u64,
) -> anyhow::Result<String> {
    let claims = Claims::new(user_id, email, role, expiration_hours);
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;

    Ok(token)
}

pub fn verify_access_token(token: &str, secret: &str) -> anyhow::Result<Claims> {
    let validation = Validation::default();
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )?;

    Ok(token_data.claims)
}

/// Decodes a token without enforcing its expiry.
///
/// Session-end reports can arrive after the credential has lapsed (a tab
/// left hidden past the JWT lifetime still fires its watchdog); the audit
/// trail should still record which user the credential was issued to.
pub fn decode_expired_claims(token: &str, secret: &str) -> anyhow::Result<Claims> {
    let mut validation = Validation::default();
    validation.validate_exp = false;
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_verify_round_trip() {
        let token = create_access_token(42, "alice@example.com".into(), "admin".into(), "secret", 24)
            .expect("create token");
        let claims = verify_access_token(&token, "secret").expect("verify token");
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.user_id(), Some(42));
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.role, "admin");
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let token = create_access_token(1, "a@b.c".into(), "viewer".into(), "secret", 1)
            .expect("create token");
        assert!(verify_access_token(&token, "other-secret").is_err());
    }

    #[test]
    fn expired_token_fails_strict_but_decodes_lenient() {
        let claims = Claims {
            sub: "7".into(),
            email: "late@example.com".into(),
            role: "sales".into(),
            exp: (Utc::now() - Duration::hours(2)).timestamp(),
            iat: (Utc::now() - Duration::hours(26)).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .expect("encode");

        assert!(verify_access_token(&token, "secret").is_err());
        let decoded = decode_expired_claims(&token, "secret").expect("lenient decode");
        assert_eq!(decoded.sub, "7");
        assert_eq!(decoded.email, "late@example.com");
    }

    #[test]
    fn lenient_decode_still_rejects_garbled_tokens() {
        assert!(decode_expired_claims("not-a-jwt", "secret").is_err());
    }
}
