use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Bearer-token claims. The role claim is informational for clients;
/// authorization always re-reads the account row (see access::gate).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: Option<String>,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn account_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|e| anyhow!("invalid subject claim: {e}"))
    }
}

#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    ttl_minutes: i64,
}

impl JwtKeys {
    pub fn from_secret(secret: &str, issuer: &str, ttl_minutes: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.to_string(),
            ttl_minutes,
        }
    }

    pub fn issue(&self, account_id: Uuid, email: &str, role: Option<String>) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: account_id.to_string(),
            email: email.to_string(),
            role,
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(self.ttl_minutes)).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| anyhow!("failed to sign token: {e}"))
    }

    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        let data = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| anyhow!("invalid token: {e}"))?;
        Ok(data.claims)
    }
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys")
            .field("issuer", &self.issuer)
            .field("ttl_minutes", &self.ttl_minutes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_and_verify_round_trip() {
        let keys = JwtKeys::from_secret("test-secret-at-least-32-bytes-long!", "riskserver", 15);
        let id = Uuid::new_v4();
        let token = keys.issue(id, "user@example.com", Some("Risk Owner".into())).unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.account_id().unwrap(), id);
        assert_eq!(claims.email, "user@example.com");
    }

    #[test]
    fn verify_rejects_foreign_issuer() {
        let ours = JwtKeys::from_secret("test-secret-at-least-32-bytes-long!", "riskserver", 15);
        let theirs = JwtKeys::from_secret("test-secret-at-least-32-bytes-long!", "elsewhere", 15);
        let token = theirs.issue(Uuid::new_v4(), "user@example.com", None).unwrap();
        assert!(ours.verify(&token).is_err());
    }
}
