// Credential (JWT) issuing and decoding

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::{AuthConfiguration, AuthError};

#[derive(Debug, Serialize, Deserialize)]
pub struct CredentialClaims {
    /// Issued at (UTC timestamp)
    pub iat: i64,

    /// Expiration (UTC timestamp)
    pub exp: i64,

    /// Subject (user ID)
    pub sub: String,

    /// Session marker live at issuance time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
}

/// Issues a signed credential
///
/// # Arguments
///
/// * `config` - Authentication configuration
/// * `user_id` - The user the credential is for
/// * `session` - Session marker to stamp into the credential
/// * `now` - Issuance time
pub fn issue_credential(
    config: &AuthConfiguration,
    user_id: &str,
    session: Option<&str>,
    now: DateTime<Utc>,
) -> Result<String, AuthError> {
    let iat = now.timestamp();

    let claims = CredentialClaims {
        iat,
        exp: iat + config.token_lifetime_seconds(),
        sub: user_id.to_string(),
        session: session.map(|s| s.to_string()),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AuthError::Issue(e.to_string()))
}

/// Verifies the signature and expiry of a credential
/// and returns its claims
pub fn decode_credential(
    config: &AuthConfiguration,
    token: &str,
) -> Result<CredentialClaims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);

    match decode::<CredentialClaims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => Ok(data.claims),
        Err(e) => match e.kind() {
            ErrorKind::ExpiredSignature => Err(AuthError::ExpiredCredential),
            _ => Err(AuthError::InvalidCredential),
        },
    }
}

// Tests

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn test_config(secret: &str) -> AuthConfiguration {
        AuthConfiguration {
            jwt_secret: secret.to_string(),
            token_lifetime_minutes: 1440,
            allow_unmarked_credentials: false,
        }
    }

    #[test]
    fn test_issue_and_decode() {
        let config = test_config("unit-test-secret");
        let now = Utc::now();

        let token = issue_credential(&config, "user-1", Some("marker-1"), now).unwrap();
        let claims = decode_credential(&config, &token).unwrap();

        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.session.as_deref(), Some("marker-1"));
        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.exp - claims.iat, 1440 * 60);
    }

    #[test]
    fn test_unmarked_credential_has_no_session_claim() {
        let config = test_config("unit-test-secret");

        let token = issue_credential(&config, "user-1", None, Utc::now()).unwrap();
        let claims = decode_credential(&config, &token).unwrap();

        assert!(claims.session.is_none());
    }

    #[test]
    fn test_expired_is_distinct_from_tampered() {
        let config = test_config("unit-test-secret");

        let expired = issue_credential(
            &config,
            "user-1",
            Some("m"),
            Utc::now() - Duration::minutes(1441),
        )
        .unwrap();

        assert!(matches!(
            decode_credential(&config, &expired),
            Err(AuthError::ExpiredCredential)
        ));

        let forged = issue_credential(&test_config("other-secret"), "user-1", Some("m"), Utc::now())
            .unwrap();

        assert!(matches!(
            decode_credential(&config, &forged),
            Err(AuthError::InvalidCredential)
        ));
    }

    #[test]
    fn test_malformed_tokens() {
        let config = test_config("unit-test-secret");

        for token in ["", "abc", "a.b.c", "Bearer xyz"] {
            assert!(matches!(
                decode_credential(&config, token),
                Err(AuthError::InvalidCredential)
            ));
        }
    }
}
