//! ID token as issued by the identity provider.

use crate::error::{RegchatError, Result};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Claims the client reads from the token payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Echo of the nonce sent with the authorize request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}

/// An OIDC ID token together with its decoded expiry and claims.
///
/// Serialized as `{idToken, expiresAt, claims}`, the shape kept in client
/// state between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdToken {
    /// Raw JWT, sent as the bearer credential
    pub id_token: String,
    /// Expiry in unix seconds
    pub expires_at: i64,
    #[serde(default)]
    pub claims: TokenClaims,
}

#[derive(Deserialize)]
struct Payload {
    #[serde(deserialize_with = "unix_seconds")]
    exp: i64,
    #[serde(flatten)]
    claims: TokenClaims,
}

/// Accepts integral and fractional seconds; fractions are truncated.
fn unix_seconds<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() {
        return Err(serde::de::Error::custom("exp is not a finite number"));
    }
    Ok(value.trunc() as i64)
}

impl IdToken {
    /// Decodes the payload segment of a JWT.
    ///
    /// The signature is not checked; the API validates every bearer token it
    /// receives.
    pub fn from_jwt(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let mut segments = raw.split('.');
        let payload = match (segments.next(), segments.next(), segments.next()) {
            (Some(_header), Some(payload), Some(_signature)) if !payload.is_empty() => payload,
            _ => {
                return Err(RegchatError::auth_required(
                    "ID token is not a well-formed JWT",
                ));
            }
        };

        // Some providers pad the segments even though JWT forbids it.
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| RegchatError::auth_required(format!("ID token payload: {e}")))?;
        let payload: Payload = serde_json::from_slice(&bytes)
            .map_err(|e| RegchatError::auth_required(format!("ID token claims: {e}")))?;

        Ok(Self {
            id_token: raw.to_string(),
            expires_at: payload.exp,
            claims: payload.claims,
        })
    }

    /// A token whose expiry is at or before `now` is expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now.timestamp()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.expires_at, 0)
    }

    /// Name shown in the welcome banner.
    pub fn display_name(&self) -> Option<&str> {
        self.claims
            .name
            .as_deref()
            .or(self.claims.email.as_deref())
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.id_token)
    }
}

/// Returns the token if it is present and still valid.
///
/// Missing and expired tokens both mean the user must sign in again.
pub fn require_valid(token: Option<&IdToken>, now: DateTime<Utc>) -> Result<&IdToken> {
    match token {
        None => Err(RegchatError::auth_required("not signed in")),
        Some(token) if token.is_expired(now) => {
            Err(RegchatError::auth_required("ID token has expired"))
        }
        Some(token) => Ok(token),
    }
}

#[cfg(test)]
pub(crate) fn encode_test_jwt(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.signature")
}
