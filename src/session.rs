//! Signed-in identity, decoded from the bearer token.
//!
//! A [`Session`] is passed explicitly to every task and chat call; nothing in
//! the crate reads the token store behind the caller's back.

use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use serde::Deserialize;

use crate::error::AuthError;
use crate::models::User;

#[derive(Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
    user: User,
}

impl Session {
    /// Decodes the payload segment of a JWT-shaped token.
    ///
    /// The signature is not verified; the API does that on every request.
    pub fn from_token(token: &str) -> Result<Self, AuthError> {
        let user = decode_user(token)?;
        Ok(Self {
            token: token.to_string(),
            user,
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn user_id(&self) -> &str {
        &self.user.id
    }
}

/// Extracts `sub` and `email` from the token payload.
pub fn decode_user(token: &str) -> Result<User, AuthError> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| AuthError::MalformedToken("missing payload segment".into()))?;

    // Tokens are unpadded base64url, but accept padded input too.
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| URL_SAFE.decode(payload))
        .map_err(|e| AuthError::MalformedToken(format!("payload is not base64url: {}", e)))?;

    let claims: Claims = serde_json::from_slice(&bytes)
        .map_err(|e| AuthError::MalformedToken(format!("payload is not valid claims: {}", e)))?;

    if claims.sub.is_empty() {
        return Err(AuthError::MalformedToken("empty subject".into()));
    }

    Ok(User {
        id: claims.sub,
        email: claims.email,
    })
}

#[cfg(test)]
pub(crate) fn make_token(sub: &str, email: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let claims = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"{}","email":"{}"}}"#, sub, email));
    format!("{}.{}.signature", header, claims)
}
