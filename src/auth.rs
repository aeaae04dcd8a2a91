//! Bearer tokens and the extractors guarding protected routes.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use portal_shared::account::Role;
use serde::{Deserialize, Serialize};

use crate::{account::Account, store::Store, Error, Global};

/// Days a token stays valid.
pub const TOKEN_LIFETIME_DAYS: i64 = 7;

/// Claims carried by a token.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: String,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Keys signing and verifying HS256 tokens.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Signs a token for `account`, issued at `now`.
    pub fn issue(&self, account: &Account, now: DateTime<Utc>) -> Result<String, Error> {
        let claims = Claims {
            user_id: account.id.clone(),
            email: account.email.clone(),
            role: account.role,
            iat: now.timestamp(),
            exp: (now + Duration::days(TOKEN_LIFETIME_DAYS)).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(From::from)
    }

    /// Checks the signature and expiry of a token.
    pub fn verify(&self, token: &str) -> Result<Claims, Error> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| Error::InvalidToken)
    }
}

/// An authenticated caller.
#[derive(Debug, Clone)]
pub struct Auth {
    pub user: String,
    pub email: String,
    pub role: Role,
}

impl Auth {
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[async_trait]
impl<S: Store> FromRequestParts<Global<S>> for Auth {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Global<S>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .ok_or(Error::MissingAuthHeader)?
            .to_str()
            .map_err(|_| Error::InvalidAuthHeader)?;
        let token = header
            .strip_prefix("Bearer ")
            .filter(|token| !token.is_empty())
            .ok_or(Error::InvalidAuthHeader)?;
        let claims = state.tokens.verify(token)?;
        Ok(Self {
            user: claims.user_id,
            email: claims.email,
            role: claims.role,
        })
    }
}

/// An authenticated caller with the admin role.
#[derive(Debug, Clone)]
pub struct Admin(pub Auth);

#[async_trait]
impl<S: Store> FromRequestParts<Global<S>> for Admin {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Global<S>,
    ) -> Result<Self, Self::Rejection> {
        let auth = Auth::from_request_parts(parts, state).await?;
        if auth.is_admin() {
            Ok(Self(auth))
        } else {
            Err(Error::AdminRequired)
        }
    }
}

#[cfg(test)]
mod tests {
    use portal_shared::account::Level;

    use super::*;
    use crate::account::PasswordHash;

    fn account() -> Account {
        let now = Utc::now();
        Account {
            id: "65a1f0c2e4b0a1b2c3d4e5f6".to_owned(),
            first_name: "Ada".to_owned(),
            last_name: "Obi".to_owned(),
            email: "ada@bowen.edu.ng".to_owned(),
            matric_number: "3/1001".to_owned(),
            phone_number: "08000000000".to_owned(),
            password: PasswordHash::new("password123"),
            role: Role::Student,
            level: Level::try_from(300).unwrap(),
            profile_picture: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn issue_and_verify() {
        let keys = TokenKeys::new("secret");
        let now = Utc::now();
        let token = keys.issue(&account(), now).unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.user_id, "65a1f0c2e4b0a1b2c3d4e5f6");
        assert_eq!(claims.role, Role::Student);
        assert_eq!(claims.exp - claims.iat, TOKEN_LIFETIME_DAYS * 24 * 60 * 60);

        assert!(TokenKeys::new("other").verify(&token).is_err());
    }

    #[test]
    fn expired_token() {
        let keys = TokenKeys::new("secret");
        let token = keys
            .issue(&account(), Utc::now() - Duration::days(TOKEN_LIFETIME_DAYS + 1))
            .unwrap();
        assert!(matches!(keys.verify(&token), Err(Error::InvalidToken)));
    }
}
