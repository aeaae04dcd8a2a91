//! Typed client of the department portal API.

pub mod raw;

use parking_lot::RwLock;
use portal_shared::account::{
    handle::{AuthRes, LoginReq, RegisterReq},
    User,
};

pub use portal_shared as shared;

/// Connection to a portal backend.
///
/// Holds the bearer token of the signed in user, if any.
pub struct Context {
    req_client: reqwest::Client,
    url_prefix: String,
    token: RwLock<Option<String>>,
}

impl Context {
    /// Creates a context against the given base url, e.g. `http://localhost:8080`.
    pub fn new(url_prefix: impl Into<String>) -> Self {
        let mut url_prefix = url_prefix.into();
        while url_prefix.ends_with('/') {
            url_prefix.pop();
        }
        Self {
            req_client: reqwest::Client::new(),
            url_prefix,
            token: RwLock::new(None),
        }
    }

    #[inline]
    pub fn token(&self) -> Option<String> {
        self.token.read().clone()
    }

    #[inline]
    pub fn set_token(&self, token: Option<String>) {
        *self.token.write() = token;
    }

    /// Registers an account and signs in as it.
    pub async fn register(&self, req: RegisterReq) -> anyhow::Result<User> {
        let AuthRes { token, user } = raw::call(raw::auth::Register(req), self).await?;
        self.set_token(Some(token));
        Ok(user)
    }

    /// Signs in, keeping the token for later requests.
    pub async fn login(&self, email: &str, password: &str) -> anyhow::Result<User> {
        let AuthRes { token, user } = raw::call(
            raw::auth::Login(LoginReq {
                email: email.parse()?,
                password: password.to_owned(),
            }),
            self,
        )
        .await?;
        self.set_token(Some(token));
        Ok(user)
    }

    #[inline]
    pub fn logout(&self) {
        self.set_token(None);
    }
}
