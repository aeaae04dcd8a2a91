//! HTTP backend of the department portal.

use std::{sync::Arc, time::Duration};

use axum::{
    extract::{
        multipart::MultipartError,
        rejection::{JsonRejection, PathRejection, QueryRejection},
        DefaultBodyLimit, FromRequest, FromRequestParts,
    },
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use lettre::transport::smtp;
use portal_shared::{
    content::{Announcement, Note, PastQuestion},
    ErrorInfo,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, warn};

pub mod config;

pub mod account;
pub mod auth;
pub mod election;
pub mod handle;
pub mod stats;
pub mod storage;
pub mod store;

/// The module for unit testing, will only be available in dev env.
#[cfg(test)]
mod tests;

use account::mail::Mailer;
use auth::TokenKeys;
use storage::ObjectStorage;
use store::Store;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    MalformedRequest(String),
    #[error("invalid level")]
    InvalidLevel,
    #[error("password must be at least {} characters", account::MIN_PASSWORD_LEN)]
    PasswordTooShort,
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error("invalid or expired otp")]
    PasscodeInvalid,
    #[error("invalid election: {0}")]
    InvalidElection(String),
    #[error("no file uploaded")]
    NoFile,
    #[error("invalid file type, only images are allowed")]
    NotAnImage,
    #[error("url parameter is required")]
    MissingUrl,
    #[error("url must be an absolute http(s) url")]
    InvalidUrl,
    #[error("multipart error: {0}")]
    Multipart(MultipartError),
    #[error("address error: {0}")]
    EmailAddress(lettre::address::AddressError),

    #[error("authorization header required")]
    MissingAuthHeader,
    #[error("invalid authorization format")]
    InvalidAuthHeader,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("admin access required")]
    AdminRequired,
    #[error("election currently closed")]
    ElectionClosed,

    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("no account registered with this email")]
    EmailNotFound,

    #[error("user already exists")]
    UserExists,
    #[error("you have already voted for this position")]
    AlreadyVoted,

    #[error("failed to fetch file from storage")]
    Upstream(StatusCode),
    #[error("database errored")]
    Store(store::Error),
    #[error("object storage errored: {0}")]
    Storage(storage::Error),
    #[error("failed to sign token")]
    Token(jsonwebtoken::errors::Error),
    #[error("email message error: {0}")]
    Lettre(lettre::error::Error),
    #[error("failed to send email")]
    Smtp(smtp::Error),
}

impl Error {
    pub fn to_status_code(&self) -> StatusCode {
        match self {
            Error::MalformedRequest(_)
            | Error::InvalidLevel
            | Error::PasswordTooShort
            | Error::PasswordMismatch
            | Error::PasscodeInvalid
            | Error::InvalidElection(_)
            | Error::NoFile
            | Error::NotAnImage
            | Error::MissingUrl
            | Error::InvalidUrl
            | Error::Multipart(_)
            | Error::EmailAddress(_) => StatusCode::BAD_REQUEST,
            Error::MissingAuthHeader
            | Error::InvalidAuthHeader
            | Error::InvalidToken
            | Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::AdminRequired | Error::ElectionClosed => StatusCode::FORBIDDEN,
            Error::NotFound(_) | Error::EmailNotFound => StatusCode::NOT_FOUND,
            Error::UserExists | Error::AlreadyVoted => StatusCode::CONFLICT,
            Error::Upstream(status) => *status,
            Error::Store(_)
            | Error::Storage(_)
            | Error::Token(_)
            | Error::Lettre(_)
            | Error::Smtp(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.to_status_code();
        if status.is_server_error() {
            error!("{self:?}");
        }
        (
            status,
            axum::Json(ErrorInfo {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Implements `From<T>` for [`Error`].
macro_rules! impl_from {
    ($($t:ty => $v:ident),* $(,)?) => {
        $(
            impl From<$t> for $crate::Error {
                #[inline]
                fn from(err: $t) -> Self {
                    Self::$v(err)
                }
            }
        )*
    };
}

impl_from! {
    MultipartError => Multipart,
    lettre::address::AddressError => EmailAddress,
    store::Error => Store,
    storage::Error => Storage,
    jsonwebtoken::errors::Error => Token,
    lettre::error::Error => Lettre,
    smtp::Error => Smtp,
}

/// Implements `From<T>` for [`Error`] on extractor rejections,
/// reported as malformed requests.
macro_rules! impl_from_rejection {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for $crate::Error {
                #[inline]
                fn from(rejection: $t) -> Self {
                    Self::MalformedRequest(rejection.body_text())
                }
            }
        )*
    };
}

impl_from_rejection!(JsonRejection, QueryRejection, PathRejection);

/// A JSON request body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct Payload<T>(pub T);

/// A query string.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct Params<T>(pub T);

/// Path parameters.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct PathParam<T>(pub T);

/// Services shared by every handler.
pub struct Global<S> {
    pub store: Arc<S>,
    pub storage: Arc<dyn ObjectStorage>,
    pub mailer: Arc<Mailer>,
    pub tokens: Arc<TokenKeys>,
}

impl<S> Clone for Global<S> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            storage: self.storage.clone(),
            mailer: self.mailer.clone(),
            tokens: self.tokens.clone(),
        }
    }
}

/// Largest accepted request body, uploads included.
const BODY_LIMIT: usize = 50 * 1024 * 1024;

/// Construct a router.
pub fn router<S: Store>(global: Global<S>, frontend_url: &str) -> Router {
    let mut cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([header::CONTENT_LENGTH])
        .allow_credentials(true)
        .max_age(Duration::from_secs(12 * 60 * 60));
    match HeaderValue::from_str(frontend_url) {
        Ok(origin) => cors = cors.allow_origin(origin),
        Err(_) => warn!("invalid frontend url {frontend_url:?}, no origin allowed"),
    }

    Router::new()
        .route("/health", get(handle::health))
        // auth
        .route("/api/auth/register", post(handle::auth::register::<S>))
        .route("/api/auth/login", post(handle::auth::login::<S>))
        .route("/api/auth/forgot-password", post(handle::auth::forgot_password::<S>))
        .route("/api/auth/reset-password", post(handle::auth::reset_password::<S>))
        // users
        .route("/api/users/profile", get(handle::user::profile::<S>))
        .route("/api/users/downloads", get(handle::user::downloads::<S>))
        .route("/api/users/students", get(handle::user::students::<S>))
        .route("/api/users/profile-picture", put(handle::user::set_profile_picture::<S>))
        // notes
        .route(
            "/api/notes",
            get(handle::content::list::<S, Note>).post(handle::content::create_note::<S>),
        )
        .route(
            "/api/notes/:id",
            get(handle::content::get::<S, Note>)
                .delete(handle::content::delete::<S, Note>),
        )
        .route("/api/notes/:id/download", post(handle::content::download_note::<S>))
        // past questions
        .route(
            "/api/past-questions",
            get(handle::content::list::<S, PastQuestion>)
                .post(handle::content::create_past_question::<S>),
        )
        .route(
            "/api/past-questions/:id",
            get(handle::content::get::<S, PastQuestion>)
                .delete(handle::content::delete::<S, PastQuestion>),
        )
        // announcements
        .route(
            "/api/announcements",
            get(handle::content::list::<S, Announcement>)
                .post(handle::content::create_announcement::<S>),
        )
        .route(
            "/api/announcements/:id",
            get(handle::content::get::<S, Announcement>)
                .delete(handle::content::delete::<S, Announcement>),
        )
        // elections
        .route(
            "/api/elections",
            get(handle::election::list::<S>).post(handle::election::create::<S>),
        )
        .route("/api/elections/vote", post(handle::election::vote::<S>))
        .route("/api/elections/my-votes", get(handle::election::my_votes::<S>))
        .route(
            "/api/elections/:id",
            get(handle::election::get::<S>)
                .put(handle::election::update::<S>)
                .delete(handle::election::delete::<S>),
        )
        .route("/api/elections/:id/results", get(handle::election::results::<S>))
        .route("/api/elections/:id/toggle", put(handle::election::toggle::<S>))
        .route(
            "/api/elections/:id/declare-winner",
            put(handle::election::declare_winner::<S>),
        )
        // courses
        .route("/api/courses", get(handle::course::all))
        .route("/api/courses/level/:level", get(handle::course::by_level))
        .route(
            "/api/courses/level/:level/semester/:semester",
            get(handle::course::by_level_and_semester),
        )
        // uploads
        .route("/api/upload/file", post(handle::upload::file::<S>))
        .route("/api/upload/profile-picture", post(handle::upload::profile_picture::<S>))
        // stats
        .route("/api/stats", get(handle::stats::get::<S>))
        .layer(cors)
        // the proxy sets its own cors headers
        .route("/api/proxy/pdf", get(handle::upload::proxy::<S>))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .with_state(global)
}
