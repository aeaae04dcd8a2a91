use portal_shared::{
    account::{
        handle::{AuthRes, ForgotPasswordReq, LoginReq, RegisterReq, ResetPasswordReq},
        User,
    },
    content::NoteDownload,
    Message,
};

use super::request;

pub struct Register(pub RegisterReq);

request!(Register => AuthRes, POST "/api/auth/register", json(req) = &req.0);

pub struct Login(pub LoginReq);

request!(Login => AuthRes, POST "/api/auth/login", json(req) = &req.0);

/// Mails a password reset passcode.
pub struct ForgotPassword(pub ForgotPasswordReq);

request!(ForgotPassword => Message, POST "/api/auth/forgot-password", json(req) = &req.0);

pub struct ResetPassword(pub ResetPasswordReq);

request!(ResetPassword => Message, POST "/api/auth/reset-password", json(req) = &req.0);

/// The signed in user.
pub struct Profile;

request!(Profile => User, GET "/api/users/profile");

/// Downloads recorded for the signed in user.
pub struct Downloads;

request!(Downloads => Vec<NoteDownload>, GET "/api/users/downloads");
