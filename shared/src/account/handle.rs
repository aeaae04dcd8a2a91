use serde::{Deserialize, Serialize};

use super::{Level, User};

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RegisterReq {
    pub first_name: String,
    pub last_name: String,
    pub email: lettre::Address,
    pub matric_number: String,
    pub phone_number: String,
    pub password: String,
    pub level: Level,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginReq {
    pub email: lettre::Address,
    pub password: String,
}

/// Returned by both registering and logging in.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuthRes {
    pub token: String,
    pub user: User,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ForgotPasswordReq {
    pub email: lettre::Address,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordReq {
    pub email: lettre::Address,
    pub otp: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePictureReq {
    pub profile_picture: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct StudentsQuery {
    #[serde(default, deserialize_with = "crate::empty_as_none")]
    pub level: Option<Level>,
}
