use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use portal_shared::{
    account::handle::{AuthRes, ForgotPasswordReq, LoginReq, RegisterReq, ResetPasswordReq},
    account::Role,
    Message,
};
use tracing::{info, warn};

use crate::{
    account::{check_password, Account, PasscodeRecord, PasswordHash},
    store::Store,
    Error, Global, Payload,
};

pub async fn register<S: Store>(
    State(Global { store, tokens, .. }): State<Global<S>>,
    Payload(req): Payload<RegisterReq>,
) -> Result<(StatusCode, Json<AuthRes>), Error> {
    let now = Utc::now();
    let account = Account::register(req, now)?;
    if !store.insert_account(&account).await? {
        return Err(Error::UserExists);
    }
    if account.role == Role::Admin {
        warn!(
            "account {} registered as admin by matriculation number {:?}",
            account.email, account.matric_number
        );
    } else {
        info!("account {} registered", account.email);
    }

    Ok((
        StatusCode::CREATED,
        Json(AuthRes {
            token: tokens.issue(&account, now)?,
            user: account.view(),
        }),
    ))
}

pub async fn login<S: Store>(
    State(Global { store, tokens, .. }): State<Global<S>>,
    Payload(LoginReq { email, password }): Payload<LoginReq>,
) -> Result<Json<AuthRes>, Error> {
    let account = store
        .account_by_email(email.as_ref())
        .await?
        .filter(|account| account.password.matches(&password))
        .ok_or(Error::InvalidCredentials)?;
    Ok(Json(AuthRes {
        token: tokens.issue(&account, Utc::now())?,
        user: account.view(),
    }))
}

pub async fn forgot_password<S: Store>(
    State(Global { store, mailer, .. }): State<Global<S>>,
    Payload(ForgotPasswordReq { email }): Payload<ForgotPasswordReq>,
) -> Result<Json<Message>, Error> {
    if store.account_by_email(email.as_ref()).await?.is_none() {
        return Err(Error::EmailNotFound);
    }
    let record = PasscodeRecord::issue(email.to_string(), Utc::now());
    store.replace_passcode(&record).await?;
    mailer.send_passcode(email, record.otp).await?;
    Ok(Json(Message::new("OTP sent to your email")))
}

pub async fn reset_password<S: Store>(
    State(Global { store, .. }): State<Global<S>>,
    Payload(ResetPasswordReq {
        email,
        otp,
        new_password,
        confirm_password,
    }): Payload<ResetPasswordReq>,
) -> Result<Json<Message>, Error> {
    if new_password != confirm_password {
        return Err(Error::PasswordMismatch);
    }
    check_password(&new_password)?;

    let now = Utc::now();
    let record = store
        .find_passcode(email.as_ref(), otp.trim(), now)
        .await?
        .ok_or(Error::PasscodeInvalid)?;
    let mut account = store
        .account_by_email(email.as_ref())
        .await?
        .ok_or(Error::EmailNotFound)?;

    account.password = PasswordHash::new(&new_password);
    if !store.set_password(&account, now).await? {
        return Err(Error::EmailNotFound);
    }
    store.delete::<PasscodeRecord>(&record.id).await?;
    info!("password of {} reset", account.email);
    Ok(Json(Message::new("Password reset successfully")))
}
