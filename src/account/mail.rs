use lettre::{
    message::Mailbox, transport::smtp, AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
};
use tracing::{error, info};

use super::{Passcode, PasscodeRecord};
use crate::{config, Error};

const SENDER: &str = "Department Portal";

/// Port of SMTP with implicit TLS.
const SMTPS_PORT: u16 = 465;

/// Outbound mail delivery.
///
/// Without an SMTP configuration passcodes are written to the log instead.
pub struct Mailer {
    smtp: Option<(AsyncSmtpTransport<Tokio1Executor>, lettre::Address)>,
}

impl Mailer {
    pub fn new(config: Option<&config::Smtp>) -> Result<Self, Error> {
        let Some(config) = config else {
            info!("smtp not configured, passcodes will be logged");
            return Ok(Self::disabled());
        };
        let builder = if config.port == SMTPS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
        };
        let transport = builder
            .port(config.port)
            .credentials(smtp::authentication::Credentials::new(
                config.email.to_string(),
                config.password.to_owned(),
            ))
            .build();
        Ok(Self {
            smtp: Some((transport, config.email.to_owned())),
        })
    }

    /// A mailer that only logs.
    #[inline]
    pub fn disabled() -> Self {
        Self { smtp: None }
    }

    /// Sends a password reset passcode to `to`.
    pub async fn send_passcode(
        &self,
        to: lettre::Address,
        passcode: Passcode,
    ) -> Result<(), Error> {
        let Some((transport, from)) = &self.smtp else {
            info!("passcode for {to}: {passcode}");
            return Ok(());
        };

        let msg = lettre::Message::builder()
            .from(Mailbox {
                email: from.to_owned(),
                name: Some(SENDER.to_owned()),
            })
            .to(Mailbox {
                name: None,
                email: to.clone(),
            })
            .subject("Password Reset OTP")
            .body(format!(
                "Your OTP for password reset is: {passcode}\n\n\
                This OTP will expire in {} minutes.\n\n\
                If you didn't request this, please ignore this email.",
                PasscodeRecord::LIFETIME_MINUTES,
            ))?;
        if let Err(err) = transport.send(msg).await {
            error!("error sending email with smtp: {err}, passcode for {to}: {passcode}");
            return Err(err.into());
        }
        Ok(())
    }
}
