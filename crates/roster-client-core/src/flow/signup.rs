use futures::channel::oneshot;
use roster_shared::{
    errors::ConversionError,
    internal_error,
    req_args::SignupReqArgs,
    uac::{EmailAddress, Username},
};
use secrecy::{ExposeSecret, SecretString};
use std::fmt::Debug;
use tracing::{error, info};

use crate::{Client, SignupOutcome, UiCallBack};

use super::Navigation;

/// State machine for the signup page. A created account is not authenticated;
/// success routes to the login page.
pub struct SignupFlow {
    pub username: String,
    pub email: String,
    password: SecretString,
    attempt: SignupAttemptStatus,
}

#[derive(Default)]
enum SignupAttemptStatus {
    #[default]
    NotAttempted,
    AwaitingResponse(oneshot::Receiver<anyhow::Result<SignupOutcome>>),
    Failed(String),
    Success,
}

impl Debug for SignupAttemptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAttempted => write!(f, "NotAttempted"),
            Self::AwaitingResponse(_) => write!(f, "AwaitingResponse"),
            Self::Failed(e) => f.debug_tuple("Failed").field(e).finish(),
            Self::Success => write!(f, "Success"),
        }
    }
}

impl SignupFlow {
    pub fn set_password(&mut self, password: SecretString) {
        self.password = password;
    }

    fn is_password_set(&self) -> bool {
        !self.password.expose_secret().is_empty()
    }

    /// First problem with the typed fields, if any; checked before any
    /// network call
    #[must_use]
    pub fn validation_error(&self) -> Option<ConversionError> {
        if let Err(e) = Username::try_from(self.username.clone()) {
            return Some(e);
        }
        if let Err(e) = EmailAddress::try_from(self.email.clone()) {
            return Some(e);
        }
        None
    }

    #[must_use]
    pub fn is_allowed_to_submit(&self) -> bool {
        self.validation_error().is_none()
            && self.is_password_set()
            && matches!(
                self.attempt,
                SignupAttemptStatus::NotAttempted | SignupAttemptStatus::Failed(_)
            )
    }

    /// Sends the signup attempt if the inputs and the current state allow it
    pub fn submit<F: UiCallBack>(&mut self, client: &Client, ui_notify: F) {
        if !self.is_allowed_to_submit() {
            return;
        }
        let args = SignupReqArgs::new(
            self.username.clone(),
            self.email.clone(),
            self.password.clone(),
        );
        let rx = client.signup(args, ui_notify);
        self.attempt = SignupAttemptStatus::AwaitingResponse(rx);
    }

    /// Polls an in-flight attempt; routes to login once the account exists
    pub fn poll_attempt(&mut self) -> Navigation {
        let SignupAttemptStatus::AwaitingResponse(rx) = &mut self.attempt else {
            return Navigation::None;
        };
        match rx.try_recv() {
            Ok(Some(Ok(outcome))) => {
                info!("signup outcome from client-core: {outcome:?}");
                match outcome {
                    SignupOutcome::Created => {
                        self.attempt = SignupAttemptStatus::Success;
                        Navigation::ToLogin
                    }
                    SignupOutcome::Rejected { message } => {
                        self.attempt = SignupAttemptStatus::Failed(message);
                        Navigation::None
                    }
                }
            }
            Ok(Some(Err(e))) => {
                info!("error returned from client-core: {e:?}");
                self.attempt = SignupAttemptStatus::Failed(e.to_string());
                Navigation::None
            }
            Ok(None) => Navigation::None,
            Err(e) => {
                error!("Error receiving on channel. Canceled: {e:?}");
                self.attempt = SignupAttemptStatus::Failed(internal_error!(e));
                Navigation::None
            }
        }
    }

    /// The error to show, if the last attempt failed
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.attempt {
            SignupAttemptStatus::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn clear_error(&mut self) {
        if matches!(self.attempt, SignupAttemptStatus::Failed(_)) {
            self.attempt = SignupAttemptStatus::NotAttempted;
        }
    }
}

impl Default for SignupFlow {
    fn default() -> Self {
        Self {
            username: String::new(),
            email: String::new(),
            password: SecretString::from(""),
            attempt: Default::default(),
        }
    }
}

impl Debug for SignupFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupFlow")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("has_password", &self.is_password_set())
            .field("attempt", &self.attempt)
            .finish()
    }
}
