use futures::channel::oneshot;
use roster_shared::{id::UserId, internal_error, req_args::LoginReqArgs, session::Session};
use secrecy::{ExposeSecret, SecretString};
use std::fmt::Debug;
use tracing::{error, info};

use crate::{Client, LoginOutcome, UiCallBack};

use super::Navigation;

/// State machine for the login page: a mount check that forwards a visitor
/// who still has a valid session, and the submission attempt itself
pub struct LoginFlow {
    pub email: String,
    password: SecretString,
    attempt: LoginAttemptStatus,
    mount_check: MountCheckStatus,
}

type AwaitingAttempt = oneshot::Receiver<anyhow::Result<LoginOutcome>>;

#[derive(Default)]
enum LoginAttemptStatus {
    #[default]
    NotAttempted,
    AwaitingResponse(AwaitingAttempt),
    Failed(String),
    Success(UserId),
}

impl Debug for LoginAttemptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAttempted => write!(f, "NotAttempted"),
            Self::AwaitingResponse(_) => write!(f, "AwaitingResponse"),
            Self::Failed(e) => f.debug_tuple("Failed").field(e).finish(),
            Self::Success(id) => f.debug_tuple("Success").field(id).finish(),
        }
    }
}

#[derive(Debug, Default)]
enum MountCheckStatus {
    #[default]
    NotStarted,
    Checking(oneshot::Receiver<Session>),
    Done,
}

impl LoginAttemptStatus {
    fn is_allowed_to_login(&self) -> bool {
        match self {
            LoginAttemptStatus::NotAttempted | LoginAttemptStatus::Failed(_) => true,
            LoginAttemptStatus::AwaitingResponse(_) | LoginAttemptStatus::Success(_) => false,
        }
    }
}

impl LoginFlow {
    pub fn set_password(&mut self, password: SecretString) {
        self.password = password;
    }

    fn is_password_set(&self) -> bool {
        !self.password.expose_secret().is_empty()
    }

    #[must_use]
    pub fn is_allowed_to_login(&self) -> bool {
        !self.email.is_empty() && self.is_password_set() && self.attempt.is_allowed_to_login()
    }

    /// Forwards a visitor who still has a valid session straight to their
    /// profile instead of showing the form
    pub fn poll_mount_check<F: UiCallBack>(&mut self, client: &Client, ui_notify: F) -> Navigation {
        match &mut self.mount_check {
            MountCheckStatus::NotStarted => {
                self.mount_check = MountCheckStatus::Checking(client.validate_session(ui_notify));
                Navigation::None
            }
            MountCheckStatus::Checking(rx) => match rx.try_recv() {
                Ok(Some(Session::Valid(identity))) => {
                    self.mount_check = MountCheckStatus::Done;
                    Navigation::ToProfile(identity.user_id)
                }
                Ok(Some(Session::Anonymous | Session::Invalid)) => {
                    // Stay on the form; an invalid token has already been cleared
                    self.mount_check = MountCheckStatus::Done;
                    Navigation::None
                }
                Ok(None) => Navigation::None,
                Err(e) => {
                    error!("Error receiving on channel. Canceled: {e:?}");
                    self.mount_check = MountCheckStatus::Done;
                    Navigation::None
                }
            },
            MountCheckStatus::Done => Navigation::None,
        }
    }

    /// Sends the login attempt if the inputs and the current state allow it
    pub fn submit<F: UiCallBack>(&mut self, client: &Client, ui_notify: F) {
        if !self.is_allowed_to_login() {
            return;
        }
        let args = LoginReqArgs::new(self.email.clone(), self.password.clone());
        let rx = client.login(args, ui_notify);
        self.attempt = LoginAttemptStatus::AwaitingResponse(rx);
    }

    /// Polls an in-flight attempt; emits the navigation to follow on success
    pub fn poll_attempt(&mut self) -> Navigation {
        let LoginAttemptStatus::AwaitingResponse(rx) = &mut self.attempt else {
            return Navigation::None;
        };
        match rx.try_recv() {
            Ok(Some(Ok(outcome))) => {
                info!("login outcome from client-core: {outcome:?}");
                match outcome {
                    LoginOutcome::Success { user_id } => {
                        self.attempt = LoginAttemptStatus::Success(user_id);
                        Navigation::ToProfile(user_id)
                    }
                    LoginOutcome::Rejected { message } => {
                        // The server's explanation, surfaced as is
                        self.attempt = LoginAttemptStatus::Failed(message);
                        Navigation::None
                    }
                }
            }
            Ok(Some(Err(e))) => {
                info!("error returned from client-core: {e:?}");
                self.attempt = LoginAttemptStatus::Failed(e.to_string());
                Navigation::None
            }
            Ok(None) => Navigation::None,
            Err(e) => {
                error!("Error receiving on channel. Canceled: {e:?}");
                self.attempt = LoginAttemptStatus::Failed(internal_error!(e));
                Navigation::None
            }
        }
    }

    /// The error to show, if the last attempt failed
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.attempt {
            LoginAttemptStatus::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn clear_error(&mut self) {
        if matches!(self.attempt, LoginAttemptStatus::Failed(_)) {
            self.attempt = LoginAttemptStatus::NotAttempted;
        }
    }
}

impl Default for LoginFlow {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: SecretString::from(""),
            attempt: Default::default(),
            mount_check: Default::default(),
        }
    }
}

impl Debug for LoginFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginFlow")
            .field("email", &self.email)
            .field("has_password", &self.is_password_set())
            .field("attempt", &self.attempt)
            .field("mount_check", &self.mount_check)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_in() -> LoginFlow {
        let mut flow = LoginFlow::default();
        flow.email = "a@x.com".to_string();
        flow.set_password(SecretString::from("p"));
        flow
    }

    #[test]
    fn blank_fields_block_submission() {
        // Arrange
        let mut flow = LoginFlow::default();
        let client = Client::default();

        // Act - no async runtime is available so an attempted request would
        // blow up; submit must refuse before reaching the network
        flow.submit(&client, || {});

        // Assert
        assert!(!flow.is_allowed_to_login());
        assert!(matches!(flow.attempt, LoginAttemptStatus::NotAttempted));
    }

    #[test]
    fn rejection_message_is_surfaced_verbatim() {
        // Arrange
        let mut flow = filled_in();
        let (tx, rx) = oneshot::channel();
        flow.attempt = LoginAttemptStatus::AwaitingResponse(rx);
        tx.send(Ok(LoginOutcome::Rejected {
            message: "User not found".to_string(),
        }))
        .unwrap();

        // Act
        let nav = flow.poll_attempt();

        // Assert
        assert_eq!(nav, Navigation::None);
        assert_eq!(flow.error(), Some("User not found"));
    }

    #[test]
    fn success_navigates_to_the_returned_users_profile() {
        // Arrange
        let mut flow = filled_in();
        let (tx, rx) = oneshot::channel();
        flow.attempt = LoginAttemptStatus::AwaitingResponse(rx);
        tx.send(Ok(LoginOutcome::Success { user_id: 7.into() }))
            .unwrap();

        // Act
        let nav = flow.poll_attempt();

        // Assert
        assert_eq!(nav, Navigation::ToProfile(7.into()));
        assert!(!flow.is_allowed_to_login(), "no resubmission after success");
    }

    #[test]
    fn mount_check_forwards_a_still_valid_session() {
        // Arrange
        use roster_shared::{session::SessionIdentity, uac::Role};
        let mut flow = LoginFlow::default();
        let (tx, rx) = oneshot::channel();
        flow.mount_check = MountCheckStatus::Checking(rx);
        tx.send(Session::Valid(SessionIdentity {
            user_id: 3.into(),
            role: Role::User,
        }))
        .unwrap();

        // Act
        let nav = flow.poll_mount_check(&Client::default(), || {});

        // Assert
        assert_eq!(nav, Navigation::ToProfile(3.into()));
    }

    #[test]
    fn failed_attempt_can_be_cleared_and_retried() {
        // Arrange
        let mut flow = filled_in();
        flow.attempt = LoginAttemptStatus::Failed("boom".to_string());

        // Act
        flow.clear_error();

        // Assert
        assert!(flow.error().is_none());
        assert!(flow.is_allowed_to_login());
    }
}
