use futures::channel::oneshot;
use roster_shared::{
    internal_error,
    session::{Session, SessionIdentity},
};

use crate::{Client, UiCallBack};

use super::Navigation;

/// What a protected page requires of the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleRequirement {
    /// Any authenticated user
    Authenticated,
    /// Admins only. Anyone else is denied outright (redirected); the page is
    /// never shown with the admin controls merely hidden
    Admin,
}

impl RoleRequirement {
    fn allows(self, identity: &SessionIdentity) -> bool {
        match self {
            RoleRequirement::Authenticated => true,
            RoleRequirement::Admin => identity.role.is_admin(),
        }
    }
}

/// Mount-time gate for a protected page.
///
/// Decides exactly once per mount whether the viewer may proceed and with
/// what identity; there is no retry, a failed check sends the viewer back to
/// login. Dropping the gate mid-check discards the resolution.
#[derive(Debug)]
pub struct PageGate {
    requirement: RoleRequirement,
    state: GateState,
}

#[derive(Debug, Default)]
enum GateState {
    #[default]
    NotStarted,
    Checking(oneshot::Receiver<Session>),
    Allowed(SessionIdentity),
    Denied,
}

impl PageGate {
    #[must_use]
    pub fn new(requirement: RoleRequirement) -> Self {
        Self {
            requirement,
            state: GateState::default(),
        }
    }

    /// Drives the check. Returns [`Navigation::ToLogin`] exactly once, on the
    /// transition into denial; the caller must follow it.
    pub fn poll<F: UiCallBack>(&mut self, client: &Client, ui_notify: F) -> Navigation {
        match &mut self.state {
            GateState::NotStarted => {
                self.state = GateState::Checking(client.validate_session(ui_notify));
                Navigation::None
            }
            GateState::Checking(rx) => match rx.try_recv() {
                Ok(Some(session)) => self.resolve(session, client),
                Ok(None) => Navigation::None, // Still checking
                Err(e) => {
                    // Resolution went missing; same exit as a failed validation
                    internal_error!(format!("gate channel canceled: {e:?}"));
                    self.state = GateState::Denied;
                    Navigation::ToLogin
                }
            },
            GateState::Allowed(_) | GateState::Denied => Navigation::None,
        }
    }

    fn resolve(&mut self, session: Session, client: &Client) -> Navigation {
        match session {
            Session::Valid(identity) if self.requirement.allows(&identity) => {
                self.state = GateState::Allowed(identity);
                Navigation::None
            }
            Session::Valid(_) => {
                // A role mismatch carries the same global side effect as a 401
                client.logout();
                self.state = GateState::Denied;
                Navigation::ToLogin
            }
            Session::Anonymous | Session::Invalid => {
                self.state = GateState::Denied;
                Navigation::ToLogin
            }
        }
    }

    /// The identity the page proceeds with, once allowed
    #[must_use]
    pub fn identity(&self) -> Option<&SessionIdentity> {
        match &self.state {
            GateState::Allowed(identity) => Some(identity),
            _ => None,
        }
    }

    /// Returns `true` while the validation round trip is still in flight
    #[must_use]
    pub fn is_checking(&self) -> bool {
        matches!(self.state, GateState::Checking(_))
    }

    #[must_use]
    pub fn is_denied(&self) -> bool {
        matches!(self.state, GateState::Denied)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use roster_shared::{token::AuthToken, uac::Role};
    use rstest::rstest;

    use crate::{MemoryTokenStore, TokenStore as _};

    use super::*;

    fn identity(role: Role) -> SessionIdentity {
        SessionIdentity {
            user_id: 1.into(),
            role,
        }
    }

    #[test]
    fn valid_user_passes_an_authenticated_gate() {
        // Arrange
        let mut gate = PageGate::new(RoleRequirement::Authenticated);
        let client = Client::default();

        // Act
        let nav = gate.resolve(Session::Valid(identity(Role::User)), &client);

        // Assert
        assert_eq!(nav, Navigation::None);
        assert_eq!(gate.identity(), Some(&identity(Role::User)));
    }

    #[rstest]
    #[case::anonymous(Session::Anonymous)]
    #[case::invalid(Session::Invalid)]
    fn unauthenticated_viewer_is_sent_to_login(#[case] session: Session) {
        // Arrange
        let mut gate = PageGate::new(RoleRequirement::Authenticated);
        let client = Client::default();

        // Act
        let nav = gate.resolve(session, &client);

        // Assert
        assert_eq!(nav, Navigation::ToLogin);
        assert!(gate.is_denied());
    }

    #[test]
    fn non_admin_is_denied_the_admin_gate_and_loses_the_token() {
        // Arrange - a valid session whose role is not good enough
        let store = Arc::new(MemoryTokenStore::default());
        store.set(&AuthToken::from_raw("abc"));
        let client = Client::new_with_store("http://localhost:4000".to_string(), store.clone());
        let mut gate = PageGate::new(RoleRequirement::Admin);

        // Act
        let nav = gate.resolve(Session::Valid(identity(Role::User)), &client);

        // Assert - redirected, not shown a stripped page, and the token is gone
        assert_eq!(nav, Navigation::ToLogin);
        assert!(gate.is_denied());
        assert!(gate.identity().is_none());
        assert!(store.get().is_none());
    }

    #[test]
    fn admin_passes_the_admin_gate() {
        // Arrange
        let mut gate = PageGate::new(RoleRequirement::Admin);
        let client = Client::default();

        // Act
        let nav = gate.resolve(Session::Valid(identity(Role::Admin)), &client);

        // Assert
        assert_eq!(nav, Navigation::None);
        assert!(gate.identity().is_some());
    }

    #[test]
    fn denial_is_final_for_the_page_load() {
        // Arrange
        let mut gate = PageGate::new(RoleRequirement::Authenticated);
        let client = Client::default();
        let _ = gate.resolve(Session::Invalid, &client);

        // Act - later polls neither re-check nor re-emit the redirect
        let nav = gate.poll(&client, || {});

        // Assert
        assert_eq!(nav, Navigation::None);
        assert!(gate.is_denied());
    }
}
