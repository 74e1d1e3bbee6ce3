use roster_shared::{
    id::UserId,
    session::SessionIdentity,
    uac::{AccountStatus, AdminActionError, ManagedUser, Role},
};

use crate::{AdminAction, Client, UiCallBack};

use super::{get_save_outcome, AwaitingType, DataState, Navigation, SaveState};

/// Page model for the management screen.
///
/// Constructed only with the identity the admin gate resolved, which also
/// sequences the listing fetch behind the gate's validation round trip. Rows
/// are never updated speculatively: a mutation changes the listing only after
/// the server confirms it, and a failure is acknowledged, never retried.
#[derive(Debug)]
pub struct AdminPanel {
    viewer: SessionIdentity,
    accounts: DataState<Vec<ManagedUser>>,
    action: ActionState,
    ack: Option<String>,
}

#[derive(Debug, Default)]
enum ActionState {
    #[default]
    Idle,
    /// Self targeted actions park here until explicitly confirmed
    AwaitingConfirmation { target: UserId, action: AdminAction },
    Saving { target: UserId, action: AdminAction, status: DataState<()> },
}

impl AdminPanel {
    /// `viewer` must be the identity the admin gate resolved for this mount
    #[must_use]
    pub fn new(viewer: SessionIdentity) -> Self {
        debug_assert!(
            viewer.role.is_admin(),
            "the admin gate must resolve before the panel exists"
        );
        Self {
            viewer,
            accounts: Default::default(),
            action: Default::default(),
            ack: None,
        }
    }

    /// Drives the listing fetch; call every tick until [`Self::accounts`]
    /// returns `Some`.
    ///
    /// Emits [`Navigation::ToLogin`] once if the fetch fails in a way that
    /// also ended the session (401 or transport failure) - a viewer the
    /// server turns away gets no table at all, empty or otherwise.
    pub fn poll_fetch<F: UiCallBack>(&mut self, client: &Client, ui_notify: F) -> Navigation {
        if self.accounts.is_present() {
            return Navigation::None;
        }
        let was_failed = matches!(self.accounts.as_ref(), DataState::Failed(_));
        let fetch_client = client.clone();
        self.accounts
            .poll(move || AwaitingType(fetch_client.list_accounts(ui_notify)));
        let now_failed = matches!(self.accounts.as_ref(), DataState::Failed(_));
        if !was_failed && now_failed && !client.is_authenticated() {
            return Navigation::ToLogin;
        }
        Navigation::None
    }

    #[must_use]
    pub fn accounts(&self) -> Option<&[ManagedUser]> {
        match self.accounts.as_ref() {
            DataState::Present(accounts) => Some(accounts),
            _ => None,
        }
    }

    #[must_use]
    pub fn fetch_error(&self) -> Option<&str> {
        match self.accounts.as_ref() {
            DataState::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// The acknowledgment of the most recent action, kept until the next one
    #[must_use]
    pub fn ack(&self) -> Option<&str> {
        self.ack.as_deref()
    }

    /// Starts a mutation against `target`.
    ///
    /// An action aimed at the viewer's own account is not dispatched: it
    /// parks until [`Self::confirm_pending_action`] (or
    /// [`Self::cancel_pending_action`]), so an admin cannot lock themselves
    /// out by a stray click.
    pub fn begin_action<F: UiCallBack>(
        &mut self,
        client: &Client,
        target: UserId,
        action: AdminAction,
        ui_notify: F,
    ) -> Result<(), AdminActionError> {
        if !matches!(self.action, ActionState::Idle) {
            return Ok(()); // One action at a time; wait for it to settle
        }
        if target == self.viewer.user_id {
            self.action = ActionState::AwaitingConfirmation { target, action };
            return Err(AdminActionError::SelfActionNeedsConfirmation);
        }
        self.dispatch(client, target, action, ui_notify);
        Ok(())
    }

    /// Dispatches the parked self targeted action
    pub fn confirm_pending_action<F: UiCallBack>(&mut self, client: &Client, ui_notify: F) {
        if let ActionState::AwaitingConfirmation { target, action } = &self.action {
            let (target, action) = (*target, *action);
            self.dispatch(client, target, action, ui_notify);
        }
    }

    pub fn cancel_pending_action(&mut self) {
        if matches!(self.action, ActionState::AwaitingConfirmation { .. }) {
            self.action = ActionState::Idle;
        }
    }

    fn dispatch<F: UiCallBack>(
        &mut self,
        client: &Client,
        target: UserId,
        action: AdminAction,
        ui_notify: F,
    ) {
        self.ack = None;
        self.action = ActionState::Saving {
            target,
            action,
            status: DataState::AwaitingResponse(AwaitingType(client.update_account(
                target,
                action,
                ui_notify,
            ))),
        };
    }

    /// Polls an in-flight action. The listed row changes only once the server
    /// has confirmed the mutation; a failure is acknowledged and, if it also
    /// ended the session, answered with a redirect.
    pub fn poll_action(&mut self, client: &Client) -> Navigation {
        let ActionState::Saving {
            target,
            action,
            status,
        } = &mut self.action
        else {
            return Navigation::None;
        };
        match get_save_outcome(status) {
            Some(SaveState::Completed) => {
                let (target, action) = (*target, *action);
                if let DataState::Present(accounts) = self.accounts.as_mut() {
                    apply_confirmed(accounts, target, action);
                }
                self.ack = Some("User updated successfully!".to_string());
                self.action = ActionState::Idle;
                Navigation::None
            }
            Some(SaveState::Failed(e)) => {
                self.ack = Some(format!("Failed to update user. {e}"));
                self.action = ActionState::Idle;
                if client.is_authenticated() {
                    Navigation::None
                } else {
                    Navigation::ToLogin
                }
            }
            Some(SaveState::Ongoing) | None => Navigation::None,
        }
    }
}

/// Applies a confirmed mutation to its row
fn apply_confirmed(accounts: &mut [ManagedUser], target: UserId, action: AdminAction) {
    let Some(row) = accounts.iter_mut().find(|account| account.id == target) else {
        return; // Row can be gone if the listing was refreshed mid action
    };
    match action {
        AdminAction::Restrict => row.account_status = AccountStatus::Restricted,
        AdminAction::Promote => row.role = Role::Admin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin_identity(user_id: u64) -> SessionIdentity {
        SessionIdentity {
            user_id: user_id.into(),
            role: Role::Admin,
        }
    }

    fn listed_user(id: u64) -> ManagedUser {
        ManagedUser {
            id: id.into(),
            username: "ann".try_into().unwrap(),
            email: "ann@x.com".try_into().unwrap(),
            role: Role::User,
            account_status: AccountStatus::Active,
        }
    }

    fn panel_with_rows(viewer_id: u64, rows: Vec<ManagedUser>) -> AdminPanel {
        let mut panel = AdminPanel::new(admin_identity(viewer_id));
        panel.accounts = DataState::Present(rows);
        panel
    }

    #[test]
    fn self_targeted_action_parks_for_confirmation() {
        // Arrange - the viewer is also row 1
        let mut panel = panel_with_rows(1, vec![listed_user(1)]);

        // Act - no async runtime is available so a dispatched request would
        // blow up; the guard must stop it first
        let actual = panel.begin_action(&Client::default(), 1.into(), AdminAction::Restrict, || {});

        // Assert
        assert_eq!(
            actual.unwrap_err(),
            AdminActionError::SelfActionNeedsConfirmation
        );
        assert!(matches!(
            panel.action,
            ActionState::AwaitingConfirmation { .. }
        ));
    }

    #[test]
    fn cancelling_a_parked_action_returns_to_idle() {
        // Arrange
        let mut panel = panel_with_rows(1, vec![listed_user(1)]);
        let _ = panel.begin_action(&Client::default(), 1.into(), AdminAction::Promote, || {});

        // Act
        panel.cancel_pending_action();

        // Assert
        assert!(matches!(panel.action, ActionState::Idle));
        assert_eq!(panel.accounts().unwrap()[0].role, Role::User);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[tokio::test]
    async fn confirming_a_parked_self_action_dispatches_it() {
        // Arrange
        let mut panel = panel_with_rows(1, vec![listed_user(1)]);
        let client = Client::default();
        let _ = panel.begin_action(&client, 1.into(), AdminAction::Restrict, || {});

        // Act - the explicit second step the guard demands
        panel.confirm_pending_action(&client, || {});

        // Assert
        assert!(matches!(panel.action, ActionState::Saving { .. }));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[tokio::test]
    async fn action_on_another_account_dispatches_without_confirmation() {
        // Arrange - viewer 2 acting on row 1
        let mut panel = panel_with_rows(2, vec![listed_user(1)]);

        // Act
        let actual = panel.begin_action(&Client::default(), 1.into(), AdminAction::Restrict, || {});

        // Assert - dispatched; the row itself is untouched until confirmation
        assert!(actual.is_ok());
        assert!(matches!(panel.action, ActionState::Saving { .. }));
        assert_eq!(
            panel.accounts().unwrap()[0].account_status,
            AccountStatus::Active
        );
    }

    #[test]
    fn row_updates_only_after_the_server_confirms() {
        // Arrange - a restrict of row 1 the server has just confirmed
        let mut panel = panel_with_rows(2, vec![listed_user(1)]);
        panel.action = ActionState::Saving {
            target: 1.into(),
            action: AdminAction::Restrict,
            status: DataState::Present(()),
        };
        let client = Client::default();
        client.set_identity(admin_identity(2));

        // Act
        let nav = panel.poll_action(&client);

        // Assert
        assert_eq!(nav, Navigation::None);
        let row = &panel.accounts().unwrap()[0];
        assert_eq!(row.account_status, AccountStatus::Restricted);
        assert_eq!(row.account_status.display_label(), "RESTRICTED");
        assert_eq!(panel.ack(), Some("User updated successfully!"));
        assert!(matches!(panel.action, ActionState::Idle));
    }

    #[test]
    fn failed_action_acknowledges_and_leaves_the_row_alone() {
        // Arrange - a failure that did not end the session (e.g. a 500)
        let mut panel = panel_with_rows(2, vec![listed_user(1)]);
        panel.action = ActionState::Saving {
            target: 1.into(),
            action: AdminAction::Promote,
            status: DataState::Failed("boom".to_string()),
        };
        let client = Client::default();
        client.set_identity(admin_identity(2));

        // Act
        let nav = panel.poll_action(&client);

        // Assert - acknowledged, no speculative change, no retry
        assert_eq!(nav, Navigation::None);
        assert_eq!(panel.accounts().unwrap()[0].role, Role::User);
        assert_eq!(panel.ack(), Some("Failed to update user. boom"));
        assert!(matches!(panel.action, ActionState::Idle));
    }

    #[test]
    fn failed_action_that_ended_the_session_redirects() {
        // Arrange - the bearer handler cleared the session during the save
        let mut panel = panel_with_rows(2, vec![listed_user(1)]);
        panel.action = ActionState::Saving {
            target: 1.into(),
            action: AdminAction::Promote,
            status: DataState::Failed("401 Unauthorized".to_string()),
        };

        // Act - no identity on the client, like after a clear
        let nav = panel.poll_action(&Client::default());

        // Assert
        assert_eq!(nav, Navigation::ToLogin);
        assert_eq!(panel.accounts().unwrap()[0].role, Role::User);
    }

    #[test]
    fn promotion_updates_the_confirmed_row() {
        // Arrange
        let mut rows = vec![listed_user(1), listed_user(5)];
        rows[1].username = "bob".try_into().unwrap();

        // Act
        apply_confirmed(&mut rows, 5.into(), AdminAction::Promote);

        // Assert - only the targeted row changed
        assert_eq!(rows[1].role, Role::Admin);
        assert_eq!(rows[0].role, Role::User);
    }
}
