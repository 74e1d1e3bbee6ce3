use futures::channel::oneshot;
use roster_shared::{
    const_config::path::{PATH_ADMIN_USERS, PATH_ADMIN_USER_UPDATE},
    id::UserId,
    uac::{AccountStatus, ManagedUser, Role},
};

use crate::{
    client::{UiCallBack, DUMMY_ARGUMENT},
    Client,
};

/// The two management mutations, each a single-field patch against the target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    /// `{"account_status": "restricted"}`
    Restrict,
    /// `{"role_name": "admin"}`
    Promote,
}

impl AdminAction {
    fn body(self) -> serde_json::Value {
        match self {
            AdminAction::Restrict => {
                serde_json::json!({ "account_status": AccountStatus::Restricted })
            }
            AdminAction::Promote => serde_json::json!({ "role_name": Role::Admin }),
        }
    }
}

impl Client {
    #[tracing::instrument(skip(ui_notify))]
    pub fn list_accounts<F: UiCallBack>(
        &self,
        ui_notify: F,
    ) -> oneshot::Receiver<anyhow::Result<Vec<ManagedUser>>> {
        self.send_bearer_request_expect_json(PATH_ADMIN_USERS, None, &DUMMY_ARGUMENT, ui_notify)
    }

    #[tracing::instrument(skip(ui_notify))]
    pub fn update_account<F: UiCallBack>(
        &self,
        target: UserId,
        action: AdminAction,
        ui_notify: F,
    ) -> oneshot::Receiver<anyhow::Result<()>> {
        self.send_bearer_request_expect_empty(
            PATH_ADMIN_USER_UPDATE,
            Some(target),
            &action.body(),
            ui_notify,
        )
    }

    pub fn restrict_account<F: UiCallBack>(
        &self,
        target: UserId,
        ui_notify: F,
    ) -> oneshot::Receiver<anyhow::Result<()>> {
        self.update_account(target, AdminAction::Restrict, ui_notify)
    }

    pub fn promote_account<F: UiCallBack>(
        &self,
        target: UserId,
        ui_notify: F,
    ) -> oneshot::Receiver<anyhow::Result<()>> {
        self.update_account(target, AdminAction::Promote, ui_notify)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_serialize_as_single_field_patches() {
        // Act / Assert
        assert_eq!(
            AdminAction::Restrict.body(),
            serde_json::json!({"account_status": "restricted"})
        );
        assert_eq!(
            AdminAction::Promote.body(),
            serde_json::json!({"role_name": "admin"})
        );
    }
}
