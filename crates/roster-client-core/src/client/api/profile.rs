use futures::channel::oneshot;
use roster_shared::{
    const_config::path::{PATH_USER_PROFILE, PATH_USER_PROFILE_UPDATE},
    id::UserId,
    uac::{ProfilePatch, UserProfile},
};

use crate::{
    client::{UiCallBack, DUMMY_ARGUMENT},
    Client,
};

impl Client {
    #[tracing::instrument(skip(ui_notify))]
    pub fn fetch_profile<F: UiCallBack>(
        &self,
        user_id: UserId,
        ui_notify: F,
    ) -> oneshot::Receiver<anyhow::Result<UserProfile>> {
        self.send_bearer_request_expect_json(
            PATH_USER_PROFILE,
            Some(user_id),
            &DUMMY_ARGUMENT,
            ui_notify,
        )
    }

    /// Submits a partial profile update. Only the fields present in `patch`
    /// are transmitted; an empty patch goes out as an empty mapping and what
    /// the server makes of that is the server's business.
    #[tracing::instrument(skip(patch, ui_notify))]
    // WARNING: Must skip patch as it may contain a new password
    pub fn update_profile<F: UiCallBack>(
        &self,
        user_id: UserId,
        patch: &ProfilePatch,
        ui_notify: F,
    ) -> oneshot::Receiver<anyhow::Result<()>> {
        self.send_bearer_request_expect_empty(
            PATH_USER_PROFILE_UPDATE,
            Some(user_id),
            patch,
            ui_notify,
        )
    }
}
