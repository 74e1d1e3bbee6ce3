use roster_shared::{
    id::UserId,
    internal_error,
    uac::{ProfileEdits, ProfilePatch, UserProfile},
};

use crate::{Client, UiCallBack};

use super::{get_save_outcome, AwaitingType, DataState, Navigation, SaveState};

/// Page model for the viewer's own profile: fetch the snapshot, collect
/// edits, submit the minimal patch, reconcile on confirmation.
///
/// The snapshot is server owned. It changes in exactly two places: wholesale
/// on fetch, and by merging the submitted fields of a confirmed patch.
#[derive(Debug)]
pub struct ProfileEditor {
    user_id: UserId,
    snapshot: DataState<UserProfile>,
    pub edits: ProfileEdits,
    save_status: DataState<()>,
    pending_patch: Option<ProfilePatch>,
}

impl ProfileEditor {
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            snapshot: Default::default(),
            edits: Default::default(),
            save_status: Default::default(),
            pending_patch: None,
        }
    }

    /// Drives the snapshot fetch; call every tick until [`Self::profile`]
    /// returns `Some`.
    ///
    /// Emits [`Navigation::ToLogin`] once if the fetch fails in a way that
    /// also ended the session (401 or transport failure, both of which clear
    /// the token); any other failure stays on the page.
    pub fn poll_fetch<F: UiCallBack>(&mut self, client: &Client, ui_notify: F) -> Navigation {
        if self.snapshot.is_present() {
            return Navigation::None;
        }
        let was_failed = matches!(self.snapshot.as_ref(), DataState::Failed(_));
        let user_id = self.user_id;
        let fetch_client = client.clone();
        self.snapshot
            .poll(move || AwaitingType(fetch_client.fetch_profile(user_id, ui_notify)));
        let now_failed = matches!(self.snapshot.as_ref(), DataState::Failed(_));
        if !was_failed && now_failed && !client.is_authenticated() {
            return Navigation::ToLogin;
        }
        Navigation::None
    }

    #[must_use]
    pub fn profile(&self) -> Option<&UserProfile> {
        match self.snapshot.as_ref() {
            DataState::Present(profile) => Some(profile),
            _ => None,
        }
    }

    #[must_use]
    pub fn fetch_error(&self) -> Option<&str> {
        match self.snapshot.as_ref() {
            DataState::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Builds and submits the patch. A local validation failure (mismatched
    /// passwords, an illegal field value) fails the save without touching the
    /// network. Submitting with nothing entered is a valid empty patch.
    pub fn submit<F: UiCallBack>(&mut self, client: &Client, ui_notify: F) {
        if matches!(self.save_status, DataState::AwaitingResponse(_)) {
            return; // One save at a time
        }
        let patch = match self.edits.build_patch() {
            Ok(patch) => patch,
            Err(e) => {
                self.save_status = DataState::Failed(e.to_string());
                return;
            }
        };
        self.save_status = DataState::AwaitingResponse(AwaitingType(client.update_profile(
            self.user_id,
            &patch,
            ui_notify,
        )));
        self.pending_patch = Some(patch);
    }

    /// Polls an in-flight save. On confirmation the submitted fields, and
    /// only those, are merged into the snapshot and their buffers cleared; on
    /// failure nothing local changes.
    pub fn poll_save(&mut self) -> Option<SaveState> {
        let outcome = get_save_outcome(&mut self.save_status);
        if matches!(outcome, Some(SaveState::Completed)) {
            self.reconcile();
        }
        outcome
    }

    fn reconcile(&mut self) {
        let Some(patch) = self.pending_patch.take() else {
            internal_error!("save completed with no pending patch");
            return;
        };
        if let DataState::Present(profile) = self.snapshot.as_mut() {
            profile.apply(&patch);
        }
        self.edits.clear_applied(&patch);
        self.save_status = DataState::None;
    }

    /// Clears a failed save so the user may try again; the snapshot and the
    /// typed buffers stay exactly as they were
    pub fn clear_save_error(&mut self) {
        if matches!(self.save_status, DataState::Failed(_)) {
            self.save_status.reset();
            self.pending_patch = None;
        }
    }
}
