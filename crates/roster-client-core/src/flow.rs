//! Headless page state machines: the mount, loading, success and failure
//! edges that a rendering shell draws but never decides. Each flow owns the
//! receivers for its in-flight requests, so dropping a flow (page teardown)
//! cancels any update that would otherwise arrive late.

pub mod admin;
pub mod data_state;
pub mod gate;
pub mod login;
pub mod profile;
pub mod signup;

pub use data_state::{AwaitingType, DataState};

use roster_shared::id::UserId;

/// Where the page shell should route next. Emitted at most once per
/// transition; [`Navigation::None`] means stay put.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Navigation {
    #[default]
    None,
    ToLogin,
    ToProfile(UserId),
}

/// Progress of an in-flight save as seen by the page
#[must_use]
#[derive(Debug, PartialEq, Eq)]
pub enum SaveState {
    Completed,
    Ongoing,
    Failed(String),
}

/// Folds a save's [`DataState`] into the page facing [`SaveState`], polling
/// the channel while the save is in flight. Returns `None` if no save is
/// ongoing.
fn get_save_outcome(save_status: &mut DataState<()>) -> Option<SaveState> {
    match save_status {
        DataState::None => {
            // No action no save ongoing
            None
        }
        DataState::AwaitingResponse(rx) => {
            if let Some(new_state) = DataState::await_data(rx) {
                *save_status = new_state;
            }
            Some(SaveState::Ongoing)
        }
        DataState::Present(_data) => Some(SaveState::Completed),
        DataState::Failed(e) => Some(SaveState::Failed(e.clone())),
    }
}
