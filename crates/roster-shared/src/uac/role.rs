use std::str::FromStr as _;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Coarse authorization tier determining which endpoints and views are
/// reachable
#[derive(
    Debug,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    User,
    Admin,
    Moderator,
}

impl Role {
    /// Maps a server reported role name onto a tier.
    ///
    /// Unknown names degrade to [`Role::User`] so a name the client does not
    /// know can never grant access.
    #[must_use]
    pub fn from_wire_name(name: &str) -> Self {
        Self::from_str(name.trim()).unwrap_or(Self::User)
    }

    /// Returns `true` if the role is [`Admin`].
    ///
    /// [`Admin`]: Role::Admin
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Uppercased form used on management screens
    #[must_use]
    pub fn display_label(&self) -> String {
        self.to_string().to_uppercase()
    }
}
