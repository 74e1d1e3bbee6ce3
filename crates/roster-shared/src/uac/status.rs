use std::str::FromStr as _;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Standing of an account as tracked by the server
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
pub enum AccountStatus {
    Active,
    Restricted,
    Banned,
}

impl AccountStatus {
    /// Maps a server reported status name; unknown names degrade to
    /// [`AccountStatus::Active`], matching the server's own lookup.
    #[must_use]
    pub fn from_wire_name(name: &str) -> Self {
        Self::from_str(name.trim()).unwrap_or(Self::Active)
    }

    /// Uppercased form used on management screens
    #[must_use]
    pub fn display_label(&self) -> String {
        self.to_string().to_uppercase()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::exact("restricted", AccountStatus::Restricted)]
    #[case::cased("BANNED", AccountStatus::Banned)]
    #[case::unknown("suspended", AccountStatus::Active)]
    fn wire_names_map_onto_statuses(#[case] name: &str, #[case] expect: AccountStatus) {
        // Act
        let actual = AccountStatus::from_wire_name(name);

        // Assert
        assert_eq!(actual, expect);
    }

    #[test]
    fn display_label_is_uppercase() {
        assert_eq!(AccountStatus::Restricted.display_label(), "RESTRICTED");
    }
}
