use std::fmt::{Debug, Display};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::{errors::ConversionError, id::UserId};

use super::{AccountStatus, ProfileUpdateError, Role};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Represents a username and is constrained to not be an empty string
pub struct Username(String);

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// An email address; constrained to be non-empty and to carry an '@'
pub struct EmailAddress(String);

impl Username {
    pub const MAX_LENGTH: usize = 16;
}

impl EmailAddress {
    pub const MAX_LENGTH: usize = 254;
}

impl TryFrom<String> for Username {
    type Error = ConversionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err(ConversionError::Empty);
        }
        if value.len() > Self::MAX_LENGTH {
            return Err(ConversionError::MaxExceeded {
                max: Self::MAX_LENGTH,
                actual: value.len(),
            });
        }
        Ok(Self(value))
    }
}

impl TryFrom<&str> for Username {
    type Error = ConversionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.to_string().try_into()
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = ConversionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err(ConversionError::Empty);
        }
        if value.len() > Self::MAX_LENGTH {
            return Err(ConversionError::MaxExceeded {
                max: Self::MAX_LENGTH,
                actual: value.len(),
            });
        }
        if !value.contains('@') {
            return Err(ConversionError::MissingAtSign);
        }
        Ok(Self(value))
    }
}

impl TryFrom<&str> for EmailAddress {
    type Error = ConversionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.to_string().try_into()
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Snapshot of the viewer's own profile as returned by the profile endpoint.
/// Server owned; the client only ever replaces it wholesale on fetch or merges
/// a confirmed patch into it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    pub username: Username,
    pub email: EmailAddress,
}

impl UserProfile {
    /// Merges a confirmed patch into the snapshot. Only the fields present in
    /// the patch change; the password never lives in the snapshot.
    pub fn apply(&mut self, patch: &ProfilePatch) {
        if let Some(username) = &patch.username {
            self.username = username.clone();
        }
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
    }
}

/// Row of the admin listing as returned by the admin users endpoint
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ManagedUser {
    pub id: UserId,
    pub username: Username,
    pub email: EmailAddress,
    pub role: Role,
    pub account_status: AccountStatus,
}

/// Partial update for the viewer's own account.
///
/// `Some` are the fields being changed; everything else is left untouched
/// server-side. The serialized mapping therefore contains exactly the changed
/// fields and never an empty-string placeholder. Confirm-password is checked
/// locally and never appears here.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<Username>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<EmailAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl ProfilePatch {
    /// An empty patch is still a valid submission; what the server does with
    /// it is the server's business.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.password.is_none()
    }
}

impl Debug for ProfilePatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfilePatch")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("has_password", &self.password.is_some())
            .finish()
    }
}

/// Edit buffers for the profile page. Each buffer holds exactly what the user
/// typed; empty means untouched.
#[derive(Debug, Clone)]
pub struct ProfileEdits {
    pub username: String,
    pub email: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
}

impl Default for ProfileEdits {
    fn default() -> Self {
        Self {
            username: String::new(),
            email: String::new(),
            password: SecretString::from(""),
            confirm_password: SecretString::from(""),
        }
    }
}

impl ProfileEdits {
    /// Builds the partial patch out of the buffers: starts from an empty
    /// mapping and inserts a key only when the corresponding input is
    /// non-empty.
    ///
    /// A non-empty password must match confirm-password or the build fails
    /// before anything touches the network.
    pub fn build_patch(&self) -> Result<ProfilePatch, ProfileUpdateError> {
        let password = self.password.expose_secret();
        if !password.is_empty() && password != self.confirm_password.expose_secret() {
            return Err(ProfileUpdateError::PasswordsDoNotMatch);
        }
        let mut patch = ProfilePatch::default();
        if !self.username.is_empty() {
            patch.username = Some(self.username.clone().try_into()?);
        }
        if !self.email.is_empty() {
            patch.email = Some(self.email.clone().try_into()?);
        }
        if !password.is_empty() {
            patch.password = Some(password.to_string());
        }
        Ok(patch)
    }

    /// Clears the buffers belonging to the fields of a confirmed patch,
    /// leaving anything the user typed but did not submit in place
    pub fn clear_applied(&mut self, patch: &ProfilePatch) {
        if patch.username.is_some() {
            self.username.clear();
        }
        if patch.email.is_some() {
            self.email.clear();
        }
        if patch.password.is_some() {
            self.password = SecretString::from("");
            self.confirm_password = SecretString::from("");
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn edits(username: &str, email: &str, password: &str, confirm: &str) -> ProfileEdits {
        ProfileEdits {
            username: username.to_string(),
            email: email.to_string(),
            password: SecretString::from(password),
            confirm_password: SecretString::from(confirm),
        }
    }

    #[rstest]
    #[case::empty("", ConversionError::Empty)]
    #[case::too_long("a".repeat(17), ConversionError::MaxExceeded{max:16, actual:17})]
    fn illegal_username(#[case] name: String, #[case] expect: ConversionError) {
        // Act
        let actual: Result<Username, ConversionError> = name.try_into();

        // Assert
        assert_eq!(actual.unwrap_err(), expect);
    }

    #[rstest]
    #[case::empty("", ConversionError::Empty)]
    #[case::no_at_sign("a.example.com", ConversionError::MissingAtSign)]
    fn illegal_email(#[case] email: String, #[case] expect: ConversionError) {
        // Act
        let actual: Result<EmailAddress, ConversionError> = email.try_into();

        // Assert
        assert_eq!(actual.unwrap_err(), expect);
    }

    #[rstest]
    #[case::all_fields(edits("ab", "a@x.com", "p", "p"), &["email", "password", "username"])]
    #[case::username_only(edits("ab", "", "", ""), &["username"])]
    #[case::password_only(edits("", "", "p", "p"), &["password"])]
    #[case::nothing_entered(edits("", "", "", ""), &[])]
    fn patch_keys_equal_entered_fields(#[case] edits: ProfileEdits, #[case] expect: &[&str]) {
        // Act
        let patch = edits.build_patch().unwrap();
        let value = serde_json::to_value(&patch).unwrap();

        // Assert - untouched fields are absent, not empty strings
        // (serde_json maps iterate in key order)
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, expect);
    }

    #[test]
    fn mismatched_passwords_block_the_build() {
        // Arrange
        let edits = edits("", "", "p1", "p2");

        // Act
        let actual = edits.build_patch();

        // Assert
        assert_eq!(actual.unwrap_err(), ProfileUpdateError::PasswordsDoNotMatch);
    }

    #[test]
    fn confirm_password_alone_is_not_a_change() {
        // Arrange - confirm filled in but password untouched
        let edits = edits("", "", "", "stray");

        // Act
        let patch = edits.build_patch().unwrap();

        // Assert
        assert!(patch.is_empty());
    }

    #[test]
    fn apply_merges_only_submitted_fields() {
        // Arrange
        let mut profile = UserProfile {
            id: 1.into(),
            username: "before".try_into().unwrap(),
            email: "before@x.com".try_into().unwrap(),
        };
        let patch = edits("after", "", "", "").build_patch().unwrap();

        // Act
        profile.apply(&patch);

        // Assert
        assert_eq!(profile.username.as_ref(), "after");
        assert_eq!(profile.email.as_ref(), "before@x.com");
    }

    #[test]
    fn clear_applied_leaves_unsubmitted_buffers() {
        // Arrange
        let mut all = edits("ab", "a@x.com", "p", "p");
        let username_only = edits("ab", "", "", "").build_patch().unwrap();

        // Act
        all.clear_applied(&username_only);

        // Assert
        assert!(all.username.is_empty());
        assert_eq!(all.email, "a@x.com");
        assert_eq!(all.password.expose_secret(), "p");
    }
}
