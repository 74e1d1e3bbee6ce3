use crate::{id::UserId, uac::Role};

/// The identity a successful validation hands down to the page
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct SessionIdentity {
    pub user_id: UserId,
    pub role: Role,
}

/// The client's belief about the viewer, recomputed on every protected page
/// mount and never persisted.
///
/// Invariant: `Valid` only ever results from a successful validation round
/// trip during the current page lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Session {
    /// No token is stored
    #[default]
    Anonymous,
    Valid(SessionIdentity),
    /// A token was present but failed validation and has been cleared
    Invalid,
}

impl Session {
    #[must_use]
    pub fn identity(&self) -> Option<&SessionIdentity> {
        match self {
            Session::Valid(identity) => Some(identity),
            Session::Anonymous | Session::Invalid => None,
        }
    }

    /// Returns `true` if the session is [`Valid`].
    ///
    /// [`Valid`]: Session::Valid
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(..))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_valid_sessions_carry_an_identity() {
        // Arrange
        let identity = SessionIdentity {
            user_id: 1.into(),
            role: Role::User,
        };

        // Assert
        assert_eq!(Session::Valid(identity).identity(), Some(&identity));
        assert_eq!(Session::Anonymous.identity(), None);
        assert_eq!(Session::Invalid.identity(), None);
        assert!(!Session::Invalid.is_valid());
    }
}
