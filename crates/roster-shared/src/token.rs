/// Opaque bearer credential, held in its scheme-prefixed form
/// (`"Bearer <value>"`). Only the session store reads or writes it; nothing
/// else is allowed to look inside.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct AuthToken(String);

impl AuthToken {
    pub const SCHEME: &'static str = "Bearer";

    /// Wraps the raw credential returned by the login endpoint
    pub fn from_raw(raw: &str) -> Self {
        Self(format!("{} {raw}", Self::SCHEME))
    }

    /// The exact value presented in the `Authorization` header (and persisted)
    pub fn as_header_value(&self) -> &str {
        &self.0
    }
}

impl From<String> for AuthToken {
    /// For values coming back out of the persistence surface, which are
    /// already scheme-prefixed
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<AuthToken> for String {
    fn from(value: AuthToken) -> Self {
        value.0
    }
}
