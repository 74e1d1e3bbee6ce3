use crate::errors::ConversionError;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ProfileUpdateError {
    #[error("You entered two different passwords - the field values must match.")]
    PasswordsDoNotMatch,
    #[error(transparent)]
    InvalidField(#[from] ConversionError),
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum AdminActionError {
    #[error("This changes your own account and could lock you out. Confirm to proceed.")]
    SelfActionNeedsConfirmation,
}
