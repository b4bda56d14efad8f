//! Crate-wide error type and result alias.
//!
//! Mirrors the error-handling shape used throughout this project's other
//! crates: a small `thiserror`-derived enum for the failure modes the core
//! itself can identify, with the public `Result` aliased to `anyhow::Error`
//! so collaborator failures (I/O, parsing) can be wrapped with `.context(..)`
//! at the call site instead of forcing every leaf error into this enum.

/// The crate's result type. Most public functions return this rather than
/// a bespoke error type, matching the convention of wrapping foreign errors
/// with [`anyhow::Context`] at the boundary.
pub type Result<T> = std::result::Result<T, anyhow::Error>;

/// Failure modes the keyblock editor itself raises.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("no user id with index {0}")]
    NoSuchUserId(usize),

    #[error("no subkey with index {0}")]
    NoSuchSubkey(usize),

    #[error("this keyblock has no secret key loaded")]
    NoSecretKeyblock,

    #[error("refusing to delete the last user id")]
    LastUserId,

    #[error("no user ids selected and none available to select")]
    NothingSelected,

    #[error("secret key is not available for signing")]
    NoPrimarySecretKey,

    #[error("secret key uses an unsupported protection algorithm")]
    UnsupportedProtection,

    #[error("could not unlock secret key: {0}")]
    UnlockFailed(String),

    #[error("could not produce signature: {0}")]
    SigningFailed(String),

    #[error("could not re-protect secret key: {0}")]
    ProtectFailed(String),

    #[error("passphrases did not match")]
    PassphraseMismatch,

    #[error("keyblock not found: {0}")]
    KeyblockNotFound(String),

    #[error("internal invariant violated: {0}")]
    Invariant(String),
}
