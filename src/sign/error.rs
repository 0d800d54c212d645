//! Signing related errors.
use core::fmt;

use std::io;
use std::string::String;

use super::pipeline::RunStats;

//----------- SignError ------------------------------------------------------

/// A signature failure.
///
/// This is returned by a [`KeyStore`][super::keys::KeyStore] when it could
/// not create a signature over an RRset. The signer does not retry: a zone
/// with a missing signature is not usable, so the failure ends the run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignError {
    reason: String,
}

impl SignError {
    /// Creates a new error with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        SignError {
            reason: reason.into(),
        }
    }

    /// Returns the reason for the failure.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for SignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not create a cryptographic signature: {}", self.reason)
    }
}

impl std::error::Error for SignError {}

//----------- KeyStoreError --------------------------------------------------

/// A key could not be found in the key store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyStoreError {
    /// There is no key with the given identifier.
    NotFound(String),

    /// The key store could not be accessed.
    Unavailable(String),
}

impl fmt::Display for KeyStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyStoreError::NotFound(id) => write!(f, "key '{id}' not found"),
            KeyStoreError::Unavailable(reason) => {
                write!(f, "key store unavailable: {reason}")
            }
        }
    }
}

impl std::error::Error for KeyStoreError {}

//----------- ResignError ----------------------------------------------------

/// Re-signing a zone failed.
///
/// The error carries the statistics for the part of the zone that was
/// processed before the failure.
#[derive(Debug)]
pub struct ResignError {
    kind: ErrorKind,
    stats: RunStats,
}

impl ResignError {
    pub(crate) fn new(kind: ErrorKind, stats: RunStats) -> Self {
        ResignError { kind, stats }
    }

    /// Returns what went wrong.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns the statistics of the failed run.
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Converts the error into its kind.
    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }
}

impl fmt::Display for ResignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

impl std::error::Error for ResignError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ErrorKind::Signing(err) => Some(err),
            ErrorKind::Output(err) | ErrorKind::Spawn(err) => Some(err),
            ErrorKind::Input(err) => Some(err),
            ErrorKind::MissingOrigin | ErrorKind::WorkerPanicked => None,
        }
    }
}

//----------- ErrorKind ------------------------------------------------------

/// The kind of a fatal re-signing failure.
#[derive(Debug)]
pub enum ErrorKind {
    /// An RRset had to be processed before the zone origin was set.
    MissingOrigin,

    /// The key store failed to create a signature.
    Signing(SignError),

    /// Reading one of the inputs failed.
    Input(io::Error),

    /// Writing the output failed.
    Output(io::Error),

    /// A thread could not be started.
    Spawn(io::Error),

    /// A signing worker or the output thread panicked.
    WorkerPanicked,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::MissingOrigin => {
                f.write_str("no zone origin set, missing ':origin' directive")
            }
            ErrorKind::Signing(err) => write!(f, "signing failed: {err}"),
            ErrorKind::Input(err) => write!(f, "reading input failed: {err}"),
            ErrorKind::Output(err) => write!(f, "writing output failed: {err}"),
            ErrorKind::Spawn(err) => {
                write!(f, "could not start thread: {err}")
            }
            ErrorKind::WorkerPanicked => f.write_str("a worker thread panicked"),
        }
    }
}

impl From<SignError> for ErrorKind {
    fn from(err: SignError) -> Self {
        ErrorKind::Signing(err)
    }
}
