//! Session error type and helpers.
//!
//! Every fallible session operation returns a [`DirectoryError`]. Failures
//! which originate in the LDAP client carry the client's [`LdapError`] as
//! their source, so the root cause is available through
//! [`std::error::Error::source()`](std::error::Error::source) as well as in
//! the error's textual form.

use std::fmt;
use std::result;

use ldap3::LdapError;
use thiserror::Error;

/// Type alias for the session result.
pub type Result<T> = result::Result<T, DirectoryError>;

/// Operation which found the session without an active connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Closing the connection.
    Close,
    /// Looking up an attribute.
    Lookup,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Action::Close => {
                f.write_str("error while closing connection: there is no active connection to be closed")
            }
            Action::Lookup => f.write_str("there is no active connection to perform action"),
        }
    }
}

/// Session errors.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Empty host or zero port passed to `connect()`.
    ///
    /// Unlike the other variants, this one signals a programming error
    /// in the caller, not a condition of the environment.
    #[error("error while creating connection: invalid directory host and/or port")]
    InvalidArgument,

    /// `connect()` called on a session which is already connected.
    #[error("error while creating connection: there is already an active connection")]
    AlreadyConnected,

    /// Operation requires a connection, but the session has none.
    #[error("{action}")]
    NotConnected { action: Action },

    /// The client library couldn't open the connection.
    #[error("error while creating connection: {source}")]
    ConnectionFailed {
        #[source]
        source: LdapError,
    },

    /// The client library reported an error while closing the connection.
    ///
    /// The session is disconnected regardless.
    #[error("error while closing connection: {source}")]
    DisconnectFailed {
        #[source]
        source: LdapError,
    },

    /// The search for an attribute failed.
    #[error("error while searching the directory: {source}")]
    SearchFailed {
        #[source]
        source: LdapError,
    },
}

/// Fieldless counterpart of [`DirectoryError`], for branching on the kind of failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// See [`DirectoryError::InvalidArgument`].
    InvalidArgument,
    /// See [`DirectoryError::AlreadyConnected`].
    AlreadyConnected,
    /// See [`DirectoryError::NotConnected`].
    NotConnected,
    /// See [`DirectoryError::ConnectionFailed`].
    ConnectionFailed,
    /// See [`DirectoryError::DisconnectFailed`].
    DisconnectFailed,
    /// See [`DirectoryError::SearchFailed`].
    SearchFailed,
}

impl DirectoryError {
    /// Return the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DirectoryError::InvalidArgument => ErrorKind::InvalidArgument,
            DirectoryError::AlreadyConnected => ErrorKind::AlreadyConnected,
            DirectoryError::NotConnected { .. } => ErrorKind::NotConnected,
            DirectoryError::ConnectionFailed { .. } => ErrorKind::ConnectionFailed,
            DirectoryError::DisconnectFailed { .. } => ErrorKind::DisconnectFailed,
            DirectoryError::SearchFailed { .. } => ErrorKind::SearchFailed,
        }
    }

    /// Returns true if the error was caused by invalid arguments, rather than
    /// by the state of the session or the directory.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, DirectoryError::InvalidArgument)
    }

    /// Return the client library error which caused this one, if any.
    pub fn ldap_error(&self) -> Option<&LdapError> {
        match self {
            DirectoryError::ConnectionFailed { source }
            | DirectoryError::DisconnectFailed { source }
            | DirectoryError::SearchFailed { source } => Some(source),
            _ => None,
        }
    }
}
