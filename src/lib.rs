//! A single-connection LDAP session for attribute lookups.
//!
//! The crate wraps the `ldap3` client behind a narrow, synchronous API: a
//! [`DirectorySession`] opens one connection to a directory server, reads
//! single attributes of entries named by their DN, and is closed explicitly
//! by the caller.
//!
//! ## Lookups
//!
//! Every lookup is a base-scope search of the named entry which requests only
//! the attribute of interest. Three accessors shape the result:
//!
//! * [`get_attribute_value()`](DirectorySession::get_attribute_value) returns
//!   the first value as text, or `None`;
//! * [`get_attribute_values()`](DirectorySession::get_attribute_values) returns
//!   all values as text, or an empty vector;
//! * [`get_attribute_value_bytes()`](DirectorySession::get_attribute_value_bytes)
//!   returns the first value as bytes, or an empty vector.
//!
//! A missing entry and an entry without the attribute are both "not found",
//! not errors.
//!
//! ## Errors
//!
//! All failures are reported as [`DirectoryError`]. Errors originating in the
//! client keep the client's error as their source; use
//! [`kind()`](DirectoryError::kind) to branch on the kind of failure.
//!
//! ## Connections
//!
//! The session reaches the server through a [`Connector`]. The default,
//! [`LdapConnector`], can be configured with [`SessionSettings`]; other
//! implementations can be supplied with
//! [`DirectorySession::with_connector()`].

mod attribute;
mod conn;
mod result;
mod session;

pub use attribute::{Attribute, Entry};
pub use conn::{Connector, DirectoryConn, LdapConnector, LdapHandle, SessionSettings};
pub use result::{Action, DirectoryError, ErrorKind, Result};
pub use session::DirectorySession;

pub use ldap3::LdapError;
