use ldap3::LdapError;
use log::{debug, warn};

use crate::attribute::Attribute;
use crate::conn::{Connector, DirectoryConn, LdapConnector};
use crate::result::{Action, DirectoryError, Result};

/// Single-connection directory session.
///
/// A session is either disconnected, which is its initial state, or holds
/// exactly one open connection. The connection is opened with
/// [`connect()`](#method.connect) and must be closed explicitly with
/// [`close()`](#method.close); dropping a connected session releases the
/// connection without an orderly shutdown. Use [`scoped()`](#method.scoped)
/// to have the connection closed on every exit path.
///
/// All operations are blocking. A session has no internal locking, and must
/// not be shared between threads without external synchronization.
///
/// ```no_run
/// use ldap_session::DirectorySession;
///
/// # fn main() -> ldap_session::Result<()> {
/// let mut session = DirectorySession::connect_to("localhost", 389)?;
/// let mail = session.get_attribute_value("uid=jdoe,ou=People,dc=example,dc=org", "mail")?;
/// println!("{:?}", mail);
/// session.close()?;
/// # Ok(())
/// # }
/// ```
pub struct DirectorySession<C: Connector = LdapConnector> {
    connector: C,
    conn: Option<C::Conn>,
}

impl DirectorySession<LdapConnector> {
    /// Create a disconnected session which uses the default connector.
    pub fn new() -> Self {
        DirectorySession::with_connector(LdapConnector::new())
    }

    /// Create a session and connect it to `host` on `port`.
    pub fn connect_to(host: &str, port: u16) -> Result<Self> {
        DirectorySession::with_connector_connected(LdapConnector::new(), host, port)
    }
}

impl Default for DirectorySession<LdapConnector> {
    fn default() -> Self {
        DirectorySession::new()
    }
}

impl<C: Connector> DirectorySession<C> {
    /// Create a disconnected session which will use `connector` to connect.
    pub fn with_connector(connector: C) -> Self {
        DirectorySession {
            connector,
            conn: None,
        }
    }

    /// Create a session with `connector` and connect it to `host` on `port`.
    pub fn with_connector_connected(connector: C, host: &str, port: u16) -> Result<Self> {
        let mut session = DirectorySession::with_connector(connector);
        session.connect(host, port)?;
        Ok(session)
    }

    /// Connect the session, run `f` on it, and close it.
    ///
    /// The session is closed whether or not `f` succeeds. If `f` fails, its
    /// error is returned and a close failure is only logged.
    pub fn scoped<T, F>(connector: C, host: &str, port: u16, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let mut session = DirectorySession::with_connector_connected(connector, host, port)?;
        let res = f(&mut session);
        if !session.is_connected() {
            return res;
        }
        match (res, session.close()) {
            (Ok(val), Ok(())) => Ok(val),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(close_err)) => {
                warn!("error closing session after failure: {}", close_err);
                Err(e)
            }
        }
    }

    /// Open a connection to `host` on `port`.
    ///
    /// Fails with `AlreadyConnected` if the session is connected, and with
    /// `InvalidArgument` if `host` is empty, `port` is zero, or `host` can't be
    /// used in an LDAP URL. The session is connected only if the call succeeds.
    pub fn connect(&mut self, host: &str, port: u16) -> Result<()> {
        if self.conn.is_some() {
            return Err(DirectoryError::AlreadyConnected);
        }
        if host.is_empty() || port == 0 {
            return Err(DirectoryError::InvalidArgument);
        }
        let conn = self.connector.connect(host, port).map_err(|e| match e {
            LdapError::UrlParsing { .. } => DirectoryError::InvalidArgument,
            source => DirectoryError::ConnectionFailed { source },
        })?;
        debug!("session connected to {}:{}", host, port);
        self.conn = Some(conn);
        Ok(())
    }

    /// Close the connection.
    ///
    /// Fails with `NotConnected` if there is no connection. If the client
    /// reports an error while disconnecting, the error is returned, but the
    /// session is disconnected nevertheless.
    pub fn close(&mut self) -> Result<()> {
        let mut conn = match self.conn.take() {
            Some(conn) => conn,
            None => {
                return Err(DirectoryError::NotConnected {
                    action: Action::Close,
                })
            }
        };
        match conn.disconnect() {
            Ok(()) => {
                debug!("session closed");
                Ok(())
            }
            Err(source) => {
                warn!("error while disconnecting, session closed anyway: {}", source);
                Err(DirectoryError::DisconnectFailed { source })
            }
        }
    }

    /// Returns true if the session holds an open connection.
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Borrow the connection handle, if the session is connected.
    ///
    /// This is an escape hatch for using the client directly. The session
    /// keeps ownership of the handle; closing the connection through the
    /// handle will not be noticed by the session.
    pub fn connection(&self) -> Option<&C::Conn> {
        self.conn.as_ref()
    }

    /// Mutably borrow the connection handle, if the session is connected.
    pub fn connection_mut(&mut self) -> Option<&mut C::Conn> {
        self.conn.as_mut()
    }

    /// Look up `attr_name` on the entry named by `object_dn`.
    ///
    /// Returns `None` if there is no such entry, or if the entry doesn't have
    /// the attribute with at least one value. Only the named attribute is
    /// requested, so the first attribute returned is the one asked for.
    pub fn lookup(&mut self, object_dn: &str, attr_name: &str) -> Result<Option<Attribute>> {
        let conn = self.conn.as_mut().ok_or(DirectoryError::NotConnected {
            action: Action::Lookup,
        })?;
        let entry = conn
            .search_base(object_dn, &[attr_name])
            .map_err(|source| DirectoryError::SearchFailed { source })?;
        debug!(
            "lookup of {} in {}: {}",
            attr_name,
            object_dn,
            if entry.is_some() { "entry found" } else { "no entry" }
        );
        Ok(entry.and_then(|e| e.into_first_attribute()))
    }

    /// Return the first value of the attribute as text, or `None` if not found.
    pub fn get_attribute_value(
        &mut self,
        object_dn: &str,
        attr_name: &str,
    ) -> Result<Option<String>> {
        Ok(self
            .lookup(object_dn, attr_name)?
            .and_then(|a| a.string_value()))
    }

    /// Return all values of the attribute as text. Empty if not found.
    pub fn get_attribute_values(
        &mut self,
        object_dn: &str,
        attr_name: &str,
    ) -> Result<Vec<String>> {
        Ok(self
            .lookup(object_dn, attr_name)?
            .map(|a| a.string_values())
            .unwrap_or_default())
    }

    /// Return the first value of the attribute as bytes. Empty if not found.
    pub fn get_attribute_value_bytes(
        &mut self,
        object_dn: &str,
        attr_name: &str,
    ) -> Result<Vec<u8>> {
        Ok(self
            .lookup(object_dn, attr_name)?
            .map(|a| a.byte_value())
            .unwrap_or_default())
    }
}
