//! Connecting to the directory.
//!
//! A session doesn't talk to the LDAP client directly, but through the
//! [`Connector`] and [`DirectoryConn`] traits. The production implementation,
//! [`LdapConnector`], opens an [`LdapHandle`]: a synchronous wrapper around the
//! asynchronous `ldap3` handle, driven by its own single-threaded Tokio runtime.

use std::net::Ipv6Addr;
use std::time::Duration;

use ldap3::{
    Ldap, LdapConnAsync, LdapConnSettings, LdapError, Scope, SearchOptions, SearchResult,
};
use log::{debug, warn};
use tokio::runtime::{self, Runtime};
use url::Url;

use crate::attribute::Entry;

/// Filter matching every entry; base-scope searches only select by DN.
const ANY_OBJECT: &str = "(objectClass=*)";

/// Result code for a base DN which doesn't exist.
const NO_SUCH_OBJECT: u32 = 32;

/// Opens connections to a directory server.
pub trait Connector {
    /// Connection handle produced by this connector.
    type Conn: DirectoryConn;

    /// Connect to `host` on `port`.
    fn connect(&self, host: &str, port: u16) -> Result<Self::Conn, LdapError>;
}

/// An open directory connection.
pub trait DirectoryConn {
    /// Search the single entry named by `dn`, requesting the attributes in `attrs`
    /// with their values. Returns `Ok(None)` if there is no such entry.
    fn search_base(&mut self, dn: &str, attrs: &[&str]) -> Result<Option<Entry>, LdapError>;

    /// Terminate the connection.
    fn disconnect(&mut self) -> Result<(), LdapError>;
}

/// Additional parameters for opening a connection.
///
/// Every unset parameter leaves the client library default in effect.
#[derive(Clone, Debug, Default)]
pub struct SessionSettings {
    conn_timeout: Option<Duration>,
    op_timeout: Option<Duration>,
}

impl SessionSettings {
    /// Create an instance of the structure with default values.
    pub fn new() -> Self {
        SessionSettings {
            ..Default::default()
        }
    }

    /// Set the connection timeout.
    pub fn conn_timeout(mut self, timeout: Duration) -> Self {
        self.conn_timeout = Some(timeout);
        self
    }

    /// Set the timeout for each search and for the unbind.
    ///
    /// This is a network timeout for receiving the complete response, not a
    /// server-side time limit.
    pub fn op_timeout(mut self, timeout: Duration) -> Self {
        self.op_timeout = Some(timeout);
        self
    }
}

/// Connector backed by the `ldap3` client.
#[derive(Clone, Debug, Default)]
pub struct LdapConnector {
    settings: SessionSettings,
}

impl LdapConnector {
    /// Create a connector with default settings.
    pub fn new() -> Self {
        LdapConnector::default()
    }

    /// Create a connector with the supplied settings.
    pub fn with_settings(settings: SessionSettings) -> Self {
        LdapConnector { settings }
    }

    /// Return the connector settings.
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }
}

/// Build the `ldap://` URL for `host` and `port`.
pub(crate) fn ldap_url(host: &str, port: u16) -> Result<Url, url::ParseError> {
    let mut url = Url::parse("ldap://localhost")?;
    let host = if host.parse::<Ipv6Addr>().is_ok() {
        format!("[{}]", host)
    } else {
        host.to_owned()
    };
    url.set_host(Some(&host))?;
    // Can't fail: the URL has a host.
    let _ = url.set_port(Some(port));
    Ok(url)
}

impl Connector for LdapConnector {
    type Conn = LdapHandle;

    fn connect(&self, host: &str, port: u16) -> Result<LdapHandle, LdapError> {
        let url = ldap_url(host, port).map_err(|e| LdapError::UrlParsing { source: e })?;
        let mut conn_settings = LdapConnSettings::new();
        if let Some(timeout) = self.settings.conn_timeout {
            conn_settings = conn_settings.set_conn_timeout(timeout);
        }
        let rt = runtime::Builder::new_current_thread().enable_all().build()?;
        let ldap = rt.block_on(async {
            let (conn, ldap) = LdapConnAsync::with_settings(conn_settings, url.as_str()).await?;
            tokio::spawn(async move {
                if let Err(e) = conn.drive().await {
                    warn!("LDAP connection error: {}", e);
                }
            });
            Ok::<_, LdapError>(ldap)
        })?;
        debug!("connected to {}", url);
        Ok(LdapHandle {
            ldap,
            rt,
            op_timeout: self.settings.op_timeout,
        })
    }
}

/// Synchronous handle of an open `ldap3` connection.
///
/// The handle owns the runtime which drives the connection. Dropping it
/// without calling [`disconnect()`](DirectoryConn::disconnect) drops the
/// connection without sending an Unbind.
pub struct LdapHandle {
    ldap: Ldap,
    rt: Runtime,
    op_timeout: Option<Duration>,
}

impl LdapHandle {
    /// Borrow the underlying asynchronous handle.
    ///
    /// Requests issued through the handle must be run with
    /// [`block_on()`](#method.block_on), which drives the connection. Since
    /// `block_on()` borrows the whole `LdapHandle`, clone the `Ldap` handle
    /// first; the clone shares the connection.
    ///
    /// ```no_run
    /// use ldap3::{Scope, SearchEntry};
    /// use ldap_session::{Connector, LdapConnector};
    ///
    /// # fn main() -> Result<(), ldap3::LdapError> {
    /// let mut handle = LdapConnector::new().connect("localhost", 389)?;
    /// let mut ldap = handle.ldap().clone();
    /// let (entries, _res) = handle
    ///     .block_on(async move {
    ///         ldap.search("dc=example,dc=org", Scope::OneLevel, "(objectClass=*)", vec!["dc"])
    ///             .await
    ///     })?
    ///     .success()?;
    /// for entry in entries {
    ///     println!("{:?}", SearchEntry::construct(entry));
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn ldap(&mut self) -> &mut Ldap {
        &mut self.ldap
    }

    /// Run a future on the runtime which drives the connection.
    pub fn block_on<F: std::future::Future>(&self, f: F) -> F::Output {
        self.rt.block_on(f)
    }
}

/// Extract the first entry from the result of a base-scope search.
///
/// A missing base object is not an error; any other non-success result is.
/// Search references are skipped.
fn first_entry(res: SearchResult) -> Result<Option<Entry>, LdapError> {
    if res.1.rc == NO_SUCH_OBJECT {
        return Ok(None);
    }
    let (entries, _res) = res.success()?;
    for entry in entries {
        if let Some(entry) = Entry::decode(entry.0)? {
            return Ok(Some(entry));
        }
    }
    Ok(None)
}

impl DirectoryConn for LdapHandle {
    fn search_base(&mut self, dn: &str, attrs: &[&str]) -> Result<Option<Entry>, LdapError> {
        let rt = &self.rt;
        let ldap = &mut self.ldap;
        if let Some(timeout) = self.op_timeout {
            ldap.with_timeout(timeout);
        }
        let attrs = attrs.to_vec();
        let res = rt.block_on(async move {
            ldap.with_search_options(SearchOptions::new().typesonly(false))
                .search(dn, Scope::Base, ANY_OBJECT, attrs)
                .await
        })?;
        let entry = first_entry(res)?;
        if entry.is_none() {
            debug!("no entry for {}", dn);
        }
        Ok(entry)
    }

    fn disconnect(&mut self) -> Result<(), LdapError> {
        let rt = &self.rt;
        let ldap = &mut self.ldap;
        if let Some(timeout) = self.op_timeout {
            ldap.with_timeout(timeout);
        }
        rt.block_on(async move { ldap.unbind().await })
    }
}
