use std::time::Duration;

use ldap_session::{DirectorySession, LdapConnector, SessionSettings};

fn main() -> ldap_session::Result<()> {
    env_logger::init();
    let connector = LdapConnector::with_settings(
        SessionSettings::new()
            .conn_timeout(Duration::from_secs(5))
            .op_timeout(Duration::from_secs(5)),
    );
    DirectorySession::scoped(connector, "localhost", 2389, |session| {
        let dn = "uid=inejge,ou=People,dc=example,dc=org";
        println!("cn: {:?}", session.get_attribute_value(dn, "cn")?);
        println!("objectClass: {:?}", session.get_attribute_values(dn, "objectClass")?);
        println!("jpegPhoto: {} bytes", session.get_attribute_value_bytes(dn, "jpegPhoto")?.len());
        Ok(())
    })
}
