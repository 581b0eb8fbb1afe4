//! Attributes retrieved by a lookup, and their decoding from raw search results.
//!
//! The LDAP client returns each search result entry as an undecoded BER
//! structure. Unlike the client's own `SearchEntry`, which sorts values into
//! text and binary maps, the decoding here keeps the attributes in the order
//! the server sent them, and every value as raw bytes. Conversion to text is
//! left to the accessor which needs it.

use std::borrow::Cow;
use std::io;

use lber::structure::StructureTag;
use ldap3::LdapError;

/// Protocol tag of a SearchResultEntry.
const SEARCH_RESULT_ENTRY: u64 = 4;

/// A named attribute with zero or more values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    name: String,
    values: Vec<Vec<u8>>,
}

impl Attribute {
    /// Create an attribute from its name and raw values.
    pub fn new<S: Into<String>>(name: S, values: Vec<Vec<u8>>) -> Self {
        Attribute {
            name: name.into(),
            values,
        }
    }

    /// Attribute type, as returned by the server.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the attribute has no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw values, in server order.
    pub fn values(&self) -> &[Vec<u8>] {
        &self.values
    }

    /// The first value as text, or `None` if there are no values.
    ///
    /// Invalid UTF-8 sequences are replaced with U+FFFD.
    pub fn string_value(&self) -> Option<String> {
        self.values.first().map(|v| text(v).into_owned())
    }

    /// All values as text, in server order.
    pub fn string_values(&self) -> Vec<String> {
        self.values.iter().map(|v| text(v).into_owned()).collect()
    }

    /// The first value as bytes. Empty if there are no values.
    pub fn byte_value(&self) -> Vec<u8> {
        self.values.first().cloned().unwrap_or_default()
    }

    /// Consume the attribute, returning its raw values.
    pub fn into_values(self) -> Vec<Vec<u8>> {
        self.values
    }
}

fn text(v: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(v)
}

/// A search result entry: the DN and its attributes, in server order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub dn: String,
    pub attrs: Vec<Attribute>,
}

impl Entry {
    /// Decode a raw search result item.
    ///
    /// Returns `Ok(None)` if the item isn't a result entry (e.g., it's a
    /// search reference), and an error if the entry is malformed.
    pub fn decode(tag: StructureTag) -> Result<Option<Entry>, LdapError> {
        if tag.id != SEARCH_RESULT_ENTRY {
            return Ok(None);
        }
        let mut tags = tag
            .expect_constructed()
            .ok_or_else(|| malformed("entry"))?
            .into_iter();
        let dn = tags
            .next()
            .and_then(|t| t.expect_primitive())
            .ok_or_else(|| malformed("object name"))?;
        let dn = String::from_utf8(dn).map_err(|_| malformed("object name"))?;
        let parts = tags
            .next()
            .and_then(|t| t.expect_constructed())
            .ok_or_else(|| malformed("attribute list"))?;
        let mut attrs = Vec::with_capacity(parts.len());
        for part in parts {
            let mut part = part
                .expect_constructed()
                .ok_or_else(|| malformed("partial attribute"))?
                .into_iter();
            let name = part
                .next()
                .and_then(|t| t.expect_primitive())
                .ok_or_else(|| malformed("attribute type"))?;
            let name = String::from_utf8(name).map_err(|_| malformed("attribute type"))?;
            let values = part
                .next()
                .and_then(|t| t.expect_constructed())
                .ok_or_else(|| malformed("attribute values"))?
                .into_iter()
                .map(|t| t.expect_primitive().ok_or_else(|| malformed("attribute value")))
                .collect::<Result<Vec<_>, _>>()?;
            attrs.push(Attribute { name, values });
        }
        Ok(Some(Entry { dn, attrs }))
    }

    /// The first attribute of the entry, if it has at least one value.
    pub fn into_first_attribute(self) -> Option<Attribute> {
        self.attrs.into_iter().next().filter(|a| !a.is_empty())
    }
}

fn malformed(what: &str) -> LdapError {
    LdapError::from(io::Error::new(
        io::ErrorKind::InvalidData,
        format!("malformed search result entry: {}", what),
    ))
}


#[cfg(test)]
mod tests {
    use super::tags::{cons, entry, prim};
    use super::*;

    use lber::common::TagClass;

    #[test]
    fn decode_keeps_order_and_bytes() {
        let tag = entry(
            "theObjectDN",
            vec![
                ("theAttributeName", vec![&b"theValue1"[..], &b"theValue2"[..]]),
                ("photo", vec![&[4u8, 8, 252][..]]),
            ],
        );
        let e = Entry::decode(tag).expect("decode").expect("entry");
        assert_eq!(e.dn, "theObjectDN");
        assert_eq!(e.attrs.len(), 2);
        assert_eq!(e.attrs[0].name(), "theAttributeName");
        assert_eq!(e.attrs[0].string_values(), vec!["theValue1", "theValue2"]);
        assert_eq!(e.attrs[1].byte_value(), vec![4, 8, 252]);
    }

    #[test]
    fn decode_skips_references() {
        let tag = cons(19, TagClass::Application, vec![prim(b"ldap://elsewhere/")]);
        assert_eq!(Entry::decode(tag).expect("decode"), None);
    }

    #[test]
    fn decode_rejects_truncated_entry() {
        let tag = cons(4, TagClass::Application, vec![prim(b"cn=x")]);
        assert!(Entry::decode(tag).is_err());
    }

    #[test]
    fn first_attribute_requires_values() {
        let e = Entry::decode(entry("cn=x", vec![("mail", vec![])]))
            .expect("decode")
            .expect("entry");
        assert_eq!(e.into_first_attribute(), None);
        let e = Entry::decode(entry("cn=x", vec![])).expect("decode").expect("entry");
        assert_eq!(e.into_first_attribute(), None);
    }

    #[test]
    fn text_conversion_is_lossy() {
        let a = Attribute::new("x", vec![vec![0x66, 0xff, 0x6f]]);
        assert_eq!(a.string_value().as_deref(), Some("f\u{fffd}o"));
        let empty = Attribute::new("x", vec![]);
        assert_eq!(empty.string_value(), None);
        assert!(empty.byte_value().is_empty());
        assert!(empty.string_values().is_empty());
    }
}
