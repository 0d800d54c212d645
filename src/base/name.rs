//! Domain names.
//!
//! The signer only ever deals with absolute names in presentation format as
//! they appear in the zone it reads. [`Name`] keeps that representation
//! around unchanged so that records are printed exactly the way they were
//! read, but compares names the way DNS does: ASCII case is ignored and the
//! order is the canonical order of [RFC 4034, section 6.1].
//!
//! Escape sequences in labels are kept as written but decoded for
//! comparison.
//!
//! [RFC 4034, section 6.1]: https://tools.ietf.org/html/rfc4034#section-6.1

use core::cmp::Ordering;
use core::hash::{Hash, Hasher};
use core::{fmt, str};

use std::boxed::Box;
use std::vec::Vec;

use super::cmp::CanonicalOrd;

//------------ Name ----------------------------------------------------------

/// An absolute domain name.
#[derive(Clone)]
pub struct Name(Box<str>);

impl Name {
    /// The maximum length of a label in octets.
    pub const MAX_LABEL_LEN: usize = 63;

    /// The maximum length of a name in its wire format.
    pub const MAX_NAME_LEN: usize = 255;

    /// Returns the root name.
    #[must_use]
    pub fn root() -> Self {
        Name(".".into())
    }

    /// Returns whether this is the root name.
    #[must_use]
    pub fn is_root(&self) -> bool {
        &*self.0 == "."
    }

    /// Returns the presentation format of the name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the labels of the name from left to right.
    ///
    /// The empty root label is not included.
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        if self.is_root() {
            return Vec::new();
        }
        split_labels(&self.0[..self.0.len() - 1])
    }

    /// Returns the number of labels excluding the root label.
    #[must_use]
    pub fn label_count(&self) -> usize {
        self.labels().len()
    }

    /// Returns the number of labels to put into an RRSIG for this name.
    ///
    /// This is the label count without the root label and without a
    /// leading wildcard label.
    #[must_use]
    pub fn rrsig_label_count(&self) -> u8 {
        let labels = self.labels();
        let count = match labels.first() {
            Some(&"*") => labels.len() - 1,
            _ => labels.len(),
        };
        count as u8
    }

    /// Returns whether `self` is equal to or a subdomain of `base`.
    #[must_use]
    pub fn ends_with(&self, base: &Name) -> bool {
        let labels = self.labels();
        let base = base.labels();
        if base.len() > labels.len() {
            return false;
        }
        labels
            .iter()
            .rev()
            .zip(base.iter().rev())
            .all(|(left, right)| label_cmp(left, right) == Ordering::Equal)
    }

    /// Returns whether `self` is a strict subdomain of `base`.
    #[must_use]
    pub fn is_below(&self, base: &Name) -> bool {
        self.label_count() > base.label_count() && self.ends_with(base)
    }
}

//--- FromStr

impl str::FromStr for Name {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(NameError::Empty);
        }
        if s == "." {
            return Ok(Name::root());
        }
        if !s.is_ascii() {
            return Err(NameError::IllegalCharacter);
        }
        if !s.ends_with('.') || s.ends_with("\\.") && !s.ends_with("\\\\.") {
            return Err(NameError::RelativeName);
        }
        let mut wire_len = 1;
        for label in split_labels(&s[..s.len() - 1]) {
            let len = label_len(label);
            if len == 0 {
                return Err(NameError::EmptyLabel);
            }
            if len > Self::MAX_LABEL_LEN {
                return Err(NameError::LongLabel);
            }
            wire_len += len + 1;
        }
        if wire_len > Self::MAX_NAME_LEN {
            return Err(NameError::LongName);
        }
        Ok(Name(s.into()))
    }
}

//--- PartialEq, Eq, and Hash

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
            || self.canonical_cmp(other) == Ordering::Equal
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for label in self.labels() {
            state.write(&label_octets(label));
            state.write_u8(b'.');
        }
    }
}

//--- PartialOrd, Ord, and CanonicalOrd

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Name {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical_cmp(other)
    }
}

impl CanonicalOrd for Name {
    fn canonical_cmp(&self, other: &Self) -> Ordering {
        let left = self.labels();
        let right = other.labels();
        let mut left = left.iter().rev();
        let mut right = right.iter().rev();
        loop {
            match (left.next(), right.next()) {
                (Some(l), Some(r)) => match label_cmp(l, r) {
                    Ordering::Equal => {}
                    res => return res,
                },
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (None, None) => return Ordering::Equal,
            }
        }
    }
}

//--- Display and Debug

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

//--- Serialize and Deserialize

#[cfg(feature = "serde")]
impl serde::Serialize for Name {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Name {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Self, D::Error> {
        let s = <std::string::String as serde::Deserialize>::deserialize(
            deserializer,
        )?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

//------------ Helper Functions ----------------------------------------------

/// Splits a relative name at unescaped dots.
fn split_labels(s: &str) -> Vec<&str> {
    let mut res = Vec::new();
    let bytes = s.as_bytes();
    let mut start = 0;
    let mut pos = 0;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 2,
            b'.' => {
                res.push(&s[start..pos]);
                pos += 1;
                start = pos;
            }
            _ => pos += 1,
        }
    }
    res.push(&s[start..]);
    res
}

/// Returns the wire length of a label in presentation format.
fn label_len(label: &str) -> usize {
    let bytes = label.as_bytes();
    let mut len = 0;
    let mut pos = 0;
    while pos < bytes.len() {
        if bytes[pos] == b'\\' {
            // Either `\DDD` or `\X`.
            if bytes.get(pos + 1).map_or(false, u8::is_ascii_digit) {
                pos += 4;
            } else {
                pos += 2;
            }
        } else {
            pos += 1;
        }
        len += 1;
    }
    len
}

/// Returns the lowercased octets of a label in presentation format.
fn label_octets(label: &str) -> Vec<u8> {
    let bytes = label.as_bytes();
    let mut res = Vec::with_capacity(bytes.len());
    let mut pos = 0;
    while pos < bytes.len() {
        let ch = bytes[pos];
        if ch != b'\\' || pos + 1 == bytes.len() {
            res.push(ch);
            pos += 1;
            continue;
        }
        let digits = bytes.get(pos + 1..pos + 4).filter(|digits| {
            digits.iter().all(u8::is_ascii_digit)
        });
        match digits {
            Some(digits) => {
                let value = digits
                    .iter()
                    .fold(0u16, |acc, d| acc * 10 + u16::from(d - b'0'));
                res.push(value as u8);
                pos += 4;
            }
            None => {
                res.push(bytes[pos + 1]);
                pos += 2;
            }
        }
    }
    res.make_ascii_lowercase();
    res
}

fn label_cmp(left: &str, right: &str) -> Ordering {
    label_octets(left).cmp(&label_octets(right))
}

//------------ NameError -----------------------------------------------------

/// A domain name could not be created from a string.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NameError {
    /// The string was empty.
    Empty,

    /// The name contained a non-ASCII character.
    IllegalCharacter,

    /// The name was not absolute.
    RelativeName,

    /// The name contained an empty label.
    EmptyLabel,

    /// A label was longer than 63 octets.
    LongLabel,

    /// The name was longer than 255 octets.
    LongName,
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            NameError::Empty => "empty name",
            NameError::IllegalCharacter => "illegal character in name",
            NameError::RelativeName => "relative name",
            NameError::EmptyLabel => "empty label",
            NameError::LongLabel => "label too long",
            NameError::LongName => "name too long",
        })
    }
}

impl std::error::Error for NameError {}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use core::str::FromStr;

    fn name(s: &str) -> Name {
        Name::from_str(s).unwrap()
    }

    #[test]
    fn from_str() {
        assert!(name(".").is_root());
        assert_eq!(name("www.Example.COM.").labels(), ["www", "Example", "COM"]);
        assert_eq!(name("a\\.b.example.").labels(), ["a\\.b", "example"]);
        assert_eq!(Name::from_str("example"), Err(NameError::RelativeName));
        assert_eq!(Name::from_str("a..example."), Err(NameError::EmptyLabel));
        assert_eq!(Name::from_str(""), Err(NameError::Empty));
        let long = format!("{}.example.", "a".repeat(64));
        assert_eq!(Name::from_str(&long), Err(NameError::LongLabel));
    }

    #[test]
    fn eq_ignores_case() {
        assert_eq!(name("Example.COM."), name("example.com."));
        assert_ne!(name("example.com."), name("example.net."));
    }

    #[test]
    fn canonical_order() {
        // The example from RFC 4034, section 6.1.
        let ordered = [
            "example.",
            "a.example.",
            "yljkjljk.a.example.",
            "Z.a.example.",
            "zABC.a.EXAMPLE.",
            "z.example.",
            "\\001.z.example.",
            "*.z.example.",
            "\\200.z.example.",
        ];
        for pair in ordered.windows(2) {
            assert!(
                name(pair[0]).canonical_lt(&name(pair[1])),
                "{} < {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn subdomains() {
        let apex = name("example.");
        assert!(name("www.example.").ends_with(&apex));
        assert!(name("EXAMPLE.").ends_with(&apex));
        assert!(!name("example.").is_below(&apex));
        assert!(name("a.b.example.").is_below(&name("B.example.")));
        assert!(!name("example.net.").ends_with(&apex));
        assert!(name("example.").ends_with(&Name::root()));
    }

    #[test]
    fn rrsig_labels() {
        assert_eq!(name("*.a.example.").rrsig_label_count(), 2);
        assert_eq!(name("a.example.").rrsig_label_count(), 2);
        assert_eq!(name(".").rrsig_label_count(), 0);
    }
}
