//! Opaque record data.

use core::fmt;

use std::boxed::Box;
use std::string::String;

use crate::base::iana::Rtype;

use super::RdataError;

//------------ Generic -------------------------------------------------------

/// Record data the signer does not need to look into.
///
/// The data is kept in presentation format with all whitespace between
/// fields collapsed into a single space. Two values are equal if they have
/// the same type and the same normalized presentation.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Generic {
    rtype: Rtype,
    data: Box<str>,
}

impl Generic {
    /// Creates new generic record data from its presentation format.
    #[must_use]
    pub fn new(rtype: Rtype, data: &str) -> Self {
        let tokens: std::vec::Vec<&str> = data.split_whitespace().collect();
        Self::from_tokens(rtype, &tokens)
    }

    /// Scans generic record data from its presentation format tokens.
    pub fn scan(rtype: Rtype, tokens: &[&str]) -> Result<Self, RdataError> {
        Ok(Self::from_tokens(rtype, tokens))
    }

    fn from_tokens(rtype: Rtype, tokens: &[&str]) -> Self {
        let mut data = String::new();
        for token in tokens {
            if !data.is_empty() {
                data.push(' ');
            }
            data.push_str(token);
        }
        Generic {
            rtype,
            data: data.into_boxed_str(),
        }
    }

    /// Returns the record type of the data.
    #[must_use]
    pub fn rtype(&self) -> Rtype {
        self.rtype
    }

    /// Returns the normalized presentation format of the data.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.data
    }
}

impl fmt::Display for Generic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.data)
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn whitespace_is_normalized() {
        assert_eq!(
            Generic::new(Rtype::MX, "10   mail.example."),
            Generic::new(Rtype::MX, " 10\tmail.example. ")
        );
        assert_ne!(
            Generic::new(Rtype::MX, "10 mail.example."),
            Generic::new(Rtype::MX, "20 mail.example.")
        );
        assert_eq!(Generic::new(Rtype::A, "192.0.2.1").as_str(), "192.0.2.1");
    }
}
