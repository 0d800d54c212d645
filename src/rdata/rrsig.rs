//! Record data for RRSIG records.
//!
//! The RRSIG record type is defined in [RFC 4034, section 3].
//!
//! [RFC 4034, section 3]: https://tools.ietf.org/html/rfc4034#section-3

use core::fmt;
use core::str::FromStr;

use std::string::String;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;

use crate::base::iana::{Rtype, SecAlg};
use crate::base::name::Name;
use crate::base::serial::Serial;
use crate::base::Ttl;

use super::RdataError;

/// The inception and expiration times of a signature.
pub type Timestamp = Serial;

//------------ Rrsig ---------------------------------------------------------

/// RRSIG record data.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Rrsig {
    type_covered: Rtype,
    algorithm: SecAlg,
    labels: u8,
    original_ttl: Ttl,
    expiration: Timestamp,
    inception: Timestamp,
    key_tag: u16,
    signer_name: Name,
    signature: Bytes,
}

impl Rrsig {
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        type_covered: Rtype,
        algorithm: SecAlg,
        labels: u8,
        original_ttl: Ttl,
        expiration: Timestamp,
        inception: Timestamp,
        key_tag: u16,
        signer_name: Name,
        signature: Bytes,
    ) -> Self {
        Rrsig {
            type_covered,
            algorithm,
            labels,
            original_ttl,
            expiration,
            inception,
            key_tag,
            signer_name,
            signature,
        }
    }

    /// Scans RRSIG record data from its presentation format fields.
    ///
    /// The Base 64 signature may be split over any number of tokens.
    pub fn scan(tokens: &[&str]) -> Result<Self, RdataError> {
        if tokens.len() < 9 {
            return Err(RdataError::FieldCount {
                expected: 9,
                found: tokens.len(),
            });
        }
        let type_covered =
            Rtype::from_str(tokens[0]).map_err(|_| RdataError::Rtype)?;
        let algorithm =
            SecAlg::from_str(tokens[1]).map_err(|_| RdataError::Algorithm)?;
        let labels =
            u8::from_str(tokens[2]).map_err(|_| RdataError::Number("labels"))?;
        let original_ttl = Ttl::from_str(tokens[3])
            .map_err(|_| RdataError::Number("original TTL"))?;
        let expiration = Serial::rrsig_from_str(tokens[4])
            .map_err(|_| RdataError::Time("expiration"))?;
        let inception = Serial::rrsig_from_str(tokens[5])
            .map_err(|_| RdataError::Time("inception"))?;
        let key_tag = u16::from_str(tokens[6])
            .map_err(|_| RdataError::Number("key tag"))?;
        let signer_name = Name::from_str(tokens[7])?;
        let signature: String = tokens[8..].concat();
        let signature = STANDARD
            .decode(signature.as_bytes())
            .map_err(|_| RdataError::Base64)?;
        Ok(Rrsig::new(
            type_covered,
            algorithm,
            labels,
            original_ttl,
            expiration,
            inception,
            key_tag,
            signer_name,
            signature.into(),
        ))
    }

    pub fn type_covered(&self) -> Rtype {
        self.type_covered
    }

    pub fn algorithm(&self) -> SecAlg {
        self.algorithm
    }

    pub fn labels(&self) -> u8 {
        self.labels
    }

    pub fn original_ttl(&self) -> Ttl {
        self.original_ttl
    }

    pub fn expiration(&self) -> Timestamp {
        self.expiration
    }

    pub fn inception(&self) -> Timestamp {
        self.inception
    }

    pub fn key_tag(&self) -> u16 {
        self.key_tag
    }

    pub fn signer_name(&self) -> &Name {
        &self.signer_name
    }

    pub fn signature(&self) -> &Bytes {
        &self.signature
    }
}

//--- Display

impl fmt::Display for Rrsig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {} {} {}",
            self.type_covered,
            self.algorithm.to_int(),
            self.labels,
            self.original_ttl,
            self.expiration.display_rrsig(),
            self.inception.display_rrsig(),
            self.key_tag,
            self.signer_name,
            STANDARD.encode(&self.signature),
        )
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;

    const RRSIG: &str = "A 8 2 3600 20240201000000 20240101000000 \
                         12345 example. AAECAwQF BgcI";

    #[test]
    fn scan_and_display() {
        let tokens: std::vec::Vec<&str> = RRSIG.split_whitespace().collect();
        let rrsig = Rrsig::scan(&tokens).unwrap();
        assert_eq!(rrsig.type_covered(), Rtype::A);
        assert_eq!(rrsig.algorithm(), SecAlg::RSASHA256);
        assert_eq!(rrsig.key_tag(), 12345);
        assert_eq!(
            rrsig.expiration(),
            Serial::rrsig_from_str("20240201000000").unwrap()
        );
        assert_eq!(rrsig.signature().as_ref(), &[0, 1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(
            rrsig.to_string(),
            "A 8 2 3600 20240201000000 20240101000000 12345 example. \
             AAECAwQFBgcI"
        );
    }

    #[test]
    fn scan_errors() {
        let tokens: std::vec::Vec<&str> =
            RRSIG.split_whitespace().take(8).collect();
        assert!(matches!(
            Rrsig::scan(&tokens),
            Err(RdataError::FieldCount { expected: 9, found: 8 })
        ));
        let mut tokens: std::vec::Vec<&str> =
            RRSIG.split_whitespace().collect();
        tokens[8] = "!!";
        assert_eq!(Rrsig::scan(&tokens), Err(RdataError::Base64));
    }
}
