//! Record data for SOA records.

use core::fmt;
use core::str::FromStr;

use crate::base::name::Name;
use crate::base::serial::Serial;
use crate::base::Ttl;

use super::RdataError;

//------------ Soa -----------------------------------------------------------

/// Soa record data.
///
/// Soa records mark the top of a zone and contain information pertinent to
/// name server maintenance operations.
///
/// The Soa record type is defined in RFC 1035, section 3.3.13.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Soa {
    mname: Name,
    rname: Name,
    serial: Serial,
    refresh: Ttl,
    retry: Ttl,
    expire: Ttl,
    minimum: Ttl,
}

impl Soa {
    /// Creates new Soa record data from content.
    #[must_use]
    pub fn new(
        mname: Name,
        rname: Name,
        serial: Serial,
        refresh: Ttl,
        retry: Ttl,
        expire: Ttl,
        minimum: Ttl,
    ) -> Self {
        Soa {
            mname,
            rname,
            serial,
            refresh,
            retry,
            expire,
            minimum,
        }
    }

    /// Scans SOA record data from its seven presentation format fields.
    pub fn scan(tokens: &[&str]) -> Result<Self, RdataError> {
        let [mname, rname, serial, refresh, retry, expire, minimum] = tokens
        else {
            return Err(RdataError::FieldCount {
                expected: 7,
                found: tokens.len(),
            });
        };
        Ok(Soa::new(
            Name::from_str(mname)?,
            Name::from_str(rname)?,
            Serial::from_str(serial)
                .map_err(|_| RdataError::Number("serial"))?,
            scan_ttl(refresh, "refresh")?,
            scan_ttl(retry, "retry")?,
            scan_ttl(expire, "expire")?,
            scan_ttl(minimum, "minimum")?,
        ))
    }

    /// The primary name server for the zone.
    pub fn mname(&self) -> &Name {
        &self.mname
    }

    /// The mailbox for the person responsible for this zone.
    pub fn rname(&self) -> &Name {
        &self.rname
    }

    /// The serial number of the original copy of the zone.
    pub fn serial(&self) -> Serial {
        self.serial
    }

    /// The time interval before the zone should be refreshed.
    pub fn refresh(&self) -> Ttl {
        self.refresh
    }

    /// The time before a failed refresh is retried.
    pub fn retry(&self) -> Ttl {
        self.retry
    }

    /// The upper limit of time the zone is authoritative.
    pub fn expire(&self) -> Ttl {
        self.expire
    }

    /// The minimum TTL to be exported with any RR from this zone.
    pub fn minimum(&self) -> Ttl {
        self.minimum
    }

    /// Replaces the serial number.
    pub fn set_serial(&mut self, serial: Serial) {
        self.serial = serial
    }

    /// Replaces the minimum TTL.
    pub fn set_minimum(&mut self, minimum: Ttl) {
        self.minimum = minimum
    }
}

fn scan_ttl(token: &str, field: &'static str) -> Result<Ttl, RdataError> {
    Ttl::from_str(token).map_err(|_| RdataError::Number(field))
}

//--- Display

impl fmt::Display for Soa {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {}",
            self.mname,
            self.rname,
            self.serial,
            self.refresh,
            self.retry,
            self.expire,
            self.minimum
        )
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn scan_and_display() {
        let tokens = [
            "ns.example.",
            "hostmaster.example.",
            "2024010101",
            "3600",
            "900",
            "604800",
            "300",
        ];
        let soa = Soa::scan(&tokens).unwrap();
        assert_eq!(soa.serial(), Serial(2024010101));
        assert_eq!(soa.minimum(), Ttl::from_secs(300));
        assert_eq!(soa.to_string(), tokens.join(" "));
        assert_eq!(
            Soa::scan(&tokens[..6]),
            Err(RdataError::FieldCount {
                expected: 7,
                found: 6
            })
        );
    }
}
