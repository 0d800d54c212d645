//! Types for tuning configurable aspects of DNSSEC signing.
use std::num::NonZeroUsize;
use std::thread;

use tracing::debug;

use super::directive::Directive;
use crate::base::iana::Rtype;
use crate::base::name::Name;
use crate::base::serial::Serial;
use crate::base::Ttl;

/// The default validity period of new signatures: thirty days.
pub const DEFAULT_VALIDITY: u32 = 30 * 24 * 60 * 60;

/// The amount the default inception is moved into the past.
pub const DEFAULT_INCEPTION_OFFSET: u32 = 10;

//------------ PipelineConfig ------------------------------------------------

/// Signing configuration for re-signing a zone.
///
/// The configuration is changed by directives in the input before and
/// between RRsets. It stays the same while an RRset is processed.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PipelineConfig {
    /// The apex of the zone and signer name of all signatures.
    pub origin: Option<Name>,

    /// The inception time of new signatures.
    pub inception: Serial,

    /// The expiration time of new signatures.
    pub expiration: Serial,

    /// The expiration time of new signatures over NSEC and NSEC3 RRsets.
    pub expiration_denial: Option<Serial>,

    /// Existing signatures expiring before this time are replaced.
    pub refresh: Serial,

    /// The refresh time for signatures over NSEC and NSEC3 RRsets.
    pub refresh_denial: Option<Serial>,

    /// The maximum number of seconds subtracted from expiration times.
    pub jitter: u32,

    /// Replaces the TTL of the SOA record if present.
    pub soa_ttl: Option<Ttl>,

    /// Replaces the serial of the SOA record if present.
    pub soa_serial: Option<Serial>,

    /// Replaces the minimum field of the SOA record if present.
    pub soa_minimum: Option<Ttl>,

    /// The number of signing workers.
    pub workers: NonZeroUsize,
}

impl PipelineConfig {
    /// Creates a default configuration relative to the given time.
    pub fn at(now: Serial) -> Self {
        let inception = now.sub(DEFAULT_INCEPTION_OFFSET);
        PipelineConfig {
            origin: None,
            inception,
            expiration: inception.add(DEFAULT_VALIDITY),
            expiration_denial: None,
            refresh: now,
            refresh_denial: None,
            jitter: 0,
            soa_ttl: None,
            soa_serial: None,
            soa_minimum: None,
            workers: thread::available_parallelism()
                .unwrap_or(NonZeroUsize::MIN),
        }
    }

    /// Sets the number of signing workers.
    #[must_use]
    pub fn with_workers(mut self, workers: NonZeroUsize) -> Self {
        self.workers = workers;
        self
    }

    /// Applies a directive to the configuration.
    ///
    /// Key directives and `:stop` don’t change the configuration. They are
    /// handled by the pipeline. Returns whether the directive was applied.
    pub fn apply(&mut self, directive: &Directive) -> bool {
        match directive {
            Directive::Origin(name) => self.origin = Some(name.clone()),
            Directive::Inception(time) => self.inception = *time,
            Directive::Expiration(time) => self.expiration = *time,
            Directive::ExpirationDenial(time) => {
                self.expiration_denial = Some(*time)
            }
            Directive::Refresh(time) => self.refresh = *time,
            Directive::RefreshDenial(time) => {
                self.refresh_denial = Some(*time)
            }
            Directive::Jitter(secs) => self.jitter = *secs,
            Directive::SoaTtl(ttl) => self.soa_ttl = Some(*ttl),
            Directive::SoaSerial(serial) => self.soa_serial = Some(*serial),
            Directive::SoaMinimum(ttl) => self.soa_minimum = Some(*ttl),
            Directive::Zsk(_) | Directive::Ksk(_) | Directive::Stop => {
                return false
            }
        }
        debug!("Applied directive {directive}");
        true
    }

    /// Returns the refresh time for signatures covering `rtype`.
    pub fn refresh_for(&self, rtype: Rtype) -> Serial {
        match self.refresh_denial {
            Some(refresh) if rtype.is_denial() => refresh,
            _ => self.refresh,
        }
    }

    /// Returns the expiration time for new signatures over `rtype`.
    pub fn expiration_for(&self, rtype: Rtype) -> Serial {
        match self.expiration_denial {
            Some(expiration) if rtype.is_denial() => expiration,
            _ => self.expiration,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::at(Serial::now())
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = PipelineConfig::at(Serial(1_000_000));
        assert_eq!(config.inception, Serial(999_990));
        assert_eq!(config.expiration, Serial(999_990 + DEFAULT_VALIDITY));
        assert_eq!(config.refresh, Serial(1_000_000));
        assert_eq!(config.origin, None);
        assert_eq!(config.jitter, 0);
    }

    #[test]
    fn denial_overrides() {
        let mut config = PipelineConfig::at(Serial(1_000_000));
        assert!(config.apply(&Directive::RefreshDenial(Serial(5))));
        assert!(config.apply(&Directive::ExpirationDenial(Serial(7))));
        assert_eq!(config.refresh_for(Rtype::NSEC3), Serial(5));
        assert_eq!(config.refresh_for(Rtype::A), Serial(1_000_000));
        assert_eq!(config.expiration_for(Rtype::NSEC), Serial(7));
        assert_eq!(config.expiration_for(Rtype::SOA), config.expiration);
        assert!(!config.apply(&Directive::Stop));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde() {
        let mut config = PipelineConfig::at(Serial(1_000_000));
        config.origin = Some("example.".parse().unwrap());
        let json = serde_json::to_string(&config).unwrap();
        let back: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
