//! Directives controlling the signer.
//!
//! Directives are lines in the input starting with a colon. They change the
//! signing configuration for all RRsets that follow them. See
//! [`PipelineConfig::apply`][super::config::PipelineConfig::apply] for how
//! they are applied.

use core::fmt;
use core::str::FromStr;

use std::string::String;
use std::vec::Vec;

use crate::base::iana::SecAlg;
use crate::base::name::Name;
use crate::base::serial::Serial;
use crate::base::Ttl;

//------------ Directive -----------------------------------------------------

/// A single directive.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Directive {
    /// `:origin <name>` sets the apex of the zone.
    Origin(Name),

    /// `:inception <time>` sets the inception time of new signatures.
    Inception(Serial),

    /// `:expiration <time>` sets the expiration time of new signatures.
    Expiration(Serial),

    /// `:expiration_denial <time>` sets the expiration time of new
    /// signatures over NSEC and NSEC3 RRsets.
    ExpirationDenial(Serial),

    /// `:refresh <time>` sets the time before which existing signatures
    /// have to be replaced.
    Refresh(Serial),

    /// `:refresh_denial <time>` sets the refresh time for signatures over
    /// NSEC and NSEC3 RRsets.
    RefreshDenial(Serial),

    /// `:jitter <seconds>` sets the upper bound of the random amount
    /// subtracted from expiration times.
    Jitter(u32),

    /// `:soa_ttl <ttl>` overrides the TTL of the SOA record.
    SoaTtl(Ttl),

    /// `:soa_serial <serial>` overrides the serial of the SOA record.
    SoaSerial(Serial),

    /// `:soa_minimum <ttl>` overrides the minimum field of the SOA record.
    SoaMinimum(Ttl),

    /// `:zsk <key-id> <algorithm> <flags>` adds a zone signing key.
    Zsk(KeyDirective),

    /// `:ksk <key-id> <algorithm> <flags>` adds a key signing key.
    Ksk(KeyDirective),

    /// `:stop` ends processing.
    Stop,
}

//--- FromStr

impl FromStr for Directive {
    type Err = DirectiveError;

    /// Parses a directive line.
    ///
    /// The leading colon is optional.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix(':').unwrap_or(s);
        let mut tokens = s.split_whitespace();
        let command = tokens.next().unwrap_or_default();
        let args: Vec<&str> = tokens.collect();
        let res = match command {
            "origin" => {
                let [name] = expect_args::<1>(command, &args)?;
                Directive::Origin(
                    Name::from_str(name).map_err(|_| DirectiveError::Name)?,
                )
            }
            "inception" => Directive::Inception(scan_time(command, &args)?),
            "expiration" => Directive::Expiration(scan_time(command, &args)?),
            "expiration_denial" => {
                Directive::ExpirationDenial(scan_time(command, &args)?)
            }
            "refresh" => Directive::Refresh(scan_time(command, &args)?),
            "refresh_denial" => {
                Directive::RefreshDenial(scan_time(command, &args)?)
            }
            "jitter" => Directive::Jitter(scan_u32(command, &args)?),
            "soa_ttl" => {
                Directive::SoaTtl(Ttl::from_secs(scan_u32(command, &args)?))
            }
            "soa_serial" => {
                Directive::SoaSerial(Serial(scan_u32(command, &args)?))
            }
            "soa_minimum" => Directive::SoaMinimum(Ttl::from_secs(
                scan_u32(command, &args)?,
            )),
            "zsk" => Directive::Zsk(KeyDirective::scan(command, &args)?),
            "ksk" => Directive::Ksk(KeyDirective::scan(command, &args)?),
            "stop" => {
                expect_args::<0>(command, &args)?;
                Directive::Stop
            }
            _ => return Err(DirectiveError::Unknown(command.into())),
        };
        Ok(res)
    }
}

//--- Display

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Directive::Origin(name) => write!(f, ":origin {name}"),
            Directive::Inception(time) => write!(f, ":inception {time}"),
            Directive::Expiration(time) => write!(f, ":expiration {time}"),
            Directive::ExpirationDenial(time) => {
                write!(f, ":expiration_denial {time}")
            }
            Directive::Refresh(time) => write!(f, ":refresh {time}"),
            Directive::RefreshDenial(time) => {
                write!(f, ":refresh_denial {time}")
            }
            Directive::Jitter(secs) => write!(f, ":jitter {secs}"),
            Directive::SoaTtl(ttl) => write!(f, ":soa_ttl {ttl}"),
            Directive::SoaSerial(serial) => write!(f, ":soa_serial {serial}"),
            Directive::SoaMinimum(ttl) => write!(f, ":soa_minimum {ttl}"),
            Directive::Zsk(key) => write!(f, ":zsk {key}"),
            Directive::Ksk(key) => write!(f, ":ksk {key}"),
            Directive::Stop => f.write_str(":stop"),
        }
    }
}

//------------ KeyDirective --------------------------------------------------

/// The arguments of a `:zsk` or `:ksk` directive.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyDirective {
    /// The identifier of the key in the key store.
    pub id: String,

    /// The algorithm the key is expected to have.
    pub algorithm: SecAlg,

    /// The DNSKEY flags of the key.
    pub flags: u16,
}

impl KeyDirective {
    fn scan(command: &str, args: &[&str]) -> Result<Self, DirectiveError> {
        let [id, algorithm, flags] = expect_args::<3>(command, args)?;
        Ok(KeyDirective {
            id: String::from(id),
            algorithm: SecAlg::from_str(algorithm)
                .map_err(|_| DirectiveError::Algorithm)?,
            flags: u16::from_str(flags)
                .map_err(|_| DirectiveError::Number)?,
        })
    }
}

impl fmt::Display for KeyDirective {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {}", self.id, self.algorithm.to_int(), self.flags)
    }
}

//------------ Helper Functions ----------------------------------------------

fn expect_args<'a, const N: usize>(
    command: &str,
    args: &[&'a str],
) -> Result<[&'a str; N], DirectiveError> {
    <[&str; N]>::try_from(args).map_err(|_| DirectiveError::ArgumentCount {
        command: command.into(),
        expected: N,
        found: args.len(),
    })
}

fn scan_time(command: &str, args: &[&str]) -> Result<Serial, DirectiveError> {
    let [time] = expect_args::<1>(command, args)?;
    Serial::rrsig_from_str(time).map_err(|_| DirectiveError::Time)
}

fn scan_u32(command: &str, args: &[&str]) -> Result<u32, DirectiveError> {
    let [value] = expect_args::<1>(command, args)?;
    u32::from_str(value).map_err(|_| DirectiveError::Number)
}

//------------ DirectiveError ------------------------------------------------

/// A directive line could not be parsed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DirectiveError {
    /// The directive is not known.
    Unknown(String),

    /// The directive had the wrong number of arguments.
    ArgumentCount {
        command: String,
        expected: usize,
        found: usize,
    },

    /// A domain name argument was invalid.
    Name,

    /// A time argument was invalid.
    Time,

    /// A numeric argument was invalid.
    Number,

    /// An algorithm argument was neither a number nor a known mnemonic.
    Algorithm,
}

impl fmt::Display for DirectiveError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DirectiveError::Unknown(command) => {
                write!(f, "unknown directive ':{command}'")
            }
            DirectiveError::ArgumentCount {
                command,
                expected,
                found,
            } => write!(
                f,
                "directive ':{command}' expects {expected} arguments, \
                 found {found}"
            ),
            DirectiveError::Name => f.write_str("invalid domain name"),
            DirectiveError::Time => f.write_str("invalid time"),
            DirectiveError::Number => f.write_str("invalid number"),
            DirectiveError::Algorithm => f.write_str("unknown algorithm"),
        }
    }
}

impl std::error::Error for DirectiveError {}

//============ Testing =======================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(":origin example.", Directive::Origin("example.".parse().unwrap()))]
    #[case(":inception 20240101000000", Directive::Inception(Serial(1_704_067_200)))]
    #[case(":expiration 1704067200", Directive::Expiration(Serial(1_704_067_200)))]
    #[case(":refresh_denial 10", Directive::RefreshDenial(Serial(10)))]
    #[case(":jitter 3600", Directive::Jitter(3600))]
    #[case(":soa_ttl 300", Directive::SoaTtl(Ttl::from_secs(300)))]
    #[case(":soa_serial 42", Directive::SoaSerial(Serial(42)))]
    #[case("  :stop  ", Directive::Stop)]
    fn parse(#[case] line: &str, #[case] expected: Directive) {
        assert_eq!(line.parse::<Directive>(), Ok(expected));
    }

    #[test]
    fn parse_keys() {
        let zsk: Directive = ":zsk pkcs11:zsk-1 ECDSAP256SHA256 256"
            .parse()
            .unwrap();
        assert_eq!(
            zsk,
            Directive::Zsk(KeyDirective {
                id: "pkcs11:zsk-1".into(),
                algorithm: SecAlg::ECDSAP256SHA256,
                flags: 256,
            })
        );
        assert_eq!(zsk.to_string(), ":zsk pkcs11:zsk-1 13 256");
        assert_eq!(
            ":ksk k 8 257".parse::<Directive>(),
            Ok(Directive::Ksk(KeyDirective {
                id: "k".into(),
                algorithm: SecAlg::RSASHA256,
                flags: 257,
            }))
        );
    }

    #[rstest]
    #[case(":bogus 1", DirectiveError::Unknown("bogus".into()))]
    #[case(":inception yesterday", DirectiveError::Time)]
    #[case(":jitter -1", DirectiveError::Number)]
    #[case(":origin example", DirectiveError::Name)]
    #[case(":zsk k FOO 256", DirectiveError::Algorithm)]
    #[case(
        ":zsk k 8",
        DirectiveError::ArgumentCount {
            command: "zsk".into(),
            expected: 3,
            found: 2
        }
    )]
    fn parse_errors(#[case] line: &str, #[case] expected: DirectiveError) {
        assert_eq!(line.parse::<Directive>(), Err(expected));
    }
}
