//! Signing keys and the key store.
//!
//! The signer never sees private key material. Keys live in a [`KeyStore`]
//! (an HSM or a software key store) and are referred to through opaque
//! handles. The signer only keeps track of which keys exist, what their
//! key tags and algorithms are, and which of them still need to sign the
//! RRset currently processed.

use core::fmt;

use std::string::String;
use std::vec::Vec;

use crate::base::iana::{Rtype, SecAlg};
use crate::base::name::Name;
use crate::base::record::Record;
use crate::base::serial::Serial;
use crate::rdata::Rrsig;

use super::error::{KeyStoreError, SignError};
use super::records::Rrset;

//------------ KeyStore ------------------------------------------------------

/// Access to signing keys.
///
/// The key store is shared by all signing workers, so `sign` may be called
/// from several threads at once.
pub trait KeyStore: Send + Sync {
    /// An opaque reference to a key in the store.
    type Handle: Clone + Send + Sync + 'static;

    /// Looks up the key with the given identifier.
    fn find_key(
        &self,
        key_id: &str,
    ) -> Result<KeyInfo<Self::Handle>, KeyStoreError>;

    /// Creates an RRSIG record over `rrset` using `key`.
    fn sign(
        &self,
        rrset: &Rrset,
        key: &Self::Handle,
        params: &SignParams,
    ) -> Result<Record, SignError>;
}

//------------ KeyInfo -------------------------------------------------------

/// What the key store knows about a key.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyInfo<H> {
    /// The handle for signing with the key.
    pub handle: H,

    /// The key tag of the key’s DNSKEY record.
    pub key_tag: u16,

    /// The algorithm of the key.
    pub algorithm: SecAlg,
}

//------------ SignParams ----------------------------------------------------

/// The parameters for creating a single signature.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SignParams {
    /// The signer name, i.e., the apex of the zone.
    pub signer: Name,

    /// The inception time of the signature.
    pub inception: Serial,

    /// The expiration time of the signature.
    pub expiration: Serial,
}

//------------ SigningKey ----------------------------------------------------

/// A key used for signing the zone.
#[derive(Clone, Debug)]
pub struct SigningKey<H> {
    id: String,
    handle: H,
    key_tag: u16,
    algorithm: SecAlg,
    flags: u16,

    /// Whether the key still needs to sign the current RRset.
    enabled: bool,
}

impl<H> SigningKey<H> {
    pub fn new(id: impl Into<String>, info: KeyInfo<H>, flags: u16) -> Self {
        SigningKey {
            id: id.into(),
            handle: info.handle,
            key_tag: info.key_tag,
            algorithm: info.algorithm,
            flags,
            enabled: true,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn key_tag(&self) -> u16 {
        self.key_tag
    }

    pub fn algorithm(&self) -> SecAlg {
        self.algorithm
    }

    pub fn flags(&self) -> u16 {
        self.flags
    }

    /// Whether this is a zone key.
    ///
    /// From [RFC 4034, section 2.1.1]:
    ///
    /// > Bit 7 of the Flags field is the Zone Key flag.  If bit 7 has value
    /// > 1, then the DNSKEY record holds a DNS zone key, and the DNSKEY RR's
    /// > owner name MUST be the name of a zone.
    ///
    /// [RFC 4034, section 2.1.1]: https://datatracker.ietf.org/doc/html/rfc4034#section-2.1.1
    pub fn is_zone_key(&self) -> bool {
        self.flags & (1 << 8) != 0
    }

    /// Whether this is a secure entry point, i.e., has the SEP flag set.
    pub fn is_secure_entry_point(&self) -> bool {
        self.flags & 1 != 0
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns whether `rrsig` was made by this key.
    pub fn made(&self, rrsig: &Rrsig) -> bool {
        self.key_tag == rrsig.key_tag() && self.algorithm == rrsig.algorithm()
    }
}

impl<H> fmt::Display for SigningKey<H> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} (tag {}, algorithm {})",
            self.id, self.key_tag, self.algorithm
        )
    }
}

//------------ KeyList -------------------------------------------------------

/// The keys of one role.
#[derive(Clone, Debug)]
pub struct KeyList<H> {
    keys: Vec<SigningKey<H>>,
}

impl<H> KeyList<H> {
    pub fn new() -> Self {
        KeyList { keys: Vec::new() }
    }

    /// Adds a key.
    ///
    /// Returns `false` and leaves the list alone if a key with the same
    /// identifier is already present.
    pub fn add(&mut self, key: SigningKey<H>) -> bool {
        if self.keys.iter().any(|item| item.id == key.id) {
            return false;
        }
        self.keys.push(key);
        true
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SigningKey<H>> + '_ {
        self.keys.iter()
    }

    /// Returns the keys that still need to sign the current RRset.
    pub fn enabled(&self) -> impl Iterator<Item = &SigningKey<H>> + '_ {
        self.keys.iter().filter(|key| key.enabled)
    }

    /// Marks all keys as needing to sign.
    pub fn enable_all(&mut self) {
        self.keys.iter_mut().for_each(|key| key.enabled = true)
    }

    /// Marks the key that made `rrsig` as not needing to sign.
    ///
    /// Returns whether there was such a key.
    pub fn disable_signer_of(&mut self, rrsig: &Rrsig) -> bool {
        let mut found = false;
        for key in self.keys.iter_mut().filter(|key| key.made(rrsig)) {
            key.enabled = false;
            found = true;
        }
        found
    }
}

impl<H> Default for KeyList<H> {
    fn default() -> Self {
        Self::new()
    }
}

//------------ KeyRole -------------------------------------------------------

/// The role of a key.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KeyRole {
    /// A key signing key, used for the DNSKEY RRset.
    Ksk,

    /// A zone signing key, used for all other RRsets.
    Zsk,
}

impl KeyRole {
    /// Returns the role of the keys that sign RRsets of type `rtype`.
    pub fn for_rtype(rtype: Rtype) -> Self {
        if rtype == Rtype::DNSKEY {
            KeyRole::Ksk
        } else {
            KeyRole::Zsk
        }
    }
}

impl fmt::Display for KeyRole {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            KeyRole::Ksk => "KSK",
            KeyRole::Zsk => "ZSK",
        })
    }
}

//------------ KeySet --------------------------------------------------------

/// The key signing and zone signing keys of a zone.
#[derive(Clone, Debug)]
pub struct KeySet<H> {
    ksks: KeyList<H>,
    zsks: KeyList<H>,
}

impl<H> KeySet<H> {
    pub fn new() -> Self {
        KeySet {
            ksks: KeyList::new(),
            zsks: KeyList::new(),
        }
    }

    pub fn list(&self, role: KeyRole) -> &KeyList<H> {
        match role {
            KeyRole::Ksk => &self.ksks,
            KeyRole::Zsk => &self.zsks,
        }
    }

    pub fn list_mut(&mut self, role: KeyRole) -> &mut KeyList<H> {
        match role {
            KeyRole::Ksk => &mut self.ksks,
            KeyRole::Zsk => &mut self.zsks,
        }
    }

    /// Returns the list of keys for signing RRsets of type `rtype`.
    pub fn for_rtype(&self, rtype: Rtype) -> &KeyList<H> {
        self.list(KeyRole::for_rtype(rtype))
    }

    /// Marks all keys as needing to sign.
    pub fn enable_all(&mut self) {
        self.ksks.enable_all();
        self.zsks.enable_all();
    }

    /// Marks the key that made `rrsig` as not needing to sign.
    ///
    /// The key is looked for in both lists.
    pub fn disable_signer_of(&mut self, rrsig: &Rrsig) -> bool {
        let ksk = self.ksks.disable_signer_of(rrsig);
        let zsk = self.zsks.disable_signer_of(rrsig);
        ksk || zsk
    }
}

impl<H> Default for KeySet<H> {
    fn default() -> Self {
        Self::new()
    }
}

//============ Testing =======================================================
