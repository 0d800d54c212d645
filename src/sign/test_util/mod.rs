use core::str::FromStr;

use std::collections::HashMap;
use std::string::String;
use std::time::Duration;
use std::vec::Vec;

use bytes::Bytes;
use parking_lot::Mutex;
use rand::Rng;

use crate::base::iana::{Class, SecAlg};
use crate::base::{Name, Record, Rtype, Serial, Ttl};
use crate::rdata::{Generic, Rrsig, Soa};

use super::error::{KeyStoreError, SignError};
use super::keys::{KeyInfo, KeyStore, SignParams};
use super::records::Rrset;

pub(crate) const TEST_TTL: Ttl = Ttl::from_secs(300);

pub(crate) const TEST_ALGORITHM: SecAlg = SecAlg::ECDSAP256SHA256;

pub(crate) fn mk_name(name: &str) -> Name {
    Name::from_str(name).unwrap()
}

pub(crate) fn mk_record(owner: &str, rtype: &str, data: &str) -> Record {
    let rtype = Rtype::from_str(rtype).unwrap();
    Record::new(mk_name(owner), Class::IN, TEST_TTL, Generic::new(rtype, data))
}

pub(crate) fn mk_a(owner: &str, addr: &str) -> Record {
    mk_record(owner, "A", addr)
}

pub(crate) fn mk_txt(owner: &str, text: &str) -> Record {
    mk_record(owner, "TXT", text)
}

pub(crate) fn mk_soa(owner: &str, serial: u32) -> Record {
    let soa = Soa::new(
        mk_name("ns.example."),
        mk_name("hostmaster.example."),
        Serial(serial),
        Ttl::from_secs(3600),
        Ttl::from_secs(900),
        Ttl::from_secs(604800),
        TEST_TTL,
    );
    Record::new(mk_name(owner), Class::IN, Ttl::from_secs(3600), soa)
}

/// Creates a signature by the test key with tag `key_tag`.
pub(crate) fn mk_rrsig(
    owner: &str,
    covered: Rtype,
    key_tag: u16,
    expiration: u32,
) -> Record {
    let owner = mk_name(owner);
    let rrsig = Rrsig::new(
        covered,
        TEST_ALGORITHM,
        owner.rrsig_label_count(),
        TEST_TTL,
        Serial(expiration),
        Serial(0),
        key_tag,
        mk_name("example."),
        Bytes::from_static(b"signature"),
    );
    Record::new(owner, Class::IN, TEST_TTL, rrsig)
}

pub(crate) fn mk_rrset(records: &[Record]) -> Rrset {
    Rrset::from_records(records.to_vec()).unwrap()
}

pub(crate) fn mk_params(signer: &str) -> SignParams {
    SignParams {
        signer: mk_name(signer),
        inception: Serial(0),
        expiration: Serial(2000),
    }
}

pub(crate) fn mk_key_info<H>(handle: H, key_tag: u16) -> KeyInfo<H> {
    KeyInfo {
        handle,
        key_tag,
        algorithm: TEST_ALGORITHM,
    }
}

//------------ TestKeyStore --------------------------------------------------

/// A key store that makes fake signatures.
///
/// Key handles are the key tags.
#[derive(Default)]
pub(crate) struct TestKeyStore {
    keys: Mutex<HashMap<String, u16>>,
    fail_on: Option<Rtype>,
    max_delay: Option<Duration>,
    signed: Mutex<Vec<(Name, Rtype, u16)>>,
}

impl TestKeyStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Makes signing RRsets of type `rtype` fail.
    pub(crate) fn fail_on(mut self, rtype: Rtype) -> Self {
        self.fail_on = Some(rtype);
        self
    }

    /// Makes signing take a random time of up to `max_delay`.
    pub(crate) fn with_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay);
        self
    }

    pub(crate) fn add_key(&self, id: &str, key_tag: u16) {
        self.keys.lock().insert(id.into(), key_tag);
    }

    pub(crate) fn info(&self, id: &str) -> KeyInfo<u16> {
        self.find_key(id).unwrap()
    }

    /// Returns owner, type, and key tag of everything signed so far.
    pub(crate) fn signed(&self) -> Vec<(Name, Rtype, u16)> {
        self.signed.lock().clone()
    }
}

impl KeyStore for TestKeyStore {
    type Handle = u16;

    fn find_key(&self, key_id: &str) -> Result<KeyInfo<u16>, KeyStoreError> {
        match self.keys.lock().get(key_id) {
            Some(tag) => Ok(mk_key_info(*tag, *tag)),
            None => Err(KeyStoreError::NotFound(key_id.into())),
        }
    }

    fn sign(
        &self,
        rrset: &Rrset,
        key: &u16,
        params: &SignParams,
    ) -> Result<Record, SignError> {
        if let Some(max_delay) = self.max_delay {
            let delay = rand::thread_rng().gen_range(Duration::ZERO..=max_delay);
            std::thread::sleep(delay);
        }
        if self.fail_on == Some(rrset.rtype()) {
            return Err(SignError::new("refusing to sign"));
        }
        self.signed
            .lock()
            .push((rrset.owner().clone(), rrset.rtype(), *key));
        let rrsig = Rrsig::new(
            rrset.rtype(),
            TEST_ALGORITHM,
            rrset.owner().rrsig_label_count(),
            rrset.ttl(),
            params.expiration,
            params.inception,
            *key,
            params.signer.clone(),
            Bytes::from(format!("{}/{}/{}", rrset.owner(), rrset.rtype(), key)),
        );
        Ok(Record::new(
            rrset.owner().clone(),
            rrset.class(),
            rrset.ttl(),
            rrsig,
        ))
    }
}
