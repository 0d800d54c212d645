//! Helpers shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{self, Read};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use parking_lot::Mutex;
use rand::Rng;

use domain_resign::base::iana::SecAlg;
use domain_resign::base::{Record, Rtype, Serial};
use domain_resign::rdata::Rrsig;
use domain_resign::sign::reorder::PresentationSink;
use domain_resign::sign::{
    KeyInfo, KeyStore, KeyStoreError, OutputEntry, Payload, Pipeline,
    PipelineConfig, ResignError, RunStats, Rrset, SignError, SignParams,
};
use domain_resign::zonefile::Zonefile;

/// The time all test runs happen at.
pub const NOW: Serial = Serial(1_700_000_000);

pub const ALGORITHM: SecAlg = SecAlg::ECDSAP256SHA256;

//------------ FakeStore -----------------------------------------------------

/// A key store that produces recognizable but fake signatures.
///
/// Key handles are the key tags.
#[derive(Default)]
pub struct FakeStore {
    keys: HashMap<String, u16>,
    fail_on: Option<Rtype>,
    max_delay: Option<Duration>,
    signed: Mutex<Vec<(String, Rtype, u16)>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, id: &str, key_tag: u16) -> Self {
        self.keys.insert(id.into(), key_tag);
        self
    }

    pub fn fail_on(mut self, rtype: Rtype) -> Self {
        self.fail_on = Some(rtype);
        self
    }

    pub fn with_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay);
        self
    }

    /// Returns owner, type, and key tag of every signature made so far.
    pub fn signed(&self) -> Vec<(String, Rtype, u16)> {
        let mut res = self.signed.lock().clone();
        res.sort();
        res
    }
}

impl KeyStore for FakeStore {
    type Handle = u16;

    fn find_key(&self, key_id: &str) -> Result<KeyInfo<u16>, KeyStoreError> {
        match self.keys.get(key_id) {
            Some(tag) => Ok(KeyInfo {
                handle: *tag,
                key_tag: *tag,
                algorithm: ALGORITHM,
            }),
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
            return Err(SignError::new("key store refused to sign"));
        }
        self.signed.lock().push((
            rrset.owner().to_string(),
            rrset.rtype(),
            *key,
        ));
        let rrsig = Rrsig::new(
            rrset.rtype(),
            ALGORITHM,
            rrset.owner().rrsig_label_count(),
            rrset.ttl(),
            params.expiration,
            params.inception,
            *key,
            params.signer.clone(),
            Bytes::from(format!("{} {} {}", rrset.owner(), rrset.rtype(), key)),
        );
        Ok(Record::new(
            rrset.owner().clone(),
            rrset.class(),
            rrset.ttl(),
            rrsig,
        ))
    }
}

//------------ Running -------------------------------------------------------

pub fn config(workers: usize) -> PipelineConfig {
    PipelineConfig::at(NOW)
        .with_workers(NonZeroUsize::new(workers).unwrap_or(NonZeroUsize::MIN))
}

pub fn zone(text: &str) -> Zonefile<io::Cursor<String>> {
    Zonefile::new(io::Cursor::new(text.to_string()))
}

/// A reader that fails once its data has been read.
pub struct FailingReader(io::Cursor<String>);

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.0.read(buf)? {
            0 => Err(io::Error::new(io::ErrorKind::Other, "disk gone")),
            n => Ok(n),
        }
    }
}

/// Returns a zone that fails to read after `text`.
pub fn failing_zone(text: &str) -> Zonefile<io::BufReader<FailingReader>> {
    Zonefile::new(io::BufReader::new(FailingReader(io::Cursor::new(
        text.to_string(),
    ))))
}

/// Re-signs `new` against `signed` and collects the output entries.
pub fn run(
    store: Arc<FakeStore>,
    config: PipelineConfig,
    new: &str,
    signed: &str,
) -> Result<(Vec<OutputEntry>, RunStats), ResignError> {
    Pipeline::new(store, config).run(zone(new), zone(signed), Vec::new())
}

/// Re-signs `new` against `signed` and returns the zone text.
pub fn run_text(
    store: Arc<FakeStore>,
    config: PipelineConfig,
    new: &str,
    signed: &str,
) -> Result<(String, RunStats), ResignError> {
    let sink = PresentationSink::new(Vec::new());
    let (sink, stats) =
        Pipeline::new(store, config).run(zone(new), zone(signed), sink)?;
    let text = String::from_utf8(sink.into_inner()).unwrap();
    Ok((text, stats))
}

/// Returns the output as one string per line.
pub fn lines(output: &[OutputEntry]) -> Vec<String> {
    let mut res = Vec::new();
    for entry in output {
        match &entry.payload {
            Payload::Rrset(rrset) => {
                res.extend(rrset.iter().map(ToString::to_string))
            }
            Payload::Record(record) => res.push(record.to_string()),
            Payload::Text(text) => res.push(text.clone()),
        }
    }
    res
}

/// Returns owner and covered type of every signature in the output.
pub fn signatures(output: &[OutputEntry]) -> Vec<(String, Rtype, u16)> {
    output
        .iter()
        .filter_map(|entry| match &entry.payload {
            Payload::Record(record) => record.data().as_rrsig().map(|sig| {
                (record.owner().to_string(), sig.type_covered(), sig.key_tag())
            }),
            _ => None,
        })
        .collect()
}
