//! Re-signing a zone.
//!
//! The [`Pipeline`] drives the whole process. It reads the new zone and its
//! previously signed version side by side, decides for every RRset which
//! signatures can be kept and which have to be made, hands the signing work
//! to a pool of workers, and writes the result in input order through a
//! reorder buffer.
//!
//! A run goes through four states exactly once: in `Init`, the output
//! thread and the signing workers are started. In `Running`, the zones are
//! processed and work is handed out. In `Draining`, the workers finish their
//! queues and are joined. In `Done`, the remaining output is written and the
//! output thread is joined.

use core::fmt;

use std::sync::Arc;

use rand::Rng;
use tracing::{debug, error, info, trace, warn};

use crate::base::iana::Rtype;
use crate::base::name::Name;
use crate::rdata::RecordData;

use super::config::PipelineConfig;
use super::diff::{Diff, DiffItem, MergeDiff};
use super::directive::{Directive, KeyDirective};
use super::dispatch::WorkerPool;
use super::error::{ErrorKind, ResignError};
use super::keys::{KeyRole, KeySet, KeyStore, SignParams, SigningKey};
use super::records::{RecordSource, Rrset};
use super::refresh;
use super::reorder::{OutputEntry, OutputSink, PositionCounter, ReorderBuffer};

//------------ RunStats ------------------------------------------------------

/// Signature counts of a run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunStats {
    /// Existing signatures that were kept.
    pub existing: usize,

    /// Existing signatures that were dropped.
    pub removed: usize,

    /// New signatures that were requested.
    pub created: usize,
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "existing signatures: {}, removed: {}, created: {}",
            self.existing, self.removed, self.created
        )
    }
}

//------------ PipelineState -------------------------------------------------

/// The stages of a run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PipelineState {
    Init,
    Running,
    Draining,
    Done,
}

//------------ Pipeline ------------------------------------------------------

/// Re-signs a zone incrementally.
pub struct Pipeline<S: KeyStore> {
    store: Arc<S>,
    config: PipelineConfig,
    keys: KeySet<S::Handle>,
    stats: RunStats,
    positions: PositionCounter,
    cut: DelegationTracker,
    state: PipelineState,
}

impl<S: KeyStore + 'static> Pipeline<S> {
    /// Creates a new pipeline signing with the keys in `store`.
    pub fn new(store: Arc<S>, config: PipelineConfig) -> Self {
        Pipeline {
            store,
            config,
            keys: KeySet::new(),
            stats: RunStats::default(),
            positions: PositionCounter::default(),
            cut: DelegationTracker::default(),
            state: PipelineState::Init,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn keys(&self) -> &KeySet<S::Handle> {
        &self.keys
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Adds the key described by a key directive.
    ///
    /// The key is looked up in the key store. If that fails or the key has
    /// a different algorithm than the directive says, the key is skipped.
    /// Returns whether the key was added.
    pub fn add_key(&mut self, role: KeyRole, directive: &KeyDirective) -> bool {
        let id = &directive.id;
        let info = match self.store.find_key(id) {
            Ok(info) => info,
            Err(err) => {
                warn!("Cannot use {role} '{id}': {err}");
                return false;
            }
        };
        if info.algorithm != directive.algorithm {
            warn!(
                "Cannot use {role} '{id}': algorithm is {}, expected {}",
                info.algorithm, directive.algorithm
            );
            return false;
        }
        let key = SigningKey::new(id.clone(), info, directive.flags);
        if !key.is_zone_key() {
            warn!("{role} {key} does not have the zone key flag set");
        }
        if role == KeyRole::Ksk && !key.is_secure_entry_point() {
            warn!("{role} {key} does not have the SEP flag set");
        }
        debug!("Adding {role} {key}");
        if !self.keys.list_mut(role).add(key) {
            debug!("Ignoring duplicate {role} '{id}'");
            return false;
        }
        true
    }

    /// Re-signs a zone.
    ///
    /// Reads the new zone from `new` and the previously signed zone from
    /// `signed` and writes the signed zone to `sink`. Returns the sink and
    /// the signature counts.
    pub fn run<N, O, K>(
        mut self,
        new: N,
        signed: O,
        sink: K,
    ) -> Result<(K, RunStats), ResignError>
    where
        N: RecordSource,
        O: RecordSource,
        K: OutputSink,
    {
        let buffer = match ReorderBuffer::start(sink) {
            Ok(buffer) => buffer,
            Err(err) => return Err(self.fail(ErrorKind::Spawn(err))),
        };
        let mut pool = match WorkerPool::start(
            self.config.workers,
            self.store.clone(),
            buffer.handle(),
        ) {
            Ok(pool) => pool,
            Err(err) => {
                let _ = buffer.abort();
                return Err(self.fail(ErrorKind::Spawn(err)));
            }
        };

        self.transition(PipelineState::Running);
        let mut diff = MergeDiff::new(new, signed);
        let mut res = self.drive(&mut diff, &buffer, &mut pool);
        if res.is_ok() {
            if let Some(err) = diff.take_failure() {
                res = Err(ErrorKind::Input(err));
            }
        }

        self.transition(PipelineState::Draining);
        let res = res.and(pool.join());

        self.transition(PipelineState::Done);
        let res = match res {
            Ok(()) => buffer.finish(),
            Err(err) => {
                let _ = buffer.abort();
                Err(err)
            }
        };
        match res {
            Ok(sink) => {
                info!("Zone signed, {}", self.stats);
                Ok((sink, self.stats))
            }
            Err(kind) => Err(self.fail(kind)),
        }
    }

    /// Processes the zones until they end or processing has to stop.
    fn drive<N, O, K>(
        &mut self,
        diff: &mut MergeDiff<N, O>,
        buffer: &ReorderBuffer<K>,
        pool: &mut WorkerPool<S::Handle>,
    ) -> Result<(), ErrorKind>
    where
        N: RecordSource,
        O: RecordSource,
        K: OutputSink,
    {
        let mut rng = rand::thread_rng();
        while let Some(item) = diff.next_item() {
            if diff.has_failed() {
                debug!("Reading input failed, stopping");
                return Ok(());
            }
            if let Some(err) = pool.failure() {
                return Err(ErrorKind::Signing(err));
            }
            if buffer.is_closed() {
                debug!("Output closed, stopping");
                return Ok(());
            }
            match item {
                DiffItem::Text(text) => buffer.insert(OutputEntry::new(
                    self.positions.next_position(),
                    text,
                )),
                DiffItem::Directive(Directive::Stop) => {
                    info!("Stopping at ':stop' directive");
                    return Ok(());
                }
                DiffItem::Directive(directive) => self.apply(directive),
                DiffItem::Rrset(item) => {
                    let delegation = diff.is_delegation(item.rrset().owner());
                    self.process(item, delegation, buffer, pool, &mut rng)?
                }
            }
        }
        Ok(())
    }

    fn apply(&mut self, directive: Directive) {
        match directive {
            Directive::Zsk(key) => {
                self.add_key(KeyRole::Zsk, &key);
            }
            Directive::Ksk(key) => {
                self.add_key(KeyRole::Ksk, &key);
            }
            other => {
                self.config.apply(&other);
            }
        }
    }

    /// Outputs an RRset and arranges for its signatures.
    ///
    /// `delegation` says whether the new zone has an NS RRset at the owner
    /// of the RRset.
    fn process<K: OutputSink>(
        &mut self,
        diff: Diff,
        delegation: bool,
        buffer: &ReorderBuffer<K>,
        pool: &mut WorkerPool<S::Handle>,
        rng: &mut impl Rng,
    ) -> Result<(), ErrorKind> {
        let (mut rrset, existing) = match diff {
            Diff::Removed { signatures, .. } => {
                self.stats.removed += signatures.len();
                return Ok(());
            }
            Diff::New { rrset, signatures } => (rrset, signatures),
            Diff::Unchanged {
                rrset,
                mut signatures,
                signed,
            } => {
                signatures.extend(signed);
                (rrset, signatures)
            }
            Diff::Changed {
                rrset,
                signatures,
                signed,
            } => {
                self.stats.removed += signed.len();
                (rrset, signatures)
            }
        };
        let origin = match self.config.origin.clone() {
            Some(origin) => origin,
            None => {
                error!(
                    "No origin set when processing {} RRset at {}",
                    rrset.rtype(),
                    rrset.owner()
                );
                return Err(ErrorKind::MissingOrigin);
            }
        };
        if rrset.rtype() == Rtype::SOA {
            self.apply_soa_overrides(&mut rrset);
        }
        let rtype = rrset.rtype();
        let position = self.positions.next_position();

        if !self.cut.is_signable(&rrset, &origin, delegation) {
            trace!("Not signing {} RRset at {}", rtype, rrset.owner());
            self.stats.removed += existing.len();
            buffer.insert(OutputEntry::new(position, rrset));
            return Ok(());
        }

        self.keys.enable_all();
        let evaluation =
            refresh::evaluate(existing, &mut self.keys, &self.config);
        self.stats.existing += evaluation.reused.len();
        self.stats.removed += evaluation.dropped;

        let snapshot = rrset.clone();
        buffer.insert(OutputEntry::new(position, rrset));
        for rrsig in evaluation.reused {
            buffer.insert(OutputEntry::new(
                self.positions.next_position(),
                rrsig,
            ));
        }
        let config = &self.config;
        self.stats.created += pool.dispatch(
            snapshot,
            self.keys.for_rtype(rtype),
            &mut self.positions,
            || sign_params(config, &origin, rtype, &mut *rng),
        );
        Ok(())
    }

    fn apply_soa_overrides(&self, rrset: &mut Rrset) {
        if let Some(ttl) = self.config.soa_ttl {
            rrset.set_ttl(ttl);
        }
        for record in rrset.iter_mut() {
            if let RecordData::Soa(soa) = record.data_mut() {
                if let Some(serial) = self.config.soa_serial {
                    soa.set_serial(serial);
                }
                if let Some(minimum) = self.config.soa_minimum {
                    soa.set_minimum(minimum);
                }
            }
        }
    }

    fn transition(&mut self, state: PipelineState) {
        debug!("Pipeline {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    fn fail(&self, kind: ErrorKind) -> ResignError {
        error!("Signing failed: {kind}");
        info!("Zone not signed, {}", self.stats);
        ResignError::new(kind, self.stats)
    }
}

/// Returns the parameters for a new signature over an RRset of `rtype`.
///
/// A random amount of up to `config.jitter` seconds is taken off the
/// expiration time.
fn sign_params(
    config: &PipelineConfig,
    origin: &Name,
    rtype: Rtype,
    rng: &mut impl Rng,
) -> SignParams {
    let mut expiration = config.expiration_for(rtype);
    if config.jitter > 0 {
        expiration =
            expiration.sub(rng.gen_range(0..=config.jitter.min(0x7FFF_FFFF)));
    }
    SignParams {
        signer: origin.clone(),
        inception: config.inception,
        expiration,
    }
}

//------------ DelegationTracker ---------------------------------------------

/// Keeps track of the zone cut the RRsets are currently at or below.
///
/// At a zone cut only the DS and NSEC RRsets belong to the zone and are
/// signed. Everything below it is glue and is never signed, nor is anything
/// outside the zone.
///
/// Whether an owner name is a zone cut has to be known before its first
/// RRset is seen, since types like A sort before NS.
#[derive(Clone, Debug, Default)]
struct DelegationTracker {
    cut: Option<Name>,
}

impl DelegationTracker {
    /// Returns whether `rrset` is to be signed.
    ///
    /// RRsets have to be given in zone order. `delegation` says whether
    /// there is an NS RRset at the owner of `rrset`.
    fn is_signable(
        &mut self,
        rrset: &Rrset,
        origin: &Name,
        delegation: bool,
    ) -> bool {
        let owner = rrset.owner();
        if !owner.ends_with(origin) {
            return false;
        }
        if let Some(cut) = &self.cut {
            if owner.is_below(cut) {
                return false;
            }
            if owner != cut {
                self.cut = None;
            }
        }
        if delegation && owner != origin {
            self.cut = Some(owner.clone());
        }
        match &self.cut {
            Some(cut) if cut == owner => {
                matches!(rrset.rtype(), Rtype::DS | Rtype::NSEC)
            }
            _ => true,
        }
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{Serial, Ttl};
    use crate::sign::test_util::*;

    #[test]
    fn delegations() {
        let origin = mk_name("example.");
        let mut cut = DelegationTracker::default();
        let mut signable = |owner: &str, rtype: &str, delegation: bool| {
            let record = mk_record(owner, rtype, "x");
            cut.is_signable(&Rrset::new(record), &origin, delegation)
        };
        assert!(signable("example.", "NS", true));
        assert!(signable("a.example.", "A", false));
        assert!(!signable("sub.example.", "A", true));
        assert!(!signable("sub.example.", "NS", true));
        assert!(signable("sub.example.", "DS", true));
        assert!(signable("sub.example.", "NSEC", true));
        assert!(!signable("ns.sub.example.", "A", false));
        assert!(!signable("ns.sub.example.", "AAAA", false));
        assert!(signable("z.example.", "A", false));
        assert!(!signable("example.net.", "A", false));
    }

    #[test]
    fn jitter_stays_in_bounds() {
        let mut config = PipelineConfig::at(Serial(1_000_000));
        config.jitter = 100;
        let origin = mk_name("example.");
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let params = sign_params(&config, &origin, Rtype::A, &mut rng);
            let lowest = config.expiration.sub(100);
            assert!(params.expiration <= config.expiration);
            assert!(params.expiration >= lowest);
            assert_eq!(params.inception, config.inception);
            assert_eq!(params.signer, origin);
        }
        config.jitter = 0;
        config.expiration_denial = Some(Serial(5_000_000));
        let params = sign_params(&config, &origin, Rtype::NSEC3, &mut rng);
        assert_eq!(params.expiration, Serial(5_000_000));
    }

    #[test]
    fn soa_overrides() {
        let mut config = PipelineConfig::at(Serial(1_000_000));
        config.soa_ttl = Some(Ttl::from_secs(60));
        config.soa_serial = Some(Serial(42));
        config.soa_minimum = Some(Ttl::from_secs(30));
        let pipeline = Pipeline::new(Arc::new(TestKeyStore::new()), config);
        let mut rrset = Rrset::new(mk_soa("example.", 1));
        pipeline.apply_soa_overrides(&mut rrset);
        assert_eq!(rrset.ttl(), Ttl::from_secs(60));
        let soa = rrset.first().data().as_soa().unwrap();
        assert_eq!(soa.serial(), Serial(42));
        assert_eq!(soa.minimum(), Ttl::from_secs(30));
    }

    #[test]
    fn key_directives() {
        let store = TestKeyStore::new();
        store.add_key("zsk", 1);
        let mut pipeline = Pipeline::new(
            Arc::new(store),
            PipelineConfig::at(Serial(1_000_000)),
        );
        let mut directive = KeyDirective {
            id: "zsk".into(),
            algorithm: TEST_ALGORITHM,
            flags: 256,
        };
        assert!(pipeline.add_key(KeyRole::Zsk, &directive));
        assert!(!pipeline.add_key(KeyRole::Zsk, &directive));
        // A KSK without the SEP flag is used anyway.
        assert!(pipeline.add_key(KeyRole::Ksk, &directive));
        assert!(!pipeline.keys().list(KeyRole::Ksk).iter().any(|key| {
            key.is_secure_entry_point()
        }));
        directive.id = "missing".into();
        assert!(!pipeline.add_key(KeyRole::Zsk, &directive));
        directive.id = "zsk".into();
        directive.algorithm = crate::base::iana::SecAlg::RSASHA256;
        assert!(!pipeline.add_key(KeyRole::Ksk, &directive));
        assert_eq!(pipeline.keys().list(KeyRole::Zsk).len(), 1);
        assert_eq!(pipeline.keys().list(KeyRole::Ksk).len(), 1);
    }
}
