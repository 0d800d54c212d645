//! Handing signing work to a pool of workers.
//!
//! Each worker runs on its own thread with its own job queue. Jobs are
//! assigned round-robin: all jobs for one RRset go to the same worker and
//! the next RRset goes to the next worker. A worker signs its jobs in order
//! and inserts the signatures into the reorder buffer at the position the
//! pipeline assigned to the job.

use core::num::NonZeroUsize;

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::vec::Vec;

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use tracing::{debug, error, trace};

use super::error::{ErrorKind, SignError};
use super::keys::{KeyList, KeyStore, SignParams};
use super::records::Rrset;
use super::reorder::{OutputEntry, PositionCounter, ReorderHandle};

//------------ SigningJob ----------------------------------------------------

/// A request to sign an RRset with a key.
pub struct SigningJob<H> {
    /// The RRset to sign.
    ///
    /// All jobs for an RRset share the same copy.
    pub rrset: Arc<Rrset>,

    /// The key to sign with.
    pub key: H,

    /// The signer name and validity period.
    pub params: SignParams,

    /// The output position of the signature.
    pub position: u64,
}

//------------ WorkerPool ----------------------------------------------------

/// A fixed number of signing workers.
pub struct WorkerPool<H> {
    /// The job queues of the workers.
    queues: Vec<Sender<SigningJob<H>>>,

    /// The worker threads.
    workers: Vec<JoinHandle<()>>,

    /// The worker to receive the next batch of jobs.
    next: usize,

    /// The first signing failure of any worker.
    failure: Arc<Failure>,
}

impl<H: Clone + Send + Sync + 'static> WorkerPool<H> {
    /// Starts `count` workers signing with `store`.
    pub fn start<S>(
        count: NonZeroUsize,
        store: Arc<S>,
        output: ReorderHandle,
    ) -> Result<Self, io::Error>
    where
        S: KeyStore<Handle = H> + 'static,
    {
        let failure = Arc::new(Failure::default());
        let mut res = WorkerPool {
            queues: Vec::with_capacity(count.get()),
            workers: Vec::with_capacity(count.get()),
            next: 0,
            failure: failure.clone(),
        };
        for index in 0..count.get() {
            let (tx, rx) = crossbeam_channel::unbounded();
            let worker = Worker {
                index,
                jobs: rx,
                store: store.clone(),
                output: output.clone(),
                failure: failure.clone(),
            };
            let handle = thread::Builder::new()
                .name(format!("signer-{index}"))
                .spawn(move || worker.run());
            match handle {
                Ok(handle) => {
                    res.queues.push(tx);
                    res.workers.push(handle);
                }
                Err(err) => {
                    // The workers already started end once their queues
                    // are dropped.
                    drop(res);
                    return Err(err);
                }
            }
        }
        debug!("Started {} signing workers", count);
        Ok(res)
    }

    /// Queues a signing job for every enabled key in `keys`.
    ///
    /// Positions are taken from `positions` in key order. The parameters
    /// for each job are produced by `params`. All jobs go to the same
    /// worker. Every call moves on to the next worker, even if there is
    /// nothing to queue. Returns the number of jobs queued.
    pub fn dispatch(
        &mut self,
        rrset: Rrset,
        keys: &KeyList<H>,
        positions: &mut PositionCounter,
        mut params: impl FnMut() -> SignParams,
    ) -> usize {
        let index = self.next;
        self.next = (self.next + 1) % self.queues.len();
        let mut enabled = keys.enabled().peekable();
        if enabled.peek().is_none() {
            return 0;
        }
        let rrset = Arc::new(rrset);
        let mut count = 0;
        for key in enabled {
            let job = SigningJob {
                rrset: rrset.clone(),
                key: key.handle().clone(),
                params: params(),
                position: positions.next_position(),
            };
            trace!(
                "Queueing {} RRset at {} for key {} on worker {}",
                rrset.rtype(),
                rrset.owner(),
                key,
                index
            );
            if self.queues[index].send(job).is_err() {
                // The worker is gone. It has panicked which `join` reports.
                error!("Signing worker {index} is not running");
            }
            count += 1;
        }
        count
    }

    /// Returns the first signing failure if there was one.
    pub fn failure(&self) -> Option<SignError> {
        self.failure.get()
    }

    /// Lets the workers finish their queues and waits for them.
    pub fn join(self) -> Result<(), ErrorKind> {
        let WorkerPool {
            queues,
            workers,
            failure,
            ..
        } = self;
        drop(queues);
        let mut panicked = false;
        for worker in workers {
            panicked |= worker.join().is_err();
        }
        if let Some(err) = failure.get() {
            return Err(ErrorKind::Signing(err));
        }
        if panicked {
            return Err(ErrorKind::WorkerPanicked);
        }
        Ok(())
    }
}

//------------ Worker --------------------------------------------------------

/// A single signing worker.
struct Worker<S: KeyStore> {
    index: usize,
    jobs: Receiver<SigningJob<S::Handle>>,
    store: Arc<S>,
    output: ReorderHandle,
    failure: Arc<Failure>,
}

impl<S: KeyStore> Worker<S> {
    /// Processes jobs until the queue is closed and empty.
    fn run(self) {
        let mut signed = 0usize;
        for job in self.jobs.iter() {
            if self.failure.is_set() {
                continue;
            }
            match self.store.sign(&job.rrset, &job.key, &job.params) {
                Ok(rrsig) => {
                    self.output.insert(OutputEntry::new(job.position, rrsig));
                    signed += 1;
                }
                Err(err) => {
                    error!(
                        "Signing {} RRset at {} failed: {err}",
                        job.rrset.rtype(),
                        job.rrset.owner()
                    );
                    self.failure.set(err);
                    self.output.abort();
                }
            }
        }
        debug!("Signing worker {} done after {signed} signatures", self.index);
    }
}

//------------ Failure -------------------------------------------------------

/// The first signing failure of any worker.
#[derive(Default)]
struct Failure {
    set: AtomicBool,
    err: Mutex<Option<SignError>>,
}

impl Failure {
    fn is_set(&self) -> bool {
        self.set.load(Ordering::Acquire)
    }

    fn set(&self, err: SignError) {
        let mut slot = self.err.lock();
        if slot.is_none() {
            *slot = Some(err);
        }
        self.set.store(true, Ordering::Release);
    }

    fn get(&self) -> Option<SignError> {
        if !self.is_set() {
            return None;
        }
        self.err.lock().clone()
    }
}

//============ Testing =======================================================
