//! Putting output back into input order.
//!
//! Every piece of output gets a position when the pipeline decides to
//! produce it. Signatures are created by several workers in parallel and
//! arrive in whatever order the workers finish. The [`ReorderBuffer`] keeps
//! entries arriving early until all entries before them have been written,
//! so the output sink sees positions `0, 1, 2, …` without gaps or
//! repetition.

use std::collections::BTreeMap;
use std::io;
use std::string::String;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::vec::Vec;

use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::{debug, error, trace};

use crate::base::record::Record;

use super::error::ErrorKind;
use super::records::Rrset;

//------------ OutputEntry ---------------------------------------------------

/// A piece of output and its position.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OutputEntry {
    pub position: u64,
    pub payload: Payload,
}

impl OutputEntry {
    pub fn new(position: u64, payload: impl Into<Payload>) -> Self {
        OutputEntry {
            position,
            payload: payload.into(),
        }
    }
}

//------------ Payload -------------------------------------------------------

/// The content of an output entry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Payload {
    /// An RRset.
    Rrset(Rrset),

    /// A single record, usually a signature.
    Record(Record),

    /// A comment line.
    Text(String),
}

impl From<Rrset> for Payload {
    fn from(rrset: Rrset) -> Self {
        Payload::Rrset(rrset)
    }
}

impl From<Record> for Payload {
    fn from(record: Record) -> Self {
        Payload::Record(record)
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

//------------ PositionCounter -----------------------------------------------

/// Hands out output positions.
#[derive(Clone, Debug, Default)]
pub struct PositionCounter {
    next: u64,
}

impl PositionCounter {
    /// Returns the next position.
    pub fn next_position(&mut self) -> u64 {
        let res = self.next;
        self.next += 1;
        res
    }

    /// Returns the number of positions handed out so far.
    pub fn count(&self) -> u64 {
        self.next
    }
}

//------------ OutputSink ----------------------------------------------------

/// Where the re-signed zone goes.
///
/// The sink receives entries in position order. It runs on its own thread.
pub trait OutputSink: Send + 'static {
    /// Writes an entry.
    fn emit(&mut self, entry: OutputEntry) -> Result<(), io::Error>;

    /// Writes out anything buffered.
    fn flush(&mut self) -> Result<(), io::Error> {
        Ok(())
    }
}

impl OutputSink for Vec<OutputEntry> {
    fn emit(&mut self, entry: OutputEntry) -> Result<(), io::Error> {
        self.push(entry);
        Ok(())
    }
}

//------------ PresentationSink ----------------------------------------------

/// Writes entries in presentation format, one record or comment per line.
pub struct PresentationSink<W> {
    writer: W,
}

impl<W: io::Write> PresentationSink<W> {
    pub fn new(writer: W) -> Self {
        PresentationSink { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: io::Write + Send + 'static> OutputSink for PresentationSink<W> {
    fn emit(&mut self, entry: OutputEntry) -> Result<(), io::Error> {
        match entry.payload {
            Payload::Rrset(rrset) => {
                for record in &rrset {
                    writeln!(self.writer, "{record}")?;
                }
                Ok(())
            }
            Payload::Record(record) => writeln!(self.writer, "{record}"),
            Payload::Text(text) => writeln!(self.writer, "{text}"),
        }
    }

    fn flush(&mut self) -> Result<(), io::Error> {
        self.writer.flush()
    }
}

//------------ ReorderBuffer -------------------------------------------------

/// Emits entries to a sink strictly in position order.
///
/// A drain thread owns the sink. It waits until the entry at the next
/// position has arrived, writes it, and moves on to the next position.
pub struct ReorderBuffer<K> {
    shared: Arc<Shared>,
    drain: JoinHandle<Result<K, io::Error>>,
}

impl<K: OutputSink> ReorderBuffer<K> {
    /// Starts the drain thread writing to `sink`.
    pub fn start(sink: K) -> Result<Self, io::Error> {
        let shared = Arc::new(Shared::default());
        let drain = thread::Builder::new().name("output".into()).spawn({
            let shared = shared.clone();
            move || shared.drain(sink)
        })?;
        Ok(ReorderBuffer { shared, drain })
    }

    /// Returns a handle for inserting entries from other threads.
    pub fn handle(&self) -> ReorderHandle {
        ReorderHandle {
            shared: self.shared.clone(),
        }
    }

    /// Adds an entry.
    pub fn insert(&self, entry: OutputEntry) {
        self.shared.insert(entry)
    }

    /// Returns whether the drain thread has stopped early.
    ///
    /// This happens if writing to the sink failed or the buffer was
    /// aborted.
    pub fn is_closed(&self) -> bool {
        self.shared.state.lock().closed
    }

    /// Writes out all remaining entries and returns the sink.
    ///
    /// There must be no more inserts after this is called.
    pub fn finish(self) -> Result<K, ErrorKind> {
        {
            let mut state = self.shared.state.lock();
            state.finished = true;
        }
        self.shared.cond.notify_all();
        self.join()
    }

    /// Stops the drain thread without writing the remaining entries.
    pub fn abort(self) -> Result<K, ErrorKind> {
        self.shared.abort();
        self.join()
    }

    fn join(self) -> Result<K, ErrorKind> {
        match self.drain.join() {
            Ok(Ok(sink)) => Ok(sink),
            Ok(Err(err)) => Err(ErrorKind::Output(err)),
            Err(_) => Err(ErrorKind::WorkerPanicked),
        }
    }
}

//------------ ReorderHandle -------------------------------------------------

/// A handle for adding entries to a [`ReorderBuffer`] from another thread.
#[derive(Clone)]
pub struct ReorderHandle {
    shared: Arc<Shared>,
}

impl ReorderHandle {
    /// Adds an entry.
    pub fn insert(&self, entry: OutputEntry) {
        self.shared.insert(entry)
    }

    /// Stops the drain thread without writing the remaining entries.
    pub fn abort(&self) {
        self.shared.abort()
    }
}

//------------ Shared --------------------------------------------------------

/// The state shared between the drain thread and the producers.
#[derive(Default)]
struct Shared {
    state: Mutex<State>,
    cond: Condvar,
}

#[derive(Default)]
struct State {
    /// Entries waiting for the entries before them.
    backlog: BTreeMap<u64, OutputEntry>,

    /// The position to be written next.
    next: u64,

    /// No more entries will be inserted.
    finished: bool,

    /// The remaining entries are not to be written.
    aborted: bool,

    /// The drain thread has stopped.
    closed: bool,
}

impl Shared {
    fn insert(&self, entry: OutputEntry) {
        let mut state = self.state.lock();
        if state.closed {
            trace!("Output closed, discarding entry {}", entry.position);
            return;
        }
        let wake = entry.position == state.next;
        if state.backlog.insert(entry.position, entry).is_some() {
            error!("Duplicate output position, keeping the latest entry");
        }
        drop(state);
        if wake {
            self.cond.notify_one();
        }
    }

    fn abort(&self) {
        self.state.lock().aborted = true;
        self.cond.notify_all();
    }

    fn drain<K: OutputSink>(&self, mut sink: K) -> Result<K, io::Error> {
        let res = self.drain_into(&mut sink);
        let mut state = self.state.lock();
        state.closed = true;
        state.backlog.clear();
        drop(state);
        res?;
        sink.flush()?;
        Ok(sink)
    }

    fn drain_into<K: OutputSink>(&self, sink: &mut K) -> Result<(), io::Error> {
        let mut state = self.state.lock();
        loop {
            if state.aborted {
                debug!("Output aborted at position {}", state.next);
                return Ok(());
            }
            let ready = take_ready(&mut state);
            if !ready.is_empty() {
                MutexGuard::unlocked(&mut state, || emit_all(sink, ready))?;
                continue;
            }
            if state.finished {
                // Nothing will fill the gaps anymore.
                let rest = core::mem::take(&mut state.backlog);
                debug!(
                    "Flushing {} entries from position {}",
                    rest.len(),
                    state.next
                );
                return MutexGuard::unlocked(&mut state, || {
                    emit_all(sink, rest.into_values())
                });
            }
            self.cond.wait(&mut state);
        }
    }
}

/// Removes the entries that can be written now from the backlog.
fn take_ready(state: &mut State) -> Vec<OutputEntry> {
    let mut res = Vec::new();
    while let Some(entry) = state.backlog.remove(&state.next) {
        state.next += 1;
        res.push(entry);
    }
    res
}

fn emit_all<K: OutputSink>(
    sink: &mut K,
    entries: impl IntoIterator<Item = OutputEntry>,
) -> Result<(), io::Error> {
    entries.into_iter().try_for_each(|entry| sink.emit(entry))
}

//============ Testing =======================================================
