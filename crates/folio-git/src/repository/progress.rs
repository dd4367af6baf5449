//! Clone and fetch progress reporting.
//!
//! gix reports progress as a tree of named tasks. [`GixProgress`] maps those
//! tasks onto the four [`FetchPhase`]s and forwards their counts to a
//! [`ProgressObserver`] through a [`PhaseReporter`], which keeps the reported
//! sequence monotonic: phases only move forward and counts never decrease
//! within a phase.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use gix::progress::{
    Count, Id, MessageLevel, NestedProgress, Progress, Step, StepShared, UNKNOWN, Unit,
};
use parking_lot::Mutex;
use tracing::trace;

/// A network operation against a remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GitOperation {
    Clone,
    Fetch,
}

impl GitOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clone => "clone",
            Self::Fetch => "fetch",
        }
    }
}

impl fmt::Display for GitOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phases of a clone or fetch, reported in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FetchPhase {
    /// Negotiating refs with the remote.
    Enumerate,
    /// The remote is packing objects.
    Compress,
    /// Receiving the pack.
    Transfer,
    /// Indexing the received objects.
    Resolve,
}

impl FetchPhase {
    pub const ALL: [FetchPhase; 4] = [
        FetchPhase::Enumerate,
        FetchPhase::Compress,
        FetchPhase::Transfer,
        FetchPhase::Resolve,
    ];

    /// Label as git prints it.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Enumerate => "Counting objects",
            Self::Compress => "Compressing objects",
            Self::Transfer => "Receiving objects",
            Self::Resolve => "Resolving deltas",
        }
    }

    /// The phase a gix progress task belongs to, judged by its name.
    ///
    /// Covers both the remote's sideband messages ("Counting objects",
    /// "Compressing objects") and gix's local pack tasks ("read pack",
    /// "indexing", "Resolving").
    pub fn from_task_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        if name.contains("resolv") {
            Some(Self::Resolve)
        } else if ["receiv", "read pack", "decompress", "index"]
            .iter()
            .any(|marker| name.contains(marker))
        {
            Some(Self::Transfer)
        } else if name.contains("compress") {
            Some(Self::Compress)
        } else if name.contains("count") || name.contains("enumerat") {
            Some(Self::Enumerate)
        } else {
            None
        }
    }
}

/// Receives progress for clone and fetch operations.
///
/// Called from blocking threads; implementations must be cheap and must not block.
pub trait ProgressObserver: Send + Sync {
    /// A phase started. Phases arrive in [`FetchPhase`] order, each at most once.
    fn on_phase(&self, url: &str, operation: GitOperation, phase: FetchPhase);

    /// Work done so far in `phase`. `step` only grows within one phase.
    fn on_progress(
        &self,
        _url: &str,
        _operation: GitOperation,
        _phase: FetchPhase,
        _step: u64,
        _max: Option<u64>,
    ) {
    }

    /// The operation finished, successfully or not.
    fn on_finish(&self, _url: &str, _operation: GitOperation, _success: bool) {}
}

#[derive(Debug, Default)]
struct Cursor {
    phase: Option<FetchPhase>,
    step: u64,
}

/// Forwards phases and counts of one operation to an optional observer.
pub(crate) struct PhaseReporter {
    observer: Option<Arc<dyn ProgressObserver>>,
    url: String,
    operation: GitOperation,
    cursor: Mutex<Cursor>,
}

impl PhaseReporter {
    pub(crate) fn new(
        observer: Option<Arc<dyn ProgressObserver>>,
        url: impl Into<String>,
        operation: GitOperation,
    ) -> Arc<Self> {
        Arc::new(Self {
            observer,
            url: url.into(),
            operation,
            cursor: Mutex::new(Cursor::default()),
        })
    }

    /// Enters `phase`, announcing any phase skipped on the way.
    pub(crate) fn phase(&self, phase: FetchPhase) {
        self.advance(phase, None);
    }

    /// Reports `step` units of work in `phase`.
    pub(crate) fn progress(&self, phase: FetchPhase, step: u64, max: Option<u64>) {
        self.advance(phase, Some((step, max)));
    }

    pub(crate) fn finish(&self, success: bool) {
        if let Some(observer) = self.observer.as_deref() {
            observer.on_finish(&self.url, self.operation, success);
        }
    }

    /// A gix progress root feeding this reporter.
    pub(crate) fn gix_progress(self: &Arc<Self>) -> GixProgress {
        GixProgress::new(Arc::clone(self), None, None, UNKNOWN)
    }

    fn advance(&self, phase: FetchPhase, progress: Option<(u64, Option<u64>)>) {
        let Some(observer) = self.observer.as_deref() else {
            return;
        };
        // Held while calling out so concurrent gix tasks cannot interleave out of order.
        let mut cursor = self.cursor.lock();
        if cursor.phase.is_some_and(|current| phase < current) {
            return;
        }
        if cursor.phase != Some(phase) {
            for entered in FetchPhase::ALL {
                let passed = cursor.phase.is_some_and(|current| entered <= current);
                if !passed && entered <= phase {
                    observer.on_phase(&self.url, self.operation, entered);
                }
            }
            cursor.phase = Some(phase);
            cursor.step = 0;
        }
        if let Some((step, max)) = progress {
            if step > cursor.step {
                cursor.step = step;
                observer.on_progress(&self.url, self.operation, phase, step, max);
            }
        }
    }
}

/// A gix progress task mapped onto a [`FetchPhase`].
///
/// Tasks whose name does not identify a phase inherit their parent's; tasks
/// with no phase at all are counted but not reported.
pub(crate) struct GixProgress {
    reporter: Arc<PhaseReporter>,
    name: Option<String>,
    phase: Option<FetchPhase>,
    max: Option<Step>,
    step: StepShared,
    id: Id,
}

impl GixProgress {
    fn new(
        reporter: Arc<PhaseReporter>,
        name: Option<String>,
        phase: Option<FetchPhase>,
        id: Id,
    ) -> Self {
        Self {
            reporter,
            name,
            phase,
            max: None,
            step: Arc::new(AtomicUsize::new(0)),
            id,
        }
    }

    fn child(&self, name: String, id: Id) -> Self {
        let phase = FetchPhase::from_task_name(&name).or(self.phase);
        Self::new(Arc::clone(&self.reporter), Some(name), phase, id)
    }

    fn report(&self, step: Step) {
        if let Some(phase) = self.phase {
            self.reporter
                .progress(phase, step as u64, self.max.map(|max| max as u64));
        }
    }
}

impl Count for GixProgress {
    fn set(&self, step: Step) {
        self.step.store(step, Ordering::Relaxed);
        self.report(step);
    }

    fn step(&self) -> Step {
        self.step.load(Ordering::Relaxed)
    }

    fn inc_by(&self, step: Step) {
        let now = self.step.fetch_add(step, Ordering::Relaxed) + step;
        self.report(now);
    }

    fn counter(&self) -> StepShared {
        Arc::clone(&self.step)
    }
}

impl Progress for GixProgress {
    fn init(&mut self, max: Option<Step>, _unit: Option<Unit>) {
        self.max = max;
        self.step.store(0, Ordering::Relaxed);
        if let Some(phase) = self.phase {
            self.reporter.phase(phase);
        }
    }

    fn max(&self) -> Option<Step> {
        self.max
    }

    fn set_name(&mut self, name: String) {
        if let Some(phase) = FetchPhase::from_task_name(&name) {
            self.phase = Some(phase);
        }
        self.name = Some(name);
    }

    fn name(&self) -> Option<String> {
        self.name.clone()
    }

    fn id(&self) -> Id {
        self.id
    }

    fn message(&self, level: MessageLevel, message: String) {
        trace!(url = %self.reporter.url, ?level, %message, "git progress");
    }
}

impl NestedProgress for GixProgress {
    type SubProgress = GixProgress;

    fn add_child(&mut self, name: impl Into<String>) -> Self::SubProgress {
        self.child(name.into(), UNKNOWN)
    }

    fn add_child_with_id(&mut self, name: impl Into<String>, id: Id) -> Self::SubProgress {
        self.child(name.into(), id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Phase(FetchPhase),
        Step(FetchPhase, u64),
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Event>>);

    impl ProgressObserver for Recorder {
        fn on_phase(&self, _url: &str, _operation: GitOperation, phase: FetchPhase) {
            self.0.lock().push(Event::Phase(phase));
        }

        fn on_progress(
            &self,
            _url: &str,
            _op: GitOperation,
            phase: FetchPhase,
            step: u64,
            _max: Option<u64>,
        ) {
            self.0.lock().push(Event::Step(phase, step));
        }
    }

    fn reporter(recorder: &Arc<Recorder>) -> Arc<PhaseReporter> {
        let observer: Arc<dyn ProgressObserver> = recorder.clone();
        PhaseReporter::new(Some(observer), "https://example.com/docs.git", GitOperation::Fetch)
    }

    #[test]
    fn test_phases_are_ordered() {
        let mut sorted = FetchPhase::ALL;
        sorted.sort();
        assert_eq!(sorted, FetchPhase::ALL);
        assert_eq!(FetchPhase::Transfer.label(), "Receiving objects");
    }

    #[test]
    fn test_task_names_map_to_phases() {
        assert_eq!(FetchPhase::from_task_name("Enumerating objects"), Some(FetchPhase::Enumerate));
        assert_eq!(FetchPhase::from_task_name("Counting objects"), Some(FetchPhase::Enumerate));
        assert_eq!(FetchPhase::from_task_name("Compressing objects"), Some(FetchPhase::Compress));
        assert_eq!(FetchPhase::from_task_name("decompressing"), Some(FetchPhase::Transfer));
        assert_eq!(FetchPhase::from_task_name("read pack"), Some(FetchPhase::Transfer));
        assert_eq!(FetchPhase::from_task_name("Resolving"), Some(FetchPhase::Resolve));
        assert_eq!(FetchPhase::from_task_name("remote"), None);
    }

    #[test]
    fn test_skipped_phases_are_announced_in_order() {
        let recorder = Arc::new(Recorder::default());
        let reporter = reporter(&recorder);
        reporter.phase(FetchPhase::Enumerate);
        reporter.phase(FetchPhase::Resolve);
        reporter.phase(FetchPhase::Transfer);

        let phases: Vec<Event> = FetchPhase::ALL.into_iter().map(Event::Phase).collect();
        assert_eq!(*recorder.0.lock(), phases);

        // No observer is fine.
        PhaseReporter::new(None, "u", GitOperation::Clone).phase(FetchPhase::Compress);
    }

    #[test]
    fn test_gix_tasks_report_monotonic_counts() {
        let recorder = Arc::new(Recorder::default());
        let reporter = reporter(&recorder);
        let mut root = reporter.gix_progress();

        let mut remote = root.add_child("remote");
        remote.set_name("Counting objects".into());
        remote.init(Some(10), None);
        remote.set(4);
        remote.set(2);
        remote.set(10);

        let mut pack = root.add_child("read pack");
        pack.init(None, None);
        pack.inc_by(100);
        let nested = pack.add_child("chunk");
        nested.set(50);
        pack.inc_by(100);

        // Late counting updates are dropped once the transfer started.
        remote.set(12);

        let events = recorder.0.lock().clone();
        assert_eq!(
            events,
            vec![
                Event::Phase(FetchPhase::Enumerate),
                Event::Step(FetchPhase::Enumerate, 4),
                Event::Step(FetchPhase::Enumerate, 10),
                Event::Phase(FetchPhase::Compress),
                Event::Phase(FetchPhase::Transfer),
                Event::Step(FetchPhase::Transfer, 100),
                Event::Step(FetchPhase::Transfer, 200),
            ]
        );
    }
}
