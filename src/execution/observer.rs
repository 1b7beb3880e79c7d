use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use tracing::{debug, info, trace};

/// Execution events emitted by the engine.
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    RunStarted { input_rows: usize },
    /// The filter had no criteria; the input is returned as is.
    FilterSkipped,
    PredicateCompiled { leaves: usize, predicate: String },
    ChunkStarted { start_row: usize, row_count: usize },
    ChunkFinished { start_row: usize, matched_rows: usize },
    RunFinished {
        elapsed: Duration,
        metrics: ExecutionMetricsSnapshot,
    },
}

/// Observer hook for execution events.
pub trait ExecutionObserver: Send + Sync {
    fn on_event(&self, event: &ExecutionEvent);
}

/// Forwards execution events to `tracing`.
///
/// Run boundaries are logged at `info`, compilation at `debug` and chunks at `trace`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl ExecutionObserver for TracingObserver {
    fn on_event(&self, event: &ExecutionEvent) {
        match event {
            ExecutionEvent::RunStarted { input_rows } => {
                info!(input_rows, "filter run started");
            }
            ExecutionEvent::FilterSkipped => debug!("filter has no criteria; skipped"),
            ExecutionEvent::PredicateCompiled { leaves, predicate } => {
                debug!(leaves, %predicate, "predicate compiled");
            }
            ExecutionEvent::ChunkStarted {
                start_row,
                row_count,
            } => trace!(start_row, row_count, "chunk started"),
            ExecutionEvent::ChunkFinished {
                start_row,
                matched_rows,
            } => trace!(start_row, matched_rows, "chunk finished"),
            ExecutionEvent::RunFinished { elapsed, metrics } => {
                info!(?elapsed, %metrics, "filter run finished");
            }
        }
    }
}

/// Real-time metrics for an execution run.
///
/// The engine updates these counters during execution; callers can snapshot them at any time.
/// Each run resets the counters; concurrent runs on one engine share and reset them.
#[derive(Debug, Default)]
pub struct ExecutionMetrics {
    run_id: AtomicU64,
    elapsed_ns: AtomicU64,

    rows_evaluated: AtomicU64,
    rows_matched: AtomicU64,
    chunks_started: AtomicU64,
    chunks_finished: AtomicU64,

    active_chunks: AtomicUsize,
    max_active_chunks: AtomicUsize,
}

impl ExecutionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn begin_run(&self) {
        let _ = self.run_id.fetch_add(1, Ordering::SeqCst);
        self.elapsed_ns.store(0, Ordering::SeqCst);
        self.rows_evaluated.store(0, Ordering::SeqCst);
        self.rows_matched.store(0, Ordering::SeqCst);
        self.chunks_started.store(0, Ordering::SeqCst);
        self.chunks_finished.store(0, Ordering::SeqCst);
        self.active_chunks.store(0, Ordering::SeqCst);
        self.max_active_chunks.store(0, Ordering::SeqCst);
    }

    pub(crate) fn end_run(&self, elapsed: Duration) {
        // Never store zero for a finished run; zero means "still running".
        let ns = elapsed.as_nanos().clamp(1, u128::from(u64::MAX)) as u64;
        self.elapsed_ns.store(ns, Ordering::SeqCst);
    }

    pub(crate) fn on_chunk_start(&self) {
        let _ = self.chunks_started.fetch_add(1, Ordering::SeqCst);
        let now = self.active_chunks.fetch_add(1, Ordering::SeqCst) + 1;
        let _ = self.max_active_chunks.fetch_max(now, Ordering::SeqCst);
    }

    pub(crate) fn on_chunk_end(&self, evaluated: usize, matched: usize) {
        let _ = self
            .rows_evaluated
            .fetch_add(evaluated as u64, Ordering::SeqCst);
        let _ = self.rows_matched.fetch_add(matched as u64, Ordering::SeqCst);
        let _ = self.chunks_finished.fetch_add(1, Ordering::SeqCst);
        let _ = self.active_chunks.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> ExecutionMetricsSnapshot {
        let elapsed_ns = self.elapsed_ns.load(Ordering::SeqCst);
        ExecutionMetricsSnapshot {
            run_id: self.run_id.load(Ordering::SeqCst),
            elapsed: (elapsed_ns > 0).then(|| Duration::from_nanos(elapsed_ns)),
            rows_evaluated: self.rows_evaluated.load(Ordering::SeqCst),
            rows_matched: self.rows_matched.load(Ordering::SeqCst),
            chunks_started: self.chunks_started.load(Ordering::SeqCst),
            chunks_finished: self.chunks_finished.load(Ordering::SeqCst),
            max_active_chunks: self.max_active_chunks.load(Ordering::SeqCst),
        }
    }
}

/// Immutable snapshot of [`ExecutionMetrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionMetricsSnapshot {
    pub run_id: u64,
    pub elapsed: Option<Duration>,
    pub rows_evaluated: u64,
    pub rows_matched: u64,
    pub chunks_started: u64,
    pub chunks_finished: u64,
    pub max_active_chunks: usize,
}

impl fmt::Display for ExecutionMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run_id={}, rows={}/{}, chunks={}/{}, max_active_chunks={}, elapsed={:?}",
            self.run_id,
            self.rows_matched,
            self.rows_evaluated,
            self.chunks_finished,
            self.chunks_started,
            self.max_active_chunks,
            self.elapsed
        )
    }
}
