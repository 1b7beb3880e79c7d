//! Parallel execution of filters over large record sequences.
//!
//! This module sits "above" [`crate::processing`] and provides:
//!
//! - Chunked parallel evaluation on a dedicated rayon pool, compiling the filter once
//! - Output in input order, identical to the sequential [`crate::processing::EntityFilter`]
//! - Real-time metrics + observer hooks for monitoring

mod observer;

use std::sync::Arc;
use std::time::Instant;

use rayon::ThreadPool;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use tracing::debug;

use crate::error::{FilterError, FilterResult};
use crate::processing::EntityFilter;
use crate::query::FilterGroup;
use crate::transform::FilterOptions;
use crate::types::{DataSet, Entity, Record, Schema};

pub use observer::{
    ExecutionEvent, ExecutionMetrics, ExecutionMetricsSnapshot, ExecutionObserver, TracingObserver,
};

/// Configuration for the [`ExecutionEngine`].
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Number of worker threads used by the engine.
    ///
    /// If `None`, uses the platform's available parallelism.
    pub num_threads: Option<usize>,
    /// Number of records evaluated per task.
    pub chunk_size: usize,
    /// Options used to compile filters.
    pub filter: FilterOptions,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            num_threads: Some(available_parallelism()),
            chunk_size: 4_096,
            filter: FilterOptions::default(),
        }
    }
}

/// Filters record sequences on a rayon thread pool.
pub struct ExecutionEngine {
    pool: ThreadPool,
    opts: ExecutionOptions,
    observer: Option<Arc<dyn ExecutionObserver>>,
    metrics: Arc<ExecutionMetrics>,
}

impl ExecutionEngine {
    /// Create a new engine with the given options.
    ///
    /// Fails with [`FilterError::InvalidOptions`] if `chunk_size == 0` or
    /// `num_threads == Some(0)`.
    pub fn new(opts: ExecutionOptions) -> FilterResult<Self> {
        if opts.chunk_size == 0 {
            return Err(FilterError::InvalidOptions("chunk_size must be > 0".to_string()));
        }
        if opts.num_threads == Some(0) {
            return Err(FilterError::InvalidOptions("num_threads must be > 0 when set".to_string()));
        }

        let n_threads = opts.num_threads.unwrap_or_else(available_parallelism);
        let pool = ThreadPoolBuilder::new().num_threads(n_threads).build()?;

        Ok(Self {
            pool,
            opts,
            observer: None,
            metrics: Arc::new(ExecutionMetrics::new()),
        })
    }

    /// Attach an observer for execution events (metrics/logging).
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Get a handle to real-time execution metrics.
    ///
    /// The counters are shared by every run on this engine and reset when a run starts, so a
    /// snapshot describes a single run only while runs are not overlapping. Filter results are
    /// not affected by concurrent runs.
    pub fn metrics(&self) -> Arc<ExecutionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Filter statically typed entities in parallel.
    pub fn filter_entities<E>(&self, records: &[E], filter: &FilterGroup) -> FilterResult<Vec<E>>
    where
        E: Entity + Clone + Send + Sync,
    {
        self.filter_parallel(records, E::schema(), filter)
    }

    /// Filter the rows of a dataset in parallel, keeping its schema.
    pub fn filter_dataset(&self, dataset: &DataSet, filter: &FilterGroup) -> FilterResult<DataSet> {
        let rows = self.filter_parallel(&dataset.rows, &dataset.schema, filter)?;
        Ok(DataSet::new(dataset.schema.clone(), rows))
    }

    /// Filter records read through `schema` in parallel.
    ///
    /// Same contract as [`EntityFilter::filter_records`]: an empty filter returns the input
    /// unchanged, compilation errors are returned before any record is evaluated, and matches
    /// keep their input order.
    pub fn filter_parallel<R>(
        &self,
        records: &[R],
        schema: &Schema,
        filter: &FilterGroup,
    ) -> FilterResult<Vec<R>>
    where
        R: Record + Clone + Send + Sync,
    {
        let start = Instant::now();
        self.metrics.begin_run();
        self.emit(ExecutionEvent::RunStarted {
            input_rows: records.len(),
        });

        let predicate = match EntityFilter::new(self.opts.filter).compile(schema, filter) {
            Ok(Some(predicate)) => predicate,
            Ok(None) => {
                self.emit(ExecutionEvent::FilterSkipped);
                self.finish_run(start);
                return Ok(records.to_vec());
            }
            Err(err) => {
                debug!(error = %err, "filter compilation failed");
                self.finish_run(start);
                return Err(err);
            }
        };
        self.emit(ExecutionEvent::PredicateCompiled {
            leaves: predicate.leaf_count(),
            predicate: predicate.to_string(),
        });

        let chunk_size = self.opts.chunk_size;
        let per_chunk: Vec<Vec<R>> = self.pool.install(|| {
            records
                .par_chunks(chunk_size)
                .enumerate()
                .map(|(i, chunk)| {
                    let start_row = i * chunk_size;
                    self.metrics.on_chunk_start();
                    self.emit(ExecutionEvent::ChunkStarted {
                        start_row,
                        row_count: chunk.len(),
                    });

                    let out: Vec<R> = chunk
                        .iter()
                        .filter(|record| predicate.matches(*record))
                        .cloned()
                        .collect();

                    self.emit(ExecutionEvent::ChunkFinished {
                        start_row,
                        matched_rows: out.len(),
                    });
                    self.metrics.on_chunk_end(chunk.len(), out.len());
                    out
                })
                .collect()
        });

        let out = per_chunk.into_iter().flatten().collect::<Vec<_>>();
        self.finish_run(start);
        Ok(out)
    }

    fn finish_run(&self, start: Instant) {
        let elapsed = start.elapsed();
        self.metrics.end_run(elapsed);
        self.emit(ExecutionEvent::RunFinished {
            elapsed,
            metrics: self.metrics.snapshot(),
        });
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
