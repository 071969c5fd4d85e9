//! Background chunk generation on a fixed pool of worker threads.
//!
//! Tasks go in through a bounded channel and finished chunks come back through
//! another. Each worker owns the chunk it is generating, so no chunk is ever
//! shared between threads. Pending tasks can be cancelled.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender, bounded};
use dashmap::DashMap;
use glam::IVec3;
use strata_config::GenerationConfig;

use crate::decorator::DecoratorError;
use crate::pipeline::{GeneratedChunk, GenerationTask, WorldPipeline, generate_chunk_sync};

/// Outcome of one background task.
#[derive(Debug)]
pub struct GenerationResult {
    /// Chunk coordinates of the task.
    pub position: IVec3,
    pub outcome: Result<GeneratedChunk, DecoratorError>,
    /// Generation time in microseconds (for profiling).
    pub generation_time_us: u64,
}

/// Internal wrapper that carries the task and its cancellation flag.
struct QueuedTask {
    task: GenerationTask,
    cancelled: Arc<AtomicBool>,
}

/// Generates chunks through a shared [`WorldPipeline`] on worker threads.
pub struct ChunkGenerationPool {
    task_sender: Sender<QueuedTask>,
    result_receiver: Receiver<GenerationResult>,
    /// Cancellation flag per pending task, keyed by chunk position.
    active_tasks: Arc<DashMap<IVec3, Arc<AtomicBool>>>,
    /// Tasks queued or executing.
    in_flight: Arc<AtomicU64>,
}

impl ChunkGenerationPool {
    /// Spawn `thread_count` workers (at least one) with room for
    /// `queue_capacity` queued tasks and as many undrained results.
    pub fn new(
        pipeline: Arc<WorldPipeline>,
        thread_count: usize,
        queue_capacity: usize,
    ) -> std::io::Result<Self> {
        let queue_capacity = queue_capacity.max(1);
        let (task_sender, task_receiver) = bounded::<QueuedTask>(queue_capacity);
        let (result_sender, result_receiver) = bounded::<GenerationResult>(queue_capacity);
        let in_flight = Arc::new(AtomicU64::new(0));

        for i in 0..thread_count.max(1) {
            let receiver = task_receiver.clone();
            let sender = result_sender.clone();
            let in_flight = Arc::clone(&in_flight);
            let pipeline = Arc::clone(&pipeline);

            std::thread::Builder::new()
                .name(format!("chunk-gen-worker-{i}"))
                .spawn(move || {
                    while let Ok(queued) = receiver.recv() {
                        if queued.cancelled.load(Ordering::Relaxed) {
                            in_flight.fetch_sub(1, Ordering::Relaxed);
                            continue;
                        }

                        let start = std::time::Instant::now();
                        let outcome = generate_chunk_sync(&queued.task, &pipeline);
                        let elapsed = start.elapsed().as_micros() as u64;
                        if let Err(err) = &outcome {
                            tracing::error!(
                                chunk = ?queued.task.position,
                                "Chunk generation failed: {err}"
                            );
                        }

                        if !queued.cancelled.load(Ordering::Relaxed) {
                            let _ = sender.send(GenerationResult {
                                position: queued.task.position,
                                outcome,
                                generation_time_us: elapsed,
                            });
                        }

                        in_flight.fetch_sub(1, Ordering::Relaxed);
                    }
                })?;
        }

        tracing::info!(
            threads = thread_count.max(1),
            queue_capacity,
            "Chunk generation pool started"
        );
        Ok(Self {
            task_sender,
            result_receiver,
            active_tasks: Arc::new(DashMap::new()),
            in_flight,
        })
    }

    /// Worker count from `config`, where 0 means two fewer than the CPU count
    /// (at least one).
    pub fn from_config(pipeline: Arc<WorldPipeline>, config: &GenerationConfig) -> std::io::Result<Self> {
        let threads = if config.threads == 0 {
            default_thread_count()
        } else {
            config.threads
        };
        Self::new(pipeline, threads, config.queue_capacity)
    }

    /// Submit a chunk for background generation.
    ///
    /// Returns `Err(task)` if the queue is full.
    pub fn submit(&self, task: GenerationTask) -> Result<(), GenerationTask> {
        let cancelled = Arc::new(AtomicBool::new(false));
        self.active_tasks
            .insert(task.position, Arc::clone(&cancelled));
        self.in_flight.fetch_add(1, Ordering::Relaxed);

        self.task_sender
            .try_send(QueuedTask { task, cancelled })
            .map_err(|e| {
                self.in_flight.fetch_sub(1, Ordering::Relaxed);
                let task = e.into_inner().task;
                self.active_tasks.remove(&task.position);
                tracing::warn!(chunk = ?task.position, "Generation queue full, task rejected");
                task
            })
    }

    /// Cancel a pending or in-progress task. No-op once it has completed.
    pub fn cancel(&self, position: IVec3) {
        if let Some((_, cancelled)) = self.active_tasks.remove(&position) {
            cancelled.store(true, Ordering::Relaxed);
        }
    }

    /// Drain all finished tasks without blocking.
    pub fn drain_results(&self) -> Vec<GenerationResult> {
        let mut results = Vec::new();
        while let Ok(result) = self.result_receiver.try_recv() {
            self.active_tasks.remove(&result.position);
            results.push(result);
        }
        results
    }

    /// Number of tasks currently in flight (queued or executing).
    pub fn in_flight_count(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Returns `true` if a task for `position` has been submitted and not yet drained.
    pub fn is_pending(&self, position: IVec3) -> bool {
        self.active_tasks.contains_key(&position)
    }
}

/// Leaves headroom for the host's own threads.
pub fn default_thread_count() -> usize {
    num_cpus::get().saturating_sub(2).max(1)
}
