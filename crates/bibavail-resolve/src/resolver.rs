//! The availability fetch orchestrator.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinSet;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, error, warn};

use bibavail_client::AvailabilityService;
use bibavail_core::{Decoder, DefaultFormatter, HoldingFormatter};

use crate::batch::{partition, BatchState};
use crate::index::AvailabilityIndex;
use crate::{RenderOutcome, RenderSink, Target};

/// Orchestrator tuning. Defaults match the reference deployment.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Record ids per upstream request.
    pub batch_size: usize,
    /// Dispatch attempts per batch. A timeout counts as a failed attempt
    /// like any other transport error, so a batch never retries unbounded.
    pub max_attempts: u32,
    /// Completion re-check interval.
    pub poll_interval: Duration,
    /// Overall deadline; pending batches are abandoned when it passes.
    pub max_wait: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            max_attempts: 3,
            poll_interval: Duration::from_millis(1000),
            max_wait: Duration::from_secs(60),
        }
    }
}

/// What one resolution pass did.
#[derive(Debug, Clone, Default)]
pub struct ResolveSummary {
    /// Targets rendered with holdings text.
    pub rendered: usize,
    /// Targets rendered with the "no status" placeholder.
    pub no_status: usize,
    /// Targets rendered with the "error loading" placeholder.
    pub error_loading: usize,
    /// Bibs the decoder had to skip, across all batches.
    pub skipped_bibs: usize,
    /// Upstream/application errors encountered (not retried). Forwarded
    /// for reporting; per-target outcomes already reflect them.
    pub errors: Vec<String>,
}

#[derive(Default)]
struct Shared {
    index: AvailabilityIndex,
    batches: Vec<BatchState>,
    id_batch: HashMap<String, usize>,
    targets: Vec<Target>,
    rendered: HashSet<String>,
    rendered_counts: Counts,
    errors: Vec<String>,
    skipped_bibs: usize,
}

#[derive(Debug, Clone, Copy, Default)]
struct Counts {
    holdings: usize,
    no_status: usize,
    error_loading: usize,
}

/// One page-load's availability resolution.
///
/// Owns the availability index and all batch state exclusively; nothing
/// is shared across requests. The resolver may be asked to resolve more
/// than once (e.g. rows added to the page): ids already settled are served
/// from the index without re-dispatch.
pub struct Resolver {
    service: Arc<dyn AvailabilityService>,
    decoder: Arc<Decoder>,
    formatter: Arc<dyn HoldingFormatter>,
    config: ResolverConfig,
    shared: Arc<Mutex<Shared>>,
}

impl Resolver {
    pub fn new(service: Arc<dyn AvailabilityService>, config: ResolverConfig) -> Self {
        Self {
            service,
            decoder: Arc::new(Decoder::new()),
            formatter: Arc::new(DefaultFormatter),
            config,
            shared: Arc::new(Mutex::new(Shared::default())),
        }
    }

    /// Replace the decoder, e.g. to install a holding transform.
    pub fn with_decoder(mut self, decoder: Decoder) -> Self {
        self.decoder = Arc::new(decoder);
        self
    }

    /// Replace the display formatter.
    pub fn with_formatter(mut self, formatter: Arc<dyn HoldingFormatter>) -> Self {
        self.formatter = formatter;
        self
    }

    /// True iff every dispatched batch has reached a terminal state.
    pub fn is_fully_resolved(&self) -> bool {
        self.shared.lock().batches.iter().all(|b| b.finished)
    }

    /// Resolve availability for `targets`, delivering one terminal render
    /// call per target, and return once every batch has terminated (or the
    /// deadline abandoned it). Dropping the returned future abandons
    /// pending batches; the index needs no rollback since it is scoped to
    /// this resolver.
    pub async fn resolve(&self, targets: Vec<Target>, sink: Arc<dyn RenderSink>) -> ResolveSummary {
        let (counts_before, errors_before, skipped_before) = {
            let shared = self.shared.lock();
            (shared.rendered_counts, shared.errors.len(), shared.skipped_bibs)
        };
        let (new_batches, redeliveries) = self.register(targets);

        // Already-settled targets answer from the index immediately.
        for (handle, outcome) in redeliveries {
            sink.render(&handle, outcome);
        }
        flush_renderable(&self.shared, self.formatter.as_ref(), sink.as_ref());

        let mut tasks = JoinSet::new();
        for batch_idx in new_batches {
            tasks.spawn(run_batch(
                Arc::clone(&self.service),
                Arc::clone(&self.decoder),
                Arc::clone(&self.formatter),
                Arc::clone(&self.shared),
                Arc::clone(&sink),
                batch_idx,
                self.config.max_attempts,
            ));
        }

        // Non-blocking completion detection: re-check on a bounded
        // interval instead of joining each batch, so arrival order never
        // matters and the deadline stays explicit.
        let deadline = Instant::now() + self.config.max_wait;
        let mut ticker = interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if self.is_fully_resolved() {
                break;
            }
            if Instant::now() >= deadline {
                warn!("resolution deadline reached, abandoning pending batches");
                tasks.abort_all();
                let mut shared = self.shared.lock();
                for batch in shared.batches.iter_mut().filter(|b| !b.finished) {
                    batch.finished = true;
                    batch.succeeded = false;
                }
                break;
            }
        }

        self.finalize_missing(sink.as_ref());

        // Summarize this pass only, not earlier passes on the same page.
        let shared = self.shared.lock();
        ResolveSummary {
            rendered: shared.rendered_counts.holdings - counts_before.holdings,
            no_status: shared.rendered_counts.no_status - counts_before.no_status,
            error_loading: shared.rendered_counts.error_loading - counts_before.error_loading,
            skipped_bibs: shared.skipped_bibs - skipped_before,
            errors: shared.errors[errors_before..].to_vec(),
        }
    }

    /// Render the placeholder for every target never populated with data.
    /// Runs once all batches are terminal; the rendered set guarantees
    /// exactly one terminal call per target and never downgrades a
    /// rendered success.
    pub fn finalize_missing(&self, sink: &dyn RenderSink) {
        debug_assert!(self.is_fully_resolved());
        flush_renderable(&self.shared, self.formatter.as_ref(), sink);
    }

    /// Register targets, partition fresh ids into batches, and collect
    /// immediate re-deliveries for handles rendered in an earlier pass.
    fn register(&self, targets: Vec<Target>) -> (Vec<usize>, Vec<(String, RenderOutcome)>) {
        let mut shared = self.shared.lock();
        let mut fresh_ids: Vec<String> = Vec::new();
        let mut redeliveries = Vec::new();

        for target in targets {
            if shared.rendered.contains(&target.handle) {
                if let Some(outcome) =
                    target_outcome(&shared, self.formatter.as_ref(), &target)
                {
                    redeliveries.push((target.handle.clone(), outcome));
                }
                continue;
            }
            for id in &target.ids {
                if !shared.id_batch.contains_key(id) && !fresh_ids.contains(id) {
                    fresh_ids.push(id.clone());
                }
            }
            shared.targets.push(target);
        }

        let mut new_batches = Vec::new();
        for chunk in partition(&fresh_ids, self.config.batch_size) {
            let batch_idx = shared.batches.len();
            for id in &chunk {
                shared.id_batch.insert(id.clone(), batch_idx);
            }
            shared.batches.push(BatchState::new(chunk));
            new_batches.push(batch_idx);
        }
        debug!(
            batches = new_batches.len(),
            ids = fresh_ids.len(),
            "dispatching availability batches"
        );
        (new_batches, redeliveries)
    }
}

/// Fetch one batch with bounded retries, merge its holdings, and trigger
/// a render pass for targets it settles.
async fn run_batch(
    service: Arc<dyn AvailabilityService>,
    decoder: Arc<Decoder>,
    formatter: Arc<dyn HoldingFormatter>,
    shared: Arc<Mutex<Shared>>,
    sink: Arc<dyn RenderSink>,
    batch_idx: usize,
    max_attempts: u32,
) {
    loop {
        let (ids, attempt) = {
            let mut s = shared.lock();
            let batch = &mut s.batches[batch_idx];
            batch.attempts += 1;
            (batch.ids.clone(), batch.attempts)
        };

        match service.fetch_availability(&ids).await {
            Ok(envelope) => match decoder.decode(&envelope) {
                Ok(decoded) => {
                    {
                        let mut s = shared.lock();
                        s.skipped_bibs += decoded.skipped_bibs;
                        s.index.merge(decoded.records);
                        let batch = &mut s.batches[batch_idx];
                        batch.finished = true;
                        batch.succeeded = true;
                    }
                    debug!(batch = batch_idx, attempt, "availability batch resolved");
                    flush_renderable(&shared, formatter.as_ref(), sink.as_ref());
                    return;
                }
                Err(err) => {
                    // A well-formed rejection will not change on retry.
                    error!(batch = batch_idx, error = %err, "availability decode failed");
                    {
                        let mut s = shared.lock();
                        s.errors.push(err.to_string());
                        let batch = &mut s.batches[batch_idx];
                        batch.finished = true;
                        batch.succeeded = false;
                    }
                    flush_renderable(&shared, formatter.as_ref(), sink.as_ref());
                    return;
                }
            },
            Err(err) if err.is_retryable() && attempt < max_attempts => {
                warn!(
                    batch = batch_idx,
                    attempt,
                    error = %err,
                    "availability fetch failed, retrying"
                );
            }
            Err(err) => {
                error!(
                    batch = batch_idx,
                    attempts = attempt,
                    error = %err,
                    "availability fetch failed, giving up"
                );
                {
                    let mut s = shared.lock();
                    if !err.is_retryable() {
                        s.errors.push(err.to_string());
                    }
                    let batch = &mut s.batches[batch_idx];
                    batch.finished = true;
                    batch.succeeded = false;
                }
                flush_renderable(&shared, formatter.as_ref(), sink.as_ref());
                return;
            }
        }
    }
}

/// Render every unrendered target whose ids have all settled.
///
/// Outcomes are computed and the rendered set updated under one lock, so
/// concurrent batch completions cannot double-render a target; the sink
/// itself is called outside the lock.
fn flush_renderable(shared: &Mutex<Shared>, formatter: &dyn HoldingFormatter, sink: &dyn RenderSink) {
    let renders: Vec<(String, RenderOutcome)> = {
        let mut s = shared.lock();
        let mut renders = Vec::new();
        for i in 0..s.targets.len() {
            if s.rendered.contains(&s.targets[i].handle) {
                continue;
            }
            let Some(outcome) = target_outcome(&s, formatter, &s.targets[i]) else {
                continue;
            };
            let handle = s.targets[i].handle.clone();
            s.rendered.insert(handle.clone());
            match outcome {
                RenderOutcome::Holdings(_) => s.rendered_counts.holdings += 1,
                RenderOutcome::NoStatus => s.rendered_counts.no_status += 1,
                RenderOutcome::ErrorLoading => s.rendered_counts.error_loading += 1,
            }
            renders.push((handle, outcome));
        }
        renders
    };

    for (handle, outcome) in renders {
        sink.render(&handle, outcome);
    }
}

/// Terminal outcome for a target, or `None` while any of its ids is still
/// in flight. Partial success wins: any holdings at all render as data,
/// even when a sibling batch exhausted its retries.
fn target_outcome(
    shared: &Shared,
    formatter: &dyn HoldingFormatter,
    target: &Target,
) -> Option<RenderOutcome> {
    let mut any_failed = false;
    for id in &target.ids {
        let batch = shared
            .id_batch
            .get(id)
            .map(|&idx| &shared.batches[idx])?;
        if !batch.finished {
            return None;
        }
        if !batch.succeeded {
            any_failed = true;
        }
    }

    let mut holdings = Vec::new();
    for id in &target.ids {
        if let Some(found) = shared.index.holdings(id) {
            holdings.extend_from_slice(found);
        }
    }

    let text = formatter.format_many(&holdings);
    if !text.is_empty() {
        Some(RenderOutcome::Holdings(text))
    } else if any_failed {
        Some(RenderOutcome::ErrorLoading)
    } else {
        Some(RenderOutcome::NoStatus)
    }
}
