// bibavail-resolve - Availability fetch orchestration
//
// Given the record ids collected from a results page, partition them into
// fixed-size batches, fetch each batch concurrently with bounded retries,
// merge decoded holdings into a request-scoped index, and deliver one
// terminal render call per target. Every requested record reaches a
// terminal state even when some batches never return.

mod batch;
mod index;
mod resolver;

pub use batch::{partition, BatchState};
pub use index::AvailabilityIndex;
pub use resolver::{ResolveSummary, Resolver, ResolverConfig};

/// Placeholder for records that resolved with nothing to show.
pub const NO_STATUS_TEXT: &str = "No status available for this item";

/// Placeholder for records whose batches never produced an answer.
pub const ERROR_LOADING_TEXT: &str = "Error loading status for this item";

/// Terminal display state for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Formatted, non-empty holdings text.
    Holdings(String),
    /// The upstream answered and the record has no holdings.
    NoStatus,
    /// Every attempt for the record's batch failed.
    ErrorLoading,
}

impl RenderOutcome {
    pub fn display_text(&self) -> &str {
        match self {
            Self::Holdings(text) => text,
            Self::NoStatus => NO_STATUS_TEXT,
            Self::ErrorLoading => ERROR_LOADING_TEXT,
        }
    }
}

/// One output cell on the page: a handle the renderer understands plus
/// the record ids shown in that cell. Bound-with records share one cell,
/// so a target may carry more than one id.
#[derive(Debug, Clone)]
pub struct Target {
    pub handle: String,
    pub ids: Vec<String>,
}

impl Target {
    pub fn new(handle: impl Into<String>, ids: Vec<String>) -> Self {
        Self {
            handle: handle.into(),
            ids,
        }
    }

    /// The common case: one record id per cell, handle = id.
    pub fn single(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            handle: id.clone(),
            ids: vec![id],
        }
    }
}

/// Receives terminal render calls as targets settle.
///
/// Called at most once per target per resolution pass, from whichever
/// batch task settles the target; implementations must be thread-safe.
pub trait RenderSink: Send + Sync {
    fn render(&self, handle: &str, outcome: RenderOutcome);
}
