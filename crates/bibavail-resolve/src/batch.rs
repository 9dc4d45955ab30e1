//! Batch partitioning and per-batch state.

/// State of one dispatched batch.
///
/// `attempts` counts every dispatch, timeouts included, and never exceeds
/// the configured maximum. `finished` becomes true exactly once: on a
/// successful decode, on retry exhaustion, or when the run's deadline
/// abandons the batch.
#[derive(Debug, Clone)]
pub struct BatchState {
    pub ids: Vec<String>,
    pub attempts: u32,
    pub finished: bool,
    pub succeeded: bool,
}

impl BatchState {
    pub fn new(ids: Vec<String>) -> Self {
        Self {
            ids,
            attempts: 0,
            finished: false,
            succeeded: false,
        }
    }
}

/// Partition ids into fixed-size batches, preserving input order.
///
/// Order is irrelevant to correctness but keeps dispatch deterministic.
pub fn partition(ids: &[String], batch_size: usize) -> Vec<Vec<String>> {
    assert!(batch_size > 0, "batch_size must be at least 1");
    ids.chunks(batch_size).map(|chunk| chunk.to_vec()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("99{i}")).collect()
    }

    #[test]
    fn partitions_25_ids_into_10_10_5() {
        let batches = partition(&ids(25), 10);
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].len(), 10);
        assert_eq!(batches[1].len(), 10);
        assert_eq!(batches[2].len(), 5);
        // input order preserved across the partition
        assert_eq!(batches[0][0], "990");
        assert_eq!(batches[2][4], "9924");
    }

    #[test]
    fn exact_multiple_has_no_tail_batch() {
        let batches = partition(&ids(20), 10);
        assert_eq!(batches.len(), 2);
        assert!(batches.iter().all(|b| b.len() == 10));
    }

    #[test]
    fn empty_input_yields_no_batches() {
        assert!(partition(&[], 10).is_empty());
    }
}
