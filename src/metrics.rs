use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing ingestion and retrieval activity.
#[derive(Default)]
pub struct PipelineMetrics {
    pages_processed: AtomicU64,
    chunks_indexed: AtomicU64,
    questions_answered: AtomicU64,
}

impl PipelineMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed reindex pass and the totals it produced.
    pub fn record_ingest(&self, pages: u64, chunks: u64) {
        self.pages_processed.fetch_add(pages, Ordering::Relaxed);
        self.chunks_indexed.fetch_add(chunks, Ordering::Relaxed);
    }

    /// Record an answered question.
    pub fn record_question(&self) {
        self.questions_answered.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            pages_processed: self.pages_processed.load(Ordering::Relaxed),
            chunks_indexed: self.chunks_indexed.load(Ordering::Relaxed),
            questions_answered: self.questions_answered.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of pipeline counters used for reporting.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Number of non-empty pages processed across all reindex passes.
    pub pages_processed: u64,
    /// Total chunk count stored across all reindex passes.
    pub chunks_indexed: u64,
    /// Number of questions answered since startup.
    pub questions_answered: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_pages_and_chunks() {
        let metrics = PipelineMetrics::new();
        metrics.record_ingest(3, 12);
        metrics.record_ingest(1, 2);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.pages_processed, 4);
        assert_eq!(snapshot.chunks_indexed, 14);
    }

    #[test]
    fn counts_questions() {
        let metrics = PipelineMetrics::new();
        assert_eq!(metrics.snapshot().questions_answered, 0);
        metrics.record_question();
        metrics.record_question();
        assert_eq!(metrics.snapshot().questions_answered, 2);
    }
}
