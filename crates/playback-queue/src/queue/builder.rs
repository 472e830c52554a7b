use crate::queue::types::{QueueEntry, SearchResult};

/// Turns search results into the playback queue, one entry per result in
/// source order.
pub fn build_queue(results: &[SearchResult]) -> Vec<QueueEntry> {
    results.iter().map(QueueEntry::from).collect()
}
