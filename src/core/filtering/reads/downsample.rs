use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use super::ReadsFilter;
use crate::core::read::AlignedRead;

/// Keeps roughly `fraction` of the reads. The draw is a hash of the read
/// name, so the decision is a pure function of the read itself: the same
/// read survives or falls regardless of thread count, partition layout, or
/// the order in which reads are seen.
#[derive(Debug, Clone, Copy)]
pub struct DownsampleByFraction {
    fraction: f64,
}

impl DownsampleByFraction {
    pub fn new(fraction: f64) -> Self {
        debug_assert!((0.0..=1.0).contains(&fraction));
        DownsampleByFraction { fraction }
    }

    fn draw(name: &[u8]) -> f64 {
        rank(name) as f64 / u64::MAX as f64
    }
}

// DefaultHasher is seed-stable within one process, which is all the
// determinism guarantees here need.
fn rank(name: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    name.hash(&mut hasher);
    hasher.finish()
}

/// Caps pileup depth at a target coverage. Overfull pileups keep the `limit`
/// reads with the lowest name rank, so which reads survive a deep locus is a
/// pure function of the reads themselves; coordinate order is preserved.
/// Unlike the per-read fraction draw this needs the whole pileup, so it runs
/// after pileup assembly rather than through `ReadsFilter`.
#[derive(Debug, Clone, Copy)]
pub struct DownsampleToCoverage {
    limit: usize,
}

impl DownsampleToCoverage {
    pub fn new(limit: usize) -> Self {
        debug_assert!(limit > 0);
        DownsampleToCoverage { limit }
    }

    pub fn cap<'a, R: AlignedRead>(&self, pileup: Vec<&'a R>) -> Vec<&'a R> {
        if pileup.len() <= self.limit {
            return pileup;
        }
        let mut ranked: Vec<(usize, &R)> = pileup.into_iter().enumerate().collect();
        ranked.sort_by_key(|&(index, read)| (rank(read.name()), index));
        ranked.truncate(self.limit);
        ranked.sort_by_key(|&(index, _)| index);
        ranked.into_iter().map(|(_, read)| read).collect()
    }
}

impl<R: AlignedRead> ReadsFilter<R> for DownsampleByFraction {
    #[inline]
    fn is_read_ok(&self, record: &R) -> bool {
        // A fraction of 1 must keep everything; the division below rounds to
        // exactly 1.0 for hashes close to u64::MAX.
        self.fraction >= 1.0 || DownsampleByFraction::draw(record.name()) < self.fraction
    }

    #[inline]
    fn is_base_ok(&self, _: &R, _: usize) -> bool {
        true
    }
}
