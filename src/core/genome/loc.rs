use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use super::contigs::ContigDict;

/// A closed 1-based coordinate range on a single contig. The contig is stored
/// as an index into the run's `ContigDict`, so the total order (contig, start,
/// stop) never needs to consult the dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GenomeLoc {
    contig: u32,
    start: u64,
    stop: u64,
}

impl GenomeLoc {
    pub fn new(contig: u32, start: u64, stop: u64) -> Self {
        debug_assert!(start <= stop);
        GenomeLoc { contig, start, stop }
    }

    #[inline]
    pub fn contig(&self) -> u32 {
        self.contig
    }

    #[inline]
    pub fn start(&self) -> u64 {
        self.start
    }

    #[inline]
    pub fn stop(&self) -> u64 {
        self.stop
    }

    #[inline]
    pub fn span(&self) -> u64 {
        self.stop - self.start + 1
    }

    #[inline]
    pub fn contains_position(&self, contig: u32, position: u64) -> bool {
        self.contig == contig && self.start <= position && position <= self.stop
    }

    #[inline]
    pub fn overlaps(&self, other: &GenomeLoc) -> bool {
        self.contig == other.contig && self.start <= other.stop && other.start <= self.stop
    }

    /// Touching or intersecting ranges on the same contig; such locs collapse
    /// into a single entry inside a `GenomeLocSet`.
    #[inline]
    pub fn contiguous(&self, other: &GenomeLoc) -> bool {
        self.contig == other.contig && self.start <= other.stop + 1 && other.start <= self.stop + 1
    }

    pub fn merge(&self, other: &GenomeLoc) -> GenomeLoc {
        debug_assert!(self.contiguous(other));
        GenomeLoc::new(self.contig, self.start.min(other.start), self.stop.max(other.stop))
    }

    pub fn named(&self, dict: &ContigDict) -> String {
        match dict.name(self.contig) {
            Some(name) => format!("{}:{}-{}", name, self.start, self.stop),
            None => self.to_string(),
        }
    }
}

impl Display for GenomeLoc {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}:{}-{}", self.contig, self.start, self.stop)
    }
}

impl PartialOrd for GenomeLoc {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GenomeLoc {
    fn cmp(&self, other: &Self) -> Ordering {
        self.contig.cmp(&other.contig).then(self.start.cmp(&other.start)).then(self.stop.cmp(&other.stop))
    }
}
