use itertools::Itertools;

use super::contigs::ContigDict;
use super::loc::GenomeLoc;
use crate::core::error::IntervalError;

/// Ordered, deduplicated interval set. Invariant: no two entries overlap or
/// touch; adjacent entries are merged on construction.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GenomeLocSet {
    locs: Vec<GenomeLoc>,
}

impl GenomeLocSet {
    /// Sorts by the total order and merges overlapping/adjacent locs. Locs
    /// whose contig index falls outside the dictionary were produced against
    /// a different ordering and are rejected.
    pub fn merge_and_sort(locs: Vec<GenomeLoc>, dict: &ContigDict) -> Result<Self, IntervalError> {
        if dict.is_empty() {
            return Err(IntervalError::OrderingNotInitialized);
        }
        if let Some(alien) = locs.iter().find(|x| x.contig() as usize >= dict.len()) {
            return Err(IntervalError::InconsistentOrdering(format!(
                "{} refers to contig #{} but the dictionary holds {} contigs",
                alien,
                alien.contig(),
                dict.len()
            )));
        }

        let locs = locs
            .into_iter()
            .sorted()
            .coalesce(|prev, next| if prev.contiguous(&next) { Ok(prev.merge(&next)) } else { Err((prev, next)) })
            .collect();
        Ok(GenomeLocSet { locs })
    }

    pub fn union(self, other: GenomeLocSet, dict: &ContigDict) -> Result<Self, IntervalError> {
        let mut locs = self.locs;
        locs.extend(other.locs);
        GenomeLocSet::merge_and_sort(locs, dict)
    }

    #[inline]
    pub fn locs(&self) -> &[GenomeLoc] {
        &self.locs
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &GenomeLoc> {
        self.locs.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.locs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.locs.is_empty()
    }

    /// Total base pairs covered.
    #[inline]
    pub fn span(&self) -> u64 {
        self.locs.iter().map(|x| x.span()).sum()
    }
}

impl IntoIterator for GenomeLocSet {
    type Item = GenomeLoc;
    type IntoIter = std::vec::IntoIter<GenomeLoc>;

    fn into_iter(self) -> Self::IntoIter {
        self.locs.into_iter()
    }
}

impl FromIterator<GenomeLoc> for GenomeLocSet {
    /// Debug-checked shortcut for locs that are already sorted and disjoint.
    fn from_iter<T: IntoIterator<Item = GenomeLoc>>(iter: T) -> Self {
        let locs: Vec<GenomeLoc> = iter.into_iter().collect();
        debug_assert!(locs.windows(2).all(|w| w[0] < w[1] && !w[0].contiguous(&w[1])));
        GenomeLocSet { locs }
    }
}
