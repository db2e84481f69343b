#[cfg(test)]
use mockall::{automock, predicate::*};

pub use by_quality::FilterByQuality;
pub use downsample::{DownsampleByFraction, DownsampleToCoverage};
pub use sequential::SequentialFilter;

use crate::core::read::AlignedRead;

mod by_quality;
mod downsample;
mod sequential;

/// Pure per-read/per-base predicates applied before a unit of work reaches
/// the walker. Filtered-out reads never reach the walker and never affect
/// reduce order.
#[cfg_attr(test, automock)]
pub trait ReadsFilter<R: AlignedRead> {
    fn is_read_ok(&self, record: &R) -> bool;
    fn is_base_ok(&self, record: &R, base: usize) -> bool;
}
