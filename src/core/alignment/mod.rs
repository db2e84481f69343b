pub use leftalign::left_align_indel;
pub use mismatches::{mismatch_count, mismatches_in_window, MismatchCount, RefWindow};

use rust_htslib::bam::record::{Cigar, CigarString};

use crate::core::read::AlignedRead;

mod leftalign;
mod mismatches;

/// Number of continuous alignment blocks, i.e. match runs of the CIGAR.
/// Indel and clipping elements are ignored. A cheap proxy for callers that
/// would otherwise materialize the full block list just to count it.
pub fn aligned_blocks(cigar: &CigarString) -> usize {
    cigar.iter().filter(|op| matches!(op, Cigar::Match(_) | Cigar::Equal(_) | Cigar::Diff(_))).count()
}

/// Reference bases consumed by the alignment.
pub fn reference_span(cigar: &CigarString) -> u64 {
    cigar
        .iter()
        .map(|op| match op {
            Cigar::Match(len) | Cigar::Equal(len) | Cigar::Diff(len) | Cigar::Del(len) | Cigar::RefSkip(len) => {
                *len as u64
            }
            _ => 0,
        })
        .sum()
}

/// Read offset aligned to the 1-based reference `position`, or None when the
/// position is deleted/skipped in this read or lies outside its alignment.
pub fn read_offset_at<R: AlignedRead>(read: &R, position: u64) -> Option<usize> {
    let mut current = read.pos() as u64 + 1;
    let mut offset = 0usize;

    for op in read.cigar().iter() {
        let oplen = op.len() as u64;
        match op {
            Cigar::Match(_) | Cigar::Equal(_) | Cigar::Diff(_) => {
                if position < current + oplen {
                    return position.checked_sub(current).map(|shift| offset + shift as usize);
                }
                current += oplen;
                offset += oplen as usize;
            }
            Cigar::Del(_) | Cigar::RefSkip(_) => {
                if position < current + oplen {
                    return None;
                }
                current += oplen;
            }
            Cigar::Ins(len) | Cigar::SoftClip(len) => offset += *len as usize,
            Cigar::HardClip(_) | Cigar::Pad(_) => {}
        }
    }
    None
}

/// The SAM format allows several ways to mark a read unmapped; this checks
/// both the flag and the reference index/alignment start consistency, so
/// records from files lacking a proper sequence dictionary are not mistaken
/// for mapped reads.
pub fn is_unmapped<R: AlignedRead>(read: &R) -> bool {
    read.is_unmapped_flag() || read.tid() < 0 || read.pos() < 0
}

/// Base qualities in machine-cycle order: reversed for reverse-strand
/// alignments, as stored otherwise.
pub fn quals_in_cycle_order<R: AlignedRead>(read: &R) -> Vec<u8> {
    let quals = read.qual().to_vec();
    if !is_unmapped(read) && read.is_reverse() {
        quals.into_iter().rev().collect()
    } else {
        quals
    }
}
