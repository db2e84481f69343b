use std::cmp::min;

use log::warn;
use rust_htslib::bam::record::Cigar;

use crate::core::dna;
use crate::core::read::AlignedRead;

/// Mismatch tally for one read against a reference slice.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MismatchCount {
    pub count: u32,
    pub qualsum: u64,
}

/// Reference slice around a target locus, 1-based inclusive genome
/// coordinates. `bases[0]` corresponds to `start`.
#[derive(Debug, Clone, Copy)]
pub struct RefWindow<'a> {
    pub start: u64,
    pub stop: u64,
    pub target: u64,
    pub bases: &'a [u8],
}

impl<'a> RefWindow<'a> {
    pub fn new(start: u64, stop: u64, target: u64, bases: &'a [u8]) -> Self {
        debug_assert!(start <= target && target <= stop);
        debug_assert_eq!(bases.len() as u64, stop - start + 1);
        RefWindow { start, stop, target, bases }
    }
}

/// Counts mismatches of `read` against `refseq`, with the alignment assumed
/// to start at `refindex` (the read's own alignment start is never used; its
/// CIGAR structure is fully respected). Bases are compared case-insensitively.
/// Reference positions beyond the supplied slice are silently skipped rather
/// than treated as an error, which is what lenient windowed scanning over a
/// partial reference slice needs.
pub fn mismatch_count<R: AlignedRead>(read: &R, refseq: &[u8], refindex: usize) -> MismatchCount {
    let mut mc = MismatchCount::default();

    let seq = read.seq();
    let quals = read.qual();
    let mut refindex = refindex;
    let mut readidx = 0usize;

    for op in read.cigar().iter() {
        match *op {
            Cigar::Match(len) | Cigar::Equal(len) | Cigar::Diff(len) => {
                for _ in 0..len {
                    if refindex < refseq.len() && !dna::same_base(seq[readidx], refseq[refindex]) {
                        mc.count += 1;
                        mc.qualsum += quals[readidx] as u64;
                    }
                    refindex += 1;
                    readidx += 1;
                }
            }
            Cigar::Ins(len) | Cigar::SoftClip(len) => readidx += len as usize,
            Cigar::Del(len) | Cigar::RefSkip(len) => refindex += len as usize,
            Cigar::HardClip(_) | Cigar::Pad(_) => {}
        }
    }
    mc
}

/// Counts mismatches of `read` inside a bounded reference window, optionally
/// excluding the window's target locus from scoring. When `qualsum` is set the
/// returned value is the sum of mismatching base qualities instead of the
/// mismatch count.
///
/// On a CIGAR element this scan does not support (hard clips, pads) the read
/// is treated as unusable for the computation and 0 is returned. Callers rely
/// on that fallback to skip such reads without aborting a whole traversal.
pub fn mismatches_in_window<R: AlignedRead>(read: &R, window: &RefWindow, ignore_target: bool, qualsum: bool) -> u32 {
    let mut sum = 0u32;

    let seq = read.seq();
    let quals = read.qual();

    let mut read_index = 0usize;
    // reads are mapped here, so the 0-based alignment start is non-negative
    let mut current = read.pos() as u64 + 1;
    let mut ref_index = current.saturating_sub(window.start) as usize;

    for op in read.cigar().iter() {
        let oplen = op.len() as u64;
        match *op {
            Cigar::Match(_) | Cigar::Equal(_) | Cigar::Diff(_) => {
                for _ in 0..oplen {
                    // past the window?
                    if current > window.stop {
                        break;
                    }
                    // before the window?
                    if current < window.start {
                        read_index += 1;
                        current += 1;
                        continue;
                    }
                    let refchr = match window.bases.get(ref_index) {
                        Some(&base) => base,
                        None => break,
                    };
                    ref_index += 1;

                    if ignore_target && current == window.target {
                        read_index += 1;
                        current += 1;
                        continue;
                    }
                    if !dna::same_base(seq[read_index], refchr) {
                        sum += if qualsum { quals[read_index] as u32 } else { 1 };
                    }
                    read_index += 1;
                    current += 1;
                }
            }
            Cigar::Ins(len) | Cigar::SoftClip(len) => read_index += len as usize,
            Cigar::Del(_) | Cigar::RefSkip(_) => {
                current += oplen;
                if current > window.start {
                    ref_index += min(oplen, current - window.start) as usize;
                }
            }
            Cigar::HardClip(_) | Cigar::Pad(_) => {
                warn!("unsupported CIGAR element {} in windowed mismatch scan, read skipped", op);
                return 0;
            }
        }
    }
    sum
}
