use rust_htslib::bam::record::{Cigar, CigarString};

use crate::core::dna;

/// Canonicalizes ambiguous indel placement by moving the indel of a
/// `M`-then-indel alignment as far left as the repeat structure of the
/// indel's own sequence allows. Many equally valid alignments exist when an
/// indel falls inside a repeat; the leftmost placement gives reproducible,
/// comparable alignments across reads and tools.
///
/// `refindex`/`readindex` are the 0-based positions where the alignment
/// described by `cigar` starts on the reference and on the read. Alignments
/// that start clipped or inserted, have no indel in second position, or are
/// structurally malformed are returned unchanged: the fallback is documented
/// behavior, not a failure.
pub fn left_align_indel(
    cigar: &CigarString,
    refseq: &[u8],
    readseq: &[u8],
    refindex: usize,
    readindex: usize,
) -> CigarString {
    let ops: &[Cigar] = cigar;
    if ops.len() < 2 {
        return cigar.clone();
    }

    // Clipped reads cannot be handled here, and an alignment starting with an
    // insertion leaves no room on the read to move that insertion further left.
    let lead = match ops[0] {
        Cigar::Match(len) => len as usize,
        _ => return cigar.clone(),
    };

    // First deleted reference base / first inserted read base.
    let indel_ref = refindex + lead;
    let indel_read = readindex + lead;

    let payload: &[u8] = match ops[1] {
        Cigar::Del(len) => match refseq.get(indel_ref..indel_ref + len as usize) {
            Some(payload) => payload,
            None => return cigar.clone(),
        },
        Cigar::Ins(len) => match readseq.get(indel_read..indel_read + len as usize) {
            Some(payload) => payload,
            None => return cigar.clone(),
        },
        _ => return cigar.clone(),
    };
    if indel_ref > refseq.len() {
        return cigar.clone();
    }

    // Check every whole period of the indel sequence against the reference
    // immediately to its left. The shift is only valid when the period evenly
    // divides the indel length, and period 1 (a homopolymer) already yields
    // the maximum possible shift, so larger periods are skipped after it.
    // Insertions are checked against the reference too, never against the
    // read: a repeat on the reference is what makes the placement ambiguous.
    let indel_len = payload.len();
    let mut difference = 0usize;

    let mut period = 0usize;
    while period < indel_len {
        period = sequence_period(payload, period + 1);
        if indel_len % period != 0 {
            continue;
        }

        let mut new_index = indel_ref;
        while new_index >= period {
            let preceding = &refseq[new_index - period..new_index];
            let repeats = preceding
                .iter()
                .zip(&payload[..period])
                .all(|(&ref_base, &indel_base)| dna::is_regular(indel_base) && dna::same_base(ref_base, indel_base));
            if repeats {
                new_index -= period;
            } else {
                break;
            }
        }

        difference = difference.max(indel_ref - new_index);
        if period == 1 {
            break;
        }
    }

    if difference == 0 {
        return cigar.clone();
    }

    // A leading match shorter than the shift means the alignment itself is
    // malformed (the indel could have been represented shorter to begin
    // with); refuse to touch it rather than produce an invalid CIGAR.
    let new_lead = match lead.checked_sub(difference) {
        Some(new_lead) => new_lead,
        None => return cigar.clone(),
    };

    let mut realigned = Vec::with_capacity(ops.len() + 1);
    if new_lead > 0 {
        realigned.push(Cigar::Match(new_lead as u32));
    }
    realigned.push(ops[1]);

    // Matching bases that were left of the indel now sit after it; merge them
    // into a following match run when there is one.
    let rest = &ops[2..];
    match rest.first() {
        Some(Cigar::Match(len)) => {
            realigned.push(Cigar::Match(len + difference as u32));
            realigned.extend_from_slice(&rest[1..]);
        }
        Some(_) => {
            realigned.push(Cigar::Match(difference as u32));
            realigned.extend_from_slice(rest);
        }
        None => realigned.push(Cigar::Match(difference as u32)),
    }
    CigarString(realigned)
}

/// Smallest period of `seq` that is at least `start`: the minimal `p` such
/// that `seq[i] == seq[i - p]` for every `i >= p`. Falls back to the full
/// length when the sequence has no shorter repeat structure.
fn sequence_period(seq: &[u8], start: usize) -> usize {
    for period in start..seq.len() {
        if (period..seq.len()).all(|i| seq[i] == seq[i - period]) {
            return period;
        }
    }
    seq.len().max(start)
}
