use std::collections::HashMap;
use std::sync::Arc;

use bio_types::strand::ReqStrand;
use rust_htslib::bam::record::{CigarString, CigarStringView};

use super::{ReadSource, ReferenceSource};
use crate::core::alignment::reference_span;
use crate::core::error::SourceError;
use crate::core::genome::{ContigDict, GenomeLoc};
use crate::core::read::{AlignedRead, SequencedRead};

/// Self-contained aligned read, the in-memory counterpart of an HTS record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemRead {
    name: Vec<u8>,
    contig: String,
    tid: i32,
    pos: i64,
    mapq: u8,
    flags: u16,
    cigar: CigarString,
    seq: Vec<u8>,
    qual: Vec<u8>,
}

impl MemRead {
    pub fn new(
        name: &str,
        contig: &str,
        tid: i32,
        pos: i64,
        cigar: CigarString,
        seq: &[u8],
        qual: &[u8],
    ) -> Self {
        debug_assert_eq!(seq.len(), qual.len());
        MemRead {
            name: name.as_bytes().to_vec(),
            contig: contig.to_string(),
            tid,
            pos,
            mapq: 60,
            flags: 0,
            cigar,
            seq: seq.to_vec(),
            qual: qual.to_vec(),
        }
    }

    pub fn with_mapq(mut self, mapq: u8) -> Self {
        self.mapq = mapq;
        self
    }

    pub fn with_flags(mut self, flags: u16) -> Self {
        self.flags = flags;
        self
    }
}

impl SequencedRead for MemRead {
    #[inline]
    fn name(&self) -> &[u8] {
        &self.name
    }

    #[inline]
    fn strand(&self) -> &ReqStrand {
        if self.flags & 0x10 != 0 {
            &ReqStrand::Reverse
        } else {
            &ReqStrand::Forward
        }
    }

    #[inline]
    fn seq(&self) -> Vec<u8> {
        self.seq.clone()
    }

    #[inline]
    fn qual(&self) -> &[u8] {
        &self.qual
    }

    #[inline]
    fn len(&self) -> usize {
        self.seq.len()
    }
}

impl AlignedRead for MemRead {
    #[inline]
    fn cigar(&self) -> CigarStringView {
        self.cigar.clone().into_view(self.pos)
    }

    #[inline]
    fn mapq(&self) -> u8 {
        self.mapq
    }

    #[inline]
    fn pos(&self) -> i64 {
        self.pos
    }

    #[inline]
    fn tid(&self) -> i32 {
        self.tid
    }

    #[inline]
    fn contig(&self) -> &str {
        &self.contig
    }

    #[inline]
    fn flags(&self) -> u16 {
        self.flags
    }
}

/// Coordinate-sorted pool of in-memory reads. Clones share the pool through an
/// `Arc`, so handing one to every worker thread is cheap.
#[derive(Debug, Clone)]
pub struct MemReads {
    reads: Arc<Vec<MemRead>>,
}

impl MemReads {
    pub fn new(mut reads: Vec<MemRead>) -> Self {
        reads.sort_by_key(|x| (x.tid(), x.pos()));
        MemReads { reads: Arc::new(reads) }
    }
}

impl ReadSource<MemRead> for MemReads {
    fn fetch(&mut self, loc: &GenomeLoc) -> Result<Vec<MemRead>, SourceError> {
        let hits = self
            .reads
            .iter()
            .filter(|x| {
                if x.tid() < 0 || x.tid() as u32 != loc.contig() || x.pos() < 0 {
                    return false;
                }
                let start = x.pos() as u64 + 1;
                let refspan = reference_span(&x.cigar);
                if refspan == 0 {
                    return false;
                }
                let stop = start + refspan - 1;
                start <= loc.stop() && loc.start() <= stop
            })
            .cloned()
            .collect();
        Ok(hits)
    }
}

/// Reference held fully in memory, one byte vector per contig. The dictionary
/// is derived from the insertion order of the sequences.
#[derive(Debug, Clone)]
pub struct MemReference {
    dict: Arc<ContigDict>,
    seqs: Arc<HashMap<u32, Vec<u8>>>,
}

impl MemReference {
    pub fn new(contigs: Vec<(String, Vec<u8>)>) -> Self {
        let dict = ContigDict::from_entries(
            contigs.iter().map(|(name, seq)| (name.clone(), seq.len() as u64)),
        );
        let seqs = contigs
            .into_iter()
            .enumerate()
            .map(|(tid, (_, seq))| (tid as u32, seq))
            .collect();
        MemReference { dict: Arc::new(dict), seqs: Arc::new(seqs) }
    }
}

impl ReferenceSource for MemReference {
    #[inline]
    fn dict(&self) -> Arc<ContigDict> {
        self.dict.clone()
    }

    fn bases(&mut self, loc: &GenomeLoc) -> Result<Vec<u8>, SourceError> {
        let seq = self.seqs.get(&loc.contig()).ok_or_else(|| {
            SourceError::new("reference", format!("unknown contig index {}", loc.contig()))
        })?;
        if loc.start() == 0 || loc.stop() as usize > seq.len() {
            return Err(SourceError::new(
                "reference",
                format!("{} is outside the contig (length {})", loc, seq.len()),
            ));
        }
        Ok(seq[loc.start() as usize - 1..loc.stop() as usize].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use rust_htslib::bam::record::Cigar;

    use super::*;

    fn reference() -> MemReference {
        MemReference::new(vec![
            ("chr1".to_string(), b"ACGTACGTAC".to_vec()),
            ("chr2".to_string(), b"TTTTT".to_vec()),
        ])
    }

    #[test]
    fn reference_slicing() {
        let mut reference = reference();
        assert_eq!(reference.dict().tid("chr2"), Some(1));
        assert_eq!(reference.bases(&GenomeLoc::new(0, 1, 4)).unwrap(), b"ACGT");
        assert_eq!(reference.bases(&GenomeLoc::new(0, 9, 10)).unwrap(), b"AC");
        assert_eq!(reference.bases(&GenomeLoc::new(1, 1, 5)).unwrap(), b"TTTTT");

        assert!(reference.bases(&GenomeLoc::new(0, 5, 11)).is_err());
        assert!(reference.bases(&GenomeLoc::new(9, 1, 2)).is_err());
    }

    #[test]
    fn fetch_by_overlap() {
        let mut reads = MemReads::new(vec![
            MemRead::new("r2", "chr1", 0, 6, CigarString(vec![Cigar::Match(4)]), b"GTAC", &[30; 4]),
            MemRead::new("r1", "chr1", 0, 0, CigarString(vec![Cigar::Match(4)]), b"ACGT", &[30; 4]),
            MemRead::new("r3", "chr2", 1, 0, CigarString(vec![Cigar::Match(5)]), b"TTTTT", &[30; 5]),
        ]);

        // r1 spans 1-4, r2 spans 7-10.
        let hits = reads.fetch(&GenomeLoc::new(0, 1, 10)).unwrap();
        assert_eq!(hits.iter().map(|x| x.name()).collect::<Vec<_>>(), vec![b"r1", b"r2"]);

        let hits = reads.fetch(&GenomeLoc::new(0, 5, 6)).unwrap();
        assert!(hits.is_empty());

        let hits = reads.fetch(&GenomeLoc::new(0, 4, 7)).unwrap();
        assert_eq!(hits.iter().map(|x| x.name()).collect::<Vec<_>>(), vec![b"r1", b"r2"]);

        let hits = reads.fetch(&GenomeLoc::new(1, 2, 3)).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name(), b"r3");
    }

    #[test]
    fn fetch_skips_unplaced() {
        let unmapped =
            MemRead::new("u", "chr1", -1, -1, CigarString(vec![]), b"ACGT", &[30; 4]).with_flags(0x4);
        let mut reads = MemReads::new(vec![unmapped]);
        assert!(reads.fetch(&GenomeLoc::new(0, 1, 100)).unwrap().is_empty());
    }
}
