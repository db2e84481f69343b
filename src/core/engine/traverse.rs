use itertools::Itertools;

use crate::core::alignment::{is_unmapped, read_offset_at};
use crate::core::dna::Nucleotide;
use crate::core::error::SourceError;
use crate::core::filtering::reads::{
    DownsampleByFraction, DownsampleToCoverage, FilterByQuality, ReadsFilter, SequentialFilter,
};
use crate::core::genome::{GenomeLoc, GenomeLocSet};
use crate::core::read::AlignedRead;
use crate::core::sources::{ReadSource, ReferenceSource};
use crate::core::walker::{DuplicateUnit, LocusUnit, ReadUnit, Walker, WindowUnit};

pub type PartitionFilter<R> = SequentialFilter<R, FilterByQuality, DownsampleByFraction>;

/// Everything one worker thread needs to process partitions: its own source
/// handles plus the read filter. Built once per thread from a shared
/// prototype; threads never exchange contexts.
pub struct PartitionCtx<R, RS, FS>
where
    R: AlignedRead,
    RS: ReadSource<R>,
    FS: ReferenceSource,
{
    reads: Option<RS>,
    reference: Option<FS>,
    filter: PartitionFilter<R>,
    coverage: Option<DownsampleToCoverage>,
}

impl<R, RS, FS> PartitionCtx<R, RS, FS>
where
    R: AlignedRead,
    RS: ReadSource<R>,
    FS: ReferenceSource,
{
    pub fn new(
        reads: Option<RS>,
        reference: Option<FS>,
        filter: PartitionFilter<R>,
        coverage: Option<DownsampleToCoverage>,
    ) -> Self {
        PartitionCtx { reads, reference, filter, coverage }
    }

    /// Overlapping, mapped reads that survived the read filter, in ascending
    /// coordinate order.
    fn fetch(&mut self, loc: &GenomeLoc) -> Result<Vec<R>, SourceError> {
        let source = match self.reads.as_mut() {
            Some(source) => source,
            None => return Err(SourceError::new("traversal", "no read source attached")),
        };
        let mut reads = source.fetch(loc)?;
        reads.retain(|x| !is_unmapped(x) && self.filter.is_read_ok(x));
        Ok(reads)
    }

    fn bases(&mut self, loc: &GenomeLoc) -> Result<Vec<u8>, SourceError> {
        match self.reference.as_mut() {
            Some(source) => source.bases(loc),
            None => Err(SourceError::new("traversal", "no reference source attached")),
        }
    }
}

impl<R, RS, FS> Clone for PartitionCtx<R, RS, FS>
where
    R: AlignedRead,
    RS: ReadSource<R>,
    FS: ReferenceSource,
{
    fn clone(&self) -> Self {
        PartitionCtx {
            reads: self.reads.clone(),
            reference: self.reference.clone(),
            filter: self.filter,
            coverage: self.coverage,
        }
    }
}

/// True when the alignment is anchored (starts) inside `loc`. Dispatching by
/// the start keeps a boundary-straddling read in exactly one partition even
/// though every overlapped partition fetches it.
#[inline]
fn starts_within<R: AlignedRead>(read: &R, loc: &GenomeLoc) -> bool {
    read.tid() >= 0 && loc.contains_position(read.tid() as u32, read.pos() as u64 + 1)
}

/// Runs one partition start to finish: ascending over its locs, building the
/// walker's units and threading the partial result through map/reduce.
pub fn run_partition<R, RS, FS, T>(
    walker: &Walker<R, T>,
    chunk: &GenomeLocSet,
    ctx: &mut PartitionCtx<R, RS, FS>,
) -> Result<T, SourceError>
where
    R: AlignedRead,
    RS: ReadSource<R>,
    FS: ReferenceSource,
{
    match walker {
        Walker::Locus(w) => {
            let mut partial = (w.init)();
            for loc in chunk.iter() {
                let reads = ctx.fetch(loc)?;
                let refbases = ctx.bases(loc)?;
                for (index, position) in (loc.start()..=loc.stop()).enumerate() {
                    let mut pileup: Vec<&R> = reads
                        .iter()
                        .filter(|&read| match read_offset_at(read, position) {
                            Some(offset) => ctx.filter.is_base_ok(read, offset),
                            None => false,
                        })
                        .collect();
                    if let Some(coverage) = &ctx.coverage {
                        pileup = coverage.cap(pileup);
                    }
                    let unit = LocusUnit {
                        locus: GenomeLoc::new(loc.contig(), position, position),
                        refbase: Nucleotide::from(refbases[index]),
                        pileup,
                    };
                    partial = (w.reduce)(partial, (w.map)(&unit));
                }
            }
            Ok(partial)
        }
        Walker::LocusWindow(w) => {
            let mut partial = (w.init)();
            for loc in chunk.iter() {
                let reads = ctx.fetch(loc)?;
                let refseq = ctx.bases(loc)?;
                let unit = WindowUnit { window: *loc, refseq: &refseq, reads: &reads };
                partial = (w.reduce)(partial, (w.map)(&unit));
            }
            Ok(partial)
        }
        Walker::Read(w) => {
            let mut partial = (w.init)();
            for loc in chunk.iter() {
                let reads = ctx.fetch(loc)?;
                for read in reads.iter().filter(|x| starts_within(*x, loc)) {
                    partial = (w.reduce)(partial, (w.map)(&ReadUnit { read }));
                }
            }
            Ok(partial)
        }
        Walker::Duplicate(w) => {
            let mut partial = (w.init)();
            for loc in chunk.iter() {
                let reads = ctx.fetch(loc)?;
                let anchored = reads.iter().filter(|x| starts_within(*x, loc));
                for (start, group) in &anchored.chunk_by(|x| x.pos()) {
                    let site = GenomeLoc::new(loc.contig(), start as u64 + 1, start as u64 + 1);
                    let (duplicates, uniques) = group.partition(|x| x.is_duplicate());
                    let unit = DuplicateUnit { site, duplicates, uniques };
                    partial = (w.reduce)(partial, (w.map)(&unit));
                }
            }
            Ok(partial)
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_htslib::bam::record::{Cigar, CigarString};

    use crate::core::genome::ContigDict;
    use crate::core::read::SequencedRead;
    use crate::core::sources::{MemRead, MemReads, MemReference};
    use crate::core::walker::{DuplicateWalker, LocusWalker, LocusWindowWalker, ReadWalker, WalkerContract};

    use super::*;

    fn reference() -> MemReference {
        MemReference::new(vec![("chr1".to_string(), b"ACGTACGTACGTACGTACGT".to_vec())])
    }

    fn read(name: &str, pos: i64, seq: &[u8], qual: &[u8]) -> MemRead {
        let cigar = CigarString(vec![Cigar::Match(seq.len() as u32)]);
        MemRead::new(name, "chr1", 0, pos, cigar, seq, qual)
    }

    fn ctx(reads: Vec<MemRead>, filters: PartitionFilter<MemRead>) -> PartitionCtx<MemRead, MemReads, MemReference> {
        PartitionCtx::new(Some(MemReads::new(reads)), Some(reference()), filters, None)
    }

    fn lenient() -> PartitionFilter<MemRead> {
        SequentialFilter::new(FilterByQuality::new(0, 0), DownsampleByFraction::new(1.0))
    }

    fn chunk(locs: Vec<GenomeLoc>) -> GenomeLocSet {
        let dict = ContigDict::from_entries([("chr1".to_string(), 20)]);
        GenomeLocSet::merge_and_sort(locs, &dict).unwrap()
    }

    #[test]
    fn locus_coverage() {
        // r1 spans 1-4, r2 spans 3-6.
        let reads = vec![read("r1", 0, b"ACGT", &[30; 4]), read("r2", 2, b"GTAC", &[30; 4])];
        let walker = LocusWalker::new(
            WalkerContract::new("Coverage"),
            Vec::new,
            |unit: &LocusUnit<MemRead>| vec![(unit.locus.start(), unit.refbase, unit.pileup.len())],
            |mut acc, mut x| {
                acc.append(&mut x);
                acc
            },
        );

        let result = run_partition(&walker, &chunk(vec![GenomeLoc::new(0, 1, 7)]), &mut ctx(reads, lenient())).unwrap();
        assert_eq!(
            result,
            vec![
                (1, Nucleotide::A, 1),
                (2, Nucleotide::C, 1),
                (3, Nucleotide::G, 2),
                (4, Nucleotide::T, 2),
                (5, Nucleotide::A, 1),
                (6, Nucleotide::C, 1),
                (7, Nucleotide::G, 0),
            ]
        );
    }

    #[test]
    fn locus_base_filter() {
        // Low-quality bases fall out of the pileup, the read itself stays.
        let reads = vec![read("r1", 0, b"ACGT", &[30, 2, 30, 2])];
        let filter = SequentialFilter::new(FilterByQuality::new(0, 20), DownsampleByFraction::new(1.0));
        let walker = LocusWalker::new(
            WalkerContract::new("Coverage"),
            Vec::new,
            |unit: &LocusUnit<MemRead>| vec![unit.pileup.len()],
            |mut acc, mut x| {
                acc.append(&mut x);
                acc
            },
        );

        let result = run_partition(&walker, &chunk(vec![GenomeLoc::new(0, 1, 4)]), &mut ctx(reads, filter)).unwrap();
        assert_eq!(result, vec![1, 0, 1, 0]);
    }

    #[test]
    fn locus_coverage_cap() {
        // Five identical-placement reads; a cap of 2 trims every covered
        // locus to the same two survivors.
        let reads: Vec<MemRead> = (0..5).map(|i| read(&format!("read-{}", i), 0, b"ACGT", &[30; 4])).collect();
        let walker = LocusWalker::new(
            WalkerContract::new("Coverage"),
            Vec::new,
            |unit: &LocusUnit<MemRead>| {
                vec![unit.pileup.iter().map(|x| x.name().to_vec()).collect::<Vec<_>>()]
            },
            |mut acc: Vec<Vec<Vec<u8>>>, mut x| {
                acc.append(&mut x);
                acc
            },
        );

        let mut ctx = PartitionCtx::new(
            Some(MemReads::new(reads)),
            Some(reference()),
            lenient(),
            Some(DownsampleToCoverage::new(2)),
        );
        let result = run_partition(&walker, &chunk(vec![GenomeLoc::new(0, 1, 4)]), &mut ctx).unwrap();
        assert_eq!(result.len(), 4);
        assert!(result.iter().all(|pileup| pileup.len() == 2));
        assert!(result.iter().all(|pileup| pileup == &result[0]), "same survivors at every locus");
    }

    #[test]
    fn window_units() {
        let reads = vec![read("r1", 0, b"ACGT", &[30; 4]), read("r2", 9, b"GTAC", &[30; 4])];
        let walker = LocusWindowWalker::new(
            WalkerContract::new("Windows"),
            Vec::new,
            |unit: &WindowUnit<MemRead>| vec![(unit.window, unit.refseq.to_vec(), unit.reads.len())],
            |mut acc, mut x| {
                acc.append(&mut x);
                acc
            },
        );

        let chunk = chunk(vec![GenomeLoc::new(0, 1, 5), GenomeLoc::new(0, 8, 12)]);
        let result = run_partition(&walker, &chunk, &mut ctx(reads, lenient())).unwrap();
        assert_eq!(
            result,
            vec![
                (GenomeLoc::new(0, 1, 5), b"ACGTA".to_vec(), 1),
                (GenomeLoc::new(0, 8, 12), b"CGTAC".to_vec(), 1),
            ]
        );
    }

    #[test]
    fn read_units_anchored_by_start() {
        // r1 starts at 3 and straddles the chunk boundary at 5; only the
        // chunk holding position 3 may dispatch it.
        let reads = vec![read("r1", 2, b"GTACGT", &[30; 6]), read("r2", 5, b"CGT", &[30; 3])];
        let walker = || {
            ReadWalker::new(
                WalkerContract::new("Names"),
                Vec::new,
                |unit: &ReadUnit<MemRead>| vec![String::from_utf8_lossy(unit.read.name()).to_string()],
                |mut acc: Vec<String>, mut x| {
                    acc.append(&mut x);
                    acc
                },
            )
        };

        let left = run_partition(&walker(), &chunk(vec![GenomeLoc::new(0, 1, 5)]), &mut ctx(reads.clone(), lenient()))
            .unwrap();
        let right =
            run_partition(&walker(), &chunk(vec![GenomeLoc::new(0, 6, 10)]), &mut ctx(reads, lenient())).unwrap();
        assert_eq!(left, vec!["r1".to_string()]);
        assert_eq!(right, vec!["r2".to_string()]);
    }

    #[test]
    fn duplicate_groups() {
        let reads = vec![
            read("r1", 2, b"GTAC", &[30; 4]),
            read("r2", 2, b"GTAC", &[30; 4]).with_flags(0x400),
            read("r3", 2, b"GTAC", &[30; 4]).with_flags(0x400),
            read("r4", 8, b"GTAC", &[30; 4]),
        ];
        let walker = DuplicateWalker::new(
            WalkerContract::new("Duplicates"),
            Vec::new,
            |unit: &DuplicateUnit<MemRead>| vec![(unit.site.start(), unit.duplicates.len(), unit.uniques.len())],
            |mut acc, mut x| {
                acc.append(&mut x);
                acc
            },
        );

        let result =
            run_partition(&walker, &chunk(vec![GenomeLoc::new(0, 1, 20)]), &mut ctx(reads, lenient())).unwrap();
        assert_eq!(result, vec![(3, 2, 1), (9, 0, 1)]);
    }

    #[test]
    fn missing_source_is_an_error() {
        let walker = LocusWalker::new(
            WalkerContract::new("Coverage"),
            || 0usize,
            |unit: &LocusUnit<MemRead>| unit.pileup.len(),
            |acc, x| acc + x,
        );
        let mut ctx: PartitionCtx<MemRead, MemReads, MemReference> = PartitionCtx::new(None, None, lenient(), None);
        let err = run_partition(&walker, &chunk(vec![GenomeLoc::new(0, 1, 4)]), &mut ctx).unwrap_err();
        assert_eq!(err.context, "traversal");
    }
}
