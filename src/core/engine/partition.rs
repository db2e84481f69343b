use crate::core::genome::{GenomeLoc, GenomeLocSet};

/// Splits an interval set into at most `pieces` contiguous chunks balanced by
/// base-pair span. A single loc may be cut mid-range, but every genomic
/// position lands in exactly one chunk, so per-locus work is never repeated
/// across partitions.
pub fn partition(set: &GenomeLocSet, pieces: usize) -> Vec<GenomeLocSet> {
    let pieces = pieces.max(1);
    let total = set.span();
    if total == 0 {
        return vec![];
    }
    // Ceiling keeps the last chunk from degenerating into leftovers.
    let chunk = total.div_ceil(pieces as u64);

    let mut partitions = Vec::with_capacity(pieces);
    let mut current: Vec<GenomeLoc> = Vec::new();
    let mut filled = 0;

    for loc in set.iter() {
        let mut loc = *loc;
        loop {
            let room = chunk - filled;
            if loc.span() <= room {
                filled += loc.span();
                current.push(loc);
                if filled == chunk {
                    partitions.push(std::mem::take(&mut current).into_iter().collect());
                    filled = 0;
                }
                break;
            }
            let cut = loc.start() + room - 1;
            current.push(GenomeLoc::new(loc.contig(), loc.start(), cut));
            partitions.push(std::mem::take(&mut current).into_iter().collect());
            filled = 0;
            loc = GenomeLoc::new(loc.contig(), cut + 1, loc.stop());
        }
    }
    if !current.is_empty() {
        partitions.push(current.into_iter().collect());
    }
    partitions
}

#[cfg(test)]
mod tests {
    use crate::core::genome::ContigDict;

    use super::*;

    fn set(locs: Vec<GenomeLoc>) -> GenomeLocSet {
        let dict = ContigDict::from_entries([("chr1".to_string(), 10_000), ("chr2".to_string(), 10_000)]);
        GenomeLocSet::merge_and_sort(locs, &dict).unwrap()
    }

    fn flatten(partitions: &[GenomeLocSet]) -> Vec<GenomeLoc> {
        partitions.iter().flat_map(|x| x.iter().copied()).collect()
    }

    #[test]
    fn single_piece() {
        let intervals = set(vec![GenomeLoc::new(0, 1, 100), GenomeLoc::new(1, 50, 60)]);
        let partitions = partition(&intervals, 1);
        assert_eq!(partitions.len(), 1);
        assert_eq!(partitions[0], intervals);
    }

    #[test]
    fn splits_mid_loc() {
        let intervals = set(vec![GenomeLoc::new(0, 1, 100)]);
        let partitions = partition(&intervals, 4);
        assert_eq!(
            partitions.iter().map(|x| x.locs().to_vec()).collect::<Vec<_>>(),
            vec![
                vec![GenomeLoc::new(0, 1, 25)],
                vec![GenomeLoc::new(0, 26, 50)],
                vec![GenomeLoc::new(0, 51, 75)],
                vec![GenomeLoc::new(0, 76, 100)],
            ]
        );
    }

    #[test]
    fn covers_every_position_once() {
        let intervals = set(vec![
            GenomeLoc::new(0, 1, 37),
            GenomeLoc::new(0, 100, 103),
            GenomeLoc::new(1, 5, 64),
        ]);
        for pieces in [1, 2, 3, 7, 200] {
            let partitions = partition(&intervals, pieces);
            assert!(partitions.len() <= pieces);

            let merged = GenomeLocSet::merge_and_sort(
                flatten(&partitions),
                &ContigDict::from_entries([("chr1".to_string(), 10_000), ("chr2".to_string(), 10_000)]),
            )
            .unwrap();
            assert_eq!(merged, intervals, "pieces {}", pieces);
            assert_eq!(partitions.iter().map(|x| x.span()).sum::<u64>(), intervals.span());
        }
    }

    #[test]
    fn balanced_by_span() {
        let intervals = set(vec![GenomeLoc::new(0, 1, 1000)]);
        let partitions = partition(&intervals, 3);
        let spans: Vec<u64> = partitions.iter().map(|x| x.span()).collect();
        assert_eq!(spans, vec![334, 334, 332]);
    }

    #[test]
    fn empty_and_oversubscribed() {
        assert!(partition(&GenomeLocSet::default(), 8).is_empty());

        let intervals = set(vec![GenomeLoc::new(0, 10, 12)]);
        let partitions = partition(&intervals, 8);
        assert_eq!(partitions.len(), 3);
        assert!(partitions.iter().all(|x| x.span() == 1));
    }
}
