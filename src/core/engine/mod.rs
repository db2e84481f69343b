pub use context::{EngineContext, Phase};
pub use partition::partition;
pub use traverse::{run_partition, PartitionCtx, PartitionFilter};

use std::marker::PhantomData;
use std::ops::DerefMut;

use log::debug;
use rayon::prelude::*;

use crate::core::error::{EngineError, IntervalError, ValidationError};
use crate::core::filtering::reads::{DownsampleByFraction, DownsampleToCoverage, FilterByQuality, SequentialFilter};
use crate::core::genome::GenomeLocSet;
use crate::core::read::AlignedRead;
use crate::core::rod::RodTrack;
use crate::core::sources::{ReadSource, ReferenceSource};
use crate::core::walker::{DataSource, Walker, WalkerContract};

use cache::ThreadCache;

mod cache;
mod context;
mod partition;
mod traverse;

#[derive(Debug, Clone, Copy)]
pub struct FilterConfig {
    pub min_mapq: u8,
    pub min_baseq: u8,
    /// Fraction of reads to keep; 1 disables downsampling.
    pub downsample: f64,
    /// Per-locus pileup depth cap; None leaves pileups untrimmed.
    pub coverage: Option<usize>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        FilterConfig { min_mapq: 0, min_baseq: 0, downsample: 1.0, coverage: None }
    }
}

impl FilterConfig {
    fn build<R: AlignedRead>(&self) -> PartitionFilter<R> {
        SequentialFilter::new(
            FilterByQuality::new(self.min_mapq, self.min_baseq),
            DownsampleByFraction::new(self.downsample),
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub threads: usize,
    pub filters: FilterConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig { threads: 1, filters: FilterConfig::default() }
    }
}

/// Everything one `execute` call consumes: the interval set to traverse and
/// whichever data sources the walker's contract asks for.
pub struct Inputs<R, RS, FS>
where
    R: AlignedRead,
    RS: ReadSource<R>,
    FS: ReferenceSource,
{
    intervals: GenomeLocSet,
    reads: Option<RS>,
    reference: Option<FS>,
    rods: Vec<RodTrack>,
    phantom: PhantomData<fn() -> R>,
}

impl<R, RS, FS> Inputs<R, RS, FS>
where
    R: AlignedRead,
    RS: ReadSource<R>,
    FS: ReferenceSource,
{
    pub fn new(intervals: GenomeLocSet) -> Self {
        Inputs { intervals, reads: None, reference: None, rods: vec![], phantom: Default::default() }
    }

    pub fn with_reads(mut self, reads: RS) -> Self {
        self.reads = Some(reads);
        self
    }

    pub fn with_reference(mut self, reference: FS) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn with_rod(mut self, track: RodTrack) -> Self {
        self.rods.push(track);
        self
    }

    #[inline]
    pub fn rods(&self) -> &[RodTrack] {
        &self.rods
    }
}

/// Checks a walker's contract against concrete inputs, in a fixed order:
/// missing required sources, disallowed sources, missing required metadata
/// bindings, disallowed bindings. Runs to completion before any partitioning
/// or thread spawning.
pub fn validate<R, RS, FS>(contract: &WalkerContract, inputs: &Inputs<R, RS, FS>) -> Result<(), ValidationError>
where
    R: AlignedRead,
    RS: ReadSource<R>,
    FS: ReferenceSource,
{
    let provided = [
        (DataSource::Reads, inputs.reads.is_some()),
        (DataSource::Reference, inputs.reference.is_some()),
    ];

    for (source, present) in provided {
        if contract.is_required(source) && !present {
            return Err(ValidationError::MissingRequiredInput { walker: contract.name().clone(), source });
        }
    }
    for (source, present) in provided {
        if present && !contract.is_allowed(source) {
            return Err(ValidationError::DisallowedInput { walker: contract.name().clone(), source });
        }
    }
    for required in contract.required_rods() {
        if !inputs.rods.iter().any(|x| x.binding().matches(&required.name, &required.kind)) {
            return Err(ValidationError::MissingBinding {
                walker: contract.name().clone(),
                name: required.name.clone(),
                kind: required.kind.clone(),
            });
        }
    }
    for track in &inputs.rods {
        if !contract.is_rod_allowed(track.binding()) {
            return Err(ValidationError::DisallowedBinding {
                walker: contract.name().clone(),
                name: track.binding().name.clone(),
                kind: track.binding().kind.clone(),
            });
        }
    }
    Ok(())
}

/// Drives a walker through the phase machine: validate → partition → run the
/// partitions on a dedicated rayon pool → combine partials in partition
/// order. The combine order never depends on thread scheduling, so the final
/// result is identical for any thread count.
pub struct Engine {
    context: EngineContext,
    config: EngineConfig,
}

impl Engine {
    pub fn new(context: EngineContext, config: EngineConfig) -> Self {
        Engine { context, config }
    }

    pub fn execute<R, RS, FS, T>(&self, walker: &Walker<R, T>, inputs: Inputs<R, RS, FS>) -> Result<T, EngineError>
    where
        R: AlignedRead,
        RS: ReadSource<R>,
        FS: ReferenceSource,
        T: Send,
    {
        self.execute_with(walker, inputs, |_, _: &T| ())
    }

    /// Same as `execute`, with a callback invoked after each finished
    /// partition (index and partial result) from the worker threads.
    pub fn execute_with<R, RS, FS, T, OnPartition>(
        &self,
        walker: &Walker<R, T>,
        inputs: Inputs<R, RS, FS>,
        on_partition: OnPartition,
    ) -> Result<T, EngineError>
    where
        R: AlignedRead,
        RS: ReadSource<R>,
        FS: ReferenceSource,
        T: Send,
        OnPartition: Fn(usize, &T) + Sync,
    {
        debug!("{} [{}]: {}", walker.contract().name(), Phase::Created, self.context.dict().len());

        validate(walker.contract(), &inputs)?;
        // The traversal category implies sources of its own, whether or not
        // the contract spelled them out; a run missing one must refuse here,
        // not die from a worker thread mid-traversal.
        for &source in walker.consumes() {
            let present = match source {
                DataSource::Reads => inputs.reads.is_some(),
                DataSource::Reference => inputs.reference.is_some(),
            };
            if !present {
                return Err(EngineError::Validation(ValidationError::MissingRequiredInput {
                    walker: walker.contract().name().clone(),
                    source,
                }));
            }
        }
        if let Some(reference) = &inputs.reference {
            if *reference.dict() != **self.context.dict() {
                return Err(EngineError::Interval(IntervalError::InconsistentOrdering(
                    "the reference dictionary differs from the run's contig ordering".to_string(),
                )));
            }
        }
        debug!("{} [{}]", walker.contract().name(), Phase::Validated);

        let threads = self.config.threads.max(1);
        let chunks = partition(&inputs.intervals, threads);
        debug!("{} [{}]: {} chunk(s)", walker.contract().name(), Phase::Partitioned, chunks.len());
        if chunks.is_empty() {
            return Ok(walker.init());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|x| EngineError::ThreadPool(x.to_string()))?;

        let prototype = PartitionCtx::new(
            inputs.reads,
            inputs.reference,
            self.config.filters.build(),
            self.config.filters.coverage.map(DownsampleToCoverage::new),
        );
        let ctxstore = ThreadCache::new(move || prototype.clone());

        debug!("{} [{}]", walker.contract().name(), Phase::Running);
        let partials: Result<Vec<T>, EngineError> = pool.install(|| {
            chunks
                .into_par_iter()
                .enumerate()
                .map(|(index, chunk)| {
                    let ctx = ctxstore.get();
                    let partial = run_partition(walker, &chunk, ctx.borrow_mut().deref_mut())
                        .map_err(|source| EngineError::Partition { partition: index, source })?;
                    on_partition(index, &partial);
                    Ok(partial)
                })
                .collect()
        });
        let partials = match partials {
            Ok(partials) => partials,
            Err(error) => {
                debug!("{} [{}]: {}", walker.contract().name(), Phase::Failed, error);
                return Err(error);
            }
        };

        debug!("{} [{}]", walker.contract().name(), Phase::Combining);
        let combined = partials.into_iter().fold(walker.init(), |accumulated, x| walker.reduce(accumulated, x));
        debug!("{} [{}]", walker.contract().name(), Phase::Completed);
        Ok(combined)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::core::genome::{ContigDict, GenomeLoc};
    use crate::core::rod::RodBinding;
    use crate::core::sources::{MemReads, MemReference};
    use crate::core::walker::LocusWalker;
    use crate::core::walker::LocusUnit;
    use crate::core::sources::MemRead;

    use super::*;

    fn dict() -> Arc<ContigDict> {
        Arc::new(ContigDict::from_entries([("chr1".to_string(), 1000)]))
    }

    fn inputs() -> Inputs<MemRead, MemReads, MemReference> {
        Inputs::new(GenomeLocSet::default())
    }

    fn contract() -> WalkerContract {
        WalkerContract::new("Dummy")
    }

    #[test]
    fn validation_order() {
        let contract = contract()
            .require(DataSource::Reads)
            .require_rod(RodBinding::new("dbsnp".to_string(), "vcf".to_string()));

        // Missing required source wins over missing binding.
        assert_eq!(
            validate(&contract, &inputs()).unwrap_err(),
            ValidationError::MissingRequiredInput { walker: "Dummy".to_string(), source: DataSource::Reads }
        );

        let with_reads = inputs().with_reads(MemReads::new(vec![]));
        assert_eq!(
            validate(&contract, &with_reads).unwrap_err(),
            ValidationError::MissingBinding {
                walker: "Dummy".to_string(),
                name: "dbsnp".to_string(),
                kind: "vcf".to_string()
            }
        );

        let satisfied = inputs()
            .with_reads(MemReads::new(vec![]))
            .with_rod(RodTrack::new(RodBinding::new("dbSNP".to_string(), "VCF".to_string())));
        assert!(validate(&contract, &satisfied).is_ok());
    }

    #[test]
    fn disallowed_source() {
        let contract = contract().allow_only(vec![DataSource::Reads]);
        let with_reference = inputs().with_reference(MemReference::new(vec![("chr1".to_string(), vec![b'A'; 1000])]));
        assert_eq!(
            validate(&contract, &with_reference).unwrap_err(),
            ValidationError::DisallowedInput { walker: "Dummy".to_string(), source: DataSource::Reference }
        );
    }

    #[test]
    fn disallowed_binding() {
        let contract = contract().allow_rods(vec![]);
        let with_rod = inputs().with_rod(RodTrack::new(RodBinding::new("mask".to_string(), "bed".to_string())));
        assert_eq!(
            validate(&contract, &with_rod).unwrap_err(),
            ValidationError::DisallowedBinding {
                walker: "Dummy".to_string(),
                name: "mask".to_string(),
                kind: "bed".to_string()
            }
        );
    }

    #[test]
    fn failed_validation_aborts_before_partitioning() {
        let engine = Engine::new(EngineContext::new(dict()).unwrap(), EngineConfig::default());
        let walker = LocusWalker::new(
            contract().require(DataSource::Reads),
            || 0usize,
            |unit: &LocusUnit<MemRead>| unit.pileup.len(),
            |accumulated, x| accumulated + x,
        );

        // Non-empty intervals, but no read source: must fail without running.
        let intervals =
            GenomeLocSet::merge_and_sort(vec![GenomeLoc::new(0, 1, 100)], &dict()).unwrap();
        let result = engine.execute(&walker, Inputs::<MemRead, MemReads, MemReference>::new(intervals));
        assert!(matches!(result, Err(EngineError::Validation(ValidationError::MissingRequiredInput { .. }))));
    }

    #[test]
    fn empty_intervals_yield_init() {
        let engine = Engine::new(EngineContext::new(dict()).unwrap(), EngineConfig::default());
        let walker = LocusWalker::new(
            contract(),
            || 42usize,
            |unit: &LocusUnit<MemRead>| unit.pileup.len(),
            |accumulated, x| accumulated + x,
        );
        let inputs = inputs()
            .with_reads(MemReads::new(vec![]))
            .with_reference(MemReference::new(vec![("chr1".to_string(), vec![b'A'; 1000])]));
        assert_eq!(engine.execute(&walker, inputs).unwrap(), 42);
    }

    #[test]
    fn category_implied_sources_are_checked_eagerly() {
        let engine = Engine::new(EngineContext::new(dict()).unwrap(), EngineConfig::default());
        // The contract declares nothing, but a pileup traversal cannot run
        // without a reference.
        let walker = LocusWalker::new(
            contract(),
            || 0usize,
            |unit: &LocusUnit<MemRead>| unit.pileup.len(),
            |accumulated, x| accumulated + x,
        );

        let intervals = GenomeLocSet::merge_and_sort(vec![GenomeLoc::new(0, 1, 100)], &dict()).unwrap();
        let result = engine.execute(
            &walker,
            Inputs::<MemRead, MemReads, MemReference>::new(intervals).with_reads(MemReads::new(vec![])),
        );
        assert_eq!(
            result.unwrap_err(),
            EngineError::Validation(ValidationError::MissingRequiredInput {
                walker: "Dummy".to_string(),
                source: DataSource::Reference
            })
        );
    }

    #[test]
    fn foreign_reference_dictionary_is_rejected() {
        let engine = Engine::new(EngineContext::new(dict()).unwrap(), EngineConfig::default());
        let walker = LocusWalker::new(
            contract(),
            || 0usize,
            |unit: &LocusUnit<MemRead>| unit.pileup.len(),
            |accumulated, x| accumulated + x,
        );

        let foreign = MemReference::new(vec![("chrX".to_string(), vec![b'A'; 10])]);
        let intervals = GenomeLocSet::merge_and_sort(vec![GenomeLoc::new(0, 1, 10)], &dict()).unwrap();
        let inputs =
            Inputs::<MemRead, MemReads, _>::new(intervals).with_reads(MemReads::new(vec![])).with_reference(foreign);
        let result = engine.execute(&walker, inputs);
        assert!(matches!(result, Err(EngineError::Interval(IntervalError::InconsistentOrdering(_)))));
    }
}
