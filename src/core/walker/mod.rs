pub use contract::{DataSource, WalkerContract};

use crate::core::dna::Nucleotide;
use crate::core::genome::GenomeLoc;
use crate::core::read::AlignedRead;

mod contract;

pub type InitFn<T> = Box<dyn Fn() -> T + Send + Sync>;
pub type ReduceFn<T> = Box<dyn Fn(T, T) -> T + Send + Sync>;
pub type LocusMapFn<R, T> = Box<dyn for<'a> Fn(&LocusUnit<'a, R>) -> T + Send + Sync>;
pub type WindowMapFn<R, T> = Box<dyn for<'a> Fn(&WindowUnit<'a, R>) -> T + Send + Sync>;
pub type ReadMapFn<R, T> = Box<dyn for<'a> Fn(&ReadUnit<'a, R>) -> T + Send + Sync>;
pub type DuplicateMapFn<R, T> = Box<dyn for<'a> Fn(&DuplicateUnit<'a, R>) -> T + Send + Sync>;

/// One genomic position with its pileup: every read covering the locus whose
/// covering base survived the configured base filter.
pub struct LocusUnit<'a, R: AlignedRead> {
    pub locus: GenomeLoc,
    pub refbase: Nucleotide,
    pub pileup: Vec<&'a R>,
}

/// One contiguous interval with its reference slice and overlapping reads.
pub struct WindowUnit<'a, R: AlignedRead> {
    pub window: GenomeLoc,
    pub refseq: &'a [u8],
    pub reads: &'a [R],
}

pub struct ReadUnit<'a, R: AlignedRead> {
    pub read: &'a R,
}

/// Reads sharing one alignment start, split by the duplicate flag.
pub struct DuplicateUnit<'a, R: AlignedRead> {
    pub site: GenomeLoc,
    pub duplicates: Vec<&'a R>,
    pub uniques: Vec<&'a R>,
}

pub struct LocusWalker<R: AlignedRead, T> {
    pub contract: WalkerContract,
    pub init: InitFn<T>,
    pub map: LocusMapFn<R, T>,
    pub reduce: ReduceFn<T>,
}

pub struct LocusWindowWalker<R: AlignedRead, T> {
    pub contract: WalkerContract,
    pub init: InitFn<T>,
    pub map: WindowMapFn<R, T>,
    pub reduce: ReduceFn<T>,
}

pub struct ReadWalker<R: AlignedRead, T> {
    pub contract: WalkerContract,
    pub init: InitFn<T>,
    pub map: ReadMapFn<R, T>,
    pub reduce: ReduceFn<T>,
}

pub struct DuplicateWalker<R: AlignedRead, T> {
    pub contract: WalkerContract,
    pub init: InitFn<T>,
    pub map: DuplicateMapFn<R, T>,
    pub reduce: ReduceFn<T>,
}

/// A pluggable analysis module: a per-unit map function and a reduce/combine
/// function over genomic data, plus the contract describing what the module
/// needs. A closed set of traversal categories selected by explicit matching;
/// the engine partitions and iterates differently per category but threads
/// the partial result identically through init → map → reduce.
pub enum Walker<R: AlignedRead, T> {
    Locus(LocusWalker<R, T>),
    LocusWindow(LocusWindowWalker<R, T>),
    Read(ReadWalker<R, T>),
    Duplicate(DuplicateWalker<R, T>),
}

impl<R: AlignedRead, T> Walker<R, T> {
    /// Data sources the traversal of this category consumes, whether or not
    /// the contract declares them: pileups and windows cannot be built
    /// without reads and a reference, read/duplicate iteration without reads.
    pub fn consumes(&self) -> &'static [DataSource] {
        match self {
            Walker::Locus(_) | Walker::LocusWindow(_) => &[DataSource::Reads, DataSource::Reference],
            Walker::Read(_) | Walker::Duplicate(_) => &[DataSource::Reads],
        }
    }

    pub fn contract(&self) -> &WalkerContract {
        match self {
            Walker::Locus(walker) => &walker.contract,
            Walker::LocusWindow(walker) => &walker.contract,
            Walker::Read(walker) => &walker.contract,
            Walker::Duplicate(walker) => &walker.contract,
        }
    }

    pub fn init(&self) -> T {
        match self {
            Walker::Locus(walker) => (walker.init)(),
            Walker::LocusWindow(walker) => (walker.init)(),
            Walker::Read(walker) => (walker.init)(),
            Walker::Duplicate(walker) => (walker.init)(),
        }
    }

    pub fn reduce(&self, accumulated: T, current: T) -> T {
        match self {
            Walker::Locus(walker) => (walker.reduce)(accumulated, current),
            Walker::LocusWindow(walker) => (walker.reduce)(accumulated, current),
            Walker::Read(walker) => (walker.reduce)(accumulated, current),
            Walker::Duplicate(walker) => (walker.reduce)(accumulated, current),
        }
    }
}

impl<R: AlignedRead, T> LocusWalker<R, T> {
    pub fn new(
        contract: WalkerContract,
        init: impl Fn() -> T + Send + Sync + 'static,
        map: impl for<'a> Fn(&LocusUnit<'a, R>) -> T + Send + Sync + 'static,
        reduce: impl Fn(T, T) -> T + Send + Sync + 'static,
    ) -> Walker<R, T> {
        Walker::Locus(LocusWalker { contract, init: Box::new(init), map: Box::new(map), reduce: Box::new(reduce) })
    }
}

impl<R: AlignedRead, T> LocusWindowWalker<R, T> {
    pub fn new(
        contract: WalkerContract,
        init: impl Fn() -> T + Send + Sync + 'static,
        map: impl for<'a> Fn(&WindowUnit<'a, R>) -> T + Send + Sync + 'static,
        reduce: impl Fn(T, T) -> T + Send + Sync + 'static,
    ) -> Walker<R, T> {
        Walker::LocusWindow(LocusWindowWalker {
            contract,
            init: Box::new(init),
            map: Box::new(map),
            reduce: Box::new(reduce),
        })
    }
}

impl<R: AlignedRead, T> ReadWalker<R, T> {
    pub fn new(
        contract: WalkerContract,
        init: impl Fn() -> T + Send + Sync + 'static,
        map: impl for<'a> Fn(&ReadUnit<'a, R>) -> T + Send + Sync + 'static,
        reduce: impl Fn(T, T) -> T + Send + Sync + 'static,
    ) -> Walker<R, T> {
        Walker::Read(ReadWalker { contract, init: Box::new(init), map: Box::new(map), reduce: Box::new(reduce) })
    }
}

impl<R: AlignedRead, T> DuplicateWalker<R, T> {
    pub fn new(
        contract: WalkerContract,
        init: impl Fn() -> T + Send + Sync + 'static,
        map: impl for<'a> Fn(&DuplicateUnit<'a, R>) -> T + Send + Sync + 'static,
        reduce: impl Fn(T, T) -> T + Send + Sync + 'static,
    ) -> Walker<R, T> {
        Walker::Duplicate(DuplicateWalker {
            contract,
            init: Box::new(init),
            map: Box::new(map),
            reduce: Box::new(reduce),
        })
    }
}
