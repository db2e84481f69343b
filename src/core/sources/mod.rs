pub use mem::{MemRead, MemReads, MemReference};

use std::sync::Arc;

use crate::core::error::SourceError;
use crate::core::genome::{ContigDict, GenomeLoc};
use crate::core::read::AlignedRead;

mod mem;

/// Produces reads overlapping an interval, in ascending coordinate order.
/// Worker threads each own a clone, so implementations wrap their underlying
/// readers accordingly.
pub trait ReadSource<R: AlignedRead>: Clone + Send {
    fn fetch(&mut self, loc: &GenomeLoc) -> Result<Vec<R>, SourceError>;
}

/// Random-access base lookup plus the contig ordering table that anchors the
/// coordinate model for the whole run.
pub trait ReferenceSource: Clone + Send {
    fn dict(&self) -> Arc<ContigDict>;
    fn bases(&mut self, loc: &GenomeLoc) -> Result<Vec<u8>, SourceError>;
}
