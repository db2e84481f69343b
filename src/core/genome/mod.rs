pub use contigs::ContigDict;
pub use loc::GenomeLoc;
pub use parse::GenomeLocParser;
pub use set::GenomeLocSet;

mod contigs;
mod loc;
mod parse;
mod set;
