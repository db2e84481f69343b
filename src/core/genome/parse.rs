use std::fs::File;
use std::io;
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use flate2::bufread::GzDecoder;

use super::contigs::ContigDict;
use super::loc::GenomeLoc;
use super::set::GenomeLocSet;
use crate::core::error::IntervalError;

/// Turns textual regions into `GenomeLoc`s against a fixed contig ordering.
///
/// Grammar: `contig`, `contig:start` and `contig:start-stop`, 1-based
/// inclusive; thousands separators in positions are tolerated.
#[derive(Clone)]
pub struct GenomeLocParser {
    dict: Arc<ContigDict>,
}

impl GenomeLocParser {
    pub fn new(dict: Arc<ContigDict>) -> Result<Self, IntervalError> {
        if dict.is_empty() {
            return Err(IntervalError::OrderingNotInitialized);
        }
        Ok(GenomeLocParser { dict })
    }

    #[inline]
    pub fn dict(&self) -> &Arc<ContigDict> {
        &self.dict
    }

    pub fn parse(&self, region: &str) -> Result<GenomeLoc, IntervalError> {
        let malformed = |reason: &str| IntervalError::MalformedInterval {
            interval: region.to_string(),
            reason: reason.to_string(),
        };

        let region = region.trim();
        if region.is_empty() {
            return Err(malformed("empty region"));
        }

        let (contig, range) = match region.split_once(':') {
            Some((contig, range)) => (contig, Some(range)),
            None => (region, None),
        };

        let tid = self.dict.tid(contig).ok_or_else(|| malformed("unknown contig"))?;
        let length = self.dict.length(tid).unwrap_or(u64::MAX);

        let (start, stop) = match range {
            None => (1, length),
            Some(range) => {
                let parse = |x: &str| {
                    x.replace(',', "").parse::<u64>().map_err(|_| malformed("positions must be positive integers"))
                };
                match range.split_once('-') {
                    None => {
                        let start = parse(range)?;
                        (start, start)
                    }
                    Some((start, stop)) => (parse(start)?, parse(stop)?),
                }
            }
        };

        if start == 0 {
            return Err(malformed("positions are 1-based"));
        }
        if start > stop {
            return Err(malformed("start must not exceed stop"));
        }
        if stop > length {
            return Err(malformed("stop lies beyond the contig end"));
        }
        Ok(GenomeLoc::new(tid, start, stop))
    }

    /// Each input is either a path to a region file (one region per line,
    /// gzip transparently handled) or a literal region string. A failed parse
    /// leaves nothing behind: the set is built only once every input is good.
    pub fn parse_intervals<S: AsRef<str>>(&self, inputs: &[S]) -> Result<GenomeLocSet, IntervalError> {
        let mut locs = Vec::new();
        for input in inputs {
            let input = input.as_ref();
            if Path::new(input).exists() {
                locs.extend(self.parse_file(input.as_ref())?);
            } else {
                locs.push(self.parse(input)?);
            }
        }
        GenomeLocSet::merge_and_sort(locs, &self.dict)
    }

    fn parse_file(&self, path: &Path) -> Result<Vec<GenomeLoc>, IntervalError> {
        let ioerr = |e: io::Error| IntervalError::MalformedInterval {
            interval: path.display().to_string(),
            reason: e.to_string(),
        };

        let file = File::open(path).map_err(ioerr)?;
        let file = io::BufReader::new(file);

        let gzipped = path.extension().is_some_and(|x| x == "gz" || x == "gzip");
        if gzipped {
            self.parse_lines(io::BufReader::new(GzDecoder::new(file)), path).map_err(ioerr)
        } else {
            self.parse_lines(file, path).map_err(ioerr)
        }
    }

    fn parse_lines<T: BufRead>(&self, mut reader: T, path: &Path) -> io::Result<Vec<GenomeLoc>> {
        let mut locs = Vec::new();
        let mut buf = String::new();
        while reader.read_line(&mut buf)? != 0 {
            let line = buf.trim();
            if !line.is_empty() && !line.starts_with('#') {
                let loc = self
                    .parse(line)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("{}: {}", path.display(), e)))?;
                locs.push(loc);
            }
            buf.clear();
        }
        Ok(locs)
    }
}
