use std::collections::HashMap;

use rust_htslib::bam::HeaderView;

/// Contig ordering table built once per run from the reference sequence
/// dictionary. Shared via `Arc` and never mutated afterwards, which makes
/// concurrent reads safe without locking.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ContigDict {
    names: Vec<String>,
    lengths: Vec<u64>,
    lookup: HashMap<String, u32>,
}

impl ContigDict {
    pub fn from_entries(entries: impl IntoIterator<Item = (String, u64)>) -> Self {
        let mut dict = ContigDict::default();
        for (name, length) in entries {
            let tid = dict.names.len() as u32;
            dict.lookup.insert(name.clone(), tid);
            dict.names.push(name);
            dict.lengths.push(length);
        }
        dict
    }

    /// Ordering as declared by an HTS header (reference dictionary order).
    pub fn from_hts_header(header: &HeaderView) -> Self {
        let entries = (0..header.target_count()).map(|tid| {
            let name = String::from_utf8_lossy(header.tid2name(tid)).to_string();
            let length = header.target_len(tid).unwrap_or(0);
            (name, length)
        });
        ContigDict::from_entries(entries)
    }

    #[inline]
    pub fn tid(&self, contig: &str) -> Option<u32> {
        self.lookup.get(contig).copied()
    }

    #[inline]
    pub fn name(&self, tid: u32) -> Option<&str> {
        self.names.get(tid as usize).map(|x| x.as_str())
    }

    #[inline]
    pub fn length(&self, tid: u32) -> Option<u64> {
        self.lengths.get(tid as usize).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering() {
        let dict = ContigDict::from_entries([("chr1".to_string(), 248), ("chr2".to_string(), 242)]);
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.tid("chr1"), Some(0));
        assert_eq!(dict.tid("chr2"), Some(1));
        assert_eq!(dict.tid("chrM"), None);
        assert_eq!(dict.name(1), Some("chr2"));
        assert_eq!(dict.length(0), Some(248));
        assert_eq!(dict.length(9), None);
    }

    #[test]
    fn empty() {
        let dict = ContigDict::default();
        assert!(dict.is_empty());
        assert_eq!(dict.tid("chr1"), None);
    }
}
