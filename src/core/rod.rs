use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use bio::data_structures::interval_tree::ArrayBackedIntervalTree;
use derive_more::Constructor;

use crate::core::genome::GenomeLoc;

/// Named, typed handle to one reference-ordered-data input. Matching is by
/// name and kind, case-insensitively, the way walkers declare the metadata
/// they require or tolerate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Constructor)]
pub struct RodBinding {
    pub name: String,
    pub kind: String,
}

impl RodBinding {
    #[inline]
    pub fn matches(&self, name: &str, kind: &str) -> bool {
        self.name.eq_ignore_ascii_case(name) && self.kind.eq_ignore_ascii_case(kind)
    }
}

impl Display for RodBinding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.name, self.kind)
    }
}

/// Interval-keyed auxiliary annotations for one binding. The engine only ever
/// consults the binding for validation; the payloads are handed through
/// unopened to walkers that asked for them.
pub struct RodTrack {
    binding: RodBinding,
    index: HashMap<u32, ArrayBackedIntervalTree<u64, String>>,
    indexed: bool,
}

impl RodTrack {
    pub fn new(binding: RodBinding) -> Self {
        RodTrack { binding, index: HashMap::new(), indexed: true }
    }

    #[inline]
    pub fn binding(&self) -> &RodBinding {
        &self.binding
    }

    pub fn insert(&mut self, loc: GenomeLoc, payload: String) {
        self.index.entry(loc.contig()).or_insert_with(ArrayBackedIntervalTree::new).insert(
            loc.start()..loc.stop() + 1,
            payload,
        );
        self.indexed = false;
    }

    /// Must be called once after the last `insert` and before any `find`.
    pub fn index(&mut self) {
        for tree in self.index.values_mut() {
            tree.index();
        }
        self.indexed = true;
    }

    pub fn find(&self, loc: &GenomeLoc) -> Vec<String> {
        debug_assert!(self.indexed);
        match self.index.get(&loc.contig()) {
            Some(tree) => tree.find(loc.start()..loc.stop() + 1).iter().map(|x| x.data().clone()).collect(),
            None => vec![],
        }
    }
}
