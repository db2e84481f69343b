use std::fmt::{Display, Formatter};

use derive_getters::Getters;

use crate::core::rod::RodBinding;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataSource {
    Reads,
    Reference,
}

impl Display for DataSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::Reads => write!(f, "reads"),
            DataSource::Reference => write!(f, "a reference"),
        }
    }
}

// thiserror requires fields named `source` (see ValidationError) to be Error.
impl std::error::Error for DataSource {}

/// Per walker-type metadata declared once, independent of any specific run:
/// which data sources are required vs merely allowed, and which named
/// reference-ordered-data bindings are required vs tolerated. Consulted at
/// validation time, never mutated during execution.
#[derive(Debug, Clone, Getters)]
pub struct WalkerContract {
    name: String,
    requires: Vec<DataSource>,
    allows: Vec<DataSource>,
    required_rods: Vec<RodBinding>,
    /// None means unrestricted; required bindings are implicitly allowed.
    allowed_rods: Option<Vec<RodBinding>>,
}

impl WalkerContract {
    /// By default everything is allowed and nothing is required.
    pub fn new(name: impl Into<String>) -> Self {
        WalkerContract {
            name: name.into(),
            requires: vec![],
            allows: vec![DataSource::Reads, DataSource::Reference],
            required_rods: vec![],
            allowed_rods: None,
        }
    }

    pub fn require(mut self, source: DataSource) -> Self {
        if !self.requires.contains(&source) {
            self.requires.push(source);
        }
        self
    }

    pub fn allow_only(mut self, sources: Vec<DataSource>) -> Self {
        self.allows = sources;
        self
    }

    pub fn require_rod(mut self, binding: RodBinding) -> Self {
        self.required_rods.push(binding);
        self
    }

    pub fn allow_rods(mut self, bindings: Vec<RodBinding>) -> Self {
        self.allowed_rods = Some(bindings);
        self
    }

    #[inline]
    pub fn is_required(&self, source: DataSource) -> bool {
        self.requires.contains(&source)
    }

    #[inline]
    pub fn is_allowed(&self, source: DataSource) -> bool {
        self.is_required(source) || self.allows.contains(&source)
    }

    pub fn is_rod_allowed(&self, binding: &RodBinding) -> bool {
        match &self.allowed_rods {
            None => true,
            Some(allowed) => {
                let fits = |x: &RodBinding| x.matches(&binding.name, &binding.kind);
                allowed.iter().any(fits) || self.required_rods.iter().any(fits)
            }
        }
    }
}
