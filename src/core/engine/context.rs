use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::core::error::IntervalError;
use crate::core::genome::ContigDict;

/// States of a single `execute` call, in the only order they may occur.
/// `Failed` is reachable from any state; everything else is strictly forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Created,
    Validated,
    Partitioned,
    Running,
    Combining,
    Completed,
    Failed,
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Created => "created",
            Phase::Validated => "validated",
            Phase::Partitioned => "partitioned",
            Phase::Running => "running",
            Phase::Combining => "combining",
            Phase::Completed => "completed",
            Phase::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Run-wide immutable state: the contig ordering every coordinate in the run
/// is expressed against. Constructed before anything touches a coordinate, so
/// an uninitialized ordering is caught here rather than deep in a traversal.
#[derive(Debug, Clone)]
pub struct EngineContext {
    dict: Arc<ContigDict>,
}

impl EngineContext {
    pub fn new(dict: Arc<ContigDict>) -> Result<Self, IntervalError> {
        if dict.is_empty() {
            return Err(IntervalError::OrderingNotInitialized);
        }
        Ok(EngineContext { dict })
    }

    #[inline]
    pub fn dict(&self) -> &Arc<ContigDict> {
        &self.dict
    }
}
