use thiserror::Error;

use crate::Strategy;

/// Reasons an allocator request is refused.
///
/// Every failure is recoverable: the allocator is left exactly as it was
/// before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocError {
  #[error("size must be a positive number of units")]
  InvalidSize,

  #[error("no free block can hold {requested} units under {strategy}")]
  OutOfSpace { requested: usize, strategy: Strategy },

  #[error("range at {address} of {size} units exceeds the {total_size}-unit address space")]
  OutOfRange {
    address: usize,
    size: usize,
    total_size: usize,
  },

  #[error("no block of {size} units is allocated at {address}")]
  UnknownBlock { address: usize, size: usize },

  #[error("unknown placement strategy {0:?}")]
  UnknownStrategy(String),
}
