use std::fmt;

use crate::block::Block;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
  Free,
  Allocated,
}

impl fmt::Display for BlockKind {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    match self {
      BlockKind::Free => f.write_str("free"),
      BlockKind::Allocated => f.write_str("allocated"),
    }
  }
}

/// One line of an allocator snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockDescriptor {
  pub kind: BlockKind,
  pub start: usize,
  pub size: usize,
}

impl BlockDescriptor {
  pub fn new(
    kind: BlockKind,
    block: Block,
  ) -> Self {
    Self {
      kind,
      start: block.start,
      size: block.size,
    }
  }

  pub fn block(&self) -> Block {
    Block::new(self.start, self.size)
  }
}

impl fmt::Display for BlockDescriptor {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(f, "{} -> start: {}, size: {}", self.kind, self.start, self.size)
  }
}

/// Space accounting for an allocator at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Usage {
  pub total: usize,
  pub free: usize,
  pub allocated: usize,
  pub free_block_count: usize,
  pub largest_free: usize,
}

impl Usage {
  /// External fragmentation, `1 - largest_free / free`.
  ///
  /// Zero when nothing is free or all free space is one block.
  pub fn fragmentation(&self) -> f64 {
    if self.free == 0 {
      return 0.0;
    }
    1.0 - (self.largest_free as f64 / self.free as f64)
  }
}
