/// A contiguous half-open range `[start, start + size)` of the address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Block {
  pub start: usize,
  pub size: usize,
}

impl Block {
  pub fn new(
    start: usize,
    size: usize,
  ) -> Self {
    Self { start, size }
  }

  /// One past the last unit covered by the block.
  pub fn end(&self) -> usize {
    self.start + self.size
  }

  /// True when `other` begins exactly where `self` ends.
  pub fn is_adjacent_to(
    &self,
    other: &Block,
  ) -> bool {
    self.end() == other.start
  }

  pub fn overlaps(
    &self,
    other: &Block,
  ) -> bool {
    self.start < other.end() && other.start < self.end()
  }
}
