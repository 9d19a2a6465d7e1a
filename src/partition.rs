use log::{debug, trace};

use crate::{
  AllocError, Strategy,
  block::Block,
  state::{BlockDescriptor, BlockKind, Usage},
  strategy::{best_fit, first_fit, next_fit, worst_fit},
};

/// Capacity used by [`PartitionAllocator::default`].
pub const DEFAULT_CAPACITY: usize = 100;

/// Dynamic partitioning of a fixed address space `[0, total_size)`.
///
/// Free and allocated blocks always tile the whole space. The free list is
/// kept in insertion order between frees; every successful free sorts it by
/// start address and coalesces touching neighbours.
#[derive(Debug, Clone)]
pub struct PartitionAllocator {
  total_size: usize,
  free_blocks: Vec<Block>,
  allocated_blocks: Vec<Block>,
  next_fit_index: usize,
  // Start of the most recent Next Fit allocation; re-anchors the cursor after
  // a coalescing pass.
  last_allocated_start: usize,
}

impl PartitionAllocator {
  pub fn new(total_size: usize) -> Result<Self, AllocError> {
    if total_size == 0 {
      return Err(AllocError::InvalidSize);
    }

    Ok(Self::whole(total_size))
  }

  fn whole(total_size: usize) -> Self {
    Self {
      total_size,
      free_blocks: vec![Block::new(0, total_size)],
      allocated_blocks: Vec::new(),
      next_fit_index: 0,
      last_allocated_start: 0,
    }
  }

  pub fn total_size(&self) -> usize {
    self.total_size
  }

  pub fn free_blocks(&self) -> &[Block] {
    &self.free_blocks
  }

  /// Allocated blocks in allocation order.
  pub fn allocated_blocks(&self) -> &[Block] {
    &self.allocated_blocks
  }

  /// Index into [`free_blocks`](Self::free_blocks) where the next Next Fit
  /// scan begins.
  pub fn next_fit_cursor(&self) -> usize {
    self.next_fit_index
  }

  /// Allocates `size` units and returns the start address, or `None` when the
  /// request cannot be served.
  pub fn allocate(
    &mut self,
    size: usize,
    strategy: Strategy,
  ) -> Option<usize> {
    self.try_allocate(size, strategy).ok()
  }

  /// Allocates `size` units from the front of the free block chosen by
  /// `strategy`.
  ///
  /// # Errors
  ///
  /// - [`AllocError::InvalidSize`] when `size` is zero.
  /// - [`AllocError::OutOfSpace`] when no free block is large enough.
  pub fn try_allocate(
    &mut self,
    size: usize,
    strategy: Strategy,
  ) -> Result<usize, AllocError> {
    if size == 0 {
      debug!("{strategy}: rejected zero-size allocation");
      return Err(AllocError::InvalidSize);
    }

    let found = match strategy {
      Strategy::FirstFit => first_fit(&self.free_blocks, size),
      Strategy::BestFit => best_fit(&self.free_blocks, size),
      Strategy::WorstFit => worst_fit(&self.free_blocks, size),
      Strategy::NextFit => next_fit(&self.free_blocks, self.next_fit_index, size),
    };

    let Some(index) = found else {
      debug!("{strategy}: no free block holds {size} units");
      return Err(AllocError::OutOfSpace {
        requested: size,
        strategy,
      });
    };

    let (start, consumed) = self.carve(index, size);

    if strategy == Strategy::NextFit {
      // A consumed block shifts its successor into `index`.
      self.next_fit_index = if consumed {
        index.checked_rem(self.free_blocks.len()).unwrap_or(0)
      } else {
        index
      };
      self.last_allocated_start = start;
      trace!("next fit cursor -> {}", self.next_fit_index);
    }

    debug!("{strategy}: allocated {size} units at {start}");

    #[cfg(debug_assertions)]
    self.check_integrity();

    Ok(start)
  }

  /// Moves the first `size` units of free block `index` to the allocated list.
  ///
  /// Returns the allocated start and whether the free block was used up.
  fn carve(
    &mut self,
    index: usize,
    size: usize,
  ) -> (usize, bool) {
    let block = self.free_blocks[index];
    debug_assert!(block.size >= size);

    self.allocated_blocks.push(Block::new(block.start, size));

    if block.size == size {
      self.free_blocks.remove(index);
      (block.start, true)
    } else {
      self.free_blocks[index] = Block::new(block.start + size, block.size - size);
      (block.start, false)
    }
  }

  /// Releases the allocation at `address` of exactly `size` units.
  pub fn free(
    &mut self,
    address: usize,
    size: usize,
  ) -> bool {
    self.try_free(address, size).is_ok()
  }

  /// Releases the allocation at `address` of exactly `size` units and
  /// coalesces the free list.
  ///
  /// Only an exact `(address, size)` match is released; partial and
  /// overlapping ranges are refused.
  ///
  /// # Errors
  ///
  /// - [`AllocError::InvalidSize`] when `size` is zero.
  /// - [`AllocError::OutOfRange`] when the range leaves the address space.
  /// - [`AllocError::UnknownBlock`] when nothing is allocated with that
  ///   exact start and size.
  pub fn try_free(
    &mut self,
    address: usize,
    size: usize,
  ) -> Result<(), AllocError> {
    if size == 0 {
      debug!("rejected zero-size free at {address}");
      return Err(AllocError::InvalidSize);
    }

    match address.checked_add(size) {
      Some(end) if end <= self.total_size => {}
      _ => {
        debug!("rejected free of {size} units at {address}: out of range");
        return Err(AllocError::OutOfRange {
          address,
          size,
          total_size: self.total_size,
        });
      }
    }

    let target = Block::new(address, size);
    let Some(position) = self.allocated_blocks.iter().position(|block| *block == target) else {
      debug!("rejected free of {size} units at {address}: not allocated");
      return Err(AllocError::UnknownBlock { address, size });
    };

    self.allocated_blocks.remove(position);
    self.free_blocks.push(target);
    self.coalesce();

    debug!("freed {size} units at {address}");

    #[cfg(debug_assertions)]
    {
      self.check_integrity();
      self.check_coalesced();
    }

    Ok(())
  }

  /// Sorts the free list by start, merges exactly touching runs, and
  /// re-anchors the Next Fit cursor on the first block at or after the last
  /// Next Fit allocation.
  fn coalesce(&mut self) {
    let before = self.free_blocks.len();
    self.free_blocks.sort_unstable_by_key(|block| block.start);

    let mut merged: Vec<Block> = Vec::with_capacity(before);
    for block in self.free_blocks.drain(..) {
      match merged.last_mut() {
        Some(last) if last.is_adjacent_to(&block) => last.size += block.size,
        _ => merged.push(block),
      }
    }
    self.free_blocks = merged;

    let anchor = self.last_allocated_start;
    self.next_fit_index = self
      .free_blocks
      .iter()
      .position(|block| block.start >= anchor)
      .unwrap_or(0);

    debug!("coalesced {} free blocks into {}", before, self.free_blocks.len());
    trace!("next fit cursor -> {}", self.next_fit_index);
  }

  /// Free blocks, then allocated blocks, each in current list order.
  pub fn get_state(&self) -> Vec<BlockDescriptor> {
    let free = self
      .free_blocks
      .iter()
      .map(|block| BlockDescriptor::new(BlockKind::Free, *block));
    let allocated = self
      .allocated_blocks
      .iter()
      .map(|block| BlockDescriptor::new(BlockKind::Allocated, *block));

    free.chain(allocated).collect()
  }

  /// Every block in address order, as a renderer would lay them out.
  pub fn memory_map(&self) -> Vec<BlockDescriptor> {
    let mut map = self.get_state();
    map.sort_unstable_by_key(|descriptor| descriptor.start);
    map
  }

  pub fn usage(&self) -> Usage {
    let free: usize = self.free_blocks.iter().map(|block| block.size).sum();

    Usage {
      total: self.total_size,
      free,
      allocated: self.total_size - free,
      free_block_count: self.free_blocks.len(),
      largest_free: self.free_blocks.iter().map(|block| block.size).max().unwrap_or(0),
    }
  }

  /// Asserts that free and allocated blocks tile `[0, total_size)`.
  #[cfg(debug_assertions)]
  fn check_integrity(&self) {
    let mut blocks: Vec<Block> = self
      .free_blocks
      .iter()
      .chain(&self.allocated_blocks)
      .copied()
      .collect();
    blocks.sort_unstable_by_key(|block| block.start);

    let mut expected_start = 0;
    for block in &blocks {
      assert!(block.size > 0, "empty block at {}", block.start);
      assert_eq!(block.start, expected_start, "address space not tiled at {expected_start}");
      expected_start = block.end();
    }
    assert_eq!(expected_start, self.total_size);
  }

  /// Asserts that the free list is sorted and has no touching neighbours.
  #[cfg(debug_assertions)]
  fn check_coalesced(&self) {
    for pair in self.free_blocks.windows(2) {
      assert!(pair[0].end() < pair[1].start, "free blocks {:?} and {:?} not coalesced", pair[0], pair[1]);
    }
  }
}

impl Default for PartitionAllocator {
  fn default() -> Self {
    Self::whole(DEFAULT_CAPACITY)
  }
}


#[cfg(test)]
mod proptests {
  use std::collections::HashSet;

  use proptest::prelude::*;

  use super::PartitionAllocator;
  use crate::{Strategy as Fit, block::Block, state::BlockKind};

  const CAPACITY: usize = 100;

  #[derive(Debug, Clone)]
  enum Op {
    Allocate(usize, Fit),
    Free(prop::sample::Index),
    FreeArbitrary(usize, usize),
  }

  fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
      3 => (1usize..40, prop::sample::select(Fit::ALL.to_vec()))
        .prop_map(|(size, fit)| Op::Allocate(size, fit)),
      2 => any::<prop::sample::Index>().prop_map(Op::Free),
      1 => (0usize..120, 0usize..20).prop_map(|(address, size)| Op::FreeArbitrary(address, size)),
    ]
  }

  fn check_tiling(allocator: &PartitionAllocator) {
    let map = allocator.memory_map();

    let mut next = 0;
    for descriptor in &map {
      assert!(descriptor.size > 0);
      assert_eq!(descriptor.start, next, "gap or overlap in {map:?}");
      next += descriptor.size;
    }
    assert_eq!(next, CAPACITY);

    let total: usize = allocator
      .get_state()
      .iter()
      .map(|descriptor| descriptor.size)
      .sum();
    assert_eq!(total, CAPACITY);
  }

  fn check_no_adjacent_free(allocator: &PartitionAllocator) {
    let free: Vec<Block> = allocator
      .get_state()
      .iter()
      .filter(|descriptor| descriptor.kind == BlockKind::Free)
      .map(|descriptor| descriptor.block())
      .collect();

    for (i, a) in free.iter().enumerate() {
      for b in &free[i + 1..] {
        assert!(!a.overlaps(b));
        assert!(!a.is_adjacent_to(b) && !b.is_adjacent_to(a), "{a:?} touches {b:?}");
      }
    }
  }

  fn apply(
    allocator: &mut PartitionAllocator,
    op: &Op,
  ) {
    match op {
      Op::Allocate(size, fit) => {
        allocator.allocate(*size, *fit);
      }
      Op::Free(index) => {
        if allocator.allocated_blocks().is_empty() {
          return;
        }
        let block = allocator.allocated_blocks()[index.index(allocator.allocated_blocks().len())];
        assert!(allocator.free(block.start, block.size));
        check_no_adjacent_free(allocator);
      }
      Op::FreeArbitrary(address, size) => {
        let (address, size) = (*address, *size);
        let live = allocator.allocated_blocks().contains(&Block::new(address, size));
        let before = allocator.get_state();
        assert_eq!(allocator.free(address, size), live);
        if live {
          check_no_adjacent_free(allocator);
        } else {
          assert_eq!(allocator.get_state(), before);
        }
      }
    }
  }

  proptest! {
    #[test]
    fn check_invariants_hold(ops in prop::collection::vec(op(), 1..150)) {
      let mut allocator = PartitionAllocator::new(CAPACITY).unwrap();

      for op in &ops {
        apply(&mut allocator, op);
        check_tiling(&allocator);
      }

      let live: Vec<Block> = allocator.allocated_blocks().to_vec();
      for block in live {
        assert!(allocator.free(block.start, block.size));
      }
      assert_eq!(allocator.free_blocks(), &[Block::new(0, CAPACITY)]);
    }

    #[test]
    fn check_allocate_then_free_round_trips(
      ops in prop::collection::vec(op(), 0..60),
      size in 1usize..50,
      fit in prop::sample::select(Fit::ALL.to_vec()),
    ) {
      let mut allocator = PartitionAllocator::new(CAPACITY).unwrap();
      for op in &ops {
        apply(&mut allocator, op);
      }

      let free_before: HashSet<Block> = allocator.free_blocks().iter().copied().collect();
      let allocated_before: HashSet<Block> = allocator.allocated_blocks().iter().copied().collect();

      if let Some(address) = allocator.allocate(size, fit) {
        assert!(allocator.free(address, size));

        let free_after: HashSet<Block> = allocator.free_blocks().iter().copied().collect();
        let allocated_after: HashSet<Block> = allocator.allocated_blocks().iter().copied().collect();
        prop_assert_eq!(free_before, free_after);
        prop_assert_eq!(allocated_before, allocated_after);
      }
    }
  }
}
