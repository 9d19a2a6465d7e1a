//! # rpartition - A Dynamic Memory Partitioning Simulator
//!
//! This crate models **dynamic partitioning** of a fixed-size address space
//! under the four classical placement strategies: First Fit, Best Fit,
//! Worst Fit and Next Fit.
//!
//! ## Overview
//!
//! The address space `[0, total_size)` is always split into free and
//! allocated blocks that tile it exactly:
//!
//! ```text
//!   Address Space (total_size = 100):
//!
//!   0         20   30   40   50                          90       100
//!   ┌─────────┬────┬────┬────┬───────────────────────────┬─────────┐
//!   │  free   │ A1 │free│ A2 │           free            │   A3    │
//!   └─────────┴────┴────┴────┴───────────────────────────┴─────────┘
//!
//!   free list:      [(0,20), (30,10), (50,40)]
//!   allocated list: [(20,10), (40,10), (90,10)]
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   rpartition
//!   ├── block      - Block, a half-open range [start, start + size)
//!   ├── strategy   - Strategy enum and the four block searches
//!   ├── partition  - PartitionAllocator state machine
//!   ├── state      - Snapshot descriptors and usage accounting
//!   └── error      - AllocError
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use rpartition::{PartitionAllocator, Strategy};
//!
//! let mut allocator = PartitionAllocator::new(100).unwrap();
//!
//! let a = allocator.allocate(20, Strategy::FirstFit).unwrap();
//! let b = allocator.allocate(10, Strategy::BestFit).unwrap();
//! assert_eq!((a, b), (0, 20));
//!
//! assert!(allocator.free(a, 20));
//! for line in allocator.get_state() {
//!     println!("{line}");
//! }
//! ```
//!
//! ## Placement Strategies
//!
//! Requesting 10 units from the layout above:
//!
//! ```text
//!   Strategy    Picks            Why
//!   ─────────   ──────────────   ─────────────────────────────────────
//!   First Fit   (0,20)   -> 0    first block large enough
//!   Best Fit    (30,10)  -> 30   smallest block large enough
//!   Worst Fit   (50,40)  -> 50   largest block large enough
//!   Next Fit    cursor..         first block large enough, scanning
//!                                circularly from the cursor
//! ```
//!
//! The allocation always starts at the chosen block's start; the block is
//! shrunk from the front, or removed when used up.
//!
//! ## Coalescing
//!
//! Every successful free sorts the free list by start and merges blocks that
//! touch exactly:
//!
//! ```text
//!   before:  [(30,10)] [(0,20)] [(20,10) <- just freed]
//!   sorted:  [(0,20)] [(20,10)] [(30,10)]
//!   merged:  [(0,40)]
//! ```
//!
//! Gaps are never bridged. Between frees the free list keeps insertion
//! order, which First Fit and Next Fit observe.
//!
//! ## Next Fit Cursor
//!
//! The cursor is an index into the free list:
//!
//! - a scan starts at `cursor % len` and wraps around once;
//! - a partially used block keeps the cursor on that block;
//! - a used-up block is removed and the cursor stays on the same index,
//!   which now names the following block (or wraps to 0);
//! - after coalescing the cursor moves to the first free block at or after
//!   the start of the last Next Fit allocation.
//!
//! Only Next Fit allocations move the cursor or its anchor. First, Best and
//! Worst Fit leave both alone.
//!
//! ## Limitations
//!
//! - **Single-threaded**: wrap the allocator in a lock to share it
//! - **Fixed capacity**: set once at construction
//! - **No compaction**: allocated blocks never move

mod block;
mod error;
mod partition;
mod state;
mod strategy;

pub use block::Block;
pub use error::AllocError;
pub use partition::{DEFAULT_CAPACITY, PartitionAllocator};
pub use state::{BlockDescriptor, BlockKind, Usage};
pub use strategy::Strategy;
