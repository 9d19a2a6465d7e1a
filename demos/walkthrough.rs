use std::{env, error::Error, io::Read};

use rpartition::{BlockKind, DEFAULT_CAPACITY, PartitionAllocator, Strategy};

const STRIP_WIDTH: usize = 50;

/// Waits until the user presses ENTER when running with `--step`.
fn pause(step: bool) {
  if step {
    println!("\n>>> Press ENTER to continue...");
    let _ = std::io::stdin().bytes().next();
  }
}

/// Draws the address space as one line: `#` for allocated units, `.` for free.
fn strip(allocator: &PartitionAllocator) -> String {
  let scale = STRIP_WIDTH as f64 / allocator.total_size() as f64;
  let mut line = String::with_capacity(STRIP_WIDTH + 2);

  line.push('|');
  for descriptor in allocator.memory_map() {
    let from = (descriptor.start as f64 * scale).round() as usize;
    let to = ((descriptor.start + descriptor.size) as f64 * scale).round() as usize;
    let fill = match descriptor.kind {
      BlockKind::Free => '.',
      BlockKind::Allocated => '#',
    };
    line.extend(std::iter::repeat_n(fill, to - from));
  }
  line.push('|');

  line
}

fn print_state(
  label: &str,
  allocator: &PartitionAllocator,
) {
  println!("\n[{label}]");
  for descriptor in allocator.get_state() {
    println!("  {descriptor}");
  }

  let usage = allocator.usage();
  println!("  {}", strip(allocator));
  println!(
    "  free = {}/{}, free blocks = {}, largest = {}, fragmentation = {:.2}, next fit cursor = {}",
    usage.free,
    usage.total,
    usage.free_block_count,
    usage.largest_free,
    usage.fragmentation(),
    allocator.next_fit_cursor(),
  );
}

fn allocate(
  allocator: &mut PartitionAllocator,
  size: usize,
  strategy: Strategy,
) {
  match allocator.try_allocate(size, strategy) {
    Ok(address) => println!("{strategy}: {size} units at address {address}"),
    Err(err) => println!("{strategy}: {err}"),
  }
}

fn free(
  allocator: &mut PartitionAllocator,
  address: usize,
  size: usize,
) {
  match allocator.try_free(address, size) {
    Ok(()) => println!("freed {size} units at address {address}"),
    Err(err) => println!("free failed: {err}"),
  }
}

fn main() -> Result<(), Box<dyn Error>> {
  env_logger::init();

  let mut step = false;
  let mut capacity = DEFAULT_CAPACITY;
  for arg in env::args().skip(1) {
    if arg == "--step" {
      step = true;
    } else {
      capacity = arg.parse()?;
    }
  }

  let mut allocator = PartitionAllocator::new(capacity)?;
  print_state("start", &allocator);
  pause(step);

  // --------------------------------------------------------------------
  // 1) Fill the space so frees leave holes of different sizes behind.
  // --------------------------------------------------------------------
  let tenth = (capacity / 10).max(1);
  for size in [2 * tenth, tenth, tenth, tenth, 4 * tenth] {
    allocate(&mut allocator, size, Strategy::FirstFit);
  }
  print_state("1: filled with First Fit", &allocator);
  pause(step);

  // --------------------------------------------------------------------
  // 2) Punch holes. Each free coalesces the free list.
  // --------------------------------------------------------------------
  let holes: Vec<_> = allocator
    .allocated_blocks()
    .iter()
    .enumerate()
    .filter(|(index, _)| index % 2 == 0)
    .map(|(_, block)| *block)
    .collect();
  for block in holes {
    free(&mut allocator, block.start, block.size);
  }
  print_state("2: holes punched", &allocator);
  pause(step);

  // --------------------------------------------------------------------
  // 3) The same request under each strategy, each from the same layout.
  // --------------------------------------------------------------------
  for strategy in Strategy::ALL {
    let mut trial = allocator.clone();
    allocate(&mut trial, tenth, strategy);
    print_state(&format!("3: {strategy}"), &trial);
  }
  pause(step);

  // --------------------------------------------------------------------
  // 4) Next Fit keeps walking from where it stopped.
  // --------------------------------------------------------------------
  for _ in 0..3 {
    allocate(&mut allocator, tenth, Strategy::NextFit);
  }
  print_state("4: three Next Fit requests", &allocator);
  pause(step);

  // --------------------------------------------------------------------
  // 5) Requests the allocator refuses.
  // --------------------------------------------------------------------
  allocate(&mut allocator, capacity + 1, Strategy::WorstFit);
  free(&mut allocator, capacity * 2, tenth);
  free(&mut allocator, 0, capacity);
  match "Good Fit".parse::<Strategy>() {
    Ok(strategy) => println!("parsed {strategy}"),
    Err(err) => println!("{err}"),
  }

  // --------------------------------------------------------------------
  // 6) Release everything; the free list collapses back to one block.
  // --------------------------------------------------------------------
  let live = allocator.allocated_blocks().to_vec();
  for block in live {
    free(&mut allocator, block.start, block.size);
  }
  print_state("6: all freed", &allocator);

  Ok(())
}
