use std::{fmt, str::FromStr};

use crate::{AllocError, block::Block};

/// Placement rule used to pick the free block that serves a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
  /// First block large enough, in free-list order.
  FirstFit,
  /// Smallest block large enough.
  BestFit,
  /// Largest block large enough.
  WorstFit,
  /// First block large enough, scanning circularly from the cursor.
  NextFit,
}

impl Strategy {
  pub const ALL: [Strategy; 4] = [
    Strategy::FirstFit,
    Strategy::BestFit,
    Strategy::WorstFit,
    Strategy::NextFit,
  ];

  pub fn name(&self) -> &'static str {
    match self {
      Strategy::FirstFit => "First Fit",
      Strategy::BestFit => "Best Fit",
      Strategy::WorstFit => "Worst Fit",
      Strategy::NextFit => "Next Fit",
    }
  }
}

impl fmt::Display for Strategy {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// Accepts the display names ("First Fit") as well as compact and
/// kebab/snake spellings ("firstfit", "first-fit", "first_fit"), ignoring case.
impl FromStr for Strategy {
  type Err = AllocError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let key: String = s
      .chars()
      .filter(|c| !matches!(*c, ' ' | '-' | '_'))
      .flat_map(char::to_lowercase)
      .collect();

    match key.as_str() {
      "firstfit" => Ok(Strategy::FirstFit),
      "bestfit" => Ok(Strategy::BestFit),
      "worstfit" => Ok(Strategy::WorstFit),
      "nextfit" => Ok(Strategy::NextFit),
      _ => Err(AllocError::UnknownStrategy(s.to_owned())),
    }
  }
}

pub(crate) fn first_fit(
  blocks: &[Block],
  size: usize,
) -> Option<usize> {
  blocks.iter().position(|block| block.size >= size)
}

// Strict comparisons keep the earliest block among equals.
pub(crate) fn best_fit(
  blocks: &[Block],
  size: usize,
) -> Option<usize> {
  let mut best: Option<(usize, usize)> = None;

  for (index, block) in blocks.iter().enumerate() {
    if block.size < size {
      continue;
    }
    match best {
      Some((_, best_size)) if block.size >= best_size => {}
      _ => best = Some((index, block.size)),
    }
  }

  best.map(|(index, _)| index)
}

pub(crate) fn worst_fit(
  blocks: &[Block],
  size: usize,
) -> Option<usize> {
  let mut worst: Option<(usize, usize)> = None;

  for (index, block) in blocks.iter().enumerate() {
    if block.size < size {
      continue;
    }
    match worst {
      Some((_, worst_size)) if block.size <= worst_size => {}
      _ => worst = Some((index, block.size)),
    }
  }

  worst.map(|(index, _)| index)
}

/// Scans once around the list starting at `cursor mod len`.
pub(crate) fn next_fit(
  blocks: &[Block],
  cursor: usize,
  size: usize,
) -> Option<usize> {
  let len = blocks.len();
  if len == 0 {
    return None;
  }

  let origin = cursor % len;
  (0..len)
    .map(|offset| (origin + offset) % len)
    .find(|&index| blocks[index].size >= size)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn layout() -> Vec<Block> {
    vec![
      Block::new(0, 20),
      Block::new(30, 10),
      Block::new(50, 40),
      Block::new(95, 10),
    ]
  }

  #[test]
  fn test_first_fit_takes_list_order() {
    assert_eq!(first_fit(&layout(), 10), Some(0));
    assert_eq!(first_fit(&layout(), 21), Some(2));
    assert_eq!(first_fit(&layout(), 41), None);
  }

  #[test]
  fn test_best_fit_prefers_first_minimal() {
    assert_eq!(best_fit(&layout(), 10), Some(1));
    assert_eq!(best_fit(&layout(), 11), Some(0));
    assert_eq!(best_fit(&[], 1), None);
  }

  #[test]
  fn test_worst_fit_prefers_first_maximal() {
    let blocks = vec![Block::new(0, 40), Block::new(50, 40)];

    assert_eq!(worst_fit(&layout(), 10), Some(2));
    assert_eq!(worst_fit(&blocks, 40), Some(0));
    assert_eq!(worst_fit(&blocks, 41), None);
  }

  #[test]
  fn test_next_fit_wraps_once() {
    let blocks = layout();

    assert_eq!(next_fit(&blocks, 3, 15), Some(0));
    assert_eq!(next_fit(&blocks, 1, 15), Some(2));
    assert_eq!(next_fit(&blocks, 3, 10), Some(3));
    assert_eq!(next_fit(&blocks, 7, 10), Some(3));
    assert_eq!(next_fit(&blocks, 2, 50), None);
    assert_eq!(next_fit(&[], 0, 1), None);
  }

  #[test]
  fn test_parse_names() {
    for strategy in Strategy::ALL {
      assert_eq!(strategy.to_string().parse::<Strategy>(), Ok(strategy));
    }

    assert_eq!("next-fit".parse::<Strategy>(), Ok(Strategy::NextFit));
    assert_eq!("BEST_FIT".parse::<Strategy>(), Ok(Strategy::BestFit));
    assert_eq!(
      "Good Fit".parse::<Strategy>(),
      Err(AllocError::UnknownStrategy("Good Fit".to_owned()))
    );
  }
}
