//! A count-min sketch of 4-bit counters that estimates how often a key hash
//! was seen recently.
//!
//! Counters are packed sixteen to a `u64`. Once the number of recorded
//! increments reaches the sample size, every counter is halved so the
//! estimates favour recent activity over all-time popularity.

const DEPTH: usize = 4;
const COUNTERS_PER_WORD: usize = 16;
const COUNTER_MAX: u64 = 15;
const RESET_MASK: u64 = 0x7777_7777_7777_7777;

/// The sample size is this many increments per unit of capacity.
const SAMPLE_FACTOR: usize = 10;
/// Capacities above this size the sketch as if they were this large.
pub(crate) const MAX_SIZING_CAPACITY: usize = 1 << 20;
const MIN_WIDTH: usize = 16;

// Fixed per-row seeds so that estimates are reproducible for a given hasher.
const SEEDS: [u64; DEPTH] = [
  0xc3a5_c85c_97cb_3127,
  0xb492_b66f_be98_f273,
  0x9ae1_6a3b_2f90_404f,
  0xcbf2_9ce4_8422_2325,
];

#[derive(Debug)]
pub(crate) struct FrequencySketch {
  // DEPTH rows of `width` counters, stored row after row.
  table: Box<[u64]>,
  width: usize,
  additions: usize,
  sample_size: usize,
}

impl FrequencySketch {
  pub(crate) fn new(capacity: usize) -> Self {
    let sizing = capacity.clamp(1, MAX_SIZING_CAPACITY);
    let width = sizing.max(MIN_WIDTH).next_power_of_two();
    let words = DEPTH * width / COUNTERS_PER_WORD;
    Self {
      table: vec![0u64; words].into_boxed_slice(),
      width,
      additions: 0,
      sample_size: sizing * SAMPLE_FACTOR,
    }
  }

  pub(crate) fn sample_size(&self) -> usize {
    self.sample_size
  }

  pub(crate) fn width(&self) -> usize {
    self.width
  }

  // Returns the (word, bit shift) of the counter for `hash` in `row`.
  #[inline]
  fn slot(&self, hash: u64, row: usize) -> (usize, u32) {
    let seed = SEEDS[row];
    let mut h = hash.wrapping_add(seed).wrapping_mul(seed);
    h ^= h >> 32;
    let counter = h as usize & (self.width - 1);
    let word = row * (self.width / COUNTERS_PER_WORD) + counter / COUNTERS_PER_WORD;
    let shift = ((counter % COUNTERS_PER_WORD) * 4) as u32;
    (word, shift)
  }

  /// Records one occurrence of `hash`. Counters saturate at 15.
  pub(crate) fn increment(&mut self, hash: u64) {
    let mut changed = false;
    for row in 0..DEPTH {
      let (word, shift) = self.slot(hash, row);
      if (self.table[word] >> shift) & COUNTER_MAX < COUNTER_MAX {
        self.table[word] += 1 << shift;
        changed = true;
      }
    }

    if changed {
      self.additions += 1;
      if self.additions >= self.sample_size {
        self.reset();
      }
    }
  }

  /// The estimated number of recent occurrences of `hash`.
  pub(crate) fn frequency(&self, hash: u64) -> u8 {
    (0..DEPTH)
      .map(|row| {
        let (word, shift) = self.slot(hash, row);
        ((self.table[word] >> shift) & COUNTER_MAX) as u8
      })
      .min()
      .unwrap_or(0)
  }

  // Halves every counter and the sample count.
  fn reset(&mut self) {
    for word in self.table.iter_mut() {
      *word = (*word >> 1) & RESET_MASK;
    }
    self.additions /= 2;
  }

  pub(crate) fn clear(&mut self) {
    self.table.iter_mut().for_each(|word| *word = 0);
    self.additions = 0;
  }
}
