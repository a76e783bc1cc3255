//! Randomness seam for task selection and parameter choice

/// Source of uniform random choices.
///
/// Production users draw from a [`fastrand::Rng`]; tests drive the profile
/// with [`ScriptedRandom`] to make every choice predictable.
pub trait RandomSource: Send + Sync {
    /// Uniform index in `0..len`. `len` must be non-zero.
    fn index(&mut self, len: usize) -> usize;

    /// Uniform value in `low..=high`
    fn between(&mut self, low: u64, high: u64) -> u64;
}

impl RandomSource for fastrand::Rng {
    fn index(&mut self, len: usize) -> usize {
        self.usize(..len)
    }

    fn between(&mut self, low: u64, high: u64) -> u64 {
        self.u64(low..=high)
    }
}

/// Pick one element uniformly, `None` for an empty slice
pub fn choose<'a, T>(rng: &mut impl RandomSource, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        None
    } else {
        items.get(rng.index(items.len()))
    }
}

/// Replays a fixed sequence of values, cycling when exhausted.
///
/// `index(len)` yields `value % len` and `between(low, high)` yields
/// `low + value % (high - low + 1)`.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    values: Vec<u64>,
    position: usize,
}

impl ScriptedRandom {
    pub fn new(values: impl Into<Vec<u64>>) -> Self {
        let values = values.into();
        Self {
            values: if values.is_empty() { vec![0] } else { values },
            position: 0,
        }
    }

    /// Always picks the first element / lowest value
    pub fn zeros() -> Self {
        Self::new(vec![0])
    }

    fn next(&mut self) -> u64 {
        let value = self.values[self.position % self.values.len()];
        self.position += 1;
        value
    }
}

impl RandomSource for ScriptedRandom {
    fn index(&mut self, len: usize) -> usize {
        (self.next() % len as u64) as usize
    }

    fn between(&mut self, low: u64, high: u64) -> u64 {
        let span = high - low;
        if span == u64::MAX {
            return self.next();
        }
        low + self.next() % (span + 1)
    }
}
