use core::f64::consts::TAU;

/// Xorshift32 stream. Every random decision in a session draws from one of
/// these, so a seed fully determines the run.
#[derive(Clone, Copy, Debug)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 0xDEAD_BEEF } else { seed },
        }
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    pub fn next(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        self.state
    }

    pub fn next_int(&mut self, max: u32) -> u32 {
        self.next() % max
    }

    /// Uniform in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        self.next() as f64 / 4_294_967_296.0
    }

    /// Uniform in [min, max). Returns `min` for an empty band.
    pub fn range_f64(&mut self, min: f64, max: f64) -> f64 {
        if max <= min {
            return min;
        }
        min + self.next_f64() * (max - min)
    }

    /// Uniform in [-limit, limit).
    pub fn symmetric(&mut self, limit: f64) -> f64 {
        self.range_f64(-limit, limit)
    }

    pub fn angle(&mut self) -> f64 {
        self.next_f64() * TAU
    }

    pub fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }

    /// Picks an entry with probability proportional to its weight. Zero-weight
    /// entries are never chosen; `None` when every weight is zero.
    /// Tables whose total overflows `u32` are treated like an empty table.
    pub fn pick_weighted<T: Copy>(&mut self, table: &[(T, u32)]) -> Option<T> {
        let total = table
            .iter()
            .try_fold(0u32, |sum, (_, weight)| sum.checked_add(*weight))?;
        if total == 0 {
            return None;
        }
        let mut roll = self.next_int(total);
        for (value, weight) in table {
            if roll < *weight {
                return Some(*value);
            }
            roll -= *weight;
        }
        None
    }
}
