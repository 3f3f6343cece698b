//! Category pool and per-round sampling.

use rand::Rng;

/// The full source list of categories, sampled without replacement each
/// round. The source list itself is never consumed; every round draws from
/// a fresh working copy.
pub struct CategoryPool {
    entries: Vec<String>,
}

impl CategoryPool {
    pub fn new(entries: Vec<String>) -> Self {
        CategoryPool { entries }
    }

    /// Parses a newline-delimited category list; blank lines are skipped.
    pub fn parse(text: &str) -> Self {
        let entries = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        CategoryPool { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Draws `n` distinct categories uniformly, without replacement. Asking
    /// for more than the pool holds returns the whole pool (clamped, not an
    /// error). Each draw removes a uniformly random element of the working
    /// copy, so the result order is itself random.
    pub fn sample<R: Rng>(&self, rng: &mut R, n: usize) -> Vec<String> {
        let mut working = self.entries.clone();
        let count = n.min(working.len());
        let mut drawn = Vec::with_capacity(count);
        for _ in 0..count {
            drawn.push(working.remove(rng.gen_range(0..working.len())));
        }
        drawn
    }
}
