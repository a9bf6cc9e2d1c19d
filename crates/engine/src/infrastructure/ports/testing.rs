//! Testing-critical ports (random draws).

/// Source of randomness for rolls and item selection.
///
/// All ranges are inclusive. Implementations swap the bounds when
/// `min > max` instead of panicking.
pub trait RandomPort: Send + Sync {
    fn gen_range(&self, min: i32, max: i32) -> i32;

    /// Uniform draw in `[0, 1)`.
    fn gen_unit(&self) -> f32;

    /// Re-seed the generator so subsequent draws are reproducible.
    fn reseed(&self, seed: u64);

    /// Uniform index in `0..len`. Returns 0 for an empty range.
    fn gen_index(&self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        let max = i32::try_from(len - 1).unwrap_or(i32::MAX);
        usize::try_from(self.gen_range(0, max)).unwrap_or(0)
    }
}
