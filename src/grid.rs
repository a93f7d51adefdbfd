//! Fixed-step wavenumber grids.
//!
//! A [`WavenumberGrid`] defines the index space shared by opacity and CIA
//! tables: monotonically increasing wavenumber values (cm^-1) at a constant
//! step equal to the configured resolution. The grid is stored as
//! start/step/length arithmetic rather than a materialized vector, so
//! slicing and alignment math stay cheap.

/// An ordered sequence of wavenumber values at a fixed step.
///
/// `value_at(i) = start + i * step`. Construction mirrors the half-open
/// range convention of the on-disk grids: [`WavenumberGrid::from_range`]
/// covers `[start, stop)`.
#[derive(Debug, Clone, PartialEq)]
pub struct WavenumberGrid {
    start: f64,
    step: f64,
    len: usize,
}

impl WavenumberGrid {
    /// Create a grid from an explicit start, step and point count.
    pub fn new(start: f64, step: f64, len: usize) -> Self {
        Self { start, step, len }
    }

    /// Create the grid covering `[start, stop)` at `step` spacing.
    ///
    /// The point count is `ceil((stop - start) / step)`; the last value is
    /// strictly below `stop`. An inverted range yields an empty grid.
    pub fn from_range(start: f64, stop: f64, step: f64) -> Self {
        let len = if stop > start && step > 0.0 {
            ((stop - start) / step).ceil() as usize
        } else {
            0
        };
        Self { start, step, len }
    }

    /// Number of wavenumber points.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the grid holds no points.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Grid spacing in cm^-1.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// First wavenumber value. For an empty grid this is the start bound.
    pub fn first(&self) -> f64 {
        self.start
    }

    /// Last wavenumber value. For an empty grid this is the start bound.
    pub fn last(&self) -> f64 {
        self.start + self.len.saturating_sub(1) as f64 * self.step
    }

    /// Wavenumber at index `i` (may lie past the end; no bounds check).
    pub fn value_at(&self, i: usize) -> f64 {
        self.start + i as f64 * self.step
    }

    /// Iterate over the grid values.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.len).map(|i| self.value_at(i))
    }

    /// Materialize the grid values.
    pub fn values(&self) -> Vec<f64> {
        self.iter().collect()
    }

    /// The sub-grid covering indices `[a, b)`, clamped to the grid bounds.
    pub fn slice(&self, a: usize, b: usize) -> Self {
        let b = b.min(self.len);
        let a = a.min(b);
        Self {
            start: self.value_at(a),
            step: self.step,
            len: b - a,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_range_full_opacity_grid() {
        // np.r_[0:18000:2]
        let grid = WavenumberGrid::from_range(0.0, 18_000.0, 2.0);
        assert_eq!(grid.len(), 9_000);
        assert_eq!(grid.first(), 0.0);
        assert_eq!(grid.last(), 17_998.0);
    }

    #[test]
    fn test_from_range_cia_native_grid() {
        // np.r_[6250:10001:1]
        let grid = WavenumberGrid::from_range(6_250.0, 10_001.0, 1.0);
        assert_eq!(grid.len(), 3_751);
        assert_eq!(grid.last(), 10_000.0);

        // np.r_[6250:10001:2] keeps the same first value, halved count
        let coarse = WavenumberGrid::from_range(6_250.0, 10_001.0, 2.0);
        assert_eq!(coarse.len(), 1_876);
        assert_eq!(coarse.last(), 10_000.0);
    }

    #[test]
    fn test_from_range_inverted_is_empty() {
        let grid = WavenumberGrid::from_range(100.0, 50.0, 1.0);
        assert!(grid.is_empty());
        assert_eq!(grid.len(), 0);
    }

    #[test]
    fn test_slice() {
        let grid = WavenumberGrid::from_range(0.0, 100.0, 2.0);
        let sub = grid.slice(10, 20);
        assert_eq!(sub.len(), 10);
        assert_eq!(sub.first(), 20.0);
        assert_eq!(sub.last(), 38.0);
        assert_eq!(sub.step(), 2.0);
    }

    #[test]
    fn test_slice_clamps_to_bounds() {
        let grid = WavenumberGrid::from_range(0.0, 10.0, 1.0);
        let sub = grid.slice(4, 50);
        assert_eq!(sub.len(), 6);
        assert_eq!(sub.first(), 4.0);

        let empty = grid.slice(50, 60);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_values() {
        let grid = WavenumberGrid::new(6_250.0, 1.0, 3);
        assert_eq!(grid.values(), vec![6_250.0, 6_251.0, 6_252.0]);
    }
}
