//! Integer arithmetic over a fixed-arity hierarchical cell index.
//!
//! A single `D`-dimensional torus partition serves both models: GIRGs use
//! it directly on `[0,1)^D`, HRGs use the `D = 1` case with the one torus
//! coordinate standing for `phi / (2*pi)` (the angular partition of
//! `[0, 2*pi)` is topologically the same circle). Cell ids are dense
//! integers, level by level, as in `hypergirgs::AngleHelper` and
//! `girgs::SpatialTreeCoordinateHelper`.

/// A complete `2^D`-ary tree over levels `0..num_levels`.
#[derive(Debug, Clone, Copy)]
pub struct CellHelper {
    dimension: usize,
    num_levels: usize,
}

impl CellHelper {
    pub fn new(dimension: usize, num_levels: usize) -> Self {
        assert!(dimension >= 1);
        assert!(num_levels >= 1);
        Self {
            dimension,
            num_levels,
        }
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub fn num_levels(&self) -> usize {
        self.num_levels
    }

    #[inline]
    fn branching(&self) -> usize {
        1usize << self.dimension
    }

    /// Number of cells in a single level, `2^(D*level)`.
    #[inline]
    pub fn num_cells_in_level(&self, level: usize) -> usize {
        1usize << (self.dimension * level)
    }

    /// Index offset of the first cell of `level`.
    #[inline]
    pub fn first_cell_of_level(&self, level: usize) -> usize {
        // geometric sum (branching^level - 1) / (branching - 1), branching = 2^D
        if self.dimension == 0 {
            return level;
        }
        ((1usize << (self.dimension * level)) - 1) / (self.branching() - 1)
    }

    #[inline]
    pub fn level_of(&self, cell: usize) -> usize {
        let mut level = 0;
        while self.first_cell_of_level(level + 1) <= cell {
            level += 1;
        }
        level
    }

    /// First of the `2^D` children of `cell` (a cell of some level `l`); the
    /// children live at level `l+1`.
    #[inline]
    pub fn first_child(&self, cell: usize) -> usize {
        let level = self.level_of(cell);
        self.first_cell_of_level(level + 1)
            + self.branching() * (cell - self.first_cell_of_level(level))
    }

    /// Worst-case (i.e. minimal) gap between two non-touching cells at
    /// `level`, expressed as a fraction of the unit torus along one axis.
    /// Two non-touching axis-aligned cells are at best one cell-width
    /// apart, and a cell's width along any axis is `2^-level`.
    #[inline]
    pub fn worst_case_gap_fraction(&self, level: usize) -> f64 {
        1.0 / (1u64 << level) as f64
    }

    /// The `[lo, lo+size)` box (per axis, in `[0,1)` units) of `cell` at
    /// `level`, decoded from the cell id.
    pub fn cell_box(&self, cell: usize, level: usize) -> (Vec<f64>, f64) {
        debug_assert!(self.level_of(cell) == level);
        let local = cell - self.first_cell_of_level(level);
        let branching = self.branching();

        // the digits were pushed most-significant (coarsest) first, so
        // decoding least-significant-first and reversing recovers order.
        let mut remaining = local;
        let mut octants = Vec::with_capacity(level);
        for _ in 0..level {
            octants.push(remaining % branching);
            remaining /= branching;
        }
        octants.reverse();

        let mut lo = vec![0.0_f64; self.dimension];
        let mut size = 1.0_f64;
        for oct in octants {
            size /= 2.0;
            for (d, lo_d) in lo.iter_mut().enumerate() {
                if (oct >> d) & 1 == 1 {
                    *lo_d += size;
                }
            }
        }
        (lo, size)
    }

    /// Locates the cell of `level` containing `coords` (each in `[0,1)`).
    pub fn cell_for_point(&self, coords: &[f64], level: usize) -> usize {
        debug_assert_eq!(coords.len(), self.dimension);
        let mut lo = vec![0.0_f64; self.dimension];
        let mut size = 1.0_f64;
        let mut idx = 0usize;
        for _ in 0..level {
            size /= 2.0;
            let mut octant = 0usize;
            for d in 0..self.dimension {
                let mid = lo[d] + size;
                if coords[d] >= mid {
                    lo[d] = mid;
                    octant |= 1 << d;
                }
            }
            idx = idx * self.branching() + octant;
        }
        self.first_cell_of_level(level) + idx
    }

    /// Per-axis torus gap between two cell boxes of equal size (same level).
    fn axis_gaps(lo_a: &[f64], lo_b: &[f64], size: f64) -> Vec<f64> {
        lo_a.iter()
            .zip(lo_b.iter())
            .map(|(&a, &b)| {
                if a == b {
                    return 0.0;
                }
                let (x, y) = if a < b { (a, b) } else { (b, a) };
                let direct = (y - (x + size)).max(0.0);
                let wrap = (x + 1.0 - (y + size)).max(0.0);
                direct.min(wrap)
            })
            .collect()
    }

    /// True iff the closed axis-aligned regions of `a` and `b` (both at
    /// `level`) share at least one boundary point on the torus, on every
    /// axis simultaneously.
    pub fn touching(&self, a: usize, b: usize, level: usize) -> bool {
        if a == b {
            return true;
        }
        let (lo_a, size) = self.cell_box(a, level);
        let (lo_b, _) = self.cell_box(b, level);
        Self::axis_gaps(&lo_a, &lo_b, size)
            .iter()
            .all(|&g| g <= 0.0)
    }

    /// L-infinity lower bound distance between the regions of `a` and `b`
    /// (0 if touching). This is the GIRG torus metric directly; HRG reads
    /// only the single axis (`D = 1`) and rescales it to radians.
    pub fn lower_bound_linf(&self, a: usize, b: usize, level: usize) -> f64 {
        let (lo_a, size) = self.cell_box(a, level);
        let (lo_b, _) = self.cell_box(b, level);
        Self::axis_gaps(&lo_a, &lo_b, size)
            .into_iter()
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_cell_of_level_matches_geometric_sum() {
        let h = CellHelper::new(2, 5);
        assert_eq!(h.first_cell_of_level(0), 0);
        assert_eq!(h.first_cell_of_level(1), 1);
        assert_eq!(h.first_cell_of_level(2), 5); // 1 + 4
        assert_eq!(h.num_cells_in_level(2), 16);
    }

    #[test]
    fn cell_for_point_roundtrips_through_children() {
        let h = CellHelper::new(1, 6);
        for level in 0..6 {
            for i in 0..h.num_cells_in_level(level) {
                let cell = h.first_cell_of_level(level) + i;
                let (lo, size) = h.cell_box(cell, level);
                let mid = lo[0] + size / 2.0;
                assert_eq!(h.cell_for_point(&[mid], level), cell);
            }
        }
    }

    #[test]
    fn first_child_descends_levels() {
        let h = CellHelper::new(2, 4);
        let root = 0;
        let fc = h.first_child(root);
        assert_eq!(h.level_of(fc), 1);
        assert_eq!(fc, h.first_cell_of_level(1));
    }

    #[test]
    fn touching_is_symmetric_and_reflexive() {
        let h = CellHelper::new(1, 5);
        let level = 4;
        for i in 0..h.num_cells_in_level(level) {
            let a = h.first_cell_of_level(level) + i;
            assert!(h.touching(a, a, level));
            for j in 0..h.num_cells_in_level(level) {
                let b = h.first_cell_of_level(level) + j;
                assert_eq!(h.touching(a, b, level), h.touching(b, a, level));
            }
        }
    }

    #[test]
    fn adjacent_cells_touch_and_wrap_around() {
        let h = CellHelper::new(1, 3);
        let level = 3;
        let first = h.first_cell_of_level(level);
        let n = h.num_cells_in_level(level);
        assert!(h.touching(first, first + 1, level));
        // torus wraparound: first and last cell touch
        assert!(h.touching(first, first + n - 1, level));
    }

    #[test]
    fn non_touching_gap_shrinks_with_level() {
        let h = CellHelper::new(1, 8);
        let gap_shallow = h.worst_case_gap_fraction(2);
        let gap_deep = h.worst_case_gap_fraction(6);
        assert!(gap_deep < gap_shallow);
    }
}
