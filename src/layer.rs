//! One weight/radius band: the points assigned to it, sorted by cell id at
//! the band's target level, indexed by a prefix-sum array for O(1)
//! `pointsInCell`/`kthPoint`/`cellIterators`.

use crate::cell::CellHelper;
use crate::point::Point;

#[derive(Debug)]
pub struct Layer {
    /// Index of this band among all bands of the partition.
    pub band: usize,
    /// `[min, max)` extent of the band (weight for GIRG, radius for HRG).
    pub value_range: (f64, f64),
    /// Level at which `points` is indexed by cell id.
    pub target_level: usize,
    /// Points of this band, sorted by cell id at `target_level`.
    points: Vec<Point>,
    /// `psum[c+1] - psum[c]` is the number of points in cell `c` of
    /// `target_level`; length `numCellsInLevel(target_level) + 1`.
    psum: Vec<u32>,
}

impl Layer {
    /// `points` must already be sorted by cell id at `target_level`.
    pub fn new(
        band: usize,
        value_range: (f64, f64),
        target_level: usize,
        helper: &CellHelper,
        points: Vec<Point>,
    ) -> Self {
        let num_cells = helper.num_cells_in_level(target_level);
        let first = helper.first_cell_of_level(target_level);
        let mut psum = vec![0u32; num_cells + 1];
        for p in &points {
            debug_assert!(p.cell >= first && p.cell < first + num_cells);
            psum[p.cell - first + 1] += 1;
        }
        for c in 0..num_cells {
            psum[c + 1] += psum[c];
        }
        debug_assert_eq!(psum[num_cells] as usize, points.len());
        debug_assert!(points.windows(2).all(|w| w[0].cell <= w[1].cell));

        Self {
            band,
            value_range,
            target_level,
            points,
            psum,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Maps `(cell, level)` (`level <= target_level`) to the half-open
    /// `[begin, end)` range of indices at `target_level` the subtree
    /// rooted at `cell` spans.
    fn descendant_range(&self, helper: &CellHelper, cell: usize, level: usize) -> (usize, usize) {
        debug_assert!(level <= self.target_level);
        let descendants = helper.num_cells_in_level(self.target_level - level);
        let local = cell - helper.first_cell_of_level(level);
        let begin = local * descendants;
        (begin, begin + descendants)
    }

    /// Number of points in the subtree rooted at `cell` (a cell of `level`).
    pub fn points_in_cell(&self, helper: &CellHelper, cell: usize, level: usize) -> usize {
        let (begin, end) = self.descendant_range(helper, cell, level);
        (self.psum[end] - self.psum[begin]) as usize
    }

    /// The `k`-th point (in cell-id order) inside the subtree of `cell`.
    pub fn kth_point(&self, helper: &CellHelper, cell: usize, level: usize, k: usize) -> &Point {
        let (begin, _) = self.descendant_range(helper, cell, level);
        &self.points[self.psum[begin] as usize + k]
    }

    /// Half-open slice of points inside the subtree of `cell`.
    pub fn cell_points(&self, helper: &CellHelper, cell: usize, level: usize) -> &[Point] {
        let (begin, end) = self.descendant_range(helper, cell, level);
        &self.points[self.psum[begin] as usize..self.psum[end] as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(points: Vec<(usize, f64)>, level: usize, helper: &CellHelper) -> (Layer, Vec<Point>) {
        let mut pts: Vec<Point> = points
            .into_iter()
            .map(|(id, coord)| {
                let mut p = Point::new(id, vec![coord], 1.0);
                p.cell = helper.cell_for_point(&p.coords, level);
                p
            })
            .collect();
        pts.sort_by_key(|p| p.cell);
        let clone = pts.clone();
        (Layer::new(0, (0.0, 1.0), level, helper, pts), clone)
    }

    #[test]
    fn prefix_sum_identity_matches_brute_force() {
        let helper = CellHelper::new(1, 5);
        let level = 4;
        let coords: Vec<(usize, f64)> = (0..200)
            .map(|i| (i, (i as f64 * 0.013) % 1.0))
            .collect();
        let (layer, pts) = build(coords, level, &helper);

        for shallow in 0..=level {
            for cell in helper.first_cell_of_level(shallow)
                ..helper.first_cell_of_level(shallow) + helper.num_cells_in_level(shallow)
            {
                let expected = pts
                    .iter()
                    .filter(|p| {
                        let (lo, size) = helper.cell_box(cell, shallow);
                        p.coords[0] >= lo[0] && p.coords[0] < lo[0] + size
                    })
                    .count();
                assert_eq!(layer.points_in_cell(&helper, cell, shallow), expected);
            }
        }
    }

    #[test]
    fn kth_point_matches_cell_points_slice() {
        let helper = CellHelper::new(1, 5);
        let level = 3;
        let coords: Vec<(usize, f64)> = (0..64).map(|i| (i, (i as f64 * 0.07) % 1.0)).collect();
        let (layer, _pts) = build(coords, level, &helper);

        for cell in
            helper.first_cell_of_level(2)..helper.first_cell_of_level(2) + helper.num_cells_in_level(2)
        {
            let slice = layer.cell_points(&helper, cell, 2);
            for (k, p) in slice.iter().enumerate() {
                assert_eq!(layer.kth_point(&helper, cell, 2, k), p);
            }
        }
    }
}
