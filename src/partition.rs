//! Assigns points to bands, computes each band's target level, builds all
//! `Layer`s, and precomputes the base level for every pair of bands.

use crate::cell::CellHelper;
use crate::distance::ConnectionMetric;
use crate::layer::Layer;
use crate::point::Point;

/// The shallowest level at which non-touching cells of `band_a`/`band_b`
/// are guaranteed unable to host an edge is one past the deepest level at
/// which the worst-case bound still exceeds the band pair's prune
/// distance; this helper returns that deepest level.
fn deepest_level_exceeding<M: ConnectionMetric>(
    helper: &CellHelper,
    metric: &M,
    band_a: (f64, f64),
    band_b: (f64, f64),
    max_level: usize,
) -> usize {
    let prune_at = metric.prune_distance(band_a, band_b);
    let mut level = 0;
    while level < max_level {
        let gap = helper.worst_case_gap_fraction(level + 1);
        let bound = metric.band_pair_distance_bound(band_a, band_b, gap);
        if bound > prune_at {
            level += 1;
        } else {
            break;
        }
    }
    level
}

/// Largest number of partition levels that keeps `dimension * level` inside
/// `usize` cell-id arithmetic, with headroom.
pub fn max_safe_level(dimension: usize) -> usize {
    (60 / dimension.max(1)).max(1)
}

/// A reasonable number of levels to search for a given `n`: enough that the
/// deepest level has roughly O(1) points per cell.
pub fn suggested_num_levels(n: usize, dimension: usize) -> usize {
    let by_n = (((n.max(2)) as f64).log2() / dimension.max(1) as f64).ceil() as usize + 1;
    by_n.clamp(1, max_safe_level(dimension))
}

pub struct Partition {
    pub helper: CellHelper,
    pub layers: Vec<Layer>,
    /// `layer_pairs[level]` holds the `(i, j)` band-index pairs (indices
    /// into `layers`) whose base level is `level`.
    pub layer_pairs: Vec<Vec<(usize, usize)>>,
    pub n: usize,
}

impl Partition {
    /// `bands` is the full, ordered list of band value-ranges (band 0 is
    /// the "outermost"/hardest-to-connect band), even if some turn out to
    /// be empty. `band_of` maps a point's value to an index into `bands`.
    #[allow(clippy::too_many_arguments)]
    pub fn build<M: ConnectionMetric>(
        dimension: usize,
        mut points: Vec<Point>,
        bands: &[(f64, f64)],
        band_of: impl Fn(f64) -> usize,
        metric: &M,
        max_level_cap: usize,
    ) -> Self {
        assert!(!bands.is_empty());
        let probe = CellHelper::new(dimension, max_level_cap.max(1));

        // target level for every candidate band, computed against band 0
        // (the outermost band), regardless of whether it ends up empty.
        let outer = bands[0];
        let target_levels: Vec<usize> = bands
            .iter()
            .map(|&b| deepest_level_exceeding(&probe, metric, b, outer, max_level_cap))
            .collect();

        // bucket points by band
        let mut buckets: Vec<Vec<Point>> = (0..bands.len()).map(|_| Vec::new()).collect();
        let n = points.len();
        for p in points.drain(..) {
            let idx = band_of(p.value).min(bands.len() - 1);
            buckets[idx].push(p);
        }

        // drop empty bands, remapping indices
        let mut active: Vec<usize> = Vec::new();
        for (i, bucket) in buckets.iter().enumerate() {
            if !bucket.is_empty() {
                active.push(i);
            }
        }

        let num_levels = target_levels[0] + 1; // band 0's target level defines recursion depth
        let helper = CellHelper::new(dimension, num_levels);

        let mut layers = Vec::with_capacity(active.len());
        for &orig in &active {
            let target_level = target_levels[orig].min(num_levels - 1);
            let mut pts = std::mem::take(&mut buckets[orig]);
            for p in &mut pts {
                p.cell = helper.cell_for_point(&p.coords, target_level);
            }
            pts.sort_by_key(|p| p.cell);
            layers.push(Layer::new(orig, bands[orig], target_level, &helper, pts));
        }

        // unordered band pairs only (i <= j): the sampler handles both
        // directions itself when the two cells in a pair differ.
        let mut layer_pairs: Vec<Vec<(usize, usize)>> = vec![Vec::new(); num_levels];
        for (new_i, &orig_i) in active.iter().enumerate() {
            for (new_j, &orig_j) in active.iter().enumerate().skip(new_i) {
                let base = target_levels[orig_i]
                    .min(target_levels[orig_j])
                    .min(deepest_level_exceeding(&probe, metric, bands[orig_i], bands[orig_j], max_level_cap) + 1)
                    .min(num_levels - 1);
                layer_pairs[base].push((new_i, new_j));
            }
        }

        Self {
            helper,
            layers,
            layer_pairs,
            n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::HyperbolicMetric;

    #[test]
    fn empty_bands_are_dropped() {
        let metric = HyperbolicMetric::new(10.0, 0.0);
        let bands = vec![(9.0, 10.0), (5.0, 9.0), (0.0, 5.0)];
        let points: Vec<Point> = (0..20)
            // only populate the outer and inner band, skip the middle one
            .map(|i| {
                let r = if i % 2 == 0 { 9.5 } else { 1.0 };
                Point::new(i, vec![(i as f64 * 0.05) % 1.0], r)
            })
            .collect();
        let partition = Partition::build(
            1,
            points,
            &bands,
            |r| bands.iter().position(|&(lo, hi)| r > lo && r <= hi).unwrap_or(bands.len() - 1),
            &metric,
            20,
        );
        assert_eq!(partition.layers.len(), 2);
    }

    #[test]
    fn target_levels_non_increasing_by_band_index() {
        // band 0 (outermost) must reach at least as deep as later bands.
        let metric = HyperbolicMetric::new(12.0, 0.0);
        let bands = vec![(11.0, 12.0), (6.0, 11.0), (0.0, 6.0)];
        let points: Vec<Point> = (0..300)
            .map(|i| {
                let r = 0.02 + (i as f64 * 11.9 / 300.0);
                Point::new(i, vec![(i as f64 * 0.017) % 1.0], r)
            })
            .collect();
        let partition = Partition::build(
            1,
            points,
            &bands,
            |r| bands.iter().position(|&(lo, hi)| r > lo && r <= hi).unwrap_or(bands.len() - 1),
            &metric,
            30,
        );
        let levels: Vec<usize> = partition.layers.iter().map(|l| l.target_level).collect();
        for w in levels.windows(2) {
            assert!(w[0] >= w[1]);
        }
    }
}
