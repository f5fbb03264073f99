//! Public entry point for Hyperbolic Random Graphs: points placed on a
//! hyperbolic disk of radius `R`, angle uniform, radius drawn from the
//! disk's area density, connected via `HyperbolicMetric`.

use std::sync::Mutex;

use crate::calibrate::calculate_radius;
use crate::distance::HyperbolicMetric;
use crate::error::{GenerationError, Result};
use crate::graph::{Edge, Graph};
use crate::partition::{suggested_num_levels, Partition};
use crate::point::Point;
use crate::sampler::Sampler;
use crate::weights::{sample_angles, sample_radii};

/// Fixed band width in hyperbolic-distance units (see `Partition`'s band
/// layout); bands are implementation bookkeeping, not a user-facing knob.
const BAND_WIDTH: f64 = 1.0;

/// Builds an HRG on `n` points with angular dispersion `alpha` (`> 0.5`).
///
/// `temperature` is `T` (`0.0` selects the threshold model); `avg_deg`
/// picks the disk radius `R` via `calculate_radius`. `radius_seed`/
/// `angle_seed`/`sample_seed` separate the independent sources of
/// randomness; any left `None` draws from system entropy.
#[allow(clippy::too_many_arguments)]
pub fn build_hrg(
    n: usize,
    alpha: f64,
    temperature: f64,
    avg_deg: f64,
    radius_seed: Option<u64>,
    angle_seed: Option<u64>,
    sample_seed: Option<u64>,
    thread_count: usize,
) -> Result<Graph> {
    if n == 0 {
        return Err(GenerationError::EmptyOrMismatchedInput { what: "n must be at least 1" });
    }
    if alpha <= 0.5 {
        return Err(GenerationError::InvalidShapeParameter { name: "alpha", value: alpha });
    }
    if temperature < 0.0 {
        return Err(GenerationError::InvalidTemperature { t: temperature });
    }
    if avg_deg <= 0.0 {
        return Err(GenerationError::InvalidBound { name: "avg_deg", value: avg_deg });
    }

    let radius = calculate_radius(n, alpha, temperature, avg_deg);
    let radii = sample_radii(n, alpha, radius, radius_seed);
    let angles = sample_angles(n, angle_seed);

    let points: Vec<Point> = radii
        .into_iter()
        .zip(angles)
        .enumerate()
        .map(|(id, (r, phi))| Point::new(id, vec![phi / std::f64::consts::TAU], r))
        .collect();

    let num_bands = (radius / BAND_WIDTH).ceil().max(1.0) as usize;
    let bands: Vec<(f64, f64)> = (0..num_bands)
        .map(|i| {
            let hi = (radius - i as f64 * BAND_WIDTH).max(0.0);
            let lo = (radius - (i as f64 + 1.0) * BAND_WIDTH).max(0.0);
            (lo, hi)
        })
        .collect();

    let metric = HyperbolicMetric::new(radius, temperature);
    let max_level = suggested_num_levels(n, 1);
    let partition = Partition::build(
        1,
        points,
        &bands,
        |r| {
            let i = ((radius - r) / BAND_WIDTH).floor().max(0.0) as usize;
            i.min(bands.len() - 1)
        },
        &metric,
        max_level,
    );

    let sampler = Sampler::new(&partition, &metric);
    let edges: Mutex<Vec<Edge>> = Mutex::new(Vec::new());
    let callback = |_tid: usize, u: usize, v: usize| {
        edges.lock().unwrap().push(Edge::new(u, v));
    };
    sampler.generate(sample_seed, thread_count, &callback);

    Ok(Graph::from_edges(n, edges.into_inner().unwrap()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_alpha_at_or_below_half() {
        assert!(build_hrg(10, 0.5, 0.0, 3.0, Some(1), Some(2), Some(3), 1).is_err());
    }

    #[test]
    fn produces_simple_undirected_graph() {
        let g = build_hrg(500, 0.8, 0.0, 6.0, Some(11), Some(22), Some(33), 1).unwrap();
        for e in g.edges() {
            assert_ne!(e.source, e.target);
        }
    }

    #[test]
    fn is_deterministic_for_fixed_seeds() {
        let a = build_hrg(300, 1.0, 0.0, 5.0, Some(1), Some(2), Some(3), 1).unwrap();
        let b = build_hrg(300, 1.0, 0.0, 5.0, Some(1), Some(2), Some(3), 1).unwrap();
        let mut ea: Vec<_> = a.edges().iter().map(|e| (e.source, e.target)).collect();
        let mut eb: Vec<_> = b.edges().iter().map(|e| (e.source, e.target)).collect();
        ea.sort_unstable();
        eb.sort_unstable();
        assert_eq!(ea, eb);
    }

    #[test]
    fn generation_is_independent_of_thread_count() {
        let collect = |threads: usize| {
            let g = build_hrg(800, 0.9, 0.0, 6.0, Some(5), Some(6), Some(7), threads).unwrap();
            let mut e: Vec<_> = g.edges().iter().map(|e| (e.source, e.target)).collect();
            e.sort_unstable();
            e
        };
        assert_eq!(collect(1), collect(4));
    }

    #[test]
    fn generation_without_seeds_still_produces_a_graph() {
        let g = build_hrg(200, 0.8, 0.0, 5.0, None, None, None, 1).unwrap();
        assert_eq!(g.n(), 200);
    }

    #[test]
    fn average_degree_is_roughly_on_target() {
        let target = 8.0;
        let g = build_hrg(6000, 0.8, 0.0, target, Some(5), Some(6), Some(7), 2).unwrap();
        let observed = g.avg_degree();
        assert!((observed - target).abs() < target, "observed {observed} vs target {target}");
    }
}
