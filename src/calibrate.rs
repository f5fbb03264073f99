//! Calibration helpers: turning a target average degree into the model
//! parameters (HRG disk radius, GIRG weight scale) that realize it.

/// Finds `x` with `f(x) == target` for a monotonically decreasing `f`,
/// starting from the bracket `[lower, upper]` and widening it exponentially
/// outward until `target` actually falls inside, then bisecting down to
/// `accuracy`. Kept generic so future calibration targets don't need their
/// own root finder.
pub fn exponential_search(mut f: impl FnMut(f64) -> f64, target: f64, accuracy: f64, lower: f64, upper: f64) -> f64 {
    assert!(lower < upper);
    assert!(accuracy > 0.0);

    let mut lo = lower;
    let mut hi = upper;

    // f is decreasing: grow hi until f(hi) <= target, shrink lo until f(lo) >= target.
    while f(hi) > target {
        let width = hi - lo;
        hi += width;
    }
    while f(lo) < target {
        let width = hi - lo;
        lo -= width;
    }

    let mut mid = 0.5 * (lo + hi);
    let mut iterations = 0;
    while (f(mid) - target).abs() > accuracy && iterations < 200 {
        if f(mid) > target {
            lo = mid;
        } else {
            hi = mid;
        }
        mid = 0.5 * (lo + hi);
        iterations += 1;
    }
    mid
}

/// Hyperbolic disk radius that realizes `avg_deg` for `n` points at
/// dispersion `alpha`, via the asymptotic expected-degree curve
/// `deg(R) ~ (2*alpha / (pi*(alpha-0.5))) * n * exp(-R/2)`
/// (Gugelmann, Panagiotou, Peter). `t` (temperature) does not change this
/// leading-order estimate; exact calibration under T>0 would need the full
/// sigmoid integral, which is a future refinement.
pub fn calculate_radius(n: usize, alpha: f64, t: f64, avg_deg: f64) -> f64 {
    let _ = t;
    assert!(alpha > 0.5, "alpha must exceed 0.5 for a well-defined degree distribution");
    assert!(avg_deg > 0.0);
    let c = 2.0 * alpha / (std::f64::consts::PI * (alpha - 0.5));
    let expected_degree = |r: f64| c * n as f64 * (-r / 2.0).exp();
    exponential_search(expected_degree, avg_deg, 1e-9 * avg_deg.max(1.0), 1e-6, 1.0)
}

/// Rescales already-sampled GIRG weights so their mean equals `avg_deg`:
/// under the threshold/Chung-Lu-style connection probability, the expected
/// degree of a vertex with weight `w` is `w`, so matching the mean weight
/// to `avg_deg` calibrates the whole sample in one pass.
pub fn estimate_weight_scaling(weights: &[f64], avg_deg: f64) -> f64 {
    assert!(!weights.is_empty());
    let mean: f64 = weights.iter().sum::<f64>() / weights.len() as f64;
    avg_deg / mean
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exponential_search_inverts_decreasing_function() {
        let f = |x: f64| 100.0 * (-x).exp();
        let root = exponential_search(f, 5.0, 1e-6, 1e-3, 1.0);
        assert!((f(root) - 5.0).abs() < 1e-4);
    }

    #[test]
    fn exponential_search_widens_bracket_when_needed() {
        // target lies far outside the initial [lower, upper] bracket.
        let f = |x: f64| 1000.0 * (-x).exp();
        let root = exponential_search(f, 1e-3, 1e-6, 1.0, 2.0);
        assert!((f(root) - 1e-3).abs() < 1e-6);
    }

    #[test]
    fn calculate_radius_increases_with_n() {
        let r_small = calculate_radius(1_000, 0.8, 0.0, 5.0);
        let r_large = calculate_radius(100_000, 0.8, 0.0, 5.0);
        assert!(r_large > r_small);
    }

    #[test]
    fn weight_scaling_matches_target_mean() {
        let weights = vec![1.0, 2.0, 3.0, 4.0];
        let scale = estimate_weight_scaling(&weights, 10.0);
        let scaled_mean: f64 = weights.iter().map(|w| w * scale).sum::<f64>() / weights.len() as f64;
        assert!((scaled_mean - 10.0).abs() < 1e-9);
    }
}
