//! Independent point attributes: GIRG power-law weights, HRG radii drawn
//! from the hyperbolic disk's area density, and uniform angles.

use rand_distr::{Distribution, Uniform};

use crate::rng::seeded_rng;

/// Power-law weights on `[w_min, w_max]` with exponent `ple` (the usual
/// `beta` of a scale-free degree distribution, `ple > 1`).
///
/// Inverse-CDF sampling: for `F(w) = (w^(1-ple) - w_min^(1-ple)) /
/// (w_max^(1-ple) - w_min^(1-ple))`, `w = F^-1(u)`.
///
/// `seed` is deterministic when given, drawn from system entropy otherwise.
pub fn sample_weights(n: usize, ple: f64, w_min: f64, w_max: f64, seed: Option<u64>) -> Vec<f64> {
    assert!(ple > 1.0);
    assert!(w_min > 0.0 && w_max >= w_min);
    let mut rng = seeded_rng(seed);
    let unit = Uniform::new(0.0_f64, 1.0);
    let exp = 1.0 - ple;
    let lo = w_min.powf(exp);
    let hi = w_max.powf(exp);
    (0..n)
        .map(|_| {
            let u: f64 = unit.sample(&mut rng);
            (lo + u * (hi - lo)).powf(1.0 / exp)
        })
        .collect()
}

/// Radii on `[0, r]` drawn from the hyperbolic disk's area density
/// (proportional to `sinh(alpha * radius)`), via
/// `radius = acosh(1 + u * (cosh(alpha*r) - 1)) / alpha`.
pub fn sample_radii(n: usize, alpha: f64, r: f64, seed: Option<u64>) -> Vec<f64> {
    assert!(alpha > 0.0);
    let mut rng = seeded_rng(seed);
    let unit = Uniform::new(0.0_f64, 1.0);
    let cosh_r_minus_one = (alpha * r).cosh() - 1.0;
    (0..n)
        .map(|_| {
            let u: f64 = unit.sample(&mut rng);
            (1.0 + u * cosh_r_minus_one).acosh() / alpha
        })
        .collect()
}

/// Uniform angles on `[0, 2*pi)`.
pub fn sample_angles(n: usize, seed: Option<u64>) -> Vec<f64> {
    let mut rng = seeded_rng(seed);
    let unit = Uniform::new(0.0_f64, std::f64::consts::TAU);
    (0..n).map(|_| unit.sample(&mut rng)).collect()
}
