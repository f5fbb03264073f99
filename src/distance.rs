//! Metric-specific primitives: GIRG L-infinity torus distance, HRG native
//! hyperbolic distance, and the connection-probability functions built on
//! top of them.

use crate::point::Point;

/// Numerical floor below which a connection probability is treated as zero
/// (see spec, Type II edge cases).
pub const PROBABILITY_FLOOR: f64 = 1e-10;

/// The capability the sampler needs from a metric: true point-pair
/// distance/probability, and the bounds used to prune band pairs in bulk.
///
/// `band` arguments are `(min, max)` extents of a weight/radius band; each
/// metric picks whichever endpoint maximizes the connection probability
/// (max weight for GIRG, min radius for HRG).
pub trait ConnectionMetric {
    /// `0.0` selects the hard-threshold regime.
    fn temperature(&self) -> f64;

    /// True metric distance between two points.
    fn distance(&self, u: &Point, v: &Point) -> f64;

    /// Fast T=0 test, avoiding `acosh`/`powf` where possible.
    fn below_threshold(&self, u: &Point, v: &Point) -> bool;

    /// True connection probability for an actual pair (T>0 path).
    fn connection_probability(&self, u: &Point, v: &Point) -> f64;

    /// Upper bound on the connection probability for any pair drawn from
    /// `band_i` / `band_j` whose true distance is at least
    /// `dist_lower_bound`.
    fn probability_bound(&self, band_i: (f64, f64), band_j: (f64, f64), dist_lower_bound: f64)
        -> f64;

    /// A lower bound on the true metric distance between any two points of
    /// `band_i` / `band_j` whose cells are separated by at least
    /// `cell_gap` (a worst-case geometric gap, see `CellHelper`).
    fn band_pair_distance_bound(
        &self,
        band_i: (f64, f64),
        band_j: (f64, f64),
        cell_gap: f64,
    ) -> f64;

    /// The distance beyond which `probability_bound` drops to
    /// `PROBABILITY_FLOOR` for this band pair — the band-pair analogue of a
    /// hard threshold radius, used to size target levels (see `Partition`).
    fn prune_distance(&self, band_i: (f64, f64), band_j: (f64, f64)) -> f64;
}

/// HRG: `acosh(cosh(r1)cosh(r2) - sinh(r1)sinh(r2)cos(dphi))`,
/// `dphi = min(|phi1-phi2|, 2*pi - |phi1-phi2|)`.
#[inline]
pub fn hyperbolic_distance(r1: f64, phi1: f64, r2: f64, phi2: f64) -> f64 {
    let dphi = {
        let raw = (phi1 - phi2).abs();
        raw.min(std::f64::consts::TAU - raw)
    };
    let cosh_d = r1.cosh() * r2.cosh() - r1.sinh() * r2.sinh() * dphi.cos();
    // guard against floating point pushing the argument just under 1
    cosh_d.max(1.0).acosh()
}

#[derive(Debug, Clone, Copy)]
pub struct HyperbolicMetric {
    pub radius: f64,
    pub temperature: f64,
    pub cosh_radius: f64,
}

impl HyperbolicMetric {
    pub fn new(radius: f64, temperature: f64) -> Self {
        Self {
            radius,
            temperature,
            cosh_radius: radius.cosh(),
        }
    }

    #[inline]
    fn sigmoid_probability(&self, dist: f64) -> f64 {
        if self.temperature == 0.0 {
            return if dist < self.radius { 1.0 } else { 0.0 };
        }
        1.0 / (1.0 + (0.5 / self.temperature * (dist - self.radius)).exp())
    }
}

impl ConnectionMetric for HyperbolicMetric {
    #[inline]
    fn temperature(&self) -> f64 {
        self.temperature
    }

    #[inline]
    fn distance(&self, u: &Point, v: &Point) -> f64 {
        hyperbolic_distance(
            u.value,
            u.coords[0] * std::f64::consts::TAU,
            v.value,
            v.coords[0] * std::f64::consts::TAU,
        )
    }

    #[inline]
    fn below_threshold(&self, u: &Point, v: &Point) -> bool {
        let phi_u = u.coords[0] * std::f64::consts::TAU;
        let phi_v = v.coords[0] * std::f64::consts::TAU;
        let dphi = {
            let raw = (phi_u - phi_v).abs();
            raw.min(std::f64::consts::TAU - raw)
        };
        let cosh_d = u.value.cosh() * v.value.cosh() - u.value.sinh() * v.value.sinh() * dphi.cos();
        cosh_d < self.cosh_radius
    }

    #[inline]
    fn connection_probability(&self, u: &Point, v: &Point) -> f64 {
        self.sigmoid_probability(self.distance(u, v))
    }

    fn probability_bound(
        &self,
        band_i: (f64, f64),
        band_j: (f64, f64),
        dist_lower_bound: f64,
    ) -> f64 {
        let _ = (band_i, band_j);
        self.sigmoid_probability(dist_lower_bound)
    }

    fn band_pair_distance_bound(
        &self,
        band_i: (f64, f64),
        band_j: (f64, f64),
        cell_gap: f64,
    ) -> f64 {
        // smaller radius means more connected, so the minimum radius in
        // each band gives the tightest (smallest) lower bound distance.
        hyperbolic_distance(band_i.0, 0.0, band_j.0, cell_gap * std::f64::consts::TAU)
    }

    fn prune_distance(&self, band_i: (f64, f64), band_j: (f64, f64)) -> f64 {
        let _ = (band_i, band_j);
        if self.temperature == 0.0 {
            self.radius
        } else {
            self.radius + 2.0 * self.temperature * (1.0 / PROBABILITY_FLOOR - 1.0).ln()
        }
    }
}

/// GIRG L-infinity torus distance: `max_a min(|x_a-y_a|, 1-|x_a-y_a|)`.
#[inline]
pub fn torus_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = (x - y).abs();
            d.min(1.0 - d)
        })
        .fold(0.0, f64::max)
}

#[derive(Debug, Clone, Copy)]
pub struct GirgMetric {
    pub dimension: usize,
    pub temperature: f64,
    /// Total weight `W`, used by the Chung-Lu-style probability formula.
    pub total_weight: f64,
}

impl GirgMetric {
    pub fn new(dimension: usize, temperature: f64, total_weight: f64) -> Self {
        Self {
            dimension,
            temperature,
            total_weight,
        }
    }

    #[inline]
    fn probability_from(&self, w_u: f64, w_v: f64, dist: f64) -> f64 {
        if dist == 0.0 {
            return 1.0;
        }
        let threshold_term = (w_u * w_v) / (dist.powi(self.dimension as i32) * self.total_weight);
        if self.temperature == 0.0 {
            return if threshold_term >= 1.0 { 1.0 } else { 0.0 };
        }
        threshold_term.powf(1.0 / self.temperature).min(1.0)
    }
}

impl ConnectionMetric for GirgMetric {
    #[inline]
    fn temperature(&self) -> f64 {
        self.temperature
    }

    #[inline]
    fn distance(&self, u: &Point, v: &Point) -> f64 {
        torus_distance(&u.coords, &v.coords)
    }

    #[inline]
    fn below_threshold(&self, u: &Point, v: &Point) -> bool {
        let d = self.distance(u, v);
        if d == 0.0 {
            return true;
        }
        (u.value * v.value) / (d.powi(self.dimension as i32) * self.total_weight) >= 1.0
    }

    #[inline]
    fn connection_probability(&self, u: &Point, v: &Point) -> f64 {
        self.probability_from(u.value, v.value, self.distance(u, v))
    }

    fn probability_bound(
        &self,
        band_i: (f64, f64),
        band_j: (f64, f64),
        dist_lower_bound: f64,
    ) -> f64 {
        // larger weight means more connected, so the maximum weight in
        // each band gives the loosest (largest, safe) probability bound.
        self.probability_from(band_i.1, band_j.1, dist_lower_bound)
    }

    fn band_pair_distance_bound(
        &self,
        _band_i: (f64, f64),
        _band_j: (f64, f64),
        cell_gap: f64,
    ) -> f64 {
        cell_gap
    }

    fn prune_distance(&self, band_i: (f64, f64), band_j: (f64, f64)) -> f64 {
        let w_prod = band_i.1 * band_j.1;
        if self.temperature == 0.0 {
            (w_prod / self.total_weight).powf(1.0 / self.dimension as f64)
        } else {
            (w_prod / (self.total_weight * PROBABILITY_FLOOR.powf(self.temperature)))
                .powf(1.0 / self.dimension as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hrg_threshold_equivalence() {
        let m = HyperbolicMetric::new(10.0, 0.0);
        let a = Point::new(0, vec![0.0], 1.0);
        let b = Point::new(1, vec![0.01], 1.0);
        assert_eq!(m.below_threshold(&a, &b), m.distance(&a, &b) < 10.0);
    }

    #[test]
    fn girg_threshold_equivalence() {
        let m = GirgMetric::new(1, 0.0, 10.0);
        let a = Point::new(0, vec![0.0], 2.0);
        let b = Point::new(1, vec![0.1], 3.0);
        let d = m.distance(&a, &b);
        let expected = (a.value * b.value) / (d.powi(1) * m.total_weight) >= 1.0;
        assert_eq!(m.below_threshold(&a, &b), expected);
    }

    #[test]
    fn torus_distance_wraps() {
        assert!((torus_distance(&[0.01], &[0.99]) - 0.02).abs() < 1e-12);
    }

    #[test]
    fn probability_is_monotonic_in_distance() {
        let m = HyperbolicMetric::new(10.0, 0.5);
        let p_close = m.sigmoid_probability(1.0);
        let p_far = m.sigmoid_probability(9.0);
        assert!(p_close > p_far);
    }
}
