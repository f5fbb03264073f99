//! The recursive cell-pair sampler: walks the partition's cell tree,
//! dispatching touching pairs to exhaustive (Type I) enumeration and
//! non-touching pairs to geometric-jump (Type II) thinning, in expected
//! linear time in the number of points plus edges.

use rand::{Rng, SeedableRng};
use rand_distr::Distribution;
use rand_pcg::Pcg64;

use crate::distance::{ConnectionMetric, PROBABILITY_FLOOR};
use crate::partition::Partition;
use crate::point::Point;
use crate::rng::resolve_seed;

/// `callback(thread_id, u, v)`, one call per undirected edge `{u, v}`.
/// `thread_id` lets callers give each worker its own output buffer.
pub trait EdgeCallback: Fn(usize, usize, usize) + Sync {}
impl<F: Fn(usize, usize, usize) + Sync> EdgeCallback for F {}

/// Root level for the parallel phase: fixed regardless of the requested
/// thread count so the set of root tasks — and therefore the per-root RNG
/// streams — never depends on how many threads execute them.
const FIRST_PARALLEL_LEVEL: usize = 4;

#[derive(Debug, Default, Clone, Copy)]
pub struct Coverage {
    pub type1_checks: u64,
    pub type2_checks: u64,
}

impl Coverage {
    fn merge(&mut self, other: Coverage) {
        self.type1_checks += other.type1_checks;
        self.type2_checks += other.type2_checks;
    }
}

pub struct Sampler<'a, M> {
    partition: &'a Partition,
    metric: &'a M,
}

impl<'a, M: ConnectionMetric + Sync> Sampler<'a, M> {
    pub fn new(partition: &'a Partition, metric: &'a M) -> Self {
        Self { partition, metric }
    }

    /// Generates all edges, using up to `thread_count` worker threads.
    /// `seed` is mixed with each root task's index, not the worker id, so
    /// the output edge multiset is identical for any `thread_count`; when
    /// absent, a seed is drawn from system entropy and no reproducibility
    /// guarantee holds across runs.
    pub fn generate<F: EdgeCallback>(&self, seed: Option<u64>, thread_count: usize, callback: &F) -> Coverage {
        let seed = resolve_seed(seed);
        let num_levels = self.partition.helper.num_levels();
        let root_level = FIRST_PARALLEL_LEVEL.min(num_levels - 1);

        let mut coverage = Coverage::default();
        let mut seq_rng = Pcg64::seed_from_u64(seed);
        let mut roots = Vec::new();
        self.collect_roots(0, 0, 0, root_level, &mut seq_rng, callback, &mut coverage, &mut roots);

        if roots.is_empty() {
            debug_assert_eq!(
                coverage.type1_checks + coverage.type2_checks,
                (self.partition.n * self.partition.n.saturating_sub(1)) as u64,
                "every unordered point pair must be resolved exactly once"
            );
            return coverage;
        }

        let thread_count = thread_count.max(1).min(roots.len());
        let chunk_size = roots.len().div_ceil(thread_count);

        let partial = std::thread::scope(|scope| {
            let mut handles = Vec::with_capacity(thread_count);
            for (chunk_idx, chunk) in roots.chunks(chunk_size).enumerate() {
                handles.push(scope.spawn(move || {
                    let mut local = Coverage::default();
                    for &(root_idx, a, b, level) in chunk {
                        let mut rng = root_rng(seed, root_idx);
                        self.visit(a, b, level, &mut rng, callback, chunk_idx, &mut local);
                    }
                    local
                }));
            }
            handles.into_iter().map(|h| h.join().unwrap()).collect::<Vec<_>>()
        });

        for p in partial {
            coverage.merge(p);
        }

        debug_assert_eq!(
            coverage.type1_checks + coverage.type2_checks,
            (self.partition.n * self.partition.n.saturating_sub(1)) as u64,
            "every unordered point pair must be resolved exactly once"
        );
        coverage
    }

    /// Sequential descent down to `root_level`, resolving every pair/level
    /// along the way and recording the touching cell pairs reached exactly
    /// at `root_level` as parallel root tasks.
    #[allow(clippy::too_many_arguments)]
    fn collect_roots<F: EdgeCallback>(
        &self,
        a: usize,
        b: usize,
        level: usize,
        root_level: usize,
        rng: &mut Pcg64,
        callback: &F,
        coverage: &mut Coverage,
        roots: &mut Vec<(usize, usize, usize, usize)>,
    ) {
        if !self.partition.helper.touching(a, b, level) {
            self.resolve_non_touching(a, b, level, rng, callback, coverage);
            return;
        }
        if level == root_level {
            roots.push((roots.len(), a, b, level));
            return;
        }
        self.resolve_type1_at(a, b, level, rng, callback, coverage);
        for (ca, cb, lvl) in self.child_pairs(a, b, level) {
            self.collect_roots(ca, cb, lvl, root_level, rng, callback, coverage, roots);
        }
    }

    /// Full recursive descent from a parallel root, used by worker threads.
    fn visit<F: EdgeCallback>(
        &self,
        a: usize,
        b: usize,
        level: usize,
        rng: &mut Pcg64,
        callback: &F,
        tid: usize,
        coverage: &mut Coverage,
    ) {
        if !self.partition.helper.touching(a, b, level) {
            self.resolve_non_touching_tid(a, b, level, rng, callback, tid, coverage);
            return;
        }
        self.resolve_type1_at_tid(a, b, level, rng, callback, tid, coverage);
        if level + 1 < self.partition.helper.num_levels() {
            for (ca, cb, lvl) in self.child_pairs(a, b, level) {
                self.visit(ca, cb, lvl, rng, callback, tid, coverage);
            }
        }
    }

    /// All `(child_a, child_b, level+1)` triples for the children of `a`
    /// and `b`; restricted to the unordered `ca <= cb` half when `a == b`
    /// (the traversal only ever looks at one representative of each
    /// unordered cell pair).
    fn child_pairs(&self, a: usize, b: usize, level: usize) -> Vec<(usize, usize, usize)> {
        let helper = &self.partition.helper;
        let branching = helper.num_cells_in_level(level + 1) / helper.num_cells_in_level(level);
        let children_a: Vec<usize> = (0..branching).map(|k| helper.first_child(a) + k).collect();
        let mut out = Vec::new();
        if a == b {
            for (ia, &ca) in children_a.iter().enumerate() {
                for &cb in &children_a[ia..] {
                    out.push((ca, cb, level + 1));
                }
            }
        } else {
            let children_b: Vec<usize> = (0..branching).map(|k| helper.first_child(b) + k).collect();
            for &ca in &children_a {
                for &cb in &children_b {
                    out.push((ca, cb, level + 1));
                }
            }
        }
        out
    }

    fn resolve_type1_at<F: EdgeCallback>(
        &self,
        a: usize,
        b: usize,
        level: usize,
        rng: &mut Pcg64,
        callback: &F,
        coverage: &mut Coverage,
    ) {
        self.resolve_type1_at_tid(a, b, level, rng, callback, 0, coverage)
    }

    fn resolve_type1_at_tid<F: EdgeCallback>(
        &self,
        a: usize,
        b: usize,
        level: usize,
        rng: &mut Pcg64,
        callback: &F,
        tid: usize,
        coverage: &mut Coverage,
    ) {
        for &(i, j) in &self.partition.layer_pairs[level] {
            self.sample_type1(i, j, a, b, level, rng, callback, tid, coverage);
        }
    }

    fn resolve_non_touching<F: EdgeCallback>(
        &self,
        a: usize,
        b: usize,
        level: usize,
        rng: &mut Pcg64,
        callback: &F,
        coverage: &mut Coverage,
    ) {
        self.resolve_non_touching_tid(a, b, level, rng, callback, 0, coverage)
    }

    fn resolve_non_touching_tid<F: EdgeCallback>(
        &self,
        a: usize,
        b: usize,
        level: usize,
        rng: &mut Pcg64,
        callback: &F,
        tid: usize,
        coverage: &mut Coverage,
    ) {
        let gap = self.partition.helper.lower_bound_linf(a, b, level);
        for l in level..self.partition.helper.num_levels() {
            for &(i, j) in &self.partition.layer_pairs[l] {
                self.sample_type2(i, j, a, b, level, gap, rng, callback, tid, coverage);
            }
        }
    }

    /// Exhaustive enumeration within a touching cell pair. `level` is the
    /// level `a`/`b` themselves live at, which may be shallower than
    /// either band's own target level.
    #[allow(clippy::too_many_arguments)]
    fn sample_type1<F: EdgeCallback>(
        &self,
        i: usize,
        j: usize,
        a: usize,
        b: usize,
        level: usize,
        rng: &mut Pcg64,
        callback: &F,
        tid: usize,
        coverage: &mut Coverage,
    ) {
        let helper = &self.partition.helper;
        let layer_i = &self.partition.layers[i];
        let layer_j = &self.partition.layers[j];

        if i == j && a == b {
            let pts = layer_i.cell_points(helper, a, level);
            for (ui, u) in pts.iter().enumerate() {
                for v in &pts[ui + 1..] {
                    coverage.type1_checks += 1;
                    self.test_and_emit(u, v, rng, callback, tid);
                }
            }
        } else if i == j {
            let pa = layer_i.cell_points(helper, a, level);
            let pb = layer_i.cell_points(helper, b, level);
            for u in pa {
                for v in pb {
                    coverage.type1_checks += 1;
                    self.test_and_emit(u, v, rng, callback, tid);
                }
            }
        } else if a == b {
            let pa = layer_i.cell_points(helper, a, level);
            let pb = layer_j.cell_points(helper, a, level);
            for u in pa {
                for v in pb {
                    coverage.type1_checks += 1;
                    self.test_and_emit(u, v, rng, callback, tid);
                }
            }
        } else {
            let ia = layer_i.cell_points(helper, a, level);
            let jb = layer_j.cell_points(helper, b, level);
            for u in ia {
                for v in jb {
                    coverage.type1_checks += 1;
                    self.test_and_emit(u, v, rng, callback, tid);
                }
            }
            let ja = layer_j.cell_points(helper, a, level);
            let ib = layer_i.cell_points(helper, b, level);
            for u in ja {
                for v in ib {
                    coverage.type1_checks += 1;
                    self.test_and_emit(u, v, rng, callback, tid);
                }
            }
        }
    }

    #[inline]
    fn test_and_emit<F: EdgeCallback>(&self, u: &Point, v: &Point, rng: &mut Pcg64, callback: &F, tid: usize) {
        let connects = if self.metric.temperature() == 0.0 {
            self.metric.below_threshold(u, v)
        } else {
            rng.gen::<f64>() < self.metric.connection_probability(u, v)
        };
        if connects {
            callback(tid, u.id, v.id);
        }
    }

    /// Geometric-jump thinning within a non-touching cell pair.
    #[allow(clippy::too_many_arguments)]
    fn sample_type2<F: EdgeCallback>(
        &self,
        i: usize,
        j: usize,
        a: usize,
        b: usize,
        level: usize,
        cell_gap: f64,
        rng: &mut Pcg64,
        callback: &F,
        tid: usize,
        coverage: &mut Coverage,
    ) {
        let helper = &self.partition.helper;
        let layer_i = &self.partition.layers[i];
        let layer_j = &self.partition.layers[j];
        let dist_lower_bound =
            self.metric
                .band_pair_distance_bound(layer_i.value_range, layer_j.value_range, cell_gap);
        let p_star = self
            .metric
            .probability_bound(layer_i.value_range, layer_j.value_range, dist_lower_bound);
        if p_star <= PROBABILITY_FLOOR {
            return;
        }

        if i == j {
            let pa = layer_i.cell_points(helper, a, level);
            let pb = layer_i.cell_points(helper, b, level);
            self.thinning_pass(pa, pb, p_star, rng, callback, tid, coverage);
        } else {
            let pa = layer_i.cell_points(helper, a, level);
            let qb = layer_j.cell_points(helper, b, level);
            self.thinning_pass(pa, qb, p_star, rng, callback, tid, coverage);

            let qa = layer_j.cell_points(helper, a, level);
            let pb = layer_i.cell_points(helper, b, level);
            self.thinning_pass(qa, pb, p_star, rng, callback, tid, coverage);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn thinning_pass<F: EdgeCallback>(
        &self,
        pts_u: &[Point],
        pts_v: &[Point],
        p_star: f64,
        rng: &mut Pcg64,
        callback: &F,
        tid: usize,
        coverage: &mut Coverage,
    ) {
        let total = pts_u.len() * pts_v.len();
        if total == 0 {
            return;
        }
        if p_star >= 1.0 {
            for u in pts_u {
                for v in pts_v {
                    coverage.type2_checks += 1;
                    self.test_and_emit(u, v, rng, callback, tid);
                }
            }
            return;
        }

        let geo = rand_distr::Geometric::new(p_star).expect("p_star in (0, 1)");
        let mut idx = geo.sample(rng) as usize;
        while idx < total {
            let ui = idx / pts_v.len();
            let vi = idx % pts_v.len();
            let u = &pts_u[ui];
            let v = &pts_v[vi];
            coverage.type2_checks += 1;
            let actual = self.metric.connection_probability(u, v);
            if rng.gen::<f64>() < (actual / p_star).min(1.0) {
                callback(tid, u.id, v.id);
            }
            idx += 1 + geo.sample(rng) as usize;
        }
    }
}

/// Deterministic, thread-count-independent per-root RNG: the stream for a
/// given root depends only on the global seed and the root's position in
/// the (fixed, thread-count-independent) sequential enumeration order.
fn root_rng(seed: u64, root_index: usize) -> Pcg64 {
    let mixed = seed
        .wrapping_add(root_index as u64)
        .wrapping_mul(0x9E37_79B9_7F4A_7C15);
    Pcg64::seed_from_u64(mixed ^ (mixed >> 33))
}
