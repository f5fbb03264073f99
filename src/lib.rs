//! Random graph generation for two spatial models — Geometric
//! Inhomogeneous Random Graphs (GIRGs) on a torus and Hyperbolic Random
//! Graphs (HRGs) on a hyperbolic disk — both built on a shared
//! spatial-partition edge sampler that runs in expected linear time.

pub mod calibrate;
pub mod cell;
pub mod distance;
pub mod error;
pub mod girg;
pub mod graph;
pub mod hrg;
pub mod layer;
pub mod output;
pub mod partition;
pub mod point;
pub mod rng;
pub mod sampler;
pub mod weights;

pub use error::{GenerationError, Result};
pub use girg::build_girg;
pub use graph::{Edge, Graph, Node};
pub use hrg::build_hrg;
