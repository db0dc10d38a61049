//! In-memory graph model: subjects, graphs, nodes, pins, and links.
//!
//! A `Subject` owns its graphs; graphs own their nodes; nodes own their
//! pins. Links are stored on both endpoints as `(peer node, peer pin)`.

pub mod graph;
pub mod query;
pub mod types;

pub use graph::DanglingLink;
pub use query::CallSite;
pub use types::*;
