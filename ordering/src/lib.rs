// loom_order — Loom bundler ordering core
//
// Deterministic total orderings over modules and chunks, and the
// pre/post-order traversal indices those orderings read. Everything the
// bundler sorts before rendering or hashing goes through this crate.

pub mod cache;
pub mod chunk_graph;
pub mod chunk_group;
pub mod comparators;
pub mod id;
pub mod indexer;
pub mod module_graph;
pub mod report;
