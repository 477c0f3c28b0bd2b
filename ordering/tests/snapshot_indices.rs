// Snapshot tests: lock the index report output to detect unintended
// formatting or ordering changes.
//
// Snapshots are managed by `insta` and stored under `tests/snapshots/`.
// Run `cargo insta review` after intentional output changes to update
// baselines.

use std::rc::Rc;

use loom_order::chunk_group::ChunkGroup;
use loom_order::indexer::{assign_chunk_group_module_indices, assign_module_indices};
use loom_order::module_graph::{Module, ModuleGraph};
use loom_order::report::build_index_report;

/// entry requires a and b; b requires a again.
fn indexed_fixture() -> (Rc<ModuleGraph>, Vec<Rc<ChunkGroup>>) {
    let graph = Rc::new(ModuleGraph::new());
    let entry = Module::new("./entry.js");
    let a = Module::new("./a.js");
    let b = Module::new("./b.js");
    graph.add_dependency(&entry, &a);
    graph.add_dependency(&entry, &b);
    graph.add_dependency(&b, &a);

    assign_module_indices(&graph, &[entry.clone()]);

    let group = ChunkGroup::new(Some("main"));
    group.add_root_module(&entry);
    assign_chunk_group_module_indices(&graph, &group);

    (graph, vec![group])
}

#[test]
fn canonical_report_snapshot() {
    let (graph, groups) = indexed_fixture();
    let report = build_index_report(&graph, &groups);
    insta::assert_snapshot!("canonical_report", report.canonical_json());
}

#[test]
fn pretty_report_snapshot() {
    let (graph, groups) = indexed_fixture();
    let report = build_index_report(&graph, &groups);
    insta::assert_snapshot!("pretty_report", report.to_json());
}
