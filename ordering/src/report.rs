// report.rs — Deterministic summary of computed traversal indices
//
// Downstream consumers key caches on orderings, so the report is built in
// an order this crate itself defines (pre-order index, identifier as
// tie-break) and serialized in two forms: compact canonical JSON for
// hashing, pretty JSON for debug output. The fingerprint is the SHA-256 of
// the canonical form; identical graphs produce byte-identical output.

use std::fmt::Write as _;
use std::rc::Rc;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::chunk_group::ChunkGroup;
use crate::comparators::{compare_modules_by_pre_order_index_or_identifier, compare_numbers};
use crate::module_graph::{Module, ModuleGraph};

/// One module's indices within a scope.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleIndexRow {
    pub identifier: String,
    pub pre_order_index: Option<u64>,
    pub post_order_index: Option<u64>,
}

/// One chunk group's local indices.
#[derive(Debug, Clone, Serialize)]
pub struct GroupIndexSection {
    pub name: String,
    pub modules: Vec<ModuleIndexRow>,
}

/// Global rows plus one section per chunk group.
#[derive(Debug, Clone, Serialize)]
pub struct IndexReport {
    pub modules: Vec<ModuleIndexRow>,
    pub groups: Vec<GroupIndexSection>,
}

/// Build the report for a graph and its chunk groups.
///
/// Global rows cover every registered module, ordered by the crate's own
/// pre-order-or-identifier comparator. Group sections list only modules
/// the group's traversal reached, ordered by the group-local pre-order.
pub fn build_index_report(graph: &Rc<ModuleGraph>, groups: &[Rc<ChunkGroup>]) -> IndexReport {
    let comparator = compare_modules_by_pre_order_index_or_identifier(graph);
    let mut modules = graph.modules();
    modules.sort_by(|a, b| comparator.compare(a, b));

    let global_rows = modules
        .iter()
        .map(|module| ModuleIndexRow {
            identifier: module.identifier().to_string(),
            pre_order_index: graph.get_pre_order_index(module),
            post_order_index: graph.get_post_order_index(module),
        })
        .collect();

    let group_sections = groups
        .iter()
        .map(|group| GroupIndexSection {
            name: group.name().unwrap_or("").to_string(),
            modules: group_rows(&modules, group),
        })
        .collect();

    IndexReport {
        modules: global_rows,
        groups: group_sections,
    }
}

fn group_rows(modules: &[Rc<Module>], group: &ChunkGroup) -> Vec<ModuleIndexRow> {
    let mut members: Vec<&Rc<Module>> = modules
        .iter()
        .filter(|module| group.get_module_pre_order_index(module).is_some())
        .collect();
    members.sort_by(|a, b| {
        match compare_numbers(
            group.get_module_pre_order_index(a),
            group.get_module_pre_order_index(b),
        ) {
            std::cmp::Ordering::Equal => a.identifier().cmp(b.identifier()),
            ord => ord,
        }
    });
    members
        .into_iter()
        .map(|module| ModuleIndexRow {
            identifier: module.identifier().to_string(),
            pre_order_index: group.get_module_pre_order_index(module),
            post_order_index: group.get_module_post_order_index(module),
        })
        .collect()
}

impl IndexReport {
    /// Compact JSON, no whitespace. The hashing input.
    pub fn canonical_json(&self) -> String {
        serde_json::to_string(self).unwrap()
    }

    /// Pretty JSON for debug output and snapshots.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap()
    }
}

/// SHA-256 of the canonical JSON, as a 64-character hex string.
pub fn report_fingerprint(report: &IndexReport) -> String {
    let mut hasher = Sha256::new();
    hasher.update(report.canonical_json().as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(64);
    for byte in digest {
        let _ = write!(hex, "{:02x}", byte);
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::{assign_chunk_group_module_indices, assign_module_indices};

    fn indexed_graph() -> (Rc<ModuleGraph>, Rc<ChunkGroup>) {
        let graph = Rc::new(ModuleGraph::new());
        let entry = Module::new("./entry.js");
        let dep = Module::new("./dep.js");
        graph.add_dependency(&entry, &dep);
        assign_module_indices(&graph, &[entry.clone()]);

        let group = ChunkGroup::new(Some("main"));
        group.add_root_module(&entry);
        assign_chunk_group_module_indices(&graph, &group);
        (graph, group)
    }

    #[test]
    fn rows_follow_pre_order() {
        let (graph, group) = indexed_graph();
        let report = build_index_report(&graph, &[group]);

        let identifiers: Vec<&str> = report
            .modules
            .iter()
            .map(|row| row.identifier.as_str())
            .collect();
        assert_eq!(identifiers, vec!["./entry.js", "./dep.js"]);
        assert_eq!(report.modules[0].pre_order_index, Some(0));
        assert_eq!(report.modules[0].post_order_index, Some(1));
        assert_eq!(report.groups[0].name, "main");
        assert_eq!(report.groups[0].modules.len(), 2);
    }

    #[test]
    fn unindexed_modules_serialize_as_null() {
        let graph = Rc::new(ModuleGraph::new());
        let island = Module::new("./island.js");
        graph.add_module(&island);

        let report = build_index_report(&graph, &[]);
        assert_eq!(
            report.canonical_json(),
            "{\"modules\":[{\"identifier\":\"./island.js\",\
             \"pre_order_index\":null,\"post_order_index\":null}],\"groups\":[]}"
        );
    }

    #[test]
    fn fingerprint_is_stable_for_identical_reports() {
        let (graph, group) = indexed_graph();
        let first = build_index_report(&graph, &[group.clone()]);
        let second = build_index_report(&graph, &[group]);
        assert_eq!(first.canonical_json(), second.canonical_json());
        assert_eq!(report_fingerprint(&first), report_fingerprint(&second));
        assert_eq!(report_fingerprint(&first).len(), 64);
    }

    #[test]
    fn fingerprint_differs_when_indices_differ() {
        let (graph, group) = indexed_graph();
        let baseline = report_fingerprint(&build_index_report(&graph, &[group]));

        let other_graph = Rc::new(ModuleGraph::new());
        let entry = Module::new("./entry.js");
        let dep = Module::new("./dep.js");
        // Reversed entry role: dep drives the traversal this time.
        other_graph.add_dependency(&dep, &entry);
        assign_module_indices(&other_graph, &[dep]);

        let other = report_fingerprint(&build_index_report(&other_graph, &[]));
        assert_ne!(baseline, other);
    }
}
