// indexer.rs — Pre/post-order index assignment over the module graph
//
// Walks the dependency graph depth-first and records, for every module
// reached, the position at which it was first visited (pre-order) and the
// position at which its visit completed (post-order). The walk runs once
// per scope: the global scope covers the compilation's entries in declared
// order with one counter pair; each chunk group is its own scope with its
// own counters and visited state.
//
// Preconditions: the graph's edges are fully recorded; entry/root order is
//               the declared order.
// Postconditions: every module reachable from the scope's roots holds both
//                 indices; counters are dense and zero-based per scope.
// Failure modes: none. An already-claimed pre-order index is the visited
//                check, so cycles terminate instead of recursing forever.
// Side effects: index writes on the module graph or chunk group.

use std::collections::HashSet;
use std::rc::Rc;

use crate::chunk_group::ChunkGroup;
use crate::module_graph::{module_key, Module, ModuleGraph};

// ── Traversal ───────────────────────────────────────────────────────────────

enum Step {
    Enter(Rc<Module>),
    Leave(Rc<Module>),
}

/// Where one traversal records its indices. Claiming a pre-order index is
/// also the visited check: a claim that reports "already set" stops the
/// walk at that module, which makes first-writer-wins and cycle
/// termination the same rule.
trait IndexScope {
    fn claim_pre_order(&self, module: &Rc<Module>, index: u64) -> bool;
    fn claim_post_order(&self, module: &Rc<Module>, index: u64) -> bool;
}

struct GlobalScope<'a> {
    graph: &'a ModuleGraph,
}

impl IndexScope for GlobalScope<'_> {
    fn claim_pre_order(&self, module: &Rc<Module>, index: u64) -> bool {
        self.graph.set_pre_order_index_if_unset(module, index)
    }

    fn claim_post_order(&self, module: &Rc<Module>, index: u64) -> bool {
        self.graph.set_post_order_index_if_unset(module, index)
    }
}

struct GroupScope<'a> {
    group: &'a ChunkGroup,
}

impl IndexScope for GroupScope<'_> {
    fn claim_pre_order(&self, module: &Rc<Module>, index: u64) -> bool {
        self.group.set_module_pre_order_index_if_unset(module, index)
    }

    fn claim_post_order(&self, module: &Rc<Module>, index: u64) -> bool {
        self.group.set_module_post_order_index_if_unset(module, index)
    }
}

/// Iterative depth-first walk. An explicit stack instead of recursion so
/// pathological module chains cannot overflow the call stack.
fn traverse(graph: &ModuleGraph, roots: &[Rc<Module>], scope: &dyn IndexScope) {
    let mut next_pre_order = 0u64;
    let mut next_post_order = 0u64;
    let mut stack: Vec<Step> = Vec::new();

    for root in roots {
        stack.push(Step::Enter(root.clone()));
        while let Some(step) = stack.pop() {
            match step {
                Step::Enter(module) => {
                    if !scope.claim_pre_order(&module, next_pre_order) {
                        // Already visited in this scope: first writer wins.
                        continue;
                    }
                    next_pre_order += 1;
                    stack.push(Step::Leave(module.clone()));
                    let dependencies = graph.dependencies(&module);
                    // Reversed push so edges are entered in insertion order.
                    for dependency in dependencies.iter().rev() {
                        stack.push(Step::Enter(dependency.clone()));
                    }
                }
                Step::Leave(module) => {
                    if scope.claim_post_order(&module, next_post_order) {
                        next_post_order += 1;
                    }
                }
            }
        }
    }
}

/// Assign the compilation-wide indices. Entries are walked in declared
/// order and share one counter pair; a module reachable from several
/// entries keeps the indices of whichever traversal reached it first.
pub fn assign_module_indices(graph: &ModuleGraph, entries: &[Rc<Module>]) {
    traverse(graph, entries, &GlobalScope { graph });
}

/// Assign one chunk group's local indices, starting from the group's root
/// modules. Local counters and visited state are independent of the global
/// scope and of every other group.
pub fn assign_chunk_group_module_indices(graph: &ModuleGraph, group: &ChunkGroup) {
    let roots = group.root_modules();
    traverse(graph, &roots, &GroupScope { group });
}

// ── Verification ────────────────────────────────────────────────────────────

/// Machine-checkable evidence for the indexer postconditions.
#[derive(Debug, Clone)]
pub struct IndexCert {
    /// Every module reachable from the roots holds both indices.
    pub i1_reachable_modules_indexed: bool,
    /// Assigned pre-order indices form a dense zero-based sequence.
    pub i2_pre_order_dense: bool,
    /// Assigned post-order indices form a dense zero-based sequence.
    pub i3_post_order_dense: bool,
    /// Modules not reachable from any root hold neither index.
    pub i4_unreachable_modules_unindexed: bool,
}

impl IndexCert {
    pub fn all_pass(&self) -> bool {
        self.i1_reachable_modules_indexed
            && self.i2_pre_order_dense
            && self.i3_post_order_dense
            && self.i4_unreachable_modules_unindexed
    }

    pub fn obligations(&self) -> Vec<(&'static str, bool)> {
        vec![
            (
                "i1_reachable_modules_indexed",
                self.i1_reachable_modules_indexed,
            ),
            ("i2_pre_order_dense", self.i2_pre_order_dense),
            ("i3_post_order_dense", self.i3_post_order_dense),
            (
                "i4_unreachable_modules_unindexed",
                self.i4_unreachable_modules_unindexed,
            ),
        ]
    }
}

fn reachable_from(graph: &ModuleGraph, roots: &[Rc<Module>]) -> Vec<Rc<Module>> {
    let mut seen: HashSet<usize> = HashSet::new();
    let mut stack: Vec<Rc<Module>> = Vec::new();
    let mut reached = Vec::new();
    for root in roots {
        stack.push(root.clone());
        while let Some(module) = stack.pop() {
            if !seen.insert(module_key(&module)) {
                continue;
            }
            for dependency in graph.dependencies(&module).iter().rev() {
                stack.push(dependency.clone());
            }
            reached.push(module);
        }
    }
    reached
}

fn dense_zero_based(mut indices: Vec<u64>) -> bool {
    indices.sort_unstable();
    indices
        .iter()
        .enumerate()
        .all(|(position, index)| *index == position as u64)
}

/// Verify the global-scope postconditions after `assign_module_indices`.
pub fn verify_module_indices(graph: &ModuleGraph, entries: &[Rc<Module>]) -> IndexCert {
    verify_scope(
        graph,
        entries,
        &|m| graph.get_pre_order_index(m),
        &|m| graph.get_post_order_index(m),
    )
}

/// Verify one chunk group's local indices after
/// `assign_chunk_group_module_indices`.
pub fn verify_chunk_group_indices(graph: &ModuleGraph, group: &ChunkGroup) -> IndexCert {
    let roots = group.root_modules();
    verify_scope(
        graph,
        &roots,
        &|m| group.get_module_pre_order_index(m),
        &|m| group.get_module_post_order_index(m),
    )
}

fn verify_scope(
    graph: &ModuleGraph,
    roots: &[Rc<Module>],
    pre_of: &dyn Fn(&Module) -> Option<u64>,
    post_of: &dyn Fn(&Module) -> Option<u64>,
) -> IndexCert {
    let reached = reachable_from(graph, roots);
    let reached_keys: HashSet<usize> = reached.iter().map(|m| module_key(m)).collect();

    let i1 = reached
        .iter()
        .all(|m| pre_of(m).is_some() && post_of(m).is_some());
    let i2 = dense_zero_based(reached.iter().filter_map(|m| pre_of(m)).collect());
    let i3 = dense_zero_based(reached.iter().filter_map(|m| post_of(m)).collect());
    let i4 = graph
        .modules()
        .iter()
        .filter(|m| !reached_keys.contains(&module_key(m)))
        .all(|m| pre_of(m).is_none() && post_of(m).is_none());

    IndexCert {
        i1_reachable_modules_indexed: i1,
        i2_pre_order_dense: i2,
        i3_post_order_dense: i3,
        i4_unreachable_modules_unindexed: i4,
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
