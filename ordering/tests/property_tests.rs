// Property-based tests for ordering invariants.
//
// Three categories:
// 1. Comparator laws: antisymmetry, reflexivity, transitivity over ids
// 2. Sequence comparison against the standard lexicographic model
// 3. Indexer invariants: certificates and idempotence over generated
//    graphs, including cyclic ones
//
// Uses proptest with explicit configuration to prevent CI flakiness.

use std::rc::Rc;

use proptest::prelude::*;

use loom_order::comparators::{
    compare_id_options, compare_ids, compare_iterables,
    compare_modules_by_pre_order_index_or_identifier, Comparator,
};
use loom_order::id::Id;
use loom_order::indexer::{assign_module_indices, verify_module_indices};
use loom_order::module_graph::{Module, ModuleGraph};

// ── Generators ──────────────────────────────────────────────────────────────

fn arb_id() -> impl Strategy<Value = Id> {
    prop_oneof![
        any::<u64>().prop_map(Id::Number),
        "[a-z0-9./]{0,8}".prop_map(Id::Text),
    ]
}

fn arb_optional_id() -> impl Strategy<Value = Option<Id>> {
    prop::option::of(arb_id())
}

/// Adjacency of a small directed graph; edges may form cycles and
/// self-loops on purpose.
fn arb_graph() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1usize..10).prop_flat_map(|n| {
        (
            Just(n),
            prop::collection::vec((0..n, 0..n), 0..30),
        )
    })
}

fn build_graph(node_count: usize, edges: &[(usize, usize)]) -> (ModuleGraph, Vec<Rc<Module>>) {
    let graph = ModuleGraph::new();
    let modules: Vec<Rc<Module>> = (0..node_count)
        .map(|i| Module::new(format!("./m{}.js", i)))
        .collect();
    for module in &modules {
        graph.add_module(module);
    }
    for (from, to) in edges {
        graph.add_dependency(&modules[*from], &modules[*to]);
    }
    (graph, modules)
}

// ── 1. Comparator laws ──────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 200,
        .. ProptestConfig::default()
    })]

    #[test]
    fn id_comparison_is_reflexive(a in arb_id()) {
        prop_assert_eq!(compare_ids(&a, &a), std::cmp::Ordering::Equal);
    }

    #[test]
    fn id_comparison_is_antisymmetric(a in arb_id(), b in arb_id()) {
        prop_assert_eq!(compare_ids(&a, &b), compare_ids(&b, &a).reverse());
    }

    #[test]
    fn id_comparison_is_transitive(a in arb_id(), b in arb_id(), c in arb_id()) {
        use std::cmp::Ordering::Greater;
        if compare_ids(&a, &b) != Greater && compare_ids(&b, &c) != Greater {
            prop_assert_ne!(compare_ids(&a, &c), Greater);
        }
    }

    #[test]
    fn optional_id_comparison_is_antisymmetric(a in arb_optional_id(), b in arb_optional_id()) {
        prop_assert_eq!(
            compare_id_options(a.as_ref(), b.as_ref()),
            compare_id_options(b.as_ref(), a.as_ref()).reverse()
        );
    }
}

// ── 2. Sequence comparison model ────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 200,
        .. ProptestConfig::default()
    })]

    #[test]
    fn iterables_match_lexicographic_model(
        a in prop::collection::vec(any::<u64>(), 0..8),
        b in prop::collection::vec(any::<u64>(), 0..8),
    ) {
        let numeric = Comparator::new(|x: &u64, y: &u64| x.cmp(y));
        let comparator = compare_iterables(&numeric);
        prop_assert_eq!(
            comparator.compare(&a[..], &b[..]),
            a.as_slice().cmp(b.as_slice())
        );
    }
}

// ── 3. Indexer invariants ───────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        max_shrink_iters: 100,
        .. ProptestConfig::default()
    })]

    #[test]
    fn certificates_hold_on_arbitrary_graphs((node_count, edges) in arb_graph()) {
        let (graph, modules) = build_graph(node_count, &edges);
        let entries = vec![modules[0].clone()];

        // Terminates even with cycles; the visited rule is the guarantee.
        assign_module_indices(&graph, &entries);

        let cert = verify_module_indices(&graph, &entries);
        prop_assert!(
            cert.all_pass(),
            "obligations {:?} for {} nodes, edges {:?}",
            cert.obligations(),
            node_count,
            edges
        );
        prop_assert_eq!(graph.get_pre_order_index(&modules[0]), Some(0));
    }

    #[test]
    fn indexing_twice_changes_nothing((node_count, edges) in arb_graph()) {
        let (graph, modules) = build_graph(node_count, &edges);
        let entries: Vec<Rc<Module>> = modules.iter().take(2).cloned().collect();

        assign_module_indices(&graph, &entries);
        let first: Vec<_> = modules
            .iter()
            .map(|m| (graph.get_pre_order_index(m), graph.get_post_order_index(m)))
            .collect();

        assign_module_indices(&graph, &entries);
        let second: Vec<_> = modules
            .iter()
            .map(|m| (graph.get_pre_order_index(m), graph.get_post_order_index(m)))
            .collect();

        prop_assert_eq!(first, second);
    }

    #[test]
    fn index_sorting_is_a_total_order((node_count, edges) in arb_graph()) {
        let (graph, modules) = build_graph(node_count, &edges);
        let graph = Rc::new(graph);
        let entries = vec![modules[0].clone()];
        assign_module_indices(&graph, &entries);

        let comparator = compare_modules_by_pre_order_index_or_identifier(&graph);
        let mut sorted = modules.clone();
        sorted.sort_by(|a, b| comparator.compare(a, b));

        // Adjacent elements never compare Greater after sorting, and the
        // order is antisymmetric across every pair.
        for window in sorted.windows(2) {
            prop_assert_ne!(
                comparator.compare(&window[0], &window[1]),
                std::cmp::Ordering::Greater
            );
        }
        for a in &sorted {
            for b in &sorted {
                prop_assert_eq!(
                    comparator.compare(a, b),
                    comparator.compare(b, a).reverse()
                );
            }
        }
    }
}
