// module_graph.rs — Module graph state read by the ordering code
//
// Holds the slice of dependency-graph state that ordering needs: per-module
// outgoing edges in insertion order, and the traversal indices recorded by
// the indexer. Modules are shared graph nodes (`Rc`); identity is the
// allocation address, never the identifier value.
//
// Preconditions: none.
// Postconditions: indices are write-once; `set_*_if_unset` reports whether
//                 the write happened and never overwrites.
// Failure modes: none; lookups on unknown modules return `None`/empty.
// Side effects: none beyond the recorded state.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A unit of source code tracked in the dependency graph.
///
/// The identifier is stable and unique within a compilation and serves as
/// the ultimate tie-break for every ordering.
#[derive(Debug)]
pub struct Module {
    identifier: String,
}

impl Module {
    pub fn new(identifier: impl Into<String>) -> Rc<Self> {
        Rc::new(Module {
            identifier: identifier.into(),
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

pub(crate) fn module_key(module: &Module) -> usize {
    module as *const Module as usize
}

/// Per-module bookkeeping: edges plus the two traversal indices. The
/// module itself is retained by the registration order list, which also
/// pins its address for the identity key.
struct ModuleGraphModule {
    outgoing: Vec<Rc<Module>>,
    pre_order_index: Cell<Option<u64>>,
    post_order_index: Cell<Option<u64>>,
}

impl ModuleGraphModule {
    fn new() -> Self {
        ModuleGraphModule {
            outgoing: Vec::new(),
            pre_order_index: Cell::new(None),
            post_order_index: Cell::new(None),
        }
    }
}

/// The graph of modules and their dependency edges, plus derived per-module
/// traversal indices.
pub struct ModuleGraph {
    modules: RefCell<HashMap<usize, ModuleGraphModule>>,
    /// Registration order, used for deterministic enumeration.
    order: RefCell<Vec<Rc<Module>>>,
}

impl ModuleGraph {
    pub fn new() -> Self {
        ModuleGraph {
            modules: RefCell::new(HashMap::new()),
            order: RefCell::new(Vec::new()),
        }
    }

    /// Register a module. Idempotent; insertion order is preserved.
    pub fn add_module(&self, module: &Rc<Module>) {
        let mut modules = self.modules.borrow_mut();
        let key = module_key(module);
        if !modules.contains_key(&key) {
            modules.insert(key, ModuleGraphModule::new());
            self.order.borrow_mut().push(module.clone());
        }
    }

    /// Record a dependency edge. Edges keep their insertion order; that
    /// order is what the traversal follows.
    pub fn add_dependency(&self, from: &Rc<Module>, to: &Rc<Module>) {
        self.add_module(from);
        self.add_module(to);
        let mut modules = self.modules.borrow_mut();
        if let Some(entry) = modules.get_mut(&module_key(from)) {
            entry.outgoing.push(to.clone());
        }
    }

    /// Outgoing dependency edges of a module, in insertion order.
    pub fn dependencies(&self, module: &Module) -> Vec<Rc<Module>> {
        self.modules
            .borrow()
            .get(&module_key(module))
            .map(|m| m.outgoing.clone())
            .unwrap_or_default()
    }

    /// All registered modules in registration order.
    pub fn modules(&self) -> Vec<Rc<Module>> {
        self.order.borrow().clone()
    }

    pub fn get_pre_order_index(&self, module: &Module) -> Option<u64> {
        self.modules
            .borrow()
            .get(&module_key(module))
            .and_then(|m| m.pre_order_index.get())
    }

    pub fn get_post_order_index(&self, module: &Module) -> Option<u64> {
        self.modules
            .borrow()
            .get(&module_key(module))
            .and_then(|m| m.post_order_index.get())
    }

    /// Record the pre-order index unless one is already present.
    /// Returns whether the write happened.
    pub fn set_pre_order_index_if_unset(&self, module: &Rc<Module>, index: u64) -> bool {
        self.add_module(module);
        let modules = self.modules.borrow();
        match modules.get(&module_key(module)) {
            Some(entry) if entry.pre_order_index.get().is_none() => {
                entry.pre_order_index.set(Some(index));
                true
            }
            _ => false,
        }
    }

    /// Record the post-order index unless one is already present.
    /// Returns whether the write happened.
    pub fn set_post_order_index_if_unset(&self, module: &Rc<Module>, index: u64) -> bool {
        self.add_module(module);
        let modules = self.modules.borrow();
        match modules.get(&module_key(module)) {
            Some(entry) if entry.post_order_index.get().is_none() => {
                entry.post_order_index.set(Some(index));
                true
            }
            _ => false,
        }
    }

    fn edge_count(&self) -> usize {
        self.modules
            .borrow()
            .values()
            .map(|m| m.outgoing.len())
            .sum()
    }
}

impl Default for ModuleGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ModuleGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ModuleGraph ({} modules, {} edges)",
            self.order.borrow().len(),
            self.edge_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dependencies_keep_insertion_order() {
        let graph = ModuleGraph::new();
        let a = Module::new("./a.js");
        let b = Module::new("./b.js");
        let c = Module::new("./c.js");
        graph.add_dependency(&a, &c);
        graph.add_dependency(&a, &b);

        let deps: Vec<String> = graph
            .dependencies(&a)
            .iter()
            .map(|m| m.identifier().to_string())
            .collect();
        assert_eq!(deps, vec!["./c.js", "./b.js"]);
    }

    #[test]
    fn indices_are_write_once() {
        let graph = ModuleGraph::new();
        let a = Module::new("./a.js");

        assert!(graph.set_pre_order_index_if_unset(&a, 0));
        assert!(!graph.set_pre_order_index_if_unset(&a, 9));
        assert_eq!(graph.get_pre_order_index(&a), Some(0));

        assert!(graph.set_post_order_index_if_unset(&a, 3));
        assert!(!graph.set_post_order_index_if_unset(&a, 1));
        assert_eq!(graph.get_post_order_index(&a), Some(3));
    }

    #[test]
    fn identity_is_the_allocation_not_the_identifier() {
        let graph = ModuleGraph::new();
        let first = Module::new("./same.js");
        let second = Module::new("./same.js");

        assert!(graph.set_pre_order_index_if_unset(&first, 0));
        assert!(graph.set_pre_order_index_if_unset(&second, 1));
        assert_eq!(graph.get_pre_order_index(&first), Some(0));
        assert_eq!(graph.get_pre_order_index(&second), Some(1));
    }

    #[test]
    fn unknown_module_reads_as_unset() {
        let graph = ModuleGraph::new();
        let stray = Module::new("./stray.js");
        assert_eq!(graph.get_pre_order_index(&stray), None);
        assert_eq!(graph.get_post_order_index(&stray), None);
        assert!(graph.dependencies(&stray).is_empty());
    }

    #[test]
    fn display_summarizes_size() {
        let graph = ModuleGraph::new();
        let a = Module::new("./a.js");
        let b = Module::new("./b.js");
        graph.add_dependency(&a, &b);
        assert_eq!(format!("{}", graph), "ModuleGraph (2 modules, 1 edges)");
    }
}
