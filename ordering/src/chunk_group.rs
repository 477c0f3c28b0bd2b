// chunk_group.rs — Chunk group with group-local traversal indices
//
// A chunk group is the set of chunks produced for one entry point or one
// async split point. It owns a local pre/post-order index per module,
// independent of the global module-graph indices and of every other group.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::chunk_graph::Chunk;
use crate::module_graph::{module_key, Module};

pub struct ChunkGroup {
    name: Option<String>,
    chunks: RefCell<Vec<Rc<Chunk>>>,
    /// Entry or split-point modules, in declared order. Traversal roots.
    root_modules: RefCell<Vec<Rc<Module>>>,
    pre_order_indices: RefCell<HashMap<usize, (Rc<Module>, u64)>>,
    post_order_indices: RefCell<HashMap<usize, (Rc<Module>, u64)>>,
}

impl ChunkGroup {
    pub fn new(name: Option<&str>) -> Rc<Self> {
        Rc::new(ChunkGroup {
            name: name.map(|n| n.to_string()),
            chunks: RefCell::new(Vec::new()),
            root_modules: RefCell::new(Vec::new()),
            pre_order_indices: RefCell::new(HashMap::new()),
            post_order_indices: RefCell::new(HashMap::new()),
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn add_chunk(&self, chunk: &Rc<Chunk>) {
        self.chunks.borrow_mut().push(chunk.clone());
    }

    pub fn chunks(&self) -> Vec<Rc<Chunk>> {
        self.chunks.borrow().clone()
    }

    pub fn add_root_module(&self, module: &Rc<Module>) {
        self.root_modules.borrow_mut().push(module.clone());
    }

    pub fn root_modules(&self) -> Vec<Rc<Module>> {
        self.root_modules.borrow().clone()
    }

    pub fn get_module_pre_order_index(&self, module: &Module) -> Option<u64> {
        self.pre_order_indices
            .borrow()
            .get(&module_key(module))
            .map(|(_, index)| *index)
    }

    pub fn get_module_post_order_index(&self, module: &Module) -> Option<u64> {
        self.post_order_indices
            .borrow()
            .get(&module_key(module))
            .map(|(_, index)| *index)
    }

    /// Record the group-local pre-order index unless one is already present.
    /// Returns whether the write happened.
    pub fn set_module_pre_order_index_if_unset(&self, module: &Rc<Module>, index: u64) -> bool {
        let mut indices = self.pre_order_indices.borrow_mut();
        let key = module_key(module);
        if indices.contains_key(&key) {
            return false;
        }
        indices.insert(key, (module.clone(), index));
        true
    }

    /// Record the group-local post-order index unless one is already present.
    /// Returns whether the write happened.
    pub fn set_module_post_order_index_if_unset(&self, module: &Rc<Module>, index: u64) -> bool {
        let mut indices = self.post_order_indices.borrow_mut();
        let key = module_key(module);
        if indices.contains_key(&key) {
            return false;
        }
        indices.insert(key, (module.clone(), index));
        true
    }
}
