// chunk_graph.rs — Chunk graph state read by the ordering code
//
// Records chunk-to-module membership and the module-id mapping, both
// assigned by the surrounding bundler, and supplies the chunk domain order
// that sort sites prefer over comparing raw chunk ids.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::rc::Rc;

use crate::comparators::compare_id_options;
use crate::id::Id;
use crate::module_graph::{module_key, Module};

/// An output bundle unit composed of one or more modules.
///
/// The id is assigned externally and stays unset until id assignment runs.
#[derive(Debug)]
pub struct Chunk {
    name: Option<String>,
    id: RefCell<Option<Id>>,
}

impl Chunk {
    pub fn new(name: Option<&str>) -> Rc<Self> {
        Rc::new(Chunk {
            name: name.map(|n| n.to_string()),
            id: RefCell::new(None),
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn id(&self) -> Option<Id> {
        self.id.borrow().clone()
    }

    pub fn set_id(&self, id: Id) {
        *self.id.borrow_mut() = Some(id);
    }
}

fn chunk_key(chunk: &Chunk) -> usize {
    chunk as *const Chunk as usize
}

struct ChunkGraphChunk {
    modules: Vec<Rc<Module>>,
}

/// The graph recording chunk-to-module membership and module ids.
pub struct ChunkGraph {
    module_ids: RefCell<HashMap<usize, (Rc<Module>, Id)>>,
    chunks: RefCell<HashMap<usize, ChunkGraphChunk>>,
}

impl ChunkGraph {
    pub fn new() -> Self {
        ChunkGraph {
            module_ids: RefCell::new(HashMap::new()),
            chunks: RefCell::new(HashMap::new()),
        }
    }

    /// Record the externally assigned id of a module.
    pub fn set_module_id(&self, module: &Rc<Module>, id: Id) {
        self.module_ids
            .borrow_mut()
            .insert(module_key(module), (module.clone(), id));
    }

    /// The assigned module id, or `None` before id assignment.
    pub fn module_id(&self, module: &Module) -> Option<Id> {
        self.module_ids
            .borrow()
            .get(&module_key(module))
            .map(|(_, id)| id.clone())
    }

    /// Record chunk membership. Membership keeps insertion order.
    pub fn connect_chunk_and_module(&self, chunk: &Rc<Chunk>, module: &Rc<Module>) {
        let mut chunks = self.chunks.borrow_mut();
        let entry = chunks
            .entry(chunk_key(chunk))
            .or_insert_with(|| ChunkGraphChunk {
                modules: Vec::new(),
            });
        entry.modules.push(module.clone());
    }

    /// Modules of a chunk, in membership insertion order.
    pub fn chunk_modules(&self, chunk: &Chunk) -> Vec<Rc<Module>> {
        self.chunks
            .borrow()
            .get(&chunk_key(chunk))
            .map(|c| c.modules.clone())
            .unwrap_or_default()
    }

    /// Domain total order over chunks: larger membership first, then the
    /// identifier-sorted member lists pairwise, then chunk ids.
    pub fn compare_chunks(&self, a: &Chunk, b: &Chunk) -> Ordering {
        let mut a_modules = self.chunk_modules(a);
        let mut b_modules = self.chunk_modules(b);
        if a_modules.len() != b_modules.len() {
            return b_modules.len().cmp(&a_modules.len());
        }
        a_modules.sort_by(|x, y| x.identifier().cmp(y.identifier()));
        b_modules.sort_by(|x, y| x.identifier().cmp(y.identifier()));
        for (x, y) in a_modules.iter().zip(b_modules.iter()) {
            let ord = x.identifier().cmp(y.identifier());
            if ord != Ordering::Equal {
                return ord;
            }
        }
        compare_id_options(a.id().as_ref(), b.id().as_ref())
    }
}

impl Default for ChunkGraph {
    fn default() -> Self {
        Self::new()
    }
}
