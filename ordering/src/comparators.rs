// comparators.rs — Cacheable comparators over modules and chunks
//
// Sort sites across the bundler must order the same entities the same way
// in every build, so comparators here are shared objects with observable
// identity: deriving one from the same graph twice returns the same
// allocation, and the combinators memoize by the identity of their inputs.
// Without that stability every call site would compose fresh, unequal
// comparators and the composition caches would never hit.
//
// Preconditions: none; absent ids and indices compare via their own rank.
// Postconditions: every comparator is a total order over its inputs.
// Failure modes: none; contract violations degrade to a defined order.
// Side effects: insert-if-absent population of the identity caches.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::cache::{IdentityCache, IdentityKey, TwoKeyIdentityCache};
use crate::chunk_graph::{Chunk, ChunkGraph};
use crate::id::Id;
use crate::module_graph::{Module, ModuleGraph};

// ── Primitive comparators ───────────────────────────────────────────────────

/// Total order over ids: numeric before text, then value order.
pub fn compare_ids(a: &Id, b: &Id) -> Ordering {
    a.cmp(b)
}

fn option_rank(id: Option<&Id>) -> u8 {
    match id {
        Some(id) => id.kind_rank(),
        // Absent ids rank between numeric and text ids, so entities whose
        // id assignment has not run yet never tie with assigned ones.
        None => 1,
    }
}

/// `compare_ids` extended to ids that may not be assigned yet.
pub fn compare_id_options(a: Option<&Id>, b: Option<&Id>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => compare_ids(x, y),
        _ => option_rank(a).cmp(&option_rank(b)),
    }
}

/// Total order over optional numbers. A present value orders before an
/// absent one; callers may pass indices that have not been computed yet.
pub fn compare_numbers(a: Option<u64>, b: Option<u64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// ── Comparator and selector objects ─────────────────────────────────────────

struct ComparatorFn<T: ?Sized> {
    cmp: Box<dyn Fn(&T, &T) -> Ordering>,
}

/// A shared two-argument comparison with observable identity.
///
/// Clones share the same allocation; `Comparator::ptr_eq` is the identity
/// the composition caches key on.
pub struct Comparator<T: ?Sized + 'static> {
    inner: Rc<ComparatorFn<T>>,
}

impl<T: ?Sized + 'static> Comparator<T> {
    pub fn new(cmp: impl Fn(&T, &T) -> Ordering + 'static) -> Self {
        Comparator {
            inner: Rc::new(ComparatorFn { cmp: Box::new(cmp) }),
        }
    }

    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        (self.inner.cmp)(a, b)
    }

    /// Whether two handles refer to the same comparator allocation.
    pub fn ptr_eq(a: &Comparator<T>, b: &Comparator<T>) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }

    fn addr(&self) -> usize {
        Rc::as_ptr(&self.inner) as usize
    }

    fn identity_key(&self) -> IdentityKey {
        IdentityKey::of(&self.inner)
    }
}

impl<T: ?Sized + 'static> Clone for Comparator<T> {
    fn clone(&self) -> Self {
        Comparator {
            inner: self.inner.clone(),
        }
    }
}

struct SelectorFn<T: ?Sized, R> {
    get: Box<dyn Fn(&T) -> Option<R>>,
}

/// A shared projection with observable identity, for `compare_select`.
/// Returning `None` marks the projection as absent for the operand.
pub struct Selector<T: ?Sized + 'static, R: 'static> {
    inner: Rc<SelectorFn<T, R>>,
}

impl<T: ?Sized + 'static, R: 'static> Selector<T, R> {
    pub fn new(get: impl Fn(&T) -> Option<R> + 'static) -> Self {
        Selector {
            inner: Rc::new(SelectorFn { get: Box::new(get) }),
        }
    }

    pub fn select(&self, value: &T) -> Option<R> {
        (self.inner.get)(value)
    }

    fn addr(&self) -> usize {
        Rc::as_ptr(&self.inner) as usize
    }

    fn identity_key(&self) -> IdentityKey {
        IdentityKey::of(&self.inner)
    }
}

impl<T: ?Sized + 'static, R: 'static> Clone for Selector<T, R> {
    fn clone(&self) -> Self {
        Selector {
            inner: self.inner.clone(),
        }
    }
}

// ── Parameterized comparator families ───────────────────────────────────────

/// Memoizes the comparator derived from one auxiliary graph object, keyed
/// by the graph's reference identity. The derived comparator captures the
/// graph weakly; entries never keep a dropped graph alive, and comparing
/// through one degrades to `Equal`.
pub struct ParamizedComparator<A: 'static, T: ?Sized + 'static> {
    raw: fn(&A, &T, &T) -> Ordering,
    derived: RefCell<HashMap<usize, (Weak<A>, Comparator<T>)>>,
}

impl<A: 'static, T: ?Sized + 'static> ParamizedComparator<A, T> {
    pub fn new(raw: fn(&A, &T, &T) -> Ordering) -> Self {
        ParamizedComparator {
            raw,
            derived: RefCell::new(HashMap::new()),
        }
    }

    /// The comparator for `arg`: the same allocation on every call while
    /// `arg` is alive.
    pub fn of(&self, arg: &Rc<A>) -> Comparator<T> {
        let addr = Rc::as_ptr(arg) as usize;
        if let Some((live, cached)) = self.derived.borrow().get(&addr) {
            if live.strong_count() > 0 {
                return cached.clone();
            }
        }
        let raw = self.raw;
        let weak = Rc::downgrade(arg);
        let comparator = Comparator::new(move |a: &T, b: &T| match weak.upgrade() {
            Some(graph) => raw(&graph, a, b),
            None => Ordering::Equal,
        });
        let mut derived = self.derived.borrow_mut();
        derived.retain(|_, entry| entry.0.strong_count() > 0);
        derived.insert(addr, (Rc::downgrade(arg), comparator.clone()));
        comparator
    }
}

thread_local! {
    static CHUNKS_BY_ID: Comparator<Rc<Chunk>> =
        Comparator::new(|a: &Rc<Chunk>, b: &Rc<Chunk>| {
            compare_id_options(a.id().as_ref(), b.id().as_ref())
        });

    static MODULES_BY_IDENTIFIER: Comparator<Rc<Module>> =
        Comparator::new(|a: &Rc<Module>, b: &Rc<Module>| {
            a.identifier().cmp(b.identifier())
        });

    static MODULES_BY_ID: ParamizedComparator<ChunkGraph, Rc<Module>> =
        ParamizedComparator::new(|chunk_graph, a, b| {
            compare_id_options(
                chunk_graph.module_id(a).as_ref(),
                chunk_graph.module_id(b).as_ref(),
            )
        });

    static MODULES_BY_PRE_ORDER: ParamizedComparator<ModuleGraph, Rc<Module>> =
        ParamizedComparator::new(|module_graph, a, b| {
            match compare_numbers(
                module_graph.get_pre_order_index(a),
                module_graph.get_pre_order_index(b),
            ) {
                Ordering::Equal => a.identifier().cmp(b.identifier()),
                ord => ord,
            }
        });

    static MODULES_BY_POST_ORDER: ParamizedComparator<ModuleGraph, Rc<Module>> =
        ParamizedComparator::new(|module_graph, a, b| {
            match compare_numbers(
                module_graph.get_post_order_index(a),
                module_graph.get_post_order_index(b),
            ) {
                Ordering::Equal => a.identifier().cmp(b.identifier()),
                ord => ord,
            }
        });

    static MODULES_BY_ID_OR_IDENTIFIER: ParamizedComparator<ChunkGraph, Rc<Module>> =
        ParamizedComparator::new(|chunk_graph, a, b| {
            match compare_id_options(
                chunk_graph.module_id(a).as_ref(),
                chunk_graph.module_id(b).as_ref(),
            ) {
                Ordering::Equal => a.identifier().cmp(b.identifier()),
                ord => ord,
            }
        });

    static CHUNKS_BY_DOMAIN_ORDER: ParamizedComparator<ChunkGraph, Rc<Chunk>> =
        ParamizedComparator::new(|chunk_graph, a, b| chunk_graph.compare_chunks(a, b));
}

/// Chunks by their assigned id.
pub fn compare_chunks_by_id() -> Comparator<Rc<Chunk>> {
    CHUNKS_BY_ID.with(|c| c.clone())
}

/// Modules by their stable identifier. Already unique, so no tie-break.
pub fn compare_modules_by_identifier() -> Comparator<Rc<Module>> {
    MODULES_BY_IDENTIFIER.with(|c| c.clone())
}

/// Modules by the id assigned on the chunk graph.
pub fn compare_modules_by_id(chunk_graph: &Rc<ChunkGraph>) -> Comparator<Rc<Module>> {
    MODULES_BY_ID.with(|c| c.of(chunk_graph))
}

/// Modules by pre-order index, identifier as tie-break.
pub fn compare_modules_by_pre_order_index_or_identifier(
    module_graph: &Rc<ModuleGraph>,
) -> Comparator<Rc<Module>> {
    MODULES_BY_PRE_ORDER.with(|c| c.of(module_graph))
}

/// Modules by post-order index, identifier as tie-break.
pub fn compare_modules_by_post_order_index_or_identifier(
    module_graph: &Rc<ModuleGraph>,
) -> Comparator<Rc<Module>> {
    MODULES_BY_POST_ORDER.with(|c| c.of(module_graph))
}

/// Modules by assigned id, identifier as tie-break.
pub fn compare_modules_by_id_or_identifier(
    chunk_graph: &Rc<ChunkGraph>,
) -> Comparator<Rc<Module>> {
    MODULES_BY_ID_OR_IDENTIFIER.with(|c| c.of(chunk_graph))
}

/// Chunks by the chunk graph's domain order, preferred over raw ids.
pub fn compare_chunks(chunk_graph: &Rc<ChunkGraph>) -> Comparator<Rc<Chunk>> {
    CHUNKS_BY_DOMAIN_ORDER.with(|c| c.of(chunk_graph))
}

// ── Combinators ─────────────────────────────────────────────────────────────

thread_local! {
    static CONCAT_CACHE: TwoKeyIdentityCache = TwoKeyIdentityCache::new();
    static SELECT_CACHE: TwoKeyIdentityCache = TwoKeyIdentityCache::new();
    static ITERABLES_CACHE: IdentityCache = IdentityCache::new();
}

/// Tie-break chaining: `first`, then `second` on ties. Memoized on the
/// identity of the pair.
pub fn concat_comparators<T: ?Sized + 'static>(
    first: &Comparator<T>,
    second: &Comparator<T>,
) -> Comparator<T> {
    CONCAT_CACHE.with(|cache| {
        if let Some(inner) = cache.get::<ComparatorFn<T>>(first.addr(), second.addr()) {
            return Comparator { inner };
        }
        let (c1, c2) = (first.clone(), second.clone());
        let combined = Comparator::new(move |a: &T, b: &T| match c1.compare(a, b) {
            Ordering::Equal => c2.compare(a, b),
            ord => ord,
        });
        cache.set(
            first.identity_key(),
            second.identity_key(),
            &combined.inner,
        );
        combined
    })
}

/// Projection comparison: operands are passed through `getter` before
/// comparing. When both projections are absent the operands are equal;
/// when exactly one is absent the operand with a present projection sorts
/// first. Memoized on the `(getter, comparator)` identity pair.
pub fn compare_select<T: ?Sized + 'static, R: 'static>(
    getter: &Selector<T, R>,
    comparator: &Comparator<R>,
) -> Comparator<T> {
    SELECT_CACHE.with(|cache| {
        if let Some(inner) = cache.get::<ComparatorFn<T>>(getter.addr(), comparator.addr()) {
            return Comparator { inner };
        }
        let (get, cmp) = (getter.clone(), comparator.clone());
        let selected = Comparator::new(move |a: &T, b: &T| {
            match (get.select(a), get.select(b)) {
                (Some(a_value), Some(b_value)) => cmp.compare(&a_value, &b_value),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        });
        cache.set(getter.identity_key(), comparator.identity_key(), &selected.inner);
        selected
    })
}

/// Lexicographic comparison of sequences: elements in lockstep, first
/// nonzero element comparison wins, the exhausted sequence sorts first.
/// Memoized on the element comparator's identity.
pub fn compare_iterables<T: 'static>(element: &Comparator<T>) -> Comparator<[T]> {
    ITERABLES_CACHE.with(|cache| {
        if let Some(inner) = cache.get::<ComparatorFn<[T]>>(element.addr()) {
            return Comparator { inner };
        }
        let elem = element.clone();
        let sequenced = Comparator::new(move |a: &[T], b: &[T]| {
            let mut a_iter = a.iter();
            let mut b_iter = b.iter();
            loop {
                match (a_iter.next(), b_iter.next()) {
                    (None, None) => return Ordering::Equal,
                    (None, Some(_)) => return Ordering::Less,
                    (Some(_), None) => return Ordering::Greater,
                    (Some(x), Some(y)) => match elem.compare(x, y) {
                        Ordering::Equal => continue,
                        ord => return ord,
                    },
                }
            }
        });
        cache.set(element.identity_key(), &sequenced.inner);
        sequenced
    })
}

// ── Tests ───────────────────────────────────────────────────────────────────
