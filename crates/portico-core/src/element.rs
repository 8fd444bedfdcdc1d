#![forbid(unsafe_code)]

//! Element tree with stable identity and per-element event dispatch.
//!
//! An [`Element`] is a cheap-clone shared handle to one node of the host
//! page: a tag name, a class list, string attributes, children in document
//! order, and a listener table for widget lifecycle events. Cloning an
//! `Element` clones the handle, never the node.
//!
//! Identity is the [`ElementId`] allocated at construction. Two handles are
//! equal iff they point at the same node; structural equality does not exist.
//! Registries key widget instances and channel state by `ElementId`, so an
//! element needs no `id` attribute to be addressable — attributes are plain
//! markup.
//!
//! # Invariants
//!
//! 1. `ElementId`s are process-unique and never reused.
//! 2. `descendants` / `query_class` traverse in document order (pre-order).
//! 3. `query_class` returns descendants only; the scope element itself is
//!    never part of its own result.
//! 4. `emit` dispatches on a snapshot of the listener table, so listeners may
//!    re-enter the element (emit further events, add or remove listeners)
//!    without invalidating the current pass.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use ahash::AHashMap;
use web_time::Instant;

use crate::event::{Event, EventKind, EventKinds, ListenerTable, Namespace};

/// Global counter backing [`ElementId`] allocation.
static ELEMENT_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Process-unique, stable identity of one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u64);

impl ElementId {
    /// Allocate the next unique id.
    #[must_use]
    pub fn next() -> Self {
        Self(ELEMENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw id value.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct ElementInner {
    tag: String,
    classes: Vec<String>,
    attrs: AHashMap<String, String>,
    children: Vec<Element>,
    listeners: ListenerTable,
}

/// Shared handle to one element node.
pub struct Element {
    id: ElementId,
    inner: Rc<RefCell<ElementInner>>,
}

// Manual Clone: shares the same node.
impl Clone for Element {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Rc::clone(&self.inner),
        }
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Element {}

impl std::hash::Hash for Element {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Debug for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Element")
            .field("id", &self.id)
            .field("tag", &inner.tag)
            .field("classes", &inner.classes)
            .field("children", &inner.children.len())
            .finish()
    }
}

impl Element {
    /// Create a detached element with the given tag name.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            id: ElementId::next(),
            inner: Rc::new(RefCell::new(ElementInner {
                tag: tag.into(),
                classes: Vec::new(),
                attrs: AHashMap::new(),
                children: Vec::new(),
                listeners: ListenerTable::new(),
            })),
        }
    }

    /// Builder: add a class.
    #[must_use]
    pub fn with_class(self, class: impl Into<String>) -> Self {
        self.add_class(class);
        self
    }

    /// Builder: set an attribute.
    #[must_use]
    pub fn with_attr(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// This element's stable identity.
    #[inline]
    #[must_use]
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// The tag name.
    #[must_use]
    pub fn tag(&self) -> String {
        self.inner.borrow().tag.clone()
    }

    /// Add a class if not already present.
    pub fn add_class(&self, class: impl Into<String>) {
        let class = class.into();
        let mut inner = self.inner.borrow_mut();
        if !inner.classes.contains(&class) {
            inner.classes.push(class);
        }
    }

    /// Remove a class if present.
    pub fn remove_class(&self, class: &str) {
        self.inner.borrow_mut().classes.retain(|c| c != class);
    }

    /// Whether the class list contains `class`.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.inner.borrow().classes.iter().any(|c| c == class)
    }

    /// Set an attribute, replacing any previous value.
    pub fn set_attr(&self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.borrow_mut().attrs.insert(name.into(), value.into());
    }

    /// Look up an attribute value.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<String> {
        self.inner.borrow().attrs.get(name).cloned()
    }

    /// Append a child element.
    pub fn append_child(&self, child: Element) {
        self.inner.borrow_mut().children.push(child);
    }

    /// Direct children, in document order.
    #[must_use]
    pub fn children(&self) -> Vec<Element> {
        self.inner.borrow().children.clone()
    }

    /// All descendants in document order (pre-order), excluding `self`.
    #[must_use]
    pub fn descendants(&self) -> Vec<Element> {
        let mut out = Vec::new();
        self.collect_descendants(&mut out);
        out
    }

    fn collect_descendants(&self, out: &mut Vec<Element>) {
        for child in self.inner.borrow().children.iter() {
            out.push(child.clone());
            child.collect_descendants(out);
        }
    }

    /// Descendants carrying `class`, in document order. Excludes `self`.
    #[must_use]
    pub fn query_class(&self, class: &str) -> Vec<Element> {
        self.descendants()
            .into_iter()
            .filter(|el| el.has_class(class))
            .collect()
    }

    // --- Events ---

    /// Register a listener for `kinds` under a namespace tag.
    pub fn on(
        &self,
        kinds: EventKinds,
        namespace: Namespace,
        callback: impl Fn(&Event) + 'static,
    ) {
        self.inner
            .borrow_mut()
            .listeners
            .add(kinds, namespace, callback);
    }

    /// Remove all listeners under `namespace`. Returns the count removed.
    pub fn off(&self, namespace: Namespace) -> usize {
        self.inner.borrow_mut().listeners.remove_namespace(namespace)
    }

    /// Emit a lifecycle event on this element.
    ///
    /// Listeners fire in registration order on a snapshot of the table;
    /// returns the number of listeners invoked.
    pub fn emit(&self, kind: EventKind) -> usize {
        let snapshot = self.inner.borrow().listeners.snapshot(kind);
        let ev = Event {
            kind,
            target: self.id,
            at: Instant::now(),
        };
        for cb in &snapshot {
            cb(&ev);
        }
        snapshot.len()
    }

    /// Total number of registered listeners on this element.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Number of listeners registered under `namespace`.
    #[must_use]
    pub fn namespace_listener_count(&self, namespace: Namespace) -> usize {
        self.inner.borrow().listeners.namespace_len(namespace)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
