#![forbid(unsafe_code)]

//! Custom widget lifecycle events and the per-element listener table.
//!
//! Widgets announce visibility transitions by emitting [`Event`]s on the
//! element they are mounted on. Interested parties (input bindings, other
//! widgets) register callbacks filtered by [`EventKinds`] and tagged with a
//! [`Namespace`], so one party can later remove exactly its own listeners
//! without disturbing anyone else's.
//!
//! # Invariants
//!
//! 1. Listeners fire in registration order.
//! 2. A listener fires only for kinds contained in its filter.
//! 3. `remove_namespace` removes all listeners under that tag, and only those.
//! 4. Dispatch operates on a snapshot: listeners added or removed from within
//!    a callback take effect from the next emit, never mid-pass.
//!
//! # Failure Modes
//!
//! - Emitting with zero matching listeners is a no-op (returns 0).
//! - Removing a namespace with no listeners is a no-op (returns 0).

use std::rc::Rc;

use web_time::Instant;

use crate::element::ElementId;

bitflags::bitflags! {
    /// Filter describing which event kinds a listener wants to observe.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EventKinds: u8 {
        /// The widget finished transitioning to visible.
        const OPENED = 1 << 0;
        /// The widget finished transitioning to hidden.
        const CLOSED = 1 << 1;
        /// Forwarded "now on screen" notification.
        const SHOWN  = 1 << 2;
    }
}

/// A single widget lifecycle event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Opened,
    Closed,
    Shown,
}

impl EventKind {
    /// The filter bit corresponding to this kind.
    #[must_use]
    pub const fn bit(self) -> EventKinds {
        match self {
            Self::Opened => EventKinds::OPENED,
            Self::Closed => EventKinds::CLOSED,
            Self::Shown => EventKinds::SHOWN,
        }
    }

    /// Canonical lowercase name, as it would appear in host markup.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Opened => "opened",
            Self::Closed => "closed",
            Self::Shown => "shown",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A lifecycle event as delivered to listeners.
#[derive(Debug, Clone, Copy)]
pub struct Event {
    /// What happened.
    pub kind: EventKind,
    /// The element the event was emitted on.
    pub target: ElementId,
    /// When the event was emitted.
    pub at: Instant,
}

/// Removal tag for listeners.
///
/// Everything registered under one namespace can be removed in a single
/// call, leaving listeners under other namespaces untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Namespace(pub &'static str);

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

type ListenerRc = Rc<dyn Fn(&Event)>;

struct ListenerEntry {
    kinds: EventKinds,
    namespace: Namespace,
    callback: ListenerRc,
}

/// Ordered listener storage for one element.
///
/// The table itself knows nothing about elements; [`crate::Element`] embeds
/// one and drives dispatch.
#[derive(Default)]
pub struct ListenerTable {
    entries: Vec<ListenerEntry>,
}

impl ListenerTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for the given kinds under a namespace tag.
    pub fn add(
        &mut self,
        kinds: EventKinds,
        namespace: Namespace,
        callback: impl Fn(&Event) + 'static,
    ) {
        self.entries.push(ListenerEntry {
            kinds,
            namespace,
            callback: Rc::new(callback),
        });
    }

    /// Remove every listener registered under `namespace`.
    ///
    /// Returns the number of listeners removed.
    pub fn remove_namespace(&mut self, namespace: Namespace) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.namespace != namespace);
        before - self.entries.len()
    }

    /// Listeners whose filter contains `kind`, in registration order.
    ///
    /// Returns owned handles so the caller can invoke them without holding
    /// any borrow of the table (snapshot dispatch, invariant 4).
    #[must_use]
    pub fn snapshot(&self, kind: EventKind) -> Vec<ListenerRc> {
        self.entries
            .iter()
            .filter(|e| e.kinds.contains(kind.bit()))
            .map(|e| Rc::clone(&e.callback))
            .collect()
    }

    /// Total number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no listeners.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of listeners registered under `namespace`.
    #[must_use]
    pub fn namespace_len(&self, namespace: Namespace) -> usize {
        self.entries
            .iter()
            .filter(|e| e.namespace == namespace)
            .count()
    }
}

impl std::fmt::Debug for ListenerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerTable")
            .field("len", &self.entries.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
