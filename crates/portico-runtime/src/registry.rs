#![forbid(unsafe_code)]

//! Binding registry: how the channel discovers which adapters exist.
//!
//! A [`BindingRegistry`] holds bindings in registration order. The channel
//! walks it when binding a scope, so registration order decides which
//! binding claims an element first.
//!
//! A process-wide registry lives in a thread-local behind
//! [`register_binding`] / [`with_bindings`]. The composition root registers
//! every binding once during application startup — registration is an
//! explicit call, never an import-time side effect — and the registry lives
//! for the rest of the process; there is no teardown. Tests that want
//! isolation construct their own `BindingRegistry` instead.
//!
//! # Invariants
//!
//! 1. Iteration order is registration order.
//! 2. Registering a binding whose name is already present replaces the old
//!    one in place (same position), and the replacement is logged.

use std::cell::RefCell;
use std::rc::Rc;

use crate::binding::InputBinding;

/// Ordered collection of input bindings.
#[derive(Default)]
pub struct BindingRegistry {
    bindings: Vec<Rc<dyn InputBinding>>,
}

impl BindingRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a binding.
    ///
    /// If a binding with the same name is already registered, it is replaced
    /// in place and a warning is logged.
    pub fn register(&mut self, binding: Rc<dyn InputBinding>) {
        let name = binding.name();
        if let Some(slot) = self.bindings.iter_mut().find(|b| b.name() == name) {
            tracing::warn!(binding = name, "replacing previously registered binding");
            *slot = binding;
        } else {
            tracing::debug!(binding = name, "registered input binding");
            self.bindings.push(binding);
        }
    }

    /// Look up a binding by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Rc<dyn InputBinding>> {
        self.bindings
            .iter()
            .find(|b| b.name() == name)
            .map(Rc::clone)
    }

    /// All bindings, in registration order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Rc<dyn InputBinding>> {
        self.bindings.iter().map(Rc::clone).collect()
    }

    /// Number of registered bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl std::fmt::Debug for BindingRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingRegistry")
            .field("names", &self.bindings.iter().map(|b| b.name()).collect::<Vec<_>>())
            .finish()
    }
}

thread_local! {
    /// Process-wide registry (one per UI thread; the model is single-threaded).
    static GLOBAL_REGISTRY: RefCell<BindingRegistry> = RefCell::new(BindingRegistry::new());
}

/// Register a binding in the process-wide registry.
///
/// Called once per binding by the composition root during startup.
pub fn register_binding(binding: Rc<dyn InputBinding>) {
    GLOBAL_REGISTRY.with(|reg| reg.borrow_mut().register(binding));
}

/// Run `f` against the process-wide registry.
pub fn with_bindings<R>(f: impl FnOnce(&BindingRegistry) -> R) -> R {
    GLOBAL_REGISTRY.with(|reg| f(&reg.borrow()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
