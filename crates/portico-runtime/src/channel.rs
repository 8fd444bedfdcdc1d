#![forbid(unsafe_code)]

//! Host-side driver for bound inputs.
//!
//! A [`ReactiveChannel`] walks a scope with every registered binding,
//! initializes each discovered element exactly once, subscribes for
//! invalidation, and from then on re-derives the element's value whenever
//! the binding signals a change. Server-side consumers read the last derived
//! value with [`value`](ReactiveChannel::value) or observe changes with
//! [`watch`](ReactiveChannel::watch), and push updates back down with
//! [`deliver`](ReactiveChannel::deliver).
//!
//! # Invariants
//!
//! 1. `initialize` runs at most once per element, and always before
//!    `get_value` / `receive_message` / `subscribe` on that element.
//! 2. An invalidation immediately re-reads the binding's value; the binding
//!    is the source of truth at the moment of query.
//! 3. A re-derived value equal to the stored one is a no-op: no version
//!    bump, no watcher notification.
//! 4. Watchers are notified in registration order; dead watchers are pruned
//!    lazily during notification.
//!
//! # Failure Modes
//!
//! - Re-entrant `deliver` from within a watcher callback: the channel's
//!   internal borrow is released before bindings or watchers run, so
//!   re-entry is safe; a widget that keeps toggling itself from its own
//!   watcher will simply loop.
//! - A binding error during `bind_scope` skips that element (logged, not
//!   fatal); errors from `value` / `deliver` / `watch` surface to the caller.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use ahash::AHashMap;

use portico_core::{Element, ElementId};

use crate::binding::{BindingError, InputBinding, InputValue, InvalidateCallback, UpdateMessage};
use crate::registry::{BindingRegistry, with_bindings};

type WatcherRc = Rc<dyn Fn(&InputValue)>;
type WatcherWeak = Weak<dyn Fn(&InputValue)>;

/// One element bound to one input binding.
struct BoundInput {
    element: Element,
    binding: Rc<dyn InputBinding>,
    value: InputValue,
    version: u64,
    watchers: Vec<WatcherWeak>,
}

struct ChannelInner {
    bound: AHashMap<ElementId, BoundInput>,
}

/// Reactive input channel. Cloning shares the same channel state.
pub struct ReactiveChannel {
    inner: Rc<RefCell<ChannelInner>>,
}

impl Clone for ReactiveChannel {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl Default for ReactiveChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ReactiveChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactiveChannel")
            .field("bound", &self.inner.borrow().bound.len())
            .finish()
    }
}

impl ReactiveChannel {
    /// Create a channel with no bound inputs.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ChannelInner {
                bound: AHashMap::new(),
            })),
        }
    }

    /// Bind every candidate element under `scope` using the process-wide
    /// registry. Returns the number of newly bound elements.
    pub fn bind_scope(&self, scope: &Element) -> usize {
        let bindings = with_bindings(BindingRegistry::snapshot);
        self.bind_with(scope, &bindings)
    }

    /// Bind every candidate element under `scope` using an explicit
    /// registry. Returns the number of newly bound elements.
    pub fn bind_scope_with(&self, scope: &Element, registry: &BindingRegistry) -> usize {
        self.bind_with(scope, &registry.snapshot())
    }

    fn bind_with(&self, scope: &Element, bindings: &[Rc<dyn InputBinding>]) -> usize {
        let mut newly_bound = 0;
        for binding in bindings {
            for element in binding.find(scope) {
                let id = element.id();
                if self.inner.borrow().bound.contains_key(&id) {
                    // Already bound: initialize runs exactly once per element.
                    continue;
                }
                if let Err(err) = binding.initialize(&element) {
                    tracing::warn!(
                        binding = binding.name(),
                        element = %id,
                        %err,
                        "skipping element: initialize failed"
                    );
                    continue;
                }
                let seed = match binding.get_value(&element) {
                    Ok(value) => value,
                    Err(err) => {
                        tracing::warn!(
                            binding = binding.name(),
                            element = %id,
                            %err,
                            "seed read failed after initialize"
                        );
                        InputValue::Null
                    }
                };
                tracing::debug!(binding = binding.name(), element = %id, "bound input");
                self.inner.borrow_mut().bound.insert(
                    id,
                    BoundInput {
                        element: element.clone(),
                        binding: Rc::clone(binding),
                        value: seed,
                        version: 0,
                        watchers: Vec::new(),
                    },
                );

                let weak = Rc::downgrade(&self.inner);
                let callback: InvalidateCallback = Rc::new(move || {
                    if let Some(inner) = weak.upgrade() {
                        Self::invalidate(&inner, id);
                    }
                });
                binding.subscribe(&element, callback);
                newly_bound += 1;
            }
        }
        newly_bound
    }

    /// Re-read the value for `id` and notify watchers if it changed.
    fn invalidate(inner: &Rc<RefCell<ChannelInner>>, id: ElementId) {
        let (element, binding) = {
            let inner_ref = inner.borrow();
            let Some(bound) = inner_ref.bound.get(&id) else {
                return;
            };
            (bound.element.clone(), Rc::clone(&bound.binding))
        };

        let fresh = match binding.get_value(&element) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(binding = binding.name(), element = %id, %err, "value re-read failed");
                return;
            }
        };

        let watchers: Vec<WatcherRc> = {
            let mut inner_mut = inner.borrow_mut();
            let Some(bound) = inner_mut.bound.get_mut(&id) else {
                return;
            };
            if bound.value == fresh {
                return;
            }
            bound.value = fresh.clone();
            bound.version += 1;
            bound.watchers.retain(|w| w.strong_count() > 0);
            bound.watchers.iter().filter_map(Weak::upgrade).collect()
        };

        tracing::trace!(element = %id, value = ?fresh, "input changed");
        for watcher in &watchers {
            watcher(&fresh);
        }
    }

    /// Whether `element` is currently bound.
    #[must_use]
    pub fn is_bound(&self, element: &Element) -> bool {
        self.inner.borrow().bound.contains_key(&element.id())
    }

    /// Number of bound inputs.
    #[must_use]
    pub fn bound_count(&self) -> usize {
        self.inner.borrow().bound.len()
    }

    /// The last derived value for `element`.
    pub fn value(&self, element: &Element) -> Result<InputValue, BindingError> {
        let inner = self.inner.borrow();
        inner
            .bound
            .get(&element.id())
            .map(|b| b.value.clone())
            .ok_or(BindingError::NotBound {
                element: element.id(),
            })
    }

    /// How many times the value for `element` has changed since binding.
    pub fn version(&self, element: &Element) -> Result<u64, BindingError> {
        let inner = self.inner.borrow();
        inner
            .bound
            .get(&element.id())
            .map(|b| b.version)
            .ok_or(BindingError::NotBound {
                element: element.id(),
            })
    }

    /// Observe value changes for `element`.
    ///
    /// The callback fires after each change, with the new value. Dropping the
    /// returned [`WatchGuard`] stops notifications.
    pub fn watch(
        &self,
        element: &Element,
        callback: impl Fn(&InputValue) + 'static,
    ) -> Result<WatchGuard, BindingError> {
        let strong: WatcherRc = Rc::new(callback);
        let mut inner = self.inner.borrow_mut();
        let bound = inner
            .bound
            .get_mut(&element.id())
            .ok_or(BindingError::NotBound {
                element: element.id(),
            })?;
        bound.watchers.push(Rc::downgrade(&strong));
        Ok(WatchGuard { _guard: strong })
    }

    /// Route a host→client update to the binding owning `element`.
    pub fn deliver(
        &self,
        element: &Element,
        message: &UpdateMessage,
    ) -> Result<(), BindingError> {
        let binding = {
            let inner = self.inner.borrow();
            let bound = inner
                .bound
                .get(&element.id())
                .ok_or(BindingError::NotBound {
                    element: element.id(),
                })?;
            Rc::clone(&bound.binding)
        };
        // Borrow released: receive_message may re-enter via invalidation.
        binding.receive_message(element, message)
    }

    /// Unsubscribe and drop channel state for `element`.
    ///
    /// The widget instance itself stays alive — it is owned by the widget
    /// runtime, not the channel.
    pub fn unbind(&self, element: &Element) -> Result<(), BindingError> {
        let bound = self.inner.borrow_mut().bound.remove(&element.id()).ok_or(
            BindingError::NotBound {
                element: element.id(),
            },
        )?;
        bound.binding.unsubscribe(element);
        tracing::debug!(element = %element.id(), "unbound input");
        Ok(())
    }

    /// Unbind every bound element that is a descendant of `scope`.
    /// Returns the number of elements unbound.
    pub fn unbind_scope(&self, scope: &Element) -> usize {
        let victims: Vec<Element> = {
            let inner = self.inner.borrow();
            scope
                .descendants()
                .into_iter()
                .filter(|el| inner.bound.contains_key(&el.id()))
                .collect()
        };
        let mut removed = 0;
        for element in &victims {
            if self.unbind(element).is_ok() {
                removed += 1;
            }
        }
        removed
    }
}

/// RAII guard for a watcher registered via [`ReactiveChannel::watch`].
///
/// Dropping the guard drops the strong callback reference; the channel's
/// weak entry fails to upgrade on the next notification and is pruned.
pub struct WatchGuard {
    _guard: WatcherRc,
}

impl std::fmt::Debug for WatchGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchGuard").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
