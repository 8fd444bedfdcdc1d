#![forbid(unsafe_code)]

//! Modal login screen widget and its per-element instance runtime.
//!
//! A [`LoginScreen`] is a full-screen modal the toolkit overlays on the page.
//! The widget here carries only the state the binding layer cares about: the
//! `opened` flag and the lifecycle events announcing its transitions. Visual
//! styling, layout, and animation mechanics belong to the rendering toolkit
//! and are out of scope.
//!
//! [`LoginScreens`] owns every live instance, keyed by the mount element's
//! identity. At most one instance exists per element; `create` against an
//! element that already has one hands back the existing instance.
//!
//! # Invariants
//!
//! 1. One instance per element, enforced by [`LoginScreens::create`].
//! 2. `open`/`close` emit `Opened`/`Closed` on the mount element only when
//!    the state actually changes; a redundant call is a silent no-op.
//! 3. `opened()` is a pure read.
//!
//! # Failure Modes
//!
//! - `get` for an element with no instance returns `None` (no panic).
//! - Rapid alternating `open`/`close` calls are applied in order with no
//!   debouncing; the toolkit's animation layer is expected to catch up on
//!   its own.

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;

use portico_core::{Element, ElementId, EventKind};

/// Configuration for creating a [`LoginScreen`].
#[derive(Debug, Clone)]
pub struct LoginScreenConfig {
    element: Element,
    animate: bool,
}

impl LoginScreenConfig {
    /// Configure a login screen mounted on `element`.
    #[must_use]
    pub fn new(element: Element) -> Self {
        Self {
            element,
            animate: true,
        }
    }

    /// Whether open/close transitions animate. State flips are immediate
    /// either way; this flag is advisory for the rendering toolkit.
    #[must_use]
    pub fn animate(mut self, animate: bool) -> Self {
        self.animate = animate;
        self
    }

    /// The mount element.
    #[must_use]
    pub fn element(&self) -> &Element {
        &self.element
    }
}

struct LoginScreenInner {
    element: Element,
    opened: bool,
    animate: bool,
}

/// Live handle to one modal login screen instance.
///
/// Cloning shares the same instance.
pub struct LoginScreen {
    inner: Rc<RefCell<LoginScreenInner>>,
}

impl Clone for LoginScreen {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl std::fmt::Debug for LoginScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("LoginScreen")
            .field("element", &inner.element.id())
            .field("opened", &inner.opened)
            .finish()
    }
}

impl LoginScreen {
    fn from_config(config: LoginScreenConfig) -> Self {
        Self {
            inner: Rc::new(RefCell::new(LoginScreenInner {
                element: config.element,
                opened: false,
                animate: config.animate,
            })),
        }
    }

    /// The element this screen is mounted on.
    #[must_use]
    pub fn element(&self) -> Element {
        self.inner.borrow().element.clone()
    }

    /// Current visibility state.
    #[must_use]
    pub fn opened(&self) -> bool {
        self.inner.borrow().opened
    }

    /// Whether transitions animate.
    #[must_use]
    pub fn animate(&self) -> bool {
        self.inner.borrow().animate
    }

    /// Make the screen visible. Emits `Opened` on the mount element if the
    /// state changed; returns whether it did.
    pub fn open(&self) -> bool {
        let element = {
            let mut inner = self.inner.borrow_mut();
            if inner.opened {
                return false;
            }
            inner.opened = true;
            inner.element.clone()
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(element = %element.id(), "login screen opened");
        element.emit(EventKind::Opened);
        true
    }

    /// Hide the screen. Emits `Closed` on the mount element if the state
    /// changed; returns whether it did.
    pub fn close(&self) -> bool {
        let element = {
            let mut inner = self.inner.borrow_mut();
            if !inner.opened {
                return false;
            }
            inner.opened = false;
            inner.element.clone()
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(element = %element.id(), "login screen closed");
        element.emit(EventKind::Closed);
        true
    }
}

/// Instance runtime: every live [`LoginScreen`], keyed by mount element
/// identity. Cloning shares the same registry.
pub struct LoginScreens {
    inner: Rc<RefCell<AHashMap<ElementId, LoginScreen>>>,
}

impl Clone for LoginScreens {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl Default for LoginScreens {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LoginScreens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginScreens")
            .field("len", &self.inner.borrow().len())
            .finish()
    }
}

impl LoginScreens {
    /// Create an empty instance runtime.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(AHashMap::new())),
        }
    }

    /// Create a screen for the configured element, or hand back the existing
    /// instance if one is already mounted there.
    pub fn create(&self, config: LoginScreenConfig) -> LoginScreen {
        let id = config.element().id();
        if let Some(existing) = self.inner.borrow().get(&id) {
            return existing.clone();
        }
        let screen = LoginScreen::from_config(config);
        self.inner.borrow_mut().insert(id, screen.clone());
        screen
    }

    /// Look up the instance mounted on `element`.
    #[must_use]
    pub fn get(&self, element: &Element) -> Option<LoginScreen> {
        self.inner.borrow().get(&element.id()).cloned()
    }

    /// Drop the instance mounted on `element`, returning it if present.
    ///
    /// Called when the host removes the element from the page.
    pub fn remove(&self, element: &Element) -> Option<LoginScreen> {
        self.inner.borrow_mut().remove(&element.id())
    }

    /// Number of live instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    /// Whether no instances are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
