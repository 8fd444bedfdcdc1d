#![forbid(unsafe_code)]

//! Input binding for the login screen widget.
//!
//! [`LoginScreenBinding`] adapts [`LoginScreen`] instances into reactive
//! inputs: the channel sees a boolean (the live `opened` flag), and the
//! server flips the screen by sending an update message.
//!
//! # Binding semantics
//!
//! - `find`: descendants of the scope carrying the `login-screen` marker
//!   class.
//! - `initialize`: creates the instance (idempotent — one per element),
//!   forwards the widget's `Opened` event to a `Shown` event on the element,
//!   then opens the screen unconditionally. A freshly bound login screen is
//!   always visible, regardless of any externally supplied initial value.
//! - `get_value`: the instance's `opened` flag at the moment of query, never
//!   cached.
//! - `receive_message`: a pure trigger. The payload is ignored entirely and
//!   the screen toggles: open becomes closed, closed becomes open. Sending
//!   the same message twice toggles twice.
//! - `subscribe`/`unsubscribe`: one namespaced listener covering both
//!   `Opened` and `Closed`; subscribing again first clears the namespace, so
//!   notifications never duplicate, and unsubscribing removes only this
//!   binding's listeners.
//!
//! # Failure Modes
//!
//! - `get_value`/`receive_message` before `initialize`:
//!   [`BindingError::NotInitialized`].
//! - Rapid message bursts toggle as fast as they arrive; there is no
//!   debouncing against in-flight toolkit animations.

use portico_core::{Element, EventKind, EventKinds, Namespace};
use portico_runtime::{
    BindingError, InputBinding, InputValue, InvalidateCallback, UpdateMessage,
};

use crate::login_screen::{LoginScreen, LoginScreenConfig, LoginScreens};

/// Marker class identifying login screen mount elements.
pub const MARKER_CLASS: &str = "login-screen";

/// Namespace for the channel subscription listener.
const BINDING_NS: Namespace = Namespace("portico-login");

/// Namespace for the `Opened` → `Shown` forward registered at initialize.
///
/// Kept separate from [`BINDING_NS`] so `unsubscribe` never disturbs it.
const HOOK_NS: Namespace = Namespace("portico-login-hook");

/// The login screen input binding.
pub struct LoginScreenBinding {
    screens: LoginScreens,
}

impl LoginScreenBinding {
    /// Create a binding backed by the given instance runtime.
    #[must_use]
    pub fn new(screens: LoginScreens) -> Self {
        Self { screens }
    }

    /// The instance runtime this binding creates and reads screens in.
    #[must_use]
    pub fn screens(&self) -> &LoginScreens {
        &self.screens
    }

    fn screen_for(&self, element: &Element) -> Result<LoginScreen, BindingError> {
        self.screens.get(element).ok_or(BindingError::NotInitialized {
            element: element.id(),
        })
    }
}

impl std::fmt::Debug for LoginScreenBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginScreenBinding")
            .field("screens", &self.screens)
            .finish()
    }
}

impl InputBinding for LoginScreenBinding {
    fn name(&self) -> &'static str {
        "portico.login-screen"
    }

    fn find(&self, scope: &Element) -> Vec<Element> {
        scope.query_class(MARKER_CLASS)
    }

    fn initialize(&self, element: &Element) -> Result<(), BindingError> {
        let screen = self.screens.create(LoginScreenConfig::new(element.clone()));

        // Forward the widget's Opened event as a Shown notification on the
        // element. Replace-then-add keeps re-initialization from stacking
        // forwards.
        element.off(HOOK_NS);
        let target = element.clone();
        element.on(EventKinds::OPENED, HOOK_NS, move |_| {
            target.emit(EventKind::Shown);
        });

        // A login screen is visible from the moment it is bound.
        screen.open();
        Ok(())
    }

    fn get_value(&self, element: &Element) -> Result<InputValue, BindingError> {
        Ok(InputValue::Bool(self.screen_for(element)?.opened()))
    }

    fn receive_message(
        &self,
        element: &Element,
        _message: &UpdateMessage,
    ) -> Result<(), BindingError> {
        // The message is a pulse: whatever the payload says, invert state.
        let screen = self.screen_for(element)?;
        if screen.opened() {
            screen.close();
        } else {
            screen.open();
        }
        Ok(())
    }

    fn subscribe(&self, element: &Element, callback: InvalidateCallback) {
        element.off(BINDING_NS);
        element.on(
            EventKinds::OPENED | EventKinds::CLOSED,
            BINDING_NS,
            move |_| callback(),
        );
    }

    fn unsubscribe(&self, element: &Element) {
        element.off(BINDING_NS);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
