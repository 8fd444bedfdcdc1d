#![forbid(unsafe_code)]

//! The input-binding contract between widgets and the reactive channel.
//!
//! An [`InputBinding`] adapts one widget family into an input source the
//! channel can drive without knowing anything about the widget: discovery
//! ([`find`](InputBinding::find)), one-time setup
//! ([`initialize`](InputBinding::initialize)), value extraction
//! ([`get_value`](InputBinding::get_value)), host→client updates
//! ([`receive_message`](InputBinding::receive_message)), and change
//! notification ([`subscribe`](InputBinding::subscribe) /
//! [`unsubscribe`](InputBinding::unsubscribe)).
//!
//! # Contract
//!
//! The channel guarantees `initialize` completes before any other per-element
//! call, and calls it at most once per element. In return a binding must
//! guarantee:
//!
//! 1. `initialize` is idempotent — re-running it against an element never
//!    duplicates widget instances or listeners.
//! 2. `get_value` reads live widget state and never mutates it.
//! 3. `subscribe` twice without an intervening `unsubscribe` must not
//!    duplicate notifications.
//! 4. `unsubscribe` removes exactly this binding's listeners, leaving other
//!    parties' listeners on the same element alone.
//!
//! # Failure Modes
//!
//! - `get_value` / `receive_message` on an element that was never
//!   initialized: [`BindingError::NotInitialized`]. Bindings do not recover
//!   locally; the fault surfaces to the caller.
//! - Malformed message payloads: accepted. A binding is free to ignore the
//!   payload entirely, and the contract places no validation requirement on
//!   it.

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use portico_core::{Element, ElementId};

/// Zero-argument invalidation signal.
///
/// Invoking it tells the channel "re-read my value now". It never carries the
/// value itself.
pub type InvalidateCallback = Rc<dyn Fn()>;

/// A value extracted from a bound widget.
#[derive(Debug, Clone, PartialEq)]
pub enum InputValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl InputValue {
    /// The boolean payload, if this is a `Bool`.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The integer payload, if this is an `Int`.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The text payload, if this is a `Text`.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for InputValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for InputValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for InputValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for InputValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for InputValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&InputValue> for Value {
    fn from(value: &InputValue) -> Self {
        match value {
            InputValue::Null => Value::Null,
            InputValue::Bool(b) => Value::Bool(*b),
            InputValue::Int(i) => Value::from(*i),
            InputValue::Float(f) => Value::from(*f),
            InputValue::Text(s) => Value::String(s.clone()),
        }
    }
}

/// Opaque host→client update payload.
///
/// The server decides the shape; bindings decide how much of it to read.
/// Nothing here validates the payload — a binding that treats the message as
/// a pure trigger simply never looks inside.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateMessage {
    payload: Value,
}

impl UpdateMessage {
    /// A message with an empty (`null`) payload.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap an arbitrary JSON payload.
    #[must_use]
    pub fn from_json(payload: Value) -> Self {
        Self { payload }
    }

    /// The raw payload.
    #[must_use]
    pub fn payload(&self) -> &Value {
        &self.payload
    }
}

impl From<Value> for UpdateMessage {
    fn from(payload: Value) -> Self {
        Self { payload }
    }
}

/// Errors surfaced by bindings and the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingError {
    /// The element has no widget instance; `initialize` never ran for it.
    NotInitialized { element: ElementId },
    /// The channel holds no bound input for this element.
    NotBound { element: ElementId },
}

impl std::fmt::Display for BindingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotInitialized { element } => {
                write!(f, "no widget instance registered for element {element}")
            }
            Self::NotBound { element } => {
                write!(f, "element {element} is not bound to any input")
            }
        }
    }
}

impl std::error::Error for BindingError {}

/// Adapter turning one widget family into a reactive input source.
///
/// Implementations are registered with the
/// [`BindingRegistry`](crate::registry::BindingRegistry) and driven by the
/// [`ReactiveChannel`](crate::channel::ReactiveChannel).
pub trait InputBinding {
    /// Stable name identifying this binding in the registry.
    fn name(&self) -> &'static str;

    /// Candidate elements under `scope`, in document order.
    ///
    /// Pure query: no side effects.
    fn find(&self, scope: &Element) -> Vec<Element>;

    /// One-time setup for `element`: create the widget instance and apply the
    /// binding's visibility default. Must be idempotent.
    fn initialize(&self, element: &Element) -> Result<(), BindingError>;

    /// The widget's current value. Must not mutate state.
    fn get_value(&self, element: &Element) -> Result<InputValue, BindingError>;

    /// Apply a host→client update to the widget.
    fn receive_message(
        &self,
        element: &Element,
        message: &UpdateMessage,
    ) -> Result<(), BindingError>;

    /// Arrange for `callback` to fire whenever the widget's value may have
    /// changed. Subscribing twice must not duplicate notifications.
    fn subscribe(&self, element: &Element, callback: InvalidateCallback);

    /// Remove exactly this binding's listeners from `element`.
    fn unsubscribe(&self, element: &Element);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_value_accessors() {
        assert_eq!(InputValue::Bool(true).as_bool(), Some(true));
        assert_eq!(InputValue::Int(3).as_bool(), None);
        assert_eq!(InputValue::Int(3).as_int(), Some(3));
        assert_eq!(InputValue::Text("hi".into()).as_text(), Some("hi"));
        assert_eq!(InputValue::Null.as_text(), None);
    }

    #[test]
    fn input_value_from_impls() {
        assert_eq!(InputValue::from(true), InputValue::Bool(true));
        assert_eq!(InputValue::from(7i64), InputValue::Int(7));
        assert_eq!(InputValue::from("x"), InputValue::Text("x".into()));
    }

    #[test]
    fn input_value_to_json() {
        let v: Value = (&InputValue::Bool(false)).into();
        assert_eq!(v, Value::Bool(false));
        let v: Value = (&InputValue::Null).into();
        assert_eq!(v, Value::Null);
        let v: Value = (&InputValue::Text("a".into())).into();
        assert_eq!(v, Value::String("a".into()));
    }

    #[test]
    fn update_message_payload_round_trip() {
        let msg = UpdateMessage::empty();
        assert_eq!(msg.payload(), &Value::Null);

        let msg = UpdateMessage::from_json(serde_json::json!({"open": true}));
        assert_eq!(msg.payload()["open"], Value::Bool(true));

        let msg: UpdateMessage = serde_json::json!([1, 2]).into();
        assert_eq!(msg.payload(), &serde_json::json!([1, 2]));
    }

    #[test]
    fn update_message_serde_round_trip() {
        let msg = UpdateMessage::from_json(serde_json::json!({"n": 1}));
        let text = serde_json::to_string(&msg).expect("serialize");
        let back: UpdateMessage = serde_json::from_str(&text).expect("deserialize");
        assert_eq!(back, msg);
    }

    #[test]
    fn binding_error_display() {
        let el = Element::new("div");
        let err = BindingError::NotInitialized { element: el.id() };
        assert!(err.to_string().contains("no widget instance"));
        let err = BindingError::NotBound { element: el.id() };
        assert!(err.to_string().contains("not bound"));
    }
}
