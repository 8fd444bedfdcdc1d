#![forbid(unsafe_code)]

//! Public facade for Portico.
//!
//! Portico binds toolkit widgets to a server-driven reactive input channel.
//! This crate re-exports the member crates and offers a [`prelude`] for
//! application code.
//!
//! # Quick start
//!
//! ```
//! use std::rc::Rc;
//! use portico::prelude::*;
//!
//! // Composition root: register bindings once at startup.
//! let screens = LoginScreens::new();
//! register_binding(Rc::new(LoginScreenBinding::new(screens)));
//!
//! // Host page markup, then bind it.
//! let page = Element::new("body");
//! let login = Element::new("div").with_class(MARKER_CLASS);
//! page.append_child(login.clone());
//!
//! let channel = ReactiveChannel::new();
//! channel.bind_scope(&page);
//!
//! // A freshly bound login screen is open.
//! assert_eq!(channel.value(&login), Ok(InputValue::Bool(true)));
//!
//! // The server flips it with a content-free message.
//! channel.deliver(&login, &UpdateMessage::empty()).unwrap();
//! assert_eq!(channel.value(&login), Ok(InputValue::Bool(false)));
//! ```

pub use portico_core as core;

#[cfg(feature = "runtime")]
pub use portico_runtime as runtime;

#[cfg(feature = "widgets")]
pub use portico_widgets as widgets;

/// Common imports for application code.
pub mod prelude {
    pub use portico_core::{Element, ElementId, Event, EventKind, EventKinds, Namespace};

    #[cfg(feature = "runtime")]
    pub use portico_runtime::{
        BindingError, BindingRegistry, InputBinding, InputValue, InvalidateCallback,
        ReactiveChannel, UpdateMessage, WatchGuard, register_binding, with_bindings,
    };

    #[cfg(feature = "widgets")]
    pub use portico_widgets::{
        LoginScreen, LoginScreenBinding, LoginScreenConfig, LoginScreens, MARKER_CLASS,
    };
}
