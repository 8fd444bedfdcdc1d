#![forbid(unsafe_code)]

//! Reactive input channel for Portico.
//!
//! This crate defines the contract that turns widgets into server-visible
//! input sources and the channel driver that enforces it:
//!
//! - [`InputBinding`]: the per-widget-family adapter (discover, initialize,
//!   read, update, subscribe, unsubscribe).
//! - [`BindingRegistry`] + [`register_binding`]: the process-wide registry a
//!   composition root fills at startup.
//! - [`ReactiveChannel`]: binds scopes, re-derives values on invalidation,
//!   routes host→client updates.
//!
//! The model is single-threaded and event-driven: `Rc`/`RefCell` ownership,
//! no blocking, no locks. All re-entrancy (a message toggling a widget whose
//! event re-invalidates the channel) happens as plain recursion on the host
//! UI thread.

pub mod binding;
pub mod channel;
pub mod registry;

pub use binding::{
    BindingError, InputBinding, InputValue, InvalidateCallback, UpdateMessage,
};
pub use channel::{ReactiveChannel, WatchGuard};
pub use registry::{BindingRegistry, register_binding, with_bindings};
