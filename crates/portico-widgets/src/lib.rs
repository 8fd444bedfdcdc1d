#![forbid(unsafe_code)]

//! Widgets for Portico and their input bindings.
//!
//! Currently ships the modal login screen: the widget itself
//! ([`LoginScreen`]), its per-element instance runtime ([`LoginScreens`]),
//! and the [`LoginScreenBinding`] that exposes it to the reactive channel.

pub mod binding;
pub mod login_screen;

pub use binding::{LoginScreenBinding, MARKER_CLASS};
pub use login_screen::{LoginScreen, LoginScreenConfig, LoginScreens};
