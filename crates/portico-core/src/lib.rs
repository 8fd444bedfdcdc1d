#![forbid(unsafe_code)]

//! Shared substrate for Portico: the element tree widgets mount on and the
//! namespaced custom-event system they announce lifecycle transitions
//! through.
//!
//! Everything here is single-threaded by design — elements are `Rc`-shared
//! handles mutated cooperatively from the host UI thread.

pub mod element;
pub mod event;

pub use element::{Element, ElementId};
pub use event::{Event, EventKind, EventKinds, ListenerTable, Namespace};
