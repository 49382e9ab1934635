//! Page-facing helpers.
//!
//! `surface` is the port every state machine writes through, `form` the
//! snapshot of a container's inputs. `dom` implements both against the live
//! page and only exists in the browser build.

#[cfg(feature = "hydrate")]
pub mod dom;
pub mod form;
pub mod surface;
