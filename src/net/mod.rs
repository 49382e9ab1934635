//! Networking modules for the game module's HTTP API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` owns raw requests and the [`api::Backend`] seam, `types` the wire
//! schema, `transport` the gamemode controller round trip and its directives,
//! `camera` the coordinate refresh and `polling` the long-poll loop.

pub mod api;
pub mod camera;
pub mod polling;
pub mod transport;
pub mod types;
