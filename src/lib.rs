//! Operator control surface for a camera-tracked billiards table.
//!
//! This crate is compiled to WebAssembly and runs in the control page next to
//! the live table image. It keeps the table's ball coordinates in sync with
//! the camera module, lets the operator correct them by hand, and drives the
//! game module's gamemodes step by step: every measurement is reviewed on
//! screen before it is committed. Markup is rendered by the server; the crate
//! only reads and rewrites it.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`session`] | Page-scoped context shared by every handler |
//! | [`state`] | Coordinate store, manipulation flag, confirm/commit handshake, step controllers, round accumulator |
//! | [`net`] | Wire types, HTTP backend, transport adapter, camera sync, long poll |
//! | [`flows`] | Operator workflows built from `state` and `net` |
//! | [`measure`] | Distances and counts derived from the coordinate store |
//! | [`config`] | Client configuration read from the page |
//! | [`util`] | The page port ([`util::surface::Surface`]) and form snapshots |
//! | `app` | Browser entry point (`hydrate` only) |

#[cfg(feature = "hydrate")]
pub mod app;
pub mod config;
pub mod flows;
pub mod measure;
pub mod net;
pub mod session;
pub mod state;
pub mod util;

#[cfg(test)]
mod test_support;
