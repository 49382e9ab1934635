//! Client-side state machines.
//!
//! SYSTEM CONTEXT
//! ==============
//! Everything here is plain data plus transitions. DOM effects go through
//! `util::surface::Surface` and network calls live in `net`, so each machine
//! is tested natively against recording fakes.

pub mod coords;
pub mod gamemode;
pub mod handshake;
pub mod manipulation;
pub mod round;
pub mod steps;
