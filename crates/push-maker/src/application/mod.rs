//! Application layer for PushMaker.
//!
//! # What is the "application" layer? (for beginners)
//!
//! This layer sits between the pure rules in `push_core` and the
//! infrastructure that spawns adb and writes JSON files.  It:
//!
//! - **Owns the UI state** and decides how every user intent changes it.
//! - **Depends on abstractions** (the traits in [`ports`]) rather than on adb
//!   or the file system, so tests can drive it with in-memory doubles.
//! - **Contains no OS calls, no process spawning, no file system access**
//!   of its own; all I/O happens inside injected collaborators.
//!
//! # Sub-modules
//!
//! - **`ports`**      – Traits for the device bridge, the two stores, the
//!   executable locator, and host file dialogs.
//!
//! - **`state`**      – [`state::UiState`], the [`state::Msg`] vocabulary and
//!   the pure `update` reducer.  Validation is decided here, before any
//!   background work exists.
//!
//! - **`controller`** – The actor that owns the state, runs background work
//!   and publishes snapshots to observers.

pub mod controller;
pub mod ports;
pub mod state;

pub use controller::{PushMakerController, Services};
pub use ports::CommandOutcome;
pub use state::UiState;
