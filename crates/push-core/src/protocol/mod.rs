//! The debug-bridge wire surface.
//!
//! PushMaker never links against adb; it talks to it through command-line
//! arguments and parses its text output.  This module owns both directions:
//!
//! - **`devices`** – `adb devices -l` stdout → [`crate::AdbDevice`] list.
//! - **`broadcast`** – [`crate::PushPayload`] → `am broadcast` argument
//!   vector, including the JSON payload encoder and shell quoting.
//!
//! Both are pure functions; spawning the process is the infrastructure
//! layer's job.

pub mod broadcast;
pub mod devices;
