//! Everything that talks to the Android Debug Bridge.
//!
//! - **`config`**  – [`AdbConfig`]: executable override, command timeout and
//!   broadcast encoding.
//! - **`locator`** – Finds an adb binary in the SDK install locations.
//! - **`process`** – Runs one command with a bounded wait and captured output.
//! - **`client`**  – [`AdbClient`], the [`DeviceBridge`](crate::application::ports::DeviceBridge)
//!   implementation built on the three above.

pub mod client;
pub mod config;
pub mod locator;
pub mod process;

pub use client::AdbClient;
pub use config::AdbConfig;
pub use locator::AdbLocator;
pub use process::{CommandRunner, ProcessError, ProcessOutput, ProcessRunner};
