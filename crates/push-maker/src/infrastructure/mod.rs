//! Infrastructure layer for PushMaker.
//!
//! Contains OS-facing adapters: the adb executable locator, process runner
//! and client, the JSON file stores, and the headless front-end bridge.
//!
//! **Dependency rule**: this layer may depend on `application` and `push_core`,
//! but MUST NOT be imported by the `application` layer.

pub mod adb;
pub mod storage;
pub mod ui_bridge;
