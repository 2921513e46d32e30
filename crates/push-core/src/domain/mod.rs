//! Domain entities for PushMaker.
//!
//! This module contains pure business logic with no infrastructure
//! dependencies.  Code in outer layers (the controller, the adb client, the
//! JSON stores) depends on these types, but the domain never depends on them.

/// Connected-device descriptor parsed from `adb devices -l`.
pub mod device;

/// The push payload being edited, saved, and sent.
pub mod payload;

/// The single persisted settings record.
pub mod settings;

/// Rules deciding whether a payload may be saved or transmitted.
pub mod validation;
