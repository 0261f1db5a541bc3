//! Device Harness - navigation and golden-snapshot testing for device
//! applications.
//!
//! This crate provides:
//! - A navigation engine running instructions (clicks, taps, swipes, waits)
//!   through per-device callback tables
//! - Step-by-step comparison of the screen with golden snapshots, and a
//!   golden-run mode recording them
//! - Search loops navigating until a snapshot or a text shows up
//! - Review and address confirmation scenarios for every device family
//! - An in-process screen emulator backend, a physical-device backend and a
//!   scripted stub for tests
//!
//! # Example
//!
//! ```rust,no_run
//! use device_harness::backend::EmulatorBackend;
//! use device_harness::navigator::{CompareOptions, NavInsId, Navigator, NavigatorConfig};
//! use device_harness::{Device, SnapshotCase};
//!
//! let backend = EmulatorBackend::from_file(Device::NanoX, "app.json".as_ref()).unwrap();
//! let mut navigator = Navigator::for_device(backend, Device::NanoX, NavigatorConfig::default()).unwrap();
//! let case = SnapshotCase::new("tests", "sign_tx");
//! navigator
//!     .navigate_and_compare(Some(&case), [NavInsId::RightClick, NavInsId::BothClick], CompareOptions::default())
//!     .unwrap();
//! ```

pub mod apdu;
pub mod backend;
pub mod config;
pub mod device;
pub mod logging;
pub mod navigator;
pub mod runner;
pub mod snapshot;

// Re-export runner types
pub use runner::{FrameRecord, NavigationReport};

// Re-export device types
pub use device::{Device, Position};

// Re-export backend types
pub use backend::{Backend, BackendError, BackendResult, Crop, EmulatorBackend, PhysicalBackend, StubBackend};

// Re-export APDU types
pub use apdu::{ExceptionRapdu, PendingExchange, RaisePolicy, Rapdu, Transport, pack_apdu};

// Re-export navigation types
pub use navigator::{
    CompareOptions, NavError, NavIns, NavInsId, NavResult, NavigateWithScenario, Navigator,
    NavigatorConfig, ScenarioOptions, TimeoutError, UntilSnapOptions, UntilTextOptions,
};

// Re-export snapshot layout
pub use snapshot::{SnapshotCase, SnapshotError};
