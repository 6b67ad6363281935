//! Capture flow: arm a (device, action) pair, then store the next IR signal under it.

pub mod controller;
pub mod listener;
pub mod state;

pub use controller::{CaptureController, SignalOutcome};
pub use listener::SignalListener;
pub use state::{CaptureState, CaptureStatus, PendingCapture};
