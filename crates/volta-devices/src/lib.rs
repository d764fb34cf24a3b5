//! Device models for Volta.
//!
//! A [`Device`] is a schematic component: a typed element with named,
//! positioned pins, a numeric value or model name, and a rotation. The
//! closed set of component types lives in [`DeviceKind`]; the analysis
//! engine matches on the kind when stamping.
//!
//! Nonlinear analytics (current and conductance as functions of terminal
//! voltages) for the diode and the level-1 MOSFET live in [`diode`] and
//! [`mosfet`].

pub mod device;
pub mod diode;
pub mod error;
pub mod mosfet;

pub use device::{Device, DeviceKind, ModelParams, Pin, Rotation};
pub use diode::DiodeParams;
pub use error::{Error, Result};
pub use mosfet::{MosfetParams, MosfetRegion, MosfetType};
