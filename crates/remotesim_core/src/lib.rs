//! remotesim_core: transport-agnostic core semantics for the remote
//! simulator client layer.
//!
//! Design goals:
//! - Pure, testable logic (no remote-API deps).
//! - Explicit types; sentinel integers stay at the wire boundary.
//! - Small, stable public API surface.

pub mod error;

/// Handle lifecycle + reference frames.
pub mod handle;

/// Vision-sensor frame decoding.
pub mod image;

/// Rounding and flat-payload regrouping.
pub mod units;

pub use error::{CoreError, Result};
pub use handle::{Frame, HandleState, RawHandle};
pub use image::{decode_image, Image, ImageFormat};
pub use units::{group_vec3s, round_to, round_vec3, FLOAT_PREC};
