//! remotesim_simx
//!
//! Typed wrapper layer over a robotics simulator's blocking remote API.
//! Scene objects, sensors, collections and composite models front the remote
//! calls behind methods that translate status codes into structured errors,
//! while core semantics stay in `remotesim_core`.

// Public modules
pub mod error;

pub mod collection;
pub mod model;
pub mod remote;
pub mod scene;
pub mod session;
pub mod testing;

// Re-export core types that wrapper users will commonly need
pub use remotesim_core::error::{CoreError, Result};
pub use remotesim_core::handle::{Frame, HandleState, RawHandle};
pub use remotesim_core::image::{Image, ImageFormat};

pub use collection::Collection;
pub use model::{Model, PioneerBot};
pub use remote::{ConnectOptions, SimxApi};
pub use scene::{
    BoundingBox, Dummy, Motor, MotorArray, ObjectArray, ProximitySensor, ProximitySensorArray,
    SceneEntity, SceneObject, SensorArray, VisionSensor,
};
pub use session::Simulator;
