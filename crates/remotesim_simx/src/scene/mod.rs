//! Scene-object wrappers.
//!
//! One wrapper per simulated entity; specializations add the device-specific
//! operations on top of the generic object.

mod object;
pub use object::{BoundingBox, SceneEntity, SceneObject};
pub(crate) use object::RemovalScope;

mod dummy;
pub use dummy::Dummy;

mod motor;
pub use motor::Motor;

mod proximity;
pub use proximity::ProximitySensor;

mod vision;
pub use vision::VisionSensor;

mod arrays;
pub use arrays::{MotorArray, ObjectArray, ProximitySensorArray, SensorArray};
