use std::ops::{Deref, Index};
use std::sync::Arc;

use remotesim_core::error::{CoreError, Domain, ErrorKind, Result};
use remotesim_core::image::{Image, ImageFormat};

use crate::scene::motor::Motor;
use crate::scene::object::SceneEntity;
use crate::scene::proximity::ProximitySensor;
use crate::scene::vision::VisionSensor;
use crate::session::Simulator;

/// Fixed-size ordered container of scene-object wrappers.
///
/// Built once from a list of names; no insertion or removal afterwards.
pub struct ObjectArray<T> {
    items: Vec<T>,
}

impl<T> ObjectArray<T> {
    pub(crate) fn build(
        sim: &Arc<Simulator>,
        names: &[&str],
        open: impl Fn(&Arc<Simulator>, &str) -> Result<T>,
    ) -> Result<Self> {
        let items = names
            .iter()
            .map(|name| open(sim, name))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T: SceneEntity> ObjectArray<T> {
    /// Membership test by object name.
    pub fn contains(&self, name: &str) -> bool {
        self.items
            .iter()
            .any(|item| item.scene_object().name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.items
            .iter()
            .map(|item| item.scene_object().name())
            .collect()
    }
}

impl<T> Index<usize> for ObjectArray<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<'a, T> IntoIterator for &'a ObjectArray<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Motors addressed as one ordered bank.
pub struct MotorArray {
    motors: ObjectArray<Motor>,
}

impl MotorArray {
    pub fn new(sim: &Arc<Simulator>, names: &[&str]) -> Result<Self> {
        Ok(Self {
            motors: ObjectArray::build(sim, names, Motor::new)?,
        })
    }

    /// Apply one velocity per motor, by position.
    ///
    /// The velocity count must match the motor count; a mismatch fails
    /// before any remote call is issued.
    pub fn set_velocities(&self, velocities: &[f32]) -> Result<()> {
        if velocities.len() != self.motors.len() {
            return Err(CoreError::warn()
                .domain(Domain::Scene)
                .kind(ErrorKind::InvalidArgument)
                .msgf(format_args!(
                    "got {} velocities for {} motors",
                    velocities.len(),
                    self.motors.len()
                ))
                .build());
        }
        for (motor, velocity) in self.motors.iter().zip(velocities) {
            motor.set_velocity(*velocity)?;
        }
        Ok(())
    }
}

impl Deref for MotorArray {
    type Target = ObjectArray<Motor>;

    fn deref(&self) -> &ObjectArray<Motor> {
        &self.motors
    }
}

/// Proximity sensors addressed as one ordered bank.
pub struct ProximitySensorArray {
    sensors: ObjectArray<ProximitySensor>,
}

impl ProximitySensorArray {
    pub fn new(sim: &Arc<Simulator>, names: &[&str]) -> Result<Self> {
        Ok(Self {
            sensors: ObjectArray::build(sim, names, ProximitySensor::new)?,
        })
    }

    /// One inverted-distance read per sensor, in array order.
    pub fn get_inv_distances(&self) -> Result<Vec<f32>> {
        self.sensors
            .iter()
            .map(ProximitySensor::get_inv_distance)
            .collect()
    }
}

impl Deref for ProximitySensorArray {
    type Target = ObjectArray<ProximitySensor>;

    fn deref(&self) -> &ObjectArray<ProximitySensor> {
        &self.sensors
    }
}

/// Vision sensors addressed as one ordered bank.
pub struct SensorArray {
    sensors: ObjectArray<VisionSensor>,
}

impl SensorArray {
    pub fn new(sim: &Arc<Simulator>, names: &[&str]) -> Result<Self> {
        Ok(Self {
            sensors: ObjectArray::build(sim, names, VisionSensor::new)?,
        })
    }

    /// One capture per sensor, in array order.
    pub fn get_images(&self, format: ImageFormat) -> Result<Vec<Image>> {
        self.sensors
            .iter()
            .map(|sensor| sensor.get_image(format))
            .collect()
    }
}

impl Deref for SensorArray {
    type Target = ObjectArray<VisionSensor>;

    fn deref(&self) -> &ObjectArray<VisionSensor> {
        &self.sensors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{ConnectOptions, ProximityReading};
    use crate::testing::ScriptedServer;
    use remotesim_core::error::ErrorKind;

    fn scene() -> (Arc<ScriptedServer>, Arc<Simulator>) {
        let server = Arc::new(ScriptedServer::new());
        let sim = Arc::new(Simulator::new(server.clone(), "127.0.0.1", 19997));
        sim.connect(&ConnectOptions::default()).unwrap();
        (server, sim)
    }

    #[test]
    fn arrays_keep_construction_order() {
        let (server, sim) = scene();
        for name in ["M1", "M2", "M3"] {
            server.add_object(name);
        }
        let motors = MotorArray::new(&sim, &["M3", "M1", "M2"]).unwrap();

        assert_eq!(motors.len(), 3);
        assert!(!motors.is_empty());
        assert_eq!(motors.names(), vec!["M3", "M1", "M2"]);
        assert_eq!(motors[0].name(), "M3");
        assert!(motors.contains("M1"));
        assert!(!motors.contains("M4"));
        assert_eq!(motors.iter().count(), 3);
        assert!(motors.get(3).is_none());
    }

    #[test]
    fn one_unknown_member_fails_the_whole_array() {
        let (server, sim) = scene();
        server.add_object("M1");
        let err = MotorArray::new(&sim, &["M1", "Ghost"]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Server);
    }

    #[test]
    fn velocities_apply_by_position() {
        let (server, sim) = scene();
        for name in ["M1", "M2", "M3"] {
            server.add_object(name);
        }
        let motors = MotorArray::new(&sim, &["M1", "M2", "M3"]).unwrap();

        motors.set_velocities(&[0.1, 0.2, 0.3]).unwrap();
        assert_eq!(server.joint_velocity("M1"), Some(0.1));
        assert_eq!(server.joint_velocity("M2"), Some(0.2));
        assert_eq!(server.joint_velocity("M3"), Some(0.3));
    }

    #[test]
    fn velocity_count_mismatch_is_rejected_up_front() {
        let (server, sim) = scene();
        for name in ["M1", "M2", "M3"] {
            server.add_object(name);
        }
        let motors = MotorArray::new(&sim, &["M1", "M2", "M3"]).unwrap();

        let err = motors.set_velocities(&[0.1, 0.2]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
        // Nothing was applied.
        assert_eq!(server.joint_velocity("M1"), None);
    }

    #[test]
    fn proximity_bank_reads_in_order() {
        let (server, sim) = scene();
        server.add_object("S1");
        server.add_object("S2");
        server.set_proximity_reading(
            "S1",
            Some(ProximityReading {
                detected: true,
                detected_point: [0.0, 0.0, 0.25],
            }),
        );
        server.set_proximity_reading("S2", None);

        let sensors = ProximitySensorArray::new(&sim, &["S1", "S2"]).unwrap();
        assert_eq!(sensors.get_inv_distances().unwrap(), vec![0.75, 0.0]);
    }

    #[test]
    fn vision_bank_captures_in_order() {
        let (server, sim) = scene();
        server.add_object("C1");
        server.add_object("C2");
        server.set_vision_frame("C1", [1, 1], vec![10]);
        server.set_vision_frame("C2", [1, 1], vec![-10]);

        let sensors = SensorArray::new(&sim, &["C1", "C2"]).unwrap();
        let images = sensors.get_images(ImageFormat::Grayscale).unwrap();
        assert_eq!(
            images,
            vec![
                Image::Grayscale(vec![vec![10]]),
                Image::Grayscale(vec![vec![246]]),
            ]
        );
    }
}
