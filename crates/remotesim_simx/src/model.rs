use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use remotesim_core::error::Result;

use crate::scene::{
    MotorArray, ProximitySensorArray, RemovalScope, SceneEntity, SceneObject,
};
use crate::session::Simulator;

/// A model: a scene object whose removal takes down its whole object tree.
pub struct Model {
    object: SceneObject,
}

impl Model {
    pub fn new(sim: &Arc<Simulator>, name: &str) -> Result<Self> {
        Ok(Self {
            object: SceneObject::new(sim, name)?,
        })
    }

    /// Remove the model and every object under it. Terminal, like
    /// [`SceneObject::remove`].
    pub fn remove(&mut self) -> Result<()> {
        self.object.remove_scoped(RemovalScope::ModelTree)
    }
}

impl Deref for Model {
    type Target = SceneObject;

    fn deref(&self) -> &SceneObject {
        &self.object
    }
}

impl DerefMut for Model {
    fn deref_mut(&mut self) -> &mut SceneObject {
        &mut self.object
    }
}

impl SceneEntity for Model {
    fn scene_object(&self) -> &SceneObject {
        &self.object
    }
}

/// A Pioneer P3-DX robot: the model base plus its ultrasonic sensor ring and
/// wheel motors.
pub struct PioneerBot {
    model: Model,
    pub us_sensors: ProximitySensorArray,
    pub wheels: MotorArray,
}

impl PioneerBot {
    pub fn new(
        sim: &Arc<Simulator>,
        name: &str,
        us_sensor_names: &[&str],
        motor_names: &[&str],
    ) -> Result<Self> {
        Ok(Self {
            model: Model::new(sim, name)?,
            us_sensors: ProximitySensorArray::new(sim, us_sensor_names)?,
            wheels: MotorArray::new(sim, motor_names)?,
        })
    }
}

impl Deref for PioneerBot {
    type Target = Model;

    fn deref(&self) -> &Model {
        &self.model
    }
}

impl DerefMut for PioneerBot {
    fn deref_mut(&mut self) -> &mut Model {
        &mut self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::ConnectOptions;
    use crate::testing::ScriptedServer;
    use remotesim_core::error::ErrorKind;
    use remotesim_core::handle::Frame;

    fn scene() -> (Arc<ScriptedServer>, Arc<Simulator>) {
        let server = Arc::new(ScriptedServer::new());
        let sim = Arc::new(Simulator::new(server.clone(), "127.0.0.1", 19997));
        sim.connect(&ConnectOptions::default()).unwrap();
        (server, sim)
    }

    #[test]
    fn model_removal_takes_down_the_tree() {
        let (server, sim) = scene();
        server.add_object("Robot");
        server.add_object("Robot_wheel");
        server.set_parent("Robot_wheel", Some("Robot"));

        let mut robot = Model::new(&sim, "Robot").unwrap();
        robot.remove().unwrap();

        assert!(server.removed("Robot"));
        assert!(server.removed("Robot_wheel"));
        assert_eq!(robot.remove().unwrap_err().kind, ErrorKind::InvalidState);
    }

    #[test]
    fn pioneer_bundles_its_devices() {
        let (server, sim) = scene();
        server.add_object("Pioneer");
        for name in ["Pioneer_us1", "Pioneer_us2"] {
            server.add_object(name);
        }
        for name in ["Pioneer_leftMotor", "Pioneer_rightMotor"] {
            server.add_object(name);
        }

        let bot = PioneerBot::new(
            &sim,
            "Pioneer",
            &["Pioneer_us1", "Pioneer_us2"],
            &["Pioneer_leftMotor", "Pioneer_rightMotor"],
        )
        .unwrap();

        assert_eq!(bot.us_sensors.len(), 2);
        assert_eq!(bot.wheels.len(), 2);
        // The base model answers generic scene-object queries.
        assert_eq!(
            bot.get_position(Frame::Absolute, None).unwrap(),
            [0.0, 0.0, 0.0]
        );

        bot.wheels.set_velocities(&[1.0, 1.0]).unwrap();
        assert_eq!(server.joint_velocity("Pioneer_leftMotor"), Some(1.0));
    }
}
