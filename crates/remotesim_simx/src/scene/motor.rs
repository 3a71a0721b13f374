use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use remotesim_core::error::{Domain, Result};

use crate::remote::ok_or_server;
use crate::scene::object::{SceneEntity, SceneObject};
use crate::session::Simulator;

/// A joint driven by target velocity.
pub struct Motor {
    object: SceneObject,
}

impl Motor {
    pub fn new(sim: &Arc<Simulator>, name: &str) -> Result<Self> {
        Ok(Self {
            object: SceneObject::new(sim, name)?,
        })
    }

    /// Command the joint target velocity.
    ///
    /// No in-simulation guard: velocity commands are the point of a running
    /// simulation.
    pub fn set_velocity(&self, velocity: f32) -> Result<()> {
        let op = "set velocity of";
        let (client, handle) = self.object.call_target(op)?;
        ok_or_server(
            self.object
                .session()
                .api()
                .set_joint_target_velocity(client, handle, velocity),
            Domain::Scene,
            op,
            self.object.name(),
        )
    }
}

impl Deref for Motor {
    type Target = SceneObject;

    fn deref(&self) -> &SceneObject {
        &self.object
    }
}

impl DerefMut for Motor {
    fn deref_mut(&mut self) -> &mut SceneObject {
        &mut self.object
    }
}

impl SceneEntity for Motor {
    fn scene_object(&self) -> &SceneObject {
        &self.object
    }
}
