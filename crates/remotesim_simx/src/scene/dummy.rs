use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use remotesim_core::error::Result;

use crate::scene::object::{SceneEntity, SceneObject};
use crate::session::Simulator;

/// A dummy (marker) object. No operations beyond the generic scene object.
pub struct Dummy {
    object: SceneObject,
}

impl Dummy {
    pub fn new(sim: &Arc<Simulator>, name: &str) -> Result<Self> {
        Ok(Self {
            object: SceneObject::new(sim, name)?,
        })
    }
}

impl Deref for Dummy {
    type Target = SceneObject;

    fn deref(&self) -> &SceneObject {
        &self.object
    }
}

impl DerefMut for Dummy {
    fn deref_mut(&mut self) -> &mut SceneObject {
        &mut self.object
    }
}

impl SceneEntity for Dummy {
    fn scene_object(&self) -> &SceneObject {
        &self.object
    }
}
