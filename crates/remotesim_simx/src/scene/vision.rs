use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use remotesim_core::error::{Domain, Result};
use remotesim_core::image::{decode_image, Image, ImageFormat};

use crate::remote::ok_or_server;
use crate::scene::object::{SceneEntity, SceneObject};
use crate::session::Simulator;

/// A vision sensor delivering camera frames.
pub struct VisionSensor {
    object: SceneObject,
}

impl VisionSensor {
    pub fn new(sim: &Arc<Simulator>, name: &str) -> Result<Self> {
        Ok(Self {
            object: SceneObject::new(sim, name)?,
        })
    }

    /// Capture one frame.
    ///
    /// The raw buffer arrives as signed bytes with rows bottom-up; the
    /// decoded image is unsigned, grouped into triples for RGB, rows
    /// top-down.
    pub fn get_image(&self, format: ImageFormat) -> Result<Image> {
        let op = "retrieve image of";
        let (client, handle) = self.object.call_target(op)?;
        let frame = ok_or_server(
            self.object
                .session()
                .api()
                .vision_sensor_image(client, handle, format),
            Domain::Scene,
            op,
            self.object.name(),
        )?;
        decode_image(&frame.pixels, frame.resolution, format)
    }
}

impl Deref for VisionSensor {
    type Target = SceneObject;

    fn deref(&self) -> &SceneObject {
        &self.object
    }
}

impl DerefMut for VisionSensor {
    fn deref_mut(&mut self) -> &mut SceneObject {
        &mut self.object
    }
}

impl SceneEntity for VisionSensor {
    fn scene_object(&self) -> &SceneObject {
        &self.object
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::ConnectOptions;
    use crate::testing::ScriptedServer;

    #[test]
    fn frames_decode_to_top_down_unsigned_rows() {
        let server = Arc::new(ScriptedServer::new());
        server.add_object("Camera");
        // 2x2 RGB, bottom row first, with negative bytes for the top row.
        server.set_vision_frame(
            "Camera",
            [2, 2],
            vec![0, 1, 2, 3, 4, 5, -1, -2, -3, -4, -5, -6],
        );
        let sim = Arc::new(Simulator::new(server, "127.0.0.1", 19997));
        sim.connect(&ConnectOptions::default()).unwrap();

        let camera = VisionSensor::new(&sim, "Camera").unwrap();
        let image = camera.get_image(ImageFormat::Rgb).unwrap();
        assert_eq!(
            image,
            Image::Rgb(vec![
                vec![[255, 254, 253], [252, 251, 250]],
                vec![[0, 1, 2], [3, 4, 5]],
            ])
        );
    }

    #[test]
    fn grayscale_capture_keeps_scalars() {
        let server = Arc::new(ScriptedServer::new());
        server.add_object("Camera");
        server.set_vision_frame("Camera", [2, 1], vec![-128, 127]);
        let sim = Arc::new(Simulator::new(server, "127.0.0.1", 19997));
        sim.connect(&ConnectOptions::default()).unwrap();

        let camera = VisionSensor::new(&sim, "Camera").unwrap();
        let image = camera.get_image(ImageFormat::Grayscale).unwrap();
        assert_eq!(image, Image::Grayscale(vec![vec![128, 127]]));
    }
}
