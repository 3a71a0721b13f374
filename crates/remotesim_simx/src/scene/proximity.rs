use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use remotesim_core::error::{CoreError, Domain, Result};

use crate::scene::object::{SceneEntity, SceneObject};
use crate::session::Simulator;

/// A proximity sensor read as an inverted distance.
pub struct ProximitySensor {
    object: SceneObject,
}

impl ProximitySensor {
    pub fn new(sim: &Arc<Simulator>, name: &str) -> Result<Self> {
        Ok(Self {
            object: SceneObject::new(sim, name)?,
        })
    }

    /// Inverted distance to the detected point: `1.0 - depth`, so larger
    /// means closer.
    ///
    /// Returns 0.0 both when nothing is within range and when the server
    /// reports the no-value flag; the two states are deliberately not
    /// distinguished.
    pub fn get_inv_distance(&self) -> Result<f32> {
        let op = "retrieve proximity reading of";
        let (client, handle) = self.object.call_target(op)?;

        match self
            .object
            .session()
            .api()
            .read_proximity_sensor(client, handle)
        {
            Ok(reading) if reading.detected => Ok(1.0 - reading.detected_point[2]),
            Ok(_) => Ok(0.0),
            Err(code) if code.is_novalue() => Ok(0.0),
            Err(code) => Err(CoreError::server(
                Domain::Scene,
                op,
                self.object.name(),
                code.0,
            )),
        }
    }
}

impl Deref for ProximitySensor {
    type Target = SceneObject;

    fn deref(&self) -> &SceneObject {
        &self.object
    }
}

impl DerefMut for ProximitySensor {
    fn deref_mut(&mut self) -> &mut SceneObject {
        &mut self.object
    }
}

impl SceneEntity for ProximitySensor {
    fn scene_object(&self) -> &SceneObject {
        &self.object
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{ConnectOptions, ProximityReading};
    use crate::testing::ScriptedServer;
    use remotesim_core::error::ErrorKind;

    fn sensor() -> (Arc<ScriptedServer>, ProximitySensor) {
        let server = Arc::new(ScriptedServer::new());
        server.add_object("FrontSonar");
        let sim = Arc::new(Simulator::new(server.clone(), "127.0.0.1", 19997));
        sim.connect(&ConnectOptions::default()).unwrap();
        let sensor = ProximitySensor::new(&sim, "FrontSonar").unwrap();
        (server, sensor)
    }

    #[test]
    fn detection_inverts_depth() {
        let (server, sensor) = sensor();
        server.set_proximity_reading(
            "FrontSonar",
            Some(ProximityReading {
                detected: true,
                detected_point: [0.0, 0.0, 0.25],
            }),
        );
        assert_eq!(sensor.get_inv_distance().unwrap(), 0.75);
    }

    #[test]
    fn no_detection_and_no_value_both_read_zero() {
        let (server, sensor) = sensor();

        server.set_proximity_reading(
            "FrontSonar",
            Some(ProximityReading {
                detected: false,
                detected_point: [0.0, 0.0, 0.0],
            }),
        );
        assert_eq!(sensor.get_inv_distance().unwrap(), 0.0);

        // None scripts the no-value reply.
        server.set_proximity_reading("FrontSonar", None);
        assert_eq!(sensor.get_inv_distance().unwrap(), 0.0);
    }

    #[test]
    fn removed_sensor_reports_state_error() {
        let (_server, mut sensor) = sensor();
        sensor.remove().unwrap();
        assert_eq!(
            sensor.get_inv_distance().unwrap_err().kind,
            ErrorKind::InvalidState
        );
    }
}
