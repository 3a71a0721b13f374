use std::sync::Arc;

use remotesim_core::error::{CoreError, Domain, ErrorKind, Result};
use remotesim_core::handle::{Frame, HandleState, RawHandle};
use remotesim_core::units::{round_to, round_vec3, FLOAT_PREC};

use crate::remote::{ok_or_server, ClientId, ObjectFloatParam, ScriptArgs, ScriptReply, ScriptType};
use crate::session::Simulator;

/// Axis-aligned model bounding box in the object's frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoundingBox {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

/// What a removal takes down on the server side.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum RemovalScope {
    Object,
    ModelTree,
}

/// Access to the generic scene object inside a specialized wrapper.
pub trait SceneEntity {
    fn scene_object(&self) -> &SceneObject;
}

/// A single simulated entity, addressed by the handle resolved from its name
/// at construction time.
///
/// The name is immutable and used only for diagnostics afterwards. After
/// `remove()` every handle-dependent method fails with the removed error.
pub struct SceneObject {
    sim: Arc<Simulator>,
    name: String,
    state: HandleState,
}

impl SceneObject {
    /// Resolve `name` to a live handle.
    ///
    /// Fails with a not-connected error when the session has no connection,
    /// a server error when the server rejects the lookup, and an
    /// invalid-argument error for an empty name. No partially constructed
    /// object escapes on failure.
    pub fn new(sim: &Arc<Simulator>, name: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(CoreError::warn()
                .domain(Domain::Scene)
                .kind(ErrorKind::InvalidArgument)
                .msg("scene object name must not be empty")
                .build());
        }

        let op = "retrieve handle to";
        let client = sim.require_client(op, name)?;
        let handle = ok_or_server(
            sim.api().object_handle(client, name),
            Domain::Scene,
            op,
            name,
        )?;

        Ok(Self {
            sim: Arc::clone(sim),
            name: name.to_string(),
            state: HandleState::Live(handle),
        })
    }

    /// Object name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Session this object was opened on.
    pub fn session(&self) -> &Arc<Simulator> {
        &self.sim
    }

    /// Live server handle.
    pub fn handle(&self) -> Result<RawHandle> {
        self.state.require_live("use handle of", &self.name)
    }

    /// This object as a reference frame for another object's coordinates.
    pub fn frame(&self) -> Result<Frame> {
        Ok(Frame::Relative(self.handle()?))
    }

    /// Live handle + connection for one remote call, or the designated error.
    pub(crate) fn call_target(&self, op: &'static str) -> Result<(ClientId, RawHandle)> {
        let handle = self.state.require_live(op, &self.name)?;
        let client = self.sim.require_client(op, &self.name)?;
        Ok((client, handle))
    }

    /// Object position in `relative_to`, optionally rounded.
    pub fn get_position(&self, relative_to: Frame, prec: Option<u32>) -> Result<[f32; 3]> {
        let op = "retrieve position of";
        let (client, handle) = self.call_target(op)?;
        let position = ok_or_server(
            self.sim.api().object_position(client, handle, relative_to),
            Domain::Scene,
            op,
            &self.name,
        )?;
        Ok(round_vec3(position, prec))
    }

    /// Move the object.
    ///
    /// Refused while a simulation runs unless `allow_in_sim` — some dynamics
    /// engines misbehave on kinematic edits mid-run.
    pub fn set_position(
        &self,
        position: [f32; 3],
        relative_to: Frame,
        allow_in_sim: bool,
    ) -> Result<()> {
        let op = "set position of";
        let (client, handle) = self.call_target(op)?;
        if !allow_in_sim && self.sim.is_sim_started()? {
            return Err(CoreError::sim_running(op, &self.name));
        }
        ok_or_server(
            self.sim
                .api()
                .set_object_position(client, handle, relative_to, position),
            Domain::Scene,
            op,
            &self.name,
        )
    }

    /// Euler angles about x, y, z of `relative_to`, each in (-pi, pi],
    /// optionally rounded.
    pub fn get_orientation(&self, relative_to: Frame, prec: Option<u32>) -> Result<[f32; 3]> {
        let op = "retrieve orientation of";
        let (client, handle) = self.call_target(op)?;
        let orientation = ok_or_server(
            self.sim.api().object_orientation(client, handle, relative_to),
            Domain::Scene,
            op,
            &self.name,
        )?;
        Ok(round_vec3(orientation, prec))
    }

    /// Reorient the object; same in-simulation guard as [`Self::set_position`].
    pub fn set_orientation(
        &self,
        orientation: [f32; 3],
        relative_to: Frame,
        allow_in_sim: bool,
    ) -> Result<()> {
        let op = "set orientation of";
        let (client, handle) = self.call_target(op)?;
        if !allow_in_sim && self.sim.is_sim_started()? {
            return Err(CoreError::sim_running(op, &self.name));
        }
        ok_or_server(
            self.sim
                .api()
                .set_object_orientation(client, handle, relative_to, orientation),
            Domain::Scene,
            op,
            &self.name,
        )
    }

    /// Parent object handle; `None` for scene-root objects.
    pub fn get_parent(&self) -> Result<Option<RawHandle>> {
        let op = "retrieve parent of";
        let (client, handle) = self.call_target(op)?;
        ok_or_server(
            self.sim.api().object_parent(client, handle),
            Domain::Scene,
            op,
            &self.name,
        )
    }

    /// Model bounding-box limits.
    ///
    /// `None` rounds to the default [`FLOAT_PREC`]; the server values are
    /// slightly imprecise around the 6th decimal digit.
    pub fn get_bbox_limits(&self, prec: Option<u32>) -> Result<BoundingBox> {
        let op = "retrieve bounding box of";
        let (client, handle) = self.call_target(op)?;
        let prec = prec.unwrap_or(FLOAT_PREC);

        let mut limits = BoundingBox {
            min: [0.0; 3],
            max: [0.0; 3],
        };
        for axis in 0..3 {
            let raw_min = ok_or_server(
                self.sim
                    .api()
                    .object_float_param(client, handle, ObjectFloatParam::BBOX_MIN[axis]),
                Domain::Scene,
                op,
                &self.name,
            )?;
            let raw_max = ok_or_server(
                self.sim
                    .api()
                    .object_float_param(client, handle, ObjectFloatParam::BBOX_MAX[axis]),
                Domain::Scene,
                op,
                &self.name,
            )?;
            limits.min[axis] = round_to(raw_min, prec);
            limits.max[axis] = round_to(raw_max, prec);
        }
        Ok(limits)
    }

    /// Call a function in one of this object's embedded scripts.
    pub fn call_script_function(
        &self,
        func: &str,
        script: ScriptType,
        args: &ScriptArgs,
    ) -> Result<ScriptReply> {
        let op = "call script function of";
        let (client, _handle) = self.call_target(op)?;
        ok_or_server(
            self.sim
                .api()
                .call_script_function(client, &self.name, script, func, args),
            Domain::Scene,
            op,
            &self.name,
        )
    }

    /// Remove the object from the scene. Terminal: the handle is never used
    /// again, and a second call fails.
    pub fn remove(&mut self) -> Result<()> {
        self.remove_scoped(RemovalScope::Object)
    }

    pub(crate) fn remove_scoped(&mut self, scope: RemovalScope) -> Result<()> {
        let op = "remove";
        let (client, handle) = self.call_target(op)?;
        let result = match scope {
            RemovalScope::Object => self.sim.api().remove_object(client, handle),
            RemovalScope::ModelTree => self.sim.api().remove_model(client, handle),
        };
        ok_or_server(result, Domain::Scene, op, &self.name)?;
        self.state = HandleState::Removed;
        Ok(())
    }
}

impl SceneEntity for SceneObject {
    fn scene_object(&self) -> &SceneObject {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::ConnectOptions;
    use crate::testing::ScriptedServer;
    use remotesim_core::error::ErrorKind;

    fn scene() -> (Arc<ScriptedServer>, Arc<Simulator>) {
        let server = Arc::new(ScriptedServer::new());
        let sim = Arc::new(Simulator::new(server.clone(), "127.0.0.1", 19997));
        sim.connect(&ConnectOptions::default()).unwrap();
        (server, sim)
    }

    #[test]
    fn unknown_name_is_a_server_error_not_a_silent_handle() {
        let (_server, sim) = scene();
        let err = SceneObject::new(&sim, "NoSuchThing").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Server);
        assert!(err.message.contains("NoSuchThing"));
    }

    #[test]
    fn empty_name_is_rejected_locally() {
        let (_server, sim) = scene();
        let err = SceneObject::new(&sim, "").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }

    #[test]
    fn construction_without_connection_fails() {
        let server = Arc::new(ScriptedServer::new());
        server.add_object("Cuboid");
        let sim = Arc::new(Simulator::new(server, "127.0.0.1", 19997));

        let err = SceneObject::new(&sim, "Cuboid").unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotConnected);
    }

    #[test]
    fn positions_round_trip_with_optional_rounding() {
        let (server, sim) = scene();
        server.add_object("Cuboid");
        let object = SceneObject::new(&sim, "Cuboid").unwrap();

        object
            .set_position([1.2345, 2.3456, 3.4567], Frame::Absolute, false)
            .unwrap();
        assert_eq!(
            object.get_position(Frame::Absolute, Some(2)).unwrap(),
            [1.23, 2.35, 3.46]
        );
        assert_eq!(
            object.get_position(Frame::Absolute, None).unwrap(),
            [1.2345, 2.3456, 3.4567]
        );
    }

    #[test]
    fn relative_frames_offset_against_the_reference() {
        let (server, sim) = scene();
        server.add_object_at("Base", [1.0, 1.0, 0.0]);
        server.add_object_at("Tip", [1.5, 1.0, 2.0]);
        let base = SceneObject::new(&sim, "Base").unwrap();
        let tip = SceneObject::new(&sim, "Tip").unwrap();

        let relative = tip.get_position(base.frame().unwrap(), None).unwrap();
        assert_eq!(relative, [0.5, 0.0, 2.0]);
    }

    #[test]
    fn mutation_is_guarded_while_simulation_runs() {
        let (server, sim) = scene();
        server.add_object("Cuboid");
        let object = SceneObject::new(&sim, "Cuboid").unwrap();

        server.set_sim_running(true);
        let err = object
            .set_position([0.0, 0.0, 1.0], Frame::Absolute, false)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Simulation);

        // Explicit override bypasses the guard.
        object
            .set_position([0.0, 0.0, 1.0], Frame::Absolute, true)
            .unwrap();
        assert_eq!(
            object.get_position(Frame::Absolute, None).unwrap(),
            [0.0, 0.0, 1.0]
        );
    }

    #[test]
    fn orientation_follows_the_same_guard() {
        let (server, sim) = scene();
        server.add_object("Cuboid");
        let object = SceneObject::new(&sim, "Cuboid").unwrap();

        server.set_sim_running(true);
        assert_eq!(
            object
                .set_orientation([0.1, 0.2, 0.3], Frame::Absolute, false)
                .unwrap_err()
                .kind,
            ErrorKind::Simulation
        );
        object
            .set_orientation([0.1, 0.2, 0.3], Frame::Absolute, true)
            .unwrap();
        assert_eq!(
            object.get_orientation(Frame::Absolute, None).unwrap(),
            [0.1, 0.2, 0.3]
        );
    }

    #[test]
    fn removal_is_terminal() {
        let (server, sim) = scene();
        server.add_object("Cuboid");
        let mut object = SceneObject::new(&sim, "Cuboid").unwrap();

        object.remove().unwrap();
        assert!(server.removed("Cuboid"));

        let err = object.get_position(Frame::Absolute, None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidState);
        assert!(object.handle().is_err());

        let err = object.remove().unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidState);
    }

    #[test]
    fn parent_query_distinguishes_root_objects() {
        let (server, sim) = scene();
        server.add_object("Base");
        server.add_object("Arm");
        server.set_parent("Arm", Some("Base"));

        let base = SceneObject::new(&sim, "Base").unwrap();
        let arm = SceneObject::new(&sim, "Arm").unwrap();

        assert_eq!(base.get_parent().unwrap(), None);
        assert_eq!(arm.get_parent().unwrap(), Some(base.handle().unwrap()));
    }

    #[test]
    fn bbox_limits_round_at_default_precision() {
        let (server, sim) = scene();
        server.add_object("Cuboid");
        server.set_bbox(
            "Cuboid",
            [-0.0500001, -0.0500001, -0.0500001],
            [0.0500001, 0.0500001, 0.0500001],
        );
        let object = SceneObject::new(&sim, "Cuboid").unwrap();

        let limits = object.get_bbox_limits(None).unwrap();
        assert_eq!(limits.min, [-0.05, -0.05, -0.05]);
        assert_eq!(limits.max, [0.05, 0.05, 0.05]);

        let raw = object.get_bbox_limits(Some(7)).unwrap();
        assert!(raw.max[0] > 0.05);
    }

    #[test]
    fn script_calls_carry_typed_bundles() {
        let (server, sim) = scene();
        server.add_object("Controller");
        server.set_script_reply(
            "Controller",
            "getState",
            ScriptReply {
                ints: vec![1],
                floats: vec![0.5],
                strings: vec!["ok".to_string()],
                buffer: Vec::new(),
            },
        );
        let object = SceneObject::new(&sim, "Controller").unwrap();

        let reply = object
            .call_script_function("getState", ScriptType::Child, &ScriptArgs::default())
            .unwrap();
        assert_eq!(reply.ints, vec![1]);
        assert_eq!(reply.strings, vec!["ok".to_string()]);

        let err = object
            .call_script_function("noSuchFunc", ScriptType::Child, &ScriptArgs::default())
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Server);
    }
}
