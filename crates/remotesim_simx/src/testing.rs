//! In-memory scripted remote API server.
//!
//! Implements [`SimxApi`] over a mutable scene model so wrapper behavior can
//! be exercised without a live simulator. Setup methods script server-side
//! state; assertion helpers observe what the wrappers did to it.

use std::collections::HashMap;
use std::sync::Mutex;

use remotesim_core::handle::{Frame, RawHandle};
use remotesim_core::image::ImageFormat;

use crate::remote::{
    BoolParam, ClientId, ConnectOptions, FloatParam, IntParam, ObjectFloatParam,
    ProximityReading, ReturnCode, ScriptArgs, ScriptReply, ScriptType, SimxApi, SimxResult,
    StringParam, VisionFrame,
};

#[derive(Debug, Clone)]
enum ProximityScript {
    Unscripted,
    NoValue,
    Reading(ProximityReading),
}

#[derive(Debug, Clone)]
struct ObjectRecord {
    handle: RawHandle,
    position: [f32; 3],
    orientation: [f32; 3],
    parent: Option<RawHandle>,
    bbox_min: [f32; 3],
    bbox_max: [f32; 3],
    removed: bool,
    joint_velocity: Option<f32>,
    proximity: ProximityScript,
    vision: Option<VisionFrame>,
    script_replies: HashMap<String, ScriptReply>,
}

impl ObjectRecord {
    fn new(handle: RawHandle) -> Self {
        Self {
            handle,
            position: [0.0; 3],
            orientation: [0.0; 3],
            parent: None,
            bbox_min: [0.0; 3],
            bbox_max: [0.0; 3],
            removed: false,
            joint_velocity: None,
            proximity: ProximityScript::Unscripted,
            vision: None,
            script_replies: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct CollectionRecord {
    handle: RawHandle,
    members: Vec<String>,
}

#[derive(Debug)]
struct ServerState {
    next_handle: i32,
    next_client: i32,
    client: Option<ClientId>,
    refuse_connections: bool,
    objects: HashMap<String, ObjectRecord>,
    collections: HashMap<String, CollectionRecord>,
    sim_running: bool,
    synchronous: bool,
    trigger_count: u32,
    program_version: i32,
    dynamics_engine: i32,
    sim_dt: f32,
    dyn_dt: f32,
    scene_path: String,
}

impl Default for ServerState {
    fn default() -> Self {
        Self {
            next_handle: 1,
            next_client: 0,
            client: None,
            refuse_connections: false,
            objects: HashMap::new(),
            collections: HashMap::new(),
            sim_running: false,
            synchronous: false,
            trigger_count: 0,
            program_version: 40200,
            dynamics_engine: 0,
            sim_dt: 0.05,
            dyn_dt: 0.005,
            scene_path: "/scenes/default.ttt".to_string(),
        }
    }
}

impl ServerState {
    fn object_by_handle(&self, handle: RawHandle) -> Option<&ObjectRecord> {
        self.objects
            .values()
            .find(|o| o.handle == handle && !o.removed)
    }

    fn object_by_handle_mut(&mut self, handle: RawHandle) -> Option<&mut ObjectRecord> {
        self.objects
            .values_mut()
            .find(|o| o.handle == handle && !o.removed)
    }

    /// Absolute origin of a reference frame; fails when the reference is gone.
    fn frame_origin(&self, frame: Frame) -> SimxResult<([f32; 3], [f32; 3])> {
        match frame {
            Frame::Absolute => Ok(([0.0; 3], [0.0; 3])),
            Frame::Relative(handle) => {
                let record = self
                    .object_by_handle(handle)
                    .ok_or(ReturnCode::REMOTE_ERROR)?;
                Ok((record.position, record.orientation))
            }
        }
    }
}

/// Scripted stand-in for the simulator's remote API server.
#[derive(Debug, Default)]
pub struct ScriptedServer {
    state: Mutex<ServerState>,
}

impl ScriptedServer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ServerState> {
        self.state.lock().expect("scripted scene poisoned")
    }

    fn check_client(state: &ServerState, client: ClientId) -> SimxResult<()> {
        if state.client == Some(client) {
            Ok(())
        } else {
            Err(ReturnCode::LOCAL_ERROR)
        }
    }

    // ---- Scene setup ----

    pub fn add_object(&self, name: &str) -> RawHandle {
        self.add_object_at(name, [0.0; 3])
    }

    pub fn add_object_at(&self, name: &str, position: [f32; 3]) -> RawHandle {
        let mut state = self.lock();
        let handle = RawHandle(state.next_handle);
        state.next_handle += 1;
        let mut record = ObjectRecord::new(handle);
        record.position = position;
        state.objects.insert(name.to_string(), record);
        handle
    }

    pub fn add_collection(&self, name: &str, members: &[&str]) -> RawHandle {
        let mut state = self.lock();
        let handle = RawHandle(state.next_handle);
        state.next_handle += 1;
        state.collections.insert(
            name.to_string(),
            CollectionRecord {
                handle,
                members: members.iter().map(|m| m.to_string()).collect(),
            },
        );
        handle
    }

    pub fn set_parent(&self, child: &str, parent: Option<&str>) {
        let mut state = self.lock();
        let parent_handle =
            parent.map(|p| state.objects.get(p).expect("unknown parent object").handle);
        state
            .objects
            .get_mut(child)
            .expect("unknown child object")
            .parent = parent_handle;
    }

    pub fn set_bbox(&self, name: &str, min: [f32; 3], max: [f32; 3]) {
        let mut state = self.lock();
        let record = state.objects.get_mut(name).expect("unknown object");
        record.bbox_min = min;
        record.bbox_max = max;
    }

    /// Script the next proximity reads: `Some` is a reading, `None` the
    /// no-value reply.
    pub fn set_proximity_reading(&self, name: &str, reading: Option<ProximityReading>) {
        let mut state = self.lock();
        state.objects.get_mut(name).expect("unknown object").proximity = match reading {
            Some(reading) => ProximityScript::Reading(reading),
            None => ProximityScript::NoValue,
        };
    }

    /// Script the raw capture returned for this sensor. The frame is served
    /// as-is; script a buffer matching the format the wrapper will request.
    pub fn set_vision_frame(&self, name: &str, resolution: [u32; 2], pixels: Vec<i8>) {
        let mut state = self.lock();
        state.objects.get_mut(name).expect("unknown object").vision =
            Some(VisionFrame { resolution, pixels });
    }

    pub fn set_script_reply(&self, name: &str, func: &str, reply: ScriptReply) {
        let mut state = self.lock();
        state
            .objects
            .get_mut(name)
            .expect("unknown object")
            .script_replies
            .insert(func.to_string(), reply);
    }

    pub fn refuse_connections(&self, refuse: bool) {
        self.lock().refuse_connections = refuse;
    }

    pub fn set_sim_running(&self, running: bool) {
        self.lock().sim_running = running;
    }

    pub fn set_program_version(&self, version: i32) {
        self.lock().program_version = version;
    }

    pub fn set_dynamics_engine(&self, id: i32) {
        self.lock().dynamics_engine = id;
    }

    pub fn set_time_steps(&self, sim_dt: f32, dyn_dt: f32) {
        let mut state = self.lock();
        state.sim_dt = sim_dt;
        state.dyn_dt = dyn_dt;
    }

    pub fn set_scene_path(&self, path: &str) {
        self.lock().scene_path = path.to_string();
    }

    // ---- Assertion helpers ----

    pub fn is_connected(&self) -> bool {
        self.lock().client.is_some()
    }

    pub fn removed(&self, name: &str) -> bool {
        self.lock().objects.get(name).map_or(true, |o| o.removed)
    }

    pub fn joint_velocity(&self, name: &str) -> Option<f32> {
        self.lock().objects.get(name).and_then(|o| o.joint_velocity)
    }

    pub fn position_of(&self, name: &str) -> Option<[f32; 3]> {
        self.lock().objects.get(name).map(|o| o.position)
    }

    pub fn is_synchronous(&self) -> bool {
        self.lock().synchronous
    }

    pub fn trigger_count(&self) -> u32 {
        self.lock().trigger_count
    }
}

impl SimxApi for ScriptedServer {
    fn connect(&self, _addr: &str, _port: u16, _opts: &ConnectOptions) -> Option<ClientId> {
        let mut state = self.lock();
        if state.refuse_connections {
            return None;
        }
        let client = ClientId(state.next_client);
        state.next_client += 1;
        state.client = Some(client);
        Some(client)
    }

    fn disconnect(&self, client: ClientId) {
        let mut state = self.lock();
        if state.client == Some(client) {
            state.client = None;
        }
    }

    fn disconnect_all(&self) {
        self.lock().client = None;
    }

    fn object_handle(&self, client: ClientId, name: &str) -> SimxResult<RawHandle> {
        let state = self.lock();
        Self::check_client(&state, client)?;
        state
            .objects
            .get(name)
            .filter(|o| !o.removed)
            .map(|o| o.handle)
            .ok_or(ReturnCode::REMOTE_ERROR)
    }

    fn collection_handle(&self, client: ClientId, name: &str) -> SimxResult<RawHandle> {
        let state = self.lock();
        Self::check_client(&state, client)?;
        state
            .collections
            .get(name)
            .map(|c| c.handle)
            .ok_or(ReturnCode::REMOTE_ERROR)
    }

    fn object_position(
        &self,
        client: ClientId,
        handle: RawHandle,
        frame: Frame,
    ) -> SimxResult<[f32; 3]> {
        let state = self.lock();
        Self::check_client(&state, client)?;
        let record = state.object_by_handle(handle).ok_or(ReturnCode::REMOTE_ERROR)?;
        // Relative frames are modeled as componentwise offsets.
        let (origin, _) = state.frame_origin(frame)?;
        Ok([
            record.position[0] - origin[0],
            record.position[1] - origin[1],
            record.position[2] - origin[2],
        ])
    }

    fn set_object_position(
        &self,
        client: ClientId,
        handle: RawHandle,
        frame: Frame,
        position: [f32; 3],
    ) -> SimxResult<()> {
        let mut state = self.lock();
        Self::check_client(&state, client)?;
        let (origin, _) = state.frame_origin(frame)?;
        let record = state
            .object_by_handle_mut(handle)
            .ok_or(ReturnCode::REMOTE_ERROR)?;
        record.position = [
            origin[0] + position[0],
            origin[1] + position[1],
            origin[2] + position[2],
        ];
        Ok(())
    }

    fn object_orientation(
        &self,
        client: ClientId,
        handle: RawHandle,
        frame: Frame,
    ) -> SimxResult<[f32; 3]> {
        let state = self.lock();
        Self::check_client(&state, client)?;
        let record = state.object_by_handle(handle).ok_or(ReturnCode::REMOTE_ERROR)?;
        let (_, origin) = state.frame_origin(frame)?;
        Ok([
            record.orientation[0] - origin[0],
            record.orientation[1] - origin[1],
            record.orientation[2] - origin[2],
        ])
    }

    fn set_object_orientation(
        &self,
        client: ClientId,
        handle: RawHandle,
        frame: Frame,
        orientation: [f32; 3],
    ) -> SimxResult<()> {
        let mut state = self.lock();
        Self::check_client(&state, client)?;
        let (_, origin) = state.frame_origin(frame)?;
        let record = state
            .object_by_handle_mut(handle)
            .ok_or(ReturnCode::REMOTE_ERROR)?;
        record.orientation = [
            origin[0] + orientation[0],
            origin[1] + orientation[1],
            origin[2] + orientation[2],
        ];
        Ok(())
    }

    fn object_parent(
        &self,
        client: ClientId,
        handle: RawHandle,
    ) -> SimxResult<Option<RawHandle>> {
        let state = self.lock();
        Self::check_client(&state, client)?;
        state
            .object_by_handle(handle)
            .map(|o| o.parent)
            .ok_or(ReturnCode::REMOTE_ERROR)
    }

    fn object_float_param(
        &self,
        client: ClientId,
        handle: RawHandle,
        param: ObjectFloatParam,
    ) -> SimxResult<f32> {
        let state = self.lock();
        Self::check_client(&state, client)?;
        let record = state.object_by_handle(handle).ok_or(ReturnCode::REMOTE_ERROR)?;
        let value = match param {
            ObjectFloatParam::BboxMinX => record.bbox_min[0],
            ObjectFloatParam::BboxMinY => record.bbox_min[1],
            ObjectFloatParam::BboxMinZ => record.bbox_min[2],
            ObjectFloatParam::BboxMaxX => record.bbox_max[0],
            ObjectFloatParam::BboxMaxY => record.bbox_max[1],
            ObjectFloatParam::BboxMaxZ => record.bbox_max[2],
        };
        Ok(value)
    }

    fn remove_object(&self, client: ClientId, handle: RawHandle) -> SimxResult<()> {
        let mut state = self.lock();
        Self::check_client(&state, client)?;
        let record = state
            .object_by_handle_mut(handle)
            .ok_or(ReturnCode::REMOTE_ERROR)?;
        record.removed = true;
        Ok(())
    }

    fn remove_model(&self, client: ClientId, handle: RawHandle) -> SimxResult<()> {
        let mut state = self.lock();
        Self::check_client(&state, client)?;
        state
            .object_by_handle_mut(handle)
            .ok_or(ReturnCode::REMOTE_ERROR)?
            .removed = true;

        // Take down descendants, following parent links to a fixed point.
        let mut doomed = vec![handle];
        loop {
            let next: Vec<RawHandle> = state
                .objects
                .values()
                .filter(|o| {
                    !o.removed && o.parent.map_or(false, |p| doomed.contains(&p))
                })
                .map(|o| o.handle)
                .collect();
            if next.is_empty() {
                break;
            }
            for child in next {
                if let Some(record) = state.object_by_handle_mut(child) {
                    record.removed = true;
                }
                doomed.push(child);
            }
        }
        Ok(())
    }

    fn set_joint_target_velocity(
        &self,
        client: ClientId,
        handle: RawHandle,
        velocity: f32,
    ) -> SimxResult<()> {
        let mut state = self.lock();
        Self::check_client(&state, client)?;
        state
            .object_by_handle_mut(handle)
            .ok_or(ReturnCode::REMOTE_ERROR)?
            .joint_velocity = Some(velocity);
        Ok(())
    }

    fn read_proximity_sensor(
        &self,
        client: ClientId,
        handle: RawHandle,
    ) -> SimxResult<ProximityReading> {
        let state = self.lock();
        Self::check_client(&state, client)?;
        let record = state.object_by_handle(handle).ok_or(ReturnCode::REMOTE_ERROR)?;
        match &record.proximity {
            ProximityScript::Reading(reading) => Ok(*reading),
            ProximityScript::NoValue => Err(ReturnCode::NOVALUE),
            ProximityScript::Unscripted => Ok(ProximityReading {
                detected: false,
                detected_point: [0.0; 3],
            }),
        }
    }

    fn vision_sensor_image(
        &self,
        client: ClientId,
        handle: RawHandle,
        _format: ImageFormat,
    ) -> SimxResult<VisionFrame> {
        let state = self.lock();
        Self::check_client(&state, client)?;
        state
            .object_by_handle(handle)
            .and_then(|o| o.vision.clone())
            .ok_or(ReturnCode::REMOTE_ERROR)
    }

    fn call_script_function(
        &self,
        client: ClientId,
        target: &str,
        _script: ScriptType,
        func: &str,
        _args: &ScriptArgs,
    ) -> SimxResult<ScriptReply> {
        let state = self.lock();
        Self::check_client(&state, client)?;
        state
            .objects
            .get(target)
            .filter(|o| !o.removed)
            .and_then(|o| o.script_replies.get(func).cloned())
            .ok_or(ReturnCode::REMOTE_ERROR)
    }

    fn collection_names(&self, client: ClientId, handle: RawHandle) -> SimxResult<Vec<String>> {
        let state = self.lock();
        Self::check_client(&state, client)?;
        let collection = state
            .collections
            .values()
            .find(|c| c.handle == handle)
            .ok_or(ReturnCode::REMOTE_ERROR)?;
        Ok(collection.members.clone())
    }

    fn collection_positions(&self, client: ClientId, handle: RawHandle) -> SimxResult<Vec<f32>> {
        let state = self.lock();
        Self::check_client(&state, client)?;
        let collection = state
            .collections
            .values()
            .find(|c| c.handle == handle)
            .ok_or(ReturnCode::REMOTE_ERROR)?;
        Ok(collection
            .members
            .iter()
            .filter_map(|name| state.objects.get(name))
            .flat_map(|o| o.position)
            .collect())
    }

    fn collection_orientations(
        &self,
        client: ClientId,
        handle: RawHandle,
    ) -> SimxResult<Vec<f32>> {
        let state = self.lock();
        Self::check_client(&state, client)?;
        let collection = state
            .collections
            .values()
            .find(|c| c.handle == handle)
            .ok_or(ReturnCode::REMOTE_ERROR)?;
        Ok(collection
            .members
            .iter()
            .filter_map(|name| state.objects.get(name))
            .flat_map(|o| o.orientation)
            .collect())
    }

    fn float_param(&self, client: ClientId, param: FloatParam) -> SimxResult<f32> {
        let state = self.lock();
        Self::check_client(&state, client)?;
        Ok(match param {
            FloatParam::SimulationTimeStep => state.sim_dt,
            FloatParam::DynamicsTimeStep => state.dyn_dt,
        })
    }

    fn int_param(&self, client: ClientId, param: IntParam) -> SimxResult<i32> {
        let state = self.lock();
        Self::check_client(&state, client)?;
        Ok(match param {
            IntParam::ProgramVersion => state.program_version,
            IntParam::DynamicsEngine => state.dynamics_engine,
        })
    }

    fn bool_param(&self, client: ClientId, param: BoolParam) -> SimxResult<bool> {
        let state = self.lock();
        Self::check_client(&state, client)?;
        Ok(match param {
            BoolParam::WaitingForTrigger => state.synchronous && state.sim_running,
        })
    }

    fn string_param(&self, client: ClientId, param: StringParam) -> SimxResult<String> {
        let state = self.lock();
        Self::check_client(&state, client)?;
        Ok(match param {
            StringParam::ScenePath => state.scene_path.clone(),
        })
    }

    fn last_server_state(&self, client: ClientId) -> SimxResult<u16> {
        let state = self.lock();
        Self::check_client(&state, client)?;
        Ok(if state.sim_running { 0x01 } else { 0x00 })
    }

    fn set_synchronous(&self, client: ClientId, enable: bool) -> SimxResult<()> {
        let mut state = self.lock();
        Self::check_client(&state, client)?;
        state.synchronous = enable;
        Ok(())
    }

    fn start_simulation(&self, client: ClientId) -> SimxResult<()> {
        let mut state = self.lock();
        Self::check_client(&state, client)?;
        if state.sim_running {
            return Err(ReturnCode::NOVALUE);
        }
        state.sim_running = true;
        Ok(())
    }

    fn stop_simulation(&self, client: ClientId) -> SimxResult<()> {
        let mut state = self.lock();
        Self::check_client(&state, client)?;
        if !state.sim_running {
            return Err(ReturnCode::NOVALUE);
        }
        state.sim_running = false;
        Ok(())
    }

    fn synchronous_trigger(&self, client: ClientId) -> SimxResult<()> {
        let mut state = self.lock();
        Self::check_client(&state, client)?;
        state.trigger_count += 1;
        Ok(())
    }
}
