//! The remote API boundary.
//!
//! `SimxApi` is the one seam between this crate and the simulator's native
//! remote-call client: connection start/stop plus blocking operations for
//! handle lookup, property get/set, script invocation, object group data,
//! and vision-sensor image retrieval. Every operation reports a status code;
//! wrappers translate non-success codes into `CoreError` here, in one place.

use remotesim_core::error::{CoreError, Domain, Result};
use remotesim_core::handle::{Frame, RawHandle};
use remotesim_core::image::ImageFormat;

/// Connection identifier issued by the remote API client.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ClientId(pub i32);

/// Status code of a completed remote call.
///
/// Zero is success; the no-value flag marks a completed call without fresh
/// data and is accepted only where a wrapper explicitly says so.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ReturnCode(pub u16);

impl ReturnCode {
    pub const OK: ReturnCode = ReturnCode(0);
    pub const NOVALUE: ReturnCode = ReturnCode(1);
    pub const TIMEOUT: ReturnCode = ReturnCode(2);
    pub const ILLEGAL_OPMODE: ReturnCode = ReturnCode(4);
    pub const REMOTE_ERROR: ReturnCode = ReturnCode(8);
    pub const SPLIT_PROGRESS: ReturnCode = ReturnCode(16);
    pub const LOCAL_ERROR: ReturnCode = ReturnCode(32);
    pub const INIT_ERROR: ReturnCode = ReturnCode(64);

    pub const fn is_ok(self) -> bool {
        self.0 == 0
    }

    pub const fn is_novalue(self) -> bool {
        self.0 == Self::NOVALUE.0
    }
}

/// Outcome of a single remote call: payload, or the non-success code.
pub type SimxResult<T> = std::result::Result<T, ReturnCode>;

/// Global float parameters.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FloatParam {
    SimulationTimeStep,
    DynamicsTimeStep,
}

/// Global integer parameters.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum IntParam {
    ProgramVersion,
    DynamicsEngine,
}

/// Global boolean parameters.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BoolParam {
    WaitingForTrigger,
}

/// Global string parameters.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StringParam {
    ScenePath,
}

/// Per-object float parameters (model bounding box, object frame).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ObjectFloatParam {
    BboxMinX,
    BboxMinY,
    BboxMinZ,
    BboxMaxX,
    BboxMaxY,
    BboxMaxZ,
}

impl ObjectFloatParam {
    pub const BBOX_MIN: [ObjectFloatParam; 3] = [
        ObjectFloatParam::BboxMinX,
        ObjectFloatParam::BboxMinY,
        ObjectFloatParam::BboxMinZ,
    ];
    pub const BBOX_MAX: [ObjectFloatParam; 3] = [
        ObjectFloatParam::BboxMaxX,
        ObjectFloatParam::BboxMaxY,
        ObjectFloatParam::BboxMaxZ,
    ];
}

/// Which embedded script a call is addressed to.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ScriptType {
    Main,
    Child,
    Customization,
}

/// Argument bundle for a script function call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptArgs {
    pub ints: Vec<i32>,
    pub floats: Vec<f32>,
    pub strings: Vec<String>,
    pub buffer: Vec<u8>,
}

/// Return bundle of a script function call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptReply {
    pub ints: Vec<i32>,
    pub floats: Vec<f32>,
    pub strings: Vec<String>,
    pub buffer: Vec<u8>,
}

/// One proximity-sensor read.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ProximityReading {
    pub detected: bool,
    /// Detected point in the sensor frame; z is depth along the ray.
    pub detected_point: [f32; 3],
}

/// One raw vision-sensor capture: signed bytes, rows bottom-up.
#[derive(Debug, Clone, PartialEq)]
pub struct VisionFrame {
    pub resolution: [u32; 2],
    pub pixels: Vec<i8>,
}

/// Options forwarded to the remote client when opening a connection.
#[derive(Debug, Copy, Clone)]
pub struct ConnectOptions {
    pub wait_until_connected: bool,
    pub do_not_reconnect: bool,
    pub timeout_ms: u32,
    pub comm_cycle_ms: u32,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            wait_until_connected: true,
            do_not_reconnect: true,
            timeout_ms: 5000,
            comm_cycle_ms: 5,
        }
    }
}

/// Blocking remote API client.
///
/// Implementations adapt the simulator vendor's native client; the scripted
/// server in [`crate::testing`] implements it in memory for tests.
pub trait SimxApi: Send + Sync {
    // ---- Connection ----
    fn connect(&self, addr: &str, port: u16, opts: &ConnectOptions) -> Option<ClientId>;
    fn disconnect(&self, client: ClientId);
    /// Close every connection this client ever opened (stale ones included).
    fn disconnect_all(&self);

    // ---- Handle lookup ----
    fn object_handle(&self, client: ClientId, name: &str) -> SimxResult<RawHandle>;
    fn collection_handle(&self, client: ClientId, name: &str) -> SimxResult<RawHandle>;

    // ---- Object properties ----
    fn object_position(
        &self,
        client: ClientId,
        handle: RawHandle,
        frame: Frame,
    ) -> SimxResult<[f32; 3]>;
    fn set_object_position(
        &self,
        client: ClientId,
        handle: RawHandle,
        frame: Frame,
        position: [f32; 3],
    ) -> SimxResult<()>;
    fn object_orientation(
        &self,
        client: ClientId,
        handle: RawHandle,
        frame: Frame,
    ) -> SimxResult<[f32; 3]>;
    fn set_object_orientation(
        &self,
        client: ClientId,
        handle: RawHandle,
        frame: Frame,
        orientation: [f32; 3],
    ) -> SimxResult<()>;
    /// Parent handle; `None` payload when the object sits at scene root.
    fn object_parent(&self, client: ClientId, handle: RawHandle)
        -> SimxResult<Option<RawHandle>>;
    fn object_float_param(
        &self,
        client: ClientId,
        handle: RawHandle,
        param: ObjectFloatParam,
    ) -> SimxResult<f32>;
    fn remove_object(&self, client: ClientId, handle: RawHandle) -> SimxResult<()>;
    /// Remove a model base object together with its whole tree.
    fn remove_model(&self, client: ClientId, handle: RawHandle) -> SimxResult<()>;

    // ---- Devices ----
    fn set_joint_target_velocity(
        &self,
        client: ClientId,
        handle: RawHandle,
        velocity: f32,
    ) -> SimxResult<()>;
    fn read_proximity_sensor(
        &self,
        client: ClientId,
        handle: RawHandle,
    ) -> SimxResult<ProximityReading>;
    fn vision_sensor_image(
        &self,
        client: ClientId,
        handle: RawHandle,
        format: ImageFormat,
    ) -> SimxResult<VisionFrame>;

    // ---- Scripts ----
    fn call_script_function(
        &self,
        client: ClientId,
        target: &str,
        script: ScriptType,
        func: &str,
        args: &ScriptArgs,
    ) -> SimxResult<ScriptReply>;

    // ---- Object group data ----
    fn collection_names(&self, client: ClientId, handle: RawHandle) -> SimxResult<Vec<String>>;
    /// Flat float run, 3 per member object.
    fn collection_positions(&self, client: ClientId, handle: RawHandle) -> SimxResult<Vec<f32>>;
    /// Flat float run, 3 Euler angles per member object.
    fn collection_orientations(&self, client: ClientId, handle: RawHandle)
        -> SimxResult<Vec<f32>>;

    // ---- Global parameters ----
    fn float_param(&self, client: ClientId, param: FloatParam) -> SimxResult<f32>;
    fn int_param(&self, client: ClientId, param: IntParam) -> SimxResult<i32>;
    fn bool_param(&self, client: ClientId, param: BoolParam) -> SimxResult<bool>;
    fn string_param(&self, client: ClientId, param: StringParam) -> SimxResult<String>;
    /// Server-state word of the last message received from the server.
    fn last_server_state(&self, client: ClientId) -> SimxResult<u16>;

    // ---- Simulation control ----
    fn set_synchronous(&self, client: ClientId, enable: bool) -> SimxResult<()>;
    fn start_simulation(&self, client: ClientId) -> SimxResult<()>;
    fn stop_simulation(&self, client: ClientId) -> SimxResult<()>;
    fn synchronous_trigger(&self, client: ClientId) -> SimxResult<()>;
}

/// Translate a completed call: any non-success code becomes a server error
/// naming the failed operation and target.
pub(crate) fn ok_or_server<T>(
    result: SimxResult<T>,
    domain: Domain,
    op: &str,
    target: &str,
) -> Result<T> {
    result.map_err(|code| CoreError::server(domain, op, target, code.0))
}

/// Like [`ok_or_server`], but the no-value flag also counts as success.
///
/// Simulation start/stop report no-value when the request reached the server
/// before the previous state change finished propagating.
pub(crate) fn ok_or_novalue(
    result: SimxResult<()>,
    domain: Domain,
    op: &str,
    target: &str,
) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(code) if code.is_novalue() => Ok(()),
        Err(code) => Err(CoreError::server(domain, op, target, code.0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remotesim_core::error::ErrorKind;

    #[test]
    fn non_success_codes_become_server_errors() {
        let err = ok_or_server(
            SimxResult::<()>::Err(ReturnCode::REMOTE_ERROR),
            Domain::Scene,
            "retrieve handle to",
            "Cuboid",
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Server);
        assert!(err.message.contains("Cuboid"));

        assert_eq!(
            ok_or_server(SimxResult::Ok(5), Domain::Scene, "x", "y").unwrap(),
            5
        );
    }

    #[test]
    fn novalue_is_tolerated_only_where_asked() {
        assert!(ok_or_novalue(
            Err(ReturnCode::NOVALUE),
            Domain::Simulation,
            "start simulation on",
            "server"
        )
        .is_ok());

        let err = ok_or_server(
            SimxResult::<()>::Err(ReturnCode::NOVALUE),
            Domain::Simulation,
            "start simulation on",
            "server",
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Server);
    }
}
