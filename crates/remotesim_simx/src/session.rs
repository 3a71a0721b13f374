use std::sync::{Arc, Mutex};

use remotesim_core::error::{CoreError, Domain, ErrorKind, Result};
use remotesim_core::units::{round_to, FLOAT_PREC};
use tracing::{info, warn};

use crate::remote::{
    ok_or_novalue, ok_or_server, BoolParam, ClientId, ConnectOptions, FloatParam, IntParam,
    SimxApi, StringParam,
};

/// Bit of the server-state word meaning "simulation not stopped".
const SIM_NOT_STOPPED: u16 = 0x01;

/// Session with one remote API server.
///
/// Owns the connection identifier and the liveness check; every wrapper holds
/// an `Arc<Simulator>` passed at construction, so there is no ambient global
/// connection state. All calls are blocking and run on the caller's thread.
pub struct Simulator {
    api: Arc<dyn SimxApi>,
    addr: String,
    port: u16,
    endpoint: String,
    client: Mutex<Option<ClientId>>,
}

impl Simulator {
    pub fn new(api: Arc<dyn SimxApi>, addr: impl Into<String>, port: u16) -> Self {
        let addr = addr.into();
        let endpoint = format!("{addr}:{port}");
        Self {
            api,
            addr,
            port,
            endpoint,
            client: Mutex::new(None),
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Current connection identifier, if connected.
    pub fn client_id(&self) -> Option<ClientId> {
        *self.client.lock().expect("session state poisoned")
    }

    pub fn is_connected(&self) -> bool {
        self.client_id().is_some()
    }

    pub(crate) fn api(&self) -> &dyn SimxApi {
        self.api.as_ref()
    }

    /// Connection identifier, or the designated not-connected error.
    pub(crate) fn require_client(&self, op: &str, target: &str) -> Result<ClientId> {
        self.client_id()
            .ok_or_else(|| CoreError::not_connected(op, target))
    }

    /// Connect to the remote API server.
    ///
    /// Stale connections from earlier sessions of this process are closed
    /// first; the client refuses to open a second connection otherwise.
    pub fn connect(&self, opts: &ConnectOptions) -> Result<()> {
        self.api.disconnect_all();
        let mut slot = self.client.lock().expect("session state poisoned");
        *slot = None;

        match self.api.connect(&self.addr, self.port, opts) {
            Some(client) => {
                *slot = Some(client);
                info!(endpoint = %self.endpoint, "connected to remote API server");
                Ok(())
            }
            None => Err(CoreError::error()
                .domain(Domain::Connection)
                .kind(ErrorKind::Server)
                .msgf(format_args!(
                    "could not connect to remote API server at {}",
                    self.endpoint
                ))
                .build()),
        }
    }

    /// Disconnect from the remote API server. Safe to call when already
    /// disconnected.
    pub fn disconnect(&self) {
        let mut slot = self.client.lock().expect("session state poisoned");
        match slot.take() {
            Some(client) => {
                self.api.disconnect(client);
                info!(endpoint = %self.endpoint, "disconnected from remote API server");
            }
            None => {
                warn!(endpoint = %self.endpoint, "disconnect requested while not connected");
            }
        }
    }

    /// Server program version rendered as `x.y.z`.
    pub fn get_version(&self) -> Result<String> {
        let op = "retrieve version of";
        let client = self.require_client(op, &self.endpoint)?;
        let version = ok_or_server(
            self.api.int_param(client, IntParam::ProgramVersion),
            Domain::Simulation,
            op,
            &self.endpoint,
        )?;
        Ok(format!(
            "{x}.{y}.{z}",
            x = version / 10000,
            y = (version / 100) % 100,
            z = version % 100
        ))
    }

    /// Name of the active dynamics engine.
    pub fn get_dyn_eng_name(&self) -> Result<String> {
        let op = "retrieve dynamics engine of";
        let client = self.require_client(op, &self.endpoint)?;
        let id = ok_or_server(
            self.api.int_param(client, IntParam::DynamicsEngine),
            Domain::Simulation,
            op,
            &self.endpoint,
        )?;
        let name = match id {
            0 => "Bullet",
            1 => "ODE",
            2 => "Vortex",
            3 => "Newton",
            other => {
                return Err(CoreError::warn()
                    .domain(Domain::Simulation)
                    .kind(ErrorKind::InvalidArgument)
                    .msgf(format_args!("unknown dynamics engine id {other}"))
                    .build())
            }
        };
        Ok(name.to_string())
    }

    /// Simulation time step, rounded to the default precision (the server
    /// value is slightly imprecise around the 10th decimal digit).
    pub fn get_sim_dt(&self) -> Result<f32> {
        let op = "retrieve simulation time step of";
        let client = self.require_client(op, &self.endpoint)?;
        let dt = ok_or_server(
            self.api.float_param(client, FloatParam::SimulationTimeStep),
            Domain::Simulation,
            op,
            &self.endpoint,
        )?;
        Ok(round_to(dt, FLOAT_PREC))
    }

    /// Dynamics engine time step, rounded like [`Self::get_sim_dt`].
    pub fn get_dyn_eng_dt(&self) -> Result<f32> {
        let op = "retrieve dynamics time step of";
        let client = self.require_client(op, &self.endpoint)?;
        let dt = ok_or_server(
            self.api.float_param(client, FloatParam::DynamicsTimeStep),
            Domain::Simulation,
            op,
            &self.endpoint,
        )?;
        Ok(round_to(dt, FLOAT_PREC))
    }

    /// Path of the currently open scene.
    pub fn get_scene_path(&self) -> Result<String> {
        let op = "retrieve scene path of";
        let client = self.require_client(op, &self.endpoint)?;
        ok_or_server(
            self.api.string_param(client, StringParam::ScenePath),
            Domain::Simulation,
            op,
            &self.endpoint,
        )
    }

    /// Whether a simulation is started.
    ///
    /// The return value may be inaccurate immediately after starting or
    /// stopping a simulation; a short delay before calling helps.
    pub fn is_sim_started(&self) -> Result<bool> {
        let op = "query simulation state of";
        let client = self.require_client(op, &self.endpoint)?;

        // The waiting-for-trigger read is not conclusive by itself (unprocessed
        // trigger signals let the server advance without reporting a wait); it
        // is issued only to pull a fresh message from the server so the state
        // word below is up to date.
        let _ = ok_or_server(
            self.api.bool_param(client, BoolParam::WaitingForTrigger),
            Domain::Simulation,
            op,
            &self.endpoint,
        )?;

        let state = ok_or_server(
            self.api.last_server_state(client),
            Domain::Simulation,
            op,
            &self.endpoint,
        )?;
        Ok(state & SIM_NOT_STOPPED != 0)
    }

    /// Start a simulation in synchronous operation mode.
    pub fn start_sim(&self) -> Result<()> {
        let op = "start simulation on";
        let client = self.require_client(op, &self.endpoint)?;
        ok_or_server(
            self.api.set_synchronous(client, true),
            Domain::Simulation,
            "enable synchronous mode on",
            &self.endpoint,
        )?;
        ok_or_novalue(
            self.api.start_simulation(client),
            Domain::Simulation,
            op,
            &self.endpoint,
        )?;
        info!(endpoint = %self.endpoint, "simulation started");
        Ok(())
    }

    /// Stop the running simulation.
    pub fn stop_sim(&self) -> Result<()> {
        let op = "stop simulation on";
        let client = self.require_client(op, &self.endpoint)?;
        ok_or_novalue(
            self.api.stop_simulation(client),
            Domain::Simulation,
            op,
            &self.endpoint,
        )?;
        info!(endpoint = %self.endpoint, "simulation stopped");
        Ok(())
    }

    /// Trigger one synchronous simulation step.
    pub fn trig_sim_step(&self) -> Result<()> {
        let op = "trigger simulation step on";
        let client = self.require_client(op, &self.endpoint)?;
        ok_or_server(
            self.api.synchronous_trigger(client),
            Domain::Simulation,
            op,
            &self.endpoint,
        )
    }
}
