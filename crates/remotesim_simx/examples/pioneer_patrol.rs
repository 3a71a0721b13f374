//! Drive a Pioneer robot against the in-memory scripted server.
//!
//! Shows the full session flow — connect, inspect, start, sense, actuate,
//! step, stop — without needing a live simulator. Swap `ScriptedServer` for
//! a real `SimxApi` implementation to run against one.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use remotesim_simx::error::log_core_error;
use remotesim_simx::remote::ProximityReading;
use remotesim_simx::testing::ScriptedServer;
use remotesim_simx::{ConnectOptions, PioneerBot, SceneObject, Simulator};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let server = Arc::new(ScriptedServer::new());
    server.add_object_at("Pioneer", [0.0, 0.0, 0.1385]);
    for name in ["Pioneer_us1", "Pioneer_us2", "Pioneer_us3", "Pioneer_us4"] {
        server.add_object(name);
        server.set_parent(name, Some("Pioneer"));
    }
    for name in ["Pioneer_leftMotor", "Pioneer_rightMotor"] {
        server.add_object(name);
        server.set_parent(name, Some("Pioneer"));
    }
    server.set_proximity_reading(
        "Pioneer_us2",
        Some(ProximityReading {
            detected: true,
            detected_point: [0.0, 0.0, 0.35],
        }),
    );

    let sim = Arc::new(Simulator::new(server, "127.0.0.1", 19997));
    sim.connect(&ConnectOptions::default())?;
    info!(
        version = %sim.get_version()?,
        engine = %sim.get_dyn_eng_name()?,
        dt = sim.get_sim_dt()?,
        "server ready"
    );

    // The gripper attachment is optional; log and move on when absent.
    if let Err(err) = SceneObject::new(&sim, "Pioneer_gripper") {
        log_core_error(&err);
    }

    let bot = PioneerBot::new(
        &sim,
        "Pioneer",
        &["Pioneer_us1", "Pioneer_us2", "Pioneer_us3", "Pioneer_us4"],
        &["Pioneer_leftMotor", "Pioneer_rightMotor"],
    )?;

    sim.start_sim()?;
    for step in 0..5 {
        let readings = bot.us_sensors.get_inv_distances()?;
        let obstacle = readings.iter().cloned().fold(0.0f32, f32::max);

        // Steer away proportionally to the strongest return.
        let (left, right) = if obstacle > 0.5 {
            (1.0, 1.0 - obstacle)
        } else {
            (1.0, 1.0)
        };
        bot.wheels.set_velocities(&[left, right])?;
        info!(step, obstacle, left, right, "patrol step");

        sim.trig_sim_step()?;
    }
    sim.stop_sim()?;
    sim.disconnect();

    Ok(())
}
