//! # Arm Control Executable
//!
//! This executable is responsible for controlling the servos of the arm.
//!
//! # Architecture
//!
//! - Initialise the servo driver and park every servo
//! - Main loop:
//!     - Telecommand processing, each TC is answered as soon as it is executed
//!     - Arm control processing, stepping servos towards their targets
//!     - Periodic telemetry

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Result};
use log::{info, trace, warn};
use std::time::{Duration, Instant};

// Internal
use arm_lib::{
    arm_ctrl::{ArmCtrl, InputData, MonotonicClock},
    arm_server::{ArmServer, ArmServerError, TmPacket},
    params::{ArmExecParams, DriverParams},
    servo_ctrl::ServoError,
    tc_processor,
};
use comms_if::net::zmq;
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of pulses the simulated output remembers.
#[cfg(not(all(target_arch = "arm", target_os = "linux")))]
const SIM_HISTORY_LIMIT: usize = 1024;

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("arm_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Arm Control Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    info!("Initialising...");

    // ---- LOAD PARAMETERS ----

    let params: ArmExecParams =
        util::params::load("arm_exec.toml").wrap_err("Could not load arm_exec params")?;

    info!("Parameters loaded");

    // ---- ARM INITIALISATION ----

    let output = open_output(&params.driver).wrap_err("Failed to open the servo driver")?;

    let mut arm = ArmCtrl::new(output, MonotonicClock::new());
    arm.init(params.arm.clone())
        .wrap_err("Failed to initialise ArmCtrl")?;

    info!("ArmCtrl init complete");

    // ---- SERVER INITIALISATION ----

    let zmq_ctx = zmq::Context::new();

    let mut server =
        ArmServer::new(&zmq_ctx, &params.net).wrap_err("Failed to initialise server")?;

    info!("Server initialised");

    // ---- MAIN LOOP ----

    info!("Initialisation complete, entering main loop\n");

    let tm_period = Duration::from_millis(params.telemetry_period_ms as u64);
    let mut last_tm = Instant::now();

    loop {
        // ---- TELECOMMAND PROCESSING ----

        // Get commands until none remain
        loop {
            let response = match server.get_tc() {
                Ok(Some(tc)) => tc_processor::exec(&mut arm, &tc),
                Ok(None) => break,
                Err(ArmServerError::TcParseError(e)) => {
                    warn!("Could not parse recieved TC: {}", e);
                    tc_processor::parse_error_response(&e)
                }
                Err(e) => {
                    return Err(e).wrap_err("An error occured while recieving TCs")
                }
            };

            if let Err(e) = server.send_response(&response) {
                warn!("Could not respond to TC: {}", e);
            }
        }

        // ---- ARM CONTROL PROCESSING ----

        let (output, report) = arm
            .proc(&InputData::default())
            .wrap_err("Error during ArmCtrl processing")?;

        if output.ticked {
            trace!("ArmCtrl status: {:?}", report);
        }

        // ---- TELEMETRY ----

        if last_tm.elapsed() >= tm_period {
            let packet = TmPacket::new(arm.snapshot(), arm.report());

            if let Err(e) = server.publish(&packet) {
                warn!("Could not publish telemetry: {}", e);
            }

            last_tm = Instant::now();
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Open the PCA9685 driver board.
#[cfg(all(target_arch = "arm", target_os = "linux"))]
fn open_output(
    params: &DriverParams,
) -> Result<pwm_pca9685::Pca9685<rppal::i2c::I2c>, ServoError> {
    info!(
        "Opening PCA9685 at {:#04x} on I2C bus {}",
        params.pca9685_address, params.i2c_bus
    );
    arm_lib::servo_ctrl::pca9685::open(params.i2c_bus, params.pca9685_address)
}

/// No driver board can be attached on this platform, so pulses are only simulated.
#[cfg(not(all(target_arch = "arm", target_os = "linux")))]
fn open_output(
    _params: &DriverParams,
) -> Result<arm_lib::servo_ctrl::sim::SimPulseOutput, ServoError> {
    warn!("Not running on the arm's board, servo pulses will be simulated");
    Ok(arm_lib::servo_ctrl::sim::SimPulseOutput::with_history_limit(SIM_HISTORY_LIMIT))
}
