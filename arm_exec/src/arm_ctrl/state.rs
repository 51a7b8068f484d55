//! Implementations for the ArmCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, error, info, trace, warn};
use serde::Serialize;
use serde_json::Value;

// Internal
use super::{ArmCmdError, Clock, InitError, Params, ProcError, Servo, ServoRegistry};
use crate::servo_ctrl::{PulseOutput, ServoError};
use comms_if::{
    eqpt::arm::{ArmData, ServoData},
    tc::arm_ctrl::{ArmCmd, ArmCmdKind, ANGLE_KEY, NAME_KEY},
};
use util::{module::State, time::elapsed_millis};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Arm control module state
///
/// Generic over the pulse output driving the servos and the clock gating the
/// convergence steps, so that both can be replaced in simulation.
pub struct ArmCtrl<O, C> {
    params: Params,

    registry: ServoRegistry,

    output: O,

    clock: C,

    /// Clock reading at the last convergence step
    last_tick_ms: u32,

    operational: bool,

    report: StatusReport,
}

/// Input data to Arm Control.
#[derive(Debug, Default, Clone)]
pub struct InputData {
    /// The servo command to be executed, or `None` if there is no new
    /// command on this cycle.
    pub cmd: Option<ArmCmd>,
}

/// Output data of Arm Control.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct OutputData {
    /// Result of the command given in the input, if there was one.
    pub cmd_result: Option<Result<(), ArmCmdError>>,

    /// True if a convergence step was performed on this cycle.
    pub ticked: bool,
}

/// Status report for ArmCtrl processing, updated on every convergence step.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    /// Which servos moved on the last step, in registry order.
    pub moved: Vec<bool>,

    /// Number of pulses the output failed to apply on the last step.
    pub pulse_errors: usize,

    /// True if every servo had reached its desired angle after the last step.
    pub converged: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<O, C> State for ArmCtrl<O, C>
where
    O: PulseOutput,
    C: Clock,
{
    type InitData = Params;
    type InitError = InitError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = ProcError;

    /// Initialise the ArmCtrl module.
    ///
    /// Brings the bus up, configures the pulse output and parks every servo
    /// at its initial angle. Any failure aborts initialisation immediately
    /// and leaves the controller non-operational.
    fn init(&mut self, params: Self::InitData) -> Result<(), Self::InitError> {
        self.operational = false;

        params.are_valid().map_err(InitError::ParamsInvalid)?;

        self.registry = ServoRegistry::new(&params.servos);
        self.params = params;

        self.output.begin().map_err(InitError::BusInit)?;
        self.output
            .init(self.params.pulse.frequency_hz)
            .map_err(InitError::PulseInit)?;

        for i in 0..self.registry.len() {
            if let Err(e) = self.send_angle(i) {
                let name = self
                    .registry
                    .get(i)
                    .map(|s| s.name().to_string())
                    .unwrap_or_default();
                return Err(InitError::ParkFailed(name, e));
            }
        }

        self.last_tick_ms = self.clock.millis();
        self.report = StatusReport {
            moved: vec![false; self.registry.len()],
            pulse_errors: 0,
            converged: true,
        };
        self.operational = true;

        info!(
            "[{}] initialised with {} servos",
            self.params.name,
            self.registry.len()
        );

        Ok(())
    }

    /// Perform cyclic processing of Arm Control.
    ///
    /// Executes the command in the input, if any, and then performs a
    /// convergence step if the update period has elapsed.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        if !self.operational {
            return Err(ProcError::NotOperational);
        }

        let cmd_result = input_data
            .cmd
            .as_ref()
            .map(|cmd| self.handle(cmd.kind, cmd.payload.as_ref()));

        let ticked = self.update().is_some();

        Ok((OutputData { cmd_result, ticked }, self.report.clone()))
    }
}

impl<O, C> ArmCtrl<O, C>
where
    O: PulseOutput,
    C: Clock,
{
    /// Create a new, uninitialised, arm controller.
    pub fn new(output: O, clock: C) -> Self {
        Self {
            params: Params::default(),
            registry: ServoRegistry::default(),
            output,
            clock,
            last_tick_ms: 0,
            operational: false,
            report: StatusReport::default(),
        }
    }

    /// Execute a servo command.
    ///
    /// On error no servo is modified.
    pub fn handle(&mut self, kind: ArmCmdKind, payload: Option<&Value>) -> Result<(), ArmCmdError> {
        let result = if !self.operational {
            Err(ArmCmdError::NotOperational)
        } else {
            match kind {
                ArmCmdKind::ServoMinus => self.servo_minus(payload),
                ArmCmdKind::ServoPlus => self.servo_plus(payload),
                ArmCmdKind::ServoStop => self.servo_stop(payload),
                ArmCmdKind::ServoAngle => self.servo_angle(payload),
            }
        };

        if let Err(ref e) = result {
            warn!("[{}] {} rejected: {}", self.params.name, kind, e);
        }

        result
    }

    /// Perform a convergence step if at least the update period has elapsed
    /// since the last one.
    ///
    /// Returns the number of servos which moved, or `None` if no step was
    /// due.
    pub fn update(&mut self) -> Option<usize> {
        if !self.operational {
            return None;
        }

        let now = self.clock.millis();
        if elapsed_millis(now, self.last_tick_ms) < self.params.update_period_ms {
            return None;
        }
        self.last_tick_ms = now;

        Some(self.tick())
    }

    /// Perform one convergence step, ignoring the update period.
    ///
    /// Every servo moves one degree towards its desired angle, and the new
    /// angle of every servo that moved is output immediately. Returns the
    /// number of servos which moved.
    pub fn tick(&mut self) -> usize {
        if !self.operational {
            return 0;
        }

        self.report = StatusReport {
            moved: vec![false; self.registry.len()],
            ..Default::default()
        };

        let mut num_moved = 0;

        for i in 0..self.registry.len() {
            let moved = match self.registry.get_mut(i) {
                Some(servo) => servo.step(),
                None => false,
            };

            if !moved {
                continue;
            }

            num_moved += 1;
            self.report.moved[i] = true;

            // The position is kept even if the pulse couldn't be applied, the
            // next step will send the following angle
            if let Err(e) = self.send_angle(i) {
                self.report.pulse_errors += 1;
                error!(
                    "[{}] could not send angle to servo {}: {}",
                    self.params.name,
                    self.registry.get(i).map(Servo::name).unwrap_or("?"),
                    e
                );
            }
        }

        self.report.converged = self.registry.iter().all(Servo::converged);

        num_moved
    }

    /// Produce a report of every servo's bounds and current angle.
    pub fn snapshot(&self) -> ArmData {
        ArmData {
            name: self.params.name.clone(),
            data: self
                .registry
                .iter()
                .map(|s| ServoData {
                    servo: s.name().to_string(),
                    min: s.min_angle(),
                    max: s.max_angle(),
                    angle: s.current_angle(),
                })
                .collect(),
        }
    }

    pub fn servo(&self, name: &str) -> Option<&Servo> {
        self.registry.find_by_name(Some(name))
    }

    pub fn registry(&self) -> &ServoRegistry {
        &self.registry
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    pub fn report(&self) -> &StatusReport {
        &self.report
    }

    /// True once [`State::init`] has succeeded.
    pub fn is_operational(&self) -> bool {
        self.operational
    }

    // ---- COMMAND HANDLERS ----

    fn servo_minus(&mut self, payload: Option<&Value>) -> Result<(), ArmCmdError> {
        let servo = resolve(&mut self.registry, payload)?;

        let angle = servo.min_angle();
        servo.set_desired_angle(angle);

        debug!("[{}] servo {} moving to {}", self.params.name, servo.name(), angle);
        Ok(())
    }

    fn servo_plus(&mut self, payload: Option<&Value>) -> Result<(), ArmCmdError> {
        let servo = resolve(&mut self.registry, payload)?;

        let angle = servo.max_angle();
        servo.set_desired_angle(angle);

        debug!("[{}] servo {} moving to {}", self.params.name, servo.name(), angle);
        Ok(())
    }

    fn servo_stop(&mut self, payload: Option<&Value>) -> Result<(), ArmCmdError> {
        let servo = resolve(&mut self.registry, payload)?;

        let angle = servo.current_angle();
        servo.set_desired_angle(angle);

        debug!(
            "[{}] servo {} stopping at angle {}",
            self.params.name,
            servo.name(),
            angle
        );
        Ok(())
    }

    fn servo_angle(&mut self, payload: Option<&Value>) -> Result<(), ArmCmdError> {
        let servo = resolve(&mut self.registry, payload)?;

        let angle = payload
            .and_then(|p| p.get(ANGLE_KEY))
            .ok_or(ArmCmdError::NoAngleField)?
            .as_i64()
            .ok_or(ArmCmdError::AngleNotInteger)?;

        if !servo.in_bounds(angle) {
            return Err(ArmCmdError::AngleOutOfRange {
                servo: servo.name().to_string(),
                angle,
                min: servo.min_angle(),
                max: servo.max_angle(),
            });
        }

        // In bounds, so it fits
        servo.set_desired_angle(angle as u8);

        debug!("[{}] servo {} moving to {}", self.params.name, servo.name(), angle);
        Ok(())
    }

    /// Output the current angle of the servo at `index`.
    fn send_angle(&mut self, index: usize) -> Result<(), ServoError> {
        let servo = match self.registry.get(index) {
            Some(s) => s,
            None => return Ok(()),
        };

        let ticks = self.params.pulse.angle_to_ticks(servo.current_angle());

        trace!(
            "[{}] sending angle {} ({} ticks) to servo {}",
            self.params.name,
            servo.current_angle(),
            ticks,
            servo.name()
        );

        self.output.set_pulse(servo.channel(), 0, ticks)
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Find the servo a command payload targets.
fn resolve<'a>(
    registry: &'a mut ServoRegistry,
    payload: Option<&Value>,
) -> Result<&'a mut Servo, ArmCmdError> {
    let fields = match payload {
        None | Some(Value::Null) => return Err(ArmCmdError::NullPayload),
        Some(p) => p.as_object().ok_or(ArmCmdError::PayloadNotObject)?,
    };

    let name = fields
        .get(NAME_KEY)
        .ok_or(ArmCmdError::NoNameField)?
        .as_str()
        .ok_or(ArmCmdError::NameNotString)?;

    registry
        .find_by_name_mut(Some(name))
        .ok_or_else(|| ArmCmdError::UnknownServo(name.to_string()))
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
