//! Control module interface
//!
//! Control modules are driven by the executable's main loop: they are
//! configured once from their parameter file, then processed every cycle.
//! `arm_ctrl::ArmCtrl` is the main implementor.

/// A control module's internal state.
pub trait State {
    /// Parameters the module is configured from.
    type InitData;
    type InitError;

    /// What the main loop hands the module each cycle.
    type InputData;
    /// What the module hands back each cycle.
    type OutputData;
    /// Diagnostics produced alongside the output.
    type StatusReport;
    type ProcError;

    /// Configure the module and bring up any hardware it owns.
    ///
    /// A module whose initialisation failed must refuse to process.
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError>;

    /// Run one cycle of the module.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
