//! Register map and controller modes.
//!
//! Registers are grouped into contiguous families:
//! - 0x000-0x01f: status
//! - 0x020-0x02f: position-mode command
//! - 0x030-0x03f: position controller gains
//! - 0x040-0x04f: stay-within-bounds command
//! - 0x100 and up: device information

/// Register map version these definitions describe.
pub const CURRENT_REGISTER_MAP_VERSION: u32 = 4;

pub const MODE: u16 = 0x000;
pub const POSITION: u16 = 0x001;
pub const VELOCITY: u16 = 0x002;
pub const TORQUE: u16 = 0x003;
pub const Q_CURRENT: u16 = 0x004;
pub const D_CURRENT: u16 = 0x005;
pub const ABS_POSITION: u16 = 0x006;

pub const REZERO_STATE: u16 = 0x00c;
pub const VOLTAGE: u16 = 0x00d;
pub const TEMPERATURE: u16 = 0x00e;
pub const FAULT: u16 = 0x00f;

pub const PWM_PHASE_A: u16 = 0x010;
pub const PWM_PHASE_B: u16 = 0x011;
pub const PWM_PHASE_C: u16 = 0x012;

pub const VOLTAGE_PHASE_A: u16 = 0x014;
pub const VOLTAGE_PHASE_B: u16 = 0x015;
pub const VOLTAGE_PHASE_C: u16 = 0x016;

pub const VFOC_THETA: u16 = 0x018;
pub const VFOC_VOLTAGE: u16 = 0x019;
pub const VOLTAGE_DQ_D: u16 = 0x01a;
pub const VOLTAGE_DQ_Q: u16 = 0x01b;

pub const COMMAND_Q_CURRENT: u16 = 0x01c;
pub const COMMAND_D_CURRENT: u16 = 0x01d;

pub const VOLTAGE_FOC_THETA_RATE: u16 = 0x01e;

pub const COMMAND_POSITION: u16 = 0x020;
pub const COMMAND_VELOCITY: u16 = 0x021;
pub const COMMAND_FEEDFORWARD_TORQUE: u16 = 0x022;
pub const COMMAND_KP_SCALE: u16 = 0x023;
pub const COMMAND_KD_SCALE: u16 = 0x024;
pub const COMMAND_POSITION_MAX_TORQUE: u16 = 0x025;
pub const COMMAND_STOP_POSITION: u16 = 0x026;
pub const COMMAND_TIMEOUT: u16 = 0x027;

pub const VELOCITY_LIMIT: u16 = 0x028;
pub const ACCELERATION_LIMIT: u16 = 0x029;
pub const FIXED_VOLTAGE_OVERRIDE: u16 = 0x02a;

pub const POSITION_KP: u16 = 0x030;
pub const POSITION_KI: u16 = 0x031;
pub const POSITION_KD: u16 = 0x032;
pub const POSITION_FEEDFORWARD: u16 = 0x033;
pub const POSITION_COMMAND_TORQUE: u16 = 0x034;

pub const STAY_WITHIN_LOWER: u16 = 0x040;
pub const STAY_WITHIN_UPPER: u16 = 0x041;
pub const STAY_WITHIN_FEEDFORWARD: u16 = 0x042;
pub const STAY_WITHIN_KP_SCALE: u16 = 0x043;
pub const STAY_WITHIN_KD_SCALE: u16 = 0x044;
pub const STAY_WITHIN_MAX_TORQUE: u16 = 0x045;
pub const STAY_WITHIN_TIMEOUT: u16 = 0x046;

pub const MODEL_NUMBER: u16 = 0x100;
pub const FIRMWARE_VERSION: u16 = 0x101;
pub const REGISTER_MAP_VERSION: u16 = 0x102;
pub const MULTIPLEX_ID: u16 = 0x110;

pub const SERIAL_NUMBER_1: u16 = 0x120;
pub const SERIAL_NUMBER_2: u16 = 0x121;
pub const SERIAL_NUMBER_3: u16 = 0x122;

pub const REZERO: u16 = 0x130;

/// Returns a human-readable name for a register ID.
pub fn register_name(id: u16) -> &'static str {
    match id {
        MODE => "mode",
        POSITION => "position",
        VELOCITY => "velocity",
        TORQUE => "torque",
        Q_CURRENT => "q_current",
        D_CURRENT => "d_current",
        ABS_POSITION => "abs_position",
        REZERO_STATE => "rezero_state",
        VOLTAGE => "voltage",
        TEMPERATURE => "temperature",
        FAULT => "fault",
        PWM_PHASE_A => "pwm_phase_a",
        PWM_PHASE_B => "pwm_phase_b",
        PWM_PHASE_C => "pwm_phase_c",
        VOLTAGE_PHASE_A => "voltage_phase_a",
        VOLTAGE_PHASE_B => "voltage_phase_b",
        VOLTAGE_PHASE_C => "voltage_phase_c",
        VFOC_THETA => "vfoc_theta",
        VFOC_VOLTAGE => "vfoc_voltage",
        VOLTAGE_DQ_D => "voltage_dq_d",
        VOLTAGE_DQ_Q => "voltage_dq_q",
        COMMAND_Q_CURRENT => "command_q_current",
        COMMAND_D_CURRENT => "command_d_current",
        VOLTAGE_FOC_THETA_RATE => "voltage_foc_theta_rate",
        COMMAND_POSITION => "command_position",
        COMMAND_VELOCITY => "command_velocity",
        COMMAND_FEEDFORWARD_TORQUE => "command_feedforward_torque",
        COMMAND_KP_SCALE => "command_kp_scale",
        COMMAND_KD_SCALE => "command_kd_scale",
        COMMAND_POSITION_MAX_TORQUE => "command_position_max_torque",
        COMMAND_STOP_POSITION => "command_stop_position",
        COMMAND_TIMEOUT => "command_timeout",
        VELOCITY_LIMIT => "velocity_limit",
        ACCELERATION_LIMIT => "acceleration_limit",
        FIXED_VOLTAGE_OVERRIDE => "fixed_voltage_override",
        POSITION_KP => "position_kp",
        POSITION_KI => "position_ki",
        POSITION_KD => "position_kd",
        POSITION_FEEDFORWARD => "position_feedforward",
        POSITION_COMMAND_TORQUE => "position_command_torque",
        STAY_WITHIN_LOWER => "stay_within_lower",
        STAY_WITHIN_UPPER => "stay_within_upper",
        STAY_WITHIN_FEEDFORWARD => "stay_within_feedforward",
        STAY_WITHIN_KP_SCALE => "stay_within_kp_scale",
        STAY_WITHIN_KD_SCALE => "stay_within_kd_scale",
        STAY_WITHIN_MAX_TORQUE => "stay_within_max_torque",
        STAY_WITHIN_TIMEOUT => "stay_within_timeout",
        MODEL_NUMBER => "model_number",
        FIRMWARE_VERSION => "firmware_version",
        REGISTER_MAP_VERSION => "register_map_version",
        MULTIPLEX_ID => "multiplex_id",
        SERIAL_NUMBER_1 => "serial_number_1",
        SERIAL_NUMBER_2 => "serial_number_2",
        SERIAL_NUMBER_3 => "serial_number_3",
        REZERO => "rezero",
        _ => "unknown",
    }
}

/// Operating mode of the controller, as carried by the `MODE` register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Mode {
    #[default]
    Stopped = 0,
    Fault = 1,
    Enabling = 2,
    Calibrating = 3,
    CalibrationComplete = 4,
    Pwm = 5,
    Voltage = 6,
    VoltageFoc = 7,
    VoltageDq = 8,
    Current = 9,
    Position = 10,
    PositionTimeout = 11,
    ZeroVelocity = 12,
    StayWithinBounds = 13,
    MeasureInductance = 14,
    Brake = 15,
}

impl Mode {
    /// Map a wire value onto a mode, if it names one.
    pub fn from_wire(value: i32) -> Option<Self> {
        let mode = match value {
            0 => Self::Stopped,
            1 => Self::Fault,
            2 => Self::Enabling,
            3 => Self::Calibrating,
            4 => Self::CalibrationComplete,
            5 => Self::Pwm,
            6 => Self::Voltage,
            7 => Self::VoltageFoc,
            8 => Self::VoltageDq,
            9 => Self::Current,
            10 => Self::Position,
            11 => Self::PositionTimeout,
            12 => Self::ZeroVelocity,
            13 => Self::StayWithinBounds,
            14 => Self::MeasureInductance,
            15 => Self::Brake,
            _ => return None,
        };
        Some(mode)
    }

    /// The value written to the `MODE` register.
    pub fn as_wire(self) -> i8 {
        self as i8
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Fault => "fault",
            Self::Enabling => "enabling",
            Self::Calibrating => "calibrating",
            Self::CalibrationComplete => "calibration_complete",
            Self::Pwm => "pwm",
            Self::Voltage => "voltage",
            Self::VoltageFoc => "voltage_foc",
            Self::VoltageDq => "voltage_dq",
            Self::Current => "current",
            Self::Position => "position",
            Self::PositionTimeout => "position_timeout",
            Self::ZeroVelocity => "zero_velocity",
            Self::StayWithinBounds => "stay_within_bounds",
            Self::MeasureInductance => "measure_inductance",
            Self::Brake => "brake",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
