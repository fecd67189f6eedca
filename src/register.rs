//! Register map of the EC OEM circuit

use core::convert::From;

/// Register offsets on the EC OEM circuit.
/// Multi-byte registers are addressed by their first (most significant) byte.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    /// Device type, followed by the firmware version at 0x01
    DeviceType,
    /// Address lock, reads 0 when unlocked
    AddressLock,
    /// New I2C address
    NewAddress,
    /// Interrupt control
    InterruptControl,
    /// LED control
    LedControl,
    /// Active/hibernate
    ActiveHibernate,
    /// New reading available flag
    NewReading,
    /// Probe K value, 2 bytes
    ProbeType,
    /// Calibration value, 4 bytes
    Calibration,
    /// Calibration request
    CalibrationRequest,
    /// Calibration confirmation bits
    CalibrationConfirm,
    /// Temperature compensation, 4 bytes
    TemperatureCompensation,
    /// Temperature compensation confirmation, 4 bytes
    TemperatureConfirm,
    /// Conductivity reading, 4 bytes
    Conductivity,
}

impl From<Register> for u8 {
    fn from(val: Register) -> Self {
        match val {
            Register::DeviceType => 0x00,
            Register::AddressLock => 0x02,
            Register::NewAddress => 0x03,
            Register::InterruptControl => 0x04,
            Register::LedControl => 0x05,
            Register::ActiveHibernate => 0x06,
            Register::NewReading => 0x07,
            Register::ProbeType => 0x08,
            Register::Calibration => 0x0A,
            Register::CalibrationRequest => 0x0E,
            Register::CalibrationConfirm => 0x0F,
            Register::TemperatureCompensation => 0x10,
            Register::TemperatureConfirm => 0x14,
            Register::Conductivity => 0x18,
        }
    }
}

/// Written to [`Register::ActiveHibernate`] to start taking readings.
pub const ACTIVE_MODE: u8 = 0x01;
/// Written to [`Register::ActiveHibernate`] to hibernate.
pub const HIBERNATE_MODE: u8 = 0x00;

/// Written to [`Register::LedControl`] to switch the LED on.
pub const LED_ON: u8 = 0x01;
/// Written to [`Register::LedControl`] to switch the LED off.
pub const LED_OFF: u8 = 0x00;

/// First byte of the address unlock sequence.
pub const ADDRESS_UNLOCK_A: u8 = 0x55;
/// Second byte of the address unlock sequence.
pub const ADDRESS_UNLOCK_B: u8 = 0xAA;
/// Any other value locks the address register again.
pub const ADDRESS_LOCK: u8 = 0x00;

/// Clears [`Register::NewReading`].
pub const NEW_READING_CLEAR: u8 = 0x00;
