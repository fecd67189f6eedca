//! Interrupt pin behaviour on a new reading

use core::convert::TryFrom;

/// Interrupt control register values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptMode {
    /// Interrupt pin disabled
    Off,
    /// Pin goes high on a new reading
    High,
    /// Pin goes low on a new reading
    Low,
    /// Pin toggles on a new reading
    Invert,
}

impl From<InterruptMode> for u8 {
    fn from(mode: InterruptMode) -> Self {
        match mode {
            InterruptMode::Off => 0x00,
            InterruptMode::High => 0x02,
            InterruptMode::Low => 0x04,
            InterruptMode::Invert => 0x08,
        }
    }
}

impl TryFrom<u8> for InterruptMode {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(Self::Off),
            0x02 => Ok(Self::High),
            0x04 => Ok(Self::Low),
            0x08 => Ok(Self::Invert),
            other => Err(other),
        }
    }
}
