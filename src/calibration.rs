//! Calibration requests and the calibration confirmation register

/// Calibration request sent to [`crate::register::Register::CalibrationRequest`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationPoint {
    /// Delete all calibration data
    Clear,
    /// Dry calibration, probe out of solution
    Dry,
    /// Single point calibration at the given conductivity
    Single(f32),
    /// Low point of a two point calibration
    Low(f32),
    /// High point of a two point calibration
    High(f32),
}

impl CalibrationPoint {
    /// The request code written to the calibration request register
    #[must_use]
    pub const fn request_code(&self) -> u8 {
        match self {
            CalibrationPoint::Clear => 0x01,
            CalibrationPoint::Dry => 0x02,
            CalibrationPoint::Single(_) => 0x03,
            CalibrationPoint::Low(_) => 0x04,
            CalibrationPoint::High(_) => 0x05,
        }
    }

    /// The reference value written to the calibration register first, if any
    #[must_use]
    pub const fn value(&self) -> Option<f32> {
        match self {
            CalibrationPoint::Clear | CalibrationPoint::Dry => None,
            CalibrationPoint::Single(v) | CalibrationPoint::Low(v) | CalibrationPoint::High(v) => {
                Some(*v)
            }
        }
    }

    /// Time in milliseconds the circuit needs before the confirmation register is valid
    #[must_use]
    pub const fn settle_ms(&self) -> u32 {
        match self {
            CalibrationPoint::Clear => 10,
            CalibrationPoint::Dry => 15,
            _ => 100,
        }
    }
}

/// Calibration confirmation register, one bit per completed calibration
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationStatus(u8);

impl CalibrationStatus {
    const DRY: u8 = 1 << 0;
    const SINGLE: u8 = 1 << 1;
    const LOW: u8 = 1 << 2;
    const HIGH: u8 = 1 << 3;

    /// Raw register value
    #[must_use]
    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// No calibration stored
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Dry calibration done
    #[must_use]
    pub const fn dry(&self) -> bool {
        self.0 & Self::DRY != 0
    }

    /// Single point calibration done
    #[must_use]
    pub const fn single(&self) -> bool {
        self.0 & Self::SINGLE != 0
    }

    /// Low point calibration done
    #[must_use]
    pub const fn low(&self) -> bool {
        self.0 & Self::LOW != 0
    }

    /// High point calibration done
    #[must_use]
    pub const fn high(&self) -> bool {
        self.0 & Self::HIGH != 0
    }

    /// Whether the register confirms the given request
    #[must_use]
    pub const fn confirms(&self, point: &CalibrationPoint) -> bool {
        self.0 == self.expected_for(point)
    }

    /// Register content after `point` was accepted: the current bits plus the
    /// bit of `point`, or nothing after a clear.
    #[must_use]
    pub const fn expected_for(&self, point: &CalibrationPoint) -> u8 {
        let bit = match point {
            CalibrationPoint::Clear => return 0,
            CalibrationPoint::Dry => Self::DRY,
            CalibrationPoint::Single(_) => Self::SINGLE,
            CalibrationPoint::Low(_) => Self::LOW,
            CalibrationPoint::High(_) => Self::HIGH,
        };
        self.0 | bit
    }
}

impl From<u8> for CalibrationStatus {
    fn from(value: u8) -> Self {
        Self(value)
    }
}
