//! Device Identification Types

/// Device identification as read from registers 0x00 and 0x01
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceInfo {
    /// The raw device type byte
    pub device_type: u8,
    /// The firmware version
    pub firmware_version: u8,
}

impl From<[u8; 2]> for DeviceInfo {
    fn from(buf: [u8; 2]) -> Self {
        Self {
            device_type: buf[0],
            firmware_version: buf[1],
        }
    }
}

impl DeviceInfo {
    /// The circuit family behind the device type byte
    #[must_use]
    pub const fn kind(&self) -> DeviceType {
        DeviceType::from_byte(self.device_type)
    }
}

/// Atlas Scientific OEM circuit families sharing the register layout
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceType {
    /// Unknown device type
    Unknown,
    /// pH OEM
    Ph,
    /// ORP OEM
    Orp,
    /// Dissolved oxygen OEM
    DissolvedOxygen,
    /// Conductivity OEM
    Conductivity,
}

impl DeviceType {
    const fn from_byte(value: u8) -> Self {
        match value {
            1 => Self::Ph,
            2 => Self::Orp,
            3 => Self::DissolvedOxygen,
            4 => Self::Conductivity,
            _ => Self::Unknown,
        }
    }
}

impl From<u8> for DeviceType {
    fn from(value: u8) -> Self {
        Self::from_byte(value)
    }
}
