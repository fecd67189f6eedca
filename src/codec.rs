//! Fixed-point register codec.
//!
//! The circuit stores every fractional quantity as an integer scaled by 100
//! and transmits it most significant byte first. 16 bit values (the probe K
//! value) are unsigned, 32 bit values (conductivity, calibration and
//! temperature) are two's complement.

/// Scale factor between the float value and its register representation.
pub const SCALE_FACTOR: f32 = 100.0;

/// Largest value [`encode16`] represents without saturating.
pub const MAX16: f32 = u16::MAX as f32 / SCALE_FACTOR;

/// Largest magnitude [`encode32`] represents without saturating.
pub const MAX32: f32 = i32::MAX as f32 / SCALE_FACTOR;

/// Scale and round half away from zero. `as` saturates at the type bounds.
fn scale(value: f32) -> f32 {
    let scaled = value * SCALE_FACTOR;
    if scaled >= 0.0 {
        scaled + 0.5
    } else {
        scaled - 0.5
    }
}

/// Encode a value into the 2 byte register layout.
/// Values outside `0.0..=MAX16` saturate.
#[must_use]
pub fn encode16(value: f32) -> [u8; 2] {
    (scale(value) as u16).to_be_bytes()
}

/// Encode a value into the 4 byte register layout.
/// Values outside `-MAX32..=MAX32` saturate.
#[must_use]
pub fn encode32(value: f32) -> [u8; 4] {
    (scale(value) as i32).to_be_bytes()
}

/// Decode a 2 byte register value.
#[must_use]
pub fn decode16(bytes: [u8; 2]) -> f32 {
    f32::from(u16::from_be_bytes(bytes)) / SCALE_FACTOR
}

/// Decode a 4 byte register value.
#[must_use]
pub fn decode32(bytes: [u8; 4]) -> f32 {
    i32::from_be_bytes(bytes) as f32 / SCALE_FACTOR
}
