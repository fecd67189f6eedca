//! A platform agnostic Rust driver for the Atlas Scientific EC OEM conductivity circuit, based
//! on the [`embedded-hal`](https://github.com/rust-embedded/embedded-hal) traits.
//! Also contains the small text command console the circuit is usually driven with over a
//! serial line.
//!
//! ## The Device
//!
//! The EC OEM is an embedded conductivity circuit. It has an I2C interface and exposes all of
//! its configuration as byte registers. Fractional values (K value, calibration points,
//! temperature compensation, readings) are stored as integers scaled by 100.
//!
//! - [Datasheet](https://files.atlas-scientific.com/EC_oem_datasheet.pdf)
//!
//! ## Usage
//!
//! ### Instantiating
//!
//! Import this crate and an `embedded_hal` implementation, then instantiate
//! the device:
//!
//! ```no_run
//! use linux_embedded_hal as hal;
//!
//! use hal::{Delay, I2cdev};
//! use ec_oem::EcOem;
//!
//! # fn main() {
//! let dev = I2cdev::new("/dev/i2c-1").unwrap();
//! let mut ec = EcOem::new(dev, ec_oem::DEFAULT_ADDRESS, Delay);
//! ec.init().unwrap();
//! # }
//! ```
//!
//! ### Taking a Reading
//!
//! ```no_run
//! use linux_embedded_hal as hal;
//! use hal::{Delay, I2cdev};
//! use ec_oem::EcOem;
//!
//! let dev = I2cdev::new("/dev/i2c-1").unwrap();
//! let mut ec = EcOem::new(dev, 0x64, Delay);
//! ec.set_temperature_compensation(21.5).unwrap();
//! match ec.read_conductivity() {
//!     Ok(us_cm) => println!("{us_cm} uS/cm"),
//!     Err(e) => eprintln!("Error during reading: {e:?}"),
//! }
//! ```
//!
//! ### Console
//!
//! ```no_run
//! use linux_embedded_hal as hal;
//! use hal::{Delay, I2cdev};
//! use ec_oem::{Console, EcOem};
//!
//! let dev = I2cdev::new("/dev/i2c-1").unwrap();
//! let mut console = Console::new(EcOem::new(dev, 0x64, Delay));
//! let mut response = String::new();
//! console.process_line("cal,low,12.88\r", &mut response).unwrap();
//! print!("{response}");
//! ```

#![warn(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

#[cfg(test)]
mod test;

pub use crate::calibration::{CalibrationPoint, CalibrationStatus};
pub use crate::console::{Console, ConsoleError, Outcome};
pub use crate::device_info::{DeviceInfo, DeviceType};
pub use crate::interrupt::InterruptMode;
use crate::register::{
    Register, ACTIVE_MODE, ADDRESS_LOCK, ADDRESS_UNLOCK_A, ADDRESS_UNLOCK_B, HIBERNATE_MODE,
    LED_OFF, LED_ON, NEW_READING_CLEAR,
};
use embedded_hal::{delay::DelayNs, i2c::I2c};

pub mod calibration;
pub mod codec;
pub mod console;
pub mod device_info;
pub mod interrupt;
pub mod register;

/// Factory default I2C address
pub const DEFAULT_ADDRESS: u8 = 0x64;

/// Lowest address accepted by [`EcOem::change_address`]
pub const MIN_ADDRESS: u8 = 1;

/// Highest address accepted by [`EcOem::change_address`]
pub const MAX_ADDRESS: u8 = 127;

/// All possible errors in this crate
pub enum EcError<I>
where
    I: I2c,
{
    /// Error from the underlying I2C bus
    I2c(I::Error),
    /// Requested I2C address is outside of 1..=127
    AddressOutOfRange(u8),
    /// Address change attempted while the address lock register is set
    AddressLocked,
    /// Value does not fit the register it is written to
    ValueOutOfRange(f32),
}

impl<I> core::fmt::Debug for EcError<I>
where
    I: I2c,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EcError::I2c(e) => f.debug_tuple("I2c").field(e).finish(),
            EcError::AddressOutOfRange(a) => f.debug_tuple("AddressOutOfRange").field(a).finish(),
            EcError::AddressLocked => f.write_str("AddressLocked"),
            EcError::ValueOutOfRange(v) => f.debug_tuple("ValueOutOfRange").field(v).finish(),
        }
    }
}

/// State of the EC OEM circuit
#[derive(Debug)]
pub struct EcOem<I2C, D> {
    /// The concrete I2C device implementation.
    i2c: I2C,
    /// The I2C device address.
    address: u8,
    /// The concrete Delay implementation.
    delay: D,
    /// Echo console input
    debug_mode: bool,
    /// Log every conductivity reading
    ec_debug_mode: bool,
    /// Value of the last conductivity reading in uS/cm
    last_reading: f32,
}

impl<I, D> EcOem<I, D>
where
    I: I2c,
    D: DelayNs,
{
    /// Create a new instance of the EC OEM driver. Does not touch the bus.
    pub fn new(i2c: I, address: u8, delay: D) -> Self {
        Self {
            i2c,
            address,
            delay,
            debug_mode: false,
            ec_debug_mode: false,
            last_reading: 0.0,
        }
    }

    /// Destroy driver instance, return I2C bus instance.
    pub fn release(self) -> I {
        self.i2c
    }

    /// Wake the circuit up so it starts taking readings.
    pub fn init(&mut self) -> Result<(), EcError<I>> {
        self.set_active(true)?;
        self.last_reading = 0.0;
        Ok(())
    }

    /// The I2C address the driver currently talks to
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Write `data` to consecutive registers starting at `register`.
    fn write_register(&mut self, register: Register, data: &[u8]) -> Result<(), EcError<I>> {
        let mut buf = [0u8; 5];
        let len = data.len() + 1;
        buf[0] = register.into();
        buf[1..len].copy_from_slice(data);
        trace!("write {} {=[u8]:x}", register, data);
        self.i2c
            .write(self.address, &buf[..len])
            .map_err(EcError::I2c)
    }

    /// Read `N` consecutive registers starting at `register`.
    fn read_register<const N: usize>(&mut self, register: Register) -> Result<[u8; N], EcError<I>> {
        let mut buf = [0u8; N];
        let offset: u8 = register.into();
        self.i2c
            .write_read(self.address, &[offset], &mut buf)
            .map_err(EcError::I2c)?;
        trace!("read {} {=[u8]:x}", register, &buf[..]);
        Ok(buf)
    }

    fn write_byte(&mut self, register: Register, value: u8) -> Result<(), EcError<I>> {
        self.write_register(register, &[value])
    }

    fn read_byte(&mut self, register: Register) -> Result<u8, EcError<I>> {
        let [value] = self.read_register::<1>(register)?;
        Ok(value)
    }

    /// Read the current conductivity in uS/cm and remember it as the last reading.
    pub fn read_conductivity(&mut self) -> Result<f32, EcError<I>> {
        self.read_conductivity_raw()?;
        Ok(self.last_reading)
    }

    /// Like [`Self::read_conductivity`], but returns the register content (uS/cm × 100).
    pub fn read_conductivity_raw(&mut self) -> Result<i32, EcError<I>> {
        let bytes = self.read_register(Register::Conductivity)?;
        self.last_reading = codec::decode32(bytes);
        if self.ec_debug_mode {
            debug!("EC= {}", self.last_reading);
        }
        Ok(i32::from_be_bytes(bytes))
    }

    /// The value returned by the last successful [`Self::read_conductivity`]
    pub fn last_reading(&self) -> f32 {
        self.last_reading
    }

    /// Switch between taking readings (`true`) and hibernation (`false`)
    pub fn set_active(&mut self, active: bool) -> Result<(), EcError<I>> {
        let mode = if active { ACTIVE_MODE } else { HIBERNATE_MODE };
        self.write_byte(Register::ActiveHibernate, mode)
    }

    /// Whether the circuit is taking readings
    pub fn is_active(&mut self) -> Result<bool, EcError<I>> {
        Ok(self.read_byte(Register::ActiveHibernate)? != HIBERNATE_MODE)
    }

    /// Switch the status LED
    pub fn set_led(&mut self, on: bool) -> Result<(), EcError<I>> {
        self.write_byte(Register::LedControl, if on { LED_ON } else { LED_OFF })
    }

    /// Whether the status LED is on
    pub fn led(&mut self) -> Result<bool, EcError<I>> {
        Ok(self.read_byte(Register::LedControl)? != LED_OFF)
    }

    /// Configure the interrupt pin
    pub fn set_interrupt_mode(&mut self, mode: InterruptMode) -> Result<(), EcError<I>> {
        self.write_byte(Register::InterruptControl, mode.into())
    }

    /// Raw interrupt control register
    pub fn interrupt_control(&mut self) -> Result<u8, EcError<I>> {
        self.read_byte(Register::InterruptControl)
    }

    /// Interrupt pin configuration, `None` if the register holds an unknown value
    pub fn interrupt_mode(&mut self) -> Result<Option<InterruptMode>, EcError<I>> {
        Ok(InterruptMode::try_from(self.interrupt_control()?).ok())
    }

    /// Whether a reading arrived since the flag was last cleared
    pub fn new_reading_available(&mut self) -> Result<bool, EcError<I>> {
        Ok(self.read_byte(Register::NewReading)? != 0)
    }

    /// Clear the new reading flag
    pub fn clear_new_reading(&mut self) -> Result<(), EcError<I>> {
        self.write_byte(Register::NewReading, NEW_READING_CLEAR)
    }

    /// Set the K value of the connected probe, 0 to [`codec::MAX16`]
    pub fn set_probe_k(&mut self, k: f32) -> Result<(), EcError<I>> {
        if !(0.0..=codec::MAX16).contains(&k) {
            return Err(EcError::ValueOutOfRange(k));
        }
        self.write_register(Register::ProbeType, &codec::encode16(k))
    }

    /// K value of the connected probe
    pub fn probe_k(&mut self) -> Result<f32, EcError<I>> {
        Ok(codec::decode16(self.read_register(Register::ProbeType)?))
    }

    /// Set the solution temperature in °C used for compensation
    pub fn set_temperature_compensation(&mut self, celsius: f32) -> Result<(), EcError<I>> {
        if !(-codec::MAX32..=codec::MAX32).contains(&celsius) {
            return Err(EcError::ValueOutOfRange(celsius));
        }
        self.write_register(Register::TemperatureCompensation, &codec::encode32(celsius))
    }

    /// Temperature the circuit last compensated with.
    /// Only updated while the circuit is active.
    pub fn temperature_compensation(&mut self) -> Result<f32, EcError<I>> {
        Ok(codec::decode32(
            self.read_register(Register::TemperatureConfirm)?,
        ))
    }

    /// Issue a calibration request.
    /// Reference values must lie in `0.0..=MAX32`.
    /// This function blocks for the settle time of the request (10 to 100 milliseconds).
    pub fn calibrate(&mut self, point: CalibrationPoint) -> Result<(), EcError<I>> {
        if let Some(value) = point.value() {
            if !(0.0..=codec::MAX32).contains(&value) {
                return Err(EcError::ValueOutOfRange(value));
            }
            self.write_register(Register::Calibration, &codec::encode32(value))?;
        }
        self.write_byte(Register::CalibrationRequest, point.request_code())?;
        self.delay.delay_ms(point.settle_ms());
        Ok(())
    }

    /// Delete all calibration data
    pub fn clear_calibration(&mut self) -> Result<(), EcError<I>> {
        self.calibrate(CalibrationPoint::Clear)
    }

    /// Calibrate with the dry probe
    pub fn dry_calibration(&mut self) -> Result<(), EcError<I>> {
        self.calibrate(CalibrationPoint::Dry)
    }

    /// Single point calibration with a solution of the given conductivity
    pub fn single_point_calibration(&mut self, value: f32) -> Result<(), EcError<I>> {
        self.calibrate(CalibrationPoint::Single(value))
    }

    /// Low point calibration with a solution of the given conductivity
    pub fn low_point_calibration(&mut self, value: f32) -> Result<(), EcError<I>> {
        self.calibrate(CalibrationPoint::Low(value))
    }

    /// High point calibration with a solution of the given conductivity
    pub fn high_point_calibration(&mut self, value: f32) -> Result<(), EcError<I>> {
        self.calibrate(CalibrationPoint::High(value))
    }

    /// Which calibrations are stored on the circuit
    pub fn calibration_status(&mut self) -> Result<CalibrationStatus, EcError<I>> {
        Ok(self.read_byte(Register::CalibrationConfirm)?.into())
    }

    /// Device type and firmware version
    pub fn device_info(&mut self) -> Result<DeviceInfo, EcError<I>> {
        Ok(DeviceInfo::from(self.read_register::<2>(Register::DeviceType)?))
    }

    /// Send the unlock sequence to the address lock register
    pub fn unlock_address(&mut self) -> Result<(), EcError<I>> {
        self.write_byte(Register::AddressLock, ADDRESS_UNLOCK_A)?;
        self.write_byte(Register::AddressLock, ADDRESS_UNLOCK_B)
    }

    /// Lock the address register again
    pub fn lock_address(&mut self) -> Result<(), EcError<I>> {
        self.write_byte(Register::AddressLock, ADDRESS_LOCK)
    }

    /// Raw address lock register, 0 when unlocked
    pub fn address_lock_register(&mut self) -> Result<u8, EcError<I>> {
        self.read_byte(Register::AddressLock)
    }

    /// Whether the address register is locked
    pub fn address_locked(&mut self) -> Result<bool, EcError<I>> {
        Ok(self.address_lock_register()? != 0)
    }

    /// Content of the new address register
    pub fn read_address_register(&mut self) -> Result<u8, EcError<I>> {
        self.read_byte(Register::NewAddress)
    }

    /// Move the circuit to a new I2C address.
    /// The address register has to be unlocked first, see [`Self::unlock_address`].
    pub fn change_address(&mut self, new_address: u8) -> Result<(), EcError<I>> {
        if !(MIN_ADDRESS..=MAX_ADDRESS).contains(&new_address) {
            return Err(EcError::AddressOutOfRange(new_address));
        }
        if self.address_locked()? {
            return Err(EcError::AddressLocked);
        }
        self.write_byte(Register::NewAddress, new_address)?;
        debug!("address changed from {} to {}", self.address, new_address);
        self.address = new_address;
        Ok(())
    }

    /// Echo console input
    pub fn set_debug_mode(&mut self, enable: bool) {
        self.debug_mode = enable;
    }

    /// Whether console input is echoed
    pub fn debug_mode(&self) -> bool {
        self.debug_mode
    }

    /// Log every conductivity reading, and print the raw register on the console
    pub fn set_ec_debug_mode(&mut self, enable: bool) {
        self.ec_debug_mode = enable;
    }

    /// Whether conductivity readings are logged
    pub fn ec_debug_mode(&self) -> bool {
        self.ec_debug_mode
    }
}
