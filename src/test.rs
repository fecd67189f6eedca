use super::*;

use std::cell::Cell;
use std::rc::Rc;

use embedded_hal::i2c::ErrorKind;
use embedded_hal_mock::eh1::delay::NoopDelay as DelayMock;
use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction};

/// Delay that adds up how long it was asked to wait.
#[derive(Debug, Default, Clone)]
pub(crate) struct RecordingDelay(pub(crate) Rc<Cell<u64>>);

impl RecordingDelay {
    pub(crate) fn total_ms(&self) -> u64 {
        self.0.get() / 1_000_000
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.set(self.0.get() + u64::from(ns));
    }
}

/// Test the `init` function
#[test]
fn init_activates() {
    let expectations = [Transaction::write(0x64, vec![0x06, 0x01])];
    let mock = I2cMock::new(&expectations);
    let mut ec = EcOem::new(mock, DEFAULT_ADDRESS, DelayMock);
    ec.init().unwrap();
    assert_eq!(0.0, ec.last_reading());
    ec.release().done();
}

/// Test reading the conductivity
#[test]
fn read_conductivity() {
    let expectations = [Transaction::write_read(
        0x64,
        vec![0x18],
        vec![0x00, 0x00, 0x37, 0x2E],
    )];
    let mock = I2cMock::new(&expectations);
    let mut ec = EcOem::new(mock, 0x64, DelayMock);
    ec.set_ec_debug_mode(true);
    let ec_value = ec.read_conductivity().unwrap();
    assert_eq!(141.26, ec_value);
    assert_eq!(ec_value, ec.last_reading());
    ec.release().done();
}

/// The raw reading is the register content and updates the last reading too
#[test]
fn read_conductivity_raw() {
    let expectations = [Transaction::write_read(
        0x64,
        vec![0x18],
        vec![0xFF, 0xFF, 0xFF, 0x9C],
    )];
    let mock = I2cMock::new(&expectations);
    let mut ec = EcOem::new(mock, 0x64, DelayMock);
    assert_eq!(-100, ec.read_conductivity_raw().unwrap());
    assert_eq!(-1.0, ec.last_reading());
    ec.release().done();
}

/// Test the K value round trip over the bus
#[test]
fn probe_k() {
    let expectations = [
        Transaction::write(0x64, vec![0x08, 0x00, 0x64]),
        Transaction::write_read(0x64, vec![0x08], vec![0x00, 0x64]),
    ];
    let mock = I2cMock::new(&expectations);
    let mut ec = EcOem::new(mock, 0x64, DelayMock);
    ec.set_probe_k(1.0).unwrap();
    assert_eq!(1.0, ec.probe_k().unwrap());
    ec.release().done();
}

/// Values the registers cannot hold never reach the bus
#[test]
fn values_out_of_range() {
    let expectations: [Transaction; 0] = [];
    let mock = I2cMock::new(&expectations);
    let mut ec = EcOem::new(mock, 0x64, DelayMock);
    assert!(matches!(ec.set_probe_k(-1.0), Err(EcError::ValueOutOfRange(_))));
    assert!(matches!(ec.set_probe_k(700.0), Err(EcError::ValueOutOfRange(_))));
    assert!(matches!(ec.set_probe_k(f32::NAN), Err(EcError::ValueOutOfRange(_))));
    assert!(matches!(
        ec.single_point_calibration(-5.0),
        Err(EcError::ValueOutOfRange(_))
    ));
    assert!(matches!(
        ec.high_point_calibration(3.0e7),
        Err(EcError::ValueOutOfRange(_))
    ));
    assert!(matches!(
        ec.set_temperature_compensation(-3.0e7),
        Err(EcError::ValueOutOfRange(_))
    ));
    ec.release().done();
}

/// The largest K value is still accepted
#[test]
fn probe_k_upper_bound() {
    let expectations = [Transaction::write(0x64, vec![0x08, 0xFF, 0xFF])];
    let mock = I2cMock::new(&expectations);
    let mut ec = EcOem::new(mock, 0x64, DelayMock);
    ec.set_probe_k(codec::MAX16).unwrap();
    ec.release().done();
}

/// Compensation is written to 0x10 but confirmed from 0x14
#[test]
fn temperature_compensation() {
    let expectations = [
        Transaction::write(0x64, vec![0x10, 0x00, 0x00, 0x09, 0xC4]),
        Transaction::write_read(0x64, vec![0x14], vec![0x00, 0x00, 0x09, 0xC4]),
    ];
    let mock = I2cMock::new(&expectations);
    let mut ec = EcOem::new(mock, 0x64, DelayMock);
    ec.set_temperature_compensation(25.0).unwrap();
    assert_eq!(25.0, ec.temperature_compensation().unwrap());
    ec.release().done();
}

/// Test a low point calibration
#[test]
fn low_point_calibration() {
    let expectations = [
        Transaction::write(0x64, vec![0x0A, 0x00, 0x00, 0x05, 0x08]),
        Transaction::write(0x64, vec![0x0E, 0x04]),
        Transaction::write_read(0x64, vec![0x0F], vec![0x04]),
    ];
    let mock = I2cMock::new(&expectations);
    let delay = RecordingDelay::default();
    let mut ec = EcOem::new(mock, 0x64, delay.clone());
    ec.low_point_calibration(12.88).unwrap();
    assert!(delay.total_ms() >= 100);
    assert!(ec.calibration_status().unwrap().low());
    ec.release().done();
}

/// Clear and dry calibration carry no value
#[test]
fn clear_and_dry_calibration() {
    let expectations = [
        Transaction::write(0x64, vec![0x0E, 0x01]),
        Transaction::write(0x64, vec![0x0E, 0x02]),
    ];
    let mock = I2cMock::new(&expectations);
    let delay = RecordingDelay::default();
    let mut ec = EcOem::new(mock, 0x64, delay.clone());
    ec.clear_calibration().unwrap();
    assert_eq!(10, delay.total_ms());
    ec.dry_calibration().unwrap();
    assert_eq!(25, delay.total_ms());
    ec.release().done();
}

/// Test the `device_info` function
#[test]
fn device_info() {
    let expectations = [Transaction::write_read(0x64, vec![0x00], vec![0x04, 0x02])];
    let mock = I2cMock::new(&expectations);
    let mut ec = EcOem::new(mock, 0x64, DelayMock);
    let info = ec.device_info().unwrap();
    assert_eq!(DeviceType::Conductivity, info.kind());
    assert_eq!(2, info.firmware_version);
    ec.release().done();
}

/// Interrupt, LED and new reading registers
#[test]
fn control_registers() {
    let expectations = [
        Transaction::write(0x64, vec![0x04, 0x08]),
        Transaction::write_read(0x64, vec![0x04], vec![0x08]),
        Transaction::write_read(0x64, vec![0x04], vec![0x03]),
        Transaction::write(0x64, vec![0x05, 0x00]),
        Transaction::write_read(0x64, vec![0x05], vec![0x00]),
        Transaction::write_read(0x64, vec![0x07], vec![0x01]),
        Transaction::write(0x64, vec![0x07, 0x00]),
    ];
    let mock = I2cMock::new(&expectations);
    let mut ec = EcOem::new(mock, 0x64, DelayMock);
    ec.set_interrupt_mode(InterruptMode::Invert).unwrap();
    assert_eq!(Some(InterruptMode::Invert), ec.interrupt_mode().unwrap());
    assert_eq!(None, ec.interrupt_mode().unwrap());
    ec.set_led(false).unwrap();
    assert!(!ec.led().unwrap());
    assert!(ec.new_reading_available().unwrap());
    ec.clear_new_reading().unwrap();
    ec.release().done();
}

/// Unlocking takes two writes
#[test]
fn unlock_and_lock_address() {
    let expectations = [
        Transaction::write(0x64, vec![0x02, 0x55]),
        Transaction::write(0x64, vec![0x02, 0xAA]),
        Transaction::write_read(0x64, vec![0x02], vec![0x00]),
        Transaction::write(0x64, vec![0x02, 0x00]),
        Transaction::write_read(0x64, vec![0x02], vec![0x01]),
    ];
    let mock = I2cMock::new(&expectations);
    let mut ec = EcOem::new(mock, 0x64, DelayMock);
    ec.unlock_address().unwrap();
    assert!(!ec.address_locked().unwrap());
    ec.lock_address().unwrap();
    assert!(ec.address_locked().unwrap());
    ec.release().done();
}

/// Out of range addresses never reach the bus
#[test]
fn change_address_out_of_range() {
    let expectations: [Transaction; 0] = [];
    let mock = I2cMock::new(&expectations);
    let mut ec = EcOem::new(mock, 0x64, DelayMock);
    assert!(matches!(
        ec.change_address(0),
        Err(EcError::AddressOutOfRange(0))
    ));
    assert!(matches!(
        ec.change_address(200),
        Err(EcError::AddressOutOfRange(200))
    ));
    assert_eq!(0x64, ec.address());
    ec.release().done();
}

/// A locked address register blocks the change
#[test]
fn change_address_locked() {
    let expectations = [Transaction::write_read(0x64, vec![0x02], vec![0x01])];
    let mock = I2cMock::new(&expectations);
    let mut ec = EcOem::new(mock, 0x64, DelayMock);
    assert!(matches!(ec.change_address(50), Err(EcError::AddressLocked)));
    assert_eq!(0x64, ec.address());
    ec.release().done();
}

/// After a change the driver talks to the new address
#[test]
fn change_address() {
    let expectations = [
        Transaction::write_read(0x64, vec![0x02], vec![0x00]),
        Transaction::write(0x64, vec![0x03, 50]),
        Transaction::write(50, vec![0x06, 0x00]),
    ];
    let mock = I2cMock::new(&expectations);
    let mut ec = EcOem::new(mock, 0x64, DelayMock);
    ec.change_address(50).unwrap();
    assert_eq!(50, ec.address());
    ec.set_active(false).unwrap();
    ec.release().done();
}

/// Bus errors are passed through
#[test]
fn i2c_error() {
    let expectations = [Transaction::write(0x64, vec![0x06, 0x01]).with_error(ErrorKind::Other)];
    let mock = I2cMock::new(&expectations);
    let mut ec = EcOem::new(mock, 0x64, DelayMock);
    assert!(matches!(ec.init(), Err(EcError::I2c(_))));
    ec.release().done();
}
