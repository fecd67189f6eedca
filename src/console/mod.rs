//! Text command console for the EC OEM circuit.
//!
//! Lines look like `command[,arg1[,arg2]]`, are case insensitive and at most
//! [`parser::MAX_LINE_LEN`] characters long. Every command maps to a short
//! sequence of register accesses followed by a human readable confirmation.
//! Send `?` for the list of commands.

use core::fmt::Write;

use embedded_hal::{delay::DelayNs, i2c::I2c};

use crate::calibration::CalibrationPoint;
use crate::register::Register;
use crate::{EcError, EcOem, InterruptMode};

pub mod parser;

use parser::{parse_float, parse_int, parse_unsigned_float, CommandLine, LineReader};


const HELP: &str = "\
**commands are not case sensitive**

i = device type and version number

adr,? = what is the I2C ID number
adr,unlock = unlock the I2C address change register
adr,lock = Lock the address change register
adr,new,[new i2c address number]

int,? = read the state of the interrupt control register
int,[high],[low],[inv],[off] = set the interrupt control register

led,? = read the state of the LED control register
led,[on],[off] = set the LED control register

on = start taking readings
off = stop taking readings; hibernate

nra,? = read the state of the new reading available register
nra,clr = clear the new reading available register

k,? = read the K value of the conductivity probe
k,xx.x = set a new K value for the conductivity probe

cal,? = read the state of the calibration register
cal,clr = clear the calibration
cal,xxxx = single point calibration
cal,dry = dry calibration
cal,low,xxxx = low point calibration
cal,high,xxxx = high point calibration

t,? = read the temperature compensation value
t,xx.x = set the temperature compensation in C

r = take a single conductivity reading
r,1 / r,0 = continuous readings (not supported)
";

/// What a console line ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// Executed and confirmed
    Done,
    /// Refused because of the input, the reason was printed
    Rejected,
    /// Written, but reading the register back did not confirm it. Nothing was printed.
    VerificationFailed {
        /// Register that was read back
        register: Register,
        /// Value it should have held. For the address lock any non-zero value means locked.
        expected: u8,
        /// Value found there
        actual: u8,
    },
    /// Continuous reading mode was requested
    Unsupported,
    /// Unknown command or argument, nothing happened
    Ignored,
}

/// Errors while executing a console line
pub enum ConsoleError<I>
where
    I: I2c,
{
    /// The driver failed
    Device(EcError<I>),
    /// The response could not be written
    Output(core::fmt::Error),
}

impl<I: I2c> From<EcError<I>> for ConsoleError<I> {
    fn from(error: EcError<I>) -> Self {
        ConsoleError::Device(error)
    }
}

impl<I: I2c> From<core::fmt::Error> for ConsoleError<I> {
    fn from(error: core::fmt::Error) -> Self {
        ConsoleError::Output(error)
    }
}

impl<I: I2c> core::fmt::Debug for ConsoleError<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConsoleError::Device(e) => f.debug_tuple("Device").field(e).finish(),
            ConsoleError::Output(e) => f.debug_tuple("Output").field(e).finish(),
        }
    }
}

/// Console wrapping an EC OEM driver
#[derive(Debug)]
pub struct Console<I2C, D> {
    sensor: EcOem<I2C, D>,
    reader: LineReader,
}

impl<I, D> Console<I, D>
where
    I: I2c,
    D: DelayNs,
{
    /// Create a console for the given driver
    pub fn new(sensor: EcOem<I, D>) -> Self {
        Self {
            sensor,
            reader: LineReader::new(),
        }
    }

    /// Give the driver back
    pub fn release(self) -> EcOem<I, D> {
        self.sensor
    }

    /// The wrapped driver
    pub fn sensor(&mut self) -> &mut EcOem<I, D> {
        &mut self.sensor
    }

    /// Feed one byte of serial input. Executes the line once it is complete.
    pub fn feed<W: Write>(
        &mut self,
        byte: u8,
        out: &mut W,
    ) -> Result<Option<Outcome>, ConsoleError<I>> {
        match self.reader.push(byte) {
            Some(line) => self.execute(&line, out).map(Some),
            None => Ok(None),
        }
    }

    /// Parse and execute one raw line, writing the response to `out`.
    pub fn process_line<W: Write>(
        &mut self,
        raw: &str,
        out: &mut W,
    ) -> Result<Outcome, ConsoleError<I>> {
        self.execute(&CommandLine::parse(raw), out)
    }

    /// Execute a parsed line, writing the response to `out`.
    pub fn execute<W: Write>(
        &mut self,
        line: &CommandLine,
        out: &mut W,
    ) -> Result<Outcome, ConsoleError<I>> {
        if self.sensor.debug_mode() {
            writeln!(out, "Received: {}", line.as_str())?;
        }
        let Some(command) = line.command() else {
            return Ok(Outcome::Ignored);
        };
        let (arg1, arg2) = (line.arg1(), line.arg2());
        let outcome = match command {
            "?" => {
                out.write_str(HELP)?;
                Outcome::Done
            }
            "i" => self.device_info(out)?,
            "debug" => self.debug(arg1),
            "adr" => self.address(arg1, arg2, out)?,
            "int" => self.interrupt(arg1, out)?,
            "led" => self.led(arg1, out)?,
            "on" => {
                self.sensor.set_active(true)?;
                writeln!(out, "active")?;
                Outcome::Done
            }
            "off" => {
                self.sensor.set_active(false)?;
                writeln!(out, "hibernate")?;
                Outcome::Done
            }
            "nra" => self.new_reading(arg1, out)?,
            "k" => self.probe(arg1, out)?,
            "cal" => self.calibration(arg1, arg2, out)?,
            "t" => self.temperature(arg1, out)?,
            "r" => self.reading(arg1, out)?,
            _ => Outcome::Ignored,
        };
        if let Outcome::VerificationFailed {
            register,
            expected,
            actual,
        } = outcome
        {
            warn!("{} reads {}, expected {}", register, actual, expected);
        }
        Ok(outcome)
    }

    fn device_info<W: Write>(&mut self, out: &mut W) -> Result<Outcome, ConsoleError<I>> {
        let info = self.sensor.device_info()?;
        writeln!(out, "Device: {}", info.device_type)?;
        writeln!(out, "Version: {}", info.firmware_version)?;
        Ok(Outcome::Done)
    }

    fn debug(&mut self, arg: Option<&str>) -> Outcome {
        match arg {
            Some("0") => self.sensor.set_debug_mode(false),
            Some("1") => self.sensor.set_debug_mode(true),
            Some("ec0") => self.sensor.set_ec_debug_mode(false),
            Some("ec1") => self.sensor.set_ec_debug_mode(true),
            _ => return Outcome::Ignored,
        }
        Outcome::Done
    }

    fn address<W: Write>(
        &mut self,
        arg1: Option<&str>,
        arg2: Option<&str>,
        out: &mut W,
    ) -> Result<Outcome, ConsoleError<I>> {
        match (arg1, arg2) {
            (Some("?"), _) => {
                let address = self.sensor.read_address_register()?;
                writeln!(out, "SMBus/I2C bus_address:{}", address)?;
                Ok(Outcome::Done)
            }
            (Some("unlock"), _) => {
                self.sensor.unlock_address()?;
                let actual = self.sensor.address_lock_register()?;
                Ok(confirm(out, actual == 0, Register::AddressLock, 0, actual, "unlocked")?)
            }
            (Some("lock"), _) => {
                self.sensor.lock_address()?;
                let actual = self.sensor.address_lock_register()?;
                Ok(confirm(out, actual != 0, Register::AddressLock, 1, actual, "locked")?)
            }
            (Some("new"), Some(value)) => {
                let Some(address) = parse_int(value).and_then(|a| u8::try_from(a).ok()) else {
                    return out_of_range(out);
                };
                match self.sensor.change_address(address) {
                    Ok(()) => {
                        writeln!(out, "address changed to:{}", self.sensor.address())?;
                        Ok(Outcome::Done)
                    }
                    Err(EcError::AddressOutOfRange(_)) => out_of_range(out),
                    Err(EcError::AddressLocked) => {
                        writeln!(out, "unlock register first")?;
                        Ok(Outcome::Rejected)
                    }
                    Err(e) => Err(e.into()),
                }
            }
            _ => Ok(Outcome::Ignored),
        }
    }

    fn interrupt<W: Write>(
        &mut self,
        arg: Option<&str>,
        out: &mut W,
    ) -> Result<Outcome, ConsoleError<I>> {
        let (mode, message) = match arg {
            Some("?") => {
                let raw = self.sensor.interrupt_control()?;
                writeln!(out, "Interrupt control register:{}", raw)?;
                return Ok(Outcome::Done);
            }
            Some("high") => (InterruptMode::High, "*ok, pin high on new reading"),
            Some("low") => (InterruptMode::Low, "*ok, pin low on new reading"),
            Some("inv") => (InterruptMode::Invert, "*ok, pin invert on new reading"),
            Some("off") => (InterruptMode::Off, "*ok, interrupt off"),
            _ => return Ok(Outcome::Ignored),
        };
        self.sensor.set_interrupt_mode(mode)?;
        let actual = self.sensor.interrupt_control()?;
        let expected: u8 = mode.into();
        Ok(confirm(
            out,
            actual == expected,
            Register::InterruptControl,
            expected,
            actual,
            message,
        )?)
    }

    fn led<W: Write>(&mut self, arg: Option<&str>, out: &mut W) -> Result<Outcome, ConsoleError<I>> {
        let (on, message) = match arg {
            Some("?") => {
                let on = self.sensor.led()?;
                writeln!(out, "LED= {}", if on { "on" } else { "off" })?;
                return Ok(Outcome::Done);
            }
            Some("on") => (true, "*LED ON"),
            Some("off") => (false, "*LED off"),
            _ => return Ok(Outcome::Ignored),
        };
        self.sensor.set_led(on)?;
        let actual = self.sensor.led()?;
        Ok(confirm(
            out,
            actual == on,
            Register::LedControl,
            on.into(),
            actual.into(),
            message,
        )?)
    }

    fn new_reading<W: Write>(
        &mut self,
        arg: Option<&str>,
        out: &mut W,
    ) -> Result<Outcome, ConsoleError<I>> {
        match arg {
            Some("?") => {
                let available = self.sensor.new_reading_available()?;
                writeln!(
                    out,
                    "new reading available: {}",
                    if available { "yes" } else { "no" }
                )?;
                Ok(Outcome::Done)
            }
            Some("clr") => {
                self.sensor.clear_new_reading()?;
                Ok(Outcome::Done)
            }
            _ => Ok(Outcome::Ignored),
        }
    }

    fn probe<W: Write>(
        &mut self,
        arg: Option<&str>,
        out: &mut W,
    ) -> Result<Outcome, ConsoleError<I>> {
        match arg {
            Some("?") => {
                let k = self.sensor.probe_k()?;
                writeln!(out, "K= {:.2}", k)?;
                Ok(Outcome::Done)
            }
            Some(value) => match parse_unsigned_float(value) {
                Some(k) => match self.sensor.set_probe_k(k) {
                    Ok(()) => {
                        writeln!(out, "done")?;
                        Ok(Outcome::Done)
                    }
                    Err(EcError::ValueOutOfRange(_)) => out_of_range(out),
                    Err(e) => Err(e.into()),
                },
                None => Ok(Outcome::Ignored),
            },
            None => Ok(Outcome::Ignored),
        }
    }

    fn calibration<W: Write>(
        &mut self,
        arg1: Option<&str>,
        arg2: Option<&str>,
        out: &mut W,
    ) -> Result<Outcome, ConsoleError<I>> {
        let point = match (arg1, arg2.and_then(parse_unsigned_float)) {
            (Some("?"), _) => {
                let status = self.sensor.calibration_status()?;
                writeln!(out, "calibration status:")?;
                if status.is_empty() {
                    writeln!(out, "no calibration")?;
                }
                let points = [
                    (status.dry(), CalibrationPoint::Dry),
                    (status.single(), CalibrationPoint::Single(0.0)),
                    (status.low(), CalibrationPoint::Low(0.0)),
                    (status.high(), CalibrationPoint::High(0.0)),
                ];
                for (_, point) in points.iter().filter(|(done, _)| *done) {
                    writeln!(out, "{}", calibration_message(point))?;
                }
                return Ok(Outcome::Done);
            }
            (Some("clr"), _) => CalibrationPoint::Clear,
            (Some("dry"), _) => CalibrationPoint::Dry,
            (Some("low"), Some(value)) => CalibrationPoint::Low(value),
            (Some("high"), Some(value)) => CalibrationPoint::High(value),
            (Some("low" | "high"), None) => return Ok(Outcome::Ignored),
            (Some(value), _) => match parse_unsigned_float(value) {
                Some(value) => CalibrationPoint::Single(value),
                None => return Ok(Outcome::Ignored),
            },
            (None, _) => return Ok(Outcome::Ignored),
        };
        match self.sensor.calibrate(point) {
            Ok(()) => {}
            Err(EcError::ValueOutOfRange(_)) => return out_of_range(out),
            Err(e) => return Err(e.into()),
        }
        let status = self.sensor.calibration_status()?;
        Ok(confirm(
            out,
            status.confirms(&point),
            Register::CalibrationConfirm,
            status.expected_for(&point),
            status.bits(),
            calibration_message(&point),
        )?)
    }

    fn temperature<W: Write>(
        &mut self,
        arg: Option<&str>,
        out: &mut W,
    ) -> Result<Outcome, ConsoleError<I>> {
        match arg {
            Some("?") => {
                if !self.sensor.is_active()? {
                    writeln!(
                        out,
                        "device must be taking readings for compensation registers to update"
                    )?;
                }
                let celsius = self.sensor.temperature_compensation()?;
                writeln!(out, "T= {:.2}", celsius)?;
                Ok(Outcome::Done)
            }
            Some(value) => match parse_float(value) {
                Some(celsius) => match self.sensor.set_temperature_compensation(celsius) {
                    Ok(()) => {
                        writeln!(out, "done")?;
                        Ok(Outcome::Done)
                    }
                    Err(EcError::ValueOutOfRange(_)) => out_of_range(out),
                    Err(e) => Err(e.into()),
                },
                None => Ok(Outcome::Ignored),
            },
            None => Ok(Outcome::Ignored),
        }
    }

    fn reading<W: Write>(
        &mut self,
        arg: Option<&str>,
        out: &mut W,
    ) -> Result<Outcome, ConsoleError<I>> {
        if let Some("0" | "1") = arg {
            writeln!(out, "continuous mode not supported")?;
            return Ok(Outcome::Unsupported);
        }
        let raw = self.sensor.read_conductivity_raw()?;
        writeln!(out, "EC= {:.2}", self.sensor.last_reading())?;
        if self.sensor.ec_debug_mode() {
            writeln!(out, "EC register= {}", raw)?;
        }
        Ok(Outcome::Done)
    }
}

/// Print `message` if the read-back matched.
fn confirm<W: Write>(
    out: &mut W,
    matched: bool,
    register: Register,
    expected: u8,
    actual: u8,
    message: &str,
) -> Result<Outcome, core::fmt::Error> {
    if matched {
        writeln!(out, "{}", message)?;
        Ok(Outcome::Done)
    } else {
        Ok(Outcome::VerificationFailed {
            register,
            expected,
            actual,
        })
    }
}

fn out_of_range<I: I2c, W: Write>(out: &mut W) -> Result<Outcome, ConsoleError<I>> {
    writeln!(out, "out of range")?;
    Ok(Outcome::Rejected)
}

fn calibration_message(point: &CalibrationPoint) -> &'static str {
    match point {
        CalibrationPoint::Clear => "calibration cleared",
        CalibrationPoint::Dry => "dry calibration done",
        CalibrationPoint::Single(_) => "single point calibration done",
        CalibrationPoint::Low(_) => "low-point calibration done",
        CalibrationPoint::High(_) => "high-point calibration done",
    }
}
