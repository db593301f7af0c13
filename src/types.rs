use crate::hw_def::*;

use core::fmt;

#[cfg(feature="defmt")]
use defmt::Format;

/// BME280 device driver, blocking API
#[cfg(feature = "blocking")]
#[derive(Debug)]
pub struct Bme280<I2C, Delay> {
    pub(crate) i2c: I2C,
    pub(crate) delay: Delay,
    pub(crate) config: Config,
}

/// BME280 device driver, async API
#[cfg(feature = "async")]
#[derive(Debug)]
pub struct AsyncBme280<I2C, Delay> {
    pub(crate) i2c: I2C,
    pub(crate) delay: Delay,
    pub(crate) config: Config,
}

/// All possible errors in this crate
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Debug, PartialEq)]
pub enum Error<E> {
    /// I²C communication error
    I2c(E),
    /// The busy bit in ctrl_meas was still set after the configured number of polls
    ConversionTimeout,
    /// A compensation formula hit its zero-denominator short-circuit
    DivisionGuardTriggered(Quantity),
}
impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::I2c(e) => write!(f, "I2C error: {e:?}"),
            Error::ConversionTimeout => write!(f, "forced conversion did not complete"),
            Error::DivisionGuardTriggered(q) => write!(f, "{q} compensation hit a zero denominator"),
        }
    }
}

/// Measured quantity, used to tag which compensation hit its division guard
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Quantity {
    /// relative humidity
    Humidity,
    /// barometric pressure
    Pressure,
}
impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Humidity => write!(f, "humidity"),
            Quantity::Pressure => write!(f, "pressure"),
        }
    }
}

/// How many times ctrl_meas is read while waiting for a forced conversion
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PollLimit {
    /// Keep polling until the device reports idle. A device that never does hangs the caller.
    Unbounded,
    /// Give up with [`Error::ConversionTimeout`] after this many reads
    Attempts(u32),
}
impl Default for PollLimit {
    fn default() -> Self {
        PollLimit::Attempts(1000)
    }
}

/// What the humidity and pressure readers do when their division guard fires
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum GuardPolicy {
    /// Return [`Error::DivisionGuardTriggered`]
    #[default]
    Error,
    /// Return a reading of exactly `0.0`, indistinguishable from a real zero
    Zero,
}

/// Driver configuration
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Config {
    /// bus address of the device
    pub i2c_addr: I2cAddr,
    /// bound on busy-bit polling
    pub poll_limit: PollLimit,
    /// delay between busy-bit polls in microseconds, 0 polls back to back
    pub poll_interval_us: u32,
    /// division guard handling
    pub guard_policy: GuardPolicy,
}
impl Config {
    /// Use a different bus address
    pub fn with_i2c_addr(mut self, i2c_addr: I2cAddr) -> Self {
        self.i2c_addr = i2c_addr;
        self
    }
    /// Use a different poll bound
    pub fn with_poll_limit(mut self, poll_limit: PollLimit) -> Self {
        self.poll_limit = poll_limit;
        self
    }
    /// Wait between busy-bit polls
    pub fn with_poll_interval_us(mut self, poll_interval_us: u32) -> Self {
        self.poll_interval_us = poll_interval_us;
        self
    }
    /// Use a different division guard policy
    pub fn with_guard_policy(mut self, guard_policy: GuardPolicy) -> Self {
        self.guard_policy = guard_policy;
        self
    }

    pub(crate) fn poll_exhausted(&self, polls: u32) -> bool {
        match self.poll_limit {
            PollLimit::Unbounded => false,
            PollLimit::Attempts(max) => polls >= max,
        }
    }

    pub(crate) fn apply_guard<E>(&self, quantity: Quantity, value: Option<f64>) -> Result<f64, Error<E>> {
        match (value, self.guard_policy) {
            (Some(value), _) => Ok(value),
            (None, GuardPolicy::Zero) => {
                warn!("bme280::{}: division guard hit, reporting 0", quantity);
                Ok(0.0)
            }
            (None, GuardPolicy::Error) => {
                warn!("bme280::{}: division guard hit", quantity);
                Err(Error::DivisionGuardTriggered(quantity))
            }
        }
    }
}

/// Compensated result of one forced conversion
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
    /// degrees centigrade
    pub temperature_celsius: f64,
    /// relative humidity in percent
    pub humidity_percent: f64,
    /// barometric pressure in pascal
    pub pressure_pascal: f64,
}
impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Temperature: {:.6} °C", self.temperature_celsius)?;
        writeln!(f, "Humidity:    {:.6} %", self.humidity_percent)?;
        write!(f, "Pressure:    {:.6} Pa", self.pressure_pascal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.i2c_addr.as_u8(), 0x76);
        assert_eq!(config.poll_limit, PollLimit::Attempts(1000));
        assert_eq!(config.poll_interval_us, 0);
        assert_eq!(config.guard_policy, GuardPolicy::Error);
    }

    #[test]
    fn secondary_addr() {
        let config = Config::default().with_i2c_addr(I2cAddr::Secondary);
        assert_eq!(config.i2c_addr.as_u8(), 0x77);
    }

    #[test]
    fn poll_exhaustion() {
        let bounded = Config::default().with_poll_limit(PollLimit::Attempts(3));
        assert!(!bounded.poll_exhausted(2));
        assert!(bounded.poll_exhausted(3));

        let unbounded = Config::default().with_poll_limit(PollLimit::Unbounded);
        assert!(!unbounded.poll_exhausted(u32::MAX));
    }

    #[test]
    fn guard_policies() {
        let strict = Config::default();
        assert_eq!(strict.apply_guard::<()>(Quantity::Pressure, Some(1.5)), Ok(1.5));
        assert_eq!(
            strict.apply_guard::<()>(Quantity::Pressure, None),
            Err(Error::DivisionGuardTriggered(Quantity::Pressure))
        );

        let legacy = Config::default().with_guard_policy(GuardPolicy::Zero);
        assert_eq!(legacy.apply_guard::<()>(Quantity::Humidity, None), Ok(0.0));
    }

    #[test]
    fn measurement_report() {
        let m = Measurement {
            temperature_celsius: 25.08,
            humidity_percent: 46.5,
            pressure_pascal: 100653.25,
        };
        assert_eq!(
            format!("{m}"),
            "Temperature: 25.080000 °C\nHumidity:    46.500000 %\nPressure:    100653.250000 Pa"
        );
    }

    #[test]
    fn error_display() {
        let e: Error<()> = Error::DivisionGuardTriggered(Quantity::Humidity);
        assert_eq!(format!("{e}"), "humidity compensation hit a zero denominator");
    }
}
