//! This is a platform-agnostic Rust driver for single forced-mode measurements on the Bosch
//! BME280 combined humidity, pressure and temperature sensor, using the [`embedded-hal`] or
//! [`embedded-hal-async`] traits.
//!
//! [`embedded-hal`]: https://github.com/rust-embedded/embedded-hal/tree/master/embedded-hal
//! [`embedded-hal-async`]: https://github.com/rust-embedded/embedded-hal/tree/master/embedded-hal-async
//!
//! This driver allows you to:
//! - Trigger a forced conversion and wait for it to complete, with an optional bound on polling.
//! - Read the compensated temperature along with the fine temperature used by the other readers.
//! - Read the compensated relative humidity.
//! - Read the compensated barometric pressure.
//! - Run the whole cycle in one call with `measure()`.
//! - blocking API support.
//! - async API support.
//!
//! Calibration words are read from the device on every call, immediately before the raw sample
//! they compensate. Nothing is cached between measurements.
//!
//! This driver does not support the following device features:
//! - Normal (continuous) and sleep mode.
//! - Oversampling, IIR filter and standby configuration. Conversions use x1 oversampling.
//! - Chip ID check and soft reset.
//! - SPI.
//!
//! ## Features
//!
//! - `async`: Enables async API ([`AsyncBme280`]).
//! - `blocking`: Enables blocking API ([`Bme280`]).
//! - `defmt`: Enables logging using the `defmt` framework.
//! - `log`: Enables logging using the `log` framework.
//!
//! ## Compensation
//!
//! The double-precision formulas from the datasheet are used. The humidity formula is skipped
//! when the fine temperature is exactly 76800 and the pressure formula when its first-stage
//! denominator is exactly zero. What the driver reports in that case is selected by
//! [`GuardPolicy`]: an [`Error::DivisionGuardTriggered`] by default, or a plain `0.0`.
//!
//! The pure decoding and compensation functions are exported as well, see
//! [`TemperatureCalibration`], [`HumidityCalibration`] and [`PressureCalibration`].
//!
//! Datasheet:
//!   [BME280](https://www.bosch-sensortec.com/media/boschsensortec/downloads/datasheets/bst-bme280-ds002.pdf)
//!
//! ## Blocking Example:
//!
//! ```no_run
//! use bme280_forced::{Bme280, Config, Error, PollLimit};
//! use embedded_hal::{delay::DelayNs, i2c::I2c};
//!
//! fn report<I: I2c, D: DelayNs>(i2c: I, delay: D) -> Result<(), Error<I::Error>> {
//!     let config = Config::default().with_poll_limit(PollLimit::Attempts(100));
//!     let mut bme280 = Bme280::new(i2c, delay, config);
//!     let measurement = bme280.measure()?;
//!     println!("{measurement}");
//!     Ok(())
//! }
//! ```
//!
//! ## Async Example:
//!
//! ```no_run
//! use bme280_forced::{AsyncBme280, Config, Error};
//! use embedded_hal_async::{delay::DelayNs, i2c::I2c};
//!
//! async fn report<I: I2c, D: DelayNs>(i2c: I, delay: D) -> Result<(), Error<I::Error>> {
//!     let mut bme280 = AsyncBme280::new(i2c, delay, Config::default());
//!
//!     // step by step, same as measure()
//!     bme280.trigger_forced_conversion().await?;
//!     bme280.await_conversion_complete().await?;
//!     let (celsius, t_fine) = bme280.read_temperature().await?;
//!     let humidity = bme280.read_humidity(t_fine).await?;
//!     let pressure = bme280.read_pressure(t_fine).await?;
//!     println!("{celsius:0.2} °C, {humidity:0.1} %RH, {pressure:0.0} Pa");
//!     Ok(())
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![cfg_attr(not(test), no_std)]

#[cfg(not(any(feature = "async", feature = "blocking")))]
compile_error!("At least one of \"async\" and \"blocking\" features must be enabled");

#[cfg(all(feature = "defmt", feature = "log"))]
compile_error!("Features \"defmt\" and \"log\" are mutually exclusive and cannot be enabled together");

cfg_if::cfg_if! {
    if #[cfg(feature = "defmt")] {
        macro_rules! trace { ($($arg:tt)*) => { defmt::trace!($($arg)*) }; }
        macro_rules! debug { ($($arg:tt)*) => { defmt::debug!($($arg)*) }; }
        macro_rules! warn { ($($arg:tt)*) => { defmt::warn!($($arg)*) }; }
    } else if #[cfg(feature = "log")] {
        macro_rules! trace { ($($arg:tt)*) => { log::trace!($($arg)*) }; }
        macro_rules! debug { ($($arg:tt)*) => { log::debug!($($arg)*) }; }
        macro_rules! warn { ($($arg:tt)*) => { log::warn!($($arg)*) }; }
    } else {
        macro_rules! trace { ($($arg:tt)*) => {}; }
        macro_rules! debug { ($($arg:tt)*) => {}; }
        macro_rules! warn { ($($arg:tt)*) => {}; }
    }
}

mod calibration;
#[cfg(feature = "blocking")]
mod blocking_impl;
#[cfg(feature = "async")]
mod device_impl;
mod hw_def;
#[cfg(test)]
mod testing;
mod types;

pub use crate::{calibration::*, hw_def::I2cAddr, types::*};
