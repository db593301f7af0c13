use crate::calibration::*;
use crate::hw_def::*;
use crate::types::*;

use embedded_hal::{delay::DelayNs, i2c::I2c};

impl<I2C, Delay, E> Bme280<I2C, Delay>
where
    I2C: I2c<Error = E>,
    Delay: DelayNs,
{
    /// Create a new BME280 driver instance
    pub fn new(i2c: I2C, delay: Delay, config: Config) -> Self {
        Self { i2c, delay, config }
    }

    /// Destroy the driver instance and return the bus and delay
    pub fn destroy(self) -> (I2C, Delay) {
        (self.i2c, self.delay)
    }

    /// Current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn read_register(&mut self, reg: u8) -> Result<u8, Error<E>> {
        let mut buf = [0u8; 1];
        self.i2c.write_read(self.config.i2c_addr.as_u8(), &[reg], &mut buf).map_err(Error::I2c)?;
        trace!("bme280::read_register(): reg={:#x} value={:#x}", reg, buf[0]);
        Ok(buf[0])
    }

    fn write_register(&mut self, reg: u8, value: u8) -> Result<(), Error<E>> {
        trace!("bme280::write_register(): reg={:#x} value={:#x}", reg, value);
        self.i2c.write(self.config.i2c_addr.as_u8(), &[reg, value]).map_err(Error::I2c)
    }

    fn read_registers<const N: usize>(&mut self, regs: &[u8; N]) -> Result<[u8; N], Error<E>> {
        let mut values = [0u8; N];
        for (value, reg) in values.iter_mut().zip(regs) {
            *value = self.read_register(*reg)?;
        }
        Ok(values)
    }

    /// Start a single forced conversion of temperature, pressure and humidity
    pub fn trigger_forced_conversion(&mut self) -> Result<(), Error<E>> {
        self.write_register(REG_CTRL_MEAS, CTRL_MEAS_FORCED)
    }

    /// Poll ctrl_meas until the busy bit clears.
    ///
    /// Blocks the calling thread. Bounded by [`Config::poll_limit`]; at least one read is always
    /// made.
    pub fn await_conversion_complete(&mut self) -> Result<(), Error<E>> {
        let mut polls: u32 = 0;
        loop {
            let ctrl_meas = self.read_register(REG_CTRL_MEAS)?;
            polls = polls.saturating_add(1);
            if ctrl_meas & CTRL_MEAS_BUSY_MASK == 0 {
                trace!("bme280::await_conversion_complete(): done after {} polls", polls);
                return Ok(());
            }
            if self.config.poll_exhausted(polls) {
                warn!("bme280::await_conversion_complete(): still busy after {} polls", polls);
                return Err(Error::ConversionTimeout);
            }
            if self.config.poll_interval_us > 0 {
                self.delay.delay_us(self.config.poll_interval_us);
            }
        }
    }

    /// Read temperature in degrees centigrade, plus the fine temperature needed by
    /// [`read_humidity`](Self::read_humidity) and [`read_pressure`](Self::read_pressure)
    pub fn read_temperature(&mut self) -> Result<(f64, FineTemperature), Error<E>> {
        let calib = TemperatureCalibration::from_registers(&self.read_registers(&REGS_CALIB_TEMP)?);
        let [msb, lsb, xlsb] = self.read_registers(&REGS_DATA_TEMP)?;
        let raw = raw_sample_20bit(msb, lsb, xlsb);

        let t_fine = calib.compensate(raw);
        let celsius = t_fine.centigrade();
        debug!("bme280::read_temperature(): raw={} t_fine={} celsius={}", raw, t_fine.0, celsius);
        Ok((celsius, t_fine))
    }

    /// Read relative humidity in percent, clamped to 0..=100
    pub fn read_humidity(&mut self, t_fine: FineTemperature) -> Result<f64, Error<E>> {
        let calib = HumidityCalibration::from_registers(&self.read_registers(&REGS_CALIB_HUMID)?);
        let [msb, lsb] = self.read_registers(&REGS_DATA_HUMID)?;
        let raw = raw_sample_16bit(msb, lsb);

        let humidity = calib.compensate(raw, t_fine);
        debug!("bme280::read_humidity(): raw={} humidity={:?}", raw, humidity);
        self.config.apply_guard(Quantity::Humidity, humidity)
    }

    /// Read barometric pressure in pascal
    pub fn read_pressure(&mut self, t_fine: FineTemperature) -> Result<f64, Error<E>> {
        let calib = PressureCalibration::from_registers(&self.read_registers(&REGS_CALIB_PRESS)?);
        let [msb, lsb, xlsb] = self.read_registers(&REGS_DATA_PRESS)?;
        let raw = raw_sample_20bit(msb, lsb, xlsb);

        let pressure = calib.compensate(raw, t_fine);
        debug!("bme280::read_pressure(): raw={} pressure={:?}", raw, pressure);
        self.config.apply_guard(Quantity::Pressure, pressure)
    }

    /// Run one complete forced conversion and read all three quantities
    pub fn measure(&mut self) -> Result<Measurement, Error<E>> {
        self.trigger_forced_conversion()?;
        self.await_conversion_complete()?;
        let (temperature_celsius, t_fine) = self.read_temperature()?;
        let humidity_percent = self.read_humidity(t_fine)?;
        let pressure_pascal = self.read_pressure(t_fine)?;
        Ok(Measurement {
            temperature_celsius,
            humidity_percent,
            pressure_pascal,
        })
    }
}
