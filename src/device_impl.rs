use crate::calibration::*;
use crate::hw_def::*;
use crate::types::*;

use embedded_hal_async::{delay::DelayNs, i2c::I2c};

// TODO: consider a type state around the forced conversion so the readers cannot be called
// before await_conversion_complete() has returned Ok.
impl<I2C, Delay, E> AsyncBme280<I2C, Delay>
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

    async fn read_register(&mut self, reg: u8) -> Result<u8, Error<E>> {
        let mut buf = [0u8; 1];
        self.i2c.write_read(self.config.i2c_addr.as_u8(), &[reg], &mut buf).await.map_err(Error::I2c)?;
        trace!("bme280::read_register(): reg={:#x} value={:#x}", reg, buf[0]);
        Ok(buf[0])
    }

    async fn write_register(&mut self, reg: u8, value: u8) -> Result<(), Error<E>> {
        trace!("bme280::write_register(): reg={:#x} value={:#x}", reg, value);
        self.i2c.write(self.config.i2c_addr.as_u8(), &[reg, value]).await.map_err(Error::I2c)
    }

    // One single-byte transfer per register, in the order given
    async fn read_registers<const N: usize>(&mut self, regs: &[u8; N]) -> Result<[u8; N], Error<E>> {
        let mut values = [0u8; N];
        for (value, reg) in values.iter_mut().zip(regs) {
            *value = self.read_register(*reg).await?;
        }
        Ok(values)
    }

    /// Start a single forced conversion of temperature, pressure and humidity
    pub async fn trigger_forced_conversion(&mut self) -> Result<(), Error<E>> {
        self.write_register(REG_CTRL_MEAS, CTRL_MEAS_FORCED).await
    }

    /// Poll ctrl_meas until the busy bit clears.
    ///
    /// Bounded by [`Config::poll_limit`]; at least one read is always made.
    pub async fn await_conversion_complete(&mut self) -> Result<(), Error<E>> {
        let mut polls: u32 = 0;
        loop {
            let ctrl_meas = self.read_register(REG_CTRL_MEAS).await?;
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
                self.delay.delay_us(self.config.poll_interval_us).await;
            }
        }
    }

    /// Read temperature in degrees centigrade, plus the fine temperature needed by
    /// [`read_humidity`](Self::read_humidity) and [`read_pressure`](Self::read_pressure)
    pub async fn read_temperature(&mut self) -> Result<(f64, FineTemperature), Error<E>> {
        let calib = TemperatureCalibration::from_registers(&self.read_registers(&REGS_CALIB_TEMP).await?);
        let [msb, lsb, xlsb] = self.read_registers(&REGS_DATA_TEMP).await?;
        let raw = raw_sample_20bit(msb, lsb, xlsb);

        let t_fine = calib.compensate(raw);
        let celsius = t_fine.centigrade();
        debug!("bme280::read_temperature(): raw={} t_fine={} celsius={}", raw, t_fine.0, celsius);
        Ok((celsius, t_fine))
    }

    /// Read relative humidity in percent, clamped to 0..=100
    pub async fn read_humidity(&mut self, t_fine: FineTemperature) -> Result<f64, Error<E>> {
        let calib = HumidityCalibration::from_registers(&self.read_registers(&REGS_CALIB_HUMID).await?);
        let [msb, lsb] = self.read_registers(&REGS_DATA_HUMID).await?;
        let raw = raw_sample_16bit(msb, lsb);

        let humidity = calib.compensate(raw, t_fine);
        debug!("bme280::read_humidity(): raw={} humidity={:?}", raw, humidity);
        self.config.apply_guard(Quantity::Humidity, humidity)
    }

    /// Read barometric pressure in pascal
    pub async fn read_pressure(&mut self, t_fine: FineTemperature) -> Result<f64, Error<E>> {
        let calib = PressureCalibration::from_registers(&self.read_registers(&REGS_CALIB_PRESS).await?);
        let [msb, lsb, xlsb] = self.read_registers(&REGS_DATA_PRESS).await?;
        let raw = raw_sample_20bit(msb, lsb, xlsb);

        let pressure = calib.compensate(raw, t_fine);
        debug!("bme280::read_pressure(): raw={} pressure={:?}", raw, pressure);
        self.config.apply_guard(Quantity::Pressure, pressure)
    }

    /// Run one complete forced conversion and read all three quantities
    pub async fn measure(&mut self) -> Result<Measurement, Error<E>> {
        self.trigger_forced_conversion().await?;
        self.await_conversion_complete().await?;
        let (temperature_celsius, t_fine) = self.read_temperature().await?;
        let humidity_percent = self.read_humidity(t_fine).await?;
        let pressure_pascal = self.read_pressure(t_fine).await?;
        Ok(Measurement {
            temperature_celsius,
            humidity_percent,
            pressure_pascal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, ADDR};

    use embedded_hal_async::i2c::ErrorKind;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction};
    use float_cmp::approx_eq;

    fn device(expectations: &[Transaction], config: Config) -> AsyncBme280<I2cMock, NoopDelay> {
        AsyncBme280::new(I2cMock::new(expectations), NoopDelay::new(), config)
    }

    fn done(bme280: AsyncBme280<I2cMock, NoopDelay>) {
        let (mut i2c, _) = bme280.destroy();
        i2c.done();
    }

    #[tokio::test]
    async fn trigger_writes_forced_mode() {
        let mut bme280 = device(&[testing::trigger(ADDR)], Config::default());
        bme280.trigger_forced_conversion().await.unwrap();
        done(bme280);
    }

    #[tokio::test]
    async fn polls_until_idle() {
        for busy_polls in [0, 1, 5] {
            let mut bme280 = device(&testing::polls(ADDR, busy_polls), Config::default());
            bme280.await_conversion_complete().await.unwrap();
            done(bme280);
        }
    }

    #[tokio::test]
    async fn poll_timeout() {
        let expectations: Vec<_> = (0..3).map(|_| testing::read(ADDR, 0xF4, 0x02)).collect();
        let config = Config::default().with_poll_limit(PollLimit::Attempts(3));
        let mut bme280 = device(&expectations, config);
        assert_eq!(bme280.await_conversion_complete().await, Err(Error::ConversionTimeout));
        done(bme280);
    }

    #[tokio::test]
    async fn temperature() {
        let mut bme280 = device(&testing::temperature(ADDR), Config::default());
        let (celsius, t_fine) = bme280.read_temperature().await.unwrap();
        assert!(approx_eq!(f64, celsius, testing::EXPECTED_CELSIUS, epsilon = 0.0001));
        assert!(approx_eq!(f64, t_fine.0, testing::EXPECTED_T_FINE, epsilon = 0.001));
        done(bme280);
    }

    #[tokio::test]
    async fn humidity_guard_as_error() {
        let mut bme280 = device(&testing::humidity(ADDR), Config::default());
        assert_eq!(
            bme280.read_humidity(FineTemperature(76800.0)).await,
            Err(Error::DivisionGuardTriggered(Quantity::Humidity))
        );
        done(bme280);
    }

    #[tokio::test]
    async fn pressure_guard_as_zero() {
        let mut calib = testing::P_CALIB;
        calib[0] = 0;
        calib[1] = 0;
        let config = Config::default().with_guard_policy(GuardPolicy::Zero);
        let mut bme280 = device(&testing::pressure_with(ADDR, &calib, &testing::P_DATA), config);
        assert_eq!(bme280.read_pressure(FineTemperature(testing::EXPECTED_T_FINE)).await, Ok(0.0));
        done(bme280);
    }

    #[tokio::test]
    async fn measure_cycle() {
        let mut bme280 = device(&testing::measure_cycle(ADDR, 2), Config::default());
        let m = bme280.measure().await.unwrap();
        assert!(approx_eq!(f64, m.temperature_celsius, testing::EXPECTED_CELSIUS, epsilon = 0.0001));
        assert!(approx_eq!(f64, m.humidity_percent, testing::EXPECTED_HUMIDITY, epsilon = 0.0001));
        assert!(approx_eq!(f64, m.pressure_pascal, testing::EXPECTED_PASCAL, epsilon = 0.01));
        done(bme280);
    }

    #[tokio::test]
    async fn bus_error_stops_cycle() {
        let expectations = [
            testing::trigger(ADDR),
            Transaction::write_read(ADDR, vec![0xF4], vec![0x00]).with_error(ErrorKind::Other),
        ];
        let mut bme280 = device(&expectations, Config::default());
        assert_eq!(bme280.measure().await, Err(Error::I2c(ErrorKind::Other)));
        done(bme280);
    }
}
