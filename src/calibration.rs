//! Calibration word decoding and the floating-point compensation formulas from the BME280
//! datasheet (section 8.1).
//!
//! Everything in here is pure: the driver feeds in the bytes it read from the device and gets
//! physical units back, so the math can be exercised without a bus.

#[cfg(feature="defmt")]
use defmt::Format;

/// Decode an unsigned 16-bit little-endian calibration word
pub const fn decode_u16_le(lsb: u8, msb: u8) -> u16 {
    u16::from_le_bytes([lsb, msb])
}

/// Decode a signed 16-bit little-endian calibration word
pub const fn decode_i16_le(lsb: u8, msb: u8) -> i16 {
    i16::from_le_bytes([lsb, msb])
}

/// Reinterpret a single register byte as two's complement
pub const fn decode_i8(byte: u8) -> i8 {
    byte as i8
}

/// Assemble dig_H4 from registers 0xE4 and 0xE5.
///
/// 0xE4 holds bits 11:4 and the low nibble of 0xE5 holds bits 3:0. The nibble is placed at the
/// top of the low byte so the 12-bit sign lands on bit 15, then shifted back down.
pub const fn decode_h4(e4: u8, e5: u8) -> i16 {
    decode_i16_le((e5 & 0x0F) << 4, e4) >> 4
}

/// Assemble dig_H5 from registers 0xE5 and 0xE6.
///
/// The high nibble of 0xE5 becomes the top nibble of the word, followed by all of 0xE6 and four
/// zero bits, then the word is shifted down to 12 bits.
pub const fn decode_h5(e5: u8, e6: u8) -> i16 {
    decode_i16_le(e6 << 4, (e5 & 0xF0) | (e6 >> 4)) >> 4
}

/// Assemble a 20-bit temperature or pressure ADC value from its msb, lsb and xlsb registers
pub const fn raw_sample_20bit(msb: u8, lsb: u8, xlsb: u8) -> u32 {
    (msb as u32) << 12 | (lsb as u32) << 4 | ((xlsb >> 4) & 0x0F) as u32
}

/// Assemble the 16-bit humidity ADC value from its msb and lsb registers
pub const fn raw_sample_16bit(msb: u8, lsb: u8) -> u16 {
    (msb as u16) << 8 | lsb as u16
}

/// Intermediate temperature (t_fine) shared by the humidity and pressure formulas.
///
/// Not a temperature in any unit; divide by 5120 to get °C.
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FineTemperature(pub f64);
impl FineTemperature {
    /// Temperature in degrees centigrade
    pub fn centigrade(&self) -> f64 {
        self.0 / 5120.0
    }
}

/// Temperature compensation words dig_T1..dig_T3
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TemperatureCalibration {
    /// dig_T1
    pub t1: u16,
    /// dig_T2
    pub t2: i16,
    /// dig_T3
    pub t3: i16,
}
impl TemperatureCalibration {
    /// Decode from the six bytes at 0x88..=0x8D
    pub const fn from_registers(regs: &[u8; 6]) -> Self {
        Self {
            t1: decode_u16_le(regs[0], regs[1]),
            t2: decode_i16_le(regs[2], regs[3]),
            t3: decode_i16_le(regs[4], regs[5]),
        }
    }

    /// Compensate a raw 20-bit temperature sample
    pub fn compensate(&self, raw: u32) -> FineTemperature {
        let raw = raw as f64;
        let t1 = self.t1 as f64;
        let t2 = self.t2 as f64;
        let t3 = self.t3 as f64;

        let var1 = (raw / 16384.0 - t1 / 1024.0) * t2;
        let delta = raw / 131072.0 - t1 / 8192.0;
        let var2 = delta * delta * t3;
        FineTemperature(var1 + var2)
    }
}

/// Humidity compensation words dig_H1..dig_H6
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct HumidityCalibration {
    /// dig_H1
    pub h1: u8,
    /// dig_H2
    pub h2: i16,
    /// dig_H3
    pub h3: u8,
    /// dig_H4, 12 bits
    pub h4: i16,
    /// dig_H5, 12 bits
    pub h5: i16,
    /// dig_H6
    pub h6: i8,
}
impl HumidityCalibration {
    /// Decode from the bytes at 0xA1 and 0xE1..=0xE7, in that order
    pub const fn from_registers(regs: &[u8; 8]) -> Self {
        let [a1, e1, e2, e3, e4, e5, e6, e7] = *regs;
        Self {
            h1: a1,
            h2: decode_i16_le(e1, e2),
            h3: e3,
            h4: decode_h4(e4, e5),
            h5: decode_h5(e5, e6),
            h6: decode_i8(e7),
        }
    }

    /// Compensate a raw 16-bit humidity sample.
    ///
    /// Returns `None` when `t_fine` is exactly 76800, where the correction term vanishes and the
    /// formula is not evaluated. Otherwise the result is clamped to 0..=100 %RH.
    pub fn compensate(&self, raw: u16, t_fine: FineTemperature) -> Option<f64> {
        let var_h = t_fine.0 - 76800.0;
        if var_h == 0.0 {
            return None;
        }

        let raw = raw as f64;
        let h1 = self.h1 as f64;
        let h2 = self.h2 as f64;
        let h3 = self.h3 as f64;
        let h4 = self.h4 as f64;
        let h5 = self.h5 as f64;
        let h6 = self.h6 as f64;

        let offset = raw - (h4 * 64.0 + h5 / 16384.0 * var_h);
        let gain = h2 / 65536.0 * (1.0 + h6 / 67108864.0 * var_h * (1.0 + h3 / 67108864.0 * var_h));
        let var_h = offset * gain;
        let var_h = var_h * (1.0 - h1 * var_h / 524288.0);

        Some(var_h.clamp(0.0, 100.0))
    }
}

/// Pressure compensation words dig_P1..dig_P9
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PressureCalibration {
    /// dig_P1
    pub p1: u16,
    /// dig_P2..dig_P9
    pub p2_to_p9: [i16; 8],
}
impl PressureCalibration {
    /// Decode from the eighteen bytes at 0x8E..=0x9F
    pub const fn from_registers(regs: &[u8; 18]) -> Self {
        let mut p2_to_p9 = [0i16; 8];
        let mut ii = 0;
        while ii < 8 {
            p2_to_p9[ii] = decode_i16_le(regs[2 + 2 * ii], regs[3 + 2 * ii]);
            ii += 1;
        }
        Self {
            p1: decode_u16_le(regs[0], regs[1]),
            p2_to_p9,
        }
    }

    /// Compensate a raw 20-bit pressure sample into pascal.
    ///
    /// Returns `None` when the first-stage denominator comes out as exactly zero (for example
    /// when dig_P1 is zero).
    pub fn compensate(&self, raw: u32, t_fine: FineTemperature) -> Option<f64> {
        let p1 = self.p1 as f64;
        let [p2, p3, p4, p5, p6, p7, p8, p9] = self.p2_to_p9.map(|p| p as f64);

        let var1 = t_fine.0 / 2.0 - 64000.0;
        let var2 = var1 * var1 * p6 / 32768.0;
        let var2 = var2 + var1 * p5 * 2.0;
        let var2 = var2 / 4.0 + p4 * 65536.0;
        let var1 = (p3 * var1 * var1 / 524288.0 + p2 * var1) / 524288.0;
        let var1 = (1.0 + var1 / 32768.0) * p1;
        if var1 == 0.0 {
            return None;
        }

        let pressure = 1048576.0 - raw as f64;
        let pressure = (pressure - var2 / 4096.0) * 6250.0 / var1;
        let var1 = p9 * pressure * pressure / 2147483648.0;
        let var2 = pressure * p8 / 32768.0;
        Some(pressure + (var1 + var2 + p7) / 16.0)
    }
}
