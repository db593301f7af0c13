#[cfg(feature="defmt")]
use defmt::Format;

/// I²C address of the device, selected by the level of the SDO pin
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum I2cAddr {
    /// SDO tied to GND
    #[default]
    Primary,
    /// SDO tied to VDDIO
    Secondary,
}
impl I2cAddr {
    /// Get the 7-bit bus address
    pub const fn as_u8(self) -> u8 {
        match self {
            I2cAddr::Primary => 0x76,
            I2cAddr::Secondary => 0x77,
        }
    }
}

pub(crate) const REG_CTRL_MEAS: u8 = 0xF4;

/// ctrl_meas value: osrs_t = x1, osrs_p = x1, mode = forced
pub(crate) const CTRL_MEAS_FORCED: u8 = 0x26;
/// Set in ctrl_meas while a forced conversion is in progress
pub(crate) const CTRL_MEAS_BUSY_MASK: u8 = 0x02;

pub(crate) const REGS_CALIB_TEMP: [u8; 6] = [0x88, 0x89, 0x8A, 0x8B, 0x8C, 0x8D];
pub(crate) const REGS_DATA_TEMP: [u8; 3] = [0xFA, 0xFB, 0xFC];

// dig_H1 lives alone at 0xA1, the rest of the humidity block at 0xE1..=0xE7
pub(crate) const REGS_CALIB_HUMID: [u8; 8] = [0xA1, 0xE1, 0xE2, 0xE3, 0xE4, 0xE5, 0xE6, 0xE7];
pub(crate) const REGS_DATA_HUMID: [u8; 2] = [0xFD, 0xFE];

pub(crate) const REGS_CALIB_PRESS: [u8; 18] = [
    0x8E, 0x8F, 0x90, 0x91, 0x92, 0x93, 0x94, 0x95, 0x96,
    0x97, 0x98, 0x99, 0x9A, 0x9B, 0x9C, 0x9D, 0x9E, 0x9F,
];
pub(crate) const REGS_DATA_PRESS: [u8; 3] = [0xF7, 0xF8, 0xF9];
