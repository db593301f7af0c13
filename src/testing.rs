//! Bus expectations shared by the blocking and async driver tests.
//!
//! Register contents follow the compensation example in the BME280 datasheet (section 8.1)
//! where one exists, and a typical production part for humidity.

use embedded_hal_mock::eh1::i2c::Transaction;

pub const ADDR: u8 = 0x76;

pub const T_CALIB: [u8; 6] = [0x70, 0x6B, 0x43, 0x67, 0x18, 0xFC];
pub const T_DATA: [u8; 3] = [0x7E, 0xED, 0x00];
pub const H_CALIB: [u8; 8] = [0x4B, 0x6A, 0x01, 0x00, 0x13, 0x29, 0x03, 0x1E];
pub const H_DATA: [u8; 2] = [0x75, 0x30];
pub const P_CALIB: [u8; 18] = [
    0x7D, 0x8E, 0x43, 0xD6, 0xD0, 0x0B, 0x27, 0x0B, 0x8C,
    0x00, 0xF9, 0xFF, 0x8C, 0x3C, 0xF8, 0xC6, 0x70, 0x17,
];
pub const P_DATA: [u8; 3] = [0x65, 0x5A, 0xC0];

pub const EXPECTED_CELSIUS: f64 = 25.0825;
pub const EXPECTED_T_FINE: f64 = 128422.287;
pub const EXPECTED_HUMIDITY: f64 = 46.8427;
pub const EXPECTED_PASCAL: f64 = 100653.27;

pub fn read(addr: u8, reg: u8, value: u8) -> Transaction {
    Transaction::write_read(addr, vec![reg], vec![value])
}

fn reads(addr: u8, regs: impl IntoIterator<Item = u8>, values: &[u8]) -> Vec<Transaction> {
    regs.into_iter()
        .zip(values.iter().copied())
        .map(|(reg, value)| read(addr, reg, value))
        .collect()
}

pub fn trigger(addr: u8) -> Transaction {
    Transaction::write(addr, vec![0xF4, 0x26])
}

/// `busy_polls` reads with the busy bit set, then one with it clear
pub fn polls(addr: u8, busy_polls: usize) -> Vec<Transaction> {
    let mut expectations: Vec<_> = (0..busy_polls).map(|_| read(addr, 0xF4, 0x27)).collect();
    expectations.push(read(addr, 0xF4, 0x25));
    expectations
}

pub fn temperature(addr: u8) -> Vec<Transaction> {
    let mut expectations = reads(addr, 0x88..=0x8D, &T_CALIB);
    expectations.extend(reads(addr, 0xFA..=0xFC, &T_DATA));
    expectations
}

pub fn humidity_with(addr: u8, calib: &[u8; 8], data: &[u8; 2]) -> Vec<Transaction> {
    let regs = core::iter::once(0xA1).chain(0xE1..=0xE7);
    let mut expectations = reads(addr, regs, calib);
    expectations.extend(reads(addr, 0xFD..=0xFE, data));
    expectations
}

pub fn humidity(addr: u8) -> Vec<Transaction> {
    humidity_with(addr, &H_CALIB, &H_DATA)
}

pub fn pressure_with(addr: u8, calib: &[u8; 18], data: &[u8; 3]) -> Vec<Transaction> {
    let mut expectations = reads(addr, 0x8E..=0x9F, calib);
    expectations.extend(reads(addr, 0xF7..=0xF9, data));
    expectations
}

pub fn pressure(addr: u8) -> Vec<Transaction> {
    pressure_with(addr, &P_CALIB, &P_DATA)
}

/// One complete forced-mode cycle, device busy for `busy_polls` reads
pub fn measure_cycle(addr: u8, busy_polls: usize) -> Vec<Transaction> {
    let mut expectations = vec![trigger(addr)];
    expectations.extend(polls(addr, busy_polls));
    expectations.extend(temperature(addr));
    expectations.extend(humidity(addr));
    expectations.extend(pressure(addr));
    expectations
}
