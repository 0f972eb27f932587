//! CRC-16/CCITT-FALSE, the checksum that seals every BR Code.
//!
//! Parameters: width 16, polynomial `0x1021`, initial value `0xFFFF`, no input or
//! output reflection, no final XOR. The checksum is rendered as four upper-case
//! hex digits and appended as the value of field `63`.

/// Generator polynomial.
pub const POLYNOMIAL: u16 = 0x1021;
/// Initial register value.
pub const INITIAL: u16 = 0xFFFF;

/// Computes the CRC-16/CCITT-FALSE of `data`.
///
/// Runs the bitwise long division one byte at a time. All arithmetic is on `u16`,
/// so bits shifted out of the register are discarded at every step.
pub fn crc16_ccitt(data: &[u8]) -> u16 {
    let mut crc = INITIAL;
    for &byte in data {
        crc ^= u16::from(byte) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ POLYNOMIAL
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// Computes the checksum of a payload prefix as four upper-case hex digits.
///
/// The string is processed as its UTF-8 bytes. Normalized BR Code content is ASCII,
/// where bytes and characters coincide.
///
/// ```
/// use pix_types::crc::checksum;
///
/// assert_eq!(checksum("123456789"), "29B1");
/// ```
pub fn checksum(data: &str) -> String {
    format!("{:04X}", crc16_ccitt(data.as_bytes()))
}
