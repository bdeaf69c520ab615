//! # Complement-of-Sum Checksum
//!
//! The Dynamixel protocol 1.0 checksum, also used by the bridge framing:
//! `checksum = !(sum of bytes) & 0xFF`.
//!
//! A frame is intact when `(sum + checksum) & 0xFF == 0xFF`.

/// Calculate the complement-of-sum checksum
///
/// # Arguments
///
/// * `data` - Bytes covered by the checksum
///
/// # Examples
///
/// ```
/// use dxl_bridge::dynamixel::checksum::checksum;
///
/// // Ping to id 1: FF FF 01 02 01 FB
/// assert_eq!(checksum(&[0x01, 0x02, 0x01]), 0xFB);
/// ```
pub fn checksum(data: &[u8]) -> u8 {
    !data.iter().fold(0u8, |sum, &byte| sum.wrapping_add(byte))
}

/// Check that `expected` is the checksum of `data`
pub fn verify(data: &[u8], expected: u8) -> bool {
    data.iter()
        .fold(expected, |sum, &byte| sum.wrapping_add(byte))
        == 0xFF
}
