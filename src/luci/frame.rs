//! # Transport Frame Builder
//!
//! Outer framing consumed by the bridge on the TCP side.
//!
//! Checksummed layout:
//! ```text
//! 00 02 | MODULE | LEN_LO LEN_HI | link frame | CK
//! ```
//! `LEN` counts every byte after the length field (link frame + checksum).
//! `CK` is the complement-of-sum over module, length and link frame.
//!
//! LUCI layout:
//! ```text
//! 00 00 02 | MODULE (u16 LE) | 00 00 00 | LEN (u16 LE) | MODE | P0LEN (u16 LE) | P1LEN (u16 LE) | link frame
//! ```
//! `LEN` is the link frame length + 5 (mode + both packet lengths).

use bytes::BufMut;

use crate::dynamixel::checksum::checksum;
use crate::error::EncodeError;

/// Magic bytes opening a checksummed transport frame
pub const TRANSPORT_MAGIC: [u8; 2] = [0x00, 0x02];

/// Header opening a LUCI frame
pub const LUCI_HEADER: [u8; 3] = [0x00, 0x00, 0x02];

/// Reserved bytes after the module number in a LUCI frame
pub const LUCI_PADDING: [u8; 3] = [0x00, 0x00, 0x00];

/// LUCI write mode
pub const LUCI_MODE_WRITE: u8 = 0;

/// Registration packet announcing the client to the bridge
pub const LUCI_REGISTER_PACKET: [u8; 10] = [0, 0, 2, 3, 0, 0, 0, 0, 0, 0];

/// Lowest addressable module number (0 is used by registration)
pub const MODULE_NUMBER_MIN: u16 = 1;

/// Highest addressable module number
pub const MODULE_NUMBER_MAX: u16 = 254;

/// Robot controller module
pub const DEFAULT_MODULE_NUMBER: u16 = 254;

/// Largest link frame a checksummed frame can carry (length counts the checksum)
pub const MAX_LINK_FRAME_LEN: usize = u16::MAX as usize - 1;

/// Largest link frame a LUCI frame can carry (length counts mode + packet lengths)
pub const MAX_LUCI_LINK_FRAME_LEN: usize = u16::MAX as usize - 5;

/// Reject module numbers the bridge cannot address
pub fn check_module_number(module_number: u16) -> Result<(), EncodeError> {
    if (MODULE_NUMBER_MIN..=MODULE_NUMBER_MAX).contains(&module_number) {
        Ok(())
    } else {
        Err(EncodeError::ModuleOutOfRange(module_number))
    }
}

fn check_link_len(link_frame: &[u8], max: usize) -> Result<(), EncodeError> {
    if link_frame.len() > max {
        return Err(EncodeError::FrameTooLarge {
            len: link_frame.len(),
            max,
        });
    }
    Ok(())
}

/// Build a checksummed transport frame around a link frame
///
/// # Arguments
///
/// * `link_frame` - Output of the link wrapper
/// * `module_number` - Bridge module to address (1..=254)
///
/// # Errors
///
/// * `ModuleOutOfRange` - Module number not addressable
/// * `FrameTooLarge` - Link frame longer than [`MAX_LINK_FRAME_LEN`]
///
/// # Examples
///
/// ```
/// use dxl_bridge::luci::frame::frame;
///
/// let bytes = frame(&[0x06], 254).unwrap();
/// assert_eq!(&bytes[..5], &[0x00, 0x02, 0xFE, 0x02, 0x00]);
/// ```
pub fn frame(link_frame: &[u8], module_number: u16) -> Result<Vec<u8>, EncodeError> {
    check_module_number(module_number)?;
    check_link_len(link_frame, MAX_LINK_FRAME_LEN)?;

    let mut bytes = Vec::with_capacity(TRANSPORT_MAGIC.len() + 3 + link_frame.len() + 1);
    bytes.put_slice(&TRANSPORT_MAGIC);
    bytes.put_u8(module_number as u8);
    bytes.put_u16_le((link_frame.len() + 1) as u16);
    bytes.put_slice(link_frame);

    let ck = checksum(&bytes[TRANSPORT_MAGIC.len()..]);
    bytes.put_u8(ck);

    Ok(bytes)
}

/// Build a LUCI write frame around a link frame
///
/// The LUCI layout carries no outer checksum.
pub fn frame_luci(link_frame: &[u8], module_number: u16) -> Result<Vec<u8>, EncodeError> {
    check_module_number(module_number)?;
    check_link_len(link_frame, MAX_LUCI_LINK_FRAME_LEN)?;

    let mut bytes = Vec::with_capacity(LUCI_HEADER.len() + 13 + link_frame.len());
    bytes.put_slice(&LUCI_HEADER);
    bytes.put_u16_le(module_number);
    bytes.put_slice(&LUCI_PADDING);
    bytes.put_u16_le((link_frame.len() + 5) as u16);
    bytes.put_u8(LUCI_MODE_WRITE);
    bytes.put_u16_le(link_frame.len() as u16);
    bytes.put_u16_le(0);
    bytes.put_slice(link_frame);

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamixel::checksum::verify;

    #[test]
    fn test_frame_structure() {
        let link = [0x06, 0x03, 0x00, 0xAA, 0xBB, 0xCC];
        let bytes = frame(&link, 254).unwrap();

        assert_eq!(&bytes[..2], &TRANSPORT_MAGIC);
        assert_eq!(bytes[2], 254);
        assert_eq!(u16::from_le_bytes([bytes[3], bytes[4]]) as usize, link.len() + 1);
        assert_eq!(&bytes[5..5 + link.len()], &link);
        assert_eq!(bytes.len(), 2 + 1 + 2 + link.len() + 1);
    }

    #[test]
    fn test_frame_checksum_property() {
        let link = [0x06, 0x17, 0x00, 0xFF, 0xFF, 0xFE, 0x13, 0x83];
        let bytes = frame(&link, 12).unwrap();
        let (body, ck) = bytes[2..].split_at(bytes.len() - 3);
        assert!(verify(body, ck[0]));
    }

    #[test]
    fn test_module_bounds() {
        assert!(frame(&[0x00], MODULE_NUMBER_MIN).is_ok());
        assert!(frame(&[0x00], MODULE_NUMBER_MAX).is_ok());
        assert_eq!(frame(&[0x00], 0), Err(EncodeError::ModuleOutOfRange(0)));
        assert_eq!(frame(&[0x00], 255), Err(EncodeError::ModuleOutOfRange(255)));
        assert_eq!(frame_luci(&[0x00], 1000), Err(EncodeError::ModuleOutOfRange(1000)));
    }

    #[test]
    fn test_frame_luci_structure() {
        let link = [0x00, 0x06, 0xFF, 0xFF];
        let bytes = frame_luci(&link, 254).unwrap();

        assert_eq!(
            &bytes[..16],
            &[
                0x00, 0x00, 0x02, // header
                0xFE, 0x00, // module
                0x00, 0x00, 0x00, // padding
                0x09, 0x00, // length = 4 + 5
                0x00, // mode
                0x04, 0x00, // packet0 length
                0x00, 0x00, // packet1 length
                0x00, // first link byte
            ]
        );
        assert_eq!(&bytes[15..], &link);
        assert_eq!(bytes.len(), 15 + link.len());
    }

    #[test]
    fn test_oversize_link_frame_rejected() {
        let link = vec![0u8; MAX_LINK_FRAME_LEN + 1];
        assert_eq!(
            frame(&link, 254),
            Err(EncodeError::FrameTooLarge { len: 65535, max: 65534 })
        );

        let bytes = frame(&link[..MAX_LINK_FRAME_LEN], 254).unwrap();
        assert_eq!(u16::from_le_bytes([bytes[3], bytes[4]]), u16::MAX);
    }

    #[test]
    fn test_oversize_luci_link_frame_rejected() {
        let link = vec![0u8; MAX_LUCI_LINK_FRAME_LEN + 1];
        assert_eq!(
            frame_luci(&link, 254),
            Err(EncodeError::FrameTooLarge { len: 65531, max: 65530 })
        );

        let bytes = frame_luci(&link[..MAX_LUCI_LINK_FRAME_LEN], 254).unwrap();
        assert_eq!(u16::from_le_bytes([bytes[8], bytes[9]]), u16::MAX);
    }

    #[test]
    fn test_register_packet() {
        assert_eq!(LUCI_REGISTER_PACKET.len(), 10);
        assert_eq!(&LUCI_REGISTER_PACKET[..3], &LUCI_HEADER);
    }
}
