//! CRC-32 for the extended header
//!
//! The CRC is the ISO-3309 CRC-32 (reflected polynomial `0xEDB88320`).
//!
//! * ID3v2.3: Calculated over the frames only, stored as a plain big-endian `u32`
//! * ID3v2.4: Calculated over the frames and padding, stored as a 5 byte synchsafe integer

use crate::error::Result;
use crate::util::synchsafe::{decode_synchsafe, encode_synchsafe};

/// Length of an ID3v2.4 synchsafe CRC
pub(crate) const SYNCHSAFE_CRC_LEN: usize = 5;

/// Calculate the CRC-32 of `content`
///
/// # Examples
///
/// ```rust
/// use id3kit::crc::crc32;
///
/// assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
/// ```
pub fn crc32(content: &[u8]) -> u32 {
	let mut hasher = crc32fast::Hasher::new();
	hasher.update(content);
	hasher.finalize()
}

pub(crate) fn encode_id3v24(crc: u32) -> Result<Vec<u8>> {
	encode_synchsafe(u64::from(crc), SYNCHSAFE_CRC_LEN)
}

pub(crate) fn decode_id3v24(bytes: [u8; SYNCHSAFE_CRC_LEN]) -> u32 {
	// 35 bits are stored, the top bits beyond 32 are invalid and discarded
	(decode_synchsafe(&bytes) & u64::from(u32::MAX)) as u32
}
