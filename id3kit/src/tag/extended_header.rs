//! The optional extended header, following the tag header
//!
//! ID3v2.2 has no extended header. The ID3v2.3 and ID3v2.4 layouts are entirely different:
//!
//! * ID3v2.3: `[size: 4][flags: 2][padding size: 4]([CRC: 4])`, the size excludes itself
//! * ID3v2.4: `[size: 4 synchsafe][flag byte count: 1][flags: 1]`, each set flag followed by its
//!   data length and data. The size includes itself.

use crate::crc::{SYNCHSAFE_CRC_LEN, decode_id3v24, encode_id3v24};
use crate::error::Result;
use crate::macros::id3v2_err;
use crate::restrictions::TagRestrictions;
use crate::util::synchsafe::{SynchsafeInteger, decode_synchsafe};
use crate::version::Id3v2Version;

use std::io::Write;

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};

const V3_CRC_FLAG: u16 = 0x8000;

const V4_UPDATE_FLAG: u8 = 0x40;
const V4_CRC_FLAG: u8 = 0x20;
const V4_RESTRICTIONS_FLAG: u8 = 0x10;

/// An ID3v2.3/ID3v2.4 extended header
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtendedHeader {
	/// The size of the padding following the frames (ID3v2.3 only)
	///
	/// This is recalculated when the tag is written.
	pub padding_size: u32,
	/// The tag is an update of an earlier tag (ID3v2.4 only)
	pub is_update: bool,
	/// Whether a CRC-32 of the tag is stored
	///
	/// When writing, the CRC is calculated and [`ExtendedHeader::crc`] is ignored.
	pub crc_present: bool,
	/// The stored CRC-32, if any
	pub crc: Option<u32>,
	/// Restrictions on the tag (ID3v2.4 only)
	pub restrictions: Option<TagRestrictions>,
}

impl ExtendedHeader {
	/// Parse an extended header from the start of `data`
	///
	/// Returns the header and the number of bytes it occupied.
	///
	/// # Errors
	///
	/// * `version` is [`Id3v2Version::V2`]
	/// * The declared size doesn't match the fields present
	///
	/// # Examples
	///
	/// ```rust
	/// use id3kit::Id3v2Version;
	/// use id3kit::tag::ExtendedHeader;
	///
	/// # fn main() -> id3kit::error::Result<()> {
	/// // ID3v2.4, update flag set
	/// let data = b"\x00\x00\x00\x07\x01\x40\x00";
	/// let (header, len) = ExtendedHeader::parse(data, Id3v2Version::V4)?;
	/// assert!(header.is_update);
	/// assert_eq!(len, 7);
	/// # Ok(()) }
	/// ```
	pub fn parse(data: &[u8], version: Id3v2Version) -> Result<(Self, usize)> {
		match version {
			Id3v2Version::V2 => id3v2_err!(UnsupportedVersion("extended header", version)),
			Id3v2Version::V3 => Self::parse_v3(data),
			Id3v2Version::V4 => Self::parse_v4(data),
		}
	}

	fn parse_v3(data: &[u8]) -> Result<(Self, usize)> {
		let mut reader = FieldReader::new(data);

		let size = BigEndian::read_u32(reader.take(4)?);
		let flags = BigEndian::read_u16(reader.take(2)?);
		let padding_size = BigEndian::read_u32(reader.take(4)?);

		let crc_present = flags & V3_CRC_FLAG == V3_CRC_FLAG;
		let crc = if crc_present {
			Some(BigEndian::read_u32(reader.take(4)?))
		} else {
			None
		};

		// The size excludes itself
		reader.finish(size as usize + 4)?;

		let header = ExtendedHeader {
			padding_size,
			crc_present,
			crc,
			..ExtendedHeader::default()
		};

		Ok((header, reader.consumed))
	}

	fn parse_v4(data: &[u8]) -> Result<(Self, usize)> {
		let mut reader = FieldReader::new(data);

		let size = decode_synchsafe(reader.take(4)?) as usize;
		if size < 6 {
			id3v2_err!(BadExtendedHeaderSize);
		}

		// ID3v2.4 only defines a single flag byte, any others are skipped
		let flag_bytes = usize::from(reader.take(1)?[0]);
		let flags = match reader.take(flag_bytes)? {
			[flags, rest @ ..] => {
				if !rest.is_empty() {
					log::warn!("Extended header has {flag_bytes} flag bytes, ignoring all but the first");
				}

				*flags
			},
			[] => 0,
		};

		let mut header = ExtendedHeader::default();

		if flags & V4_UPDATE_FLAG == V4_UPDATE_FLAG {
			reader.flag_data(0)?;
			header.is_update = true;
		}

		if flags & V4_CRC_FLAG == V4_CRC_FLAG {
			let crc = reader.flag_data(SYNCHSAFE_CRC_LEN)?;

			let mut encoded = [0; SYNCHSAFE_CRC_LEN];
			encoded.copy_from_slice(crc);

			header.crc_present = true;
			header.crc = Some(decode_id3v24(encoded));
		}

		if flags & V4_RESTRICTIONS_FLAG == V4_RESTRICTIONS_FLAG {
			let restrictions = reader.flag_data(1)?;
			header.restrictions = Some(TagRestrictions::from_byte(restrictions[0]));
		}

		reader.finish(size)?;
		Ok((header, reader.consumed))
	}

	/// Encode the extended header for a tag of `version`
	///
	/// # Errors
	///
	/// `version` is [`Id3v2Version::V2`]
	pub fn as_bytes(&self, version: Id3v2Version) -> Result<Vec<u8>> {
		let crc = self.crc.unwrap_or_default();

		let mut bytes = Vec::new();
		match version {
			Id3v2Version::V2 => id3v2_err!(UnsupportedVersion("extended header", version)),
			Id3v2Version::V3 => {
				let (size, flags) = if self.crc_present { (10, V3_CRC_FLAG) } else { (6, 0) };

				bytes.write_u32::<BigEndian>(size)?;
				bytes.write_u16::<BigEndian>(flags)?;
				bytes.write_u32::<BigEndian>(self.padding_size)?;

				if self.crc_present {
					bytes.write_u32::<BigEndian>(crc)?;
				}
			},
			Id3v2Version::V4 => {
				// Start with a zeroed size, written once the flags are known
				bytes.write_all(&[0, 0, 0, 0, 1, 0])?;

				let mut flags = 0;
				if self.is_update {
					flags |= V4_UPDATE_FLAG;
					bytes.write_u8(0)?;
				}

				if self.crc_present {
					flags |= V4_CRC_FLAG;
					bytes.write_u8(SYNCHSAFE_CRC_LEN as u8)?;
					bytes.write_all(&encode_id3v24(crc)?)?;
				}

				if let Some(restrictions) = self.restrictions {
					flags |= V4_RESTRICTIONS_FLAG;
					bytes.write_u8(1)?;
					bytes.write_u8(restrictions.as_byte())?;
				}

				let size = (bytes.len() as u32).synch()?;
				bytes[..4].copy_from_slice(&size.to_be_bytes());
				bytes[5] = flags;
			},
		}

		Ok(bytes)
	}
}

// Bounds checked reads of the header fields
struct FieldReader<'a> {
	data: &'a [u8],
	consumed: usize,
}

impl<'a> FieldReader<'a> {
	fn new(data: &'a [u8]) -> Self {
		Self { data, consumed: 0 }
	}

	fn take(&mut self, len: usize) -> Result<&'a [u8]> {
		let Some(field) = self.data.get(self.consumed..self.consumed + len) else {
			id3v2_err!(BadExtendedHeaderSize);
		};

		self.consumed += len;
		Ok(field)
	}

	// An ID3v2.4 flag's data, preceded by its length
	fn flag_data(&mut self, expected_len: usize) -> Result<&'a [u8]> {
		if usize::from(self.take(1)?[0]) != expected_len {
			id3v2_err!(BadExtendedHeaderSize);
		}

		self.take(expected_len)
	}

	fn finish(&self, declared_size: usize) -> Result<()> {
		if self.consumed != declared_size {
			log::debug!(
				"Extended header declares {declared_size} bytes, but {} were read",
				self.consumed
			);
			id3v2_err!(BadExtendedHeaderSize);
		}

		Ok(())
	}
}
