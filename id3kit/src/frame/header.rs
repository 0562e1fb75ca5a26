use super::FrameFlags;
use super::id::{FrameId, is_valid_id_byte};
use crate::error::Result;
use crate::macros::id3v2_err;
use crate::registry::resolve;
use crate::util::synchsafe::{SynchsafeInteger, decode_synchsafe};
use crate::version::{FrameLayout, Id3v2Version};

use std::io::Write;

use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};

/// Interpret a raw frame size field
///
/// * A synchsafe field with every high bit clear is decoded as a synchsafe integer
/// * A synchsafe field with any high bit set was likely written as a plain integer. Both the
///   big-endian and byte-reversed readings are considered, and the smaller one wins.
/// * Any other field is a plain big-endian integer
///
/// # Examples
///
/// ```rust
/// use id3kit::frame::interpret_size;
///
/// // Valid synchsafe
/// assert_eq!(interpret_size(&[0x00, 0x00, 0x02, 0x01], true), 257);
///
/// // A plain little-endian 200, written where a synchsafe integer was expected
/// assert_eq!(interpret_size(&[0xC8, 0x00, 0x00, 0x00], true), 200);
///
/// // ID3v2.2 and ID3v2.3 sizes are never synchsafe
/// assert_eq!(interpret_size(&[0x00, 0x00, 0x01, 0x00], false), 256);
/// ```
pub fn interpret_size(raw: &[u8], synchsafe: bool) -> u32 {
	if synchsafe && raw.iter().all(|b| b & 0x80 == 0) {
		return decode_synchsafe(raw) as u32;
	}

	let naive = BigEndian::read_uint(raw, raw.len()) as u32;
	if !synchsafe {
		return naive;
	}

	let reversed = LittleEndian::read_uint(raw, raw.len()) as u32;
	naive.min(reversed)
}

/// [`interpret_size`], limited to the `remaining` bytes available for the frame
pub fn recover_size(raw: &[u8], synchsafe: bool, remaining: u32) -> u32 {
	interpret_size(raw, synchsafe).min(remaining)
}

/// A frame header, as read from a tag
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FrameHeader {
	pub(crate) id: FrameId,
	pub(crate) raw_size: [u8; 4],
	pub(crate) flags: FrameFlags,
}

impl FrameHeader {
	pub(crate) fn raw_size<'a>(&'a self, layout: &FrameLayout) -> &'a [u8] {
		&self.raw_size[4 - layout.size_len..]
	}

	/// The size field read as a plain big-endian integer
	pub(crate) fn plain_size(&self) -> u32 {
		BigEndian::read_u32(&self.raw_size)
	}
}

pub(crate) enum HeaderRead {
	Header(FrameHeader),
	/// A `0x00` was found where an identifier was expected
	Padding,
	Eof,
}

pub(crate) fn parse_header(data: &[u8], version: Id3v2Version) -> Result<HeaderRead> {
	let layout = version.layout();

	match data.first() {
		None => return Ok(HeaderRead::Eof),
		// Assume we just started reading padding
		Some(0) => return Ok(HeaderRead::Padding),
		_ => {},
	}

	if data.len() < layout.header_len() {
		id3v2_err!(BadFrameLength);
	}

	let id = parse_id(&data[..layout.id_len], version)?;

	let size_field = &data[layout.id_len..layout.id_len + layout.size_len];
	let mut raw_size = [0; 4];
	raw_size[4 - layout.size_len..].copy_from_slice(size_field);

	let flags = match layout.flags_len {
		0 => FrameFlags::default(),
		_ => {
			let flags_start = layout.id_len + layout.size_len;
			FrameFlags::parse(version, BigEndian::read_u16(&data[flags_start..]))
		},
	};

	Ok(HeaderRead::Header(FrameHeader {
		id,
		raw_size,
		flags,
	}))
}

fn parse_id(id_bytes: &[u8], version: Id3v2Version) -> Result<FrameId> {
	// For some reason, some apps make v3/v4 tags with v2 frame IDs, padded to 4 characters
	if let &[a, b, c, 0 | b' '] = id_bytes {
		if [a, b, c].into_iter().all(is_valid_id_byte) {
			log::warn!("Found an ID3v2.2 frame ID in an {version:?} tag, attempting to upgrade");

			let legacy = String::from_utf8_lossy(&id_bytes[..3]);
			if let Some(resolution) = resolve(&legacy, version).filter(|r| r.fits(version)) {
				return Ok(resolution.id);
			}
		}

		id3v2_err!(BadFrameId(id_bytes.to_vec()));
	}

	if !id_bytes.iter().copied().all(is_valid_id_byte) {
		id3v2_err!(BadFrameId(id_bytes.to_vec()));
	}

	// All bytes are ASCII at this point
	let id_str = String::from_utf8_lossy(id_bytes).into_owned();
	FrameId::new(id_str)
}

pub(crate) fn write_header<W>(
	writer: &mut W,
	id: &FrameId,
	size: u32,
	flags: FrameFlags,
	version: Id3v2Version,
) -> Result<()>
where
	W: Write,
{
	writer.write_all(id.as_str().as_bytes())?;

	match version {
		Id3v2Version::V2 => writer.write_u24::<BigEndian>(size)?,
		Id3v2Version::V3 => writer.write_u32::<BigEndian>(size)?,
		Id3v2Version::V4 => writer.write_u32::<BigEndian>(size.synch()?)?,
	}

	if version.layout().flags_len > 0 {
		writer.write_u16::<BigEndian>(flags.as_bytes(version))?;
	}

	Ok(())
}
