use super::TagFlags;
use crate::error::Result;
use crate::macros::{err, id3v2_err};
use crate::scan::{FOOTER_MARKER, HEADER_MARKER, TAG_HEADER_LEN};
use crate::util::synchsafe::{SynchsafeInteger, decode_synchsafe};
use crate::version::Id3v2Version;

use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};

/// The fixed 10 byte header (or footer) of a tag
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct TagHeader {
	pub(crate) version: Id3v2Version,
	pub(crate) flags: TagFlags,
	pub(crate) extended_header: bool,
	/// The size of the tag contents (**DOES NOT INCLUDE THE HEADER/FOOTER**)
	pub(crate) size: u32,
}

impl TagHeader {
	pub(crate) fn parse(bytes: &[u8; TAG_HEADER_LEN]) -> Result<Self> {
		Self::parse_with_marker(bytes, HEADER_MARKER)
	}

	pub(crate) fn parse_footer(bytes: &[u8; TAG_HEADER_LEN]) -> Result<Self> {
		let mut footer = Self::parse_with_marker(bytes, FOOTER_MARKER)?;
		if footer.version != Id3v2Version::V4 {
			id3v2_err!(MalformedHeader("footers are only valid in ID3v2.4 tags"));
		}

		footer.flags.footer = true;
		Ok(footer)
	}

	fn parse_with_marker(bytes: &[u8; TAG_HEADER_LEN], marker: [u8; 3]) -> Result<Self> {
		if bytes[..3] != marker {
			err!(FakeTag);
		}

		// Version is stored as [major, minor], but here we don't care about minor revisions unless there's an error.
		let version = Id3v2Version::from_bytes(bytes[3], bytes[4])?;

		let flags = bytes[5];

		// Compression was a flag only used in ID3v2.2 (bit 2).
		// At the time the ID3v2.2 specification was written, a compression scheme wasn't decided.
		// The ID3v2.2 specification recommends ignoring the tag in this case.
		if version == Id3v2Version::V2 && flags & 0x40 == 0x40 {
			id3v2_err!(V2Compression);
		}

		if bytes[6..].iter().any(|b| b & 0x80 != 0) {
			id3v2_err!(MalformedHeader("tag size is not synchsafe"));
		}

		let is_v2 = version == Id3v2Version::V2;
		let flags_parsed = TagFlags {
			header: true,
			footer: version == Id3v2Version::V4 && flags & 0x10 == 0x10,
			unsynchronisation: flags & 0x80 == 0x80,
			experimental: !is_v2 && flags & 0x20 == 0x20,
		};

		Ok(TagHeader {
			version,
			flags: flags_parsed,
			extended_header: !is_v2 && flags & 0x40 == 0x40,
			size: decode_synchsafe(&bytes[6..]) as u32,
		})
	}

	/// The total size of the tag, including the header and footer
	pub(crate) fn full_tag_size(&self) -> u64 {
		let footer_len = if self.flags.footer { TAG_HEADER_LEN } else { 0 };
		(TAG_HEADER_LEN + footer_len) as u64 + u64::from(self.size)
	}

	fn flags_byte(&self) -> u8 {
		let mut byte = 0;

		if self.flags.unsynchronisation {
			byte |= 0x80;
		}

		if self.version == Id3v2Version::V2 {
			return byte;
		}

		if self.extended_header {
			byte |= 0x40;
		}

		if self.flags.experimental {
			byte |= 0x20;
		}

		if self.version == Id3v2Version::V4 && self.flags.footer {
			byte |= 0x10;
		}

		byte
	}

	pub(crate) fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
		self.write_with_marker(writer, HEADER_MARKER)
	}

	/// The footer is the same as the header, but with the identifier reversed
	pub(crate) fn write_footer<W: Write>(&self, writer: &mut W) -> Result<()> {
		self.write_with_marker(writer, FOOTER_MARKER)
	}

	fn write_with_marker<W: Write>(&self, writer: &mut W, marker: [u8; 3]) -> Result<()> {
		writer.write_all(&marker)?;
		writer.write_all(&[self.version.major(), 0])?;
		writer.write_u8(self.flags_byte())?;
		writer.write_u32::<BigEndian>(self.size.synch()?)?;

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::TagHeader;
	use crate::error::Id3v2ErrorKind;
	use crate::tag::TagFlags;
	use crate::version::Id3v2Version;

	#[test_log::test]
	fn parse_v4_header() {
		let header = TagHeader::parse(b"ID3\x04\x00\x50\x00\x00\x02\x01").unwrap();

		assert_eq!(header.version, Id3v2Version::V4);
		assert!(header.extended_header);
		assert!(header.flags.footer);
		assert!(!header.flags.unsynchronisation);
		assert_eq!(header.size, 257);
		assert_eq!(header.full_tag_size(), 277);
	}

	#[test_log::test]
	fn parse_v2_compression() {
		let err = TagHeader::parse(b"ID3\x02\x00\x40\x00\x00\x00\x00").unwrap_err();
		assert_eq!(err.id3v2_kind(), Some(&Id3v2ErrorKind::V2Compression));
	}

	#[test_log::test]
	fn parse_rejects_bad_headers() {
		assert!(TagHeader::parse(b"ID4\x04\x00\x00\x00\x00\x00\x00").is_err());
		assert!(TagHeader::parse(b"ID3\x05\x00\x00\x00\x00\x00\x00").is_err());
		assert!(TagHeader::parse(b"ID3\x04\x00\x00\x00\x00\x00\x80").is_err());

		// ID3v2.3 has no footer
		assert!(TagHeader::parse_footer(b"3DI\x03\x00\x00\x00\x00\x00\x00").is_err());
	}

	#[test_log::test]
	fn write_header_and_footer() {
		let header = TagHeader {
			version: Id3v2Version::V4,
			flags: TagFlags {
				footer: true,
				experimental: true,
				..TagFlags::default()
			},
			extended_header: false,
			size: 0x80,
		};

		let mut out: Vec<u8> = Vec::new();
		header.write(&mut out).unwrap();
		header.write_footer(&mut out).unwrap();

		assert_eq!(
			out,
			b"ID3\x04\x00\x30\x00\x00\x01\x003DI\x04\x00\x30\x00\x00\x01\x00"
		);
		assert_eq!(TagHeader::parse_footer(out[10..].try_into().unwrap()).unwrap(), header);
	}
}
