use crate::error::{ErrorKind, Id3Error, Result};
use crate::macros::err;

/// Errors that can occur while encoding text
#[derive(Copy, Clone, Debug)]
pub struct TextEncodingError {
	encoding: TextEncoding,
	valid_up_to: usize,
}

impl TextEncodingError {
	/// The target text encoding
	pub fn encoding(&self) -> TextEncoding {
		self.encoding
	}

	/// The byte index in the provided string up to which the encoding was valid
	pub fn valid_up_to(&self) -> usize {
		self.valid_up_to
	}
}

impl core::fmt::Display for TextEncodingError {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		write!(
			f,
			"invalid {} sequence from index {}",
			self.encoding.name(),
			self.valid_up_to
		)
	}
}

impl core::error::Error for TextEncodingError {}

/// The text encoding for use in ID3v2 frames
#[derive(Debug, Clone, Eq, PartialEq, Copy, Hash, Default)]
#[repr(u8)]
pub enum TextEncoding {
	/// ISO-8859-1
	#[default]
	Latin1 = 0,
	/// UTF-16 with a byte order mark
	UTF16 = 1,
	/// UTF-16 big endian
	UTF16BE = 2,
	/// UTF-8
	UTF8 = 3,
}

impl TextEncoding {
	/// Get a `TextEncoding` from a u8, must be 0-3 inclusive
	pub fn from_u8(byte: u8) -> Option<Self> {
		match byte {
			0 => Some(Self::Latin1),
			1 => Some(Self::UTF16),
			2 => Some(Self::UTF16BE),
			3 => Some(Self::UTF8),
			_ => None,
		}
	}

	fn name(self) -> &'static str {
		match self {
			TextEncoding::Latin1 => "Latin-1",
			TextEncoding::UTF16 => "UTF-16",
			TextEncoding::UTF8 => "UTF-8",
			TextEncoding::UTF16BE => "UTF-16 BE",
		}
	}

	/// The length of a string terminator in this encoding
	pub(crate) fn terminator_len(self) -> usize {
		match self {
			TextEncoding::Latin1 | TextEncoding::UTF8 => 1,
			TextEncoding::UTF16 | TextEncoding::UTF16BE => 2,
		}
	}

	/// ID3v2.4 introduced two new text encodings.
	///
	/// When writing ID3v2.2 or ID3v2.3, we just substitute with UTF-16.
	pub(crate) fn to_id3v23(self) -> Self {
		match self {
			Self::UTF8 | Self::UTF16BE => {
				log::warn!(
					"Text encoding {:?} is not supported before ID3v2.4, substituting with UTF-16",
					self
				);
				Self::UTF16
			},
			_ => self,
		}
	}

	pub(crate) fn encode(
		self,
		text: &str,
		terminated: bool,
		lossy: bool,
	) -> std::result::Result<Vec<u8>, TextEncodingError> {
		let mut out = match self {
			TextEncoding::Latin1 => {
				latin1_encode(text, lossy).collect::<std::result::Result<Vec<u8>, _>>()?
			},
			TextEncoding::UTF16 => utf16_encode(text, u16::to_le_bytes, true),
			TextEncoding::UTF16BE => utf16_encode(text, u16::to_be_bytes, false),
			TextEncoding::UTF8 => text.as_bytes().to_vec(),
		};

		if terminated {
			out.extend(std::iter::repeat_n(0, self.terminator_len()));
		}

		Ok(out)
	}
}

/// Decode an entire buffer as a single string in `encoding`
///
/// Trailing terminators are dropped.
pub(crate) fn decode_text(bytes: &[u8], encoding: TextEncoding) -> Result<String> {
	if bytes.is_empty() {
		return Ok(String::new());
	}

	let mut text = match encoding {
		TextEncoding::Latin1 => bytes.iter().map(|c| char::from(*c)).collect::<String>(),
		TextEncoding::UTF16 => {
			if bytes.len() < 2 {
				err!(TextDecode("UTF-16 string has an invalid length (< 2)"));
			}

			match [bytes[0], bytes[1]] {
				[0xFE, 0xFF] => utf16_decode_bytes(&bytes[2..], u16::from_be_bytes)?,
				[0xFF, 0xFE] => utf16_decode_bytes(&bytes[2..], u16::from_le_bytes)?,
				_ => err!(TextDecode("UTF-16 string has an invalid byte order mark")),
			}
		},
		TextEncoding::UTF16BE => utf16_decode_bytes(bytes, u16::from_be_bytes)?,
		TextEncoding::UTF8 => String::from_utf8(bytes.to_vec())
			.map_err(|_| Id3Error::new(ErrorKind::TextDecode("Expected a UTF-8 string")))?,
	};

	trim_end_nulls(&mut text);
	Ok(text)
}

fn latin1_encode(
	s: &str,
	lossy: bool,
) -> impl Iterator<Item = std::result::Result<u8, TextEncodingError>> {
	s.chars().enumerate().map(move |(index, c)| {
		if let Ok(byte) = u8::try_from(u32::from(c)) {
			Ok(byte)
		} else if lossy {
			Ok(b'?')
		} else {
			Err(TextEncodingError {
				encoding: TextEncoding::Latin1,
				valid_up_to: index, // All characters up to this point are single-byte
			})
		}
	})
}

fn utf16_decode_bytes(bytes: &[u8], endianness: fn([u8; 2]) -> u16) -> Result<String> {
	if bytes.len() % 2 != 0 {
		err!(TextDecode("UTF-16 string has an odd length"));
	}

	let words: Vec<u16> = bytes
		.chunks_exact(2)
		// Multiple null separated strings may each carry their own BOM
		.filter_map(|c| match c {
			[0xFF, 0xFE] | [0xFE, 0xFF] => None,
			[a, b] => Some(endianness([*a, *b])),
			_ => None,
		})
		.collect();

	String::from_utf16(&words)
		.map_err(|_| Id3Error::new(ErrorKind::TextDecode("Given an invalid UTF-16 string")))
}

fn trim_end_nulls(text: &mut String) {
	if text.ends_with('\0') {
		let new_len = text.trim_end_matches('\0').len();
		text.truncate(new_len);
	}
}

fn utf16_encode(text: &str, endianness: fn(u16) -> [u8; 2], bom: bool) -> Vec<u8> {
	let mut encoded = Vec::<u8>::new();

	if bom {
		encoded.extend_from_slice(&endianness(0xFEFF_u16));
	}

	for ch in text.encode_utf16() {
		encoded.extend_from_slice(&endianness(ch));
	}

	encoded
}

#[cfg(test)]
mod tests {
	use crate::util::text::{TextEncoding, decode_text};

	const TEST_STRING: &str = "l\u{00f8}ft\u{00a5}";

	#[test_log::test]
	fn text_decode() {
		let be_utf16_decode = decode_text(
			&[
				0xFE, 0xFF, 0x00, 0x6C, 0x00, 0xF8, 0x00, 0x66, 0x00, 0x74, 0x00, 0xA5, 0x00, 0x00,
			],
			TextEncoding::UTF16,
		)
		.unwrap();
		let le_utf16_decode = decode_text(
			&[
				0xFF, 0xFE, 0x6C, 0x00, 0xF8, 0x00, 0x66, 0x00, 0x74, 0x00, 0xA5, 0x00, 0x00, 0x00,
			],
			TextEncoding::UTF16,
		)
		.unwrap();

		assert_eq!(be_utf16_decode, le_utf16_decode);
		assert_eq!(be_utf16_decode, TEST_STRING);

		let utf8_decode = decode_text(TEST_STRING.as_bytes(), TextEncoding::UTF8).unwrap();
		assert_eq!(utf8_decode, TEST_STRING);

		let latin1_decode = decode_text(b"Title\0", TextEncoding::Latin1).unwrap();
		assert_eq!(latin1_decode, "Title");
	}

	#[test_log::test]
	fn text_decode_bad_utf16() {
		assert!(decode_text(&[0x00, 0x41], TextEncoding::UTF16).is_err());
		assert!(decode_text(&[0x00, 0x41, 0x00], TextEncoding::UTF16BE).is_err());
	}

	#[test_log::test]
	fn text_encode() {
		let be_utf16_encode = TextEncoding::UTF16BE
			.encode(TEST_STRING, false, false)
			.unwrap();
		let le_utf16_encode = TextEncoding::UTF16.encode(TEST_STRING, true, false).unwrap();

		// TextEncoding::UTF16BE has no BOM
		assert_eq!(
			be_utf16_encode.as_slice(),
			&[0x00, 0x6C, 0x00, 0xF8, 0x00, 0x66, 0x00, 0x74, 0x00, 0xA5]
		);
		assert_eq!(
			le_utf16_encode.as_slice(),
			&[
				0xFF, 0xFE, 0x6C, 0x00, 0xF8, 0x00, 0x66, 0x00, 0x74, 0x00, 0xA5, 0x00, 0x00, 0x00
			]
		);

		let utf8_encode = TextEncoding::UTF8
			.encode(TEST_STRING, false, false)
			.unwrap();
		assert_eq!(utf8_encode.as_slice(), TEST_STRING.as_bytes());
	}

	#[test_log::test]
	fn latin1_encode_lossy() {
		let err = TextEncoding::Latin1.encode("ab\u{4e2d}c", false, false).unwrap_err();
		assert_eq!(err.valid_up_to(), 2);

		let lossy = TextEncoding::Latin1.encode("ab\u{4e2d}c", false, true).unwrap();
		assert_eq!(lossy, b"ab?c");
	}
}
