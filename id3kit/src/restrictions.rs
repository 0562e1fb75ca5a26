//! ID3v2.4 tag restrictions
//!
//! Restrictions are stored in the extended header as a single `ppqrrstt` byte.

/// Restrictions on the tag size (`pp`)
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum TagSizeRestrictions {
	/// No more than 128 frames and 1 MB total tag size
	#[default]
	S_128F_1M,
	/// No more than 64 frames and 128 KB total tag size
	S_64F_128K,
	/// No more than 32 frames and 40 KB total tag size
	S_32F_40K,
	/// No more than 32 frames and 4 KB total tag size
	S_32F_4K,
}

/// Restrictions on text field sizes (`rr`)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum TextSizeRestrictions {
	/// No longer than 1024 characters
	C_1024,
	/// No longer than 128 characters
	C_128,
	/// No longer than 30 characters
	C_30,
}

/// Restrictions on all image sizes (`tt`)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum ImageSizeRestrictions {
	/// All images are 256x256 or smaller
	P_256,
	/// All images are 64x64 or smaller
	P_64,
	/// All images are **exactly** 64x64
	P_64_64,
}

/// Restrictions on the content of an ID3v2.4 tag
///
/// These are advisory, id3kit records them but does not enforce them.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TagRestrictions {
	/// Restriction on the size of the tag. See [`TagSizeRestrictions`]
	pub size: TagSizeRestrictions,
	/// Text encoding restrictions
	///
	/// `false` - No restrictions
	/// `true` - Strings are only encoded with [`TextEncoding::Latin1`](crate::TextEncoding::Latin1) or [`TextEncoding::UTF8`](crate::TextEncoding::UTF8)
	pub text_encoding: bool,
	/// Restrictions on all text field sizes. See [`TextSizeRestrictions`]
	pub text_fields_size: Option<TextSizeRestrictions>,
	/// Image encoding restrictions
	///
	/// `false` - No restrictions
	/// `true` - Images can only be `PNG` or `JPEG`
	pub image_encoding: bool,
	/// Restrictions on all image sizes. See [`ImageSizeRestrictions`]
	pub image_size: Option<ImageSizeRestrictions>,
}

impl TagRestrictions {
	/// Read a [`TagRestrictions`] from a byte
	///
	/// NOTE: See <https://id3.org/id3v2.4.0-structure> section 3.2, item d
	///
	/// # Examples
	///
	/// ```rust
	/// use id3kit::restrictions::{TagRestrictions, TagSizeRestrictions, TextSizeRestrictions};
	///
	/// let restrictions = TagRestrictions::from_byte(0b1111_0000);
	/// assert_eq!(restrictions.size, TagSizeRestrictions::S_32F_4K);
	/// assert!(restrictions.text_encoding);
	/// assert_eq!(restrictions.text_fields_size, Some(TextSizeRestrictions::C_128));
	/// ```
	pub fn from_byte(byte: u8) -> Self {
		let size = match (byte >> 6) & 0b11 {
			1 => TagSizeRestrictions::S_64F_128K,
			2 => TagSizeRestrictions::S_32F_40K,
			3 => TagSizeRestrictions::S_32F_4K,
			_ => TagSizeRestrictions::S_128F_1M,
		};

		let text_fields_size = match (byte >> 3) & 0b11 {
			1 => Some(TextSizeRestrictions::C_1024),
			2 => Some(TextSizeRestrictions::C_128),
			3 => Some(TextSizeRestrictions::C_30),
			_ => None,
		};

		let image_size = match byte & 0b11 {
			1 => Some(ImageSizeRestrictions::P_256),
			2 => Some(ImageSizeRestrictions::P_64),
			3 => Some(ImageSizeRestrictions::P_64_64),
			_ => None,
		};

		Self {
			size,
			text_encoding: byte & 0x20 == 0x20,
			text_fields_size,
			image_encoding: byte & 0x04 == 0x04,
			image_size,
		}
	}

	/// Convert a [`TagRestrictions`] into a `u8`
	#[allow(clippy::trivially_copy_pass_by_ref)]
	pub fn as_byte(&self) -> u8 {
		let size: u8 = match self.size {
			TagSizeRestrictions::S_128F_1M => 0,
			TagSizeRestrictions::S_64F_128K => 1,
			TagSizeRestrictions::S_32F_40K => 2,
			TagSizeRestrictions::S_32F_4K => 3,
		};

		let text_fields_size: u8 = match self.text_fields_size {
			None => 0,
			Some(TextSizeRestrictions::C_1024) => 1,
			Some(TextSizeRestrictions::C_128) => 2,
			Some(TextSizeRestrictions::C_30) => 3,
		};

		let image_size: u8 = match self.image_size {
			None => 0,
			Some(ImageSizeRestrictions::P_256) => 1,
			Some(ImageSizeRestrictions::P_64) => 2,
			Some(ImageSizeRestrictions::P_64_64) => 3,
		};

		(size << 6)
			| (u8::from(self.text_encoding) << 5)
			| (text_fields_size << 3)
			| (u8::from(self.image_encoding) << 2)
			| image_size
	}
}

#[cfg(test)]
mod tests {
	use super::{ImageSizeRestrictions, TagRestrictions, TagSizeRestrictions};

	#[test_log::test]
	fn restrictions_every_byte() {
		for byte in 0..=u8::MAX {
			assert_eq!(TagRestrictions::from_byte(byte).as_byte(), byte);
		}
	}

	#[test_log::test]
	fn restrictions_tag_size_is_high_bits() {
		let restrictions = TagRestrictions {
			size: TagSizeRestrictions::S_32F_4K,
			image_size: Some(ImageSizeRestrictions::P_64),
			..TagRestrictions::default()
		};

		assert_eq!(restrictions.as_byte(), 0b1100_0010);
	}
}
