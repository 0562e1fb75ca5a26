use crate::error::Result;
use crate::macros::id3v2_err;

/// The ID3v2 version
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Copy, Hash, Default)]
pub enum Id3v2Version {
	/// ID3v2.2
	V2,
	/// ID3v2.3
	V3,
	/// ID3v2.4
	#[default]
	V4,
}

impl Id3v2Version {
	/// Get the version from the header's `[major, revision]` bytes
	///
	/// # Errors
	///
	/// * `major` is not 2, 3, or 4
	/// * Either byte is `>= 0x10`
	pub fn from_bytes(major: u8, revision: u8) -> Result<Self> {
		if revision >= 0x10 {
			id3v2_err!(BadId3v2Version(major, revision));
		}

		match major {
			2 => Ok(Self::V2),
			3 => Ok(Self::V3),
			4 => Ok(Self::V4),
			_ => id3v2_err!(BadId3v2Version(major, revision)),
		}
	}

	/// The major version byte
	pub fn major(self) -> u8 {
		match self {
			Self::V2 => 2,
			Self::V3 => 3,
			Self::V4 => 4,
		}
	}

	/// The frame header layout for this version
	pub fn layout(self) -> &'static FrameLayout {
		match self {
			Self::V2 => &V2_LAYOUT,
			Self::V3 => &V3_LAYOUT,
			Self::V4 => &V4_LAYOUT,
		}
	}
}

/// An extra frame header field, stored between the flags and the payload
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExtraField {
	/// ID3v2.3 decompressed size, a plain `u32`
	DecompressedSize,
	/// Encryption method symbol
	EncryptionMethod,
	/// Group identifier
	GroupId,
	/// ID3v2.4 data length indicator, a synchsafe `u32`
	DataLengthIndicator,
}

impl ExtraField {
	/// The size of the field in bytes
	pub fn len(self) -> usize {
		match self {
			Self::DecompressedSize | Self::DataLengthIndicator => 4,
			Self::EncryptionMethod | Self::GroupId => 1,
		}
	}
}

/// The layout of a frame header for a single [`Id3v2Version`]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FrameLayout {
	/// The length of the frame identifier
	pub id_len: usize,
	/// The length of the size field
	pub size_len: usize,
	/// The length of the flags field
	pub flags_len: usize,
	/// Whether the size field is a synchsafe integer
	pub synchsafe_size: bool,
	/// All flag bits defined for this version
	pub known_flag_mask: u16,
	/// The order of the extra header fields
	pub extra_fields: &'static [ExtraField],
}

impl FrameLayout {
	/// The length of the fixed frame header
	pub fn header_len(&self) -> usize {
		self.id_len + self.size_len + self.flags_len
	}
}

static V2_LAYOUT: FrameLayout = FrameLayout {
	id_len: 3,
	size_len: 3,
	flags_len: 0,
	synchsafe_size: false,
	known_flag_mask: 0,
	extra_fields: &[],
};

// %abc00000 %ijk00000
static V3_LAYOUT: FrameLayout = FrameLayout {
	id_len: 4,
	size_len: 4,
	flags_len: 2,
	synchsafe_size: false,
	known_flag_mask: 0xE0E0,
	extra_fields: &[
		ExtraField::DecompressedSize,
		ExtraField::EncryptionMethod,
		ExtraField::GroupId,
	],
};

// %0abc0000 %0h00kmnp
static V4_LAYOUT: FrameLayout = FrameLayout {
	id_len: 4,
	size_len: 4,
	flags_len: 2,
	synchsafe_size: true,
	known_flag_mask: 0x704F,
	extra_fields: &[
		ExtraField::GroupId,
		ExtraField::EncryptionMethod,
		ExtraField::DataLengthIndicator,
	],
};
