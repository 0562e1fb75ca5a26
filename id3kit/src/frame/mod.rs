//! The ID3v2 frame envelope
//!
//! A frame is made up of a header (identifier, size, flags), optional extra header fields
//! (see [`ExtraField`](crate::ExtraField)), and the payload. id3kit never interprets
//! payloads itself, see [`FrameKind`] for that.

pub(crate) mod header;
pub(crate) mod id;
mod payload;
pub(crate) mod read;
pub(crate) mod write;

pub use header::{interpret_size, recover_size};
pub use id::FrameId;
pub use payload::{OpaqueReason, Payload};

use crate::error::Result;
use crate::macros::id3v2_err;
use crate::registry::{FrameKind, family_of};
use crate::version::Id3v2Version;

/// Various flags to describe the content of a frame
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct FrameFlags {
	/// Preserve frame on tag edit
	pub tag_alter_preservation: bool,
	/// Preserve frame on file edit
	pub file_alter_preservation: bool,
	/// Frame cannot be written to
	///
	/// See [`WriteOptions::respect_read_only`](crate::config::WriteOptions::respect_read_only)
	pub read_only: bool,
	/// The group identifier the frame belongs to
	///
	/// All frames with the same group identifier byte belong to the same group.
	pub grouping_identity: Option<u8>,
	/// Frame is compressed
	///
	/// The payload will be compressed with the [`Compressor`](crate::capability::Compressor) when written.
	pub compression: bool,
	/// Frame encryption method symbol
	///
	/// The payload will be encrypted with the [`Encryptor`](crate::capability::Encryptor) when written.
	///
	/// The encryption method symbol **must** be >= 0x80.
	pub encryption: Option<u8>,
	/// Frame is unsynchronised (ID3v2.4 only)
	///
	/// In short, this makes all "0xFF X (X >= 0xE0)" combinations into "0xFF 0x00 X" to avoid confusion
	/// with the MPEG frame header, which is often identified by its "frame sync" (11 set bits).
	///
	/// See [`synchsafe::unsynchronize`](crate::util::synchsafe::unsynchronize).
	pub unsynchronisation: bool,
	/// The data length indicator (ID3v2.4) or decompressed size (ID3v2.3)
	///
	/// This is the size of the payload with all frame level transformations reversed. It is
	/// recalculated when writing a resolved payload.
	pub data_length_indicator: Option<u32>,
}

impl FrameFlags {
	/// Parse the flags from a frame header of `version`
	///
	/// NOTE: If any of the following flags are set, they will be set to `Some(0)`, to be
	/// filled in by the extra header fields:
	///
	/// * `grouping_identity`
	/// * `encryption`
	/// * `data_length_indicator`
	pub fn parse(version: Id3v2Version, flags: u16) -> Self {
		match version {
			Id3v2Version::V2 => Self::default(),
			Id3v2Version::V3 => FrameFlags {
				tag_alter_preservation: flags & 0x8000 == 0x8000,
				file_alter_preservation: flags & 0x4000 == 0x4000,
				read_only: flags & 0x2000 == 0x2000,
				compression: flags & 0x0080 == 0x0080,
				encryption: (flags & 0x0040 == 0x0040).then_some(0),
				grouping_identity: (flags & 0x0020 == 0x0020).then_some(0),
				unsynchronisation: false,
				// Decompressed size
				data_length_indicator: (flags & 0x0080 == 0x0080).then_some(0),
			},
			Id3v2Version::V4 => FrameFlags {
				tag_alter_preservation: flags & 0x4000 == 0x4000,
				file_alter_preservation: flags & 0x2000 == 0x2000,
				read_only: flags & 0x1000 == 0x1000,
				grouping_identity: (flags & 0x0040 == 0x0040).then_some(0),
				compression: flags & 0x0008 == 0x0008,
				encryption: (flags & 0x0004 == 0x0004).then_some(0),
				unsynchronisation: flags & 0x0002 == 0x0002,
				data_length_indicator: (flags & 0x0001 == 0x0001).then_some(0),
			},
		}
	}

	/// Get the byte representation of the flags for a frame header of `version`
	pub fn as_bytes(&self, version: Id3v2Version) -> u16 {
		let set = |condition: bool, bit: u16| if condition { bit } else { 0 };

		match version {
			Id3v2Version::V2 => 0,
			Id3v2Version::V3 => {
				set(self.tag_alter_preservation, 0x8000)
					| set(self.file_alter_preservation, 0x4000)
					| set(self.read_only, 0x2000)
					| set(self.compression, 0x0080)
					| set(self.encryption.is_some(), 0x0040)
					| set(self.grouping_identity.is_some(), 0x0020)
			},
			Id3v2Version::V4 => {
				set(self.tag_alter_preservation, 0x4000)
					| set(self.file_alter_preservation, 0x2000)
					| set(self.read_only, 0x1000)
					| set(self.grouping_identity.is_some(), 0x0040)
					| set(self.compression, 0x0008)
					| set(self.encryption.is_some(), 0x0004)
					| set(self.unsynchronisation, 0x0002)
					| set(self.data_length_indicator.is_some(), 0x0001)
			},
		}
	}
}

/// An ID3v2 frame
///
/// # Examples
///
/// ```rust
/// use id3kit::frame::{Frame, FrameId, Payload};
///
/// # fn main() -> id3kit::error::Result<()> {
/// let frame = Frame::new(FrameId::new("TIT2")?, b"\x00Foo title".to_vec());
/// assert_eq!(frame.id(), "TIT2");
/// assert_eq!(frame.payload(), &Payload::Resolved(b"\x00Foo title".to_vec()));
/// # Ok(()) }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Frame {
	pub(crate) id: FrameId,
	/// The frame flags
	pub flags: FrameFlags,
	pub(crate) payload: Payload,
}

impl Frame {
	/// Create a new frame with a resolved payload and no flags
	pub fn new(id: FrameId, content: Vec<u8>) -> Self {
		Self {
			id,
			flags: FrameFlags::default(),
			payload: Payload::Resolved(content),
		}
	}

	/// Create a new frame from all of its parts
	pub fn from_parts(id: FrameId, flags: FrameFlags, payload: Payload) -> Self {
		Self { id, flags, payload }
	}

	/// Create a frame from a [`FrameKind`], for a tag of `version`
	///
	/// # Errors
	///
	/// * The kind has no identifier in `version`
	/// * [`FrameKind::encode`]
	///
	/// # Examples
	///
	/// ```rust
	/// use id3kit::Id3v2Version;
	/// use id3kit::frame::{Frame, FrameId};
	/// use id3kit::registry::TextFrame;
	/// use id3kit::TextEncoding;
	///
	/// # fn main() -> id3kit::error::Result<()> {
	/// let title = TextFrame::new(FrameId::new("TIT2")?, TextEncoding::UTF8, String::from("Foo"));
	/// let frame = Frame::from_kind(&title, Id3v2Version::V2)?;
	/// assert_eq!(frame.id(), "TT2");
	/// # Ok(()) }
	/// ```
	pub fn from_kind<K: FrameKind>(kind: &K, version: Id3v2Version) -> Result<Self> {
		let Some(id) = kind.identifier(version) else {
			id3v2_err!(UnsupportedVersion(K::NAME, version));
		};

		Ok(Self::new(id, kind.encode(version)?))
	}

	/// Decode the payload as a [`FrameKind`]
	///
	/// `version` is the version of the tag the frame was read from.
	///
	/// # Errors
	///
	/// * The payload is [`Payload::Opaque`]
	/// * The kind does not accept this frame's identifier
	/// * [`FrameKind::decode`]
	pub fn decode_as<K: FrameKind>(&self, version: Id3v2Version) -> Result<K> {
		let raw = match &self.payload {
			Payload::Resolved(raw) => raw,
			Payload::Opaque { reason, .. } => id3v2_err!(UnresolvedPayload(*reason)),
		};

		if !K::accepts(family_of(&self.id)) {
			id3v2_err!(BadFrameKind(self.id.clone(), K::NAME));
		}

		K::decode(self.id.clone(), raw, version)
	}

	/// The frame identifier
	pub fn id(&self) -> &FrameId {
		&self.id
	}

	/// The frame payload
	pub fn payload(&self) -> &Payload {
		&self.payload
	}

	/// Replace the payload with resolved content
	pub fn set_content(&mut self, content: Vec<u8>) {
		self.payload = Payload::Resolved(content);
	}

	/// Consumes the frame, returning the payload
	pub fn into_payload(self) -> Payload {
		self.payload
	}
}
