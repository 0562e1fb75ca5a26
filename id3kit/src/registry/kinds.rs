use super::{FrameFamily, resolve};
use crate::error::{Id3Error, Result};
use crate::frame::FrameId;
use crate::macros::{err, id3v2_err};
use crate::util::text::{TextEncoding, decode_text};
use crate::version::Id3v2Version;

/// A frame payload codec
///
/// id3kit only deals with the frame envelope. Implementors of this trait interpret the
/// payload of frames, see [`Frame::decode_as`](crate::frame::Frame::decode_as) and
/// [`Frame::from_kind`](crate::frame::Frame::from_kind).
pub trait FrameKind: Sized {
	/// A human readable name for the kind, used in errors
	const NAME: &'static str;

	/// Whether this kind can represent frames of `family`
	fn accepts(family: FrameFamily) -> bool;

	/// Decode a resolved payload
	///
	/// # Errors
	///
	/// The payload is malformed for this kind
	fn decode(id: FrameId, raw: &[u8], version: Id3v2Version) -> Result<Self>;

	/// Encode the payload for a tag of `version`
	///
	/// # Errors
	///
	/// The content can't be represented in `version`
	fn encode(&self, version: Id3v2Version) -> Result<Vec<u8>>;

	/// The frame identifier to use in a tag of `version`
	fn identifier(&self, version: Id3v2Version) -> Option<FrameId>;

	/// Whether the kind can be stored in a tag of `version`
	fn supports_version(&self, version: Id3v2Version) -> bool {
		self.identifier(version).is_some()
	}
}

// An identifier for `version`, converted through the registry where needed
fn identifier_for(id: &FrameId, version: Id3v2Version) -> Option<FrameId> {
	resolve(id.as_str(), version)
		.filter(|resolution| resolution.fits(version))
		.map(|resolution| resolution.id)
}

/// A text information frame (`T***`)
///
/// Multiple values (ID3v2.4) are kept `'\0'` separated in [`TextFrame::value`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TextFrame {
	/// The frame identifier
	pub id: FrameId,
	/// The encoding of the text
	pub encoding: TextEncoding,
	/// The text
	pub value: String,
}

impl TextFrame {
	/// Create a new [`TextFrame`]
	pub fn new(id: FrameId, encoding: TextEncoding, value: String) -> Self {
		Self {
			id,
			encoding,
			value,
		}
	}
}

impl FrameKind for TextFrame {
	const NAME: &'static str = "text";

	fn accepts(family: FrameFamily) -> bool {
		family == FrameFamily::Text
	}

	fn decode(id: FrameId, raw: &[u8], _version: Id3v2Version) -> Result<Self> {
		let Some((encoding, text)) = raw.split_first() else {
			id3v2_err!(BadFrameLength);
		};

		let Some(encoding) = TextEncoding::from_u8(*encoding) else {
			err!(TextDecode("Found invalid encoding"));
		};

		Ok(Self {
			id,
			encoding,
			value: decode_text(text, encoding)?,
		})
	}

	fn encode(&self, version: Id3v2Version) -> Result<Vec<u8>> {
		let encoding = match version {
			Id3v2Version::V4 => self.encoding,
			_ => self.encoding.to_id3v23(),
		};

		let mut content = vec![encoding as u8];
		content.extend(encoding.encode(&self.value, false, false)?);
		Ok(content)
	}

	fn identifier(&self, version: Id3v2Version) -> Option<FrameId> {
		identifier_for(&self.id, version)
	}
}

/// A URL link frame (`W***`)
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UrlFrame {
	/// The frame identifier
	pub id: FrameId,
	/// The URL, always stored as Latin-1
	pub url: String,
}

impl FrameKind for UrlFrame {
	const NAME: &'static str = "URL";

	fn accepts(family: FrameFamily) -> bool {
		family == FrameFamily::Url
	}

	fn decode(id: FrameId, raw: &[u8], _version: Id3v2Version) -> Result<Self> {
		Ok(Self {
			id,
			url: decode_text(raw, TextEncoding::Latin1)?,
		})
	}

	fn encode(&self, _version: Id3v2Version) -> Result<Vec<u8>> {
		TextEncoding::Latin1
			.encode(&self.url, false, false)
			.map_err(Id3Error::from)
	}

	fn identifier(&self, version: Id3v2Version) -> Option<FrameId> {
		identifier_for(&self.id, version)
	}
}

/// Any frame, kept as raw bytes
///
/// This is the representation of every frame id3kit doesn't interpret.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BinaryFrame {
	/// The frame identifier
	pub id: FrameId,
	/// The raw payload
	pub data: Vec<u8>,
}

impl FrameKind for BinaryFrame {
	const NAME: &'static str = "binary";

	fn accepts(_family: FrameFamily) -> bool {
		true
	}

	fn decode(id: FrameId, raw: &[u8], _version: Id3v2Version) -> Result<Self> {
		Ok(Self {
			id,
			data: raw.to_vec(),
		})
	}

	fn encode(&self, _version: Id3v2Version) -> Result<Vec<u8>> {
		Ok(self.data.clone())
	}

	fn identifier(&self, version: Id3v2Version) -> Option<FrameId> {
		identifier_for(&self.id, version)
	}
}
