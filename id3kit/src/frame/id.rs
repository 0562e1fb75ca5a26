use crate::error::Result;
use crate::macros::id3v2_err;

use std::borrow::Cow;
use std::fmt::{Display, Formatter};

/// An ID3v2 frame ID
///
/// This is either a 3 character (ID3v2.2) or 4 character (ID3v2.3/4) identifier, made
/// up of `'A'..='Z'` and `'0'..='9'`.
#[derive(PartialEq, Clone, Debug, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(Cow<'static, str>);

impl FrameId {
	/// Attempts to create a `FrameId` from an ID string
	///
	/// NOTE: This will not convert IDs between versions, see [`registry::resolve`](crate::registry::resolve).
	///
	/// # Errors
	///
	/// * `id` contains invalid characters (must be 'A'..='Z' and '0'..='9')
	/// * `id` is an invalid length (must be 3 or 4)
	///
	/// # Examples
	///
	/// ```rust
	/// use id3kit::frame::FrameId;
	///
	/// # fn main() -> id3kit::error::Result<()> {
	/// let title = FrameId::new("TIT2")?;
	/// assert!(!title.is_legacy());
	///
	/// assert!(FrameId::new("tit2").is_err());
	/// assert!(FrameId::new("TIT22").is_err());
	/// # Ok(()) }
	/// ```
	pub fn new<I>(id: I) -> Result<Self>
	where
		I: Into<Cow<'static, str>>,
	{
		Self::new_cow(id.into())
	}

	fn new_cow(id: Cow<'static, str>) -> Result<Self> {
		if !matches!(id.len(), 3 | 4) || !id.bytes().all(is_valid_id_byte) {
			id3v2_err!(BadFrameId(id.into_owned().into_bytes()));
		}

		Ok(Self(id))
	}

	/// Create a `FrameId` from a known-good identifier
	pub(crate) const fn from_static(id: &'static str) -> Self {
		Self(Cow::Borrowed(id))
	}

	/// Whether this is a 3 character, ID3v2.2 identifier
	///
	/// Legacy identifiers can only be written to ID3v2.2 tags, unless they can be converted.
	pub fn is_legacy(&self) -> bool {
		self.0.len() == 3
	}

	/// Extracts the string from the ID
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Consumes the [`FrameId`], returning the inner value
	pub fn into_inner(self) -> Cow<'static, str> {
		self.0
	}
}

/// Whether `byte` may appear in a frame identifier
pub(crate) fn is_valid_id_byte(byte: u8) -> bool {
	byte.is_ascii_uppercase() || byte.is_ascii_digit()
}

impl Display for FrameId {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl PartialEq<str> for FrameId {
	fn eq(&self, other: &str) -> bool {
		self.as_str() == other
	}
}

impl PartialEq<&str> for FrameId {
	fn eq(&self, other: &&str) -> bool {
		self.as_str() == *other
	}
}

impl TryFrom<&str> for FrameId {
	type Error = crate::error::Id3Error;

	fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
		Self::new(value.to_owned())
	}
}
