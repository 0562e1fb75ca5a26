//! Contains the errors that can arise within id3kit
//!
//! The primary error is [`Id3Error`]. The type of error is determined by [`ErrorKind`],
//! which can be extended at any time.

use crate::frame::{FrameId, OpaqueReason};
use crate::version::Id3v2Version;
pub use crate::util::text::TextEncodingError;

use std::collections::TryReserveError;
use std::fmt::{Debug, Display, Formatter};

/// Alias for `Result<T, Id3Error>`
pub type Result<T> = std::result::Result<T, Id3Error>;

/// The types of errors that can occur
#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
	// Data related errors
	/// Attempting to read/write an abnormally large amount of data
	TooMuchData,
	/// Expected the data to be a different size than provided
	///
	/// This occurs when the size of an item is written as one value, but that size is either too
	/// big or small to be valid within the bounds of that item.
	SizeMismatch,

	// Tag related errors
	/// Arises when a tag is expected (Ex. found an "ID3" marker), but the data that follows is invalid
	FakeTag,
	/// No tag header or footer could be found in the searched region of the stream
	TagNotFound,
	/// Errors that arise while decoding text
	TextDecode(&'static str),
	/// Errors that arise while encoding text
	TextEncode(TextEncodingError),
	/// Errors that arise while reading/writing ID3v2 tags
	Id3v2(Id3v2Error),

	// Conversions for external errors
	/// Represents all cases of [`std::io::Error`].
	Io(std::io::Error),
	/// Failure to allocate enough memory
	Alloc(TryReserveError),
	/// This should **never** be encountered
	Infallible(std::convert::Infallible),
}

/// The integrity check that failed, see [`Id3v2ErrorKind::IntegrityMismatch`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityCheck {
	/// The CRC-32 stored in the extended header does not match the tag content
	Crc {
		/// The CRC stored in the extended header
		stored: u32,
		/// The CRC computed over the tag content
		computed: u32,
	},
	/// A decompressed frame does not have the size its header declares
	DecompressedSize {
		/// The size declared by the frame header
		declared: u32,
		/// The size actually produced by the decompressor
		actual: usize,
	},
}

/// The format limit that was exceeded, see [`Id3v2ErrorKind::BudgetExceeded`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Budget {
	/// A tag larger than [`MAX_TAG_SIZE`](crate::MAX_TAG_SIZE)
	TagSize(u64),
	/// A frame larger than [`MAX_FRAME_SIZE`](crate::MAX_FRAME_SIZE)
	FrameSize(u64),
	/// More frames than [`MAX_FRAME_COUNT`](crate::MAX_FRAME_COUNT)
	FrameCount(usize),
}

/// The types of errors that can occur while interacting with ID3v2 tags
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Id3v2ErrorKind {
	// Header
	/// Arises when an invalid ID3v2 version is found
	BadId3v2Version(u8, u8),
	/// Arises when a header or footer marker is found, but its fields are out of range
	MalformedHeader(&'static str),
	/// Arises when a compressed ID3v2.2 tag is encountered
	///
	/// At the time the ID3v2.2 specification was written, a compression scheme wasn't decided.
	/// As such, it is recommended to ignore the tag entirely.
	V2Compression,
	/// Arises when an extended header has an invalid size, or its content does not fill its declared size
	BadExtendedHeaderSize,

	// Frame
	/// Arises when a frame ID contains invalid characters (must be within `'A'..'Z'` or `'0'..'9'`)
	/// or if the ID is too short/long.
	BadFrameId(Vec<u8>),
	/// Arises when a frame doesn't have enough data
	BadFrameLength,
	/// Arises when a frame with no content is parsed with [ParsingMode::Strict](crate::config::ParsingMode::Strict)
	EmptyFrame(FrameId),
	/// Arises when a frame's declared size does not lead to a plausible frame boundary
	///
	/// With [ParsingMode::Strict](crate::config::ParsingMode::Strict), this fails the read like any
	/// other inconsistency within the tag. Otherwise, the size is recovered and a warning is logged.
	SizeInconsistent {
		/// The size stored in the frame header
		declared: u32,
		/// The size the frame actually occupies
		recovered: u32,
	},
	/// Arises when reading/writing a compressed frame with no data length indicator
	MissingDataLengthIndicator,
	/// Arises when a payload could not be decrypted or decompressed
	UnresolvedPayload(OpaqueReason),
	/// Arises when a CRC or decompressed length check fails
	IntegrityMismatch(IntegrityCheck),
	/// Arises when a frame or tag declares a size beyond the format maximum
	BudgetExceeded(Budget),
	/// Arises when the padding following the frames contains non-zero bytes
	NonZeroPadding,
	/// Arises when attempting to decode a frame into a kind that does not accept its identifier
	BadFrameKind(FrameId, &'static str),
	/// Arises when a frame kind has no identifier in the requested version
	UnsupportedVersion(&'static str, Id3v2Version),

	// Writing
	/// Arises when attempting to write an encrypted frame with an invalid encryption method symbol (must be >= 0x80)
	InvalidEncryptionMethodSymbol(u8),
}

impl Display for Id3v2ErrorKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			// Header
			Self::BadId3v2Version(major, minor) => write!(
				f,
				"Found an invalid version (v{major}.{minor}), expected any major revision in: (2, \
				 3, 4)"
			),
			Self::MalformedHeader(message) => write!(f, "Malformed tag header: {message}"),
			Self::V2Compression => write!(f, "Encountered a compressed ID3v2.2 tag"),
			Self::BadExtendedHeaderSize => {
				write!(f, "Found an extended header with an invalid size")
			},

			// Frame
			Self::BadFrameId(frame_id) => write!(f, "Failed to parse a frame ID: 0x{frame_id:x?}"),
			Self::BadFrameLength => write!(
				f,
				"Frame isn't long enough to extract the necessary information"
			),
			Self::EmptyFrame(id) => write!(f, "Frame `{id}` is empty"),
			Self::SizeInconsistent {
				declared,
				recovered,
			} => write!(
				f,
				"Frame declares a size of {declared} bytes, but occupies {recovered} bytes"
			),
			Self::MissingDataLengthIndicator => write!(
				f,
				"Encountered a compressed frame without a data length indicator"
			),
			Self::UnresolvedPayload(reason) => {
				write!(f, "Unable to resolve frame payload ({reason:?})")
			},
			Self::IntegrityMismatch(IntegrityCheck::Crc { stored, computed }) => write!(
				f,
				"CRC mismatch (stored: {stored:#010X}, computed: {computed:#010X})"
			),
			Self::IntegrityMismatch(IntegrityCheck::DecompressedSize { declared, actual }) => {
				write!(
					f,
					"Decompressed frame size mismatch (declared: {declared}, actual: {actual})"
				)
			},
			Self::BudgetExceeded(Budget::TagSize(size)) => {
				write!(f, "Tag size {size} exceeds the format maximum")
			},
			Self::BudgetExceeded(Budget::FrameSize(size)) => {
				write!(f, "Frame size {size} exceeds the format maximum")
			},
			Self::BudgetExceeded(Budget::FrameCount(count)) => {
				write!(f, "Frame count {count} exceeds the format maximum")
			},
			Self::NonZeroPadding => write!(f, "Encountered non-zero bytes in the tag padding"),
			Self::BadFrameKind(id, kind) => {
				write!(f, "Frame `{id}` cannot be decoded as a {kind} frame")
			},
			Self::UnsupportedVersion(kind, version) => {
				write!(f, "This {kind} frame can't be stored in an {version:?} tag")
			},

			// Writing
			Self::InvalidEncryptionMethodSymbol(symbol) => write!(
				f,
				"Attempted to write an encrypted frame with an invalid method symbol ({symbol})"
			),
		}
	}
}

/// An error that arises while interacting with an ID3v2 tag
pub struct Id3v2Error {
	kind: Id3v2ErrorKind,
}

impl Id3v2Error {
	/// Create a new `ID3v2Error` from an [`Id3v2ErrorKind`]
	#[must_use]
	pub const fn new(kind: Id3v2ErrorKind) -> Self {
		Self { kind }
	}

	/// Returns the [`Id3v2ErrorKind`]
	pub fn kind(&self) -> &Id3v2ErrorKind {
		&self.kind
	}
}

impl Debug for Id3v2Error {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "ID3v2: {:?}", self.kind)
	}
}

impl Display for Id3v2Error {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "ID3v2: {}", self.kind)
	}
}

/// Errors that could occur within id3kit
pub struct Id3Error {
	pub(crate) kind: ErrorKind,
}

impl Id3Error {
	/// Create an `Id3Error` from an [`ErrorKind`]
	///
	/// # Examples
	///
	/// ```rust
	/// use id3kit::error::{ErrorKind, Id3Error};
	///
	/// let not_found = Id3Error::new(ErrorKind::TagNotFound);
	/// ```
	#[must_use]
	pub const fn new(kind: ErrorKind) -> Self {
		Self { kind }
	}

	/// Returns the [`ErrorKind`]
	///
	/// # Examples
	///
	/// ```rust
	/// use id3kit::error::{ErrorKind, Id3Error};
	///
	/// let not_found = Id3Error::new(ErrorKind::TagNotFound);
	/// if let ErrorKind::TagNotFound = not_found.kind() {
	/// 	println!("Where's the tag?");
	/// }
	/// ```
	pub fn kind(&self) -> &ErrorKind {
		&self.kind
	}

	/// Returns the [`Id3v2ErrorKind`], if this is an ID3v2 error
	pub fn id3v2_kind(&self) -> Option<&Id3v2ErrorKind> {
		match &self.kind {
			ErrorKind::Id3v2(err) => Some(err.kind()),
			_ => None,
		}
	}
}

impl std::error::Error for Id3Error {}

impl Debug for Id3Error {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:?}", self.kind)
	}
}

impl From<Id3v2Error> for Id3Error {
	fn from(input: Id3v2Error) -> Self {
		Self {
			kind: ErrorKind::Id3v2(input),
		}
	}
}

impl From<TextEncodingError> for Id3Error {
	fn from(input: TextEncodingError) -> Self {
		Self {
			kind: ErrorKind::TextEncode(input),
		}
	}
}

impl From<std::io::Error> for Id3Error {
	fn from(input: std::io::Error) -> Self {
		Self {
			kind: ErrorKind::Io(input),
		}
	}
}

impl From<std::collections::TryReserveError> for Id3Error {
	fn from(input: TryReserveError) -> Self {
		Self {
			kind: ErrorKind::Alloc(input),
		}
	}
}

impl From<std::convert::Infallible> for Id3Error {
	fn from(input: std::convert::Infallible) -> Self {
		Self {
			kind: ErrorKind::Infallible(input),
		}
	}
}

impl Display for Id3Error {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self.kind {
			// Conversions
			ErrorKind::Io(ref err) => write!(f, "{err}"),
			ErrorKind::Alloc(ref err) => write!(f, "{err}"),

			ErrorKind::FakeTag => write!(f, "Reading: Expected a tag, found invalid data"),
			ErrorKind::TagNotFound => write!(f, "Reading: No ID3v2 header or footer was found"),
			ErrorKind::TextDecode(message) => write!(f, "Text decoding: {message}"),
			ErrorKind::TextEncode(message) => write!(f, "Text encoding: {message}"),
			ErrorKind::Id3v2(ref id3v2_err) => write!(f, "{id3v2_err}"),

			ErrorKind::TooMuchData => write!(
				f,
				"Attempted to read/write an abnormally large amount of data"
			),
			ErrorKind::SizeMismatch => write!(
				f,
				"Encountered an invalid item size, either too big or too small to be valid"
			),

			ErrorKind::Infallible(_) => write!(f, "A expected condition was not upheld"),
		}
	}
}
