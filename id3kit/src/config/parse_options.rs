/// The parsing strictness mode
///
/// This can be set with [`ParseOptions::parsing_mode`].
///
/// # Examples
///
/// ```rust
/// use id3kit::config::{ParseOptions, ParsingMode};
///
/// // We only want to read spec-compliant tags
/// let parsing_options = ParseOptions::new().parsing_mode(ParsingMode::Strict);
/// ```
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum ParsingMode {
	/// Will eagerly error on invalid input
	///
	/// This mode will eagerly error on any non-spec-compliant input.
	///
	/// ## Examples of behavior
	///
	/// * A frame size that does not land on a frame boundary - The read fails
	/// * A CRC mismatch - The read fails
	/// * Non-zero padding - The read fails
	Strict,
	/// Default mode, less eager to error on recoverably malformed input
	///
	/// This mode will attempt to fill in any holes where possible in otherwise valid, spec-compliant input.
	///
	/// NOTE: A readable input does *not* necessarily make it writeable.
	///
	/// ## Examples of behavior
	///
	/// * A frame size that does not land on a frame boundary - The size is recovered by scanning
	/// * A CRC mismatch - A warning is logged and the tag is kept
	/// * Non-zero padding - Frames are searched for inside of it, otherwise it is skipped
	#[default]
	BestAttempt,
	/// Least eager to error, may produce invalid/partial output
	///
	/// This mode will discard any invalid frames, and ignore the majority of non-fatal errors.
	///
	/// If the input is malformed, the resulting tag may be incomplete.
	///
	/// ## Examples of behavior
	///
	/// * A frame with an invalid identifier - The frame is discarded and the parser moves on
	/// * A frame whose payload could not be read - The tag is truncated at that point
	Relaxed,
}

/// Options to control how id3kit parses a tag
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct ParseOptions {
	pub(crate) parsing_mode: ParsingMode,
	pub(crate) max_junk_bytes: usize,
	pub(crate) verify_crc: bool,
}

impl Default for ParseOptions {
	/// The default implementation for `ParseOptions`
	///
	/// The defaults are as follows:
	///
	/// ```rust,ignore
	/// ParseOptions {
	/// 	parsing_mode: ParsingMode::BestAttempt,
	/// 	max_junk_bytes: 1024,
	/// 	verify_crc: true,
	/// }
	/// ```
	fn default() -> Self {
		Self::new()
	}
}

impl ParseOptions {
	/// Default parsing mode
	pub const DEFAULT_PARSING_MODE: ParsingMode = ParsingMode::BestAttempt;

	/// Default number of junk bytes to read
	pub const DEFAULT_MAX_JUNK_BYTES: usize = 1024;

	/// Creates a new `ParseOptions`, alias for `Default` implementation
	///
	/// See also: [`ParseOptions::default`]
	///
	/// # Examples
	///
	/// ```rust
	/// use id3kit::config::ParseOptions;
	///
	/// let parsing_options = ParseOptions::new();
	/// ```
	#[must_use]
	pub const fn new() -> Self {
		Self {
			parsing_mode: Self::DEFAULT_PARSING_MODE,
			max_junk_bytes: Self::DEFAULT_MAX_JUNK_BYTES,
			verify_crc: true,
		}
	}

	/// The parsing mode to use, see [`ParsingMode`] for details
	///
	/// # Examples
	///
	/// ```rust
	/// use id3kit::config::{ParseOptions, ParsingMode};
	///
	/// // By default, `parsing_mode` is ParsingMode::BestAttempt. Here, we need absolute correctness.
	/// let parsing_options = ParseOptions::new().parsing_mode(ParsingMode::Strict);
	/// ```
	pub fn parsing_mode(&mut self, parsing_mode: ParsingMode) -> Self {
		self.parsing_mode = parsing_mode;
		*self
	}

	/// The maximum number of allowed junk bytes to search
	///
	/// Tags may be surrounded by junk bytes, such as padding remnants or stray audio frames. This sets the
	/// maximum number of junk/unrecognized bytes id3kit will search for a tag header or footer before giving up.
	///
	/// # Examples
	///
	/// ```rust
	/// use id3kit::config::ParseOptions;
	///
	/// // I have files full of junk, I'll double the search window!
	/// let parsing_options = ParseOptions::new().max_junk_bytes(2048);
	/// ```
	pub fn max_junk_bytes(&mut self, max_junk_bytes: usize) -> Self {
		self.max_junk_bytes = max_junk_bytes;
		*self
	}

	/// Whether or not to verify the extended header CRC-32, if one is present
	///
	/// # Examples
	///
	/// ```rust
	/// use id3kit::config::ParseOptions;
	///
	/// // I don't care about tag integrity
	/// let parsing_options = ParseOptions::new().verify_crc(false);
	/// ```
	pub fn verify_crc(&mut self, verify_crc: bool) -> Self {
		self.verify_crc = verify_crc;
		*self
	}
}
