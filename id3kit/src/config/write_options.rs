/// Options to control how id3kit writes a tag
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct WriteOptions {
	pub(crate) preferred_padding: Option<u32>,
	pub(crate) respect_read_only: bool,
}

impl WriteOptions {
	/// Creates a new `WriteOptions`, alias for `Default` implementation
	///
	/// See also: [`WriteOptions::default`]
	///
	/// # Examples
	///
	/// ```rust
	/// use id3kit::config::WriteOptions;
	///
	/// let write_options = WriteOptions::new();
	/// ```
	pub const fn new() -> Self {
		Self {
			preferred_padding: None,
			respect_read_only: true,
		}
	}

	/// Set the preferred padding size in bytes
	///
	/// By default, the padding size of the [`Tag`](crate::tag::Tag) itself is used.
	///
	/// NOTES:
	///
	/// * Tags with a footer never carry padding
	/// * The actual padding size may be smaller than this value, as a tag may not exceed
	///   [`MAX_TAG_SIZE`](crate::MAX_TAG_SIZE)
	///
	/// # Examples
	///
	/// ```rust
	/// use id3kit::config::WriteOptions;
	///
	/// // I really don't want my files rewritten, so I'll reserve plenty of padding!
	/// let options = WriteOptions::new().preferred_padding(2048);
	///
	/// // ...Or I don't want padding under any circumstances!
	/// let options = WriteOptions::new().preferred_padding(0);
	/// ```
	pub fn preferred_padding(mut self, preferred_padding: u32) -> Self {
		self.preferred_padding = Some(preferred_padding);
		self
	}

	/// Whether to respect read-only frames
	///
	/// When replacing a tag in place (see [`Tag::save_to`](crate::tag::Tag::save_to)), frames of
	/// the existing tag marked as read-only will take priority over new frames with the same identifier.
	///
	/// # Examples
	///
	/// ```rust
	/// use id3kit::config::WriteOptions;
	///
	/// // I don't care about read-only frames, I want to write my new frames!
	/// let options = WriteOptions::new().respect_read_only(false);
	/// ```
	pub fn respect_read_only(mut self, respect_read_only: bool) -> Self {
		self.respect_read_only = respect_read_only;
		self
	}
}

impl Default for WriteOptions {
	/// The default implementation for `WriteOptions`
	///
	/// The defaults are as follows:
	///
	/// ```rust,ignore
	/// WriteOptions {
	///     preferred_padding: None,
	///     respect_read_only: true,
	/// }
	/// ```
	fn default() -> Self {
		Self::new()
	}
}
