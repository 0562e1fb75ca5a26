//! The ID3v2 tag
//!
//! A [`Tag`] is an ordered list of [`Frame`]s, along with the information needed to write it
//! back: its version, flags, extended header, and padding. Duplicate frames are allowed, it is
//! up to the caller to decide which (if any) to keep.
//!
//! See [`read_from`](crate::read_from) for reading tags.

pub mod extended_header;
pub(crate) mod header;
pub(crate) mod read;
mod write;

pub use extended_header::ExtendedHeader;

use crate::MAX_FRAME_COUNT;
use crate::error::{Budget, Result};
use crate::frame::Frame;
use crate::macros::id3v2_err;
use crate::version::Id3v2Version;

/// Flags that apply to the entire tag
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct TagFlags {
	/// Whether the tag has a header
	///
	/// This is only ever `false` for tags rebuilt from their footer, see
	/// [`read_from_end`](crate::read_from_end). Tags are always written with a header.
	pub header: bool,
	/// Indicates that the tag includes a footer (ID3v2.4 only)
	///
	/// A footer will be created if the tag is written. Tags with a footer have no padding.
	pub footer: bool,
	/// Whether or not all frames are unsynchronised
	///
	/// In ID3v2.2 and ID3v2.3, this applies to the entire tag after the header. In ID3v2.4, every
	/// frame is written with [`FrameFlags::unsynchronisation`](crate::frame::FrameFlags::unsynchronisation) set.
	pub unsynchronisation: bool,
	/// Indicates if the tag is in an experimental stage
	pub experimental: bool,
}

impl Default for TagFlags {
	fn default() -> Self {
		Self {
			header: true,
			footer: false,
			unsynchronisation: false,
			experimental: false,
		}
	}
}

/// An ID3v2 tag
///
/// # Examples
///
/// ```rust
/// use id3kit::frame::{Frame, FrameId};
/// use id3kit::{Id3v2Version, Tag};
///
/// # fn main() -> id3kit::error::Result<()> {
/// let mut tag = Tag::new(Id3v2Version::V3);
/// tag.push(Frame::new(FrameId::new("TIT2")?, b"\x00Foo title".to_vec()))?;
/// tag.push(Frame::new(FrameId::new("TPE1")?, b"\x00Bar artist".to_vec()))?;
///
/// assert_eq!(tag.len(), 2);
/// assert!(tag.get("TIT2").is_some());
/// # Ok(()) }
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
	/// The version the tag was read as, and will be written as
	pub version: Id3v2Version,
	/// The tag flags
	pub flags: TagFlags,
	/// The extended header, if any (ID3v2.3 and ID3v2.4 only)
	pub extended_header: Option<ExtendedHeader>,
	/// The number of padding bytes following the frames
	///
	/// See [`WriteOptions::preferred_padding`](crate::config::WriteOptions::preferred_padding)
	pub padding_size: u32,
	frames: Vec<Frame>,
}

impl Default for Tag {
	fn default() -> Self {
		Self::new(Id3v2Version::V4)
	}
}

impl Tag {
	/// Create a new empty tag of `version`
	pub fn new(version: Id3v2Version) -> Self {
		Self {
			version,
			flags: TagFlags::default(),
			extended_header: None,
			padding_size: 0,
			frames: Vec::new(),
		}
	}

	/// All frames, in tag order
	pub fn frames(&self) -> &[Frame] {
		&self.frames
	}

	/// Mutable access to all frames, in tag order
	pub fn frames_mut(&mut self) -> impl Iterator<Item = &mut Frame> {
		self.frames.iter_mut()
	}

	/// The number of frames in the tag
	pub fn len(&self) -> usize {
		self.frames.len()
	}

	/// Whether the tag has no frames
	pub fn is_empty(&self) -> bool {
		self.frames.is_empty()
	}

	/// Gets the first [`Frame`] with the id `id`
	pub fn get(&self, id: &str) -> Option<&Frame> {
		self.frames.iter().find(|f| f.id() == id)
	}

	/// Gets every [`Frame`] with the id `id`
	pub fn get_all<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Frame> + 'a {
		self.frames.iter().filter(move |f| f.id() == id)
	}

	/// Appends a [`Frame`]
	///
	/// # Errors
	///
	/// The tag already holds [`MAX_FRAME_COUNT`] frames
	pub fn push(&mut self, frame: Frame) -> Result<()> {
		self.check_capacity()?;
		self.frames.push(frame);
		Ok(())
	}

	/// Inserts a [`Frame`] at `index`
	///
	/// # Errors
	///
	/// The tag already holds [`MAX_FRAME_COUNT`] frames
	///
	/// # Panics
	///
	/// `index > len`
	pub fn insert(&mut self, index: usize, frame: Frame) -> Result<()> {
		self.check_capacity()?;
		self.frames.insert(index, frame);
		Ok(())
	}

	/// Replaces the first frame with the same id as `frame`, returning it
	///
	/// If there is no such frame, `frame` is appended.
	///
	/// # Errors
	///
	/// `frame` is appended, and the tag already holds [`MAX_FRAME_COUNT`] frames
	///
	/// # Examples
	///
	/// ```rust
	/// use id3kit::frame::{Frame, FrameId};
	/// use id3kit::Tag;
	///
	/// # fn main() -> id3kit::error::Result<()> {
	/// let mut tag = Tag::default();
	/// assert!(tag.replace(Frame::new(FrameId::new("TIT2")?, b"\x00Foo".to_vec()))?.is_none());
	///
	/// let old = tag.replace(Frame::new(FrameId::new("TIT2")?, b"\x00Bar".to_vec()))?;
	/// assert_eq!(old.unwrap().payload().bytes(), b"\x00Foo");
	/// assert_eq!(tag.len(), 1);
	/// # Ok(()) }
	/// ```
	pub fn replace(&mut self, frame: Frame) -> Result<Option<Frame>> {
		match self.frames.iter_mut().find(|f| f.id() == frame.id()) {
			Some(existing) => Ok(Some(std::mem::replace(existing, frame))),
			None => {
				self.push(frame)?;
				Ok(None)
			},
		}
	}

	/// Removes the [`Frame`] at `index`
	pub fn remove(&mut self, index: usize) -> Option<Frame> {
		(index < self.frames.len()).then(|| self.frames.remove(index))
	}

	/// Removes every [`Frame`] with the id `id`
	///
	/// The remaining frames keep their order.
	pub fn remove_id(&mut self, id: &str) -> std::vec::IntoIter<Frame> {
		let (removed, kept) = std::mem::take(&mut self.frames)
			.into_iter()
			.partition::<Vec<_>, _>(|f| f.id() == id);

		self.frames = kept;
		removed.into_iter()
	}

	/// Retains [`Frame`]s by evaluating the predicate
	pub fn retain<P>(&mut self, predicate: P)
	where
		P: FnMut(&Frame) -> bool,
	{
		self.frames.retain(predicate)
	}

	/// Removes all frames
	pub fn clear(&mut self) {
		self.frames.clear();
	}

	fn check_capacity(&self) -> Result<()> {
		if self.frames.len() >= MAX_FRAME_COUNT {
			id3v2_err!(BudgetExceeded(Budget::FrameCount(self.frames.len() + 1)));
		}

		Ok(())
	}
}

impl IntoIterator for Tag {
	type Item = Frame;
	type IntoIter = std::vec::IntoIter<Frame>;

	fn into_iter(self) -> Self::IntoIter {
		self.frames.into_iter()
	}
}

impl<'a> IntoIterator for &'a Tag {
	type Item = &'a Frame;
	type IntoIter = std::slice::Iter<'a, Frame>;

	fn into_iter(self) -> Self::IntoIter {
		self.frames.iter()
	}
}

#[cfg(test)]
mod tests {
	use super::Tag;
	use crate::frame::{Frame, FrameId};

	fn frame(id: &'static str, content: &[u8]) -> Frame {
		Frame::new(FrameId::new(id).unwrap(), content.to_vec())
	}

	#[test_log::test]
	fn duplicates_are_kept() {
		let mut tag = Tag::default();
		tag.push(frame("TPE1", b"\x00Foo")).unwrap();
		tag.push(frame("TIT2", b"\x00Title")).unwrap();
		tag.push(frame("TPE1", b"\x00Bar")).unwrap();

		assert_eq!(tag.get_all("TPE1").count(), 2);
		assert_eq!(tag.get("TPE1").unwrap().payload().bytes(), b"\x00Foo");
	}

	#[test_log::test]
	fn remove_id_keeps_order() {
		let mut tag = Tag::default();
		tag.push(frame("TPE1", b"\x00Foo")).unwrap();
		tag.push(frame("TIT2", b"\x00Title")).unwrap();
		tag.push(frame("TPE1", b"\x00Bar")).unwrap();
		tag.push(frame("TALB", b"\x00Album")).unwrap();

		let removed = tag.remove_id("TPE1").collect::<Vec<_>>();
		assert_eq!(removed.len(), 2);

		let ids = tag.frames().iter().map(|f| f.id().as_str()).collect::<Vec<_>>();
		assert_eq!(ids, ["TIT2", "TALB"]);
	}

	#[test_log::test]
	fn insert_and_remove() {
		let mut tag = Tag::default();
		tag.push(frame("TIT2", b"\x00Title")).unwrap();
		tag.insert(0, frame("TALB", b"\x00Album")).unwrap();

		assert_eq!(tag.frames()[0].id(), "TALB");
		assert_eq!(tag.remove(1).unwrap().id(), "TIT2");
		assert!(tag.remove(1).is_none());

		tag.retain(|f| f.id() != "TALB");
		assert!(tag.is_empty());
	}
}
