use super::header::TagHeader;
use super::{Tag, TagFlags};
use crate::MAX_TAG_SIZE;
use crate::capability::Capabilities;
use crate::config::{ParseOptions, WriteOptions};
use crate::crc;
use crate::error::{Budget, Id3Error, Result};
use crate::frame::write::write_frame;
use crate::locate::{locate_header, read_tag_content};
use crate::macros::{id3v2_err, try_vec};
use crate::util::io::{FileLike, Length, Truncate, splice_in_place};
use crate::util::synchsafe::unsynchronize;
use crate::version::Id3v2Version;

use std::borrow::Cow;
use std::collections::HashSet;
use std::io::Write;

impl Tag {
	/// Assemble the tag
	///
	/// An empty `Vec` is returned if no frames can be written.
	///
	/// # Errors
	///
	/// * A frame could not be written, see [`FrameFlags`](crate::frame::FrameFlags)
	/// * The tag exceeds [`MAX_TAG_SIZE`]
	///
	/// # Examples
	///
	/// ```rust
	/// use id3kit::capability::Capabilities;
	/// use id3kit::config::WriteOptions;
	/// use id3kit::frame::{Frame, FrameId};
	/// use id3kit::{Id3v2Version, Tag};
	///
	/// # fn main() -> id3kit::error::Result<()> {
	/// let mut tag = Tag::new(Id3v2Version::V3);
	/// tag.push(Frame::new(FrameId::new("TIT2")?, b"\x00Foo".to_vec()))?;
	///
	/// let bytes = tag.as_bytes(WriteOptions::new().preferred_padding(0), Capabilities::new())?;
	/// assert_eq!(&bytes[..10], b"ID3\x03\x00\x00\x00\x00\x00\x0E");
	/// # Ok(()) }
	/// ```
	pub fn as_bytes(
		&self,
		write_options: WriteOptions,
		capabilities: Capabilities<'_>,
	) -> Result<Vec<u8>> {
		let version = self.version;

		let mut frames = Vec::new();
		for frame in &self.frames {
			// ID3v2.4 unsynchronisation is applied per frame
			let frame = if version == Id3v2Version::V4 && self.flags.unsynchronisation {
				let mut frame = frame.clone();
				frame.flags.unsynchronisation = true;
				Cow::Owned(frame)
			} else {
				Cow::Borrowed(frame)
			};

			write_frame(&mut frames, &frame, version, capabilities)?;
		}

		// We are stripping the tag
		if frames.is_empty() {
			log::debug!("No frames to write, tag will be empty");
			return Ok(Vec::new());
		}

		let has_footer = self.flags.footer && version == Id3v2Version::V4;

		// https://mutagen-specs.readthedocs.io/en/latest/id3/id3v2.4.0-structure.html#padding:
		//
		// "[A tag] MUST NOT have any padding when a tag footer is added to the tag"
		let padding_len = if has_footer {
			log::trace!("Footer requested, not padding tag");
			0
		} else {
			write_options
				.preferred_padding
				.unwrap_or(self.padding_size)
		};

		let frames_len = frames.len();
		frames.extend_from_slice(&try_vec![0; padding_len as usize]);

		let mut extended_header = self.extended_header;
		if version == Id3v2Version::V2 && extended_header.take().is_some() {
			log::warn!("ID3v2.2 tags have no extended header, discarding it");
		}

		let mut content = Vec::new();
		if let Some(mut extended_header) = extended_header {
			extended_header.padding_size = padding_len;

			if extended_header.crc_present {
				let covered = match version {
					Id3v2Version::V3 => &frames[..frames_len],
					_ => &frames[..],
				};

				extended_header.crc = Some(crc::crc32(covered));
			}

			content.extend_from_slice(&extended_header.as_bytes(version)?);
		}

		content.extend_from_slice(&frames);

		if self.flags.unsynchronisation && version != Id3v2Version::V4 {
			content = unsynchronize(&content);
		}

		if content.len() > MAX_TAG_SIZE as usize {
			id3v2_err!(BudgetExceeded(Budget::TagSize(content.len() as u64)));
		}

		let header = TagHeader {
			version,
			flags: TagFlags {
				header: true,
				footer: has_footer,
				..self.flags
			},
			extended_header: extended_header.is_some(),
			size: content.len() as u32,
		};

		let mut tag = Vec::with_capacity(content.len() + 20);
		header.write(&mut tag)?;
		tag.append(&mut content);

		if has_footer {
			header.write_footer(&mut tag)?;
		}

		log::debug!("Assembled {version:?} tag, size: {}", tag.len());
		Ok(tag)
	}

	/// Write the tag to `writer`
	///
	/// # Errors
	///
	/// * See [`Tag::as_bytes`]
	/// * `writer` could not be written to
	pub fn dump_to<W: Write>(
		&self,
		writer: &mut W,
		write_options: WriteOptions,
		capabilities: Capabilities<'_>,
	) -> Result<()> {
		let bytes = self.as_bytes(write_options, capabilities)?;
		writer.write_all(&bytes)?;
		Ok(())
	}

	/// Write the tag to the start of `file`, replacing any existing leading tag
	///
	/// The rest of the file is kept as-is. If the tag is empty, any existing tag is removed.
	///
	/// # Errors
	///
	/// * See [`Tag::as_bytes`]
	/// * `file` could not be read or written
	pub fn save_to<F>(
		&self,
		file: &mut F,
		write_options: WriteOptions,
		capabilities: Capabilities<'_>,
	) -> Result<()>
	where
		F: FileLike,
		Id3Error: From<<F as Truncate>::Error>,
		Id3Error: From<<F as Length>::Error>,
	{
		file.rewind()?;

		let mut existing_range = 0..0;
		let mut tag = Cow::Borrowed(self);

		if let Some((start, header)) = locate_header(file, 0)? {
			existing_range = start..start + header.full_tag_size();
			let content = read_tag_content(file, header)?;

			if write_options.respect_read_only {
				let parse_options = ParseOptions::new();
				match super::read::parse_tag(header, &content, parse_options, capabilities) {
					Ok(existing) => {
						if let Some(merged) = keep_read_only(self, existing)? {
							tag = Cow::Owned(merged);
						}
					},
					Err(err) => log::warn!("Unable to read the existing tag, overwriting it: {err}"),
				}
			}
		}

		let bytes = tag.as_bytes(write_options, capabilities)?;

		log::debug!(
			"Replacing {} bytes with a {} byte tag",
			existing_range.end - existing_range.start,
			bytes.len()
		);

		splice_in_place(file, existing_range.start, existing_range.end, &bytes)
	}

	/// Remove the leading tag from `file`, if there is one
	///
	/// # Errors
	///
	/// `file` could not be read or written
	pub fn remove_from<F>(file: &mut F) -> Result<()>
	where
		F: FileLike,
		Id3Error: From<<F as Truncate>::Error>,
		Id3Error: From<<F as Length>::Error>,
	{
		file.rewind()?;

		let Some((start, header)) = locate_header(file, 0)? else {
			log::debug!("No tag to remove");
			return Ok(());
		};

		splice_in_place(file, start, start + header.full_tag_size(), &[])
	}
}

// Read only frames of the existing tag replace new frames with the same id
fn keep_read_only(tag: &Tag, existing: Tag) -> Result<Option<Tag>> {
	let read_only = existing
		.into_iter()
		.filter(|frame| frame.flags.read_only)
		.collect::<Vec<_>>();

	if read_only.is_empty() {
		return Ok(None);
	}

	let ids = read_only
		.iter()
		.map(|frame| frame.id().clone())
		.collect::<HashSet<_>>();

	let mut merged = tag.clone();
	merged.retain(|frame| !ids.contains(frame.id()));

	for frame in read_only {
		log::debug!("Keeping read only frame `{}`", frame.id());
		merged.push(frame)?;
	}

	Ok(Some(merged))
}
