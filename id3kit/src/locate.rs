//! Finding tags in a stream
//!
//! Tags are usually found at the very start of a stream, with tags appended to the end of a
//! stream (ID3v2.4 only) being identified by their footer. In both cases, some junk data is
//! tolerated between the tag and the stream boundary, see [`ParseOptions::max_junk_bytes`].

use crate::capability::Capabilities;
use crate::config::ParseOptions;
use crate::error::Result;
use crate::macros::{err, try_vec};
use crate::scan::{HEADER_MARKER, TAG_HEADER_LEN, find_tag_header, is_tag_marker, rfind_tag_footer};
use crate::tag::Tag;
use crate::tag::header::TagHeader;
use crate::tag::read::parse_tag;

use std::io::{Read, Seek, SeekFrom};

/// Read a tag from the current position of `reader`
///
/// The tag may be preceded by up to [`ParseOptions::max_junk_bytes`] bytes of junk. On success,
/// the reader is positioned at the end of the tag.
///
/// # Errors
///
/// * No tag was found, [`ErrorKind::TagNotFound`](crate::error::ErrorKind::TagNotFound)
/// * The tag could not be read, see [`ParseOptions::parsing_mode`]
///
/// # Examples
///
/// ```rust
/// use id3kit::capability::Capabilities;
/// use id3kit::config::ParseOptions;
/// use std::io::Cursor;
///
/// # fn main() -> id3kit::error::Result<()> {
/// let mut data = b"junkID3\x04\x00\x00\x00\x00\x00\x0E".to_vec();
/// data.extend_from_slice(b"TIT2\x00\x00\x00\x04\x00\x00\x00Foo");
///
/// let tag = id3kit::read_from(&mut Cursor::new(data), ParseOptions::new(), Capabilities::new())?;
/// assert_eq!(tag.get("TIT2").unwrap().payload().bytes(), b"\x00Foo");
/// # Ok(()) }
/// ```
pub fn read_from<R>(
	reader: &mut R,
	parse_options: ParseOptions,
	capabilities: Capabilities<'_>,
) -> Result<Tag>
where
	R: Read + Seek,
{
	let Some((_, header)) = locate_header(reader, parse_options.max_junk_bytes)? else {
		err!(TagNotFound);
	};

	let content = read_tag_content(reader, header)?;
	parse_tag(header, &content, parse_options, capabilities)
}

/// Read every consecutive tag from the current position of `reader`
///
/// Each tag may be preceded by up to [`ParseOptions::max_junk_bytes`] bytes of junk. Reading stops
/// at the first position where no tag is found.
///
/// # Errors
///
/// A tag could not be read, see [`read_from`]
pub fn read_all_from<R>(
	reader: &mut R,
	parse_options: ParseOptions,
	capabilities: Capabilities<'_>,
) -> Result<Vec<Tag>>
where
	R: Read + Seek,
{
	let mut tags = Vec::new();
	while let Some((start, header)) = locate_header(reader, parse_options.max_junk_bytes)? {
		log::debug!("Reading tag #{} at offset {start}", tags.len() + 1);

		let content = read_tag_content(reader, header)?;
		tags.push(parse_tag(header, &content, parse_options, capabilities)?);
	}

	Ok(tags)
}

/// Read a tag from the end of `reader`, using its footer
///
/// The footer may be followed by up to [`ParseOptions::max_junk_bytes`] bytes of junk. If the tag
/// header can't be found, the tag is rebuilt from the footer alone, and [`TagFlags::header`](crate::tag::TagFlags::header)
/// will be `false`. On success, the reader is positioned at the start of the tag.
///
/// # Errors
///
/// * No footer was found, [`ErrorKind::TagNotFound`](crate::error::ErrorKind::TagNotFound)
/// * The footer declares a size larger than the stream
/// * The tag could not be read, see [`ParseOptions::parsing_mode`]
pub fn read_from_end<R>(
	reader: &mut R,
	parse_options: ParseOptions,
	capabilities: Capabilities<'_>,
) -> Result<Tag>
where
	R: Read + Seek,
{
	let max_junk_bytes = parse_options.max_junk_bytes as u64;

	let end = reader.seek(SeekFrom::End(0))?;
	let window_len = max_junk_bytes.saturating_add(TAG_HEADER_LEN as u64).min(end);
	let window_start = end - window_len;

	log::debug!("Searching for an ID3v2 footer after offset: {window_start}");

	let window = read_window(reader, window_start, window_len)?;

	let mut search_end = window.len();
	let (footer_offset, footer) = loop {
		let Some(offset) = rfind_tag_footer(&window[..search_end]) else {
			err!(TagNotFound);
		};

		match header_bytes(&window, offset).map(|bytes| TagHeader::parse_footer(&bytes)) {
			Some(Ok(footer)) => break (offset, footer),
			Some(Err(e)) => log::debug!("Rejected tag footer: {e}"),
			None => {},
		}

		search_end = offset + TAG_HEADER_LEN - 1;
	};

	let footer_start = window_start + footer_offset as u64;
	let size = u64::from(footer.size);

	if footer_offset + TAG_HEADER_LEN < window.len() {
		log::warn!(
			"Found an ID3v2 footer followed by junk data, offset: {}",
			footer_offset + TAG_HEADER_LEN
		);
	}

	let Some(content_start) = footer_start.checked_sub(size) else {
		err!(SizeMismatch);
	};

	if let Some((header_start, header)) =
		find_matching_header(reader, footer_start, footer, max_junk_bytes)?
	{
		reader.seek(SeekFrom::Start(header_start + TAG_HEADER_LEN as u64))?;
		let content = read_tag_content(reader, header)?;

		let tag = parse_tag(header, &content, parse_options, capabilities)?;
		reader.seek(SeekFrom::Start(header_start))?;
		return Ok(tag);
	}

	log::warn!("No header found for the ID3v2 footer, rebuilding the tag from the footer");

	let mut header = footer;
	header.flags.header = false;

	reader.seek(SeekFrom::Start(content_start))?;
	let mut content = try_vec![0; footer.size as usize];
	reader.read_exact(&mut content)?;

	let tag = parse_tag(header, &content, parse_options, capabilities)?;
	reader.seek(SeekFrom::Start(content_start))?;
	Ok(tag)
}

// Search for the header matching the footer at `footer_start`, at the expected offset or within
// `max_junk_bytes` before it
fn find_matching_header<R>(
	reader: &mut R,
	footer_start: u64,
	footer: TagHeader,
	max_junk_bytes: u64,
) -> Result<Option<(u64, TagHeader)>>
where
	R: Read + Seek,
{
	let header_len = TAG_HEADER_LEN as u64;
	let Some(expected) = footer_start.checked_sub(u64::from(footer.size) + header_len) else {
		return Ok(None);
	};

	let search_start = expected.saturating_sub(max_junk_bytes);
	let window = read_window(reader, search_start, expected - search_start + header_len)?;

	for offset in (0..=(expected - search_start) as usize).rev() {
		let Some(bytes) = header_bytes(&window, offset) else {
			continue;
		};

		if !is_tag_marker(&bytes, HEADER_MARKER) {
			continue;
		}

		let Ok(header) = TagHeader::parse(&bytes) else {
			continue;
		};

		let header_start = search_start + offset as u64;
		if header.version == footer.version
			&& header.flags.footer
			&& header_start + header_len + u64::from(header.size) == footer_start
		{
			if header_start != expected {
				log::warn!("Tag header and footer sizes differ, using the header");
			}

			return Ok(Some((header_start, header)));
		}
	}

	Ok(None)
}

/// Find a tag header within `max_junk_bytes` of the current position
///
/// On success, the reader is positioned after the header. Otherwise, it is left at its
/// original position.
pub(crate) fn locate_header<R>(
	reader: &mut R,
	max_junk_bytes: usize,
) -> Result<Option<(u64, TagHeader)>>
where
	R: Read + Seek,
{
	let start = reader.stream_position()?;
	let stream_len = reader.seek(SeekFrom::End(0))?;

	log::debug!("Searching for an ID3v2 tag at offset: {start}");

	let window_len = max_junk_bytes.saturating_add(TAG_HEADER_LEN) as u64;
	let window = read_window(reader, start, window_len)?;

	let mut search_start = 0;
	while let Some(found) = find_tag_header(&window[search_start..]) {
		let offset = search_start + found;
		if offset > max_junk_bytes {
			break;
		}

		let parsed = header_bytes(&window, offset).map(|bytes| TagHeader::parse(&bytes));
		match parsed {
			Some(Ok(header)) => {
				let header_start = start + offset as u64;
				if tag_end(header_start, header) > stream_len {
					log::debug!("Rejected tag header at offset {offset}: tag extends past the stream");
					search_start = offset + 1;
					continue;
				}

				if offset > 0 {
					log::warn!("Found an ID3v2 tag preceded by junk data, offset: {offset}");
				}

				reader.seek(SeekFrom::Start(header_start + TAG_HEADER_LEN as u64))?;
				return Ok(Some((header_start, header)));
			},
			Some(Err(e)) => log::debug!("Rejected tag header at offset {offset}: {e}"),
			None => {},
		}

		search_start = offset + 1;
	}

	reader.seek(SeekFrom::Start(start))?;
	Ok(None)
}

// The end of the tag starting at `header_start`, including its footer
fn tag_end(header_start: u64, header: TagHeader) -> u64 {
	let mut end = header_start + TAG_HEADER_LEN as u64 + u64::from(header.size);
	if header.flags.footer {
		end += TAG_HEADER_LEN as u64;
	}

	end
}

/// Read the content of the tag described by `header`, skipping its footer
///
/// The reader must be positioned directly after the header.
pub(crate) fn read_tag_content<R>(reader: &mut R, header: TagHeader) -> Result<Vec<u8>>
where
	R: Read + Seek,
{
	let mut content = try_vec![0; header.size as usize];
	reader.read_exact(&mut content)?;

	if header.flags.footer {
		reader.seek(SeekFrom::Current(TAG_HEADER_LEN as i64))?;
	}

	Ok(content)
}

fn read_window<R>(reader: &mut R, start: u64, len: u64) -> Result<Vec<u8>>
where
	R: Read + Seek,
{
	reader.seek(SeekFrom::Start(start))?;

	let mut window = Vec::new();
	reader.by_ref().take(len).read_to_end(&mut window)?;
	Ok(window)
}

fn header_bytes(window: &[u8], offset: usize) -> Option<[u8; TAG_HEADER_LEN]> {
	window.get(offset..offset + TAG_HEADER_LEN)?.try_into().ok()
}
