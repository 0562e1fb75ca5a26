use super::header::TagHeader;
use super::{ExtendedHeader, Tag};
use crate::capability::Capabilities;
use crate::config::{ParseOptions, ParsingMode};
use crate::crc;
use crate::error::{IntegrityCheck, Result};
use crate::frame::read::ParsedFrame;
use crate::macros::{id3v2_err, parse_mode_choice};
use crate::scan::find_frame_start;
use crate::util::synchsafe::UnsynchronizedStream;
use crate::version::Id3v2Version;

use std::borrow::Cow;
use std::io::Read;

/// Disassemble the tag content (everything between the header and footer)
pub(crate) fn parse_tag(
	header: TagHeader,
	content: &[u8],
	parse_options: ParseOptions,
	capabilities: Capabilities<'_>,
) -> Result<Tag> {
	log::debug!(
		"Parsing ID3v2 tag, size: {}, version: {:?}",
		header.size,
		header.version
	);

	let parse_mode = parse_options.parsing_mode;

	// ID3v2.4 unsynchronisation is handled per frame
	let content = if header.flags.unsynchronisation && header.version != Id3v2Version::V4 {
		let mut synchronized = Vec::new();
		UnsynchronizedStream::new(content).read_to_end(&mut synchronized)?;
		Cow::Owned(synchronized)
	} else {
		Cow::Borrowed(content)
	};

	let mut tag = Tag::new(header.version);
	tag.flags = header.flags;

	let mut frames_start = 0;
	if header.extended_header {
		let (extended_header, len) = ExtendedHeader::parse(&content, header.version)?;

		log::trace!("Read extended header: {extended_header:?}");

		frames_start = len;
		tag.extended_header = Some(extended_header);
	}

	let region = &content[frames_start..];

	let padding_start = read_frames(&mut tag, region, parse_options, capabilities)?;
	tag.padding_size = (region.len() - padding_start) as u32;

	// The tag flag is reapplied to every frame on write
	if header.version == Id3v2Version::V4 && header.flags.unsynchronisation {
		for frame in &mut tag.frames {
			frame.flags.unsynchronisation = false;
		}
	}

	if tag.flags.footer && tag.padding_size > 0 {
		log::warn!("Found {} bytes of padding in a tag with a footer", tag.padding_size);
	}

	if let Some(extended_header) = tag.extended_header {
		if parse_options.verify_crc {
			verify_crc(extended_header, region, header.version, parse_mode)?;
		}
	}

	Ok(tag)
}

// Returns the offset of the padding in `region`
fn read_frames(
	tag: &mut Tag,
	region: &[u8],
	parse_options: ParseOptions,
	capabilities: Capabilities<'_>,
) -> Result<usize> {
	let version = tag.version;
	let parse_mode = parse_options.parsing_mode;

	let mut pos = 0;
	loop {
		match ParsedFrame::read(region, &mut pos, version, parse_options, capabilities)? {
			ParsedFrame::Next(frame) => {
				log::trace!("Read frame `{}`", frame.id());
				// Errors past `MAX_FRAME_COUNT`
				tag.push(frame)?;
			},
			// No frame content found or ignored due to errors, but we can expect more frames
			ParsedFrame::Skip => {},
			// Everything past this point should be padding
			ParsedFrame::Eof => {
				let padding = &region[pos..];
				if padding.iter().all(|b| *b == 0) {
					return Ok(pos);
				}

				parse_mode_choice!(
					parse_mode,
					STRICT: id3v2_err!(NonZeroPadding),
					DEFAULT: {
						if let Some(next) = find_frame_start(region, pos, region.len(), version) {
							log::warn!("Found a frame in the tag padding, offset: {next}, resuming");
							pos = next;
							continue;
						}

						log::warn!("Encountered non-zero padding, skipping");
						return Ok(region.len());
					}
				);
			},
		}
	}
}

fn verify_crc(
	extended_header: ExtendedHeader,
	region: &[u8],
	version: Id3v2Version,
	parse_mode: ParsingMode,
) -> Result<()> {
	let Some(stored) = extended_header.crc else {
		return Ok(());
	};

	// ID3v2.3 excludes the padding, ID3v2.4 includes it
	let covered = match version {
		Id3v2Version::V3 => {
			let padding = extended_header.padding_size as usize;
			&region[..region.len().saturating_sub(padding)]
		},
		_ => region,
	};

	let computed = crc::crc32(covered);
	if computed == stored {
		return Ok(());
	}

	if parse_mode == ParsingMode::Strict {
		id3v2_err!(IntegrityMismatch(IntegrityCheck::Crc { stored, computed }));
	}

	log::warn!("Tag CRC mismatch, stored: {stored:#010X}, computed: {computed:#010X}");
	Ok(())
}
