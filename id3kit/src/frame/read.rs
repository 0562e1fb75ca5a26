use super::header::{FrameHeader, HeaderRead, parse_header};
use super::{Frame, FrameFlags, FrameId, OpaqueReason, Payload, interpret_size};
use crate::MAX_FRAME_SIZE;
use crate::capability::Capabilities;
use crate::config::{ParseOptions, ParsingMode};
use crate::error::{Budget, Id3v2Error, Id3v2ErrorKind, IntegrityCheck, Result};
use crate::macros::{id3v2_err, try_vec};
use crate::scan::{find_frame_start, is_frame_start};
use crate::util::synchsafe::{decode_synchsafe, synchronize};
use crate::version::{ExtraField, Id3v2Version};

use byteorder::{BigEndian, ByteOrder};

pub(crate) enum ParsedFrame {
	Next(Frame),
	Skip,
	Eof,
}

impl ParsedFrame {
	/// Read the frame starting at `pos` in the frame region `body`
	///
	/// On return, `pos` is positioned at the next candidate frame. On `Eof`, everything from
	/// `pos` onward is padding.
	pub(crate) fn read(
		body: &[u8],
		pos: &mut usize,
		version: Id3v2Version,
		parse_options: ParseOptions,
		capabilities: Capabilities<'_>,
	) -> Result<Self> {
		let start = *pos;
		let parse_mode = parse_options.parsing_mode;

		let header = match parse_header(&body[start..], version) {
			Ok(HeaderRead::Header(header)) => header,
			Ok(HeaderRead::Padding | HeaderRead::Eof) => return Ok(Self::Eof),
			Err(err) => {
				if parse_mode == ParsingMode::Strict {
					return Err(err);
				}

				log::warn!("Failed to read frame header, scanning for the next frame: {err}");

				return match find_frame_start(body, start + 1, body.len(), version) {
					Some(next) => {
						*pos = next;
						Ok(Self::Skip)
					},
					None => {
						log::warn!("No frames found after offset {start}, discarding the rest of the tag");
						*pos = body.len();
						Ok(Self::Eof)
					},
				};
			},
		};

		let content_start = start + version.layout().header_len();
		let size = frame_size(body, content_start, &header, version, parse_mode)?;

		// The frame boundary is known, any further errors only affect this frame
		*pos = content_start + size;

		if size == 0 {
			if parse_mode == ParsingMode::Strict {
				id3v2_err!(EmptyFrame(header.id));
			}

			log::debug!("Encountered a zero length frame, skipping");
			return Ok(Self::Skip);
		}

		let content = &body[content_start..content_start + size];
		match read_content(content, header.id, header.flags, version, parse_mode, capabilities) {
			Ok(frame) => Ok(Self::Next(frame)),
			Err(err) if parse_mode != ParsingMode::Strict => {
				log::warn!("Failed to read frame, skipping: {err}");
				Ok(Self::Skip)
			},
			Err(err) => Err(err),
		}
	}
}

// Determine the real size of the frame content, starting at `content_start`
fn frame_size(
	body: &[u8],
	content_start: usize,
	header: &FrameHeader,
	version: Id3v2Version,
	parse_mode: ParsingMode,
) -> Result<usize> {
	let layout = version.layout();
	let remaining = body.len() - content_start;

	let declared = interpret_size(header.raw_size(layout), layout.synchsafe_size);
	if declared > MAX_FRAME_SIZE {
		if parse_mode == ParsingMode::Strict {
			id3v2_err!(BudgetExceeded(Budget::FrameSize(u64::from(declared))));
		}

		log::warn!("Frame `{}` declares a size of {declared}, exceeding the format maximum", header.id);
	} else if declared as usize <= remaining
		&& plausible_end(body, content_start + declared as usize, version)
	{
		return Ok(declared as usize);
	}

	let recovered = recover_boundary(body, content_start, header, version);
	if parse_mode == ParsingMode::Strict {
		return Err(Id3v2Error::new(Id3v2ErrorKind::SizeInconsistent {
			declared,
			recovered: recovered as u32,
		})
		.into());
	}

	log::warn!(
		"Frame `{}` has an inconsistent size, resizing from {declared} to {recovered}",
		header.id
	);

	Ok(recovered)
}

fn recover_boundary(
	body: &[u8],
	content_start: usize,
	header: &FrameHeader,
	version: Id3v2Version,
) -> usize {
	let remaining = body.len() - content_start;

	// Plenty of ID3v2.4 writers store plain integers
	if version == Id3v2Version::V4 {
		let plain = header.plain_size() as usize;
		if plain <= remaining && plausible_end(body, content_start + plain, version) {
			return plain;
		}
	}

	// Frames have at least 1 byte of content
	match find_frame_start(body, content_start + 1, body.len(), version) {
		Some(next) => next - content_start,
		None => remaining,
	}
}

fn plausible_end(body: &[u8], end: usize, version: Id3v2Version) -> bool {
	match body.get(end) {
		None => end == body.len(),
		Some(0) => true,
		Some(_) => is_frame_start(body, end, version),
	}
}

fn read_content(
	content: &[u8],
	id: FrameId,
	mut flags: FrameFlags,
	version: Id3v2Version,
	parse_mode: ParsingMode,
	capabilities: Capabilities<'_>,
) -> Result<Frame> {
	let mut offset = 0;
	for field in version.layout().extra_fields {
		let present = match field {
			ExtraField::DecompressedSize => flags.compression,
			ExtraField::EncryptionMethod => flags.encryption.is_some(),
			ExtraField::GroupId => flags.grouping_identity.is_some(),
			// For some reason, no one can follow the spec, so while a data length indicator is *written*
			// the flag **isn't always set**
			ExtraField::DataLengthIndicator => {
				flags.data_length_indicator.is_some() || flags.compression
			},
		};

		if !present {
			continue;
		}

		let Some(value) = content.get(offset..offset + field.len()) else {
			id3v2_err!(BadFrameLength);
		};

		log::trace!("Reading {field:?} for frame `{id}`");
		match field {
			ExtraField::DecompressedSize => {
				flags.data_length_indicator = Some(BigEndian::read_u32(value))
			},
			ExtraField::EncryptionMethod => flags.encryption = Some(value[0]),
			ExtraField::GroupId => flags.grouping_identity = Some(value[0]),
			ExtraField::DataLengthIndicator => {
				flags.data_length_indicator = Some(decode_synchsafe(value) as u32)
			},
		}

		offset += field.len();
	}

	// Frames must have at least 1 byte, *after* all of the additional data flags can provide
	let raw = &content[offset..];
	if raw.is_empty() {
		id3v2_err!(BadFrameLength);
	}

	let data = if flags.unsynchronisation {
		synchronize(raw)
	} else {
		let mut data = try_vec![0; raw.len()];
		data.copy_from_slice(raw);
		data
	};

	let payload = resolve_payload(data, &id, flags, parse_mode, capabilities)?;

	// Derived from the decompressed content, and recomputed on write
	if flags.compression && !payload.is_opaque() {
		flags.data_length_indicator = None;
	}

	Ok(Frame { id, flags, payload })
}

// Reverse the frame transformations, in the order encryption -> compression
fn resolve_payload(
	mut data: Vec<u8>,
	id: &FrameId,
	flags: FrameFlags,
	parse_mode: ParsingMode,
	capabilities: Capabilities<'_>,
) -> Result<Payload> {
	if let Some(method) = flags.encryption {
		let decrypted = capabilities
			.decryptor
			.and_then(|decryptor| decryptor.decrypt(method, &data));

		match decrypted {
			Some(decrypted) => data = decrypted,
			None => {
				log::warn!("Unable to decrypt frame `{id}` (method {method:#04X}), keeping it encrypted");
				return Ok(Payload::Opaque {
					reason: OpaqueReason::Encrypted,
					bytes: data,
				});
			},
		}
	}

	if !flags.compression {
		return Ok(Payload::Resolved(data));
	}

	let Some(decompressed) = capabilities
		.decompressor
		.and_then(|decompressor| decompressor.decompress(&data))
	else {
		log::warn!("Unable to decompress frame `{id}`, keeping it compressed");
		return Ok(Payload::Opaque {
			reason: OpaqueReason::Compressed,
			bytes: data,
		});
	};

	if let Some(declared) = flags.data_length_indicator {
		if declared as usize != decompressed.len() {
			if parse_mode == ParsingMode::Strict {
				id3v2_err!(IntegrityMismatch(IntegrityCheck::DecompressedSize {
					declared,
					actual: decompressed.len(),
				}));
			}

			log::warn!(
				"Frame `{id}` decompressed to {} bytes, expected {declared}, keeping it compressed",
				decompressed.len()
			);
			return Ok(Payload::Opaque {
				reason: OpaqueReason::Compressed,
				bytes: data,
			});
		}
	}

	Ok(Payload::Resolved(decompressed))
}
