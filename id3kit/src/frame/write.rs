use super::header::write_header;
use super::{Frame, FrameFlags, FrameId, OpaqueReason, Payload};
use crate::MAX_FRAME_SIZE;
use crate::capability::Capabilities;
use crate::error::{Budget, Result};
use crate::macros::id3v2_err;
use crate::registry::resolve;
use crate::util::synchsafe::{SynchsafeInteger, unsynchronize};
use crate::version::{ExtraField, Id3v2Version};

use std::borrow::Cow;
use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};

/// Write `frame` as a frame of a `version` tag
///
/// Frames that can't be represented in `version` are discarded, and nothing is written.
pub(crate) fn write_frame<W>(
	writer: &mut W,
	frame: &Frame,
	version: Id3v2Version,
	capabilities: Capabilities<'_>,
) -> Result<()>
where
	W: Write,
{
	let Some(id) = convert_id(&frame.id, version) else {
		log::warn!("Discarding frame: {}, not supported in {version:?}", frame.id);
		return Ok(());
	};

	if frame.payload.is_empty() {
		log::debug!("Discarding empty frame: {id}");
		return Ok(());
	}

	if version == Id3v2Version::V2 {
		return write_v2(writer, &id, &frame.payload);
	}

	let mut flags = frame.flags;
	if version == Id3v2Version::V3 {
		flags.unsynchronisation = false;
	}

	let content = match &frame.payload {
		Payload::Resolved(content) => encode_content(content, &id, &mut flags, version, capabilities)?,
		Payload::Opaque {
			reason: OpaqueReason::Compressed,
			bytes,
		} => {
			if flags.data_length_indicator.is_none() {
				id3v2_err!(MissingDataLengthIndicator);
			}

			flags.compression = true;
			encrypt(Cow::Borrowed(bytes.as_slice()), &id, &mut flags, capabilities)?
		},
		Payload::Opaque {
			reason: OpaqueReason::Encrypted,
			bytes,
		} => {
			if flags.encryption.is_none() {
				id3v2_err!(UnresolvedPayload(OpaqueReason::Encrypted));
			}

			verify_method_symbol(flags)?;
			Cow::Borrowed(bytes.as_slice())
		},
	};

	let content = if flags.unsynchronisation {
		Cow::Owned(unsynchronize(&content))
	} else {
		content
	};

	let extra_fields = extra_fields(flags, version)?;

	let size = extra_fields.len() + content.len();
	if size > MAX_FRAME_SIZE as usize {
		id3v2_err!(BudgetExceeded(Budget::FrameSize(size as u64)));
	}

	log::trace!("Writing frame `{id}`, size: {size}");

	write_header(writer, &id, size as u32, flags, version)?;
	writer.write_all(&extra_fields)?;
	writer.write_all(&content)?;

	Ok(())
}

// Use the equivalent identifier for `version`, if there is one
fn convert_id(id: &FrameId, version: Id3v2Version) -> Option<FrameId> {
	resolve(id.as_str(), version)
		.filter(|resolution| resolution.fits(version))
		.map(|resolution| resolution.id)
}

// ID3v2.2 has no frame flags, content is written plain
fn write_v2<W>(writer: &mut W, id: &FrameId, payload: &Payload) -> Result<()>
where
	W: Write,
{
	let Payload::Resolved(content) = payload else {
		log::warn!("Discarding frame: {id}, ID3v2.2 cannot store encrypted or compressed frames");
		return Ok(());
	};

	if content.len() > MAX_FRAME_SIZE as usize {
		id3v2_err!(BudgetExceeded(Budget::FrameSize(content.len() as u64)));
	}

	write_header(
		writer,
		id,
		content.len() as u32,
		FrameFlags::default(),
		Id3v2Version::V2,
	)?;
	writer.write_all(content)?;

	Ok(())
}

// Apply the frame transformations, in the order compression -> encryption
fn encode_content<'a>(
	content: &'a [u8],
	id: &FrameId,
	flags: &mut FrameFlags,
	version: Id3v2Version,
	capabilities: Capabilities<'_>,
) -> Result<Cow<'a, [u8]>> {
	let mut encoded = Cow::Borrowed(content);

	if flags.compression {
		match capabilities
			.compressor
			.and_then(|compressor| compressor.compress(content))
		{
			Some(compressed) => encoded = Cow::Owned(compressed),
			None => {
				log::warn!("Unable to compress frame `{id}`, writing it uncompressed");
				flags.compression = false;
			},
		}
	}

	let encoded = encrypt(encoded, id, flags, capabilities)?;

	// The data length indicator always describes the plain content
	let indicator_needed = match version {
		Id3v2Version::V4 => flags.compression || flags.data_length_indicator.is_some(),
		_ => flags.compression,
	};
	flags.data_length_indicator = indicator_needed.then_some(content.len() as u32);

	Ok(encoded)
}

fn encrypt<'a>(
	content: Cow<'a, [u8]>,
	id: &FrameId,
	flags: &mut FrameFlags,
	capabilities: Capabilities<'_>,
) -> Result<Cow<'a, [u8]>> {
	let Some(method) = flags.encryption else {
		return Ok(content);
	};

	verify_method_symbol(*flags)?;

	match capabilities
		.encryptor
		.and_then(|encryptor| encryptor.encrypt(method, &content))
	{
		Some(encrypted) => Ok(Cow::Owned(encrypted)),
		None => {
			log::warn!("Unable to encrypt frame `{id}` (method {method:#04X}), writing it unencrypted");
			flags.encryption = None;
			Ok(content)
		},
	}
}

fn verify_method_symbol(flags: FrameFlags) -> Result<()> {
	match flags.encryption {
		Some(method_symbol) if method_symbol < 0x80 => {
			id3v2_err!(InvalidEncryptionMethodSymbol(method_symbol))
		},
		_ => Ok(()),
	}
}

fn extra_fields(flags: FrameFlags, version: Id3v2Version) -> Result<Vec<u8>> {
	let mut fields = Vec::new();

	for field in version.layout().extra_fields {
		match field {
			ExtraField::DecompressedSize if flags.compression => {
				let size = flags.data_length_indicator.unwrap_or_default();
				fields.write_u32::<BigEndian>(size)?;
			},
			ExtraField::EncryptionMethod => {
				if let Some(method) = flags.encryption {
					fields.write_u8(method)?;
				}
			},
			ExtraField::GroupId => {
				if let Some(group) = flags.grouping_identity {
					fields.write_u8(group)?;
				}
			},
			ExtraField::DataLengthIndicator => {
				if let Some(len) = flags.data_length_indicator {
					fields.write_u32::<BigEndian>(len.synch()?)?;
				}
			},
			ExtraField::DecompressedSize => {},
		}
	}

	Ok(fields)
}
