use crate::util::{assemble, read, strict, tag_with};

use id3kit::capability::Capabilities;
use id3kit::config::ParseOptions;
use id3kit::error::{ErrorKind, Id3v2ErrorKind, IntegrityCheck};
use id3kit::frame::{FrameFlags, Payload};
use id3kit::registry::TextFrame;
use id3kit::tag::ExtendedHeader;
use id3kit::{Id3v2Version, Tag, TextEncoding};

use std::io::{Cursor, Seek as _};

#[test_log::test]
fn v3_text_frame_round_trip() {
	let mut tag = Tag::new(Id3v2Version::V3);

	let title = TextFrame::new(
		id3kit::frame::FrameId::new("TIT2").unwrap(),
		TextEncoding::UTF16,
		String::from("Foo title"),
	);
	tag.push(id3kit::frame::Frame::from_kind(&title, Id3v2Version::V3).unwrap())
		.unwrap();

	let bytes = assemble(&tag);
	assert_eq!(&bytes[..5], b"ID3\x03\x00");

	let read_tag = read(&bytes, strict()).unwrap();
	assert_eq!(read_tag.version, Id3v2Version::V3);
	assert_eq!(read_tag.len(), 1);

	let frame = read_tag.get("TIT2").unwrap();
	let decoded: TextFrame = frame.decode_as(Id3v2Version::V3).unwrap();
	assert_eq!(decoded, title);
}

#[test_log::test]
fn v2_frame_is_converted_for_v4() {
	let tag = tag_with(Id3v2Version::V4, "TT2", b"\x00Foo");

	let bytes = assemble(&tag);
	let read_tag = read(&bytes, strict()).unwrap();

	assert!(read_tag.get("TT2").is_none());
	assert_eq!(
		read_tag.get("TIT2").unwrap().payload(),
		&Payload::Resolved(b"\x00Foo".to_vec())
	);
}

#[test_log::test]
fn v2_tag() {
	let bytes = b"ID3\x02\x00\x00\x00\x00\x00\x0BTT2\x00\x00\x05\x00Foo\x00";

	let tag = read(bytes, strict()).unwrap();
	assert_eq!(tag.version, Id3v2Version::V2);

	let frame = tag.get("TT2").unwrap();
	assert_eq!(frame.payload().bytes(), b"\x00Foo\x00");
	assert_eq!(frame.flags, FrameFlags::default());
}

#[test_log::test]
fn v3_crc_matches_frames() {
	let mut tag = tag_with(Id3v2Version::V3, "TIT2", b"\x00Foo");
	tag.extended_header = Some(ExtendedHeader {
		crc_present: true,
		..ExtendedHeader::default()
	});

	let bytes = tag
		.as_bytes(
			id3kit::config::WriteOptions::new().preferred_padding(8),
			Capabilities::new(),
		)
		.unwrap();

	// [header: 10][extended header: 14][frame: 14][padding: 8]
	assert_eq!(bytes.len(), 46);
	let frame = &bytes[24..38];
	assert_eq!(frame, b"TIT2\x00\x00\x00\x04\x00\x00\x00Foo");

	let stored = u32::from_be_bytes(bytes[20..24].try_into().unwrap());
	assert_eq!(stored, id3kit::crc::crc32(frame));

	let read_tag = read(&bytes, strict()).unwrap();
	let extended_header = read_tag.extended_header.unwrap();
	assert_eq!(extended_header.crc, Some(stored));
	assert_eq!(extended_header.padding_size, 8);
	assert_eq!(read_tag.padding_size, 8);
}

#[test_log::test]
fn corrupt_crc() {
	let mut tag = tag_with(Id3v2Version::V4, "TIT2", b"\x00Foo");
	tag.extended_header = Some(ExtendedHeader {
		crc_present: true,
		..ExtendedHeader::default()
	});

	let mut bytes = assemble(&tag);
	let last = bytes.len() - 1;
	bytes[last] = b'X';

	let err = read(&bytes, strict()).unwrap_err();
	assert!(matches!(
		err.id3v2_kind(),
		Some(Id3v2ErrorKind::IntegrityMismatch(IntegrityCheck::Crc { .. }))
	));

	// Verification can be disabled
	let tag = read(&bytes, strict().verify_crc(false)).unwrap();
	assert_eq!(tag.get("TIT2").unwrap().payload().bytes(), b"\x00FoX");
}

#[cfg(feature = "id3v2_compression_support")]
#[test_log::test]
fn compressed_frame_with_wrong_size() {
	use id3kit::frame::{Frame, FrameId, OpaqueReason};

	let mut frame = Frame::new(FrameId::new("TIT2").unwrap(), b"\x00Foo title".to_vec());
	frame.flags.compression = true;

	let mut tag = Tag::new(Id3v2Version::V4);
	tag.push(frame).unwrap();

	let mut bytes = tag
		.as_bytes(
			id3kit::config::WriteOptions::new().preferred_padding(0),
			Capabilities::zlib(),
		)
		.unwrap();

	// Data length indicator, directly after the frame header
	assert_eq!(&bytes[20..24], &[0, 0, 0, 10]);
	bytes[23] = 99;

	let err = id3kit::read_from(&mut Cursor::new(&bytes), strict(), Capabilities::zlib())
		.unwrap_err();
	assert_eq!(
		err.id3v2_kind(),
		Some(&Id3v2ErrorKind::IntegrityMismatch(
			IntegrityCheck::DecompressedSize {
				declared: 99,
				actual: 10,
			}
		))
	);

	let tag =
		id3kit::read_from(&mut Cursor::new(&bytes), ParseOptions::new(), Capabilities::zlib())
			.unwrap();
	let frame = tag.get("TIT2").unwrap();
	assert!(matches!(
		frame.payload(),
		Payload::Opaque {
			reason: OpaqueReason::Compressed,
			..
		}
	));
	assert_eq!(frame.flags.data_length_indicator, Some(99));
}

#[cfg(feature = "id3v2_compression_support")]
#[test_log::test]
fn compressed_frame_without_decompressor() {
	use id3kit::frame::{Frame, FrameId};

	let mut frame = Frame::new(FrameId::new("TIT2").unwrap(), b"\x00Foo title".to_vec());
	frame.flags.compression = true;

	let mut tag = Tag::new(Id3v2Version::V3);
	tag.push(frame).unwrap();

	let bytes = tag
		.as_bytes(
			id3kit::config::WriteOptions::new().preferred_padding(0),
			Capabilities::zlib(),
		)
		.unwrap();

	// Opaque frames survive a rewrite unchanged
	let opaque = read(&bytes, strict()).unwrap();
	assert!(opaque.get("TIT2").unwrap().payload().is_opaque());
	assert_eq!(assemble(&opaque), bytes);

	let tag = id3kit::read_from(&mut Cursor::new(&bytes), strict(), Capabilities::zlib()).unwrap();
	assert_eq!(
		tag.get("TIT2").unwrap().payload().resolved(),
		Some(&b"\x00Foo title"[..])
	);
}

#[cfg(feature = "id3v2_compression_support")]
#[test_log::test]
fn compressed_frame_round_trip() {
	use id3kit::config::WriteOptions;
	use id3kit::frame::{Frame, FrameId};

	for version in [Id3v2Version::V3, Id3v2Version::V4] {
		let mut frame = Frame::new(FrameId::new("TIT2").unwrap(), b"\x00Foo title".to_vec());
		frame.flags.compression = true;

		let mut tag = Tag::new(version);
		tag.push(frame).unwrap();

		let bytes = tag
			.as_bytes(WriteOptions::new().preferred_padding(0), Capabilities::zlib())
			.unwrap();

		let read_tag =
			id3kit::read_from(&mut Cursor::new(&bytes), strict(), Capabilities::zlib()).unwrap();
		assert_eq!(read_tag.get("TIT2").unwrap().flags.data_length_indicator, None);
		assert_eq!(read_tag, tag);
	}
}

#[test_log::test]
fn footer_only_tag() {
	let mut tag = tag_with(Id3v2Version::V4, "TIT2", b"\x00Foo");
	tag.flags.footer = true;

	let bytes = assemble(&tag);
	assert_eq!(&bytes[bytes.len() - 10..bytes.len() - 7], b"3DI");

	// Drop the header, leaving the frames and footer at the end of the stream
	let mut stream = b"some audio data".to_vec();
	stream.extend_from_slice(&bytes[10..]);

	let size = bytes.len() as u64 - 20;
	let end = stream.len() as u64;

	let mut reader = Cursor::new(stream);
	let tag = id3kit::read_from_end(&mut reader, ParseOptions::new(), Capabilities::new()).unwrap();

	assert!(!tag.flags.header);
	assert!(tag.flags.footer);
	assert_eq!(tag.len(), 1);
	assert_eq!(reader.stream_position().unwrap(), end - size - 10);
}

#[test_log::test]
fn footer_followed_by_junk() {
	let mut tag = tag_with(Id3v2Version::V4, "TIT2", b"\x00Foo");
	tag.flags.footer = true;

	let mut stream = b"some audio data".to_vec();
	stream.extend_from_slice(&assemble(&tag));
	stream.extend_from_slice(&[0xAA; 32]);

	let err = id3kit::read_from_end(
		&mut Cursor::new(&stream),
		ParseOptions::new().max_junk_bytes(16),
		Capabilities::new(),
	)
	.unwrap_err();
	assert!(matches!(err.kind(), ErrorKind::TagNotFound));

	let mut reader = Cursor::new(&stream);
	let tag = id3kit::read_from_end(&mut reader, ParseOptions::new(), Capabilities::new()).unwrap();

	assert!(tag.flags.header);
	assert_eq!(reader.stream_position().unwrap(), 15);
}

#[test_log::test]
fn multiple_tags() {
	let mut stream = assemble(&tag_with(Id3v2Version::V3, "TIT2", b"\x00Foo"));
	stream.extend_from_slice(&assemble(&tag_with(Id3v2Version::V4, "TPE1", b"\x00Bar")));
	stream.extend_from_slice(b"\xFF\xFB audio");

	let tags = id3kit::read_all_from(
		&mut Cursor::new(stream),
		ParseOptions::new(),
		Capabilities::new(),
	)
	.unwrap();

	assert_eq!(tags.len(), 2);
	assert_eq!(tags[0].version, Id3v2Version::V3);
	assert!(tags[1].get("TPE1").is_some());
}

#[test_log::test]
fn no_tag() {
	let err = read(b"\xFF\xFB not a tag", ParseOptions::new()).unwrap_err();
	assert!(matches!(err.kind(), ErrorKind::TagNotFound));
}
