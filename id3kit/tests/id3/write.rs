use crate::util::{assemble, strict, tag_with, temp_file};

use id3kit::capability::Capabilities;
use id3kit::config::{ParseOptions, WriteOptions};
use id3kit::error::Id3v2ErrorKind;
use id3kit::frame::{Frame, FrameId};
use id3kit::{Id3v2Version, Tag};

use std::io::{Read as _, Seek as _};

const AUDIO: &[u8] = b"\xFF\xFB\x90\x00 audio frames";

fn file_content(file: &mut std::fs::File) -> Vec<u8> {
	file.rewind().unwrap();

	let mut content = Vec::new();
	file.read_to_end(&mut content).unwrap();
	content
}

#[test_log::test]
fn save_to_replaces_existing_tag() {
	let mut content = assemble(&tag_with(Id3v2Version::V3, "TIT2", b"\x00A much longer title"));
	content.extend_from_slice(AUDIO);

	let mut file = temp_file(&content);

	let tag = tag_with(Id3v2Version::V4, "TPE1", b"\x00Bar");
	tag.save_to(&mut file, WriteOptions::new().preferred_padding(0), Capabilities::new())
		.unwrap();

	let content = file_content(&mut file);
	let expected_tag = assemble(&tag);
	assert_eq!(&content[..expected_tag.len()], expected_tag.as_slice());
	assert_eq!(&content[expected_tag.len()..], AUDIO);

	file.rewind().unwrap();
	let read_tag = id3kit::read_from(&mut file, strict(), Capabilities::new()).unwrap();
	assert!(read_tag.get("TIT2").is_none());
	assert!(read_tag.get("TPE1").is_some());
}

#[test_log::test]
fn save_to_untagged_file() {
	let mut file = temp_file(AUDIO);

	let tag = tag_with(Id3v2Version::V3, "TIT2", b"\x00Foo");
	tag.save_to(&mut file, WriteOptions::new().preferred_padding(64), Capabilities::new())
		.unwrap();

	let content = file_content(&mut file);
	assert_eq!(content.len(), 10 + 14 + 64 + AUDIO.len());
	assert!(content.ends_with(AUDIO));

	file.rewind().unwrap();
	let read_tag = id3kit::read_from(&mut file, strict(), Capabilities::new()).unwrap();
	assert_eq!(read_tag.padding_size, 64);
}

#[test_log::test]
fn empty_tag_strips() {
	let mut content = assemble(&tag_with(Id3v2Version::V4, "TIT2", b"\x00Foo"));
	content.extend_from_slice(AUDIO);

	let mut file = temp_file(&content);
	Tag::new(Id3v2Version::V4)
		.save_to(&mut file, WriteOptions::default(), Capabilities::new())
		.unwrap();

	assert_eq!(file_content(&mut file), AUDIO);
}

#[test_log::test]
fn remove_from() {
	let mut tag = tag_with(Id3v2Version::V4, "TIT2", b"\x00Foo");
	tag.flags.footer = true;

	let mut content = assemble(&tag);
	content.extend_from_slice(AUDIO);

	let mut file = temp_file(&content);
	Tag::remove_from(&mut file).unwrap();
	assert_eq!(file_content(&mut file), AUDIO);

	// Nothing left to remove
	Tag::remove_from(&mut file).unwrap();
	assert_eq!(file_content(&mut file), AUDIO);
}

#[test_log::test]
fn respect_read_only() {
	let mut existing = Tag::new(Id3v2Version::V4);

	let mut locked = Frame::new(FrameId::new("TIT2").unwrap(), b"\x00Locked".to_vec());
	locked.flags.read_only = true;
	existing.push(locked).unwrap();
	existing
		.push(Frame::new(FrameId::new("TPE1").unwrap(), b"\x00Old".to_vec()))
		.unwrap();

	let mut file = temp_file(&assemble(&existing));

	let mut tag = tag_with(Id3v2Version::V4, "TIT2", b"\x00New title");
	tag.push(Frame::new(FrameId::new("TALB").unwrap(), b"\x00Album".to_vec()))
		.unwrap();

	tag.save_to(
		&mut file,
		WriteOptions::new().respect_read_only(true),
		Capabilities::new(),
	)
	.unwrap();

	file.rewind().unwrap();
	let read_tag = id3kit::read_from(&mut file, ParseOptions::new(), Capabilities::new()).unwrap();
	assert_eq!(read_tag.get("TIT2").unwrap().payload().bytes(), b"\x00Locked");
	assert!(read_tag.get("TALB").is_some());
	assert!(read_tag.get("TPE1").is_none());
}

#[test_log::test]
fn unsupported_frames_are_discarded() {
	// No ID3v2.2 equivalent
	let mut tag = tag_with(Id3v2Version::V2, "TDEN", b"\x002024");
	tag.push(Frame::new(FrameId::new("TIT2").unwrap(), b"\x00Foo".to_vec()))
		.unwrap();

	let bytes = assemble(&tag);

	let read_tag = crate::util::read(&bytes, strict()).unwrap();
	assert_eq!(read_tag.len(), 1);
	assert!(read_tag.get("TT2").is_some());
}

#[test_log::test]
fn invalid_encryption_method() {
	let mut frame = Frame::new(FrameId::new("TIT2").unwrap(), b"\x00Foo".to_vec());
	frame.flags.encryption = Some(0x10);

	let mut tag = Tag::new(Id3v2Version::V4);
	tag.push(frame).unwrap();

	let err = tag
		.as_bytes(WriteOptions::default(), Capabilities::new())
		.unwrap_err();
	assert_eq!(
		err.id3v2_kind(),
		Some(&Id3v2ErrorKind::InvalidEncryptionMethodSymbol(0x10))
	);
}

#[test_log::test]
fn v4_unsynchronisation_is_per_frame() {
	let mut tag = tag_with(Id3v2Version::V4, "APIC", b"\x00\xFF\xE0\xFF\x00");
	tag.flags.unsynchronisation = true;

	let bytes = assemble(&tag);

	// Frame flags: unsynchronisation
	assert_eq!(&bytes[18..20], &[0x00, 0x02]);
	assert_eq!(&bytes[20..], b"\x00\xFF\x00\xE0\xFF\x00\x00");

	let read_tag = crate::util::read(&bytes, strict()).unwrap();
	assert_eq!(
		read_tag.get("APIC").unwrap().payload().bytes(),
		b"\x00\xFF\xE0\xFF\x00"
	);
}

#[test_log::test]
fn v4_unsynchronised_tag_round_trip() {
	let mut tag = tag_with(Id3v2Version::V4, "TIT2", b"\x00Fo\xFF\xE0o");
	tag.flags.unsynchronisation = true;

	let bytes = assemble(&tag);

	let read_tag = crate::util::read(&bytes, strict()).unwrap();
	assert!(read_tag.flags.unsynchronisation);
	assert!(!read_tag.get("TIT2").unwrap().flags.unsynchronisation);
	assert_eq!(read_tag, tag);

	// Rewriting reapplies the frame flag
	assert_eq!(assemble(&read_tag), bytes);
}
