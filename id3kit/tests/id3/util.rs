use id3kit::capability::Capabilities;
use id3kit::config::{ParseOptions, ParsingMode, WriteOptions};
use id3kit::frame::{Frame, FrameId};
use id3kit::{Id3v2Version, Tag};

use std::fs::File;
use std::io::{Cursor, Seek as _, Write as _};

/// Create a new temporary file containing `content`
pub fn temp_file(content: &[u8]) -> File {
	let mut file = tempfile::tempfile().unwrap();
	file.write_all(content).unwrap();
	file.rewind().unwrap();

	file
}

/// A tag of `version` with a single `id` frame
pub fn tag_with(version: Id3v2Version, id: &'static str, content: &[u8]) -> Tag {
	let mut tag = Tag::new(version);
	tag.push(Frame::new(FrameId::new(id).unwrap(), content.to_vec()))
		.unwrap();
	tag
}

/// Assemble `tag` without padding
pub fn assemble(tag: &Tag) -> Vec<u8> {
	tag.as_bytes(WriteOptions::new().preferred_padding(0), Capabilities::new())
		.unwrap()
}

pub fn strict() -> ParseOptions {
	ParseOptions::new().parsing_mode(ParsingMode::Strict)
}

pub fn read(bytes: &[u8], parse_options: ParseOptions) -> id3kit::error::Result<Tag> {
	id3kit::read_from(
		&mut Cursor::new(bytes),
		parse_options,
		Capabilities::new(),
	)
}
