//! Read, write, and repair the ID3v2 tag envelope.
//!
//! id3kit handles everything *around* ID3v2 frame content: tag headers and footers, extended
//! headers, frame headers across ID3v2.2, ID3v2.3, and ID3v2.4, unsynchronisation, synchsafe
//! integers, CRC-32 verification, and recovery of frame boundaries in damaged tags. Frame
//! content is carried as bytes, with [`registry`] providing a small typed layer for the common
//! text, URL, and binary frame families.
//!
//! # Examples
//!
//! ## Reading a tag
//!
//! ```rust,no_run
//! # fn main() -> id3kit::error::Result<()> {
//! use id3kit::capability::Capabilities;
//! use id3kit::config::ParseOptions;
//! use std::fs::File;
//!
//! let mut file = File::open("test.mp3")?;
//!
//! // The tag may be preceded by junk, see `ParseOptions::max_junk_bytes`
//! let tag = id3kit::read_from(&mut file, ParseOptions::new(), Capabilities::zlib())?;
//!
//! for frame in &tag {
//! 	println!("{}: {} bytes", frame.id(), frame.payload().bytes().len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Building a tag
//!
//! ```rust
//! # fn main() -> id3kit::error::Result<()> {
//! use id3kit::capability::Capabilities;
//! use id3kit::config::WriteOptions;
//! use id3kit::frame::{Frame, FrameId};
//! use id3kit::registry::TextFrame;
//! use id3kit::{Id3v2Version, Tag, TextEncoding};
//!
//! let mut tag = Tag::new(Id3v2Version::V3);
//!
//! let title = TextFrame::new(
//! 	FrameId::new("TIT2")?,
//! 	TextEncoding::UTF16,
//! 	String::from("Foo title"),
//! );
//! tag.push(Frame::from_kind(&title, Id3v2Version::V3)?)?;
//!
//! let bytes = tag.as_bytes(WriteOptions::default(), Capabilities::new())?;
//! assert_eq!(&bytes[..3], b"ID3");
//! # Ok(())
//! # }
//! ```
//!
//! ## Damaged tags
//!
//! With the default [`ParsingMode::BestAttempt`](config::ParsingMode::BestAttempt), frames with
//! implausible sizes are recovered by searching for the next frame header (see [`scan`]), and
//! frames that can't be recovered are skipped with a warning. [`ParsingMode::Strict`](config::ParsingMode::Strict)
//! turns each of these into an error instead.
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod capability;
pub mod config;
pub mod crc;
pub mod error;
pub mod frame;
mod locate;
pub(crate) mod macros;
pub mod registry;
pub mod restrictions;
pub mod scan;
pub mod tag;
pub mod util;
mod version;

pub use locate::{read_all_from, read_from, read_from_end};
pub use tag::Tag;
pub use util::io;
pub use util::text::TextEncoding;
pub use version::{ExtraField, FrameLayout, Id3v2Version};

/// The largest tag size that can be expressed by the 28-bit synchsafe size field
pub const MAX_TAG_SIZE: u32 = 0x0FFF_FFFF;

/// The largest frame size that will be read or written
pub const MAX_FRAME_SIZE: u32 = 0x00FF_FFFF;

/// The largest number of frames a single tag may hold
pub const MAX_FRAME_COUNT: usize = 0x000F_FFFF;

pub mod prelude {
	//! A prelude for commonly used items in the library.
	//!
	//! This module is intended to be wildcard imported.
	//!
	//! ```rust
	//! use id3kit::prelude::*;
	//! ```

	pub use crate::registry::FrameKind;
	pub use crate::util::synchsafe::SynchsafeInteger;
}
