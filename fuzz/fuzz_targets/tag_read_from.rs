#![no_main]

use std::io::Cursor;

use id3kit::capability::Capabilities;
use id3kit::config::{ParseOptions, WriteOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: Vec<u8>| {
	let Ok(tag) = id3kit::read_from(
		&mut Cursor::new(data),
		ParseOptions::new(),
		Capabilities::zlib(),
	) else {
		return;
	};

	let _ = tag.as_bytes(WriteOptions::new(), Capabilities::zlib());
});
