#![no_main]

use std::io::Cursor;

use id3kit::capability::Capabilities;
use id3kit::config::ParseOptions;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: Vec<u8>| {
	let _ = id3kit::read_from_end(
		&mut Cursor::new(data),
		ParseOptions::new(),
		Capabilities::new(),
	);
});
