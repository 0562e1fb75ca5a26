#![no_main]

use id3kit::Id3v2Version;
use id3kit::scan::find_frame_start;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
	for version in [Id3v2Version::V2, Id3v2Version::V3, Id3v2Version::V4] {
		let mut pos = 0;
		while let Some(next) = find_frame_start(data, pos, data.len(), version) {
			assert!(next >= pos);
			pos = next + 1;
		}
	}
});
