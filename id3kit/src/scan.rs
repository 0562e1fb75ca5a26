//! Boundary recovery
//!
//! Frame sizes in the wild are frequently wrong. When a declared size doesn't land on a
//! plausible boundary, the frame reader uses [`find_frame_start`] to search for the next
//! frame header instead. The same technique, specialized to the 10 byte tag header, is used
//! to locate tags within a larger stream.

use crate::MAX_TAG_SIZE;
use crate::frame::id::is_valid_id_byte;
use crate::frame::interpret_size;
use crate::version::Id3v2Version;

use byteorder::{BigEndian, ByteOrder};

/// The marker at the start of a tag header
pub const HEADER_MARKER: [u8; 3] = *b"ID3";
/// The marker at the start of a tag footer
pub const FOOTER_MARKER: [u8; 3] = *b"3DI";
/// The size of a tag header or footer
pub const TAG_HEADER_LEN: usize = 10;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ScanState {
	MatchingIdentifier,
	MatchingSize,
	MatchingFlags,
}

/// Search for the next plausible frame header in `data`
///
/// Candidates are checked at every offset in `start..bound`. A candidate is accepted when:
///
/// * Its identifier is made up of `A-Z0-9`. An ID3v2.2 identifier, terminated by `'\0'` or `' '`
///   inside a 4 character field, is tolerated.
/// * Its size doesn't exceed [`MAX_TAG_SIZE`], and is strictly less than the number of bytes
///   remaining in `data` from the candidate
/// * Unless the candidate is at `start`, its flags have no bits set outside those known for `version`
///
/// # Examples
///
/// ```rust
/// use id3kit::Id3v2Version;
/// use id3kit::scan::find_frame_start;
///
/// let data = b"\xFF\xFF\xFF\xFFTIT2\x00\x00\x00\x03\x00\x00\x00Foo";
/// assert_eq!(find_frame_start(data, 0, data.len(), Id3v2Version::V4), Some(4));
/// assert_eq!(find_frame_start(b"\x00\x00\x00", 0, 3, Id3v2Version::V4), None);
/// ```
pub fn find_frame_start(
	data: &[u8],
	start: usize,
	bound: usize,
	version: Id3v2Version,
) -> Option<usize> {
	let bound = bound.min(data.len());

	log::trace!("Scanning for a frame start in {start}..{bound}");

	(start..bound).find(|&pos| validate_window(data, pos, version, pos != start))
}

/// Whether a frame header, with no unknown flags set, starts at `pos`
pub(crate) fn is_frame_start(data: &[u8], pos: usize, version: Id3v2Version) -> bool {
	validate_window(data, pos, version, true)
}

fn validate_window(data: &[u8], pos: usize, version: Id3v2Version, check_flags: bool) -> bool {
	let layout = version.layout();
	let Some(window) = data.get(pos..pos + layout.header_len()) else {
		return false;
	};

	let (id, rest) = window.split_at(layout.id_len);
	let (size, flags) = rest.split_at(layout.size_len);

	let mut state = ScanState::MatchingIdentifier;
	loop {
		match state {
			ScanState::MatchingIdentifier => {
				if !identifier_matches(id) {
					return false;
				}

				state = ScanState::MatchingSize;
			},
			ScanState::MatchingSize => {
				let size = interpret_size(size, layout.synchsafe_size);

				// An empty frame can't be the start of anything useful
				if size == 0 || size > MAX_TAG_SIZE || size as usize >= data.len() - pos {
					return false;
				}

				if flags.is_empty() {
					return true;
				}

				state = ScanState::MatchingFlags;
			},
			ScanState::MatchingFlags => {
				if !check_flags {
					return true;
				}

				return BigEndian::read_u16(flags) & !layout.known_flag_mask == 0;
			},
		}
	}
}

fn identifier_matches(id: &[u8]) -> bool {
	match id {
		[a, b, c, 0 | b' '] => [a, b, c].into_iter().copied().all(is_valid_id_byte),
		_ => id.iter().copied().all(is_valid_id_byte),
	}
}

/// Whether `window` holds a plausible tag header or footer starting with `marker`
///
/// The version bytes must be `< 0x10`, and the size bytes must all be synchsafe.
pub fn is_tag_marker(window: &[u8], marker: [u8; 3]) -> bool {
	let Some(window) = window.get(..TAG_HEADER_LEN) else {
		return false;
	};

	window[..3] == marker
		&& window[3] < 0x10
		&& window[4] < 0x10
		&& window[6..].iter().all(|b| b & 0x80 == 0)
}

/// Find the first tag header in `data`, returning its offset
///
/// # Examples
///
/// ```rust
/// use id3kit::scan::find_tag_header;
///
/// let data = b"junkID3\x04\x00\x00\x00\x00\x00\x00";
/// assert_eq!(find_tag_header(data), Some(4));
///
/// // Version bytes must be < 0x10
/// assert_eq!(find_tag_header(b"ID3\xFF\x00\x00\x00\x00\x00\x00"), None);
/// ```
pub fn find_tag_header(data: &[u8]) -> Option<usize> {
	(0..data.len()).find(|&pos| is_tag_marker(&data[pos..], HEADER_MARKER))
}

/// Find the last tag footer in `data`, returning its offset
pub fn rfind_tag_footer(data: &[u8]) -> Option<usize> {
	(0..data.len())
		.rev()
		.find(|&pos| is_tag_marker(&data[pos..], FOOTER_MARKER))
}

#[cfg(test)]
mod tests {
	use super::{find_frame_start, find_tag_header, is_frame_start, rfind_tag_footer};
	use crate::version::Id3v2Version;

	const V4_FRAMES: &[u8] = b"TIT2\x00\x00\x00\x04\x00\x00\x03FooTALB\x00\x00\x00\x04\x00\x00\x03Bar";

	#[test_log::test]
	fn scan_finds_next_frame() {
		assert_eq!(
			find_frame_start(V4_FRAMES, 1, V4_FRAMES.len(), Id3v2Version::V4),
			Some(14)
		);
	}

	#[test_log::test]
	fn scan_respects_bound() {
		assert_eq!(find_frame_start(V4_FRAMES, 1, 14, Id3v2Version::V4), None);
		assert_eq!(find_frame_start(V4_FRAMES, 1, 15, Id3v2Version::V4), Some(14));
	}

	#[test_log::test]
	fn scan_tolerates_garbage() {
		let mut data = vec![0xAB; 40];
		data.extend_from_slice(V4_FRAMES);

		for start in 0..40 {
			assert_eq!(
				find_frame_start(&data, start, data.len(), Id3v2Version::V4),
				Some(40)
			);
		}
	}

	#[test_log::test]
	fn scan_rejects_unknown_flags() {
		let data = b"\x00TIT2\x00\x00\x00\x04\x80\x00\x03Foo\x00\x00";
		assert_eq!(find_frame_start(data, 0, data.len(), Id3v2Version::V4), None);

		// Unless the candidate is where the scan started
		assert_eq!(find_frame_start(data, 1, data.len(), Id3v2Version::V4), Some(1));
		assert!(!is_frame_start(data, 1, Id3v2Version::V4));
	}

	#[test_log::test]
	fn scan_rejects_oversized() {
		// The size reaches past the end of the data
		let data = b"TIT2\x00\x00\x00\x7F\x00\x00Foo";
		assert_eq!(find_frame_start(data, 0, data.len(), Id3v2Version::V4), None);
	}

	#[test_log::test]
	fn scan_accepts_padded_v2_id() {
		let data = b"\x01\x02TT2\x00\x00\x00\x00\x04\x00\x00\x03Foo";
		assert_eq!(find_frame_start(data, 0, data.len(), Id3v2Version::V3), Some(2));
	}

	#[test_log::test]
	fn scan_v2() {
		let data = b"\x01\x02\x03TT2\x00\x00\x04\x03Foo";
		assert_eq!(find_frame_start(data, 0, data.len(), Id3v2Version::V2), Some(3));
	}

	#[test_log::test]
	fn find_tag_markers() {
		let mut data = b"ID3\x04\x00\x00\x00\x00\x00\x0A".to_vec();
		data.extend_from_slice(&[0; 10]);
		data.extend_from_slice(b"3DI\x04\x00\x10\x00\x00\x00\x0A");

		assert_eq!(find_tag_header(&data), Some(0));
		assert_eq!(rfind_tag_footer(&data), Some(20));

		// Size bytes must be synchsafe
		assert_eq!(find_tag_header(b"ID3\x04\x00\x00\x80\x00\x00\x00"), None);
	}
}
