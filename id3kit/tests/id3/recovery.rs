use crate::util::{read, strict};

use id3kit::config::ParseOptions;
use id3kit::error::Id3v2ErrorKind;
use id3kit::scan::find_frame_start;
use id3kit::Id3v2Version;

fn tag(version: u8, body: &[u8]) -> Vec<u8> {
	let size = body.len() as u32;
	assert!(size < 0x80 * 0x80);

	let mut tag = vec![b'I', b'D', b'3', version, 0, 0, 0, 0];
	tag.push((size >> 7) as u8);
	tag.push((size & 0x7F) as u8);
	tag.extend_from_slice(body);
	tag
}

#[test_log::test]
fn oversized_frame_recovered_by_scan() {
	let mut body = b"TIT2\x00\x00\x01\x00\x00\x00\x00Foo".to_vec();
	body.extend_from_slice(b"TPE1\x00\x00\x00\x04\x00\x00\x00Bar");
	let bytes = tag(3, &body);

	let tag = read(&bytes, ParseOptions::new()).unwrap();
	assert_eq!(tag.get("TIT2").unwrap().payload().bytes(), b"\x00Foo");
	assert_eq!(tag.get("TPE1").unwrap().payload().bytes(), b"\x00Bar");

	let err = read(&bytes, strict()).unwrap_err();
	assert_eq!(
		err.id3v2_kind(),
		Some(&Id3v2ErrorKind::SizeInconsistent {
			declared: 256,
			recovered: 4,
		})
	);
}

#[test_log::test]
fn v4_frame_with_plain_size() {
	let content = vec![b'a'; 256];

	// 256 as a plain integer, 128 when read as synchsafe
	let mut body = b"TXXX\x00\x00\x01\x00\x00\x00".to_vec();
	body.extend_from_slice(&content);
	body.extend_from_slice(b"TPE1\x00\x00\x00\x04\x00\x00\x00Bar");
	let bytes = tag(4, &body);

	let tag = read(&bytes, ParseOptions::new()).unwrap();
	assert_eq!(tag.len(), 2);
	assert_eq!(tag.get("TXXX").unwrap().payload().bytes(), content.as_slice());

	let err = read(&bytes, strict()).unwrap_err();
	assert_eq!(
		err.id3v2_kind(),
		Some(&Id3v2ErrorKind::SizeInconsistent {
			declared: 128,
			recovered: 256,
		})
	);
}

#[test_log::test]
fn padded_v2_identifier() {
	let bytes = tag(3, b"TT2\x00\x00\x00\x00\x04\x00\x00\x00Foo");

	let tag = read(&bytes, ParseOptions::new()).unwrap();
	assert_eq!(tag.get("TIT2").unwrap().payload().bytes(), b"\x00Foo");
}

#[test_log::test]
fn frame_hidden_in_padding() {
	let mut body = b"TIT2\x00\x00\x00\x04\x00\x00\x00Foo".to_vec();
	body.extend_from_slice(&[0; 4]);
	body.extend_from_slice(b"TPE1\x00\x00\x00\x04\x00\x00\x00Bar");
	let bytes = tag(4, &body);

	let tag = read(&bytes, ParseOptions::new()).unwrap();
	assert_eq!(tag.len(), 2);
	assert!(tag.get("TPE1").is_some());

	let err = read(&bytes, strict()).unwrap_err();
	assert_eq!(err.id3v2_kind(), Some(&Id3v2ErrorKind::NonZeroPadding));
}

#[test_log::test]
fn garbage_padding() {
	let mut body = b"TIT2\x00\x00\x00\x04\x00\x00\x00Foo".to_vec();
	body.extend_from_slice(&[0, 0, 0xFF, 0xFF, 0]);
	let bytes = tag(4, &body);

	let tag = read(&bytes, ParseOptions::new()).unwrap();
	assert_eq!(tag.len(), 1);
	assert_eq!(tag.padding_size, 0);

	let err = read(&bytes, strict()).unwrap_err();
	assert_eq!(err.id3v2_kind(), Some(&Id3v2ErrorKind::NonZeroPadding));
}

#[test_log::test]
fn truncated_tag() {
	let mut bytes = tag(4, b"TIT2\x00\x00\x00\x04\x00\x00\x00Foo");
	bytes.truncate(bytes.len() - 2);

	assert!(read(&bytes, ParseOptions::new()).is_err());
}

#[test_log::test]
fn scan_skips_invalid_windows() {
	let mut body = b"tit2\x00\x00\x00\x04\x00\x00".to_vec();
	body.extend_from_slice(b"TIT2\x80\x00\x00\x04\x00\x00");
	body.extend_from_slice(b"TIT2\x00\x00\x00\x04\x00\x00\x00Foo");

	assert_eq!(
		find_frame_start(&body, 0, body.len(), Id3v2Version::V4),
		Some(20)
	);
}
