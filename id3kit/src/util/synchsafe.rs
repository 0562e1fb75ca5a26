//! Utilities for working with synchsafe integers and unsynchronized content
//!
//! ID3v2 content must never contain a false MPEG sync signal (`0xFF` followed by a byte with
//! its three high bits set). Integers avoid this by only using the lower 7 bits of each byte (synchsafe),
//! while arbitrary content is escaped by inserting `0x00` after problematic `0xFF` bytes (unsynchronisation).

use crate::error::Result;
use crate::macros::err;

use std::io::Read;

/// Encode `value` as a big-endian synchsafe integer of `byte_count` bytes
///
/// # Errors
///
/// `value` doesn't fit in `7 * byte_count` bits
///
/// # Examples
///
/// ```rust
/// use id3kit::util::synchsafe::encode_synchsafe;
///
/// # fn main() -> id3kit::error::Result<()> {
/// assert_eq!(encode_synchsafe(0x0FFF_FFFF, 4)?, [0x7F, 0x7F, 0x7F, 0x7F]);
/// assert_eq!(encode_synchsafe(257, 4)?, [0x00, 0x00, 0x02, 0x01]);
/// assert!(encode_synchsafe(0x1000_0000, 4).is_err());
/// # Ok(()) }
/// ```
pub fn encode_synchsafe(value: u64, byte_count: usize) -> Result<Vec<u8>> {
	let bits = 7 * byte_count;
	if bits < 64 && value >= 1_u64 << bits {
		err!(TooMuchData);
	}

	Ok((0..byte_count)
		.rev()
		.map(|group| {
			let shift = 7 * group;
			if shift >= 64 {
				0
			} else {
				((value >> shift) & 0x7F) as u8
			}
		})
		.collect())
}

/// Decode a big-endian synchsafe integer
///
/// The high bit of each byte is ignored.
///
/// # Examples
///
/// ```rust
/// use id3kit::util::synchsafe::decode_synchsafe;
///
/// assert_eq!(decode_synchsafe(&[0x00, 0x00, 0x02, 0x01]), 257);
/// assert_eq!(decode_synchsafe(&[0x0F, 0x7F, 0x7F, 0x7F, 0x7F]), 0xFFFF_FFFF);
/// ```
pub fn decode_synchsafe(bytes: &[u8]) -> u64 {
	bytes
		.iter()
		.fold(0_u64, |acc, byte| (acc << 7) | u64::from(byte & 0x7F))
}

/// Apply the unsynchronisation scheme to `content`
///
/// A `0x00` is inserted after every `0xFF` that is followed by a byte `>= 0xE0` or `0x00`,
/// as well as after a trailing `0xFF`.
///
/// # Examples
///
/// ```rust
/// use id3kit::util::synchsafe::unsynchronize;
///
/// assert_eq!(unsynchronize(&[0xFF, 0xE0, 0x01]), [0xFF, 0x00, 0xE0, 0x01]);
/// assert_eq!(unsynchronize(&[0xFF, 0x00]), [0xFF, 0x00, 0x00]);
/// assert_eq!(unsynchronize(&[0x01, 0xFF]), [0x01, 0xFF, 0x00]);
/// ```
pub fn unsynchronize(content: &[u8]) -> Vec<u8> {
	let mut out = Vec::with_capacity(content.len());

	for (index, byte) in content.iter().copied().enumerate() {
		out.push(byte);

		if byte != 0xFF {
			continue;
		}

		match content.get(index + 1) {
			Some(next) if *next >= 0xE0 || *next == 0x00 => out.push(0x00),
			None => out.push(0x00),
			_ => {},
		}
	}

	out
}

/// Reverse the unsynchronisation scheme
///
/// Every `0x00` immediately following a `0xFF` is removed.
///
/// # Examples
///
/// ```rust
/// use id3kit::util::synchsafe::{synchronize, unsynchronize};
///
/// let content = [0xFF, 0xFB, 0x90, 0xFF, 0x00];
/// assert_eq!(synchronize(&unsynchronize(&content)), content);
/// ```
pub fn synchronize(content: &[u8]) -> Vec<u8> {
	let mut out = Vec::with_capacity(content.len());
	let mut previous_ff = false;

	for byte in content.iter().copied() {
		if previous_ff && byte == 0x00 {
			previous_ff = false;
			continue;
		}

		out.push(byte);
		previous_ff = byte == 0xFF;
	}

	out
}

const STREAM_BUFFER_SIZE: usize = 8 * 1024;

/// A reader for unsynchronized content
///
/// This performs [`synchronize`] on the fly.
///
/// # Examples
///
/// ```rust
/// use std::io::{Cursor, Read};
/// use id3kit::util::synchsafe::UnsynchronizedStream;
///
/// fn main() -> id3kit::error::Result<()> {
/// // The content has two `0xFF 0x00` pairs, which will be removed
/// let content = [0xFF, 0x00, 0x1A, 0xFF, 0x00, 0x15];
///
/// let mut unsynchronized_reader = UnsynchronizedStream::new(Cursor::new(content));
///
/// let mut unsynchronized_content = Vec::new();
/// unsynchronized_reader.read_to_end(&mut unsynchronized_content)?;
///
/// // All null bytes following `0xFF` have been removed
/// assert_eq!(unsynchronized_content, [0xFF, 0x1A, 0xFF, 0x15]);
/// # Ok(()) }
/// ```
pub struct UnsynchronizedStream<R> {
	reader: R,
	buf: Box<[u8]>,
	filled: usize,
	pos: usize,
	previous_ff: bool,
}

impl<R> UnsynchronizedStream<R> {
	/// Create a new [`UnsynchronizedStream`]
	pub fn new(reader: R) -> Self {
		Self {
			reader,
			buf: vec![0; STREAM_BUFFER_SIZE].into_boxed_slice(),
			filled: 0,
			pos: 0,
			previous_ff: false,
		}
	}

	/// Extract the reader, discarding the [`UnsynchronizedStream`]
	///
	/// Any buffered content is lost.
	pub fn into_inner(self) -> R {
		self.reader
	}
}

impl<R: Read> Read for UnsynchronizedStream<R> {
	fn read(&mut self, dest: &mut [u8]) -> std::io::Result<usize> {
		let mut written = 0;

		while written < dest.len() {
			if self.pos == self.filled {
				self.filled = self.reader.read(&mut self.buf)?;
				self.pos = 0;

				// Exhausted
				if self.filled == 0 {
					break;
				}
			}

			let byte = self.buf[self.pos];
			self.pos += 1;

			if self.previous_ff && byte == 0x00 {
				self.previous_ff = false;
				continue;
			}

			self.previous_ff = byte == 0xFF;
			dest[written] = byte;
			written += 1;
		}

		Ok(written)
	}
}

/// An integer that can be converted to and from synchsafe variants
pub trait SynchsafeInteger: Sized {
	/// The integer type that this can be widened to for use in [`SynchsafeInteger::widening_synch`]
	type WideningType;

	/// Create a synchsafe integer
	///
	/// # Errors
	///
	/// `self` doesn't fit in <`INTEGER_TYPE::BITS - size_of::<INTEGER_TYPE>()`> bits
	///
	/// # Examples
	///
	/// ```rust
	/// use id3kit::util::synchsafe::SynchsafeInteger;
	///
	/// # fn main() -> id3kit::error::Result<()> {
	/// // Maximum value we can represent in a synchsafe u32
	/// let unsynch_number = 0xFFF_FFFF_u32;
	/// let synch_number = unsynch_number.synch()?;
	///
	/// // Each byte should have 7 set bits and an MSB of 0
	/// assert_eq!(synch_number, 0b01111111_01111111_01111111_01111111_u32);
	/// # Ok(()) }
	/// ```
	fn synch(self) -> Result<Self>;

	/// Create a synchsafe integer, widening to the next available integer type
	///
	/// # Examples
	///
	/// ```rust
	/// use id3kit::util::synchsafe::SynchsafeInteger;
	///
	/// // 0b11111111, widened to 0b00000001_01111111
	/// let large_number_synchsafe = u8::MAX.widening_synch();
	///
	/// // Unsynchronizing the number will get us back to 255
	/// assert_eq!(large_number_synchsafe.unsynch(), 255);
	/// ```
	fn widening_synch(self) -> Self::WideningType;

	/// Unsynchronise a synchsafe integer
	///
	/// # Examples
	///
	/// ```rust
	/// use id3kit::util::synchsafe::SynchsafeInteger;
	///
	/// # fn main() -> id3kit::error::Result<()> {
	/// let unsynch_number = 0xFFF_FFFF_u32;
	/// let synch_number = unsynch_number.synch()?;
	///
	/// assert_eq!(synch_number.unsynch(), unsynch_number);
	/// # Ok(()) }
	/// ```
	fn unsynch(self) -> Self;
}

// Spread the low `groups * 7` bits of `value` into `groups` bytes
fn spread(value: u64, groups: u32) -> u128 {
	(0..groups).fold(0, |acc, group| {
		acc | (u128::from((value >> (7 * group)) & 0x7F) << (8 * group))
	})
}

fn gather(value: u64, groups: u32) -> u128 {
	(0..groups).fold(0, |acc, group| {
		acc | (u128::from((value >> (8 * group)) & 0x7F) << (7 * group))
	})
}

macro_rules! impl_synchsafe {
	($($ty:ty => $widening_ty:ty),+ $(,)?) => {
		$(
			impl SynchsafeInteger for $ty {
				type WideningType = $widening_ty;

				fn synch(self) -> Result<Self> {
					const BYTES: u32 = <$ty>::BITS / 8;

					// 7 bits are available per byte, shave off 1 bit per byte
					if self > <$ty>::MAX >> BYTES {
						err!(TooMuchData);
					}

					Ok(spread(u64::from(self), BYTES) as $ty)
				}

				fn widening_synch(self) -> Self::WideningType {
					spread(u64::from(self), <$ty>::BITS / 8 + 1) as $widening_ty
				}

				fn unsynch(self) -> Self {
					gather(u64::from(self), <$ty>::BITS / 8) as $ty
				}
			}
		)+
	};
}

impl_synchsafe! {
	u8 => u16,
	u16 => u32,
	u32 => u64,
}

#[cfg(test)]
mod tests {
	use crate::util::synchsafe::{
		SynchsafeInteger, UnsynchronizedStream, decode_synchsafe, encode_synchsafe, synchronize,
		unsynchronize,
	};

	use std::io::{Cursor, Read};

	const UNSYNCHRONIZED_CONTENT: &[u8] =
		&[0xFF, 0x00, 0x00, 0xFF, 0x12, 0xB0, 0x05, 0xFF, 0x00, 0x00];
	const EXPECTED: &[u8] = &[0xFF, 0x00, 0xFF, 0x12, 0xB0, 0x05, 0xFF, 0x00];

	#[test_log::test]
	fn unsynchronized_stream() {
		let mut unsynchronized_reader =
			UnsynchronizedStream::new(Cursor::new(UNSYNCHRONIZED_CONTENT));

		let mut final_content = Vec::new();
		unsynchronized_reader
			.read_to_end(&mut final_content)
			.unwrap();

		assert_eq!(final_content, EXPECTED);
		assert_eq!(synchronize(UNSYNCHRONIZED_CONTENT), EXPECTED);
	}

	#[test_log::test]
	fn unsynchronized_stream_large() {
		// Larger than the internal buffer, with a `0xFF 0x00` pair straddling a refill
		let reader = Cursor::new(UNSYNCHRONIZED_CONTENT.repeat(1000));
		let mut unsynchronized_reader = UnsynchronizedStream::new(reader);

		let mut final_content = Vec::new();
		unsynchronized_reader
			.read_to_end(&mut final_content)
			.unwrap();

		assert_eq!(final_content, EXPECTED.repeat(1000));
	}

	#[test_log::test]
	fn synchronize_should_not_replace_unrelated() {
		const ORIGINAL_CONTENT: &[u8] = &[0xFF, 0x1A, 0xFF, 0xC0, 0x10, 0x01];
		assert_eq!(synchronize(ORIGINAL_CONTENT), ORIGINAL_CONTENT);
		assert_eq!(unsynchronize(ORIGINAL_CONTENT), ORIGINAL_CONTENT);
	}

	#[test_log::test]
	fn unsynchronize_is_reversible() {
		let inputs: [&[u8]; 6] = [
			&[],
			&[0xFF],
			&[0xFF, 0xFF, 0xFF],
			&[0xFF, 0x00, 0x00, 0xFF, 0xE0],
			&[0x12, 0xFF, 0xFB, 0x90, 0x00],
			UNSYNCHRONIZED_CONTENT,
		];

		for input in inputs {
			let unsynchronized = unsynchronize(input);

			// No false sync signals should remain
			assert!(
				!unsynchronized
					.windows(2)
					.any(|w| w[0] == 0xFF && w[1] >= 0xE0)
			);
			assert_eq!(synchronize(&unsynchronized), input);
		}
	}

	#[test_log::test]
	fn synchsafe_bytes() {
		for value in [0_u64, 1, 0x7F, 0x80, 0x3FFF, 0x0FFF_FFFF] {
			let encoded = encode_synchsafe(value, 4).unwrap();
			assert!(encoded.iter().all(|b| b & 0x80 == 0));
			assert_eq!(decode_synchsafe(&encoded), value);
		}

		// 35 bits are available with 5 bytes, large enough for a CRC-32
		let encoded = encode_synchsafe(u64::from(u32::MAX), 5).unwrap();
		assert_eq!(encoded, [0x0F, 0x7F, 0x7F, 0x7F, 0x7F]);

		assert!(encode_synchsafe(0x80, 1).is_err());
	}

	macro_rules! synchsafe_integer_tests {
		(
			$($int:ty => {
				synch: $original:literal, $new:literal;
				unsynch: $original_unsync:literal, $new_unsynch:literal;
				widen: $original_widen:literal, $new_widen:literal;
			});+
		) => {
			$(
				paste::paste! {
					#[test_log::test]
					fn [<$int _synch>]() {
						assert_eq!($original.synch().unwrap(), $new);
					}

					#[test_log::test]
					fn [<$int _unsynch>]() {
						assert_eq!($original_unsync.unsynch(), $new_unsynch);
					}

					#[test_log::test]
					fn [<$int _widen>]() {
						assert_eq!($original_widen.widening_synch(), $new_widen);
					}
				}
			)+
		};
	}

	synchsafe_integer_tests! {
		u8 => {
			synch:   0x7F_u8, 0x7F_u8;
			unsynch: 0x7F_u8, 0x7F_u8;
			widen:   0xFF_u8, 0x017F_u16;
		};
		u16 => {
			synch:   0x3FFF_u16, 0x7F7F_u16;
			unsynch: 0x7F7F_u16, 0x3FFF_u16;
			widen:   0xFFFF_u16, 0x0003_7F7F_u32;
		};
		u32 => {
			synch:   0xFFF_FFFF_u32, 0x7F7F_7F7F_u32;
			unsynch: 0x7F7F_7F7F_u32, 0xFFF_FFFF_u32;
			widen:   0xFFFF_FFFF_u32, 0x000F_7F7F_7F7F_u64;
		}
	}
}
