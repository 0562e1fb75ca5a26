//! Caller supplied payload transformations
//!
//! id3kit does not implement any encryption scheme, and only optionally implements zlib
//! compression (see [`Zlib`]). Frames that can't be resolved with the given [`Capabilities`]
//! are kept as [`Payload::Opaque`](crate::frame::Payload::Opaque), and written back unchanged.

use std::fmt::{Debug, Formatter};

/// Decrypts frame payloads
pub trait Decryptor: Sync {
	/// Decrypt `content` that was encrypted with the method registered as `method`
	///
	/// Returning `None` keeps the payload encrypted.
	fn decrypt(&self, method: u8, content: &[u8]) -> Option<Vec<u8>>;
}

/// Encrypts frame payloads
pub trait Encryptor: Sync {
	/// Encrypt `content` with the method registered as `method`
	///
	/// Returning `None` causes the frame to be written unencrypted.
	fn encrypt(&self, method: u8, content: &[u8]) -> Option<Vec<u8>>;
}

/// Decompresses frame payloads
pub trait Decompressor: Sync {
	/// Decompress `content`
	///
	/// Returning `None` keeps the payload compressed.
	fn decompress(&self, content: &[u8]) -> Option<Vec<u8>>;
}

/// Compresses frame payloads
pub trait Compressor: Sync {
	/// Compress `content`
	///
	/// Returning `None` causes the frame to be written uncompressed.
	fn compress(&self, content: &[u8]) -> Option<Vec<u8>>;
}

/// The set of payload transformations available for a single read or write
///
/// # Examples
///
/// ```rust
/// use id3kit::capability::{Capabilities, Decryptor};
///
/// struct Xor;
///
/// impl Decryptor for Xor {
/// 	fn decrypt(&self, _method: u8, content: &[u8]) -> Option<Vec<u8>> {
/// 		Some(content.iter().map(|b| b ^ 0x5A).collect())
/// 	}
/// }
///
/// let capabilities = Capabilities::new().decryptor(&Xor);
/// ```
#[derive(Copy, Clone, Default)]
pub struct Capabilities<'a> {
	pub(crate) decryptor: Option<&'a dyn Decryptor>,
	pub(crate) encryptor: Option<&'a dyn Encryptor>,
	pub(crate) decompressor: Option<&'a dyn Decompressor>,
	pub(crate) compressor: Option<&'a dyn Compressor>,
}

impl<'a> Capabilities<'a> {
	/// No capabilities, all transformed payloads are kept opaque
	pub const fn new() -> Self {
		Self {
			decryptor: None,
			encryptor: None,
			decompressor: None,
			compressor: None,
		}
	}

	/// Set the [`Decryptor`]
	pub fn decryptor(mut self, decryptor: &'a dyn Decryptor) -> Self {
		self.decryptor = Some(decryptor);
		self
	}

	/// Set the [`Encryptor`]
	pub fn encryptor(mut self, encryptor: &'a dyn Encryptor) -> Self {
		self.encryptor = Some(encryptor);
		self
	}

	/// Set the [`Decompressor`]
	pub fn decompressor(mut self, decompressor: &'a dyn Decompressor) -> Self {
		self.decompressor = Some(decompressor);
		self
	}

	/// Set the [`Compressor`]
	pub fn compressor(mut self, compressor: &'a dyn Compressor) -> Self {
		self.compressor = Some(compressor);
		self
	}
}

#[cfg(feature = "id3v2_compression_support")]
impl Capabilities<'static> {
	/// Capabilities with [`Zlib`] compression and decompression
	pub fn zlib() -> Self {
		static ZLIB: Zlib = Zlib;
		Self::new().decompressor(&ZLIB).compressor(&ZLIB)
	}
}

impl Debug for Capabilities<'_> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Capabilities")
			.field("decryptor", &self.decryptor.is_some())
			.field("encryptor", &self.encryptor.is_some())
			.field("decompressor", &self.decompressor.is_some())
			.field("compressor", &self.compressor.is_some())
			.finish()
	}
}

/// zlib compression, as used by the ID3v2 compression flag
#[cfg(feature = "id3v2_compression_support")]
#[derive(Copy, Clone, Debug, Default)]
pub struct Zlib;

#[cfg(feature = "id3v2_compression_support")]
impl Decompressor for Zlib {
	fn decompress(&self, content: &[u8]) -> Option<Vec<u8>> {
		use std::io::Read as _;

		let limit = crate::config::global_options().allocation_limit;

		let mut decompressed = Vec::new();
		let read = flate2::read::ZlibDecoder::new(content)
			.take((limit as u64).saturating_add(1))
			.read_to_end(&mut decompressed);

		match read {
			Ok(len) if len > limit => {
				log::warn!("Frame decompresses to more than the allocation limit ({limit} bytes)");
				None
			},
			Ok(_) => Some(decompressed),
			Err(e) => {
				log::warn!("Failed to decompress frame: {e}");
				None
			},
		}
	}
}

#[cfg(feature = "id3v2_compression_support")]
impl Compressor for Zlib {
	fn compress(&self, content: &[u8]) -> Option<Vec<u8>> {
		use std::io::Write as _;

		let mut encoder =
			flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
		encoder.write_all(content).ok()?;
		encoder.finish().ok()
	}
}

#[cfg(all(test, feature = "id3v2_compression_support"))]
mod tests {
	use super::{Capabilities, Compressor, Decompressor, Zlib};

	#[test_log::test]
	fn zlib_reversible() {
		let content = b"The quick brown fox jumps over the lazy dog".repeat(8);

		let compressed = Zlib.compress(&content).unwrap();
		assert!(compressed.len() < content.len());
		assert_eq!(Zlib.decompress(&compressed).unwrap(), content);
	}

	#[test_log::test]
	fn zlib_rejects_garbage() {
		assert!(Zlib.decompress(b"definitely not zlib").is_none());
	}

	#[test_log::test]
	fn zlib_respects_allocation_limit() {
		use crate::config::{GlobalOptions, apply_global_options};

		let content = vec![0; 4096];
		let compressed = Zlib.compress(&content).unwrap();

		apply_global_options(GlobalOptions::new().allocation_limit(1024));
		let limited = Zlib.decompress(&compressed);

		apply_global_options(GlobalOptions::new().allocation_limit(4096));
		let exact = Zlib.decompress(&compressed);

		apply_global_options(GlobalOptions::default());

		assert!(limited.is_none());
		assert_eq!(exact.unwrap(), content);
	}

	#[test_log::test]
	fn zlib_capabilities() {
		let capabilities = Capabilities::zlib();
		assert!(capabilities.decompressor.is_some());
		assert!(capabilities.compressor.is_some());
		assert!(capabilities.decryptor.is_none());
	}
}
