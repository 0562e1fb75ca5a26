/// Why a [`Payload`] could not be resolved
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OpaqueReason {
	/// No [`Decryptor`](crate::capability::Decryptor) was available, or it failed
	Encrypted,
	/// No [`Decompressor`](crate::capability::Decompressor) was available, it failed, or
	/// produced the wrong amount of data
	Compressed,
}

/// The content of a frame
///
/// A payload is [`Payload::Resolved`] once all frame level transformations (encryption,
/// compression, unsynchronisation) have been reversed. Otherwise, the bytes are kept exactly
/// as they were read, and will be written back unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Payload {
	/// The plain frame content
	Resolved(Vec<u8>),
	/// Content that is still encrypted or compressed
	Opaque {
		/// The transformation that could not be reversed
		reason: OpaqueReason,
		/// The content as stored in the frame, after the extra header fields
		bytes: Vec<u8>,
	},
}

impl Payload {
	/// The payload bytes, regardless of their state
	pub fn bytes(&self) -> &[u8] {
		match self {
			Payload::Resolved(bytes) | Payload::Opaque { bytes, .. } => bytes,
		}
	}

	/// The plain frame content, if it was resolved
	pub fn resolved(&self) -> Option<&[u8]> {
		match self {
			Payload::Resolved(bytes) => Some(bytes),
			Payload::Opaque { .. } => None,
		}
	}

	/// Whether the payload is [`Payload::Opaque`]
	pub fn is_opaque(&self) -> bool {
		matches!(self, Payload::Opaque { .. })
	}

	/// Whether the payload has no bytes
	pub fn is_empty(&self) -> bool {
		self.bytes().is_empty()
	}

	/// Consumes the payload, returning the bytes
	pub fn into_bytes(self) -> Vec<u8> {
		match self {
			Payload::Resolved(bytes) | Payload::Opaque { bytes, .. } => bytes,
		}
	}
}

impl From<Vec<u8>> for Payload {
	fn from(input: Vec<u8>) -> Self {
		Payload::Resolved(input)
	}
}
