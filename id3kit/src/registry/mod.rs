//! Frame identifier registry
//!
//! The registry maps a frame identifier, as read from a tag of some [`Id3v2Version`], to the
//! identifier valid for any other version, along with the [`FrameFamily`] of the frame. It
//! also handles identifiers mangled by broken writers, such as ID3v2.2 identifiers padded into
//! a 4 character field.
//!
//! The table is built once, and never modified.

mod kinds;
mod table;

pub use kinds::{BinaryFrame, FrameKind, TextFrame, UrlFrame};

use crate::frame::FrameId;
use crate::frame::id::is_valid_id_byte;
use crate::version::Id3v2Version;
use table::{ROWS, Row};

use std::collections::HashMap;
use std::sync::OnceLock;

/// The broad category of a frame, used to pick a frame kind
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FrameFamily {
	/// Text information frames (`T***`)
	Text,
	/// URL link frames (`W***`)
	Url,
	/// Everything else, only available as a [`BinaryFrame`]
	Other,
}

impl FrameFamily {
	fn from_prefix(id: &str) -> Self {
		match id.as_bytes().first() {
			Some(b'T') => Self::Text,
			Some(b'W') => Self::Url,
			_ => Self::Other,
		}
	}
}

/// How an identifier was resolved
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ResolutionQuality {
	/// The identifier is known for the requested version
	Exact,
	/// The identifier was converted from another version, or recovered from a garbled identifier
	Converted,
	/// The identifier is unknown (or has no equivalent in the requested version), and was kept verbatim
	Generic,
}

/// The result of [`resolve`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
	/// The identifier to use
	pub id: FrameId,
	/// The family of the frame
	pub family: FrameFamily,
	/// How the identifier was found
	pub quality: ResolutionQuality,
}

impl Resolution {
	/// Whether [`Resolution::id`] can be stored in a tag of `version`
	pub fn fits(&self, version: Id3v2Version) -> bool {
		self.id.as_str().len() == version.layout().id_len
	}
}

struct Registry {
	// One map per version
	exact: [HashMap<&'static str, &'static Row>; 3],
	// Every known identifier, longest first
	all: Vec<(&'static str, &'static Row)>,
}

const VERSIONS: [Id3v2Version; 3] = [Id3v2Version::V2, Id3v2Version::V3, Id3v2Version::V4];

impl Registry {
	fn exact(&self, version: Id3v2Version, id: &str) -> Option<&'static Row> {
		self.exact[version_index(version)].get(id).copied()
	}
}

fn version_index(version: Id3v2Version) -> usize {
	match version {
		Id3v2Version::V2 => 0,
		Id3v2Version::V3 => 1,
		Id3v2Version::V4 => 2,
	}
}

fn column(row: &Row, version: Id3v2Version) -> Option<&'static str> {
	match version {
		Id3v2Version::V2 => row.v2,
		Id3v2Version::V3 => row.v3,
		Id3v2Version::V4 => row.v4,
	}
}

fn registry() -> &'static Registry {
	static INSTANCE: OnceLock<Registry> = OnceLock::new();
	INSTANCE.get_or_init(|| {
		let mut exact: [HashMap<&'static str, &'static Row>; 3] = Default::default();
		let mut all = Vec::new();

		for row in ROWS {
			for version in VERSIONS {
				if let Some(id) = column(row, version) {
					exact[version_index(version)].entry(id).or_insert(row);
					all.push((id, row));
				}
			}
		}

		all.sort_by_key(|(id, _)| std::cmp::Reverse(id.len()));

		Registry { exact, all }
	})
}

/// Resolve `id`, as found in (or destined for) a tag of `version`
///
/// Lookup order:
///
/// 1. An exact match for `version`
/// 2. A match for another version, converted to `version`
/// 3. For garbled identifiers (trailing `'\0'`/`' '`) or identifiers of the wrong length,
///    the longest known identifier contained in `id`, converted to `version`
/// 4. A generic frame, keeping the identifier as-is, with its family determined by its prefix
///
/// A match without an identifier for `version` is demoted to a generic frame.
///
/// # Examples
///
/// ```rust
/// use id3kit::Id3v2Version;
/// use id3kit::registry::{FrameFamily, ResolutionQuality, resolve};
///
/// let title = resolve("TT2", Id3v2Version::V4).unwrap();
/// assert_eq!(title.id, "TIT2");
/// assert_eq!(title.family, FrameFamily::Text);
/// assert_eq!(title.quality, ResolutionQuality::Converted);
///
/// let unknown = resolve("XABC", Id3v2Version::V4).unwrap();
/// assert_eq!(unknown.id, "XABC");
/// assert_eq!(unknown.quality, ResolutionQuality::Generic);
/// ```
///
/// Returns `None` if `id` has no usable characters at all.
pub fn resolve(id: &str, version: Id3v2Version) -> Option<Resolution> {
	let registry = registry();

	// Exact
	if let Some(row) = registry.exact(version, id) {
		return Some(Resolution {
			id: FrameId::from_static(column(row, version)?),
			family: row.family,
			quality: ResolutionQuality::Exact,
		});
	}

	let trimmed = id.trim_end_matches(['\0', ' ']);
	let garbled = trimmed.len() != id.len();
	let wrong_length = trimmed.len() != version.layout().id_len;

	let mut matched = VERSIONS
		.iter()
		.find_map(|other| registry.exact(*other, trimmed));

	if matched.is_none() && (garbled || wrong_length) {
		matched = registry
			.all
			.iter()
			.find(|(known, _)| trimmed.contains(known))
			.map(|(_, row)| *row);
	}

	if let Some(row) = matched {
		match column(row, version) {
			Some(converted) => {
				return Some(Resolution {
					id: FrameId::from_static(converted),
					family: row.family,
					quality: ResolutionQuality::Converted,
				});
			},
			None => log::trace!("Frame `{trimmed}` has no equivalent in {version:?}"),
		}
	}

	generic(trimmed)
}

fn generic(id: &str) -> Option<Resolution> {
	if !matches!(id.len(), 3 | 4) || !id.bytes().all(is_valid_id_byte) {
		return None;
	}

	Some(Resolution {
		id: FrameId::new(id.to_owned()).ok()?,
		family: FrameFamily::from_prefix(id),
		quality: ResolutionQuality::Generic,
	})
}

/// The family of a frame identifier, regardless of version
pub fn family_of(id: &FrameId) -> FrameFamily {
	let registry = registry();

	VERSIONS
		.iter()
		.find_map(|version| registry.exact(*version, id.as_str()))
		.map_or_else(|| FrameFamily::from_prefix(id.as_str()), |row| row.family)
}

#[cfg(test)]
mod tests {
	use super::{FrameFamily, ResolutionQuality, family_of, resolve};
	use crate::frame::FrameId;
	use crate::version::Id3v2Version;

	#[test_log::test]
	fn exact_match() {
		let resolution = resolve("TIT2", Id3v2Version::V3).unwrap();
		assert_eq!(resolution.id, "TIT2");
		assert_eq!(resolution.quality, ResolutionQuality::Exact);

		let resolution = resolve("PIC", Id3v2Version::V2).unwrap();
		assert_eq!(resolution.id, "PIC");
		assert_eq!(resolution.family, FrameFamily::Other);
	}

	#[test_log::test]
	fn legacy_to_modern() {
		let resolution = resolve("TT2", Id3v2Version::V4).unwrap();
		assert_eq!(resolution.id, "TIT2");
		assert_eq!(resolution.quality, ResolutionQuality::Converted);

		let resolution = resolve("TYE", Id3v2Version::V4).unwrap();
		assert_eq!(resolution.id, "TDRC");

		let resolution = resolve("TYER", Id3v2Version::V4).unwrap();
		assert_eq!(resolution.id, "TDRC");
	}

	#[test_log::test]
	fn modern_to_legacy() {
		let resolution = resolve("APIC", Id3v2Version::V2).unwrap();
		assert_eq!(resolution.id, "PIC");
		assert!(resolution.fits(Id3v2Version::V2));

		let resolution = resolve("TDRC", Id3v2Version::V3).unwrap();
		assert_eq!(resolution.id, "TYER");
	}

	#[test_log::test]
	fn garbled_identifier() {
		let resolution = resolve("TT2\0", Id3v2Version::V3).unwrap();
		assert_eq!(resolution.id, "TIT2");
		assert_eq!(resolution.quality, ResolutionQuality::Converted);

		let resolution = resolve("COM ", Id3v2Version::V4).unwrap();
		assert_eq!(resolution.id, "COMM");
	}

	#[test_log::test]
	fn unknown_valid_identifier_is_not_contained() {
		// "TT2" is contained in this identifier, but it is well-formed, so it's kept verbatim
		let resolution = resolve("XTT2", Id3v2Version::V4).unwrap();
		assert_eq!(resolution.id, "XTT2");
		assert_eq!(resolution.family, FrameFamily::Other);
		assert_eq!(resolution.quality, ResolutionQuality::Generic);
	}

	#[test_log::test]
	fn missing_version_is_demoted() {
		// TDAT was removed in ID3v2.4
		let resolution = resolve("TDAT", Id3v2Version::V4).unwrap();
		assert_eq!(resolution.id, "TDAT");
		assert_eq!(resolution.family, FrameFamily::Text);
		assert_eq!(resolution.quality, ResolutionQuality::Generic);

		// CRM only exists in ID3v2.2
		let resolution = resolve("CRM", Id3v2Version::V3).unwrap();
		assert!(!resolution.fits(Id3v2Version::V3));
	}

	#[test_log::test]
	fn family_fallback() {
		assert_eq!(
			resolve("TZZZ", Id3v2Version::V4).unwrap().family,
			FrameFamily::Text
		);
		assert_eq!(
			resolve("WZZZ", Id3v2Version::V4).unwrap().family,
			FrameFamily::Url
		);
		assert_eq!(
			resolve("ZZZZ", Id3v2Version::V4).unwrap().family,
			FrameFamily::Other
		);
		assert!(resolve("\0\0\0\0", Id3v2Version::V4).is_none());

		assert_eq!(family_of(&FrameId::new("WOAR").unwrap()), FrameFamily::Url);
	}
}
