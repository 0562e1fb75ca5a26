//! Various traits for reading and writing to file-like objects

use crate::error::Id3Error;

use std::collections::VecDeque;
use std::fs::File;
use std::io::{Cursor, Read, Seek, SeekFrom, Write};

/// Provides a method to truncate an object to the specified length
///
/// This is one component of the [`FileLike`] trait, which is used to provide implementors access to
/// [`Tag::save_to`](crate::tag::Tag::save_to) and [`Tag::remove_from`](crate::tag::Tag::remove_from).
///
/// Take great care in implementing this for downstream types, as id3kit will assume that the
/// container has the new length specified. If this assumption were to be broken, files **will** become corrupted.
///
/// # Examples
///
/// ```rust
/// use id3kit::io::Truncate;
///
/// let mut data = vec![1, 2, 3, 4, 5];
/// Truncate::truncate(&mut data, 3).unwrap();
///
/// assert_eq!(data, vec![1, 2, 3]);
/// ```
pub trait Truncate {
	/// The error type of the truncation operation
	type Error: Into<Id3Error>;

	/// Truncate a storage object to the specified length
	///
	/// # Errors
	///
	/// Errors depend on the object being truncated, which may not always be fallible.
	fn truncate(&mut self, new_len: u64) -> std::result::Result<(), Self::Error>;
}

impl Truncate for File {
	type Error = std::io::Error;

	fn truncate(&mut self, new_len: u64) -> std::result::Result<(), Self::Error> {
		self.set_len(new_len)
	}
}

impl Truncate for Vec<u8> {
	type Error = std::convert::Infallible;

	fn truncate(&mut self, new_len: u64) -> std::result::Result<(), Self::Error> {
		self.truncate(new_len as usize);
		Ok(())
	}
}

impl Truncate for VecDeque<u8> {
	type Error = std::convert::Infallible;

	fn truncate(&mut self, new_len: u64) -> std::result::Result<(), Self::Error> {
		self.truncate(new_len as usize);
		Ok(())
	}
}

impl<T> Truncate for Cursor<T>
where
	T: Truncate,
{
	type Error = <T as Truncate>::Error;

	fn truncate(&mut self, new_len: u64) -> std::result::Result<(), Self::Error> {
		self.get_mut().truncate(new_len)
	}
}

impl<T> Truncate for &mut T
where
	T: Truncate,
{
	type Error = <T as Truncate>::Error;

	fn truncate(&mut self, new_len: u64) -> std::result::Result<(), Self::Error> {
		(**self).truncate(new_len)
	}
}

/// Provides a method to get the length of a storage object
///
/// This is one component of the [`FileLike`] trait.
///
/// # Examples
///
/// ```rust
/// use id3kit::io::Length;
///
/// let data = vec![1, 2, 3, 4, 5];
/// assert_eq!(Length::len(&data).unwrap(), 5);
/// ```
pub trait Length {
	/// The error type of the length operation
	type Error: Into<Id3Error>;

	/// Get the length of a storage object
	///
	/// # Errors
	///
	/// Errors depend on the object being read, which may not always be fallible.
	fn len(&self) -> std::result::Result<u64, Self::Error>;
}

impl Length for File {
	type Error = std::io::Error;

	fn len(&self) -> std::result::Result<u64, Self::Error> {
		self.metadata().map(|m| m.len())
	}
}

impl Length for Vec<u8> {
	type Error = std::convert::Infallible;

	fn len(&self) -> std::result::Result<u64, Self::Error> {
		Ok(self.len() as u64)
	}
}

impl Length for VecDeque<u8> {
	type Error = std::convert::Infallible;

	fn len(&self) -> std::result::Result<u64, Self::Error> {
		Ok(self.len() as u64)
	}
}

impl<T> Length for Cursor<T>
where
	T: Length,
{
	type Error = <T as Length>::Error;

	fn len(&self) -> std::result::Result<u64, Self::Error> {
		Length::len(self.get_ref())
	}
}

impl<T> Length for &T
where
	T: Length,
{
	type Error = <T as Length>::Error;

	fn len(&self) -> std::result::Result<u64, Self::Error> {
		Length::len(*self)
	}
}

impl<T> Length for &mut T
where
	T: Length,
{
	type Error = <T as Length>::Error;

	fn len(&self) -> std::result::Result<u64, Self::Error> {
		Length::len(*self)
	}
}

/// Provides a set of methods to read and write to a file-like object
///
/// This is a combination of the [`Read`], [`Write`], [`Seek`], [`Truncate`], and [`Length`] traits.
///
/// Take great care in implementing this for downstream types, as id3kit will assume that the
/// trait implementations are correct. If this assumption were to be broken, files **may** become corrupted.
pub trait FileLike: Read + Write + Seek + Truncate + Length
where
	<Self as Truncate>::Error: Into<Id3Error>,
	<Self as Length>::Error: Into<Id3Error>,
{
}

impl<T> FileLike for T
where
	T: Read + Write + Seek + Truncate + Length,
	<T as Truncate>::Error: Into<Id3Error>,
	<T as Length>::Error: Into<Id3Error>,
{
}

/// Replace `range` of the file with `replacement`, shifting the remainder of the file
pub(crate) fn splice_in_place<F>(
	file: &mut F,
	start: u64,
	end: u64,
	replacement: &[u8],
) -> crate::error::Result<()>
where
	F: FileLike,
	Id3Error: From<<F as Truncate>::Error>,
	Id3Error: From<<F as Length>::Error>,
{
	let file_len = Length::len(file)?;

	file.seek(SeekFrom::Start(end))?;
	let mut remainder = Vec::new();
	file.read_to_end(&mut remainder)?;

	file.seek(SeekFrom::Start(start))?;
	file.write_all(replacement)?;
	file.write_all(&remainder)?;

	let new_len = start + replacement.len() as u64 + remainder.len() as u64;
	if new_len < file_len {
		file.truncate(new_len)?;
	}

	file.seek(SeekFrom::Start(0))?;
	Ok(())
}
