//! Various traits for reading and writing to file-like objects

use crate::error::{Result, TagmeldError};

use std::fs::File;
use std::io::{Cursor, Read, Seek, SeekFrom, Write};

/// Provides a method to truncate an object to the specified length
///
/// This is one component of the [`FileLike`] trait, which is used to provide implementors access to
/// [`TaggedFile::save_to`](crate::file::TaggedFile::save_to).
///
/// Take great care in implementing this for downstream types, as tagmeld will assume that the
/// container has the new length specified. If this assumption were to be broken, files **will** become corrupted.
///
/// # Examples
///
/// ```rust
/// use tagmeld::io::Truncate;
///
/// let mut data = vec![1, 2, 3, 4, 5];
/// Truncate::truncate(&mut data, 3).unwrap();
///
/// assert_eq!(data, vec![1, 2, 3]);
/// ```
pub trait Truncate {
	/// The error type of the truncation operation
	type Error: Into<TagmeldError>;

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
/// This is one component of the [`FileLike`] trait, which is used to provide implementors access to
/// [`TaggedFile::save_to`](crate::file::TaggedFile::save_to).
///
/// # Examples
///
/// ```rust
/// use tagmeld::io::Length;
///
/// let data = vec![1, 2, 3, 4, 5];
/// assert_eq!(Length::len(&data).unwrap(), 5);
/// ```
pub trait Length {
	/// The error type of the length operation
	type Error: Into<TagmeldError>;

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

impl<T> Length for Cursor<T>
where
	T: Length,
{
	type Error = <T as Length>::Error;

	fn len(&self) -> std::result::Result<u64, Self::Error> {
		Length::len(self.get_ref())
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
/// It is used to provide implementors access to [`TaggedFile::save_to`](crate::file::TaggedFile::save_to).
///
/// Take great care in implementing this for downstream types, as tagmeld will assume that the
/// trait implementations are correct. If this assumption were to be broken, files **may** become corrupted.
pub trait FileLike: Read + Write + Seek + Truncate + Length
where
	<Self as Truncate>::Error: Into<TagmeldError>,
	<Self as Length>::Error: Into<TagmeldError>,
{
}

impl<T> FileLike for T
where
	T: Read + Write + Seek + Truncate + Length,
	<T as Truncate>::Error: Into<TagmeldError>,
	<T as Length>::Error: Into<TagmeldError>,
{
}

/// Read an entire stream from its start, leaving it rewound
pub(crate) fn read_whole<R>(reader: &mut R, limit: u64) -> Result<Vec<u8>>
where
	R: Read + Seek,
{
	let len = reader.seek(SeekFrom::End(0))?;
	reader.rewind()?;

	if len > limit {
		crate::macros::err!(TooMuchData);
	}

	let mut content = Vec::new();
	content.try_reserve_exact(len as usize)?;
	reader.read_to_end(&mut content)?;
	reader.rewind()?;

	Ok(content)
}

/// Replace the entire content of `file` with `content`, leaving it rewound
pub(crate) fn commit<F>(file: &mut F, content: &[u8]) -> Result<()>
where
	F: FileLike,
	<F as Truncate>::Error: Into<TagmeldError>,
	<F as Length>::Error: Into<TagmeldError>,
{
	file.rewind()?;
	file.write_all(content)?;
	file.truncate(content.len() as u64).map_err(Into::into)?;
	file.flush()?;
	file.rewind()?;

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::{Length, commit, read_whole};

	use std::io::{Cursor, Seek};

	#[test_log::test]
	fn commit_shrinks_and_rewinds() {
		let mut file = Cursor::new(vec![1, 2, 3, 4, 5, 6]);
		file.seek(std::io::SeekFrom::Start(4)).unwrap();

		commit(&mut file, &[9, 9]).unwrap();

		assert_eq!(file.stream_position().unwrap(), 0);
		assert_eq!(Length::len(&file).unwrap(), 2);
		assert_eq!(file.into_inner(), vec![9, 9]);
	}

	#[test_log::test]
	fn commit_grows() {
		let mut file = Cursor::new(vec![1, 2]);
		commit(&mut file, &[7, 7, 7, 7]).unwrap();
		assert_eq!(file.get_ref(), &vec![7, 7, 7, 7]);
	}

	#[test_log::test]
	fn read_whole_respects_limit() {
		let mut file = Cursor::new(vec![0; 64]);
		assert_eq!(read_whole(&mut file, 1024).unwrap().len(), 64);
		assert!(read_whole(&mut file, 16).is_err());
	}
}
