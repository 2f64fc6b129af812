//! Contains the errors that can arise within tagmeld
//!
//! The primary error is [`TagmeldError`]. The type of error is determined by [`ErrorKind`],
//! which can be extended at any time. Every kind belongs to one [`ErrorCategory`], which is
//! what callers usually branch on.

use crate::tag::TagFormat;
pub use crate::util::text::TextEncodingError;

use std::collections::TryReserveError;
use std::fmt::{Debug, Display, Formatter};

/// Alias for `Result<T, TagmeldError>`
pub type Result<T> = std::result::Result<T, TagmeldError>;

/// The broad class of an error
///
/// * `Format`: the bytes of a tag or container do not match the expected framing. During a read,
///   these are isolated to the offending tag.
/// * `Value`: an edited value cannot be represented under the current write settings. The save
///   is aborted.
/// * `Io`: the source could not be read or written.
/// * `Consistency`: size/offset bookkeeping would have produced a contradictory file. This is
///   never expected, and the save is aborted.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
	/// Malformed, truncated, or unsupported tag bytes
	Format,
	/// A value that cannot be written under the current settings
	Value,
	/// The underlying source failed
	Io,
	/// Internal size/offset bookkeeping failed
	Consistency,
}

/// The types of errors that can occur
#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
	// File data related errors
	/// Attempting to read/write an abnormally large amount of data
	TooMuchData,
	/// Expected the data to be a different size than provided
	///
	/// This occurs when the size of an item is written as one value, but that size is either too
	/// big or small to be valid within the bounds of that item.
	SizeMismatch,
	/// Errors that occur while decoding a tag or container
	FileDecoding(FileDecodingError),

	// Picture related errors
	/// Provided an invalid picture
	NotAPicture,

	// Tag related errors
	/// Arises when a tag is expected (Ex. found an "APETAGEX" preamble), but isn't found
	FakeTag,
	/// Errors that arise while decoding text
	TextDecode(&'static str),
	/// Errors that arise while encoding text
	TextEncode(TextEncodingError),
	/// An edited value cannot be represented by the target format
	Value(ValueError),
	/// Errors that arise while reading/writing ID3v2 tags
	Id3v2(Id3v2Error),

	/// Size and offset bookkeeping produced a contradictory result
	Consistency(&'static str),

	// Conversions for external errors
	/// Errors that arise while parsing OGG pages
	OggPage(ogg_pager::PageError),
	/// Unable to convert bytes to a str
	StrFromUtf8(std::str::Utf8Error),
	/// Represents all cases of [`std::io::Error`].
	Io(std::io::Error),
	/// Failure to allocate enough memory
	Alloc(TryReserveError),
	/// This should **never** be encountered
	Infallible(std::convert::Infallible),
}

impl ErrorKind {
	/// The [`ErrorCategory`] of this kind
	///
	/// An unexpected end of input is a [`ErrorCategory::Format`] error, as every tag is decoded
	/// from memory. Truncated framing is the only way to run out of bytes.
	///
	/// # Examples
	///
	/// ```rust
	/// use tagmeld::error::{ErrorCategory, ErrorKind, TagmeldError};
	///
	/// let err = TagmeldError::new(ErrorKind::SizeMismatch);
	/// assert_eq!(err.kind().category(), ErrorCategory::Format);
	/// ```
	pub fn category(&self) -> ErrorCategory {
		match self {
			Self::TooMuchData
			| Self::SizeMismatch
			| Self::FileDecoding(_)
			| Self::NotAPicture
			| Self::FakeTag
			| Self::TextDecode(_)
			| Self::Id3v2(_)
			| Self::OggPage(_)
			| Self::StrFromUtf8(_) => ErrorCategory::Format,
			Self::TextEncode(_) | Self::Value(_) => ErrorCategory::Value,
			Self::Io(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => {
				ErrorCategory::Format
			},
			Self::Io(_) | Self::Alloc(_) => ErrorCategory::Io,
			Self::Infallible(_) => ErrorCategory::Consistency,
			Self::Consistency(_) => ErrorCategory::Consistency,
		}
	}
}

/// A value that could not be written
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueError {
	format: TagFormat,
	field: String,
	reason: &'static str,
}

impl ValueError {
	/// Create a `ValueError` for `field` in `format`
	#[must_use]
	pub fn new(format: TagFormat, field: impl Into<String>, reason: &'static str) -> Self {
		Self {
			format,
			field: field.into(),
			reason,
		}
	}

	/// The format the value was being written to
	pub fn format(&self) -> TagFormat {
		self.format
	}

	/// The field or key that holds the value
	pub fn field(&self) -> &str {
		&self.field
	}

	/// Why the value was rejected
	pub fn reason(&self) -> &str {
		self.reason
	}
}

impl Display for ValueError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"{:?}: unable to write `{}`: {}",
			self.format, self.field, self.reason
		)
	}
}

/// The types of errors that can occur while interacting with ID3v2 tags
#[derive(Debug)]
#[non_exhaustive]
pub enum Id3v2ErrorKind {
	// Header
	/// Arises when an invalid ID3v2 version is found
	BadId3v2Version(u8, u8),
	/// Arises when a compressed ID3v2.2 tag is encountered
	///
	/// No compression scheme was ever defined for ID3v2.2, so such tags are skipped entirely.
	V2Compression,
	/// Arises when an extended header has an invalid size (must be >= 6 bytes and less than the total tag size)
	BadExtendedHeaderSize,

	// Frame
	/// Arises when a frame ID contains invalid characters (must be within `'A'..'Z'` or `'0'..'9'`)
	BadFrameId(Vec<u8>),
	/// Arises when a frame doesn't have enough data
	BadFrameLength,
	/// Arises when a compressed frame has no data length indicator
	MissingDataLengthIndicator,
	/// Arises when a picture frame has an unreadable image format
	BadPictureFormat(String),

	// Compression
	#[cfg(feature = "id3v2_compression_support")]
	/// Arises when a compressed frame is unable to be decompressed
	Decompression(std::io::Error),
}

impl Display for Id3v2ErrorKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			// Header
			Self::BadId3v2Version(major, minor) => write!(
				f,
				"Found an invalid version (v{major}.{minor}), expected any major revision in: (2, \
				 3, 4)"
			),
			Self::V2Compression => write!(f, "Encountered a compressed ID3v2.2 tag"),
			Self::BadExtendedHeaderSize => {
				write!(f, "Found an extended header with an invalid size")
			},

			// Frame
			Self::BadFrameId(frame_id) => write!(f, "Failed to parse a frame ID: 0x{frame_id:x?}"),
			Self::BadFrameLength => write!(
				f,
				"Frame isn't long enough to extract the necessary information"
			),
			Self::MissingDataLengthIndicator => write!(
				f,
				"Encountered a compressed frame without a data length indicator"
			),
			Self::BadPictureFormat(format) => {
				write!(f, "Picture: Found unexpected format \"{format}\"")
			},

			// Compression
			#[cfg(feature = "id3v2_compression_support")]
			Self::Decompression(err) => write!(f, "Failed to decompress frame: {err}"),
		}
	}
}

/// An error that arises while interacting with an ID3v2 tag
pub struct Id3v2Error {
	kind: Id3v2ErrorKind,
}

impl Id3v2Error {
	/// Create a new `Id3v2Error` from an [`Id3v2ErrorKind`]
	#[must_use]
	pub const fn new(kind: Id3v2ErrorKind) -> Self {
		Self { kind }
	}

	/// Returns the [`Id3v2ErrorKind`]
	pub fn kind(&self) -> &Id3v2ErrorKind {
		&self.kind
	}
}

impl Debug for Id3v2Error {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "ID3v2: {:?}", self.kind)
	}
}

impl Display for Id3v2Error {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "ID3v2: {}", self.kind)
	}
}

/// An error that arises while decoding a tag or its container
pub struct FileDecodingError {
	format: Option<TagFormat>,
	description: &'static str,
}

impl FileDecodingError {
	/// Create a `FileDecodingError` from a [`TagFormat`] and description
	///
	/// # Examples
	///
	/// ```rust
	/// use tagmeld::error::FileDecodingError;
	/// use tagmeld::tag::TagFormat;
	///
	/// let ape_error = FileDecodingError::new(TagFormat::Ape, "APE tag has an invalid size");
	/// assert_eq!(ape_error.format(), Some(TagFormat::Ape));
	/// assert_eq!(ape_error.to_string(), "Ape: APE tag has an invalid size");
	/// ```
	#[must_use]
	pub const fn new(format: TagFormat, description: &'static str) -> Self {
		Self {
			format: Some(format),
			description,
		}
	}

	/// Create a `FileDecodingError` without binding it to a [`TagFormat`]
	///
	/// This is used for container level failures, such as a broken FLAC block.
	pub fn from_description(description: &'static str) -> Self {
		Self {
			format: None,
			description,
		}
	}

	/// Returns the associated [`TagFormat`], if one exists
	pub fn format(&self) -> Option<TagFormat> {
		self.format
	}

	/// Returns the error description
	pub fn description(&self) -> &str {
		self.description
	}
}

impl Debug for FileDecodingError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self.format {
			Some(format) => write!(f, "{format:?}: {:?}", self.description),
			None => write!(f, "{:?}", self.description),
		}
	}
}

impl Display for FileDecodingError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self.format {
			Some(format) => write!(f, "{format:?}: {}", self.description),
			None => f.write_str(self.description),
		}
	}
}

/// Errors that could occur within tagmeld
pub struct TagmeldError {
	pub(crate) kind: ErrorKind,
}

impl TagmeldError {
	/// Create a `TagmeldError` from an [`ErrorKind`]
	///
	/// # Examples
	///
	/// ```rust
	/// use tagmeld::error::{ErrorKind, TagmeldError};
	///
	/// let fake_tag = TagmeldError::new(ErrorKind::FakeTag);
	/// ```
	#[must_use]
	pub const fn new(kind: ErrorKind) -> Self {
		Self { kind }
	}

	/// Returns the [`ErrorKind`]
	pub fn kind(&self) -> &ErrorKind {
		&self.kind
	}

	/// Shorthand for `self.kind().category()`
	pub fn category(&self) -> ErrorCategory {
		self.kind.category()
	}
}

impl std::error::Error for TagmeldError {}

impl Debug for TagmeldError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:?}", self.kind)
	}
}

macro_rules! impl_from {
	($($source:ty => $variant:ident),+ $(,)?) => {
		$(
			impl From<$source> for TagmeldError {
				fn from(input: $source) -> Self {
					Self::new(ErrorKind::$variant(input))
				}
			}
		)+
	};
}

impl_from! {
	Id3v2Error => Id3v2,
	FileDecodingError => FileDecoding,
	ValueError => Value,
	TextEncodingError => TextEncode,
	ogg_pager::PageError => OggPage,
	std::io::Error => Io,
	std::str::Utf8Error => StrFromUtf8,
	TryReserveError => Alloc,
	std::convert::Infallible => Infallible,
}

impl Display for TagmeldError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self.kind {
			// Conversions
			ErrorKind::OggPage(ref err) => write!(f, "{err}"),
			ErrorKind::StrFromUtf8(ref err) => write!(f, "{err}"),
			ErrorKind::Io(ref err) => write!(f, "{err}"),
			ErrorKind::Alloc(ref err) => write!(f, "{err}"),
			ErrorKind::Infallible(_) => write!(f, "A expected condition was not upheld"),

			ErrorKind::NotAPicture => write!(f, "Picture: Encountered invalid data"),
			ErrorKind::FakeTag => write!(f, "Reading: Expected a tag, found invalid data"),
			ErrorKind::TextDecode(message) => write!(f, "Text decoding: {message}"),
			ErrorKind::TextEncode(ref message) => write!(f, "Text encoding: {message}"),
			ErrorKind::Value(ref value_err) => write!(f, "{value_err}"),
			ErrorKind::Id3v2(ref id3v2_err) => write!(f, "{id3v2_err}"),
			ErrorKind::Consistency(message) => {
				write!(f, "Internal consistency check failed: {message}")
			},

			// Files
			ErrorKind::TooMuchData => write!(
				f,
				"Attempted to read/write an abnormally large amount of data"
			),
			ErrorKind::SizeMismatch => write!(
				f,
				"Encountered an invalid item size, either too big or too small to be valid"
			),
			ErrorKind::FileDecoding(ref file_decode_err) => write!(f, "{file_decode_err}"),
		}
	}
}
