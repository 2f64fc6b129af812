use crate::tag::TagFormat;

use std::ffi::OsStr;
use std::path::Path;

/// List of extensions recognized by [`FileType::from_ext`]
pub const EXTENSIONS: &[&str] = &[
	// Also update `FileType::from_ext()` below
	"mp3", "mp2", "mp1", "mpc", "mp+", "mpp", "wv", "ape", "aac", "flac", "ogg", "oga", "opus",
	"spx",
];

/// The type of file read
///
/// This decides where tags are searched for, and which format new tags are written in.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash)]
#[non_exhaustive]
pub enum FileType {
	/// A stream with tags at its edges: `[ID3v2][audio][APE][ID3v1]`
	///
	/// This covers MP3, Musepack, WavPack, and any other raw audio stream.
	Mpeg,
	/// A FLAC stream, with optional leading ID3v2
	Flac,
	/// An OGG Vorbis, Opus, or Speex stream
	///
	/// The Vorbis comments live in the second packet of the stream.
	Ogg,
}

impl FileType {
	/// The format new tags are written in, when none is present
	///
	/// # Examples
	///
	/// ```rust
	/// use tagmeld::file::FileType;
	/// use tagmeld::tag::TagFormat;
	///
	/// assert_eq!(FileType::Mpeg.default_format(), TagFormat::Id3v2);
	/// assert_eq!(FileType::Flac.default_format(), TagFormat::VorbisComments);
	/// ```
	pub fn default_format(&self) -> TagFormat {
		match self {
			FileType::Mpeg => TagFormat::Id3v2,
			FileType::Flac | FileType::Ogg => TagFormat::VorbisComments,
		}
	}

	/// Whether a tag of `format` can be stored in this type of file
	pub fn supports_format(&self, format: TagFormat) -> bool {
		match self {
			FileType::Mpeg => matches!(format, TagFormat::Id3v2 | TagFormat::Ape | TagFormat::Id3v1),
			FileType::Flac => matches!(format, TagFormat::Id3v2 | TagFormat::VorbisComments),
			FileType::Ogg => format == TagFormat::VorbisComments,
		}
	}

	/// Attempts to extract a [`FileType`] from an extension
	///
	/// # Examples
	///
	/// ```rust
	/// use tagmeld::file::FileType;
	///
	/// let extension = "mp3";
	/// assert_eq!(FileType::from_ext(extension), Some(FileType::Mpeg));
	/// ```
	pub fn from_ext<E>(ext: E) -> Option<Self>
	where
		E: AsRef<OsStr>,
	{
		let ext = ext.as_ref().to_str()?.to_ascii_lowercase();

		// Also update `EXTENSIONS` above
		match ext.trim_start_matches('.') {
			"mp3" | "mp2" | "mp1" | "mpc" | "mp+" | "mpp" | "wv" | "ape" | "aac" => Some(Self::Mpeg),
			"flac" => Some(Self::Flac),
			"ogg" | "oga" | "opus" | "spx" => Some(Self::Ogg),
			_ => None,
		}
	}

	/// Attempts to extract a [`FileType`] from a MIME type
	///
	/// # Examples
	///
	/// ```rust
	/// use tagmeld::file::FileType;
	///
	/// assert_eq!(FileType::from_mime("audio/x-flac"), Some(FileType::Flac));
	/// assert_eq!(FileType::from_mime("image/png"), None);
	/// ```
	pub fn from_mime(mime: &str) -> Option<Self> {
		match mime.trim().to_ascii_lowercase().as_str() {
			"audio/mpeg" | "audio/mp3" | "audio/mpa" | "audio/musepack" | "audio/x-musepack"
			| "audio/wavpack" | "audio/x-wavpack" | "audio/ape" | "audio/x-ape" | "audio/aac" => {
				Some(Self::Mpeg)
			},
			"audio/flac" | "audio/x-flac" => Some(Self::Flac),
			"audio/ogg" | "application/ogg" | "audio/vorbis" | "audio/opus" | "audio/speex"
			| "audio/x-speex" => Some(Self::Ogg),
			_ => None,
		}
	}

	/// Attempts to extract a [`FileType`] from a declared hint, either an extension or a MIME type
	pub fn from_hint(hint: &str) -> Option<Self> {
		if hint.contains('/') {
			return Self::from_mime(hint);
		}

		Self::from_ext(hint)
	}

	/// Attempts to determine a [`FileType`] from a path
	///
	/// # Examples
	///
	/// ```rust
	/// use std::path::Path;
	/// use tagmeld::file::FileType;
	///
	/// let path = Path::new("path/to/my.flac");
	/// assert_eq!(FileType::from_path(path), Some(FileType::Flac));
	/// ```
	pub fn from_path<P>(path: P) -> Option<Self>
	where
		P: AsRef<Path>,
	{
		let ext = path.as_ref().extension();
		ext.and_then(Self::from_ext)
	}

	/// Determine the [`FileType`] of a buffer holding an entire file
	///
	/// An `OggS` capture pattern at the very start makes an OGG stream. Otherwise, this skips a
	/// leading ID3v2 tag and looks for the `fLaC` marker. Anything else is considered
	/// [`FileType::Mpeg`].
	///
	/// # Examples
	///
	/// ```rust
	/// use tagmeld::file::FileType;
	///
	/// assert_eq!(FileType::sniff(b"fLaC\0\0\0\x22"), FileType::Flac);
	/// assert_eq!(FileType::sniff(b"OggS\0\x02"), FileType::Ogg);
	/// assert_eq!(FileType::sniff(&[0xFF, 0xFB, 0x90, 0x64]), FileType::Mpeg);
	/// ```
	pub fn sniff(data: &[u8]) -> Self {
		if data.starts_with(crate::ogg::CAPTURE_PATTERN) {
			return Self::Ogg;
		}

		let start = match crate::id3::find_id3v2(data, 0) {
			Ok(Some(region)) => region.end,
			_ => 0,
		};

		if data[start..].starts_with(crate::flac::STREAM_MARKER) {
			return Self::Flac;
		}

		Self::Mpeg
	}
}

#[cfg(test)]
mod tests {
	use super::FileType;

	#[test_log::test]
	fn hints() {
		assert_eq!(FileType::from_hint("MP3"), Some(FileType::Mpeg));
		assert_eq!(FileType::from_hint(".flac"), Some(FileType::Flac));
		assert_eq!(FileType::from_hint("audio/flac"), Some(FileType::Flac));
		assert_eq!(FileType::from_hint("audio/mpeg"), Some(FileType::Mpeg));
		assert_eq!(FileType::from_hint("opus"), Some(FileType::Ogg));
		assert_eq!(FileType::from_hint("audio/ogg"), Some(FileType::Ogg));
		assert_eq!(FileType::from_hint("wav"), None);
	}

	#[test_log::test]
	fn sniff_past_id3v2() {
		let mut data = b"ID3\x04\x00\x00\x00\x00\x00\x00".to_vec();
		data.extend_from_slice(b"fLaC");
		assert_eq!(FileType::sniff(&data), FileType::Flac);

		assert_eq!(FileType::sniff(&[]), FileType::Mpeg);
	}
}
