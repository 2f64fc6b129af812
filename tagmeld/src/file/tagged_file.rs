use super::FileType;
use crate::config::{EngineConfig, global_config};
use crate::error::{Result, TagmeldError};
use crate::rewrite::{self, SavePlan, TagLayout};
use crate::tag::{Tag, TagFormat};
use crate::util::io::{FileLike, Length, Truncate, commit, read_whole};

use std::fs::OpenOptions;
use std::io::{Read, Seek};
use std::path::Path;

/// A file with its tags read and merged
///
/// This holds the merged [`Tag`], as well as the [`TagLayout`] needed to write edits back.
///
/// # Examples
///
/// ```rust
/// use std::io::Cursor;
/// use tagmeld::config::EngineConfig;
/// use tagmeld::file::{FileType, TaggedFile};
///
/// # fn main() -> tagmeld::error::Result<()> {
/// // A file with nothing but a single MPEG frame header
/// let original = vec![0xFF, 0xFB, 0x90, 0x64];
///
/// let config = EngineConfig::new();
/// let tagged_file = TaggedFile::read_from(&mut Cursor::new(&original), Some("mp3"), &config)?;
/// assert_eq!(tagged_file.file_type(), FileType::Mpeg);
/// assert!(tagged_file.tag().is_empty());
///
/// let mut edited = tagged_file.tag().clone();
/// edited.set_artist("Nintendo Sound Scream");
///
/// let saved = tagged_file.save(&original, &edited, &config)?;
/// let reread = TaggedFile::read_from(&mut Cursor::new(&saved), Some("mp3"), &config)?;
/// assert_eq!(reread.tag().artist(), Some("Nintendo Sound Scream"));
/// # Ok(()) }
/// ```
#[derive(Debug)]
pub struct TaggedFile {
	tag: Tag,
	layout: TagLayout,
	decode_errors: Vec<(TagFormat, TagmeldError)>,
}

impl TaggedFile {
	/// Read a file from a reader
	///
	/// The entire stream is read, and the reader is left at its start.
	///
	/// `hint` is the file's extension or MIME type, if known. Without a usable hint, the type is
	/// determined from the content.
	///
	/// A tag that fails to decode doesn't fail the read, see [`TaggedFile::decode_errors`].
	///
	/// # Errors
	///
	/// * Unable to read from `reader`
	/// * The file is structurally invalid, such as a FLAC file without a `STREAMINFO` block
	pub fn read_from<R>(reader: &mut R, hint: Option<&str>, config: &EngineConfig) -> Result<Self>
	where
		R: Read + Seek,
	{
		let data = read_whole(reader, u64::MAX)?;

		let file_type = hint
			.and_then(FileType::from_hint)
			.unwrap_or_else(|| FileType::sniff(&data));

		Self::read_from_bytes(&data, file_type, config)
	}

	/// Read a file from a path, using the current thread's [`global_config`]
	///
	/// The file type is taken from the extension, or determined from the content.
	///
	/// # Errors
	///
	/// See [`TaggedFile::read_from`]
	pub fn read_from_path<P>(path: P) -> Result<Self>
	where
		P: AsRef<Path>,
	{
		let config = global_config();
		let path = path.as_ref();

		let hint = path.extension().and_then(|ext| ext.to_str());
		let mut file = std::fs::File::open(path)?;

		Self::read_from(&mut file, hint, &config)
	}

	/// Read a file that is already in memory
	///
	/// # Errors
	///
	/// See [`TaggedFile::read_from`]
	pub fn read_from_bytes(data: &[u8], file_type: FileType, config: &EngineConfig) -> Result<Self> {
		log::debug!("Reading {file_type:?} file ({} bytes)", data.len());

		let (layout, decode_errors) = TagLayout::scan(data, file_type, config.parse)?;
		let tag = layout.resolve(&config.merge);

		Ok(Self {
			tag,
			layout,
			decode_errors,
		})
	}

	/// The type of the file
	pub fn file_type(&self) -> FileType {
		self.layout.file_type()
	}

	/// The merged tag, see [`resolve`](crate::resolve::resolve)
	pub fn tag(&self) -> &Tag {
		&self.tag
	}

	/// Where every tag of the file was found
	pub fn layout(&self) -> &TagLayout {
		&self.layout
	}

	/// The tags that failed to decode
	///
	/// These tags are not merged, but are kept as-is when the file is saved.
	pub fn decode_errors(&self) -> &[(TagFormat, TagmeldError)] {
		&self.decode_errors
	}

	/// Plan saving `edited`, without writing anything
	///
	/// # Errors
	///
	/// See [`rewrite::plan`]
	pub fn plan(&self, edited: &Tag, config: &EngineConfig) -> Result<SavePlan> {
		rewrite::plan(&self.layout, &self.tag, edited, config)
	}

	/// Produce the bytes of the file with `edited` written
	///
	/// `edited` is compared against [`TaggedFile::tag`], only the differences are written.
	/// `original` must be the bytes this file was read from.
	///
	/// # Errors
	///
	/// * `original` is not the file this was read from
	/// * A value can't be represented in one of the target formats
	pub fn save(&self, original: &[u8], edited: &Tag, config: &EngineConfig) -> Result<Vec<u8>> {
		rewrite::rewrite_from(original, &self.layout, &self.tag, edited, config)
	}

	/// Write `edited` to `file` in place, then read it again
	///
	/// `file` must be the file this was read from. Nothing is written unless the entire new file
	/// was built successfully. The file is left at its start.
	///
	/// # Errors
	///
	/// * See [`TaggedFile::save`]
	/// * Unable to read from or write to `file`
	pub fn save_to<F>(&mut self, file: &mut F, edited: &Tag, config: &EngineConfig) -> Result<()>
	where
		F: FileLike,
		<F as Truncate>::Error: Into<TagmeldError>,
		<F as Length>::Error: Into<TagmeldError>,
	{
		let original = read_whole(file, u64::MAX)?;
		let content = self.save(&original, edited, config)?;

		self.commit_and_reread(file, &original, content, config)
	}

	/// Write `edited` to the file at `path`, using the current thread's [`global_config`]
	///
	/// # Errors
	///
	/// See [`TaggedFile::save_to`]
	pub fn save_to_path<P>(&mut self, path: P, edited: &Tag) -> Result<()>
	where
		P: AsRef<Path>,
	{
		let config = global_config();
		let mut file = OpenOptions::new().read(true).write(true).open(path)?;

		self.save_to(&mut file, edited, &config)
	}

	/// Produce the bytes of the file without its tag of `format`
	///
	/// # Errors
	///
	/// `original` is not the file this was read from
	pub fn remove(&self, original: &[u8], format: TagFormat, config: &EngineConfig) -> Result<Vec<u8>> {
		rewrite::remove(original, &self.layout, format, config)
	}

	/// Remove the tag of `format` from `file` in place, then read it again
	///
	/// # Errors
	///
	/// * See [`TaggedFile::remove`]
	/// * Unable to read from or write to `file`
	pub fn remove_from<F>(&mut self, file: &mut F, format: TagFormat, config: &EngineConfig) -> Result<()>
	where
		F: FileLike,
		<F as Truncate>::Error: Into<TagmeldError>,
		<F as Length>::Error: Into<TagmeldError>,
	{
		let original = read_whole(file, u64::MAX)?;
		let content = self.remove(&original, format, config)?;

		self.commit_and_reread(file, &original, content, config)
	}

	fn commit_and_reread<F>(
		&mut self,
		file: &mut F,
		original: &[u8],
		content: Vec<u8>,
		config: &EngineConfig,
	) -> Result<()>
	where
		F: FileLike,
		<F as Truncate>::Error: Into<TagmeldError>,
		<F as Length>::Error: Into<TagmeldError>,
	{
		if content == original {
			log::debug!("Nothing changed, not writing");
			return Ok(());
		}

		commit(file, &content)?;
		*self = Self::read_from_bytes(&content, self.file_type(), config)?;

		Ok(())
	}
}
