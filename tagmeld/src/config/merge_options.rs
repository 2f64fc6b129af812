use crate::tag::TagFormat;

/// An ordered list of [`TagFormat`]s, in descending authority
///
/// Each format appears at most once. Formats that aren't listed are ignored when merging.
///
/// # Examples
///
/// ```rust
/// use tagmeld::config::TagPriority;
/// use tagmeld::tag::TagFormat;
///
/// let mut priority = TagPriority::empty();
/// priority.push(TagFormat::Ape);
/// priority.push(TagFormat::Id3v2);
///
/// // Pushing a format again moves it to the back
/// priority.push(TagFormat::Ape);
/// assert_eq!(priority.iter().collect::<Vec<_>>(), [TagFormat::Id3v2, TagFormat::Ape]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagPriority {
	formats: Vec<TagFormat>,
}

impl TagPriority {
	/// Create an empty `TagPriority`
	///
	/// With an empty priority list, merging yields an empty tag.
	pub fn empty() -> Self {
		Self {
			formats: Vec::new(),
		}
	}

	/// Append a format as the least authoritative one
	///
	/// If the format is already listed, it is moved.
	pub fn push(&mut self, format: TagFormat) {
		self.formats.retain(|f| *f != format);
		self.formats.push(format);
	}

	/// Insert a format at `index`, clamped to the end of the list
	///
	/// If the format is already listed, it is moved.
	pub fn insert(&mut self, index: usize, format: TagFormat) {
		self.formats.retain(|f| *f != format);
		let index = index.min(self.formats.len());
		self.formats.insert(index, format);
	}

	/// Remove a format, returning whether it was listed
	pub fn remove(&mut self, format: TagFormat) -> bool {
		let len = self.formats.len();
		self.formats.retain(|f| *f != format);
		len != self.formats.len()
	}

	/// The position of `format`, `0` being the most authoritative
	pub fn rank(&self, format: TagFormat) -> Option<usize> {
		self.formats.iter().position(|f| *f == format)
	}

	/// Whether `format` is listed
	pub fn contains(&self, format: TagFormat) -> bool {
		self.rank(format).is_some()
	}

	/// Iterate over the formats, most authoritative first
	pub fn iter(&self) -> impl Iterator<Item = TagFormat> + '_ {
		self.formats.iter().copied()
	}

	/// The number of listed formats
	pub fn len(&self) -> usize {
		self.formats.len()
	}

	/// Whether no format is listed
	pub fn is_empty(&self) -> bool {
		self.formats.is_empty()
	}
}

impl Default for TagPriority {
	/// Every registered format, ordered by [`TagCodec::default_priority`](crate::codec::TagCodec::default_priority)
	fn default() -> Self {
		let mut codecs = crate::registry::formats().collect::<Vec<_>>();
		codecs.sort_by_key(|codec| codec.default_priority());

		Self {
			formats: codecs.into_iter().map(|codec| codec.format()).collect(),
		}
	}
}

impl FromIterator<TagFormat> for TagPriority {
	fn from_iter<T: IntoIterator<Item = TagFormat>>(iter: T) -> Self {
		let mut priority = Self::empty();
		for format in iter {
			priority.push(format);
		}

		priority
	}
}

/// Options to control how the tags of a file are combined and which of them receive edits
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct MergeOptions {
	pub(crate) priority: TagPriority,
	pub(crate) cross_reading: bool,
	pub(crate) single_tag: bool,
}

impl MergeOptions {
	/// Creates a new `MergeOptions`, alias for `Default` implementation
	///
	/// See also: [`MergeOptions::default`]
	///
	/// # Examples
	///
	/// ```rust
	/// use tagmeld::config::MergeOptions;
	///
	/// let merge_options = MergeOptions::new();
	/// ```
	pub fn new() -> Self {
		Self {
			priority: TagPriority::default(),
			cross_reading: true,
			single_tag: false,
		}
	}

	/// The priority of the formats, see [`TagPriority`]
	///
	/// # Examples
	///
	/// ```rust
	/// use tagmeld::config::{MergeOptions, TagPriority};
	/// use tagmeld::tag::TagFormat;
	///
	/// // I only trust APE tags
	/// let priority = [TagFormat::Ape].into_iter().collect::<TagPriority>();
	/// let merge_options = MergeOptions::new().priority(priority);
	/// ```
	pub fn priority(mut self, priority: TagPriority) -> Self {
		self.priority = priority;
		self
	}

	/// Whether empty fields of a more authoritative tag are filled in from less authoritative ones
	///
	/// Turning this off has the same effect as enabling [`MergeOptions::single_tag`].
	///
	/// # Examples
	///
	/// ```rust
	/// use tagmeld::config::MergeOptions;
	///
	/// let merge_options = MergeOptions::new().cross_reading(false);
	/// ```
	pub fn cross_reading(mut self, cross_reading: bool) -> Self {
		self.cross_reading = cross_reading;
		self
	}

	/// Whether only the most authoritative present tag is read and written
	///
	/// Base fields are taken from that tag alone, even when they are empty. Edits are only
	/// written to that tag.
	///
	/// # Examples
	///
	/// ```rust
	/// use tagmeld::config::MergeOptions;
	///
	/// let merge_options = MergeOptions::new().single_tag(true);
	/// ```
	pub fn single_tag(mut self, single_tag: bool) -> Self {
		self.single_tag = single_tag;
		self
	}

	/// Whether base fields come from a single tag, see [`MergeOptions::single_tag`]
	pub fn single_tag_active(&self) -> bool {
		self.single_tag || !self.cross_reading
	}

	/// The current [`TagPriority`]
	pub fn tag_priority(&self) -> &TagPriority {
		&self.priority
	}
}

impl Default for MergeOptions {
	/// The default implementation for `MergeOptions`
	///
	/// The defaults are as follows:
	///
	/// ```rust,ignore
	/// MergeOptions {
	/// 	priority: [TagFormat::Id3v2, TagFormat::Ape, TagFormat::VorbisComments, TagFormat::Id3v1],
	/// 	cross_reading: true,
	/// 	single_tag: false,
	/// }
	/// ```
	fn default() -> Self {
		Self::new()
	}
}
