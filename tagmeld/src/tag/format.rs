/// The binary format of a tag
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[non_exhaustive]
pub enum TagFormat {
	/// This covers ID3v2.2, ID3v2.3, and ID3v2.4
	Id3v2,
	/// This covers both APEv1 and APEv2
	Ape,
	/// Represents vorbis comments
	VorbisComments,
	/// This covers ID3v1 and ID3v1.1
	Id3v1,
}

impl TagFormat {
	/// Every supported format
	pub const ALL: [TagFormat; 4] = [
		TagFormat::Id3v2,
		TagFormat::Ape,
		TagFormat::VorbisComments,
		TagFormat::Id3v1,
	];

	/// A short, stable identifier for the format
	///
	/// # Examples
	///
	/// ```rust
	/// use tagmeld::tag::TagFormat;
	///
	/// assert_eq!(TagFormat::from_id("ape"), Some(TagFormat::Ape));
	/// assert_eq!(TagFormat::Ape.id(), "ape");
	/// ```
	pub fn id(self) -> &'static str {
		match self {
			TagFormat::Id3v2 => "id3v2",
			TagFormat::Ape => "ape",
			TagFormat::VorbisComments => "vorbis",
			TagFormat::Id3v1 => "id3v1",
		}
	}

	/// Get a `TagFormat` from its [`TagFormat::id`], ignoring case
	pub fn from_id(id: &str) -> Option<Self> {
		Self::ALL
			.into_iter()
			.find(|format| format.id().eq_ignore_ascii_case(id))
	}
}
