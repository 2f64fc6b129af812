/// How the value of a [`BaseField`] is interpreted
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FieldKind {
	/// Free text
	Text,
	/// A track/disc number or total
	Number,
	/// A year, or a date starting with a year
	Year,
}

/// The fields shared by every tag format
///
/// Not every format can store every field. A field that can't be stored is skipped when writing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[non_exhaustive]
pub enum BaseField {
	/// The track title
	Title,
	/// The track artist
	Artist,
	/// The album artist
	AlbumArtist,
	/// The album title
	Album,
	/// The composer
	Composer,
	/// The conductor
	Conductor,
	/// The main comment
	Comment,
	/// The genre, as text
	Genre,
	/// The copyright message
	Copyright,
	/// The publisher or label
	Publisher,
	/// The original performer of a cover
	OriginalArtist,
	/// The album the track originally appeared on
	OriginalAlbum,
	/// The recording year or date
	Year,
	/// The track number
	TrackNumber,
	/// The number of tracks
	TrackTotal,
	/// The disc number
	DiscNumber,
	/// The number of discs
	DiscTotal,
}

impl BaseField {
	/// Every base field
	pub const ALL: [BaseField; 17] = [
		BaseField::Title,
		BaseField::Artist,
		BaseField::AlbumArtist,
		BaseField::Album,
		BaseField::Composer,
		BaseField::Conductor,
		BaseField::Comment,
		BaseField::Genre,
		BaseField::Copyright,
		BaseField::Publisher,
		BaseField::OriginalArtist,
		BaseField::OriginalAlbum,
		BaseField::Year,
		BaseField::TrackNumber,
		BaseField::TrackTotal,
		BaseField::DiscNumber,
		BaseField::DiscTotal,
	];

	/// How the value of this field is interpreted
	pub fn kind(self) -> FieldKind {
		match self {
			BaseField::Year => FieldKind::Year,
			BaseField::TrackNumber
			| BaseField::TrackTotal
			| BaseField::DiscNumber
			| BaseField::DiscTotal => FieldKind::Number,
			_ => FieldKind::Text,
		}
	}
}
