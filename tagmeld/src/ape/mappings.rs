use crate::tag::BaseField;

const KEYS: [(BaseField, &str); 15] = [
	(BaseField::Title, "Title"),
	(BaseField::Artist, "Artist"),
	(BaseField::AlbumArtist, "Album Artist"),
	(BaseField::Album, "Album"),
	(BaseField::Composer, "Composer"),
	(BaseField::Conductor, "Conductor"),
	(BaseField::Comment, "Comment"),
	(BaseField::Genre, "Genre"),
	(BaseField::Copyright, "Copyright"),
	(BaseField::Publisher, "Publisher"),
	(BaseField::OriginalArtist, "Original Artist"),
	(BaseField::OriginalAlbum, "Original Album"),
	(BaseField::Year, "Year"),
	// Both hold a `number/total` pair
	(BaseField::TrackNumber, "Track"),
	(BaseField::DiscNumber, "Disc"),
];

pub(crate) fn field_for_key(key: &str) -> Option<BaseField> {
	KEYS.iter()
		.find(|(_, k)| k.eq_ignore_ascii_case(key))
		.map(|(field, _)| *field)
}

pub(crate) fn key_for_field(field: BaseField) -> Option<&'static str> {
	KEYS.iter().find(|(f, _)| *f == field).map(|(_, key)| *key)
}
