use crate::tag::BaseField;

// The first key of each field is the one that gets written
const KEYS: [(BaseField, &[&str]); 17] = [
	(BaseField::Title, &["TITLE"]),
	(BaseField::Artist, &["ARTIST"]),
	(BaseField::AlbumArtist, &["ALBUMARTIST", "ALBUM ARTIST"]),
	(BaseField::Album, &["ALBUM"]),
	(BaseField::Composer, &["COMPOSER"]),
	(BaseField::Conductor, &["CONDUCTOR"]),
	(BaseField::Comment, &["COMMENT", "DESCRIPTION"]),
	(BaseField::Genre, &["GENRE"]),
	(BaseField::Copyright, &["COPYRIGHT"]),
	(BaseField::Publisher, &["ORGANIZATION", "LABEL", "PUBLISHER"]),
	(BaseField::OriginalArtist, &["ORIGINALARTIST"]),
	(BaseField::OriginalAlbum, &["ORIGINALALBUM"]),
	(BaseField::Year, &["DATE", "YEAR"]),
	(BaseField::TrackNumber, &["TRACKNUMBER"]),
	(BaseField::TrackTotal, &["TRACKTOTAL", "TOTALTRACKS"]),
	(BaseField::DiscNumber, &["DISCNUMBER"]),
	(BaseField::DiscTotal, &["DISCTOTAL", "TOTALDISCS"]),
];

pub(crate) const PICTURE_KEY: &str = "METADATA_BLOCK_PICTURE";

pub(crate) fn field_for_key(key: &str) -> Option<BaseField> {
	KEYS.iter()
		.find(|(_, keys)| keys.iter().any(|k| k.eq_ignore_ascii_case(key)))
		.map(|(field, _)| *field)
}

pub(crate) fn key_for_field(field: BaseField) -> &'static str {
	KEYS.iter()
		.find(|(f, _)| *f == field)
		.map_or("", |(_, keys)| keys[0])
}

/// Whether `key` is a valid field name, printable ASCII excluding `=`
pub(crate) fn verify_key(key: &str) -> bool {
	!key.is_empty() && key.bytes().all(|b| (0x20..=0x7D).contains(&b) && b != b'=')
}
