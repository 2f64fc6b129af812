use super::header::Id3v2Version;
use crate::tag::BaseField;

// (field, ID3v2.3/4, ID3v2.2)
const TEXT_FRAMES: [(BaseField, &str, &str); 11] = [
	(BaseField::Title, "TIT2", "TT2"),
	(BaseField::Artist, "TPE1", "TP1"),
	(BaseField::AlbumArtist, "TPE2", "TP2"),
	(BaseField::Album, "TALB", "TAL"),
	(BaseField::Composer, "TCOM", "TCM"),
	(BaseField::Conductor, "TPE3", "TP3"),
	(BaseField::Genre, "TCON", "TCO"),
	(BaseField::Copyright, "TCOP", "TCR"),
	(BaseField::Publisher, "TPUB", "TPB"),
	(BaseField::OriginalArtist, "TOPE", "TOA"),
	(BaseField::OriginalAlbum, "TOAL", "TOT"),
];

/// The field a text frame maps to
///
/// `TRCK` and `TPOS` map to [`BaseField::TrackNumber`] and [`BaseField::DiscNumber`], their
/// totals are stored in the same frame.
pub(crate) fn field_for_frame(id: &str) -> Option<BaseField> {
	match id {
		"TRCK" | "TRK" => return Some(BaseField::TrackNumber),
		"TPOS" | "TPA" => return Some(BaseField::DiscNumber),
		"TDRC" | "TYER" | "TYE" => return Some(BaseField::Year),
		_ => {},
	}

	TEXT_FRAMES
		.iter()
		.find(|(_, id3v24, id3v22)| *id3v24 == id || *id3v22 == id)
		.map(|(field, ..)| *field)
}

/// The frame a field is written to when no existing frame holds it
pub(crate) fn frame_for_field(field: BaseField, version: Id3v2Version) -> Option<&'static str> {
	let v2 = version == Id3v2Version::V2;

	match field {
		BaseField::TrackNumber => return Some(if v2 { "TRK" } else { "TRCK" }),
		BaseField::DiscNumber => return Some(if v2 { "TPA" } else { "TPOS" }),
		BaseField::Year => {
			return Some(match version {
				Id3v2Version::V2 => "TYE",
				Id3v2Version::V3 => "TYER",
				Id3v2Version::V4 => "TDRC",
			});
		},
		_ => {},
	}

	TEXT_FRAMES
		.iter()
		.find(|(f, ..)| *f == field)
		.map(|(_, id3v24, id3v22)| if v2 { *id3v22 } else { *id3v24 })
}

pub(crate) fn user_text_frame(version: Id3v2Version) -> &'static str {
	if version == Id3v2Version::V2 { "TXX" } else { "TXXX" }
}

pub(crate) fn comment_frame(version: Id3v2Version) -> &'static str {
	if version == Id3v2Version::V2 { "COM" } else { "COMM" }
}

pub(crate) fn picture_frame(version: Id3v2Version) -> &'static str {
	if version == Id3v2Version::V2 { "PIC" } else { "APIC" }
}

/// Whether an additional field key can be stored as its own text frame, rather than in a `TXXX`
pub(crate) fn is_text_frame_key(key: &str, version: Id3v2Version) -> bool {
	let len = if version == Id3v2Version::V2 { 3 } else { 4 };

	key.len() == len
		&& key.starts_with('T')
		&& key.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
		&& key != user_text_frame(version)
		&& field_for_frame(key).is_none()
}

/// Resolve numeric `TCON` genres, "(17)" or "17", to their names
///
/// A refinement following the reference, as in "(17)Eurorock", wins over the reference.
pub(crate) fn resolve_genre(value: &str) -> String {
	use crate::id3::v1::GENRES;

	let genre_name = |index: &str| {
		index
			.parse::<usize>()
			.ok()
			.and_then(|index| GENRES.get(index).copied())
	};

	if let Some(rest) = value.strip_prefix('(') {
		if let Some((index, refinement)) = rest.split_once(')') {
			if !refinement.is_empty() {
				return refinement.to_owned();
			}

			if let Some(name) = genre_name(index) {
				return name.to_owned();
			}
		}
	} else if let Some(name) = genre_name(value) {
		return name.to_owned();
	}

	value.to_owned()
}
