//! ID3v1 items
//!
//! # ID3v1 notes
//!
//! See also: [`GENRES`]
//!
//! ## Genres
//!
//! ID3v1 stores the genre in a single byte ranging from 0 to 192 (inclusive).
//! All possible genres have been stored in the [`GENRES`] constant.
//!
//! ## Track Numbers
//!
//! ID3v1 stores the track number in a non-zero byte.
//! A track number of 0 will be treated as an empty field.
//! Track numbers above 255 can't be written, and are a [`ValueError`](crate::error::ValueError).
//!
//! ## Text
//!
//! Every text field is a fixed size Latin-1 string. Longer values are cut to size, characters
//! outside of Latin-1 are replaced with `?`.

pub(crate) mod constants;
mod read;
mod write;

pub use constants::GENRES;

use crate::codec::{DecodeContext, DecodedTag, EncodeContext, TagCodec};
use crate::error::Result;
use crate::file::FileType;
use crate::tag::{BaseField, Tag, TagFormat};

/// The [`TagCodec`] for ID3v1 and ID3v1.1
///
/// Every text field is decoded as present, possibly empty. An empty year (`"\0\0\0\0"`) is a
/// present but empty [`BaseField::Year`].
#[derive(Copy, Clone, Debug, Default)]
pub struct Id3v1Codec;

impl TagCodec for Id3v1Codec {
	fn format(&self) -> TagFormat {
		TagFormat::Id3v1
	}

	fn default_priority(&self) -> u8 {
		4
	}

	fn supports_field(&self, field: BaseField) -> bool {
		matches!(
			field,
			BaseField::Title
				| BaseField::Artist
				| BaseField::Album
				| BaseField::Year
				| BaseField::Comment
				| BaseField::TrackNumber
				| BaseField::Genre
		)
	}

	fn supports_additional_fields(&self) -> bool {
		false
	}

	fn supports_pictures(&self, _file_type: FileType) -> bool {
		false
	}

	fn decode(&self, data: &[u8], ctx: &DecodeContext) -> Result<DecodedTag> {
		read::decode(data, ctx)
	}

	fn encode(
		&self,
		tag: &Tag,
		_prior: Option<&DecodedTag>,
		_ctx: &EncodeContext,
	) -> Result<Vec<u8>> {
		write::encode(tag)
	}
}
