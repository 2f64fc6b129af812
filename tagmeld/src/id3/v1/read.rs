use super::constants::{GENRES, ID3V1_TAG_MARKER, ID3V1_TAG_SIZE};
use crate::codec::{DecodeContext, DecodedTag, NativeData};
use crate::config::ParsingMode;
use crate::error::Result;
use crate::macros::{decode_err, err};
use crate::tag::{BaseField, Tag};
use crate::util::text::latin1_decode;

pub(super) fn decode(data: &[u8], ctx: &DecodeContext) -> Result<DecodedTag> {
	if data.len() != ID3V1_TAG_SIZE {
		decode_err!(@BAIL Id3v1, "Tag is not 128 bytes long");
	}

	if data[..3] != ID3V1_TAG_MARKER {
		err!(FakeTag);
	}

	let parse_mode = ctx.parse_options.parsing_mode;
	let reader = &data[3..];
	let mut tag = Tag::new();

	tag.insert(BaseField::Title, decode_text(&reader[..30]));
	tag.insert(BaseField::Artist, decode_text(&reader[30..60]));
	tag.insert(BaseField::Album, decode_text(&reader[60..90]));
	tag.insert(BaseField::Year, try_parse_year(&reader[90..94], parse_mode)?);

	// Determine the range of the comment (30 bytes for ID3v1 and 28 for ID3v1.1)
	// We check for the null terminator 28 bytes in, and for a non-zero track number after it.
	// A track number of 0 is invalid.
	let range = if reader[122] == 0 && reader[123] != 0 {
		tag.insert(BaseField::TrackNumber, reader[123].to_string());

		94_usize..123
	} else {
		94..124
	};

	tag.insert(BaseField::Comment, decode_text(&reader[range]));

	if let Some(genre) = GENRES.get(usize::from(reader[124])) {
		tag.insert(BaseField::Genre, *genre);
	}

	Ok(DecodedTag {
		tag,
		native: NativeData::Id3v1,
	})
}

fn decode_text(data: &[u8]) -> String {
	let mut first_null_pos = data.len();
	if let Some(null_pos) = data.iter().position(|&b| b == 0) {
		if data[null_pos..].iter().any(|b| *b != b'\0') {
			log::warn!("ID3v1 text field contains trailing junk, skipping");
		}

		first_null_pos = null_pos;
	}

	latin1_decode(&data[..first_null_pos])
}

fn try_parse_year(input: &[u8], parse_mode: ParsingMode) -> Result<String> {
	if input.iter().all(|b| *b == 0) {
		return Ok(String::new());
	}

	if input.iter().all(u8::is_ascii_digit) {
		return Ok(input.iter().map(|b| char::from(*b)).collect());
	}

	// Most libraries write "\0\0\0\0" for empty years, handled above. Anything else that isn't
	// 4 digits is invalid.
	if parse_mode == ParsingMode::Strict {
		err!(TextDecode(
			"ID3v1 year field contains non-ASCII digit characters"
		));
	}

	log::warn!("ID3v1 year field contains non-ASCII digit characters, discarding");
	Ok(String::new())
}
