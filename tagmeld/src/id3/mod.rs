//! ID3 specific items
//!
//! ID3 does things differently than other tags, making working with them a little more effort than other formats.
//! Check the other modules for important notes and/or warnings.

pub mod v1;
pub mod v2;

use crate::error::{ErrorKind, Result, TagmeldError};
use crate::macros::err;
use crate::util::text::utf8_decode_str;
use v1::constants::{ID3V1_TAG_MARKER, ID3V1_TAG_SIZE};
use v2::header::Id3v2Header;

use std::ops::Range;

const LYRICS3V2_FOOTER_SIZE: usize = 15;

/// Find the Lyrics3v2 tag ending at `end`
///
/// Lyrics3v2 tags sit between the audio (or an APE tag) and ID3v1. They are not decoded, only
/// skipped.
pub(crate) fn find_lyrics3v2(data: &[u8], end: usize) -> Result<Option<Range<usize>>> {
	log::debug!("Searching for a Lyrics3v2 tag");

	let Some(footer_start) = end.checked_sub(LYRICS3V2_FOOTER_SIZE) else {
		return Ok(None);
	};

	let footer = &data[footer_start..end];
	if &footer[6..] != b"LYRICS200" {
		return Ok(None);
	}

	log::warn!("Encountered a Lyrics3v2 tag. This is an outdated format, and will be skipped.");

	let lyrics_size = utf8_decode_str(&footer[..6])?
		.parse::<usize>()
		.map_err(|_| {
			TagmeldError::new(ErrorKind::TextDecode(
				"Lyrics3v2 tag has an invalid size string",
			))
		})?;

	let Some(start) = footer_start.checked_sub(lyrics_size) else {
		err!(SizeMismatch);
	};

	if !data[start..].starts_with(b"LYRICSBEGIN") {
		log::warn!("Lyrics3v2 tag is missing its start marker");
		err!(FakeTag);
	}

	Ok(Some(start..end))
}

/// Find the ID3v1 tag ending at `end`
pub(crate) fn find_id3v1(data: &[u8], end: usize) -> Option<Range<usize>> {
	log::debug!("Searching for an ID3v1 tag");

	// Too small to contain an ID3v1 tag
	let start = end.checked_sub(ID3V1_TAG_SIZE)?;

	if data[start..].starts_with(&ID3V1_TAG_MARKER) {
		log::debug!("Found an ID3v1 tag");
		return Some(start..end);
	}

	None
}

/// Find the ID3v2 tag starting at `offset`
///
/// # Errors
///
/// The tag header is valid, but the tag extends past the end of `data`
pub(crate) fn find_id3v2(data: &[u8], offset: usize) -> Result<Option<Range<usize>>> {
	log::debug!("Searching for an ID3v2 tag at offset: {offset}");

	let Some(candidate) = data.get(offset..) else {
		return Ok(None);
	};

	if !candidate.starts_with(b"ID3") {
		return Ok(None);
	}

	let header = match Id3v2Header::parse(candidate) {
		Ok(header) => header,
		Err(e) => {
			log::warn!("Found an ID3v2 marker, but the header is invalid, ignoring: {e}");
			return Ok(None);
		},
	};

	let Ok(size) = usize::try_from(header.full_tag_size()) else {
		err!(TooMuchData);
	};

	if size > candidate.len() {
		log::warn!(
			"ID3v2 tag claims {size} bytes, only {} remain in the file",
			candidate.len()
		);
		err!(SizeMismatch);
	}

	log::debug!("Found an ID3v2 tag ({size} bytes)");
	Ok(Some(offset..offset + size))
}
