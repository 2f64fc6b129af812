use super::constants::{ID3V1_TAG_MARKER, ID3V1_TAG_SIZE, genre_index};
use crate::error::Result;
use crate::macros::value_err;
use crate::tag::{BaseField, Tag};
use crate::util::text::latin1_encode;

use std::io::Write;

use byteorder::WriteBytesExt;

pub(super) fn encode(tag: &Tag) -> Result<Vec<u8>> {
	fn resize_string(value: Option<&str>, size: usize) -> Vec<u8> {
		let mut out = vec![0; size];

		if let Some(val) = value {
			// Lossy encoding never fails
			for (slot, b) in out.iter_mut().zip(latin1_encode(val, true)) {
				*slot = b.unwrap_or(b'?');
			}
		}

		out
	}

	if !tag.additional().is_empty() || !tag.pictures().is_empty() {
		log::warn!("ID3v1 can't store additional fields or pictures, discarding them");
	}

	let track_number = encode_track(tag.get(BaseField::TrackNumber))?;
	let year = encode_year(tag.get(BaseField::Year))?;

	let mut writer = Vec::with_capacity(ID3V1_TAG_SIZE);
	writer.write_all(&ID3V1_TAG_MARKER)?;

	writer.write_all(&resize_string(tag.get(BaseField::Title), 30))?;
	writer.write_all(&resize_string(tag.get(BaseField::Artist), 30))?;
	writer.write_all(&resize_string(tag.get(BaseField::Album), 30))?;
	writer.write_all(&year)?;

	let comment = tag.get(BaseField::Comment);
	match track_number {
		Some(track_number) => {
			writer.write_all(&resize_string(comment, 28))?;
			writer.write_u8(0)?;
			writer.write_u8(track_number)?;
		},
		// Without a track number, the comment can use the full 30 bytes (ID3v1.0)
		None if comment.is_some_and(|c| c.len() > 28) => {
			writer.write_all(&resize_string(comment, 30))?;
		},
		None => {
			writer.write_all(&resize_string(comment, 28))?;
			writer.write_all(&[0, 0])?;
		},
	}

	let genre = match tag.get(BaseField::Genre) {
		Some(genre) if !genre.is_empty() => genre_index(genre).unwrap_or_else(|| {
			log::debug!("ID3v1: \"{genre}\" is not a known genre, writing no genre");
			255
		}),
		_ => 255,
	};
	writer.write_u8(genre)?;

	Ok(writer)
}

fn encode_track(value: Option<&str>) -> Result<Option<u8>> {
	let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
		return Ok(None);
	};

	let Ok(track_number) = value.parse::<u32>() else {
		value_err!(@BAIL Id3v1, "TrackNumber", "track number is not a number");
	};

	match u8::try_from(track_number) {
		Ok(0) => Ok(None),
		Ok(track_number) => Ok(Some(track_number)),
		Err(_) => value_err!(@BAIL Id3v1, "TrackNumber", "track number must be at most 255"),
	}
}

fn encode_year(value: Option<&str>) -> Result<[u8; 4]> {
	let mut year = [0; 4];

	let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
		return Ok(year);
	};

	let end = value
		.find(|c: char| !c.is_ascii_digit())
		.unwrap_or(value.len());

	let Ok(year_num) = value[..end].parse::<u32>() else {
		value_err!(@BAIL Id3v1, "Year", "year does not start with a number");
	};

	let mut year_num = std::cmp::min(year_num, 9999);
	for slot in year.iter_mut().rev() {
		*slot = b'0' + (year_num % 10) as u8;
		year_num /= 10;
	}

	Ok(year)
}
