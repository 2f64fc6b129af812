use super::mappings::{PICTURE_KEY, field_for_key, verify_key};
use super::{CommentKey, CommentSlot, VorbisNative};
use crate::codec::{DecodeContext, DecodedTag, NativeData};
use crate::config::ParsingMode;
use crate::error::Result;
use crate::file::FileType;
use crate::macros::{decode_err, err};
use crate::picture::Picture;
use crate::tag::number::split_pair;
use crate::tag::{BaseField, Tag};
use crate::util::take;
use crate::util::text::utf8_decode_str;

use byteorder::{ByteOrder, LittleEndian};

pub(super) fn decode(mut data: &[u8], ctx: &DecodeContext) -> Result<DecodedTag> {
	let parse_options = ctx.parse_options;
	let parse_mode = parse_options.parsing_mode;

	let vendor_len = LittleEndian::read_u32(take(&mut data, 4)?);
	if vendor_len as usize > data.len() {
		err!(SizeMismatch);
	}

	let vendor_bytes = take(&mut data, vendor_len as usize)?;
	let vendor = match utf8_decode_str(vendor_bytes).map(str::to_owned) {
		Ok(vendor) => vendor,
		Err(e) => {
			if parse_mode == ParsingMode::Strict {
				return Err(e);
			}

			log::warn!("Possibly corrupt vendor string, attempting to recover");

			// Some vendor strings have invalid mixed UTF-8 and UTF-16 encodings.
			// This seems to work, while preserving the string opposed to using
			// the replacement character
			let s = vendor_bytes
				.iter()
				.map(|c| u16::from(*c))
				.collect::<Vec<_>>();

			match String::from_utf16(&s) {
				Ok(v) => {
					log::warn!("Vendor string recovered as: '{v}'");
					v
				},
				Err(_) => decode_err!(@BAIL VorbisComments, "File has an invalid vendor string"),
			}
		},
	};

	let number_of_items = LittleEndian::read_u32(take(&mut data, 4)?);
	if number_of_items as usize > data.len() / 4 {
		err!(SizeMismatch);
	}

	let mut tag = Tag::new();
	let mut slots: Vec<CommentSlot> = Vec::with_capacity(number_of_items as usize);
	for _ in 0..number_of_items {
		let comment_len = LittleEndian::read_u32(take(&mut data, 4)?);
		if comment_len as usize > data.len() {
			err!(SizeMismatch);
		}

		let raw = take(&mut data, comment_len as usize)?.to_vec();
		let slot = decode_slot(raw, &mut tag, &slots, ctx)?;
		slots.push(slot);
	}

	if !data.is_empty() {
		log::debug!("Vorbis comments have {} trailing bytes", data.len());
	}

	Ok(DecodedTag {
		tag,
		native: NativeData::Vorbis(VorbisNative { vendor, slots }),
	})
}

fn decode_slot(
	raw: Vec<u8>,
	tag: &mut Tag,
	slots: &[CommentSlot],
	ctx: &DecodeContext,
) -> Result<CommentSlot> {
	let parse_options = ctx.parse_options;
	let parse_mode = parse_options.parsing_mode;

	// KEY=VALUE
	let Some(separator) = raw.iter().position(|b| *b == b'=') else {
		if parse_mode == ParsingMode::Strict {
			decode_err!(@BAIL VorbisComments, "Comment has no separator");
		}

		log::warn!("No separator found in field, keeping it as-is");
		return Ok(CommentSlot::opaque(raw));
	};

	let (Ok(key), Ok(value)) = (
		std::str::from_utf8(&raw[..separator]),
		std::str::from_utf8(&raw[separator + 1..]),
	) else {
		if parse_mode == ParsingMode::Strict {
			decode_err!(@BAIL VorbisComments, "Comment is not valid UTF-8");
		}

		log::warn!("Comment is not valid UTF-8, keeping it as-is");
		return Ok(CommentSlot::opaque(raw));
	};

	if !verify_key(key) {
		if parse_mode == ParsingMode::Strict {
			decode_err!(@BAIL VorbisComments, "Comment has an invalid field name");
		}

		log::warn!("Comment has an invalid field name '{key}', keeping it as-is");
		return Ok(CommentSlot::opaque(raw));
	}

	if key.eq_ignore_ascii_case(PICTURE_KEY) {
		// Pictures in FLAC files belong in PICTURE blocks
		if ctx.file_type == FileType::Flac || !parse_options.read_cover_art {
			return Ok(CommentSlot::opaque(raw));
		}

		match Picture::from_flac_bytes(
			value.as_bytes(),
			true,
			parse_mode,
			parse_options.allocation_limit,
		) {
			Ok((picture, _)) => {
				let index = tag.pictures().len();
				tag.pictures_mut().push(picture);
				return Ok(CommentSlot::new(CommentKey::Picture(index), raw, String::new()));
			},
			Err(e) => {
				if parse_mode == ParsingMode::Strict {
					return Err(e);
				}

				log::warn!("Failed to decode FLAC picture, keeping it as-is");
				return Ok(CommentSlot::opaque(raw));
			},
		}
	}

	let value = value.to_owned();
	let key = match field_for_key(key) {
		Some(field) => CommentKey::Field(field),
		None => CommentKey::Additional(key.to_owned()),
	};

	// Every comment after the first with the same key is kept as long as the field is untouched
	if slots.iter().any(|slot| slot.primary && slot.key.matches(&key)) {
		let mut slot = CommentSlot::new(key, raw, value);
		slot.primary = false;
		return Ok(slot);
	}

	let mut paired = false;
	match &key {
		CommentKey::Field(field @ (BaseField::TrackNumber | BaseField::DiscNumber))
			if value.contains('/') =>
		{
			// Support the case of TRACKNUMBER / DISCNUMBER being equal to current/total
			let total_field = if *field == BaseField::TrackNumber {
				BaseField::TrackTotal
			} else {
				BaseField::DiscTotal
			};

			paired = true;
			let (number, total) = split_pair(&value);
			if let Some(number) = number {
				tag.insert(*field, number);
			}
			if let Some(total) = total {
				if !tag.contains(total_field) {
					tag.insert(total_field, total);
				}
			}
		},
		CommentKey::Field(field) => {
			tag.insert(*field, value.clone());
		},
		CommentKey::Additional(key) => {
			tag.additional_mut().insert(key.clone(), value.clone());
		},
		CommentKey::Picture(_) | CommentKey::Opaque => {},
	}

	let mut slot = CommentSlot::new(key, raw, value);
	slot.paired = paired;
	Ok(slot)
}
