use super::constants::{APE_HEADER_SIZE, INVALID_KEYS, ITEM_TYPE_BINARY, ITEM_TYPE_TEXT};
use super::header::{ApeHeader, FLAG_IS_HEADER};
use super::mappings::field_for_key;
use super::{ApeItem, ApeNative, ApeSlot, ApeSlotKey};
use crate::codec::{DecodeContext, DecodedTag, NativeData};
use crate::config::{ParseOptions, ParsingMode};
use crate::error::Result;
use crate::macros::{decode_err, err};
use crate::picture::{Picture, PictureType};
use crate::tag::number::split_pair;
use crate::tag::{BaseField, Tag};
use crate::util::take;

use byteorder::{ByteOrder, LittleEndian};

pub(super) fn decode(data: &[u8], ctx: &DecodeContext) -> Result<DecodedTag> {
	let parse_options = ctx.parse_options;

	let Some(footer_start) = data.len().checked_sub(APE_HEADER_SIZE) else {
		err!(SizeMismatch);
	};

	let footer = ApeHeader::parse(&data[footer_start..], parse_options.parsing_mode)?;
	if footer.full_tag_size() > data.len() {
		decode_err!(@BAIL Ape, "APE tag has an invalid size (> region size)");
	}

	let items_start = data.len() - footer.size as usize;
	let mut items = &data[items_start..footer_start];

	let mut tag = Tag::new();
	let mut slots: Vec<ApeSlot> = Vec::new();
	for _ in 0..footer.item_count {
		// The smallest possible item: size, flags, a 2 character key and its terminator
		if items.len() < 11 {
			if parse_options.parsing_mode == ParsingMode::Strict {
				decode_err!(@BAIL Ape, "APE tag has fewer items than its footer claims");
			}

			log::warn!("APE tag has fewer items than its footer claims");
			break;
		}

		let item = read_item(&mut items)?;
		let slot = decode_slot(item, &mut tag, &slots, parse_options)?;
		slots.push(slot);
	}

	if !items.is_empty() {
		log::warn!("APE tag has {} bytes of trailing junk after its items", items.len());
	}

	Ok(DecodedTag {
		tag,
		native: NativeData::Ape(ApeNative {
			version: footer.version,
			flags: footer.flags & !FLAG_IS_HEADER,
			slots,
		}),
	})
}

fn read_item(items: &mut &[u8]) -> Result<ApeItem> {
	let value_size = LittleEndian::read_u32(take(items, 4)?);
	let flags = LittleEndian::read_u32(take(items, 4)?);

	let Some(key_end) = items.iter().position(|b| *b == 0) else {
		decode_err!(@BAIL Ape, "APE tag item key has no terminator");
	};

	let key = take(items, key_end)?.to_vec();
	let _terminator = take(items, 1)?;

	if value_size as usize > items.len() {
		err!(SizeMismatch);
	}

	let value = take(items, value_size as usize)?.to_vec();

	Ok(ApeItem { key, flags, value })
}

pub(super) fn verify_key(key: &str) -> bool {
	(2..=255).contains(&key.len())
		&& key.bytes().all(|b| (0x20..=0x7E).contains(&b))
		&& !INVALID_KEYS.contains(&&*key.to_uppercase())
}

// APEv2 allows multiple values, separated by null terminators
fn join_values(value: &str) -> String {
	value
		.split('\0')
		.filter(|v| !v.is_empty())
		.collect::<Vec<_>>()
		.join("/")
}

fn decode_slot(
	item: ApeItem,
	tag: &mut Tag,
	slots: &[ApeSlot],
	parse_options: ParseOptions,
) -> Result<ApeSlot> {
	let Ok(key) = std::str::from_utf8(&item.key) else {
		if parse_options.parsing_mode == ParsingMode::Strict {
			decode_err!(@BAIL Ape, "APE tag item contains a non UTF-8 key");
		}

		log::warn!("APE: Encountered a non UTF-8 item key, keeping it as-is");
		return Ok(ApeSlot::opaque(item));
	};

	if !verify_key(key) {
		if parse_options.parsing_mode == ParsingMode::Strict {
			decode_err!(@BAIL Ape, "APE tag item contains an illegal key");
		}

		log::warn!("APE: Encountered invalid item key '{key}', keeping it as-is");
		return Ok(ApeSlot::opaque(item));
	}

	let key = key.to_owned();
	match item.item_type() {
		ITEM_TYPE_TEXT => {},
		ITEM_TYPE_BINARY => {
			let Some(pic_type) = PictureType::from_ape_key(&key) else {
				return Ok(ApeSlot::opaque(item));
			};

			if !parse_options.read_cover_art || slots.iter().any(|s| s.key.is_picture_key(&key)) {
				return Ok(ApeSlot::opaque(item));
			}

			let picture = match Picture::from_ape_bytes(pic_type, &item.value) {
				Ok(picture) => picture,
				Err(e) => {
					if parse_options.parsing_mode == ParsingMode::Strict {
						return Err(e);
					}

					log::warn!("APE: Unable to read picture `{key}`, keeping it as-is: {e}");
					return Ok(ApeSlot::opaque(item));
				},
			};

			let index = tag.pictures().len();
			tag.pictures_mut().push(picture);
			return Ok(ApeSlot {
				key: ApeSlotKey::Picture(index, key),
				item,
				value: String::new(),
			});
		},
		// Locators, and anything else
		_ => return Ok(ApeSlot::opaque(item)),
	}

	let value = match std::str::from_utf8(&item.value) {
		Ok(value) => join_values(value),
		Err(_) => {
			if parse_options.parsing_mode == ParsingMode::Strict {
				decode_err!(@BAIL Ape, "Failed to convert text item into a UTF-8 string");
			}

			log::warn!("APE: Item `{key}` is not valid UTF-8, keeping it as-is");
			return Ok(ApeSlot::opaque(item));
		},
	};

	let slot_key = match field_for_key(&key) {
		Some(field) => ApeSlotKey::Field(field),
		None => ApeSlotKey::Additional(key.clone()),
	};

	// Keys are case insensitive, and can only appear once
	if slots.iter().any(|slot| slot.key.matches(&slot_key)) || tag.additional().contains_key(&key) {
		log::debug!("APE: Duplicate item `{key}`, keeping it as-is");
		return Ok(ApeSlot::opaque(item));
	}

	match slot_key {
		ApeSlotKey::Field(field @ (BaseField::TrackNumber | BaseField::DiscNumber)) => {
			let total_field = if field == BaseField::TrackNumber {
				BaseField::TrackTotal
			} else {
				BaseField::DiscTotal
			};

			match split_pair(&value) {
				(None, None) => {
					tag.insert(field, String::new());
				},
				(number, total) => {
					if let Some(number) = number {
						tag.insert(field, number);
					}
					if let Some(total) = total {
						tag.insert(total_field, total);
					}
				},
			}
		},
		ApeSlotKey::Field(field) => {
			tag.insert(field, value.clone());
		},
		_ => {
			tag.additional_mut().insert(key, value.clone());
		},
	}

	Ok(ApeSlot {
		key: slot_key,
		item,
		value,
	})
}
