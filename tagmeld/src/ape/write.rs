use super::constants::{APE_HEADER_SIZE, APE_V1, APE_V2, ITEM_TYPE_BINARY, ITEM_TYPE_TEXT};
use super::header::{ApeHeader, FLAG_HAS_HEADER, FLAG_READ_ONLY};
use super::mappings::{field_for_key, key_for_field};
use super::read::verify_key;
use super::{ApeItem, ApeSlotKey};
use crate::codec::{DecodedTag, EncodeContext, NativeData};
use crate::config::WriteOptions;
use crate::error::Result;
use crate::macros::{err, value_err};
use crate::picture::{Picture, PictureType};
use crate::tag::number::{join_pair, render_number};
use crate::tag::{BaseField, Tag, TagFormat};

use byteorder::{LittleEndian, WriteBytesExt};

struct DesiredItem {
	key: ApeSlotKey,
	item_key: String,
	value: String,
	written: bool,
}

pub(super) fn encode(
	tag: &Tag,
	prior: Option<&DecodedTag>,
	ctx: &EncodeContext,
) -> Result<Vec<u8>> {
	let native = prior.and_then(|prior| match &prior.native {
		NativeData::Ape(native) => Some(native),
		_ => None,
	});
	let prior_tag = prior.map(DecodedTag::tag);

	let mut desired = desired_items(tag, prior_tag, &ctx.write_options)?;
	let mut pictures_written = vec![false; tag.pictures().len()];
	let mut picture_types = Vec::new();

	let mut items = Vec::new();
	for slot in native.map(|native| native.slots.as_slice()).unwrap_or_default() {
		match &slot.key {
			ApeSlotKey::Opaque => items.push(slot.item.clone()),
			ApeSlotKey::Picture(index, _) => {
				let Some(picture) = tag.pictures().get(*index) else {
					log::trace!("Dropping removed picture #{index}");
					continue;
				};

				pictures_written[*index] = true;
				if prior_tag.and_then(|prior| prior.pictures().get(*index)) == Some(picture)
					&& !picture_types.contains(&picture.pic_type())
				{
					picture_types.push(picture.pic_type());
					items.push(slot.item.clone());
				} else {
					push_picture(&mut items, &mut picture_types, picture, slot.item.flags);
				}
			},
			key => {
				let Some(desired) = desired
					.iter_mut()
					.find(|desired| !desired.written && desired.key.matches(key))
				else {
					log::trace!("Dropping item `{}`", String::from_utf8_lossy(&slot.item.key));
					continue;
				};

				desired.written = true;
				if desired.value == slot.value {
					items.push(slot.item.clone());
				} else {
					items.push(ApeItem {
						key: slot.item.key.clone(),
						flags: slot.item.flags,
						value: desired.value.as_bytes().to_vec(),
					});
				}
			},
		}
	}

	for desired in desired.into_iter().filter(|desired| !desired.written) {
		items.push(ApeItem {
			key: desired.item_key.into_bytes(),
			flags: ITEM_TYPE_TEXT << 1,
			value: desired.value.into_bytes(),
		});
	}

	for (picture, _) in tag
		.pictures()
		.iter()
		.zip(pictures_written)
		.filter(|(_, written)| !written)
	{
		push_picture(&mut items, &mut picture_types, picture, 0);
	}

	let mut version = native.map_or(APE_V2, |native| native.version);
	let mut flags = native.map_or(FLAG_HAS_HEADER, |native| native.flags);
	if version == APE_V1 && items.iter().any(|item| item.item_type() != ITEM_TYPE_TEXT) {
		log::debug!("APEv1 can only hold text items, upgrading the tag to APEv2");
		version = APE_V2;
		flags |= FLAG_HAS_HEADER;
	} else if version != APE_V1 && version != APE_V2 {
		version = APE_V2;
	}

	create_ape_tag(&items, version, flags)
}

fn push_picture(
	items: &mut Vec<ApeItem>,
	picture_types: &mut Vec<PictureType>,
	picture: &Picture,
	flags: u32,
) {
	let pic_type = picture.pic_type();
	let Some(key) = pic_type.as_ape_key() else {
		log::warn!("APE: No item key for picture type {pic_type:?}, dropping it");
		return;
	};

	if picture_types.contains(&pic_type) {
		log::warn!("APE: Only one picture of type {pic_type:?} can be stored, dropping it");
		return;
	}

	picture_types.push(pic_type);
	items.push(ApeItem {
		key: key.as_bytes().to_vec(),
		flags: (flags & FLAG_READ_ONLY) | (ITEM_TYPE_BINARY << 1),
		value: picture.as_ape_bytes(),
	});
}

fn desired_items(
	tag: &Tag,
	prior_tag: Option<&Tag>,
	options: &WriteOptions,
) -> Result<Vec<DesiredItem>> {
	let mut desired = Vec::new();

	for (field, value) in tag.fields() {
		if matches!(field, BaseField::TrackTotal | BaseField::DiscTotal) {
			continue;
		}

		let value = match field {
			BaseField::TrackNumber => number_pair(tag, prior_tag, field, BaseField::TrackTotal, options)?,
			BaseField::DiscNumber => number_pair(tag, prior_tag, field, BaseField::DiscTotal, options)?,
			_ => Some(value.to_owned()),
		};

		if let (Some(value), Some(item_key)) = (value, key_for_field(field)) {
			desired.push(DesiredItem {
				key: ApeSlotKey::Field(field),
				item_key: item_key.to_owned(),
				value,
				written: false,
			});
		}
	}

	// Totals without a number
	for (number, total) in [
		(BaseField::TrackNumber, BaseField::TrackTotal),
		(BaseField::DiscNumber, BaseField::DiscTotal),
	] {
		if !tag.contains(number) && tag.contains(total) {
			if let (Some(value), Some(item_key)) = (
				number_pair(tag, prior_tag, number, total, options)?,
				key_for_field(number),
			) {
				desired.push(DesiredItem {
					key: ApeSlotKey::Field(number),
					item_key: item_key.to_owned(),
					value,
					written: false,
				});
			}
		}
	}

	for (key, value) in tag.additional().iter() {
		if !verify_key(key) {
			value_err!(@BAIL Ape, key, "not a valid APE item key");
		}

		if field_for_key(key).is_some() || PictureType::from_ape_key(key).is_some() {
			value_err!(@BAIL Ape, key, "APE item key is reserved");
		}

		desired.push(DesiredItem {
			key: ApeSlotKey::Additional(key.to_owned()),
			item_key: key.to_owned(),
			value: value.to_owned(),
			written: false,
		});
	}

	Ok(desired)
}

fn number_pair(
	tag: &Tag,
	prior_tag: Option<&Tag>,
	number_field: BaseField,
	total_field: BaseField,
	options: &WriteOptions,
) -> Result<Option<String>> {
	let prior = |field| prior_tag.and_then(|prior| prior.get(field));
	let total = tag.get(total_field);

	let number = tag
		.get(number_field)
		.map(|number| {
			render_number(
				TagFormat::Ape,
				number_field,
				number,
				prior(number_field),
				total,
				options,
			)
		})
		.transpose()?;
	let total = total
		.map(|total| {
			render_number(TagFormat::Ape, total_field, total, prior(total_field), None, options)
		})
		.transpose()?;

	Ok(join_pair(number.as_deref(), total.as_deref()))
}

fn create_ape_tag(items: &[ApeItem], version: u32, flags: u32) -> Result<Vec<u8>> {
	let mut body = Vec::new();
	for item in items {
		let Ok(value_size) = u32::try_from(item.value.len()) else {
			err!(TooMuchData);
		};

		body.write_u32::<LittleEndian>(value_size)?;
		body.write_u32::<LittleEndian>(item.flags)?;
		body.extend_from_slice(&item.key);
		body.push(0);
		body.extend_from_slice(&item.value);
	}

	// The size includes the 32 bytes of the footer
	let (Ok(size), Ok(item_count)) = (
		u32::try_from(body.len() + APE_HEADER_SIZE),
		u32::try_from(items.len()),
	) else {
		err!(TooMuchData);
	};

	let header = ApeHeader {
		version,
		size,
		item_count,
		flags,
	};

	let mut tag = Vec::with_capacity(body.len() + APE_HEADER_SIZE * 2);
	if header.has_header() {
		tag.extend_from_slice(&header.as_bytes(true));
	}
	tag.extend_from_slice(&body);
	tag.extend_from_slice(&header.as_bytes(false));

	Ok(tag)
}
