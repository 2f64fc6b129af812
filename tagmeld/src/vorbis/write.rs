use super::mappings::{PICTURE_KEY, key_for_field, verify_key};
use super::{CommentKey, CommentSlot};
use crate::codec::{DecodedTag, EncodeContext, NativeData};
use crate::config::WriteOptions;
use crate::error::Result;
use crate::file::FileType;
use crate::macros::{err, value_err};
use crate::picture::PictureInformation;
use crate::tag::number::{join_pair, render_number};
use crate::tag::{BaseField, Tag, TagFormat};

use data_encoding::BASE64;

struct DesiredComment {
	key: CommentKey,
	value: String,
	written: bool,
}

pub(super) fn encode(
	tag: &Tag,
	prior: Option<&DecodedTag>,
	ctx: &EncodeContext,
) -> Result<Vec<u8>> {
	let native = prior.and_then(|prior| match &prior.native {
		NativeData::Vorbis(native) => Some(native),
		_ => None,
	});
	let prior_tag = prior.map(DecodedTag::tag);
	let slots = native.map(|native| native.slots.as_slice()).unwrap_or_default();

	let mut desired = desired_comments(tag, prior_tag, slots, &ctx.write_options)?;

	// Pictures in FLAC files are written as PICTURE blocks
	let embed_pictures = ctx.file_type != FileType::Flac;
	let mut pictures_written = vec![false; tag.pictures().len()];

	// Whether the first comment for a key was written unchanged
	let mut unchanged_keys: Vec<&CommentKey> = Vec::new();

	let mut comments = Vec::new();
	for slot in slots {
		match &slot.key {
			CommentKey::Opaque => comments.push(slot.raw.clone()),
			CommentKey::Picture(index) => {
				let Some(picture) = tag.pictures().get(*index).filter(|_| embed_pictures) else {
					continue;
				};

				pictures_written[*index] = true;
				if prior_tag.and_then(|prior| prior.pictures().get(*index)) == Some(picture) {
					comments.push(slot.raw.clone());
				} else {
					let encoded = BASE64.encode(&picture.as_flac_bytes(PictureInformation::default()));
					comments.push(format!("{}={encoded}", slot.raw_key()).into_bytes());
				}
			},
			key if !slot.primary => {
				if unchanged_keys.iter().any(|unchanged| unchanged.matches(key)) {
					comments.push(slot.raw.clone());
				}
			},
			key => {
				let Some(desired) = desired
					.iter_mut()
					.find(|desired| !desired.written && desired.key.matches(key))
				else {
					log::trace!("Dropping comment `{}`", slot.raw_key());
					continue;
				};

				desired.written = true;
				if desired.value == slot.value {
					unchanged_keys.push(key);
					comments.push(slot.raw.clone());
				} else {
					comments.push(format!("{}={}", slot.raw_key(), desired.value).into_bytes());
				}
			},
		}
	}

	for desired in desired.into_iter().filter(|desired| !desired.written) {
		let key = match &desired.key {
			CommentKey::Field(field) => key_for_field(*field),
			CommentKey::Additional(key) => key.as_str(),
			CommentKey::Picture(_) | CommentKey::Opaque => continue,
		};

		comments.push(format!("{key}={}", desired.value).into_bytes());
	}

	if embed_pictures {
		for (picture, _) in tag
			.pictures()
			.iter()
			.zip(pictures_written)
			.filter(|(_, written)| !written)
		{
			let encoded = BASE64.encode(&picture.as_flac_bytes(PictureInformation::default()));
			comments.push(format!("{PICTURE_KEY}={encoded}").into_bytes());
		}
	}

	let vendor = native.map_or("", |native| native.vendor.as_str());
	create_comments(vendor, &comments)
}

fn desired_comments(
	tag: &Tag,
	prior_tag: Option<&Tag>,
	slots: &[CommentSlot],
	options: &WriteOptions,
) -> Result<Vec<DesiredComment>> {
	let has_slot = |field, paired: bool| {
		slots.iter().any(|slot| {
			slot.primary && slot.key == CommentKey::Field(field) && (!paired || slot.paired)
		})
	};
	let render = |field| {
		tag.get(field)
			.map(|value| {
				let total = match field {
					BaseField::TrackNumber => tag.get(BaseField::TrackTotal),
					BaseField::DiscNumber => tag.get(BaseField::DiscTotal),
					_ => None,
				};

				render_number(
					TagFormat::VorbisComments,
					field,
					value,
					prior_tag.and_then(|prior| prior.get(field)),
					total,
					options,
				)
			})
			.transpose()
	};

	let mut desired = Vec::new();
	let mut push = |field, value| {
		desired.push(DesiredComment {
			key: CommentKey::Field(field),
			value,
			written: false,
		})
	};

	for (field, value) in tag.fields() {
		match field {
			BaseField::TrackNumber
			| BaseField::TrackTotal
			| BaseField::DiscNumber
			| BaseField::DiscTotal => {},
			_ => push(field, value.to_owned()),
		}
	}

	for (number_field, total_field) in [
		(BaseField::TrackNumber, BaseField::TrackTotal),
		(BaseField::DiscNumber, BaseField::DiscTotal),
	] {
		let number = render(number_field)?;
		let total = render(total_field)?;

		// A "current/total" comment holds the total, unless there is a separate one already
		if has_slot(number_field, true) {
			if let Some(pair) = join_pair(number.as_deref(), total.as_deref()) {
				push(number_field, pair);
			}

			if has_slot(total_field, false) {
				if let Some(total) = total {
					push(total_field, total);
				}
			}

			continue;
		}

		if let Some(number) = number {
			push(number_field, number);
		}
		if let Some(total) = total {
			push(total_field, total);
		}
	}

	for (key, value) in tag.additional().iter() {
		if !verify_key(key) {
			value_err!(@BAIL VorbisComments, key, "not a valid Vorbis comment field name");
		}

		desired.push(DesiredComment {
			key: CommentKey::Additional(key.to_owned()),
			value: value.to_owned(),
			written: false,
		});
	}

	Ok(desired)
}

fn write_sized(out: &mut Vec<u8>, bytes: &[u8]) -> Result<()> {
	let Ok(len) = u32::try_from(bytes.len()) else {
		err!(TooMuchData);
	};

	out.extend_from_slice(&len.to_le_bytes());
	out.extend_from_slice(bytes);
	Ok(())
}

fn create_comments(vendor: &str, comments: &[Vec<u8>]) -> Result<Vec<u8>> {
	let mut out = Vec::new();
	write_sized(&mut out, vendor.as_bytes())?;

	let Ok(count) = u32::try_from(comments.len()) else {
		err!(TooMuchData);
	};

	out.extend_from_slice(&count.to_le_bytes());
	for comment in comments {
		write_sized(&mut out, comment)?;
	}

	Ok(out)
}
