use super::content::{
	choose_encoding, encode_described_text_frame, encode_picture_frame, encode_text_frame,
};
use super::frame::{FrameFlags, write_frame, write_raw_frame};
use super::header::{ID3V2_HEADER_SIZE, Id3v2Header, Id3v2Version};
use super::mappings::{
	comment_frame, frame_for_field, is_text_frame_key, picture_frame, user_text_frame,
};
use super::synchsafe::SynchsafeInteger;
use super::{FrameSlot, SlotKey};
use crate::codec::{DecodedTag, EncodeContext, NativeData};
use crate::config::WriteOptions;
use crate::error::Result;
use crate::macros::{err, value_err};
use crate::picture::{MimeType, Picture};
use crate::tag::number::{join_pair, render_number};
use crate::tag::{BaseField, Tag, TagFormat};
use crate::util::text::TextEncoding;

const NEW_COMMENT_LANGUAGE: [u8; 3] = *b"XXX";

struct DesiredFrame {
	key: SlotKey,
	value: String,
	written: bool,
}

pub(super) fn encode(
	tag: &Tag,
	prior: Option<&DecodedTag>,
	ctx: &EncodeContext,
) -> Result<Vec<u8>> {
	let native = prior.and_then(|prior| match &prior.native {
		NativeData::Id3v2(native) => Some(native),
		_ => None,
	});
	let prior_tag = prior.map(DecodedTag::tag);

	let version = native.map_or(Id3v2Version::V4, |native| native.version);
	let mut flags = native.map(|native| native.flags).unwrap_or_default();
	if flags.extended_header {
		log::debug!("Dropping the extended header");
	}
	flags.unsynchronisation = false;
	flags.extended_header = false;

	let mut desired = desired_frames(tag, prior_tag, &ctx.write_options)?;
	let mut pictures_written = vec![false; tag.pictures().len()];

	let mut frames = Vec::new();
	for slot in native.map(|native| native.slots.as_slice()).unwrap_or_default() {
		match &slot.key {
			SlotKey::Opaque => write_raw_frame(&mut frames, version, &slot.raw)?,
			SlotKey::Picture(index) => {
				let Some(picture) = tag.pictures().get(*index) else {
					log::trace!("Dropping removed picture #{index}");
					continue;
				};

				pictures_written[*index] = true;
				if prior_tag.and_then(|prior| prior.pictures().get(*index)) == Some(picture) {
					write_raw_frame(&mut frames, version, &slot.raw)?;
				} else {
					write_picture(
						&mut frames,
						version,
						slot.encoding,
						slot.raw.flags.for_new_content(),
						picture,
					)?;
				}
			},
			key => {
				let Some(desired) = desired
					.iter_mut()
					.find(|desired| !desired.written && desired.key.matches(key))
				else {
					log::trace!("Dropping frame `{}`", slot.raw.id);
					continue;
				};

				desired.written = true;
				if desired.value == slot.value {
					write_raw_frame(&mut frames, version, &slot.raw)?;
				} else {
					rewrite_slot(&mut frames, version, slot, &desired.value)?;
				}
			},
		}
	}

	for desired in desired.iter().filter(|desired| !desired.written) {
		write_new_text(&mut frames, version, desired)?;
	}

	for (picture, _) in tag
		.pictures()
		.iter()
		.zip(pictures_written)
		.filter(|(_, written)| !written)
	{
		write_picture(&mut frames, version, None, FrameFlags::default(), picture)?;
	}

	let Ok(size) = u32::try_from(frames.len()) else {
		err!(TooMuchData);
	};

	let header = Id3v2Header {
		version,
		revision: native.map_or(0, |native| native.revision),
		flags,
		size,
	};

	let mut tag_bytes = Vec::with_capacity(frames.len() + ID3V2_HEADER_SIZE * 2);
	tag_bytes.extend_from_slice(&header.as_bytes(false)?);
	tag_bytes.extend_from_slice(&frames);
	if header.flags.footer {
		tag_bytes.extend_from_slice(&header.as_bytes(true)?);
	}

	Ok(tag_bytes)
}

pub(super) fn pad(encoded: &mut Vec<u8>, padding: u32) -> Result<bool> {
	if encoded.len() < ID3V2_HEADER_SIZE {
		return Ok(false);
	}

	// A tag with a footer can't hold padding
	if encoded[3] == 4 && encoded[5] & 0x10 == 0x10 {
		return Ok(false);
	}

	let Ok(size) = u32::try_from(encoded.len() - ID3V2_HEADER_SIZE + padding as usize) else {
		err!(TooMuchData);
	};

	let size = size.synch()?;
	encoded.resize(encoded.len() + padding as usize, 0);
	encoded[6..ID3V2_HEADER_SIZE].copy_from_slice(&size.to_be_bytes());

	Ok(true)
}

fn desired_frames(
	tag: &Tag,
	prior_tag: Option<&Tag>,
	options: &WriteOptions,
) -> Result<Vec<DesiredFrame>> {
	let mut desired = Vec::new();
	let mut push = |key, value| {
		desired.push(DesiredFrame {
			key,
			value,
			written: false,
		})
	};

	for (field, value) in tag.fields() {
		match field {
			BaseField::TrackNumber
			| BaseField::TrackTotal
			| BaseField::DiscNumber
			| BaseField::DiscTotal
			| BaseField::Comment => {},
			_ => push(SlotKey::Field(field), value.to_owned()),
		}
	}

	for (number, total) in [
		(BaseField::TrackNumber, BaseField::TrackTotal),
		(BaseField::DiscNumber, BaseField::DiscTotal),
	] {
		if let Some(pair) = number_pair(tag, prior_tag, number, total, options)? {
			push(SlotKey::Field(number), pair);
		}
	}

	if let Some(comment) = tag.comment() {
		push(SlotKey::Comment, comment.to_owned());
	}

	for (key, value) in tag.additional().iter() {
		push(SlotKey::Additional(key.to_owned()), value.to_owned());
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
				TagFormat::Id3v2,
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
			render_number(
				TagFormat::Id3v2,
				total_field,
				total,
				prior(total_field),
				None,
				options,
			)
		})
		.transpose()?;

	Ok(join_pair(number.as_deref(), total.as_deref()))
}

// Re-encode a frame, keeping its ID, flags, encoding, and language where possible
fn rewrite_slot(
	frames: &mut Vec<u8>,
	version: Id3v2Version,
	slot: &FrameSlot,
	value: &str,
) -> Result<()> {
	let flags = slot.raw.flags.for_new_content();
	let id = slot.raw.id.as_str();

	let content = match &slot.key {
		SlotKey::Comment => {
			let encoding = choose_encoding(version, slot.encoding, &[value]);
			encode_described_text_frame(
				encoding,
				Some(slot.language.unwrap_or(NEW_COMMENT_LANGUAGE)),
				"",
				value,
			)?
		},
		SlotKey::Additional(description) if id == user_text_frame(version) => {
			let encoding = choose_encoding(version, slot.encoding, &[description.as_str(), value]);
			encode_described_text_frame(encoding, None, description, value)?
		},
		_ => encode_text_frame(choose_encoding(version, slot.encoding, &[value]), value)?,
	};

	write_frame(frames, version, id, flags, &content)
}

fn write_new_text(frames: &mut Vec<u8>, version: Id3v2Version, desired: &DesiredFrame) -> Result<()> {
	let value = desired.value.as_str();

	let (id, content) = match &desired.key {
		SlotKey::Field(field) => {
			let Some(id) = frame_for_field(*field, version) else {
				log::warn!("No ID3v2 frame for {field:?}, skipping");
				return Ok(());
			};

			let encoding = choose_encoding(version, None, &[value]);
			(id, encode_text_frame(encoding, value)?)
		},
		SlotKey::Comment => {
			let encoding = choose_encoding(version, None, &[value]);
			(
				comment_frame(version),
				encode_described_text_frame(encoding, Some(NEW_COMMENT_LANGUAGE), "", value)?,
			)
		},
		SlotKey::Additional(key) if is_text_frame_key(key, version) => {
			let encoding = choose_encoding(version, None, &[value]);
			(key.as_str(), encode_text_frame(encoding, value)?)
		},
		SlotKey::Additional(key) => {
			let encoding = choose_encoding(version, None, &[key.as_str(), value]);
			(
				user_text_frame(version),
				encode_described_text_frame(encoding, None, key, value)?,
			)
		},
		SlotKey::Picture(_) | SlotKey::Opaque => return Ok(()),
	};

	write_frame(frames, version, id, FrameFlags::default(), &content)
}

fn write_picture(
	frames: &mut Vec<u8>,
	version: Id3v2Version,
	preferred_encoding: Option<TextEncoding>,
	flags: FrameFlags,
	picture: &Picture,
) -> Result<()> {
	if version == Id3v2Version::V2
		&& !matches!(
			picture.mime_type(),
			Some(MimeType::Png | MimeType::Jpeg | MimeType::Gif | MimeType::Bmp | MimeType::Tiff)
		) {
		value_err!(@BAIL Id3v2, "picture", "ID3v2.2 can't store pictures of this format");
	}

	let description = picture.description().unwrap_or_default();
	let encoding = choose_encoding(version, preferred_encoding, &[description]);
	let content = encode_picture_frame(version, encoding, picture)?;

	write_frame(frames, version, picture_frame(version), flags, &content)
}
