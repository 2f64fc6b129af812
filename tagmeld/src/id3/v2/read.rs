use super::content::{decode_described_text_frame, decode_picture_frame, decode_text_frame};
use super::frame::{RawFrame, frame_content, read_frames};
use super::header::{ID3V2_HEADER_SIZE, Id3v2Header, Id3v2Version};
use super::mappings::{field_for_frame, resolve_genre};
use super::synchsafe::{SynchsafeInteger, remove_unsynchronisation};
use super::{FrameSlot, Id3v2Native, SlotKey};
use crate::codec::{DecodeContext, DecodedTag, NativeData};
use crate::config::{ParseOptions, ParsingMode};
use crate::error::{Id3v2Error, Id3v2ErrorKind, Result};
use crate::macros::err;
use crate::tag::number::split_pair;
use crate::tag::{BaseField, Tag};

use byteorder::{BigEndian, ByteOrder};

pub(super) fn decode(data: &[u8], ctx: &DecodeContext) -> Result<DecodedTag> {
	let parse_options = ctx.parse_options;
	let header = Id3v2Header::parse(data)?;

	if (data.len() as u64) < header.full_tag_size() {
		log::warn!(
			"ID3v2 tag claims {} bytes, only {} are available",
			header.full_tag_size(),
			data.len()
		);
		err!(SizeMismatch);
	}

	let mut body = &data[ID3V2_HEADER_SIZE..ID3V2_HEADER_SIZE + header.size as usize];

	// In ID3v2.4 unsynchronisation is applied per frame, the tag flag only signals that all
	// frames are unsynchronised
	let deunsynchronised;
	if header.flags.unsynchronisation && header.version != Id3v2Version::V4 {
		log::debug!("Removing tag-level unsynchronisation");
		deunsynchronised = remove_unsynchronisation(body);
		body = &deunsynchronised;
	}

	if header.flags.extended_header {
		body = skip_extended_header(body, header.version)?;
	}

	let frame_list = read_frames(body, header.version, parse_options.parsing_mode)?;
	log::debug!(
		"Found {} frames and {} bytes of padding",
		frame_list.frames.len(),
		frame_list.padding
	);

	let mut tag = Tag::new();
	let mut slots: Vec<FrameSlot> = Vec::with_capacity(frame_list.frames.len());
	for raw in frame_list.frames {
		let slot = decode_slot(raw, &header, &mut tag, &slots, parse_options)?;
		slots.push(slot);
	}

	Ok(DecodedTag {
		tag,
		native: NativeData::Id3v2(Id3v2Native {
			version: header.version,
			revision: header.revision,
			flags: header.flags,
			slots,
		}),
	})
}

fn skip_extended_header(body: &[u8], version: Id3v2Version) -> Result<&[u8]> {
	let Some(size_bytes) = body.get(..4) else {
		return Err(Id3v2Error::new(Id3v2ErrorKind::BadExtendedHeaderSize).into());
	};

	let size = BigEndian::read_u32(size_bytes);
	let extended_size = match version {
		// The size excludes itself
		Id3v2Version::V3 => u64::from(size) + 4,
		// The size includes itself, and is synchsafe
		_ => u64::from(size.unsynch()),
	};

	if extended_size < 6 || extended_size > body.len() as u64 {
		return Err(Id3v2Error::new(Id3v2ErrorKind::BadExtendedHeaderSize).into());
	}

	log::debug!("Skipping {extended_size} byte extended header");
	Ok(&body[extended_size as usize..])
}

fn decode_slot(
	raw: RawFrame,
	header: &Id3v2Header,
	tag: &mut Tag,
	slots: &[FrameSlot],
	parse_options: ParseOptions,
) -> Result<FrameSlot> {
	let content = match frame_content(
		&raw,
		header.version,
		header.flags.unsynchronisation,
		parse_options,
	) {
		Ok(Some(content)) => content,
		Ok(None) => return Ok(FrameSlot::opaque(raw)),
		Err(e) => {
			if parse_options.parsing_mode == ParsingMode::Strict {
				return Err(e);
			}

			log::warn!("Unable to read the content of frame `{}`, keeping it as-is: {e}", raw.id);
			return Ok(FrameSlot::opaque(raw));
		},
	};

	match interpret(&raw.id, &content, header.version, tag, slots, parse_options) {
		Ok(Some(interpreted)) => Ok(FrameSlot {
			key: interpreted.key,
			raw,
			value: interpreted.value,
			encoding: interpreted.encoding,
			language: interpreted.language,
		}),
		Ok(None) => Ok(FrameSlot::opaque(raw)),
		Err(e) => {
			if parse_options.parsing_mode == ParsingMode::Strict {
				return Err(e);
			}

			log::warn!("Unable to decode frame `{}`, keeping it as-is: {e}", raw.id);
			Ok(FrameSlot::opaque(raw))
		},
	}
}

struct Interpreted {
	key: SlotKey,
	value: String,
	encoding: Option<crate::util::text::TextEncoding>,
	language: Option<[u8; 3]>,
}

// Returns `None` for frames that don't map to the field model, or that duplicate
// an earlier frame
fn interpret(
	id: &str,
	content: &[u8],
	version: Id3v2Version,
	tag: &mut Tag,
	slots: &[FrameSlot],
	parse_options: ParseOptions,
) -> Result<Option<Interpreted>> {
	let seen = |key: &SlotKey| slots.iter().any(|slot| slot.key.matches(key));

	match id {
		"TXXX" | "TXX" => {
			let frame = decode_described_text_frame(content, false)?;
			if tag.additional().contains_key(&frame.description) {
				log::debug!("Duplicate user text frame `{}`", frame.description);
				return Ok(None);
			}

			tag.additional_mut()
				.insert(frame.description.clone(), frame.value.clone());
			Ok(Some(Interpreted {
				key: SlotKey::Additional(frame.description),
				value: frame.value,
				encoding: Some(frame.encoding),
				language: None,
			}))
		},
		"COMM" | "COM" => {
			let frame = decode_described_text_frame(content, true)?;
			if !frame.description.is_empty() || seen(&SlotKey::Comment) {
				return Ok(None);
			}

			tag.insert(BaseField::Comment, frame.value.clone());
			Ok(Some(Interpreted {
				key: SlotKey::Comment,
				value: frame.value,
				encoding: Some(frame.encoding),
				language: frame.language,
			}))
		},
		"APIC" | "PIC" => {
			if !parse_options.read_cover_art {
				return Ok(None);
			}

			let frame = decode_picture_frame(content, version)?;
			let index = tag.pictures().len();
			tag.pictures_mut().push(frame.picture);

			Ok(Some(Interpreted {
				key: SlotKey::Picture(index),
				value: String::new(),
				encoding: Some(frame.encoding),
				language: None,
			}))
		},
		_ if id.starts_with('T') => {
			let frame = decode_text_frame(content)?;
			let value = frame.value;

			let key = match field_for_frame(id) {
				Some(field) => SlotKey::Field(field),
				None => SlotKey::Additional(id.to_owned()),
			};

			if seen(&key) {
				log::debug!("Duplicate frame `{id}`");
				return Ok(None);
			}

			match key {
				SlotKey::Field(field @ (BaseField::TrackNumber | BaseField::DiscNumber)) => {
					let total_field = if field == BaseField::TrackNumber {
						BaseField::TrackTotal
					} else {
						BaseField::DiscTotal
					};

					let (number, total) = split_pair(&value);
					match (number, total) {
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

					Ok(Some(Interpreted {
						key,
						value,
						encoding: Some(frame.encoding),
						language: None,
					}))
				},
				SlotKey::Field(field) => {
					let value = if field == BaseField::Genre {
						resolve_genre(&value)
					} else {
						value
					};

					tag.insert(field, value.clone());
					Ok(Some(Interpreted {
						key,
						value,
						encoding: Some(frame.encoding),
						language: None,
					}))
				},
				_ => {
					if tag.additional().contains_key(id) {
						return Ok(None);
					}

					tag.additional_mut().insert(id, value.clone());
					Ok(Some(Interpreted {
						key,
						value,
						encoding: Some(frame.encoding),
						language: None,
					}))
				},
			}
		},
		_ => Ok(None),
	}
}
