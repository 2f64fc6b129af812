//! ID3v2 items and utilities
//!
//! ## Important notes
//!
//! See:
//!
//! * [`GENRES`](crate::id3::v1::GENRES)
//!
//! ID3v2.2, ID3v2.3, and ID3v2.4 tags are read. A tag is written back in the version it was
//! read as, new tags are written as ID3v2.4.
//!
//! Only a handful of frames map to the field model:
//!
//! * Text information frames (`T***`), user defined text frames (`TXXX`), and comments (`COMM`)
//!   with an empty description are fields
//! * Attached pictures (`APIC`) are pictures
//!
//! Every other frame (and any frame that couldn't be decoded) is kept as-is, and written back
//! in its original position.

mod content;
pub(crate) mod frame;
pub(crate) mod header;
mod mappings;
mod read;
mod synchsafe;
mod write;

pub use frame::FrameFlags;
pub use header::{Id3v2TagFlags, Id3v2Version};
pub use synchsafe::SynchsafeInteger;

use crate::codec::{DecodeContext, DecodedTag, EncodeContext, TagCodec};
use crate::error::Result;
use crate::file::FileType;
use crate::tag::{BaseField, Tag, TagFormat};
use crate::util::text::TextEncoding;

use frame::RawFrame;

/// What a frame holds, in terms of the field model
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum SlotKey {
	/// A text frame mapping to a base field, `TRCK`/`TPOS` hold the number and total
	Field(BaseField),
	/// A `COMM` frame with an empty description
	Comment,
	/// A user defined text frame, or a text frame with no mapping
	Additional(String),
	/// An `APIC` frame, the index of its picture
	Picture(usize),
	/// Anything else, written back untouched
	Opaque,
}

impl SlotKey {
	pub(crate) fn matches(&self, other: &SlotKey) -> bool {
		match (self, other) {
			(SlotKey::Additional(a), SlotKey::Additional(b)) => a.eq_ignore_ascii_case(b),
			(SlotKey::Opaque, _) | (_, SlotKey::Opaque) => false,
			(a, b) => a == b,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FrameSlot {
	pub(crate) key: SlotKey,
	pub(crate) raw: RawFrame,
	/// The decoded value, as it appears in the field model
	pub(crate) value: String,
	pub(crate) encoding: Option<TextEncoding>,
	pub(crate) language: Option<[u8; 3]>,
}

impl FrameSlot {
	pub(crate) fn opaque(raw: RawFrame) -> Self {
		Self {
			key: SlotKey::Opaque,
			raw,
			value: String::new(),
			encoding: None,
			language: None,
		}
	}
}

/// Everything about a decoded ID3v2 tag that the field model doesn't hold
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Id3v2Native {
	pub(crate) version: Id3v2Version,
	pub(crate) revision: u8,
	pub(crate) flags: Id3v2TagFlags,
	/// Every frame, in its original order
	pub(crate) slots: Vec<FrameSlot>,
}

/// The ID3v2 [`TagCodec`]
#[derive(Copy, Clone, Debug, Default)]
pub struct Id3v2Codec;

impl TagCodec for Id3v2Codec {
	fn format(&self) -> TagFormat {
		TagFormat::Id3v2
	}

	fn default_priority(&self) -> u8 {
		1
	}

	fn supports_additional_fields(&self) -> bool {
		true
	}

	fn supports_pictures(&self, _file_type: FileType) -> bool {
		true
	}

	fn decode(&self, data: &[u8], ctx: &DecodeContext) -> Result<DecodedTag> {
		read::decode(data, ctx)
	}

	fn encode(
		&self,
		tag: &Tag,
		prior: Option<&DecodedTag>,
		ctx: &EncodeContext,
	) -> Result<Vec<u8>> {
		write::encode(tag, prior, ctx)
	}

	fn pad(&self, encoded: &mut Vec<u8>, padding: u32) -> Result<bool> {
		write::pad(encoded, padding)
	}
}

#[cfg(test)]
mod tests {
	use super::frame::{FrameFlags, write_frame};
	use super::header::{Id3v2Header, Id3v2TagFlags};
	use super::{Id3v2Codec, Id3v2Version};
	use crate::codec::{DecodeContext, EncodeContext, NativeData, TagCodec};
	use crate::config::{ParseOptions, ParsingMode, WriteOptions};
	use crate::file::FileType;
	use crate::picture::{MimeType, Picture, PictureType};
	use crate::tag::{BaseField, Tag};

	fn build_tag(version: Id3v2Version, flags: Id3v2TagFlags, frames: &[(&str, &[u8])]) -> Vec<u8> {
		let mut body = Vec::new();
		for (id, content) in frames {
			write_frame(&mut body, version, id, FrameFlags::default(), content).unwrap();
		}

		let header = Id3v2Header {
			version,
			revision: 0,
			flags,
			size: body.len() as u32,
		};

		let mut tag = header.as_bytes(false).unwrap().to_vec();
		tag.extend(body);
		if flags.footer {
			tag.extend(header.as_bytes(true).unwrap());
		}

		tag
	}

	fn decode_ctx() -> DecodeContext {
		DecodeContext::new(FileType::Mpeg, ParseOptions::new())
	}

	fn encode_ctx() -> EncodeContext {
		EncodeContext::new(FileType::Mpeg, WriteOptions::new())
	}

	fn v3_tag() -> Vec<u8> {
		build_tag(
			Id3v2Version::V3,
			Id3v2TagFlags::default(),
			&[
				("TIT2", b"\x00Title"),
				("TPE1", b"\x01\xFF\xFEA\x00r\x00t\x00i\x00s\x00t\x00"),
				("PRIV", b"owner\x00\x01\x02\x03"),
				("TRCK", b"\x0003/12"),
				("TCON", b"\x00(17)"),
				("TYER", b"\x001984"),
				("COMM", b"\x00eng\x00A comment"),
				("COMM", b"\x00engiTunNORM\x00 0000"),
				("TXXX", b"\x00REPLAYGAIN_TRACK_GAIN\x00-6.2 dB"),
				("TENC", b"\x00Encoder"),
				("APIC", b"\x00image/png\x00\x03\x00\x89PNG"),
			],
		)
	}

	#[test_log::test]
	fn decode_v3() {
		let decoded = Id3v2Codec.decode(&v3_tag(), &decode_ctx()).unwrap();
		let tag = decoded.tag();

		assert_eq!(tag.title(), Some("Title"));
		assert_eq!(tag.artist(), Some("Artist"));
		assert_eq!(tag.get(BaseField::TrackNumber), Some("03"));
		assert_eq!(tag.track(), Some(3));
		assert_eq!(tag.track_total(), Some(12));
		assert_eq!(tag.genre(), Some("Rock"));
		assert_eq!(tag.year(), Some(1984));
		assert_eq!(tag.comment(), Some("A comment"));
		assert_eq!(tag.additional().get("replaygain_track_gain"), Some("-6.2 dB"));
		assert_eq!(tag.additional().get("TENC"), Some("Encoder"));
		assert_eq!(tag.additional().len(), 2);

		assert_eq!(tag.pictures().len(), 1);
		let picture = tag.pictures().get(0).unwrap();
		assert_eq!(picture.pic_type(), PictureType::CoverFront);
		assert_eq!(picture.mime_type(), Some(&MimeType::Png));
		assert_eq!(picture.data(), b"\x89PNG");
	}

	#[test_log::test]
	fn unchanged_tag_is_identical() {
		let original = v3_tag();
		let decoded = Id3v2Codec.decode(&original, &decode_ctx()).unwrap();

		let encoded = Id3v2Codec
			.encode(decoded.tag(), Some(&decoded), &encode_ctx())
			.unwrap();
		assert_eq!(encoded, original);
	}

	#[test_log::test]
	fn edit_keeps_order_and_unknown_frames() {
		let original = v3_tag();
		let decoded = Id3v2Codec.decode(&original, &decode_ctx()).unwrap();

		let mut tag = decoded.tag().clone();
		tag.set_title("日本語");
		tag.set_track(4);
		tag.additional_mut().remove("TENC");
		tag.additional_mut().insert("ABCD", "efgh");

		let encoded = Id3v2Codec.encode(&tag, Some(&decoded), &encode_ctx()).unwrap();
		let reread = Id3v2Codec.decode(&encoded, &decode_ctx()).unwrap();

		assert_eq!(reread.tag().title(), Some("日本語"));
		// The original was zero padded
		assert_eq!(reread.tag().get(BaseField::TrackNumber), Some("04"));
		assert_eq!(reread.tag().additional().get("TENC"), None);
		assert_eq!(reread.tag().additional().get("ABCD"), Some("efgh"));
		assert_eq!(reread.tag().genre(), Some("Rock"));

		let NativeData::Id3v2(native) = &reread.native else {
			unreachable!()
		};
		let ids = native
			.slots
			.iter()
			.map(|slot| slot.raw.id.as_str())
			.collect::<Vec<_>>();
		assert_eq!(
			ids,
			[
				"TIT2", "TPE1", "PRIV", "TRCK", "TCON", "TYER", "COMM", "COMM", "TXXX", "APIC",
				"TXXX"
			]
		);

		// The title couldn't stay Latin-1
		assert_eq!(native.slots[0].raw.content[0], 1);
		// Untouched frames are byte for byte the same
		assert_eq!(native.slots[2].raw.content, b"owner\x00\x01\x02\x03");
		assert_eq!(native.slots[4].raw.content, b"\x00(17)");
	}

	#[test_log::test]
	fn new_tag_is_v4() {
		let mut tag = Tag::new();
		tag.set_title("Title");
		tag.set_year(2001);
		tag.set_track_total(9);
		tag.set_comment("Comment");
		tag.additional_mut().insert("TENC", "Encoder");
		tag.pictures_mut().push(Picture::new_unchecked(
			PictureType::CoverBack,
			Some(MimeType::Jpeg),
			None,
			vec![0xFF, 0xD8],
		));

		let encoded = Id3v2Codec.encode(&tag, None, &encode_ctx()).unwrap();
		assert_eq!(&encoded[..5], b"ID3\x04\x00");

		let decoded = Id3v2Codec.decode(&encoded, &decode_ctx()).unwrap();
		assert_eq!(decoded.tag(), &tag);

		let NativeData::Id3v2(native) = &decoded.native else {
			unreachable!()
		};
		let ids = native
			.slots
			.iter()
			.map(|slot| slot.raw.id.as_str())
			.collect::<Vec<_>>();
		assert_eq!(ids, ["TIT2", "TDRC", "TRCK", "COMM", "TENC", "APIC"]);
	}

	#[test_log::test]
	fn padding() {
		let mut encoded = Id3v2Codec
			.encode(&Tag::new(), None, &encode_ctx())
			.unwrap();
		assert_eq!(encoded.len(), 10);

		assert!(Id3v2Codec.pad(&mut encoded, 100).unwrap());
		assert_eq!(encoded.len(), 110);

		let header = Id3v2Header::parse(&encoded).unwrap();
		assert_eq!(header.size, 100);
		assert!(Id3v2Codec.decode(&encoded, &decode_ctx()).unwrap().tag().is_empty());
	}

	#[test_log::test]
	fn footer_tags_have_no_padding() {
		let flags = Id3v2TagFlags {
			footer: true,
			..Id3v2TagFlags::default()
		};
		let original = build_tag(Id3v2Version::V4, flags, &[("TIT2", b"\x03Title")]);

		let decoded = Id3v2Codec.decode(&original, &decode_ctx()).unwrap();
		assert_eq!(decoded.tag().title(), Some("Title"));

		let mut encoded = Id3v2Codec
			.encode(decoded.tag(), Some(&decoded), &encode_ctx())
			.unwrap();
		assert_eq!(encoded, original);
		assert!(!Id3v2Codec.pad(&mut encoded, 100).unwrap());
	}

	#[test_log::test]
	fn v2_tag() {
		let original = build_tag(
			Id3v2Version::V2,
			Id3v2TagFlags::default(),
			&[("TT2", b"\x00Title"), ("TP1", b"\x00Artist"), ("TRK", b"\x005")],
		);

		let decoded = Id3v2Codec.decode(&original, &decode_ctx()).unwrap();
		assert_eq!(decoded.tag().title(), Some("Title"));
		assert_eq!(decoded.tag().artist(), Some("Artist"));
		assert_eq!(decoded.tag().track(), Some(5));

		let mut tag = decoded.tag().clone();
		tag.set_album("Album");

		let encoded = Id3v2Codec.encode(&tag, Some(&decoded), &encode_ctx()).unwrap();
		assert_eq!(encoded[3], 2);

		let reread = Id3v2Codec.decode(&encoded, &decode_ctx()).unwrap();
		assert_eq!(reread.tag().album(), Some("Album"));
	}

	#[test_log::test]
	fn tag_unsynchronisation() {
		// A TIT2 frame holding "\x00\xFFA", unsynchronised after the frame was built
		let body = b"TIT2\x00\x00\x00\x03\x00\x00\x00\xFF\x00A";
		let header = Id3v2Header {
			version: Id3v2Version::V3,
			revision: 0,
			flags: Id3v2TagFlags::default(),
			size: body.len() as u32,
		};

		let mut original = header.as_bytes(false).unwrap().to_vec();
		original[5] |= 0x80;
		original.extend_from_slice(body);

		let decoded = Id3v2Codec.decode(&original, &decode_ctx()).unwrap();
		assert_eq!(decoded.tag().title(), Some("\u{FF}A"));

		// Written without unsynchronisation
		let encoded = Id3v2Codec
			.encode(decoded.tag(), Some(&decoded), &encode_ctx())
			.unwrap();
		assert_eq!(encoded[5], 0);
		assert_eq!(&encoded[10..], b"TIT2\x00\x00\x00\x03\x00\x00\x00\xFFA");
	}

	#[test_log::test]
	fn extended_header() {
		let mut body = vec![0, 0, 0, 6, 0, 0, 0, 0, 0, 0];
		write_frame(
			&mut body,
			Id3v2Version::V3,
			"TIT2",
			FrameFlags::default(),
			b"\x00Title",
		)
		.unwrap();

		let header = Id3v2Header {
			version: Id3v2Version::V3,
			revision: 0,
			flags: Id3v2TagFlags {
				extended_header: true,
				..Id3v2TagFlags::default()
			},
			size: body.len() as u32,
		};

		let mut original = header.as_bytes(false).unwrap().to_vec();
		original[5] |= 0x40;
		original.extend(body);

		let decoded = Id3v2Codec.decode(&original, &decode_ctx()).unwrap();
		assert_eq!(decoded.tag().title(), Some("Title"));

		let encoded = Id3v2Codec
			.encode(decoded.tag(), Some(&decoded), &encode_ctx())
			.unwrap();
		assert_eq!(encoded[5], 0);
		assert_eq!(encoded.len(), original.len() - 10);
	}

	#[test_log::test]
	fn undecodable_frames() {
		let original = build_tag(
			Id3v2Version::V3,
			Id3v2TagFlags::default(),
			&[("TIT2", b"\x09Bad"), ("TPE1", b"\x00Artist")],
		);

		let strict = DecodeContext::new(
			FileType::Mpeg,
			ParseOptions::new().parsing_mode(ParsingMode::Strict),
		);
		assert!(Id3v2Codec.decode(&original, &strict).is_err());

		let decoded = Id3v2Codec.decode(&original, &decode_ctx()).unwrap();
		assert_eq!(decoded.tag().title(), None);
		assert_eq!(decoded.tag().artist(), Some("Artist"));

		// The bad frame is kept, the title lands after it
		let mut tag = decoded.tag().clone();
		tag.set_title("Title");
		let encoded = Id3v2Codec.encode(&tag, Some(&decoded), &encode_ctx()).unwrap();
		assert!(
			encoded
				.windows(b"TIT2\x00\x00\x00\x04\x00\x00\x09Bad".len())
				.any(|w| w == b"TIT2\x00\x00\x00\x04\x00\x00\x09Bad")
		);
	}

	#[test_log::test]
	fn truncated_tag() {
		let mut original = v3_tag();
		original.truncate(original.len() - 5);

		assert!(Id3v2Codec.decode(&original, &decode_ctx()).is_err());
	}

	#[test_log::test]
	fn v2_picture_format() {
		let original = build_tag(Id3v2Version::V2, Id3v2TagFlags::default(), &[]);
		let decoded = Id3v2Codec.decode(&original, &decode_ctx()).unwrap();

		let mut tag = Tag::new();
		tag.pictures_mut().push(Picture::new_unchecked(
			PictureType::Other,
			Some(MimeType::Unknown(String::from("image/webp"))),
			None,
			vec![1],
		));

		let err = Id3v2Codec
			.encode(&tag, Some(&decoded), &encode_ctx())
			.unwrap_err();
		assert_eq!(err.category(), crate::error::ErrorCategory::Value);
	}
}
