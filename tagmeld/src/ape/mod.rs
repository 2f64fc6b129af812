//! APE specific items
//!
//! ## File notes
//!
//! APE tags are found at the end of MPEG files, before any ID3v1 tag. Both APEv1 and APEv2 are
//! read. A tag is written back in its original version, unless it has to hold pictures, which
//! requires APEv2.
//!
//! Item keys are case insensitive, and pictures are stored as binary items keyed by their type
//! (see [`PictureType::as_ape_key`](crate::picture::PictureType::as_ape_key)). As such, only one
//! picture of each type can be stored.

mod constants;
pub(crate) mod header;
mod mappings;
mod read;
mod write;

use crate::codec::{DecodeContext, DecodedTag, EncodeContext, TagCodec};
use crate::error::Result;
use crate::file::FileType;
use crate::tag::{BaseField, Tag, TagFormat};

use header::FLAG_READ_ONLY;

/// An item exactly as it was stored
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ApeItem {
	pub(crate) key: Vec<u8>,
	pub(crate) flags: u32,
	pub(crate) value: Vec<u8>,
}

impl ApeItem {
	pub(crate) fn item_type(&self) -> u32 {
		(self.flags >> 1) & 3
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApeSlotKey {
	Field(BaseField),
	Additional(String),
	/// The index of the picture, and the item key it was read from
	Picture(usize, String),
	Opaque,
}

impl ApeSlotKey {
	fn matches(&self, other: &ApeSlotKey) -> bool {
		match (self, other) {
			(ApeSlotKey::Field(a), ApeSlotKey::Field(b)) => a == b,
			(ApeSlotKey::Additional(a), ApeSlotKey::Additional(b)) => a.eq_ignore_ascii_case(b),
			_ => false,
		}
	}

	fn is_picture_key(&self, key: &str) -> bool {
		matches!(self, ApeSlotKey::Picture(_, k) if k.eq_ignore_ascii_case(key))
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ApeSlot {
	pub(crate) key: ApeSlotKey,
	pub(crate) item: ApeItem,
	/// The decoded text value, empty for pictures and opaque items
	pub(crate) value: String,
}

impl ApeSlot {
	fn opaque(item: ApeItem) -> Self {
		Self {
			key: ApeSlotKey::Opaque,
			item,
			value: String::new(),
		}
	}
}

/// Everything about a decoded APE tag that the field model doesn't hold
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ApeNative {
	pub(crate) version: u32,
	/// The footer flags
	pub(crate) flags: u32,
	/// Every item, in its original order
	pub(crate) slots: Vec<ApeSlot>,
}

impl ApeNative {
	/// Whether the tag as a whole is marked read only
	pub(crate) fn read_only(&self) -> bool {
		self.flags & FLAG_READ_ONLY == FLAG_READ_ONLY
	}
}

/// The APE [`TagCodec`]
#[derive(Copy, Clone, Debug, Default)]
pub struct ApeCodec;

impl TagCodec for ApeCodec {
	fn format(&self) -> TagFormat {
		TagFormat::Ape
	}

	fn default_priority(&self) -> u8 {
		2
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

	fn encode(&self, tag: &Tag, prior: Option<&DecodedTag>, ctx: &EncodeContext) -> Result<Vec<u8>> {
		write::encode(tag, prior, ctx)
	}
}
