//! Vorbis comment specific items
//!
//! Vorbis comments are a list of `KEY=VALUE` pairs, with keys compared case insensitively. Keys
//! may repeat. Only the first comment for a key is decoded, the rest are written back untouched
//! unless the field they belong to is changed.
//!
//! In FLAC files pictures are stored in `PICTURE` blocks, which are handled by the container.
//! `METADATA_BLOCK_PICTURE` comments are only decoded outside of FLAC, such as in OGG streams.

mod mappings;
mod read;
mod write;

use crate::codec::{DecodeContext, DecodedTag, EncodeContext, TagCodec};
use crate::error::Result;
use crate::file::FileType;
use crate::tag::{BaseField, Tag, TagFormat};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum CommentKey {
	Field(BaseField),
	Additional(String),
	Picture(usize),
	Opaque,
}

impl CommentKey {
	fn matches(&self, other: &CommentKey) -> bool {
		match (self, other) {
			(CommentKey::Field(a), CommentKey::Field(b)) => a == b,
			(CommentKey::Additional(a), CommentKey::Additional(b)) => a.eq_ignore_ascii_case(b),
			_ => false,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct CommentSlot {
	pub(crate) key: CommentKey,
	/// The comment exactly as it was stored
	pub(crate) raw: Vec<u8>,
	pub(crate) value: String,
	/// Whether this is the first comment with its key
	pub(crate) primary: bool,
	/// Whether this is a "current/total" `TRACKNUMBER` or `DISCNUMBER`
	pub(crate) paired: bool,
}

impl CommentSlot {
	fn new(key: CommentKey, raw: Vec<u8>, value: String) -> Self {
		Self {
			key,
			raw,
			value,
			primary: true,
			paired: false,
		}
	}

	fn opaque(raw: Vec<u8>) -> Self {
		Self::new(CommentKey::Opaque, raw, String::new())
	}

	/// The key, in its original spelling
	fn raw_key(&self) -> String {
		let end = self
			.raw
			.iter()
			.position(|b| *b == b'=')
			.unwrap_or(self.raw.len());
		String::from_utf8_lossy(&self.raw[..end]).into_owned()
	}
}

/// Everything about decoded Vorbis comments that the field model doesn't hold
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct VorbisNative {
	pub(crate) vendor: String,
	/// Every comment, in its original order
	pub(crate) slots: Vec<CommentSlot>,
}

/// The Vorbis comments [`TagCodec`]
///
/// This handles the comment block itself, without any framing. In FLAC that is the content of
/// a `VORBIS_COMMENT` block, and in OGG the comment packet after its signature.
#[derive(Copy, Clone, Debug, Default)]
pub struct VorbisCodec;

impl TagCodec for VorbisCodec {
	fn format(&self) -> TagFormat {
		TagFormat::VorbisComments
	}

	fn default_priority(&self) -> u8 {
		3
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
