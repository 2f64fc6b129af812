//! The interface shared by every tag format
//!
//! Each format is implemented as a [`TagCodec`]. A codec turns the bytes of a tag region into a
//! [`DecodedTag`], and a [`Tag`] (plus the tag it was decoded from, if any) back into bytes.
//!
//! The codecs are stateless, see [`registry`](crate::registry) for how to get one.

use crate::ape::ApeNative;
use crate::config::{ParseOptions, WriteOptions};
use crate::error::Result;
use crate::file::FileType;
use crate::id3::v2::Id3v2Native;
use crate::tag::{BaseField, Tag, TagFormat};
use crate::vorbis::VorbisNative;

/// Context for [`TagCodec::decode`]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DecodeContext {
	pub(crate) file_type: FileType,
	pub(crate) parse_options: ParseOptions,
}

impl DecodeContext {
	/// Create a new `DecodeContext` for a tag found in a `file_type` file
	pub fn new(file_type: FileType, parse_options: ParseOptions) -> Self {
		Self {
			file_type,
			parse_options,
		}
	}
}

/// Context for [`TagCodec::encode`]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EncodeContext {
	pub(crate) file_type: FileType,
	pub(crate) write_options: WriteOptions,
}

impl EncodeContext {
	/// Create a new `EncodeContext` for a tag written to a `file_type` file
	pub fn new(file_type: FileType, write_options: WriteOptions) -> Self {
		Self {
			file_type,
			write_options,
		}
	}
}

/// The result of [`TagCodec::decode`]
///
/// This holds the format-agnostic [`Tag`], as well as everything about the original tag that the
/// field model can't express: its version, flags, item order, and any items that have no mapping.
/// Passing it back to [`TagCodec::encode`] is what allows unchanged content to be written back
/// byte for byte.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedTag {
	pub(crate) tag: Tag,
	pub(crate) native: NativeData,
}

impl DecodedTag {
	/// The decoded fields
	pub fn tag(&self) -> &Tag {
		&self.tag
	}

	/// The format the tag was decoded from
	pub fn format(&self) -> TagFormat {
		match self.native {
			NativeData::Id3v1 => TagFormat::Id3v1,
			NativeData::Id3v2(_) => TagFormat::Id3v2,
			NativeData::Ape(_) => TagFormat::Ape,
			NativeData::Vorbis(_) => TagFormat::VorbisComments,
		}
	}
}

/// Format specific state kept between decoding and encoding
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum NativeData {
	Id3v1,
	Id3v2(Id3v2Native),
	Ape(ApeNative),
	Vorbis(VorbisNative),
}

/// A tag format
pub trait TagCodec: Sync {
	/// The format handled by this codec
	fn format(&self) -> TagFormat;

	/// The default authority of the format, lower is more authoritative
	///
	/// This orders [`TagPriority::default`](crate::config::TagPriority::default).
	fn default_priority(&self) -> u8;

	/// Whether the format can store `field`
	fn supports_field(&self, _field: BaseField) -> bool {
		true
	}

	/// Whether the format can store [`AdditionalFields`](crate::tag::AdditionalFields)
	fn supports_additional_fields(&self) -> bool;

	/// Whether the format can store pictures in `file_type` files
	fn supports_pictures(&self, file_type: FileType) -> bool;

	/// Decode the bytes of a tag region
	///
	/// # Errors
	///
	/// The bytes are not a valid tag of this format. This includes bad magic, a truncated header,
	/// or sizes that don't fit in `data`.
	fn decode(&self, data: &[u8], ctx: &DecodeContext) -> Result<DecodedTag>;

	/// Encode a tag, without any padding
	///
	/// `prior` is the tag this one was derived from. When given, the original version, flags, item
	/// order, and unmapped items are carried over.
	///
	/// # Errors
	///
	/// A value can't be represented in the format, see [`ValueError`](crate::error::ValueError).
	fn encode(&self, tag: &Tag, prior: Option<&DecodedTag>, ctx: &EncodeContext)
	-> Result<Vec<u8>>;

	/// Append `padding` bytes of padding to a tag produced by [`TagCodec::encode`]
	///
	/// Returns `false` if the format, or this particular tag, can't hold padding.
	///
	/// # Errors
	///
	/// The padded tag would exceed the maximum size of the format.
	fn pad(&self, _encoded: &mut Vec<u8>, _padding: u32) -> Result<bool> {
		Ok(false)
	}
}
