//! Lookup of the available [`TagCodec`]s
//!
//! # Examples
//!
//! ```rust
//! use tagmeld::registry;
//! use tagmeld::tag::TagFormat;
//!
//! let codec = registry::codec(TagFormat::Ape);
//! assert_eq!(codec.format(), TagFormat::Ape);
//! assert_eq!(registry::formats().count(), 4);
//! ```

use crate::ape::ApeCodec;
use crate::codec::TagCodec;
use crate::id3::v1::Id3v1Codec;
use crate::id3::v2::Id3v2Codec;
use crate::tag::TagFormat;
use crate::vorbis::VorbisCodec;

static ID3V2: Id3v2Codec = Id3v2Codec;
static APE: ApeCodec = ApeCodec;
static VORBIS_COMMENTS: VorbisCodec = VorbisCodec;
static ID3V1: Id3v1Codec = Id3v1Codec;

/// Get the codec for `format`
pub fn codec(format: TagFormat) -> &'static dyn TagCodec {
	match format {
		TagFormat::Id3v2 => &ID3V2,
		TagFormat::Ape => &APE,
		TagFormat::VorbisComments => &VORBIS_COMMENTS,
		TagFormat::Id3v1 => &ID3V1,
	}
}

/// Every registered codec, in [`TagFormat::ALL`] order
pub fn formats() -> impl Iterator<Item = &'static dyn TagCodec> {
	TagFormat::ALL.into_iter().map(codec)
}
