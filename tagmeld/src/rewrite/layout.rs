use crate::codec::{DecodeContext, DecodedTag};
use crate::config::{MergeOptions, ParseOptions};
use crate::error::{Result, TagmeldError};
use crate::file::FileType;
use crate::flac::{Block, FlacLayout};
use crate::id3::{find_id3v1, find_id3v2, find_lyrics3v2};
use crate::ogg::OggLayout;
use crate::tag::{Tag, TagFormat};

use std::ops::Range;

/// Where a tag was found in a file, and what it decoded to
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagPresence {
	pub(crate) format: TagFormat,
	pub(crate) region: Range<usize>,
	pub(crate) decoded: Option<DecodedTag>,
}

impl TagPresence {
	/// The format of the tag
	pub fn format(&self) -> TagFormat {
		self.format
	}

	/// The offset of the tag in the file
	///
	/// For FLAC Vorbis comments, this is the first block of the tag. For OGG streams, this is
	/// the first header page after the identification header.
	pub fn offset(&self) -> usize {
		self.region.start
	}

	/// The size of the tag region, in bytes
	pub fn len(&self) -> usize {
		self.region.len()
	}

	/// The decoded tag
	///
	/// This is `None` if the tag failed to decode. Such a tag is still kept as-is when the file is
	/// saved, but it is not merged and doesn't receive edits.
	pub fn decoded(&self) -> Option<&DecodedTag> {
		self.decoded.as_ref()
	}

	/// The fields of the decoded tag
	pub fn tag(&self) -> Option<&Tag> {
		self.decoded.as_ref().map(DecodedTag::tag)
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Container {
	Mpeg {
		/// Kept as-is, between the audio (or APE tag) and the ID3v1 tag
		lyrics3v2: Option<Range<usize>>,
	},
	Flac(FlacLayout),
	Ogg(OggLayout),
}

/// Every tag found in a file, and where the audio sits between them
///
/// A layout is created when a file is read, and describes the bytes it was read from. It is
/// needed to save the file, see [`rewrite`](super::rewrite).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagLayout {
	pub(crate) file_type: FileType,
	pub(crate) file_len: usize,
	pub(crate) audio: Range<usize>,
	/// Present tags, in file order
	pub(crate) presences: Vec<TagPresence>,
	pub(crate) container: Container,
}

impl TagLayout {
	/// The type of file the layout describes
	pub fn file_type(&self) -> FileType {
		self.file_type
	}

	/// The length of the file the layout was read from
	pub fn file_len(&self) -> usize {
		self.file_len
	}

	/// The location of the audio
	///
	/// In FLAC files, this starts after the last metadata block. In OGG files, this starts at
	/// the first page after the header packets.
	pub fn audio(&self) -> Range<usize> {
		self.audio.clone()
	}

	/// Every tag present in the file, in file order
	pub fn presences(&self) -> impl Iterator<Item = &TagPresence> {
		self.presences.iter()
	}

	/// Get the tag of `format`, if present
	pub fn presence(&self, format: TagFormat) -> Option<&TagPresence> {
		self.presences
			.iter()
			.find(|presence| presence.format == format)
	}

	/// Whether a tag of `format` is present, including tags that failed to decode
	pub fn contains(&self, format: TagFormat) -> bool {
		self.presence(format).is_some()
	}

	/// The original metadata blocks of a FLAC file
	pub fn flac_blocks(&self) -> Option<&[Block]> {
		match &self.container {
			Container::Flac(flac) => Some(&flac.blocks),
			Container::Mpeg { .. } | Container::Ogg(_) => None,
		}
	}

	/// Every successfully decoded tag
	pub fn decoded_tags(&self) -> Vec<(TagFormat, &Tag)> {
		self.presences
			.iter()
			.filter_map(|presence| presence.tag().map(|tag| (presence.format, tag)))
			.collect()
	}

	/// Merge the decoded tags, see [`resolve`](crate::resolve::resolve)
	pub fn resolve(&self, options: &MergeOptions) -> Tag {
		crate::resolve::resolve(&self.decoded_tags(), options)
	}

	/// Locate and decode every tag in `data`
	///
	/// A tag that fails to decode doesn't fail the scan. It is recorded as present but undecoded,
	/// and its error is returned alongside the layout.
	///
	/// # Errors
	///
	/// The container itself is invalid, such as a FLAC stream without its `fLaC` marker.
	/// An ID3v2 header that can't be trusted, for example one claiming more bytes than the file
	/// holds, is only recorded as an error, and its bytes are kept as audio.
	pub(crate) fn scan(
		data: &[u8],
		file_type: FileType,
		parse_options: ParseOptions,
	) -> Result<(Self, Vec<(TagFormat, TagmeldError)>)> {
		let ctx = DecodeContext::new(file_type, parse_options);
		let mut errors = Vec::new();
		let mut presences = Vec::new();

		// OGG streams can't hold ID3v2
		let id3v2 = if file_type.supports_format(TagFormat::Id3v2) {
			match find_id3v2(data, 0) {
				Ok(region) => region,
				Err(e) => {
					log::warn!("Invalid ID3v2 tag, treating it as audio: {e}");
					errors.push((TagFormat::Id3v2, e));
					None
				},
			}
		} else {
			None
		};
		let stream_start = id3v2.as_ref().map_or(0, |region| region.end);
		if let Some(region) = id3v2 {
			presences.push(decode_region(data, TagFormat::Id3v2, region, &ctx, &mut errors));
		}

		let (audio, container) = match file_type {
			FileType::Mpeg => {
				let mut end = data.len();

				let id3v1 = find_id3v1(data, end).filter(|region| region.start >= stream_start);
				if let Some(region) = &id3v1 {
					end = region.start;
				}

				let lyrics3v2 = match find_lyrics3v2(data, end) {
					Ok(Some(region)) if region.start >= stream_start => Some(region),
					Ok(_) => None,
					Err(e) => {
						log::warn!("Invalid Lyrics3v2 tag, treating it as audio: {e}");
						None
					},
				};
				if let Some(region) = &lyrics3v2 {
					end = region.start;
				}

				let ape = match crate::ape::header::find_ape(data, end) {
					Ok(Some(region)) if region.start >= stream_start => Some(region),
					Ok(_) => None,
					Err(e) => {
						log::warn!("Invalid APE tag, treating it as audio: {e}");
						errors.push((TagFormat::Ape, e));
						None
					},
				};

				if let Some(region) = ape {
					end = region.start;
					presences.push(decode_region(data, TagFormat::Ape, region, &ctx, &mut errors));
				}

				if let Some(region) = id3v1 {
					presences.push(decode_region(
						data,
						TagFormat::Id3v1,
						region,
						&ctx,
						&mut errors,
					));
				}

				(stream_start..end, Container::Mpeg { lyrics3v2 })
			},
			FileType::Flac => {
				let mut flac = FlacLayout::read(data, stream_start)?;

				match flac.decode_tag(data, &ctx) {
					Ok(Some((decoded, region))) => presences.push(TagPresence {
						format: TagFormat::VorbisComments,
						region,
						decoded: Some(decoded),
					}),
					Ok(None) => {},
					Err(e) => {
						log::warn!("Failed to decode the FLAC Vorbis comments: {e}");
						errors.push((TagFormat::VorbisComments, e));

						if let Some(block) = flac.tag_blocks().next() {
							presences.push(TagPresence {
								format: TagFormat::VorbisComments,
								region: block.range(),
								decoded: None,
							});
						}
					},
				}

				(flac.audio_offset()..data.len(), Container::Flac(flac))
			},
			FileType::Ogg => {
				let ogg = OggLayout::read(data)?;
				let region = ogg.comment_pages.clone();

				let decoded = match ogg.decode_tag(&ctx) {
					Ok(decoded) => Some(decoded),
					Err(e) => {
						log::warn!("Failed to decode the OGG Vorbis comments: {e}");
						errors.push((TagFormat::VorbisComments, e));
						None
					},
				};

				presences.push(TagPresence {
					format: TagFormat::VorbisComments,
					region,
					decoded,
				});

				(ogg.audio_offset()..data.len(), Container::Ogg(ogg))
			},
		};

		log::debug!(
			"Found {} tag(s), audio at {}..{}",
			presences.len(),
			audio.start,
			audio.end
		);

		let layout = Self {
			file_type,
			file_len: data.len(),
			audio,
			presences,
			container,
		};

		Ok((layout, errors))
	}
}

fn decode_region(
	data: &[u8],
	format: TagFormat,
	region: Range<usize>,
	ctx: &DecodeContext,
	errors: &mut Vec<(TagFormat, TagmeldError)>,
) -> TagPresence {
	log::debug!("Decoding {format:?} tag at {}..{}", region.start, region.end);

	let decoded = match crate::registry::codec(format).decode(&data[region.clone()], ctx) {
		Ok(decoded) => Some(decoded),
		Err(e) => {
			log::warn!("Failed to decode {format:?} tag, it will be kept as-is: {e}");
			errors.push((format, e));
			None
		},
	};

	TagPresence {
		format,
		region,
		decoded,
	}
}
