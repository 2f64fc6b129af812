//! FLAC specific items
//!
//! ## File notes
//!
//! A FLAC file may start with an ID3v2 tag, which is followed by the `fLaC` stream marker and
//! a list of metadata blocks. The first block is always `STREAMINFO`.
//!
//! The Vorbis comments of a FLAC file are spread over two kinds of blocks: the `VORBIS_COMMENT`
//! block holds the text, and every `PICTURE` block holds one picture. Together they form
//! the [`TagFormat::VorbisComments`](crate::tag::TagFormat::VorbisComments) tag of the file.
//! All other blocks (`STREAMINFO`, `SEEKTABLE`, `APPLICATION`, `CUESHEET`, and unknown types) are
//! kept in their original order.

pub(crate) mod block;

pub use block::Block;

use crate::codec::{DecodeContext, DecodedTag, NativeData};
use crate::config::{ParsingMode, WriteOptions};
use crate::error::Result;
use crate::macros::decode_err;
use crate::picture::{Picture, PictureInformation, PictureStore};
use crate::tag::{Tag, TagFormat};
use crate::vorbis::VorbisNative;
use block::{
	BLOCK_HEADER_SIZE, BLOCK_ID_PADDING, BLOCK_ID_PICTURE, BLOCK_ID_STREAMINFO,
	BLOCK_ID_VORBIS_COMMENTS, OutputBlock,
};

use std::ops::Range;

pub(crate) const STREAM_MARKER: &[u8; 4] = b"fLaC";

fn is_tag_block(ty: u8) -> bool {
	ty == BLOCK_ID_VORBIS_COMMENTS || ty == BLOCK_ID_PICTURE
}

/// A picture decoded from a `PICTURE` block
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct BlockPicture {
	/// Index into [`FlacLayout::blocks`]
	pub(crate) block: usize,
	pub(crate) information: PictureInformation,
}

/// The metadata of a FLAC stream
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FlacLayout {
	/// Offset of the `fLaC` marker
	pub(crate) marker: usize,
	pub(crate) blocks: Vec<Block>,
	/// One entry per picture of the Vorbis comments, in order
	pub(crate) pictures: Vec<BlockPicture>,
}

impl FlacLayout {
	/// Read the stream marker and block headers, starting at `marker`
	pub(crate) fn read(data: &[u8], marker: usize) -> Result<Self> {
		if data.get(marker..marker + STREAM_MARKER.len()) != Some(&STREAM_MARKER[..]) {
			decode_err!(@BAIL "File missing \"fLaC\" stream marker");
		}

		let mut offset = marker + STREAM_MARKER.len();
		let mut blocks = Vec::new();
		loop {
			let block = Block::read(data, offset)?;
			if blocks.is_empty() && block.ty != BLOCK_ID_STREAMINFO {
				decode_err!(@BAIL "FLAC file missing mandatory STREAMINFO block");
			}

			offset = block.range.end;

			let last = block.last;
			blocks.push(block);

			if last {
				break;
			}
		}

		log::debug!("Found {} FLAC metadata blocks", blocks.len());

		Ok(Self {
			marker,
			blocks,
			pictures: Vec::new(),
		})
	}

	/// The offset of the first audio frame
	pub(crate) fn audio_offset(&self) -> usize {
		self.blocks
			.last()
			.map_or(self.marker + STREAM_MARKER.len(), |block| block.range.end)
	}

	/// The blocks, starting with `STREAMINFO`
	fn metadata_range(&self) -> Range<usize> {
		self.marker + STREAM_MARKER.len()..self.audio_offset()
	}

	fn is_tag_picture(&self, index: usize) -> bool {
		self.pictures.iter().any(|picture| picture.block == index)
	}

	/// The blocks dropped by [`FlacLayout::strip`]
	pub(crate) fn tag_blocks(&self) -> impl Iterator<Item = &Block> {
		self.blocks.iter().filter(|block| is_tag_block(block.ty))
	}

	/// Decode the Vorbis comments of the stream, including its pictures
	///
	/// The returned range is the first block of the tag. On success, the decoded pictures are
	/// recorded in [`FlacLayout::pictures`].
	pub(crate) fn decode_tag(
		&mut self,
		data: &[u8],
		ctx: &DecodeContext,
	) -> Result<Option<(DecodedTag, Range<usize>)>> {
		let codec = crate::registry::codec(TagFormat::VorbisComments);
		let parse_options = ctx.parse_options;

		let mut decoded = None;
		let mut region = None;
		let mut pictures = Vec::new();
		let mut picture_store = PictureStore::new();

		for (index, block) in self.blocks.iter().enumerate() {
			match block.ty {
				BLOCK_ID_VORBIS_COMMENTS if decoded.is_none() => {
					decoded = Some(codec.decode(block.content(data), ctx)?);
					region.get_or_insert(block.range.clone());
				},
				BLOCK_ID_VORBIS_COMMENTS => {
					log::warn!("Found an additional VORBIS_COMMENT block, keeping it as-is");
				},
				BLOCK_ID_PICTURE if parse_options.read_cover_art => {
					let parsing_mode = parse_options.parsing_mode;
					match Picture::from_flac_bytes(
						block.content(data),
						false,
						parsing_mode,
						parse_options.allocation_limit,
					) {
						Ok((picture, information)) => {
							picture_store.push(picture);
							pictures.push(BlockPicture {
								block: index,
								information,
							});
							region.get_or_insert(block.range.clone());
						},
						Err(e) if parsing_mode == ParsingMode::Strict => return Err(e),
						Err(e) => {
							log::warn!("Unable to read FLAC picture block, keeping it as-is: {e}");
						},
					}
				},
				_ => {},
			}
		}

		let Some(region) = region else {
			return Ok(None);
		};

		// A stream with pictures, but no comment block
		let mut decoded = decoded.unwrap_or_else(|| DecodedTag {
			tag: Tag::new(),
			native: NativeData::Vorbis(VorbisNative {
				vendor: String::new(),
				slots: Vec::new(),
			}),
		});

		decoded.tag.pictures_mut().extend(picture_store);
		self.pictures = pictures;

		Ok(Some((decoded, region)))
	}

	/// Write the marker and metadata blocks with a new Vorbis comment block and pictures
	///
	/// * `comment` is the content of the new `VORBIS_COMMENT` block
	/// * `prior_pictures` are the pictures decoded from this stream, their blocks are reused as-is
	///   when a picture didn't change
	///
	/// All `PADDING` blocks are merged into one at the end. When padding is enabled and the new
	/// blocks are smaller, the padding is sized to keep the audio at its original offset.
	pub(crate) fn rebuild(
		&self,
		data: &[u8],
		comment: Vec<u8>,
		pictures: &PictureStore,
		prior_pictures: &PictureStore,
		write_options: &WriteOptions,
	) -> Result<Vec<u8>> {
		let mut picture_blocks = Vec::with_capacity(pictures.len());
		let mut reused = vec![false; self.pictures.len()];
		for picture in pictures.iter() {
			let original = prior_pictures
				.iter()
				.enumerate()
				.find(|(index, prior)| reused.get(*index) == Some(&false) && *prior == picture)
				.and_then(|(index, _)| self.pictures.get(index).map(|p| (index, p)));

			match original {
				Some((index, block_picture)) => {
					reused[index] = true;
					let block = &self.blocks[block_picture.block];
					picture_blocks.push(OutputBlock::borrowed(BLOCK_ID_PICTURE, block.content(data)));
				},
				None => picture_blocks.push(OutputBlock::owned(
					BLOCK_ID_PICTURE,
					picture.as_flac_bytes(PictureInformation::default()),
				)),
			}
		}

		let mut comment = Some(OutputBlock::owned(BLOCK_ID_VORBIS_COMMENTS, comment));
		let mut picture_blocks = Some(picture_blocks);
		let mut comment_position = None;

		let mut blocks = Vec::with_capacity(self.blocks.len() + pictures.len());
		for (index, block) in self.blocks.iter().enumerate() {
			match block.ty {
				BLOCK_ID_PADDING => {},
				BLOCK_ID_VORBIS_COMMENTS if comment_position.is_none() => {
					if let Some(comment) = comment.take() {
						comment_position = Some(blocks.len());
						blocks.push(comment);
					}
				},
				BLOCK_ID_PICTURE if self.is_tag_picture(index) => {
					if let Some(picture_blocks) = picture_blocks.take() {
						blocks.extend(picture_blocks);
					}
				},
				ty => blocks.push(OutputBlock::borrowed(ty, block.content(data))),
			}
		}

		// New blocks go right after STREAMINFO
		if let Some(comment) = comment.take() {
			comment_position = Some(1);
			blocks.insert(1, comment);
		}

		if let Some(picture_blocks) = picture_blocks.take() {
			let position = comment_position.map_or(1, |position| position + 1);
			for (offset, block) in picture_blocks.into_iter().enumerate() {
				blocks.insert(position + offset, block);
			}
		}

		let original_len = self.metadata_range().len();
		let new_len = blocks.iter().map(OutputBlock::encoded_len).sum::<usize>();

		if write_options.padding {
			if new_len + BLOCK_HEADER_SIZE <= original_len {
				log::debug!("Reusing FLAC padding, keeping the audio offset");
				blocks.push(OutputBlock::padding(
					original_len - new_len - BLOCK_HEADER_SIZE,
				));
			} else if new_len != original_len {
				if let Some(preferred_padding) = write_options.preferred_padding_bytes() {
					blocks.push(OutputBlock::padding(preferred_padding as usize));
				}
			}
		}

		let mut out = Vec::with_capacity(STREAM_MARKER.len() + new_len);
		out.extend_from_slice(STREAM_MARKER);
		block::write_blocks(&blocks, &mut out)?;

		Ok(out)
	}

	/// Write the marker and metadata blocks without the Vorbis comments
	///
	/// The comment block and every picture block are dropped, everything else is kept as-is.
	pub(crate) fn strip(&self, data: &[u8]) -> Result<Vec<u8>> {
		let blocks = self
			.blocks
			.iter()
			.filter(|block| !is_tag_block(block.ty))
			.map(|block| OutputBlock::borrowed(block.ty, block.content(data)))
			.collect::<Vec<_>>();

		let mut out = Vec::with_capacity(self.metadata_range().len() + STREAM_MARKER.len());
		out.extend_from_slice(STREAM_MARKER);
		block::write_blocks(&blocks, &mut out)?;

		Ok(out)
	}
}
