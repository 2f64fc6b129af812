use crate::error::Result;
use crate::macros::{decode_err, err};

use std::ops::Range;

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};

pub(crate) const BLOCK_ID_STREAMINFO: u8 = 0;
pub(crate) const BLOCK_ID_PADDING: u8 = 1;
pub(crate) const BLOCK_ID_VORBIS_COMMENTS: u8 = 4;
pub(crate) const BLOCK_ID_PICTURE: u8 = 6;

pub(crate) const BLOCK_HEADER_SIZE: usize = 4;
pub(crate) const MAX_BLOCK_SIZE: usize = 0xFF_FFFF;

/// A metadata block, as found in the original file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
	pub(crate) ty: u8,
	pub(crate) last: bool,
	pub(crate) range: Range<usize>,
}

impl Block {
	/// The block type, `0` for `STREAMINFO`, `4` for `VORBIS_COMMENT`, etc.
	pub fn ty(&self) -> u8 {
		self.ty
	}

	/// Whether the block was flagged as the final metadata block
	pub fn is_last(&self) -> bool {
		self.last
	}

	/// The location of the entire block in the file, including its 4 byte header
	pub fn range(&self) -> Range<usize> {
		self.range.clone()
	}

	/// Read the block header at `offset`
	pub(crate) fn read(data: &[u8], offset: usize) -> Result<Self> {
		let Some(header) = data.get(offset..offset + BLOCK_HEADER_SIZE) else {
			decode_err!(@BAIL "FLAC metadata block header is truncated");
		};

		let byte = header[0];
		let last = (byte & 0x80) != 0;
		let ty = byte & 0x7F;

		let size = BigEndian::read_u24(&header[1..]) as usize;
		log::trace!("Reading FLAC block, type: {ty}, size: {size}");

		let end = offset + BLOCK_HEADER_SIZE + size;
		if end > data.len() {
			err!(SizeMismatch);
		}

		Ok(Self {
			ty,
			last,
			range: offset..end,
		})
	}

	/// The block content, without its header
	pub(crate) fn content<'a>(&self, data: &'a [u8]) -> &'a [u8] {
		&data[self.range.start + BLOCK_HEADER_SIZE..self.range.end]
	}
}

/// A block about to be written
///
/// Blocks copied from the original file keep borrowing its bytes.
#[derive(Debug)]
pub(crate) struct OutputBlock<'a> {
	pub(crate) ty: u8,
	pub(crate) content: std::borrow::Cow<'a, [u8]>,
}

impl<'a> OutputBlock<'a> {
	pub(crate) fn borrowed(ty: u8, content: &'a [u8]) -> Self {
		Self {
			ty,
			content: content.into(),
		}
	}

	pub(crate) fn owned(ty: u8, content: Vec<u8>) -> Self {
		Self {
			ty,
			content: content.into(),
		}
	}

	pub(crate) fn padding(size: usize) -> Self {
		Self::owned(BLOCK_ID_PADDING, vec![0; size])
	}

	pub(crate) fn encoded_len(&self) -> usize {
		BLOCK_HEADER_SIZE + self.content.len()
	}

	pub(crate) fn write_to(&self, out: &mut Vec<u8>, last: bool) -> Result<()> {
		if self.content.len() > MAX_BLOCK_SIZE {
			err!(TooMuchData);
		}

		let mut byte = self.ty & 0x7F;
		if last {
			byte |= 0x80;
		}

		out.write_u8(byte)?;
		out.write_u24::<BigEndian>(self.content.len() as u32)?;
		out.extend_from_slice(&self.content);

		log::trace!(
			"Wrote a block (ty: {}, size: {})",
			self.ty,
			self.content.len()
		);

		Ok(())
	}
}

/// Write every block, marking the final one as last
pub(crate) fn write_blocks(blocks: &[OutputBlock<'_>], out: &mut Vec<u8>) -> Result<()> {
	let count = blocks.len();
	for (i, block) in blocks.iter().enumerate() {
		block.write_to(out, i + 1 == count)?;
	}

	Ok(())
}
