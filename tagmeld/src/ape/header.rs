use super::constants::{APE_HEADER_SIZE, APE_PREAMBLE, APE_V1, APE_V2};
use crate::config::ParsingMode;
use crate::error::Result;
use crate::macros::{decode_err, err};

use std::ops::Range;

use byteorder::{ByteOrder, LittleEndian};

// Bit 31 set: tag contains a header
pub(crate) const FLAG_HAS_HEADER: u32 = 1 << 31;
// Bit 29 set: this is the header
pub(crate) const FLAG_IS_HEADER: u32 = 1 << 29;
// Bit 0 set: tag is read only
pub(crate) const FLAG_READ_ONLY: u32 = 1;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct ApeHeader {
	pub(crate) version: u32,
	/// The size of the items and the footer, **NOT** including the header
	pub(crate) size: u32,
	pub(crate) item_count: u32,
	pub(crate) flags: u32,
}

impl ApeHeader {
	pub(crate) fn parse(bytes: &[u8], parse_mode: ParsingMode) -> Result<Self> {
		let Some(bytes) = bytes.get(..APE_HEADER_SIZE) else {
			err!(SizeMismatch);
		};

		if &bytes[..8] != APE_PREAMBLE {
			err!(FakeTag);
		}

		let version = LittleEndian::read_u32(&bytes[8..]);
		if version != APE_V1 && version != APE_V2 {
			if parse_mode == ParsingMode::Strict {
				decode_err!(@BAIL Ape, "APE tag has an unknown version");
			}

			log::warn!("APE tag has an unknown version ({version}), reading it as APEv2");
		}

		let size = LittleEndian::read_u32(&bytes[12..]);
		if (size as usize) < APE_HEADER_SIZE {
			// If the size is < 32, something went wrong during encoding
			// The size includes the footer and all items
			decode_err!(@BAIL Ape, "APE tag has an invalid size (< 32)");
		}

		Ok(Self {
			version,
			size,
			item_count: LittleEndian::read_u32(&bytes[16..]),
			flags: LittleEndian::read_u32(&bytes[20..]),
		})
	}

	pub(crate) fn has_header(&self) -> bool {
		// Version 1 doesn't include a header
		self.version != APE_V1 && self.flags & FLAG_HAS_HEADER == FLAG_HAS_HEADER
	}

	/// The size of the entire tag, including the header
	pub(crate) fn full_tag_size(&self) -> usize {
		self.size as usize + if self.has_header() { APE_HEADER_SIZE } else { 0 }
	}

	pub(crate) fn as_bytes(&self, header: bool) -> [u8; APE_HEADER_SIZE] {
		let mut bytes = [0; APE_HEADER_SIZE];

		bytes[..8].copy_from_slice(APE_PREAMBLE);
		LittleEndian::write_u32(&mut bytes[8..], self.version);
		LittleEndian::write_u32(&mut bytes[12..], self.size);
		LittleEndian::write_u32(&mut bytes[16..], self.item_count);

		let mut flags = self.flags & !FLAG_IS_HEADER;
		if header {
			flags |= FLAG_IS_HEADER;
		}
		LittleEndian::write_u32(&mut bytes[20..], flags);

		// The header/footer must end in 8 bytes of zeros
		bytes
	}
}

/// Find the APE tag ending at `end`, by its footer
pub(crate) fn find_ape(data: &[u8], end: usize) -> Result<Option<Range<usize>>> {
	log::debug!("Searching for an APE tag");

	let Some(footer_start) = end.checked_sub(APE_HEADER_SIZE) else {
		return Ok(None);
	};

	if !data[footer_start..].starts_with(APE_PREAMBLE) {
		return Ok(None);
	}

	let footer = ApeHeader::parse(&data[footer_start..end], ParsingMode::Relaxed)?;
	if footer.flags & FLAG_IS_HEADER == FLAG_IS_HEADER {
		log::warn!("Found an APE header where a footer was expected, ignoring it");
		return Ok(None);
	}

	let Some(start) = end.checked_sub(footer.full_tag_size()) else {
		decode_err!(@BAIL Ape, "APE tag has an invalid size (> file size)");
	};

	log::debug!("Found an APE tag ({} bytes)", end - start);
	Ok(Some(start..end))
}
