use super::header::Id3v2Version;
use super::synchsafe::{SynchsafeInteger, is_synchsafe, remove_unsynchronisation};
use crate::config::{ParseOptions, ParsingMode};
use crate::error::{Id3v2Error, Id3v2ErrorKind, Result};
use crate::macros::err;
use crate::util::take;

use byteorder::{BigEndian, ByteOrder};

/// Various flags to describe the content of an item
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[allow(clippy::struct_excessive_bools)]
pub struct FrameFlags {
	/// Preserve frame on tag edit
	pub tag_alter_preservation: bool,
	/// Preserve frame on file edit
	pub file_alter_preservation: bool,
	/// Item cannot be written to
	pub read_only: bool,
	/// The frame belongs in a group (a group identifier byte precedes the content)
	pub grouping_identity: bool,
	/// Frame is zlib compressed
	pub compression: bool,
	/// Frame is encrypted (a method symbol byte precedes the content)
	pub encryption: bool,
	/// Frame is unsynchronised (ID3v2.4 only)
	pub unsynchronisation: bool,
	/// Frame has a data length indicator (ID3v2.4 only)
	pub data_length_indicator: bool,
}

// The bit of every flag, in field order. ID3v2.3 has no unsynchronisation or data length flags.
const ID3V23_FLAG_BITS: [u16; 8] = [0x8000, 0x4000, 0x2000, 0x0020, 0x0080, 0x0040, 0, 0];
const ID3V24_FLAG_BITS: [u16; 8] = [0x4000, 0x2000, 0x1000, 0x0040, 0x0008, 0x0004, 0x0002, 0x0001];

impl FrameFlags {
	fn fields_mut(&mut self) -> [&mut bool; 8] {
		[
			&mut self.tag_alter_preservation,
			&mut self.file_alter_preservation,
			&mut self.read_only,
			&mut self.grouping_identity,
			&mut self.compression,
			&mut self.encryption,
			&mut self.unsynchronisation,
			&mut self.data_length_indicator,
		]
	}

	fn from_bits(flags: u16, bits: [u16; 8]) -> Self {
		let mut parsed = Self::default();
		for (field, bit) in parsed.fields_mut().into_iter().zip(bits) {
			*field = bit != 0 && flags & bit == bit;
		}

		parsed
	}

	fn to_bits(mut self, bits: [u16; 8]) -> u16 {
		self.fields_mut()
			.into_iter()
			.zip(bits)
			.filter(|(field, _)| **field)
			.fold(0, |flags, (_, bit)| flags | bit)
	}

	/// Parse the flags from an ID3v2.4 frame
	pub fn parse_id3v24(flags: u16) -> Self {
		Self::from_bits(flags, ID3V24_FLAG_BITS)
	}

	/// Parse the flags from an ID3v2.3 frame
	pub fn parse_id3v23(flags: u16) -> Self {
		Self::from_bits(flags, ID3V23_FLAG_BITS)
	}

	/// Get the ID3v2.4 byte representation of the flags
	pub fn as_id3v24_bytes(&self) -> u16 {
		self.to_bits(ID3V24_FLAG_BITS)
	}

	/// Get the ID3v2.3 byte representation of the flags
	///
	/// Unsynchronisation and data length indicators can't be represented, and are dropped.
	pub fn as_id3v23_bytes(&self) -> u16 {
		self.to_bits(ID3V23_FLAG_BITS)
	}

	/// The flags that survive when a frame's content is replaced
	///
	/// Everything describing the stored bytes (grouping, compression, encryption,
	/// unsynchronisation, data length) no longer applies to freshly encoded content.
	pub(crate) fn for_new_content(self) -> Self {
		FrameFlags {
			tag_alter_preservation: self.tag_alter_preservation,
			file_alter_preservation: self.file_alter_preservation,
			read_only: self.read_only,
			..FrameFlags::default()
		}
	}
}

/// A frame exactly as it was stored
///
/// `content` holds everything after the frame header, including any bytes added by the
/// frame flags, and is still unsynchronised/compressed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RawFrame {
	pub(crate) id: String,
	pub(crate) flags: FrameFlags,
	pub(crate) content: Vec<u8>,
}

pub(crate) fn frame_header_len(version: Id3v2Version) -> usize {
	match version {
		Id3v2Version::V2 => 6,
		Id3v2Version::V3 | Id3v2Version::V4 => 10,
	}
}

fn valid_frame_id(id: &[u8]) -> bool {
	id.iter().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

pub(crate) struct FrameList {
	pub(crate) frames: Vec<RawFrame>,
	/// The number of bytes following the last frame
	pub(crate) padding: usize,
}

/// Split the (already tag-level de-unsynchronised) body of a tag into frames
pub(crate) fn read_frames(
	mut body: &[u8],
	version: Id3v2Version,
	parse_mode: ParsingMode,
) -> Result<FrameList> {
	let header_len = frame_header_len(version);
	let id_len = if version == Id3v2Version::V2 { 3 } else { 4 };

	let mut frames = Vec::new();
	loop {
		// Assume we just started reading padding
		if body.len() < header_len || body[0] == 0 {
			break;
		}

		let header = &body[..header_len];
		let id_bytes = &header[..id_len];
		if !valid_frame_id(id_bytes) {
			if parse_mode == ParsingMode::Strict {
				return Err(Id3v2Error::new(Id3v2ErrorKind::BadFrameId(id_bytes.to_vec())).into());
			}

			log::warn!(
				"Encountered an invalid frame ID, treating the remaining {} bytes as padding",
				body.len()
			);
			break;
		}

		let (size, flags) = match version {
			Id3v2Version::V2 => (
				BigEndian::read_u24(&header[3..6]),
				FrameFlags::default(),
			),
			Id3v2Version::V3 => (
				BigEndian::read_u32(&header[4..8]),
				FrameFlags::parse_id3v23(BigEndian::read_u16(&header[8..])),
			),
			Id3v2Version::V4 => {
				let raw_size = [header[4], header[5], header[6], header[7]];
				let mut size = BigEndian::read_u32(&raw_size);

				// Some writers store plain integers in ID3v2.4 frames
				if is_synchsafe(raw_size) {
					size = size.unsynch();
				} else {
					log::warn!("Found a non-synchsafe frame size in an ID3v2.4 tag");
				}

				(size, FrameFlags::parse_id3v24(BigEndian::read_u16(&header[8..])))
			},
		};

		let id = String::from_utf8_lossy(id_bytes).into_owned();
		body = &body[header_len..];

		let Ok(content) = take(&mut body, size as usize) else {
			log::warn!("Frame `{id}` claims {size} bytes, only {} remain", body.len());
			return Err(Id3v2Error::new(Id3v2ErrorKind::BadFrameLength).into());
		};

		log::trace!("Found frame `{id}` ({size} bytes)");
		frames.push(RawFrame {
			id,
			flags,
			content: content.to_vec(),
		});
	}

	Ok(FrameList {
		frames,
		padding: body.len(),
	})
}

/// Get the real content of a frame, undoing any grouping, unsynchronisation, and compression
///
/// Returns `None` for frames whose content can't be interpreted (encrypted, or compressed
/// without support for decompression). These are kept as-is.
pub(crate) fn frame_content(
	frame: &RawFrame,
	version: Id3v2Version,
	tag_unsynchronised: bool,
	parse_options: ParseOptions,
) -> Result<Option<Vec<u8>>> {
	let flags = frame.flags;
	let mut content = frame.content.as_slice();

	if flags.encryption {
		log::debug!("Frame `{}` is encrypted, keeping it as-is", frame.id);
		return Ok(None);
	}

	match version {
		Id3v2Version::V2 => return Ok(Some(content.to_vec())),
		Id3v2Version::V3 => {
			// Decompressed size, followed by the group identifier
			if flags.compression {
				let _decompressed_size = take(&mut content, 4)?;
			}
			if flags.grouping_identity {
				let _group = take(&mut content, 1)?;
			}
		},
		Id3v2Version::V4 => {
			if flags.grouping_identity {
				let _group = take(&mut content, 1)?;
			}

			if flags.data_length_indicator {
				let _data_length = take(&mut content, 4)?;
			} else if flags.compression {
				if parse_options.parsing_mode == ParsingMode::Strict {
					return Err(Id3v2Error::new(Id3v2ErrorKind::MissingDataLengthIndicator).into());
				}

				log::warn!("Frame `{}` is compressed, but has no data length indicator", frame.id);
			}
		},
	}

	let content = if flags.unsynchronisation || (version == Id3v2Version::V4 && tag_unsynchronised)
	{
		remove_unsynchronisation(content)
	} else {
		content.to_vec()
	};

	if flags.compression {
		return decompress(&frame.id, content, parse_options);
	}

	Ok(Some(content))
}

#[cfg(feature = "id3v2_compression_support")]
fn decompress(id: &str, content: Vec<u8>, parse_options: ParseOptions) -> Result<Option<Vec<u8>>> {
	use std::io::Read as _;

	log::trace!("Decompressing frame `{id}`");

	let mut decompressed = Vec::new();
	flate2::read::ZlibDecoder::new(content.as_slice())
		.take(parse_options.allocation_limit as u64)
		.read_to_end(&mut decompressed)
		.map_err(|e| Id3v2Error::new(Id3v2ErrorKind::Decompression(e)))?;

	Ok(Some(decompressed))
}

#[cfg(not(feature = "id3v2_compression_support"))]
fn decompress(id: &str, _: Vec<u8>, _: ParseOptions) -> Result<Option<Vec<u8>>> {
	log::debug!("Frame `{id}` is compressed, keeping it as-is");
	Ok(None)
}

/// Write a frame header followed by `content`
pub(crate) fn write_frame(
	out: &mut Vec<u8>,
	version: Id3v2Version,
	id: &str,
	flags: FrameFlags,
	content: &[u8],
) -> Result<()> {
	let Ok(len) = u32::try_from(content.len()) else {
		err!(TooMuchData);
	};

	out.extend_from_slice(id.as_bytes());
	match version {
		Id3v2Version::V2 => {
			if len > 0xFF_FFFF {
				err!(TooMuchData);
			}

			out.extend_from_slice(&len.to_be_bytes()[1..]);
		},
		Id3v2Version::V3 => {
			out.extend_from_slice(&len.to_be_bytes());
			out.extend_from_slice(&flags.as_id3v23_bytes().to_be_bytes());
		},
		Id3v2Version::V4 => {
			out.extend_from_slice(&len.synch()?.to_be_bytes());
			out.extend_from_slice(&flags.as_id3v24_bytes().to_be_bytes());
		},
	}

	out.extend_from_slice(content);
	Ok(())
}

pub(crate) fn write_raw_frame(out: &mut Vec<u8>, version: Id3v2Version, frame: &RawFrame) -> Result<()> {
	write_frame(out, version, &frame.id, frame.flags, &frame.content)
}
