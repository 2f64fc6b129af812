//! OGG specific items
//!
//! ## File notes
//!
//! The Vorbis comments of an OGG stream are its second packet. Vorbis streams prefix the packet
//! with `\x03vorbis` and end it with a framing bit, Opus streams prefix it with `OpusTags`, and
//! Speex streams store the comments bare. Pictures are `METADATA_BLOCK_PICTURE` comments.
//!
//! Saving only repaginates the header packets. Audio pages are copied as-is, unless the number
//! of header pages changed, in which case their sequence numbers and checksums are updated.

use crate::codec::{DecodeContext, DecodedTag};
use crate::config::WriteOptions;
use crate::error::Result;
use crate::macros::decode_err;
use crate::tag::TagFormat;

use std::io::Cursor;
use std::ops::Range;

use byteorder::{ByteOrder, LittleEndian};
use ogg_pager::{CONTAINS_FIRST_PAGE_OF_BITSTREAM, Packets, Page, PageHeader};

pub(crate) const CAPTURE_PATTERN: &[u8; 4] = b"OggS";

// https://xiph.org/vorbis/doc/Vorbis_I_spec.html#x1-620004.2.1
const VORBIS_IDENT_HEAD: &[u8] = b"\x01vorbis";
const VORBIS_COMMENT_HEAD: &[u8] = b"\x03vorbis";

// https://datatracker.ietf.org/doc/html/rfc7845#section-5
const OPUSHEAD: &[u8] = b"OpusHead";
const OPUSTAGS: &[u8] = b"OpusTags";

// https://www.speex.org/docs/manual/speex-manual/node8.html
const SPEEXHEADER: &[u8] = b"Speex   ";

/// The codec of an OGG stream
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum OggFormat {
	Vorbis,
	Opus,
	Speex,
}

impl OggFormat {
	fn from_ident_packet(packet: &[u8]) -> Option<Self> {
		if packet.starts_with(VORBIS_IDENT_HEAD) {
			Some(Self::Vorbis)
		} else if packet.starts_with(OPUSHEAD) {
			Some(Self::Opus)
		} else if packet.starts_with(SPEEXHEADER) {
			Some(Self::Speex)
		} else {
			None
		}
	}

	fn comment_signature(self) -> &'static [u8] {
		match self {
			Self::Vorbis => VORBIS_COMMENT_HEAD,
			Self::Opus => OPUSTAGS,
			Self::Speex => &[],
		}
	}

	/// Identification, comments, and for Vorbis the setup header
	fn header_packet_count(self) -> isize {
		match self {
			Self::Vorbis => 3,
			Self::Opus | Self::Speex => 2,
		}
	}
}

fn verify_signature(packet: &[u8], signature: &[u8]) -> Result<()> {
	if !packet.starts_with(signature) {
		decode_err!(@BAIL VorbisComments, "OGG: Comment packet missing magic signature");
	}

	Ok(())
}

/// The header packets of an OGG stream
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct OggLayout {
	pub(crate) format: OggFormat,
	serial: u32,
	/// The comment packet, including its signature and anything after the comments
	comment_packet: Vec<u8>,
	/// The header pages after the identification page
	pub(crate) comment_pages: Range<usize>,
	header_pages: u32,
}

impl OggLayout {
	/// Read the header packets of the stream at the start of `data`
	pub(crate) fn read(data: &[u8]) -> Result<Self> {
		let mut reader = Cursor::new(data);
		let serial = PageHeader::read(&mut reader)?.stream_serial;

		reader.set_position(0);
		let ident = Packets::read_count(&mut reader, 1)?;
		let Some(format) = ident.get(0).and_then(OggFormat::from_ident_packet) else {
			decode_err!(@BAIL "OGG: Expected a Vorbis, Opus, or Speex stream");
		};

		reader.set_position(0);
		let packets = Packets::read_count(&mut reader, format.header_packet_count())?;
		let header_end = reader.position() as usize;

		let Some(comment_packet) = packets.get(1) else {
			decode_err!(@BAIL VorbisComments, "OGG: Expected metadata packet");
		};
		verify_signature(comment_packet, format.comment_signature())?;

		reader.set_position(0);
		let mut header_pages = 0;
		let mut first_page_end = None;
		while (reader.position() as usize) < header_end {
			Page::read(&mut reader)?;
			header_pages += 1;
			first_page_end.get_or_insert(reader.position() as usize);
		}

		log::debug!("Found an OGG {format:?} stream, {header_pages} header page(s)");

		Ok(Self {
			format,
			serial,
			comment_packet: comment_packet.to_vec(),
			comment_pages: first_page_end.unwrap_or(header_end)..header_end,
			header_pages,
		})
	}

	/// The offset of the first audio page
	pub(crate) fn audio_offset(&self) -> usize {
		self.comment_pages.end
	}

	/// Decode the comment packet
	pub(crate) fn decode_tag(&self, ctx: &DecodeContext) -> Result<DecodedTag> {
		let signature_len = self.format.comment_signature().len();
		let codec = crate::registry::codec(TagFormat::VorbisComments);

		codec.decode(&self.comment_packet[signature_len..], ctx)
	}

	/// Write the stream with `comment` as its new comment packet
	///
	/// `comment` is an encoded comment block, without the packet signature or framing bit. When
	/// padding is enabled and the new packet is smaller, it is zero-padded to its original size,
	/// which keeps the pagination and the file length.
	pub(crate) fn rebuild(
		&self,
		data: &[u8],
		comment: &[u8],
		write_options: &WriteOptions,
	) -> Result<Vec<u8>> {
		let mut packet = self.comment_packet_for(comment);

		if write_options.padding {
			let original_len = self.comment_packet.len();
			if packet.len() <= original_len {
				packet.resize(original_len, 0);
			} else if let Some(preferred_padding) = write_options.preferred_padding_bytes() {
				packet.resize(packet.len() + preferred_padding as usize, 0);
			}
		}

		self.write_with_comment_packet(data, packet)
	}

	/// Write the stream with an empty comment packet, keeping the vendor string
	pub(crate) fn strip(&self, data: &[u8]) -> Result<Vec<u8>> {
		let body = &self.comment_packet[self.format.comment_signature().len()..];
		let vendor_len = body.get(..4).map_or(0, LittleEndian::read_u32) as usize;
		let vendor = body.get(4..4 + vendor_len).unwrap_or_default();

		let mut comment = (vendor.len() as u32).to_le_bytes().to_vec();
		comment.extend_from_slice(vendor);
		comment.extend_from_slice(&0u32.to_le_bytes());

		let packet = self.comment_packet_for(&comment);
		self.write_with_comment_packet(data, packet)
	}

	fn comment_packet_for(&self, comment: &[u8]) -> Vec<u8> {
		let signature = self.format.comment_signature();

		let mut packet = Vec::with_capacity(signature.len() + comment.len() + 1);
		packet.extend_from_slice(signature);
		packet.extend_from_slice(comment);

		// Separates the header packets
		// https://xiph.org/vorbis/doc/Vorbis_I_spec.html#x1-590004
		if self.format == OggFormat::Vorbis {
			packet.push(1);
		}

		packet
	}

	fn write_with_comment_packet(&self, data: &[u8], packet: Vec<u8>) -> Result<Vec<u8>> {
		let mut reader = Cursor::new(data);
		let mut packets = Packets::read_count(&mut reader, self.format.header_packet_count())?;
		packets.set(1, packet);

		let mut out = Vec::with_capacity(data.len());
		let pages_written = packets.write_to(
			&mut out,
			self.serial,
			0,
			CONTAINS_FIRST_PAGE_OF_BITSTREAM,
		)? as u32;

		let audio = &data[self.audio_offset()..];
		if pages_written == self.header_pages {
			out.extend_from_slice(audio);
			return Ok(out);
		}

		log::debug!(
			"OGG header pages went from {} to {pages_written}, renumbering the audio pages",
			self.header_pages
		);

		let mut reader = Cursor::new(audio);
		let mut sequence_number = pages_written;
		loop {
			let start = reader.position() as usize;
			if start >= audio.len() {
				break;
			}

			let mut page = match Page::read(&mut reader) {
				Ok(page) => page,
				Err(e) => {
					log::warn!("Unable to read OGG page, keeping the rest of the stream as-is: {e}");
					out.extend_from_slice(&audio[start..]);
					break;
				},
			};

			let header = page.header_mut();
			if header.stream_serial == self.serial {
				header.sequence_number = sequence_number;
				sequence_number += 1;
				page.gen_crc();
			}

			out.extend_from_slice(&page.as_bytes());
		}

		Ok(out)
	}
}
