//! Builders for synthetic files
//!
//! Every tag is assembled by hand, so the tests don't rely on the encoders they verify.

use std::fs::File;
use std::io::{Seek as _, Write as _};

/// An MPEG frame header, followed by some payload
pub const AUDIO: [u8; 20] = [
	0xFF, 0xFB, 0x90, 0x64, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55,
	0x55, 0x55, 0x55, 0x55,
];

/// Create a new temporary file with `content`
pub fn temp_file(content: &[u8]) -> File {
	let mut file = tempfile::tempfile().unwrap();
	file.write_all(content).unwrap();
	file.rewind().unwrap();

	file
}

fn synchsafe(n: u32) -> [u8; 4] {
	[
		((n >> 21) & 0x7F) as u8,
		((n >> 14) & 0x7F) as u8,
		((n >> 7) & 0x7F) as u8,
		(n & 0x7F) as u8,
	]
}

/// An ID3v2.3 frame
pub fn id3v23_frame(id: &str, content: &[u8]) -> Vec<u8> {
	let mut out = id.as_bytes().to_vec();
	out.extend_from_slice(&(content.len() as u32).to_be_bytes());
	out.extend_from_slice(&[0, 0]);
	out.extend_from_slice(content);
	out
}

/// A Latin-1 text frame
pub fn text_frame(id: &str, value: &str) -> Vec<u8> {
	let mut content = vec![0];
	content.extend_from_slice(value.as_bytes());
	id3v23_frame(id, &content)
}

/// A Latin-1 `TXXX` frame
pub fn user_text_frame(description: &str, value: &str) -> Vec<u8> {
	let mut content = vec![0];
	content.extend_from_slice(description.as_bytes());
	content.push(0);
	content.extend_from_slice(value.as_bytes());
	id3v23_frame("TXXX", &content)
}

/// An `APIC` frame holding a PNG
pub fn picture_frame(picture_type: u8, data: &[u8]) -> Vec<u8> {
	let mut content = vec![0];
	content.extend_from_slice(b"image/png\0");
	content.push(picture_type);
	content.push(0);
	content.extend_from_slice(data);
	id3v23_frame("APIC", &content)
}

/// An ID3v2.3 tag
pub fn id3v23_tag(frames: &[Vec<u8>], padding: usize) -> Vec<u8> {
	let body_len = frames.iter().map(Vec::len).sum::<usize>() + padding;

	let mut out = b"ID3\x03\x00\x00".to_vec();
	out.extend_from_slice(&synchsafe(body_len as u32));
	for frame in frames {
		out.extend_from_slice(frame);
	}
	out.resize(out.len() + padding, 0);
	out
}

/// An ID3v1.1 tag with no genre
pub fn id3v1_tag(title: &str, artist: &str, year: &str, track: u8) -> Vec<u8> {
	fn field(value: &str, len: usize) -> Vec<u8> {
		let mut bytes = value.as_bytes().to_vec();
		bytes.resize(len, 0);
		bytes
	}

	let mut out = b"TAG".to_vec();
	out.extend(field(title, 30));
	out.extend(field(artist, 30));
	out.extend(field("", 30));
	out.extend(field(year, 4));
	out.extend(field("", 28));
	out.push(0);
	out.push(track);
	out.push(255);
	out
}

fn ape_item(key: &str, value: &[u8], value_size: u32, item_type: u32) -> Vec<u8> {
	let mut out = value_size.to_le_bytes().to_vec();
	out.extend_from_slice(&(item_type << 1).to_le_bytes());
	out.extend_from_slice(key.as_bytes());
	out.push(0);
	out.extend_from_slice(value);
	out
}

fn ape_header(size: u32, item_count: u32, is_header: bool) -> Vec<u8> {
	let mut flags = 1u32 << 31;
	if is_header {
		flags |= 1 << 29;
	}

	let mut out = b"APETAGEX".to_vec();
	out.extend_from_slice(&2000u32.to_le_bytes());
	out.extend_from_slice(&size.to_le_bytes());
	out.extend_from_slice(&item_count.to_le_bytes());
	out.extend_from_slice(&flags.to_le_bytes());
	out.extend_from_slice(&[0; 8]);
	out
}

fn ape_from_items(items: &[u8], item_count: u32) -> Vec<u8> {
	let size = (items.len() + 32) as u32;

	let mut out = ape_header(size, item_count, true);
	out.extend_from_slice(items);
	out.extend(ape_header(size, item_count, false));
	out
}

/// An APEv2 tag with a header, holding text items
pub fn ape_tag(items: &[(&str, &str)]) -> Vec<u8> {
	let mut body = Vec::new();
	for (key, value) in items {
		body.extend(ape_item(key, value.as_bytes(), value.len() as u32, 0));
	}

	ape_from_items(&body, items.len() as u32)
}

/// An APEv2 tag with a header, holding text items and binary picture items
///
/// Each picture is stored with an empty description.
pub fn ape_tag_with_pictures(items: &[(&str, &str)], pictures: &[(&str, &[u8])]) -> Vec<u8> {
	let mut body = Vec::new();
	for (key, value) in items {
		body.extend(ape_item(key, value.as_bytes(), value.len() as u32, 0));
	}

	for (key, data) in pictures {
		let mut value = vec![0];
		value.extend_from_slice(data);
		body.extend(ape_item(key, &value, value.len() as u32, 1));
	}

	ape_from_items(&body, (items.len() + pictures.len()) as u32)
}

/// An APEv2 tag whose only item claims a value far larger than the tag
pub fn corrupt_ape_tag() -> Vec<u8> {
	ape_from_items(&ape_item("Artist", b"APE artist", 0xFFFF, 0), 1)
}

/// An MPEG-style file
pub fn mp3(id3v2: Option<&[u8]>, ape: Option<&[u8]>, id3v1: Option<&[u8]>) -> Vec<u8> {
	let mut out = Vec::new();
	out.extend_from_slice(id3v2.unwrap_or_default());
	out.extend_from_slice(&AUDIO);
	out.extend_from_slice(ape.unwrap_or_default());
	out.extend_from_slice(id3v1.unwrap_or_default());
	out
}

pub const BLOCK_STREAMINFO: u8 = 0;
pub const BLOCK_PADDING: u8 = 1;
pub const BLOCK_SEEKTABLE: u8 = 3;
pub const BLOCK_VORBIS_COMMENT: u8 = 4;
pub const BLOCK_PICTURE: u8 = 6;

/// A FLAC metadata block, without the last-block flag
pub fn flac_block(ty: u8, content: &[u8]) -> (u8, Vec<u8>) {
	(ty, content.to_vec())
}

/// The content of a `VORBIS_COMMENT` block
pub fn vorbis_comments(vendor: &str, comments: &[&str]) -> Vec<u8> {
	let mut out = (vendor.len() as u32).to_le_bytes().to_vec();
	out.extend_from_slice(vendor.as_bytes());
	out.extend_from_slice(&(comments.len() as u32).to_le_bytes());
	for comment in comments {
		out.extend_from_slice(&(comment.len() as u32).to_le_bytes());
		out.extend_from_slice(comment.as_bytes());
	}

	out
}

/// The content of a `PICTURE` block holding a PNG
pub fn flac_picture(picture_type: u32, data: &[u8]) -> Vec<u8> {
	let mut out = picture_type.to_be_bytes().to_vec();
	out.extend_from_slice(&9u32.to_be_bytes());
	out.extend_from_slice(b"image/png");
	// Description
	out.extend_from_slice(&0u32.to_be_bytes());
	// Width, height, color depth, number of colors
	for n in [16u32, 16, 24, 0] {
		out.extend_from_slice(&n.to_be_bytes());
	}
	out.extend_from_slice(&(data.len() as u32).to_be_bytes());
	out.extend_from_slice(data);
	out
}

/// A FLAC file, the first block should be `STREAMINFO`
pub fn flac(blocks: &[(u8, Vec<u8>)]) -> Vec<u8> {
	let mut out = b"fLaC".to_vec();
	for (i, (ty, content)) in blocks.iter().enumerate() {
		let last = i + 1 == blocks.len();
		out.push(if last { ty | 0x80 } else { *ty });
		out.extend_from_slice(&(content.len() as u32).to_be_bytes()[1..]);
		out.extend_from_slice(content);
	}

	// A frame header, and some payload
	out.extend_from_slice(&[0xFF, 0xF8, 0x69, 0x08, 0x00, 0x13, 0x37]);
	out
}

fn ogg_crc(data: &[u8]) -> u32 {
	let mut crc = 0u32;
	for byte in data {
		crc ^= u32::from(*byte) << 24;
		for _ in 0..8 {
			crc = if crc & 0x8000_0000 == 0 { crc << 1 } else { (crc << 1) ^ 0x04C1_1DB7 };
		}
	}

	crc
}

pub const OGG_SERIAL: u32 = 0x1234_5678;

/// An OGG page holding a single whole packet, with a valid checksum
pub fn ogg_page(flags: u8, abgp: u64, sequence: u32, packet: &[u8]) -> Vec<u8> {
	let mut segments = vec![255u8; packet.len() / 255];
	segments.push((packet.len() % 255) as u8);

	let mut out = b"OggS\0".to_vec();
	out.push(flags);
	out.extend_from_slice(&abgp.to_le_bytes());
	out.extend_from_slice(&OGG_SERIAL.to_le_bytes());
	out.extend_from_slice(&sequence.to_le_bytes());
	out.extend_from_slice(&0u32.to_le_bytes());
	out.push(segments.len() as u8);
	out.extend_from_slice(&segments);
	out.extend_from_slice(packet);

	let crc = ogg_crc(&out);
	out[22..26].copy_from_slice(&crc.to_le_bytes());
	out
}

/// The audio pages shared by every OGG stream, starting at `sequence`
pub fn ogg_audio(sequence: u32) -> Vec<u8> {
	let mut out = ogg_page(0, 1024, sequence, &[0x55; 40]);
	out.extend(ogg_page(4, 2048, sequence + 1, &[0xAA; 30]));
	out
}

/// An OGG Vorbis stream, one page per header packet
///
/// `comment` is the comment packet after its `\x03vorbis` signature, including the framing bit.
pub fn ogg_vorbis(comment: &[u8]) -> Vec<u8> {
	let mut ident = b"\x01vorbis".to_vec();
	ident.extend_from_slice(&0u32.to_le_bytes());
	ident.push(2);
	ident.extend_from_slice(&44100u32.to_le_bytes());
	ident.extend_from_slice(&[0; 12]);
	ident.extend_from_slice(&[0xB8, 0x01]);

	let mut comment_packet = b"\x03vorbis".to_vec();
	comment_packet.extend_from_slice(comment);

	let mut setup = b"\x05vorbis".to_vec();
	setup.extend_from_slice(&[0x42; 20]);

	let mut out = ogg_page(2, 0, 0, &ident);
	out.extend(ogg_page(0, 0, 1, &comment_packet));
	out.extend(ogg_page(0, 0, 2, &setup));
	out.extend(ogg_audio(3));
	out
}

/// An OGG Opus stream, one page per header packet
pub fn ogg_opus(comment: &[u8]) -> Vec<u8> {
	let mut ident = b"OpusHead".to_vec();
	ident.extend_from_slice(&[1, 2, 0x38, 0x01, 0x80, 0xBB, 0, 0, 0, 0, 0]);

	let mut tags = b"OpusTags".to_vec();
	tags.extend_from_slice(comment);

	let mut out = ogg_page(2, 0, 0, &ident);
	out.extend(ogg_page(0, 0, 1, &tags));
	out.extend(ogg_audio(2));
	out
}
