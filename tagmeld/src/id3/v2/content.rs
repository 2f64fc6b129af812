//! Decoding and encoding the content of the frames that map to the field model

use super::header::Id3v2Version;
use crate::error::{Id3v2Error, Id3v2ErrorKind, Result};
use crate::macros::err;
use crate::picture::{MimeType, Picture, PictureType};
use crate::util::text::TextEncoding;

use std::io::Read as _;

use byteorder::ReadBytesExt as _;

/// A decoded text information frame (`T***`, excluding `TXXX`)
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct TextFrame {
	pub(crate) encoding: TextEncoding,
	pub(crate) value: String,
}

/// A decoded `TXXX`/`COMM` frame
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct DescribedTextFrame {
	pub(crate) encoding: TextEncoding,
	/// Only present in `COMM` frames
	pub(crate) language: Option<[u8; 3]>,
	pub(crate) description: String,
	pub(crate) value: String,
}

pub(crate) struct PictureFrame {
	pub(crate) encoding: TextEncoding,
	pub(crate) picture: Picture,
}

fn read_encoding(reader: &mut &[u8]) -> Result<TextEncoding> {
	let Some(encoding) = TextEncoding::from_u8(reader.read_u8()?) else {
		err!(TextDecode("Found invalid encoding"));
	};

	Ok(encoding)
}

// ID3v2.4 allows multiple values, separated by null terminators
fn join_values(mut value: String) -> String {
	if value.contains('\0') {
		value = value
			.split('\0')
			.filter(|v| !v.is_empty())
			.collect::<Vec<_>>()
			.join("/");
	}

	value
}

pub(crate) fn decode_text_frame(mut content: &[u8]) -> Result<TextFrame> {
	let encoding = read_encoding(&mut content)?;
	let value = encoding.decode(content)?;

	Ok(TextFrame {
		encoding,
		value: join_values(value),
	})
}

pub(crate) fn decode_described_text_frame(
	mut content: &[u8],
	has_language: bool,
) -> Result<DescribedTextFrame> {
	let encoding = read_encoding(&mut content)?;

	let mut language = None;
	if has_language {
		let mut lang = [0; 3];
		content.read_exact(&mut lang)?;
		language = Some(lang);
	}

	let description = encoding.read_terminated(&mut content)?;
	let value = encoding.decode(content)?;

	Ok(DescribedTextFrame {
		encoding,
		language,
		description,
		value: join_values(value),
	})
}

pub(crate) fn decode_picture_frame(
	mut content: &[u8],
	version: Id3v2Version,
) -> Result<PictureFrame> {
	let Some(encoding) = TextEncoding::from_u8(content.read_u8()?) else {
		err!(NotAPicture);
	};

	let mime_type = if version == Id3v2Version::V2 {
		let mut format = [0; 3];
		content.read_exact(&mut format)?;

		match &format {
			b"PNG" | b"JPG" | b"GIF" | b"BMP" | b"TIF" => {
				Some(MimeType::from_ext(&String::from_utf8_lossy(&format)))
			},
			_ => {
				return Err(Id3v2Error::new(Id3v2ErrorKind::BadPictureFormat(
					String::from_utf8_lossy(&format).into_owned(),
				))
				.into());
			},
		}
	} else {
		let mime_type = TextEncoding::Latin1.read_terminated(&mut content)?;

		(!mime_type.is_empty()).then(|| MimeType::from_str(&mime_type))
	};

	let pic_type = PictureType::from_u8(content.read_u8()?);

	let description = encoding.read_terminated(&mut content)?;
	let data = content.to_vec();

	Ok(PictureFrame {
		encoding,
		picture: Picture::new_unchecked(
			pic_type,
			mime_type,
			(!description.is_empty()).then_some(description),
			data,
		),
	})
}

/// Pick the encoding for newly written text
///
/// The encoding of the frame being replaced is kept where the version and text allow it.
pub(crate) fn choose_encoding(
	version: Id3v2Version,
	preferred: Option<TextEncoding>,
	texts: &[&str],
) -> TextEncoding {
	let latin1 = texts.iter().all(|text| TextEncoding::is_latin1(text));
	let fallback = match version {
		Id3v2Version::V4 => TextEncoding::UTF8,
		Id3v2Version::V2 | Id3v2Version::V3 => TextEncoding::UTF16,
	};

	match preferred {
		Some(TextEncoding::Latin1) if latin1 => TextEncoding::Latin1,
		Some(TextEncoding::Latin1) => fallback,
		// UTF-8 and UTF-16 BE are only valid in ID3v2.4
		Some(TextEncoding::UTF8 | TextEncoding::UTF16BE) if version != Id3v2Version::V4 => {
			TextEncoding::UTF16
		},
		Some(encoding) => encoding,
		None if version == Id3v2Version::V4 => TextEncoding::UTF8,
		None if latin1 => TextEncoding::Latin1,
		None => fallback,
	}
}

pub(crate) fn encode_text_frame(encoding: TextEncoding, value: &str) -> Result<Vec<u8>> {
	let mut content = vec![encoding as u8];
	content.extend(encoding.encode(value, false, false)?);
	Ok(content)
}

pub(crate) fn encode_described_text_frame(
	encoding: TextEncoding,
	language: Option<[u8; 3]>,
	description: &str,
	value: &str,
) -> Result<Vec<u8>> {
	let mut content = vec![encoding as u8];
	if let Some(language) = language {
		content.extend_from_slice(&language);
	}

	content.extend(encoding.encode(description, true, false)?);
	content.extend(encoding.encode(value, false, false)?);
	Ok(content)
}

pub(crate) fn encode_picture_frame(
	version: Id3v2Version,
	encoding: TextEncoding,
	picture: &Picture,
) -> Result<Vec<u8>> {
	let mut content = vec![encoding as u8];

	if version == Id3v2Version::V2 {
		let format = match picture.mime_type() {
			Some(MimeType::Png) => *b"PNG",
			Some(MimeType::Jpeg) => *b"JPG",
			Some(MimeType::Gif) => *b"GIF",
			Some(MimeType::Bmp) => *b"BMP",
			Some(MimeType::Tiff) => *b"TIF",
			mime_type => {
				return Err(Id3v2Error::new(Id3v2ErrorKind::BadPictureFormat(
					mime_type.map(MimeType::to_string).unwrap_or_default(),
				))
				.into());
			},
		};

		content.extend_from_slice(&format);
	} else {
		if let Some(mime_type) = picture.mime_type() {
			content.extend(TextEncoding::Latin1.encode(mime_type.as_str(), false, true)?);
		}
		content.push(0);
	}

	content.push(picture.pic_type().as_u8());
	content.extend(encoding.encode(picture.description().unwrap_or_default(), true, false)?);
	content.extend_from_slice(picture.data());

	Ok(content)
}
