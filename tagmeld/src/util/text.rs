use crate::error::Result;
use crate::macros::err;

use std::fmt::{Display, Formatter};

/// Errors that can occur while encoding text
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TextEncodingError {
	encoding: TextEncoding,
	valid_up_to: usize,
}

impl TextEncodingError {
	/// The target text encoding
	pub fn encoding(&self) -> TextEncoding {
		self.encoding
	}

	/// The number of characters that could be encoded before the first failure
	pub fn valid_up_to(&self) -> usize {
		self.valid_up_to
	}
}

impl Display for TextEncodingError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"character {} can't be represented in {}",
			self.valid_up_to,
			self.encoding.name()
		)
	}
}

impl core::error::Error for TextEncodingError {}

/// The text encoding of an ID3v2 frame
///
/// The discriminants are the encoding bytes that start every text-bearing frame.
#[derive(Debug, Clone, Eq, PartialEq, Copy, Hash)]
#[repr(u8)]
pub enum TextEncoding {
	/// ISO-8859-1
	Latin1 = 0,
	/// UTF-16 with a byte order mark
	UTF16 = 1,
	/// UTF-16 big endian, ID3v2.4 only
	UTF16BE = 2,
	/// UTF-8, ID3v2.4 only
	UTF8 = 3,
}

impl TextEncoding {
	/// Get a `TextEncoding` from its encoding byte, `None` if it is greater than 3
	pub fn from_u8(byte: u8) -> Option<Self> {
		match byte {
			0 => Some(Self::Latin1),
			1 => Some(Self::UTF16),
			2 => Some(Self::UTF16BE),
			3 => Some(Self::UTF8),
			_ => None,
		}
	}

	fn name(self) -> &'static str {
		match self {
			Self::Latin1 => "Latin-1",
			Self::UTF16 => "UTF-16",
			Self::UTF16BE => "UTF-16BE",
			Self::UTF8 => "UTF-8",
		}
	}

	fn is_wide(self) -> bool {
		matches!(self, Self::UTF16 | Self::UTF16BE)
	}

	/// Whether every character of `text` fits in Latin-1
	pub(crate) fn is_latin1(text: &str) -> bool {
		text.chars().all(|c| u32::from(c) <= 0xFF)
	}

	/// Encode `text`, optionally followed by a terminator
	///
	/// With `lossy`, characters outside of Latin-1 become `?` instead of failing.
	pub(crate) fn encode(
		self,
		text: &str,
		terminated: bool,
		lossy: bool,
	) -> std::result::Result<Vec<u8>, TextEncodingError> {
		let mut out = match self {
			Self::Latin1 => latin1_encode(text, lossy).collect::<std::result::Result<Vec<_>, _>>()?,
			Self::UTF8 => text.as_bytes().to_vec(),
			Self::UTF16 => {
				let mut out = vec![0xFF, 0xFE];
				out.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
				out
			},
			Self::UTF16BE => text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
		};

		if terminated {
			out.resize(out.len() + if self.is_wide() { 2 } else { 1 }, 0);
		}

		Ok(out)
	}

	/// Decode a terminated string from the start of `content`, and advance past its terminator
	///
	/// A missing terminator consumes the rest of `content`.
	pub(crate) fn read_terminated(self, content: &mut &[u8]) -> Result<String> {
		let (text, rest) = if self.is_wide() {
			let end = content
				.chunks_exact(2)
				.position(|pair| pair == [0, 0])
				.map(|pair_index| pair_index * 2);

			match end {
				Some(end) => (&content[..end], &content[end + 2..]),
				None => (*content, &[][..]),
			}
		} else {
			match content.iter().position(|b| *b == 0) {
				Some(end) => (&content[..end], &content[end + 1..]),
				None => (*content, &[][..]),
			}
		};

		*content = rest;
		self.decode(text)
	}

	/// Decode all of `bytes`, trailing nulls are dropped
	pub(crate) fn decode(self, bytes: &[u8]) -> Result<String> {
		let mut text = match self {
			Self::Latin1 => bytes.iter().copied().map(char::from).collect(),
			Self::UTF8 => match std::str::from_utf8(bytes) {
				Ok(text) => text.to_owned(),
				Err(_) => err!(TextDecode("Expected a UTF-8 string")),
			},
			Self::UTF16 => match bytes {
				[] => String::new(),
				[0xFE, 0xFF, rest @ ..] => utf16_decode(rest, u16::from_be_bytes)?,
				[0xFF, 0xFE, rest @ ..] => utf16_decode(rest, u16::from_le_bytes)?,
				_ => err!(TextDecode("UTF-16 string has an invalid byte order mark")),
			},
			Self::UTF16BE => utf16_decode(bytes, u16::from_be_bytes)?,
		};

		trim_end_nulls(&mut text);
		Ok(text)
	}
}

fn utf16_decode(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> Result<String> {
	if bytes.len() % 2 != 0 {
		err!(TextDecode("UTF-16 string has an odd length"));
	}

	// Every value of a multi-value frame may carry its own BOM
	let units = bytes
		.chunks_exact(2)
		.filter(|pair| *pair != [0xFF, 0xFE] && *pair != [0xFE, 0xFF])
		.map(|pair| to_unit([pair[0], pair[1]]))
		.collect::<Vec<_>>();

	match String::from_utf16(&units) {
		Ok(text) => Ok(text),
		Err(_) => err!(TextDecode("Given an invalid UTF-16 string")),
	}
}

/// Decode a Latin-1 string, dropping trailing nulls
pub(crate) fn latin1_decode(bytes: &[u8]) -> String {
	let mut text = bytes.iter().copied().map(char::from).collect::<String>();
	trim_end_nulls(&mut text);
	text
}

pub(crate) fn latin1_encode(
	text: &str,
	lossy: bool,
) -> impl Iterator<Item = std::result::Result<u8, TextEncodingError>> + '_ {
	text.chars().enumerate().map(move |(index, c)| match u8::try_from(c) {
		Ok(byte) => Ok(byte),
		Err(_) if lossy => Ok(b'?'),
		Err(_) => Err(TextEncodingError {
			encoding: TextEncoding::Latin1,
			valid_up_to: index,
		}),
	})
}

/// Decode UTF-8, dropping trailing nulls
pub(crate) fn utf8_decode_str(bytes: &[u8]) -> Result<&str> {
	Ok(std::str::from_utf8(bytes)?.trim_end_matches('\0'))
}

fn trim_end_nulls(text: &mut String) {
	let len = text.trim_end_matches('\0').len();
	text.truncate(len);
}
