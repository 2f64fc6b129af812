//! Format-agnostic picture handling

mod store;

pub use store::PictureStore;

use crate::config::ParsingMode;
use crate::error::{ErrorKind, Result, TagmeldError};
use crate::macros::{err, try_vec};
use crate::util::take;
use crate::util::text::utf8_decode_str;

use std::fmt::{Debug, Display, Formatter};

use byteorder::{BigEndian, ByteOrder};
use data_encoding::BASE64;

/// MIME types for pictures
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum MimeType {
	/// PNG image
	Png,
	/// JPEG image
	Jpeg,
	/// TIFF image
	Tiff,
	/// BMP image
	Bmp,
	/// GIF image
	Gif,
	/// Some unknown MIME type
	Unknown(String),
}

// (type, MIME type, extensions). The first extension is the one ID3v2.2 writes.
const KNOWN_MIME_TYPES: [(MimeType, &str, &[&str]); 5] = [
	(MimeType::Png, "image/png", &["png"]),
	(MimeType::Jpeg, "image/jpeg", &["jpg", "jpeg"]),
	(MimeType::Tiff, "image/tiff", &["tif", "tiff"]),
	(MimeType::Bmp, "image/bmp", &["bmp"]),
	(MimeType::Gif, "image/gif", &["gif"]),
];

impl MimeType {
	/// Get a `MimeType` from a string, ignoring case
	///
	/// # Examples
	///
	/// ```rust
	/// use tagmeld::picture::MimeType;
	///
	/// assert_eq!(MimeType::from_str("image/JPEG"), MimeType::Jpeg);
	/// assert_eq!(MimeType::from_str("image/jpg"), MimeType::Jpeg);
	/// assert_eq!(
	/// 	MimeType::from_str("image/webp"),
	/// 	MimeType::Unknown(String::from("image/webp"))
	/// );
	/// ```
	#[must_use]
	#[allow(clippy::should_implement_trait)] // Infallible in contrast to FromStr
	pub fn from_str(mime_type: &str) -> Self {
		// A common misspelling
		if mime_type.eq_ignore_ascii_case("image/jpg") {
			return Self::Jpeg;
		}

		KNOWN_MIME_TYPES
			.iter()
			.find(|(_, known, _)| known.eq_ignore_ascii_case(mime_type))
			.map_or_else(|| Self::Unknown(mime_type.to_owned()), |(ty, _, _)| ty.clone())
	}

	/// Get a `MimeType` from a file extension, ignoring case
	pub fn from_ext(ext: &str) -> Self {
		KNOWN_MIME_TYPES
			.iter()
			.find(|(_, _, exts)| exts.iter().any(|known| known.eq_ignore_ascii_case(ext)))
			.map_or_else(|| Self::Unknown(ext.to_owned()), |(ty, _, _)| ty.clone())
	}

	/// The MIME type as a string
	///
	/// # Examples
	///
	/// ```rust
	/// use tagmeld::picture::MimeType;
	///
	/// assert_eq!(MimeType::Jpeg.as_str(), "image/jpeg");
	/// ```
	#[must_use]
	pub fn as_str(&self) -> &str {
		match self {
			Self::Unknown(unknown) => unknown,
			known => KNOWN_MIME_TYPES
				.iter()
				.find(|(ty, _, _)| ty == known)
				.map_or("", |(_, mime_type, _)| *mime_type),
		}
	}

	/// The usual extension for the `MimeType`, if it is known
	pub fn ext(&self) -> Option<&'static str> {
		KNOWN_MIME_TYPES
			.iter()
			.find(|(ty, _, _)| ty == self)
			.map(|(_, _, exts)| exts[0])
	}
}

impl Display for MimeType {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// The purpose of a picture
///
/// The numbering is shared by ID3v2 `APIC` frames and FLAC `PICTURE` blocks, APE tags use a
/// distinct item key per type instead.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum PictureType {
	Other,
	Icon,
	OtherIcon,
	CoverFront,
	CoverBack,
	Leaflet,
	Media,
	LeadArtist,
	Artist,
	Conductor,
	Band,
	Composer,
	Lyricist,
	RecordingLocation,
	DuringRecording,
	DuringPerformance,
	ScreenCapture,
	BrightFish,
	Illustration,
	BandLogo,
	PublisherLogo,
	/// Any type outside of 0..=20
	Undefined(u8),
}

// Indexed by the numeric type
const KNOWN_PICTURE_TYPES: [(PictureType, &str); 21] = [
	(PictureType::Other, "Cover Art (Other)"),
	(PictureType::Icon, "Cover Art (Png Icon)"),
	(PictureType::OtherIcon, "Cover Art (Icon)"),
	(PictureType::CoverFront, "Cover Art (Front)"),
	(PictureType::CoverBack, "Cover Art (Back)"),
	(PictureType::Leaflet, "Cover Art (Leaflet)"),
	(PictureType::Media, "Cover Art (Media)"),
	(PictureType::LeadArtist, "Cover Art (Lead Artist)"),
	(PictureType::Artist, "Cover Art (Artist)"),
	(PictureType::Conductor, "Cover Art (Conductor)"),
	(PictureType::Band, "Cover Art (Band)"),
	(PictureType::Composer, "Cover Art (Composer)"),
	(PictureType::Lyricist, "Cover Art (Lyricist)"),
	(PictureType::RecordingLocation, "Cover Art (Recording Location)"),
	(PictureType::DuringRecording, "Cover Art (During Recording)"),
	(PictureType::DuringPerformance, "Cover Art (During Performance)"),
	(PictureType::ScreenCapture, "Cover Art (Video Capture)"),
	(PictureType::BrightFish, "Cover Art (Fish)"),
	(PictureType::Illustration, "Cover Art (Illustration)"),
	(PictureType::BandLogo, "Cover Art (Band Logotype)"),
	(PictureType::PublisherLogo, "Cover Art (Publisher Logotype)"),
];

impl PictureType {
	/// The numeric picture type
	///
	/// # Examples
	///
	/// ```rust
	/// use tagmeld::picture::PictureType;
	///
	/// assert_eq!(PictureType::CoverFront.as_u8(), 3);
	/// assert_eq!(PictureType::Undefined(42).as_u8(), 42);
	/// ```
	pub fn as_u8(&self) -> u8 {
		if let Self::Undefined(byte) = self {
			return *byte;
		}

		KNOWN_PICTURE_TYPES
			.iter()
			.position(|(ty, _)| ty == self)
			.map_or(0, |index| index as u8)
	}

	/// Get a `PictureType` from its number
	pub fn from_u8(byte: u8) -> Self {
		KNOWN_PICTURE_TYPES
			.get(usize::from(byte))
			.map_or(Self::Undefined(byte), |(ty, _)| *ty)
	}

	/// Get the APE item key of a `PictureType`
	///
	/// [`PictureType::Undefined`] has no APE key.
	pub fn as_ape_key(&self) -> Option<&'static str> {
		KNOWN_PICTURE_TYPES
			.iter()
			.find(|(ty, _)| ty == self)
			.map(|(_, key)| *key)
	}

	/// Get a `PictureType` from an APE item key, ignoring case
	pub fn from_ape_key(key: &str) -> Option<Self> {
		KNOWN_PICTURE_TYPES
			.iter()
			.find(|(_, known)| known.eq_ignore_ascii_case(key))
			.map(|(ty, _)| *ty)
	}
}

/// Information about a [`Picture`]
///
/// This information is stored alongside pictures in FLAC `PICTURE` blocks. It is carried over
/// from the original block when a picture is rewritten, and zeroed out for new pictures.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct PictureInformation {
	/// The picture's width in pixels
	pub width: u32,
	/// The picture's height in pixels
	pub height: u32,
	/// The picture's color depth in bits per pixel
	pub color_depth: u32,
	/// The number of colors used
	pub num_colors: u32,
}

/// Represents a picture.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Picture {
	pub(crate) pic_type: PictureType,
	pub(crate) mime_type: Option<MimeType>,
	pub(crate) description: Option<String>,
	pub(crate) data: Vec<u8>,
}

impl Debug for Picture {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Picture")
			.field("pic_type", &self.pic_type)
			.field("mime_type", &self.mime_type)
			.field("description", &self.description)
			.field("data", &format!("<{} bytes>", self.data.len()))
			.finish()
	}
}

impl Picture {
	/// Create a [`Picture`] from raw image bytes, detecting the [`MimeType`]
	///
	/// `pic_type` will always be [`PictureType::Other`], be sure to change it accordingly if
	/// writing.
	///
	/// # Errors
	///
	/// * `data` contains less than 8 bytes
	/// * `data` does not contain a supported format. See [`MimeType`] for valid formats
	pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
		let mime_type = Self::mimetype_from_bin(&data)?;

		Ok(Self {
			pic_type: PictureType::Other,
			mime_type: Some(mime_type),
			description: None,
			data,
		})
	}

	/// Create a new `Picture` with no verification
	///
	/// This will **not** verify `data`'s signature.
	///
	/// # Examples
	///
	/// ```rust
	/// use tagmeld::picture::{MimeType, Picture, PictureType};
	///
	/// let picture = Picture::new_unchecked(
	/// 	PictureType::Band,
	/// 	Some(MimeType::Jpeg),
	/// 	Some(String::from("The band on stage")),
	/// 	vec![0xFF, 0xD8, 0xFF, 0xE0],
	/// );
	///
	/// assert_eq!(picture.description(), Some("The band on stage"));
	/// ```
	pub fn new_unchecked(
		pic_type: PictureType,
		mime_type: Option<MimeType>,
		description: Option<String>,
		data: Vec<u8>,
	) -> Self {
		Self {
			pic_type,
			mime_type,
			description,
			data,
		}
	}

	/// Returns the [`PictureType`]
	pub fn pic_type(&self) -> PictureType {
		self.pic_type
	}

	/// Sets the [`PictureType`]
	pub fn set_pic_type(&mut self, pic_type: PictureType) {
		self.pic_type = pic_type
	}

	/// Returns the [`MimeType`]
	pub fn mime_type(&self) -> Option<&MimeType> {
		self.mime_type.as_ref()
	}

	/// Returns the description
	pub fn description(&self) -> Option<&str> {
		self.description.as_deref()
	}

	/// Sets the description
	pub fn set_description(&mut self, description: Option<String>) {
		self.description = description;
	}

	/// Returns the [`Picture`] data as borrowed bytes.
	pub fn data(&self) -> &[u8] {
		&self.data
	}

	/// Consumes a [`Picture`], returning the data
	pub fn into_data(self) -> Vec<u8> {
		self.data
	}

	/// Convert a [`Picture`] to the FLAC picture structure
	///
	/// This is the content of a FLAC `PICTURE` block, and the base64 decoded value of a
	/// `METADATA_BLOCK_PICTURE` Vorbis comment.
	pub(crate) fn as_flac_bytes(&self, information: PictureInformation) -> Vec<u8> {
		fn push_sized(out: &mut Vec<u8>, bytes: &[u8]) {
			out.extend((bytes.len() as u32).to_be_bytes());
			out.extend_from_slice(bytes);
		}

		let mime_type = self.mime_type.as_ref().map_or("", MimeType::as_str);
		let description = self.description.as_deref().unwrap_or_default();

		let mut out = Vec::with_capacity(32 + mime_type.len() + description.len() + self.data.len());
		out.extend(u32::from(self.pic_type.as_u8()).to_be_bytes());
		push_sized(&mut out, mime_type.as_bytes());
		push_sized(&mut out, description.as_bytes());

		for n in [
			information.width,
			information.height,
			information.color_depth,
			information.num_colors,
		] {
			out.extend(n.to_be_bytes());
		}

		push_sized(&mut out, &self.data);
		out
	}

	/// Get a [`Picture`] from the FLAC picture structure
	///
	/// Set `encoded` for the base64 encoded form found in Vorbis comments.
	///
	/// # Errors
	///
	/// * [`NotAPicture`](ErrorKind::NotAPicture): the structure is truncated, or the base64 is invalid
	/// * [`TooMuchData`](ErrorKind::TooMuchData): the picture exceeds `allocation_limit`
	pub(crate) fn from_flac_bytes(
		bytes: &[u8],
		encoded: bool,
		parse_mode: ParsingMode,
		allocation_limit: usize,
	) -> Result<(Self, PictureInformation)> {
		if !encoded {
			return Self::parse_flac_structure(bytes, parse_mode, allocation_limit);
		}

		match BASE64.decode(bytes) {
			Ok(decoded) => Self::parse_flac_structure(&decoded, parse_mode, allocation_limit),
			Err(_) => err!(NotAPicture),
		}
	}

	fn parse_flac_structure(
		mut content: &[u8],
		parse_mode: ParsingMode,
		allocation_limit: usize,
	) -> Result<(Self, PictureInformation)> {
		fn read_u32(content: &mut &[u8]) -> Result<u32> {
			let bytes = take(content, 4).map_err(|_| TagmeldError::new(ErrorKind::NotAPicture))?;
			Ok(BigEndian::read_u32(bytes))
		}

		fn read_sized<'a>(content: &mut &'a [u8]) -> Result<&'a [u8]> {
			let len = read_u32(content)? as usize;
			take(content, len).map_err(|_| TagmeldError::new(ErrorKind::NotAPicture))
		}

		let pic_type = read_u32(&mut content)?;
		// The picture type is a single byte elsewhere
		let pic_type = match u8::try_from(pic_type) {
			Ok(pic_type) => PictureType::from_u8(pic_type),
			Err(_) if parse_mode == ParsingMode::Strict => err!(NotAPicture),
			Err(_) => {
				log::warn!("FLAC picture has an out of range type ({pic_type}), using `Other`");
				PictureType::Other
			},
		};

		let mime_type = utf8_decode_str(read_sized(&mut content)?)?;
		let mime_type = (!mime_type.is_empty()).then(|| MimeType::from_str(mime_type));

		// An undecodable description isn't worth discarding the picture over
		let description = utf8_decode_str(read_sized(&mut content)?)
			.ok()
			.filter(|description| !description.is_empty())
			.map(str::to_owned);

		let information = PictureInformation {
			width: read_u32(&mut content)?,
			height: read_u32(&mut content)?,
			color_depth: read_u32(&mut content)?,
			num_colors: read_u32(&mut content)?,
		};

		let data = read_sized(&mut content)?;
		let mut owned = try_vec![0; data.len(), allocation_limit];
		owned.copy_from_slice(data);

		let picture = Self {
			pic_type,
			mime_type,
			description,
			data: owned,
		};

		Ok((picture, information))
	}

	/// Convert a [`Picture`] to an APE Cover Art item value
	///
	/// NOTE: This is only the description and picture data. The item key is given by
	/// [`PictureType::as_ape_key`].
	pub(crate) fn as_ape_bytes(&self) -> Vec<u8> {
		let mut data: Vec<u8> = Vec::new();

		if let Some(desc) = &self.description {
			data.extend(desc.as_bytes());
		}

		data.push(0);
		data.extend(self.data.iter());

		data
	}

	/// Get a [`Picture`] from an APE Cover Art item value
	///
	/// # Errors
	///
	/// This function will return [`NotAPicture`](ErrorKind::NotAPicture)
	/// if the value is empty, or has no description terminator
	pub(crate) fn from_ape_bytes(pic_type: PictureType, bytes: &[u8]) -> Result<Self> {
		let Some(terminator) = bytes.iter().position(|b| *b == 0) else {
			err!(NotAPicture);
		};

		let description = match std::str::from_utf8(&bytes[..terminator]) {
			Ok("") => None,
			Ok(desc) => Some(desc.to_owned()),
			Err(_) => Some(bytes[..terminator].iter().map(|b| char::from(*b)).collect()),
		};

		let data = bytes[terminator + 1..].to_vec();
		let mime_type = Self::mimetype_from_bin(&data).ok();

		Ok(Picture {
			pic_type,
			mime_type,
			description,
			data,
		})
	}

	pub(crate) fn mimetype_from_bin(bytes: &[u8]) -> Result<MimeType> {
		match bytes {
			[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Ok(MimeType::Png),
			[0xFF, 0xD8, ..] => Ok(MimeType::Jpeg),
			[b'G', b'I', b'F', 0x38, 0x37 | 0x39, b'a', ..] => Ok(MimeType::Gif),
			[b'B', b'M', ..] => Ok(MimeType::Bmp),
			[b'I', b'I', b'*', 0x00, ..] | [b'M', b'M', 0x00, b'*', ..] => Ok(MimeType::Tiff),
			_ => err!(NotAPicture),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::{MimeType, Picture, PictureInformation, PictureType};
	use crate::config::ParsingMode;

	const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

	fn png_picture() -> Picture {
		let mut data = PNG_HEADER.to_vec();
		data.extend_from_slice(&[0xAB; 24]);

		Picture::new_unchecked(
			PictureType::CoverFront,
			Some(MimeType::Png),
			Some(String::from("front")),
			data,
		)
	}

	#[test_log::test]
	fn flac_structure() {
		let picture = png_picture();
		let info = PictureInformation {
			width: 1,
			height: 2,
			color_depth: 24,
			num_colors: 0,
		};

		let bytes = picture.as_flac_bytes(info);
		let (decoded, decoded_info) =
			Picture::from_flac_bytes(&bytes, false, ParsingMode::Strict, 1024).unwrap();

		assert_eq!(decoded, picture);
		assert_eq!(decoded_info, info);

		let encoded = data_encoding::BASE64.encode(&bytes);
		let (decoded, _) =
			Picture::from_flac_bytes(encoded.as_bytes(), true, ParsingMode::Strict, 1024).unwrap();
		assert_eq!(decoded, picture);
	}

	#[test_log::test]
	fn truncated_flac_structure() {
		let bytes = png_picture().as_flac_bytes(PictureInformation::default());
		assert!(
			Picture::from_flac_bytes(&bytes[..bytes.len() - 4], false, ParsingMode::Strict, 1024)
				.is_err()
		);
	}

	#[test_log::test]
	fn ape_value() {
		let picture = png_picture();
		let decoded =
			Picture::from_ape_bytes(PictureType::CoverFront, &picture.as_ape_bytes()).unwrap();
		assert_eq!(decoded, picture);

		assert!(Picture::from_ape_bytes(PictureType::CoverFront, b"no terminator").is_err());
	}

	#[test_log::test]
	fn ape_keys() {
		assert_eq!(
			PictureType::from_ape_key("cover art (front)"),
			Some(PictureType::CoverFront)
		);
		assert_eq!(
			PictureType::CoverBack.as_ape_key(),
			Some("Cover Art (Back)")
		);
		assert_eq!(PictureType::Undefined(42).as_ape_key(), None);
		assert_eq!(PictureType::from_ape_key("Artist"), None);
	}

	#[test_log::test]
	fn mime_detection() {
		assert_eq!(Picture::mimetype_from_bin(&PNG_HEADER).unwrap(), MimeType::Png);
		assert_eq!(
			Picture::mimetype_from_bin(&[0xFF, 0xD8, 0xFF]).unwrap(),
			MimeType::Jpeg
		);
		assert!(Picture::mimetype_from_bin(&[0x00]).is_err());
	}
}
