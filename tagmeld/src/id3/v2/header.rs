use super::synchsafe::SynchsafeInteger;
use crate::error::{Id3v2Error, Id3v2ErrorKind, Result};
use crate::macros::err;

use byteorder::{BigEndian, ByteOrder};

/// The ID3v2 version
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Id3v2Version {
	/// ID3v2.2
	V2,
	/// ID3v2.3
	V3,
	/// ID3v2.4
	V4,
}

impl Id3v2Version {
	pub(crate) fn major(self) -> u8 {
		match self {
			Id3v2Version::V2 => 2,
			Id3v2Version::V3 => 3,
			Id3v2Version::V4 => 4,
		}
	}
}

/// Flags that apply to the entire tag
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
pub struct Id3v2TagFlags {
	/// Whether or not all frames are unsynchronised
	///
	/// This is only ever read. Tags are always written without unsynchronisation.
	pub unsynchronisation: bool,
	/// Indicates if the tag has an extended header
	///
	/// The extended header is skipped when reading, and not written back.
	pub extended_header: bool,
	/// Indicates if the tag is in an experimental stage
	pub experimental: bool,
	/// Indicates that the tag includes a footer (ID3v2.4 only)
	///
	/// A tag with a footer can't have padding.
	pub footer: bool,
}

impl Id3v2TagFlags {
	pub(crate) fn as_byte(&self, version: Id3v2Version) -> u8 {
		let mut byte = 0;

		if version == Id3v2Version::V2 {
			return byte;
		}

		if self.experimental {
			byte |= 0x20;
		}

		if self.footer && version == Id3v2Version::V4 {
			byte |= 0x10;
		}

		byte
	}
}

pub(crate) const ID3V2_HEADER_SIZE: usize = 10;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Id3v2Header {
	pub version: Id3v2Version,
	pub revision: u8,
	pub flags: Id3v2TagFlags,
	/// The size of the tag contents, including the extended header (**DOES NOT INCLUDE THE HEADER/FOOTER**)
	pub size: u32,
}

impl Id3v2Header {
	pub(crate) fn parse(bytes: &[u8]) -> Result<Self> {
		log::debug!("Parsing ID3v2 header");

		let Some(header) = bytes.get(..ID3V2_HEADER_SIZE) else {
			err!(SizeMismatch);
		};

		if &header[..3] != b"ID3" {
			err!(FakeTag);
		}

		// Version is stored as [major, minor], but here we don't care about minor revisions unless there's an error.
		let version = match header[3] {
			2 => Id3v2Version::V2,
			3 => Id3v2Version::V3,
			4 => Id3v2Version::V4,
			major => {
				return Err(
					Id3v2Error::new(Id3v2ErrorKind::BadId3v2Version(major, header[4])).into(),
				);
			},
		};

		let flags = header[5];

		// Compression was a flag only used in ID3v2.2 (bit 2).
		// No compression scheme was ever defined for ID3v2.2, such tags are meant to be ignored.
		if version == Id3v2Version::V2 && flags & 0x40 == 0x40 {
			return Err(Id3v2Error::new(Id3v2ErrorKind::V2Compression).into());
		}

		let flags_parsed = Id3v2TagFlags {
			unsynchronisation: flags & 0x80 == 0x80,
			extended_header: version != Id3v2Version::V2 && flags & 0x40 == 0x40,
			experimental: version != Id3v2Version::V2 && flags & 0x20 == 0x20,
			footer: version == Id3v2Version::V4 && flags & 0x10 == 0x10,
		};

		let size = BigEndian::read_u32(&header[6..]).unsynch();

		Ok(Id3v2Header {
			version,
			revision: header[4],
			flags: flags_parsed,
			size,
		})
	}

	/// The total size of the tag, including the header and footer
	pub(crate) fn full_tag_size(&self) -> u64 {
		u64::from(self.size) + 10 + if self.flags.footer { 10 } else { 0 }
	}

	/// Render the header, or the footer if `footer` is set
	pub(crate) fn as_bytes(&self, footer: bool) -> Result<[u8; 10]> {
		let mut bytes = [0; ID3V2_HEADER_SIZE];

		let identifier = if footer { b"3DI" } else { b"ID3" };
		bytes[..3].copy_from_slice(identifier);
		bytes[3] = self.version.major();
		bytes[4] = self.revision;
		bytes[5] = self.flags.as_byte(self.version);
		BigEndian::write_u32(&mut bytes[6..], self.size.synch()?);

		Ok(bytes)
	}
}
