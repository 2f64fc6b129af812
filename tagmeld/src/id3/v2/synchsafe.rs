//! Utilities for working with unsynchronised ID3v2 content
//!
//! Unsynchronisation inserts a `0x00` after every `0xFF` that could be mistaken for an MPEG frame
//! sync. Sizes in ID3v2.4 (and the tag header of every version) are "synchsafe": only the lower 7
//! bits of each byte are used.

use crate::error::Result;
use crate::macros::err;

/// An integer that can be converted to and from synchsafe variants
pub trait SynchsafeInteger: Sized {
	/// Create a synchsafe integer
	///
	/// # Errors
	///
	/// `self` doesn't fit in 28 bits
	///
	/// # Examples
	///
	/// ```rust
	/// use tagmeld::id3::v2::SynchsafeInteger;
	///
	/// # fn main() -> tagmeld::error::Result<()> {
	/// // Maximum value we can represent in a synchsafe u32
	/// let unsynch_number = 0xFFF_FFFF_u32;
	/// let synch_number = unsynch_number.synch()?;
	///
	/// // Each byte should have 7 set bits and an MSB of 0
	/// assert_eq!(synch_number, 0b01111111_01111111_01111111_01111111_u32);
	/// # Ok(()) }
	/// ```
	fn synch(self) -> Result<Self>;

	/// Unsynchronise a synchsafe integer
	///
	/// # Examples
	///
	/// ```rust
	/// use tagmeld::id3::v2::SynchsafeInteger;
	///
	/// assert_eq!(0x7F7F_7F7F_u32.unsynch(), 0xFFF_FFFF);
	/// ```
	fn unsynch(self) -> Self;
}

impl SynchsafeInteger for u32 {
	fn synch(self) -> Result<Self> {
		if self > 0x0FFF_FFFF {
			err!(TooMuchData);
		}

		let n = self;
		Ok((n & 0x7F)
			| ((n & (0x7F << 7)) << 1)
			| ((n & (0x7F << 14)) << 2)
			| ((n & (0x7F << 21)) << 3))
	}

	fn unsynch(self) -> Self {
		let u = self;
		((u & 0x7F00_0000) >> 3) | ((u & 0x7F_0000) >> 2) | ((u & 0x7F00) >> 1) | (u & 0x7F)
	}
}

/// Whether a raw big endian value is a valid synchsafe integer
pub(crate) fn is_synchsafe(bytes: [u8; 4]) -> bool {
	bytes.iter().all(|b| b & 0x80 == 0)
}

/// Remove unsynchronisation, every `0xFF 0x00` pair becomes `0xFF`
pub(crate) fn remove_unsynchronisation(content: &[u8]) -> Vec<u8> {
	let mut out = Vec::with_capacity(content.len());

	let mut encountered_ff = false;
	for byte in content.iter().copied() {
		if encountered_ff {
			encountered_ff = false;

			// Only skip the byte if this is valid unsynchronisation
			if byte == 0 {
				continue;
			}
		}

		out.push(byte);
		encountered_ff = byte == 0xFF;
	}

	out
}
