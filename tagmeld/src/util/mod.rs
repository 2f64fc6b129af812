pub(crate) mod alloc;
pub mod io;
pub(crate) mod text;

use crate::error::Result;
use crate::macros::err;

/// Split `len` bytes off the front of `data`
pub(crate) fn take<'a>(data: &mut &'a [u8], len: usize) -> Result<&'a [u8]> {
	if len > data.len() {
		err!(SizeMismatch);
	}

	let (taken, rest) = data.split_at(len);
	*data = rest;
	Ok(taken)
}
