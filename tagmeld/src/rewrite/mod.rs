//! Producing new file bytes from edits
//!
//! Saving works on an in-memory copy of the file:
//!
//! 1. The edited tag is diffed against the tag it was derived from, giving a [`ChangeSet`].
//! 2. The changes are applied to the decoded tag of every target format, see [`plan`].
//! 3. Every tag is either copied, re-encoded, added or dropped, and the file is reassembled around
//!    the untouched audio.
//!
//! A tag unaffected by the changes is copied byte for byte. As such, saving a file without any
//! edits produces the exact bytes it was read from.
//!
//! ## Padding
//!
//! When [`WriteOptions::padding`](crate::config::WriteOptions::padding) is enabled, a re-encoded
//! tag that fits in its original region is padded to the original size, leaving the rest of the
//! file in place. Otherwise the tag gets the preferred amount of padding, and everything after it
//! moves.
//!
//! Only ID3v2 tags, FLAC metadata and OGG comment packets can hold padding.

mod changes;
mod layout;
mod plan;
mod write;

pub use changes::{AdditionalChange, ChangeSet, FieldChange};
pub use layout::{TagLayout, TagPresence};
pub use plan::{PresenceStatus, SavePlan, plan};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::macros::err;
use crate::tag::{Tag, TagFormat};

/// Write an edited tag to a file
///
/// The edits are computed against the merged tags of `layout`, using `config`'s
/// [`MergeOptions`](crate::config::MergeOptions). See [`plan`] for which formats they are
/// written to.
///
/// # Errors
///
/// * `original` is not the file `layout` describes, see [`ErrorKind::Consistency`](crate::error::ErrorKind::Consistency)
/// * A value can't be represented in one of the target formats
/// * A tag would exceed the size limit of its format
pub fn rewrite(
	original: &[u8],
	layout: &TagLayout,
	edited: &Tag,
	config: &EngineConfig,
) -> Result<Vec<u8>> {
	let base = layout.resolve(&config.merge);
	rewrite_from(original, layout, &base, edited, config)
}

pub(crate) fn rewrite_from(
	original: &[u8],
	layout: &TagLayout,
	base: &Tag,
	edited: &Tag,
	config: &EngineConfig,
) -> Result<Vec<u8>> {
	verify_layout(original, layout)?;

	let plan = plan(layout, base, edited, config)?;
	apply(original, layout, &plan, config)
}

/// Write a [`SavePlan`] created by [`plan`]
///
/// # Errors
///
/// * `original` is not the file `layout` describes
/// * `plan` was created for a different layout
pub fn apply(
	original: &[u8],
	layout: &TagLayout,
	plan: &SavePlan,
	config: &EngineConfig,
) -> Result<Vec<u8>> {
	verify_layout(original, layout)?;

	if plan.is_unchanged() {
		return Ok(original.to_vec());
	}

	write::write(original, layout, plan, &config.write)
}

/// Remove the tag of `format` from a file
///
/// The file shrinks by exactly the size of the tag. In FLAC files, this is the `VORBIS_COMMENT`
/// block and every `PICTURE` block. An OGG stream can't lose its comment packet, so every comment
/// is dropped and only the vendor string is kept. Removing a format that isn't present returns
/// the original bytes.
///
/// # Errors
///
/// `original` is not the file `layout` describes
pub fn remove(
	original: &[u8],
	layout: &TagLayout,
	format: TagFormat,
	config: &EngineConfig,
) -> Result<Vec<u8>> {
	verify_layout(original, layout)?;

	if !layout.contains(format) {
		log::debug!("No {format:?} tag to remove");
		return Ok(original.to_vec());
	}

	let plan = SavePlan::removal(layout, format);
	apply(original, layout, &plan, config)
}

fn verify_layout(original: &[u8], layout: &TagLayout) -> Result<()> {
	if original.len() != layout.file_len {
		err!(Consistency("file length doesn't match its layout"));
	}

	let out_of_bounds = layout
		.presences()
		.any(|presence| presence.region.end > original.len());
	if out_of_bounds || layout.audio.end > original.len() {
		err!(Consistency("layout region lies outside of the file"));
	}

	Ok(())
}
