use super::layout::{Container, TagLayout};
use super::plan::{PresenceStatus, SavePlan};
use crate::config::WriteOptions;
use crate::error::Result;
use crate::flac::FlacLayout;
use crate::macros::err;
use crate::ogg::OggLayout;
use crate::picture::PictureStore;
use crate::tag::TagFormat;

/// Build the new file from the original bytes and a [`SavePlan`]
pub(super) fn write(
	original: &[u8],
	layout: &TagLayout,
	plan: &SavePlan,
	write_options: &WriteOptions,
) -> Result<Vec<u8>> {
	for entry in &plan.entries {
		if !layout.file_type.supports_format(entry.format) {
			err!(Consistency("planned a tag the file type can't hold"));
		}
	}

	let mut out = Vec::with_capacity(original.len());

	write_region(&mut out, original, layout, plan, TagFormat::Id3v2, write_options)?;

	match &layout.container {
		Container::Mpeg { lyrics3v2 } => {
			out.extend_from_slice(&original[layout.audio.clone()]);
			write_region(&mut out, original, layout, plan, TagFormat::Ape, write_options)?;

			if let Some(lyrics3v2) = lyrics3v2 {
				out.extend_from_slice(&original[lyrics3v2.clone()]);
			}

			write_region(&mut out, original, layout, plan, TagFormat::Id3v1, write_options)?;
		},
		Container::Flac(flac) => {
			write_flac_metadata(&mut out, original, layout, flac, plan, write_options)?;
			out.extend_from_slice(&original[layout.audio.clone()]);
		},
		Container::Ogg(ogg) => write_ogg_stream(&mut out, original, ogg, plan, write_options)?,
	}

	log::debug!("Rewrote file, {} -> {} bytes", original.len(), out.len());
	Ok(out)
}

/// Write the tag of `format` in its place, if there is one
fn write_region(
	out: &mut Vec<u8>,
	original: &[u8],
	layout: &TagLayout,
	plan: &SavePlan,
	format: TagFormat,
	write_options: &WriteOptions,
) -> Result<()> {
	let region = layout.presence(format).map(|presence| presence.region.clone());

	let Some(entry) = plan.entry(format) else {
		if region.is_some() {
			err!(Consistency("a present tag is missing from the save plan"));
		}

		return Ok(());
	};

	match entry.status {
		PresenceStatus::Unchanged => {
			let Some(region) = region else {
				err!(Consistency("an unchanged tag has no original region"));
			};

			out.extend_from_slice(&original[region]);
		},
		PresenceStatus::Removed => log::debug!("Removing {format:?} tag"),
		PresenceStatus::Modified | PresenceStatus::Added => {
			let Some(encoded) = entry.encoded.clone() else {
				err!(Consistency("a modified tag was never encoded"));
			};

			let padded = pad(format, encoded, region.map(|region| region.len()), write_options)?;
			out.extend_from_slice(&padded);
		},
	}

	Ok(())
}

/// Pad an encoded tag
///
/// A tag that fits in its original region is padded to its exact size. Anything else gets the
/// preferred padding.
fn pad(
	format: TagFormat,
	mut encoded: Vec<u8>,
	original_len: Option<usize>,
	write_options: &WriteOptions,
) -> Result<Vec<u8>> {
	if !write_options.padding {
		return Ok(encoded);
	}

	let codec = crate::registry::codec(format);

	if let Some(original_len) = original_len {
		if encoded.len() == original_len {
			return Ok(encoded);
		}

		if let Some(slack) = original_len
			.checked_sub(encoded.len())
			.and_then(|slack| u32::try_from(slack).ok())
		{
			if codec.pad(&mut encoded, slack)? {
				log::debug!("Reused {slack} bytes of {format:?} padding");
				return Ok(encoded);
			}
		}
	}

	if let Some(preferred_padding) = write_options.preferred_padding_bytes() {
		codec.pad(&mut encoded, preferred_padding)?;
	}

	Ok(encoded)
}

fn write_flac_metadata(
	out: &mut Vec<u8>,
	original: &[u8],
	layout: &TagLayout,
	flac: &FlacLayout,
	plan: &SavePlan,
	write_options: &WriteOptions,
) -> Result<()> {
	let status = plan
		.status(TagFormat::VorbisComments)
		.unwrap_or(PresenceStatus::Unchanged);

	let metadata = match status {
		PresenceStatus::Unchanged => {
			out.extend_from_slice(&original[flac.marker..flac.audio_offset()]);
			return Ok(());
		},
		PresenceStatus::Removed => flac.strip(original)?,
		PresenceStatus::Modified | PresenceStatus::Added => {
			let Some(entry) = plan.entry(TagFormat::VorbisComments) else {
				err!(Consistency("a modified tag is missing from the save plan"));
			};

			let (Some(comment), Some(tag)) = (entry.encoded.clone(), entry.tag.as_ref()) else {
				err!(Consistency("a modified tag was never encoded"));
			};

			let empty = PictureStore::new();
			let prior_pictures = layout
				.presence(TagFormat::VorbisComments)
				.and_then(|presence| presence.tag())
				.map_or(&empty, |tag| tag.pictures());

			flac.rebuild(
				original,
				comment,
				tag.pictures(),
				prior_pictures,
				write_options,
			)?
		},
	};

	out.extend_from_slice(&metadata);
	Ok(())
}

/// Write the whole stream, the audio pages are renumbered if needed
fn write_ogg_stream(
	out: &mut Vec<u8>,
	original: &[u8],
	ogg: &OggLayout,
	plan: &SavePlan,
	write_options: &WriteOptions,
) -> Result<()> {
	let status = plan
		.status(TagFormat::VorbisComments)
		.unwrap_or(PresenceStatus::Unchanged);

	let stream = match status {
		PresenceStatus::Unchanged => {
			out.extend_from_slice(original);
			return Ok(());
		},
		PresenceStatus::Removed => ogg.strip(original)?,
		PresenceStatus::Modified | PresenceStatus::Added => {
			let Some(comment) = plan
				.entry(TagFormat::VorbisComments)
				.and_then(|entry| entry.encoded.as_deref())
			else {
				err!(Consistency("a modified tag was never encoded"));
			};

			ogg.rebuild(original, comment, write_options)?
		},
	};

	out.extend_from_slice(&stream);
	Ok(())
}
