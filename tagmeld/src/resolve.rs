//! Combining the tags of a file into one logical [`Tag`]
//!
//! Every format present in a file is decoded into its own [`Tag`]. Which of them the caller sees
//! is decided by the [`MergeOptions`]:
//!
//! * Formats missing from the [`TagPriority`](crate::config::TagPriority) contribute nothing.
//! * In single-tag mode, base fields come from the most authoritative present tag only, even when
//!   they are absent or empty there.
//! * With cross-reading, each base field is taken from the most authoritative tag that has a
//!   non-empty value for it. A field that is empty or missing in every tag is absent.
//! * Additional fields and pictures are always combined from every listed tag. On a key collision,
//!   the more authoritative value wins. Each merged picture remembers the tag it came from, see
//!   [`PictureStore::origin`](crate::picture::PictureStore::origin).

use crate::config::MergeOptions;
use crate::tag::{BaseField, Tag, TagFormat};

/// Merge the tags of a file
///
/// # Examples
///
/// ```rust
/// use tagmeld::config::MergeOptions;
/// use tagmeld::resolve::resolve;
/// use tagmeld::tag::{Tag, TagFormat};
///
/// let mut id3v2 = Tag::new();
/// id3v2.set_artist("");
/// id3v2.set_year(1984);
///
/// let mut id3v1 = Tag::new();
/// id3v1.set_artist("Nintendo Sound Scream");
///
/// let tags = [(TagFormat::Id3v1, &id3v1), (TagFormat::Id3v2, &id3v2)];
///
/// let merged = resolve(&tags, &MergeOptions::new());
/// assert_eq!(merged.artist(), Some("Nintendo Sound Scream"));
/// assert_eq!(merged.year(), Some(1984));
///
/// let merged = resolve(&tags, &MergeOptions::new().single_tag(true));
/// assert_eq!(merged.artist(), Some(""));
/// ```
pub fn resolve(tags: &[(TagFormat, &Tag)], options: &MergeOptions) -> Tag {
	let priority = options.tag_priority();

	let mut ranked = tags
		.iter()
		.filter_map(|(format, tag)| priority.rank(*format).map(|rank| (rank, *format, *tag)))
		.collect::<Vec<_>>();
	ranked.sort_by_key(|(rank, ..)| *rank);

	log::debug!(
		"Merging {} of {} tag(s), single tag: {}",
		ranked.len(),
		tags.len(),
		options.single_tag_active()
	);

	let mut merged = Tag::new();

	if options.single_tag_active() {
		if let Some((_, _, tag)) = ranked.first() {
			for (field, value) in tag.fields() {
				merged.insert(field, value);
			}
		}
	} else {
		for field in BaseField::ALL {
			let value = ranked
				.iter()
				.filter_map(|(_, _, tag)| tag.get(field))
				.find(|value| !value.is_empty());

			// Empty everywhere means absent
			if let Some(value) = value {
				merged.insert(field, value);
			}
		}
	}

	for (_, format, tag) in &ranked {
		for (key, value) in tag.additional().iter() {
			if !merged.additional().contains_key(key) {
				merged.additional_mut().insert(key, value);
			}
		}

		// Saving uses the origin to send picture edits back to the right tag
		for picture in tag.pictures().iter() {
			merged.pictures_mut().push_from(picture.clone(), *format);
		}
	}

	merged
}
