use crate::file::FileType;
use crate::picture::PictureStore;
use crate::tag::{BaseField, Tag, TagFormat};

/// An edit of a base field
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldChange {
	/// The field was set, possibly to an empty value
	Set(String),
	/// The field was removed
	Removed,
}

/// An edit of an additional field
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdditionalChange {
	/// A key was added or its value changed
	Set {
		/// The key, in the spelling of the edited tag
		key: String,
		/// The new value
		value: String,
		/// Whether the key already existed, making this an update
		existed_before: bool,
	},
	/// A key was removed
	Removed {
		/// The key, in the spelling of the original tag
		key: String,
	},
}

/// The difference between two [`Tag`]s
///
/// This is what gets written to the tags of a file on save. Anything not listed here is left
/// as it was in each tag, which is what keeps the formats that disagree with the merged view
/// intact.
///
/// # Examples
///
/// ```rust
/// use tagmeld::rewrite::{ChangeSet, FieldChange};
/// use tagmeld::tag::{BaseField, Tag};
///
/// let mut before = Tag::new();
/// before.set_artist("Artist");
/// before.set_title("Title");
///
/// let mut after = before.clone();
/// after.set_title("New title");
///
/// let changes = ChangeSet::diff(&before, &after);
/// assert_eq!(
/// 	changes.fields(),
/// 	&[(BaseField::Title, FieldChange::Set(String::from("New title")))]
/// );
/// assert!(ChangeSet::diff(&before, &before).is_empty());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeSet {
	fields: Vec<(BaseField, FieldChange)>,
	additional: Vec<AdditionalChange>,
	pictures: Option<PictureStore>,
}

impl ChangeSet {
	/// Compute the edits that turn `before` into `after`
	pub fn diff(before: &Tag, after: &Tag) -> Self {
		let mut fields = Vec::new();
		for field in BaseField::ALL {
			match (before.get(field), after.get(field)) {
				(old, Some(new)) if old != Some(new) => {
					fields.push((field, FieldChange::Set(new.to_owned())));
				},
				(Some(_), None) => fields.push((field, FieldChange::Removed)),
				_ => {},
			}
		}

		let mut additional = Vec::new();
		for (key, value) in after.additional().iter() {
			match before.additional().get(key) {
				Some(old) if old == value => {},
				old => additional.push(AdditionalChange::Set {
					key: key.to_owned(),
					value: value.to_owned(),
					existed_before: old.is_some(),
				}),
			}
		}

		for (key, _) in before.additional().iter() {
			if !after.additional().contains_key(key) {
				additional.push(AdditionalChange::Removed {
					key: key.to_owned(),
				});
			}
		}

		let pictures = (before.pictures() != after.pictures()).then(|| after.pictures().clone());

		Self {
			fields,
			additional,
			pictures,
		}
	}

	/// Whether there is nothing to write
	pub fn is_empty(&self) -> bool {
		self.fields.is_empty() && self.additional.is_empty() && self.pictures.is_none()
	}

	/// The base field edits
	pub fn fields(&self) -> &[(BaseField, FieldChange)] {
		&self.fields
	}

	/// The additional field edits
	pub fn additional(&self) -> &[AdditionalChange] {
		&self.additional
	}

	/// The new picture list, if it changed
	pub fn pictures(&self) -> Option<&PictureStore> {
		self.pictures.as_ref()
	}

	/// Apply the edits to the decoded tag of the target `format`
	///
	/// Edits that the codec of `format` can't store are skipped. An updated additional key is
	/// only written to the targets already holding it, unless none of them do.
	///
	/// Pictures go back to the tag they were read from, so a removed picture only leaves its own
	/// tag. Pictures with no such target are written to the first target able to store them.
	pub(crate) fn apply(&self, format: TagFormat, tag: &mut Tag, targets: &Targets<'_>) {
		let codec = crate::registry::codec(format);

		for (field, change) in &self.fields {
			if !codec.supports_field(*field) {
				log::debug!("{format:?} can't store {field:?}, skipping");
				continue;
			}

			match change {
				FieldChange::Set(value) => {
					tag.insert(*field, value.as_str());
				},
				FieldChange::Removed => {
					tag.remove(*field);
				},
			}
		}

		if codec.supports_additional_fields() {
			for change in &self.additional {
				match change {
					AdditionalChange::Set {
						key,
						value,
						existed_before,
					} => {
						if !existed_before
							|| tag.additional().contains_key(key)
							|| !targets.hold_key(key)
						{
							tag.additional_mut().insert(key.as_str(), value.as_str());
						}
					},
					AdditionalChange::Removed { key } => {
						tag.additional_mut().remove(key);
					},
				}
			}
		}

		if let Some(pictures) = &self.pictures {
			if codec.supports_pictures(targets.file_type) {
				let takes_new = targets.picture_target() == Some(format);
				let routed = pictures
					.iter_with_origin()
					.filter(|(_, origin)| match origin {
						Some(origin) if targets.store_pictures(*origin) => *origin == format,
						_ => takes_new,
					})
					.map(|(picture, _)| picture.clone())
					.collect::<PictureStore>();

				log::debug!("Writing {} picture(s) to the {format:?} tag", routed.len());
				tag.set_pictures(routed);
			}
		}
	}
}

/// The tags a save writes to, most authoritative first
///
/// Each entry holds the currently decoded tag, or `None` for a tag being added.
pub(crate) struct Targets<'a> {
	file_type: FileType,
	tags: Vec<(TagFormat, Option<&'a Tag>)>,
}

impl<'a> Targets<'a> {
	pub(crate) fn new(file_type: FileType, tags: Vec<(TagFormat, Option<&'a Tag>)>) -> Self {
		Self { file_type, tags }
	}

	fn hold_key(&self, key: &str) -> bool {
		self.tags
			.iter()
			.any(|(_, tag)| tag.is_some_and(|tag| tag.additional().contains_key(key)))
	}

	fn store_pictures(&self, format: TagFormat) -> bool {
		self.tags.iter().any(|(target, _)| *target == format)
			&& crate::registry::codec(format).supports_pictures(self.file_type)
	}

	fn picture_target(&self) -> Option<TagFormat> {
		self.tags
			.iter()
			.map(|(format, _)| *format)
			.find(|format| crate::registry::codec(*format).supports_pictures(self.file_type))
	}
}

#[cfg(test)]
mod tests {
	use super::{AdditionalChange, ChangeSet, FieldChange, Targets};
	use crate::file::FileType;
	use crate::picture::{MimeType, Picture, PictureType};
	use crate::tag::{BaseField, Tag, TagFormat};

	fn base() -> Tag {
		let mut tag = Tag::new();
		tag.set_artist("Artist");
		tag.set_album("Album");
		tag.additional_mut().insert("TENC", "Encoder");
		tag.additional_mut().insert("MOOD", "calm");
		tag
	}

	#[test_log::test]
	fn diff_fields() {
		let mut edited = base();
		edited.remove_album();
		edited.insert(BaseField::Year, "");

		let changes = ChangeSet::diff(&base(), &edited);
		assert_eq!(
			changes.fields(),
			&[
				(BaseField::Album, FieldChange::Removed),
				(BaseField::Year, FieldChange::Set(String::new())),
			]
		);
		assert!(changes.additional().is_empty());
		assert!(changes.pictures().is_none());
	}

	#[test_log::test]
	fn diff_additional() {
		let mut edited = base();
		edited.additional_mut().remove("tenc");
		edited.additional_mut().insert("mood", "tense");
		edited.additional_mut().insert("ABCD", "efgh");

		let changes = ChangeSet::diff(&base(), &edited);
		assert_eq!(
			changes.additional(),
			&[
				AdditionalChange::Set {
					key: String::from("MOOD"),
					value: String::from("tense"),
					existed_before: true,
				},
				AdditionalChange::Set {
					key: String::from("ABCD"),
					value: String::from("efgh"),
					existed_before: false,
				},
				AdditionalChange::Removed {
					key: String::from("TENC"),
				},
			]
		);
	}

	fn picture(pic_type: PictureType, byte: u8) -> Picture {
		Picture::new_unchecked(pic_type, Some(MimeType::Png), None, vec![byte])
	}

	#[test_log::test]
	fn apply_skips_unsupported() {
		let mut edited = base();
		edited.set_composer("Composer");
		edited.set_title("Title");
		edited.additional_mut().insert("ABCD", "efgh");
		edited.pictures_mut().push(picture(PictureType::CoverFront, 1));

		let changes = ChangeSet::diff(&base(), &edited);
		let targets = Targets::new(
			FileType::Mpeg,
			vec![(TagFormat::Id3v1, None), (TagFormat::Id3v2, None)],
		);

		let mut id3v1 = Tag::new();
		changes.apply(TagFormat::Id3v1, &mut id3v1, &targets);
		assert_eq!(id3v1.title(), Some("Title"));
		assert_eq!(id3v1.composer(), None);
		assert!(id3v1.additional().is_empty());
		assert!(id3v1.pictures().is_empty());

		let mut id3v2 = Tag::new();
		changes.apply(TagFormat::Id3v2, &mut id3v2, &targets);
		assert_eq!(id3v2.composer(), Some("Composer"));
		assert_eq!(id3v2.additional().get("ABCD"), Some("efgh"));
		assert_eq!(id3v2.pictures().len(), 1);
	}

	#[test_log::test]
	fn updates_go_to_holders() {
		let mut edited = base();
		edited.additional_mut().insert("MOOD", "tense");
		let changes = ChangeSet::diff(&base(), &edited);

		let mut holder = Tag::new();
		holder.additional_mut().insert("MOOD", "calm");
		let empty = Tag::new();

		// Another target holds the key
		let targets = Targets::new(
			FileType::Mpeg,
			vec![(TagFormat::Ape, Some(&holder)), (TagFormat::Id3v2, Some(&empty))],
		);
		let mut tag = Tag::new();
		changes.apply(TagFormat::Id3v2, &mut tag, &targets);
		assert!(tag.additional().is_empty());

		// Nobody holds it
		let targets = Targets::new(FileType::Mpeg, vec![(TagFormat::Id3v2, Some(&empty))]);
		changes.apply(TagFormat::Id3v2, &mut tag, &targets);
		assert_eq!(tag.additional().get("MOOD"), Some("tense"));
	}

	#[test_log::test]
	fn pictures_return_to_their_tag() {
		let mut id3v2 = Tag::new();
		id3v2.pictures_mut().push(picture(PictureType::CoverFront, 1));
		let mut ape = Tag::new();
		ape.pictures_mut().push(picture(PictureType::CoverBack, 2));

		let mut merged = Tag::new();
		merged
			.pictures_mut()
			.push_from(picture(PictureType::CoverFront, 1), TagFormat::Id3v2);
		merged
			.pictures_mut()
			.push_from(picture(PictureType::CoverBack, 2), TagFormat::Ape);

		let mut edited = merged.clone();
		edited.pictures_mut().remove(0);
		edited.pictures_mut().push(picture(PictureType::Media, 3));

		let changes = ChangeSet::diff(&merged, &edited);
		let targets = Targets::new(
			FileType::Mpeg,
			vec![(TagFormat::Id3v2, Some(&id3v2)), (TagFormat::Ape, Some(&ape))],
		);

		let mut new_id3v2 = id3v2.clone();
		changes.apply(TagFormat::Id3v2, &mut new_id3v2, &targets);
		assert_eq!(new_id3v2.pictures().len(), 1);
		assert_eq!(
			new_id3v2.pictures().get(0).map(Picture::pic_type),
			Some(PictureType::Media)
		);

		// Untouched
		let mut new_ape = ape.clone();
		changes.apply(TagFormat::Ape, &mut new_ape, &targets);
		assert_eq!(new_ape, ape);
	}

	#[test_log::test]
	fn pictures_without_a_target_go_to_the_first_capable_one() {
		let mut merged = Tag::new();
		merged
			.pictures_mut()
			.push_from(picture(PictureType::CoverFront, 1), TagFormat::Ape);

		let mut edited = merged.clone();
		edited.pictures_mut().push(picture(PictureType::Media, 2));

		// The APE tag is not being written
		let changes = ChangeSet::diff(&merged, &edited);
		let targets = Targets::new(
			FileType::Mpeg,
			vec![(TagFormat::Id3v1, None), (TagFormat::Id3v2, None)],
		);

		let mut id3v2 = Tag::new();
		changes.apply(TagFormat::Id3v2, &mut id3v2, &targets);
		assert_eq!(id3v2.pictures().len(), 2);
	}
}
