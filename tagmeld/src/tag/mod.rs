//! The format-agnostic field model
//!
//! A [`Tag`] holds three kinds of data:
//!
//! * Base fields, keyed by [`BaseField`]. Each field is absent, present, or present but empty.
//! * [`AdditionalFields`], free-form key/value pairs.
//! * A [`PictureStore`].
//!
//! Values are stored as text, exactly as they are rendered on file. This is what allows a
//! track number stored as `"03"` to keep its leading zero through a round trip. The typed accessors,
//! such as [`Tag::track`], parse on demand.

mod additional;
mod field;
mod format;
pub(crate) mod number;

pub use additional::AdditionalFields;
pub use field::{BaseField, FieldKind};
pub use format::TagFormat;

use crate::picture::PictureStore;

use std::collections::BTreeMap;

macro_rules! impl_text_accessors {
	($($name:ident => $field:ident),+ $(,)?) => {
		paste::paste! {
			$(
				#[doc = "Returns the " $name " field, see [`BaseField::" $field "`]"]
				pub fn $name(&self) -> Option<&str> {
					self.get(BaseField::$field)
				}

				#[doc = "Sets the " $name " field"]
				pub fn [<set_ $name>](&mut self, value: impl Into<String>) {
					self.insert(BaseField::$field, value);
				}

				#[doc = "Removes the " $name " field, returning its value"]
				pub fn [<remove_ $name>](&mut self) -> Option<String> {
					self.remove(BaseField::$field)
				}
			)+
		}
	};
}

macro_rules! impl_number_accessors {
	($($name:ident => $field:ident),+ $(,)?) => {
		paste::paste! {
			$(
				#[doc = "Returns the " $name " field as a number, see [`BaseField::" $field "`]"]
				///
				/// This is `None` if the field is absent, empty, or not a number.
				pub fn $name(&self) -> Option<u32> {
					self.get(BaseField::$field).and_then(|value| value.trim().parse().ok())
				}

				#[doc = "Sets the " $name " field"]
				pub fn [<set_ $name>](&mut self, value: u32) {
					self.insert(BaseField::$field, value.to_string());
				}

				#[doc = "Removes the " $name " field, returning its text"]
				pub fn [<remove_ $name>](&mut self) -> Option<String> {
					self.remove(BaseField::$field)
				}
			)+
		}
	};
}

/// A format-agnostic set of metadata
///
/// This is used both for the merged view of a file and for the contents of a single tag.
///
/// # Examples
///
/// ```rust
/// use tagmeld::tag::{BaseField, Tag};
///
/// let mut tag = Tag::new();
/// tag.set_artist("Nintendo Sound Scream");
/// tag.set_track(3);
///
/// assert_eq!(tag.get(BaseField::Artist), Some("Nintendo Sound Scream"));
/// assert_eq!(tag.get(BaseField::TrackNumber), Some("3"));
///
/// // Present, but empty
/// tag.insert(BaseField::Year, "");
/// assert!(tag.contains(BaseField::Year));
/// assert_eq!(tag.year(), None);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tag {
	fields: BTreeMap<BaseField, String>,
	additional: AdditionalFields,
	pictures: PictureStore,
}

impl Tag {
	/// Create an empty `Tag`
	pub fn new() -> Self {
		Self::default()
	}

	/// Get the text of a base field
	///
	/// This is `Some("")` for fields that are present but empty.
	pub fn get(&self, field: BaseField) -> Option<&str> {
		self.fields.get(&field).map(String::as_str)
	}

	/// Whether a base field is present, including present but empty
	pub fn contains(&self, field: BaseField) -> bool {
		self.fields.contains_key(&field)
	}

	/// Set the text of a base field, returning the previous text
	///
	/// An empty string marks the field as present but empty.
	pub fn insert(&mut self, field: BaseField, value: impl Into<String>) -> Option<String> {
		self.fields.insert(field, value.into())
	}

	/// Remove a base field, returning its text
	pub fn remove(&mut self, field: BaseField) -> Option<String> {
		self.fields.remove(&field)
	}

	/// Iterate over the present base fields
	pub fn fields(&self) -> impl Iterator<Item = (BaseField, &str)> {
		self.fields.iter().map(|(k, v)| (*k, v.as_str()))
	}

	/// The additional fields
	pub fn additional(&self) -> &AdditionalFields {
		&self.additional
	}

	/// Mutable access to the additional fields
	pub fn additional_mut(&mut self) -> &mut AdditionalFields {
		&mut self.additional
	}

	/// The pictures
	pub fn pictures(&self) -> &PictureStore {
		&self.pictures
	}

	/// Mutable access to the pictures
	pub fn pictures_mut(&mut self) -> &mut PictureStore {
		&mut self.pictures
	}

	/// Replace every picture
	pub fn set_pictures(&mut self, pictures: PictureStore) {
		self.pictures = pictures;
	}

	/// Whether the tag holds nothing at all
	///
	/// A present but empty base field counts as content.
	pub fn is_empty(&self) -> bool {
		self.fields.is_empty() && self.additional.is_empty() && self.pictures.is_empty()
	}

	impl_text_accessors! {
		title => Title,
		artist => Artist,
		album_artist => AlbumArtist,
		album => Album,
		composer => Composer,
		conductor => Conductor,
		comment => Comment,
		genre => Genre,
		copyright => Copyright,
		publisher => Publisher,
		original_artist => OriginalArtist,
		original_album => OriginalAlbum,
	}

	impl_number_accessors! {
		track => TrackNumber,
		track_total => TrackTotal,
		disc => DiscNumber,
		disc_total => DiscTotal,
	}

	/// Returns the year, see [`BaseField::Year`]
	///
	/// Dates are stored as text, this parses the leading digits. `"1984-05-01"` is `1984`.
	pub fn year(&self) -> Option<u32> {
		let value = self.get(BaseField::Year)?.trim();
		let end = value
			.find(|c: char| !c.is_ascii_digit())
			.unwrap_or(value.len());

		value[..end].parse().ok()
	}

	/// Sets the year
	pub fn set_year(&mut self, year: u32) {
		self.insert(BaseField::Year, year.to_string());
	}

	/// Removes the year, returning its text
	pub fn remove_year(&mut self) -> Option<String> {
		self.remove(BaseField::Year)
	}
}

#[cfg(test)]
mod tests {
	use super::{BaseField, Tag};
	use crate::picture::{MimeType, Picture, PictureType};

	#[test_log::test]
	fn typed_accessors() {
		let mut tag = Tag::new();
		tag.insert(BaseField::TrackNumber, "03");
		tag.insert(BaseField::Year, "1984-05-01");

		assert_eq!(tag.track(), Some(3));
		assert_eq!(tag.get(BaseField::TrackNumber), Some("03"));
		assert_eq!(tag.year(), Some(1984));

		tag.insert(BaseField::DiscNumber, "A");
		assert_eq!(tag.disc(), None);
		assert!(tag.contains(BaseField::DiscNumber));

		assert_eq!(tag.remove_track().as_deref(), Some("03"));
		assert_eq!(tag.track(), None);
	}

	#[test_log::test]
	fn clone_is_deep() {
		let mut tag = Tag::new();
		tag.pictures_mut().push(Picture::new_unchecked(
			PictureType::CoverFront,
			Some(MimeType::Png),
			None,
			vec![1, 2, 3],
		));

		let mut copy = tag.clone();
		copy.pictures_mut().remove(0);

		assert_eq!(tag.pictures().len(), 1);
		assert!(copy.pictures().is_empty());
		assert_ne!(tag, copy);
	}

	#[test_log::test]
	fn emptiness() {
		let mut tag = Tag::new();
		assert!(tag.is_empty());

		tag.insert(BaseField::Year, "");
		assert!(!tag.is_empty());
	}
}
