use super::{Picture, PictureType};
use crate::tag::TagFormat;

use std::hash::{Hash, Hasher};

/// An ordered collection of [`Picture`]s
///
/// Pictures are addressed by index. Several pictures may share a [`PictureType`].
///
/// Pictures merged from several tags remember the [`TagFormat`] they were read from, see
/// [`PictureStore::origin`]. The origin is not part of equality.
///
/// # Examples
///
/// ```rust
/// use tagmeld::picture::{MimeType, Picture, PictureStore, PictureType};
///
/// let mut store = PictureStore::new();
/// store.push(Picture::new_unchecked(PictureType::CoverFront, Some(MimeType::Png), None, vec![1]));
/// store.push(Picture::new_unchecked(PictureType::CoverBack, Some(MimeType::Png), None, vec![2]));
///
/// let removed = store.remove(0);
/// assert_eq!(removed.map(|p| p.pic_type()), Some(PictureType::CoverFront));
/// assert_eq!(store.first_of_type(PictureType::CoverBack).map(|p| p.data()), Some(&[2][..]));
/// ```
#[derive(Clone, Debug, Default)]
pub struct PictureStore {
	slots: Vec<Slot>,
}

#[derive(Clone, Debug)]
struct Slot {
	picture: Picture,
	origin: Option<TagFormat>,
}

impl From<Picture> for Slot {
	fn from(picture: Picture) -> Self {
		Self {
			picture,
			origin: None,
		}
	}
}

impl PictureStore {
	/// Create an empty `PictureStore`
	pub fn new() -> Self {
		Self::default()
	}

	/// Append a picture
	pub fn push(&mut self, picture: Picture) {
		self.slots.push(Slot::from(picture));
	}

	/// Append a picture read from a tag of `format`
	pub(crate) fn push_from(&mut self, picture: Picture, format: TagFormat) {
		self.slots.push(Slot {
			picture,
			origin: Some(format),
		});
	}

	/// Insert a picture at `index`
	///
	/// If `index` is past the end, the picture is handed back.
	pub fn insert(&mut self, index: usize, picture: Picture) -> Result<(), Picture> {
		if index > self.slots.len() {
			return Err(picture);
		}

		self.slots.insert(index, Slot::from(picture));
		Ok(())
	}

	/// Remove the picture at `index`
	pub fn remove(&mut self, index: usize) -> Option<Picture> {
		if index >= self.slots.len() {
			return None;
		}

		Some(self.slots.remove(index).picture)
	}

	/// Replace the picture at `index`, returning the old one
	///
	/// The new picture has no origin. If `index` is out of bounds, it is handed back.
	pub fn replace(&mut self, index: usize, picture: Picture) -> Result<Picture, Picture> {
		match self.slots.get_mut(index) {
			Some(slot) => Ok(std::mem::replace(slot, Slot::from(picture)).picture),
			None => Err(picture),
		}
	}

	/// Keep only the pictures matching `f`
	pub fn retain<F>(&mut self, mut f: F)
	where
		F: FnMut(&Picture) -> bool,
	{
		self.slots.retain(|slot| f(&slot.picture));
	}

	/// Get the picture at `index`
	pub fn get(&self, index: usize) -> Option<&Picture> {
		self.slots.get(index).map(|slot| &slot.picture)
	}

	/// The format of the tag the picture at `index` was read from
	///
	/// This is `None` for pictures added by the caller, and for stores that were not produced by
	/// a merge.
	pub fn origin(&self, index: usize) -> Option<TagFormat> {
		self.slots.get(index).and_then(|slot| slot.origin)
	}

	/// Iterate over the pictures
	pub fn iter(&self) -> impl Iterator<Item = &Picture> {
		self.slots.iter().map(|slot| &slot.picture)
	}

	/// Iterate over the pictures along with their origins
	pub(crate) fn iter_with_origin(&self) -> impl Iterator<Item = (&Picture, Option<TagFormat>)> {
		self.slots.iter().map(|slot| (&slot.picture, slot.origin))
	}

	/// The number of pictures
	pub fn len(&self) -> usize {
		self.slots.len()
	}

	/// Whether there are no pictures
	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}

	/// Remove every picture
	pub fn clear(&mut self) {
		self.slots.clear();
	}

	/// The first picture of type `pic_type`
	pub fn first_of_type(&self, pic_type: PictureType) -> Option<&Picture> {
		self.iter_of_type(pic_type).next()
	}

	/// Iterate over the pictures of type `pic_type`
	pub fn iter_of_type(&self, pic_type: PictureType) -> impl Iterator<Item = &Picture> {
		self.iter().filter(move |p| p.pic_type == pic_type)
	}
}

impl PartialEq for PictureStore {
	fn eq(&self, other: &Self) -> bool {
		self.len() == other.len() && self.iter().eq(other.iter())
	}
}

impl Eq for PictureStore {}

impl Hash for PictureStore {
	fn hash<H: Hasher>(&self, state: &mut H) {
		state.write_usize(self.len());
		for picture in self.iter() {
			picture.hash(state);
		}
	}
}

impl FromIterator<Picture> for PictureStore {
	fn from_iter<T: IntoIterator<Item = Picture>>(iter: T) -> Self {
		Self {
			slots: iter.into_iter().map(Slot::from).collect(),
		}
	}
}

impl Extend<Picture> for PictureStore {
	fn extend<T: IntoIterator<Item = Picture>>(&mut self, iter: T) {
		self.slots.extend(iter.into_iter().map(Slot::from));
	}
}

impl IntoIterator for PictureStore {
	type Item = Picture;
	type IntoIter = std::vec::IntoIter<Picture>;

	fn into_iter(self) -> Self::IntoIter {
		self.slots
			.into_iter()
			.map(|slot| slot.picture)
			.collect::<Vec<_>>()
			.into_iter()
	}
}
