/// Key/value pairs with no [`BaseField`](super::BaseField) counterpart
///
/// Keys are unique ignoring ASCII case. Inserting `"tenc"` replaces a value stored as `"TENC"`,
/// keeping the original spelling of the key.
///
/// Equality ignores the order of the entries.
#[derive(Clone, Debug, Default, Eq)]
pub struct AdditionalFields {
	items: Vec<(String, String)>,
}

impl AdditionalFields {
	/// Create an empty set of additional fields
	pub fn new() -> Self {
		Self::default()
	}

	fn position(&self, key: &str) -> Option<usize> {
		self.items
			.iter()
			.position(|(k, _)| k.eq_ignore_ascii_case(key))
	}

	/// Get the value stored under `key`
	///
	/// # Examples
	///
	/// ```rust
	/// use tagmeld::tag::AdditionalFields;
	///
	/// let mut fields = AdditionalFields::new();
	/// fields.insert("TENC", "Encoder");
	///
	/// assert_eq!(fields.get("tenc"), Some("Encoder"));
	/// ```
	pub fn get(&self, key: &str) -> Option<&str> {
		self.position(key).map(|pos| self.items[pos].1.as_str())
	}

	/// Whether a value is stored under `key`
	pub fn contains_key(&self, key: &str) -> bool {
		self.position(key).is_some()
	}

	/// Store a value, returning the one it replaced
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
		let key = key.into();
		let value = value.into();

		match self.position(&key) {
			Some(pos) => Some(std::mem::replace(&mut self.items[pos].1, value)),
			None => {
				self.items.push((key, value));
				None
			},
		}
	}

	/// Remove the value stored under `key`
	pub fn remove(&mut self, key: &str) -> Option<String> {
		let pos = self.position(key)?;
		Some(self.items.remove(pos).1)
	}

	/// Iterate over the entries, in insertion order
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.items.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}

	/// The number of entries
	pub fn len(&self) -> usize {
		self.items.len()
	}

	/// Whether there are no entries
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	/// Remove every entry
	pub fn clear(&mut self) {
		self.items.clear();
	}
}

impl PartialEq for AdditionalFields {
	fn eq(&self, other: &Self) -> bool {
		self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
	}
}

impl<K, V> FromIterator<(K, V)> for AdditionalFields
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
		let mut fields = Self::new();
		for (k, v) in iter {
			fields.insert(k, v);
		}

		fields
	}
}
