/// Options to control how tags are written
///
/// This acts as a dumping ground for all sorts of format-specific settings. As such, this is best
/// used as an application global config that gets set once.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct WriteOptions {
	pub(crate) padding: bool,
	pub(crate) preferred_padding: u32,
	pub(crate) use_leading_zeroes: bool,
	pub(crate) override_existing_leading_zeroes: bool,
}

impl WriteOptions {
	/// Default preferred padding size in bytes
	pub const DEFAULT_PREFERRED_PADDING: u32 = 1024;

	/// Creates a new `WriteOptions`, alias for `Default` implementation
	///
	/// See also: [`WriteOptions::default`]
	///
	/// # Examples
	///
	/// ```rust
	/// use tagmeld::config::WriteOptions;
	///
	/// let write_options = WriteOptions::new();
	/// ```
	pub const fn new() -> Self {
		Self {
			padding: true,
			preferred_padding: Self::DEFAULT_PREFERRED_PADDING,
			use_leading_zeroes: false,
			override_existing_leading_zeroes: false,
		}
	}

	/// Whether to write padding at all
	///
	/// When enabled, a tag that changes size will first try to fit into the space left by the
	/// original tag and its padding, keeping the rest of the file in place. When that isn't possible,
	/// [`WriteOptions::preferred_padding`] bytes of slack are written after the tag.
	///
	/// When disabled, tags are written without any slack.
	///
	/// # Examples
	///
	/// ```rust
	/// use tagmeld::config::WriteOptions;
	///
	/// // I want the smallest possible files
	/// let options = WriteOptions::new().padding(false);
	/// ```
	pub fn padding(mut self, padding: bool) -> Self {
		self.padding = padding;
		self
	}

	/// Set the preferred padding size in bytes
	///
	/// If the tag format being written supports padding, this will be the size of the padding
	/// in bytes.
	///
	/// NOTES:
	///
	/// * Not all tag formats support padding
	/// * A value of `0` is the same as disabling [`WriteOptions::padding`]
	///
	/// # Examples
	///
	/// ```rust
	/// use tagmeld::config::WriteOptions;
	///
	/// // I really don't want my files rewritten, so I'll double the padding size!
	/// let options = WriteOptions::new().preferred_padding(2048);
	/// ```
	pub fn preferred_padding(mut self, preferred_padding: u32) -> Self {
		match preferred_padding {
			0 => self.padding = false,
			_ => {
				self.padding = true;
				self.preferred_padding = preferred_padding;
			},
		}
		self
	}

	/// Whether to render track and disc numbers with leading zeroes
	///
	/// When set, numbers are padded to at least two digits, or to the digit count of their
	/// total. For example, track `3` of `12` is written as `03/12`.
	///
	/// See also [`WriteOptions::override_existing_leading_zeroes`].
	///
	/// # Examples
	///
	/// ```rust
	/// use tagmeld::config::WriteOptions;
	///
	/// let options = WriteOptions::new().use_leading_zeroes(true);
	/// ```
	pub fn use_leading_zeroes(mut self, use_leading_zeroes: bool) -> Self {
		self.use_leading_zeroes = use_leading_zeroes;
		self
	}

	/// Whether [`WriteOptions::use_leading_zeroes`] takes over existing number formatting
	///
	/// When unset, a number that was stored with leading zeroes keeps its original width, and a
	/// number stored without them stays plain. A value that no longer fits in the original
	/// width is a [`ValueError`](crate::error::ValueError).
	///
	/// # Examples
	///
	/// ```rust
	/// use tagmeld::config::WriteOptions;
	///
	/// // Reformat every number written, regardless of how it was stored before
	/// let options = WriteOptions::new()
	/// 	.use_leading_zeroes(true)
	/// 	.override_existing_leading_zeroes(true);
	/// ```
	pub fn override_existing_leading_zeroes(mut self, override_existing: bool) -> Self {
		self.override_existing_leading_zeroes = override_existing;
		self
	}

	pub(crate) fn preferred_padding_bytes(&self) -> Option<u32> {
		if self.padding && self.preferred_padding > 0 {
			return Some(self.preferred_padding);
		}

		None
	}
}

impl Default for WriteOptions {
	/// The default implementation for `WriteOptions`
	///
	/// The defaults are as follows:
	///
	/// ```rust,ignore
	/// WriteOptions {
	/// 	padding: true,
	/// 	preferred_padding: 1024,
	/// 	use_leading_zeroes: false,
	/// 	override_existing_leading_zeroes: false,
	/// }
	/// ```
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::WriteOptions;

	#[test_log::test]
	fn zero_preferred_padding_disables_padding() {
		let options = WriteOptions::new().preferred_padding(0);
		assert!(!options.padding);
		assert_eq!(options.preferred_padding_bytes(), None);

		let options = options.preferred_padding(200);
		assert_eq!(options.preferred_padding_bytes(), Some(200));
	}
}
