/// The parsing strictness mode
///
/// # Examples
///
/// ```rust
/// use tagmeld::config::{ParseOptions, ParsingMode};
///
/// // Reject anything that is even slightly malformed
/// let parse_options = ParseOptions::new().parsing_mode(ParsingMode::Strict);
/// ```
#[derive(Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq, Default)]
#[non_exhaustive]
pub enum ParsingMode {
	/// Will eagerly error on invalid input
	///
	/// ## Examples of behavior
	///
	/// * Unable to decode text - The tag will error and be treated as unreadable
	/// * An ID3v1 year made of non-digit characters - The tag will error
	Strict,
	/// Default mode, less eager to error on recoverably malformed input
	///
	/// NOTE: A readable input does *not* necessarily make it writeable.
	///
	/// ## Examples of behavior
	///
	/// * Unable to decode text - If valid otherwise, the field will be replaced by an empty string and the parser moves on
	/// * An ID3v1 year made of non-digit characters - The year is present, but empty
	#[default]
	BestAttempt,
	/// Least eager to error, may produce invalid/partial output
	///
	/// ## Examples of behavior
	///
	/// * Unable to decode text - If valid otherwise, the entire item will be discarded and the parser moves on
	/// * A malformed ID3v2 frame - The frame is kept as opaque data
	Relaxed,
}

/// Options to control how tags are decoded
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct ParseOptions {
	pub(crate) parsing_mode: ParsingMode,
	pub(crate) read_cover_art: bool,
	pub(crate) allocation_limit: usize,
}

impl Default for ParseOptions {
	/// The default implementation for `ParseOptions`
	///
	/// The defaults are as follows:
	///
	/// ```rust,ignore
	/// ParseOptions {
	/// 	parsing_mode: ParsingMode::BestAttempt,
	/// 	read_cover_art: true,
	/// 	allocation_limit: 16 * 1024 * 1024,
	/// }
	/// ```
	fn default() -> Self {
		Self::new()
	}
}

impl ParseOptions {
	/// Default parsing mode
	pub const DEFAULT_PARSING_MODE: ParsingMode = ParsingMode::BestAttempt;

	/// Default allocation limit for any single tag item
	pub const DEFAULT_ALLOCATION_LIMIT: usize = 16 * 1024 * 1024;

	/// Creates a new `ParseOptions`, alias for `Default` implementation
	///
	/// See also: [`ParseOptions::default`]
	///
	/// # Examples
	///
	/// ```rust
	/// use tagmeld::config::ParseOptions;
	///
	/// let parse_options = ParseOptions::new();
	/// ```
	#[must_use]
	pub const fn new() -> Self {
		Self {
			parsing_mode: Self::DEFAULT_PARSING_MODE,
			read_cover_art: true,
			allocation_limit: Self::DEFAULT_ALLOCATION_LIMIT,
		}
	}

	/// The parsing mode to use, see [`ParsingMode`] for details
	///
	/// # Examples
	///
	/// ```rust
	/// use tagmeld::config::{ParseOptions, ParsingMode};
	///
	/// // By default, `parsing_mode` is ParsingMode::BestAttempt. Here, we need absolute correctness.
	/// let parse_options = ParseOptions::new().parsing_mode(ParsingMode::Strict);
	/// ```
	pub fn parsing_mode(mut self, parsing_mode: ParsingMode) -> Self {
		self.parsing_mode = parsing_mode;
		self
	}

	/// Whether or not to read cover art
	///
	/// Pictures that are not read are still preserved on the next save, as long as the picture
	/// list isn't edited.
	///
	/// # Examples
	///
	/// ```rust
	/// use tagmeld::config::ParseOptions;
	///
	/// // Reading cover art is expensive, and I do not need it!
	/// let parse_options = ParseOptions::new().read_cover_art(false);
	/// ```
	pub fn read_cover_art(mut self, read_cover_art: bool) -> Self {
		self.read_cover_art = read_cover_art;
		self
	}

	/// The maximum number of bytes to allocate for any single tag item
	///
	/// This is a safety measure to prevent allocating too much memory for a single tag item. If
	/// an item exceeds this limit, the allocation will fail with [`ErrorKind::TooMuchData`](crate::error::ErrorKind::TooMuchData).
	///
	/// # Examples
	///
	/// ```rust
	/// use tagmeld::config::ParseOptions;
	///
	/// // I have files with gigantic images, I'll double the allocation limit!
	/// let parse_options = ParseOptions::new().allocation_limit(32 * 1024 * 1024);
	/// ```
	pub fn allocation_limit(mut self, allocation_limit: usize) -> Self {
		self.allocation_limit = allocation_limit;
		self
	}
}
