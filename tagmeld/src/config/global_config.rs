use super::{MergeOptions, ParseOptions, WriteOptions};

use std::cell::RefCell;

thread_local! {
	static GLOBAL_CONFIG: RefCell<EngineConfig> = RefCell::new(EngineConfig::default());
}

/// Get a snapshot of the current thread's [`EngineConfig`]
///
/// Operations that don't take an explicit config use this snapshot for their entire duration.
pub fn global_config() -> EngineConfig {
	GLOBAL_CONFIG.with(|config| config.borrow().clone())
}

/// Set the [`EngineConfig`] for the current thread
///
/// # Examples
///
/// ```rust
/// use tagmeld::config::{EngineConfig, MergeOptions, apply_global_config, global_config};
///
/// let config = EngineConfig::new().merge(MergeOptions::new().single_tag(true));
/// apply_global_config(config.clone());
///
/// assert_eq!(global_config(), config);
/// ```
pub fn apply_global_config(config: EngineConfig) {
	GLOBAL_CONFIG.with(|global| *global.borrow_mut() = config);
}

/// The full set of options used by reading and saving
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct EngineConfig {
	/// How tags are merged, and which of them receive edits
	pub merge: MergeOptions,
	/// How tags are written
	pub write: WriteOptions,
	/// How tags are decoded
	pub parse: ParseOptions,
}

impl EngineConfig {
	/// Creates a new `EngineConfig` with every option at its default
	///
	/// # Examples
	///
	/// ```rust
	/// use tagmeld::config::EngineConfig;
	///
	/// let config = EngineConfig::new();
	/// ```
	pub fn new() -> Self {
		Self::default()
	}

	/// Replace the [`MergeOptions`]
	pub fn merge(mut self, merge: MergeOptions) -> Self {
		self.merge = merge;
		self
	}

	/// Replace the [`WriteOptions`]
	pub fn write(mut self, write: WriteOptions) -> Self {
		self.write = write;
		self
	}

	/// Replace the [`ParseOptions`]
	pub fn parse(mut self, parse: ParseOptions) -> Self {
		self.parse = parse;
		self
	}
}
