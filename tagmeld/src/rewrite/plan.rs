use super::changes::{ChangeSet, Targets};
use super::layout::TagLayout;
use crate::codec::EncodeContext;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::tag::{Tag, TagFormat};

/// What a save does to a tag
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PresenceStatus {
	/// The tag is copied as-is
	Unchanged,
	/// The tag is re-encoded
	Modified,
	/// A new tag is written
	Added,
	/// The tag is dropped
	Removed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct PlannedTag {
	pub(crate) format: TagFormat,
	pub(crate) status: PresenceStatus,
	/// The tag with the edits applied, for modified and added tags
	pub(crate) tag: Option<Tag>,
	/// The encoded tag, without padding
	pub(crate) encoded: Option<Vec<u8>>,
}

/// The outcome of a save, per format
///
/// Every encoding step happens while planning, so a plan that was created successfully can
/// always be written.
///
/// # Examples
///
/// ```rust
/// use tagmeld::config::EngineConfig;
/// use tagmeld::file::TaggedFile;
/// use tagmeld::rewrite::{self, PresenceStatus};
/// use tagmeld::tag::TagFormat;
///
/// # fn main() -> tagmeld::error::Result<()> {
/// // An MPEG frame header, with no tags
/// let original = [0xFF, 0xFB, 0x90, 0x64];
///
/// let config = EngineConfig::new();
/// let file = TaggedFile::read_from(&mut std::io::Cursor::new(original), None, &config)?;
///
/// let mut edited = file.tag().clone();
/// edited.set_artist("Artist");
///
/// let plan = rewrite::plan(file.layout(), file.tag(), &edited, &config)?;
/// assert_eq!(plan.status(TagFormat::Id3v2), Some(PresenceStatus::Added));
/// # Ok(()) }
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavePlan {
	pub(crate) entries: Vec<PlannedTag>,
}

impl SavePlan {
	/// The status of `format`, `None` if the format is neither present nor added
	pub fn status(&self, format: TagFormat) -> Option<PresenceStatus> {
		self.entry(format).map(|entry| entry.status)
	}

	/// Every format with its status
	pub fn iter(&self) -> impl Iterator<Item = (TagFormat, PresenceStatus)> + '_ {
		self.entries.iter().map(|entry| (entry.format, entry.status))
	}

	/// Whether saving leaves the file untouched
	pub fn is_unchanged(&self) -> bool {
		self.entries
			.iter()
			.all(|entry| entry.status == PresenceStatus::Unchanged)
	}

	pub(crate) fn entry(&self, format: TagFormat) -> Option<&PlannedTag> {
		self.entries.iter().find(|entry| entry.format == format)
	}

	fn unchanged(layout: &TagLayout) -> Self {
		let entries = layout
			.presences()
			.map(|presence| PlannedTag {
				format: presence.format,
				status: PresenceStatus::Unchanged,
				tag: None,
				encoded: None,
			})
			.collect();

		Self { entries }
	}

	/// A plan dropping the tag of `format`, and keeping everything else
	pub(crate) fn removal(layout: &TagLayout, format: TagFormat) -> Self {
		let mut plan = Self::unchanged(layout);
		for entry in &mut plan.entries {
			if entry.format == format {
				entry.status = PresenceStatus::Removed;
			}
		}

		plan
	}
}

/// Plan writing the edits between `base` and `edited` to the tags of a file
///
/// `base` is the merged tag the edits were made on, normally [`TaggedFile::tag`](crate::file::TaggedFile::tag).
///
/// The edits are written to the target formats:
///
/// * Every present and decoded format listed in the [`TagPriority`](crate::config::TagPriority).
/// * In single-tag mode, only the most authoritative of them.
/// * If there is none, a new tag of the file's [`FileType::default_format`](crate::file::FileType::default_format).
///   An undecodable tag of that format is replaced.
///
/// Pictures are written back to the tag they were merged from. Pictures added in `edited` go to
/// the first target that can store pictures.
///
/// # Errors
///
/// An edited value can't be encoded in one of the target formats
pub fn plan(layout: &TagLayout, base: &Tag, edited: &Tag, config: &EngineConfig) -> Result<SavePlan> {
	let changes = ChangeSet::diff(base, edited);
	let mut plan = SavePlan::unchanged(layout);

	if changes.is_empty() {
		log::debug!("No changes to write");
		return Ok(plan);
	}

	let priority = config.merge.tag_priority();

	let mut targets = layout
		.presences()
		.filter(|presence| presence.decoded.is_some())
		.filter_map(|presence| priority.rank(presence.format).map(|rank| (rank, presence)))
		.collect::<Vec<_>>();
	targets.sort_by_key(|(rank, _)| *rank);

	if config.merge.single_tag_active() {
		targets.truncate(1);
	}

	let mut targets = targets
		.into_iter()
		.map(|(_, presence)| (presence.format, presence.decoded.as_ref()))
		.collect::<Vec<_>>();

	if targets.is_empty() {
		let format = layout.file_type.default_format();
		if layout.contains(format) {
			log::warn!("Replacing the undecodable {format:?} tag with a new one");
		}

		log::debug!("No tag to write to, adding a {format:?} tag");
		targets.push((format, None));
	}

	let ctx = EncodeContext::new(layout.file_type, config.write);
	let routing = Targets::new(
		layout.file_type,
		targets
			.iter()
			.map(|(format, prior)| (*format, prior.map(|decoded| &decoded.tag)))
			.collect(),
	);

	for (format, prior) in &targets {
		let codec = crate::registry::codec(*format);

		let mut tag = prior.map_or_else(Tag::new, |decoded| decoded.tag.clone());
		changes.apply(*format, &mut tag, &routing);

		let status = match prior {
			Some(decoded) if decoded.tag == tag => {
				log::debug!("{format:?} tag is unaffected by the changes");
				continue;
			},
			Some(_) => PresenceStatus::Modified,
			None => PresenceStatus::Added,
		};

		let encoded = codec.encode(&tag, *prior, &ctx)?;
		log::debug!("Encoded {format:?} tag ({} bytes), status: {status:?}", encoded.len());

		let planned = PlannedTag {
			format: *format,
			status,
			tag: Some(tag),
			encoded: Some(encoded),
		};

		match plan.entries.iter_mut().find(|entry| entry.format == *format) {
			Some(entry) => *entry = planned,
			None => plan.entries.push(planned),
		}
	}

	Ok(plan)
}
