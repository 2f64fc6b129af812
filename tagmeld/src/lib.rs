//! Read, merge, and rewrite the tags of audio files.
//!
//! A single file can hold several tags at once, such as an ID3v2 tag at its start and APE and
//! ID3v1 tags at its end. tagmeld reads all of them, merges them into one [`Tag`](tag::Tag)
//! according to a configurable priority, and writes edits back to every tag they belong in. Tags,
//! audio, and padding that an edit doesn't touch are kept byte for byte.
//!
//! # Supported formats
//!
//! | Tag format      | MPEG-style streams | FLAC | OGG Vorbis/Opus/Speex |
//! |-----------------|--------------------|------|-----------------------|
//! | ID3v2.2/3/4     | Yes                | Yes  | No                    |
//! | APEv1/2         | Yes                | No   | No                    |
//! | Vorbis Comments | No                 | Yes  | Yes                   |
//! | ID3v1/1.1       | Yes                | No   | No                    |
//!
//! MPEG-style streams are any raw audio with tags at its edges, including MP3, Musepack and
//! WavPack.
//!
//! # Examples
//!
//! ## Reading a file
//!
//! ```rust,no_run
//! # fn main() -> tagmeld::error::Result<()> {
//! use tagmeld::file::TaggedFile;
//!
//! let tagged_file = TaggedFile::read_from_path("foo.mp3")?;
//!
//! if let Some(artist) = tagged_file.tag().artist() {
//! 	println!("Artist: {artist}");
//! }
//! # Ok(()) }
//! ```
//!
//! ## Editing a file
//!
//! ```rust,no_run
//! # fn main() -> tagmeld::error::Result<()> {
//! use std::fs::OpenOptions;
//! use tagmeld::config::{EngineConfig, MergeOptions};
//! use tagmeld::file::TaggedFile;
//!
//! // Only read and write the most authoritative tag
//! let config = EngineConfig::new().merge(MergeOptions::new().single_tag(true));
//!
//! let mut file = OpenOptions::new().read(true).write(true).open("foo.flac")?;
//! let mut tagged_file = TaggedFile::read_from(&mut file, Some("flac"), &config)?;
//!
//! let mut edited = tagged_file.tag().clone();
//! edited.set_year(1984);
//! edited.additional_mut().insert("MOOD", "Upbeat");
//!
//! tagged_file.save_to(&mut file, &edited, &config)?;
//! # Ok(()) }
//! ```
//!
//! ## Configuration
//!
//! Every operation either takes an explicit [`EngineConfig`](config::EngineConfig), or uses a
//! snapshot of the current thread's [`global_config`](config::global_config).

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod ape;
pub mod codec;
pub mod config;
pub mod error;
pub mod file;
pub mod flac;
pub mod id3;
pub(crate) mod macros;
mod ogg;
pub mod picture;
pub mod registry;
pub mod resolve;
pub mod rewrite;
pub mod tag;
mod util;
pub mod vorbis;

pub use util::text::TextEncoding;

pub use util::io;
