use crate::util::{
	self, AUDIO, ape_tag, ape_tag_with_pictures, corrupt_ape_tag, id3v1_tag, id3v23_tag, mp3,
	picture_frame, text_frame, user_text_frame,
};

use std::io::{Read as _, Seek as _};

use tagmeld::config::{EngineConfig, MergeOptions};
use tagmeld::error::{ErrorCategory, ErrorKind};
use tagmeld::file::{FileType, TaggedFile};
use tagmeld::picture::{Picture, PictureType};
use tagmeld::rewrite::PresenceStatus;
use tagmeld::tag::{BaseField, TagFormat};

const PNG: [u8; 16] = [
	0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D, b'I', b'H', b'D', b'R',
];

fn read(data: &[u8], config: &EngineConfig) -> TaggedFile {
	TaggedFile::read_from_bytes(data, FileType::Mpeg, config).unwrap()
}

fn read_file(file: &mut std::fs::File) -> Vec<u8> {
	let mut content = Vec::new();
	file.rewind().unwrap();
	file.read_to_end(&mut content).unwrap();
	file.rewind().unwrap();
	content
}

fn all_tags() -> Vec<u8> {
	let id3v2 = id3v23_tag(
		&[
			text_frame("TIT2", "Foo title"),
			text_frame("TPE1", "Bar artist"),
			text_frame("TENC", "Encoder"),
		],
		64,
	);
	let ape = ape_tag(&[("Title", "Foo title"), ("Artist", "Bar artist")]);
	let id3v1 = id3v1_tag("Foo title", "Bar artist", "1984", 1);

	mp3(Some(&id3v2), Some(&ape), Some(&id3v1))
}

#[test_log::test]
fn read_all_tags() {
	let data = all_tags();
	let file = TaggedFile::read_from(&mut std::io::Cursor::new(&data), None, &EngineConfig::new())
		.unwrap();

	assert_eq!(file.file_type(), FileType::Mpeg);
	assert!(file.decode_errors().is_empty());

	let formats = file
		.layout()
		.presences()
		.map(|presence| presence.format())
		.collect::<Vec<_>>();
	assert_eq!(formats.len(), 3);
	for format in [TagFormat::Id3v2, TagFormat::Ape, TagFormat::Id3v1] {
		assert!(formats.contains(&format));
	}

	let tag = file.tag();
	assert_eq!(tag.title(), Some("Foo title"));
	assert_eq!(tag.artist(), Some("Bar artist"));
	// Only the ID3v1 tag has a year
	assert_eq!(tag.year(), Some(1984));
	assert_eq!(tag.additional().get("TENC"), Some("Encoder"));

	assert_eq!(&data[file.layout().audio()], &AUDIO);
}

#[test_log::test]
fn no_edits_is_identity() {
	let data = all_tags();
	let config = EngineConfig::new();
	let file = read(&data, &config);

	let plan = file.plan(file.tag(), &config).unwrap();
	assert!(plan.is_unchanged());

	assert_eq!(file.save(&data, file.tag(), &config).unwrap(), data);
}

#[test_log::test]
fn edits_reach_every_tag() {
	let data = all_tags();
	let config = EngineConfig::new();
	let file = read(&data, &config);

	let mut edited = file.tag().clone();
	edited.set_title("New title");

	let plan = file.plan(&edited, &config).unwrap();
	for format in [TagFormat::Id3v2, TagFormat::Ape, TagFormat::Id3v1] {
		assert_eq!(plan.status(format), Some(PresenceStatus::Modified));
	}

	let out = file.save(&data, &edited, &config).unwrap();
	let new_file = read(&out, &config);

	for (_, tag) in new_file.layout().decoded_tags() {
		assert_eq!(tag.title(), Some("New title"));
		assert_eq!(tag.artist(), Some("Bar artist"));
	}
	assert_eq!(&out[new_file.layout().audio()], &AUDIO);
}

#[test_log::test]
fn saving_twice_is_stable() {
	let data = mp3(
		Some(&id3v23_tag(&[text_frame("TIT2", "Foo title")], 32)),
		None,
		Some(&id3v1_tag("Foo title", "", "", 0)),
	);
	let config = EngineConfig::new();
	let file = read(&data, &config);

	let mut edited = file.tag().clone();
	edited.set_title("New title");
	edited.set_artist("Bar artist");

	let first = file.save(&data, &edited, &config).unwrap();
	let file = read(&first, &config);
	assert_eq!(file.tag().artist(), Some("Bar artist"));

	let second = file.save(&first, &edited, &config).unwrap();
	assert_eq!(first, second);
}

fn disagreeing_tags() -> Vec<u8> {
	let id3v2 = id3v23_tag(&[text_frame("TPE1", ""), text_frame("TYER", "1984")], 0);
	let id3v1 = id3v1_tag("", "Nintendo Sound Scream", "", 0);

	mp3(Some(&id3v2), None, Some(&id3v1))
}

#[test_log::test]
fn cross_reading_fills_empty_fields() {
	let data = disagreeing_tags();
	let file = read(&data, &EngineConfig::new());

	let tag = file.tag();
	assert_eq!(tag.artist(), Some("Nintendo Sound Scream"));
	assert_eq!(tag.year(), Some(1984));
}

#[test_log::test]
fn single_tag_keeps_empty_fields() {
	let data = disagreeing_tags();

	for merge in [
		MergeOptions::new().single_tag(true),
		MergeOptions::new().cross_reading(false),
	] {
		let file = read(&data, &EngineConfig::new().merge(merge));

		let tag = file.tag();
		assert_eq!(tag.get(BaseField::Artist), Some(""));
		assert_eq!(tag.year(), Some(1984));
		// Only present in the ID3v1 tag
		assert!(!tag.contains(BaseField::Comment));
	}
}

#[test_log::test]
fn single_tag_edit_leaves_other_tags() {
	let data = disagreeing_tags();
	let config = EngineConfig::new().merge(MergeOptions::new().single_tag(true));
	let file = read(&data, &config);

	let mut edited = file.tag().clone();
	edited.set_artist("Someone else");

	let plan = file.plan(&edited, &config).unwrap();
	assert_eq!(plan.status(TagFormat::Id3v2), Some(PresenceStatus::Modified));
	assert_eq!(plan.status(TagFormat::Id3v1), Some(PresenceStatus::Unchanged));

	let out = file.save(&data, &edited, &config).unwrap();
	assert_eq!(out[out.len() - 128..], data[data.len() - 128..]);
}

#[test_log::test]
fn leading_zeroes_are_kept() {
	let data = mp3(
		Some(&id3v23_tag(&[text_frame("TRCK", "03")], 16)),
		None,
		None,
	);
	let config = EngineConfig::new();
	let file = read(&data, &config);
	assert_eq!(file.tag().get(BaseField::TrackNumber), Some("03"));
	assert_eq!(file.tag().track(), Some(3));

	let mut edited = file.tag().clone();
	edited.set_track(6);

	let out = file.save(&data, &edited, &config).unwrap();
	assert_eq!(out.len(), data.len());

	let file = read(&out, &config);
	assert_eq!(file.tag().get(BaseField::TrackNumber), Some("06"));
}

#[test_log::test]
fn too_wide_number_is_rejected() {
	let data = mp3(
		Some(&id3v23_tag(&[text_frame("TRCK", "01")], 16)),
		None,
		None,
	);
	let config = EngineConfig::new();
	let mut file_handle = util::temp_file(&data);
	let mut file = TaggedFile::read_from(&mut file_handle, Some("mp3"), &config).unwrap();

	let mut edited = file.tag().clone();
	edited.set_track(123);

	let err = file.save_to(&mut file_handle, &edited, &config).unwrap_err();
	assert_eq!(err.category(), ErrorCategory::Value);

	assert_eq!(read_file(&mut file_handle), data);
	assert_eq!(file.tag().track(), Some(1));
}

#[test_log::test]
fn replace_picture() {
	let data = mp3(
		Some(&id3v23_tag(
			&[text_frame("TIT2", "Foo title"), picture_frame(3, &PNG)],
			0,
		)),
		None,
		None,
	);
	let config = EngineConfig::new();
	let file = read(&data, &config);

	let front = file.tag().pictures().first_of_type(PictureType::CoverFront).unwrap();
	assert_eq!(front.data(), &PNG);

	let mut edited = file.tag().clone();
	edited.pictures_mut().remove(0);

	let mut back = Picture::from_bytes(PNG.to_vec()).unwrap();
	back.set_pic_type(PictureType::CoverBack);
	edited.pictures_mut().push(back);

	let out = file.save(&data, &edited, &config).unwrap();
	let file = read(&out, &config);

	let pictures = file.tag().pictures();
	assert_eq!(pictures.len(), 1);
	assert!(pictures.first_of_type(PictureType::CoverFront).is_none());
	assert_eq!(pictures.first_of_type(PictureType::CoverBack).unwrap().data(), &PNG);
	assert_eq!(file.tag().title(), Some("Foo title"));
}

fn png(marker: u8) -> Vec<u8> {
	let mut data = PNG.to_vec();
	data.push(marker);
	data
}

fn media_picture(marker: u8) -> Picture {
	let mut picture = Picture::from_bytes(png(marker)).unwrap();
	picture.set_pic_type(PictureType::Media);
	picture
}

#[test_log::test]
fn pictures_stay_in_their_tag() {
	let id3v2 = id3v23_tag(
		&[text_frame("TIT2", "Foo title"), picture_frame(3, &png(1))],
		0,
	);
	let ape = ape_tag_with_pictures(&[("Title", "Foo title")], &[("Cover Art (Back)", &png(2))]);
	let data = mp3(Some(&id3v2), Some(&ape), None);

	let config = EngineConfig::new();
	let file = read(&data, &config);
	assert_eq!(file.tag().pictures().len(), 2);

	let mut edited = file.tag().clone();
	edited.pictures_mut().remove(0);
	edited.pictures_mut().push(media_picture(3));

	let out = file.save(&data, &edited, &config).unwrap();
	let file = read(&out, &config);

	let pictures = file.tag().pictures();
	assert_eq!(pictures.len(), 2);
	assert!(pictures.first_of_type(PictureType::CoverFront).is_none());
	assert_eq!(pictures.first_of_type(PictureType::CoverBack).unwrap().data(), &png(2)[..]);
	assert_eq!(pictures.first_of_type(PictureType::Media).unwrap().data(), &png(3)[..]);

	// The new picture only went to the ID3v2 tag
	for format in [TagFormat::Id3v2, TagFormat::Ape] {
		let tag = file.layout().presence(format).unwrap().tag().unwrap();
		assert_eq!(tag.pictures().len(), 1);
	}

	// Saving the result again leaves it alone
	let again = file.save(&out, file.tag(), &config).unwrap();
	assert_eq!(again, out);
}

#[test_log::test]
fn remove_picture_by_index() {
	let data = mp3(
		Some(&id3v23_tag(
			&[
				picture_frame(3, &png(1)),
				picture_frame(3, &png(2)),
				picture_frame(4, &png(3)),
			],
			0,
		)),
		None,
		None,
	);
	let config = EngineConfig::new();
	let file = read(&data, &config);
	assert_eq!(
		file.tag().pictures().iter_of_type(PictureType::CoverFront).count(),
		2
	);

	let mut edited = file.tag().clone();
	let removed = edited.pictures_mut().remove(1).unwrap();
	assert_eq!(removed.data(), &png(2)[..]);
	edited.pictures_mut().push(media_picture(4));

	let mut front = Picture::from_bytes(png(5)).unwrap();
	front.set_pic_type(PictureType::CoverFront);
	edited.pictures_mut().push(front);

	let out = file.save(&data, &edited, &config).unwrap();
	let file = read(&out, &config);

	let pictures = file.tag().pictures();
	let markers = pictures.iter().map(|p| p.data()[PNG.len()]).collect::<Vec<_>>();
	assert_eq!(markers, [1, 3, 4, 5]);

	let types = pictures.iter().map(Picture::pic_type).collect::<Vec<_>>();
	assert_eq!(
		types,
		[
			PictureType::CoverFront,
			PictureType::CoverBack,
			PictureType::Media,
			PictureType::CoverFront,
		]
	);
}

#[test_log::test]
fn edit_additional_fields() {
	let data = mp3(
		Some(&id3v23_tag(
			&[
				text_frame("TENC", "Encoder"),
				user_text_frame("MOOD", "Upbeat"),
			],
			0,
		)),
		None,
		None,
	);
	let config = EngineConfig::new();
	let file = read(&data, &config);
	assert_eq!(file.tag().additional().get("MOOD"), Some("Upbeat"));

	let mut edited = file.tag().clone();
	edited.additional_mut().insert("ABCD", "efgh");
	assert_eq!(edited.additional_mut().remove("TENC").as_deref(), Some("Encoder"));

	let out = file.save(&data, &edited, &config).unwrap();
	let file = read(&out, &config);

	let additional = file.tag().additional();
	assert_eq!(additional.get("ABCD"), Some("efgh"));
	assert_eq!(additional.get("MOOD"), Some("Upbeat"));
	assert!(!additional.contains_key("TENC"));
}

#[test_log::test]
fn shrinking_edit_reuses_padding() {
	let data = mp3(
		Some(&id3v23_tag(&[text_frame("TIT2", "A rather long title")], 256)),
		None,
		None,
	);
	let config = EngineConfig::new();
	let file = read(&data, &config);

	let mut edited = file.tag().clone();
	edited.set_title("Short");

	let out = file.save(&data, &edited, &config).unwrap();
	assert_eq!(out.len(), data.len());

	let new_file = read(&out, &config);
	assert_eq!(new_file.layout().audio(), file.layout().audio());
	assert_eq!(new_file.tag().title(), Some("Short"));
}

#[test_log::test]
fn remove_ape() {
	let ape = ape_tag(&[("Title", "Foo title")]);
	let id3v1 = id3v1_tag("Foo title", "", "", 0);
	let data = mp3(None, Some(&ape), Some(&id3v1));

	let config = EngineConfig::new();
	let file = read(&data, &config);
	assert_eq!(file.layout().presence(TagFormat::Ape).unwrap().len(), ape.len());

	let out = file.remove(&data, TagFormat::Ape, &config).unwrap();
	assert_eq!(out.len(), data.len() - ape.len());
	assert_eq!(out, mp3(None, None, Some(&id3v1)));

	let file = read(&out, &config);
	assert!(!file.layout().contains(TagFormat::Ape));
	assert!(file.layout().contains(TagFormat::Id3v1));
}

#[test_log::test]
fn remove_from_file() {
	let id3v2 = id3v23_tag(&[text_frame("TIT2", "Foo title")], 16);
	let data = mp3(Some(&id3v2), None, None);

	let config = EngineConfig::new();
	let mut file_handle = util::temp_file(&data);
	let mut file = TaggedFile::read_from(&mut file_handle, None, &config).unwrap();

	file.remove_from(&mut file_handle, TagFormat::Id3v2, &config).unwrap();

	assert_eq!(read_file(&mut file_handle), AUDIO);
	assert!(file.layout().presences().next().is_none());
	assert!(file.tag().is_empty());
}

#[test_log::test]
fn undecodable_tag_is_preserved() {
	let ape = corrupt_ape_tag();
	let id3v1 = id3v1_tag("Foo title", "", "", 0);
	let data = mp3(None, Some(&ape), Some(&id3v1));

	let config = EngineConfig::new();
	let file = read(&data, &config);

	let errors = file.decode_errors();
	assert_eq!(errors.len(), 1);
	assert_eq!(errors[0].0, TagFormat::Ape);

	let presence = file.layout().presence(TagFormat::Ape).unwrap();
	assert!(presence.decoded().is_none());
	assert_eq!(presence.len(), ape.len());
	assert_eq!(file.tag().title(), Some("Foo title"));

	let mut edited = file.tag().clone();
	edited.set_title("New title");

	let plan = file.plan(&edited, &config).unwrap();
	assert_eq!(plan.status(TagFormat::Ape), Some(PresenceStatus::Unchanged));
	assert_eq!(plan.status(TagFormat::Id3v1), Some(PresenceStatus::Modified));

	let out = file.save(&data, &edited, &config).unwrap();
	let ape_start = AUDIO.len();
	assert_eq!(out[ape_start..ape_start + ape.len()], ape[..]);
	assert_eq!(read(&out, &config).tag().title(), Some("New title"));
}

#[test_log::test]
fn oversized_id3v2_is_audio() {
	// Claims 1000 bytes
	let mut data = b"ID3\x03\x00\x00\x00\x00\x07\x68".to_vec();
	data.extend_from_slice(&AUDIO);
	data.extend(id3v1_tag("", "Bar artist", "", 0));

	let config = EngineConfig::new();
	let file = read(&data, &config);

	assert_eq!(file.tag().artist(), Some("Bar artist"));
	assert!(!file.layout().contains(TagFormat::Id3v2));
	assert_eq!(file.layout().audio(), 0..data.len() - 128);

	let errors = file.decode_errors();
	assert_eq!(errors.len(), 1);
	assert_eq!(errors[0].0, TagFormat::Id3v2);
	assert!(matches!(errors[0].1.kind(), ErrorKind::SizeMismatch));

	let mut edited = file.tag().clone();
	edited.set_title("Foo title");

	let out = file.save(&data, &edited, &config).unwrap();
	assert_eq!(out[..data.len() - 128], data[..data.len() - 128]);
	assert_eq!(read(&out, &config).tag().title(), Some("Foo title"));
}

#[test_log::test]
fn new_tag_for_untagged_file() {
	let data = AUDIO.to_vec();
	let config = EngineConfig::new();
	let file = read(&data, &config);
	assert!(file.tag().is_empty());

	let mut edited = file.tag().clone();
	edited.set_artist("Bar artist");

	let plan = file.plan(&edited, &config).unwrap();
	assert_eq!(plan.status(TagFormat::Id3v2), Some(PresenceStatus::Added));
	assert_eq!(plan.status(TagFormat::Ape), None);

	let out = file.save(&data, &edited, &config).unwrap();
	assert!(out.starts_with(b"ID3"));
	assert!(out.ends_with(&AUDIO));

	let file = read(&out, &config);
	assert_eq!(file.tag().artist(), Some("Bar artist"));
}
