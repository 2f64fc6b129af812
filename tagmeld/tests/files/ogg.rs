use crate::util::{flac_picture, ogg_audio, ogg_opus, ogg_vorbis, vorbis_comments};

use data_encoding::BASE64;
use tagmeld::config::EngineConfig;
use tagmeld::file::{FileType, TaggedFile};
use tagmeld::picture::{Picture, PictureType};
use tagmeld::rewrite::PresenceStatus;
use tagmeld::tag::TagFormat;

const PNG: [u8; 12] = [
	0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0xC0, 0xFF, 0xEE, 0x00,
];

const VENDOR: &str = "Xiph.Org libVorbis I 20200704 (Reducing Environment)";

fn read(data: &[u8]) -> TaggedFile {
	TaggedFile::read_from_bytes(data, FileType::Ogg, &EngineConfig::new()).unwrap()
}

/// A Vorbis comment packet body, with the framing bit and `padding` zeroes
fn comment(items: &[&str], padding: usize) -> Vec<u8> {
	let mut out = vorbis_comments(VENDOR, items);
	out.push(1);
	out.resize(out.len() + padding, 0);
	out
}

fn picture_comment(picture_type: u32, data: &[u8]) -> String {
	format!(
		"METADATA_BLOCK_PICTURE={}",
		BASE64.encode(&flac_picture(picture_type, data))
	)
}

fn sample() -> Vec<u8> {
	ogg_vorbis(&comment(
		&["TITLE=Foo title", "ARTIST=Bar artist", "MOOD=Upbeat"],
		0,
	))
}

#[test_log::test]
fn read_vorbis() {
	let data = sample();
	let file = TaggedFile::read_from(&mut std::io::Cursor::new(&data), None, &EngineConfig::new())
		.unwrap();

	assert_eq!(file.file_type(), FileType::Ogg);
	assert!(file.decode_errors().is_empty());

	let tag = file.tag();
	assert_eq!(tag.title(), Some("Foo title"));
	assert_eq!(tag.artist(), Some("Bar artist"));
	assert_eq!(tag.additional().get("MOOD"), Some("Upbeat"));

	assert!(file.layout().contains(TagFormat::VorbisComments));
	assert_eq!(
		file.layout().audio(),
		data.len() - ogg_audio(3).len()..data.len()
	);
}

#[test_log::test]
fn no_edits_is_identity() {
	let data = sample();
	let file = read(&data);

	let out = file.save(&data, file.tag(), &EngineConfig::new()).unwrap();
	assert_eq!(out, data);
}

#[test_log::test]
fn edit_vorbis() {
	let data = sample();
	let config = EngineConfig::new();
	let file = read(&data);

	let mut edited = file.tag().clone();
	edited.set_title("New title");
	edited.set_album("Baz album");
	edited.additional_mut().remove("MOOD");

	let plan = file.plan(&edited, &config).unwrap();
	assert_eq!(
		plan.status(TagFormat::VorbisComments),
		Some(PresenceStatus::Modified)
	);

	let out = file.save(&data, &edited, &config).unwrap();

	// Still three header pages, the audio is untouched
	assert!(out.ends_with(&ogg_audio(3)));

	let file = read(&out);
	let tag = file.tag();
	assert_eq!(tag.title(), Some("New title"));
	assert_eq!(tag.artist(), Some("Bar artist"));
	assert_eq!(tag.album(), Some("Baz album"));
	assert!(!tag.additional().contains_key("MOOD"));
}

#[test_log::test]
fn edit_and_revert_keeps_length() {
	let data = ogg_vorbis(&comment(&["TITLE=Foo title", "ARTIST=Bar artist"], 64));
	let config = EngineConfig::new();
	let file = read(&data);

	let mut edited = file.tag().clone();
	edited.set_title("Foo title (remastered)");

	let out = file.save(&data, &edited, &config).unwrap();
	assert_eq!(out.len(), data.len());
	assert!(out.ends_with(&ogg_audio(3)));

	let file = read(&out);
	assert_eq!(file.tag().title(), Some("Foo title (remastered)"));

	let mut reverted = file.tag().clone();
	reverted.set_title("Foo title");

	let out = file.save(&out, &reverted, &config).unwrap();
	assert_eq!(out.len(), data.len());

	let file = read(&out);
	assert_eq!(file.tag().title(), Some("Foo title"));
	assert_eq!(file.tag().artist(), Some("Bar artist"));
}

#[test_log::test]
fn multiple_pictures() {
	let data = ogg_vorbis(&comment(
		&[
			"TITLE=Foo title",
			&picture_comment(3, &PNG),
			&picture_comment(4, &PNG),
		],
		0,
	));
	let config = EngineConfig::new();
	let file = read(&data);

	let pictures = file.tag().pictures();
	assert_eq!(pictures.len(), 2);
	assert_eq!(pictures.get(0).unwrap().pic_type(), PictureType::CoverFront);
	assert_eq!(pictures.get(1).unwrap().data(), &PNG);

	let mut edited = file.tag().clone();
	edited.pictures_mut().remove(0);

	let mut media = Picture::from_bytes(PNG.to_vec()).unwrap();
	media.set_pic_type(PictureType::Media);
	edited.pictures_mut().push(media);

	// Same role as the remaining picture
	let mut back = Picture::from_bytes(PNG.to_vec()).unwrap();
	back.set_pic_type(PictureType::CoverBack);
	edited.pictures_mut().push(back);

	let out = file.save(&data, &edited, &config).unwrap();
	let file = read(&out);

	let types = file
		.tag()
		.pictures()
		.iter()
		.map(Picture::pic_type)
		.collect::<Vec<_>>();
	assert_eq!(
		types,
		[
			PictureType::CoverBack,
			PictureType::Media,
			PictureType::CoverBack
		]
	);
	assert_eq!(file.tag().title(), Some("Foo title"));
}

#[test_log::test]
fn growing_past_a_page_renumbers_audio() {
	let data = sample();
	let config = EngineConfig::new();
	let file = read(&data);

	// Larger than the biggest possible page
	let mut large = PNG.to_vec();
	large.resize(70_000, 0x11);

	let mut edited = file.tag().clone();
	edited
		.pictures_mut()
		.push(Picture::from_bytes(large.clone()).unwrap());

	let out = file.save(&data, &edited, &config).unwrap();
	let file = read(&out);
	assert_eq!(file.tag().pictures().get(0).unwrap().data(), &large[..]);

	let audio = &out[file.layout().audio()];
	assert_eq!(audio.len(), ogg_audio(3).len());

	// The header packets now take up four pages
	let sequence_number = u32::from_le_bytes(audio[18..22].try_into().unwrap());
	assert_eq!(sequence_number, 4);
}

#[test_log::test]
fn remove_comments() {
	let data = sample();
	let config = EngineConfig::new();
	let file = read(&data);

	let out = file.remove(&data, TagFormat::VorbisComments, &config).unwrap();
	assert!(out.len() < data.len());
	assert!(out.ends_with(&ogg_audio(3)));

	let file = read(&out);
	assert!(file.tag().is_empty());
	assert!(file.decode_errors().is_empty());
}

#[test_log::test]
fn edit_opus() {
	let data = ogg_opus(&vorbis_comments("libopus 1.4", &["TITLE=Foo title"]));
	let config = EngineConfig::new();
	let file =
		TaggedFile::read_from(&mut std::io::Cursor::new(&data), Some("opus"), &config).unwrap();
	assert_eq!(file.file_type(), FileType::Ogg);
	assert_eq!(file.tag().title(), Some("Foo title"));

	let mut edited = file.tag().clone();
	edited.set_artist("Bar artist");

	let out = file.save(&data, &edited, &config).unwrap();
	assert!(out.ends_with(&ogg_audio(2)));

	let file = read(&out);
	assert_eq!(file.tag().title(), Some("Foo title"));
	assert_eq!(file.tag().artist(), Some("Bar artist"));
}
