use crate::util::{
	self, BLOCK_PADDING, BLOCK_PICTURE, BLOCK_SEEKTABLE, BLOCK_STREAMINFO, BLOCK_VORBIS_COMMENT,
	flac, flac_block, flac_picture, vorbis_comments,
};

use tagmeld::config::EngineConfig;
use tagmeld::file::{FileType, TaggedFile};
use tagmeld::picture::{Picture, PictureType};
use tagmeld::rewrite::PresenceStatus;
use tagmeld::tag::TagFormat;

const PNG: [u8; 12] = [
	0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0xDE, 0xAD, 0xBE, 0xEF,
];

fn read(data: &[u8]) -> TaggedFile {
	TaggedFile::read_from_bytes(data, FileType::Flac, &EngineConfig::new()).unwrap()
}

fn block_types(file: &TaggedFile) -> Vec<u8> {
	file.layout()
		.flac_blocks()
		.unwrap()
		.iter()
		.map(|block| block.ty())
		.collect()
}

fn sample() -> Vec<u8> {
	flac(&[
		flac_block(BLOCK_STREAMINFO, &[0; 34]),
		flac_block(BLOCK_SEEKTABLE, &[0; 18]),
		flac_block(
			BLOCK_VORBIS_COMMENT,
			&vorbis_comments("reference libFLAC 1.4.3", &[
				"TITLE=Foo title",
				"ARTIST=Bar artist",
				"MOOD=Upbeat",
			]),
		),
		flac_block(BLOCK_PICTURE, &flac_picture(3, &PNG)),
		flac_block(BLOCK_PADDING, &[0; 256]),
	])
}

#[test_log::test]
fn read_flac() {
	let data = sample();
	let file = TaggedFile::read_from(&mut std::io::Cursor::new(&data), None, &EngineConfig::new())
		.unwrap();

	assert_eq!(file.file_type(), FileType::Flac);
	assert!(file.decode_errors().is_empty());
	assert_eq!(
		block_types(&file),
		[
			BLOCK_STREAMINFO,
			BLOCK_SEEKTABLE,
			BLOCK_VORBIS_COMMENT,
			BLOCK_PICTURE,
			BLOCK_PADDING
		]
	);

	let tag = file.tag();
	assert_eq!(tag.title(), Some("Foo title"));
	assert_eq!(tag.artist(), Some("Bar artist"));
	assert_eq!(tag.additional().get("MOOD"), Some("Upbeat"));

	let front = tag.pictures().first_of_type(PictureType::CoverFront).unwrap();
	assert_eq!(front.data(), &PNG);
}

#[test_log::test]
fn no_edits_is_identity() {
	let data = sample();
	let file = read(&data);

	let config = EngineConfig::new();
	assert_eq!(file.save(&data, file.tag(), &config).unwrap(), data);
}

#[test_log::test]
fn edit_reuses_padding() {
	let data = sample();
	let file = read(&data);
	let config = EngineConfig::new();

	let mut edited = file.tag().clone();
	edited.set_album("A brand new album");

	let plan = file.plan(&edited, &config).unwrap();
	assert_eq!(plan.status(TagFormat::VorbisComments), Some(PresenceStatus::Modified));

	let out = file.save(&data, &edited, &config).unwrap();
	assert_eq!(out.len(), data.len());

	let new_file = read(&out);
	assert_eq!(new_file.layout().audio(), file.layout().audio());
	assert_eq!(&out[new_file.layout().audio()], &data[file.layout().audio()]);

	let tag = new_file.tag();
	assert_eq!(tag.album(), Some("A brand new album"));
	assert_eq!(tag.title(), Some("Foo title"));
	assert_eq!(tag.pictures().len(), 1);
	assert_eq!(
		block_types(&new_file),
		[
			BLOCK_STREAMINFO,
			BLOCK_SEEKTABLE,
			BLOCK_VORBIS_COMMENT,
			BLOCK_PICTURE,
			BLOCK_PADDING
		]
	);
}

#[test_log::test]
fn add_picture() {
	let data = sample();
	let file = read(&data);
	let config = EngineConfig::new();

	let mut back = Picture::from_bytes(PNG.to_vec()).unwrap();
	back.set_pic_type(PictureType::CoverBack);

	let mut edited = file.tag().clone();
	edited.pictures_mut().push(back);

	let out = file.save(&data, &edited, &config).unwrap();
	let new_file = read(&out);

	let pictures = new_file.tag().pictures();
	assert_eq!(pictures.len(), 2);
	assert!(pictures.first_of_type(PictureType::CoverFront).is_some());
	assert_eq!(pictures.first_of_type(PictureType::CoverBack).unwrap().data(), &PNG);

	let picture_blocks = block_types(&new_file)
		.into_iter()
		.filter(|ty| *ty == BLOCK_PICTURE)
		.count();
	assert_eq!(picture_blocks, 2);
}

#[test_log::test]
fn remove_vorbis_comments() {
	let data = sample();
	let file = read(&data);
	let config = EngineConfig::new();

	let footprint = file
		.layout()
		.flac_blocks()
		.unwrap()
		.iter()
		.filter(|block| [BLOCK_VORBIS_COMMENT, BLOCK_PICTURE].contains(&block.ty()))
		.map(|block| block.range().len())
		.sum::<usize>();

	let out = file.remove(&data, TagFormat::VorbisComments, &config).unwrap();
	assert_eq!(out.len(), data.len() - footprint);

	let new_file = read(&out);
	assert!(!new_file.layout().contains(TagFormat::VorbisComments));
	assert!(new_file.tag().is_empty());
	assert_eq!(
		block_types(&new_file),
		[BLOCK_STREAMINFO, BLOCK_SEEKTABLE, BLOCK_PADDING]
	);
}

#[test_log::test]
fn add_comments_to_bare_stream() {
	let data = flac(&[
		flac_block(BLOCK_STREAMINFO, &[0; 34]),
		flac_block(BLOCK_SEEKTABLE, &[0; 18]),
	]);
	let file = read(&data);
	let config = EngineConfig::new();
	assert!(file.layout().presences().next().is_none());

	let mut edited = file.tag().clone();
	edited.set_title("Foo title");

	let plan = file.plan(&edited, &config).unwrap();
	assert_eq!(plan.status(TagFormat::VorbisComments), Some(PresenceStatus::Added));
	assert_eq!(plan.status(TagFormat::Id3v2), None);

	let out = file.save(&data, &edited, &config).unwrap();
	let new_file = read(&out);

	assert_eq!(new_file.tag().title(), Some("Foo title"));
	assert_eq!(block_types(&new_file)[..2], [BLOCK_STREAMINFO, BLOCK_VORBIS_COMMENT]);
	assert_eq!(&out[new_file.layout().audio()], &data[file.layout().audio()]);
}

#[test_log::test]
fn save_to_path() {
	let data = sample();
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("song.flac");
	std::fs::write(&path, &data).unwrap();

	let mut file = TaggedFile::read_from_path(&path).unwrap();
	assert_eq!(file.file_type(), FileType::Flac);

	let mut edited = file.tag().clone();
	edited.set_genre("Chiptune");
	file.save_to_path(&path, &edited).unwrap();

	assert_eq!(file.tag().genre(), Some("Chiptune"));

	let content = std::fs::read(&path).unwrap();
	assert_eq!(content.len(), data.len());
	assert_eq!(TaggedFile::read_from_path(&path).unwrap().tag().genre(), Some("Chiptune"));

	let mut temp = util::temp_file(&content);
	let reread = TaggedFile::read_from(&mut temp, Some("audio/flac"), &EngineConfig::new()).unwrap();
	assert_eq!(reread.tag(), file.tag());
}
