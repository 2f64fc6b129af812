pub(crate) const INVALID_KEYS: [&str; 4] = ["ID3", "TAG", "OGGS", "MP+"];

// https://wiki.hydrogenaud.io/index.php?title=APE_Tags_Header
pub(crate) const APE_PREAMBLE: &[u8; 8] = b"APETAGEX";

pub(crate) const APE_HEADER_SIZE: usize = 32;

pub(crate) const APE_V1: u32 = 1000;
pub(crate) const APE_V2: u32 = 2000;

pub(crate) const ITEM_TYPE_TEXT: u32 = 0;
pub(crate) const ITEM_TYPE_BINARY: u32 = 1;
