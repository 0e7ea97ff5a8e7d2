//! MP3 fixture files
//!
//! Files are a few silent-looking MPEG-1 Layer III frames (128 kbps,
//! 44.1 kHz). Nothing here decodes audio; the frames only make the files
//! look like MP3s to the tag codec.

use id3::TagLike;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// MPEG-1 Layer III, 128 kbps, 44.1 kHz, no padding
pub const FRAME_HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0x64];

/// 144 * 128000 / 44100
pub const FRAME_LEN: usize = 417;

pub fn mp3_bytes(frames: usize) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(frames * FRAME_LEN);
    for _ in 0..frames {
        bytes.extend_from_slice(&FRAME_HEADER);
        bytes.resize(bytes.len() + FRAME_LEN - FRAME_HEADER.len(), 0);
    }
    bytes
}

/// Untagged MP3 at `dir/name`
pub fn write_mp3(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, mp3_bytes(4)).unwrap();
    path
}

/// MP3 carrying an ID3v2.4 tag with the given fields
pub fn write_tagged_mp3(dir: &Path, name: &str, title: Option<&str>, artist: Option<&str>) -> PathBuf {
    let path = write_mp3(dir, name);
    let mut tag = id3::Tag::new();
    if let Some(title) = title {
        tag.set_title(title);
    }
    if let Some(artist) = artist {
        tag.set_artist(artist);
    }
    tag.write_to_path(&path, id3::Version::Id3v24).unwrap();
    path
}

/// `(title, artist)` of the tag at `path`; both `None` when untagged
pub fn read_tag(path: &Path) -> (Option<String>, Option<String>) {
    match id3::Tag::read_from_path(path) {
        Ok(tag) => (
            tag.title().map(str::to_owned),
            tag.artist().map(str::to_owned),
        ),
        Err(_) => (None, None),
    }
}

/// Temp music folder holding one untagged MP3 per name
pub fn music_dir(names: &[&str]) -> (TempDir, Vec<PathBuf>) {
    let dir = TempDir::new().unwrap();
    let paths = names.iter().map(|n| write_mp3(dir.path(), n)).collect();
    (dir, paths)
}
