use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};

/// Text decoded from a file, remembering how to encode it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding: &'static Encoding,
}

pub fn looks_binary(bytes: &[u8]) -> bool {
    bytes.contains(&0)
}

/// UTF-8 first, Windows-1252 as the fallback. Content with NUL bytes is not text.
pub fn decode_best_effort(bytes: Vec<u8>) -> io::Result<DecodedText> {
    if looks_binary(&bytes) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "binary content (NUL byte found)",
        ));
    }
    match String::from_utf8(bytes) {
        Ok(text) => Ok(DecodedText {
            text,
            encoding: UTF_8,
        }),
        Err(err) => {
            let (res, _, _) = WINDOWS_1252.decode(err.as_bytes());
            Ok(DecodedText {
                text: res.into_owned(),
                encoding: WINDOWS_1252,
            })
        }
    }
}

pub fn read_text_best_effort(path: &Path) -> io::Result<DecodedText> {
    decode_best_effort(fs::read(path)?)
}

pub fn encode_text(text: &str, encoding: &'static Encoding) -> Vec<u8> {
    if encoding == UTF_8 {
        return text.as_bytes().to_vec();
    }
    let (bytes, _, _) = encoding.encode(text);
    bytes.into_owned()
}

/// Forward-slash form used for glob matching.
pub fn slash_path(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}

/// Mirror `source` (found under `root`) beneath `out_root`. A file root maps to
/// `out_root/<file name>`.
pub fn mirror_path(source: &Path, root: &Path, out_root: &Path) -> PathBuf {
    let rel = match source.strip_prefix(root) {
        Ok(rel) if rel != Path::new("") => rel.to_path_buf(),
        _ => source.file_name().map(PathBuf::from).unwrap_or_default(),
    };
    let mut dest = out_root.to_path_buf();
    for comp in rel.components() {
        if let Component::Normal(name) = comp {
            dest.push(name);
        }
    }
    dest
}
