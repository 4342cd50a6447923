//! Output compression for dump files

use bzip2::write::BzEncoder;
use flate2::write::GzEncoder;
use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;
use tempfile::{Builder, NamedTempFile};
use xz2::write::XzEncoder;

/// xz preset used by the `xz` CLI by default
const XZ_PRESET: u32 = 6;

/// Compression algorithm applied to dump output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    Gzip,
    Xz,
    Bzip2,
    #[default]
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown compression algorithm: {0}")]
pub struct UnknownCompression(pub String);

impl FromStr for Compression {
    type Err = UnknownCompression;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gzip" => Ok(Compression::Gzip),
            "lzma" | "xz" => Ok(Compression::Xz),
            "bz2" => Ok(Compression::Bzip2),
            "plain" => Ok(Compression::Plain),
            other => Err(UnknownCompression(other.to_string())),
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Compression::Gzip => "gzip",
            Compression::Xz => "xz",
            Compression::Bzip2 => "bz2",
            Compression::Plain => "plain",
        };
        f.write_str(name)
    }
}

impl Compression {
    /// File suffix appended after the provider's extension
    pub fn file_suffix(&self) -> &'static str {
        match self {
            Compression::Gzip => ".gz",
            Compression::Xz => ".xz",
            Compression::Bzip2 => ".bz2",
            Compression::Plain => "",
        }
    }

    /// Wrap a file in the matching encoder
    pub fn sink(&self, file: File) -> CompressedSink {
        match self {
            Compression::Gzip => {
                CompressedSink::Gzip(GzEncoder::new(file, flate2::Compression::default()))
            }
            Compression::Xz => CompressedSink::Xz(XzEncoder::new(file, XZ_PRESET)),
            Compression::Bzip2 => {
                CompressedSink::Bzip2(BzEncoder::new(file, bzip2::Compression::default()))
            }
            Compression::Plain => CompressedSink::Plain(file),
        }
    }
}

/// Writer that compresses into a file
///
/// `finish` must be called; dropping an encoder swallows trailer write errors.
pub enum CompressedSink {
    Gzip(GzEncoder<File>),
    Xz(XzEncoder<File>),
    Bzip2(BzEncoder<File>),
    Plain(File),
}

impl CompressedSink {
    /// Write the codec trailer and hand back the underlying file
    pub fn finish(self) -> io::Result<File> {
        let mut file = match self {
            CompressedSink::Gzip(encoder) => encoder.finish()?,
            CompressedSink::Xz(encoder) => encoder.finish()?,
            CompressedSink::Bzip2(encoder) => encoder.finish()?,
            CompressedSink::Plain(file) => file,
        };
        file.flush()?;
        Ok(file)
    }
}

impl Write for CompressedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            CompressedSink::Gzip(w) => w.write(buf),
            CompressedSink::Xz(w) => w.write(buf),
            CompressedSink::Bzip2(w) => w.write(buf),
            CompressedSink::Plain(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            CompressedSink::Gzip(w) => w.flush(),
            CompressedSink::Xz(w) => w.flush(),
            CompressedSink::Bzip2(w) => w.flush(),
            CompressedSink::Plain(w) => w.flush(),
        }
    }
}

/// Create an owner-only temporary file next to `final_name`
///
/// The name is dot-prefixed and ends in `.tmp` so it is never mistaken for a
/// finished backup.
pub fn create_private_temp(dir: &Path, final_name: &str) -> io::Result<NamedTempFile> {
    let prefix = format!(".{}.", final_name);
    let temp = Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(dir)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(temp.path(), std::fs::Permissions::from_mode(0o600))?;
    }

    Ok(temp)
}
