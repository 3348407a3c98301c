//! Reading module files into memory, decompressing gzip, xz and zstd images
use flate2::read::MultiGzDecoder;
use log::debug;
use memmap2::Mmap;
use std::fs::File;
use std::io::{self, Read};
use std::ops::Deref;
use std::path::Path;
use xz2::read::XzDecoder;

/// gzip magic bytes (RFC 1952)
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
/// xz stream header magic
pub const XZ_MAGIC: [u8; 6] = [0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00];
/// zstd frame magic (little-endian 0xFD2FB528)
pub const ZSTD_MAGIC: [u8; 4] = [0x28, 0xb5, 0x2f, 0xfd];

/// Compressed container formats recognized by their magic bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Gzip,
    Xz,
    Zstd,
}

impl Compression {
    pub fn detect(header: &[u8]) -> Option<Self> {
        if header.starts_with(&GZIP_MAGIC) {
            Some(Compression::Gzip)
        } else if header.starts_with(&XZ_MAGIC) {
            Some(Compression::Xz)
        } else if header.starts_with(&ZSTD_MAGIC) {
            Some(Compression::Zstd)
        } else {
            None
        }
    }

    fn decode(self, compressed: &[u8]) -> io::Result<Vec<u8>> {
        let mut out = Vec::with_capacity(compressed.len() * 4);
        match self {
            Compression::Gzip => MultiGzDecoder::new(compressed).read_to_end(&mut out)?,
            Compression::Xz => XzDecoder::new_multi_decoder(compressed).read_to_end(&mut out)?,
            Compression::Zstd => return zstd::decode_all(compressed),
        };
        Ok(out)
    }
}

/// Full contents of one module file
pub enum ModuleImage {
    /// Uncompressed regular file, mapped read-only
    Mapped(Mmap),
    /// Decompressed or streamed contents held on the heap
    Owned(Vec<u8>),
}

impl ModuleImage {
    /// Open `path` and return its (decompressed) contents. Regular non-empty
    /// files are mapped; pipes, character devices and procfs/sysfs entries
    /// (which report a zero length) are read to the end.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let metadata = file.metadata()?;
        if !metadata.is_file() || metadata.len() == 0 {
            debug!("reading {} as a stream", path.display());
            return Self::from_reader(file);
        }

        let mapped = unsafe { Mmap::map(&file)? };
        match Compression::detect(&mapped) {
            Some(format) => {
                debug!("decompressing {:?} module {}", format, path.display());
                format.decode(&mapped).map(ModuleImage::Owned)
            }
            None => Ok(ModuleImage::Mapped(mapped)),
        }
    }

    /// Read a whole (possibly compressed) image from `reader`.
    pub fn from_reader<R: Read>(mut reader: R) -> io::Result<Self> {
        let mut raw = Vec::new();
        reader.read_to_end(&mut raw)?;
        match Compression::detect(&raw) {
            Some(format) => format.decode(&raw).map(ModuleImage::Owned),
            None => Ok(ModuleImage::Owned(raw)),
        }
    }

    pub fn len(&self) -> usize {
        self.deref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.deref().is_empty()
    }
}

impl Deref for ModuleImage {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            ModuleImage::Mapped(mapped) => mapped,
            ModuleImage::Owned(bytes) => bytes,
        }
    }
}
