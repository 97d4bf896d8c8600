use crate::error::SplitResult;
use std::{
    fs::File,
    io::{Seek, Write},
    path::Path,
};
use tracing::{debug, info};
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

/// Destination for the encoded slices, each stored as a named entry.
pub trait ArchiveSink {
    fn add_entry(&mut self, name: &str, bytes: &[u8]) -> SplitResult<()>;
}

/// Writes entries into a deflate-compressed zip archive.
pub struct ZipArchive<W: Write + Seek = File> {
    writer: ZipWriter<W>,
    entries: usize,
}

impl ZipArchive {
    pub fn create(path: &Path) -> SplitResult<Self> {
        info!("Creating archive {}", path.display());
        Ok(Self::new(File::create(path)?))
    }
}

impl<W: Write + Seek> ZipArchive<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: ZipWriter::new(inner),
            entries: 0,
        }
    }

    /// Writes the central directory, returning the underlying writer.
    pub fn finish(self) -> SplitResult<W> {
        debug!("Finishing archive with {} entries", self.entries);
        Ok(self.writer.finish()?)
    }
}

impl<W: Write + Seek> ArchiveSink for ZipArchive<W> {
    fn add_entry(&mut self, name: &str, bytes: &[u8]) -> SplitResult<()> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.writer.start_file(name, options)?;
        self.writer.write_all(bytes)?;
        self.entries += 1;
        debug!("Added {} bytes to archive as {name}", bytes.len());
        Ok(())
    }
}

/// Keeps entries in memory, in the order they were added.
#[derive(Default, Debug, Clone)]
pub struct MemoryArchive {
    pub entries: Vec<(String, Vec<u8>)>,
}

impl ArchiveSink for MemoryArchive {
    fn add_entry(&mut self, name: &str, bytes: &[u8]) -> SplitResult<()> {
        self.entries.push((name.to_owned(), bytes.to_vec()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    #[test]
    fn zip_entries_round_trip() {
        let mut archive = ZipArchive::new(Cursor::new(Vec::new()));
        archive.add_entry("a_range_1.cdf", b"first").unwrap();
        archive.add_entry("a_range_2.cdf", &[0u8; 1000]).unwrap();
        let cursor = archive.finish().unwrap();

        let mut zip = zip::ZipArchive::new(cursor).unwrap();
        assert_eq!(zip.len(), 2);
        let mut entry = zip.by_name("a_range_1.cdf").unwrap();
        assert_eq!(entry.compression(), CompressionMethod::Deflated);
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents).unwrap();
        assert_eq!(contents, b"first");
    }

    #[test]
    fn empty_zip_is_valid() {
        let cursor = ZipArchive::new(Cursor::new(Vec::new())).finish().unwrap();
        assert_eq!(zip::ZipArchive::new(cursor).unwrap().len(), 0);
    }

    #[test]
    fn memory_archive_keeps_order() {
        let mut archive = MemoryArchive::default();
        archive.add_entry("b", b"2").unwrap();
        archive.add_entry("a", b"1").unwrap();
        let names: Vec<_> = archive.entries.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
    }
}
