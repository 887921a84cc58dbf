use std::ffi::OsStr;
use std::fs::File;
use std::io::prelude::*;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::Compression;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;

fn is_gzipped(path: &Path) -> bool {
    path.extension() == Some(OsStr::new("gz"))
}

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read>>> {
    let file = File::open(path).with_context(|| format!("Failed to open file: {:?}", path))?;
    let file: Box<dyn Read> = match is_gzipped(path) {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::new(file))
}

/// Get a reader for either a gzipped, non-gzipped file, or stdin
///
/// # Arguments
///
/// - file_path: path to the file to read, or '-' for stdin
///
/// # Returns
///
/// A `BufReader` object for a given file path or stdin.
pub fn get_dynamic_reader_w_stdin(file_path_str: &str) -> Result<BufReader<Box<dyn Read>>> {
    if file_path_str == "-" {
        Ok(BufReader::new(Box::new(std::io::stdin()) as Box<dyn Read>))
    } else {
        get_dynamic_reader(Path::new(file_path_str))
    }
}

/// A file writer that may gzip on the way out.
pub enum DynamicWriter {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl Write for DynamicWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            DynamicWriter::Plain(w) => w.write(buf),
            DynamicWriter::Gzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            DynamicWriter::Plain(w) => w.flush(),
            DynamicWriter::Gzip(w) => w.flush(),
        }
    }
}

impl DynamicWriter {
    /// Flush everything to disk, writing the gzip trailer if there is one.
    pub fn finish(self) -> std::io::Result<()> {
        match self {
            DynamicWriter::Plain(mut w) => w.flush(),
            DynamicWriter::Gzip(w) => w.finish()?.flush(),
        }
    }
}

///
/// Get a writer that gzips when the path ends in `.gz`. Parent directories
/// are created as needed. Call [`DynamicWriter::finish`] when done.
///
pub fn get_dynamic_writer(path: &Path) -> Result<DynamicWriter> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
    }
    let file = File::create(path).with_context(|| format!("Failed to create file: {:?}", path))?;
    let writer = match is_gzipped(path) {
        true => {
            DynamicWriter::Gzip(GzEncoder::new(BufWriter::new(file), Compression::default()))
        }
        false => DynamicWriter::Plain(BufWriter::new(file)),
    };

    Ok(writer)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case("plain.txt")]
    #[case("packed.txt.gz")]
    fn test_writer_reader_pair(#[case] name: &str) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(name);

        let mut writer = get_dynamic_writer(&path).unwrap();
        writeln!(writer, "chr1\t1\t2").unwrap();
        writer.finish().unwrap();

        let lines: Vec<String> = get_dynamic_reader(&path)
            .unwrap()
            .lines()
            .collect::<std::io::Result<_>>()
            .unwrap();
        assert_eq!(lines, vec!["chr1\t1\t2".to_string()]);
    }

    #[rstest]
    fn test_missing_file() {
        assert!(get_dynamic_reader(Path::new("/definitely/not/here.bed")).is_err());
    }
}
