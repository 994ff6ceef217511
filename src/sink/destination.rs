use std::{
    fs::File,
    io::{self, Write},
    path::Path,
};

/// Where encoded bytes end up.
#[derive(Debug)]
pub enum Destination {
    Buffer(Vec<u8>),
    File(File),
}

impl Destination {
    pub fn buffer() -> Self {
        Destination::Buffer(Vec::new())
    }

    /// Opens `path` for writing, truncating any previous contents.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        File::create(path).map(Destination::File)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Destination::Buffer(_) => "buffer",
            Destination::File(_) => "file",
        }
    }

    /// Flushes the destination and gives back the accumulated bytes for a
    /// buffer. A file is synced to disk and closed.
    pub fn close(mut self) -> io::Result<Option<Vec<u8>>> {
        self.flush()?;
        match self {
            Destination::Buffer(bytes) => Ok(Some(bytes)),
            Destination::File(file) => {
                file.sync_all()?;
                Ok(None)
            }
        }
    }
}

impl Write for Destination {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Destination::Buffer(bytes) => bytes.write(buf),
            Destination::File(file) => file.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Destination::Buffer(bytes) => bytes.flush(),
            Destination::File(file) => file.flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn buffer_returns_written_bytes() {
        let mut destination = Destination::buffer();
        destination.write_all(b"a,b\n").unwrap();

        assert_eq!(destination.kind(), "buffer");
        assert_eq!(destination.close().unwrap(), Some(b"a,b\n".to_vec()));
    }

    #[test]
    fn file_is_truncated_on_create() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), "previous contents that are longer").unwrap();

        let mut destination = Destination::create(temp_file.path()).unwrap();
        destination.write_all(b"x\n").unwrap();
        assert_eq!(destination.kind(), "file");
        assert_eq!(destination.close().unwrap(), None);

        assert_eq!(fs::read_to_string(temp_file.path()).unwrap(), "x\n");
    }
}
