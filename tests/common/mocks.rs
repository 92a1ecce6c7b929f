//! Mock version of an output file, used to simulate failing sinks.
use mockall::mock;

use std::io::{self, Write};

mock! {
    pub File {}
    impl Write for File {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize>;
        fn flush(&mut self) -> io::Result<()>;
    }
}

/// A file whose every write fails with `kind`.
pub fn failing_file(kind: io::ErrorKind) -> MockFile {
    let mut file = MockFile::new();
    file.expect_write()
        .returning(move |_| Err(io::Error::new(kind, "disk unavailable")));
    file.expect_flush().returning(|| Ok(()));
    file
}
