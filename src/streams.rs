// ABOUTME: Registry mapping opaque stream handles to host I/O resources
// ABOUTME: (spec.md §5: "a primitive's notion of current output is the value
// ABOUTME: of *Out visible via lookup"; this module is what that handle names)

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};

pub const STDIN: i64 = 0;
pub const STDOUT: i64 = 1;
pub const STDERR: i64 = 2;

enum StreamEntry {
    Input {
        reader: Box<dyn Read>,
        /// One-byte lookahead buffer, used by the reader for the dotted-pair
        /// lookahead described in spec.md §4.1.
        pending: Vec<u8>,
    },
    Output(Box<dyn Write>),
}

thread_local! {
    static STREAMS: RefCell<HashMap<i64, StreamEntry>> = RefCell::new(HashMap::new());
    static NEXT_HANDLE: Cell<i64> = const { Cell::new(3) };
}

/// Registers the three standard streams under their fixed handles. Safe to
/// call more than once (idempotent after the first call per thread).
pub fn init_standard_streams() {
    STREAMS.with(|streams| {
        let mut streams = streams.borrow_mut();
        streams.entry(STDIN).or_insert_with(|| StreamEntry::Input {
            reader: Box::new(io::stdin()),
            pending: Vec::new(),
        });
        streams
            .entry(STDOUT)
            .or_insert_with(|| StreamEntry::Output(Box::new(io::stdout())));
        streams
            .entry(STDERR)
            .or_insert_with(|| StreamEntry::Output(Box::new(io::stderr())));
    });
}

fn allocate_handle() -> i64 {
    NEXT_HANDLE.with(|n| {
        let handle = n.get();
        n.set(handle + 1);
        handle
    })
}

pub fn open_read(path: &str) -> io::Result<i64> {
    let file = File::open(path)?;
    let handle = allocate_handle();
    STREAMS.with(|streams| {
        streams.borrow_mut().insert(
            handle,
            StreamEntry::Input {
                reader: Box::new(file),
                pending: Vec::new(),
            },
        );
    });
    Ok(handle)
}

pub fn open_write(path: &str, append: bool) -> io::Result<i64> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .append(append)
        .truncate(!append)
        .open(path)?;
    let handle = allocate_handle();
    STREAMS.with(|streams| {
        streams
            .borrow_mut()
            .insert(handle, StreamEntry::Output(Box::new(file)));
    });
    Ok(handle)
}

/// Registers an in-memory input stream (used by `load` to feed source text
/// through the same read/eval loop as an interactive session).
pub fn open_in_memory_input(contents: Vec<u8>) -> i64 {
    let handle = allocate_handle();
    STREAMS.with(|streams| {
        streams.borrow_mut().insert(
            handle,
            StreamEntry::Input {
                reader: Box::new(io::Cursor::new(contents)),
                pending: Vec::new(),
            },
        );
    });
    handle
}

/// Closes `handle`. Returns `true` if a stream was actually registered under
/// that handle. spec.md §5: streams opened by `open` are not closed
/// automatically.
pub fn close(handle: i64) -> bool {
    STREAMS.with(|streams| streams.borrow_mut().remove(&handle).is_some())
}

pub fn exists(handle: i64) -> bool {
    STREAMS.with(|streams| streams.borrow().contains_key(&handle))
}

/// Reads one byte from `handle`, honoring any pushed-back byte first.
/// Returns `Ok(None)` at end of stream.
pub fn read_byte(handle: i64) -> io::Result<Option<u8>> {
    STREAMS.with(|streams| {
        let mut streams = streams.borrow_mut();
        let entry = streams
            .get_mut(&handle)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such stream handle"))?;
        match entry {
            StreamEntry::Input { reader, pending } => {
                if let Some(b) = pending.pop() {
                    return Ok(Some(b));
                }
                let mut buf = [0u8; 1];
                match reader.read(&mut buf)? {
                    0 => Ok(None),
                    _ => Ok(Some(buf[0])),
                }
            }
            StreamEntry::Output(_) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "stream is not open for reading",
            )),
        }
    })
}

/// Pushes a byte back onto `handle` so the next `read_byte` returns it again.
pub fn push_back(handle: i64, byte: u8) {
    STREAMS.with(|streams| {
        if let Some(StreamEntry::Input { pending, .. }) = streams.borrow_mut().get_mut(&handle) {
            pending.push(byte);
        }
    });
}

pub fn write_bytes(handle: i64, bytes: &[u8]) -> io::Result<()> {
    STREAMS.with(|streams| {
        let mut streams = streams.borrow_mut();
        let entry = streams
            .get_mut(&handle)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such stream handle"))?;
        match entry {
            StreamEntry::Output(writer) => {
                writer.write_all(bytes)?;
                writer.flush()
            }
            StreamEntry::Input { .. } => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "stream is not open for writing",
            )),
        }
    })
}

pub fn write_str(handle: i64, s: &str) -> io::Result<()> {
    write_bytes(handle, s.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn in_memory_read_reads_registered_bytes() {
        let handle = open_in_memory_input(b"ab".to_vec());
        assert_eq!(read_byte(handle).unwrap(), Some(b'a'));
        assert_eq!(read_byte(handle).unwrap(), Some(b'b'));
        assert_eq!(read_byte(handle).unwrap(), None);
        close(handle);
    }

    #[test]
    #[serial]
    fn push_back_is_replayed_before_reader() {
        let handle = open_in_memory_input(b"xy".to_vec());
        assert_eq!(read_byte(handle).unwrap(), Some(b'x'));
        push_back(handle, b'x');
        assert_eq!(read_byte(handle).unwrap(), Some(b'x'));
        assert_eq!(read_byte(handle).unwrap(), Some(b'y'));
        close(handle);
    }

    #[test]
    #[serial]
    fn close_reports_whether_handle_existed() {
        let handle = open_in_memory_input(Vec::new());
        assert!(close(handle));
        assert!(!close(handle));
    }
}
