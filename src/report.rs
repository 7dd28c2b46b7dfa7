//! Thread-safe console reporting.
//!
//! Fetch sessions for one pack may run on many workers at once, and each of
//! them writes diagnostics to the same console. Every message goes through a
//! single process-wide lock so lines are never interleaved mid-write. The
//! lock is scoped to one write; it is never held across network I/O or
//! retry sleeps.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

static PRINT_LOCK: Mutex<()> = Mutex::new(());

/// Writes one diagnostic line to stdout.
///
/// Safe to call from any number of threads or tasks without external
/// synchronization. No ordering is guaranteed across calls, only that each
/// individual message comes out in one piece. A failed stdout write panics;
/// there is no error to hand back from a diagnostic path.
pub fn report(message: &str) {
    write_locked(&mut io::stdout().lock(), message);
}

fn write_locked<W: Write>(out: &mut W, message: &str) {
    // Recover a poisoned lock: a panicking reporter must not silence the rest.
    let _guard = PRINT_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    writeln!(out, "{message}").expect("console write failed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    /// Writes one byte per call, yielding first, so that unsynchronized
    /// concurrent writers would interleave almost surely.
    #[derive(Clone)]
    struct TricklingWriter {
        buf: Arc<Mutex<Vec<u8>>>,
    }

    impl Write for TricklingWriter {
        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            if data.is_empty() {
                return Ok(0);
            }
            thread::yield_now();
            self.buf.lock().unwrap().push(data[0]);
            Ok(1)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn concurrent_messages_are_never_interleaved() {
        let writer = TricklingWriter {
            buf: Arc::new(Mutex::new(Vec::new())),
        };

        let handles: Vec<_> = (0..50)
            .map(|i| {
                let mut writer = writer.clone();
                thread::spawn(move || {
                    write_locked(&mut writer, &format!("worker {i:02} failed to fetch its file"))
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let captured = writer.buf.lock().unwrap().clone();
        let output = String::from_utf8(captured).unwrap();
        let mut lines: Vec<&str> = output.lines().collect();
        lines.sort_unstable();

        let mut expected: Vec<String> = (0..50)
            .map(|i| format!("worker {i:02} failed to fetch its file"))
            .collect();
        expected.sort_unstable();

        assert_eq!(lines, expected);
    }

    #[test]
    fn single_message_ends_with_newline() {
        let mut buf = Vec::new();
        write_locked(&mut buf, "hello");
        assert_eq!(buf, b"hello\n");
    }
}
