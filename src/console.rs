//! Raw console mode switching
//!
//! The serial console normally runs line-buffered with editing and echo.
//! For binary transfers the transport must pass bytes through untouched,
//! so a shared flag tells every console consumer which mode is active.
//! This module owns that flag and the timed raw read / bulk raw write
//! operations around it.
//!
//! The flag is the only shared datum here and the lock around it is held
//! only for the set/clear transitions. Holding it across a transfer would
//! stall unrelated flag readers for the whole timeout window.

use core::cell::Cell;

use critical_section::Mutex;
use heapless::Vec;

use crate::types::{MachineError, Result};

/// Upper bound in bytes on a single raw read.
pub const RAW_READ_MAX: usize = 1024;

/// Console transport collaborator.
///
/// The transport watches the raw-mode flag: while it is set, no line
/// editing, echo, or control-character interpretation may happen.
pub trait ConsoleTransport {
    /// Pull one byte, waiting at most `timeout_ms`. `None` means the wait
    /// timed out with no byte available.
    fn read_char(&mut self, timeout_ms: u32) -> Option<u8>;

    /// Write the whole buffer, blocking until the transport accepts it.
    fn write_bytes(&mut self, buf: &[u8]);

    /// Drain buffered output synchronously.
    fn flush(&mut self);
}

/// Shared raw-mode flag.
///
/// Single source of truth for console consumers. `const`-constructible so
/// it can live in a `static` shared between the controller and the
/// transport's interrupt side.
pub struct RawModeFlag {
    raw: Mutex<Cell<bool>>,
}

impl RawModeFlag {
    /// Create the flag in line mode.
    pub const fn new() -> Self {
        Self {
            raw: Mutex::new(Cell::new(false)),
        }
    }

    /// Whether the console is currently in raw mode.
    pub fn is_raw(&self) -> bool {
        critical_section::with(|cs| self.raw.borrow(cs).get())
    }

    fn set(&self, value: bool) {
        critical_section::with(|cs| self.raw.borrow(cs).set(value));
    }
}

impl Default for RawModeFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Raw-mode transfer controller over a console transport.
///
/// Concurrent raw transfers from multiple tasks are not serialized here
/// beyond the flag transitions; interleaved byte streams are a caller
/// error. Each controller takes `&mut self` per transfer, so a single
/// instance cannot interleave with itself.
pub struct RawConsole<'a, T: ConsoleTransport> {
    transport: T,
    flag: &'a RawModeFlag,
}

impl<'a, T: ConsoleTransport> RawConsole<'a, T> {
    /// Create a controller sharing the given mode flag.
    pub fn new(transport: T, flag: &'a RawModeFlag) -> Self {
        Self { transport, flag }
    }

    /// Read up to `size` bytes in raw mode with a per-character timeout.
    ///
    /// A timeout mid-read is not an error: it ends the read early with
    /// whatever was collected. `Ok(None)` means no data at all, either
    /// because `size` was zero (raw mode is then never engaged) or
    /// because the first character wait timed out. Requests larger than
    /// [`RAW_READ_MAX`] are rejected with
    /// [`MachineError::BufferFull`].
    pub fn read_raw(
        &mut self,
        size: usize,
        timeout_ms: u32,
    ) -> Result<Option<Vec<u8, RAW_READ_MAX>>> {
        if size == 0 {
            return Ok(None);
        }
        if size > RAW_READ_MAX {
            return Err(MachineError::BufferFull);
        }

        self.flag.set(true);

        let mut collected: Vec<u8, RAW_READ_MAX> = Vec::new();
        while collected.len() < size {
            match self.transport.read_char(timeout_ms) {
                // size <= RAW_READ_MAX, so push cannot overflow
                Some(byte) => {
                    let _ = collected.push(byte);
                }
                None => break,
            }
        }

        self.flag.set(false);

        if collected.is_empty() {
            Ok(None)
        } else {
            Ok(Some(collected))
        }
    }

    /// Write the whole buffer in raw mode.
    ///
    /// Blocks until the transport accepts every byte; no length limit is
    /// enforced here. Returns the number of bytes written, always
    /// `buf.len()`.
    pub fn write_raw(&mut self, buf: &[u8]) -> usize {
        self.flag.set(true);
        self.transport.write_bytes(buf);
        self.flag.set(false);
        buf.len()
    }

    /// Drain the transport's buffered output.
    pub fn flush(&mut self) {
        self.transport.flush();
    }

    /// Access the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Transport that serves scripted bytes and records the flag state it
    /// observed during each operation.
    struct ScriptedTransport<'a> {
        input: std::vec::Vec<Option<u8>>,
        next: usize,
        flag: &'a RawModeFlag,
        flag_during_reads: std::vec::Vec<bool>,
        flag_during_write: Option<bool>,
        written: std::vec::Vec<u8>,
    }

    impl<'a> ScriptedTransport<'a> {
        fn new(input: &[Option<u8>], flag: &'a RawModeFlag) -> Self {
            Self {
                input: input.to_vec(),
                next: 0,
                flag,
                flag_during_reads: std::vec::Vec::new(),
                flag_during_write: None,
                written: std::vec::Vec::new(),
            }
        }
    }

    impl ConsoleTransport for ScriptedTransport<'_> {
        fn read_char(&mut self, _timeout_ms: u32) -> Option<u8> {
            self.flag_during_reads.push(self.flag.is_raw());
            let c = self.input.get(self.next).copied().flatten();
            self.next += 1;
            c
        }

        fn write_bytes(&mut self, buf: &[u8]) {
            self.flag_during_write = Some(self.flag.is_raw());
            self.written.extend_from_slice(buf);
        }

        fn flush(&mut self) {}
    }

    #[test]
    fn test_zero_size_read_returns_none_without_engaging_raw_mode() {
        let flag = RawModeFlag::new();
        let transport = ScriptedTransport::new(&[Some(1)], &flag);
        let mut console = RawConsole::new(transport, &flag);

        assert_eq!(console.read_raw(0, 100).unwrap(), None);
        assert!(!flag.is_raw());
        assert!(
            console.transport_mut().flag_during_reads.is_empty(),
            "zero-size read must not poll the transport"
        );
    }

    #[test]
    fn test_full_read_collects_exactly_size_bytes() {
        let flag = RawModeFlag::new();
        let transport =
            ScriptedTransport::new(&[Some(b'a'), Some(b'b'), Some(b'c'), Some(b'd')], &flag);
        let mut console = RawConsole::new(transport, &flag);

        let bytes = console.read_raw(3, 100).unwrap().unwrap();
        assert_eq!(&bytes[..], b"abc");
        assert!(!flag.is_raw(), "flag must clear after the read");
    }

    #[test]
    fn test_timeout_midway_returns_partial_data() {
        let flag = RawModeFlag::new();
        let transport = ScriptedTransport::new(&[Some(b'x'), Some(b'y'), None], &flag);
        let mut console = RawConsole::new(transport, &flag);

        let bytes = console.read_raw(10, 100).unwrap().unwrap();
        assert_eq!(&bytes[..], b"xy", "short read returns exactly what arrived");
    }

    #[test]
    fn test_timeout_on_first_byte_returns_none() {
        let flag = RawModeFlag::new();
        let transport = ScriptedTransport::new(&[None], &flag);
        let mut console = RawConsole::new(transport, &flag);

        assert_eq!(console.read_raw(4, 100).unwrap(), None);
        assert!(!flag.is_raw());
    }

    #[test]
    fn test_transport_observes_raw_mode_during_read() {
        let flag = RawModeFlag::new();
        let transport = ScriptedTransport::new(&[Some(1), Some(2), None], &flag);
        let mut console = RawConsole::new(transport, &flag);

        let _ = console.read_raw(8, 100).unwrap();
        let observed = &console.transport_mut().flag_during_reads;
        assert!(!observed.is_empty());
        assert!(
            observed.iter().all(|raw| *raw),
            "every poll must happen with the flag set"
        );
    }

    #[test]
    fn test_oversized_read_is_rejected() {
        let flag = RawModeFlag::new();
        let transport = ScriptedTransport::new(&[], &flag);
        let mut console = RawConsole::new(transport, &flag);

        assert_eq!(
            console.read_raw(RAW_READ_MAX + 1, 100),
            Err(MachineError::BufferFull)
        );
        assert!(!flag.is_raw());
    }

    #[test]
    fn test_write_raw_reports_full_length_and_toggles_flag() {
        let flag = RawModeFlag::new();
        let transport = ScriptedTransport::new(&[], &flag);
        let mut console = RawConsole::new(transport, &flag);

        assert!(!flag.is_raw());
        let written = console.write_raw(b"binary payload");
        assert_eq!(written, 14);
        assert!(!flag.is_raw(), "flag must be clear again after the write");

        let transport = console.transport_mut();
        assert_eq!(transport.written, b"binary payload");
        assert_eq!(
            transport.flag_during_write,
            Some(true),
            "transport must see raw mode during the transfer"
        );
    }
}
