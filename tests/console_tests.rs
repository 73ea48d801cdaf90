//! Raw console mode integration tests
//!
//! Exercises the controller against the in-memory host transport, where
//! an exhausted input queue models a per-character timeout.

use machine_core::console::{ConsoleTransport, RawConsole, RawModeFlag, RAW_READ_MAX};
use machine_core::host::HostConsole;
use machine_core::MachineError;

// The flag is const-constructible for exactly this use: a process-wide
// static shared with the transport's other consumers.
static CONSOLE_RAW_MODE: RawModeFlag = RawModeFlag::new();

#[cfg(test)]
mod read_tests {
    use super::*;

    #[test]
    fn test_zero_size_read_is_none_for_any_timeout() {
        let flag = RawModeFlag::new();
        let mut console = RawConsole::new(HostConsole::with_input(b"pending"), &flag);

        for timeout_ms in [0, 1, 1000, u32::MAX] {
            assert_eq!(console.read_raw(0, timeout_ms).unwrap(), None);
        }
        assert!(!flag.is_raw());
        assert_eq!(
            console.transport_mut().read_char(10),
            Some(b'p'),
            "queued input must be untouched by zero-size reads"
        );
    }

    #[test]
    fn test_exact_size_read() {
        let flag = RawModeFlag::new();
        let mut console = RawConsole::new(HostConsole::with_input(b"abcdef"), &flag);

        let bytes = console.read_raw(6, 50).unwrap().expect("six bytes queued");
        assert_eq!(&bytes[..], b"abcdef");
        assert!(!flag.is_raw());
    }

    #[test]
    fn test_read_stops_at_requested_size() {
        let flag = RawModeFlag::new();
        let mut console = RawConsole::new(HostConsole::with_input(b"abcdef"), &flag);

        let bytes = console.read_raw(4, 50).unwrap().expect("four bytes");
        assert_eq!(&bytes[..], b"abcd");
        assert_eq!(
            console.transport_mut().read_char(10),
            Some(b'e'),
            "bytes past the requested size stay queued"
        );
    }

    #[test]
    fn test_short_read_returns_partial_unpadded() {
        let flag = RawModeFlag::new();
        let mut console = RawConsole::new(HostConsole::with_input(b"xy"), &flag);

        let bytes = console
            .read_raw(64, 50)
            .unwrap()
            .expect("two bytes arrived before the timeout");
        assert_eq!(bytes.len(), 2, "short read must not be padded to the request");
        assert_eq!(&bytes[..], b"xy");
    }

    #[test]
    fn test_no_data_at_all_is_none_not_error() {
        let flag = RawModeFlag::new();
        let mut console = RawConsole::new(HostConsole::new(), &flag);

        assert_eq!(console.read_raw(16, 50).unwrap(), None);
        assert!(!flag.is_raw());
    }

    #[test]
    fn test_read_up_to_the_bounded_maximum() {
        let flag = RawModeFlag::new();
        let mut transport = HostConsole::new();
        let payload = vec![0xA5u8; RAW_READ_MAX];
        transport.push_input(&payload);
        let mut console = RawConsole::new(transport, &flag);

        let bytes = console.read_raw(RAW_READ_MAX, 50).unwrap().expect("full buffer");
        assert_eq!(bytes.len(), RAW_READ_MAX);

        assert_eq!(
            console.read_raw(RAW_READ_MAX + 1, 50),
            Err(MachineError::BufferFull),
            "requests beyond the bound are user errors"
        );
    }

    #[test]
    fn test_binary_bytes_pass_through_unmodified() {
        let flag = RawModeFlag::new();
        // Control characters a line-mode console would eat or translate
        let input = [0x00, 0x03, 0x04, 0x08, 0x0A, 0x0D, 0x1B, 0x7F, 0xFF];
        let mut console = RawConsole::new(HostConsole::with_input(&input), &flag);

        let bytes = console.read_raw(input.len(), 50).unwrap().expect("all bytes");
        assert_eq!(&bytes[..], &input[..]);
    }
}

#[cfg(test)]
mod write_tests {
    use super::*;

    #[test]
    fn test_write_returns_full_length() {
        let flag = RawModeFlag::new();
        let mut console = RawConsole::new(HostConsole::new(), &flag);

        assert!(!flag.is_raw());
        assert_eq!(console.write_raw(b""), 0);
        assert_eq!(console.write_raw(b"payload"), 7);
        assert!(!flag.is_raw(), "flag clear immediately after write_raw returns");

        assert_eq!(console.transport_mut().written, b"payload");
    }

    #[test]
    fn test_large_write_is_not_length_limited() {
        let flag = RawModeFlag::new();
        let mut console = RawConsole::new(HostConsole::new(), &flag);

        // Larger than the read bound; writes have no such limit
        let payload = vec![0x5Au8; 4 * RAW_READ_MAX];
        assert_eq!(console.write_raw(&payload), 4 * RAW_READ_MAX);
        assert_eq!(console.transport_mut().written.len(), 4 * RAW_READ_MAX);
    }

    #[test]
    fn test_flush_reaches_the_transport() {
        let flag = RawModeFlag::new();
        let mut console = RawConsole::new(HostConsole::new(), &flag);

        console.write_raw(b"data");
        console.flush();
        assert_eq!(console.transport_mut().flush_count, 1);
    }
}

#[cfg(test)]
mod shared_flag_tests {
    use super::*;

    #[test]
    fn test_static_flag_transitions_are_observable_between_transfers() {
        let mut console = RawConsole::new(HostConsole::with_input(b"ab"), &CONSOLE_RAW_MODE);

        assert!(!CONSOLE_RAW_MODE.is_raw());
        let _ = console.read_raw(2, 50).unwrap();
        assert!(!CONSOLE_RAW_MODE.is_raw());
        console.write_raw(b"reply");
        assert!(!CONSOLE_RAW_MODE.is_raw());
    }

    #[test]
    fn test_two_controllers_can_share_one_flag() {
        let flag = RawModeFlag::new();
        let mut first = RawConsole::new(HostConsole::with_input(b"1"), &flag);
        let mut second = RawConsole::new(HostConsole::with_input(b"2"), &flag);

        let a = first.read_raw(1, 50).unwrap().expect("byte for first");
        let b = second.read_raw(1, 50).unwrap().expect("byte for second");
        assert_eq!(&a[..], b"1");
        assert_eq!(&b[..], b"2");
        assert!(!flag.is_raw(), "both controllers must leave the shared flag clear");
    }
}
