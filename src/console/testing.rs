//! In-memory [`Connection`] for driving sessions from unit tests.

use std::collections::VecDeque;
use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::transport::Connection;

#[derive(Debug, Default)]
struct MockState {
    input: VecDeque<u8>,
    output: Vec<u8>,
    hung_up: bool,
    write_blocked: bool,
}

/// Connection half handed to the console.
#[derive(Debug)]
pub(crate) struct MockConnection(Arc<Mutex<MockState>>);

/// Test-side handle feeding input and inspecting output.
#[derive(Debug, Clone)]
pub(crate) struct MockHandle(Arc<Mutex<MockState>>);

fn lock(state: &Mutex<MockState>) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockConnection {
    pub(crate) fn pair() -> (Self, MockHandle) {
        let state = Arc::new(Mutex::new(MockState::default()));
        (Self(Arc::clone(&state)), MockHandle(state))
    }
}

impl MockHandle {
    pub(crate) fn push_input(&self, bytes: &[u8]) {
        lock(&self.0).input.extend(bytes.iter().copied());
    }

    pub(crate) fn send_line(&self, line: &str) {
        self.push_input(line.as_bytes());
        self.push_input(b"\r\n");
    }

    pub(crate) fn hang_up(&self) {
        lock(&self.0).hung_up = true;
    }

    pub(crate) fn set_write_blocked(&self, blocked: bool) {
        lock(&self.0).write_blocked = blocked;
    }

    /// Bytes queued for the console but not yet read.
    pub(crate) fn pending_input(&self) -> usize {
        lock(&self.0).input.len()
    }

    pub(crate) fn output(&self) -> String {
        String::from_utf8_lossy(&lock(&self.0).output).into_owned()
    }

    pub(crate) fn take_output(&self) -> String {
        let bytes = std::mem::take(&mut lock(&self.0).output);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Output lines without their CRLF terminators.
    pub(crate) fn take_lines(&self) -> Vec<String> {
        self.take_output()
            .split_terminator("\r\n")
            .map(str::to_string)
            .collect()
    }
}

impl Connection for MockConnection {
    fn try_read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = lock(&self.0);
        if state.input.is_empty() {
            if state.hung_up {
                return Ok(0);
            }
            return Err(io::ErrorKind::WouldBlock.into());
        }
        let mut n = 0;
        for slot in buf.iter_mut() {
            let Some(byte) = state.input.pop_front() else {
                break;
            };
            *slot = byte;
            n += 1;
        }
        Ok(n)
    }

    fn try_write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = lock(&self.0);
        if state.hung_up {
            return Err(io::ErrorKind::BrokenPipe.into());
        }
        if state.write_blocked {
            return Err(io::ErrorKind::WouldBlock.into());
        }
        state.output.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn peer_addr(&self) -> Option<SocketAddr> {
        None
    }
}
