// history.rs

use bytes::Bytes;

use crate::error::out_of_memory;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SessionKey {
    pub pid: i32,
    pub dev: u64,
}

impl SessionKey {
    pub fn new(pid: i32, dev: u64) -> Self {
        Self { pid, dev }
    }
}

/// Navigation position. `Bottom` is the live, unsubmitted input line.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cursor {
    Bottom,
    At(usize),
}

/// Submitted lines for one (pid, tty) pair, oldest first, plus a cursor.
/// Lines are kept as the raw bytes the terminal sent.
///
/// Entries are only ever appended, so an index stored in the cursor stays
/// valid until the whole session is dropped.
#[derive(Debug)]
pub struct HistorySession {
    key: SessionKey,
    entries: Vec<Bytes>,
    cursor: Cursor,
}

impl HistorySession {
    pub fn new(key: SessionKey) -> Self {
        Self { key, entries: Vec::new(), cursor: Cursor::Bottom }
    }

    pub fn key(&self) -> SessionKey {
        self.key
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Bytes] {
        &self.entries
    }

    /// Text under the cursor, `None` at the bottom.
    pub fn current(&self) -> Option<&Bytes> {
        match self.cursor {
            Cursor::Bottom => None,
            Cursor::At(i) => Some(&self.entries[i]),
        }
    }

    /// Appends `line` (if non-empty) and drops back to the bottom.
    pub fn record(&mut self, line: &[u8]) {
        if !line.is_empty() {
            if self.entries.try_reserve(1).is_err() {
                out_of_memory("history entry");
            }
            self.entries.push(own_line(line));
        }
        self.cursor = Cursor::Bottom;
    }

    pub(crate) fn select_newest(&mut self) -> bool {
        match self.entries.len() {
            0 => false,
            n => {
                self.cursor = Cursor::At(n - 1);
                true
            }
        }
    }

    pub(crate) fn step_older(&mut self) -> bool {
        match self.cursor {
            Cursor::At(i) if i > 0 => {
                self.cursor = Cursor::At(i - 1);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn step_newer(&mut self) {
        self.cursor = match self.cursor {
            Cursor::At(i) if i + 1 < self.entries.len() => Cursor::At(i + 1),
            _ => Cursor::Bottom,
        };
    }
}

fn own_line(line: &[u8]) -> Bytes {
    let mut owned = Vec::new();
    if owned.try_reserve_exact(line.len()).is_err() {
        out_of_memory("history line");
    }
    owned.extend_from_slice(line);
    Bytes::from(owned)
}
