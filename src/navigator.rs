// navigator.rs

use bytes::Bytes;

use crate::history::{Cursor, HistorySession};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RequestKind {
    Record,
    StepOlder,
    StepNewer,
    Unknown(i32),
}

impl RequestKind {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => RequestKind::Record,
            1 => RequestKind::StepOlder,
            2 => RequestKind::StepNewer,
            other => RequestKind::Unknown(other),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum NavResult {
    DeliverText(Bytes),
    DeliverEmpty,
    SignalAlert,
    InvalidRequest,
    /// Nothing to send back to the terminal.
    Silent,
}

/// Applies one request to `session`.
///
/// `payload` is only read for `Record`. An unknown kind leaves the session
/// untouched.
pub fn apply(session: &mut HistorySession, kind: RequestKind, payload: &[u8]) -> NavResult {
    match kind {
        RequestKind::Record => {
            session.record(payload);
            NavResult::Silent
        }
        RequestKind::StepOlder => match session.cursor() {
            Cursor::Bottom => {
                if session.select_newest() {
                    deliver(session)
                } else {
                    NavResult::SignalAlert
                }
            }
            // no alert at the oldest entry, it garbles the screen
            Cursor::At(_) => {
                if session.step_older() {
                    deliver(session)
                } else {
                    NavResult::Silent
                }
            }
        },
        RequestKind::StepNewer => match session.cursor() {
            Cursor::Bottom => NavResult::SignalAlert,
            Cursor::At(_) => {
                session.step_newer();
                deliver(session)
            }
        },
        RequestKind::Unknown(_) => NavResult::InvalidRequest,
    }
}

fn deliver(session: &HistorySession) -> NavResult {
    match session.current() {
        Some(text) => NavResult::DeliverText(text.clone()),
        None => NavResult::DeliverEmpty,
    }
}
