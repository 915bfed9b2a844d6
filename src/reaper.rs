// reaper.rs

use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::unistd::Pid;

use crate::history::SessionKey;
use crate::store::HistoryStore;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Liveness {
    Alive,
    Dead,
    Unknown,
}

pub trait LivenessProbe {
    fn probe(&self, pid: i32) -> Liveness;
}

impl<T: LivenessProbe + ?Sized> LivenessProbe for &T {
    fn probe(&self, pid: i32) -> Liveness {
        (**self).probe(pid)
    }
}

/// Probes with signal 0, which checks for the process without touching it.
#[derive(Clone, Copy, Debug, Default)]
pub struct SignalProbe;

impl LivenessProbe for SignalProbe {
    fn probe(&self, pid: i32) -> Liveness {
        match kill(Pid::from_raw(pid), None) {
            Ok(()) => Liveness::Alive,
            Err(Errno::ESRCH) => Liveness::Dead,
            Err(errno) => {
                tracing::trace!(pid, %errno, "inconclusive liveness probe");
                Liveness::Unknown
            }
        }
    }
}

/// Drops every session whose process is confirmed gone and returns their keys.
/// Inconclusive probes keep the session.
pub fn sweep<P: LivenessProbe + ?Sized>(store: &mut HistoryStore, probe: &P) -> Vec<SessionKey> {
    let mut reaped = Vec::new();
    store.retain(|key, session| {
        if probe.probe(key.pid) == Liveness::Dead {
            tracing::info!(pid = key.pid, dev = key.dev, lines = session.len(), "cleaning up history");
            reaped.push(*key);
            false
        } else {
            true
        }
    });
    reaped
}
