// daemon.rs

use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::feedback::TerminalSink;
use crate::history::SessionKey;
use crate::navigator::{self, NavResult, RequestKind};
use crate::reaper::{self, LivenessProbe};
use crate::source::{Request, RequestSource};
use crate::store::HistoryStore;
use crate::ttys::DeviceDirectory;

pub struct Daemon<P, S> {
    store: HistoryStore,
    ttys: DeviceDirectory,
    probe: P,
    sink: S,
    started: Instant,
    settle: Duration,
    retry_delay: Duration,
}

impl<P: LivenessProbe, S: TerminalSink> Daemon<P, S> {
    pub fn new(ttys: DeviceDirectory, probe: P, sink: S) -> Self {
        Self {
            store: HistoryStore::new(),
            ttys,
            probe,
            sink,
            started: Instant::now(),
            settle: Duration::ZERO,
            retry_delay: Duration::from_secs(1),
        }
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Serves requests until the source runs dry. Only a permission failure
    /// on the source is fatal; anything else is logged and retried.
    pub fn run<R: RequestSource + ?Sized>(&mut self, source: &mut R) -> Result<()> {
        loop {
            match source.next_request() {
                Ok(Some(request)) => {
                    self.handle(request);
                }
                Ok(None) => {
                    tracing::info!("request source closed");
                    return Ok(());
                }
                Err(Error::MalformedRequest(msg)) => {
                    tracing::warn!(%msg, "dropping request");
                }
                Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                    tracing::error!(error = %e, "can only usefully be run as root");
                    return Err(Error::Io(e));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "reading request");
                    std::thread::sleep(self.retry_delay);
                }
            }
        }
    }

    /// Processes one request. Returns `None` when it was dropped before
    /// reaching a session.
    pub fn handle(&mut self, request: Request) -> Option<NavResult> {
        if self.started.elapsed() < self.settle {
            tracing::debug!(pid = request.pid, dev = request.dev, "discarding stale request");
            return None;
        }
        let Some(tty) = self.ttys.resolve(request.dev) else {
            tracing::warn!("unknown tty {}", request.dev);
            return None;
        };

        let key = SessionKey::new(request.pid, request.dev);
        let session = self.store.lookup_or_create(key);
        let result = navigator::apply(session, request.kind, &request.payload);
        tracing::trace!(pid = key.pid, tty = %tty.display(), ?result, "navigated");

        let delivered = match &result {
            NavResult::DeliverText(text) => self.sink.write_line(tty, text),
            NavResult::DeliverEmpty => self.sink.write_line(tty, b""),
            NavResult::SignalAlert => self.sink.alert(tty),
            NavResult::InvalidRequest => {
                if let RequestKind::Unknown(code) = request.kind {
                    tracing::warn!("unknown request {} from {}", code, tty.display());
                }
                Ok(())
            }
            NavResult::Silent => Ok(()),
        };
        if let Err(e) = delivered {
            tracing::warn!(tty = %tty.display(), error = %e, "terminal feedback failed");
        }

        reaper::sweep(&mut self.store, &self.probe);
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reaper::Liveness;
    use bytes::Bytes;
    use std::cell::RefCell;
    use std::collections::{HashSet, VecDeque};
    use std::io;
    use std::path::{Path, PathBuf};

    #[derive(Default)]
    struct Dead(RefCell<HashSet<i32>>);

    impl LivenessProbe for Dead {
        fn probe(&self, pid: i32) -> Liveness {
            if self.0.borrow().contains(&pid) {
                Liveness::Dead
            } else {
                Liveness::Alive
            }
        }
    }

    #[derive(Debug, PartialEq, Eq)]
    enum Sent {
        Line(PathBuf, Bytes),
        Bell(PathBuf),
    }

    #[derive(Default)]
    struct Recorder {
        sent: Vec<Sent>,
        broken: bool,
    }

    impl TerminalSink for Recorder {
        fn write_line(&mut self, tty: &Path, text: &[u8]) -> io::Result<()> {
            if self.broken {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
            }
            self.sent.push(Sent::Line(tty.to_path_buf(), Bytes::copy_from_slice(text)));
            Ok(())
        }

        fn alert(&mut self, tty: &Path) -> io::Result<()> {
            if self.broken {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
            }
            self.sent.push(Sent::Bell(tty.to_path_buf()));
            Ok(())
        }
    }

    struct Scripted(VecDeque<Result<Option<Request>>>);

    impl RequestSource for Scripted {
        fn next_request(&mut self) -> Result<Option<Request>> {
            self.0.pop_front().unwrap_or(Ok(None))
        }
    }

    fn req(pid: i32, dev: u64, kind: RequestKind, payload: &str) -> Request {
        Request { pid, dev, kind, payload: Bytes::copy_from_slice(payload.as_bytes()) }
    }

    fn tty5() -> PathBuf {
        PathBuf::from("/dev/tty5")
    }

    fn daemon<P: LivenessProbe>(probe: P) -> Daemon<P, Recorder> {
        let ttys = DeviceDirectory::from_entries([(5, tty5())]);
        Daemon::new(ttys, probe, Recorder::default()).with_retry_delay(Duration::ZERO)
    }

    #[test]
    fn delivers_recalled_lines_to_the_tty() {
        let mut d = daemon(Dead::default());
        d.handle(req(100, 5, RequestKind::Record, "ls"));
        d.handle(req(100, 5, RequestKind::StepOlder, ""));
        d.handle(req(100, 5, RequestKind::StepNewer, ""));
        d.handle(req(100, 5, RequestKind::StepNewer, ""));
        assert_eq!(
            d.sink().sent,
            vec![
                Sent::Line(tty5(), Bytes::from_static(b"ls")),
                Sent::Line(tty5(), Bytes::new()),
                Sent::Bell(tty5()),
            ]
        );
    }

    #[test]
    fn recalled_line_reaches_the_tty_byte_for_byte() {
        let mut d = daemon(Dead::default());
        let latin1 = Bytes::from_static(b"caf\xe9");
        d.handle(Request { pid: 100, dev: 5, kind: RequestKind::Record, payload: latin1.clone() });
        d.handle(req(100, 5, RequestKind::StepOlder, ""));
        assert_eq!(d.sink().sent, vec![Sent::Line(tty5(), latin1)]);
    }

    #[test]
    fn unknown_tty_is_dropped_without_a_session() {
        let mut d = daemon(Dead::default());
        assert_eq!(d.handle(req(100, 6, RequestKind::Record, "ls")), None);
        assert!(d.store().is_empty());
        assert!(d.sink().sent.is_empty());
    }

    #[test]
    fn unknown_request_is_reported_not_applied() {
        let mut d = daemon(Dead::default());
        d.handle(req(100, 5, RequestKind::Record, "ls"));
        let result = d.handle(req(100, 5, RequestKind::Unknown(9), "x"));
        assert_eq!(result, Some(NavResult::InvalidRequest));
        let session = d.store().get(&SessionKey::new(100, 5)).unwrap();
        assert_eq!(session.entries(), &["ls"]);
    }

    #[test]
    fn stale_requests_are_discarded() {
        let mut d = daemon(Dead::default()).with_settle(Duration::from_secs(3600));
        assert_eq!(d.handle(req(100, 5, RequestKind::Record, "ls")), None);
        assert!(d.store().is_empty());
    }

    #[test]
    fn sweeps_after_each_request() {
        let dead = Dead::default();
        let mut d = daemon(&dead);
        d.handle(req(100, 5, RequestKind::Record, "ls"));
        d.handle(req(200, 5, RequestKind::Record, "pwd"));
        assert_eq!(d.store().len(), 2);

        dead.0.borrow_mut().insert(100);
        d.handle(req(200, 5, RequestKind::StepOlder, ""));
        assert!(d.store().get(&SessionKey::new(100, 5)).is_none());
        assert_eq!(d.store().get(&SessionKey::new(200, 5)).map(|s| s.len()), Some(1));
    }

    #[test]
    fn feedback_failure_does_not_change_result() {
        let mut d = daemon(Dead::default());
        d.sink.broken = true;
        d.handle(req(100, 5, RequestKind::Record, "ls"));
        let result = d.handle(req(100, 5, RequestKind::StepOlder, ""));
        assert_eq!(result, Some(NavResult::DeliverText(Bytes::from_static(b"ls"))));
    }

    #[test]
    fn run_skips_bad_input_and_stops_at_end() {
        let mut d = daemon(Dead::default());
        let mut source = Scripted(VecDeque::from([
            Ok(Some(req(100, 5, RequestKind::Record, "make"))),
            Err(Error::MalformedRequest("junk".to_string())),
            Err(Error::Io(io::Error::new(io::ErrorKind::Other, "blip"))),
            Ok(Some(req(100, 5, RequestKind::StepOlder, ""))),
        ]));
        d.run(&mut source).unwrap();
        assert_eq!(d.sink().sent, vec![Sent::Line(tty5(), Bytes::from_static(b"make"))]);
    }

    #[test]
    fn run_stops_on_permission_denied() {
        let mut d = daemon(Dead::default());
        let mut source = Scripted(VecDeque::from([
            Err(Error::Io(io::Error::new(io::ErrorKind::PermissionDenied, "EPERM"))),
            Ok(Some(req(100, 5, RequestKind::Record, "never"))),
        ]));
        assert!(d.run(&mut source).is_err());
        assert!(d.store().is_empty());
    }
}
