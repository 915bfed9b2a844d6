// feedback.rs

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::Path;

use nix::sys::termios::{tcgetattr, SpecialCharacterIndices};

const BEL: &[u8] = b"\x07";

nix::ioctl_write_ptr_bad!(tiocsti, libc::TIOCSTI, u8);

/// Where navigation results end up. Failures are reported to the caller but
/// never change what the navigator decided.
pub trait TerminalSink {
    /// Replaces the terminal's pending input with `text`, input cursor at the end.
    fn write_line(&mut self, tty: &Path, text: &[u8]) -> io::Result<()>;
    fn alert(&mut self, tty: &Path) -> io::Result<()>;
}

/// Talks to the real device files.
#[derive(Debug, Default)]
pub struct DeviceSink;

fn open_tty(tty: &Path) -> io::Result<File> {
    OpenOptions::new()
        .write(true)
        .custom_flags(libc::O_NOCTTY)
        .open(tty)
}

fn push_input(tty: &File, byte: u8) -> io::Result<()> {
    unsafe { tiocsti(tty.as_raw_fd(), &byte) }
        .map(|_| ())
        .map_err(io::Error::from)
}

impl TerminalSink for DeviceSink {
    fn write_line(&mut self, tty: &Path, text: &[u8]) -> io::Result<()> {
        let file = open_tty(tty)?;
        // drop whatever is already typed
        let termios = tcgetattr(file.as_raw_fd()).map_err(io::Error::from)?;
        let kill = termios.control_chars[SpecialCharacterIndices::VKILL as usize];
        if kill != 0 {
            push_input(&file, kill)?;
        }
        for &byte in text {
            push_input(&file, byte)?;
        }
        Ok(())
    }

    fn alert(&mut self, tty: &Path) -> io::Result<()> {
        open_tty(tty)?.write_all(BEL)
    }
}
