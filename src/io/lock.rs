use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

/// How long a write waits for another `tl` process.
pub const WRITE_WAIT: Duration = Duration::from_secs(5);

const RETRY_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("cannot open {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("{} still held after {waited:?}; is another tl writing?", path.display())]
    Busy { path: PathBuf, waited: Duration },
}

/// Exclusive hold on `<data_dir>/.lock`. Writers to any slot in the
/// directory take it first; it is let go when the guard drops.
pub struct DirLock {
    path: PathBuf,
    _held: File,
}

impl DirLock {
    pub fn lock(data_dir: &Path) -> Result<Self, LockError> {
        Self::lock_within(data_dir, WRITE_WAIT)
    }

    pub fn lock_within(data_dir: &Path, wait: Duration) -> Result<Self, LockError> {
        let path = data_dir.join(".lock");
        let file = match OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
        {
            Ok(file) => file,
            Err(source) => return Err(LockError::Open { path, source }),
        };

        let deadline = Instant::now() + wait;
        while try_exclusive(&file).is_err() {
            if Instant::now() >= deadline {
                return Err(LockError::Busy { path, waited: wait });
            }
            thread::sleep(RETRY_INTERVAL);
        }
        log::trace!("locked {}", path.display());
        Ok(DirLock { path, _held: file })
    }
}

impl Drop for DirLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// Non-blocking exclusive `flock`. Other platforms have no advisory lock
/// and always succeed.
#[cfg(unix)]
pub(crate) fn try_exclusive(file: &File) -> io::Result<()> {
    use std::os::unix::io::AsRawFd;
    // SAFETY: the descriptor is owned by `file` for the whole call
    match unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) } {
        0 => Ok(()),
        _ => Err(io::Error::last_os_error()),
    }
}

#[cfg(not(unix))]
pub(crate) fn try_exclusive(_file: &File) -> io::Result<()> {
    Ok(())
}
