use std::{
    env,
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Mutex, OnceLock},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesktopLogCategory {
    Startup,
    Runtime,
    Server,
    Window,
    Console,
    Shutdown,
}

impl DesktopLogCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Runtime => "runtime",
            Self::Server => "server",
            Self::Window => "window",
            Self::Console => "console",
            Self::Shutdown => "shutdown",
        }
    }
}

pub fn resolve_desktop_log_path(packaged_root_dir: Option<PathBuf>, log_file_name: &str) -> PathBuf {
    packaged_root_dir
        .unwrap_or_else(env::temp_dir)
        .join("logs")
        .join(log_file_name)
}

pub fn format_log_line(category: DesktopLogCategory, message: &str) -> String {
    format!(
        "[{}] [{}] {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
        category.as_str(),
        message
    )
}

/// Appends one line to the desktop log and mirrors it to stderr.
///
/// Write failures are reported on stderr only; logging never aborts the caller.
pub fn append_desktop_log(
    category: DesktopLogCategory,
    message: &str,
    packaged_root_dir: Option<PathBuf>,
    log_file_name: &str,
    max_bytes: u64,
    backup_count: usize,
    write_lock: &OnceLock<Mutex<()>>,
) {
    let line = format_log_line(category, message);
    eprintln!("{line}");

    let log_path = resolve_desktop_log_path(packaged_root_dir, log_file_name);
    let lock = write_lock.get_or_init(|| Mutex::new(()));
    let _guard = match lock.lock() {
        Ok(guard) => guard,
        Err(error) => error.into_inner(),
    };

    if let Err(error) = write_log_line(&log_path, &line, max_bytes, backup_count) {
        eprintln!(
            "failed to write desktop log {}: {}",
            log_path.display(),
            error
        );
    }
}

fn write_log_line(log_path: &Path, line: &str, max_bytes: u64, backup_count: usize) -> io::Result<()> {
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }
    rotate_log_if_needed(log_path, max_bytes, backup_count)?;

    let mut file = OpenOptions::new().create(true).append(true).open(log_path)?;
    writeln!(file, "{line}")
}

fn backup_path(log_path: &Path, index: usize) -> PathBuf {
    let mut name = log_path.as_os_str().to_os_string();
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

pub(crate) fn rotate_log_if_needed(
    log_path: &Path,
    max_bytes: u64,
    backup_count: usize,
) -> io::Result<()> {
    let size = match fs::metadata(log_path) {
        Ok(metadata) => metadata.len(),
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(error) => return Err(error),
    };
    if max_bytes == 0 || size < max_bytes {
        return Ok(());
    }

    if backup_count == 0 {
        return fs::remove_file(log_path);
    }

    let oldest = backup_path(log_path, backup_count);
    if oldest.exists() {
        fs::remove_file(&oldest)?;
    }
    for index in (1..backup_count).rev() {
        let source = backup_path(log_path, index);
        if source.exists() {
            fs::rename(&source, backup_path(log_path, index + 1))?;
        }
    }
    fs::rename(log_path, backup_path(log_path, 1))
}
