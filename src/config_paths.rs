//! On-disk locations used by scopeline
//!
//! ```text
//! <config dir>/
//!     config.yaml     highlight rules and extra grammar directories
//!     grammars/       user grammar files, loaded after the built-ins
//!     logs/           daily rotated scopeline.log
//! ```
//!
//! `<config dir>` is `$XDG_CONFIG_HOME/scopeline`, falling back to
//! `~/.config/scopeline`; on Windows it is `%APPDATA%\scopeline`.

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;

const APP_DIR: &str = "scopeline";

fn base_dir(xdg_config_home: Option<OsString>, home: Option<PathBuf>) -> Option<PathBuf> {
    xdg_config_home
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| home.map(|h| h.join(".config")))
        .map(|config| config.join(APP_DIR))
}

pub fn config_dir() -> Option<PathBuf> {
    if cfg!(target_os = "windows") {
        std::env::var_os("APPDATA").map(|appdata| PathBuf::from(appdata).join(APP_DIR))
    } else {
        base_dir(std::env::var_os("XDG_CONFIG_HOME"), dirs::home_dir())
    }
}

pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.yaml"))
}

pub fn grammars_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("grammars"))
}

pub fn logs_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("logs"))
}

fn create(path: PathBuf) -> io::Result<PathBuf> {
    if let Err(e) = std::fs::create_dir_all(&path) {
        let message = format!("cannot create {}: {}", path.display(), e);
        return Err(io::Error::new(e.kind(), message));
    }
    Ok(path)
}

/// Create the log directory if needed and return it
pub fn ensure_logs_dir() -> io::Result<PathBuf> {
    let dir = logs_dir()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no home or config directory"))?;
    create(dir)
}
