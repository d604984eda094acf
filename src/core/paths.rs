use crate::error::{Error, Result};
use std::env;
use std::path::PathBuf;

/// Environment variable that overrides the rigger config directory.
pub const CONFIG_DIR_ENV: &str = "RIGGER_CONFIG_DIR";

/// Base rigger config directory (~/.config/rigger/ on Unix, %APPDATA%\rigger on Windows)
pub fn rigger() -> Result<PathBuf> {
    if let Ok(dir) = env::var(CONFIG_DIR_ENV) {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(shellexpand::tilde(&dir).to_string()));
        }
    }

    #[cfg(windows)]
    {
        let appdata = env::var("APPDATA").map_err(|_| {
            Error::internal_unexpected(
                "APPDATA environment variable not set on Windows".to_string(),
            )
        })?;
        Ok(PathBuf::from(appdata).join("rigger"))
    }

    #[cfg(not(windows))]
    {
        let home = env::var("HOME").map_err(|_| {
            Error::internal_unexpected(
                "HOME environment variable not set on Unix-like system".to_string(),
            )
        })?;
        Ok(PathBuf::from(home).join(".config").join("rigger"))
    }
}

/// Global rigger.json config file path
pub fn rigger_json() -> Result<PathBuf> {
    Ok(rigger()?.join("rigger.json"))
}
