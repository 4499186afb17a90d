//! Directory helpers following the XDG Base Directory specification
//!
//! - Data: `~/.local/share/panctl/` - `config.json`
//! - State: `~/.local/state/panctl/` - `audit.log`, `panctl.log`
//!
//! ```
//! use panctl::utils::{ensure_dirs, get_data_dir};
//!
//! ensure_dirs().expect("Failed to create directories");
//!
//! if let Some(data_path) = get_data_dir() {
//!     let _config = data_path.join("config.json");
//! }
//! ```

use directories::ProjectDirs;
use std::path::PathBuf;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "panctl", "panctl")
}

pub fn get_data_dir() -> Option<PathBuf> {
    project_dirs().map(|pd| pd.data_dir().to_path_buf())
}

/// Falls back to the data dir on platforms without a state dir
pub fn get_state_dir() -> Option<PathBuf> {
    project_dirs().and_then(|pd| {
        pd.state_dir()
            .map(std::path::Path::to_path_buf)
            .or_else(|| Some(pd.data_dir().to_path_buf()))
    })
}

/// Where the GUI writes its tracing output
pub fn log_file_path() -> Option<PathBuf> {
    get_state_dir().map(|dir| dir.join("panctl.log"))
}

pub fn ensure_dirs() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::fs::DirBuilder;
        use std::os::unix::fs::DirBuilderExt;

        let mut builder = DirBuilder::new();
        builder.mode(0o700);
        builder.recursive(true);

        for dir in [get_data_dir(), get_state_dir()].into_iter().flatten() {
            builder.create(dir)?;
        }
    }

    #[cfg(not(unix))]
    {
        for dir in [get_data_dir(), get_state_dir()].into_iter().flatten() {
            std::fs::create_dir_all(dir)?;
        }
    }

    Ok(())
}

/// Truncates to `max_len` characters, ending in an ellipsis when cut
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{kept}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string_untouched() {
        assert_eq!(truncate_string("web-servers", 20), "web-servers");
    }

    #[test]
    fn test_truncate_long_string() {
        assert_eq!(truncate_string("abcdefghij", 8), "abcde...");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate_string("ééééééé", 5), "éé...");
    }
}
