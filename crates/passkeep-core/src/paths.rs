//! Standard paths used by passkeep

use std::path::PathBuf;

/// Standard passkeep paths
pub struct Paths {
    /// Data directory (~/.local/share/passkeep)
    pub data: PathBuf,
    /// Config directory (~/.config/passkeep)
    pub config: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let data = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("passkeep");

        let config = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("passkeep");

        Self { data, config }
    }

    /// Default location of the password file
    pub fn store_file(&self) -> PathBuf {
        self.data.join("passwords.txt")
    }

    /// Location of config.toml
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_live_under_their_dirs() {
        let paths = Paths::new();
        assert!(paths.store_file().starts_with(&paths.data));
        assert!(paths.config_file().starts_with(&paths.config));
        assert!(paths.data.ends_with("passkeep"));
    }
}
