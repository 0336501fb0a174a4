use std::{
    env,
    path::{Path, PathBuf},
};

/// Environment variable listing extra module directories.
pub const FIGHT_PATH: &str = "FIGHT_PATH";

/// Extension appended to module paths written without one.
pub const SOURCE_EXTENSION: &str = "fight";

/// Interpreter configuration.
///
/// Controls where `use` statements look for modules and whether the value
/// of the last expression statement is printed after a run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory that relative module paths are resolved against first.
    pub base_dir:   PathBuf,
    /// Additional directories searched, in order, after `base_dir`.
    pub lib_dirs:   Vec<PathBuf>,
    /// Print the value of the last expression statement after a run.
    pub auto_print: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self { base_dir:   PathBuf::from("."),
               lib_dirs:   Vec::new(),
               auto_print: false, }
    }
}

impl Config {
    /// Builds the default configuration, adding every directory listed in
    /// `FIGHT_PATH`.
    ///
    /// The variable uses the platform's path-list syntax (`:` separated on
    /// Unix, `;` on Windows).
    #[must_use]
    pub fn from_env() -> Self {
        let lib_dirs = env::var_os(FIGHT_PATH).map(|paths| env::split_paths(&paths).collect())
                                              .unwrap_or_default();
        Self { lib_dirs,
               ..Self::default() }
    }

    /// Sets the directory module paths are resolved against.
    #[must_use]
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    /// Appends a library directory.
    #[must_use]
    pub fn with_lib_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.lib_dirs.push(dir.into());
        self
    }

    /// Enables or disables printing of the last expression value.
    #[must_use]
    pub const fn with_auto_print(mut self, auto_print: bool) -> Self {
        self.auto_print = auto_print;
        self
    }

    /// Resolves a module path as written in a `use` statement.
    ///
    /// `.fight` is appended when the path has no extension. Absolute paths
    /// are used as they are; relative ones are tried against `base_dir` and
    /// then every library directory. Returns `None` when no candidate file
    /// exists.
    ///
    /// # Example
    /// ```
    /// use fight::config::Config;
    ///
    /// let config = Config::default().with_base_dir("/nonexistent");
    /// assert!(config.resolve_module("math").is_none());
    /// ```
    #[must_use]
    pub fn resolve_module(&self, path: &str) -> Option<PathBuf> {
        let mut relative = PathBuf::from(path);
        if relative.extension().is_none() {
            relative.set_extension(SOURCE_EXTENSION);
        }

        if relative.is_absolute() {
            return relative.is_file().then_some(relative);
        }

        std::iter::once(self.base_dir.as_path()).chain(self.lib_dirs.iter().map(PathBuf::as_path))
                                                .map(|dir: &Path| dir.join(&relative))
                                                .find(|candidate| candidate.is_file())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn extension_is_appended() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("shapes.fight"), "exports ();").unwrap();

        let config = Config::default().with_base_dir(dir.path());
        assert_eq!(config.resolve_module("shapes"), Some(dir.path().join("shapes.fight")));
        assert_eq!(config.resolve_module("shapes.fight"),
                   Some(dir.path().join("shapes.fight")));
    }

    #[test]
    fn library_directories_are_searched_after_base() {
        let base = tempfile::tempdir().unwrap();
        let lib = tempfile::tempdir().unwrap();
        fs::write(lib.path().join("util.fight"), "").unwrap();

        let config = Config::default().with_base_dir(base.path())
                                      .with_lib_dir(lib.path());
        assert_eq!(config.resolve_module("util"), Some(lib.path().join("util.fight")));
        assert_eq!(config.resolve_module("missing"), None);
    }
}
