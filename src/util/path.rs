use std::path::{Path, PathBuf};

pub trait PathExt {
    /// Append a literal suffix to the final component, keeping any dots
    /// already in the name ("lib/util" + ".js" -> "lib/util.js").
    fn with_appended(&self, suffix: &str) -> PathBuf;

    /// File name as an owned lossy string, empty when the path has none.
    fn file_name_lossy(&self) -> String;
}

impl PathExt for Path {
    fn with_appended(&self, suffix: &str) -> PathBuf {
        match self.file_name() {
            Some(name) => {
                let mut appended = name.to_os_string();
                appended.push(suffix);
                self.with_file_name(appended)
            }
            None => self.to_path_buf(),
        }
    }

    fn file_name_lossy(&self) -> String {
        self.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
