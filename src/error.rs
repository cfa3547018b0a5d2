use std::path::Path;

use custom_error::custom_error;

custom_error! {pub StageError
    MissingFile{path: String, purpose: String} = "{path} not found. {purpose}",
}
impl StageError {
    pub fn missing(path: &Path, purpose: &str) -> Self {
        Self::MissingFile {
            path: path.display().to_string(),
            purpose: purpose.to_string(),
        }
    }
}
