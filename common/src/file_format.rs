use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum FileExtensionError {
    #[error("Failed to get file extension")]
    MissingFileExtension,
    #[error("Unsupported file extension for file: {0}")]
    UnsupportedFileExtension(String),
}

pub type FileFormatResult<T> = Result<T, FileExtensionError>;

pub fn get_file_extension(filename: &str) -> Option<&str> {
    Path::new(filename)
        .extension()
        .and_then(|os_str| os_str.to_str())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SerdeFormat {
    Json,
    Toml,
}

impl SerdeFormat {
    pub fn from_file_name(file_name: &str) -> FileFormatResult<Self> {
        let ext = get_file_extension(file_name).ok_or(FileExtensionError::MissingFileExtension)?;

        if ext.eq_ignore_ascii_case("json") {
            Ok(Self::Json)
        } else if ext.eq_ignore_ascii_case("toml") {
            Ok(Self::Toml)
        } else {
            Err(FileExtensionError::UnsupportedFileExtension(
                file_name.to_string(),
            ))
        }
    }
}
