use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::file_format::SerdeFormat;

pub type Result<T> = anyhow::Result<T>;

pub fn serialize<T: Serialize>(value: &T, format: SerdeFormat) -> Result<Vec<u8>> {
    let text = match format {
        SerdeFormat::Json => serde_json::to_string_pretty(value)?,
        SerdeFormat::Toml => toml::to_string(value)?,
    };

    Ok(text.into_bytes())
}

pub fn deserialize<T: DeserializeOwned>(serialized: &[u8], format: SerdeFormat) -> Result<T> {
    let text = std::str::from_utf8(serialized)?;

    match format {
        SerdeFormat::Json => Ok(serde_json::from_str(text)?),
        SerdeFormat::Toml => Ok(toml::from_str(text)?),
    }
}
