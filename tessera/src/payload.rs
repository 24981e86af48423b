//! Request body validation and data URL decoding.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use serde_json::Value;

use crate::common::{Error, Result};
use crate::image::Image;

const DRAWING_FIELD: &str = "drawing";
const DATA_URL_MARKER: &str = "data:image";

/// Padding is stripped before decoding, so the engine must not require it.
const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Pulls the `drawing` data URL out of a JSON request body.
pub fn extract_drawing(body: &[u8]) -> Result<String> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|_| Error::Validation("No drawing data provided".to_string()))?;

    match value.get(DRAWING_FIELD) {
        None | Some(Value::Null) => Err(Error::Validation(
            "No drawing data provided".to_string(),
        )),
        Some(Value::String(url)) if url.contains(DATA_URL_MARKER) => Ok(url.clone()),
        Some(_) => Err(Error::Validation("Invalid image data format".to_string())),
    }
}

/// Splits `data:image/png;base64,AAAA` into header and payload at the first comma.
pub fn split_data_url(url: &str) -> Result<(&str, &str)> {
    url.split_once(',')
        .ok_or_else(|| Error::Validation("Invalid data URL format".to_string()))
}

/// Decodes the base64 payload of a data URL into an RGBA8 image.
pub fn decode_data_url(url: &str) -> Result<Image> {
    let (header, encoded) = split_data_url(url)?;
    tracing::info!("Processing image with header: {}", header);

    let binary = BASE64
        .decode(base64_symbols(encoded).as_bytes())
        .map_err(|e| Error::Decode(e.to_string()))?;

    let image = Image::decode(&binary)?;
    tracing::info!(
        "Successfully decoded image of size: {}x{}",
        image.width(),
        image.height()
    );

    Ok(image)
}

/// Keeps the standard alphabet and drops anything else (whitespace, line
/// breaks, stray characters). Input ends at the first `=` that closes a
/// quantum.
fn base64_symbols(encoded: &str) -> String {
    let mut symbols = String::with_capacity(encoded.len());
    for c in encoded.chars() {
        match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '+' | '/' => symbols.push(c),
            '=' if symbols.len() % 4 >= 2 => break,
            _ => {}
        }
    }
    symbols
}

/// Validates a JSON request body and decodes the drawing it carries.
pub fn decode_request_body(body: &[u8]) -> Result<Image> {
    let url = extract_drawing(body)?;
    decode_data_url(&url)
}
