//! Filters registered on every boot template environment
//!
//! Boot scripts often carry material that must survive a heredoc or a shell
//! variable intact, hence the base64 pair.

use base64::{engine::general_purpose::STANDARD, Engine};
use minijinja::{Error, ErrorKind, Value};

fn invalid(msg: String) -> Error {
    Error::new(ErrorKind::InvalidOperation, msg)
}

/// `{{ text | base64_encode }}`: standard alphabet, padded
pub fn base64_encode(text: &str) -> String {
    STANDARD.encode(text)
}

/// `{{ encoded | base64_decode }}`: fails unless the payload is UTF-8 text
pub fn base64_decode(encoded: &str) -> Result<String, Error> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| invalid(format!("cannot base64-decode value: {e}")))?;
    String::from_utf8(bytes).map_err(|e| invalid(format!("decoded value is not UTF-8: {e}")))
}

/// `{{ value | required }}`: fails on undefined or none, passes anything else
pub fn required(value: Value) -> Result<Value, Error> {
    if value.is_undefined() || value.is_none() {
        return Err(Error::new(
            ErrorKind::UndefinedError,
            "value marked required is not set",
        ));
    }
    Ok(value)
}
