//! Mapping of engine failures onto crate errors
//!
//! minijinja reports everything as `minijinja::Error`. Failures raised by an
//! injected template function carry the original [`Error`] as their source;
//! those are handed back unchanged so a config build failure stays a config
//! build failure. Everything else is classified as syntax or execution.

use minijinja::ErrorKind;

use crate::Error;

/// Convert an engine error raised while handling `template`
pub(crate) fn from_minijinja(template: &str, err: minijinja::Error) -> Error {
    if let Some(inner) = injected_error(&err) {
        return inner;
    }

    match err.kind() {
        ErrorKind::SyntaxError => Error::template_syntax(template, err.to_string()),
        _ => Error::template_execution(template, err.to_string()),
    }
}

/// Wrap a function failure so it survives the trip through the engine
pub(crate) fn into_minijinja(function: &str, err: Error) -> minijinja::Error {
    minijinja::Error::new(
        ErrorKind::InvalidOperation,
        format!("template function {} failed", function),
    )
    .with_source(err)
}

fn injected_error(err: &minijinja::Error) -> Option<Error> {
    let mut source: Option<&(dyn std::error::Error + 'static)> = std::error::Error::source(err);
    while let Some(current) = source {
        if let Some(found) = current.downcast_ref::<Error>() {
            return Some(found.clone());
        }
        source = current.source();
    }
    None
}
