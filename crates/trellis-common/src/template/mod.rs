//! Boot data templating
//!
//! Templates use the standard jinja delimiters:
//! - `{{ Name() }}` calls an injected [`TemplateFunction`]
//! - `{{ Key }}` reads a [`TemplateContext`] value
//! - `{% if Key %}...{% endif %}` conditionals on boolean context values
//! - Filters: `{{ value | base64_encode }}`, `{{ value | base64_decode }}`,
//!   `{{ value | required }}`
//!
//! Shell syntax such as `${VAR}` and `$(cmd)` is left alone.

mod context;
mod engine;
mod error;
pub mod filters;

pub use context::{ContextValue, TemplateContext, TemplateContextBuilder};
pub use engine::{RenderedTemplate, TemplateEngine, TemplateFunction};
