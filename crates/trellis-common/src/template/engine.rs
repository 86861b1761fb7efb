//! Template engine for boot data
//!
//! Uses minijinja with the default `{{ ... }}` / `{% ... %}` delimiters, so
//! shell parameter expansion (`${VAR}`) passes through untouched. Settings:
//! - Strict undefined handling: a missing context key is an error, never ""
//! - Block tags swallow their own line (`trim_blocks` + `lstrip_blocks`).
//!   The newline after any block tag is dropped, so block tags belong on a
//!   line of their own; an inline `{% endif %}` at the end of a line joins
//!   that line with the next
//! - Only strings, numbers, bools and none can be printed. Printing anything
//!   else (a function named without `()`, a map) fails the render
//! - The template's trailing newline is kept
//! - No auto-escaping, whatever the template name looks like
//!
//! A fresh environment is built for every render. Nothing is shared between
//! renders, so concurrent renders for different nodes cannot interfere.

use base64::{engine::general_purpose::STANDARD, Engine};
use minijinja::value::ValueKind;
use minijinja::{AutoEscape, Environment, ErrorKind, Output, State, UndefinedBehavior, Value};
use tracing::debug;

use super::context::TemplateContext;
use super::error::{from_minijinja, into_minijinja};
use super::filters;
use crate::Result;

/// A named zero-argument operation callable from a template
///
/// Implementors hold only the data they need; the engine invokes them by
/// name while expanding `{{ Name() }}`.
pub trait TemplateFunction: Send + Sync {
    /// Name the template calls this function by
    fn name(&self) -> &str;

    /// Produce the text to substitute
    fn call(&self) -> Result<String>;
}

/// Output of a successful render
#[derive(Clone, PartialEq, Eq)]
pub struct RenderedTemplate {
    name: String,
    content: String,
}

impl RenderedTemplate {
    /// Name of the template that produced this output
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rendered text
    pub fn as_str(&self) -> &str {
        &self.content
    }

    /// Size of the rendered text in bytes
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Whether the rendered text is empty
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Base64 form, as taken by cloud APIs that want encoded user data
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.content.as_bytes())
    }

    /// Consume and return the rendered text
    pub fn into_string(self) -> String {
        self.content
    }
}

// Rendered boot data can carry credentials; keep it out of debug output.
impl std::fmt::Debug for RenderedTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderedTemplate")
            .field("name", &self.name)
            .field("bytes", &self.content.len())
            .finish()
    }
}

/// Template engine for boot data
#[derive(Debug, Clone, Default)]
pub struct TemplateEngine {
    _private: (),
}

impl TemplateEngine {
    /// Create a new template engine
    pub fn new() -> Self {
        Self::default()
    }

    /// Render `source` under `name` with the given functions and context
    ///
    /// Neither `functions` nor `ctx` is modified.
    ///
    /// # Errors
    ///
    /// - `TemplateSyntax` if the template does not parse
    /// - `TemplateExecution` if a referenced value is undefined or an
    ///   expression fails
    /// - whatever error a template function returned, unchanged
    pub fn render<F>(
        &self,
        name: &str,
        source: &str,
        functions: &[F],
        ctx: &TemplateContext,
    ) -> Result<RenderedTemplate>
    where
        F: TemplateFunction + Clone + 'static,
    {
        let mut env = self.environment();

        for function in functions {
            let function = function.clone();
            let function_name = function.name().to_string();
            env.add_function(
                function_name,
                move || -> std::result::Result<String, minijinja::Error> {
                    function
                        .call()
                        .map_err(|err| into_minijinja(function.name(), err))
                },
            );
        }

        env.add_template(name, source)
            .map_err(|err| from_minijinja(name, err))?;

        let content = env
            .get_template(name)
            .map_err(|err| from_minijinja(name, err))?
            .render(ctx.to_value())
            .map_err(|err| from_minijinja(name, err))?;

        debug!(template = %name, bytes = content.len(), "rendered template");

        Ok(RenderedTemplate {
            name: name.to_string(),
            content,
        })
    }

    fn environment<'source>(&self) -> Environment<'source> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_formatter(scalar_formatter);

        env.add_filter("base64_encode", filters::base64_encode);
        env.add_filter("base64_decode", filters::base64_decode);
        env.add_filter("required", filters::required);

        env
    }
}

fn scalar_formatter(
    out: &mut Output<'_>,
    state: &State<'_, '_>,
    value: &Value,
) -> std::result::Result<(), minijinja::Error> {
    match value.kind() {
        ValueKind::String
        | ValueKind::Number
        | ValueKind::Bool
        | ValueKind::None
        | ValueKind::Undefined => minijinja::escape_formatter(out, state, value),
        kind => Err(minijinja::Error::new(
            ErrorKind::InvalidOperation,
            format!("cannot print a value of kind {kind:?}; call functions with ()"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone)]
    enum TestFunction {
        Constant(&'static str, &'static str),
        Failing(&'static str),
        Counting(Arc<AtomicUsize>),
    }

    impl TemplateFunction for TestFunction {
        fn name(&self) -> &str {
            match self {
                Self::Constant(name, _) | Self::Failing(name) => *name,
                Self::Counting(_) => "Counter",
            }
        }

        fn call(&self) -> Result<String> {
            match self {
                Self::Constant(_, value) => Ok(value.to_string()),
                Self::Failing(name) => Err(Error::config_build(*name, "stub failure")),
                Self::Counting(count) => Ok(count.fetch_add(1, Ordering::SeqCst).to_string()),
            }
        }
    }

    fn no_functions() -> Vec<TestFunction> {
        Vec::new()
    }

    fn flag_context(flag: bool) -> TemplateContext {
        TemplateContext::builder()
            .bool("Enabled", flag)
            .string("Body", "payload")
            .build()
    }

    // =========================================================================
    // Story: Context and Function Expansion
    // =========================================================================

    #[test]
    fn test_simple_variable() {
        let engine = TemplateEngine::new();
        let rendered = engine
            .render("t", "value={{ Body }}", &no_functions(), &flag_context(true))
            .expect("simple variable should render successfully");
        assert_eq!(rendered.as_str(), "value=payload");
        assert_eq!(rendered.name(), "t");
    }

    #[test]
    fn test_function_call() {
        let engine = TemplateEngine::new();
        let functions = vec![TestFunction::Constant("Source", "https://example.com/nodeup")];
        let rendered = engine
            .render(
                "t",
                "URL={{ Source() }}\n",
                &functions,
                &TemplateContext::default(),
            )
            .expect("function call should render successfully");
        assert_eq!(rendered.as_str(), "URL=https://example.com/nodeup\n");
    }

    #[test]
    fn test_uncalled_function_is_not_invoked() {
        let engine = TemplateEngine::new();
        let count = Arc::new(AtomicUsize::new(0));
        let functions = vec![TestFunction::Counting(count.clone())];
        engine
            .render("t", "static", &functions, &TemplateContext::default())
            .expect("static template should render");
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_shell_expansion_passes_through() {
        let engine = TemplateEngine::new();
        let rendered = engine
            .render(
                "t",
                "mkdir -p ${INSTALL_DIR} && echo \"${urls[@]}\"",
                &no_functions(),
                &TemplateContext::default(),
            )
            .expect("shell syntax should pass through");
        assert_eq!(rendered.as_str(), "mkdir -p ${INSTALL_DIR} && echo \"${urls[@]}\"");
    }

    #[test]
    fn test_no_html_escaping() {
        let engine = TemplateEngine::new();
        let ctx = TemplateContext::builder()
            .string("Body", "a < b && c > 'd'")
            .build();
        let rendered = engine
            .render("page.html", "{{ Body }}", &no_functions(), &ctx)
            .expect("should render");
        assert_eq!(rendered.as_str(), "a < b && c > 'd'");
    }

    // =========================================================================
    // Story: Block Layout
    // =========================================================================

    #[test]
    fn test_block_lines_are_swallowed() {
        let engine = TemplateEngine::new();
        let template = "start\n{% if Enabled %}\n{{ Body }}\n{% endif %}\nend\n";

        let on = engine
            .render("t", template, &no_functions(), &flag_context(true))
            .expect("enabled block should render");
        assert_eq!(on.as_str(), "start\npayload\nend\n");

        let off = engine
            .render("t", template, &no_functions(), &flag_context(false))
            .expect("disabled block should render");
        assert_eq!(off.as_str(), "start\nend\n");
    }

    #[test]
    fn test_inline_block_at_line_end_joins_next_line() {
        let engine = TemplateEngine::new();
        let template = "a{% if Enabled %}!{% endif %}\nb\n";

        let on = engine
            .render("t", template, &no_functions(), &flag_context(true))
            .expect("enabled inline block should render");
        assert_eq!(on.as_str(), "a!b\n");

        let off = engine
            .render("t", template, &no_functions(), &flag_context(false))
            .expect("disabled inline block should render");
        assert_eq!(off.as_str(), "ab\n");
    }

    #[test]
    fn test_trailing_newline_kept() {
        let engine = TemplateEngine::new();
        let rendered = engine
            .render("t", "line\n", &no_functions(), &TemplateContext::default())
            .expect("should render");
        assert_eq!(rendered.as_str(), "line\n");
    }

    // =========================================================================
    // Story: Strict Failures
    // =========================================================================

    #[test]
    fn test_undefined_variable_errors() {
        let engine = TemplateEngine::new();
        let err = engine
            .render("nodeup.sh", "{{ Missing }}", &no_functions(), &flag_context(true))
            .unwrap_err();
        match err {
            Error::TemplateExecution { template, .. } => assert_eq!(template, "nodeup.sh"),
            other => panic!("Expected TemplateExecution, got {:?}", other),
        }
    }

    #[test]
    fn test_undefined_condition_errors() {
        let engine = TemplateEngine::new();
        let result = engine.render(
            "t",
            "{% if Missing %}x{% endif %}",
            &no_functions(),
            &TemplateContext::default(),
        );
        assert!(matches!(result, Err(Error::TemplateExecution { .. })));
    }

    #[test]
    fn test_unknown_function_errors() {
        let engine = TemplateEngine::new();
        let result = engine.render("t", "{{ Nope() }}", &no_functions(), &TemplateContext::default());
        assert!(matches!(result, Err(Error::TemplateExecution { .. })));
    }

    #[test]
    fn test_function_without_call_errors() {
        let engine = TemplateEngine::new();
        let count = Arc::new(AtomicUsize::new(0));
        let functions = vec![TestFunction::Counting(count.clone())];
        let err = engine
            .render("nodeup.sh", "[{{ Counter }}]", &functions, &TemplateContext::default())
            .unwrap_err();
        match err {
            Error::TemplateExecution { template, .. } => assert_eq!(template, "nodeup.sh"),
            other => panic!("Expected TemplateExecution, got {:?}", other),
        }
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_scalars_print() {
        let engine = TemplateEngine::new();
        let rendered = engine
            .render(
                "t",
                "{{ Enabled }} {{ 3 }} {{ none }} {{ Body }}",
                &no_functions(),
                &flag_context(true),
            )
            .expect("scalars should print");
        assert_eq!(rendered.as_str(), "true 3 none payload");
    }

    #[test]
    fn test_syntax_error() {
        let engine = TemplateEngine::new();
        let err = engine
            .render(
                "broken.sh",
                "{% if Enabled %}never closed",
                &no_functions(),
                &flag_context(true),
            )
            .unwrap_err();
        match err {
            Error::TemplateSyntax { template, .. } => assert_eq!(template, "broken.sh"),
            other => panic!("Expected TemplateSyntax, got {:?}", other),
        }
    }

    #[test]
    fn test_function_error_kind_is_preserved() {
        let engine = TemplateEngine::new();
        let functions = vec![TestFunction::Failing("KubeEnv")];
        let err = engine
            .render("t", "{{ KubeEnv() }}", &functions, &TemplateContext::default())
            .unwrap_err();
        assert_eq!(err, Error::config_build("KubeEnv", "stub failure"));
    }

    // =========================================================================
    // Story: Filters and Determinism
    // =========================================================================

    #[test]
    fn test_base64_filters() {
        let engine = TemplateEngine::new();
        let ctx = TemplateContext::builder()
            .string("plain", "hello")
            .string("encoded", "aGVsbG8=")
            .build();

        let rendered = engine
            .render(
                "t",
                "{{ plain | base64_encode }} {{ encoded | base64_decode }}",
                &no_functions(),
                &ctx,
            )
            .expect("filters should render");
        assert_eq!(rendered.as_str(), "aGVsbG8= hello");
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let engine = TemplateEngine::new();
        let functions = vec![
            TestFunction::Constant("A", "alpha"),
            TestFunction::Constant("B", "beta"),
        ];
        let template = "{{ A() }}-{{ B() }}-{{ Body }}\n{% if Enabled %}\n!\n{% endif %}\n";

        let first = engine
            .render("t", template, &functions, &flag_context(true))
            .unwrap();
        let second = engine
            .render("t", template, &functions, &flag_context(true))
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(first.as_str(), "alpha-beta-payload\n!\n");
    }

    #[test]
    fn test_rendered_template_helpers() {
        let engine = TemplateEngine::new();
        let rendered = engine
            .render("t", "hello", &no_functions(), &TemplateContext::default())
            .unwrap();
        assert_eq!(rendered.len(), 5);
        assert!(!rendered.is_empty());
        assert_eq!(rendered.to_base64(), "aGVsbG8=");
        assert!(!format!("{:?}", rendered).contains("hello"));
        assert_eq!(rendered.into_string(), "hello");
    }
}
