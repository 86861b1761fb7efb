//! Provisioning plan accumulation
//!
//! Many independent contributors (credential materialization, config file
//! writers, ...) add directives for one node. They share a
//! [`ModelBuilderContext`] through the [`DirectiveSink`] trait; once every
//! contributor is done the context is consumed into an immutable
//! [`ProvisioningPlan`] for the engine that applies it.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

/// Kind of filesystem object a directive manages
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Regular file
    File,
    /// Directory
    Directory,
}

/// "Ensure `path` exists with `contents` and type `file_type`"
///
/// Applying the same directive twice leaves the node unchanged.
#[derive(Clone, Serialize, PartialEq, Eq)]
pub struct ProvisioningDirective {
    path: PathBuf,
    contents: String,
    #[serde(rename = "type")]
    file_type: FileType,
}

impl ProvisioningDirective {
    /// Directive for a regular file
    pub fn file(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
            file_type: FileType::File,
        }
    }

    /// Directive for a directory
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            contents: String::new(),
            file_type: FileType::Directory,
        }
    }

    /// Destination path on the node
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File contents
    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// Kind of object
    pub fn file_type(&self) -> FileType {
        self.file_type
    }
}

// Contents are frequently private keys.
impl std::fmt::Debug for ProvisioningDirective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvisioningDirective")
            .field("path", &self.path)
            .field("bytes", &self.contents.len())
            .field("file_type", &self.file_type)
            .finish()
    }
}

/// Destination for provisioning directives
pub trait DirectiveSink: Send + Sync {
    /// Append a directive to the plan
    fn add_directive(&self, directive: ProvisioningDirective);
}

/// Accumulates directives from concurrent contributors
///
/// Directives keep submission order. Nothing is deduplicated; conflicting
/// directives are the applying engine's concern.
#[derive(Debug, Default)]
pub struct ModelBuilderContext {
    directives: Mutex<Vec<ProvisioningDirective>>,
}

impl ModelBuilderContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of directives added so far
    pub fn len(&self) -> usize {
        self.directives.lock().len()
    }

    /// Whether no directive has been added
    pub fn is_empty(&self) -> bool {
        self.directives.lock().is_empty()
    }

    /// Stop accepting directives and hand over the plan
    pub fn finish(self) -> ProvisioningPlan {
        let directives = self.directives.into_inner();
        debug!(directives = directives.len(), "provisioning plan finished");
        ProvisioningPlan { directives }
    }
}

impl DirectiveSink for ModelBuilderContext {
    fn add_directive(&self, directive: ProvisioningDirective) {
        self.directives.lock().push(directive);
    }
}

/// Ordered, immutable sequence of directives for one node
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ProvisioningPlan {
    directives: Vec<ProvisioningDirective>,
}

impl ProvisioningPlan {
    /// Directives in submission order
    pub fn directives(&self) -> &[ProvisioningDirective] {
        &self.directives
    }

    /// Iterate over the directives
    pub fn iter(&self) -> std::slice::Iter<'_, ProvisioningDirective> {
        self.directives.iter()
    }

    /// Number of directives
    pub fn len(&self) -> usize {
        self.directives.len()
    }

    /// Whether the plan is empty
    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }
}

impl IntoIterator for ProvisioningPlan {
    type Item = ProvisioningDirective;
    type IntoIter = std::vec::IntoIter<ProvisioningDirective>;

    fn into_iter(self) -> Self::IntoIter {
        self.directives.into_iter()
    }
}

impl<'a> IntoIterator for &'a ProvisioningPlan {
    type Item = &'a ProvisioningDirective;
    type IntoIter = std::slice::Iter<'a, ProvisioningDirective>;

    fn into_iter(self) -> Self::IntoIter {
        self.directives.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_order_is_kept() {
        let ctx = ModelBuilderContext::new();
        ctx.add_directive(ProvisioningDirective::file("/srv/kubernetes/b.pem", "b"));
        ctx.add_directive(ProvisioningDirective::file("/srv/kubernetes/a.pem", "a"));
        ctx.add_directive(ProvisioningDirective::directory("/srv/kubernetes"));
        assert_eq!(ctx.len(), 3);

        let plan = ctx.finish();
        let paths: Vec<_> = plan.iter().map(|d| d.path().to_path_buf()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/srv/kubernetes/b.pem"),
                PathBuf::from("/srv/kubernetes/a.pem"),
                PathBuf::from("/srv/kubernetes"),
            ]
        );
    }

    #[test]
    fn test_duplicates_are_kept() {
        let ctx = ModelBuilderContext::new();
        let directive = ProvisioningDirective::file("/srv/kubernetes/ca.pem", "pem");
        ctx.add_directive(directive.clone());
        ctx.add_directive(directive.clone());

        let plan = ctx.finish();
        assert_eq!(plan.directives(), &[directive.clone(), directive]);
    }

    #[test]
    fn test_empty_context() {
        let ctx = ModelBuilderContext::new();
        assert!(ctx.is_empty());
        assert!(ctx.finish().is_empty());
    }

    #[test]
    fn test_plan_serializes_as_sequence() {
        let ctx = ModelBuilderContext::new();
        ctx.add_directive(ProvisioningDirective::file("/srv/kubernetes/ca.pem", "pem"));
        let json = serde_json::to_value(ctx.finish()).unwrap();

        assert_eq!(
            json,
            serde_json::json!([
                {"path": "/srv/kubernetes/ca.pem", "contents": "pem", "type": "file"}
            ])
        );
    }

    #[test]
    fn test_directive_debug_hides_contents() {
        let directive = ProvisioningDirective::file("/srv/kubernetes/ca-key.pem", "SECRET");
        let debug = format!("{:?}", directive);
        assert!(debug.contains("ca-key.pem"));
        assert!(!debug.contains("SECRET"));
    }
}
