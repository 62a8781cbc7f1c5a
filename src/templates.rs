//! Message templates
//!
//! A fixed catalog of named message bodies with `{{ name }}` placeholders.
//!
//! Substitution is applied one key at a time, in the order the caller passes
//! the values, across the whole current string. A value inserted by an earlier
//! key can therefore be rewritten by a later key if it happens to contain a
//! marker such as `{{ body }}`. Markers with no value are left untouched.

use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Unknown template {id}")]
    UnknownTemplate { id: String },
}

pub const ISSUE_SHOW: &str = "issue_show";
pub const REPOSITORY_INFO: &str = "repository_info";
pub const BRANCH_SYNCED: &str = "branch_synced";
pub const BRANCH_NAME: &str = "branch_name";
pub const NO_LABELS: &str = "no_labels";
pub const NO_RELEASES: &str = "no_releases";
pub const NO_ISSUES: &str = "no_issues";

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    (
        ISSUE_SHOW,
        "Issue #{{ number }} ({{ state }}): by {{ author }} [{{ assignee }}]\n\
         Type: {{ type }}\n\
         Milestone: {{ milestone }}\n\
         Labels: {{ labels }}\n\
         Title: {{ title }}\n\
         \n\
         {{ body }}",
    ),
    (
        REPOSITORY_INFO,
        "Vendor: {{ vendor }}\nRepository: {{ repository }}\nBranch: {{ branch }}",
    ),
    (BRANCH_SYNCED, "Branch {{ branch }} is in sync with {{ remote }}/{{ branch }}"),
    (BRANCH_NAME, "{{ prefix }}{{ slug }}"),
    (NO_LABELS, "No labels found in {{ vendor }}/{{ repository }}"),
    (NO_RELEASES, "No releases found in {{ vendor }}/{{ repository }}"),
    (NO_ISSUES, "No {{ state }} issues found in {{ vendor }}/{{ repository }}"),
];

/// Resolves template ids and substitutes placeholders.
#[derive(Debug, Clone, Default)]
pub struct TemplateRenderer {
    templates: HashMap<String, String>,
}

impl TemplateRenderer {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalog shipped with the binary.
    pub fn builtin() -> Self {
        let mut renderer = Self::new();
        for (id, body) in BUILTIN_TEMPLATES {
            renderer.insert(id, body);
        }
        renderer
    }

    pub fn insert(&mut self, id: &str, body: &str) -> &mut Self {
        self.templates.insert(id.to_string(), body.to_string());
        self
    }

    pub fn template(&self, id: &str) -> Result<&str, TemplateError> {
        self.templates
            .get(id)
            .map(String::as_str)
            .ok_or_else(|| TemplateError::UnknownTemplate { id: id.to_string() })
    }

    pub fn render<I, K, V>(&self, id: &str, values: I) -> Result<String, TemplateError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut rendered = self.template(id)?.to_string();
        for (placeholder, value) in values {
            let marker = format!("{{{{ {} }}}}", placeholder.as_ref());
            rendered = rendered.replace(&marker, value.as_ref());
        }
        Ok(rendered)
    }
}
