//! JSON request-body templates
//!
//! A template is `<root>/<name>.json`. Placeholders are written `{{key}}` and replaced
//! textually before the result is parsed, so a placeholder may sit inside a JSON string or
//! stand in for a whole value.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::constants::{MSG_TEMPLATE_EXCEPTION, TEMPLATE_EXTENSION};
use crate::error::{Error, Result};

#[allow(clippy::unwrap_used)]
static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*[A-Za-z0-9_.\-]+\s*\}\}").unwrap());

/// Template store rooted at one directory
#[derive(Debug, Clone)]
pub struct Templates {
    root: PathBuf,
}

impl Templates {
    /// Store rooted at `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Template root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolved file for `name`
    #[must_use]
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.{TEMPLATE_EXTENSION}"))
    }

    /// Load a template that needs no arguments
    pub fn load(&self, name: &str) -> Result<Value> {
        self.load_with_args(name, std::iter::empty::<(&str, &str)>())
    }

    /// Substitute every `{{key}}` with its value, then parse
    ///
    /// Placeholders left unfilled and content that is not JSON both fail with
    /// `Error::Template` naming the template.
    pub fn load_with_args<I, K, V>(&self, name: &str, args: I) -> Result<Value>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let path = self.path_for(name);
        let mut content =
            fs::read_to_string(&path).map_err(|e| Error::from_io("read template", &path, e))?;
        debug!("loaded template {name} from {}", path.display());

        for (key, value) in args {
            content = content.replace(&format!("{{{{{}}}}}", key.as_ref()), value.as_ref());
        }

        if let Some(unfilled) = PLACEHOLDER_REGEX.find(&content) {
            warn!("template {name} has unfilled placeholder {}", unfilled.as_str());
            return Err(template_error(name));
        }

        serde_json::from_str(&content).map_err(|e| {
            warn!("template {name} is not valid JSON: {e}");
            template_error(name)
        })
    }
}

fn template_error(name: &str) -> Error {
    Error::Template {
        message: format!("{MSG_TEMPLATE_EXCEPTION} {name}"),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;

    use super::*;

    pub(crate) fn fixture_templates() -> Templates {
        Templates::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/resources"))
    }

    #[test]
    fn test_load_existing_policy() {
        let result = fixture_templates().load("policies/dead-letter-policy").unwrap();
        assert_eq!(
            result,
            json!({"apply-to": "all", "definition": {"dead-letter-exchange": "exchange"},
                   "pattern": ".*", "priority": 0})
        );
    }

    #[test]
    fn test_missing_template_names_json_path() {
        let err = fixture_templates()
            .load("policies/non-existing-policy")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::FileNotFound { ref path } if path.ends_with("policies/non-existing-policy.json")
        ));
    }

    #[test]
    fn test_unfilled_template_fails() {
        let err = fixture_templates().load("policies/example").unwrap_err();
        assert!(matches!(
            err,
            Error::Template { ref message } if message.contains("exception in template policies/example")
        ));
    }

    #[test]
    fn test_malformed_template_fails() {
        let err = fixture_templates().load("policies/broken").unwrap_err();
        assert!(matches!(
            err,
            Error::Template { ref message } if message == "exception in template policies/broken"
        ));
    }

    #[test]
    fn test_load_with_args_fills_placeholders() {
        let args = BTreeMap::from([("field", "a"), ("value", "b")]);
        let result = fixture_templates()
            .load_with_args("policies/example", args)
            .unwrap();
        assert_eq!(result, json!({"a": "b"}));
    }

    #[test]
    fn test_load_with_args_missing_file() {
        let err = fixture_templates()
            .load_with_args("policies/non-existing-policy", [("no", "a"), ("on", "b")])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::FileNotFound { ref path } if path.ends_with("policies/non-existing-policy.json")
        ));
    }

    #[test]
    fn test_load_with_wrong_args_fails() {
        let err = fixture_templates()
            .load_with_args("policies/example", [("no", "a"), ("on", "b")])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Template { ref message } if message == "exception in template policies/example"
        ));
    }
}
