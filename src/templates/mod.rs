//! Boot script templates.
//!
//! Templates are plain text (iPXE scripts, kickstart files, cloud-config, ...) with
//! placeholders naming a variable from the request's
//! [`VariableTree`][crate::variables::VariableTree]:
//!
//! ```text
//! #!ipxe
//! kernel {{.baseURL}}/vmlinuz hostname={{ .hostname }} ip={{.net.eth0.ip}}
//! ```
//!
//! Dotted placeholders descend into nested variables. Rendering fails when a placeholder has no
//! scalar value.
//!
//! Two implementations of [`TemplateRenderer`] are provided, [`memory::InMemoryTemplateStore`]
//! and [`dir::DirTemplateStore`]. The latter loads every file below
//! [`Config::templates_dir`][`crate::config::Config::templates_dir`] on startup.

use crate::error::Error;
use crate::variables::{Variable, VariableTree};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;

pub mod dir;
pub mod memory;

#[allow(clippy::module_name_repetitions)]
pub use dir::DirTemplateStore;
#[allow(clippy::module_name_repetitions)]
pub use memory::InMemoryTemplateStore;

/// The environment used when a request doesn't name one.
pub const DEFAULT_ENVIRONMENT: &str = "default";

lazy_static! {
    static ref PLACEHOLDER: Regex =
        Regex::new(r"\{\{\s*\.([A-Za-z0-9_]+(?:\.[A-Za-z0-9_]+)*)\s*\}\}").unwrap();
}

/// `DynTemplateRenderer` is a type alias for a [`TemplateRenderer`] shared between concurrent
/// requests through an [`Arc`].
#[allow(clippy::module_name_repetitions)]
pub type DynTemplateRenderer = Arc<dyn TemplateRenderer + Send + Sync>;

/// Renders named templates, optionally overridden per environment.
#[allow(clippy::module_name_repetitions)]
pub trait TemplateRenderer {
    /// Render the template `name` for `environment` with `variables`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateNotFound`] for unknown templates and
    /// [`Error::MissingVariable`] when a placeholder has no scalar value in `variables`.
    fn render(
        &self,
        name: &str,
        variables: &VariableTree,
        environment: &str,
    ) -> Result<String, Error>;

    /// The variables the template `name` references, in order of first use. Empty for unknown
    /// templates.
    fn list_variables(&self, name: &str, environment: &str) -> Vec<String>;
}

/// The variables a client must supply to render `script`, without the names in `blacklist`.
///
/// # Errors
///
/// Returns [`Error::MissingScriptParam`] when `script` is missing or empty. The renderer is not
/// consulted in that case.
pub fn required_variables(
    renderer: &(dyn TemplateRenderer + Send + Sync),
    blacklist: &HashSet<String>,
    script: Option<&str>,
    environment: Option<&str>,
) -> Result<Vec<String>, Error> {
    let script = script
        .filter(|s| !s.is_empty())
        .ok_or(Error::MissingScriptParam)?;
    let environment = environment
        .filter(|e| !e.is_empty())
        .unwrap_or(DEFAULT_ENVIRONMENT);
    Ok(renderer
        .list_variables(script, environment)
        .into_iter()
        .filter(|name| !blacklist.contains(name))
        .collect())
}

/// Distinct placeholder paths in `text`, in order of first appearance.
pub(crate) fn placeholders(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    PLACEHOLDER
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .filter(|path| seen.insert(path.clone()))
        .collect()
}

/// Substitute every placeholder in `text` with its value from `variables`.
pub(crate) fn render_text(
    name: &str,
    text: &str,
    variables: &VariableTree,
) -> Result<String, Error> {
    let mut rendered = String::with_capacity(text.len());
    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(text) {
        let (Some(whole), Some(path)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let value = variables
            .lookup(path.as_str())
            .and_then(Variable::as_scalar)
            .ok_or_else(|| Error::MissingVariable {
                template: name.to_string(),
                variable: path.as_str().to_string(),
            })?;
        rendered.push_str(&text[last..whole.start()]);
        rendered.push_str(value);
        last = whole.end();
    }
    rendered.push_str(&text[last..]);
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SCRIPT: &str = "#!ipxe\nkernel {{.baseURL}}/vmlinuz host={{ .hostname }} ip={{.net.ip}}\n\
                          initrd {{.baseURL}}/initrd\n";

    fn store() -> InMemoryTemplateStore {
        let mut store = InMemoryTemplateStore::default();
        store.insert("debian.ipxe", SCRIPT);
        store
    }

    #[test]
    fn placeholders_are_distinct_and_ordered() {
        assert_eq!(placeholders(SCRIPT), vec!["baseURL", "hostname", "net.ip"]);
        assert!(placeholders("no placeholders {{ here }}").is_empty());
    }

    #[test]
    fn renders_nested_values() {
        let vars = VariableTree::from_query([
            ("baseURL", "http://boot"),
            ("hostname", "node1"),
            ("net.ip", "10.0.0.2"),
        ])
        .unwrap();
        assert_eq!(
            render_text("debian.ipxe", SCRIPT, &vars).unwrap(),
            "#!ipxe\nkernel http://boot/vmlinuz host=node1 ip=10.0.0.2\ninitrd http://boot/initrd\n"
        );
    }

    #[test]
    fn missing_or_nested_value_fails_render() {
        let vars =
            VariableTree::from_query([("baseURL", "http://boot"), ("hostname", "node1")]).unwrap();
        let err = render_text("debian.ipxe", SCRIPT, &vars).unwrap_err();
        assert!(matches!(err, Error::MissingVariable { ref variable, .. } if variable == "net.ip"));

        let vars = VariableTree::from_query([
            ("baseURL", "http://boot"),
            ("hostname", "node1"),
            ("net.ip.v4", "10.0.0.2"),
        ])
        .unwrap();
        assert!(render_text("debian.ipxe", SCRIPT, &vars).is_err());
    }

    #[test]
    fn blacklisted_names_are_withheld() {
        let store = store();
        let blacklist: HashSet<String> = ["baseURL", "hostname"]
            .into_iter()
            .map(String::from)
            .collect();

        let vars =
            required_variables(&store, &blacklist, Some("debian.ipxe"), None).unwrap();
        assert_eq!(vars, vec!["net.ip"]);

        let vars =
            required_variables(&store, &HashSet::new(), Some("debian.ipxe"), Some("")).unwrap();
        assert_eq!(vars, vec!["baseURL", "hostname", "net.ip"]);
    }

    #[test]
    fn blacklist_applies_to_every_template() {
        let mut store = store();
        store.insert("a.cfg", "{{.x}} {{.y}} {{.z}}");
        store.insert_for_env("prod", "a.cfg", "{{.y}} {{.w}}");
        let names = ["x", "y", "z", "w", "baseURL", "hostname", "net.ip"];

        for template in ["debian.ipxe", "a.cfg", "missing"] {
            for environment in [None, Some("prod")] {
                for banned in names {
                    let blacklist = HashSet::from([banned.to_string()]);
                    let vars =
                        required_variables(&store, &blacklist, Some(template), environment)
                            .unwrap();
                    assert!(!vars.iter().any(|v| v == banned), "{template} {banned}");
                }
            }
        }
    }

    #[test]
    fn missing_script_is_an_error() {
        let store = store();
        for script in [None, Some("")] {
            let err = required_variables(&store, &HashSet::new(), script, None).unwrap_err();
            assert!(matches!(err, Error::MissingScriptParam));
        }
    }
}
