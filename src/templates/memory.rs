use crate::error::Error;
use crate::templates::{placeholders, render_text, TemplateRenderer};
use crate::variables::VariableTree;
use std::collections::HashMap;

/// Templates held in memory: a default set, plus per-environment sets that override templates
/// of the same name.
#[derive(Default, Debug, Clone)]
pub struct InMemoryTemplateStore {
    defaults: HashMap<String, String>,
    environments: HashMap<String, HashMap<String, String>>,
}

impl InMemoryTemplateStore {
    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.defaults.insert(name.into(), text.into());
    }

    pub fn insert_for_env(
        &mut self,
        environment: impl Into<String>,
        name: impl Into<String>,
        text: impl Into<String>,
    ) {
        self.environments
            .entry(environment.into())
            .or_default()
            .insert(name.into(), text.into());
    }

    /// The environment's override of `name` if there is one, else the default template.
    #[must_use]
    pub fn get(&self, name: &str, environment: &str) -> Option<&str> {
        self.environments
            .get(environment)
            .and_then(|templates| templates.get(name))
            .or_else(|| self.defaults.get(name))
            .map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.defaults.len() + self.environments.values().map(HashMap::len).sum::<usize>()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TemplateRenderer for InMemoryTemplateStore {
    fn render(
        &self,
        name: &str,
        variables: &VariableTree,
        environment: &str,
    ) -> Result<String, Error> {
        let text = self
            .get(name, environment)
            .ok_or_else(|| Error::TemplateNotFound(name.to_string()))?;
        render_text(name, text, variables)
    }

    fn list_variables(&self, name: &str, environment: &str) -> Vec<String> {
        self.get(name, environment)
            .map(placeholders)
            .unwrap_or_default()
    }
}
