//! A directory-backed implementation of the [`TemplateRenderer`][super::TemplateRenderer] trait.
//!
//! Every file below the template directory is a default template, named by its path relative
//! to that directory. Files below `env/<environment>/` override default templates of the same
//! relative name for requests made in `<environment>`:
//!
//! ```text
//! templates/
//! ├── debian.ipxe                 -> "debian.ipxe"
//! ├── preseed/base.cfg            -> "preseed/base.cfg"
//! └── env/
//!     └── prod/
//!         └── debian.ipxe         -> "debian.ipxe" for environment "prod"
//! ```
use crate::error::Error;
use crate::templates::memory::InMemoryTemplateStore;
use crate::templates::TemplateRenderer;
use crate::variables::VariableTree;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Name of the directory holding per-environment overrides.
pub const ENV_DIR: &str = "env";

/// Templates loaded from a directory tree once, on startup.
///
/// Wraps an [`InMemoryTemplateStore`][super::memory::InMemoryTemplateStore], changes on disk
/// are not picked up until restart.
#[derive(Default, Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct DirTemplateStore {
    templates: InMemoryTemplateStore,
    root: PathBuf,
}

impl DirTemplateStore {
    /// Load every template below `root`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateDir`] if `root` can't be walked, or [`Error::IO`] if a template
    /// can't be read as UTF-8.
    pub fn try_from_dir(root: impl AsRef<Path>) -> Result<Self, Error> {
        let root = root.as_ref();
        let mut templates = InMemoryTemplateStore::default();

        for (name, text) in read_tree(root, Some(ENV_DIR))? {
            templates.insert(name, text);
        }

        let env_root = root.join(ENV_DIR);
        if env_root.is_dir() {
            let env_dirs = WalkDir::new(&env_root)
                .follow_links(true)
                .min_depth(1)
                .max_depth(1);
            for entry in env_dirs {
                let entry = entry?;
                if !entry.file_type().is_dir() {
                    continue;
                }
                let environment = entry.file_name().to_string_lossy().into_owned();
                for (name, text) in read_tree(entry.path(), None)? {
                    templates.insert_for_env(&environment, name, text);
                }
            }
        }

        tracing::debug!("loaded {} templates from {}", templates.len(), root.display());
        Ok(Self {
            templates,
            root: root.to_path_buf(),
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Read all files below `root` as `(relative name, contents)`, skipping the top-level directory
/// named `skip`. Symlinks are followed.
fn read_tree(root: &Path, skip: Option<&str>) -> Result<Vec<(String, String)>, Error> {
    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            !(entry.depth() == 1
                && entry.file_type().is_dir()
                && skip.is_some()
                && entry.file_name().to_str() == skip)
        });

    let mut found = vec![];
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        found.push((name, fs::read_to_string(entry.path())?));
    }
    Ok(found)
}

impl TemplateRenderer for DirTemplateStore {
    fn render(
        &self,
        name: &str,
        variables: &VariableTree,
        environment: &str,
    ) -> Result<String, Error> {
        self.templates.render(name, variables, environment)
    }

    fn list_variables(&self, name: &str, environment: &str) -> Vec<String> {
        self.templates.list_variables(name, environment)
    }
}
