//! Locating the bundled resource documents.
//!
//! A resource is looked up, in order, as a plain path, under the configured
//! resource directory, under `res/` in the working directory, and finally
//! among the copies compiled into the binary. [`ResourceLocator::isolated`]
//! keeps only the resource directory (and absolute paths).

use std::{
    borrow::Cow,
    fs, io,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{evaluator::COEFFS_FILENAME, logic_tree::TREES_FILENAME, parser::GMM_FILENAME};

/// Default resource directory name, relative to the working directory.
pub const RESOURCE_DIRNAME: &str = "res";

const EMBEDDED: &[(&str, &str)] = &[
    (GMM_FILENAME, include_str!("../res/gmm.xml")),
    (TREES_FILENAME, include_str!("../res/gmm-trees.json")),
    (COEFFS_FILENAME, include_str!("../res/gmm-coeffs.toml")),
];

#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("Could not open input stream ({0})")]
    NotFound(String),

    #[error("Failed to read resource {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Where a resource was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    File(PathBuf),
    Embedded,
}

#[derive(Debug, Clone)]
pub struct Resource {
    pub name: String,
    pub origin: Origin,
    pub contents: Cow<'static, str>,
}

impl Resource {
    pub fn as_bytes(&self) -> &[u8] {
        self.contents.as_bytes()
    }
}

#[derive(Debug, Clone)]
pub struct ResourceLocator {
    resource_dir: Option<PathBuf>,
    working_dir: bool,
    embedded: bool,
}

impl ResourceLocator {
    pub fn new(resource_dir: Option<PathBuf>) -> Self {
        Self { resource_dir, working_dir: true, embedded: true }
    }

    /// Disable the compiled-in fallback, so only files on disk are found.
    pub fn without_embedded(mut self) -> Self {
        self.embedded = false;
        self
    }

    /// Search the resource directory and absolute paths only. Nothing
    /// relative to the working directory and nothing compiled in is used.
    pub fn isolated(mut self) -> Self {
        self.working_dir = false;
        self.embedded = false;
        self
    }

    fn candidates(&self, name: &str) -> Vec<PathBuf> {
        let path = Path::new(name);
        let relative = path.strip_prefix(RESOURCE_DIRNAME).unwrap_or(path);

        let mut paths = Vec::new();
        if self.working_dir || path.is_absolute() {
            paths.push(path.to_path_buf());
        }
        if let Some(dir) = &self.resource_dir {
            paths.push(dir.join(relative));
        }
        if self.working_dir {
            paths.push(Path::new(RESOURCE_DIRNAME).join(relative));
        }
        paths
    }

    pub fn open(&self, name: &str) -> Result<Resource, ResourceError> {
        for path in self.candidates(name) {
            if path.is_file() {
                let contents = fs::read_to_string(&path)
                    .map_err(|source| ResourceError::Read { path: path.clone(), source })?;
                debug!(resource = name, path = %path.display(), "resource found on disk");
                return Ok(Resource {
                    name: name.to_string(),
                    origin: Origin::File(path),
                    contents: Cow::Owned(contents),
                });
            }
        }

        if self.embedded {
            let key = name.strip_prefix("res/").unwrap_or(name);
            if let Some((_, contents)) = EMBEDDED.iter().find(|(embedded, _)| *embedded == key) {
                debug!(resource = name, "using embedded resource");
                return Ok(Resource {
                    name: name.to_string(),
                    origin: Origin::Embedded,
                    contents: Cow::Borrowed(contents),
                });
            }
        }

        Err(ResourceError::NotFound(name.to_string()))
    }
}
