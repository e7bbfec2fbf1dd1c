//! String-keyed value sources and the `.env` overlay.
//!
//! Population reads every key through [`Source`]. The process environment
//! is [`Env`]; maps stand in for it in tests and embedded use. An overlay
//! never touches the process environment: [`Layered`] consults the primary
//! source first and falls back to the overlay entries.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// The overlay file read when none is named explicitly.
pub const DEFAULT_DOTENV: &str = ".env";

/// A provider of string values by key.
pub trait Source {
    fn get(&self, key: &str) -> Option<String>;
}

/// The process environment. Keys whose value is not valid Unicode count as
/// absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct Env;

impl Source for Env {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl<S: Source + ?Sized> Source for &S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}

impl<S: BuildHasher> Source for HashMap<String, String, S> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

impl Source for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        BTreeMap::get(self, key).cloned()
    }
}

/// A primary source over overlay entries. The primary source always wins.
#[derive(Debug, Clone)]
pub struct Layered<P> {
    primary: P,
    overlay: HashMap<String, String>,
}

impl<P: Source> Layered<P> {
    pub fn new(primary: P, overlay: HashMap<String, String>) -> Self {
        Self { primary, overlay }
    }

    /// Layer `primary` over the contents of the given dotenv files.
    pub fn with_dotenv<I>(primary: P, paths: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<Path>,
    {
        Self::new(primary, read_dotenv(paths))
    }

    pub fn overlay(&self) -> &HashMap<String, String> {
        &self.overlay
    }
}

impl<P: Source> Source for Layered<P> {
    fn get(&self, key: &str) -> Option<String> {
        self.primary
            .get(key)
            .or_else(|| self.overlay.get(key).cloned())
    }
}

/// Read `KEY=VALUE` pairs from dotenv files.
///
/// Files are read in order and a key keeps the value from the first file
/// that sets it. Missing or unreadable files and malformed lines are logged
/// and skipped; this never fails.
pub fn read_dotenv<I>(paths: I) -> HashMap<String, String>
where
    I: IntoIterator,
    I::Item: AsRef<Path>,
{
    let mut entries = HashMap::new();

    for path in paths {
        let path = path.as_ref();
        let iter = match dotenvy::from_path_iter(path) {
            Ok(iter) => iter,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "skipping dotenv file");
                continue;
            }
        };

        let mut loaded = 0usize;
        for item in iter {
            match item {
                Ok((key, value)) => {
                    entries.entry(key).or_insert(value);
                    loaded += 1;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "ignoring malformed dotenv line");
                }
            }
        }
        debug!(path = %path.display(), loaded, "read dotenv file");
    }

    entries
}

/// The overlay paths to use: the given ones, or [`DEFAULT_DOTENV`] if none.
pub fn dotenv_paths(paths: &[PathBuf]) -> Vec<PathBuf> {
    if paths.is_empty() {
        vec![PathBuf::from(DEFAULT_DOTENV)]
    } else {
        paths.to_vec()
    }
}
