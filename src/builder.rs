use std::collections::HashMap;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::EnvfigError;
use crate::ops::{self, ConfigResult};
use crate::registry::{self, Registry};
use crate::render;
use crate::settings;
use crate::source::{self, Env, Layered, Source};
use crate::types::ConfigAction;
use crate::walk::{self, Config};

/// Entry point for building an envfig loader.
pub struct Envfig;

impl Envfig {
    pub fn builder<C: Config>() -> EnvfigBuilder<C> {
        EnvfigBuilder::new()
    }
}

/// Builder for loading a configuration struct.
///
/// Values are looked up in the primary source (the process environment, or
/// the map given to [`vars()`](Self::vars)), then in the dotenv overlay,
/// then in the field's `default`. The overlay is read into memory and never
/// written back to the process environment.
pub struct EnvfigBuilder<C: Config> {
    dotenv_paths: Option<Vec<PathBuf>>,
    vars: Option<HashMap<String, String>>,
    registry: Option<Registry>,
    _phantom: PhantomData<C>,
}

impl<C: Config> EnvfigBuilder<C> {
    fn new() -> Self {
        Self {
            dotenv_paths: None,
            vars: None,
            registry: None,
            _phantom: PhantomData,
        }
    }

    /// Read the conventional `.env` file from the working directory.
    ///
    /// Has no effect if [`dotenv_path()`](Self::dotenv_path) names files.
    pub fn dotenv(mut self) -> Self {
        self.dotenv_paths.get_or_insert_with(Vec::new);
        self
    }

    /// Add an overlay file. Files added earlier win over files added later;
    /// all of them lose to the primary source.
    pub fn dotenv_path(mut self, path: impl AsRef<Path>) -> Self {
        self.dotenv_paths
            .get_or_insert_with(Vec::new)
            .push(path.as_ref().to_path_buf());
        self
    }

    /// Use these pairs instead of the process environment.
    pub fn vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.vars = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Use this registry instead of the process-wide one.
    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Overlay paths to read, or none if no overlay was requested.
    fn effective_dotenv_paths(&self) -> Vec<PathBuf> {
        match &self.dotenv_paths {
            Some(paths) => source::dotenv_paths(paths),
            None => Vec::new(),
        }
    }

    /// Populate `config` in place.
    ///
    /// Fails on the first field that cannot be loaded; fields handled before
    /// it keep their new values.
    pub fn populate(&self, config: &mut C) -> Result<(), EnvfigError> {
        let paths = self.effective_dotenv_paths();
        let overlay = source::read_dotenv(&paths);
        debug!(
            files = paths.len(),
            overlay_keys = overlay.len(),
            synthetic = self.vars.is_some(),
            "populating config"
        );

        match &self.vars {
            Some(vars) => self.populate_from(config, &Layered::new(vars, overlay))?,
            None => self.populate_from(config, &Layered::new(Env, overlay))?,
        }
        debug!(fields = C::FIELDS.len(), "config populated");
        Ok(())
    }

    fn populate_from(&self, config: &mut C, source: &dyn Source) -> Result<(), EnvfigError> {
        match &self.registry {
            Some(registry) => walk::populate(config, source, registry),
            None => walk::populate(config, source, &registry::global()),
        }
    }

    /// Populate a caller-provided value and return it. Non-zero fields are
    /// kept unless the source sets them.
    pub fn load_from(self, mut config: C) -> Result<C, EnvfigError> {
        self.populate(&mut config)?;
        Ok(config)
    }

    /// Populate a `Default` value and return it.
    pub fn load(self) -> Result<C, EnvfigError>
    where
        C: Default,
    {
        self.load_from(C::default())
    }

    /// Handle a `ConfigAction` and print the result to stdout.
    pub fn handle_and_print(self, action: &ConfigAction) -> Result<(), EnvfigError>
    where
        C: Default,
    {
        let result = self.handle(action)?;
        println!("{result}");
        Ok(())
    }

    /// Handle a `ConfigAction` (list / show / check).
    pub fn handle(self, action: &ConfigAction) -> Result<ConfigResult, EnvfigError>
    where
        C: Default,
    {
        match action {
            ConfigAction::List { filter } => Ok(ops::list_settings::<C>(*filter)),
            ConfigAction::Show => {
                let config = self.load()?;
                Ok(ConfigResult::Snapshot(render::pretty_string(&config)))
            }
            ConfigAction::Check => {
                self.load()?;
                Ok(ConfigResult::Valid {
                    fields: settings::settings::<C>().len(),
                })
            }
        }
    }
}
