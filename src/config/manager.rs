//! Configuration file wrangling
// (c) 2024 Ross Younger

use super::{structure::FIELD_NAMES, Configuration, ENV_PREFIX};
use crate::os::{AbstractPlatform as _, Platform};

use figment::{
    providers::{Env, Format, Json, Serialized},
    value::Value,
    Figment, Metadata, Provider,
};
use serde::Deserialize;
use std::{
    fmt::Display,
    path::{Path, PathBuf},
};
use tabled::{settings::style::Style, Table, Tabled};

use tracing::trace;

// SYSTEM DEFAULTS //////////////////////////////////////////////////////////////////////////////////////////////

/// A `[https://docs.rs/figment/latest/figment/trait.Provider.html](figment::Provider)` that holds
/// our set of fixed system default options
#[derive(Default)]
struct SystemDefault {}

impl SystemDefault {
    const META_NAME: &str = "default";
}

impl Provider for SystemDefault {
    fn metadata(&self) -> Metadata {
        figment::Metadata::named(Self::META_NAME)
    }

    fn data(
        &self,
    ) -> std::result::Result<
        figment::value::Map<figment::Profile, figment::value::Dict>,
        figment::Error,
    > {
        Serialized::defaults(Configuration::default()).data()
    }
}

// CONFIG MANAGER /////////////////////////////////////////////////////////////////////////////////////////////

/// Processes and merges all possible configuration sources.
///
/// Configuration file locations are platform-dependent.
/// To see what applies on the current platform, run `sshdir show-config`.
#[derive(Debug)]
pub struct Manager {
    /// Configuration data
    data: Figment,
}

fn add_user_config(f: Figment) -> Figment {
    let Some(path) = Platform::config_path() else {
        return f;
    };
    if !path.exists() {
        trace!("user configuration file {path:?} not present");
        return f;
    }
    f.merge(Json::file(path.as_path()))
}

impl Default for Manager {
    /// Initialises this structure fully-empty (for new(), or testing)
    fn default() -> Self {
        Self {
            data: Figment::default(),
        }
    }
}

impl Manager {
    /// Initialises this structure, reading the configuration file appropriate to the platform
    /// and the current user, then the environment.
    #[must_use]
    pub fn new() -> Self {
        let mut data = Figment::new().merge(SystemDefault::default());
        // N.B. This may leave data in a fused-error state, if a data file isn't parseable.
        data = add_user_config(data);
        data = data.merge(Env::prefixed(ENV_PREFIX));
        Self { data }
    }

    /// Returns the list of configuration files we read.
    ///
    /// This is a function of platform and the current user id.
    #[must_use]
    pub fn config_files() -> Vec<PathBuf> {
        Platform::config_path().into_iter().collect()
    }

    /// Testing constructor, does not read files from system
    #[cfg(test)]
    #[must_use]
    pub(crate) fn without_files() -> Self {
        let data = Figment::new().merge(SystemDefault::default());
        Self { data }
    }

    /// Merges in a data set, which is some sort of [figment::Provider](https://docs.rs/figment/latest/figment/trait.Provider.html).
    pub fn merge_provider<T>(&mut self, provider: T)
    where
        T: Provider,
    {
        let f = std::mem::take(&mut self.data);
        self.data = f.merge(provider); // in the error case, this leaves the provider in a fused state
    }

    /// Merges in a data set from a JSON file
    pub fn merge_json_file<T>(&mut self, json: T)
    where
        T: AsRef<Path>,
    {
        let path = json.as_ref();
        let provider = Json::file_exact(path);
        self.merge_provider(provider);
    }

    /// Attempts to extract a particular struct from the data.
    ///
    /// Within sshdir, `T` is usually [Configuration], but it isn't intrinsically required to be.
    pub fn get<'de, T>(&self) -> anyhow::Result<T, figment::Error>
    where
        T: Deserialize<'de>,
    {
        self.data.extract::<T>()
    }
}

// PRETTY PRINT SUPPORT ///////////////////////////////////////////////////////////////////////////////////////

#[derive(Tabled)]
struct PrettyConfig {
    field: String,
    value: String,
    source: String,
}

impl PrettyConfig {
    fn render_source(meta: Option<&Metadata>) -> String {
        if let Some(m) = meta {
            m.source
                .as_ref()
                .map_or_else(|| m.name.to_string(), figment::Source::to_string)
        } else {
            String::new()
        }
    }

    fn render_value(value: &Value) -> String {
        match value {
            Value::String(_tag, s) => s.to_string(),
            Value::Char(_tag, c) => c.to_string(),
            Value::Bool(_tag, b) => b.to_string(),
            Value::Num(_tag, num) => {
                if let Some(i) = num.to_i128() {
                    i.to_string()
                } else if let Some(u) = num.to_u128() {
                    u.to_string()
                } else if let Some(ff) = num.to_f64() {
                    ff.to_string()
                } else {
                    "<number>".into()
                }
            }
            Value::Empty(_tag, _) => "<empty>".into(),
            Value::Dict(_tag, dict) => {
                format!(
                    "{{{}}}",
                    dict.iter()
                        .map(|(k, v)| format!("{k}: {}", PrettyConfig::render_value(v)))
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            }
            Value::Array(_tag, vec) => {
                format!(
                    "[{}]",
                    vec.iter()
                        .map(PrettyConfig::render_value)
                        .collect::<Vec<_>>()
                        .join(",")
                )
            }
        }
    }

    fn new(field: &str, value: &Value, meta: Option<&Metadata>) -> Self {
        Self {
            field: field.into(),
            value: PrettyConfig::render_value(value),
            source: PrettyConfig::render_source(meta),
        }
    }
}

impl Display for Manager {
    /// Tabulates the known fields which have been set, and where each came from.
    /// Unrecognised fields are listed separately.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let data = match self.data.data() {
            Ok(d) => d,
            Err(e) => {
                // This isn't terribly helpful as it doesn't have metadata attached; BUT attempting to get() a struct does.
                return write!(f, "error: {e}");
            }
        };
        let Some(data) = data.get(&figment::Profile::Default) else {
            return write!(f, "(no configuration)");
        };

        let mut fields = Vec::<PrettyConfig>::new();
        let mut unknown = Vec::<String>::new();

        for field in data.keys() {
            let meta = self.data.find_metadata(field);
            if !FIELD_NAMES.contains(&field.as_str()) {
                unknown.push(format!(
                    "unrecognised field `{field}` in {}",
                    PrettyConfig::render_source(meta)
                ));
                continue;
            }
            let value = match self.data.find_value(field) {
                Ok(v) => v,
                Err(e) => {
                    writeln!(f, "error on field {field}: {e}")?;
                    continue;
                }
            };
            fields.push(PrettyConfig::new(field, &value, meta));
        }
        write!(f, "{}", Table::new(fields).with(Style::sharp()))?;
        for u in unknown {
            write!(f, "\n{u}")?;
        }
        Ok(())
    }
}
