use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::{AppError, Result, SchemaViolation};

/// Default Locust container image used when a test omits `image`.
pub const DEFAULT_IMAGE: &str = "locustio/locust:latest";
/// Default number of worker replicas.
pub const DEFAULT_WORKER_REPLICAS: u32 = 5;
/// Default test duration.
pub const DEFAULT_RUN_TIME: &str = "30s";

// Matches a full duration string, e.g. 300s, 20m, 3h, 1h30m, 44h44m60s.
static RUN_TIME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+[smh])+$").expect("valid run_time pattern"));

/// Raw expert mode block as authored in the source document. The two seed
/// fields are camelCase in the source while everything else is snake_case;
/// existing configuration files depend on that inconsistency.
#[derive(Debug, Clone, Deserialize)]
struct RawExpertMode {
    enabled: bool,
    #[serde(rename = "masterCommandSeed")]
    master_command_seed: String,
    #[serde(rename = "workerCommandSeed")]
    worker_command_seed: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RawVanillaSpecs {
    users: u64,
    spawn_rate: u64,
    #[serde(default = "default_run_time")]
    run_time: String,
    #[serde(default)]
    stop_timeout: u64,
    target_host: String,
}

/// One test entry exactly as it appears in the source document, before any
/// cross-field validation. Never escapes this module: entries are promoted
/// eagerly into [`TestConfig`] and an invalid entry never yields a value.
#[derive(Debug, Clone, Deserialize)]
struct RawTestConfig {
    expert_mode: Option<RawExpertMode>,
    entry_point: Option<String>,
    // Explicit resource name, consulted when an expert mode entry has no
    // entry point to derive a name from.
    name: Option<String>,
    #[serde(default)]
    custom_load_shapes: bool,
    vanilla_specs: Option<RawVanillaSpecs>,
    #[serde(default = "default_image")]
    image: String,
    #[serde(default = "default_worker_replicas")]
    worker_replicas: u32,
    configmap: Option<String>,
    labels: Option<Labels>,
    annotations: Option<Annotations>,
    affinity: Option<Affinity>,
    tolerations: Option<Vec<Toleration>>,
}

fn default_image() -> String {
    DEFAULT_IMAGE.to_owned()
}

fn default_worker_replicas() -> u32 {
    DEFAULT_WORKER_REPLICAS
}

fn default_run_time() -> String {
    DEFAULT_RUN_TIME.to_owned()
}

/// Validated vanilla load parameters.
///
/// `target_host` is checked as a URL at promotion time but stored verbatim:
/// URL normalization would rewrite the author's text (e.g. append a
/// trailing slash) and corrupt the generated command seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VanillaSpecs {
    pub users: u64,
    pub spawn_rate: u64,
    pub run_time: String,
    pub stop_timeout: u64,
    pub target_host: String,
}

impl VanillaSpecs {
    fn promote(entry: &str, raw: RawVanillaSpecs) -> std::result::Result<Self, Vec<SchemaViolation>> {
        let mut violations = Vec::new();

        if !RUN_TIME_PATTERN.is_match(&raw.run_time) {
            violations.push(SchemaViolation::new(
                entry,
                "vanilla_specs.run_time",
                format!(
                    "must be a duration such as 300s, 20m, 3h or 1h30m, got '{}'",
                    raw.run_time
                ),
            ));
        }

        if let Err(err) = Url::parse(&raw.target_host) {
            violations.push(SchemaViolation::new(
                entry,
                "vanilla_specs.target_host",
                format!("must be a valid URL: {err}"),
            ));
        }

        if violations.is_empty() {
            Ok(Self {
                users: raw.users,
                spawn_rate: raw.spawn_rate,
                run_time: raw.run_time,
                stop_timeout: raw.stop_timeout,
                target_host: raw.target_host,
            })
        } else {
            Err(violations)
        }
    }
}

/// Operating mode of a test, reconstructed from the precedence rules
/// expert > custom load shape > vanilla. Each variant carries exactly the
/// fields its mode requires, so logically inconsistent configurations are
/// unrepresentable after promotion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestMode {
    /// Both command seeds supplied verbatim by the author.
    Expert {
        master_command_seed: String,
        worker_command_seed: String,
        /// Entry point when present, otherwise the explicit `name` field.
        name_source: String,
    },
    /// Load behavior driven by logic inside the entry point script.
    CustomShape { entry_point: String },
    /// Fixed user-count/spawn-rate/duration parameters.
    Vanilla {
        entry_point: String,
        specs: VanillaSpecs,
    },
}

impl TestMode {
    /// The string the resource name is normalized from.
    pub fn name_source(&self) -> &str {
        match self {
            TestMode::Expert { name_source, .. } => name_source,
            TestMode::CustomShape { entry_point } => entry_point,
            TestMode::Vanilla { entry_point, .. } => entry_point,
        }
    }
}

/// One fully validated test configuration. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct TestConfig {
    pub mode: TestMode,
    pub image: String,
    pub worker_replicas: u32,
    pub configmap: Option<String>,
    pub labels: Option<Labels>,
    pub annotations: Option<Annotations>,
    pub affinity: Option<Affinity>,
    pub tolerations: Option<Vec<Toleration>>,
}

impl TestConfig {
    fn promote(entry: &str, raw: RawTestConfig) -> std::result::Result<Self, Vec<SchemaViolation>> {
        let mut violations = Vec::new();

        // The vanilla_specs section is shape-checked whenever present,
        // regardless of the mode that ends up selected.
        let had_specs_section = raw.vanilla_specs.is_some();
        let specs = match raw.vanilla_specs {
            Some(raw_specs) => match VanillaSpecs::promote(entry, raw_specs) {
                Ok(specs) => Some(specs),
                Err(mut errs) => {
                    violations.append(&mut errs);
                    None
                }
            },
            None => None,
        };

        let mode = match raw.expert_mode {
            Some(expert) if expert.enabled => {
                let name_source = match raw.entry_point.or(raw.name) {
                    Some(source) => source,
                    None => {
                        violations.push(SchemaViolation::new(
                            entry,
                            "name",
                            "expert mode entries must provide 'entry_point' or 'name' \
                             to derive the resource name",
                        ));
                        String::new()
                    }
                };
                TestMode::Expert {
                    master_command_seed: expert.master_command_seed,
                    worker_command_seed: expert.worker_command_seed,
                    name_source,
                }
            }
            _ => {
                let entry_point = raw.entry_point.unwrap_or_else(|| {
                    violations.push(SchemaViolation::new(
                        entry,
                        "entry_point",
                        "the field 'entry_point' must be provided",
                    ));
                    String::new()
                });

                if raw.custom_load_shapes {
                    TestMode::CustomShape { entry_point }
                } else {
                    match specs {
                        Some(specs) => TestMode::Vanilla { entry_point, specs },
                        None => {
                            if !had_specs_section {
                                violations.push(SchemaViolation::new(
                                    entry,
                                    "vanilla_specs",
                                    "the section 'vanilla_specs' must be provided",
                                ));
                            }
                            // Placeholder, discarded below: violations is
                            // guaranteed non-empty on this path.
                            TestMode::CustomShape { entry_point }
                        }
                    }
                }
            }
        };

        if !violations.is_empty() {
            return Err(violations);
        }

        Ok(Self {
            mode,
            image: raw.image,
            worker_replicas: raw.worker_replicas,
            configmap: raw.configmap,
            labels: raw.labels,
            annotations: raw.annotations,
            affinity: raw.affinity,
            tolerations: raw.tolerations,
        })
    }
}

/// Per-node-role label mappings passed through to the generated resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels {
    #[serde(default)]
    pub master: HashMap<String, String>,
    #[serde(default)]
    pub worker: HashMap<String, String>,
}

/// Per-node-role annotation mappings passed through to the generated resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotations {
    #[serde(default)]
    pub master: HashMap<String, String>,
    #[serde(default)]
    pub worker: HashMap<String, String>,
}

/// Node affinity constraint. Keys use their Kubernetes camelCase names on
/// both the input and output side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affinity {
    #[serde(rename = "nodeAffinity", skip_serializing_if = "Option::is_none")]
    pub node_affinity: Option<NodeAffinity>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAffinity {
    #[serde(
        rename = "requiredDuringSchedulingIgnoredDuringExecution",
        default
    )]
    pub required_during_scheduling_ignored_during_execution: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toleration {
    pub key: String,
    pub operator: TolerationOperator,
    pub effect: TaintEffect,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TolerationOperator {
    Exists,
    Equal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaintEffect {
    NoSchedule,
    PreferNoSchedule,
    NoExecute,
}

/// The overall configuration document: group key to test configuration,
/// preserving document order for deterministic output.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    entries: Vec<(String, TestConfig)>,
}

impl Configuration {
    /// Parse and validate a whole document from YAML text.
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        let value: serde_yaml::Value =
            serde_yaml::from_str(source).map_err(|err| AppError::MalformedDocument(err.to_string()))?;
        Self::from_value(value)
    }

    /// Validate an already-decoded YAML value. Every entry is checked;
    /// violations from all invalid entries are reported together.
    pub fn from_value(value: serde_yaml::Value) -> Result<Self> {
        let mapping = match value {
            serde_yaml::Value::Mapping(mapping) => mapping,
            _ => {
                return Err(AppError::MalformedDocument(
                    "top level must be a mapping of test names to test configurations".to_owned(),
                ))
            }
        };

        let mut entries: Vec<(String, TestConfig)> = Vec::with_capacity(mapping.len());
        let mut violations = Vec::new();

        for (key, raw_value) in mapping {
            let key = match key.as_str() {
                Some(key) => key.to_owned(),
                None => {
                    return Err(AppError::MalformedDocument(
                        "test names must be strings".to_owned(),
                    ))
                }
            };

            // serde_yaml already rejects duplicate mapping keys at parse
            // time; this guards callers handing us a hand-built value.
            if entries.iter().any(|(existing, _)| existing == &key) {
                violations.push(SchemaViolation::new(
                    &key,
                    "<document>",
                    "duplicate test name",
                ));
                continue;
            }

            match serde_yaml::from_value::<RawTestConfig>(raw_value) {
                Ok(raw) => match TestConfig::promote(&key, raw) {
                    Ok(config) => entries.push((key, config)),
                    Err(mut errs) => violations.append(&mut errs),
                },
                Err(err) => {
                    violations.push(SchemaViolation::new(&key, "<entry>", err.to_string()));
                }
            }
        }

        if !violations.is_empty() {
            return Err(AppError::SchemaValidation(violations));
        }

        debug!("Validated configuration with {} entries", entries.len());
        Ok(Self { entries })
    }

    /// Entries in document order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &TestConfig)> {
        self.entries.iter().map(|(key, config)| (key.as_str(), config))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
