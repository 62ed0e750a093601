use serde::{Deserialize, Serialize};

use super::config::{Affinity, Annotations, Labels, Toleration};

/// API group/version of the LocustTest custom resource definition.
pub const API_VERSION: &str = "locust.io/v1";
/// Kind of the generated resource.
pub const KIND: &str = "LocustTest";

/// One generated LocustTest custom resource. Write-once terminal artifact:
/// serialized to a manifest file and then discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocustTest {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: Metadata,
    pub spec: Spec,
}

impl LocustTest {
    pub fn new(metadata: Metadata, spec: Spec) -> Self {
        Self {
            api_version: API_VERSION.to_owned(),
            kind: KIND.to_owned(),
            metadata,
            spec,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub name: String,
}

/// Desired runtime state of one load test. Serialized with the CRD's
/// camelCase field names; absent optional fields are omitted entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spec {
    pub image: String,
    #[serde(rename = "masterCommandSeed")]
    pub master_command_seed: String,
    #[serde(rename = "workerCommandSeed")]
    pub worker_command_seed: String,
    #[serde(rename = "workerReplicas")]
    pub worker_replicas: u32,
    #[serde(rename = "configMap", skip_serializing_if = "Option::is_none")]
    pub config_map: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Labels>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Annotations>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affinity: Option<Affinity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerations: Option<Vec<Toleration>>,
}
