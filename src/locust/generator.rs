use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use super::config::{Configuration, TestConfig, TestMode};
use super::resource::{LocustTest, Metadata, Spec};

/// Container-local directory the test sources are mounted under.
pub const CONTAINER_TEST_DIR: &str = "/lotest/src/";

// Acronym-to-word boundary: >AC<amelCase.
static ACRONYM_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Z]+)([A-Z][a-z])").expect("valid boundary pattern"));

// Word boundary after a lowercase letter or digit: ACame>lC<ase, ACame>l5<Case.
static WORD_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("valid boundary pattern"));

/// Derive the resource name `<lowercased-key>.<normalized-script-name>`.
///
/// The script segment is the final path component with a trailing `.py`
/// stripped, underscores replaced by hyphens, hyphens inserted at camel-case
/// boundaries, and the result lowercased so the name is always a legal
/// DNS-label-style identifier. The acronym pass must run before the word
/// pass: the hyphens it inserts would otherwise disrupt the second scan.
pub fn resource_name(test_key: &str, name_source: &str) -> String {
    let script = name_source.rsplit('/').next().unwrap_or(name_source);
    let script = script.strip_suffix(".py").unwrap_or(script);
    let script = script.replace('_', "-");
    let script = ACRONYM_BOUNDARY.replace_all(&script, "${1}-${2}");
    let script = WORD_BOUNDARY.replace_all(&script, "${1}-${2}");

    let name = format!("{}.{}", test_key.to_lowercase(), script.to_lowercase());
    debug!("Generated resource name from '{name_source}': {name}");
    name
}

// Literal string join: the double slash is tolerated by the runtime and
// deliberately not collapsed.
fn container_test_file(entry_point: &str) -> String {
    format!("{CONTAINER_TEST_DIR}/{entry_point}")
}

fn locustfile_argument(entry_point: &str) -> String {
    format!("--locustfile {}", container_test_file(entry_point))
}

/// Derive the master node command seed. Mode precedence, first match wins:
/// expert (verbatim), custom load shape, vanilla.
pub fn master_command_seed(config: &TestConfig) -> String {
    let command = match &config.mode {
        TestMode::Expert {
            master_command_seed, ..
        } => master_command_seed.clone(),
        TestMode::CustomShape { entry_point } => locustfile_argument(entry_point),
        TestMode::Vanilla { entry_point, specs } => format!(
            "--locustfile {} --host {} --users {} --spawn-rate {} --run-time {} --stop-timeout {}",
            container_test_file(entry_point),
            specs.target_host,
            specs.users,
            specs.spawn_rate,
            specs.run_time,
            specs.stop_timeout,
        ),
    };

    debug!("Generated 'MASTER' node command seed: {command}");
    command
}

/// Derive the worker node command seed: verbatim in expert mode, the
/// locustfile argument otherwise.
pub fn worker_command_seed(config: &TestConfig) -> String {
    let command = match &config.mode {
        TestMode::Expert {
            worker_command_seed, ..
        } => worker_command_seed.clone(),
        TestMode::CustomShape { entry_point } | TestMode::Vanilla { entry_point, .. } => {
            locustfile_argument(entry_point)
        }
    };

    debug!("Generated 'WORKER' node command seed: {command}");
    command
}

fn build_spec(config: &TestConfig) -> Spec {
    Spec {
        image: config.image.clone(),
        master_command_seed: master_command_seed(config),
        worker_command_seed: worker_command_seed(config),
        worker_replicas: config.worker_replicas,
        config_map: config.configmap.clone(),
        labels: config.labels.clone(),
        annotations: config.annotations.clone(),
        affinity: config.affinity.clone(),
        tolerations: config.tolerations.clone(),
    }
}

/// Assemble one LocustTest resource per document entry, preserving document
/// order. Entries are independent; no cross-entry validation happens here.
pub fn build_resources(configuration: &Configuration) -> Vec<LocustTest> {
    info!("Generating custom resources for collected configuration");

    configuration
        .entries()
        .map(|(key, config)| {
            let metadata = Metadata {
                name: resource_name(key, config.mode.name_source()),
            };
            let resource = LocustTest::new(metadata, build_spec(config));

            info!("Generated custom resource for test: {key}");
            debug!("Custom resource: {resource:?}");
            resource
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locust::config::VanillaSpecs;

    const ENTRY_POINT: &str = "src/my_test.py";
    const EXPERT_SEED: &str = "--locustfile src/my_test.py --u 1000";

    fn base_config(mode: TestMode) -> TestConfig {
        TestConfig {
            mode,
            image: "locustio/locust:latest".to_owned(),
            worker_replicas: 5,
            configmap: None,
            labels: None,
            annotations: None,
            affinity: None,
            tolerations: None,
        }
    }

    fn expert_config() -> TestConfig {
        base_config(TestMode::Expert {
            master_command_seed: EXPERT_SEED.to_owned(),
            worker_command_seed: EXPERT_SEED.to_owned(),
            name_source: ENTRY_POINT.to_owned(),
        })
    }

    fn custom_shape_config() -> TestConfig {
        base_config(TestMode::CustomShape {
            entry_point: ENTRY_POINT.to_owned(),
        })
    }

    fn vanilla_config() -> TestConfig {
        base_config(TestMode::Vanilla {
            entry_point: "my_test.py".to_owned(),
            specs: VanillaSpecs {
                users: 10000,
                spawn_rate: 20,
                run_time: "55h".to_owned(),
                stop_timeout: 0,
                target_host: "http://localhost:8080".to_owned(),
            },
        })
    }

    #[test]
    fn test_expert_master_seed_is_verbatim() {
        assert_eq!(master_command_seed(&expert_config()), EXPERT_SEED);
    }

    #[test]
    fn test_expert_worker_seed_is_verbatim() {
        assert_eq!(worker_command_seed(&expert_config()), EXPERT_SEED);
    }

    #[test]
    fn test_custom_shape_seeds_use_container_path_join() {
        let config = custom_shape_config();
        let expected = "--locustfile /lotest/src//src/my_test.py";
        assert_eq!(master_command_seed(&config), expected);
        assert_eq!(worker_command_seed(&config), expected);
    }

    #[test]
    fn test_vanilla_master_seed_has_all_flags_in_order() {
        let config = vanilla_config();
        assert_eq!(
            master_command_seed(&config),
            "--locustfile /lotest/src//my_test.py --host http://localhost:8080 \
             --users 10000 --spawn-rate 20 --run-time 55h --stop-timeout 0"
        );
    }

    #[test]
    fn test_vanilla_worker_seed_matches_custom_shape_template() {
        let config = vanilla_config();
        assert_eq!(
            worker_command_seed(&config),
            "--locustfile /lotest/src//my_test.py"
        );
    }

    #[test]
    fn test_resource_name_from_snake_case_entry_point() {
        assert_eq!(resource_name("loadTest", "src/my_test.py"), "loadtest.my-test");
    }

    #[test]
    fn test_resource_name_splits_camel_case() {
        assert_eq!(resource_name("team", "myTest.py"), "team.my-test");
    }

    #[test]
    fn test_resource_name_splits_acronym_boundaries() {
        assert_eq!(resource_name("team", "ACmeCase"), "team.a-cme-case");
    }

    #[test]
    fn test_resource_name_splits_digit_boundaries() {
        assert_eq!(resource_name("team", "ACamel5Case.py"), "team.a-camel5-case");
    }

    #[test]
    fn test_resource_name_mixed_underscores_and_camel_case() {
        assert_eq!(
            resource_name("TLM", "src/nested/apiLoad_smokeTest.py"),
            "tlm.api-load-smoke-test"
        );
    }

    #[test]
    fn test_resource_name_strips_only_trailing_py() {
        assert_eq!(resource_name("team", "my.pytest.py"), "team.my.pytest");
    }

    #[test]
    fn test_build_resources_preserves_count_and_order() {
        let configuration = Configuration::from_yaml_str(
            r#"
beta:
  entry_point: b_test.py
  custom_load_shapes: true
alpha:
  entry_point: a_test.py
  custom_load_shapes: true
"#,
        )
        .unwrap();

        let resources = build_resources(&configuration);
        assert_eq!(resources.len(), configuration.len());
        assert_eq!(resources[0].metadata.name, "beta.b-test");
        assert_eq!(resources[1].metadata.name, "alpha.a-test");
    }

    #[test]
    fn test_build_resources_passes_scheduling_fields_through() {
        let configuration = Configuration::from_yaml_str(
            r#"
sched:
  entry_point: my_test.py
  custom_load_shapes: true
  worker_replicas: 3
  configmap: perf-settings
  affinity:
    nodeAffinity:
      requiredDuringSchedulingIgnoredDuringExecution:
        nodeGroup-label: dedicated-performance
  tolerations:
    - key: hardware
      operator: Equal
      effect: NoSchedule
      value: ssd
"#,
        )
        .unwrap();

        let resources = build_resources(&configuration);
        let spec = &resources[0].spec;
        assert_eq!(spec.worker_replicas, 3);
        assert_eq!(spec.config_map.as_deref(), Some("perf-settings"));
        assert!(spec.affinity.is_some());
        assert_eq!(spec.tolerations.as_ref().unwrap().len(), 1);
        assert_eq!(spec.labels, None);
    }

    #[test]
    fn test_generated_resource_carries_constants() {
        let configuration = Configuration::from_yaml_str(
            r#"
team:
  entry_point: my_test.py
  custom_load_shapes: true
"#,
        )
        .unwrap();

        let resource = build_resources(&configuration).remove(0);
        assert_eq!(resource.api_version, "locust.io/v1");
        assert_eq!(resource.kind, "LocustTest");
    }
}
