use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::Result;

use super::config::Configuration;
use super::generator;
use super::resource::LocustTest;

/// Load and validate a configuration file without generating anything.
pub fn validate(config_path: &Path) -> Result<Configuration> {
    info!(
        "Collecting raw configuration from file: '{}'",
        config_path.display()
    );

    let source = fs::read_to_string(config_path)?;
    let configuration = Configuration::from_yaml_str(&source)?;
    debug!("Parsed configuration: {configuration:?}");

    Ok(configuration)
}

/// Run the full pipeline: validate, assemble, and write one manifest file
/// per test entry into `output_dir`. Returns the written paths in document
/// order.
pub fn generate(config_path: &Path, output_dir: &Path) -> Result<Vec<PathBuf>> {
    let configuration = validate(config_path)?;
    let resources = generator::build_resources(&configuration);
    write_resource_files(&resources, output_dir)
}

/// Serialize each resource to `<output_dir>/<metadata.name>.yaml`, creating
/// the directory if absent. Absent optional fields are omitted from the
/// output.
pub fn write_resource_files(resources: &[LocustTest], output_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)?;

    let mut written = Vec::with_capacity(resources.len());
    for resource in resources {
        let path = output_dir.join(format!("{}.yaml", resource.metadata.name));
        let rendered = serde_yaml::to_string(resource)?;

        info!(
            "Writing configuration for test: {} at {}",
            resource.metadata.name,
            path.display()
        );
        debug!("Configuration\n{rendered}");

        fs::write(&path, rendered)?;
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_validate_missing_file_is_io_failure() {
        let err = validate(Path::new("/nonexistent/tests.yaml")).unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }
}
