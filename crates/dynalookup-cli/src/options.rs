//! Loading lookup options from a file plus command-line overrides.

use anyhow::Context;
use clap::Args;
use dynalookup_query::LookupOptions;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Options file and the connection overrides shared by every command
#[derive(Args, Debug, Clone)]
pub struct OptionsArgs {
    /// Lookup options file (YAML or JSON)
    #[arg(long = "options", env = "DYNALOOKUP_OPTIONS")]
    pub options_file: PathBuf,

    /// AWS region, overrides the options file
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Custom DynamoDB endpoint (DynamoDB Local, LocalStack)
    #[arg(long, env = "DYNALOOKUP_ENDPOINT")]
    pub endpoint: Option<String>,

    /// AWS access key ID
    #[arg(long, env = "AWS_ACCESS_KEY_ID")]
    pub access_key_id: Option<String>,

    /// AWS secret access key
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub secret_access_key: Option<String>,

    /// Maximum rows returned per entity
    #[arg(long)]
    pub limit: Option<i32>,
}

impl OptionsArgs {
    /// Read the options file, apply overrides and validate the result
    pub fn load(&self) -> anyhow::Result<LookupOptions> {
        let contents = std::fs::read_to_string(&self.options_file).with_context(|| {
            format!(
                "Failed to read options file {}",
                self.options_file.display()
            )
        })?;

        let options = self.merge(&contents, &self.options_file)?;
        options.validate().context("Invalid lookup options")?;

        debug!(options = ?options, "Loaded lookup options");
        Ok(options)
    }

    fn merge(&self, contents: &str, path: &Path) -> anyhow::Result<LookupOptions> {
        // YAML is a superset of JSON, so both file formats parse here
        let mut document: Value = serde_yaml::from_str(contents)
            .with_context(|| format!("Failed to parse options file {}", path.display()))?;

        let map = document
            .as_object_mut()
            .with_context(|| format!("Options file {} must contain a mapping", path.display()))?;

        let overrides = [
            ("region", self.region.clone().map(Value::String)),
            ("endpoint", self.endpoint.clone().map(Value::String)),
            ("accessKeyId", self.access_key_id.clone().map(Value::String)),
            (
                "secretAccessKey",
                self.secret_access_key.clone().map(Value::String),
            ),
            ("limit", self.limit.map(Value::from)),
        ];

        for (key, value) in overrides {
            if let Some(value) = value {
                map.insert(key.to_string(), value);
            }
        }

        serde_json::from_value(document)
            .with_context(|| format!("Invalid options in {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(path: PathBuf) -> OptionsArgs {
        OptionsArgs {
            options_file: path,
            region: None,
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            limit: None,
        }
    }

    fn write_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_yaml_options() {
        let file = write_file(
            r#"
region:
  value: us-east-1
  display: US East
query: SELECT * FROM "users" WHERE "pk" = ?
queryParameter: "USER#{{entity}}"
limit: 5
summaryAttributes: "Name:name"
"#,
        );

        let options = args(file.path().to_path_buf()).load().unwrap();
        assert_eq!(options.region, "us-east-1");
        assert_eq!(options.query_parameter, "USER#{{entity}}");
        assert_eq!(options.limit, Some(5));
    }

    #[test]
    fn test_overrides_win_over_file() {
        let file = write_file(
            r#"{"region": "us-east-1", "query": "SELECT 1", "queryParameter": "{{entity}}"}"#,
        );

        let mut args = args(file.path().to_path_buf());
        args.region = Some("eu-central-1".to_string());
        args.endpoint = Some("http://localhost:8000".to_string());
        args.access_key_id = Some("local".to_string());
        args.limit = Some(3);

        let options = args.load().unwrap();
        assert_eq!(options.region, "eu-central-1");
        assert_eq!(options.endpoint.as_deref(), Some("http://localhost:8000"));
        assert_eq!(options.access_key_id, "local");
        assert_eq!(options.limit, Some(3));
    }

    #[test]
    fn test_region_may_come_from_override_only() {
        let file = write_file("query: SELECT 1\nqueryParameter: \"{{entity}}\"\n");
        let mut args = args(file.path().to_path_buf());
        args.region = Some("ap-southeast-2".to_string());

        assert_eq!(args.load().unwrap().region, "ap-southeast-2");
    }

    #[test]
    fn test_malformed_attribute_spec_is_rejected() {
        let file = write_file(
            "region: us-east-1\nquery: SELECT 1\nqueryParameter: \"{{entity}}\"\ndetailAttributes: \"a:b:c:d\"\n",
        );
        let err = args(file.path().to_path_buf()).load().unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid configuration"));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = args(PathBuf::from("/nonexistent/options.yaml"))
            .load()
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read options file"));
    }
}
