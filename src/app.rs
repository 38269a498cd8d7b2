// Copyright 2023 The cfbridge Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::io::Write;

use cfb_common::environment::CloudEnvironment;
use cfb_common::properties::Properties;
use cfb_resolver::ServiceConfigResolver;
use tracing::info;

use crate::config::{Config, Format};
use crate::errors::{Error, Result};

/// Resolve the configuration and write it to the configured output.
pub fn run(config: &Config) -> Result<()> {
    let properties = resolve(config)?;
    let content = match config.format {
        Format::Properties => properties.to_properties_string(),
        Format::Json => properties.to_json_string()?,
    };

    match &config.output {
        Some(path) => {
            Properties::write(path, &content)?;
            info!("Wrote {} configuration entries to {}", properties.len(), path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes()).map_err(Error::OutputError)?;
            stdout.flush().map_err(Error::OutputError)?;
        }
    }

    Ok(())
}

/// Load the existing configuration and complete it from the bound services.
pub fn resolve(config: &Config) -> Result<Properties> {
    let mut properties = match &config.config_file {
        Some(path) => {
            info!("Loading the existing configuration from {}", path.display());
            Properties::load(path)?
        }
        None => Properties::new(),
    };

    let environment = CloudEnvironment::from_payload(config.vcap_services.as_deref())?;
    info!("Found {} supported bound services", environment.services().len());

    let resolver = ServiceConfigResolver::new(config.sql_strategy.into());
    let applied = resolver.resolve(&environment.bindings(), &mut properties);

    if applied.is_empty() {
        info!("No bound service was applied to the configuration");
    } else {
        info!("Configured from bound services: {:?}", applied);
    }

    Ok(properties)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Strategy;

    const PAYLOAD: &str = r#"{
        "mysql-5.1": [{"name": "orders", "label": "mysql-5.1", "credentials": {
            "name": "d", "hostname": "h", "port": 3306, "user": "u", "password": "p"
        }}],
        "mongodb-1.8": [{"name": "catalog", "label": "mongodb-1.8", "credentials": {
            "hostname": "m", "port": 27017, "db": "c", "username": "mu", "password": "mp"
        }}]
    }"#;

    fn config(strategy: Strategy) -> Config {
        Config {
            vcap_services: Some(PAYLOAD.to_string()),
            config_file: None,
            output: None,
            format: Format::Properties,
            sql_strategy: strategy,
        }
    }

    #[test]
    fn test_resolve_from_payload() {
        let properties = resolve(&config(Strategy::Generic)).unwrap();

        assert_eq!(properties.get("db.driver"), Some("com.mysql.jdbc.Driver"));
        assert_eq!(properties.get("db.url"), Some("jdbc:mysql://h:3306/d"));
        assert_eq!(properties.get("db.user"), Some("u"));
        assert_eq!(properties.get("morphia.db.name"), Some("c"));
        assert_eq!(properties.get("mongo.host"), Some("m"));
    }

    #[test]
    fn test_strategies_agree_on_single_mysql() {
        let generic = resolve(&config(Strategy::Generic)).unwrap();
        let explicit = resolve(&config(Strategy::Explicit)).unwrap();

        assert_eq!(generic, explicit);
    }

    #[test]
    fn test_resolve_without_services() {
        let properties = resolve(&Config {
            vcap_services: None,
            ..config(Strategy::Generic)
        })
        .unwrap();

        assert!(properties.is_empty());
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let result = resolve(&Config {
            config_file: Some("does/not/exist.conf".into()),
            ..config(Strategy::Generic)
        });

        assert!(matches!(result, Err(Error::ConfigurationError(_))));
    }

    fn output_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("cfbridge-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_run_writes_properties_file() {
        let path = output_path("application.conf");
        let config = Config {
            output: Some(path.clone()),
            ..config(Strategy::Generic)
        };

        run(&config).unwrap();
        let written = Properties::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(written, resolve(&config).unwrap());
        assert_eq!(written.get("db.url"), Some("jdbc:mysql://h:3306/d"));
    }

    #[test]
    fn test_run_writes_json_file() {
        let path = output_path("application.json");
        let config = Config {
            output: Some(path.clone()),
            format: Format::Json,
            ..config(Strategy::Generic)
        };

        run(&config).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!(content.starts_with("{\n  \"db.driver\": \"com.mysql.jdbc.Driver\""));
        assert!(content.contains("\"mongo.port\": \"27017\""));
    }

    #[test]
    fn test_run_reports_unwritable_output() {
        let config = Config {
            output: Some(output_path("missing").join("application.conf")),
            ..config(Strategy::Generic)
        };

        let result = run(&config);

        assert!(matches!(result, Err(Error::ConfigurationError(_))));
    }
}
