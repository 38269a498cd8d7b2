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

use std::path::PathBuf;

use cfb_resolver::SqlStrategy;
use clap::ValueEnum;

/// The configuration parameters for the application.
///
/// These can either be passed on the command line, or pulled from environment variables.
/// The latter is preferred as the platform announces the bound services through the
/// `VCAP_SERVICES` environment variable of each application instance.
///
/// For development convenience, these can also be read from a `.env` file in the working
/// directory where the application is started.
#[derive(Clone, Debug, clap::Parser)]
#[clap(name = "cfbridge", version, about)]
pub struct Config {
    /// The JSON payload describing the services bound to this instance.
    #[clap(long, env = "VCAP_SERVICES", hide_env_values = true)]
    pub vcap_services: Option<String>,

    /// An existing configuration file. Entries found there are never overridden.
    #[clap(long, env = "CFB_CONFIG_FILE")]
    pub config_file: Option<PathBuf>,

    /// Where to write the resulting configuration, standard output if not set.
    #[clap(long, env = "CFB_OUTPUT")]
    pub output: Option<PathBuf>,

    /// The format of the resulting configuration.
    #[clap(long, env = "CFB_FORMAT", value_enum, default_value_t = Format::Properties)]
    pub format: Format,

    /// How the SQL datasource is picked among the bound services.
    #[clap(long, env = "CFB_SQL_STRATEGY", value_enum, default_value_t = Strategy::Generic)]
    pub sql_strategy: Strategy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Properties,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    /// Any relational service, MySQL labelled ones first.
    Generic,
    /// MySQL services, then PostgreSQL services.
    Explicit,
}

impl From<Strategy> for SqlStrategy {
    fn from(value: Strategy) -> Self {
        match value {
            Strategy::Generic => SqlStrategy::Generic,
            Strategy::Explicit => SqlStrategy::Explicit,
        }
    }
}
