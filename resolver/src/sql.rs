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

use cfb_common::properties::Properties;
use cfb_common::service::{BindingsByKind, ServiceBinding, ServiceKind};
use tracing::{info, warn};

use crate::selection::{self, ServiceSelection, Target};

pub const MYSQL_DRIVER: &str = "com.mysql.jdbc.Driver";
pub const MYSQL_DIALECT: &str = "org.hibernate.dialect.MySQL5Dialect";

pub const POSTGRESQL_DRIVER: &str = "org.postgresql.Driver";
pub const POSTGRESQL_DIALECT: &str = "org.hibernate.dialect.PostgreSQLDialect";

/// The relational technology behind a datasource.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Technology {
    Mysql,
    Postgresql,
}

impl Technology {
    /// Decide the technology of the service chosen for `kind`. Generic
    /// services are PostgreSQL only when their label says so.
    pub fn of(kind: ServiceKind, service: &ServiceBinding) -> Self {
        match kind {
            ServiceKind::Postgresql => Technology::Postgresql,
            ServiceKind::GenericRdbms if service.label.starts_with("postgres") => Technology::Postgresql,
            _ => Technology::Mysql,
        }
    }

    pub fn driver(&self) -> &'static str {
        match self {
            Technology::Mysql => MYSQL_DRIVER,
            Technology::Postgresql => POSTGRESQL_DRIVER,
        }
    }

    pub fn dialect(&self) -> &'static str {
        match self {
            Technology::Mysql => MYSQL_DIALECT,
            Technology::Postgresql => POSTGRESQL_DIALECT,
        }
    }
}

/// Whether a SQL datasource is configured already.
pub fn is_configured(config: &Properties) -> bool {
    config.contains_key("db") || config.contains_key("db.url")
}

/// Configure the datasource from the services bound for the given kinds,
/// trying them in order until one is applied. Nothing is written when a
/// datasource was configured beforehand.
pub fn configure(
    kinds: &[ServiceKind],
    bindings: &BindingsByKind,
    config: &mut Properties,
) -> Vec<ServiceSelection> {
    if is_configured(config) {
        warn!("A SQL database configuration already exists, it will not be overridden");
        return kinds
            .iter()
            .map(|kind| ServiceSelection::skipped(*kind, Target::Datasource))
            .collect();
    }

    let mut selections = vec![];
    for kind in kinds {
        let selection = apply(*kind, bindings.get(*kind), config);
        let applied = selection.is_selected();
        selections.push(selection);
        if applied {
            break;
        }
    }
    selections
}

fn apply(kind: ServiceKind, services: &[ServiceBinding], config: &mut Properties) -> ServiceSelection {
    let service = match kind {
        ServiceKind::GenericRdbms => prefer_mysql(services),
        _ => selection::first(kind, services),
    };
    let Some(service) = service else {
        return ServiceSelection::none(kind, Target::Datasource);
    };

    let technology = Technology::of(kind, service);
    info!("Configuring the {:?} datasource from service {}", technology, service.label);

    config.put("db.driver", technology.driver());
    config.put("jpa.dialect", technology.dialect());
    config.put("db.url", service.url.clone().unwrap_or_default());
    config.put("db.user", service.username.clone().unwrap_or_default());
    config.put("db.pass", service.password.clone().unwrap_or_default());

    ServiceSelection::selected(kind, Target::Datasource, service)
}

/// The first MySQL labelled service, or the first service at all.
fn prefer_mysql(services: &[ServiceBinding]) -> Option<&ServiceBinding> {
    let first = selection::first(ServiceKind::GenericRdbms, services)?;
    Some(services.iter().find(|s| s.label.starts_with("mysql")).unwrap_or(first))
}
