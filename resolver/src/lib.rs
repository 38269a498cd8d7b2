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

use std::collections::BTreeSet;

use cfb_common::properties::Properties;
use cfb_common::service::{BindingsByKind, ServiceKind};
use selection::ServiceSelection;
use tracing::debug;

pub mod mongo;
pub mod selection;
pub mod sql;

/// How the SQL datasource is looked up among the bound services. The two
/// strategies are alternatives, only one of them is active at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SqlStrategy {
    /// Any relational service, MySQL labelled ones first.
    #[default]
    Generic,
    /// MySQL services, then PostgreSQL services.
    Explicit,
}

impl SqlStrategy {
    fn kinds(&self) -> &'static [ServiceKind] {
        match self {
            SqlStrategy::Generic => &[ServiceKind::GenericRdbms],
            SqlStrategy::Explicit => &[ServiceKind::Mysql, ServiceKind::Postgresql],
        }
    }
}

/// Translates bound services into configuration entries, never overriding
/// what the application configured itself.
#[derive(Clone, Debug, Default)]
pub struct ServiceConfigResolver {
    strategy: SqlStrategy,
}

impl ServiceConfigResolver {
    pub fn new(strategy: SqlStrategy) -> Self {
        ServiceConfigResolver { strategy }
    }

    /// Apply the bindings to `config` and return one selection per target
    /// considered, in evaluation order.
    pub fn evaluate(&self, bindings: &BindingsByKind, config: &mut Properties) -> Vec<ServiceSelection> {
        let mut selections = sql::configure(self.strategy.kinds(), bindings, config);
        selections.extend(mongo::configure(bindings.get(ServiceKind::Mongodb), config));

        debug!("Resolved service selections: {:?}", selections);
        selections
    }

    /// Apply the bindings to `config` and return the kinds that were used.
    /// An empty set is a normal outcome.
    pub fn resolve(&self, bindings: &BindingsByKind, config: &mut Properties) -> BTreeSet<ServiceKind> {
        self.evaluate(bindings, config)
            .into_iter()
            .filter(ServiceSelection::is_selected)
            .map(|selection| selection.kind)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use cfb_common::service::ServiceBinding;

    use super::*;
    use crate::selection::{Disposition, Target};

    fn relational(kind: ServiceKind, label: &str, url: &str) -> ServiceBinding {
        ServiceBinding {
            url: Some(url.into()),
            username: Some("u".into()),
            password: Some("p".into()),
            ..ServiceBinding::new(kind, label)
        }
    }

    fn mongodb() -> ServiceBinding {
        ServiceBinding {
            host: Some("h".into()),
            port: Some(27017),
            database: Some("d".into()),
            ..ServiceBinding::new(ServiceKind::Mongodb, "mongodb-1.8")
        }
    }

    #[test]
    fn test_resolve_mysql_end_to_end() {
        let mut bindings = BindingsByKind::new();
        bindings.push(ServiceKind::Mysql, relational(ServiceKind::Mysql, "mysql-5.1", "jdbc:mysql://h/d"));
        let mut config = Properties::new();

        let applied = ServiceConfigResolver::new(SqlStrategy::Explicit).resolve(&bindings, &mut config);

        assert_eq!(applied, BTreeSet::from([ServiceKind::Mysql]));
        assert_eq!(config.get("db.driver"), Some("com.mysql.jdbc.Driver"));
        assert_eq!(config.get("db.url"), Some("jdbc:mysql://h/d"));
        assert_eq!(config.get("db.user"), Some("u"));
        assert_eq!(config.get("db.pass"), Some("p"));
    }

    #[test]
    fn test_explicit_mysql_takes_precedence_over_postgresql() {
        let mut bindings = BindingsByKind::new();
        bindings.push(ServiceKind::Mysql, relational(ServiceKind::Mysql, "mysql-5.1", "jdbc:mysql://h/d"));
        bindings.push(
            ServiceKind::Postgresql,
            relational(ServiceKind::Postgresql, "postgresql-9.0", "jdbc:postgresql://h/d"),
        );
        let mut config = Properties::new();

        let selections = ServiceConfigResolver::new(SqlStrategy::Explicit).evaluate(&bindings, &mut config);
        let datasource: Vec<&ServiceSelection> =
            selections.iter().filter(|s| s.target == Target::Datasource).collect();

        assert_eq!(datasource.len(), 1);
        assert_eq!(datasource[0].kind, ServiceKind::Mysql);
        assert!(datasource[0].is_selected());
        assert_eq!(config.get("db.url"), Some("jdbc:mysql://h/d"));
    }

    #[test]
    fn test_explicit_mysql_only_is_not_reported_as_existing() {
        let mut bindings = BindingsByKind::new();
        bindings.push(ServiceKind::Mysql, relational(ServiceKind::Mysql, "mysql-5.1", "jdbc:mysql://h/d"));
        let mut config = Properties::new();

        let selections = ServiceConfigResolver::new(SqlStrategy::Explicit).evaluate(&bindings, &mut config);

        assert!(selections
            .iter()
            .all(|s| s.disposition != Disposition::SkippedExisting));
        assert!(!selections.iter().any(|s| s.kind == ServiceKind::Postgresql));
        assert_eq!(
            ServiceConfigResolver::new(SqlStrategy::Explicit).resolve(&bindings, &mut Properties::new()),
            BTreeSet::from([ServiceKind::Mysql])
        );
    }

    #[test]
    fn test_explicit_existing_datasource_skips_both_kinds() {
        let mut bindings = BindingsByKind::new();
        bindings.push(ServiceKind::Mysql, relational(ServiceKind::Mysql, "mysql-5.1", "jdbc:mysql://h/d"));
        let mut config = Properties::new();
        config.put("db.url", "jdbc:h2:mem:play");

        let selections = ServiceConfigResolver::new(SqlStrategy::Explicit).evaluate(&bindings, &mut config);

        assert_eq!(selections[0].kind, ServiceKind::Mysql);
        assert_eq!(selections[0].disposition, Disposition::SkippedExisting);
        assert_eq!(selections[1].kind, ServiceKind::Postgresql);
        assert_eq!(selections[1].disposition, Disposition::SkippedExisting);
        assert_eq!(config.get("db.url"), Some("jdbc:h2:mem:play"));
    }

    #[test]
    fn test_explicit_postgresql_only() {
        let mut bindings = BindingsByKind::new();
        bindings.push(
            ServiceKind::Postgresql,
            relational(ServiceKind::Postgresql, "postgresql-9.0", "jdbc:postgresql://h/d"),
        );
        let mut config = Properties::new();

        let applied = ServiceConfigResolver::new(SqlStrategy::Explicit).resolve(&bindings, &mut config);

        assert_eq!(applied, BTreeSet::from([ServiceKind::Postgresql]));
        assert_eq!(config.get("db.driver"), Some("org.postgresql.Driver"));
    }

    #[test]
    fn test_generic_strategy_ignores_specific_kinds() {
        let mut bindings = BindingsByKind::new();
        bindings.push(ServiceKind::Mysql, relational(ServiceKind::Mysql, "mysql-5.1", "jdbc:mysql://h/d"));
        let mut config = Properties::new();

        let applied = ServiceConfigResolver::default().resolve(&bindings, &mut config);

        assert!(applied.is_empty());
        assert!(config.is_empty());
    }

    #[test]
    fn test_existing_config_is_a_no_op() {
        let mut bindings = BindingsByKind::new();
        bindings.push(
            ServiceKind::GenericRdbms,
            relational(ServiceKind::GenericRdbms, "mysql-5.1", "jdbc:mysql://h/d"),
        );
        bindings.push(ServiceKind::Mongodb, mongodb());

        let mut config = Properties::new();
        config.put("db", "mem");
        config.put("morphia.db.host", "localhost");
        config.put("mongo.host", "localhost");
        let before = config.clone();

        let applied = ServiceConfigResolver::default().resolve(&bindings, &mut config);

        assert!(applied.is_empty());
        assert_eq!(config, before);
    }

    #[test]
    fn test_resolve_all_families() {
        let mut bindings = BindingsByKind::new();
        bindings.push(
            ServiceKind::GenericRdbms,
            relational(ServiceKind::GenericRdbms, "postgresql-9.0", "jdbc:postgresql://h/d"),
        );
        bindings.push(ServiceKind::Mongodb, mongodb());
        let mut config = Properties::new();

        let selections = ServiceConfigResolver::default().evaluate(&bindings, &mut config);
        let targets: Vec<Target> = selections.iter().map(|s| s.target).collect();

        assert_eq!(targets, vec![Target::Datasource, Target::Morphia, Target::Mongo]);
        assert!(selections.iter().all(ServiceSelection::is_selected));
        assert_eq!(config.get("jpa.dialect"), Some("org.hibernate.dialect.PostgreSQLDialect"));
        assert_eq!(config.get("mongo.port"), Some("27017"));
    }

    #[test]
    fn test_nothing_bound_is_a_success() {
        let mut config = Properties::new();

        let applied = ServiceConfigResolver::default().resolve(&BindingsByKind::new(), &mut config);

        assert!(applied.is_empty());
        assert!(config.is_empty());
    }
}
