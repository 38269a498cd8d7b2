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

use std::collections::BTreeMap;
use std::fmt;

/// The database technologies a bound service can be mapped to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ServiceKind {
    Mysql,
    Postgresql,
    Mongodb,
    /// Any relational service, MySQL and PostgreSQL alike.
    GenericRdbms,
}

impl ServiceKind {
    /// Classify a service label such as `mysql-5.1` or `mongodb-1.8`.
    ///
    /// Only the specific kinds are returned here, relational services are
    /// additionally reported under [`ServiceKind::GenericRdbms`] by the
    /// environment reader.
    pub fn from_label(label: &str) -> Option<ServiceKind> {
        if label.starts_with("mysql") {
            Some(ServiceKind::Mysql)
        } else if label.starts_with("postgres") {
            Some(ServiceKind::Postgresql)
        } else if label.starts_with("mongodb") {
            Some(ServiceKind::Mongodb)
        } else {
            None
        }
    }

    pub fn is_relational(&self) -> bool {
        !matches!(self, ServiceKind::Mongodb)
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServiceKind::Mysql => "MySQL",
            ServiceKind::Postgresql => "PostgreSQL",
            ServiceKind::Mongodb => "MongoDB",
            ServiceKind::GenericRdbms => "RDBMS",
        };
        f.write_str(name)
    }
}

/// One backing service bound to the application instance.
///
/// Every credential field is optional: a binding is never rejected for
/// missing data, the gap surfaces as an empty configuration value instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceBinding {
    pub kind: ServiceKind,
    /// The instance name chosen when the service was created.
    pub name: Option<String>,
    pub label: String,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// JDBC connection string, only set for relational services.
    pub url: Option<String>,
}

impl ServiceBinding {
    pub fn new(kind: ServiceKind, label: impl Into<String>) -> Self {
        ServiceBinding {
            kind,
            name: None,
            label: label.into(),
            host: None,
            port: None,
            database: None,
            username: None,
            password: None,
            url: None,
        }
    }

    /// The port rendered as text, empty when unknown.
    pub fn port_text(&self) -> String {
        self.port.map(|port| port.to_string()).unwrap_or_default()
    }
}

/// Bound services grouped by kind, each group kept in document order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BindingsByKind {
    groups: BTreeMap<ServiceKind, Vec<ServiceBinding>>,
}

impl BindingsByKind {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a binding to the group of the given kind.
    pub fn push(&mut self, kind: ServiceKind, binding: ServiceBinding) {
        self.groups.entry(kind).or_default().push(binding);
    }

    /// The bindings of one kind, empty when none are bound.
    pub fn get(&self, kind: ServiceKind) -> &[ServiceBinding] {
        self.groups.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }
}

impl FromIterator<ServiceBinding> for BindingsByKind {
    /// Group bindings by their own kind, without any generic RDBMS fan-out.
    fn from_iter<I: IntoIterator<Item = ServiceBinding>>(iter: I) -> Self {
        let mut bindings = BindingsByKind::new();
        for binding in iter {
            bindings.push(binding.kind, binding);
        }
        bindings
    }
}
