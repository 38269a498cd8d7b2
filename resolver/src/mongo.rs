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
use cfb_common::service::{ServiceBinding, ServiceKind};
use tracing::{info, warn};

use crate::selection::{self, ServiceSelection, Target};

/// A MongoDB configuration consumer: the key telling whether it is
/// configured already, and how its entries are written.
struct Consumer {
    target: Target,
    name: &'static str,
    host_key: &'static str,
    write: fn(&ServiceBinding, &mut Properties),
}

const MORPHIA: Consumer = Consumer {
    target: Target::Morphia,
    name: "Morphia",
    host_key: "morphia.db.host",
    write: morphia,
};

const MONGO: Consumer = Consumer {
    target: Target::Mongo,
    name: "MongoDB",
    host_key: "mongo.host",
    write: mongo,
};

/// Configure both MongoDB consumers from the bound MongoDB services. Each
/// consumer is skipped on its own when it is configured already, and the
/// services are only looked at for a consumer that still needs them.
pub fn configure(services: &[ServiceBinding], config: &mut Properties) -> Vec<ServiceSelection> {
    let mut chosen = None;
    let mut pick = || *chosen.get_or_insert_with(|| selection::first(ServiceKind::Mongodb, services));

    [MORPHIA, MONGO]
        .iter()
        .map(|consumer| {
            if config.contains_key(consumer.host_key) {
                warn!("A {} configuration already exists, it will not be overridden", consumer.name);
                return ServiceSelection::skipped(ServiceKind::Mongodb, consumer.target);
            }

            let Some(service) = pick() else {
                return ServiceSelection::none(ServiceKind::Mongodb, consumer.target);
            };

            info!("Configuring the {} plugin from service {}", consumer.name, service.label);
            (consumer.write)(service, config);
            ServiceSelection::selected(ServiceKind::Mongodb, consumer.target, service)
        })
        .collect()
}

/// The Morphia plugin reads the database name at compile time, so
/// `morphia.db.name` should also be set in the application configuration.
fn morphia(service: &ServiceBinding, config: &mut Properties) {
    config.put("morphia.db.host", service.host.clone().unwrap_or_default());
    config.put("morphia.db.port", service.port_text());
    config.put("morphia.db.name", service.database.clone().unwrap_or_default());
    config.put("morphia.db.username", service.username.clone().unwrap_or_default());
    config.put("morphia.db.password", service.password.clone().unwrap_or_default());

    // "Long" is the other supported id type.
    config.put_if_absent("morphia.id.type", "ObjectId");
    config.put_if_absent("morphia.defaultWriteConcern", "safe");
}

fn mongo(service: &ServiceBinding, config: &mut Properties) {
    config.put("mongo.host", service.host.clone().unwrap_or_default());
    config.put("mongo.port", service.port_text());
    config.put("mongo.database", service.database.clone().unwrap_or_default());
    config.put("mongo.username", service.username.clone().unwrap_or_default());
    config.put("mongo.password", service.password.clone().unwrap_or_default());
}
