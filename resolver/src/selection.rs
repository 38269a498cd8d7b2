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

use cfb_common::service::{ServiceBinding, ServiceKind};
use tracing::{info, warn};

/// The configuration consumer a selection was made for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    /// The SQL datasource (`db.*` and `jpa.dialect`).
    Datasource,
    /// The Morphia document-mapping plugin (`morphia.*`).
    Morphia,
    /// The plain MongoDB driver plugin (`mongo.*`).
    Mongo,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// No service of the kind is bound.
    None,
    /// A service was chosen and its configuration written.
    Selected,
    /// The target is already configured and was left untouched.
    SkippedExisting,
}

/// The outcome of resolving one target from the bindings of one kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceSelection {
    pub kind: ServiceKind,
    pub target: Target,
    pub disposition: Disposition,
    pub binding: Option<ServiceBinding>,
}

impl ServiceSelection {
    pub fn none(kind: ServiceKind, target: Target) -> Self {
        ServiceSelection { kind, target, disposition: Disposition::None, binding: None }
    }

    pub fn skipped(kind: ServiceKind, target: Target) -> Self {
        ServiceSelection { kind, target, disposition: Disposition::SkippedExisting, binding: None }
    }

    pub fn selected(kind: ServiceKind, target: Target, binding: &ServiceBinding) -> Self {
        ServiceSelection {
            kind,
            target,
            disposition: Disposition::Selected,
            binding: Some(binding.clone()),
        }
    }

    pub fn is_selected(&self) -> bool {
        self.disposition == Disposition::Selected
    }
}

/// Pick the first bound service. Having several is not an error, only the
/// first one in list order is used.
pub fn first(kind: ServiceKind, services: &[ServiceBinding]) -> Option<&ServiceBinding> {
    match services {
        [] => {
            info!("There is no {} service bound to this application instance", kind);
            None
        }
        [first] => Some(first),
        [first, ..] => {
            warn!(
                "There is more than one {} service bound to this application instance, only the first will be used",
                kind
            );
            Some(first)
        }
    }
}
