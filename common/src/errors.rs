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

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("InvalidServicesPayload: {0}")]
    InvalidServicesPayload(#[source] serde_json::Error),

    #[error("ReadPropertiesFailed: {}: {source}", path.display())]
    ReadPropertiesFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("WritePropertiesFailed: {}: {source}", path.display())]
    WritePropertiesFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("RenderFailed: {0}")]
    RenderFailed(#[source] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
