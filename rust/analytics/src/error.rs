// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::model::EntityId;
use thiserror::Error;

/// Result type for analytics operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading a model snapshot or handling
/// auxiliary payloads. The analysis pass itself never fails.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Duplicate entity id {0} in model snapshot")]
    DuplicateEntity(EntityId),

    #[error("Invalid clash result payload: {0}")]
    InvalidClashPayload(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
