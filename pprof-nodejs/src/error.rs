// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::tree::arena::NodeId;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to write the encoded profile: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse profile JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid call tree: {0}")]
    InvalidTree(String),

    #[error("node {0} is not part of the call tree")]
    UnknownNode(NodeId),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
