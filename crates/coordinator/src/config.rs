// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordinator configuration

use dl_core::key::KEY_PREFIX;
use serde::Deserialize;

/// Settings shared by every lock a coordinator manages
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoordinatorConfig {
    /// Namespace prepended to every lock key
    pub key_prefix: String,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            key_prefix: KEY_PREFIX.to_string(),
        }
    }
}

impl CoordinatorConfig {
    /// Prefix `key` with the namespace; already-prefixed keys pass
    /// through unchanged, so namespacing is idempotent
    pub fn namespace(&self, key: &str) -> String {
        if key.starts_with(&self.key_prefix) {
            key.to_string()
        } else {
            format!("{}{}", self.key_prefix, key)
        }
    }
}
