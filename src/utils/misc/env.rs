// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

/// Check if the given environment variable is set to truthy value.
/// Returns false if not set.
pub fn is_env_truthy(env: &str) -> bool {
    is_env_set_and_truthy(env).unwrap_or_default()
}

/// Check if the given environment variable is set to truthy value.
/// Returns None if not set.
pub fn is_env_set_and_truthy(env: &str) -> Option<bool> {
    std::env::var(env)
        .ok()
        .map(|var| matches!(var.to_lowercase().as_str(), "1" | "true" | "yes" | "_yes_"))
}
