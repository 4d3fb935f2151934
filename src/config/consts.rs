// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Registry entry a session boots on when none is configured.
pub const DEFAULT_PIPELINE: &str = "__default__";
/// Separator between a namespace and the name it qualifies.
pub const NAMESPACE_SEPARATOR: char = '.';
