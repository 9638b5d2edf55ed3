//! Pagination limits

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

/// Row limits applied when a pagination request is validated.
///
/// A request with no limit (or a limit of zero) gets `default_limit` rows;
/// a request above `max_limit` is silently capped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Page size used when the request leaves the limit unset
    #[serde(default = "default_limit")]
    pub default_limit: u32,
    /// Upper bound for any requested page size
    #[serde(default = "default_max_limit")]
    pub max_limit: u32,
}

fn default_limit() -> u32 {
    100
}

fn default_max_limit() -> u32 {
    20_000
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

impl PaginationConfig {
    /// Check the limits are usable
    pub fn validate(&self) -> ConfigResult<()> {
        if self.default_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pagination.default_limit".to_string(),
                value: "must be at least 1".to_string(),
            });
        }
        if self.max_limit < self.default_limit {
            return Err(ConfigError::InvalidValue {
                field: "pagination.max_limit".to_string(),
                value: format!(
                    "{} is below default_limit {}",
                    self.max_limit, self.default_limit
                ),
            });
        }
        Ok(())
    }
}
