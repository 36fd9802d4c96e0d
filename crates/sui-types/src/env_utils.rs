//! Environment variable parsing utilities.
//!
//! Options structs in the executor layer read their overrides through these
//! helpers instead of repeating the `std::env::var(..).ok().and_then(..)` dance.
//!
//! # Example
//!
//! ```
//! use sui_types::env_utils::{env_var, env_var_or};
//!
//! let pool: usize = env_var_or("SUI_EXECUTOR_MAX_POOL_SIZE", 50);
//! let custom: Option<u64> = env_var("SUI_EXECUTOR_DEFAULT_GAS_BUDGET");
//! # let _ = (pool, custom);
//! ```

use std::str::FromStr;
use std::time::Duration;

/// Parse an environment variable into a type that implements `FromStr`.
///
/// Returns `None` if the variable is not set or cannot be parsed.
pub fn env_var<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Parse an environment variable with a default value.
pub fn env_var_or<T: FromStr>(key: &str, default: T) -> T {
    env_var(key).unwrap_or(default)
}

/// Milliseconds from the environment as a `Duration`, or `default`.
pub fn env_duration_ms(key: &str, default: Duration) -> Duration {
    env_var::<u64>(key)
        .map(Duration::from_millis)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_parsing() {
        std::env::set_var("SUI_TYPES_TEST_U64", " 42 ");
        let val: Option<u64> = env_var("SUI_TYPES_TEST_U64");
        assert_eq!(val, Some(42));

        let missing: Option<u64> = env_var("SUI_TYPES_NONEXISTENT_1");
        assert_eq!(missing, None);

        std::env::remove_var("SUI_TYPES_TEST_U64");
    }

    #[test]
    fn test_env_var_or() {
        std::env::set_var("SUI_TYPES_TEST_DEFAULT", "not-a-number");
        let val: u64 = env_var_or("SUI_TYPES_TEST_DEFAULT", 50);
        assert_eq!(val, 50);
        std::env::remove_var("SUI_TYPES_TEST_DEFAULT");
    }

    #[test]
    fn test_env_duration_ms() {
        std::env::set_var("SUI_TYPES_TEST_MS", "1500");
        assert_eq!(
            env_duration_ms("SUI_TYPES_TEST_MS", Duration::from_secs(1)),
            Duration::from_millis(1500)
        );
        assert_eq!(
            env_duration_ms("SUI_TYPES_NONEXISTENT_3", Duration::from_secs(1)),
            Duration::from_secs(1)
        );
        std::env::remove_var("SUI_TYPES_TEST_MS");
    }
}
