//! Environment helpers used by the `from_env()` constructors.
//!
//! A variable that is set but empty is treated exactly like an unset one.

use std::str::FromStr;

/// Read a non-empty environment variable.
pub fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Read and parse an environment variable, ignoring unparseable values.
pub fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env_var(key).and_then(|value| value.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    struct EnvVarGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl EnvVarGuard {
        fn set(key: &'static str, value: Option<&str>) -> Self {
            let previous = std::env::var(key).ok();
            match value {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
            Self { key, previous }
        }
    }

    impl Drop for EnvVarGuard {
        fn drop(&mut self) {
            match self.previous.as_deref() {
                Some(value) => std::env::set_var(self.key, value),
                None => std::env::remove_var(self.key),
            }
        }
    }

    #[test]
    fn test_empty_value_is_absent() {
        let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let _guard = EnvVarGuard::set("LOCUS_TEST_EMPTY", Some("  "));
        assert_eq!(env_var("LOCUS_TEST_EMPTY"), None);
    }

    #[test]
    fn test_parse_ignores_garbage() {
        let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let _num = EnvVarGuard::set("LOCUS_TEST_NUM", Some(" 42 "));
        let _bad = EnvVarGuard::set("LOCUS_TEST_BAD", Some("forty-two"));
        assert_eq!(env_parse::<u16>("LOCUS_TEST_NUM"), Some(42));
        assert_eq!(env_parse::<u16>("LOCUS_TEST_BAD"), None);
        assert_eq!(env_parse::<u16>("LOCUS_TEST_MISSING_NUM"), None);
    }
}
