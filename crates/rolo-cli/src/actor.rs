//! Acting-user resolution for CLI commands.
//!
//! The resolution chain: `--as` flag > `ROLO_USER` env > `user` in the user
//! config file. Every engine call runs on behalf of a user; only `init` and
//! `user` provisioning work without one.

use std::env;

/// Errors from actor resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorResolutionError {
    pub message: String,
    /// Machine error code.
    pub code: &'static str,
}

impl std::fmt::Display for ActorResolutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ActorResolutionError {}

/// Environment reader trait for dependency injection in tests.
trait EnvReader {
    fn get(&self, key: &str) -> Option<String>;
}

struct RealEnv;

impl EnvReader for RealEnv {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok().filter(|v| !v.trim().is_empty())
    }
}

fn resolve_actor_with(
    cli_flag: Option<&str>,
    config_user: Option<&str>,
    env: &dyn EnvReader,
) -> Option<String> {
    if let Some(user) = cli_flag.map(str::trim).filter(|u| !u.is_empty()) {
        return Some(user.to_string());
    }

    if let Some(val) = env.get("ROLO_USER") {
        return Some(val.trim().to_string());
    }

    config_user
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string)
}

/// Resolve the acting user, or `None` when no source names one.
pub fn resolve_actor(cli_flag: Option<&str>, config_user: Option<&str>) -> Option<String> {
    resolve_actor_with(cli_flag, config_user, &RealEnv)
}

/// Resolve the acting user, failing when none is configured.
pub fn require_actor(
    cli_flag: Option<&str>,
    config_user: Option<&str>,
) -> Result<String, ActorResolutionError> {
    resolve_actor(cli_flag, config_user).ok_or_else(|| ActorResolutionError {
        message: "An acting user is required for this command.".to_string(),
        code: "missing_actor",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MockEnv {
        vars: HashMap<String, String>,
    }

    impl MockEnv {
        fn new() -> Self {
            Self {
                vars: HashMap::new(),
            }
        }

        fn var(mut self, key: &str, val: &str) -> Self {
            self.vars.insert(key.to_string(), val.to_string());
            self
        }
    }

    impl EnvReader for MockEnv {
        fn get(&self, key: &str) -> Option<String> {
            self.vars.get(key).filter(|v| !v.trim().is_empty()).cloned()
        }
    }

    #[test]
    fn flag_takes_priority() {
        let env = MockEnv::new().var("ROLO_USER", "env-user");
        assert_eq!(
            resolve_actor_with(Some("flag-user"), Some("cfg-user"), &env).as_deref(),
            Some("flag-user")
        );
    }

    #[test]
    fn env_beats_config() {
        let env = MockEnv::new().var("ROLO_USER", "env-user");
        assert_eq!(
            resolve_actor_with(None, Some("cfg-user"), &env).as_deref(),
            Some("env-user")
        );
    }

    #[test]
    fn config_is_the_last_resort() {
        let env = MockEnv::new();
        assert_eq!(
            resolve_actor_with(None, Some("cfg-user"), &env).as_deref(),
            Some("cfg-user")
        );
        assert_eq!(resolve_actor_with(None, None, &env), None);
    }

    #[test]
    fn blank_values_are_ignored() {
        let env = MockEnv::new().var("ROLO_USER", "  ");
        assert_eq!(
            resolve_actor_with(Some(""), Some(" cfg "), &env).as_deref(),
            Some("cfg")
        );
    }

    #[test]
    fn require_actor_succeeds_with_flag() {
        let result = require_actor(Some("u1"), None);
        assert_eq!(result.expect("flag resolves"), "u1");
    }
}
