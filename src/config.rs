use std::env;
use std::path::PathBuf;

/// Settings read from the environment (and from `.env`, once `dotenv` has run).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory holding `<id>.problem` files. `PROBLEMS_DIR`, default `problems`.
    pub problems_dir: PathBuf,
    /// Problem opened at startup. `PROBLEM_ID`, default `1`.
    pub problem_id: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            problems_dir: PathBuf::from("problems"),
            problem_id: 1,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let mut config = Config::default();
        if let Some(dir) = lookup("PROBLEMS_DIR") {
            config.problems_dir = PathBuf::from(dir);
        }
        if let Some(id) = lookup("PROBLEM_ID") {
            match id.trim().parse() {
                Ok(id) => config.problem_id = id,
                Err(_) => log::warn!("ignoring PROBLEM_ID={:?}", id),
            }
        }
        config
    }

    pub fn problem_path(&self, id: u32) -> PathBuf {
        self.problems_dir.join(format!("{}.problem", id))
    }

    pub fn solution_path(&self, id: u32) -> PathBuf {
        self.problems_dir.join(format!("{}.solution.json", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config, Config::default());
        assert_eq!(config.problem_path(3), PathBuf::from("problems").join("3.problem"));
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[("PROBLEMS_DIR", "/tmp/p"), ("PROBLEM_ID", " 42 ")]));
        assert_eq!(config.problems_dir, PathBuf::from("/tmp/p"));
        assert_eq!(config.problem_id, 42);
        assert_eq!(config.solution_path(42), PathBuf::from("/tmp/p").join("42.solution.json"));
    }

    #[test]
    fn bad_problem_id_keeps_default() {
        let config = Config::from_lookup(lookup(&[("PROBLEM_ID", "abc")]));
        assert_eq!(config.problem_id, 1);
    }
}
