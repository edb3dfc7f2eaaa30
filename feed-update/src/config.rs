use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const DEFAULT_ENDPOINT: &str = "https://router.huggingface.co/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "meta-llama/Llama-3.1-8B-Instruct";

/// Where one run reads and writes its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub site: PathBuf,
    pub entries: PathBuf,
    pub articles: PathBuf,
    pub feed: PathBuf,
}

impl Paths {
    /// `site.json`, `entries.json` and `articles/` under `data_dir`.
    pub fn new(data_dir: &Path, feed: &Path) -> Self {
        Self {
            site: data_dir.join("site.json"),
            entries: data_dir.join("entries.json"),
            articles: data_dir.join("articles"),
            feed: feed.to_path_buf(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummarizerConfig {
    /// Lowercased `AI_PROVIDER`; empty selects the default.
    pub provider: String,
    pub token: Option<String>,
    pub endpoint: String,
    pub model: String,
    pub temperature: f64,
    pub timeout_seconds: u64,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            provider: String::new(),
            token: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.2,
            timeout_seconds: 30,
        }
    }
}

impl SummarizerConfig {
    /// Process environment first, then the nearest `.env` in the working
    /// directory or one of its parents.
    pub fn from_env() -> Self {
        let dotenv = match dotenvy::from_filename_iter(".env") {
            Ok(iter) => collect_dotenv(iter),
            Err(e) => {
                debug!("No .env loaded: {}", e);
                HashMap::new()
            }
        };
        Self::from_sources(|key| env::var(key).ok(), &dotenv)
    }

    /// A key set in `lookup` wins over the same key in `dotenv`.
    pub fn from_sources(lookup: impl Fn(&str) -> Option<String>, dotenv: &HashMap<String, String>) -> Self {
        Self {
            provider: read_either(&["AI_PROVIDER"], &lookup, dotenv)
                .unwrap_or_default()
                .to_lowercase(),
            token: read_either(&["HUGGINGFACE_TOKEN", "HF_TOKEN"], &lookup, dotenv),
            ..Self::default()
        }
    }
}

/// Key/value pairs of a `.env` file. Comments and quotes are handled by
/// dotenvy; a missing file yields nothing.
pub fn read_dotenv(path: &Path) -> HashMap<String, String> {
    match dotenvy::from_path_iter(path) {
        Ok(iter) => collect_dotenv(iter),
        Err(e) => {
            debug!("No .env at {}: {}", path.display(), e);
            HashMap::new()
        }
    }
}

fn collect_dotenv<R: std::io::Read>(iter: dotenvy::Iter<R>) -> HashMap<String, String> {
    let mut values = HashMap::new();
    for item in iter {
        match item {
            Ok((key, value)) => {
                values.insert(key, value);
            }
            Err(e) => warn!("Skipping .env line: {}", e),
        }
    }
    values
}

/// First of `keys` that is set to something other than whitespace, trimmed.
pub fn read_env(keys: &[&str]) -> Option<String> {
    first_non_blank(keys, |key| env::var(key).ok())
}

fn read_either(
    keys: &[&str],
    lookup: &dyn Fn(&str) -> Option<String>,
    dotenv: &HashMap<String, String>,
) -> Option<String> {
    first_non_blank(keys, lookup).or_else(|| first_non_blank(keys, |key| dotenv.get(key).cloned()))
}

fn first_non_blank(keys: &[&str], lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    keys.iter()
        .filter_map(|key| lookup(key))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_live_under_data_dir() {
        let paths = Paths::new(Path::new("data"), Path::new("feed.xml"));
        assert_eq!(paths.site, PathBuf::from("data/site.json"));
        assert_eq!(paths.entries, PathBuf::from("data/entries.json"));
        assert_eq!(paths.articles, PathBuf::from("data/articles"));
        assert_eq!(paths.feed, PathBuf::from("feed.xml"));
    }

    #[test]
    fn read_env_skips_blank_values() {
        env::set_var("FEED_UPDATE_TEST_BLANK", "   ");
        env::set_var("FEED_UPDATE_TEST_SET", " value ");
        assert_eq!(
            read_env(&["FEED_UPDATE_TEST_MISSING", "FEED_UPDATE_TEST_BLANK", "FEED_UPDATE_TEST_SET"]),
            Some("value".to_string())
        );
        assert_eq!(read_env(&["FEED_UPDATE_TEST_MISSING"]), None);
    }

    #[test]
    fn token_only_in_dotenv_is_used() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join(".env");
        std::fs::write(&path, "# local settings\nAI_PROVIDER=HuggingFace\nHF_TOKEN=\"hf_from_file\"\n").unwrap();

        let config = SummarizerConfig::from_sources(|_| None, &read_dotenv(&path));
        assert_eq!(config.provider, "huggingface");
        assert_eq!(config.token.as_deref(), Some("hf_from_file"));
    }

    #[test]
    fn process_env_wins_over_dotenv() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join(".env");
        std::fs::write(&path, "HUGGINGFACE_TOKEN=from_file\n").unwrap();

        let lookup = |key: &str| (key == "HUGGINGFACE_TOKEN").then(|| "from_process".to_string());
        let config = SummarizerConfig::from_sources(lookup, &read_dotenv(&path));
        assert_eq!(config.token.as_deref(), Some("from_process"));
    }

    #[test]
    fn blank_process_value_falls_back_to_dotenv() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join(".env");
        std::fs::write(&path, "HF_TOKEN='quoted'\n").unwrap();

        let config = SummarizerConfig::from_sources(|_| Some("  ".to_string()), &read_dotenv(&path));
        assert_eq!(config.token.as_deref(), Some("quoted"));
    }

    #[test]
    fn missing_dotenv_is_empty() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(read_dotenv(&tmp.path().join(".env")).is_empty());
    }
}
