//! Interface labels with per-language overrides

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::Result;

const PT_BR: &[(&str, &str)] = &[
    ("home", "Home"),
    ("load_more", "Carregar mais posts"),
    ("load_error", "Não foi possível carregar mais posts. Tente novamente."),
];

const EN: &[(&str, &str)] = &[
    ("home", "Home"),
    ("load_more", "Load more posts"),
    ("load_error", "Could not load more posts. Please try again."),
];

/// Label lookup for the listing page
#[derive(Debug, Clone)]
pub struct I18n {
    /// Current language, e.g. `pt-BR`
    language: String,
    /// lang -> key -> label
    translations: HashMap<String, HashMap<String, String>>,
}

impl I18n {
    /// Create a handler with the built-in labels
    pub fn new(language: &str) -> Self {
        let mut translations = HashMap::new();
        for (lang, table) in [("pt-BR", PT_BR), ("en", EN)] {
            let labels = table
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            translations.insert(lang.to_string(), labels);
        }
        Self {
            language: language.to_string(),
            translations,
        }
    }

    /// Load `{lang}.yml` files from a directory, overriding built-in labels
    pub fn load_languages<P: AsRef<Path>>(&mut self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Ok(());
        }

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let ext = path.extension().and_then(|e| e.to_str());
            if !path.is_file() || !matches!(ext, Some("yml") | Some("yaml")) {
                continue;
            }
            let Some(lang) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let content = fs::read_to_string(&path)?;
            match serde_yaml::from_str::<HashMap<String, serde_yaml::Value>>(&content) {
                Ok(data) => {
                    let mut flat = HashMap::new();
                    flatten_translations(&data, "", &mut flat);
                    self.translations
                        .entry(lang.to_string())
                        .or_default()
                        .extend(flat);
                    tracing::debug!("Loaded language file: {:?}", path);
                }
                Err(e) => {
                    tracing::warn!("Failed to parse language file {:?}: {}", path, e);
                }
            }
        }

        Ok(())
    }

    /// Get a label, falling back to English and then to the key itself
    pub fn get(&self, key: &str) -> String {
        [self.language.as_str(), "en"]
            .iter()
            .find_map(|lang| self.translations.get(*lang)?.get(key))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// All labels of the current language, English filling the gaps
    pub fn get_all_translations(&self) -> HashMap<String, String> {
        let mut result = self
            .translations
            .get(&self.language)
            .cloned()
            .unwrap_or_default();
        if let Some(en) = self.translations.get("en") {
            for (k, v) in en {
                result.entry(k.clone()).or_insert_with(|| v.clone());
            }
        }
        result
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::new("pt-BR")
    }
}

/// Flatten nested YAML maps into dot-notation keys
fn flatten_translations(
    data: &HashMap<String, serde_yaml::Value>,
    prefix: &str,
    result: &mut HashMap<String, String>,
) {
    for (key, value) in data {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            serde_yaml::Value::String(s) => {
                result.insert(full_key, s.clone());
            }
            serde_yaml::Value::Number(n) => {
                result.insert(full_key, n.to_string());
            }
            serde_yaml::Value::Mapping(map) => {
                let nested: HashMap<String, serde_yaml::Value> = map
                    .iter()
                    .filter_map(|(k, v)| k.as_str().map(|k| (k.to_string(), v.clone())))
                    .collect();
                flatten_translations(&nested, &full_key, result);
            }
            _ => {}
        }
    }
}
