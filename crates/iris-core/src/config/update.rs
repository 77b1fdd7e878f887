//! Partial configuration updates.
//!
//! Every field is optional, including the fields inside each provider
//! section, and the merge is field by field: a `ConfigUpdate` carrying only
//! `openai.api_key` leaves the configured OpenAI model and endpoint alone.

use serde::{Deserialize, Serialize};

use super::{Config, FallbackPolicy, Mode};

/// A partial update applied with [`Config::merged`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigUpdate {
    pub mode: Option<Mode>,
    pub fallback: Option<FallbackPolicy>,
    pub openai: Option<OpenAiUpdate>,
    pub google: Option<GoogleUpdate>,
    pub local: Option<LocalUpdate>,
    pub cache: Option<CacheUpdate>,
    pub limits: Option<LimitsUpdate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiUpdate {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleUpdate {
    pub api_key: Option<String>,
    pub project_id: Option<String>,
    pub endpoint: Option<String>,
    pub max_labels: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalUpdate {
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheUpdate {
    pub enabled: Option<bool>,
    pub ttl_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsUpdate {
    pub timeout_ms: Option<u64>,
    pub max_file_size_mb: Option<u64>,
}

impl ConfigUpdate {
    /// An update that only switches the active mode.
    pub fn mode(mode: Mode) -> Self {
        Self {
            mode: Some(mode),
            ..Self::default()
        }
    }

    /// Whether applying this update changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
    if let Some(v) = value {
        *slot = v.clone();
    }
}

impl Config {
    /// Return a copy of this config with `update` applied field by field.
    pub fn merged(&self, update: &ConfigUpdate) -> Config {
        let mut next = self.clone();
        set(&mut next.mode, &update.mode);
        set(&mut next.fallback, &update.fallback);

        if let Some(openai) = &update.openai {
            set(&mut next.openai.api_key, &openai.api_key);
            set(&mut next.openai.model, &openai.model);
            set(&mut next.openai.endpoint, &openai.endpoint);
        }
        if let Some(google) = &update.google {
            set(&mut next.google.api_key, &google.api_key);
            set(&mut next.google.project_id, &google.project_id);
            set(&mut next.google.endpoint, &google.endpoint);
            set(&mut next.google.max_labels, &google.max_labels);
        }
        if let Some(local) = &update.local {
            set(&mut next.local.model, &local.model);
        }
        if let Some(cache) = &update.cache {
            set(&mut next.cache.enabled, &cache.enabled);
            set(&mut next.cache.ttl_secs, &cache.ttl_secs);
        }
        if let Some(limits) = &update.limits {
            set(&mut next.limits.timeout_ms, &limits.timeout_ms);
            set(&mut next.limits.max_file_size_mb, &limits.max_file_size_mb);
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_update_is_identity() {
        let config = Config::default();
        let update = ConfigUpdate::default();
        assert!(update.is_empty());
        assert_eq!(config.merged(&update), config);
    }

    #[test]
    fn test_nested_fields_not_named_are_preserved() {
        let mut config = Config::default();
        config.openai.model = "gpt-4o".to_string();
        config.openai.endpoint = "https://gateway.internal/v1".to_string();

        let update = ConfigUpdate {
            openai: Some(OpenAiUpdate {
                api_key: Some("sk-new".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = config.merged(&update);

        assert_eq!(merged.openai.api_key, "sk-new");
        assert_eq!(merged.openai.model, "gpt-4o");
        assert_eq!(merged.openai.endpoint, "https://gateway.internal/v1");
        assert_eq!(merged.google, config.google);
    }

    #[test]
    fn test_mode_update() {
        let merged = Config::default().merged(&ConfigUpdate::mode(Mode::Google));
        assert_eq!(merged.mode, Mode::Google);
        assert!(merged.cache.enabled);
    }

    #[test]
    fn test_update_from_json() {
        let update: ConfigUpdate = serde_json::from_str(
            r#"{"mode":"openai","cache":{"enabled":false},"limits":{"timeout_ms":500}}"#,
        )
        .unwrap();
        let merged = Config::default().merged(&update);

        assert_eq!(merged.mode, Mode::OpenAi);
        assert!(!merged.cache.enabled);
        assert_eq!(merged.cache.ttl_secs, 3600);
        assert_eq!(merged.limits.timeout_ms, 500);
        assert_eq!(merged.limits.max_file_size_mb, 20);
    }
}
