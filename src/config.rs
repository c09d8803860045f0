use serde::Deserialize;

/// Credentials, read from the environment (and `.env`).
#[derive(Deserialize, Debug, Default)]
pub struct Environment {
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
}

impl Environment {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env::<Environment>()
    }
}

/// Request settings for one provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ProviderSettings {
    pub fn openai() -> Self {
        Self {
            model: "gpt-4".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            temperature: 0.1,
            max_tokens: 500,
        }
    }

    pub fn anthropic() -> Self {
        Self {
            model: "claude-sonnet-4-20250514".to_string(),
            base_url: "https://api.anthropic.com/v1".to_string(),
            temperature: 0.1,
            max_tokens: 4_096,
        }
    }
}

/// Provider settings, from the optional TOML settings file.
///
/// ```toml
/// [openai]
/// model = "gpt-4o"
/// max_tokens = 2000
///
/// [anthropic]
/// base_url = "http://localhost:8080/v1"
/// ```
///
/// Any field left out keeps its default.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub openai: ProviderSettings,
    pub anthropic: ProviderSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai: ProviderSettings::openai(),
            anthropic: ProviderSettings::anthropic(),
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        let file: ConfigFile = toml::from_str(text)?;
        Ok(Self {
            openai: file.openai.apply(ProviderSettings::openai()),
            anthropic: file.anthropic.apply(ProviderSettings::anthropic()),
        })
    }
}

#[derive(Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    openai: SettingsOverrides,
    anthropic: SettingsOverrides,
}

#[derive(Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct SettingsOverrides {
    model: Option<String>,
    base_url: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl SettingsOverrides {
    fn apply(self, defaults: ProviderSettings) -> ProviderSettings {
        ProviderSettings {
            model: self.model.unwrap_or(defaults.model),
            base_url: self
                .base_url
                .map(|url| url.trim_end_matches('/').to_owned())
                .unwrap_or(defaults.base_url),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
        }
    }
}
