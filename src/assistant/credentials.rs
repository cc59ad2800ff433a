use std::sync::RwLock;

/// Where the assistant looks up the generation-service key. Consulted on
/// every call; implementations must not cache.
pub trait CredentialSource: Send + Sync {
    fn api_key(&self) -> Option<String>;
}

/// Reads the first non-empty variable from the process environment.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    vars: Vec<String>,
}

impl EnvCredentials {
    pub fn new(vars: &[&str]) -> Self {
        Self {
            vars: vars.iter().map(|v| v.to_string()).collect(),
        }
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new(&["GEMINI_API_KEY", "API_KEY"])
    }
}

impl CredentialSource for EnvCredentials {
    fn api_key(&self) -> Option<String> {
        self.vars
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
    }
}

/// In-process key that can be swapped at runtime.
#[derive(Debug, Default)]
pub struct StaticCredentials {
    key: RwLock<Option<String>>,
}

impl StaticCredentials {
    pub fn new(key: Option<&str>) -> Self {
        Self {
            key: RwLock::new(key.map(str::to_string)),
        }
    }

    pub fn set(&self, key: Option<&str>) {
        if let Ok(mut guard) = self.key.write() {
            *guard = key.map(str::to_string);
        }
    }
}

impl CredentialSource for StaticCredentials {
    fn api_key(&self) -> Option<String> {
        self.key
            .read()
            .ok()
            .and_then(|guard| guard.clone())
            .filter(|key| !key.trim().is_empty())
    }
}
