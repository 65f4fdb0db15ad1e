use crate::error::{BoardError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// Gesture thresholds deciding when a press becomes a drag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivationConfig {
    /// Pointer travel (px) before a mouse press turns into a drag
    pub mouse_distance: f64,
    /// Hold duration before a touch turns into a drag
    pub touch_delay_ms: u64,
    /// Travel (px) allowed during the touch hold before it is abandoned
    pub touch_tolerance: f64,
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            mouse_distance: 8.0,
            touch_delay_ms: 200,
            touch_tolerance: 8.0,
        }
    }
}

/// Drag engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub activation: ActivationConfig,
    /// Id prefix of placeholders created for externally sourced drags
    pub placeholder_prefix: String,
    /// Auto-hide duration attached to notifications
    pub notification_ttl_ms: u64,
    /// Restore the drag-start snapshot when a cross-list move is rejected
    pub rollback_cross_list_on_failure: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            activation: ActivationConfig::default(),
            placeholder_prefix: "chat-card-".to_string(),
            notification_ttl_ms: 3000,
            rollback_cross_list_on_failure: true,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a JSON configuration; missing keys take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a JSON configuration file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).await?;
        Self::from_json(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        let activation = &self.activation;
        if !activation.mouse_distance.is_finite() || activation.mouse_distance < 0.0 {
            return Err(BoardError::ConfigError(format!(
                "activation.mouse_distance must be a non-negative number, got {}",
                activation.mouse_distance
            )));
        }
        if !activation.touch_tolerance.is_finite() || activation.touch_tolerance < 0.0 {
            return Err(BoardError::ConfigError(format!(
                "activation.touch_tolerance must be a non-negative number, got {}",
                activation.touch_tolerance
            )));
        }
        if self.placeholder_prefix.is_empty() {
            return Err(BoardError::ConfigError(
                "placeholder_prefix must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.activation.mouse_distance, 8.0);
        assert_eq!(config.activation.touch_delay_ms, 200);
        assert_eq!(config.placeholder_prefix, "chat-card-");
        assert!(config.rollback_cross_list_on_failure);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EngineConfig::from_json(r#"{"notification_ttl_ms": 5000}"#).unwrap();
        assert_eq!(config.notification_ttl_ms, 5000);
        assert_eq!(config.activation, ActivationConfig::default());
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(matches!(
            EngineConfig::from_json(r#"{"placeholder_prefix": ""}"#),
            Err(BoardError::ConfigError(_))
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{"activation": {"mouse_distance": -1.0}}"#),
            Err(BoardError::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("engine.json");
        tokio::fs::write(&path, r#"{"rollback_cross_list_on_failure": false}"#)
            .await
            .unwrap();

        let config = EngineConfig::load(&path).await.unwrap();
        assert!(!config.rollback_cross_list_on_failure);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = EngineConfig::load(temp_dir.path().join("absent.json")).await;
        assert!(matches!(result, Err(BoardError::IoError(_))));
    }
}
