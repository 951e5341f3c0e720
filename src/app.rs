use anyhow::Result;

use crate::api::{self, AppState};
use crate::config::Config;
use crate::error::{AppError, ConfigError};
use crate::utils::logging::log_startup;

/// 应用主结构
pub struct App {
    config: Config,
}

impl App {
    /// 初始化应用
    ///
    /// API 密钥缺失是冷启动阶段的致命配置错误，直接失败而不是
    /// 等到第一次调用才暴露
    pub async fn initialize(config: Config) -> Result<Self> {
        if config.gemini_api_key.trim().is_empty() {
            return Err(AppError::Config(ConfigError::EnvVarNotFound {
                var_name: "GOOGLE_GENAI_API_KEY".to_string(),
            })
            .into());
        }

        log_startup(
            &config.bind_addr,
            &config.text_model_name,
            &config.image_model_name,
        );

        Ok(Self { config })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        let state = AppState::new(&self.config);
        api::run(state, &self.config.bind_addr).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_initialize_requires_api_key() {
        // 密钥为空必须在冷启动阶段失败
        let config = Config::default();
        assert!(config.gemini_api_key.is_empty());
        assert!(App::initialize(config).await.is_err());
    }

    #[tokio::test]
    async fn test_initialize_with_api_key() {
        let config = Config {
            gemini_api_key: "test-key".to_string(),
            ..Config::default()
        };
        assert!(App::initialize(config).await.is_ok());
    }
}
