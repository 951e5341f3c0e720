use std::fmt;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// AI 提供方 HTTP 调用错误
    Api(ApiError),
    /// LLM 响应内容错误
    Llm(LlmError),
    /// 业务逻辑错误
    Business(BusinessError),
    /// 配置错误
    Config(ConfigError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Api(e) => write!(f, "API错误: {}", e),
            AppError::Llm(e) => write!(f, "LLM错误: {}", e),
            AppError::Business(e) => write!(f, "业务错误: {}", e),
            AppError::Config(e) => write!(f, "配置错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Api(e) => Some(e),
            AppError::Llm(e) => Some(e),
            AppError::Business(e) => Some(e),
            AppError::Config(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// AI 提供方调用错误
#[derive(Debug)]
pub enum ApiError {
    /// 网络请求失败
    RequestFailed {
        endpoint: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// API 返回错误响应
    BadResponse {
        endpoint: String,
        status: u16,
        message: String,
    },
    /// 请求频率限制
    RateLimited {
        endpoint: String,
        retry_after: Option<u64>,
    },
    /// 请求超时
    Timeout {
        endpoint: String,
        timeout_secs: u64,
    },
    /// JSON 解析失败
    JsonParseFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::RequestFailed { endpoint, source } => {
                write!(f, "API请求失败 ({}): {}", endpoint, source)
            }
            ApiError::BadResponse {
                endpoint,
                status,
                message,
            } => {
                write!(
                    f,
                    "API返回错误响应 ({}): status={}, message={}",
                    endpoint, status, message
                )
            }
            ApiError::RateLimited {
                endpoint,
                retry_after,
            } => {
                write!(
                    f,
                    "API请求频率限制 ({}), 建议等待: {:?}秒",
                    endpoint, retry_after
                )
            }
            ApiError::Timeout {
                endpoint,
                timeout_secs,
            } => {
                write!(f, "API请求超时 ({}): {}秒", endpoint, timeout_secs)
            }
            ApiError::JsonParseFailed { source } => {
                write!(f, "JSON解析失败: {}", source)
            }
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::RequestFailed { source, .. } | ApiError::JsonParseFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// LLM 响应内容错误
#[derive(Debug)]
pub enum LlmError {
    /// 返回结果为空（没有候选）
    EmptyResponse {
        model: String,
    },
    /// 返回内容为空（候选中没有文本）
    EmptyContent {
        model: String,
    },
    /// 响应中没有图片数据
    MissingImageData {
        model: String,
    },
    /// 长操作失败
    OperationFailed {
        operation: String,
        message: String,
    },
    /// 长操作轮询超出次数上限
    OperationTimedOut {
        operation: String,
        attempts: u32,
    },
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::EmptyResponse { model } => {
                write!(f, "LLM返回结果为空 (模型: {})", model)
            }
            LlmError::EmptyContent { model } => {
                write!(f, "LLM返回内容为空 (模型: {})", model)
            }
            LlmError::MissingImageData { model } => {
                write!(f, "LLM响应中没有图片数据 (模型: {})", model)
            }
            LlmError::OperationFailed { operation, message } => {
                write!(f, "长操作失败 ({}): {}", operation, message)
            }
            LlmError::OperationTimedOut {
                operation,
                attempts,
            } => {
                write!(f, "长操作轮询超时 ({}): 已尝试 {} 次", operation, attempts)
            }
        }
    }
}

impl std::error::Error for LlmError {}

/// 业务逻辑错误
#[derive(Debug)]
pub enum BusinessError {
    /// 答案列表为空
    EmptyAnswers,
    /// 缺少职业字段
    MissingProfession,
    /// 向导状态机非法跳转
    InvalidTransition {
        from: &'static str,
        action: &'static str,
    },
    /// 必填字段为空
    MissingField {
        field: &'static str,
    },
    /// 未知题目ID
    UnknownQuestion {
        question_id: String,
    },
}

impl fmt::Display for BusinessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusinessError::EmptyAnswers => write!(f, "答案列表不能为空"),
            BusinessError::MissingProfession => write!(f, "缺少职业字段"),
            BusinessError::InvalidTransition { from, action } => {
                write!(f, "向导状态 {} 不允许执行 {}", from, action)
            }
            BusinessError::MissingField { field } => {
                write!(f, "必填字段 {} 为空", field)
            }
            BusinessError::UnknownQuestion { question_id } => {
                write!(f, "未知题目ID: {}", question_id)
            }
        }
    }
}

impl std::error::Error for BusinessError {}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 环境变量解析失败
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 必填环境变量不存在
    EnvVarNotFound {
        var_name: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EnvVarParseFailed {
                var_name,
                value,
                expected_type,
            } => {
                write!(
                    f,
                    "环境变量 {} 解析失败: 值 '{}' 无法转换为 {}",
                    var_name, value, expected_type
                )
            }
            ConfigError::EnvVarNotFound { var_name } => {
                write!(f, "环境变量 {} 不存在", var_name)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ========== 从常见错误类型转换 ==========
// 注意：不需要手动实现 From<AppError> for anyhow::Error，
// 因为 anyhow 已经为所有实现了 std::error::Error 的类型提供了自动实现

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Api(ApiError::JsonParseFailed {
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建API请求失败错误
    pub fn api_request_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        })
    }

    /// 创建API错误响应错误
    pub fn api_bad_response(
        endpoint: impl Into<String>,
        status: u16,
        message: impl Into<String>,
    ) -> Self {
        AppError::Api(ApiError::BadResponse {
            endpoint: endpoint.into(),
            status,
            message: message.into(),
        })
    }

    /// 创建API超时错误
    pub fn api_timeout(endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        AppError::Api(ApiError::Timeout {
            endpoint: endpoint.into(),
            timeout_secs,
        })
    }

    /// 是否为瞬时错误（值得重试）
    ///
    /// 429/5xx、限流、超时和网络层失败都视为瞬时错误
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::Api(ApiError::BadResponse { status, .. }) => {
                matches!(status, 429 | 500 | 502 | 503 | 504)
            }
            AppError::Api(ApiError::RateLimited { .. }) => true,
            AppError::Api(ApiError::Timeout { .. }) => true,
            AppError::Api(ApiError::RequestFailed { .. }) => true,
            _ => false,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        // 503 属于瞬时错误
        let err = AppError::api_bad_response("generateContent", 503, "overloaded");
        assert!(err.is_transient());

        // 400 不属于瞬时错误
        let err = AppError::api_bad_response("generateContent", 400, "bad request");
        assert!(!err.is_transient());

        // 超时属于瞬时错误
        assert!(AppError::api_timeout("generateContent", 15).is_transient());

        // 业务错误不重试
        assert!(!AppError::Business(BusinessError::EmptyAnswers).is_transient());
    }
}
