//! Gemini API 客户端
//!
//! 封装所有与 Gemini REST API 的交互：
//! - generateContent（文本 / 图文生成）
//! - predictLongRunning + 操作轮询（视频生成）
//!
//! 请求/响应结构由提供方决定，本模块只做传输和错误归类，不做业务判断

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult, LlmError};

// ========== 请求结构 ==========

#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// 构造单条用户消息的请求
    pub fn from_user_parts(parts: Vec<Part>) -> Self {
        Self {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
            system_instruction: None,
            generation_config: None,
        }
    }

    /// 构造纯文本请求
    pub fn from_text(prompt: &str) -> Self {
        Self::from_user_parts(vec![Part::text(prompt)])
    }

    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = Some(config);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// 消息片段，文本或内联数据二选一
///
/// 响应里的片段同样用这个结构：图片生成模型会在 parts 里
/// 返回 inlineData 的 base64 图片
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(
        rename = "inlineData",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub inline_data: Option<InlineData>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    pub fn inline_data(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.into(),
                data: data.into(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    /// 图片生成模型需要同时声明 TEXT 和 IMAGE 两种模态
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<String>>,
}

// ========== 响应结构 ==========

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    /// 取第一个候选的全部片段
    pub fn first_parts(&self) -> &[Part] {
        self.candidates
            .as_deref()
            .and_then(|c| c.first())
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or(&[])
    }

    /// 取第一个候选中的文本
    pub fn first_text(&self) -> Option<String> {
        self.first_parts()
            .iter()
            .find_map(|p| p.text.as_ref())
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }

    /// 取第一个候选中的内联图片 (mime_type, base64 数据)
    pub fn first_inline_image(&self) -> Option<(String, String)> {
        self.first_parts()
            .iter()
            .find_map(|p| p.inline_data.as_ref())
            .map(|d| (d.mime_type.clone(), d.data.clone()))
    }
}

#[derive(Debug, Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[allow(dead_code)]
    code: Option<i32>,
    message: Option<String>,
    status: Option<String>,
}

// ========== 视频长操作结构 ==========

#[derive(Debug, Serialize)]
struct PredictLongRunningRequest {
    instances: Vec<VideoInstance>,
    parameters: VideoParameters,
}

#[derive(Debug, Serialize)]
struct VideoInstance {
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<VideoImage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoImage {
    bytes_base64_encoded: String,
    mime_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoParameters {
    duration_seconds: u32,
    aspect_ratio: String,
    person_generation: String,
}

/// 长操作状态
#[derive(Debug, Clone, Deserialize)]
pub struct VideoOperation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<OperationError>,
    #[serde(default)]
    pub response: Option<VideoOperationResponse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OperationError {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoOperationResponse {
    #[serde(default)]
    pub generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoResponse {
    #[serde(default)]
    pub generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedSample {
    #[serde(default)]
    pub video: Option<GeneratedVideo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedVideo {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub bytes_base64_encoded: Option<String>,
}

// ========== 客户端 ==========

/// Gemini 客户端
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// 创建新的 Gemini 客户端
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.gemini_api_key.clone(),
            base_url: config.gemini_api_base_url.clone(),
        }
    }

    /// 调用 generateContent
    ///
    /// # 参数
    /// - `model`: 模型名称
    /// - `request`: 请求体
    /// - `timeout`: 本次调用的硬超时
    ///
    /// # 返回
    /// 返回提供方的原始响应结构，内容判断交给上层
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
        timeout: Duration,
    ) -> AppResult<GenerateContentResponse> {
        let endpoint = format!("{}:generateContent", model);
        let url = format!(
            "{}/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        );

        debug!("调用 Gemini API: {}", endpoint);

        let response = self
            .client
            .post(&url)
            .timeout(timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(&endpoint, timeout, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.map_http_error(&endpoint, status, response).await);
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint.clone(), e))?;

        if parsed.candidates.as_deref().map_or(true, |c| c.is_empty()) {
            return Err(AppError::Llm(LlmError::EmptyResponse {
                model: model.to_string(),
            }));
        }

        debug!("Gemini API 调用成功: {}", endpoint);
        Ok(parsed)
    }

    /// 发起视频生成长操作
    ///
    /// 返回操作名，供 `get_operation` 轮询
    pub async fn start_video_generation(
        &self,
        model: &str,
        prompt: &str,
        image_base64: &str,
        image_mime_type: &str,
        duration_seconds: u32,
    ) -> AppResult<VideoOperation> {
        let endpoint = format!("{}:predictLongRunning", model);
        let url = format!(
            "{}/{}:predictLongRunning?key={}",
            self.base_url, model, self.api_key
        );

        let request = PredictLongRunningRequest {
            instances: vec![VideoInstance {
                prompt: prompt.to_string(),
                image: Some(VideoImage {
                    bytes_base64_encoded: image_base64.to_string(),
                    mime_type: image_mime_type.to_string(),
                }),
            }],
            parameters: VideoParameters {
                duration_seconds,
                aspect_ratio: "9:16".to_string(),
                person_generation: "allow_adult".to_string(),
            },
        };

        debug!("发起视频长操作: {}", endpoint);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(&endpoint, Duration::ZERO, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.map_http_error(&endpoint, status, response).await);
        }

        response
            .json()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint, e))
    }

    /// 查询长操作状态
    ///
    /// 操作名形如 `models/veo-…/operations/xyz`，挂在 v1beta 根路径下
    pub async fn get_operation(&self, operation_name: &str) -> AppResult<VideoOperation> {
        let api_root = self
            .base_url
            .trim_end_matches('/')
            .trim_end_matches("/models");
        let url = format!("{}/{}?key={}", api_root, operation_name, self.api_key);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(operation_name, Duration::ZERO, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.map_http_error(operation_name, status, response).await);
        }

        response
            .json()
            .await
            .map_err(|e| AppError::api_request_failed(operation_name.to_string(), e))
    }

    // ========== 错误归类 ==========

    fn map_reqwest_error(&self, endpoint: &str, timeout: Duration, err: reqwest::Error) -> AppError {
        if err.is_timeout() {
            warn!("Gemini API 调用超时: {}", endpoint);
            AppError::api_timeout(endpoint.to_string(), timeout.as_secs())
        } else {
            warn!("Gemini API 请求失败: {}: {}", endpoint, err);
            AppError::api_request_failed(endpoint.to_string(), err)
        }
    }

    async fn map_http_error(
        &self,
        endpoint: &str,
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> AppError {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "读取错误响应体失败".to_string());

        let message = serde_json::from_str::<ErrorWrapper>(&body)
            .map(|wrapper| {
                let status_text = wrapper.error.status.unwrap_or_default();
                let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
                if status_text.is_empty() {
                    msg
                } else {
                    format!("{}: {}", status_text, msg)
                }
            })
            .unwrap_or(body);

        warn!(
            "Gemini API 返回错误 ({}): status={}, message={}",
            endpoint,
            status.as_u16(),
            crate::utils::text::truncate_text(&message, 200)
        );

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            AppError::Api(ApiError::RateLimited {
                endpoint: endpoint.to_string(),
                retry_after,
            })
        } else {
            AppError::api_bad_response(endpoint.to_string(), status.as_u16(), message)
        }
    }
}

/// 拆解 data URI，返回 (mime_type, base64 数据)
///
/// 格式: `data:<mimetype>;base64,<数据>`
pub fn parse_data_uri(uri: &str) -> Option<(String, String)> {
    let rest = uri.strip_prefix("data:")?;
    let (mime_type, data) = rest.split_once(";base64,")?;
    if mime_type.is_empty() || data.is_empty() {
        return None;
    }
    Some((mime_type.to_string(), data.to_string()))
}
