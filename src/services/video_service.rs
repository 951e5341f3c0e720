//! 视频生成服务 - 业务能力层
//!
//! 从生成的未来形象图片出发，发起长操作让人物产生轻微动态，
//! 按固定间隔轮询直到完成或达到次数上限。
//! 视频没有占位兜底：失败会原样返回错误，由 HTTP 层转成 500

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::clients::gemini_client::VideoOperation;
use crate::clients::GeminiClient;
use crate::config::Config;
use crate::error::{AppError, AppResult, LlmError};

/// 生成视频的固定提示词
const VIDEO_PROMPT: &str = "make the subject in the photo have a subtle motion, like they are \
                            breathing or gently smiling. The background should have very subtle \
                            movement too.";

/// 视频时长（秒）
const VIDEO_DURATION_SECS: u32 = 5;

/// 视频生成服务
pub struct VideoService {
    client: Arc<GeminiClient>,
    model_name: String,
    poll_interval: Duration,
    max_poll_attempts: u32,
}

impl VideoService {
    /// 创建新的视频生成服务
    pub fn new(client: Arc<GeminiClient>, config: &Config) -> Self {
        Self {
            client,
            model_name: config.video_model_name.clone(),
            poll_interval: Duration::from_secs(config.video_poll_interval_secs),
            max_poll_attempts: config.video_poll_max_attempts,
        }
    }

    /// 从图片生成视频
    ///
    /// # 参数
    /// - `image_base64`: 图片的 base64 数据
    /// - `image_mime_type`: 图片 MIME 类型
    ///
    /// # 返回
    /// 视频 data URI（或提供方托管地址）
    pub async fn generate_from_image(
        &self,
        image_base64: &str,
        image_mime_type: &str,
    ) -> AppResult<String> {
        info!("🎬 发起视频生成长操作，模型: {}", self.model_name);

        let mut operation = self
            .client
            .start_video_generation(
                &self.model_name,
                VIDEO_PROMPT,
                image_base64,
                image_mime_type,
                VIDEO_DURATION_SECS,
            )
            .await?;

        // 按固定间隔轮询直到完成
        let mut attempts = 0;
        while !operation.done {
            attempts += 1;
            if attempts > self.max_poll_attempts {
                warn!("⏰ 视频操作轮询达到上限: {}", operation.name);
                return Err(AppError::Llm(LlmError::OperationTimedOut {
                    operation: operation.name,
                    attempts: self.max_poll_attempts,
                }));
            }

            tokio::time::sleep(self.poll_interval).await;
            debug!("🔍 轮询视频操作 ({}/{})", attempts, self.max_poll_attempts);
            operation = self.client.get_operation(&operation.name).await?;
        }

        let uri = extract_video_uri(&operation)?;
        info!("✅ 视频生成完成");
        Ok(uri)
    }
}

/// 从完成的长操作中取出视频
///
/// 优先取内联 base64 数据，其次取提供方托管地址
fn extract_video_uri(operation: &VideoOperation) -> AppResult<String> {
    if let Some(error) = &operation.error {
        return Err(AppError::Llm(LlmError::OperationFailed {
            operation: operation.name.clone(),
            message: error
                .message
                .clone()
                .unwrap_or_else(|| "未知错误".to_string()),
        }));
    }

    let video = operation
        .response
        .as_ref()
        .and_then(|r| r.generate_video_response.as_ref())
        .and_then(|r| r.generated_samples.first())
        .and_then(|s| s.video.as_ref());

    match video {
        Some(v) => {
            if let Some(bytes) = &v.bytes_base64_encoded {
                Ok(format!("data:video/mp4;base64,{}", bytes))
            } else if let Some(uri) = &v.uri {
                Ok(uri.clone())
            } else {
                Err(AppError::Llm(LlmError::OperationFailed {
                    operation: operation.name.clone(),
                    message: "响应中没有视频数据".to_string(),
                }))
            }
        }
        None => Err(AppError::Llm(LlmError::OperationFailed {
            operation: operation.name.clone(),
            message: "响应中没有视频数据".to_string(),
        })),
    }
}
