/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// HTTP 服务监听地址
    pub bind_addr: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- Gemini API 配置 ---
    pub gemini_api_key: String,
    pub gemini_api_base_url: String,
    /// 文本分析/描述模型
    pub text_model_name: String,
    /// 图片生成模型
    pub image_model_name: String,
    /// 图片生成失败后的备用模型
    pub fallback_model_name: String,
    /// 视频生成模型
    pub video_model_name: String,
    // --- 超时与重试 ---
    /// 问卷分析调用超时（秒）
    pub analysis_timeout_secs: u64,
    /// 描述文本调用超时（秒）
    pub text_timeout_secs: u64,
    /// 图片生成调用超时（秒）
    pub image_timeout_secs: u64,
    /// 瞬时错误最大重试次数
    pub max_retries: u32,
    /// 重试基础退避时间（毫秒），按次数线性递增
    pub retry_base_delay_ms: u64,
    /// 视频操作轮询间隔（秒）
    pub video_poll_interval_secs: u64,
    /// 视频操作轮询次数上限
    pub video_poll_max_attempts: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8787".to_string(),
            verbose_logging: false,
            gemini_api_key: String::new(),
            gemini_api_base_url: "https://generativelanguage.googleapis.com/v1beta/models"
                .to_string(),
            text_model_name: "gemini-2.0-flash-exp".to_string(),
            image_model_name: "gemini-2.0-flash-preview-image-generation".to_string(),
            fallback_model_name: "gemini-1.5-flash".to_string(),
            video_model_name: "veo-2.0-generate-001".to_string(),
            analysis_timeout_secs: 15,
            text_timeout_secs: 10,
            image_timeout_secs: 15,
            max_retries: 3,
            retry_base_delay_ms: 1000,
            video_poll_interval_secs: 5,
            video_poll_max_attempts: 24,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(default.bind_addr),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            gemini_api_key: std::env::var("GOOGLE_GENAI_API_KEY").unwrap_or(default.gemini_api_key),
            gemini_api_base_url: std::env::var("GEMINI_API_BASE_URL").unwrap_or(default.gemini_api_base_url),
            text_model_name: std::env::var("TEXT_MODEL_NAME").unwrap_or(default.text_model_name),
            image_model_name: std::env::var("IMAGE_MODEL_NAME").unwrap_or(default.image_model_name),
            fallback_model_name: std::env::var("FALLBACK_MODEL_NAME").unwrap_or(default.fallback_model_name),
            video_model_name: std::env::var("VIDEO_MODEL_NAME").unwrap_or(default.video_model_name),
            analysis_timeout_secs: std::env::var("ANALYSIS_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.analysis_timeout_secs),
            text_timeout_secs: std::env::var("TEXT_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.text_timeout_secs),
            image_timeout_secs: std::env::var("IMAGE_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.image_timeout_secs),
            max_retries: std::env::var("MAX_RETRIES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_retries),
            retry_base_delay_ms: std::env::var("RETRY_BASE_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.retry_base_delay_ms),
            video_poll_interval_secs: std::env::var("VIDEO_POLL_INTERVAL_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.video_poll_interval_secs),
            video_poll_max_attempts: std::env::var("VIDEO_POLL_MAX_ATTEMPTS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.video_poll_max_attempts),
        }
    }
}
