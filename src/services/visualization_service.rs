//! 未来形象生成服务 - 业务能力层
//!
//! 流程：idle → 请求描述文本 → 请求图片 → {成功 | 占位图替换} → 完成
//!
//! 任何一级失败都在本地吸收：文本失败用保底文案，图片失败依次尝试
//! 备用模型和确定性 SVG 占位图。调用方永远拿到结果，只是质量可能降级

use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

use crate::clients::{
    parse_data_uri, GeminiClient, GenerateContentRequest, GenerationConfig, Part,
};
use crate::config::Config;
use crate::error::{AppError, AppResult, LlmError};
use crate::models::{VisualizationRequest, VisualizationResult};
use crate::services::placeholder::create_placeholder_image;
use crate::utils::retry::with_retry;

/// 描述文本的最小可用长度（字符），低于此值继续用保底文案
const MIN_DESCRIPTION_CHARS: usize = 50;

/// 未来形象生成服务
pub struct VisualizationService {
    client: Arc<GeminiClient>,
    text_model: String,
    image_model: String,
    fallback_model: String,
    text_timeout: Duration,
    image_timeout: Duration,
    max_retries: u32,
    retry_base_delay: Duration,
}

impl VisualizationService {
    /// 创建新的未来形象生成服务
    pub fn new(client: Arc<GeminiClient>, config: &Config) -> Self {
        Self {
            client,
            text_model: config.text_model_name.clone(),
            image_model: config.image_model_name.clone(),
            fallback_model: config.fallback_model_name.clone(),
            text_timeout: Duration::from_secs(config.text_timeout_secs),
            image_timeout: Duration::from_secs(config.image_timeout_secs),
            max_retries: config.max_retries,
            retry_base_delay: Duration::from_millis(config.retry_base_delay_ms),
        }
    }

    /// 生成未来形象（图片 + 描述）
    ///
    /// 本方法不返回错误：所有失败在内部降级处理
    pub async fn generate(&self, request: &VisualizationRequest) -> VisualizationResult {
        let profession = &request.suggested_profession;
        info!("⚡ 开始生成未来形象，职业: {}", profession);

        // 描述与图片是固定的两路并发，汇合后再继续
        let description_task = self.generate_description(request);
        let image_task = async {
            match self.generate_image(request).await {
                Ok(uri) => {
                    info!("✅ AI 图片生成成功");
                    (uri, false)
                }
                Err(e) => {
                    warn!("❌ AI 图片生成失败: {}", e);
                    info!("🔄 尝试备用模型...");
                    match self.generate_image_fallback(profession).await {
                        Ok(uri) => {
                            info!("✅ 备用模型图片生成成功");
                            (uri, false)
                        }
                        Err(e2) => {
                            warn!("❌ 所有图片生成尝试均失败: {}", e2);
                            info!("🔄 使用占位图替换");
                            (create_placeholder_image(profession), true)
                        }
                    }
                }
            }
        };
        let (description_result, (generated_image, placeholder_used)) =
            futures::join!(description_task, image_task);

        let mut description = VisualizationResult::canned_description(profession);
        match description_result {
            Ok(text) if text.chars().count() > MIN_DESCRIPTION_CHARS => {
                info!("✅ AI 描述生成成功");
                description = text;
            }
            Ok(_) => {
                info!("⚠️ AI 描述过短，继续使用保底文案");
            }
            Err(e) => {
                warn!("❌ AI 描述生成失败: {}", e);
            }
        }

        info!("✅ 未来形象生成完成 (占位图: {})", placeholder_used);

        VisualizationResult {
            generated_image,
            future_self_description: description,
            placeholder_used,
        }
    }

    /// 生成描述文本（带重试与超时）
    async fn generate_description(&self, request: &VisualizationRequest) -> AppResult<String> {
        debug!("📝 生成 AI 描述...");

        let prompt = build_description_prompt(request);
        let api_request = GenerateContentRequest::from_text(&prompt).with_generation_config(
            GenerationConfig {
                temperature: Some(0.8),
                top_p: Some(0.9),
                top_k: Some(40),
                max_output_tokens: Some(300),
                response_modalities: None,
            },
        );

        with_retry(
            "未来形象描述",
            self.max_retries,
            self.retry_base_delay,
            || {
                let client = self.client.clone();
                let model = self.text_model.clone();
                let request = api_request.clone();
                let timeout = self.text_timeout;
                async move {
                    let response = client.generate_content(&model, &request, timeout).await?;
                    response.first_text().ok_or_else(|| {
                        AppError::Llm(LlmError::EmptyContent { model })
                    })
                }
            },
        )
        .await
    }

    /// 用主力图片模型生成图片
    async fn generate_image(&self, request: &VisualizationRequest) -> AppResult<String> {
        debug!("🎨 开始 AI 图片生成...");

        let mut parts = Vec::new();

        // 有照片时先放照片片段，提示词要求保留相貌特征；
        // 无照片时用匿名提示词（不露脸 + 性别提示）
        if let Some(uri) = request.photo_data_uri.as_deref() {
            match parse_data_uri(uri) {
                Some((mime_type, data)) => {
                    parts.push(Part::inline_data(mime_type, data));
                }
                None => {
                    warn!("⚠️ 照片 data URI 无法解析，按无照片处理");
                }
            }
        }
        let with_photo = !parts.is_empty();
        parts.push(Part::text(build_image_prompt(request, with_photo)));

        let api_request = GenerateContentRequest::from_user_parts(parts).with_generation_config(
            GenerationConfig {
                temperature: Some(0.8),
                top_p: Some(0.9),
                top_k: None,
                max_output_tokens: Some(4096),
                response_modalities: Some(vec!["TEXT".to_string(), "IMAGE".to_string()]),
            },
        );

        debug!("📤 发送图片生成请求...");
        let response = self
            .client
            .generate_content(&self.image_model, &api_request, self.image_timeout)
            .await?;

        extract_image_data_uri(&response, &self.image_model)
    }

    /// 用备用模型做最后一次真实生成尝试
    async fn generate_image_fallback(&self, profession: &str) -> AppResult<String> {
        let prompt = format!("Generate an image of a professional {} at work.", profession);
        let api_request = GenerateContentRequest::from_text(&prompt).with_generation_config(
            GenerationConfig {
                temperature: Some(0.7),
                top_p: None,
                top_k: None,
                max_output_tokens: Some(2048),
                response_modalities: None,
            },
        );

        let response = self
            .client
            .generate_content(&self.fallback_model, &api_request, self.image_timeout)
            .await?;

        extract_image_data_uri(&response, &self.fallback_model)
    }
}

/// 从响应中提取图片 data URI
///
/// 先找 inlineData 的 base64 负载；没有时退而在文本片段里
/// 用正则捞 `data:image…`；都没有则报缺图
fn extract_image_data_uri(
    response: &crate::clients::gemini_client::GenerateContentResponse,
    model: &str,
) -> AppResult<String> {
    if let Some((mime_type, data)) = response.first_inline_image() {
        return Ok(format!("data:{};base64,{}", mime_type, data));
    }

    static DATA_IMAGE_RE: OnceLock<Regex> = OnceLock::new();
    let re = DATA_IMAGE_RE
        .get_or_init(|| Regex::new(r#"data:image[^"'\s]*"#).expect("图片 URI 正则非法"));

    for part in response.first_parts() {
        if let Some(text) = &part.text {
            if let Some(matched) = re.find(text) {
                debug!("从文本片段中提取到图片 data URI");
                return Ok(matched.as_str().to_string());
            }
        }
    }

    Err(AppError::Llm(LlmError::MissingImageData {
        model: model.to_string(),
    }))
}

/// 构造描述文本提示词
fn build_description_prompt(request: &VisualizationRequest) -> String {
    let gender = request
        .gender
        .map(|g| g.label())
        .unwrap_or("unspecified");

    format!(
        r#"Write a compelling, inspiring 2-3 sentence description of someone's future self working as a {profession}.

        Context:
        - Interests: {interests}
        - Mindset: {mindset}
        - Target Profession: {profession}
        - Gender: {gender}

        Make it personal, inspiring, and specific to the {profession} profession. Focus on their success and fulfillment."#,
        profession = request.suggested_profession,
        interests = request.interests,
        mindset = request.mindset,
        gender = gender,
    )
}

/// 构造图片生成提示词（有照片 / 匿名两个变体）
fn build_image_prompt(request: &VisualizationRequest, with_photo: bool) -> String {
    let profession = &request.suggested_profession;
    let interests = &request.interests;
    let mindset = &request.mindset;

    if with_photo {
        format!(
            r#"You are an expert AI image generator. Your task is to create a photorealistic, inspiring, and highly-detailed image of a person's future self that perfectly matches their suggested profession and work environment.

**Analysis Results:**
- **Interests:** {interests}
- **Mindset:** {mindset}
- **Suggested Profession:** {profession}

**Critical Instructions:**
1. **Preserve Identity:** Meticulously preserve the person's distinct facial features, likeness, ethnicity, and estimated age. The generated person MUST be clearly and unmistakably identifiable as the person in the original photo.

2. **Professional Environment Match:** Generate a high-fidelity image showing them actively working in their **{profession}** role with profession-specific environment:
    - **Social Work/Community roles** (Social Worker, Community Organizer, Counselor): Community center, office with clients, meeting room, or helping people in community settings - NO medical equipment like stethoscopes
    - **Healthcare roles** (Doctor, Nurse, Medical professional): Hospital, clinic, or medical facility with medical equipment like stethoscopes, medical charts
    - **Environmental/Nature roles** (Environmental Scientist, Marine Biologist, Landscape Architect): Show them outdoors in natural settings, field research, with nature-specific tools
    - **Education roles** (Teacher, Professor): Classroom, laboratory, or educational environment with students or educational materials
    - **Creative roles** (Artist, Designer, Architect): Studio, workshop, or creative workspace with art supplies, design tools
    - **Technology roles** (Software Developer, Engineer): Modern office or tech workspace with computers, coding environment
    - **Leadership roles**: Show them in action leading teams or projects in their specific field context

3. **Authentic Professional Details:** Include ONLY the specific tools, equipment, and activities that someone in {profession} would actually use, with appropriate professional attire for the specific field, engaged in typical activities of THIS EXACT profession only.

4. **Mindset Reflection:** The overall composition and mood should reflect their {mindset} mindset through lighting, posture, and environmental elements.

5. **Leadership and Success:** Show them in a position of competence and leadership within their field, demonstrating expertise and making a positive impact.

6. **Final Style:** Professional, candid-style photograph that looks realistic and inspiring, clearly showing them thriving in their specific career environment."#
        )
    } else {
        let gender = request
            .gender
            .map(|g| g.label())
            .unwrap_or("person");

        format!(
            r#"You are an expert AI image generator. Your task is to create a photorealistic, inspiring, and highly-detailed image of a person's future self that perfectly matches their suggested profession and work environment.

**Analysis Results:**
- **Interests:** {interests}
- **Mindset:** {mindset}
- **Suggested Profession:** {profession}
- **Gender:** {gender}

**Critical Instructions:**
1. **Professional Environment Match:** Generate a high-fidelity image showing a {gender} actively working in their **{profession}** role with profession-specific environment:
    - **Social Work/Community roles** (Social Worker, Community Organizer, Counselor): Community center, office with clients, meeting room, or helping people in community settings - NO medical equipment like stethoscopes
    - **Healthcare roles** (Doctor, Nurse, Medical professional): Hospital, clinic, or medical facility with medical equipment like stethoscopes, medical charts
    - **Environmental/Nature roles** (Environmental Scientist, Marine Biologist, Landscape Architect): Show them outdoors in natural settings, field research, with nature-specific tools
    - **Education roles** (Teacher, Professor): Classroom, laboratory, or educational environment with students or educational materials
    - **Creative roles** (Artist, Designer, Architect): Studio, workshop, or creative workspace with art supplies, design tools
    - **Technology roles** (Software Developer, Engineer): Modern office or tech workspace with computers, coding environment
    - **Leadership roles**: Show them in action leading teams or projects in their field

2. **Anonymity:** **DO NOT show the person's face clearly.** Use back view, side profile, or creative angles that conceal facial identity while still showing them engaged in their profession.

3. **Authentic Professional Details:** Include ONLY the specific tools, equipment, and activities that someone in {profession} would actually use, with appropriate professional attire for the specific field, engaged in typical activities of THIS EXACT profession only.

4. **Body Representation:** Full-body or upper-body shot showing them actively working, not just abstract elements or distant figures.

5. **Mindset Reflection:** The overall composition and mood should reflect their {mindset} mindset through lighting, posture, and environmental elements.

6. **Leadership and Success:** Show them in a position of competence and leadership within their field, demonstrating expertise and making a positive impact.

7. **Final Style:** Professional, candid-style photograph that looks realistic and inspiring, clearly showing them thriving in their specific career environment."#
        )
    }
}
