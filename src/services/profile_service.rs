//! 问卷分析服务 - 业务能力层
//!
//! 只负责"答案 → 档案"这一能力，不关心向导流程
//!
//! 核心约定：本服务永不失败。LLM 返回的半结构化文本按
//! 严格 JSON → 逐字段正则提取 → 硬编码默认值 三级降级解析，
//! 提供方彻底挂掉时返回保底档案，调用方拿到的职业字段永远非空

use std::sync::Arc;
use std::time::Duration;

use regex::RegexBuilder;
use tracing::{debug, info, warn};

use crate::clients::{GeminiClient, GenerateContentRequest, GenerationConfig};
use crate::config::Config;
use crate::error::AppResult;
use crate::models::{AgeGroup, ProfileAnalysis};
use crate::utils::retry::with_retry;
use crate::utils::text::strip_code_fences;

/// 兜底字段值
const DEFAULT_INTERESTS: &str = "Technology, Problem-solving";
const DEFAULT_MINDSET: &str = "Growth-oriented";
const DEFAULT_SUMMARY: &str = "A motivated individual with diverse interests.";
const DEFAULT_PROFESSION: &str = "Software Developer";

/// 问卷分析服务
pub struct ProfileService {
    client: Arc<GeminiClient>,
    model_name: String,
    timeout: Duration,
    max_retries: u32,
    retry_base_delay: Duration,
}

impl ProfileService {
    /// 创建新的问卷分析服务
    pub fn new(client: Arc<GeminiClient>, config: &Config) -> Self {
        Self {
            client,
            model_name: config.text_model_name.clone(),
            timeout: Duration::from_secs(config.analysis_timeout_secs),
            max_retries: config.max_retries,
            retry_base_delay: Duration::from_millis(config.retry_base_delay_ms),
        }
    }

    /// 分析问卷答案，产出用户档案
    ///
    /// # 参数
    /// - `answers`: (题目, 答案) 有序对
    /// - `age_group`: 年龄组，缺省按 11-17 处理
    ///
    /// # 返回
    /// 永远返回四字段齐全的档案，不向调用方抛错
    pub async fn analyze(
        &self,
        answers: &[(String, String)],
        age_group: Option<AgeGroup>,
    ) -> ProfileAnalysis {
        let age_group = age_group.unwrap_or_default();

        info!("🧠 开始问卷分析，共 {} 题，年龄组 {}", answers.len(), age_group.label());

        match self.request_analysis(answers, age_group).await {
            Ok(raw) => {
                let profile = parse_profile_analysis(&raw);
                info!("✅ 问卷分析完成");
                info!("🎯 建议职业: {}", profile.suggested_profession);
                profile
            }
            Err(e) => {
                warn!("❌ 问卷分析调用失败: {}", e);
                info!("🔄 返回保底档案");
                ProfileAnalysis::fallback()
            }
        }
    }

    /// 发起分析调用（带重试）
    async fn request_analysis(
        &self,
        answers: &[(String, String)],
        age_group: AgeGroup,
    ) -> AppResult<String> {
        let prompt = build_analysis_prompt(answers, age_group);
        debug!("分析提示词长度: {} 字符", prompt.len());

        let request = GenerateContentRequest::from_text(&prompt).with_generation_config(
            GenerationConfig {
                temperature: Some(0.7),
                top_p: Some(0.8),
                top_k: Some(40),
                max_output_tokens: Some(1000),
                response_modalities: None,
            },
        );

        with_retry(
            "问卷分析",
            self.max_retries,
            self.retry_base_delay,
            || {
                let client = self.client.clone();
                let model = self.model_name.clone();
                let request = request.clone();
                let timeout = self.timeout;
                async move {
                    debug!("📤 发送问卷分析请求...");
                    let response = client.generate_content(&model, &request, timeout).await?;
                    Ok(response.first_text().unwrap_or_default())
                }
            },
        )
        .await
    }
}

/// 构造问卷分析提示词
pub fn build_analysis_prompt(answers: &[(String, String)], age_group: AgeGroup) -> String {
    let formatted_answers = answers
        .iter()
        .map(|(question, answer)| format!("- Question: {}\n- Answer: {}", question, answer))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are an expert career counselor and psychologist specializing in student career guidance. Analyze the following questionnaire responses from a student and provide detailed insights.

**Context**: {age_context}

Based on the student's answers, generate:
1. **Interests**: A concise summary of the student's key interests and passions. Focus on these categories:
   - STEM/Technology: Programming, engineering, scientific research, data analysis
   - Creative Arts: Visual arts, music, writing, design, entertainment
   - Education/Research: Teaching, academic research, knowledge sharing, learning
   - Healthcare/Social: Medicine, counseling, social work, community service

2. **Mindset**: Describe the student's learning and problem-solving approach:
   - Analytical: Logical, systematic, detail-oriented
   - Creative: Innovative, artistic, imaginative
   - Collaborative: Team-oriented, social, communicative
   - Independent: Self-directed, research-focused, autonomous

3. **Summary**: A compelling narrative about their potential career path and work style.

4. **Suggested Profession**: Based on their interests and mindset, suggest ONE specific profession from these examples: {profession_examples}. The profession MUST:
   - Match their demonstrated interests from the questionnaire responses
   - Align with their problem-solving and learning style
   - Be clearly visualizable in a professional workplace setting

**Student Age Group**: {age_label} years old

**Student Responses:**
{formatted_answers}

**CRITICAL REQUIREMENTS:**
- The suggested profession MUST be specific and match the student's strongest interests
- Consider how their answers about subjects, activities, and work environments align
- The profession should be visualizable in a clear workplace setting (office, lab, classroom, studio, etc.)
- Ensure consistency between interests, mindset, and suggested profession

Respond in valid JSON format:
{{
  "interests": "string",
  "mindset": "string",
  "summary": "string",
  "suggestedProfession": "string"
}}"#,
        age_context = age_group.analysis_context(),
        profession_examples = age_group.profession_examples(),
        age_label = age_group.label(),
    )
}

/// 把 LLM 的半结构化回复解析为档案
///
/// 解析顺序：
/// 1. 剥掉代码栅栏后严格 JSON 解析
/// 2. 失败则逐字段按三个正则模式提取（JSON 引号式 / 标签冒号式 / 粗体标签式）
/// 3. 仍缺失的字段用硬编码默认值填充
///
/// 这是对天然无结构的模型输出的尽力解析，保证不抛错、职业字段非空
pub fn parse_profile_analysis(raw: &str) -> ProfileAnalysis {
    let cleaned = strip_code_fences(raw);

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&cleaned) {
        if value.is_object() {
            let field = |name: &str| -> Option<String> {
                value
                    .get(name)
                    .and_then(|v| v.as_str())
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
            };
            return ProfileAnalysis {
                interests: field("interests").unwrap_or_else(|| DEFAULT_INTERESTS.to_string()),
                mindset: field("mindset").unwrap_or_else(|| DEFAULT_MINDSET.to_string()),
                summary: field("summary").unwrap_or_else(|| DEFAULT_SUMMARY.to_string()),
                suggested_profession: field("suggestedProfession")
                    .unwrap_or_else(|| DEFAULT_PROFESSION.to_string()),
            };
        }
    }

    // JSON 解析失败，退回文本提取
    ProfileAnalysis {
        interests: extract_field(raw, "interests")
            .unwrap_or_else(|| DEFAULT_INTERESTS.to_string()),
        mindset: extract_field(raw, "mindset").unwrap_or_else(|| DEFAULT_MINDSET.to_string()),
        summary: extract_field(raw, "summary").unwrap_or_else(|| DEFAULT_SUMMARY.to_string()),
        suggested_profession: extract_field(raw, "profession")
            .unwrap_or_else(|| DEFAULT_PROFESSION.to_string()),
    }
}

/// 从纯文本回复中提取字段
///
/// 三个模式按序尝试，命中即返回：
/// 1. `"field": "value"`（JSON 引号式）
/// 2. `field: value`（标签冒号式，取到行尾）
/// 3. `**field**: value`（markdown 粗体标签式）
fn extract_field(text: &str, field: &str) -> Option<String> {
    let patterns = [
        format!(r#""{}":\s*"([^"]+)""#, field),
        format!(r"{}[:\s]+([^\n]+)", field),
        format!(r"\*\*{}\*\*[:\s]+([^\n]+)", field),
    ];

    for pattern in &patterns {
        let re = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .ok()?;
        if let Some(captures) = re.captures(text) {
            if let Some(matched) = captures.get(1) {
                let value = matched.as_str().trim();
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strict_json() {
        let raw = r#"{
            "interests": "Robotics and AI",
            "mindset": "Analytical",
            "summary": "A future engineer.",
            "suggestedProfession": "Engineer"
        }"#;
        let profile = parse_profile_analysis(raw);
        assert_eq!(profile.interests, "Robotics and AI");
        assert_eq!(profile.suggested_profession, "Engineer");
    }

    #[test]
    fn test_parse_fenced_json() {
        let raw = "```json\n{\"interests\": \"Art\", \"mindset\": \"Creative\", \"summary\": \"An artist.\", \"suggestedProfession\": \"Artist\"}\n```";
        let profile = parse_profile_analysis(raw);
        assert_eq!(profile.suggested_profession, "Artist");
        assert_eq!(profile.mindset, "Creative");
    }

    #[test]
    fn test_parse_json_missing_profession_backfilled() {
        // JSON 合法但缺职业字段，必须回填默认值
        let raw = r#"{"interests": "Music", "mindset": "Creative", "summary": "A musician."}"#;
        let profile = parse_profile_analysis(raw);
        assert_eq!(profile.interests, "Music");
        assert_eq!(profile.suggested_profession, DEFAULT_PROFESSION);
    }

    #[test]
    fn test_parse_markdown_bold_labels() {
        let raw = "Here is the analysis:\n\
                   **Interests**: Marine life and ecosystems\n\
                   **Mindset**: Curious and methodical\n\
                   **Summary**: Destined for field research.\n\
                   **Suggested Profession**: Marine Biologist";
        let profile = parse_profile_analysis(raw);
        assert_eq!(profile.interests, "Marine life and ecosystems");
        assert_eq!(profile.mindset, "Curious and methodical");
        // 粗体 "Suggested Profession" 三个模式都不命中（提取键是 "profession"），
        // 此时回填默认职业而不是抛错
        assert_eq!(profile.suggested_profession, DEFAULT_PROFESSION);
    }

    #[test]
    fn test_parse_label_colon_profession() {
        // "suggestedProfession: X" 含 "profession" 子串，标签冒号式可命中
        let raw = "Analysis done.\nsuggestedProfession: Marine Biologist\nThe end.";
        let profile = parse_profile_analysis(raw);
        assert_eq!(profile.suggested_profession, "Marine Biologist");
    }

    #[test]
    fn test_parse_quoted_fields_in_prose() {
        let raw = r#"The result is "interests": "Chemistry experiments" and more text"#;
        let profile = parse_profile_analysis(raw);
        assert_eq!(profile.interests, "Chemistry experiments");
    }

    #[test]
    fn test_parse_plain_prose_all_defaults() {
        // 纯散文且不含任何标签：全部字段回填默认值，职业非空
        let raw = "The student seems bright and curious about many things.";
        let profile = parse_profile_analysis(raw);
        assert_eq!(profile.mindset, DEFAULT_MINDSET);
        assert_eq!(profile.summary, DEFAULT_SUMMARY);
        assert!(!profile.suggested_profession.is_empty());
        assert_eq!(profile.suggested_profession, DEFAULT_PROFESSION);
    }

    #[test]
    fn test_parse_empty_input() {
        let profile = parse_profile_analysis("");
        assert_eq!(profile.suggested_profession, DEFAULT_PROFESSION);
        assert_eq!(profile.interests, DEFAULT_INTERESTS);
    }

    #[test]
    fn test_prompt_defaults_to_teen_context() {
        // 缺省年龄组按 11-17 构造提示词
        let answers = vec![("Q1".to_string(), "A".to_string())];
        let prompt = build_analysis_prompt(&answers, AgeGroup::default());
        assert!(prompt.contains("11-17 years old"));
        assert!(prompt.contains("older student (11-17 years old)"));
        assert!(prompt.contains("- Question: Q1\n- Answer: A"));
    }

    #[test]
    fn test_prompt_young_context() {
        let answers = vec![("Q1".to_string(), "A".to_string())];
        let prompt = build_analysis_prompt(&answers, AgeGroup::Young);
        assert!(prompt.contains("young student (5-10 years old)"));
        assert!(prompt.contains("Veterinarian"));
    }
}
