//! 题目生成服务 - 业务能力层
//!
//! 用 LLM 生成职业/性格测评单选题；模型输出不可解析时
//! 退回内置默认题组，逐题回填缺失字段，保证返回结构完整

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::clients::{GeminiClient, GenerateContentRequest, GenerationConfig};
use crate::config::Config;
use crate::error::AppResult;
use crate::models::{default_generated_questions, McqQuestion};
use crate::utils::text::strip_code_fences;

const DEFAULT_TOPIC: &str = "career interests and personality";
const DEFAULT_QUESTION_COUNT: u32 = 10;

/// 题目生成服务
pub struct QuestionService {
    client: Arc<GeminiClient>,
    model_name: String,
    timeout: Duration,
}

impl QuestionService {
    /// 创建新的题目生成服务
    pub fn new(client: Arc<GeminiClient>, config: &Config) -> Self {
        Self {
            client,
            model_name: config.text_model_name.clone(),
            timeout: Duration::from_secs(config.analysis_timeout_secs),
        }
    }

    /// 生成测评题目
    ///
    /// # 参数
    /// - `topic`: 主题，缺省为职业兴趣与性格
    /// - `number_of_questions`: 题目数量，缺省 10
    ///
    /// # 返回
    /// 永远返回非空题目列表；生成或解析失败时为内置默认题组
    pub async fn generate(
        &self,
        topic: Option<&str>,
        number_of_questions: Option<u32>,
    ) -> Vec<McqQuestion> {
        let topic = topic.unwrap_or(DEFAULT_TOPIC);
        let count = number_of_questions.unwrap_or(DEFAULT_QUESTION_COUNT);

        info!("📋 生成测评题目，主题: {}，数量: {}", topic, count);

        let questions = match self.request_questions(topic, count).await {
            Ok(raw) => parse_questions(&raw),
            Err(e) => {
                warn!("❌ 题目生成调用失败: {}", e);
                None
            }
        };

        match questions {
            Some(list) => {
                info!("✅ 题目生成完成，共 {} 题", list.len());
                list
            }
            None => {
                info!("🔄 使用内置默认题组");
                default_generated_questions()
            }
        }
    }

    async fn request_questions(&self, topic: &str, count: u32) -> AppResult<String> {
        let prompt = build_questions_prompt(topic, count);
        debug!("题目生成提示词长度: {} 字符", prompt.len());

        let request = GenerateContentRequest::from_text(&prompt).with_generation_config(
            GenerationConfig {
                temperature: Some(0.7),
                top_p: Some(0.8),
                top_k: Some(40),
                max_output_tokens: Some(2000),
                response_modalities: None,
            },
        );

        let response = self
            .client
            .generate_content(&self.model_name, &request, self.timeout)
            .await?;
        Ok(response.first_text().unwrap_or_default())
    }
}

/// 构造题目生成提示词
fn build_questions_prompt(topic: &str, count: u32) -> String {
    format!(
        r#"You are an AI assistant designed to generate multiple-choice questions for career and personality assessment.

Given the topic: {topic}, generate {count} multiple-choice questions. Each question should have 4-5 options.

The questions should help assess:
1. Career interests and preferences
2. Work style and environment preferences
3. Problem-solving approaches
4. Learning and growth mindset
5. Values and motivations
6. Communication and collaboration preferences
7. Leadership and responsibility preferences
8. Creativity and innovation approaches
9. Stress management and resilience
10. Long-term goals and aspirations

Format the output as a JSON array of objects, where each object has a "question" field and an "options" field. The "options" field should be an array of strings.

Example format:
[
  {{
    "question": "What type of work environment energizes you most?",
    "options": ["Collaborative team settings", "Independent focused work", "Dynamic changing environments", "Structured organized spaces", "Creative open spaces"]
  }},
  {{
    "question": "When facing a complex problem, what's your preferred approach?",
    "options": ["Break it down into smaller parts", "Brainstorm creative solutions", "Research best practices", "Collaborate with others", "Take time to reflect deeply"]
  }}
]

Generate {count} diverse questions that will help create a comprehensive personality and career profile."#,
    )
}

/// 解析 LLM 返回的题目数组
///
/// 返回 None 表示整体不可解析（调用方退回默认题组）；
/// 单题缺字段则就地回填
fn parse_questions(raw: &str) -> Option<Vec<McqQuestion>> {
    let cleaned = strip_code_fences(raw);
    let value: serde_json::Value = serde_json::from_str(&cleaned).ok()?;
    let items = value.as_array()?;
    if items.is_empty() {
        return None;
    }

    let questions = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let question = item
                .get("question")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
                .unwrap_or_else(|| format!("Question {}", index + 1));

            let options = item
                .get("options")
                .and_then(|v| v.as_array())
                .map(|arr| {
                    arr.iter()
                        .filter_map(|o| o.as_str())
                        .map(|s| s.to_string())
                        .collect::<Vec<_>>()
                })
                .filter(|opts| !opts.is_empty())
                .unwrap_or_else(|| {
                    vec![
                        "Option A".to_string(),
                        "Option B".to_string(),
                        "Option C".to_string(),
                        "Option D".to_string(),
                    ]
                });

            McqQuestion {
                id: String::new(),
                question,
                options,
            }
        })
        .collect();

    Some(questions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_array() {
        let raw = r#"[
            {"question": "Q?", "options": ["A", "B", "C", "D"]},
            {"question": "R?", "options": ["X", "Y", "Z", "W"]}
        ]"#;
        let questions = parse_questions(raw).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].question, "Q?");
        assert_eq!(questions[1].options, vec!["X", "Y", "Z", "W"]);
    }

    #[test]
    fn test_parse_fenced_array() {
        let raw = "```json\n[{\"question\": \"Q?\", \"options\": [\"A\", \"B\"]}]\n```";
        let questions = parse_questions(raw).unwrap();
        assert_eq!(questions.len(), 1);
    }

    #[test]
    fn test_parse_backfills_missing_fields() {
        // 缺题干和选项的条目逐题回填，不整体失败
        let raw = r#"[{"options": ["A"]}, {"question": "Q?"}]"#;
        let questions = parse_questions(raw).unwrap();
        assert_eq!(questions[0].question, "Question 1");
        assert_eq!(questions[0].options, vec!["A"]);
        assert_eq!(questions[1].question, "Q?");
        assert_eq!(questions[1].options.len(), 4);
        assert_eq!(questions[1].options[0], "Option A");
    }

    #[test]
    fn test_parse_rejects_non_array() {
        assert!(parse_questions(r#"{"question": "Q?"}"#).is_none());
        assert!(parse_questions("plain prose, not JSON").is_none());
        assert!(parse_questions("[]").is_none());
    }

    #[test]
    fn test_prompt_defaults() {
        let prompt = build_questions_prompt(DEFAULT_TOPIC, DEFAULT_QUESTION_COUNT);
        assert!(prompt.contains("career interests and personality"));
        assert!(prompt.contains("generate 10 multiple-choice questions"));
    }
}
