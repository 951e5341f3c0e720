use serde::{Deserialize, Serialize};

use crate::models::question::Gender;

/// 问卷分析结果
///
/// 第一次 AI 调用的产物。四个字段都保证非空：
/// 上游解析失败时由兜底值填充，下游永远不会看到缺失的职业
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileAnalysis {
    /// 兴趣摘要
    pub interests: String,
    /// 思维方式
    pub mindset: String,
    /// 叙述性总结
    pub summary: String,
    /// 建议职业
    pub suggested_profession: String,
}

impl ProfileAnalysis {
    /// 分析彻底失败时的兜底档案
    pub fn fallback() -> Self {
        Self {
            interests: "Technology and Problem-solving".to_string(),
            mindset: "Analytical and Growth-oriented".to_string(),
            summary: "A motivated individual with strong analytical skills and diverse \
                      interests. Shows potential for success in technology-related fields \
                      and enjoys tackling complex challenges."
                .to_string(),
            suggested_profession: "Software Developer".to_string(),
        }
    }
}

/// 未来形象生成请求
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualizationRequest {
    /// 用户照片（data URI，可跳过）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_data_uri: Option<String>,
    pub interests: String,
    pub mindset: String,
    pub suggested_profession: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}

/// 未来形象生成结果
///
/// 第二次 AI 调用的产物。图片要么是真实生成的 data URI，
/// 要么是按职业确定性渲染的 SVG 占位图
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualizationResult {
    /// 生成的图片（data URI）
    pub generated_image: String,
    /// 未来形象描述
    pub future_self_description: String,
    /// 是否使用了占位图（不进入响应体，仅用于日志与测试）
    #[serde(skip)]
    pub placeholder_used: bool,
}

impl VisualizationResult {
    /// 给定职业的保底描述文案
    pub fn canned_description(profession: &str) -> String {
        format!(
            "Meet your future self as a successful {profession}! You've found your calling \
             in this meaningful career, using your unique talents to make a positive impact. \
             Your dedication and passion shine through as you excel in your role as a \
             {profession}, creating the fulfilling future you've always envisioned."
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_analysis_wire_names() {
        let profile = ProfileAnalysis::fallback();
        let json = serde_json::to_value(&profile).unwrap();
        // 响应体使用 camelCase 字段名
        assert!(json.get("suggestedProfession").is_some());
        assert!(json.get("interests").is_some());
    }

    #[test]
    fn test_fallback_profile_is_complete() {
        let profile = ProfileAnalysis::fallback();
        assert!(!profile.interests.is_empty());
        assert!(!profile.mindset.is_empty());
        assert!(!profile.summary.is_empty());
        assert_eq!(profile.suggested_profession, "Software Developer");
    }

    #[test]
    fn test_visualization_request_optional_fields() {
        let json = r#"{
            "interests": "Technology",
            "mindset": "Analytical",
            "suggestedProfession": "Engineer"
        }"#;
        let req: VisualizationRequest = serde_json::from_str(json).unwrap();
        assert!(req.photo_data_uri.is_none());
        assert!(req.gender.is_none());
        assert_eq!(req.suggested_profession, "Engineer");
    }
}
