//! 向导业务流程 - 流程层
//!
//! 把状态机和 AI 能力粘起来：
//! 1. 问卷提交 → 档案分析 → 总结页
//! 2. 照片/跳过 → 未来形象生成 → 结果页
//!
//! 服务层已经把失败降级掉了，这里只负责编排和回退路由

use std::sync::Arc;

use tracing::{info, warn};

use crate::clients::GeminiClient;
use crate::config::Config;
use crate::error::AppResult;
use crate::models::{AgeGroup, ProfileAnalysis, VisualizationRequest};
use crate::services::{ProfileService, VisualizationService};
use crate::workflow::wizard::WizardSession;

/// 向导业务流程
pub struct WizardFlow {
    profile_service: ProfileService,
    visualization_service: VisualizationService,
}

impl WizardFlow {
    /// 创建新的向导流程
    pub fn new(client: Arc<GeminiClient>, config: &Config) -> Self {
        Self {
            profile_service: ProfileService::new(client.clone(), config),
            visualization_service: VisualizationService::new(client, config),
        }
    }

    /// 提交问卷并完成档案分析
    ///
    /// 分析服务本身不失败（内部降级），这里只校验会话状态
    pub async fn submit_quiz(&self, session: &mut WizardSession) -> AppResult<()> {
        let answers = session.formatted_answers();
        info!("📤 提交问卷，共 {} 题", answers.len());

        let profile = self
            .profile_service
            .analyze(&answers, session.age_group())
            .await;

        session.complete_quiz(profile)?;
        info!("✓ 进入总结页");
        Ok(())
    }

    /// 生成未来形象并进入结果页
    ///
    /// 5-10 路径用梦想职业就地合成档案，11-17 路径用分析出的档案；
    /// 会话状态非法时错误向上抛，生成本身永不失败
    pub async fn generate_visualization(&self, session: &mut WizardSession) -> AppResult<()> {
        session.begin_generating()?;

        let request = match build_visualization_request(session) {
            Some(request) => request,
            None => {
                // 既没有档案也没有梦想职业，回退重试
                warn!("⚠️ 会话缺少职业信息，回退到上一步");
                session.fail_generation()?;
                return Ok(());
            }
        };

        let mut result = self.visualization_service.generate(&request).await;

        // 5-10 路径用个性化文案覆盖描述
        if session.age_group() == Some(AgeGroup::Young) {
            if let (Some(name), Some(profession)) =
                (session.student_name(), session.dream_profession())
            {
                result.future_self_description = format!(
                    "Meet {name}, a future {profession}! With dedication and hard work, {name} \
                     will achieve their dreams and make a positive impact in the world of {lower}.",
                    name = name,
                    profession = profession,
                    lower = profession.to_lowercase(),
                );
            }
        }

        session.complete_generation(result)?;
        info!("✓ 进入结果页");
        Ok(())
    }
}

/// 按年龄组路径组装生成请求
fn build_visualization_request(session: &WizardSession) -> Option<VisualizationRequest> {
    let photo_data_uri = session.photo_data_uri().map(|s| s.to_string());
    let gender = session.gender();

    if session.age_group() == Some(AgeGroup::Young) {
        let profession = session.dream_profession()?.to_string();
        return Some(VisualizationRequest {
            photo_data_uri,
            interests: profession.clone(),
            mindset: format!("A young student who dreams of becoming a {}", profession),
            suggested_profession: profession,
            gender,
        });
    }

    let profile: &ProfileAnalysis = session.profile()?;
    Some(VisualizationRequest {
        photo_data_uri,
        interests: profile.interests.clone(),
        mindset: profile.mindset.clone(),
        suggested_profession: profile.suggested_profession.clone(),
        gender,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;
    use crate::workflow::wizard::Step;

    fn young_session_at_camera() -> WizardSession {
        let mut session = WizardSession::new();
        session.advance().unwrap();
        session.select_age_group(AgeGroup::Young).unwrap();
        session.advance().unwrap();
        session.select_gender(Gender::Female).unwrap();
        session.advance().unwrap();
        session.submit_simple_form("Mia", "Veterinarian").unwrap();
        session
    }

    #[test]
    fn test_young_request_synthesized_from_dream() {
        let session = young_session_at_camera();
        let request = build_visualization_request(&session).unwrap();
        assert_eq!(request.suggested_profession, "Veterinarian");
        assert_eq!(request.interests, "Veterinarian");
        assert!(request
            .mindset
            .contains("dreams of becoming a Veterinarian"));
    }

    #[test]
    fn test_teen_request_uses_profile() {
        let mut session = WizardSession::new();
        session.advance().unwrap();
        session.select_age_group(AgeGroup::Teen).unwrap();
        session.advance().unwrap();
        session.select_gender(Gender::Male).unwrap();
        session.advance().unwrap();
        let ids: Vec<String> = session.questions().iter().map(|q| q.id.clone()).collect();
        for id in ids {
            session.submit_answer(&id, "A").unwrap();
        }
        session.complete_quiz(ProfileAnalysis::fallback()).unwrap();
        session.advance().unwrap();

        let request = build_visualization_request(&session).unwrap();
        assert_eq!(request.suggested_profession, "Software Developer");
        assert_eq!(session.step(), Step::Upload);
    }

    #[test]
    fn test_request_missing_profession_is_none() {
        // 问卷路径上没有档案时无法组装请求
        let session = WizardSession::new();
        assert!(build_visualization_request(&session).is_none());
    }
}
