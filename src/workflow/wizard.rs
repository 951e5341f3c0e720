//! 向导状态机 - 流程层
//!
//! 驱动用户走完 intro → age → gender → (quiz | simple-form) →
//! camera/upload → generating → result 的线性流程。
//!
//! 约定：
//! - 状态只能沿单一路径前进/后退（开头按年龄组分叉一次）
//! - 进度是 (step, 已答题数) 的纯函数，前进方向单调不减
//! - 生成失败回退到上一步（对应前端的 toast + 重试）
//! - 会话只存在于一次用户旅程中，从不持久化

use crate::error::{AppError, AppResult, BusinessError};
use crate::models::{builtin_questions, AgeGroup, Gender, McqQuestion, ProfileAnalysis};
use crate::models::VisualizationResult;

/// 向导步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// 欢迎页
    Intro,
    /// 年龄组选择
    Age,
    /// 性别选择
    Gender,
    /// 完整问卷（11-17）
    Quiz,
    /// 简易表单（5-10）
    SimpleForm,
    /// 拍照（5-10 路径）
    Camera,
    /// 档案总结页
    Summary,
    /// 照片上传（11-17 路径）
    Upload,
    /// 生成中
    Generating,
    /// 结果页
    Result,
}

impl Step {
    pub fn as_str(self) -> &'static str {
        match self {
            Step::Intro => "intro",
            Step::Age => "age",
            Step::Gender => "gender",
            Step::Quiz => "quiz",
            Step::SimpleForm => "simple-form",
            Step::Camera => "camera",
            Step::Summary => "summary",
            Step::Upload => "upload",
            Step::Generating => "generating",
            Step::Result => "result",
        }
    }
}

/// 单个用户旅程的会话状态
///
/// 页面加载时创建，每一步修改，reset 或关闭页面时丢弃
#[derive(Debug)]
pub struct WizardSession {
    step: Step,
    age_group: Option<AgeGroup>,
    gender: Option<Gender>,
    questions: Vec<McqQuestion>,
    current_question: usize,
    /// (题目ID, 所选选项)，按作答顺序
    answers: Vec<(String, String)>,
    profile: Option<ProfileAnalysis>,
    photo_data_uri: Option<String>,
    result: Option<VisualizationResult>,
    // --- 5-10 简易表单路径 ---
    student_name: Option<String>,
    dream_profession: Option<String>,
    /// 进入 generating 前的步骤，失败时回退用
    step_before_generating: Step,
}

impl Default for WizardSession {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardSession {
    /// 创建新会话
    pub fn new() -> Self {
        Self {
            step: Step::Intro,
            age_group: None,
            gender: None,
            questions: builtin_questions(),
            current_question: 0,
            answers: Vec::new(),
            profile: None,
            photo_data_uri: None,
            result: None,
            student_name: None,
            dream_profession: None,
            step_before_generating: Step::Upload,
        }
    }

    // ========== 只读访问 ==========

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn age_group(&self) -> Option<AgeGroup> {
        self.age_group
    }

    pub fn gender(&self) -> Option<Gender> {
        self.gender
    }

    pub fn profile(&self) -> Option<&ProfileAnalysis> {
        self.profile.as_ref()
    }

    pub fn result(&self) -> Option<&VisualizationResult> {
        self.result.as_ref()
    }

    pub fn photo_data_uri(&self) -> Option<&str> {
        self.photo_data_uri.as_deref()
    }

    pub fn student_name(&self) -> Option<&str> {
        self.student_name.as_deref()
    }

    pub fn dream_profession(&self) -> Option<&str> {
        self.dream_profession.as_deref()
    }

    pub fn questions(&self) -> &[McqQuestion] {
        &self.questions
    }

    pub fn current_question(&self) -> usize {
        self.current_question
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    /// 问卷是否全部作答完毕
    pub fn is_quiz_complete(&self) -> bool {
        self.answers.len() == self.questions.len()
    }

    /// 把 (题目ID, 选项) 映射为 (题干, 选项)，保持作答顺序
    ///
    /// 分析提示词用题干而不是ID
    pub fn formatted_answers(&self) -> Vec<(String, String)> {
        self.answers
            .iter()
            .filter_map(|(id, choice)| {
                self.questions
                    .iter()
                    .find(|q| &q.id == id)
                    .map(|q| (q.question.clone(), choice.clone()))
            })
            .collect()
    }

    // ========== 选择项 ==========

    /// 选择年龄组（仅 age 步骤有效）
    pub fn select_age_group(&mut self, age_group: AgeGroup) -> AppResult<()> {
        self.require_step(Step::Age, "select_age_group")?;
        self.age_group = Some(age_group);
        Ok(())
    }

    /// 选择性别（仅 gender 步骤有效）
    pub fn select_gender(&mut self, gender: Gender) -> AppResult<()> {
        self.require_step(Step::Gender, "select_gender")?;
        self.gender = Some(gender);
        Ok(())
    }

    // ========== 前进 / 后退 ==========

    /// 沿路径前进一步
    ///
    /// age 步骤要求已选年龄组，gender 步骤要求已选性别，
    /// gender 之后按年龄组分叉
    pub fn advance(&mut self) -> AppResult<Step> {
        let next = match self.step {
            Step::Intro => Step::Age,
            Step::Age => {
                if self.age_group.is_none() {
                    return Err(self.invalid("advance"));
                }
                Step::Gender
            }
            Step::Gender => {
                if self.gender.is_none() {
                    return Err(self.invalid("advance"));
                }
                match self.age_group {
                    Some(AgeGroup::Young) => Step::SimpleForm,
                    _ => Step::Quiz,
                }
            }
            Step::Summary => Step::Upload,
            // quiz/simple-form/camera/upload 靠专用提交方法推进，
            // generating/result 不允许手动前进
            _ => return Err(self.invalid("advance")),
        };
        self.step = next;
        Ok(next)
    }

    /// 沿路径后退一步
    ///
    /// 问卷中先退题，退到第一题再退出问卷；
    /// generating 中不支持取消，result 只能 reset
    pub fn go_back(&mut self) -> AppResult<Step> {
        let prev = match self.step {
            Step::Age => Step::Intro,
            Step::Gender => Step::Age,
            Step::Quiz => {
                if self.current_question > 0 {
                    self.current_question -= 1;
                    return Ok(Step::Quiz);
                }
                Step::Gender
            }
            Step::SimpleForm => Step::Gender,
            Step::Camera => Step::SimpleForm,
            Step::Summary => Step::Quiz,
            Step::Upload => Step::Summary,
            _ => return Err(self.invalid("go_back")),
        };
        self.step = prev;
        Ok(prev)
    }

    // ========== 问卷（11-17 路径） ==========

    /// 提交当前题的答案并移到下一题
    ///
    /// 同一题重复提交会覆盖旧答案（对应前端改选）
    pub fn submit_answer(&mut self, question_id: &str, choice: &str) -> AppResult<()> {
        self.require_step(Step::Quiz, "submit_answer")?;

        if !self.questions.iter().any(|q| q.id == question_id) {
            return Err(AppError::Business(BusinessError::UnknownQuestion {
                question_id: question_id.to_string(),
            }));
        }

        match self.answers.iter().position(|(id, _)| id == question_id) {
            Some(pos) => self.answers[pos].1 = choice.to_string(),
            None => self
                .answers
                .push((question_id.to_string(), choice.to_string())),
        }

        // 非最后一题时推进到下一题
        if self.current_question + 1 < self.questions.len() {
            self.current_question += 1;
        }
        Ok(())
    }

    /// 问卷分析成功，带着档案进入总结页
    pub fn complete_quiz(&mut self, profile: ProfileAnalysis) -> AppResult<()> {
        self.require_step(Step::Quiz, "complete_quiz")?;
        if !self.is_quiz_complete() {
            return Err(self.invalid("complete_quiz"));
        }
        self.profile = Some(profile);
        self.step = Step::Summary;
        Ok(())
    }

    // ========== 简易表单（5-10 路径） ==========

    /// 提交姓名与梦想职业，进入拍照步骤
    pub fn submit_simple_form(&mut self, name: &str, dream_profession: &str) -> AppResult<()> {
        self.require_step(Step::SimpleForm, "submit_simple_form")?;
        if name.trim().is_empty() {
            return Err(AppError::Business(BusinessError::MissingField {
                field: "name",
            }));
        }
        if dream_profession.trim().is_empty() {
            return Err(AppError::Business(BusinessError::MissingField {
                field: "dream_profession",
            }));
        }
        self.student_name = Some(name.trim().to_string());
        self.dream_profession = Some(dream_profession.trim().to_string());
        self.step = Step::Camera;
        Ok(())
    }

    // ========== 照片与生成 ==========

    /// 记录照片（upload / camera 步骤有效，None 表示跳过）
    pub fn set_photo(&mut self, photo_data_uri: Option<String>) -> AppResult<()> {
        if self.step != Step::Upload && self.step != Step::Camera {
            return Err(self.invalid("set_photo"));
        }
        self.photo_data_uri = photo_data_uri;
        Ok(())
    }

    /// 进入生成中状态
    ///
    /// 记住来路，失败时回退
    pub fn begin_generating(&mut self) -> AppResult<()> {
        if self.step != Step::Upload && self.step != Step::Camera {
            return Err(self.invalid("begin_generating"));
        }
        self.step_before_generating = self.step;
        self.step = Step::Generating;
        Ok(())
    }

    /// 生成成功，进入结果页
    pub fn complete_generation(&mut self, result: VisualizationResult) -> AppResult<()> {
        self.require_step(Step::Generating, "complete_generation")?;
        self.result = Some(result);
        self.step = Step::Result;
        Ok(())
    }

    /// 生成失败，回退到进入生成前的步骤供用户重试
    pub fn fail_generation(&mut self) -> AppResult<Step> {
        self.require_step(Step::Generating, "fail_generation")?;
        self.step = self.step_before_generating;
        Ok(self.step)
    }

    /// 重置会话到初始状态
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    // ========== 进度 ==========

    /// 当前进度（0-100）
    ///
    /// (step, 已答题数) 的纯函数；问卷内从 gender 的 10 按已答比例
    /// 线性爬升到 summary 的 50，保证前进方向单调不减
    pub fn progress_value(&self) -> f32 {
        match self.step {
            Step::Intro => 0.0,
            Step::Age => 5.0,
            Step::Gender => 10.0,
            Step::SimpleForm => 25.0,
            Step::Camera => 50.0,
            Step::Quiz => {
                if self.questions.is_empty() {
                    return 10.0;
                }
                10.0 + self.answers.len() as f32 / self.questions.len() as f32 * 40.0
            }
            Step::Summary => 50.0,
            Step::Upload => 75.0,
            Step::Generating => 90.0,
            Step::Result => 100.0,
        }
    }

    // ========== 内部工具 ==========

    fn require_step(&self, expected: Step, action: &'static str) -> AppResult<()> {
        if self.step != expected {
            return Err(AppError::Business(BusinessError::InvalidTransition {
                from: self.step.as_str(),
                action,
            }));
        }
        Ok(())
    }

    fn invalid(&self, action: &'static str) -> AppError {
        AppError::Business(BusinessError::InvalidTransition {
            from: self.step.as_str(),
            action,
        })
    }
}
