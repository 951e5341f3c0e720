//! # FutureSelf Quiz
//!
//! 一个用于"未来的自己"职业测评应用的 Rust 后端服务
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Clients）
//! - `clients/` - 持有与外部 AI 提供方的传输通道
//! - `GeminiClient` - Gemini REST API 的唯一出口，只做传输和错误归类
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个服务只管一种能力
//! - `ProfileService` - 问卷答案 → 档案分析（永不失败，三级降级解析）
//! - `VisualizationService` - 档案 → 未来形象图片与描述（占位图兜底）
//! - `QuestionService` - 测评题目生成（默认题组兜底）
//! - `VideoService` - 形象图片 → 动态视频（长操作轮询，无兜底）
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义一次用户旅程的完整流程
//! - `WizardSession` - 向导状态机（步骤跳转、进度、年龄组分叉）
//! - `WizardFlow` - 流程编排（问卷 → 分析 → 生成 → 结果）
//!
//! ### ④ 编排层（API）
//! - `api/` - HTTP 端点，管理共享状态和 CORS
//!
//! ## 模块结构

pub mod api;
pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use clients::GeminiClient;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{AgeGroup, Gender, McqQuestion, ProfileAnalysis, VisualizationResult};
pub use workflow::{Step, WizardFlow, WizardSession};
