//! API 路由 - 编排层
//!
//! 三个问卷端点 + 视频端点 + 健康检查。
//!
//! 错误策略偏向可用性：提供方失败在服务层降级成兜底内容照常 200，
//! 只有调用方自己的错误（缺字段、错方法）返回 4xx；
//! 视频没有兜底，失败返回 500

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

use crate::api::server::AppState;
use crate::clients::parse_data_uri;
use crate::models::question::Gender;
use crate::models::{AgeGroup, McqQuestion, ProfileAnalysis, VisualizationRequest};

type AppStateArc = Arc<AppState>;

// ============================================================================
// 问卷端点
// ============================================================================

pub fn quiz_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/answer-mcq-questions", post(answer_mcq_questions))
        .route("/generate-future-self", post(generate_future_self))
        .route("/generate-mcq-questions", post(generate_mcq_questions))
}

/// 问卷答案 → 档案分析
///
/// 入参 `{ answers: {题目: 答案}, ageGroup? }`；
/// answers 缺失或为空 → 400，其余情况永远 200
async fn answer_mcq_questions(
    State(state): State<AppStateArc>,
    Json(body): Json<Value>,
) -> Result<Json<ProfileAnalysis>, (StatusCode, Json<Value>)> {
    let answers = match body.get("answers").and_then(|v| v.as_object()) {
        Some(map) if !map.is_empty() => map,
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid answers format" })),
            ));
        }
    };

    // 非字符串答案按 JSON 字面量转成文本
    let pairs: Vec<(String, String)> = answers
        .iter()
        .map(|(question, answer)| {
            let text = answer
                .as_str()
                .map(|s| s.to_string())
                .unwrap_or_else(|| answer.to_string());
            (question.clone(), text)
        })
        .collect();

    // 未知年龄组标签按缺省（11-17）处理
    let age_group = body
        .get("ageGroup")
        .and_then(|v| v.as_str())
        .and_then(AgeGroup::from_label);

    let profile = state.profile_service.analyze(&pairs, age_group).await;
    Ok(Json(profile))
}

/// 档案 → 未来形象（图片 + 描述）
///
/// suggestedProfession 缺失 → 400；校验通过后永远 200，
/// 生成失败在服务层降级为占位图/保底文案
async fn generate_future_self(
    State(state): State<AppStateArc>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let suggested_profession = match body
        .get("suggestedProfession")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        Some(p) => p.to_string(),
        None => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "suggestedProfession is required" })),
            ));
        }
    };

    info!("⚡ 收到未来形象生成请求，职业: {}", suggested_profession);

    let field = |name: &str| {
        body.get(name)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    };

    let gender = body
        .get("gender")
        .and_then(|v| v.as_str())
        .and_then(|s| match s {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        });

    let request = VisualizationRequest {
        photo_data_uri: body
            .get("photoDataUri")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()),
        interests: field("interests"),
        mindset: field("mindset"),
        suggested_profession,
        gender,
    };

    let result = state.visualization_service.generate(&request).await;

    Ok(Json(json!({
        "generatedImage": result.generated_image,
        "futureSelfDescription": result.future_self_description,
    })))
}

#[derive(Debug, serde::Serialize)]
struct QuestionsResponse {
    questions: Vec<McqQuestion>,
}

/// 生成测评题目
///
/// 整个请求体可省略；生成失败退回内置默认题组，永远 200
async fn generate_mcq_questions(
    State(state): State<AppStateArc>,
    body: Option<Json<Value>>,
) -> Json<QuestionsResponse> {
    let body = body.map(|Json(v)| v).unwrap_or(Value::Null);

    let topic = body.get("topic").and_then(|v| v.as_str()).map(str::to_string);
    let number_of_questions = body
        .get("numberOfQuestions")
        .and_then(|v| v.as_u64())
        .map(|n| n as u32);

    let questions = state
        .question_service
        .generate(topic.as_deref(), number_of_questions)
        .await;

    Json(QuestionsResponse { questions })
}

// ============================================================================
// 视频端点
// ============================================================================

pub fn video_routes() -> Router<AppStateArc> {
    Router::new().route("/generate-video", post(generate_video))
}

/// 从生成的形象图片生成动态视频
///
/// 视频没有占位兜底：长操作失败或轮询超限 → 500
async fn generate_video(
    State(state): State<AppStateArc>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let image_data_uri = body
        .get("imageDataUri")
        .and_then(|v| v.as_str())
        .unwrap_or_default();

    let (mime_type, data) = match parse_data_uri(image_data_uri) {
        Some(parsed) => parsed,
        None => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "imageDataUri must be a base64 data URI" })),
            ));
        }
    };

    match state.video_service.generate_from_image(&data, &mime_type).await {
        Ok(video) => Ok(Json(json!({ "video": video }))),
        Err(e) => {
            error!("❌ 视频生成失败: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to generate video" })),
            ))
        }
    }
}

// ============================================================================
// 健康检查
// ============================================================================

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/health", get(health_check))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "service": "future_self_quiz",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::server::build_router;
    use crate::config::Config;
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use tower::ServiceExt;

    /// 测试配置：不重试、超时压到最短，离线环境下走降级路径也能很快返回
    fn test_state() -> AppStateArc {
        let config = Config {
            max_retries: 1,
            retry_base_delay_ms: 0,
            analysis_timeout_secs: 1,
            text_timeout_secs: 1,
            image_timeout_secs: 1,
            ..Config::default()
        };
        Arc::new(AppState::new(&config))
    }

    fn json_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = build_router(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["service"], "future_self_quiz");
    }

    #[tokio::test]
    async fn test_answer_mcq_rejects_empty_answers() {
        let app = build_router(test_state());
        let response = app
            .oneshot(json_request("/answer-mcq-questions", r#"{"answers": {}}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Invalid answers format");
    }

    #[tokio::test]
    async fn test_answer_mcq_rejects_missing_answers() {
        let app = build_router(test_state());
        let response = app
            .oneshot(json_request("/answer-mcq-questions", r#"{"ageGroup": "11-17"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_answer_mcq_degrades_to_200_without_provider() {
        // 没有可用的 AI 提供方时走保底档案，依然 200 且职业非空
        let app = build_router(test_state());
        let response = app
            .oneshot(json_request(
                "/answer-mcq-questions",
                r#"{"answers": {"Q1": "A"}}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        // 四个字段必须齐全，职业非空
        let profession = json["suggestedProfession"].as_str().unwrap();
        assert!(!profession.is_empty());
        assert!(json["interests"].is_string());
        assert!(json["mindset"].is_string());
        assert!(json["summary"].is_string());
    }

    #[tokio::test]
    async fn test_generate_future_self_requires_profession() {
        let app = build_router(test_state());
        let response = app
            .oneshot(json_request(
                "/generate-future-self",
                r#"{"interests": "Tech", "mindset": "Analytical"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "suggestedProfession is required");
    }

    #[tokio::test]
    async fn test_generate_future_self_always_succeeds_with_placeholder() {
        // 提供方不可用时占位图 + 保底文案，依然 200
        let app = build_router(test_state());
        let response = app
            .oneshot(json_request(
                "/generate-future-self",
                r#"{"interests": "Tech", "mindset": "Analytical", "suggestedProfession": "Unknown Job"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let image = json["generatedImage"].as_str().unwrap();
        assert!(image.starts_with("data:image/svg+xml;base64,"));
        let description = json["futureSelfDescription"].as_str().unwrap();
        assert!(description.contains("Unknown Job"));
    }

    #[tokio::test]
    async fn test_wrong_method_is_405() {
        let app = build_router(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/answer-mcq-questions")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_generate_video_rejects_bad_data_uri() {
        let app = build_router(test_state());
        let response = app
            .oneshot(json_request(
                "/generate-video",
                r#"{"imageDataUri": "https://example.com/a.png"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
