//! 瞬时错误重试
//!
//! AI 提供方偶发 503/限流，按固定次数上限重试，退避时间线性递增。
//! 只重试 `AppError::is_transient()` 的错误，其余立即返回

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::AppResult;

/// 带线性退避的重试包装
///
/// 第 n 次失败后等待 `base_delay * n` 再重试；
/// 达到 `max_attempts` 次后返回最后一次的错误
///
/// # 参数
/// - `op_name`: 操作名称（仅用于日志）
/// - `max_attempts`: 总尝试次数（含第一次）
/// - `base_delay`: 退避基数
pub async fn with_retry<T, F, Fut>(
    op_name: &str,
    max_attempts: u32,
    base_delay: Duration,
    mut operation: F,
) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < max_attempts => {
                let delay = base_delay * attempt;
                warn!(
                    "⚠️ {} 第 {}/{} 次调用失败: {}，{}ms 后重试",
                    op_name,
                    attempt,
                    max_attempts,
                    err,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_succeeds_first_try() {
        let calls = AtomicU32::new(0);
        let result = with_retry("测试", 3, Duration::ZERO, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, AppError>(42) }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transient_503_then_success() {
        // 第一次 503，第二次成功，调用方不应看到错误
        let calls = AtomicU32::new(0);
        let result = with_retry("测试", 3, Duration::ZERO, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(AppError::api_bad_response("generateContent", 503, "overloaded"))
                } else {
                    Ok("ok")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stops_after_max_attempts() {
        // 一直 503，达到上限后返回最后一次错误
        let calls = AtomicU32::new(0);
        let result: AppResult<()> = with_retry("测试", 3, Duration::ZERO, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AppError::api_bad_response("generateContent", 503, "overloaded")) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(result.unwrap_err().is_transient());
    }

    #[tokio::test]
    async fn test_non_transient_not_retried() {
        // 400 不重试
        let calls = AtomicU32::new(0);
        let result: AppResult<()> = with_retry("测试", 5, Duration::ZERO, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AppError::api_bad_response("generateContent", 400, "bad request")) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
