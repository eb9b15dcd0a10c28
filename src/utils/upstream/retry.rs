use std::time::Duration;

use rand::Rng;

const DEFAULT_BASE_DELAY_MS: u64 = 200;
const DEFAULT_MAX_JITTER_MS: u64 = 150;

/// 上游调用的有界重试策略，默认只尝试一次
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_delay: Duration,
    pub max_jitter: Duration,
}

impl RetryPolicy {
    pub fn single_attempt() -> Self {
        Self::with_attempts(1)
    }

    pub fn with_attempts(max_attempts: usize) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            max_jitter: Duration::from_millis(DEFAULT_MAX_JITTER_MS),
        }
    }

    /// 第 `attempt` 次失败后的等待时间：线性退避加随机抖动
    pub fn backoff(&self, attempt: usize) -> Duration {
        let base = self.base_delay.saturating_mul(attempt as u32);
        let jitter_ms = self.max_jitter.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=jitter_ms)
        };
        base + Duration::from_millis(jitter)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::single_attempt()
    }
}
