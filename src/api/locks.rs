//! # 写锁闸门
//!
//! 以域为单位的互斥锁，取代原系统的单一全局锁。写操作在限定时间内
//! 取不到锁时回传可重试的失败，不做静默放行。

use crate::api::action::LockDomain;
use crate::error::{Result, SiteLogError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// 互斥域对应的锁表
pub struct WriteGate {
    wait_timeout: Duration,
    locks: [Arc<Mutex<()>>; LockDomain::ALL.len()],
}

/// 持有期间该域的其他写操作会被阻塞
pub type DomainGuard = OwnedMutexGuard<()>;

impl WriteGate {
    #[must_use]
    pub fn new(wait_timeout: Duration) -> Self {
        Self {
            wait_timeout,
            locks: std::array::from_fn(|_| Arc::new(Mutex::new(()))),
        }
    }

    /// 取得指定域的写锁，超时回传 `LockTimeout`
    pub async fn acquire(&self, domain: LockDomain) -> Result<DomainGuard> {
        let lock = Arc::clone(&self.locks[Self::slot(domain)]);
        match tokio::time::timeout(self.wait_timeout, lock.lock_owned()).await {
            Ok(guard) => Ok(guard),
            Err(_) => Err(SiteLogError::lock_timeout(
                domain.as_str(),
                self.wait_timeout.as_secs(),
            )),
        }
    }

    const fn slot(domain: LockDomain) -> usize {
        match domain {
            LockDomain::Users => 0,
            LockDomain::Projects => 1,
            LockDomain::Logs => 2,
            LockDomain::Inspectors => 3,
            LockDomain::Holidays => 4,
            LockDomain::DisasterTypes => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;

    #[tokio::test]
    async fn test_acquire_and_release() {
        let gate = WriteGate::new(Duration::from_secs(1));
        for domain in LockDomain::ALL {
            let guard = gate.acquire(domain).await.unwrap();
            drop(guard);
            // 释放后必须能立即再次取得
            let _again = gate.acquire(domain).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_held_lock_times_out_as_retryable_failure() {
        let gate = WriteGate::new(Duration::from_millis(50));
        let _held = gate.acquire(LockDomain::Logs).await.unwrap();

        let err = gate.acquire(LockDomain::Logs).await.unwrap_err();
        assert!(matches!(err, SiteLogError::LockTimeout { .. }), "应回传锁超时错误");
        assert_eq!(err.category(), ErrorCategory::Client);
        assert!(err.to_string().contains("logs"), "错误信息应指出忙碌的域");
    }

    #[tokio::test]
    async fn test_domains_do_not_block_each_other() {
        let gate = WriteGate::new(Duration::from_millis(50));
        let _logs = gate.acquire(LockDomain::Logs).await.unwrap();

        // 日志域被持有时，其他域仍可写
        let _users = gate.acquire(LockDomain::Users).await.unwrap();
        let _projects = gate.acquire(LockDomain::Projects).await.unwrap();
    }
}
