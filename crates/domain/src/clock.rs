//! # Clock（時刻プロバイダ）
//!
//! `doneAt` や `createdAt` の打刻に使う現在時刻の抽象化。
//! ユースケースは `Utc::now()` を直接呼ばず、注入された [`Clock`] を使う。

use chrono::{DateTime, SubsecRound, Utc};

/// 現在時刻を提供するトレイト
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// PostgreSQL の `TIMESTAMPTZ` が保持できる小数秒の桁数
const STORED_SUBSEC_DIGITS: u16 = 6;

/// システム時刻
///
/// 保存後に読み直した値とレスポンスの値が一致するよう、マイクロ秒に切り捨てる。
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(STORED_SUBSEC_DIGITS)
    }
}

/// 常に同じ時刻を返す実装
///
/// ユースケーステストで `doneAt` の値を検証するために使う。
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(now)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use chrono::Timelike;

    use super::*;

    #[test]
    fn test_system_clockは呼び出し前後の時刻の間を返す() {
        let before = Utc::now().trunc_subsecs(STORED_SUBSEC_DIGITS);
        let now = SystemClock.now();
        let after = Utc::now();

        assert!(before <= now && now <= after);
    }

    #[test]
    fn test_system_clockはマイクロ秒未満を切り捨てる() {
        let now = SystemClock.now();

        assert_eq!(now.nanosecond() % 1_000, 0);
    }

    #[test]
    fn test_fixed_clockは何度呼んでも同じ時刻を返す() {
        let fixed = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let clock = FixedClock::new(fixed);

        assert_eq!(clock.now(), fixed);
        assert_eq!(clock.now(), clock.now());
    }
}
