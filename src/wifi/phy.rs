//! DMG PHY 模式与速率表

use crate::error::QdError;
use std::str::FromStr;

/// DMG Control / SC PHY 的 MCS（0..=12）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhyMode {
    mcs: u8,
}

/// 各 MCS 的名义速率（Mbps）。
const DMG_RATES_MBPS: [f64; 13] = [
    27.5, 385.0, 770.0, 962.5, 1155.0, 1251.25, 1540.0, 1925.0, 2310.0, 2502.5, 3080.0, 3850.0,
    4620.0,
];

/// 每个 PPDU 的前导码 + 头部开销
const PPDU_OVERHEAD_NS: u64 = 1_891;

impl PhyMode {
    pub fn dmg_mcs(mcs: u8) -> Result<PhyMode, QdError> {
        if (mcs as usize) < DMG_RATES_MBPS.len() {
            Ok(PhyMode { mcs })
        } else {
            Err(QdError::unknown("PHY mode", format!("DMG_MCS{mcs}")))
        }
    }

    pub fn mcs(self) -> u8 {
        self.mcs
    }

    pub fn rate_bps(self) -> u64 {
        (DMG_RATES_MBPS[self.mcs as usize] * 1e6) as u64
    }

    /// 一个载荷为 `bytes` 的帧在空口上的占用时间（纳秒）。
    pub fn airtime_ns(self, bytes: u32) -> u64 {
        let bits = u64::from(bytes) * 8;
        let rate = self.rate_bps().max(1);
        bits.saturating_mul(1_000_000_000)
            .div_ceil(rate)
            .saturating_add(PPDU_OVERHEAD_NS)
    }
}

impl Default for PhyMode {
    fn default() -> Self {
        PhyMode { mcs: 12 }
    }
}

impl FromStr for PhyMode {
    type Err = QdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mcs = s
            .trim()
            .strip_prefix("DMG_MCS")
            .and_then(|n| n.parse::<u8>().ok())
            .ok_or_else(|| QdError::unknown("PHY mode", s))?;
        PhyMode::dmg_mcs(mcs)
    }
}
