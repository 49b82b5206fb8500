//! 波束训练相关类型

use serde::Serialize;
use std::fmt;

/// 信道接入阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelAccessPeriod {
    /// Beacon Transmission Interval
    Bti,
    /// Association Beamforming Training
    Abft,
    /// Data Transmission Interval（CBAP 内的按需训练也在这里）
    Dti,
}

/// 本端在这次 SLS 中的角色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeamformingDirection {
    Initiator,
    Responder,
}

/// 码本中的扇区编号（从 1 开始）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SectorId(pub u8);

/// 天线阵列编号（从 1 开始）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AntennaId(pub u8);

/// 设备类型；数值写入 SLS 结果的 ROLE 列。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StationRole {
    Sta = 0,
    Ap = 1,
}

impl StationRole {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for SectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for AntennaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ChannelAccessPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChannelAccessPeriod::Bti => "BTI",
            ChannelAccessPeriod::Abft => "A-BFT",
            ChannelAccessPeriod::Dti => "DTI",
        };
        f.write_str(s)
    }
}
