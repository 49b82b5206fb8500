//! MAC 帧类别
//!
//! 只区分测量层关心的几类：数据帧、DMG 信标以及 SLS 过程中的控制帧。

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// QoS 数据帧
    QosData,
    /// DMG 信标（BTI 阶段的扇区扫描）
    DmgBeacon,
    /// Sector Sweep
    Ssw,
    /// Sector Sweep Feedback
    SswFeedback,
    /// Sector Sweep ACK
    SswAck,
    /// 关联请求/响应等管理帧
    Management,
}

impl FrameKind {
    /// 波束训练相关的控制帧：无论是否开启数据帧 SNR 上报都会记录。
    pub fn is_beamforming_control(self) -> bool {
        matches!(
            self,
            FrameKind::DmgBeacon | FrameKind::Ssw | FrameKind::SswFeedback | FrameKind::SswAck
        )
    }

    pub fn is_data(self) -> bool {
        self == FrameKind::QosData
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FrameKind::QosData => "QoS-Data",
            FrameKind::DmgBeacon => "DMG-Beacon",
            FrameKind::Ssw => "SSW",
            FrameKind::SswFeedback => "SSW-FBCK",
            FrameKind::SswAck => "SSW-ACK",
            FrameKind::Management => "Mgmt",
        };
        f.write_str(s)
    }
}
