//! 场景描述（JSON）
//!
//! `ScenarioSpec` 是可序列化的原始配置，所有字段都有默认值；`resolve` 把其中的
//! 具名变体和数值校验成类型化的 `Scenario`，任何不认识的取值都在仿真开始前报错。

use serde::{Deserialize, Serialize};

use super::time::SimTime;
use crate::error::QdError;
use crate::wifi::{
    AppKind, DataRate, MAX_PACKET_BYTES, MacParams, PhyMode, SenderConfig, SocketKind, TcpVariant,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioSpec {
    pub num_stas: u16,
    pub simulation_time_s: f64,
    pub application: ApplicationSpec,
    pub phy_mode: String,
    pub channel: ChannelSpec,
    pub mac: MacSpec,
    pub output: OutputSpec,
    pub blockages: Vec<BlockageSpec>,
}

impl Default for ScenarioSpec {
    fn default() -> Self {
        Self {
            num_stas: 10,
            simulation_time_s: 10.0,
            application: ApplicationSpec::default(),
            phy_mode: "DMG_MCS12".to_string(),
            channel: ChannelSpec::default(),
            mac: MacSpec::default(),
            output: OutputSpec::default(),
            blockages: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationSpec {
    /// `onoff` 或 `bulk`
    pub kind: String,
    pub packet_size: u32,
    pub data_rate: String,
    /// 总发送字节上限，0 表示不限
    pub max_bytes: u64,
    /// `udp` / `tcp`（也接受 `ns3::UdpSocketFactory` 形式）
    pub socket: String,
    pub tcp_variant: String,
}

impl Default for ApplicationSpec {
    fn default() -> Self {
        Self {
            kind: "onoff".to_string(),
            packet_size: 1448,
            data_rate: "300Mbps".to_string(),
            max_bytes: 0,
            socket: "udp".to_string(),
            tcp_variant: "NewReno".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSpec {
    /// STA 到 AP 的距离（米）
    pub radius_m: f64,
    pub num_traces: u32,
    pub trace_period_ms: f64,
    pub ap_sectors: u8,
    pub sta_sectors: u8,
    pub tx_power_dbm: f64,
}

impl Default for ChannelSpec {
    fn default() -> Self {
        Self {
            radius_m: 4.0,
            num_traces: 1,
            trace_period_ms: 5.0,
            ap_sectors: 32,
            sta_sectors: 32,
            tx_power_dbm: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MacSpec {
    pub beacon_interval_us: u64,
    pub bi_threshold: u16,
}

impl Default for MacSpec {
    fn default() -> Self {
        Self {
            beacon_interval_us: 102_400,
            bi_threshold: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSpec {
    pub csv: bool,
    pub report_data_snr: bool,
    pub sample_period_ms: u64,
}

impl Default for OutputSpec {
    fn default() -> Self {
        Self {
            csv: false,
            report_data_snr: true,
            sample_period_ms: 100,
        }
    }
}

/// 第 `sta` 个 STA（从 1 开始）在 `[from_ms, to_ms)` 内与 AP 之间的链路被遮挡。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockageSpec {
    pub sta: u16,
    pub from_ms: u64,
    pub to_ms: u64,
}

/// 校验后的场景
#[derive(Debug, Clone)]
pub struct Scenario {
    pub num_stas: u16,
    pub simulation_time: SimTime,
    pub sender: SenderConfig,
    pub socket: SocketKind,
    pub tcp_variant: TcpVariant,
    pub phy: PhyMode,
    pub radius_m: f64,
    pub num_traces: u32,
    pub trace_period: SimTime,
    pub ap_sectors: u8,
    pub sta_sectors: u8,
    pub tx_power_dbm: f64,
    pub beacon_interval: SimTime,
    pub bi_threshold: u16,
    pub csv: bool,
    pub report_data_snr: bool,
    pub sample_period: SimTime,
    /// (STA 序号（从 1 开始）, 开始, 结束)
    pub blockages: Vec<(u16, SimTime, SimTime)>,
}

impl Scenario {
    /// 仿真停止时刻：多留一个采样周期再加 1 ms，保证最后一个周期的采样被执行。
    pub fn stop_time(&self) -> SimTime {
        self.simulation_time
            .saturating_add(self.sample_period)
            .saturating_add(SimTime::from_millis(1))
    }
}

fn positive(what: &'static str, v: f64) -> Result<f64, QdError> {
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(QdError::invalid(what, v))
    }
}

impl ScenarioSpec {
    pub fn from_json(raw: &str) -> Result<Self, QdError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn resolve(&self) -> Result<Scenario, QdError> {
        if self.num_stas == 0 || self.num_stas > 254 {
            return Err(QdError::invalid("number of STAs", self.num_stas));
        }
        let simulation_time =
            SimTime::from_secs_f64(positive("simulation time", self.simulation_time_s)?);

        let app = &self.application;
        if app.packet_size == 0 || app.packet_size > MAX_PACKET_BYTES {
            return Err(QdError::invalid("packet size", app.packet_size));
        }
        let sender = SenderConfig {
            kind: app.kind.parse::<AppKind>()?,
            packet_bytes: app.packet_size,
            rate: app.data_rate.parse::<DataRate>()?,
            max_bytes: app.max_bytes,
            stop_at: Some(simulation_time),
        };
        let socket = app.socket.parse::<SocketKind>()?;
        let tcp_variant = app.tcp_variant.parse::<TcpVariant>()?;
        let phy = self.phy_mode.parse::<PhyMode>()?;

        let ch = &self.channel;
        if ch.num_traces == 0 {
            return Err(QdError::invalid("number of Q-D traces", ch.num_traces));
        }
        if ch.ap_sectors == 0 || ch.sta_sectors == 0 {
            return Err(QdError::invalid("codebook sectors", 0));
        }
        let trace_period = SimTime::from_secs_f64(positive("trace period", ch.trace_period_ms)? / 1e3);

        let beacon_interval = SimTime::from_micros(self.mac.beacon_interval_us);
        if beacon_interval <= MacParams::default().dti_offset() {
            return Err(QdError::invalid(
                "beacon interval",
                format!("{} us (shorter than BTI + A-BFT)", self.mac.beacon_interval_us),
            ));
        }
        if self.mac.bi_threshold == 0 {
            return Err(QdError::invalid("BI threshold", 0));
        }
        if self.output.sample_period_ms == 0 {
            return Err(QdError::invalid("sample period", 0));
        }

        let mut blockages = Vec::with_capacity(self.blockages.len());
        for b in &self.blockages {
            if b.sta == 0 || b.sta > self.num_stas {
                return Err(QdError::invalid("blockage STA", b.sta));
            }
            if b.from_ms >= b.to_ms {
                return Err(QdError::invalid(
                    "blockage window",
                    format!("{}..{} ms", b.from_ms, b.to_ms),
                ));
            }
            blockages.push((b.sta, SimTime::from_millis(b.from_ms), SimTime::from_millis(b.to_ms)));
        }

        Ok(Scenario {
            num_stas: self.num_stas,
            simulation_time,
            sender,
            socket,
            tcp_variant,
            phy,
            radius_m: positive("radius", ch.radius_m)?,
            num_traces: ch.num_traces,
            trace_period,
            ap_sectors: ch.ap_sectors,
            sta_sectors: ch.sta_sectors,
            tx_power_dbm: ch.tx_power_dbm,
            beacon_interval,
            bi_threshold: self.mac.bi_threshold,
            csv: self.output.csv,
            report_data_snr: self.output.report_data_snr,
            sample_period: SimTime::from_millis(self.output.sample_period_ms),
            blockages,
        })
    }
}
