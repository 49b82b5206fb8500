//! 流量应用
//!
//! 发送端：on-off（恒定速率）或 bulk（以 PHY 速率饱和发送）；接收端：PacketSink，
//! 只累计收到的包数和字节数。发送端用 generation 区分每一次启动，
//! 停止后残留的发送定时器在下一次触发时自然失效。

use super::id::{NodeId, ReceiverId, SenderId};
use crate::error::QdError;
use crate::sim::SimTime;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// 单个应用层包的上限：A-MSDU 最大聚合长度（字节）
pub const MAX_PACKET_BYTES: u32 = 7935;

/// 发送应用类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AppKind {
    OnOff,
    Bulk,
}

impl FromStr for AppKind {
    type Err = QdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "onoff" | "on-off" | "on_off" => Ok(AppKind::OnOff),
            "bulk" => Ok(AppKind::Bulk),
            _ => Err(QdError::unknown("application type", s)),
        }
    }
}

/// 传输层 socket 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SocketKind {
    Udp,
    Tcp,
}

impl FromStr for SocketKind {
    type Err = QdError;

    /// 接受 `udp` / `tcp`，也接受 `ns3::UdpSocketFactory` 这类全名。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let core = lower.strip_prefix("ns3::").unwrap_or(&lower);
        let core = core.strip_suffix("socketfactory").unwrap_or(core);
        match core {
            "udp" => Ok(SocketKind::Udp),
            "tcp" => Ok(SocketKind::Tcp),
            _ => Err(QdError::unknown("socket type", s)),
        }
    }
}

/// TCP 拥塞控制变体
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TcpVariant {
    NewReno,
    Hybla,
    HighSpeed,
    Vegas,
    Scalable,
    Veno,
    Bic,
    Westwood,
    WestwoodPlus,
}

impl TcpVariant {
    pub const ALL: [TcpVariant; 9] = [
        TcpVariant::NewReno,
        TcpVariant::Hybla,
        TcpVariant::HighSpeed,
        TcpVariant::Vegas,
        TcpVariant::Scalable,
        TcpVariant::Veno,
        TcpVariant::Bic,
        TcpVariant::Westwood,
        TcpVariant::WestwoodPlus,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TcpVariant::NewReno => "NewReno",
            TcpVariant::Hybla => "Hybla",
            TcpVariant::HighSpeed => "HighSpeed",
            TcpVariant::Vegas => "Vegas",
            TcpVariant::Scalable => "Scalable",
            TcpVariant::Veno => "Veno",
            TcpVariant::Bic => "Bic",
            TcpVariant::Westwood => "Westwood",
            TcpVariant::WestwoodPlus => "WestwoodPlus",
        }
    }
}

impl FromStr for TcpVariant {
    type Err = QdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        TcpVariant::ALL
            .into_iter()
            .find(|v| v.name() == s)
            .ok_or_else(|| QdError::unknown("TCP variant", s))
    }
}

/// 数据速率（bit/s）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DataRate(pub u64);

impl DataRate {
    pub fn bps(self) -> u64 {
        self.0
    }
}

impl FromStr for DataRate {
    type Err = QdError;

    /// 形如 `300Mbps`、`1.5Gbps`、`500kbps`、`64000bps`。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        let (num, mult) = if let Some(n) = t.strip_suffix("Gbps") {
            (n, 1e9)
        } else if let Some(n) = t.strip_suffix("Mbps") {
            (n, 1e6)
        } else if let Some(n) = t.strip_suffix("kbps").or_else(|| t.strip_suffix("Kbps")) {
            (n, 1e3)
        } else if let Some(n) = t.strip_suffix("bps") {
            (n, 1.0)
        } else {
            return Err(QdError::invalid("data rate", s));
        };
        let v: f64 = num
            .trim()
            .parse()
            .map_err(|_| QdError::invalid("data rate", s))?;
        let bps = v * mult;
        if !bps.is_finite() || bps < 1.0 {
            return Err(QdError::invalid("data rate", s));
        }
        Ok(DataRate(bps.round() as u64))
    }
}

impl fmt::Display for DataRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bps", self.0)
    }
}

/// 包数/字节数计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AppCounters {
    pub packets: u64,
    pub bytes: u64,
}

impl AppCounters {
    fn add(&mut self, bytes: u32) {
        self.packets += 1;
        self.bytes += u64::from(bytes);
    }
}

#[derive(Debug, Clone)]
pub struct SenderConfig {
    pub kind: AppKind,
    pub packet_bytes: u32,
    pub rate: DataRate,
    /// 总发送字节上限；0 表示不限
    pub max_bytes: u64,
    /// 应用停止时刻；之后不再发包
    pub stop_at: Option<SimTime>,
}

#[derive(Debug, Clone)]
pub struct TrafficSender {
    pub id: SenderId,
    pub node: NodeId,
    pub peer: NodeId,
    pub receiver: ReceiverId,
    pub cfg: SenderConfig,
    running: bool,
    generation: u64,
    starts: u32,
    stops: u32,
    counters: AppCounters,
}

impl TrafficSender {
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn counters(&self) -> AppCounters {
        self.counters
    }

    /// 启动/停止被调用的次数
    pub fn start_stop_calls(&self) -> (u32, u32) {
        (self.starts, self.stops)
    }

    /// `generation` 对应的发送定时器是否仍然有效。
    pub fn is_current(&self, generation: u64) -> bool {
        self.running && self.generation == generation
    }

    pub fn budget_exhausted(&self) -> bool {
        self.cfg.max_bytes > 0 && self.counters.bytes >= self.cfg.max_bytes
    }

    /// 字节预算用完或过了停止时刻。
    pub fn is_finished(&self, now: SimTime) -> bool {
        self.budget_exhausted() || self.cfg.stop_at.is_some_and(|t| now >= t)
    }

    /// 相邻两个包的间隔（纳秒）。bulk 发送端的间隔等于一个包的空口时间。
    pub fn interval_ns(&self, airtime_ns: u64) -> u64 {
        match self.cfg.kind {
            AppKind::OnOff => {
                let bits = u64::from(self.cfg.packet_bytes) * 8;
                bits.saturating_mul(1_000_000_000)
                    .div_ceil(self.cfg.rate.bps().max(1))
            }
            AppKind::Bulk => airtime_ns.max(1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PacketSink {
    pub id: ReceiverId,
    pub node: NodeId,
    counters: AppCounters,
}

impl PacketSink {
    pub fn counters(&self) -> AppCounters {
        self.counters
    }

    pub fn total_rx(&self) -> u64 {
        self.counters.bytes
    }
}

/// 所有已安装的应用
#[derive(Debug, Default)]
pub struct Applications {
    senders: Vec<TrafficSender>,
    sinks: Vec<PacketSink>,
}

impl Applications {
    pub fn install_sink(&mut self, node: NodeId) -> ReceiverId {
        let id = ReceiverId(self.sinks.len());
        self.sinks.push(PacketSink {
            id,
            node,
            counters: AppCounters::default(),
        });
        id
    }

    /// 安装发送端；安装后处于停止状态，等待关联成功后被启动。
    pub fn install_sender(
        &mut self,
        node: NodeId,
        peer: NodeId,
        receiver: ReceiverId,
        cfg: SenderConfig,
    ) -> SenderId {
        let id = SenderId(self.senders.len());
        self.senders.push(TrafficSender {
            id,
            node,
            peer,
            receiver,
            cfg,
            running: false,
            generation: 0,
            starts: 0,
            stops: 0,
            counters: AppCounters::default(),
        });
        id
    }

    pub fn sender(&self, id: SenderId) -> &TrafficSender {
        &self.senders[id.0]
    }

    pub fn sink(&self, id: ReceiverId) -> &PacketSink {
        &self.sinks[id.0]
    }

    pub fn senders(&self) -> impl Iterator<Item = &TrafficSender> {
        self.senders.iter()
    }

    /// 启动发送端并返回新的 generation；已经在运行时返回 None。
    pub fn start(&mut self, id: SenderId) -> Option<u64> {
        let s = &mut self.senders[id.0];
        s.starts += 1;
        if s.running {
            return None;
        }
        s.running = true;
        s.generation = s.generation.wrapping_add(1);
        Some(s.generation)
    }

    pub fn stop(&mut self, id: SenderId) {
        let s = &mut self.senders[id.0];
        s.stops += 1;
        s.running = false;
    }

    /// 发送端自己结束（预算用完或到达停止时刻）；不计入 `stop` 调用次数。
    pub fn finish(&mut self, id: SenderId) {
        self.senders[id.0].running = false;
    }

    pub fn record_tx(&mut self, id: SenderId, bytes: u32) {
        self.senders[id.0].counters.add(bytes);
    }

    pub fn record_rx(&mut self, id: ReceiverId, bytes: u32) {
        self.sinks[id.0].counters.add(bytes);
    }
}
