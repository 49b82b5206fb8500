//! 准确定性（Q-D）信道模型的简化替身
//!
//! 提供测量层需要的两样东西：当前生效的信道快照（trace）编号，以及两节点间
//! 在最佳扇区下的链路 SNR。几何上采用自由空间路径损耗 + 扇区化波束增益，
//! 不同快照之间叠加一个确定性的小幅起伏。

use super::beamforming::SectorId;
use super::id::NodeId;
use crate::sim::SimTime;
use std::f64::consts::PI;

/// 60.48 GHz（信道 2）
pub const CARRIER_HZ: f64 = 60.48e9;
/// 信道带宽 2.16 GHz
pub const BANDWIDTH_HZ: f64 = 2.16e9;
const SPEED_OF_LIGHT: f64 = 299_792_458.0;
/// 离开主瓣中心时的最大衰减（dB）
const MAX_SIDELOBE_LOSS_DB: f64 = 20.0;
/// 快照之间的起伏幅度（dB）
const TRACE_FADING_DB: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Position {
        Position { x, y, z }
    }

    pub fn distance(&self, other: &Position) -> f64 {
        let (dx, dy, dz) = (other.x - self.x, other.y - self.y, other.z - self.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// 水平面方位角，归一化到 [0, 2π)。
    pub fn azimuth_to(&self, other: &Position) -> f64 {
        (other.y - self.y).atan2(other.x - self.x).rem_euclid(2.0 * PI)
    }
}

#[derive(Debug, Clone)]
pub struct QdChannelConfig {
    /// 预先计算的信道快照数量（静态场景为 1）
    pub num_traces: u32,
    /// 每个快照的持续时间
    pub trace_period: SimTime,
    pub tx_power_dbm: f64,
    pub noise_figure_db: f64,
}

impl Default for QdChannelConfig {
    fn default() -> Self {
        Self {
            num_traces: 1,
            trace_period: SimTime::from_millis(5),
            tx_power_dbm: 10.0,
            noise_figure_db: 10.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct QdChannel {
    cfg: QdChannelConfig,
    positions: Vec<Position>,
}

impl QdChannel {
    pub fn new(cfg: QdChannelConfig) -> QdChannel {
        QdChannel {
            cfg,
            positions: Vec::new(),
        }
    }

    pub fn config(&self) -> &QdChannelConfig {
        &self.cfg
    }

    /// 登记节点位置；`node` 必须按创建顺序依次登记。
    pub fn place(&mut self, node: NodeId, pos: Position) {
        debug_assert_eq!(node.0, self.positions.len(), "nodes are placed in creation order");
        self.positions.push(pos);
    }

    pub fn position(&self, node: NodeId) -> Position {
        self.positions[node.0]
    }

    /// 当前仿真时间对应的快照编号；超过最后一个快照后停留在最后一个。
    pub fn current_trace_index(&self, now: SimTime) -> u32 {
        let period = self.cfg.trace_period.as_nanos().max(1);
        let idx = now.as_nanos() / period;
        idx.min(u64::from(self.cfg.num_traces.saturating_sub(1))) as u32
    }

    /// `from` 的码本里指向 `to` 的扇区（扇区按方位角均分，编号从 1 开始）。
    pub fn best_sector(&self, from: NodeId, to: NodeId, sectors: u8) -> SectorId {
        let sectors = sectors.max(1);
        let width = 2.0 * PI / f64::from(sectors);
        let az = self.position(from).azimuth_to(&self.position(to));
        let idx = ((az / width).floor() as u8).min(sectors - 1);
        SectorId(idx + 1)
    }

    /// `node` 使用 `sector` 指向 `to` 时的天线增益（dBi）。
    fn sector_gain_db(&self, node: NodeId, to: NodeId, sector: SectorId, sectors: u8) -> f64 {
        let sectors = f64::from(sectors.max(1));
        let width = 2.0 * PI / sectors;
        let center = (f64::from(sector.0) - 0.5) * width;
        let az = self.position(node).azimuth_to(&self.position(to));
        let mut err = (az - center).abs();
        if err > PI {
            err = 2.0 * PI - err;
        }
        let peak = 10.0 * sectors.log10() + 3.0;
        let loss = (12.0 * (err / width).powi(2)).min(MAX_SIDELOBE_LOSS_DB);
        peak - loss
    }

    /// 自由空间路径损耗（dB），距离下限 0.1 m。
    pub fn path_loss_db(&self, a: NodeId, b: NodeId) -> f64 {
        let d = self.position(a).distance(&self.position(b)).max(0.1);
        20.0 * (4.0 * PI * d * CARRIER_HZ / SPEED_OF_LIGHT).log10()
    }

    pub fn noise_floor_dbm(&self) -> f64 {
        -174.0 + 10.0 * BANDWIDTH_HZ.log10() + self.cfg.noise_figure_db
    }

    /// 双方都使用最佳扇区时 `tx -> rx` 的 SNR（dB）。
    pub fn link_snr_db(&self, tx: NodeId, tx_sectors: u8, rx: NodeId, rx_sectors: u8, now: SimTime) -> f64 {
        let tx_sector = self.best_sector(tx, rx, tx_sectors);
        let rx_sector = self.best_sector(rx, tx, rx_sectors);
        let gain = self.sector_gain_db(tx, rx, tx_sector, tx_sectors)
            + self.sector_gain_db(rx, tx, rx_sector, rx_sectors);
        let trace = f64::from(self.current_trace_index(now));
        let fading = TRACE_FADING_DB * (0.7 * trace + 0.3 * (tx.0 + rx.0) as f64).sin();
        self.cfg.tx_power_dbm + gain - self.path_loss_db(tx, rx) - self.noise_floor_dbm() + fading
    }
}
