//! DMG 网络
//!
//! 持有设备表、信道、应用和 MAC 时序参数，并实现测量层依赖的三个协作 trait。

use std::collections::HashMap;

use super::app::{AppCounters, Applications};
use super::beamforming::{SectorId, StationRole};
use super::channel::{Position, QdChannel};
use super::data_path::SourceTick;
use super::device::WifiDevice;
use super::dmg::CbapTxss;
use super::id::{Aid, NodeId, ReceiverId, SenderId};
use super::mac_address::MacAddress;
use super::phy::PhyMode;
use super::trace::{Associated, BeamformingControl, Deassociated, TraceIndexSource, TrafficHandles};
use crate::error::QdError;
use crate::sim::{SimTime, Simulator};
use tracing::{debug, trace};

/// DMG MAC 时序参数
#[derive(Debug, Clone)]
pub struct MacParams {
    pub beacon_interval: SimTime,
    /// BTI 时长
    pub bti: SimTime,
    /// 每个 A-BFT 的 SSW 时隙数
    pub abft_slots: u8,
    pub abft_slot: SimTime,
    /// 一个 SSW 帧（含 SBIFS）的时长
    pub ssw_frame: SimTime,
    /// A-BFT 训练成功后完成关联所需的时间（按时隙序号递增）
    pub assoc_delay: SimTime,
    /// CBAP 内发起按需训练前的信道接入时延
    pub cbap_access_delay: SimTime,
}

impl Default for MacParams {
    fn default() -> Self {
        Self {
            beacon_interval: SimTime::from_micros(102_400),
            bti: SimTime::from_micros(800),
            abft_slots: 8,
            abft_slot: SimTime::from_micros(250),
            ssw_frame: SimTime::from_micros(16),
            assoc_delay: SimTime::from_micros(50),
            cbap_access_delay: SimTime::from_micros(20),
        }
    }
}

impl MacParams {
    /// 信标间隔开始到 DTI 开始的时长
    pub fn dti_offset(&self) -> SimTime {
        let abft = SimTime(self.abft_slot.0.saturating_mul(u64::from(self.abft_slots)));
        self.bti.saturating_add(abft)
    }

    pub fn dti_duration(&self) -> SimTime {
        self.beacon_interval.saturating_sub(self.dti_offset())
    }
}

/// 某个 STA 与 AP 之间的链路被遮挡的时间窗 `[from, to)`。
#[derive(Debug, Clone, Copy)]
pub struct Blockage {
    pub node: NodeId,
    pub from: SimTime,
    pub to: SimTime,
}

#[derive(Debug)]
pub struct WifiNetwork {
    devices: Vec<WifiDevice>,
    by_addr: HashMap<MacAddress, NodeId>,
    ap: Option<NodeId>,
    next_aid: u16,
    blockages: Vec<Blockage>,
    pub channel: QdChannel,
    pub apps: Applications,
    pub phy: PhyMode,
    pub mac: MacParams,
}

impl WifiNetwork {
    pub fn new(channel: QdChannel, phy: PhyMode, mac: MacParams) -> Self {
        Self {
            devices: Vec::new(),
            by_addr: HashMap::new(),
            ap: None,
            next_aid: 1,
            blockages: Vec::new(),
            channel,
            apps: Applications::default(),
            phy,
            mac,
        }
    }

    /// 添加一个 DMG AP；必须先于所有 STA 创建。
    pub fn add_ap(&mut self, pos: Position, sectors: u8) -> NodeId {
        let id = NodeId(self.devices.len());
        let addr = MacAddress::allocate(id.0 as u64 + 1);
        self.push_device(WifiDevice::new(id, addr, StationRole::Ap, sectors, addr), pos);
        self.ap = Some(id);
        id
    }

    /// 添加一个 DMG STA，所属 BSS 为已创建的 AP。
    pub fn add_sta(&mut self, pos: Position, sectors: u8) -> Result<NodeId, QdError> {
        let ap = self
            .ap
            .ok_or_else(|| QdError::invalid("topology", "STA created before the AP"))?;
        let bssid = self.devices[ap.0].addr;
        let id = NodeId(self.devices.len());
        let addr = MacAddress::allocate(id.0 as u64 + 1);
        self.push_device(WifiDevice::new(id, addr, StationRole::Sta, sectors, bssid), pos);
        Ok(id)
    }

    fn push_device(&mut self, dev: WifiDevice, pos: Position) {
        self.channel.place(dev.node, pos);
        self.by_addr.insert(dev.addr, dev.node);
        self.devices.push(dev);
    }

    pub fn add_blockage(&mut self, blockage: Blockage) {
        self.blockages.push(blockage);
    }

    pub fn ap(&self) -> Option<NodeId> {
        self.ap
    }

    pub fn devices(&self) -> &[WifiDevice] {
        &self.devices
    }

    pub fn device(&self, node: NodeId) -> &WifiDevice {
        &self.devices[node.0]
    }

    pub fn node_of(&self, addr: MacAddress) -> Option<NodeId> {
        self.by_addr.get(&addr).copied()
    }

    pub fn stas(&self) -> Vec<NodeId> {
        self.devices
            .iter()
            .filter(|d| d.role == StationRole::Sta)
            .map(|d| d.node)
            .collect()
    }

    pub fn is_blocked(&self, node: NodeId, now: SimTime) -> bool {
        self.blockages
            .iter()
            .any(|b| b.node == node && b.from <= now && now < b.to)
    }

    pub fn link_up(&self, a: NodeId, b: NodeId, now: SimTime) -> bool {
        !self.is_blocked(a, now) && !self.is_blocked(b, now)
    }

    pub fn best_sector(&self, from: NodeId, to: NodeId) -> SectorId {
        self.channel.best_sector(from, to, self.devices[from.0].sectors)
    }

    pub fn link_snr_db(&self, tx: NodeId, rx: NodeId, now: SimTime) -> f64 {
        let (ts, rs) = (self.devices[tx.0].sectors, self.devices[rx.0].sectors);
        self.channel.link_snr_db(tx, ts, rx, rs, now)
    }

    /// AP 接纳 STA：分配 AID 并返回关联事件载荷。
    pub(crate) fn associate(&mut self, sta: NodeId) -> Associated {
        let aid = Aid(self.next_aid);
        self.next_aid = self.next_aid.wrapping_add(1).max(1);
        let dev = &mut self.devices[sta.0];
        dev.set_aid(Some(aid));
        debug!(node = %sta, addr = %dev.addr, aid = aid.0, "STA 关联成功");
        Associated {
            node: sta,
            self_addr: dev.addr,
            peer: dev.bssid,
            aid,
        }
    }

    pub(crate) fn deassociate(&mut self, sta: NodeId) -> Deassociated {
        let dev = &mut self.devices[sta.0];
        dev.set_aid(None);
        debug!(node = %sta, addr = %dev.addr, "STA 去关联");
        Deassociated {
            node: sta,
            self_addr: dev.addr,
            peer: dev.bssid,
        }
    }
}

impl TrafficHandles for WifiNetwork {
    fn start_sender(&mut self, sender: SenderId, sim: &mut Simulator) {
        if let Some(generation) = self.apps.start(sender) {
            trace!(sender = sender.0, generation, "发送端启动");
            sim.schedule_in(SimTime::ZERO, SourceTick { sender, generation });
        }
    }

    fn stop_sender(&mut self, sender: SenderId) {
        self.apps.stop(sender);
    }

    fn sender_counters(&self, sender: SenderId) -> AppCounters {
        self.apps.sender(sender).counters()
    }

    fn receiver_counters(&self, receiver: ReceiverId) -> AppCounters {
        self.apps.sink(receiver).counters()
    }
}

impl BeamformingControl for WifiNetwork {
    fn initiate_txss(&mut self, initiator: MacAddress, peer: MacAddress, sim: &mut Simulator) -> Result<(), QdError> {
        let init = self.node_of(initiator).ok_or(QdError::UnknownAddress(initiator))?;
        let resp = self.node_of(peer).ok_or(QdError::UnknownAddress(peer))?;
        debug!(%initiator, %peer, "请求 CBAP TxSS");
        sim.schedule_in(
            self.mac.cbap_access_delay,
            CbapTxss {
                initiator: init,
                responder: resp,
            },
        );
        Ok(())
    }
}

impl TraceIndexSource for WifiNetwork {
    fn current_trace_index(&self, now: SimTime) -> u32 {
        self.channel.current_trace_index(now)
    }
}
