//! 链路层事件端口
//!
//! MAC 调度在关联、去关联、SLS 完成、DTI 开始和成功收帧时，通过这些带类型的
//! 载荷把事件交给测量层；测量层反过来只通过下面三个 trait 操作网络。

use super::app::AppCounters;
use super::beamforming::{AntennaId, BeamformingDirection, ChannelAccessPeriod, SectorId, StationRole};
use super::frame::FrameKind;
use super::id::{Aid, NodeId, ReceiverId, SenderId};
use super::mac_address::MacAddress;
use crate::error::QdError;
use crate::sim::{SimTime, Simulator};

#[derive(Debug, Clone)]
pub struct Associated {
    pub node: NodeId,
    pub self_addr: MacAddress,
    pub peer: MacAddress,
    pub aid: Aid,
}

#[derive(Debug, Clone)]
pub struct Deassociated {
    pub node: NodeId,
    pub self_addr: MacAddress,
    pub peer: MacAddress,
}

/// 订阅 SLS 事件时捕获的设备信息；建网后不再变化。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlsContext {
    pub src_node: NodeId,
    pub role: StationRole,
    pub bssid: MacAddress,
}

#[derive(Debug, Clone)]
pub struct SlsCompleted {
    pub ctx: SlsContext,
    pub peer: MacAddress,
    pub access_period: ChannelAccessPeriod,
    pub direction: BeamformingDirection,
    pub initiator_txss: bool,
    pub responder_txss: bool,
    pub sector: SectorId,
    pub antenna: AntennaId,
}

/// 每个信标间隔的 DTI 开始时发出。
#[derive(Debug, Clone)]
pub struct DtiStarted {
    pub node: NodeId,
    pub address: MacAddress,
    pub bssid: MacAddress,
    pub associated: bool,
    pub duration: SimTime,
}

#[derive(Debug, Clone)]
pub struct MacRxOk {
    pub self_addr: MacAddress,
    pub peer: MacAddress,
    pub kind: FrameKind,
    pub snr_db: f64,
}

#[derive(Debug, Clone)]
pub enum LinkEvent {
    Associated(Associated),
    Deassociated(Deassociated),
    SlsCompleted(SlsCompleted),
    DtiStarted(DtiStarted),
    MacRxOk(MacRxOk),
}

/// 流量应用句柄
pub trait TrafficHandles {
    fn start_sender(&mut self, sender: SenderId, sim: &mut Simulator);
    fn stop_sender(&mut self, sender: SenderId);
    fn sender_counters(&self, sender: SenderId) -> AppCounters;
    fn receiver_counters(&self, receiver: ReceiverId) -> AppCounters;

    fn total_rx(&self, receiver: ReceiverId) -> u64 {
        self.receiver_counters(receiver).bytes
    }
}

/// 请求一次 CBAP 内的按需 TxSS 波束训练
pub trait BeamformingControl {
    fn initiate_txss(&mut self, initiator: MacAddress, peer: MacAddress, sim: &mut Simulator) -> Result<(), QdError>;
}

/// 信道模型：当前生效的快照编号
pub trait TraceIndexSource {
    fn current_trace_index(&self, now: SimTime) -> u32;
}
