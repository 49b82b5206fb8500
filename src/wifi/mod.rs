//! DMG（IEEE 802.11ad）网络模型
//!
//! 测量层之外的一切：设备、信道、流量应用以及产生链路层事件的 MAC 时序。

mod app;
mod beamforming;
mod channel;
mod data_path;
mod device;
mod dmg;
mod frame;
mod id;
mod mac_address;
mod network;
mod phy;
mod trace;
mod world;

pub use app::{
    AppCounters, AppKind, Applications, DataRate, MAX_PACKET_BYTES, PacketSink, SenderConfig,
    SocketKind, TcpVariant, TrafficSender,
};
pub use beamforming::{AntennaId, BeamformingDirection, ChannelAccessPeriod, SectorId, StationRole};
pub use channel::{Position, QdChannel, QdChannelConfig};
pub use data_path::{DeliverFrame, SourceTick};
pub use device::WifiDevice;
pub use dmg::{AssociationComplete, BeaconIntervalStart, CbapTxss, DtiStart, SlsDone};
pub use frame::FrameKind;
pub use id::{Aid, NodeId, ReceiverId, SenderId};
pub use mac_address::MacAddress;
pub use network::{Blockage, MacParams, WifiNetwork};
pub use phy::PhyMode;
pub use trace::{
    Associated, BeamformingControl, Deassociated, DtiStarted, LinkEvent, MacRxOk, SlsCompleted,
    SlsContext, TraceIndexSource, TrafficHandles,
};
pub use world::QdWorld;
