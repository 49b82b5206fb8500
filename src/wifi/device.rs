//! DMG 设备（一个节点上的一块无线网卡）

use super::beamforming::{AntennaId, StationRole};
use super::id::{Aid, NodeId};
use super::mac_address::MacAddress;

#[derive(Debug, Clone)]
pub struct WifiDevice {
    pub node: NodeId,
    pub addr: MacAddress,
    pub role: StationRole,
    /// 码本扇区数
    pub sectors: u8,
    pub antenna: AntennaId,
    /// 所属 BSS（AP 的 MAC 地址；AP 自己的 bssid 就是自己）
    pub bssid: MacAddress,
    aid: Option<Aid>,
}

impl WifiDevice {
    pub fn new(node: NodeId, addr: MacAddress, role: StationRole, sectors: u8, bssid: MacAddress) -> Self {
        Self {
            node,
            addr,
            role,
            sectors,
            antenna: AntennaId(1),
            bssid,
            aid: None,
        }
    }

    pub fn is_associated(&self) -> bool {
        self.aid.is_some()
    }

    pub fn aid(&self) -> Option<Aid> {
        self.aid
    }

    pub(crate) fn set_aid(&mut self, aid: Option<Aid>) {
        self.aid = aid;
    }
}
