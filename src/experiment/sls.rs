//! 波束训练结果记录
//!
//! 每次 SLS 完成追加一行 `SRC_ID,DST_ID,TRACE_IDX,SECTOR_ID,ANTENNA_ID,ROLE,BSS_ID,Timestamp`，
//! 把训练出的扇区/天线与当时生效的信道快照对应起来。

use std::fmt;

use super::address::AddressRegistry;
use super::output::OutputStream;
use crate::error::QdError;
use crate::sim::SimTime;
use crate::wifi::{AntennaId, NodeId, SectorId, SlsCompleted, StationRole};
use tracing::debug;

pub const SLS_HEADER: &str = "SRC_ID,DST_ID,TRACE_IDX,SECTOR_ID,ANTENNA_ID,ROLE,BSS_ID,Timestamp";

/// 下游可视化工具的节点编号从 1 开始（0 预留），写出时所有节点号加上这个偏移。
pub const VISUALIZER_ID_OFFSET: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlsRecord {
    pub src: NodeId,
    pub peer: NodeId,
    pub trace_index: u32,
    pub sector: SectorId,
    pub antenna: AntennaId,
    pub role: StationRole,
    pub bss: NodeId,
    pub timestamp: SimTime,
}

impl fmt::Display for SlsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{},{},{}",
            self.src.0 + VISUALIZER_ID_OFFSET,
            self.peer.0 + VISUALIZER_ID_OFFSET,
            self.trace_index,
            self.sector,
            self.antenna,
            self.role.code(),
            self.bss.0 + VISUALIZER_ID_OFFSET,
            self.timestamp.as_nanos()
        )
    }
}

#[derive(Debug)]
pub struct BeamTrainingRecorder {
    out: OutputStream,
    echo: bool,
}

impl BeamTrainingRecorder {
    /// 写入表头并返回记录器。
    pub fn new(mut out: OutputStream, echo: bool) -> Result<Self, QdError> {
        out.write_line(SLS_HEADER)?;
        Ok(Self { out, echo })
    }

    /// 已写入的记录数（不含表头）
    pub fn records(&self) -> u64 {
        self.out.lines().saturating_sub(1)
    }

    pub fn on_sls_completed(
        &mut self,
        ev: &SlsCompleted,
        addresses: &AddressRegistry,
        trace_index: u32,
        now: SimTime,
        console: &mut OutputStream,
    ) -> Result<SlsRecord, QdError> {
        let record = SlsRecord {
            src: ev.ctx.src_node,
            peer: addresses.resolve(ev.peer)?,
            trace_index,
            sector: ev.sector,
            antenna: ev.antenna,
            role: ev.ctx.role,
            bss: addresses.resolve(ev.ctx.bssid)?,
            timestamp: now,
        };
        self.out.write_line(&record)?;
        debug!(
            src = %ev.ctx.src_node,
            peer = %ev.peer,
            access = %ev.access_period,
            sector = ev.sector.0,
            trace_index,
            "SLS 完成"
        );
        if self.echo {
            console.write_line(format_args!(
                "DMG STA: {} Address: {} Sector ID: {} Antenna ID: {}",
                ev.ctx.src_node, ev.peer, ev.sector, ev.antenna
            ))?;
        }
        Ok(record)
    }

    pub fn flush(&mut self) -> Result<(), QdError> {
        self.out.flush()
    }
}
