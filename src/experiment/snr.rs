//! 链路质量（SNR）记录
//!
//! 每个成功接收的帧：数据帧只在开启数据 SNR 上报时记录，波束训练控制帧
//! （DMG 信标、SSW、SSW-FBCK、SSW-ACK）总是记录。不做聚合。

use std::fmt;

use super::output::OutputStream;
use crate::error::QdError;
use crate::sim::SimTime;
use crate::wifi::{MacAddress, MacRxOk};

pub const SNR_HEADER: &str = "TIME,SRC,DST,SNR";

#[derive(Debug, Clone, PartialEq)]
pub struct SnrRecord {
    pub timestamp: SimTime,
    pub peer: MacAddress,
    pub self_addr: MacAddress,
    pub snr_db: f64,
}

impl fmt::Display for SnrRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.timestamp.as_nanos(),
            self.peer,
            self.self_addr,
            self.snr_db
        )
    }
}

#[derive(Debug)]
pub struct LinkQualityRecorder {
    out: OutputStream,
    report_data: bool,
}

impl LinkQualityRecorder {
    pub fn new(mut out: OutputStream, report_data: bool) -> Result<Self, QdError> {
        out.write_line(SNR_HEADER)?;
        Ok(Self { out, report_data })
    }

    pub fn records(&self) -> u64 {
        self.out.lines().saturating_sub(1)
    }

    pub fn on_mac_rx_ok(&mut self, ev: &MacRxOk, now: SimTime) -> Result<Option<SnrRecord>, QdError> {
        let wanted = (ev.kind.is_data() && self.report_data) || ev.kind.is_beamforming_control();
        if !wanted {
            return Ok(None);
        }
        let record = SnrRecord {
            timestamp: now,
            peer: ev.peer,
            self_addr: ev.self_addr,
            snr_db: ev.snr_db,
        };
        self.out.write_line(&record)?;
        Ok(Some(record))
    }

    pub fn flush(&mut self) -> Result<(), QdError> {
        self.out.flush()
    }
}
