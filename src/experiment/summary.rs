//! 仿真结束时的统计汇总

use serde::Serialize;

use super::throughput::format_mbps;
use crate::sim::SimTime;
use crate::wifi::MacAddress;

/// 单个通信对的统计
#[derive(Debug, Clone, Serialize)]
pub struct LinkSummary {
    /// 从 1 开始的链路编号
    pub link: usize,
    pub src: MacAddress,
    pub dst: MacAddress,
    pub tx_packets: u64,
    pub tx_bytes: u64,
    pub rx_packets: u64,
    pub rx_bytes: u64,
    /// 发送负载（整个测量窗口）
    pub offered_mbps: f64,
    /// 接收吞吐量（整个测量窗口）
    pub flow_throughput_mbps: f64,
    /// 接收吞吐量（从最近一次关联开始算）
    pub app_throughput_mbps: f64,
    pub mean_sampled_mbps: f64,
    pub activations: u32,
    pub last_start_s: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub simulation_time_s: f64,
    pub sample_period_ms: f64,
    pub throughput_rows: u64,
    pub sls_records: u64,
    pub snr_records: u64,
    pub retraining_rounds: u64,
    pub events_executed: u64,
    pub links: Vec<LinkSummary>,
}

pub(crate) fn mbps(bytes: u64, seconds: f64) -> f64 {
    if seconds <= 0.0 {
        return 0.0;
    }
    bytes as f64 * 8.0 / (seconds * 1e6)
}

/// 从 `start` 到 `end` 的秒数；未开始或区间为空时返回 None。
pub(crate) fn active_seconds(start: Option<SimTime>, end: SimTime) -> Option<f64> {
    let start = start?;
    (end > start).then(|| end.saturating_sub(start).as_secs_f64())
}

impl RunSummary {
    pub fn total_rx_bytes(&self) -> u64 {
        self.links.iter().map(|l| l.rx_bytes).sum()
    }

    /// 人类可读的结束报告：先是每条流的统计，再是应用层统计。
    pub fn render_human(&self) -> Vec<String> {
        let mut out = Vec::new();
        for l in &self.links {
            out.push(format!("Flow {} ({} -> {})", l.link, l.src, l.dst));
            out.push(format!("  Tx Packets: {}", l.tx_packets));
            out.push(format!("  Tx Bytes:   {}", l.tx_bytes));
            out.push(format!("  TxOffered:  {} Mbps", format_mbps(l.offered_mbps)));
            out.push(format!("  Rx Packets: {}", l.rx_packets));
            out.push(format!("  Rx Bytes:   {}", l.rx_bytes));
            out.push(format!("  Throughput: {} Mbps", format_mbps(l.flow_throughput_mbps)));
        }
        out.push(String::new());
        out.push("Application Layer Statistics:".to_string());
        for l in &self.links {
            out.push(format!("Communication Link ({}) Statistics:", l.link));
            out.push(format!("  Tx Packets: {}", l.tx_packets));
            out.push(format!("  Tx Bytes:   {}", l.tx_bytes));
            out.push(format!("  Rx Packets: {}", l.rx_packets));
            out.push(format!("  Rx Bytes:   {}", l.rx_bytes));
            out.push(format!("  Throughput: {} Mbps", format_mbps(l.app_throughput_mbps)));
        }
        out
    }
}
