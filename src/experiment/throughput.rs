//! 吞吐量采样
//!
//! 每个采样周期读取各接收端的累计字节数，计算本周期每个通信对的瞬时吞吐量
//! 和总吞吐量，输出一行。`SampleThroughput` 事件执行后把自己重新放回队列，
//! 直到仿真停止。

use std::fmt;

use super::pairs::PairRegistry;
use crate::error::QdError;
use crate::sim::{Event, SimTime, Simulator, World};
use crate::wifi::{QdWorld, TrafficHandles};
use tracing::trace;

/// 列宽（人类可读模式）
pub const COLUMN_WIDTH: usize = 12;

/// 吞吐量数值的有效数字位数
const SIGNIFICANT_DIGITS: usize = 6;

/// 按 6 位有效数字格式化 Mbps 值，去掉末尾多余的 0（`899.96096` -> `899.961`，`100.0` -> `100`）。
/// 过大或过小的数值使用科学计数法。
pub fn format_mbps(v: f64) -> String {
    if !v.is_finite() {
        return v.to_string();
    }
    if v == 0.0 {
        return "0".to_string();
    }
    let sci = format!("{:.*e}", SIGNIFICANT_DIGITS - 1, v);
    let exp: i32 = sci
        .split_once('e')
        .and_then(|(_, e)| e.parse().ok())
        .unwrap_or(0);
    if exp < -4 || exp >= SIGNIFICANT_DIGITS as i32 {
        return sci;
    }
    let decimals = (SIGNIFICANT_DIGITS as i32 - 1 - exp).max(0) as usize;
    let fixed = format!("{v:.decimals$}");
    if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        fixed
    }
}

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThroughputFormat {
    /// 定宽列：`"0.0 - 0.1"  pair1  pair2 ... total`
    Human,
    /// 逗号分隔：`0.1,pair1,pair2,...,total`
    Csv,
}

/// 一次采样的结果
#[derive(Debug, Clone, PartialEq)]
pub struct ThroughputRow {
    pub window_start: SimTime,
    pub time: SimTime,
    /// 每个通信对的瞬时吞吐量（Mbps），按注册顺序
    pub per_pair: Vec<f64>,
    pub total: f64,
}

impl ThroughputRow {
    pub fn render(&self, format: ThroughputFormat) -> String {
        match format {
            ThroughputFormat::Human => {
                let window = format!(
                    "{:.1} - {:.1}",
                    self.window_start.as_secs_f64(),
                    self.time.as_secs_f64()
                );
                let mut line = format!("{window:<COLUMN_WIDTH$}");
                for thr in &self.per_pair {
                    line.push_str(&format!("{:<COLUMN_WIDTH$}", format_mbps(*thr)));
                }
                line.push_str(&format!("{:<COLUMN_WIDTH$}", format_mbps(self.total)));
                line
            }
            ThroughputFormat::Csv => {
                let mut line = format!("{:.1}", self.time.as_secs_f64());
                for thr in &self.per_pair {
                    line.push_str(&format!(",{}", format_mbps(*thr)));
                }
                line.push_str(&format!(",{}", format_mbps(self.total)));
                line
            }
        }
    }
}

impl fmt::Display for ThroughputRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(ThroughputFormat::Csv))
    }
}

/// 人类可读模式的表头（两行）。
pub fn human_header(pairs: usize) -> [String; 2] {
    let mut cols = format!("{:<COLUMN_WIDTH$}", "Time [s]");
    for i in 0..pairs {
        cols.push_str(&format!("{:<COLUMN_WIDTH$}", format!("Pair ({})", i + 1)));
    }
    cols.push_str(&format!("{:<COLUMN_WIDTH$}", "Total"));
    [
        "Application Layer Throughput per Communicating Pair [Mbps]".to_string(),
        cols,
    ]
}

#[derive(Debug)]
pub struct ThroughputSampler {
    period: SimTime,
    format: ThroughputFormat,
    rows: u64,
}

impl ThroughputSampler {
    pub fn new(period: SimTime, format: ThroughputFormat) -> Self {
        Self {
            period,
            format,
            rows: 0,
        }
    }

    pub fn period(&self) -> SimTime {
        self.period
    }

    pub fn format(&self) -> ThroughputFormat {
        self.format
    }

    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// 字节增量换算成 Mbps 的除数：周期的微秒数（bit/µs 即 Mbit/s）。
    pub fn scale(&self) -> f64 {
        (self.period.as_nanos() as f64 / 1_000.0).max(f64::MIN_POSITIVE)
    }

    /// 对所有通信对做一次采样。
    pub fn sample<H: TrafficHandles + ?Sized>(
        &mut self,
        now: SimTime,
        pairs: &mut PairRegistry,
        handles: &H,
    ) -> Result<ThroughputRow, QdError> {
        let scale = self.scale();
        let mut per_pair = Vec::with_capacity(pairs.len());
        for (idx, pair) in pairs.iter_mut().enumerate() {
            let delta = pair.observe_total_rx(idx, handles.total_rx(pair.receiver))?;
            let mbps = delta as f64 * 8.0 / scale;
            pair.accumulate(mbps);
            per_pair.push(mbps);
        }
        let total = per_pair.iter().sum();
        self.rows += 1;
        trace!(now = ?now, total, "吞吐量采样");
        Ok(ThroughputRow {
            window_start: now.saturating_sub(self.period),
            time: now,
            per_pair,
            total,
        })
    }
}

/// 周期性采样事件
#[derive(Debug)]
pub struct SampleThroughput {
    pub period: SimTime,
}

impl Event for SampleThroughput {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let w = world
            .as_any_mut()
            .downcast_mut::<QdWorld>()
            .expect("world must be QdWorld");
        w.sample_throughput(sim);
        if !w.halted() {
            sim.schedule_in(self.period, *self);
        }
    }
}
