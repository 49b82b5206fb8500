//! 实验编排与测量层
//!
//! 响应链路层事件（关联、去关联、SLS 完成、DTI 开始、成功收帧）驱动流量和
//! 重新训练，并周期性地记录吞吐量、波束训练结果与 SNR。
//!
//! 所有状态都由 `Experiment` 持有，处理器通过 `&mut self` 访问，
//! 事件循环是唯一的写者。

mod address;
mod association;
mod output;
mod pairs;
mod retrain;
mod sls;
mod snr;
mod summary;
mod throughput;

pub use address::{AddressRegistry, AddressRegistryBuilder};
pub use association::AssociationController;
pub use output::OutputStream;
pub use pairs::{CommunicationPair, PairRegistry, PairState};
pub use retrain::RetrainingTrigger;
pub use sls::{BeamTrainingRecorder, SLS_HEADER, SlsRecord, VISUALIZER_ID_OFFSET};
pub use snr::{LinkQualityRecorder, SNR_HEADER, SnrRecord};
pub use summary::{LinkSummary, RunSummary};
pub use throughput::{
    COLUMN_WIDTH, SampleThroughput, ThroughputFormat, ThroughputRow, ThroughputSampler,
    format_mbps, human_header,
};

use crate::error::QdError;
use crate::sim::{SimTime, Simulator};
use crate::wifi::{
    Associated, BeamformingControl, Deassociated, DtiStarted, LinkEvent, MacRxOk, SlsCompleted,
    TraceIndexSource, TrafficHandles,
};
use summary::{active_seconds, mbps};

#[derive(Debug, Clone)]
pub struct ExperimentConfig {
    /// 两次强制重新训练之间的信标间隔数
    pub bi_threshold: u16,
    /// 紧凑（CSV）输出；同时关闭控制台上的事件说明
    pub csv: bool,
    /// 是否记录数据帧的 SNR
    pub report_data_snr: bool,
    pub sample_period: SimTime,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            bi_threshold: 10,
            csv: false,
            report_data_snr: true,
            sample_period: SimTime::from_millis(100),
        }
    }
}

/// 测量层的三路输出
pub struct ExperimentOutputs {
    /// 吞吐量表格、事件说明与结束报告
    pub console: OutputStream,
    pub sls: OutputStream,
    pub snr: OutputStream,
}

impl ExperimentOutputs {
    pub fn discard() -> Self {
        Self {
            console: OutputStream::discard(),
            sls: OutputStream::discard(),
            snr: OutputStream::discard(),
        }
    }
}

pub struct Experiment {
    cfg: ExperimentConfig,
    addresses: AddressRegistry,
    pairs: PairRegistry,
    sampler: ThroughputSampler,
    association: AssociationController,
    retraining: RetrainingTrigger,
    sls: BeamTrainingRecorder,
    snr: LinkQualityRecorder,
    console: OutputStream,
}

impl Experiment {
    /// 创建测量层并写出各输出的表头。
    pub fn new(
        cfg: ExperimentConfig,
        addresses: AddressRegistry,
        pairs: PairRegistry,
        outputs: ExperimentOutputs,
    ) -> Result<Self, QdError> {
        let ExperimentOutputs { mut console, sls, snr } = outputs;
        let format = if cfg.csv {
            ThroughputFormat::Csv
        } else {
            for line in human_header(pairs.len()) {
                console.write_line(line)?;
            }
            ThroughputFormat::Human
        };
        Ok(Self {
            sampler: ThroughputSampler::new(cfg.sample_period, format),
            association: AssociationController::new(!cfg.csv),
            retraining: RetrainingTrigger::new(cfg.bi_threshold),
            sls: BeamTrainingRecorder::new(sls, !cfg.csv)?,
            snr: LinkQualityRecorder::new(snr, cfg.report_data_snr)?,
            cfg,
            addresses,
            pairs,
            console,
        })
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.cfg
    }

    pub fn addresses(&self) -> &AddressRegistry {
        &self.addresses
    }

    pub fn pairs(&self) -> &PairRegistry {
        &self.pairs
    }

    pub fn retraining(&self) -> &RetrainingTrigger {
        &self.retraining
    }

    pub fn retraining_mut(&mut self) -> &mut RetrainingTrigger {
        &mut self.retraining
    }

    pub fn sample_period(&self) -> SimTime {
        self.sampler.period()
    }

    /// 按事件类型分发。
    pub fn handle<N>(&mut self, ev: LinkEvent, net: &mut N, sim: &mut Simulator) -> Result<(), QdError>
    where
        N: TrafficHandles + BeamformingControl + TraceIndexSource,
    {
        match ev {
            LinkEvent::Associated(ev) => self.on_associated(&ev, net, sim),
            LinkEvent::Deassociated(ev) => self.on_deassociated(&ev, net),
            LinkEvent::SlsCompleted(ev) => self.on_sls_completed(&ev, net, sim.now()).map(|_| ()),
            LinkEvent::DtiStarted(ev) => self.on_dti_started(&ev, net, sim).map(|_| ()),
            LinkEvent::MacRxOk(ev) => self.on_mac_rx_ok(&ev, sim.now()).map(|_| ()),
        }
    }

    pub fn on_associated<H: TrafficHandles + ?Sized>(
        &mut self,
        ev: &Associated,
        handles: &mut H,
        sim: &mut Simulator,
    ) -> Result<(), QdError> {
        self.association
            .on_associated(ev, &mut self.pairs, handles, sim, &mut self.console)
    }

    pub fn on_deassociated<H: TrafficHandles + ?Sized>(
        &mut self,
        ev: &Deassociated,
        handles: &mut H,
    ) -> Result<(), QdError> {
        self.association
            .on_deassociated(ev, &mut self.pairs, handles, &mut self.console)
    }

    pub fn on_dti_started<B: BeamformingControl + ?Sized>(
        &mut self,
        ev: &DtiStarted,
        control: &mut B,
        sim: &mut Simulator,
    ) -> Result<bool, QdError> {
        self.retraining.on_dti_started(ev, control, sim)
    }

    pub fn on_sls_completed<T: TraceIndexSource + ?Sized>(
        &mut self,
        ev: &SlsCompleted,
        channel: &T,
        now: SimTime,
    ) -> Result<SlsRecord, QdError> {
        let trace_index = channel.current_trace_index(now);
        self.sls
            .on_sls_completed(ev, &self.addresses, trace_index, now, &mut self.console)
    }

    pub fn on_mac_rx_ok(&mut self, ev: &MacRxOk, now: SimTime) -> Result<Option<SnrRecord>, QdError> {
        self.snr.on_mac_rx_ok(ev, now)
    }

    /// 采样一次吞吐量并写出一行。
    pub fn sample_throughput<H: TrafficHandles + ?Sized>(
        &mut self,
        now: SimTime,
        handles: &H,
    ) -> Result<ThroughputRow, QdError> {
        let row = self.sampler.sample(now, &mut self.pairs, handles)?;
        self.console.write_line(row.render(self.sampler.format()))?;
        Ok(row)
    }

    /// 汇总统计；`simulation_time` 为配置的仿真时长。
    pub fn summary<H: TrafficHandles + ?Sized>(&self, handles: &H, simulation_time: SimTime) -> RunSummary {
        let window = simulation_time.saturating_sub(self.sampler.period()).as_secs_f64();
        let links = self
            .pairs
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let tx = handles.sender_counters(p.sender);
                let rx = handles.receiver_counters(p.receiver);
                let app_secs = active_seconds(p.start_time(), simulation_time);
                LinkSummary {
                    link: i + 1,
                    src: p.src_addr,
                    dst: p.dst_addr,
                    tx_packets: tx.packets,
                    tx_bytes: tx.bytes,
                    rx_packets: rx.packets,
                    rx_bytes: rx.bytes,
                    offered_mbps: mbps(tx.bytes, window),
                    flow_throughput_mbps: mbps(rx.bytes, window),
                    app_throughput_mbps: app_secs.map_or(0.0, |s| mbps(rx.bytes, s)),
                    mean_sampled_mbps: p.mean_sampled_mbps(),
                    activations: p.activations(),
                    last_start_s: p.start_time().map(SimTime::as_secs_f64),
                }
            })
            .collect();
        RunSummary {
            simulation_time_s: simulation_time.as_secs_f64(),
            sample_period_ms: self.sampler.period().as_nanos() as f64 / 1e6,
            throughput_rows: self.sampler.rows(),
            sls_records: self.sls.records(),
            snr_records: self.snr.records(),
            retraining_rounds: self.retraining.fired(),
            events_executed: 0,
            links,
        }
    }

    /// 写出结束报告（人类可读模式）并 flush 所有输出。
    pub fn finish(&mut self, summary: &RunSummary) -> Result<(), QdError> {
        if !self.cfg.csv {
            for line in summary.render_human() {
                self.console.write_line(line)?;
            }
        }
        self.console.flush()?;
        self.sls.flush()?;
        self.snr.flush()
    }
}
