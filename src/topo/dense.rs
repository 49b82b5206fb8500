//! 单 AP 密集场景
//!
//! 房间中央一个 DMG AP，N 个 DMG STA 均匀分布在以 AP 为圆心的圆周上，
//! 每个 STA 各有一条发往 AP 的流量（STA 关联后才开始发送）。
//!
//! ```text
//!            STA(1)
//!     STA(n)        STA(2)
//!             AP
//!     STA(..)       STA(3)
//!            STA(..)
//! ```

use std::f64::consts::PI;

use crate::error::QdError;
use crate::experiment::{
    AddressRegistry, Experiment, ExperimentConfig, ExperimentOutputs, PairRegistry, RunSummary,
    SampleThroughput,
};
use crate::sim::{Scenario, SimTime, Simulator};
use crate::wifi::{
    BeaconIntervalStart, Blockage, MacParams, NodeId, Position, QdChannel, QdChannelConfig,
    QdWorld, WifiNetwork,
};
use tracing::info;

/// 设备离地高度（米）
const DEVICE_HEIGHT_M: f64 = 1.5;

/// 第 `k` 个 STA（从 0 开始）的位置。
pub fn sta_position(k: usize, num_stas: usize, radius_m: f64) -> Position {
    let angle = PI / 2.0 + 2.0 * PI * k as f64 / num_stas.max(1) as f64;
    Position::new(radius_m * angle.cos(), radius_m * angle.sin(), DEVICE_HEIGHT_M)
}

/// 建好、待运行的场景
pub struct DenseScenario {
    pub sim: Simulator,
    pub world: QdWorld,
    pub ap: NodeId,
    pub stas: Vec<NodeId>,
    simulation_time: SimTime,
    stop_at: SimTime,
}

pub fn build_dense_scenario(scenario: &Scenario, outputs: ExperimentOutputs) -> Result<DenseScenario, QdError> {
    let channel = QdChannel::new(QdChannelConfig {
        num_traces: scenario.num_traces,
        trace_period: scenario.trace_period,
        tx_power_dbm: scenario.tx_power_dbm,
        ..QdChannelConfig::default()
    });
    let mac = MacParams {
        beacon_interval: scenario.beacon_interval,
        ..MacParams::default()
    };
    let mut net = WifiNetwork::new(channel, scenario.phy, mac);

    let ap = net.add_ap(Position::new(0.0, 0.0, DEVICE_HEIGHT_M), scenario.ap_sectors);
    let n = usize::from(scenario.num_stas);
    let stas = (0..n)
        .map(|k| net.add_sta(sta_position(k, n, scenario.radius_m), scenario.sta_sectors))
        .collect::<Result<Vec<_>, _>>()?;

    for &(sta, from, to) in &scenario.blockages {
        let node = stas[usize::from(sta) - 1];
        net.add_blockage(Blockage { node, from, to });
    }

    let mut addresses = AddressRegistry::builder();
    for dev in net.devices() {
        addresses.register(dev.addr, dev.node)?;
    }

    // STA -> AP，每条流一个独立的 sink
    let ap_addr = net.device(ap).addr;
    let mut pairs = PairRegistry::default();
    for &sta in &stas {
        let sink = net.apps.install_sink(ap);
        let sender = net.apps.install_sender(sta, ap, sink, scenario.sender.clone());
        pairs.register(sta, sender, sink, net.device(sta).addr, ap_addr)?;
    }

    let cfg = ExperimentConfig {
        bi_threshold: scenario.bi_threshold,
        csv: scenario.csv,
        report_data_snr: scenario.report_data_snr,
        sample_period: scenario.sample_period,
    };
    let mut exp = Experiment::new(cfg, addresses.build(), pairs, outputs)?;
    for &sta in &stas {
        exp.retraining_mut().register(net.device(sta).addr);
    }

    let mut world = QdWorld::new(net, exp);
    world.subscribe_sls(ap);
    for &sta in &stas {
        world.subscribe_sls(sta);
    }

    let mut sim = Simulator::default();
    sim.schedule(SimTime::ZERO, BeaconIntervalStart { index: 0 });
    sim.schedule(
        scenario.sample_period,
        SampleThroughput {
            period: scenario.sample_period,
        },
    );

    info!(
        stas = n,
        app = ?scenario.sender.kind,
        rate = %scenario.sender.rate,
        socket = ?scenario.socket,
        tcp_variant = scenario.tcp_variant.name(),
        mcs = scenario.phy.mcs(),
        "🏗️  密集场景已建立"
    );

    Ok(DenseScenario {
        sim,
        world,
        ap,
        stas,
        simulation_time: scenario.simulation_time,
        stop_at: scenario.stop_time(),
    })
}

impl DenseScenario {
    /// 运行到停止时刻，写出结束报告并返回统计汇总。
    pub fn run(mut self) -> Result<RunSummary, QdError> {
        self.sim.run_until(self.stop_at, &mut self.world);
        if let Some(err) = self.world.take_fatal() {
            return Err(err);
        }
        let mut summary = self.world.exp.summary(&self.world.net, self.simulation_time);
        summary.events_executed = self.sim.executed();
        self.world.exp.finish(&summary)?;
        Ok(summary)
    }
}
