use super::support::{Buffers, mac};
use crate::error::QdError;
use crate::experiment::{PairState, SLS_HEADER, SNR_HEADER};
use crate::sim::{BlockageSpec, Scenario, ScenarioSpec, SimTime};
use crate::topo::dense::build_dense_scenario;
use crate::wifi::{
    AntennaId, BeamformingDirection, ChannelAccessPeriod, LinkEvent, NodeId, SectorId, SenderId,
    SlsCompleted, SlsContext, StationRole,
};

fn scenario(num_stas: u16, secs: f64, csv: bool) -> ScenarioSpec {
    let mut spec = ScenarioSpec::default();
    spec.num_stas = num_stas;
    spec.simulation_time_s = secs;
    spec.application.data_rate = "10Mbps".to_string();
    spec.output.csv = csv;
    spec.output.report_data_snr = false;
    spec
}

fn resolve(spec: &ScenarioSpec) -> Scenario {
    spec.resolve().expect("valid scenario")
}

fn csv_fields(line: &str) -> Vec<f64> {
    line.split(',').map(|v| v.parse::<f64>().expect("number")).collect()
}

#[test]
fn three_stations_for_one_second_give_eleven_rows() {
    let buffers = Buffers::default();
    let sc = resolve(&scenario(3, 1.0, true));
    let summary = build_dense_scenario(&sc, buffers.outputs())
        .expect("build")
        .run()
        .expect("run");

    let rows = buffers.console.lines();
    assert_eq!(rows.len(), 11);
    assert_eq!(summary.throughput_rows, 11);
    for (i, row) in rows.iter().enumerate() {
        let fields = csv_fields(row);
        assert_eq!(fields.len(), 5, "row {i}: {row}");
        assert!((fields[0] - 0.1 * (i + 1) as f64).abs() < 1e-9);
        // 各列按 6 位有效数字输出
        let sum: f64 = fields[1..4].iter().sum();
        assert!((fields[4] - sum).abs() < 1e-3, "row {i}: {row}");
        for thr in &fields[1..4] {
            match i {
                0 => assert!(*thr > 0.0, "row {i}: {row}"),
                // 发送端在 1.0 s 停止，最后一行至多是一个在途包
                10 => assert!(*thr < 0.2, "row {i}: {row}"),
                _ => assert!((9.0..11.0).contains(thr), "row {i}: {row}"),
            }
        }
    }

    // 每个 STA：BI 0 的 A-BFT 一次，第 10 个 BI 的 CBAP TxSS 一次，双方各一行
    assert_eq!(summary.retraining_rounds, 3);
    assert_eq!(summary.sls_records, 12);
    let sls = buffers.sls.lines();
    assert_eq!(sls.len(), 13);
    assert_eq!(sls[0], SLS_HEADER);
    let first: Vec<&str> = sls[1].split(',').collect();
    assert_eq!(first[0], "1");
    assert_eq!(first[1], "2");
    assert_eq!(first[2], "0");
    assert_eq!(&first[4..], &["1", "1", "1", "1050000"]);
    let second: Vec<&str> = sls[2].split(',').collect();
    assert_eq!(&second[..3], &["2", "1", "0"]);
    assert_eq!(&second[4..], &["1", "0", "1", "1050000"]);

    let snr = buffers.snr.lines();
    assert_eq!(snr[0], SNR_HEADER);
    assert_eq!(snr.len() as u64, summary.snr_records + 1);

    assert_eq!(summary.links.len(), 3);
    for link in &summary.links {
        assert_eq!(link.activations, 1);
        assert!(link.rx_bytes > 0);
        assert!(link.tx_bytes >= link.rx_bytes);
        assert_eq!(link.dst, mac(1));
    }
}

#[test]
fn senders_stop_at_the_simulation_time() {
    let buffers = Buffers::default();
    let sc = resolve(&scenario(1, 1.0, true));
    let summary = build_dense_scenario(&sc, buffers.outputs())
        .expect("build")
        .run()
        .expect("run");

    let link = &summary.links[0];
    // 10 Mbps 的 on-off 发送端；离散发包最多多出一个包
    assert!(link.app_throughput_mbps <= 10.0 + 0.02, "{}", link.app_throughput_mbps);
    assert!(link.app_throughput_mbps > 9.5, "{}", link.app_throughput_mbps);
    let packets_until_stop = (1_000_000_000u64 - 2_850_000).div_ceil(1_158_400);
    assert_eq!(link.tx_packets, packets_until_stop);
    assert_eq!(link.rx_packets, link.tx_packets);
}

#[test]
fn byte_budget_ends_the_flow_without_an_extra_stop() {
    let mut spec = scenario(1, 1.0, true);
    spec.application.max_bytes = 1448 * 5;
    spec.blockages.push(BlockageSpec {
        sta: 1,
        from_ms: 250,
        to_ms: 450,
    });
    let sc = resolve(&spec);
    let mut dense = build_dense_scenario(&sc, Buffers::default().outputs()).expect("build");
    dense.sim.run_until(sc.stop_time(), &mut dense.world);

    let sender = dense.world.net.apps.sender(SenderId(0));
    assert_eq!(sender.counters().packets, 5);
    assert!(!sender.is_running());
    // 两次关联各启动一次，只有中间的去关联算一次停止
    assert_eq!(sender.start_stop_calls(), (2, 1));
    let pair = dense.world.exp.pairs().get(dense.stas[0]).expect("pair");
    assert_eq!(pair.activations(), 2);
}

#[test]
fn blockage_deassociates_and_reassociation_restarts_traffic() {
    let buffers = Buffers::default();
    let mut spec = scenario(2, 1.0, false);
    spec.blockages.push(BlockageSpec {
        sta: 1,
        from_ms: 250,
        to_ms: 450,
    });
    let sc = resolve(&spec);
    let mut dense = build_dense_scenario(&sc, buffers.outputs()).expect("build");
    dense.sim.run_until(sc.stop_time(), &mut dense.world);
    assert!(dense.world.fatal().is_none());

    let sta = dense.stas[0];
    let pair = dense.world.exp.pairs().get(sta).expect("pair");
    assert_eq!(pair.state(), PairState::Active);
    assert_eq!(pair.activations(), 2);
    // BI 5 (512 ms) 的 A-BFT 第一个时隙，DTI 开始后 50 µs 完成关联
    assert_eq!(pair.start_time(), Some(SimTime::from_micros(514_850)));
    assert_eq!(dense.world.net.apps.sender(SenderId(0)).start_stop_calls(), (2, 1));
    assert!(dense.world.net.device(sta).is_associated());

    let other = dense.world.exp.pairs().get(dense.stas[1]).expect("pair");
    assert_eq!(other.activations(), 1);

    let console = buffers.console.lines();
    assert!(console.contains(&"DMG STA 00:00:00:00:00:02 deassociated from DMG PCP/AP 00:00:00:00:00:01".to_string()));
    let associations = console
        .iter()
        .filter(|l| l.starts_with("DMG STA 00:00:00:00:00:02 associated with"))
        .count();
    assert_eq!(associations, 2);

    let pair1 = |window: &str| -> f64 {
        let row = console
            .iter()
            .find(|l| l.starts_with(window))
            .unwrap_or_else(|| panic!("no row for {window}"));
        row.split_whitespace().nth(3).expect("pair 1").parse().expect("number")
    };
    assert!(pair1("0.1 - 0.2") > 0.0);
    assert!(pair1("0.2 - 0.3") > 0.0);
    assert_eq!(pair1("0.3 - 0.4"), 0.0);
    assert_eq!(pair1("0.4 - 0.5"), 0.0);
    assert!(pair1("0.6 - 0.7") > 0.0);
}

#[test]
fn abft_trains_at_most_eight_stations_per_beacon_interval() {
    let sc = resolve(&scenario(10, 0.5, true));
    let mut dense = build_dense_scenario(&sc, Buffers::default().outputs()).expect("build");
    dense.sim.run_until(SimTime::from_millis(200), &mut dense.world);

    let bi = SimTime::from_micros(102_400);
    let starts: Vec<SimTime> = dense
        .world
        .exp
        .pairs()
        .iter()
        .map(|p| p.start_time().expect("associated"))
        .collect();
    assert_eq!(starts.len(), 10);
    assert!(starts[..8].iter().all(|t| *t < bi));
    assert!(starts[8..].iter().all(|t| *t > bi));
    assert!(dense.stas.iter().all(|&s| dense.world.net.device(s).is_associated()));
}

#[test]
fn human_run_ends_with_statistics() {
    let buffers = Buffers::default();
    let sc = resolve(&scenario(1, 0.5, false));
    let summary = build_dense_scenario(&sc, buffers.outputs())
        .expect("build")
        .run()
        .expect("run");

    let console = buffers.console.lines();
    assert_eq!(console[0], "Application Layer Throughput per Communicating Pair [Mbps]");
    assert!(console.contains(&"Flow 1 (00:00:00:00:00:02 -> 00:00:00:00:00:01)".to_string()));
    assert!(console.contains(&"Application Layer Statistics:".to_string()));
    assert!(console.contains(&"Communication Link (1) Statistics:".to_string()));
    assert_eq!(summary.total_rx_bytes(), summary.links[0].rx_bytes);
    assert!(summary.events_executed > 0);
    assert!(summary.links[0].app_throughput_mbps > 0.0);
    assert_eq!(summary.links[0].activations, 1);
}

#[test]
fn data_snr_reporting_adds_rows() {
    let run = |report: bool| {
        let buffers = Buffers::default();
        let mut spec = scenario(1, 0.3, true);
        spec.output.report_data_snr = report;
        build_dense_scenario(&resolve(&spec), buffers.outputs())
            .expect("build")
            .run()
            .expect("run")
            .snr_records
    };
    let without = run(false);
    let with = run(true);
    assert!(without > 0);
    assert!(with > without + 200);
}

#[test]
fn fatal_handler_error_aborts_the_run() {
    let sc = resolve(&scenario(2, 1.0, true));
    let mut dense = build_dense_scenario(&sc, Buffers::default().outputs()).expect("build");
    let ev = SlsCompleted {
        ctx: SlsContext {
            src_node: NodeId(1),
            role: StationRole::Sta,
            bssid: mac(1),
        },
        peer: mac(99),
        access_period: ChannelAccessPeriod::Dti,
        direction: BeamformingDirection::Initiator,
        initiator_txss: true,
        responder_txss: true,
        sector: SectorId(1),
        antenna: AntennaId(1),
    };
    dense.world.dispatch(LinkEvent::SlsCompleted(ev), &mut dense.sim);
    assert!(matches!(dense.world.fatal(), Some(QdError::UnknownAddress(_))));

    let err = dense.run().expect_err("run must fail");
    assert!(matches!(err, QdError::UnknownAddress(a) if a == mac(99)));
}
