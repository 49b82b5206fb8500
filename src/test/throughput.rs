use super::support::{Buffers, FakeNet, csv_config, experiment_with};
use crate::error::QdError;
use crate::experiment::{
    COLUMN_WIDTH, ExperimentConfig, ThroughputFormat, ThroughputRow, ThroughputSampler,
    format_mbps, human_header,
};
use crate::sim::SimTime;

#[test]
fn scale_is_the_period_in_microseconds() {
    let s = ThroughputSampler::new(SimTime::from_millis(100), ThroughputFormat::Csv);
    assert_eq!(s.scale(), 1e5);
    let s = ThroughputSampler::new(SimTime::from_millis(10), ThroughputFormat::Csv);
    assert_eq!(s.scale(), 1e4);
}

#[test]
fn per_pair_throughput_uses_byte_deltas_and_total_is_their_sum() {
    let buffers = Buffers::default();
    let mut exp = experiment_with(csv_config(), 3, &buffers);
    let mut net = FakeNet::default();

    // 100 ms 内 1_250_000 字节 = 100 Mbps
    net.set_rx(0, 1_250_000);
    net.set_rx(1, 625_000);
    let row = exp.sample_throughput(SimTime::from_millis(100), &net).expect("sample");
    assert_eq!(row.per_pair, vec![100.0, 50.0, 0.0]);
    assert_eq!(row.total, row.per_pair.iter().sum::<f64>());

    net.set_rx(0, 1_500_000);
    net.set_rx(2, 12_500);
    let row = exp.sample_throughput(SimTime::from_millis(200), &net).expect("sample");
    assert_eq!(row.per_pair, vec![20.0, 0.0, 1.0]);
    assert_eq!(row.total, 21.0);
    assert_eq!(row.window_start, SimTime::from_millis(100));

    let pair = exp.pairs().iter().next().expect("pair");
    assert_eq!(pair.last_total_rx(), 1_500_000);
    assert_eq!(pair.samples(), 2);
    assert_eq!(pair.mean_sampled_mbps(), 60.0);
}

#[test]
fn csv_rows_are_written_without_header() {
    let buffers = Buffers::default();
    let mut exp = experiment_with(csv_config(), 2, &buffers);
    let mut net = FakeNet::default();
    net.set_rx(0, 1_250_000);
    exp.sample_throughput(SimTime::from_millis(100), &net).expect("sample");
    exp.sample_throughput(SimTime::from_millis(200), &net).expect("sample");

    assert_eq!(buffers.console.lines(), vec!["0.1,100,0,100", "0.2,0,0,0"]);
}

#[test]
fn human_mode_writes_header_then_fixed_width_rows() {
    let buffers = Buffers::default();
    let mut exp = experiment_with(ExperimentConfig::default(), 2, &buffers);
    let mut net = FakeNet::default();
    net.set_rx(1, 125_000);
    exp.sample_throughput(SimTime::from_millis(100), &net).expect("sample");

    let lines = buffers.console.lines();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "Application Layer Throughput per Communicating Pair [Mbps]");
    assert!(lines[1].starts_with("Time [s]    Pair (1)    Pair (2)    Total"));
    assert!(lines[2].starts_with("0.0 - 0.1   0           10          10"));
}

#[test]
fn counter_regression_is_reported() {
    let buffers = Buffers::default();
    let mut exp = experiment_with(csv_config(), 2, &buffers);
    let mut net = FakeNet::default();
    net.set_rx(1, 5_000);
    exp.sample_throughput(SimTime::from_millis(100), &net).expect("sample");

    net.set_rx(1, 4_000);
    let err = exp
        .sample_throughput(SimTime::from_millis(200), &net)
        .expect_err("counter went backwards");
    assert!(matches!(
        err,
        QdError::CounterRegression {
            pair: 1,
            previous: 5_000,
            current: 4_000
        }
    ));
}

#[test]
fn header_has_one_column_per_pair() {
    let [title, cols] = human_header(3);
    assert!(title.contains("Throughput"));
    assert_eq!(cols.len(), COLUMN_WIDTH * 5);
    assert!(cols.contains("Pair (3)"));
}

#[test]
fn row_render_formats() {
    let row = ThroughputRow {
        window_start: SimTime::from_millis(900),
        time: SimTime::from_secs(1),
        per_pair: vec![1.5, 2.5],
        total: 4.0,
    };
    assert_eq!(row.render(ThroughputFormat::Csv), "1.0,1.5,2.5,4");
    assert_eq!(row.to_string(), "1.0,1.5,2.5,4");
    let human = row.render(ThroughputFormat::Human);
    assert_eq!(human.len(), COLUMN_WIDTH * 4);
    assert!(human.starts_with("0.9 - 1.0   1.5         2.5         4"));
}

#[test]
fn values_print_with_six_significant_digits() {
    assert_eq!(format_mbps(899.9609599999999), "899.961");
    assert_eq!(format_mbps(10.07808), "10.0781");
    assert_eq!(format_mbps(9.96672), "9.96672");
    assert_eq!(format_mbps(100.0), "100");
    assert_eq!(format_mbps(0.0), "0");
    assert_eq!(format_mbps(0.11584), "0.11584");
    assert_eq!(format_mbps(4619.9999999), "4620");
}

#[test]
fn summed_total_keeps_the_column_layout() {
    let row = ThroughputRow {
        window_start: SimTime::from_millis(900),
        time: SimTime::from_secs(1),
        per_pair: vec![300.0256, 299.90976, 300.0256],
        total: 300.0256 + 299.90976 + 300.0256,
    };
    assert_eq!(row.render(ThroughputFormat::Csv), "1.0,300.026,299.91,300.026,899.961");
    let human = row.render(ThroughputFormat::Human);
    assert_eq!(human.len(), COLUMN_WIDTH * 5);
    assert!(human.ends_with("899.961     "));
}
