//! 单 AP 密集场景实验
//!
//! 一个 DMG AP 位于房间中央，周围 N 个 DMG STA 各自向 AP 发送流量。
//! 输出：
//! - stdout：每 100 ms 一行的应用层吞吐量（`--csv` 时为逗号分隔），以及结束报告；
//! - `slsResults.csv`：每次 SLS 完成的扇区/天线与信道快照编号；
//! - `snrValues.csv`：波束训练控制帧（以及可选的数据帧）的 SNR。

use clap::Parser;
use qdsim_rs::QdError;
use qdsim_rs::experiment::{ExperimentOutputs, OutputStream};
use qdsim_rs::sim::ScenarioSpec;
use qdsim_rs::topo::dense::build_dense_scenario;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(
    name = "qd-dense-scenario",
    about = "IEEE 802.11ad 单 AP 密集场景：Q-D 信道下的吞吐量与波束训练记录"
)]
struct Args {
    /// 场景 JSON；命令行参数会覆盖其中的同名字段
    #[arg(long)]
    config: Option<PathBuf>,

    /// 发送应用类型：onoff 或 bulk
    #[arg(long)]
    application_type: Option<String>,

    /// 应用层包大小（字节）
    #[arg(long)]
    packet_size: Option<u32>,

    /// 应用数据速率，例如 300Mbps
    #[arg(long)]
    data_rate: Option<String>,

    /// 每个发送端最多发送的字节数（0 表示不限）
    #[arg(long)]
    max_packets: Option<u64>,

    /// socket 类型：udp / tcp（或 ns3::UdpSocketFactory 这类全名）
    #[arg(long)]
    socket_type: Option<String>,

    /// TCP 变体：NewReno, Hybla, HighSpeed, Vegas, Scalable, Veno, Bic, Westwood, WestwoodPlus
    #[arg(long)]
    tcp_variant: Option<String>,

    /// 802.11ad PHY 模式，例如 DMG_MCS12
    #[arg(long)]
    phy_mode: Option<String>,

    /// 仿真时长（秒）
    #[arg(long)]
    simulation_time: Option<f64>,

    /// DMG STA 数量
    #[arg(long)]
    num_stas: Option<u16>,

    /// 每隔多少个信标间隔强制做一次 CBAP TxSS
    #[arg(long)]
    bi_threshold: Option<u16>,

    /// 使用 CSV 输出，并关闭所有事件说明与结束报告
    #[arg(long)]
    csv: bool,

    /// 是否记录数据帧的 SNR（控制帧总是记录）
    #[arg(long)]
    report_data_snr: Option<bool>,

    /// Q-D 信道快照数量
    #[arg(long)]
    qd_traces: Option<u32>,

    /// SLS 结果文件
    #[arg(long, default_value = "slsResults.csv")]
    sls_out: PathBuf,

    /// SNR 记录文件
    #[arg(long, default_value = "snrValues.csv")]
    snr_out: PathBuf,

    /// 结束时把统计汇总写成 JSON
    #[arg(long)]
    summary_json: Option<PathBuf>,
}

impl Args {
    fn scenario_spec(&self) -> Result<ScenarioSpec, QdError> {
        let mut spec = match &self.config {
            Some(path) => ScenarioSpec::from_json(&fs::read_to_string(path)?)?,
            None => ScenarioSpec::default(),
        };
        let app = &mut spec.application;
        if let Some(v) = &self.application_type {
            app.kind = v.clone();
        }
        if let Some(v) = self.packet_size {
            app.packet_size = v;
        }
        if let Some(v) = &self.data_rate {
            app.data_rate = v.clone();
        }
        if let Some(v) = self.max_packets {
            app.max_bytes = v;
        }
        if let Some(v) = &self.socket_type {
            app.socket = v.clone();
        }
        if let Some(v) = &self.tcp_variant {
            app.tcp_variant = v.clone();
        }
        if let Some(v) = &self.phy_mode {
            spec.phy_mode = v.clone();
        }
        if let Some(v) = self.simulation_time {
            spec.simulation_time_s = v;
        }
        if let Some(v) = self.num_stas {
            spec.num_stas = v;
        }
        if let Some(v) = self.bi_threshold {
            spec.mac.bi_threshold = v;
        }
        if self.csv {
            spec.output.csv = true;
        }
        if let Some(v) = self.report_data_snr {
            spec.output.report_data_snr = v;
        }
        if let Some(v) = self.qd_traces {
            spec.channel.num_traces = v;
        }
        Ok(spec)
    }
}

fn run(args: &Args) -> Result<(), QdError> {
    let scenario = args.scenario_spec()?.resolve()?;
    let outputs = ExperimentOutputs {
        console: OutputStream::stdout(),
        sls: OutputStream::create(&args.sls_out)?,
        snr: OutputStream::create(&args.snr_out)?,
    };
    let dense = build_dense_scenario(&scenario, outputs)?;
    let summary = dense.run()?;

    info!(
        events = summary.events_executed,
        sls_records = summary.sls_records,
        snr_records = summary.snr_records,
        retraining_rounds = summary.retraining_rounds,
        "📊 实验结束"
    );

    if let Some(path) = &args.summary_json {
        let json = serde_json::to_string_pretty(&summary)?;
        fs::write(path, json)?;
        eprintln!("wrote run summary to {}", path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "❌ 实验失败");
            ExitCode::FAILURE
        }
    }
}
