//! 测试用的内存输出与假网络

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use crate::error::QdError;
use crate::experiment::{
    AddressRegistry, Experiment, ExperimentConfig, ExperimentOutputs, OutputStream, PairRegistry,
};
use crate::sim::{SimTime, Simulator};
use crate::wifi::{
    AppCounters, BeamformingControl, MacAddress, NodeId, ReceiverId, SenderId, TraceIndexSource,
    TrafficHandles,
};

/// 可在写入后读取内容的共享缓冲区
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn stream(&self, name: &str) -> OutputStream {
        OutputStream::from_writer(name, self.clone())
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct Buffers {
    pub console: SharedBuffer,
    pub sls: SharedBuffer,
    pub snr: SharedBuffer,
}

impl Buffers {
    pub fn outputs(&self) -> ExperimentOutputs {
        ExperimentOutputs {
            console: self.console.stream("console"),
            sls: self.sls.stream("sls"),
            snr: self.snr.stream("snr"),
        }
    }
}

/// 记录所有调用的假网络
#[derive(Debug, Default)]
pub struct FakeNet {
    pub rx_bytes: HashMap<ReceiverId, u64>,
    pub starts: Vec<SenderId>,
    pub stops: Vec<SenderId>,
    pub txss: Vec<(MacAddress, MacAddress)>,
    pub trace_index: u32,
}

impl FakeNet {
    pub fn set_rx(&mut self, receiver: usize, bytes: u64) {
        self.rx_bytes.insert(ReceiverId(receiver), bytes);
    }
}

impl TrafficHandles for FakeNet {
    fn start_sender(&mut self, sender: SenderId, _sim: &mut Simulator) {
        self.starts.push(sender);
    }

    fn stop_sender(&mut self, sender: SenderId) {
        self.stops.push(sender);
    }

    fn sender_counters(&self, _sender: SenderId) -> AppCounters {
        AppCounters::default()
    }

    fn receiver_counters(&self, receiver: ReceiverId) -> AppCounters {
        AppCounters {
            packets: 0,
            bytes: self.rx_bytes.get(&receiver).copied().unwrap_or(0),
        }
    }
}

impl BeamformingControl for FakeNet {
    fn initiate_txss(&mut self, initiator: MacAddress, peer: MacAddress, _sim: &mut Simulator) -> Result<(), QdError> {
        self.txss.push((initiator, peer));
        Ok(())
    }
}

impl TraceIndexSource for FakeNet {
    fn current_trace_index(&self, _now: SimTime) -> u32 {
        self.trace_index
    }
}

pub fn mac(n: u64) -> MacAddress {
    MacAddress::allocate(n)
}

/// AP 为节点 0（地址 ...:01），STA i 为节点 i（地址 ...:0(i+1)），
/// 每个 STA 一个通信对：SenderId(i-1) -> ReceiverId(i-1)。
pub fn experiment_with(cfg: ExperimentConfig, stas: usize, buffers: &Buffers) -> Experiment {
    let mut addresses = AddressRegistry::builder();
    for n in 0..=stas {
        addresses
            .register(mac(n as u64 + 1), NodeId(n))
            .expect("register address");
    }
    let mut pairs = PairRegistry::default();
    for i in 1..=stas {
        pairs
            .register(NodeId(i), SenderId(i - 1), ReceiverId(i - 1), mac(i as u64 + 1), mac(1))
            .expect("register pair");
    }
    Experiment::new(cfg, addresses.build(), pairs, buffers.outputs()).expect("experiment")
}

pub fn csv_config() -> ExperimentConfig {
    ExperimentConfig {
        csv: true,
        ..ExperimentConfig::default()
    }
}
