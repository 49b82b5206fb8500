//! 通信对
//!
//! 每个产生流量的节点一条记录，按注册顺序保存；吞吐量输出的列顺序即注册顺序。
//! 状态机：`Idle -> Active`（关联）`-> Idle`（去关联），可以反复进行。

use std::collections::HashMap;

use crate::error::QdError;
use crate::sim::SimTime;
use crate::wifi::{MacAddress, NodeId, ReceiverId, SenderId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairState {
    Idle,
    Active,
}

#[derive(Debug, Clone)]
pub struct CommunicationPair {
    pub node: NodeId,
    pub sender: SenderId,
    pub receiver: ReceiverId,
    /// 发送端/接收端的 MAC 地址，仅用于报告
    pub src_addr: MacAddress,
    pub dst_addr: MacAddress,
    state: PairState,
    last_total_rx: u64,
    throughput_sum: f64,
    samples: u64,
    start_time: Option<SimTime>,
    activations: u32,
}

impl CommunicationPair {
    pub fn state(&self) -> PairState {
        self.state
    }

    pub fn last_total_rx(&self) -> u64 {
        self.last_total_rx
    }

    /// 各次采样瞬时吞吐量（Mbps）之和
    pub fn throughput_sum(&self) -> f64 {
        self.throughput_sum
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }

    pub fn mean_sampled_mbps(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.throughput_sum / self.samples as f64
        }
    }

    /// 最近一次关联的时间
    pub fn start_time(&self) -> Option<SimTime> {
        self.start_time
    }

    pub fn activations(&self) -> u32 {
        self.activations
    }

    /// 记录关联时间；从 Idle 进入 Active 时返回 true。
    pub(crate) fn activate(&mut self, now: SimTime) -> bool {
        self.start_time = Some(now);
        if self.state == PairState::Active {
            return false;
        }
        self.state = PairState::Active;
        self.activations += 1;
        true
    }

    /// 从 Active 回到 Idle 时返回 true。
    pub(crate) fn deactivate(&mut self) -> bool {
        let was_active = self.state == PairState::Active;
        self.state = PairState::Idle;
        was_active
    }

    /// 用接收端当前累计字节数更新记录，返回本周期新增的字节数。
    /// 计数器只能单调不减。
    pub(crate) fn observe_total_rx(&mut self, index: usize, current: u64) -> Result<u64, QdError> {
        let delta = current
            .checked_sub(self.last_total_rx)
            .ok_or(QdError::CounterRegression {
                pair: index,
                previous: self.last_total_rx,
                current,
            })?;
        self.last_total_rx = current;
        Ok(delta)
    }

    pub(crate) fn accumulate(&mut self, mbps: f64) {
        self.throughput_sum += mbps;
        self.samples += 1;
    }
}

#[derive(Debug, Default)]
pub struct PairRegistry {
    pairs: Vec<CommunicationPair>,
    by_node: HashMap<NodeId, usize>,
}

impl PairRegistry {
    /// 注册节点的通信对，返回其列序号（从 0 开始）。
    pub fn register(
        &mut self,
        node: NodeId,
        sender: SenderId,
        receiver: ReceiverId,
        src_addr: MacAddress,
        dst_addr: MacAddress,
    ) -> Result<usize, QdError> {
        if self.by_node.contains_key(&node) {
            return Err(QdError::invalid(
                "traffic configuration",
                format!("node {node} already has a communication pair"),
            ));
        }
        let idx = self.pairs.len();
        self.pairs.push(CommunicationPair {
            node,
            sender,
            receiver,
            src_addr,
            dst_addr,
            state: PairState::Idle,
            last_total_rx: 0,
            throughput_sum: 0.0,
            samples: 0,
            start_time: None,
            activations: 0,
        });
        self.by_node.insert(node, idx);
        Ok(idx)
    }

    fn index_of(&self, node: NodeId) -> Result<usize, QdError> {
        self.by_node
            .get(&node)
            .copied()
            .ok_or(QdError::MissingTrafficConfiguration(node))
    }

    pub fn get(&self, node: NodeId) -> Result<&CommunicationPair, QdError> {
        let idx = self.index_of(node)?;
        Ok(&self.pairs[idx])
    }

    pub fn get_mut(&mut self, node: NodeId) -> Result<&mut CommunicationPair, QdError> {
        let idx = self.index_of(node)?;
        Ok(&mut self.pairs[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommunicationPair> {
        self.pairs.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut CommunicationPair> {
        self.pairs.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
