//! 周期性重新训练
//!
//! 以 DTI 开始事件（每个信标间隔一次）为时钟：已关联时计数加一，达到阈值后
//! 向所属 BSS 发起一次 CBAP TxSS 并清零。未关联时的 tick 直接忽略；
//! 去关联不会清零计数。

use std::collections::HashMap;

use crate::error::QdError;
use crate::sim::Simulator;
use crate::wifi::{BeamformingControl, DtiStarted, MacAddress};
use tracing::debug;

#[derive(Debug)]
pub struct RetrainingTrigger {
    threshold: u16,
    counters: HashMap<MacAddress, u16>,
    fired: u64,
}

impl RetrainingTrigger {
    pub fn new(threshold: u16) -> Self {
        Self {
            threshold: threshold.max(1),
            counters: HashMap::new(),
            fired: 0,
        }
    }

    pub fn threshold(&self) -> u16 {
        self.threshold
    }

    /// 建网时把计数置零
    pub fn register(&mut self, addr: MacAddress) {
        self.counters.insert(addr, 0);
    }

    pub fn count(&self, addr: MacAddress) -> u16 {
        self.counters.get(&addr).copied().unwrap_or(0)
    }

    /// 已发起的重新训练次数
    pub fn fired(&self) -> u64 {
        self.fired
    }

    /// 处理一次 DTI 开始；发起了重新训练时返回 true。
    pub fn on_dti_started<B: BeamformingControl + ?Sized>(
        &mut self,
        ev: &DtiStarted,
        control: &mut B,
        sim: &mut Simulator,
    ) -> Result<bool, QdError> {
        if !ev.associated {
            return Ok(false);
        }
        let counter = self.counters.entry(ev.address).or_insert(0);
        *counter = counter.saturating_add(1);
        if *counter < self.threshold {
            return Ok(false);
        }
        *counter = 0;
        self.fired += 1;
        debug!(addr = %ev.address, bssid = %ev.bssid, "🔁 达到 BI 阈值，发起 TxSS");
        control.initiate_txss(ev.address, ev.bssid, sim)?;
        Ok(true)
    }
}
