//! Q-D 仿真世界
//!
//! 把 DMG 网络和测量层放在一起：MAC 调度产生的链路层事件经 `dispatch`
//! 依次交给 `Experiment`。任何处理器返回错误都会让世界进入停止状态。

use std::collections::HashMap;

use super::id::NodeId;
use super::mac_address::MacAddress;
use super::network::WifiNetwork;
use super::trace::{LinkEvent, SlsContext};
use crate::error::QdError;
use crate::experiment::Experiment;
use crate::sim::{Simulator, World};
use std::any::Any;
use tracing::error;

pub struct QdWorld {
    pub net: WifiNetwork,
    pub exp: Experiment,
    subscriptions: HashMap<MacAddress, SlsContext>,
    fatal: Option<QdError>,
}

impl QdWorld {
    pub fn new(net: WifiNetwork, exp: Experiment) -> Self {
        Self {
            net,
            exp,
            subscriptions: HashMap::new(),
            fatal: None,
        }
    }

    /// 为 `node` 订阅 SLS 完成事件，捕获其节点号、角色与所属 BSS。
    pub fn subscribe_sls(&mut self, node: NodeId) {
        let dev = self.net.device(node);
        self.subscriptions.insert(
            dev.addr,
            SlsContext {
                src_node: node,
                role: dev.role,
                bssid: dev.bssid,
            },
        );
    }

    pub fn sls_context(&self, addr: MacAddress) -> Result<SlsContext, QdError> {
        self.subscriptions
            .get(&addr)
            .copied()
            .ok_or(QdError::UnknownSubscription(addr))
    }

    /// 把一个链路层事件交给测量层。
    pub fn dispatch(&mut self, ev: LinkEvent, sim: &mut Simulator) {
        if self.fatal.is_some() {
            return;
        }
        if let Err(e) = self.exp.handle(ev, &mut self.net, sim) {
            self.fail(e);
        }
    }

    pub fn sample_throughput(&mut self, sim: &mut Simulator) {
        if self.fatal.is_some() {
            return;
        }
        if let Err(e) = self.exp.sample_throughput(sim.now(), &self.net) {
            self.fail(e);
        }
    }

    pub fn fail(&mut self, err: QdError) {
        error!(error = %err, "💥 致命错误，停止仿真");
        self.fatal.get_or_insert(err);
    }

    pub fn fatal(&self) -> Option<&QdError> {
        self.fatal.as_ref()
    }

    pub fn take_fatal(&mut self) -> Option<QdError> {
        self.fatal.take()
    }
}

impl World for QdWorld {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn halted(&self) -> bool {
        self.fatal.is_some()
    }
}

/// 事件执行时取回具体的世界类型。
pub(crate) fn qd_world(world: &mut dyn World) -> &mut QdWorld {
    world
        .as_any_mut()
        .downcast_mut::<QdWorld>()
        .expect("world must be QdWorld")
}
