//! 关联控制
//!
//! STA 关联成功时启动它的流量发送端，去关联时停止。找不到通信对说明建网时
//! 漏装了应用，属于致命的配置错误。

use super::output::OutputStream;
use super::pairs::PairRegistry;
use crate::error::QdError;
use crate::sim::Simulator;
use crate::wifi::{Associated, Deassociated, TrafficHandles};
use tracing::{debug, info};

#[derive(Debug)]
pub struct AssociationController {
    echo: bool,
}

impl AssociationController {
    /// `echo` 为 true 时向控制台输出可读的事件说明（CSV 模式下关闭）。
    pub fn new(echo: bool) -> Self {
        Self { echo }
    }

    pub fn on_associated<H: TrafficHandles + ?Sized>(
        &self,
        ev: &Associated,
        pairs: &mut PairRegistry,
        handles: &mut H,
        sim: &mut Simulator,
        console: &mut OutputStream,
    ) -> Result<(), QdError> {
        if self.echo {
            console.write_line(format_args!(
                "DMG STA {} associated with DMG PCP/AP {}, Association ID (AID) = {}",
                ev.self_addr, ev.peer, ev.aid
            ))?;
        }
        let pair = pairs.get_mut(ev.node)?;
        if pair.activate(sim.now()) {
            handles.start_sender(pair.sender, sim);
            info!(node = %ev.node, addr = %ev.self_addr, aid = ev.aid.0, "🔗 关联成功，启动流量");
        } else {
            debug!(node = %ev.node, "重复关联，仅更新开始时间");
        }
        Ok(())
    }

    pub fn on_deassociated<H: TrafficHandles + ?Sized>(
        &self,
        ev: &Deassociated,
        pairs: &mut PairRegistry,
        handles: &mut H,
        console: &mut OutputStream,
    ) -> Result<(), QdError> {
        if self.echo {
            console.write_line(format_args!(
                "DMG STA {} deassociated from DMG PCP/AP {}",
                ev.self_addr, ev.peer
            ))?;
        }
        let pair = pairs.get_mut(ev.node)?;
        if pair.deactivate() {
            handles.stop_sender(pair.sender);
            info!(node = %ev.node, addr = %ev.self_addr, "去关联，停止流量");
        } else {
            debug!(node = %ev.node, "去关联时流量本就未启动");
        }
        Ok(())
    }
}
