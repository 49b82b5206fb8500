//! 数据通路：发送端定时器与帧到达事件

use super::frame::FrameKind;
use super::id::{NodeId, ReceiverId, SenderId};
use super::trace::{LinkEvent, MacRxOk};
use super::world::qd_world;
use crate::sim::{Event, SimTime, Simulator, World};
use tracing::trace;

/// 发送端的下一次发包。`generation` 与发送端当前值不一致时说明它已被停止过。
#[derive(Debug)]
pub struct SourceTick {
    pub sender: SenderId,
    pub generation: u64,
}

impl Event for SourceTick {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let SourceTick { sender, generation } = *self;
        let w = qd_world(world);
        let net = &mut w.net;

        let now = sim.now();
        let s = net.apps.sender(sender);
        if !s.is_current(generation) {
            trace!(sender = sender.0, generation, "过期的发送定时器");
            return;
        }
        let finished = s.is_finished(now);
        let (src, dst, receiver, bytes) = (s.node, s.peer, s.receiver, s.cfg.packet_bytes);
        let airtime = net.phy.airtime_ns(bytes);
        let interval = s.interval_ns(airtime);
        if finished {
            trace!(sender = sender.0, "发送端已结束（字节上限或停止时刻）");
            net.apps.finish(sender);
            return;
        }

        net.apps.record_tx(sender, bytes);
        if net.link_up(src, dst, now) {
            sim.schedule_in(
                SimTime(airtime),
                DeliverFrame {
                    tx: src,
                    rx: dst,
                    kind: FrameKind::QosData,
                    bytes,
                    sink: Some(receiver),
                },
            );
        } else {
            trace!(sender = sender.0, "链路被遮挡，数据帧丢失");
        }
        sim.schedule_in(SimTime(interval), SourceTick { sender, generation });
    }
}

/// 帧到达接收端。链路在到达时刻仍然可用才算成功接收。
#[derive(Debug)]
pub struct DeliverFrame {
    pub tx: NodeId,
    pub rx: NodeId,
    pub kind: FrameKind,
    pub bytes: u32,
    pub sink: Option<ReceiverId>,
}

impl DeliverFrame {
    pub fn control(tx: NodeId, rx: NodeId, kind: FrameKind) -> Self {
        Self {
            tx,
            rx,
            kind,
            bytes: 0,
            sink: None,
        }
    }
}

impl Event for DeliverFrame {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let DeliverFrame { tx, rx, kind, bytes, sink } = *self;
        let w = qd_world(world);
        let now = sim.now();
        if !w.net.link_up(tx, rx, now) {
            trace!(%kind, tx = %tx, rx = %rx, "帧在途中丢失");
            return;
        }
        if let Some(sink) = sink {
            w.net.apps.record_rx(sink, bytes);
        }
        let ev = MacRxOk {
            self_addr: w.net.device(rx).addr,
            peer: w.net.device(tx).addr,
            kind,
            snr_db: w.net.link_snr_db(tx, rx, now),
        };
        w.dispatch(LinkEvent::MacRxOk(ev), sim);
    }
}
