//! DMG MAC 信标间隔时序
//!
//! 每个信标间隔（BI）依次为：
//! - BTI：AP 做扇区扫描，每个可达的 STA 收到一个 DMG 信标；
//! - A-BFT：最多 `abft_slots` 个未关联的 STA 各占一个时隙做响应方扇区扫描，
//!   时隙结束时双方 SLS 完成；
//! - DTI：给每个可达的 STA 发出 DTI 开始事件，在本次 A-BFT 中训练成功的 STA
//!   随后完成关联。
//!
//! BI 开始时仍处于遮挡窗口内的已关联 STA 视为信标丢失而去关联。

use super::beamforming::{BeamformingDirection, ChannelAccessPeriod};
use super::data_path::DeliverFrame;
use super::frame::FrameKind;
use super::id::NodeId;
use super::trace::{DtiStarted, LinkEvent, SlsCompleted};
use super::world::{QdWorld, qd_world};
use crate::sim::{Event, SimTime, Simulator, World};
use tracing::{debug, trace};

/// 信标间隔开始
#[derive(Debug)]
pub struct BeaconIntervalStart {
    pub index: u64,
}

impl Event for BeaconIntervalStart {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let w = qd_world(world);
        let now = sim.now();
        let Some(ap) = w.net.ap() else { return };
        let mac = w.net.mac.clone();
        let stas = w.net.stas();

        // 信标丢失
        for &sta in &stas {
            if w.net.is_blocked(sta, now) && w.net.device(sta).is_associated() {
                let ev = w.net.deassociate(sta);
                w.dispatch(LinkEvent::Deassociated(ev), sim);
            }
        }

        let reachable: Vec<NodeId> = stas
            .iter()
            .copied()
            .filter(|&sta| w.net.link_up(ap, sta, now))
            .collect();

        // BTI：AP 按扇区顺序扫描，STA 在指向自己的扇区上收到信标
        for &sta in &reachable {
            let sector = w.net.best_sector(ap, sta);
            let at = now.saturating_add(SimTime(mac.ssw_frame.0 * u64::from(sector.0)));
            sim.schedule(at, DeliverFrame::control(ap, sta, FrameKind::DmgBeacon));
        }

        // A-BFT
        let abft_start = now.saturating_add(mac.bti);
        let trainees: Vec<NodeId> = reachable
            .iter()
            .copied()
            .filter(|&sta| !w.net.device(sta).is_associated())
            .take(usize::from(mac.abft_slots))
            .collect();
        for (slot, &sta) in trainees.iter().enumerate() {
            let slot_start = abft_start.saturating_add(SimTime(mac.abft_slot.0 * slot as u64));
            let slot_end = slot_start.saturating_add(mac.abft_slot);
            sim.schedule(
                slot_start.saturating_add(mac.ssw_frame),
                DeliverFrame::control(sta, ap, FrameKind::Ssw),
            );
            sim.schedule(
                slot_end.saturating_sub(mac.ssw_frame),
                DeliverFrame::control(ap, sta, FrameKind::SswFeedback),
            );
            sim.schedule(
                slot_end,
                SlsDone {
                    initiator: ap,
                    responder: sta,
                    access_period: ChannelAccessPeriod::Abft,
                },
            );
        }

        // DTI
        let dti_start = now.saturating_add(mac.dti_offset());
        sim.schedule(
            dti_start,
            DtiStart {
                duration: mac.dti_duration(),
            },
        );
        for (k, &sta) in trainees.iter().enumerate() {
            let at = dti_start.saturating_add(SimTime(mac.assoc_delay.0 * (k as u64 + 1)));
            sim.schedule(at, AssociationComplete { sta });
        }

        debug!(bi = self.index, reachable = reachable.len(), trainees = trainees.len(), "信标间隔开始");
        sim.schedule(
            now.saturating_add(mac.beacon_interval),
            BeaconIntervalStart {
                index: self.index + 1,
            },
        );
    }
}

/// DTI 开始：给每个可达的 STA 发出 DTI 开始事件。
#[derive(Debug)]
pub struct DtiStart {
    pub duration: SimTime,
}

impl Event for DtiStart {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let w = qd_world(world);
        let now = sim.now();
        let Some(ap) = w.net.ap() else { return };
        for sta in w.net.stas() {
            if !w.net.link_up(ap, sta, now) {
                continue;
            }
            let dev = w.net.device(sta);
            let ev = DtiStarted {
                node: sta,
                address: dev.addr,
                bssid: dev.bssid,
                associated: dev.is_associated(),
                duration: self.duration,
            };
            w.dispatch(LinkEvent::DtiStarted(ev), sim);
        }
    }
}

/// A-BFT 训练成功的 STA 完成关联。
#[derive(Debug)]
pub struct AssociationComplete {
    pub sta: NodeId,
}

impl Event for AssociationComplete {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let w = qd_world(world);
        let now = sim.now();
        let Some(ap) = w.net.ap() else { return };
        if !w.net.link_up(ap, self.sta, now) || w.net.device(self.sta).is_associated() {
            trace!(sta = %self.sta, "关联未完成");
            return;
        }
        let ev = w.net.associate(self.sta);
        w.dispatch(LinkEvent::Associated(ev), sim);
    }
}

/// CBAP 内的按需 TxSS：发起方扫描、响应方扫描、SSW-FBCK、SSW-ACK。
#[derive(Debug)]
pub struct CbapTxss {
    pub initiator: NodeId,
    pub responder: NodeId,
}

impl Event for CbapTxss {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let CbapTxss { initiator, responder } = *self;
        let w = qd_world(world);
        let now = sim.now();
        if !w.net.link_up(initiator, responder, now) {
            debug!(initiator = %initiator, responder = %responder, "链路不可用，放弃 TxSS");
            return;
        }
        let ssw = w.net.mac.ssw_frame.0;
        let init_sweep = ssw * u64::from(w.net.device(initiator).sectors);
        let resp_sweep = ssw * u64::from(w.net.device(responder).sectors);

        let t1 = now.saturating_add(SimTime(init_sweep));
        let t2 = t1.saturating_add(SimTime(resp_sweep));
        let t3 = t2.saturating_add(SimTime(ssw));
        let t4 = t3.saturating_add(SimTime(ssw));
        sim.schedule(t1, DeliverFrame::control(initiator, responder, FrameKind::Ssw));
        sim.schedule(t2, DeliverFrame::control(responder, initiator, FrameKind::Ssw));
        sim.schedule(t3, DeliverFrame::control(initiator, responder, FrameKind::SswFeedback));
        sim.schedule(t4, DeliverFrame::control(responder, initiator, FrameKind::SswAck));
        sim.schedule(
            t4,
            SlsDone {
                initiator,
                responder,
                access_period: ChannelAccessPeriod::Dti,
            },
        );
    }
}

/// 一次 SLS 在双方完成。
#[derive(Debug)]
pub struct SlsDone {
    pub initiator: NodeId,
    pub responder: NodeId,
    pub access_period: ChannelAccessPeriod,
}

impl SlsDone {
    fn report(&self, w: &mut QdWorld, reporter: NodeId, peer: NodeId, direction: BeamformingDirection, sim: &mut Simulator) {
        let addr = w.net.device(reporter).addr;
        let ctx = match w.sls_context(addr) {
            Ok(ctx) => ctx,
            Err(e) => {
                w.fail(e);
                return;
            }
        };
        let ev = SlsCompleted {
            ctx,
            peer: w.net.device(peer).addr,
            access_period: self.access_period,
            direction,
            initiator_txss: true,
            responder_txss: true,
            sector: w.net.best_sector(reporter, peer),
            antenna: w.net.device(reporter).antenna,
        };
        w.dispatch(LinkEvent::SlsCompleted(ev), sim);
    }
}

impl Event for SlsDone {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let w = qd_world(world);
        if !w.net.link_up(self.initiator, self.responder, sim.now()) {
            debug!(initiator = %self.initiator, responder = %self.responder, "SLS 未完成");
            return;
        }
        self.report(w, self.initiator, self.responder, BeamformingDirection::Initiator, sim);
        self.report(w, self.responder, self.initiator, BeamformingDirection::Responder, sim);
    }
}
