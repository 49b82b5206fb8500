//! 仿真器
//!
//! 单线程离散事件循环：按仿真时间递增、同一时间按调度顺序依次执行事件，
//! 事件之间不会重叠，也不会被抢占。

use super::event::Event;
use super::scheduled_event::ScheduledEvent;
use super::time::SimTime;
use super::world::World;
use std::collections::BinaryHeap;
use tracing::{debug, info, trace, warn};

/// 事件驱动仿真器：维护当前时间与事件队列。
#[derive(Default)]
pub struct Simulator {
    now: SimTime,
    next_seq: u64,
    executed: u64,
    stopped: bool,
    q: BinaryHeap<ScheduledEvent>,
}

impl Simulator {
    /// 获取当前仿真时间
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// 已执行的事件数
    pub fn executed(&self) -> u64 {
        self.executed
    }

    /// 队列中尚未执行的事件数
    pub fn pending(&self) -> usize {
        self.q.len()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// 调度事件在绝对时间 `at` 执行；早于当前时间的请求按当前时间处理。
    #[tracing::instrument(level = "trace", skip(self, ev), fields(event_type = std::any::type_name::<E>(), schedule_at = ?at))]
    pub fn schedule<E: Event>(&mut self, at: SimTime, ev: E) {
        if self.stopped {
            trace!("仿真已停止，忽略调度");
            return;
        }
        let at = at.max(self.now);
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.q.push(ScheduledEvent {
            at,
            seq,
            ev: Box::new(ev),
        });
        trace!(now = ?self.now, seq, queue_size = self.q.len(), "事件已加入队列");
    }

    /// 在当前时间之后 `delay` 执行。
    pub fn schedule_in<E: Event>(&mut self, delay: SimTime, ev: E) {
        let at = self.now.saturating_add(delay);
        self.schedule(at, ev);
    }

    /// 停止仿真：丢弃所有待执行事件（包括周期性事件的下一次调度），
    /// 之后的 `schedule` 调用被忽略。
    pub fn stop(&mut self) {
        if !self.stopped {
            debug!(now = ?self.now, dropped = self.q.len(), "⏹️  仿真停止");
        }
        self.stopped = true;
        self.q.clear();
    }

    fn step(&mut self, item: ScheduledEvent, world: &mut dyn World) {
        self.now = item.at;
        self.executed += 1;
        item.ev.execute(self, world);
        if world.halted() {
            warn!(now = ?self.now, "世界进入致命状态，终止仿真");
            self.stop();
        }
    }

    /// 运行直到事件队列为空、仿真被停止或到达 `until`。
    /// 恰好在 `until` 的事件仍会执行。
    pub fn run_until(&mut self, until: SimTime, world: &mut dyn World) {
        info!(until = ?until, queued = self.q.len(), "▶️  开始运行仿真");
        while let Some(top) = self.q.peek() {
            if top.at > until {
                break;
            }
            let Some(item) = self.q.pop() else { break };
            self.step(item, world);
            if self.stopped {
                break;
            }
        }
        if !self.stopped {
            self.now = self.now.max(until);
        }
        info!(executed = self.executed, final_time = ?self.now, "✅ 仿真完成");
    }

    /// 运行所有事件直到队列为空或仿真被停止。
    pub fn run(&mut self, world: &mut dyn World) {
        while let Some(item) = self.q.pop() {
            self.step(item, world);
            if self.stopped {
                break;
            }
        }
        debug!(executed = self.executed, final_time = ?self.now, "事件队列已清空");
    }
}
