//! 事件 trait
//!
//! 帧到达、信标间隔开始、吞吐量采样等都以事件的形式进入队列。

use super::simulator::Simulator;
use super::world::World;

/// 事件：可被调度执行。使用 `self: Box<Self>` 以便事件在执行时交出自身所有权，
/// 周期性事件可以直接把自己重新放回队列。
pub trait Event: Send + 'static {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World);
}
