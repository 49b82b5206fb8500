//! 仿真核心模块
//!
//! 离散事件引擎（时间、事件、世界、仿真器）以及场景描述。

mod event;
mod scenario;
mod scheduled_event;
mod simulator;
mod time;
mod world;

pub use event::Event;
pub use scenario::{
    ApplicationSpec, BlockageSpec, ChannelSpec, MacSpec, OutputSpec, Scenario, ScenarioSpec,
};
pub use scheduled_event::ScheduledEvent;
pub use simulator::Simulator;
pub use time::SimTime;
pub use world::World;
