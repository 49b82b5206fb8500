//! 世界 trait
//!
//! 仿真世界持有所有可变状态；事件只通过 `&mut dyn World` 访问它，
//! 因此同一时刻只有事件循环这一个写者。

use std::any::Any;

/// 仿真世界：由业务层实现（例如 DMG 网络 + 实验测量层）。
pub trait World: Any {
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// 世界进入致命错误状态后返回 true，仿真器在当前事件结束后立即停止。
    fn halted(&self) -> bool {
        false
    }
}
