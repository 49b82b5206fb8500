//! 场景构建

pub mod dense;
