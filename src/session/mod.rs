//! 会话状态机模块
//!
//! 一次练习的有序推进。两种并行模式：
//! - [`quiz`] - 选择题测验：`question → feedback → summary`
//! - [`swipe`] - legit/cap 判断：递减牌堆直到打完
//!
//! 会话是临时对象，作用域仅限一次打穿；完成或显式重开时销毁，
//! 应用重启后永远从新会话开始（会话不可恢复）。

pub mod quiz;
pub mod swipe;
