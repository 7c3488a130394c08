//! 策略模块
//!
//! 奖励与掌握度更新的纯函数策略。两者都不产生副作用：
//! 时间戳是输入值，不在计算中途采样。

pub mod mastery;
pub mod reward;

pub use mastery::{apply_quiz_answer, apply_swipe_judgment};
pub use reward::compute_diamond_reward;
