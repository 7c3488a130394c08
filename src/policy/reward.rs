//! 钻石奖励策略
//!
//! 答题结果 + 单词难度 → 钻石增量的固定映射。

use crate::model::DifficultyLevel;

/// 计算一次答题/判断的钻石奖励
///
/// 答错得 0；答对按难度给 1/2/3，未知难度兜底给 1。
/// 纯函数，确定性，无失败路径。
pub fn compute_diamond_reward(difficulty: DifficultyLevel, is_correct: bool) -> u32 {
    if !is_correct {
        return 0;
    }

    match difficulty {
        DifficultyLevel::Beginner => 1,
        DifficultyLevel::Intermediate => 2,
        DifficultyLevel::Advanced => 3,
        DifficultyLevel::Unknown => 1,
    }
}
