//! 掌握度更新策略
//!
//! 答题结果 → 新的 WordProgress 的纯函数。
//! 两种模式刻意不同：测验模式推动认读/运用掌握分，
//! 判断模式只记练习不动掌握分（产品决策，只给钻石奖励）。

use chrono::{DateTime, Utc};

use crate::model::WordProgress;

/// 应用一次测验答题到学习进度
///
/// - `practice_count` 总是 +1
/// - 答对时 `success_count`、认读分、运用分各 +1，
///   `number_of_times_to_practice` 饱和 -1（不会低于 0）
/// - `last_practiced` 取调用方传入的时间戳
///
/// 结构体更新语法保证合并语义：未列出的字段保留原值。
pub fn apply_quiz_answer(
    prev: &WordProgress,
    is_correct: bool,
    now: DateTime<Utc>,
) -> WordProgress {
    WordProgress {
        practice_count: prev.practice_count.saturating_add(1),
        success_count: prev.success_count.saturating_add(u32::from(is_correct)),
        recognition_mastery_score: prev
            .recognition_mastery_score
            .saturating_add(u32::from(is_correct)),
        usage_mastery_score: prev.usage_mastery_score.saturating_add(u32::from(is_correct)),
        number_of_times_to_practice: if is_correct {
            prev.number_of_times_to_practice.saturating_sub(1)
        } else {
            prev.number_of_times_to_practice
        },
        last_practiced: Some(now),
        ..prev.clone()
    }
}

/// 应用一次判断（legit/cap）到学习进度
///
/// 判断模式只更新练习计数与时间戳，掌握分与复练计数保持不变。
pub fn apply_swipe_judgment(
    prev: &WordProgress,
    is_correct: bool,
    now: DateTime<Utc>,
) -> WordProgress {
    WordProgress {
        practice_count: prev.practice_count.saturating_add(1),
        success_count: prev.success_count.saturating_add(u32::from(is_correct)),
        last_practiced: Some(now),
        ..prev.clone()
    }
}
