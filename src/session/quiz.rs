//! 测验模式会话状态机
//!
//! 状态推进：`question → feedback → summary`，终态为 summary。
//! 每道题的结果记录在按下标的 `answer_results` 中；
//! 总结阶段从 `answer_results` 重新推导得分与钻石，
//! 而不是信任增量维护的计数器——这是一次刻意的一致性校验。

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::model::{DifficultyLevel, Word};
use crate::policy::compute_diamond_reward;

// ============================================================
// 状态与结果类型
// ============================================================

/// 测验会话阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizPhase {
    /// 展示当前题目，等待选择
    Question,
    /// 展示对错与释义，等待"下一题"
    Feedback,
    /// 终态：展示总结
    Summary,
}

/// 单次答题的结果
#[derive(Debug, Clone)]
pub struct QuizOutcome {
    pub word_id: String,
    pub is_correct: bool,
    pub difficulty: DifficultyLevel,
}

/// `advance` 的推进结果
#[derive(Debug, Clone)]
pub enum QuizStep {
    /// 进入下一题
    NextQuestion,
    /// 所有题目已答完，进入总结
    Finished(QuizSummary),
}

/// 会话总结
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
    pub total_questions: u32,
    pub correct_count: u32,
    /// 从逐题结果 × 各题难度重新计算，不做增量累计
    pub diamonds_earned: u32,
    pub total_time_secs: i64,
}

// ============================================================
// QuizSession - 测验会话
// ============================================================

/// 一次测验打穿的全部会话状态
#[derive(Debug, Clone)]
pub struct QuizSession {
    items: Vec<Word>,
    current_index: usize,
    phase: QuizPhase,
    selected_answer: Option<String>,
    /// 增量维护的得分计数器（总结阶段会被重新推导的值取代）
    score: u32,
    answer_results: BTreeMap<usize, bool>,
    started_at: DateTime<Utc>,
    summary: Option<QuizSummary>,
}

impl QuizSession {
    /// 用一组题目创建新会话
    pub fn new(items: Vec<Word>, now: DateTime<Utc>) -> EngineResult<Self> {
        if items.is_empty() {
            return Err(EngineError::NoEligibleWords);
        }
        Ok(Self {
            items,
            current_index: 0,
            phase: QuizPhase::Question,
            selected_answer: None,
            score: 0,
            answer_results: BTreeMap::new(),
            started_at: now,
            summary: None,
        })
    }

    // ========== 只读访问 ==========

    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_word(&self) -> Option<&Word> {
        self.items.get(self.current_index)
    }

    pub fn items(&self) -> &[Word] {
        &self.items
    }

    pub fn selected_answer(&self) -> Option<&str> {
        self.selected_answer.as_deref()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn answer_results(&self) -> &BTreeMap<usize, bool> {
        &self.answer_results
    }

    pub fn summary(&self) -> Option<&QuizSummary> {
        self.summary.as_ref()
    }

    // ========== 状态转移 ==========

    /// 选择答案：`question → feedback`
    ///
    /// 记录 `answer_results[current_index]` 并返回结果，
    /// 奖励与进度更新由编排器基于返回值完成。
    pub fn select_answer(&mut self, answer: &str, _now: DateTime<Utc>) -> EngineResult<QuizOutcome> {
        if self.phase != QuizPhase::Question {
            return Err(EngineError::SessionState(format!(
                "只能在题目阶段选择答案，当前阶段: {:?}",
                self.phase
            )));
        }

        let word = self
            .items
            .get(self.current_index)
            .ok_or_else(|| EngineError::SessionState("题目下标越界".to_string()))?;

        let is_correct = word.is_correct_option(answer);
        self.answer_results.insert(self.current_index, is_correct);
        if is_correct {
            self.score += 1;
        }
        self.selected_answer = Some(answer.to_string());
        self.phase = QuizPhase::Feedback;

        Ok(QuizOutcome {
            word_id: word.id.clone(),
            is_correct,
            difficulty: word.difficulty_level,
        })
    }

    /// "下一题"：`feedback → question` 或 `feedback → summary`
    pub fn advance(&mut self, now: DateTime<Utc>) -> EngineResult<QuizStep> {
        if self.phase != QuizPhase::Feedback {
            return Err(EngineError::SessionState(format!(
                "只能在反馈阶段推进，当前阶段: {:?}",
                self.phase
            )));
        }

        if self.current_index + 1 >= self.items.len() {
            let summary = self.finalize(now);
            return Ok(QuizStep::Finished(summary));
        }

        self.current_index += 1;
        self.selected_answer = None;
        self.phase = QuizPhase::Question;
        Ok(QuizStep::NextQuestion)
    }

    /// 进入总结并固化统计（幂等）
    ///
    /// 得分与钻石都从 `answer_results` 重新推导，
    /// 纠正增量计数器可能的漂移。
    pub fn finalize(&mut self, now: DateTime<Utc>) -> QuizSummary {
        if let Some(summary) = &self.summary {
            return summary.clone();
        }

        let correct_count = self.derived_score();
        let diamonds_earned = self.derived_diamonds();
        self.score = correct_count;

        let summary = QuizSummary {
            total_questions: self.items.len() as u32,
            correct_count,
            diamonds_earned,
            total_time_secs: (now - self.started_at).num_seconds().max(0),
        };

        self.phase = QuizPhase::Summary;
        self.summary = Some(summary.clone());
        summary
    }

    // ========== 推导统计 ==========

    /// 从逐题结果重新推导得分
    pub fn derived_score(&self) -> u32 {
        self.answer_results.values().filter(|v| **v).count() as u32
    }

    /// 从逐题结果 × 各题难度重新推导钻石
    pub fn derived_diamonds(&self) -> u32 {
        self.answer_results
            .iter()
            .filter_map(|(index, is_correct)| {
                self.items
                    .get(*index)
                    .map(|word| compute_diamond_reward(word.difficulty_level, *is_correct))
            })
            .sum()
    }

    /// 内部测试钩子：模拟增量计数器漂移
    #[cfg(test)]
    fn corrupt_score(&mut self, value: u32) {
        self.score = value;
    }
}
