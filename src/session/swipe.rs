//! 判断模式（legit/cap）会话状态机
//!
//! 以递减牌堆建模而不是下标推进：发牌一次，逐张判断，打完即终态。
//! 牌堆生成时对每个单词掷一次硬币，决定展示真释义还是从同组
//! 其他单词借来的释义（拒绝采样，避免借到自己的释义）。
//! 真假分布因此是 binomial(n, 0.5) 而非强制均衡——计分按张独立，
//! 不依赖分布。

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::model::{DifficultyLevel, Word};
use crate::policy::compute_diamond_reward;

/// 借释义时的最大拒绝采样次数，超过则回退为真释义
const MAX_BORROW_ATTEMPTS: usize = 8;

// ============================================================
// 牌与结果类型
// ============================================================

/// 一张判断卡：单词 + 展示的（可能被替换的）释义
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwipeCard {
    pub word: Word,
    /// 展示给用户的释义文本
    pub shown_definition: String,
    /// 展示的释义是否为该单词的真释义
    pub is_true: bool,
}

/// 单次判断的结果
#[derive(Debug, Clone)]
pub struct SwipeOutcome {
    pub word_id: String,
    pub is_correct: bool,
    pub difficulty: DifficultyLevel,
}

/// 会话总结
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwipeSummary {
    pub total_cards: u32,
    pub correct_count: u32,
    pub diamonds_earned: u32,
    pub total_time_secs: i64,
}

// ============================================================
// 牌堆生成
// ============================================================

/// 从单词集生成一副判断牌堆
///
/// 每个单词掷硬币决定真假；假卡的释义从同组其他单词中拒绝采样，
/// 保证不等于自己的真释义。单词数不足以借释义时全部发真卡。
pub fn generate_deck<R: Rng>(words: &[Word], rng: &mut R) -> Vec<SwipeCard> {
    words
        .iter()
        .enumerate()
        .map(|(index, word)| {
            let wants_true = words.len() < 2 || rng.random_bool(0.5);

            if wants_true {
                return SwipeCard {
                    word: word.clone(),
                    shown_definition: word.definition.clone(),
                    is_true: true,
                };
            }

            // 拒绝采样：借一条既不是本卡也不与真释义撞文本的释义
            for _ in 0..MAX_BORROW_ATTEMPTS {
                let candidate = rng.random_range(0..words.len());
                if candidate != index && words[candidate].definition != word.definition {
                    return SwipeCard {
                        word: word.clone(),
                        shown_definition: words[candidate].definition.clone(),
                        is_true: false,
                    };
                }
            }

            // 采样失败（如释义全部相同）时回退为真卡
            SwipeCard {
                word: word.clone(),
                shown_definition: word.definition.clone(),
                is_true: true,
            }
        })
        .collect()
}

// ============================================================
// SwipeSession - 判断会话
// ============================================================

/// 一次判断打穿的全部会话状态
#[derive(Debug, Clone)]
pub struct SwipeSession {
    cards: Vec<SwipeCard>,
    current_index: usize,
    /// 增量维护的得分计数器（总结阶段会被重新推导的值取代）
    score: u32,
    results: BTreeMap<usize, bool>,
    started_at: DateTime<Utc>,
    /// 卡片滑出动画期间为 true，期间的输入一律忽略
    is_animating: bool,
    summary: Option<SwipeSummary>,
}

impl SwipeSession {
    /// 从单词集生成牌堆、洗牌并创建会话
    pub fn new(words: &[Word], now: DateTime<Utc>) -> EngineResult<Self> {
        let mut rng = rand::rng();
        let mut cards = generate_deck(words, &mut rng);
        cards.shuffle(&mut rng);
        Self::with_deck(cards, now)
    }

    /// 用现成牌堆创建会话（测试与重开时使用）
    pub fn with_deck(cards: Vec<SwipeCard>, now: DateTime<Utc>) -> EngineResult<Self> {
        if cards.is_empty() {
            return Err(EngineError::NoEligibleWords);
        }
        Ok(Self {
            cards,
            current_index: 0,
            score: 0,
            results: BTreeMap::new(),
            started_at: now,
            is_animating: false,
            summary: None,
        })
    }

    // ========== 只读访问 ==========

    pub fn top_card(&self) -> Option<&SwipeCard> {
        self.cards.get(self.current_index)
    }

    pub fn cards(&self) -> &[SwipeCard] {
        &self.cards
    }

    pub fn remaining(&self) -> usize {
        self.cards.len().saturating_sub(self.current_index)
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn results(&self) -> &BTreeMap<usize, bool> {
        &self.results
    }

    pub fn is_animating(&self) -> bool {
        self.is_animating
    }

    pub fn is_complete(&self) -> bool {
        self.current_index >= self.cards.len()
    }

    pub fn summary(&self) -> Option<&SwipeSummary> {
        self.summary.as_ref()
    }

    // ========== 状态转移 ==========

    /// 判断顶牌（左滑 cap=false / 右滑 legit=true）
    ///
    /// 动画进行中的输入返回 `Ok(None)` 被忽略——这是状态机对
    /// 同一张牌重复结算的防抖。判断正确 = 手势与牌面 `is_true` 一致。
    pub fn resolve(
        &mut self,
        judged_true: bool,
        _now: DateTime<Utc>,
    ) -> EngineResult<Option<SwipeOutcome>> {
        if self.is_complete() {
            return Err(EngineError::SessionState("牌堆已打完".to_string()));
        }
        if self.is_animating {
            return Ok(None);
        }

        let card = &self.cards[self.current_index];
        let is_correct = judged_true == card.is_true;
        self.results.insert(self.current_index, is_correct);
        if is_correct {
            self.score += 1;
        }
        self.is_animating = true;

        Ok(Some(SwipeOutcome {
            word_id: card.word.id.clone(),
            is_correct,
            difficulty: card.word.difficulty_level,
        }))
    }

    /// 滑出动画结束：弹出顶牌并允许下一次输入
    ///
    /// 返回牌堆是否已打完。
    pub fn settle(&mut self) -> bool {
        if self.is_animating {
            self.is_animating = false;
            self.current_index += 1;
        }
        self.is_complete()
    }

    /// 进入总结并固化统计（幂等）
    pub fn finalize(&mut self, now: DateTime<Utc>) -> SwipeSummary {
        if let Some(summary) = &self.summary {
            return summary.clone();
        }

        let correct_count = self.derived_score();
        let diamonds_earned = self.derived_diamonds();
        self.score = correct_count;

        let summary = SwipeSummary {
            total_cards: self.cards.len() as u32,
            correct_count,
            diamonds_earned,
            total_time_secs: (now - self.started_at).num_seconds().max(0),
        };
        self.summary = Some(summary.clone());
        summary
    }

    /// 重开：同一副牌重新洗牌，不重新拉取
    pub fn play_again(&mut self, now: DateTime<Utc>) {
        let mut rng = rand::rng();
        self.cards.shuffle(&mut rng);
        self.current_index = 0;
        self.score = 0;
        self.results.clear();
        self.started_at = now;
        self.is_animating = false;
        self.summary = None;
    }

    // ========== 推导统计 ==========

    /// 从逐张结果重新推导得分
    pub fn derived_score(&self) -> u32 {
        self.results.values().filter(|v| **v).count() as u32
    }

    /// 从逐张结果 × 各牌难度重新推导钻石
    pub fn derived_diamonds(&self) -> u32 {
        self.results
            .iter()
            .filter_map(|(index, is_correct)| {
                self.cards
                    .get(*index)
                    .map(|card| compute_diamond_reward(card.word.difficulty_level, *is_correct))
            })
            .sum()
    }
}
