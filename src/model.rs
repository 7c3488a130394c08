//! 数据模型定义
//!
//! 定义引擎所需的所有数据结构：单词目录条目、按单词的学习进度、
//! 用户聚合统计，以及个人资料刷新时使用的合并载荷。
//! 线上 JSON 采用 camelCase 字段名。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================
// DifficultyLevel - 难度等级
// ============================================================

/// 单词难度等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    /// 初级
    Beginner,
    /// 中级
    Intermediate,
    /// 高级
    Advanced,
    /// 未知等级（服务端新增等级时的兜底）
    #[serde(other)]
    Unknown,
}

impl DifficultyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Unknown => "unknown",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }
}

// ============================================================
// Word - 单词目录条目
// ============================================================

/// 内嵌测验载荷
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizPayload {
    /// 题目文本
    pub question: String,
    /// 选项集合
    pub options: Vec<String>,
    /// 正确选项集合
    pub correct_options: Vec<String>,
}

/// 单词目录条目（对引擎只读）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    /// 单词唯一标识
    pub id: String,
    /// 单词拼写
    pub text: String,
    /// 释义
    pub definition: String,
    /// 词性
    pub part_of_speech: String,
    /// 难度等级
    pub difficulty_level: DifficultyLevel,
    /// 例句
    #[serde(default)]
    pub examples: Vec<String>,
    /// 同义词
    #[serde(default)]
    pub synonyms: Vec<String>,
    /// 反义词
    #[serde(default)]
    pub antonyms: Vec<String>,
    /// 词源
    #[serde(default)]
    pub etymology: Option<String>,
    /// 内嵌测验载荷
    pub quiz: QuizPayload,
}

impl Word {
    /// 判断给定选项是否为正确答案
    pub fn is_correct_option(&self, option: &str) -> bool {
        self.quiz.correct_options.iter().any(|o| o == option)
    }
}

// ============================================================
// WordProgress - 按单词学习进度
// ============================================================

/// 按 (用户, 单词) 的可变进度记录
///
/// 首次练习某个单词时创建，之后每次答题/判断都会更新。
/// 更新永远是合并语义：未被策略覆盖的字段保留原值。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordProgress {
    /// 进度记录唯一标识 (UUID)
    pub id: String,
    /// 单词 ID
    pub word_id: String,
    /// 认读掌握分（当前策略下单调不减）
    pub recognition_mastery_score: u32,
    /// 运用掌握分（当前策略下单调不减）
    pub usage_mastery_score: u32,
    /// 练习次数
    pub practice_count: u32,
    /// 正确次数
    pub success_count: u32,
    /// 还需练习的次数（只在答对时递减，不会低于 0）
    pub number_of_times_to_practice: u32,
    /// 最后练习时间
    #[serde(default)]
    pub last_practiced: Option<DateTime<Utc>>,
}

impl WordProgress {
    /// 为某个单词创建初始进度
    pub fn new(word_id: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            word_id: word_id.to_string(),
            recognition_mastery_score: 0,
            usage_mastery_score: 0,
            practice_count: 0,
            success_count: 0,
            number_of_times_to_practice: 3,
            last_practiced: None,
        }
    }
}

// ============================================================
// UserStats - 用户聚合统计
// ============================================================

/// 当日进度
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyProgress {
    /// 今日练习单词数
    pub words_practiced: u32,
    /// 今日练习时长（分钟）
    pub practice_time_minutes: u32,
}

/// 学习洞察
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningInsights {
    /// 已掌握单词数
    pub words_mastered: u32,
    /// 平均正确率 (0-100)
    pub accuracy: f64,
}

/// 服务端权威的用户聚合统计，本地保存镜像
///
/// 多个独立流程（测验、判断、连胜更新、偏好更新）都会修改此对象，
/// 每个流程必须在现有对象上做字段级合并，绝不整体替换。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    /// 钻石余额
    pub diamonds: u32,
    /// 连续练习天数（服务端计算）
    pub streak: u32,
    /// 当日进度
    pub daily_progress: DailyProgress,
    /// 学习洞察
    pub learning_insights: LearningInsights,
}

impl UserStats {
    /// 增加钻石（本地增量应用，可交换，与同步完成顺序无关）
    pub fn add_diamonds(&mut self, amount: u32) {
        self.diamonds = self.diamonds.saturating_add(amount);
    }

    /// 记录一次已练习的单词
    pub fn record_word_practiced(&mut self) {
        self.daily_progress.words_practiced = self.daily_progress.words_practiced.saturating_add(1);
    }

    /// 累加练习时长（分钟）
    pub fn add_practice_minutes(&mut self, minutes: u32) {
        self.daily_progress.practice_time_minutes =
            self.daily_progress.practice_time_minutes.saturating_add(minutes);
    }

    /// 合并个人资料刷新结果
    ///
    /// 只覆盖响应中出现的字段，缺失字段保留本地值。
    pub fn merge_profile(&mut self, profile: &UserProfile) {
        if let Some(diamonds) = profile.diamonds {
            self.diamonds = diamonds;
        }
        if let Some(streak) = profile.streak {
            self.streak = streak;
        }
        if let Some(words_practiced) = profile.words_practiced {
            self.daily_progress.words_practiced = words_practiced;
        }
        if let Some(minutes) = profile.practice_time_minutes {
            self.daily_progress.practice_time_minutes = minutes;
        }
        if let Some(mastered) = profile.words_mastered {
            self.learning_insights.words_mastered = mastered;
        }
        if let Some(accuracy) = profile.accuracy {
            self.learning_insights.accuracy = accuracy;
        }
    }
}

// ============================================================
// UserProfile - 个人资料刷新载荷
// ============================================================

/// `GET /me` 的部分响应
///
/// 所有字段可选：刷新响应包含哪些字段，就合并哪些字段。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub diamonds: Option<u32>,
    #[serde(default)]
    pub streak: Option<u32>,
    #[serde(default)]
    pub words_practiced: Option<u32>,
    #[serde(default)]
    pub practice_time_minutes: Option<u32>,
    #[serde(default)]
    pub words_mastered: Option<u32>,
    #[serde(default)]
    pub accuracy: Option<f64>,
}
