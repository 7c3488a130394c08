//! 引擎编排器
//!
//! 乐观更新的唯一入口：答题/判断先同步落到本地状态
//! （会话、进度表、钻石），再把远端副作用追加入箱。
//! 入箱失败只记日志，练习流程永不被网络阻塞。
//!
//! 并发约束：同一时刻最多一个活动会话（测验或判断），
//! 聚合统计只做字段级合并。

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::error::{EngineError, EngineResult};
use crate::model::{UserStats, WordProgress};
use crate::policy::{apply_quiz_answer, apply_swipe_judgment, compute_diamond_reward};
use crate::session::quiz::{QuizOutcome, QuizSession, QuizStep, QuizSummary};
use crate::session::swipe::{SwipeOutcome, SwipeSession, SwipeSummary};
use crate::storage::outbox::{OutboxMutation, SessionType};
use crate::storage::{PersistedState, Storage};
use crate::sync::gateway::SyncGateway;

// ============================================================
// EngineStore - 引擎编排器
// ============================================================

/// 引擎编排器
///
/// 持有活动会话、用户统计镜像、按单词进度表与本地存储。
/// 泛型网关参数让测试可以注入内存假网关。
pub struct EngineStore<G: SyncGateway> {
    gateway: G,
    storage: Storage,
    stats: UserStats,
    /// 按单词 ID 的进度表（本地镜像，远端 merge 语义）
    progress: HashMap<String, WordProgress>,
    quiz: Option<QuizSession>,
    swipe: Option<SwipeSession>,
}

impl<G: SyncGateway> EngineStore<G> {
    pub fn new(gateway: G, storage: Storage) -> Self {
        Self {
            gateway,
            storage,
            stats: UserStats::default(),
            progress: HashMap::new(),
            quiz: None,
            swipe: None,
        }
    }

    // ========== 只读访问 ==========

    pub fn stats(&self) -> &UserStats {
        &self.stats
    }

    pub fn quiz_session(&self) -> Option<&QuizSession> {
        self.quiz.as_ref()
    }

    pub fn swipe_session(&self) -> Option<&SwipeSession> {
        self.swipe.as_ref()
    }

    pub fn word_progress(&self, word_id: &str) -> Option<&WordProgress> {
        self.progress.get(word_id)
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    // ========== 应用状态持久化 ==========

    /// 读取跨重启存活的应用状态
    pub fn load_persisted(&self) -> EngineResult<PersistedState> {
        self.storage.app_state().load_persisted()
    }

    /// 写入跨重启存活的应用状态
    pub fn save_persisted(&self, state: &PersistedState) -> EngineResult<()> {
        self.storage.app_state().save_persisted(state)
    }

    // ========== 会话启动 ==========

    /// 拉取今日词表并开始测验会话
    ///
    /// 无可练习单词与网络失败是不同的错误，UI 分别处理。
    pub async fn start_quiz_session(&mut self, now: DateTime<Utc>) -> EngineResult<()> {
        let words = self.gateway.fetch_daily_quiz().await?;
        self.quiz = Some(QuizSession::new(words, now)?);
        Ok(())
    }

    /// 拉取今日词表并开始判断会话
    pub async fn start_swipe_session(&mut self, now: DateTime<Utc>) -> EngineResult<()> {
        let words = self.gateway.fetch_daily_quiz().await?;
        if words.is_empty() {
            return Err(EngineError::NoEligibleWords);
        }
        self.swipe = Some(SwipeSession::new(&words, now)?);
        Ok(())
    }

    // ========== 测验流程 ==========

    /// 提交测验答案（同步，零网络 I/O）
    ///
    /// 会话转移 → 奖励计算 → 进度合并 → 统计合并 → 出箱入队。
    pub fn submit_quiz_answer(
        &mut self,
        answer: &str,
        now: DateTime<Utc>,
    ) -> EngineResult<QuizOutcome> {
        let session = self
            .quiz
            .as_mut()
            .ok_or_else(|| EngineError::SessionState("没有活动的测验会话".to_string()))?;

        let outcome = session.select_answer(answer, now)?;
        self.apply_outcome(
            &outcome.word_id,
            outcome.is_correct,
            compute_diamond_reward(outcome.difficulty, outcome.is_correct),
            true,
            now,
        );
        Ok(outcome)
    }

    /// 测验"下一题"
    pub fn advance_quiz(&mut self, now: DateTime<Utc>) -> EngineResult<QuizStep> {
        let session = self
            .quiz
            .as_mut()
            .ok_or_else(|| EngineError::SessionState("没有活动的测验会话".to_string()))?;
        session.advance(now)
    }

    /// 结束测验会话：固化总结、记练习时长、上报正确率
    ///
    /// 幂等：重复调用返回同一份总结，统计落账与入箱只发生在
    /// 首次固化时，不会重复计时长。
    pub fn end_quiz_session(&mut self, now: DateTime<Utc>) -> EngineResult<QuizSummary> {
        let session = self
            .quiz
            .as_mut()
            .ok_or_else(|| EngineError::SessionState("没有活动的测验会话".to_string()))?;

        let newly_finalized = session.summary().is_none();
        let summary = session.finalize(now);
        if newly_finalized {
            self.record_session_end(
                summary.total_time_secs,
                summary.correct_count,
                summary.total_questions,
                SessionType::Quiz,
            );
        }
        Ok(summary)
    }

    /// 清空测验会话
    pub fn reset_quiz_session(&mut self) {
        self.quiz = None;
    }

    /// 测验重开：重新拉取今日词表
    pub async fn play_again_quiz(&mut self, now: DateTime<Utc>) -> EngineResult<()> {
        self.quiz = None;
        self.start_quiz_session(now).await
    }

    // ========== 判断流程 ==========

    /// 提交一次判断（同步，零网络 I/O）
    ///
    /// 动画期间的输入返回 `Ok(None)`，不产生任何状态变更。
    pub fn submit_swipe_judgment(
        &mut self,
        judged_true: bool,
        now: DateTime<Utc>,
    ) -> EngineResult<Option<SwipeOutcome>> {
        let session = self
            .swipe
            .as_mut()
            .ok_or_else(|| EngineError::SessionState("没有活动的判断会话".to_string()))?;

        let Some(outcome) = session.resolve(judged_true, now)? else {
            return Ok(None);
        };

        self.apply_outcome(
            &outcome.word_id,
            outcome.is_correct,
            compute_diamond_reward(outcome.difficulty, outcome.is_correct),
            false,
            now,
        );
        Ok(Some(outcome))
    }

    /// 判断卡滑出动画结束，返回牌堆是否已打完
    pub fn settle_swipe(&mut self) -> EngineResult<bool> {
        let session = self
            .swipe
            .as_mut()
            .ok_or_else(|| EngineError::SessionState("没有活动的判断会话".to_string()))?;
        Ok(session.settle())
    }

    /// 结束判断会话：固化总结、记练习时长、上报正确率
    ///
    /// 与测验结束一样幂等：落账与入箱只发生在首次固化时。
    pub fn end_swipe_session(&mut self, now: DateTime<Utc>) -> EngineResult<SwipeSummary> {
        let session = self
            .swipe
            .as_mut()
            .ok_or_else(|| EngineError::SessionState("没有活动的判断会话".to_string()))?;

        let newly_finalized = session.summary().is_none();
        let summary = session.finalize(now);
        if newly_finalized {
            self.record_session_end(
                summary.total_time_secs,
                summary.correct_count,
                summary.total_cards,
                SessionType::Swipe,
            );
        }
        Ok(summary)
    }

    /// 清空判断会话
    pub fn reset_swipe_session(&mut self) {
        self.swipe = None;
    }

    /// 判断重开：同一副牌重新洗牌，不重新拉取
    pub fn play_again_swipe(&mut self, now: DateTime<Utc>) -> EngineResult<()> {
        let session = self
            .swipe
            .as_mut()
            .ok_or_else(|| EngineError::SessionState("没有活动的判断会话".to_string()))?;
        session.play_again(now);
        Ok(())
    }

    // ========== 资料刷新 ==========

    /// 刷新个人资料并字段级合并到本地统计
    pub async fn refresh_profile(&mut self) -> EngineResult<()> {
        let profile = self.gateway.fetch_profile().await?;
        self.stats.merge_profile(&profile);
        Ok(())
    }

    // ========== 内部：乐观更新 ==========

    /// 应用一次答题/判断结果到本地状态并入箱
    fn apply_outcome(
        &mut self,
        word_id: &str,
        is_correct: bool,
        reward: u32,
        is_quiz: bool,
        now: DateTime<Utc>,
    ) {
        let prev = self
            .progress
            .entry(word_id.to_string())
            .or_insert_with(|| WordProgress::new(word_id));
        let next = if is_quiz {
            apply_quiz_answer(prev, is_correct, now)
        } else {
            apply_swipe_judgment(prev, is_correct, now)
        };
        *prev = next.clone();

        self.stats.add_diamonds(reward);
        self.stats.record_word_practiced();

        let mut mutations = vec![OutboxMutation::WordProgress {
            word_id: word_id.to_string(),
            progress: next,
        }];
        if reward > 0 {
            mutations.push(OutboxMutation::DiamondDelta { amount: reward });
        }
        mutations.push(OutboxMutation::StreakTouch);
        self.enqueue_mutations(&mutations);
    }

    /// 会话结束时的统计落账与入箱
    fn record_session_end(
        &mut self,
        total_time_secs: i64,
        correct_count: u32,
        total_count: u32,
        session_type: SessionType,
    ) {
        // 练习时长向上取整到分钟，不足一分钟按一分钟计
        let minutes = ((total_time_secs.max(0) + 59) / 60) as u32;
        self.stats.add_practice_minutes(minutes);

        let mut mutations = vec![OutboxMutation::PracticeTime {
            minutes,
            session_type,
        }];
        if total_count > 0 {
            let average_accuracy = f64::from(correct_count) / f64::from(total_count) * 100.0;
            mutations.push(OutboxMutation::Accuracy { average_accuracy });
        }
        self.enqueue_mutations(&mutations);
    }

    /// 入箱失败只记日志：本地乐观更新已经生效，绝不回滚
    fn enqueue_mutations(&self, mutations: &[OutboxMutation]) {
        if let Err(e) = self.storage.outbox().enqueue_batch(mutations) {
            log::warn!("出箱入队失败（本地状态保持不变）: {}", e);
        }
    }
}

// ============================================================
// 单元测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DifficultyLevel, QuizPayload, UserProfile, Word};
    use crate::session::quiz::QuizPhase;

    /// 固定词表的假网关
    struct StubGateway {
        words: Vec<Word>,
        profile: UserProfile,
    }

    impl StubGateway {
        fn with_words(words: Vec<Word>) -> Self {
            Self {
                words,
                profile: UserProfile::default(),
            }
        }
    }

    impl SyncGateway for StubGateway {
        async fn fetch_daily_quiz(&self) -> EngineResult<Vec<Word>> {
            if self.words.is_empty() {
                return Err(EngineError::NoEligibleWords);
            }
            Ok(self.words.clone())
        }

        async fn put_word_progress(
            &self,
            _word_id: &str,
            _progress: &WordProgress,
        ) -> EngineResult<()> {
            Ok(())
        }

        async fn add_diamonds(&self, _amount: u32) -> EngineResult<()> {
            Ok(())
        }

        async fn update_streak(&self) -> EngineResult<()> {
            Ok(())
        }

        async fn record_practice_session(
            &self,
            _minutes: u32,
            _session_type: SessionType,
        ) -> EngineResult<()> {
            Ok(())
        }

        async fn put_accuracy(&self, _average_accuracy: f64) -> EngineResult<()> {
            Ok(())
        }

        async fn fetch_profile(&self) -> EngineResult<UserProfile> {
            Ok(self.profile.clone())
        }
    }

    fn make_word(id: &str, difficulty: DifficultyLevel) -> Word {
        Word {
            id: id.to_string(),
            text: format!("word-{id}"),
            definition: format!("definition of {id}"),
            part_of_speech: "noun".to_string(),
            difficulty_level: difficulty,
            examples: vec![],
            synonyms: vec![],
            antonyms: vec![],
            etymology: None,
            quiz: QuizPayload {
                question: format!("What does word-{id} mean?"),
                options: vec!["right".to_string(), "wrong".to_string()],
                correct_options: vec!["right".to_string()],
            },
        }
    }

    fn make_store(words: Vec<Word>) -> EngineStore<StubGateway> {
        let storage = Storage::in_memory().expect("Failed to create storage");
        EngineStore::new(StubGateway::with_words(words), storage)
    }

    #[tokio::test]
    async fn test_start_quiz_no_eligible_words() {
        let mut store = make_store(vec![]);
        let result = store.start_quiz_session(Utc::now()).await;
        assert!(matches!(result, Err(EngineError::NoEligibleWords)));
        // 失败时不留下半初始化的会话
        assert!(store.quiz_session().is_none());
    }

    #[tokio::test]
    async fn test_submit_quiz_answer_applies_locally_and_enqueues() {
        let mut store = make_store(vec![
            make_word("w-1", DifficultyLevel::Intermediate),
            make_word("w-2", DifficultyLevel::Beginner),
        ]);
        let now = Utc::now();
        store.start_quiz_session(now).await.expect("start");

        let outcome = store.submit_quiz_answer("right", now).expect("submit");
        assert!(outcome.is_correct);

        // 本地进度与统计立即生效
        let progress = store.word_progress("w-1").expect("progress recorded");
        assert_eq!(progress.practice_count, 1);
        assert_eq!(progress.recognition_mastery_score, 1);
        assert_eq!(store.stats().diamonds, 2); // 中级答对 2 钻
        assert_eq!(store.stats().daily_progress.words_practiced, 1);

        // 出箱收到进度 + 钻石增量 + 连胜触发三条
        let stats = store.storage().outbox().stats().expect("outbox stats");
        assert_eq!(stats.pending, 3);
    }

    #[tokio::test]
    async fn test_wrong_answer_skips_diamond_delta() {
        let mut store = make_store(vec![make_word("w-1", DifficultyLevel::Advanced)]);
        let now = Utc::now();
        store.start_quiz_session(now).await.expect("start");

        let outcome = store.submit_quiz_answer("wrong", now).expect("submit");
        assert!(!outcome.is_correct);
        assert_eq!(store.stats().diamonds, 0);

        // 答错不入队钻石增量：只有进度 + 连胜两条
        let stats = store.storage().outbox().stats().expect("outbox stats");
        assert_eq!(stats.pending, 2);
    }

    #[tokio::test]
    async fn test_quiz_full_round_and_session_end() {
        let start = Utc::now();
        let mut store = make_store(vec![
            make_word("w-1", DifficultyLevel::Beginner),
            make_word("w-2", DifficultyLevel::Advanced),
        ]);
        store.start_quiz_session(start).await.expect("start");

        store.submit_quiz_answer("right", start).expect("answer 1");
        assert!(matches!(
            store.advance_quiz(start).expect("advance 1"),
            QuizStep::NextQuestion
        ));
        store.submit_quiz_answer("wrong", start).expect("answer 2");
        let step = store
            .advance_quiz(start + chrono::Duration::seconds(90))
            .expect("advance 2");
        assert!(matches!(step, QuizStep::Finished(_)));

        let summary = store
            .end_quiz_session(start + chrono::Duration::seconds(90))
            .expect("end");
        assert_eq!(summary.correct_count, 1);
        assert_eq!(summary.diamonds_earned, 1);

        // 90 秒向上取整为 2 分钟
        assert_eq!(store.stats().daily_progress.practice_time_minutes, 2);

        // 结束后出箱追加了练习时长 + 正确率
        let items = store.storage().outbox().peek(100).expect("peek");
        let kinds: Vec<&str> = items.iter().map(|i| i.kind.as_str()).collect();
        assert!(kinds.contains(&"practice_time"));
        assert!(kinds.contains(&"accuracy"));
    }

    #[tokio::test]
    async fn test_end_quiz_session_idempotent() {
        let start = Utc::now();
        let mut store = make_store(vec![make_word("w-1", DifficultyLevel::Beginner)]);
        store.start_quiz_session(start).await.expect("start");
        store.submit_quiz_answer("right", start).expect("answer");

        let end = start + chrono::Duration::seconds(90);
        let first = store.end_quiz_session(end).expect("first end");
        let minutes = store.stats().daily_progress.practice_time_minutes;
        let pending = store
            .storage()
            .outbox()
            .pending_count()
            .expect("pending count");

        // 总结页重渲染等路径会再次结束会话：统计与出箱不得重复落账
        let second = store
            .end_quiz_session(end + chrono::Duration::seconds(30))
            .expect("second end");
        assert_eq!(first.total_time_secs, second.total_time_secs);
        assert_eq!(store.stats().daily_progress.practice_time_minutes, minutes);
        assert_eq!(
            store
                .storage()
                .outbox()
                .pending_count()
                .expect("pending count"),
            pending
        );

        // 90 秒只记一次（向上取整 2 分钟），练习时长条目只有一条
        assert_eq!(minutes, 2);
        let items = store.storage().outbox().peek(100).expect("peek");
        let practice_items = items.iter().filter(|i| i.kind == "practice_time").count();
        assert_eq!(practice_items, 1);
    }

    #[tokio::test]
    async fn test_end_swipe_session_idempotent() {
        let start = Utc::now();
        let mut store = make_store(vec![
            make_word("w-1", DifficultyLevel::Beginner),
            make_word("w-2", DifficultyLevel::Beginner),
        ]);
        store.start_swipe_session(start).await.expect("start");
        store
            .submit_swipe_judgment(true, start)
            .expect("judge")
            .expect("recorded");
        store.settle_swipe().expect("settle");

        let end = start + chrono::Duration::seconds(60);
        store.end_swipe_session(end).expect("first end");
        let minutes = store.stats().daily_progress.practice_time_minutes;

        store
            .end_swipe_session(end + chrono::Duration::seconds(30))
            .expect("second end");
        assert_eq!(store.stats().daily_progress.practice_time_minutes, minutes);

        let items = store.storage().outbox().peek(100).expect("peek");
        let practice_items = items.iter().filter(|i| i.kind == "practice_time").count();
        assert_eq!(practice_items, 1);
    }

    #[tokio::test]
    async fn test_submit_without_session_rejected() {
        let mut store = make_store(vec![make_word("w-1", DifficultyLevel::Beginner)]);
        let result = store.submit_quiz_answer("right", Utc::now());
        assert!(matches!(result, Err(EngineError::SessionState(_))));
    }

    #[tokio::test]
    async fn test_swipe_judgment_updates_practice_not_mastery() {
        let mut store = make_store(vec![
            make_word("w-1", DifficultyLevel::Beginner),
            make_word("w-2", DifficultyLevel::Beginner),
            make_word("w-3", DifficultyLevel::Beginner),
        ]);
        let now = Utc::now();
        store.start_swipe_session(now).await.expect("start");

        let outcome = store
            .submit_swipe_judgment(true, now)
            .expect("judge")
            .expect("recorded");
        let word_id = outcome.word_id.clone();

        // 判断模式只记练习，不动掌握分
        let progress = store.word_progress(&word_id).expect("progress recorded");
        assert_eq!(progress.practice_count, 1);
        assert_eq!(progress.recognition_mastery_score, 0);
        assert_eq!(progress.usage_mastery_score, 0);
        assert_eq!(progress.number_of_times_to_practice, 3);

        let complete = store.settle_swipe().expect("settle");
        assert!(!complete);
    }

    #[tokio::test]
    async fn test_swipe_animating_input_ignored() {
        let mut store = make_store(vec![
            make_word("w-1", DifficultyLevel::Beginner),
            make_word("w-2", DifficultyLevel::Beginner),
        ]);
        let now = Utc::now();
        store.start_swipe_session(now).await.expect("start");

        store
            .submit_swipe_judgment(true, now)
            .expect("judge")
            .expect("recorded");
        let pending_after_first = store
            .storage()
            .outbox()
            .pending_count()
            .expect("pending count");

        // 动画期间的重复输入：无结果，出箱不增长
        let ignored = store.submit_swipe_judgment(false, now).expect("judge");
        assert!(ignored.is_none());
        assert_eq!(
            store
                .storage()
                .outbox()
                .pending_count()
                .expect("pending count"),
            pending_after_first
        );
    }

    #[tokio::test]
    async fn test_play_again_swipe_resets_without_refetch() {
        let mut store = make_store(vec![
            make_word("w-1", DifficultyLevel::Beginner),
            make_word("w-2", DifficultyLevel::Beginner),
        ]);
        let now = Utc::now();
        store.start_swipe_session(now).await.expect("start");

        store
            .submit_swipe_judgment(true, now)
            .expect("judge")
            .expect("recorded");
        store.settle_swipe().expect("settle");

        store.play_again_swipe(now).expect("play again");
        let session = store.swipe_session().expect("session");
        assert_eq!(session.results().len(), 0);
        assert_eq!(session.cards().len(), 2);
    }

    #[tokio::test]
    async fn test_reset_sessions() {
        let mut store = make_store(vec![make_word("w-1", DifficultyLevel::Beginner)]);
        let now = Utc::now();
        store.start_quiz_session(now).await.expect("start");
        assert!(store.quiz_session().is_some());
        store.reset_quiz_session();
        assert!(store.quiz_session().is_none());
    }

    /// 词表拉取成功但所有上载都被拒绝的假网关
    struct RejectingGateway {
        words: Vec<Word>,
    }

    impl SyncGateway for RejectingGateway {
        async fn fetch_daily_quiz(&self) -> EngineResult<Vec<Word>> {
            Ok(self.words.clone())
        }

        async fn put_word_progress(
            &self,
            _word_id: &str,
            _progress: &WordProgress,
        ) -> EngineResult<()> {
            Err(EngineError::Network("offline".to_string()))
        }

        async fn add_diamonds(&self, _amount: u32) -> EngineResult<()> {
            Err(EngineError::Network("offline".to_string()))
        }

        async fn update_streak(&self) -> EngineResult<()> {
            Err(EngineError::Network("offline".to_string()))
        }

        async fn record_practice_session(
            &self,
            _minutes: u32,
            _session_type: SessionType,
        ) -> EngineResult<()> {
            Err(EngineError::Network("offline".to_string()))
        }

        async fn put_accuracy(&self, _average_accuracy: f64) -> EngineResult<()> {
            Err(EngineError::Network("offline".to_string()))
        }

        async fn fetch_profile(&self) -> EngineResult<UserProfile> {
            Err(EngineError::Network("offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_sync_failure_never_blocks_progression() {
        // 网络层全部拒绝：本地状态仍然同步推进
        let storage = Storage::in_memory().expect("Failed to create storage");
        let gateway = RejectingGateway {
            words: vec![make_word("w-1", DifficultyLevel::Beginner)],
        };
        let mut store = EngineStore::new(gateway, storage);
        let now = Utc::now();
        store.start_quiz_session(now).await.expect("start");

        let outcome = store.submit_quiz_answer("right", now).expect("submit");
        assert!(outcome.is_correct);

        // 本地更新已生效，状态机照常转移到反馈阶段
        assert_eq!(
            store.quiz_session().expect("session").phase(),
            QuizPhase::Feedback
        );
        assert_eq!(store.stats().diamonds, 1);
        assert_eq!(
            store.word_progress("w-1").expect("progress").practice_count,
            1
        );

        // 变更安全地躺在出箱里等待排空
        assert!(
            store
                .storage()
                .outbox()
                .pending_count()
                .expect("pending count")
                > 0
        );
    }

    #[tokio::test]
    async fn test_refresh_profile_merges_fields() {
        let storage = Storage::in_memory().expect("Failed to create storage");
        let gateway = StubGateway {
            words: vec![],
            profile: UserProfile {
                diamonds: Some(50),
                streak: Some(7),
                ..Default::default()
            },
        };
        let mut store = EngineStore::new(gateway, storage);
        store.stats.daily_progress.words_practiced = 4;

        store.refresh_profile().await.expect("refresh");

        assert_eq!(store.stats().diamonds, 50);
        assert_eq!(store.stats().streak, 7);
        // 响应中缺席的字段保留本地值
        assert_eq!(store.stats().daily_progress.words_practiced, 4);
    }

    #[tokio::test]
    async fn test_persisted_state_passthrough() {
        let store = make_store(vec![]);
        let state = PersistedState {
            is_authenticated: true,
            categories: vec!["travel".to_string()],
            ..Default::default()
        };
        store.save_persisted(&state).expect("save");

        let loaded = store.load_persisted().expect("load");
        assert!(loaded.is_authenticated);
        assert_eq!(loaded.categories, vec!["travel".to_string()]);
    }

    #[tokio::test]
    async fn test_quiz_phase_visible_through_store() {
        let mut store = make_store(vec![make_word("w-1", DifficultyLevel::Beginner)]);
        let now = Utc::now();
        store.start_quiz_session(now).await.expect("start");
        assert_eq!(
            store.quiz_session().expect("session").phase(),
            QuizPhase::Question
        );
        store.submit_quiz_answer("right", now).expect("submit");
        assert_eq!(
            store.quiz_session().expect("session").phase(),
            QuizPhase::Feedback
        );
    }
}
