use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use math_verify::orchestrator::{FETCH_FAILED_MESSAGE, SUBMIT_SUCCESS_MESSAGE};
use math_verify::{
    AppError, AppResult, BatchSession, Confirmer, ProblemApi, ProblemKey, ProblemSource,
    RecordUpdate, ReviewItem, SessionConfig, SubmitOutcome, VerificationStatus,
};
use math_verify::models::{SubmissionItem, SubmitAck};
use tokio::sync::Notify;

const KEY: &str = "test-key";

/// 记录调用的假后端
#[derive(Default)]
struct FakeApi {
    problems: Vec<ProblemSource>,
    fail_fetch: AtomicBool,
    fail_submit: AtomicBool,
    fetch_calls: AtomicUsize,
    submissions: Mutex<Vec<Vec<SubmissionItem>>>,
    fetch_gate: Option<Arc<Notify>>,
}

impl FakeApi {
    fn new(problems: Vec<ProblemSource>) -> Self {
        Self {
            problems,
            ..Default::default()
        }
    }

    fn submissions(&self) -> Vec<Vec<SubmissionItem>> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProblemApi for FakeApi {
    async fn fetch_problems(&self, api_key: &str) -> AppResult<Vec<ProblemSource>> {
        assert_eq!(api_key, KEY);
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.fetch_gate {
            gate.notified().await;
        }
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(AppError::unauthorized("Invalid API Key"));
        }
        Ok(self.problems.clone())
    }

    async fn submit_batch(&self, api_key: &str, items: &[SubmissionItem]) -> AppResult<SubmitAck> {
        assert_eq!(api_key, KEY);
        if self.fail_submit.load(Ordering::SeqCst) {
            return Err(AppError::Other(String::new()));
        }
        self.submissions.lock().unwrap().push(items.to_vec());
        Ok(SubmitAck {
            success: true,
            message: "ok".to_string(),
        })
    }
}

/// 记录确认请求的确认器
struct RecordingConfirmer {
    answer: bool,
    asked: Mutex<Vec<usize>>,
}

impl RecordingConfirmer {
    fn new(answer: bool) -> Self {
        Self {
            answer,
            asked: Mutex::new(Vec::new()),
        }
    }

    fn asked(&self) -> Vec<usize> {
        self.asked.lock().unwrap().clone()
    }
}

#[async_trait]
impl Confirmer for RecordingConfirmer {
    async fn confirm_submit(&self, unverified: usize) -> bool {
        self.asked.lock().unwrap().push(unverified);
        self.answer
    }
}

fn problems(count: u32) -> Vec<ProblemSource> {
    (1..=count)
        .map(|n| ProblemSource {
            id: "PAPER_2023_1".to_string(),
            question_number: n,
            img_url: None,
            markdown: format!("第 {} 题 $$ x^{} $$", n, n),
            knowledge_points: vec!["导数".to_string(), "链式法则".to_string()],
            methods: vec!["直接计算法".to_string()],
        })
        .collect()
}

fn session(api: Arc<FakeApi>, confirmer: Arc<RecordingConfirmer>) -> BatchSession {
    BatchSession::new(SessionConfig::new(KEY), api, confirmer)
}

fn key(n: u32) -> ProblemKey {
    ProblemKey::new("PAPER_2023_1", n)
}

#[tokio::test]
async fn test_load_batch_initializes_pending() {
    let api = Arc::new(FakeApi::new(problems(3)));
    let session = session(api, Arc::new(RecordingConfirmer::new(true)));

    assert_eq!(session.load_batch().await.unwrap(), 3);

    let state = session.snapshot();
    assert_eq!(state.records.len(), 3);
    assert!(state
        .records
        .iter()
        .all(|r| r.status == VerificationStatus::Pending));
    assert_eq!(
        state.records[0].original_knowledge_points(),
        state.records[0].knowledge_points.as_slice()
    );
    assert!(!state.is_loading);
    assert!(state.last_error.is_none());
    assert_eq!(session.progress_percent(), 0.0);
}

#[tokio::test]
async fn test_empty_session_progress_is_zero() {
    let api = Arc::new(FakeApi::new(vec![]));
    let session = session(api, Arc::new(RecordingConfirmer::new(true)));
    assert_eq!(session.progress_percent(), 0.0);

    session.load_batch().await.unwrap();
    assert_eq!(session.completed_count(), 0);
    assert_eq!(session.progress_percent(), 0.0);
}

#[tokio::test]
async fn test_failed_load_preserves_records() {
    let api = Arc::new(FakeApi::new(problems(2)));
    let session = session(api.clone(), Arc::new(RecordingConfirmer::new(true)));
    session.load_batch().await.unwrap();
    session.apply(&key(1), RecordUpdate::status(VerificationStatus::Verified));
    let before = session.records();

    api.fail_fetch.store(true, Ordering::SeqCst);
    let err = session.load_batch().await.unwrap_err();
    assert!(err.is_unauthorized());

    let state = session.snapshot();
    assert_eq!(state.records, before);
    assert_eq!(state.last_error.as_deref(), Some("Invalid API Key"));
    assert!(!state.is_loading);
}

#[tokio::test]
async fn test_load_clears_previous_messages() {
    let api = Arc::new(FakeApi::new(problems(1)));
    let session = session(api.clone(), Arc::new(RecordingConfirmer::new(true)));

    api.fail_fetch.store(true, Ordering::SeqCst);
    assert!(session.load_batch().await.is_err());
    assert!(session.snapshot().last_error.is_some());

    api.fail_fetch.store(false, Ordering::SeqCst);
    session.load_batch().await.unwrap();
    assert!(session.snapshot().last_error.is_none());
}

#[tokio::test]
async fn test_update_record_unknown_key_is_noop() {
    let api = Arc::new(FakeApi::new(problems(2)));
    let session = session(api, Arc::new(RecordingConfirmer::new(true)));
    session.load_batch().await.unwrap();
    let before = session.records();

    assert!(!session.update_record("PAPER_2023_1", 99, RecordUpdate::status(VerificationStatus::Verified)));
    assert!(!session.update_record("OTHER", 1, RecordUpdate::status(VerificationStatus::Verified)));
    assert_eq!(session.records(), before);
}

#[tokio::test]
async fn test_update_record_touches_one_record() {
    let api = Arc::new(FakeApi::new(problems(3)));
    let session = session(api, Arc::new(RecordingConfirmer::new(true)));
    session.load_batch().await.unwrap();
    let before = session.records();

    let record = session.record(&key(2)).unwrap();
    let mut item = ReviewItem::for_record(&record);
    item.begin_edit(&record);
    assert!(session.apply(&key(2), item.save_edit("导数, 链式法则", "直接计算法")));

    let after = session.records();
    assert_eq!(after[0], before[0]);
    assert_eq!(after[2], before[2]);
    assert_eq!(after[1].status, VerificationStatus::Modified);
    assert_eq!(after[1].knowledge_points, vec!["导数", "链式法则"]);
    assert_eq!(after[1].methods, vec!["直接计算法"]);
    assert!((session.progress_percent() - 100.0 / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_submit_with_pending_declined() {
    let api = Arc::new(FakeApi::new(problems(3)));
    let confirmer = Arc::new(RecordingConfirmer::new(false));
    let session = session(api.clone(), confirmer.clone());
    session.load_batch().await.unwrap();
    session.apply(&key(1), RecordUpdate::status(VerificationStatus::Verified));
    let before = session.snapshot();

    let outcome = session.submit_batch().await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Declined { unverified: 2 });
    assert_eq!(confirmer.asked(), vec![2]);
    assert!(api.submissions().is_empty());
    assert_eq!(session.snapshot(), before);
}

#[tokio::test]
async fn test_submit_with_pending_accepted() {
    let api = Arc::new(FakeApi::new(problems(3)));
    let confirmer = Arc::new(RecordingConfirmer::new(true));
    let session = session(api.clone(), confirmer.clone());
    session.load_batch().await.unwrap();
    session.apply(&key(1), RecordUpdate::status(VerificationStatus::Verified));

    let outcome = session.submit_batch().await.unwrap();
    assert_eq!(
        outcome,
        SubmitOutcome::Submitted {
            count: 3,
            message: "ok".to_string()
        }
    );
    assert_eq!(confirmer.asked(), vec![2]);

    let submissions = api.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].len(), 3);
    assert!(submissions[0].iter().all(|item| !item.modified));
}

#[tokio::test]
async fn test_submit_payload_marks_modified() {
    let api = Arc::new(FakeApi::new(problems(3)));
    let confirmer = Arc::new(RecordingConfirmer::new(true));
    let session = session(api.clone(), confirmer.clone());
    session.load_batch().await.unwrap();

    let record = session.record(&key(2)).unwrap();
    let mut item = ReviewItem::for_record(&record);
    session.apply(&key(1), item.verify());
    session.apply(&key(2), item.save_edit("a，b, ,c ", ""));
    session.apply(&key(3), RecordUpdate::status(VerificationStatus::Verified));

    session.submit_batch().await.unwrap();
    assert!(confirmer.asked().is_empty());

    let payload = &api.submissions()[0];
    let flags: Vec<bool> = payload.iter().map(|i| i.modified).collect();
    assert_eq!(flags, vec![false, true, false]);
    assert_eq!(payload[1].final_knowledge_points, vec!["a", "b", "c"]);
    assert!(payload[1].final_methods.is_empty());
    assert_eq!(payload[0].final_methods, vec!["直接计算法"]);
}

#[tokio::test]
async fn test_successful_submit_clears_batch() {
    let api = Arc::new(FakeApi::new(problems(2)));
    let session = session(api, Arc::new(RecordingConfirmer::new(true)));
    session.load_batch().await.unwrap();

    session.submit_batch().await.unwrap();

    let state = session.snapshot();
    assert!(state.records.is_empty());
    assert_eq!(state.last_success_message.as_deref(), Some(SUBMIT_SUCCESS_MESSAGE));
    assert!(!state.is_submitting);
    assert_eq!(state.progress_percent(), 0.0);
}

#[tokio::test]
async fn test_failed_submit_keeps_records_for_retry() {
    let api = Arc::new(FakeApi::new(problems(2)));
    let session = session(api.clone(), Arc::new(RecordingConfirmer::new(true)));
    session.load_batch().await.unwrap();
    session.apply(&key(1), RecordUpdate::status(VerificationStatus::Verified));
    let before = session.records();

    api.fail_submit.store(true, Ordering::SeqCst);
    assert!(session.submit_batch().await.is_err());

    let state = session.snapshot();
    assert_eq!(state.records, before);
    assert_eq!(state.last_error.as_deref(), Some("提交失败"));
    assert!(state.last_success_message.is_none());
    assert!(!state.is_submitting);

    api.fail_submit.store(false, Ordering::SeqCst);
    session.submit_batch().await.unwrap();
    assert!(session.records().is_empty());
    assert_eq!(api.submissions().len(), 1);
}

#[tokio::test]
async fn test_submit_empty_batch_is_noop() {
    let api = Arc::new(FakeApi::new(vec![]));
    let confirmer = Arc::new(RecordingConfirmer::new(true));
    let session = session(api.clone(), confirmer.clone());

    assert_eq!(session.submit_batch().await.unwrap(), SubmitOutcome::NothingToSubmit);
    assert!(confirmer.asked().is_empty());
    assert!(api.submissions().is_empty());
}

#[tokio::test]
async fn test_edits_during_fetch_are_replaced() {
    let gate = Arc::new(Notify::new());
    let api = Arc::new(FakeApi {
        fetch_gate: Some(gate.clone()),
        ..FakeApi::new(problems(2))
    });
    let session = Arc::new(session(api.clone(), Arc::new(RecordingConfirmer::new(true))));

    gate.notify_one();
    session.load_batch().await.unwrap();

    let mut rx = session.subscribe();
    let handle = tokio::spawn({
        let session = session.clone();
        async move { session.load_batch().await }
    });

    rx.wait_for(|s| s.is_loading).await.unwrap();
    assert!(session.apply(&key(1), RecordUpdate::status(VerificationStatus::Verified)));
    assert_eq!(session.completed_count(), 1);

    gate.notify_one();
    assert_eq!(handle.await.unwrap().unwrap(), 2);

    let state = session.snapshot();
    assert!(!state.is_loading);
    assert_eq!(state.completed_count(), 0);
    assert_eq!(api.fetch_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_subscriber_sees_final_state() {
    let api = Arc::new(FakeApi::new(problems(4)));
    let session = session(api, Arc::new(RecordingConfirmer::new(true)));
    let mut rx = session.subscribe();

    session.load_batch().await.unwrap();
    assert!(rx.has_changed().unwrap());

    let state = rx.borrow_and_update().clone();
    assert_eq!(state.records.len(), 4);
    assert!(!state.is_loading);
}

#[tokio::test]
async fn test_fetch_error_without_message_uses_fallback() {
    struct BrokenApi;

    #[async_trait]
    impl ProblemApi for BrokenApi {
        async fn fetch_problems(&self, _api_key: &str) -> AppResult<Vec<ProblemSource>> {
            Err(AppError::Other(String::new()))
        }

        async fn submit_batch(&self, _api_key: &str, _items: &[SubmissionItem]) -> AppResult<SubmitAck> {
            Err(AppError::Other(String::new()))
        }
    }

    let session = BatchSession::new(
        SessionConfig::new(KEY),
        Arc::new(BrokenApi),
        Arc::new(RecordingConfirmer::new(true)),
    );
    assert!(session.load_batch().await.is_err());
    assert_eq!(session.snapshot().last_error.as_deref(), Some(FETCH_FAILED_MESSAGE));
}
