use anyhow::{Result, anyhow};
use async_trait::async_trait;
use interview_core::{
    FallbackQuestions, GeneratorConfig, InterviewOrchestrator, LLMClient, QuestionGenerator,
    QuestionSource, Role, SessionStore,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Ways the generative service can misbehave, plus the one way it can behave.
#[derive(Clone, Copy, Debug)]
enum Behavior {
    Hang,
    Empty,
    Malformed,
    Fail,
    Panic,
    Valid,
}

struct FakeService {
    behavior: Behavior,
    calls: AtomicUsize,
}

impl FakeService {
    fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl LLMClient for FakeService {
    async fn send(&self, _prompt: String) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            Behavior::Hang => std::future::pending().await,
            Behavior::Empty => Ok(String::new()),
            Behavior::Malformed => Ok("\"?\"".to_string()),
            Behavior::Fail => Err(anyhow!("service unavailable")),
            Behavior::Panic => panic!("service blew up"),
            Behavior::Valid => Ok("1. What did that project teach you?".to_string()),
        }
    }
}

/// Answers after a delay, recording whether it ever got to finish.
struct LateService {
    delay: Duration,
    finished: Arc<AtomicUsize>,
}

#[async_trait]
impl LLMClient for LateService {
    async fn send(&self, _prompt: String) -> Result<String> {
        tokio::time::sleep(self.delay).await;
        self.finished.fetch_add(1, Ordering::SeqCst);
        Ok("A question that arrived far too late?".to_string())
    }
}

fn scenario_questions() -> FallbackQuestions {
    FallbackQuestions::new(
        ["Tell me about yourself.", "What are your strengths?"],
        "That covers our main questions.",
    )
    .unwrap()
}

fn short_timeout() -> GeneratorConfig {
    GeneratorConfig {
        timeout: Duration::from_millis(200),
        ..GeneratorConfig::default()
    }
}

fn orchestrator_with(client: Arc<dyn LLMClient>, config: GeneratorConfig) -> InterviewOrchestrator {
    InterviewOrchestrator::new(
        Arc::new(SessionStore::new()),
        QuestionGenerator::new(client, config),
        scenario_questions(),
    )
}

#[tokio::test]
async fn scenario_forced_fallback_then_reset() {
    let orchestrator = InterviewOrchestrator::new(
        Arc::new(SessionStore::new()),
        QuestionGenerator::disabled(GeneratorConfig::default()),
        scenario_questions(),
    );

    assert!(orchestrator.should_greet("s1").await);
    let greeting = orchestrator.greet("s1").await;
    assert!(!greeting.text.is_empty());
    assert_eq!(greeting.session_id, "s1");
    assert!(!orchestrator.should_greet("s1").await);

    let reply = orchestrator.answer("s1", "hi").await;
    assert_eq!(reply.text, "Tell me about yourself.");
    assert_eq!(reply.source, QuestionSource::Fallback);

    let reply = orchestrator.answer("s1", "ok").await;
    assert_eq!(reply.text, "What are your strengths?");
    assert_eq!(reply.source, QuestionSource::Fallback);

    for answer in ["done", "anything else?", "bye"] {
        let reply = orchestrator.answer("s1", answer).await;
        assert_eq!(reply.text, "That covers our main questions.");
        assert_eq!(reply.source, QuestionSource::Fallback);
    }
    assert_eq!(orchestrator.store().fallback_cursor("s1").await, 2);

    let history = orchestrator.history("s1").await;
    assert_eq!(history.len(), 1 + 2 * 5);
    assert_eq!(history[0].content, greeting.text);
    assert_eq!(history[1].content, "hi");
    assert_eq!(history[1].role, Role::User);
    assert_eq!(history[2].content, "Tell me about yourself.");
    assert_eq!(history[2].role, Role::Assistant);

    orchestrator.reset("s1").await;
    assert!(orchestrator.should_greet("s1").await);
    assert!(orchestrator.history("s1").await.is_empty());

    orchestrator.greet("s1").await;
    let reply = orchestrator.answer("s1", "hi again").await;
    assert_eq!(reply.text, "Tell me about yourself.");
}

#[tokio::test]
async fn answer_always_returns_within_budget() {
    let config = short_timeout();
    let budget = config.timeout + Duration::from_millis(500);

    for behavior in [
        Behavior::Hang,
        Behavior::Empty,
        Behavior::Malformed,
        Behavior::Fail,
        Behavior::Panic,
        Behavior::Valid,
    ] {
        let service = FakeService::new(behavior);
        let orchestrator = orchestrator_with(service.clone(), config.clone());
        orchestrator.greet("s1").await;

        let started = Instant::now();
        let reply = orchestrator.answer("s1", "I led a migration project.").await;
        let elapsed = started.elapsed();

        assert!(!reply.text.is_empty(), "{behavior:?} produced empty text");
        assert!(elapsed < budget, "{behavior:?} took {elapsed:?}");
        assert_eq!(service.calls.load(Ordering::SeqCst), 1, "{behavior:?}");

        match behavior {
            Behavior::Valid => {
                assert_eq!(reply.source, QuestionSource::Generated);
                assert_eq!(reply.text, "What did that project teach you?");
            }
            _ => {
                assert_eq!(reply.source, QuestionSource::Fallback, "{behavior:?}");
                assert_eq!(reply.text, "Tell me about yourself.");
            }
        }
    }
}

#[tokio::test]
async fn late_result_never_touches_the_session() {
    let finished = Arc::new(AtomicUsize::new(0));
    let service = Arc::new(LateService {
        delay: Duration::from_millis(400),
        finished: finished.clone(),
    });
    let orchestrator = orchestrator_with(service, short_timeout());

    let reply = orchestrator.answer("s1", "slow day").await;
    assert_eq!(reply.source, QuestionSource::Fallback);

    tokio::time::sleep(Duration::from_millis(600)).await;

    let history = orchestrator.history("s1").await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].content, "Tell me about yourself.");
    assert!(
        history
            .iter()
            .all(|t| t.content != "A question that arrived far too late?")
    );
    // The timed-out call was cancelled rather than left to finish.
    assert_eq!(finished.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stalled_generation_does_not_block_other_sessions() {
    let config = GeneratorConfig {
        timeout: Duration::from_secs(3),
        ..GeneratorConfig::default()
    };
    let orchestrator = Arc::new(orchestrator_with(FakeService::new(Behavior::Hang), config));

    // Saturate every worker with a call that will never finish.
    let mut stalled = Vec::new();
    for i in 0..6 {
        let orchestrator = orchestrator.clone();
        stalled.push(tokio::spawn(async move {
            orchestrator.answer(&format!("slow-{i}"), "thinking...").await
        }));
    }
    tokio::time::sleep(Duration::from_millis(50)).await;

    let greeting = tokio::time::timeout(Duration::from_millis(200), orchestrator.greet("fast"))
        .await
        .expect("greeting must not wait on stalled generation");
    assert!(!greeting.text.is_empty());
    assert!(!orchestrator.should_greet("fast").await);

    for task in stalled {
        let reply = task.await.unwrap();
        assert_eq!(reply.source, QuestionSource::Fallback);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_answers_on_one_session_stay_paired() {
    let questions: Vec<String> = (0..8).map(|i| format!("Fallback question {i}?")).collect();
    let orchestrator = Arc::new(InterviewOrchestrator::new(
        Arc::new(SessionStore::new()),
        QuestionGenerator::disabled(GeneratorConfig::default()),
        FallbackQuestions::new(questions.clone(), "closing").unwrap(),
    ));

    let mut tasks = Vec::new();
    for i in 0..12 {
        let orchestrator = orchestrator.clone();
        tasks.push(tokio::spawn(async move {
            orchestrator.answer("shared", &format!("answer {i}")).await
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let history = orchestrator.history("shared").await;
    assert_eq!(history.len(), 24);
    for (i, pair) in history.chunks(2).enumerate() {
        assert_eq!(pair[0].role, Role::User);
        assert_eq!(pair[1].role, Role::Assistant);
        let expected = questions.get(i).map(String::as_str).unwrap_or("closing");
        assert_eq!(pair[1].content, expected);
    }
    assert_eq!(orchestrator.store().fallback_cursor("shared").await, 8);
}

#[tokio::test]
async fn turn_order_matches_call_order() {
    let orchestrator = orchestrator_with(FakeService::new(Behavior::Valid), short_timeout());
    orchestrator.greet("s1").await;
    for i in 0..5 {
        orchestrator.answer("s1", &format!("answer {i}")).await;
    }

    let history = orchestrator.history("s1").await;
    let answers: Vec<&str> = history
        .iter()
        .filter(|t| t.role == Role::User)
        .map(|t| t.content.as_str())
        .collect();
    assert_eq!(
        answers,
        vec!["answer 0", "answer 1", "answer 2", "answer 3", "answer 4"]
    );
    assert!(
        history
            .windows(2)
            .all(|w| w[0].timestamp <= w[1].timestamp)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn reads_on_a_session_do_not_wait_for_its_generation() {
    let config = GeneratorConfig {
        timeout: Duration::from_secs(2),
        ..GeneratorConfig::default()
    };
    let orchestrator = Arc::new(orchestrator_with(FakeService::new(Behavior::Hang), config));
    orchestrator.greet("s1").await;

    let pending = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move { orchestrator.answer("s1", "let me think").await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let quick = Duration::from_millis(200);
    let should_greet = tokio::time::timeout(quick, orchestrator.should_greet("s1"))
        .await
        .expect("should_greet waited on generation");
    assert!(!should_greet);

    let history = tokio::time::timeout(quick, orchestrator.history("s1"))
        .await
        .expect("history waited on generation");
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].content, "let me think");

    let greeting = tokio::time::timeout(quick, orchestrator.greet("s1"))
        .await
        .expect("greet waited on generation");
    assert!(!greeting.text.is_empty());

    let reply = pending.await.unwrap();
    assert_eq!(reply.source, QuestionSource::Fallback);
}

#[tokio::test]
async fn queued_answers_share_one_timeout() {
    let config = GeneratorConfig {
        timeout: Duration::from_millis(300),
        ..GeneratorConfig::default()
    };
    let orchestrator = orchestrator_with(FakeService::new(Behavior::Hang), config.clone());

    let started = Instant::now();
    let (first, second) = tokio::join!(
        orchestrator.answer("s1", "first"),
        orchestrator.answer("s1", "second"),
    );
    let elapsed = started.elapsed();

    assert!(
        elapsed < config.timeout + Duration::from_millis(250),
        "two answers took {elapsed:?}"
    );
    assert_eq!(first.source, QuestionSource::Fallback);
    assert_eq!(second.source, QuestionSource::Fallback);

    let history = orchestrator.history("s1").await;
    let turns: Vec<(Role, &str)> = history
        .iter()
        .map(|t| (t.role, t.content.as_str()))
        .collect();
    assert_eq!(
        turns,
        vec![
            (Role::User, "first"),
            (Role::Assistant, "Tell me about yourself."),
            (Role::User, "second"),
            (Role::Assistant, "What are your strengths?"),
        ]
    );
}
