use std::{
    cell::RefCell,
    rc::Rc,
    sync::mpsc::Sender,
};

use pretty_assertions::assert_eq;

use installment::{
    analytics::{self, Analytics, AnalyticsSink, Params},
    config::COMPLETION_KEY,
    state::AmountEdit,
    storage::{FileFlagStore, FlagStore},
    submission::{Submission, SubmissionOutcome, SubmissionSink},
    Funnel, FunnelConfig, FunnelEvent, NavigationToken, Screen, Term,
};

#[derive(Default, Clone)]
struct Recorder(Rc<RefCell<Vec<(String, Params)>>>);

impl AnalyticsSink for Recorder {
    fn emit(&self, event: &str, params: &Params) {
        self.0.borrow_mut().push((event.to_string(), params.clone()));
    }
}

impl Recorder {
    fn names(&self) -> Vec<String> {
        self.0.borrow().iter().map(|(name, _)| name.clone()).collect()
    }
}

/// Answers every submission with a failure straight away.
struct Unreachable;

impl SubmissionSink for Unreachable {
    fn submit(&self, _submission: Submission, done: Sender<SubmissionOutcome>) {
        done.send(SubmissionOutcome::Failed("connection refused".to_string()))
            .unwrap();
    }
}

fn config() -> FunnelConfig {
    FunnelConfig {
        max_amount: 300_000,
        variant: "b".to_string(),
        ..Default::default()
    }
}

fn open(dir: &std::path::Path, recorder: &Recorder) -> Funnel<FileFlagStore> {
    let mut funnel = Funnel::new(config(), FileFlagStore::in_dir(dir))
        .with_analytics(Analytics::new(Box::new(recorder.clone())))
        .with_submission(Box::new(Unreachable));
    funnel.apply(FunnelEvent::Start);
    funnel
}

#[test]
fn full_session_completes_and_stays_completed_after_reload() {
    let dir = tempfile::tempdir().unwrap();
    let recorder = Recorder::default();
    let mut funnel = open(dir.path(), &recorder);

    assert_eq!(funnel.state().amount(), Some(300_000));

    funnel.apply(FunnelEvent::EditAmount(AmountEdit::Replace("250000".to_string())));
    funnel.apply(FunnelEvent::SelectTerm(Term::Nine));
    assert_eq!(funnel.apply(FunnelEvent::Continue), Screen::Confirm);

    assert_eq!(funnel.apply(FunnelEvent::Submit), Screen::Confirm);
    assert_eq!(funnel.poll_submission(), Screen::Success);

    assert_eq!(
        recorder.names(),
        vec![
            analytics::CALCULATOR_VIEW,
            analytics::CONTINUE_CLICK,
            analytics::CONFIRM_VIEW,
            analytics::SUBMIT_CLICK,
            analytics::SUCCESS_VIEW,
        ]
    );
    {
        let events = recorder.0.borrow();
        let (_, params) = &events[3];
        assert_eq!(params["variant"], "b");
        assert_eq!(params["sum"], 250_000);
        assert_eq!(params["period"], "9");
    }

    let reloaded = open(dir.path(), &Recorder::default());
    assert_eq!(reloaded.screen(), Screen::Success);
    assert!(FileFlagStore::in_dir(dir.path()).is_set(COMPLETION_KEY).unwrap());
}

#[test]
fn reload_cannot_escape_success_through_navigation() {
    let dir = tempfile::tempdir().unwrap();
    FileFlagStore::in_dir(dir.path()).set(COMPLETION_KEY).unwrap();

    let mut funnel = Funnel::new(config(), FileFlagStore::in_dir(dir.path()))
        .with_initial_token(NavigationToken::parse("confirm"));

    assert_eq!(funnel.apply(FunnelEvent::Start), Screen::Success);
    assert_eq!(
        funnel.apply(FunnelEvent::Navigate(NavigationToken::parse(""))),
        Screen::Success
    );
    assert_eq!(funnel.apply(FunnelEvent::HistoryBack), Screen::Success);
    assert_eq!(funnel.apply(FunnelEvent::Continue), Screen::Success);
}

#[test]
fn fresh_session_with_another_state_dir_starts_over() {
    let done = tempfile::tempdir().unwrap();
    FileFlagStore::in_dir(done.path()).set(COMPLETION_KEY).unwrap();
    let fresh = tempfile::tempdir().unwrap();

    let funnel = open(fresh.path(), &Recorder::default());

    assert_eq!(funnel.screen(), Screen::Calculator);
}
