//! The funnel controller.
//!
//! [`Funnel`] owns the session: the calculator inputs, the navigation history,
//! the flag store and the side-effect hooks. Every user action and every
//! external navigation change goes through [`Funnel::apply`], after which the
//! active screen is re-resolved from the completion flag and the current
//! navigation token.
//!
//! | From | Event | Guard | To |
//! |------|-------|-------|----|
//! | any | start / navigation | flag set | Success |
//! | Calculator | `Continue` | amount valid | Confirm |
//! | Confirm | `Back` | | Calculator |
//! | Confirm | `Submit` then `SubmissionSettled` | not already submitting | Success |
//! | Success | `HistoryBack` | | Success |

use std::sync::mpsc::{self, Receiver, Sender};

use chrono::Local;
use tracing::{debug, info, warn};

use crate::analytics::{self, Analytics, Params};
use crate::config::FunnelConfig;
use crate::finance::Term;
use crate::navigation::{resolve_screen, History, NavigationToken, Screen};
use crate::state::{AmountEdit, ApplicationState};
use crate::storage::{read_flag, FlagStore};
use crate::submission::{Submission, SubmissionOutcome, SubmissionSink};

#[derive(Debug, Clone, PartialEq)]
pub enum FunnelEvent {
    /// First render of the session.
    Start,
    EditAmount(AmountEdit),
    SelectTerm(Term),
    /// Forward action on the calculator.
    Continue,
    /// Back button on the confirmation screen.
    Back,
    Submit,
    SubmissionSettled(SubmissionOutcome),
    /// External change of the navigation token.
    Navigate(NavigationToken),
    HistoryBack,
    HistoryForward,
}

pub struct Funnel<S: FlagStore> {
    config: FunnelConfig,
    state: ApplicationState,
    store: S,
    history: History,
    screen: Option<Screen>,
    analytics: Analytics,
    submission: Option<Box<dyn SubmissionSink>>,
    outcome_tx: Sender<SubmissionOutcome>,
    outcome_rx: Receiver<SubmissionOutcome>,
    submitting: bool,
    calculator_viewed: bool,
}

impl<S: FlagStore> Funnel<S> {
    pub fn new(config: FunnelConfig, store: S) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::channel();
        Self {
            state: ApplicationState::new(&config),
            config,
            store,
            history: History::new(NavigationToken::Calculator),
            screen: None,
            analytics: Analytics::disabled(),
            submission: None,
            outcome_tx,
            outcome_rx,
            submitting: false,
            calculator_viewed: false,
        }
    }

    pub fn with_analytics(mut self, analytics: Analytics) -> Self {
        self.analytics = analytics;
        self
    }

    pub fn with_submission(mut self, sink: Box<dyn SubmissionSink>) -> Self {
        self.submission = Some(sink);
        self
    }

    /// Token the session opens on, as if the user followed a bookmark.
    pub fn with_initial_token(mut self, token: NavigationToken) -> Self {
        self.history = History::new(token);
        self
    }

    pub fn config(&self) -> &FunnelConfig {
        &self.config
    }

    pub fn state(&self) -> &ApplicationState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Active screen. Before `Start` this is the screen the session would
    /// open on.
    pub fn screen(&self) -> Screen {
        self.screen.unwrap_or_else(|| self.resolve())
    }

    pub fn is_completed(&self) -> bool {
        read_flag(&self.store, &self.config.storage_key)
    }

    pub fn can_continue(&self) -> bool {
        self.state.is_amount_valid()
    }

    /// False once a submission is in flight, or while the amount no longer
    /// quotes (Confirm is reachable again through history after an edit).
    pub fn can_submit(&self) -> bool {
        self.screen() == Screen::Confirm
            && !self.submitting
            && self.state.is_amount_valid()
            && self.state.quote().is_some()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Applies any submission outcome that has arrived since the last call.
    pub fn poll_submission(&mut self) -> Screen {
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.apply(FunnelEvent::SubmissionSettled(outcome));
        }
        self.screen()
    }

    /// Applies one event and returns the screen that is active afterwards.
    pub fn apply(&mut self, event: FunnelEvent) -> Screen {
        debug!(?event, screen = ?self.screen, "applying event");
        match event {
            FunnelEvent::Start => {
                if self.is_completed() && self.history.current() != NavigationToken::Success {
                    self.history.replace(NavigationToken::Success);
                }
            }
            FunnelEvent::EditAmount(edit) => {
                if self.screen() == Screen::Calculator {
                    self.state.edit_amount(edit);
                }
            }
            FunnelEvent::SelectTerm(term) => {
                if self.screen() == Screen::Calculator {
                    self.state.select_term(term);
                }
            }
            FunnelEvent::Continue => self.continue_to_confirm(),
            FunnelEvent::Back => {
                if self.screen() == Screen::Confirm {
                    self.history.push(NavigationToken::Calculator);
                }
            }
            FunnelEvent::Submit => self.submit(),
            FunnelEvent::SubmissionSettled(outcome) => self.settle_submission(outcome),
            FunnelEvent::Navigate(token) => self.history.push(token),
            FunnelEvent::HistoryBack => {
                if self.screen() == Screen::Success {
                    // Stay on the current entry; history does not grow.
                    debug!("back navigation suppressed on final screen");
                    self.history.replace(self.history.current());
                } else {
                    self.history.back();
                }
            }
            FunnelEvent::HistoryForward => {
                self.history.forward();
            }
        }
        self.refresh_screen()
    }

    fn continue_to_confirm(&mut self) {
        if self.screen() != Screen::Calculator {
            return;
        }
        if !self.can_continue() {
            debug!(amount = self.state.amount_text(), "continue ignored, amount invalid");
            return;
        }
        self.analytics.event(analytics::CONTINUE_CLICK);
        self.history.push(NavigationToken::Confirm);
    }

    fn submit(&mut self) {
        if self.screen() != Screen::Confirm || self.submitting {
            debug!(submitting = self.submitting, "submit ignored");
            return;
        }
        let Some(submission) = self.snapshot() else {
            debug!(amount = self.state.amount_text(), "submit ignored, amount invalid");
            return;
        };
        // Disabled before anything is dispatched, so repeated clicks are no-ops.
        self.submitting = true;

        self.analytics
            .event_with(analytics::SUBMIT_CLICK, &submission_params(&submission));
        info!(
            sum = submission.sum,
            period = %submission.period,
            payment = submission.payment,
            "submitting application"
        );

        if let Some(sink) = &self.submission {
            sink.submit(submission, self.outcome_tx.clone());
        } else {
            self.settle_submission(SubmissionOutcome::Delivered);
        }
    }

    fn settle_submission(&mut self, outcome: SubmissionOutcome) {
        if !self.submitting {
            debug!(?outcome, "stray submission outcome ignored");
            return;
        }
        match &outcome {
            SubmissionOutcome::Delivered => info!("submission delivered"),
            SubmissionOutcome::Failed(reason) => {
                warn!(%reason, "submission failed, continuing to final screen")
            }
        }
        self.submitting = false;
        self.history.push(NavigationToken::Success);
    }

    /// The lead as it stands, or `None` while the amount is out of range.
    fn snapshot(&self) -> Option<Submission> {
        if !self.state.is_amount_valid() {
            return None;
        }
        let sum = self.state.amount()?;
        let quote = self.state.quote()?;
        Some(Submission::new(
            Local::now(),
            &self.config.variant,
            sum,
            self.state.term(),
            quote.payment,
        ))
    }

    fn resolve(&self) -> Screen {
        resolve_screen(self.is_completed(), self.history.current())
    }

    fn refresh_screen(&mut self) -> Screen {
        let next = self.resolve();
        if self.screen != Some(next) {
            info!(from = ?self.screen, to = ?next, token = %self.history.current(), "screen changed");
            self.screen = Some(next);
            self.enter(next);
        }
        next
    }

    fn enter(&mut self, screen: Screen) {
        match screen {
            Screen::Calculator => {
                if !self.calculator_viewed {
                    self.calculator_viewed = true;
                    self.analytics.event(analytics::CALCULATOR_VIEW);
                }
            }
            Screen::Confirm => self.analytics.event(analytics::CONFIRM_VIEW),
            Screen::Success => {
                self.persist_completion();
                self.analytics.event(analytics::SUCCESS_VIEW);
            }
        }
    }

    fn persist_completion(&mut self) {
        let key = self.config.storage_key.clone();
        if self.is_completed() {
            return;
        }
        if let Err(err) = self.store.set(&key) {
            warn!(error = %err, "failed to persist completion flag");
        }
    }
}

fn submission_params(submission: &Submission) -> Params {
    match serde_json::to_value(submission) {
        Ok(serde_json::Value::Object(map)) => map.into_iter().collect(),
        _ => Params::new(),
    }
}
