//! Calculator input state.
//!
//! [`ApplicationState`] is the single mutable record of a session. The
//! derived payment and fee are cached alongside the inputs, and every setter
//! recomputes them before returning, so a reader never observes figures that
//! belong to a previous `(amount, term)` pair.

use tracing::debug;

use crate::config::FunnelConfig;
use crate::finance::{compute_annual_service_fee, compute_monthly_payment, Term};
use crate::validation::{is_amount_valid, parse_amount};

/// Editable amount text with a caret.
///
/// The caret is a char index into `text` and survives every redraw, so the
/// user keeps their place while the figures around the field refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountField {
    text: String,
    cursor: usize,
}

impl AmountField {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.chars().count();
        Self { text, cursor }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    /// Deletes the char before the caret.
    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let at = self.byte_index(self.cursor - 1);
        self.text.remove(at);
        self.cursor -= 1;
    }

    /// Deletes the char under the caret.
    pub fn delete(&mut self) {
        if self.cursor >= self.text.chars().count() {
            return;
        }
        let at = self.byte_index(self.cursor);
        self.text.remove(at);
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    /// Replaces the text, keeping the caret where it was when it still fits.
    pub fn replace(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.cursor.min(self.text.chars().count());
    }
}

/// Figures shown next to the inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub payment: f64,
    pub service_fee: f64,
}

/// Edits applied to the amount field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountEdit {
    Insert(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    Replace(String),
}

#[derive(Debug, Clone)]
pub struct ApplicationState {
    amount: AmountField,
    term: Term,
    rate: f64,
    min_amount: i64,
    max_amount: i64,
    quote: Option<Quote>,
}

impl ApplicationState {
    pub fn new(config: &FunnelConfig) -> Self {
        let mut state = Self {
            amount: AmountField::new(config.starting_amount().to_string()),
            term: config.default_term,
            rate: config.rate,
            min_amount: config.min_amount,
            max_amount: config.max_amount,
            quote: None,
        };
        state.recompute();
        state
    }

    pub fn amount_field(&self) -> &AmountField {
        &self.amount
    }

    pub fn amount_text(&self) -> &str {
        self.amount.text()
    }

    /// Integer-parsed amount, `None` when the field holds no number.
    pub fn amount(&self) -> Option<i64> {
        parse_amount(self.amount.text())
    }

    pub fn term(&self) -> Term {
        self.term
    }

    pub fn min_amount(&self) -> i64 {
        self.min_amount
    }

    pub fn max_amount(&self) -> i64 {
        self.max_amount
    }

    pub fn is_amount_valid(&self) -> bool {
        is_amount_valid(self.amount.text(), self.min_amount, self.max_amount)
    }

    /// Payment and fee for the current inputs. `None` while the field holds
    /// no positive number.
    pub fn quote(&self) -> Option<Quote> {
        self.quote
    }

    pub fn edit_amount(&mut self, edit: AmountEdit) {
        match edit {
            AmountEdit::Insert(c) => self.amount.insert(c),
            AmountEdit::Backspace => self.amount.backspace(),
            AmountEdit::Delete => self.amount.delete(),
            AmountEdit::Left => self.amount.move_left(),
            AmountEdit::Right => self.amount.move_right(),
            AmountEdit::Home => self.amount.move_home(),
            AmountEdit::End => self.amount.move_end(),
            AmountEdit::Replace(text) => self.amount.replace(text),
        }
        self.recompute();
    }

    pub fn select_term(&mut self, term: Term) {
        self.term = term;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.quote = self.amount().filter(|amount| *amount > 0).map(|amount| {
            let amount = amount as f64;
            Quote {
                payment: compute_monthly_payment(amount, self.term, self.rate),
                service_fee: compute_annual_service_fee(amount, self.term, self.rate),
            }
        });
        debug!(
            amount = self.amount.text(),
            term = self.term.months(),
            payment = self.quote.map(|q| q.payment),
            "recomputed quote"
        );
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn state() -> ApplicationState {
        ApplicationState::new(&FunnelConfig::default())
    }

    // =========================================================================
    // AmountField tests
    // =========================================================================

    #[test]
    fn field_starts_with_caret_at_end() {
        let field = AmountField::new("5000");

        assert_eq!(field.cursor(), 4);
    }

    #[test]
    fn field_inserts_at_caret() {
        let mut field = AmountField::new("5000");
        field.move_home();
        field.move_right();

        field.insert('7');

        assert_eq!(field.text(), "57000");
        assert_eq!(field.cursor(), 2);
    }

    #[test]
    fn field_backspace_and_delete_around_caret() {
        let mut field = AmountField::new("12345");
        field.move_left();
        field.move_left();

        field.backspace();
        assert_eq!(field.text(), "1245");
        assert_eq!(field.cursor(), 2);

        field.delete();
        assert_eq!(field.text(), "125");
        assert_eq!(field.cursor(), 2);
    }

    #[test]
    fn field_edges_are_no_ops() {
        let mut field = AmountField::new("9");
        field.delete();
        field.move_right();
        assert_eq!(field.text(), "9");
        assert_eq!(field.cursor(), 1);

        field.move_home();
        field.backspace();
        field.move_left();
        assert_eq!(field.text(), "9");
        assert_eq!(field.cursor(), 0);
    }

    #[test]
    fn field_replace_clamps_caret() {
        let mut field = AmountField::new("100000");

        field.replace("42");

        assert_eq!(field.cursor(), 2);
    }

    // =========================================================================
    // ApplicationState tests
    // =========================================================================

    #[test]
    fn new_state_uses_configured_defaults() {
        let state = state();

        assert_eq!(state.amount_text(), "100000");
        assert_eq!(state.term(), Term::Twelve);
        assert_eq!(
            state.quote(),
            Some(Quote {
                payment: 9263.0,
                service_fee: 20_000.0,
            })
        );
    }

    #[test]
    fn quote_follows_every_amount_edit() {
        let mut state = state();

        state.edit_amount(AmountEdit::Replace("40000".to_string()));
        state.select_term(Term::Three);

        let quote = state.quote().unwrap();
        assert_eq!(quote.payment, compute_monthly_payment(40_000.0, Term::Three, 0.20));
        assert!((quote.service_fee - 2_000.0).abs() < 1e-9);
    }

    #[test]
    fn quote_follows_term_selection() {
        let mut state = state();
        let before = state.quote().unwrap();

        state.select_term(Term::Six);

        assert_ne!(state.quote().unwrap(), before);
        assert_eq!(state.quote().unwrap().service_fee, 10_000.0);
    }

    #[test]
    fn non_numeric_amount_clears_quote_and_invalidates() {
        let mut state = state();

        state.edit_amount(AmountEdit::Replace(String::new()));

        assert_eq!(state.quote(), None);
        assert!(!state.is_amount_valid());
    }

    #[test]
    fn out_of_range_amount_still_quotes() {
        let mut state = state();

        state.edit_amount(AmountEdit::Replace("500".to_string()));

        assert!(!state.is_amount_valid());
        assert!(state.quote().is_some());
    }

    #[test]
    fn caret_moves_do_not_change_quote() {
        let mut state = state();
        let before = state.quote();

        state.edit_amount(AmountEdit::Home);

        assert_eq!(state.quote(), before);
        assert_eq!(state.amount_field().cursor(), 0);
    }
}
