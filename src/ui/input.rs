//! Key bindings for each screen.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::finance::Term;
use crate::funnel::FunnelEvent;
use crate::navigation::Screen;
use crate::state::AmountEdit;

#[derive(Debug, Clone, PartialEq)]
pub enum KeyAction {
    Apply(FunnelEvent),
    Quit,
    Ignore,
}

/// Maps a key press on `screen` to what the session should do with it.
pub fn key_action(screen: Screen, term: Term, key: KeyEvent) -> KeyAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return KeyAction::Quit;
    }
    if key.modifiers.contains(KeyModifiers::ALT) {
        return match key.code {
            KeyCode::Left => KeyAction::Apply(FunnelEvent::HistoryBack),
            KeyCode::Right => KeyAction::Apply(FunnelEvent::HistoryForward),
            _ => KeyAction::Ignore,
        };
    }
    match key.code {
        KeyCode::Char('[') => return KeyAction::Apply(FunnelEvent::HistoryBack),
        KeyCode::Char(']') => return KeyAction::Apply(FunnelEvent::HistoryForward),
        _ => {}
    }

    match screen {
        Screen::Calculator => handle_calculator_input(term, key),
        Screen::Confirm => handle_confirm_input(key),
        Screen::Success => handle_success_input(key),
    }
}

fn handle_calculator_input(term: Term, key: KeyEvent) -> KeyAction {
    let edit = |change: AmountEdit| KeyAction::Apply(FunnelEvent::EditAmount(change));
    match key.code {
        KeyCode::Char(c) if c.is_ascii_digit() => edit(AmountEdit::Insert(c)),
        KeyCode::Backspace => edit(AmountEdit::Backspace),
        KeyCode::Delete => edit(AmountEdit::Delete),
        KeyCode::Left => edit(AmountEdit::Left),
        KeyCode::Right => edit(AmountEdit::Right),
        KeyCode::Home => edit(AmountEdit::Home),
        KeyCode::End => edit(AmountEdit::End),
        KeyCode::Tab | KeyCode::Down => KeyAction::Apply(FunnelEvent::SelectTerm(term.next())),
        KeyCode::BackTab | KeyCode::Up => {
            KeyAction::Apply(FunnelEvent::SelectTerm(term.previous()))
        }
        KeyCode::Enter => KeyAction::Apply(FunnelEvent::Continue),
        KeyCode::Esc | KeyCode::Char('q') => KeyAction::Quit,
        _ => KeyAction::Ignore,
    }
}

fn handle_confirm_input(key: KeyEvent) -> KeyAction {
    match key.code {
        KeyCode::Enter | KeyCode::Char('s') => KeyAction::Apply(FunnelEvent::Submit),
        KeyCode::Esc | KeyCode::Char('h') | KeyCode::Left | KeyCode::Backspace => {
            KeyAction::Apply(FunnelEvent::Back)
        }
        KeyCode::Char('q') => KeyAction::Quit,
        _ => KeyAction::Ignore,
    }
}

fn handle_success_input(key: KeyEvent) -> KeyAction {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter => KeyAction::Quit,
        KeyCode::Left | KeyCode::Backspace => KeyAction::Apply(FunnelEvent::HistoryBack),
        _ => KeyAction::Ignore,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn digits_edit_amount_on_calculator() {
        let result = key_action(Screen::Calculator, Term::Twelve, press(KeyCode::Char('7')));

        assert_eq!(
            result,
            KeyAction::Apply(FunnelEvent::EditAmount(AmountEdit::Insert('7')))
        );
    }

    #[test]
    fn letters_are_ignored_on_calculator() {
        let result = key_action(Screen::Calculator, Term::Twelve, press(KeyCode::Char('x')));

        assert_eq!(result, KeyAction::Ignore);
    }

    #[test]
    fn tab_cycles_term() {
        let result = key_action(Screen::Calculator, Term::Twelve, press(KeyCode::Tab));

        assert_eq!(result, KeyAction::Apply(FunnelEvent::SelectTerm(Term::Three)));
    }

    #[test]
    fn enter_continues_then_submits() {
        assert_eq!(
            key_action(Screen::Calculator, Term::Six, press(KeyCode::Enter)),
            KeyAction::Apply(FunnelEvent::Continue)
        );
        assert_eq!(
            key_action(Screen::Confirm, Term::Six, press(KeyCode::Enter)),
            KeyAction::Apply(FunnelEvent::Submit)
        );
    }

    #[test]
    fn escape_goes_back_from_confirm() {
        let result = key_action(Screen::Confirm, Term::Six, press(KeyCode::Esc));

        assert_eq!(result, KeyAction::Apply(FunnelEvent::Back));
    }

    #[test]
    fn brackets_walk_history_on_every_screen() {
        for screen in [Screen::Calculator, Screen::Confirm, Screen::Success] {
            assert_eq!(
                key_action(screen, Term::Nine, press(KeyCode::Char('['))),
                KeyAction::Apply(FunnelEvent::HistoryBack)
            );
        }
    }

    #[test]
    fn ctrl_c_quits_anywhere() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);

        assert_eq!(key_action(Screen::Confirm, Term::Nine, key), KeyAction::Quit);
    }
}
