use super::*;

#[test]
fn input_state_default_is_idle() {
    let state = InputState::default();
    assert!(state.is_idle());
    assert!(!state.is_panning());
}

#[test]
fn panning_is_not_idle() {
    let state = InputState::Panning { start_screen: Point::new(0.0, 0.0), orig_pan: Point::new(50.0, 50.0) };
    assert!(state.is_panning());
    assert!(!state.is_idle());
}

#[test]
fn modifiers_default_all_false() {
    let m = Modifiers::default();
    assert!(!m.shift && !m.ctrl && !m.alt && !m.meta);
}

#[test]
fn delete_keys() {
    assert!(Key("Delete".into()).is_delete());
    assert!(Key("Backspace".into()).is_delete());
    assert!(!Key("a".into()).is_delete());
}

#[test]
fn escape_key() {
    assert!(Key("Escape".into()).is_escape());
    assert!(!Key("Esc".into()).is_escape());
}

#[test]
fn button_equality() {
    assert_eq!(Button::Primary, Button::Primary);
    assert_ne!(Button::Primary, Button::Secondary);
}
