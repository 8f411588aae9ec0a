use uuid::Uuid;

use super::*;

// =============================================================
// Modifiers
// =============================================================

#[test]
fn modifiers_default_all_false() {
    let m = Modifiers::default();
    assert!(!m.shift);
    assert!(!m.ctrl);
    assert!(!m.alt);
    assert!(!m.meta);
    assert!(!m.command());
    assert!(!m.precision());
}

#[test]
fn command_accepts_ctrl_or_meta() {
    assert!(Modifiers { ctrl: true, ..Default::default() }.command());
    assert!(Modifiers { meta: true, ..Default::default() }.command());
    assert!(!Modifiers { alt: true, shift: true, ..Default::default() }.command());
}

#[test]
fn precision_is_shift() {
    assert!(Modifiers { shift: true, ..Default::default() }.precision());
    assert!(!Modifiers { alt: true, ..Default::default() }.precision());
}

// =============================================================
// Key
// =============================================================

#[test]
fn key_match_ignores_case() {
    assert!(Key("a".into()).is("A"));
    assert!(Key("Escape".into()).is("escape"));
    assert!(!Key("Delete".into()).is("Backspace"));
}

// =============================================================
// DropPayload
// =============================================================

#[test]
fn url_payload_uses_first_url_and_strips_scheme() {
    let p = DropPayload::Urls(vec!["file:///home/me/stone.png".into(), "file:///x.png".into()]);
    assert_eq!(p.path().as_deref(), Some("/home/me/stone.png"));
    assert!(p.is_acceptable());
}

#[test]
fn text_payload_is_trimmed() {
    let p = DropPayload::Text("  textures/wall.JPG\n".into());
    assert_eq!(p.path().as_deref(), Some("textures/wall.JPG"));
    assert!(p.is_acceptable());
}

#[test]
fn non_image_payloads_rejected() {
    assert!(!DropPayload::Text("notes.txt".into()).is_acceptable());
    assert!(!DropPayload::Urls(vec!["file:///tmp/level.yaml".into()]).is_acceptable());
    assert!(!DropPayload::Urls(Vec::new()).is_acceptable());
    assert!(!DropPayload::Text("   ".into()).is_acceptable());
}

// =============================================================
// InputState
// =============================================================

#[test]
fn input_state_default_is_idle() {
    let s = InputState::default();
    assert!(s.is_idle());
    assert_eq!(s.target(), None);
}

#[test]
fn gesture_target() {
    let id = Uuid::new_v4();
    let s = InputState::DraggingTexture { id, start_scene: Point::default(), orig_offset: Point::default() };
    assert!(!s.is_idle());
    assert_eq!(s.target(), Some(id));

    let dup = InputState::Duplicating(Duplication::new(id, Point::default()));
    assert_eq!(dup.target(), Some(id));

    let pan = InputState::Panning { last_screen: Point::default() };
    assert_eq!(pan.target(), None);
}

#[test]
fn gesture_names() {
    assert_eq!(InputState::Idle.name(), "idle");
    let dup = InputState::Duplicating(Duplication::new(Uuid::new_v4(), Point::default()));
    assert_eq!(dup.name(), "duplicate");
}
