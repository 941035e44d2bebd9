//! Conflict resolution state machine.
//!
//! Pure transitions over a single [`EditState`]. The caller decides what to
//! invalidate and when to re-render based on the returned outcome.

use serde_json::Value;

use crate::edit_state::EditState;
use crate::value::values_equal;

/// What a server push did to an attribute's edit state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerUpdateOutcome {
    /// User has a pending value or focus; conflict indicator raised
    Conflict,
    /// User is interacting but already chose to keep their value
    ConflictSuppressed,
    /// No interaction; show the transient update flash
    Flash,
}

impl ServerUpdateOutcome {
    pub fn starts_flash(self) -> bool {
        matches!(self, Self::Flash)
    }
}

/// Reconcile a server push (snapshot already updated) against the edit state.
///
/// The pending user value is never touched here.
pub fn resolve_server_update(state: &mut EditState) -> ServerUpdateOutcome {
    let user_is_interacting = state.pending_value().is_some() || state.is_editing;

    if !user_is_interacting {
        state.show_update_flash = true;
        return ServerUpdateOutcome::Flash;
    }

    if state.user_chose_to_keep {
        return ServerUpdateOutcome::ConflictSuppressed;
    }

    // Focus always seeds a pending value, so an editing state without one only
    // exists if a caller built it by hand; a conflict needs a value to compare.
    state.has_conflict = state.pending_value().is_some();
    if state.has_conflict {
        state.show_update_flash = false;
    }
    ServerUpdateOutcome::Conflict
}

/// Focus gained: lock in the current server value so pushes cannot overwrite
/// what the user is about to edit. No visual change results.
pub fn begin_editing(state: &mut EditState, server_value: Option<&Value>) {
    state.is_editing = true;
    if state.pending_value().is_none() {
        state.change_mut().value = Some(server_value.cloned().unwrap_or(Value::Null));
        state.seeded_from_server = true;
    }
}

/// Focus lost. Returns true when the row's appearance changed and needs a
/// re-render.
pub fn end_editing(state: &mut EditState, server_value: Option<&Value>) -> bool {
    state.is_editing = false;

    let Some(pending) = state.pending_value() else {
        return false;
    };
    if !values_equal(Some(pending), server_value) {
        return false;
    }

    // Back to the server value: no pending value, nothing to conflict with
    let was_visible = !state.seeded_from_server || state.has_conflict;
    state.change_mut().value = None;
    state.prune_change();
    state.has_conflict = false;
    state.seeded_from_server = false;
    was_visible
}

/// The user typed a value that differs from the server
pub fn set_user_value(state: &mut EditState, value: Value) {
    state.change_mut().value = Some(value);
    state.seeded_from_server = false;
    state.user_chose_to_keep = false;
}

/// Discard the pending change in favour of the server value
pub fn accept_server_value(state: &mut EditState) {
    state.user_change = None;
    state.has_conflict = false;
    state.user_chose_to_keep = false;
    state.seeded_from_server = false;
}

/// Dismiss the conflict and keep the pending value. Returns false and leaves
/// the state untouched when no conflict is showing.
pub fn keep_user_value(state: &mut EditState) -> bool {
    if !state.has_conflict {
        return false;
    }
    state.has_conflict = false;
    state.user_chose_to_keep = true;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn editing_with(value: Value) -> EditState {
        let mut state = EditState::default();
        set_user_value(&mut state, value);
        state
    }

    #[test]
    fn idle_field_flashes() {
        let mut state = EditState::default();
        assert_eq!(resolve_server_update(&mut state), ServerUpdateOutcome::Flash);
        assert!(state.show_update_flash);
        assert!(!state.has_conflict);
    }

    #[test]
    fn pending_value_raises_conflict_and_is_kept() {
        let mut state = editing_with(json!(15));
        assert_eq!(
            resolve_server_update(&mut state),
            ServerUpdateOutcome::Conflict
        );
        assert!(state.has_conflict);
        assert_eq!(state.pending_value(), Some(&json!(15)));
    }

    #[test]
    fn conflict_clears_running_flash() {
        let mut state = EditState::default();
        resolve_server_update(&mut state);
        begin_editing(&mut state, Some(&json!(10)));
        resolve_server_update(&mut state);
        assert!(state.has_conflict);
        assert!(!state.show_update_flash);
    }

    #[test]
    fn keep_suppresses_later_conflicts() {
        let mut state = editing_with(json!(15));
        resolve_server_update(&mut state);
        assert!(keep_user_value(&mut state));
        assert!(!state.has_conflict);
        assert!(state.user_chose_to_keep);

        assert_eq!(
            resolve_server_update(&mut state),
            ServerUpdateOutcome::ConflictSuppressed
        );
        assert!(!state.has_conflict);
    }

    #[test]
    fn keep_without_conflict_changes_nothing() {
        let mut state = editing_with(json!(15));
        assert!(!keep_user_value(&mut state));
        assert!(!state.user_chose_to_keep);
        assert_eq!(
            resolve_server_update(&mut state),
            ServerUpdateOutcome::Conflict
        );
        assert!(state.has_conflict);
    }

    #[test]
    fn typing_again_rearms_conflicts() {
        let mut state = editing_with(json!(15));
        resolve_server_update(&mut state);
        assert!(keep_user_value(&mut state));
        set_user_value(&mut state, json!(16));
        assert!(!state.user_chose_to_keep);
        assert_eq!(
            resolve_server_update(&mut state),
            ServerUpdateOutcome::Conflict
        );
    }

    #[test]
    fn focus_seeds_server_value_once() {
        let mut state = EditState::default();
        begin_editing(&mut state, Some(&json!(10)));
        assert!(state.is_editing);
        assert!(state.seeded_from_server);
        assert_eq!(state.pending_value(), Some(&json!(10)));

        set_user_value(&mut state, json!(12));
        begin_editing(&mut state, Some(&json!(99)));
        assert_eq!(state.pending_value(), Some(&json!(12)));
        assert!(!state.seeded_from_server);
    }

    #[test]
    fn focus_on_valueless_attribute_seeds_null() {
        let mut state = EditState::default();
        begin_editing(&mut state, None);
        assert_eq!(state.pending_value(), Some(&Value::Null));
    }

    #[test]
    fn blur_without_change_is_invisible() {
        let mut state = EditState::default();
        begin_editing(&mut state, Some(&json!(10)));
        assert!(!end_editing(&mut state, Some(&json!(10))));
        assert!(state.user_change.is_none());
        assert!(!state.is_editing);
    }

    #[test]
    fn blur_after_typing_back_to_server_value_needs_render() {
        let mut state = EditState::default();
        begin_editing(&mut state, Some(&json!(10)));
        set_user_value(&mut state, json!(10.0));
        assert!(end_editing(&mut state, Some(&json!(10))));
        assert!(state.user_change.is_none());
    }

    #[test]
    fn blur_keeps_diverging_value() {
        let mut state = EditState::default();
        begin_editing(&mut state, Some(&json!(10)));
        set_user_value(&mut state, json!(15));
        assert!(!end_editing(&mut state, Some(&json!(10))));
        assert_eq!(state.pending_value(), Some(&json!(15)));
    }

    #[test]
    fn blur_clearing_value_keeps_meta_edits() {
        let mut state = EditState::default();
        begin_editing(&mut state, Some(&json!(10)));
        state.change_mut().meta.insert(
            "label".to_string(),
            crate::edit_state::MetaChange::Set(json!("Power")),
        );
        end_editing(&mut state, Some(&json!(10)));
        let change = state.user_change.as_ref().unwrap();
        assert!(change.value.is_none());
        assert_eq!(change.meta.len(), 1);
    }

    #[test]
    fn blur_resolves_conflict_when_server_caught_up() {
        let mut state = editing_with(json!(20));
        resolve_server_update(&mut state);
        assert!(state.has_conflict);
        assert!(end_editing(&mut state, Some(&json!(20))));
        assert!(!state.has_conflict);
    }

    #[test]
    fn accept_discards_pending_change() {
        let mut state = editing_with(json!(15));
        resolve_server_update(&mut state);
        accept_server_value(&mut state);
        assert!(state.user_change.is_none());
        assert!(!state.has_conflict);
        assert!(!state.user_chose_to_keep);
    }

    #[test]
    fn accept_while_focused_leaves_nothing_for_blur() {
        let mut state = EditState::default();
        begin_editing(&mut state, Some(&json!(10)));
        set_user_value(&mut state, json!(15));
        resolve_server_update(&mut state);
        accept_server_value(&mut state);
        assert!(state.user_change.is_none());
        assert!(state.is_editing);

        assert!(!end_editing(&mut state, Some(&json!(20))));
        assert!(state.user_change.is_none());
    }
}
