//! Save-time merge of the layered local changes onto the server snapshot.

use shared_types::Asset;

use crate::edit_state::{AddedAttributes, AssetLevelChanges, EditStateStore};

/// Build the full asset to persist.
///
/// Pure: works on a deep copy and never touches its inputs, so repeated calls
/// with unchanged inputs give identical results.
pub fn build_save_payload(
    live: &Asset,
    asset_changes: &AssetLevelChanges,
    states: &EditStateStore,
    added: &AddedAttributes,
) -> Asset {
    let mut asset = live.clone();
    asset_changes.apply_to(&mut asset);

    for (name, state) in states.iter() {
        let Some(change) = &state.user_change else {
            continue;
        };
        if change.deleted {
            asset.attributes.remove(name);
            continue;
        }
        // Changes to user-added attributes are layered below
        if added.contains_key(name) {
            continue;
        }
        if let Some(attribute) = asset.attributes.get_mut(name) {
            change.apply_to(attribute);
        }
    }

    for (name, definition) in added {
        let mut attribute = definition.clone();
        attribute.name = name.clone();
        if let Some(change) = states.get(name).and_then(|s| s.user_change.as_ref()) {
            if change.deleted {
                continue;
            }
            change.apply_to(&mut attribute);
        }
        asset.attributes.insert(name.clone(), attribute);
    }

    asset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit_state::{EditState, MetaChange};
    use serde_json::json;
    use shared_types::Attribute;

    fn live() -> Asset {
        let mut asset = Asset {
            id: "pump1".to_string(),
            name: "Pump 1".to_string(),
            asset_type: "ThingAsset".to_string(),
            parent_id: Some("site".to_string()),
            path: vec!["site".to_string(), "pump1".to_string()],
            ..Default::default()
        };
        let mut power = Attribute::new("power", "number")
            .with_value(json!(10))
            .with_meta("label", json!("Power"));
        power.timestamp = chrono::DateTime::from_timestamp_millis(1_700_000_000_000);
        asset.attributes.insert("power".to_string(), power);
        asset.attributes.insert(
            "notes".to_string(),
            Attribute::new("notes", "text").with_value(json!("hello")),
        );
        asset
    }

    #[test]
    fn untouched_inputs_reproduce_the_snapshot() {
        let live = live();
        let payload = build_save_payload(
            &live,
            &AssetLevelChanges::default(),
            &EditStateStore::new(),
            &AddedAttributes::new(),
        );
        assert_eq!(payload, live);
    }

    #[test]
    fn value_override_clears_timestamp() {
        let live = live();
        let mut states = EditStateStore::new();
        let mut state = EditState::default();
        crate::conflict::set_user_value(&mut state, json!(15));
        states.set("power", state);

        let payload = build_save_payload(
            &live,
            &AssetLevelChanges::default(),
            &states,
            &AddedAttributes::new(),
        );
        let power = &payload.attributes["power"];
        assert_eq!(power.value, Some(json!(15)));
        assert_eq!(power.timestamp, None);
        assert!(live.attributes["power"].timestamp.is_some());
    }

    #[test]
    fn meta_only_change_keeps_timestamp() {
        let live = live();
        let mut states = EditStateStore::new();
        states
            .entry("power")
            .change_mut()
            .meta
            .insert("label".to_string(), MetaChange::Deleted);

        let payload = build_save_payload(
            &live,
            &AssetLevelChanges::default(),
            &states,
            &AddedAttributes::new(),
        );
        let power = &payload.attributes["power"];
        assert!(power.meta.is_empty());
        assert!(power.timestamp.is_some());
    }

    #[test]
    fn explicit_null_parent_detaches() {
        let live = live();
        let changes = AssetLevelChanges {
            parent_id: Some(None),
            path: Some(vec!["pump1".to_string()]),
            ..Default::default()
        };
        let payload =
            build_save_payload(&live, &changes, &EditStateStore::new(), &AddedAttributes::new());
        assert_eq!(payload.parent_id, None);
        assert_eq!(payload.path, vec!["pump1"]);
        assert_eq!(live.parent_id.as_deref(), Some("site"));
    }

    #[test]
    fn added_attributes_take_their_edits() {
        let live = live();
        let mut added = AddedAttributes::new();
        added.insert("extra".to_string(), Attribute::new("", "number"));
        let mut states = EditStateStore::new();
        crate::conflict::set_user_value(states.entry("extra"), json!(3));

        let payload =
            build_save_payload(&live, &AssetLevelChanges::default(), &states, &added);
        let extra = &payload.attributes["extra"];
        assert_eq!(extra.name, "extra");
        assert_eq!(extra.value, Some(json!(3)));
        assert_eq!(added["extra"].value, None);
    }
}
