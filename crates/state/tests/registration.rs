//! Registration lifecycle driven by the visibility engine: the store's
//! visible flags track the computed rendered tree, updates are observable
//! before the next validation pass, and cleanup never leaves a stale flag
//! or message behind.

use intake_core::{compute_visibility, person, validate};
use intake_state::FormStore;

fn person_store() -> FormStore {
    let form = person::form();
    let fields: Vec<&str> = form.fields.iter().map(|f| f.name).collect();
    let store = FormStore::new(&fields, &form.initial_values);
    sync_registrations(&store, &fields);
    store
}

/// Reconcile store registrations with the currently computed visibility,
/// registering or deregistering each field at most once per call.
fn sync_registrations(store: &FormStore, fields: &[&str]) {
    let visibility = compute_visibility(&store.values(), &person::visibility_rules());
    for field in fields {
        let should = visibility.is_visible(field);
        let is = store.visible(field).unwrap();
        if should && !is {
            store.register(field).unwrap();
        } else if !should && is {
            store.unregister(field).unwrap();
        }
    }
}

const FIELDS: [&str; 4] = ["firstName", "lastName", "dob", "middleName"];

#[test]
fn initial_sweep_registers_unruled_fields_only() {
    let store = person_store();
    assert!(store.visible("firstName").unwrap());
    assert!(store.visible("dob").unwrap());
    assert!(!store.visible("lastName").unwrap());
    assert!(!store.visible("middleName").unwrap());
}

#[test]
fn editing_the_controller_mounts_and_unmounts_the_dependent() {
    let store = person_store();

    store.set_value("firstName", "Malik").unwrap();
    sync_registrations(&store, &FIELDS);
    assert!(store.visible("lastName").unwrap());

    store.set_value("firstName", "Jane").unwrap();
    sync_registrations(&store, &FIELDS);
    assert!(!store.visible("lastName").unwrap());
}

#[test]
fn unmount_clears_the_dependent_fields_error() {
    let store = person_store();

    // Reveal lastName, blur it, and let validation attach its message.
    store.set_value("firstName", "Malik").unwrap();
    sync_registrations(&store, &FIELDS);
    store.blur("lastName").unwrap();
    let errors = validate(&store.values(), &person::schema()).unwrap();
    store.apply_errors(&errors);
    assert_eq!(
        store.error("lastName").unwrap(),
        Some("Required.".to_string())
    );

    // Changing the controller unmounts lastName; its message must not
    // survive the removal.
    store.set_value("firstName", "Jane").unwrap();
    sync_registrations(&store, &FIELDS);
    assert!(!store.visible("lastName").unwrap());
    assert_eq!(store.error("lastName").unwrap(), None);
}

#[test]
fn registration_update_is_observable_before_validation_reads() {
    let store = person_store();

    store.set_value("firstName", "Malik").unwrap();
    sync_registrations(&store, &FIELDS);

    // The sweep above completed synchronously, so the validation pass that
    // follows sees the value set that made lastName visible and required.
    let errors = validate(&store.values(), &person::schema()).unwrap();
    assert!(store.visible("lastName").unwrap());
    assert_eq!(errors.error("lastName"), Some("Required."));
}

#[test]
fn guard_scoped_registration_survives_early_exits() {
    let store = person_store();

    fn render_pass(store: &FormStore, fail: bool) -> Result<(), String> {
        let _guard = store
            .registration("middleName")
            .map_err(|e| e.to_string())?;
        if fail {
            return Err("render aborted".to_string());
        }
        Ok(())
    }

    // Error path: the guard still releases its assertion.
    assert!(render_pass(&store, true).is_err());
    assert!(!store.visible("middleName").unwrap());

    // Success path: same cleanup.
    render_pass(&store, false).unwrap();
    assert!(!store.visible("middleName").unwrap());
}

#[test]
fn chained_rules_keep_last_known_values_on_unmount() {
    let store = person_store();

    store.set_value("firstName", "Malik").unwrap();
    sync_registrations(&store, &FIELDS);
    store.set_value("lastName", "Mahmud").unwrap();
    sync_registrations(&store, &FIELDS);
    assert!(store.visible("middleName").unwrap());

    // Hiding lastName does not cascade: middleName still sees lastName's
    // last known value "Mahmud" and stays mounted.
    store.set_value("firstName", "Jane").unwrap();
    sync_registrations(&store, &FIELDS);
    assert!(!store.visible("lastName").unwrap());
    assert!(store.visible("middleName").unwrap());
}
