#![forbid(unsafe_code)]

//! Integration tests: the binder driven end-to-end through the fake engine.

use std::cell::Cell;
use std::rc::Rc;

use serde_json::json;
use tether_core::{LocalValue, Mode, SettleState, SyncError};
use tether_harness::{EngineEvent, FakeEngine, ResetKind, store_with};
use tether_runtime::{
    BindOptions, Binder, Declaration, Reset, Source, plan,
};

fn room_binder(engine: &FakeEngine) -> Binder {
    Binder::new(
        store_with([
            ("items", LocalValue::list()),
            ("profile", LocalValue::item()),
        ]),
        Rc::new(engine.clone()),
    )
}

// ============================================================================
// Declarative creation
// ============================================================================

#[test]
fn declared_list_binding_reaches_the_collection_engine() {
    let engine = FakeEngine::new();
    let binder = room_binder(&engine);

    let declaration = Declaration::of(plan! {
        "items" => Source::query("rooms/1/items").order_by_key(),
    });
    binder.mount(Some(&declaration)).expect("mount");

    assert_eq!(binder.binding_count(), 1);
    assert_eq!(
        binder.source_ref("items").map(|sref| sref.to_string()),
        Some("rooms/1/items".to_owned())
    );
    assert_eq!(
        engine.events(),
        vec![EngineEvent::Attach {
            key: "items".into(),
            mode: Mode::List,
            reference: "rooms/1/items".into(),
        }],
        "an ordered-collection target must reach the collection entry point"
    );
}

#[test]
fn initial_snapshot_lands_in_the_list_and_settles_the_ticket() {
    let engine = FakeEngine::new();
    let binder = room_binder(&engine);

    let tickets = binder
        .mount(Some(&Declaration::of(plan! {
            "items" => Source::query("rooms/1/items"),
        })))
        .expect("mount");
    let (_, ticket) = &tickets[0];
    assert_eq!(ticket.state(), SettleState::Pending);

    engine.resolve_with("items", json!([{"body": "hi"}, {"body": "yo"}]));
    assert_eq!(ticket.state(), SettleState::Resolved);
    assert_eq!(
        binder
            .store()
            .borrow()
            .get("items")
            .and_then(LocalValue::as_list)
            .map(|items| items.len()),
        Some(2)
    );
}

// ============================================================================
// Rebinding
// ============================================================================

#[test]
fn rebind_releases_prior_handle_before_new_attach() {
    let engine = FakeEngine::new();
    let binder = room_binder(&engine);

    binder
        .bind("profile", Source::reference("users/ada"), &BindOptions::new())
        .expect("first bind");
    binder
        .bind("profile", Source::reference("users/grace"), &BindOptions::new())
        .expect("rebind");

    let events = engine.events();
    assert_eq!(
        events,
        vec![
            EngineEvent::Attach {
                key: "profile".into(),
                mode: Mode::Item,
                reference: "users/ada".into(),
            },
            EngineEvent::Release {
                key: "profile".into(),
                // Default reset policy, not waiting: passed through verbatim.
                reset: ResetKind::Clear,
            },
            EngineEvent::Attach {
                key: "profile".into(),
                mode: Mode::Item,
                reference: "users/grace".into(),
            },
        ],
        "exactly one teardown of the prior handle, strictly before the new attach"
    );
}

#[test]
fn waiting_rebind_before_first_snapshot_keeps_the_old_value() {
    let engine = FakeEngine::new();
    let store = store_with([("profile", LocalValue::Item(json!({"name": "Ada"})))]);
    let binder = Binder::new(Rc::clone(&store), Rc::new(engine.clone()));

    let options = BindOptions::new().wait(true).reset(Reset::Keep);
    let first = binder
        .bind("profile", Source::reference("users/ada"), &options)
        .expect("first bind");
    let second = binder
        .bind("profile", Source::reference("users/grace"), &options)
        .expect("rebind before the first snapshot arrives");

    // The new entry is visible synchronously, independent of settlement.
    assert_eq!(first.state(), SettleState::Pending);
    assert_eq!(second.state(), SettleState::Pending);
    assert_eq!(
        binder.source_ref("profile").map(|sref| sref.to_string()),
        Some("users/grace".to_owned())
    );

    // Waiting + non-producer reset: teardown suppressed, old value retained.
    assert_eq!(
        engine.events()[1],
        EngineEvent::Release {
            key: "profile".into(),
            reset: ResetKind::Keep,
        }
    );
    assert_eq!(
        store.borrow().get("profile"),
        Some(&LocalValue::Item(json!({"name": "Ada"})))
    );
}

#[test]
fn waiting_rebind_honors_an_explicit_reset_producer() {
    let engine = FakeEngine::new();
    let store = store_with([("profile", LocalValue::Item(json!({"name": "Ada"})))]);
    let binder = Binder::new(Rc::clone(&store), Rc::new(engine.clone()));

    binder
        .bind("profile", Source::reference("users/ada"), &BindOptions::new())
        .expect("first bind");

    let ran = Rc::new(Cell::new(false));
    let flag = Rc::clone(&ran);
    let options = BindOptions::new().wait(true).reset(Reset::with(move || {
        flag.set(true);
        json!({"name": "…"})
    }));
    binder
        .bind("profile", Source::reference("users/grace"), &options)
        .expect("rebind");

    assert!(ran.get(), "caller-supplied producer runs at teardown");
    assert_eq!(
        store.borrow().get("profile"),
        Some(&LocalValue::Item(json!({"name": "…"})))
    );
}

#[test]
fn mode_selection_ignores_the_source_shape() {
    let engine = FakeEngine::new();
    let binder = room_binder(&engine);

    // A single-value-looking source against a list-tagged property still
    // goes to the collection engine: the local tag is the only authority.
    binder
        .bind("items", Source::reference("rooms/1/items"), &BindOptions::new())
        .expect("bind");
    assert!(matches!(
        engine.events()[0],
        EngineEvent::Attach { mode: Mode::List, .. }
    ));
}

// ============================================================================
// Unbinding and destruction
// ============================================================================

#[test]
fn unbind_with_literal_reset_leaves_no_trace() {
    let engine = FakeEngine::new();
    let binder = room_binder(&engine);
    binder
        .bind("profile", Source::reference("users/ada"), &BindOptions::new())
        .expect("bind");

    binder
        .unbind("profile", Some(Reset::Value(json!("offline"))))
        .expect("unbind");

    assert!(!binder.is_bound("profile"));
    assert!(binder.source_ref("profile").is_none());
    assert!(binder.refs().iter().all(|(key, _)| key != "profile"));
    assert_eq!(
        engine.events().last(),
        Some(&EngineEvent::Release {
            key: "profile".into(),
            reset: ResetKind::Value(json!("offline")),
        })
    );
}

#[test]
fn destroy_tears_down_every_key_present() {
    let engine = FakeEngine::new();
    let binder = room_binder(&engine);
    binder
        .mount(Some(&Declaration::of(plan! {
            "items" => Source::query("rooms/1/items"),
            "profile" => Source::reference("users/ada"),
        })))
        .expect("mount");
    assert_eq!(engine.live_count(), 2);

    binder.destroy();
    assert_eq!(binder.binding_count(), 0);
    assert!(binder.refs().is_empty());
    assert_eq!(engine.live_count(), 0);

    let releases: Vec<_> = engine
        .events()
        .into_iter()
        .filter_map(|event| match event {
            EngineEvent::Release { key, reset } => Some((key, reset)),
            _ => None,
        })
        .collect();
    assert_eq!(releases.len(), 2);
    assert!(
        releases.iter().all(|(_, reset)| *reset == ResetKind::Keep),
        "destruction leaves properties at their last value"
    );
}

#[test]
fn rejection_reaches_the_ticket_and_nothing_retries() {
    let engine = FakeEngine::new();
    let binder = room_binder(&engine);
    let ticket = binder
        .bind("profile", Source::reference("users/ada"), &BindOptions::new())
        .expect("bind");

    let outcome = Rc::new(Cell::new(None));
    let seen = Rc::clone(&outcome);
    ticket.on_settle(move |result| {
        seen.set(Some(result.is_err()));
    });

    engine.reject_with(
        "profile",
        SyncError::PermissionDenied {
            reference: Source::reference("users/ada").canonical_ref(),
        },
    );
    assert_eq!(outcome.get(), Some(true));
    assert_eq!(ticket.state(), SettleState::Rejected);
    assert_eq!(engine.attach_count(), 1, "no retry at the orchestration layer");
    // The failed entry stays registered until the caller unbinds or rebinds.
    assert!(binder.is_bound("profile"));
}

#[test]
fn pending_ticket_may_still_settle_after_unbind() {
    let engine = FakeEngine::new();
    let binder = room_binder(&engine);
    let ticket = binder
        .bind("profile", Source::reference("users/ada"), &BindOptions::new())
        .expect("bind");

    binder.unbind("profile", None).expect("unbind");
    assert_eq!(
        ticket.state(),
        SettleState::Pending,
        "unbinding detaches but does not force-settle"
    );
}
