use std::{cell::RefCell, collections::HashMap, rc::Rc};

use desktop_app_contract::{service_method, ApplicationId, Point, Size};
use desktop_runtime::{
    apps::{self, ME_APP_ID},
    geometry::{resize_rect, Rect, ResizeEdge},
    interaction::GestureTracker,
    reduce_desktop, BusError, DesktopAction, DesktopState, MessageBus, RuntimeEffect, WindowId,
};
use futures::executor::block_on;
use serde_json::{json, Value};

fn dispatch(state: &mut DesktopState, action: DesktopAction) -> Vec<RuntimeEffect> {
    let transition = reduce_desktop(state, action);
    *state = transition.state;
    transition.effects
}

fn open_me(state: &mut DesktopState) -> WindowId {
    let descriptor = apps::descriptor_for(&ApplicationId::trusted(ME_APP_ID)).expect("me app");
    let id = WindowId(state.next_window_id);
    dispatch(
        state,
        DesktopAction::AddWindow {
            descriptor,
            launcher_ref: None,
        },
    );
    id
}

#[test]
fn open_focus_minimize_close_flow() {
    let mut state = DesktopState::default();
    let t1 = open_me(&mut state);
    let t2 = open_me(&mut state);
    assert_ne!(t1, t2);
    assert_eq!(state.window_ids(), vec![t1, t2]);

    dispatch(&mut state, DesktopAction::Focus { window_id: t1 });
    assert_eq!(state.window_ids(), vec![t2, t1]);
    assert_eq!(state.focused_window_id(), Some(t1));

    dispatch(&mut state, DesktopAction::Minimize { window_id: t2 });
    let visible: Vec<WindowId> = state.visible_windows().map(|w| w.id).collect();
    assert_eq!(visible, vec![t1]);
    assert!(state.window(t2).is_some_and(|w| w.is_minimized));

    let effects = dispatch(&mut state, DesktopAction::Close { window_id: t1 });
    assert_eq!(state.window_ids(), vec![t2]);
    assert_eq!(
        effects,
        vec![RuntimeEffect::WindowClosed {
            window_id: t1,
            app_id: Some(ApplicationId::trusted(ME_APP_ID)),
        }]
    );
    assert_eq!(state.focused_window_id(), None);
}

#[test]
fn targeted_send_reaches_only_the_target_and_broadcast_reaches_sender() {
    let bus = MessageBus::new();
    bus.register_app("a", 1);
    bus.register_app("b", 2);

    let seen_by_a = Rc::new(RefCell::new(Vec::<String>::new()));
    let seen_by_b = Rc::new(RefCell::new(Vec::<String>::new()));
    let a_log = seen_by_a.clone();
    let b_log = seen_by_b.clone();
    let _a = bus.subscribe("a", "x", move |message| {
        a_log.borrow_mut().push(message.sender.clone());
        Ok(())
    });
    let _b = bus.subscribe("b", "x", move |message| {
        b_log.borrow_mut().push(message.sender.clone());
        Ok(())
    });

    assert_eq!(bus.send_message("a", "x", json!({ "n": 1 }), Some("b")), 1);
    assert_eq!(*seen_by_b.borrow(), vec!["a".to_string()]);
    assert!(seen_by_a.borrow().is_empty());

    assert_eq!(bus.send_message("a", "x", json!({ "n": 2 }), None), 2);
    assert_eq!(*seen_by_a.borrow(), vec!["a".to_string()]);
    assert_eq!(seen_by_b.borrow().len(), 2);
}

#[test]
fn unregistering_an_app_drops_its_subscriptions_and_services() {
    let bus = MessageBus::new();
    bus.register_app("a", 1);

    let calls = Rc::new(RefCell::new(0));
    let counter = calls.clone();
    let _subscription = bus.subscribe("a", "x", move |_| {
        *counter.borrow_mut() += 1;
        Ok(())
    });
    let mut methods = HashMap::new();
    methods.insert(
        "ping".to_string(),
        service_method(|_args: Vec<Value>| async { Ok::<Value, String>(json!("pong")) }),
    );
    bus.register_service("a", "svc", methods);

    bus.unregister_app("a");

    assert_eq!(bus.send_message("shell", "x", Value::Null, None), 0);
    assert_eq!(*calls.borrow(), 0);
    match block_on(bus.call_service("svc", "ping", Vec::new())) {
        Err(BusError::ServiceNotFound(name)) => assert_eq!(name, "svc"),
        other => panic!("expected ServiceNotFound, got {other:?}"),
    }
}

/// The fixed right edge (300) decides where the window lands: x == 150 with width 150. Reading
/// the clamp as x == 250 would contradict that edge, since it puts the right edge at 400.
#[test]
fn west_resize_stops_at_min_width_with_right_edge_fixed() {
    let start = Rect::new(Point::new(100, 100), Size::new(200, 200));
    let resized = resize_rect(start, ResizeEdge::West, 100, 0, Size::new(150, 150));

    assert_eq!(resized.width, 150);
    assert_eq!(resized.right(), 300);
    assert_eq!(resized.x, 150);
    assert_eq!(resized.y, 100);
    assert_eq!(resized.height, 200);
}

#[test]
fn drag_gesture_moves_the_window_through_the_reducer() {
    let mut state = DesktopState::default();
    let id = open_me(&mut state);
    let window = state.window(id).cloned().expect("opened");

    let mut tracker = GestureTracker::default();
    let grab = Point::new(window.position.x + 20, window.position.y + 10);
    assert!(tracker.begin_drag(&window, grab));

    let update = tracker.pointer_move(
        Point::new(grab.x + 50, grab.y + 40),
        state.viewport,
        state.borders,
    );
    for action in update.into_actions() {
        dispatch(&mut state, action);
    }
    tracker.end();

    let moved = state.window(id).expect("still open");
    assert_eq!(
        moved.position,
        Point::new(window.position.x + 50, window.position.y + 40)
    );
    assert!(!tracker.is_active());
}

#[test]
fn dragging_an_unfocused_off_screen_window_keeps_the_focus_clamp() {
    let mut state = DesktopState::default();
    let id = open_me(&mut state);
    dispatch(
        &mut state,
        DesktopAction::Move {
            window_id: id,
            position: Point::new(1100, 600),
        },
    );
    open_me(&mut state);
    assert!(state.window(id).is_some_and(|w| !w.is_focused));

    // Pointer down on the title bar: focus first, then start from the clamped record.
    dispatch(&mut state, DesktopAction::Focus { window_id: id });
    let window = state.window(id).cloned().expect("open");
    assert_eq!(window.position, Point::new(760, 332));

    let mut tracker = GestureTracker::default();
    let grab = Point::new(1120, 610);
    assert!(tracker.begin_drag(&window, grab));
    let update = tracker.pointer_move(
        Point::new(grab.x + 1, grab.y),
        state.viewport,
        state.borders,
    );
    for action in update.into_actions() {
        dispatch(&mut state, action);
    }

    assert_eq!(
        state.window(id).expect("open").position,
        Point::new(761, 332)
    );
}

#[test]
fn resize_gesture_never_grows_into_the_taskbar() {
    let mut state = DesktopState::default();
    let id = open_me(&mut state);
    let window = state.window(id).cloned().expect("opened");

    let mut tracker = GestureTracker::default();
    let corner = Point::new(window.rect().right(), window.rect().bottom());
    assert!(tracker.begin_resize(&window, ResizeEdge::SouthEast, corner));
    let update = tracker.pointer_move(Point::new(corner.x, 5000), state.viewport, state.borders);
    for action in update.into_actions() {
        dispatch(&mut state, action);
    }

    let resized = state.window(id).expect("open");
    assert_eq!(resized.position, window.position);
    assert_eq!(resized.rect().bottom(), 800 - 48);
    assert_eq!(resized.size.width, window.size.width);
}
