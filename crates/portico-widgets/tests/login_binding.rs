//! End-to-end coverage of the login screen binding driven by a real
//! [`ReactiveChannel`]: discovery, one-time initialization, value derivation,
//! host updates, and subscription lifecycle.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use portico_core::{Element, EventKind, EventKinds, Namespace};
use portico_runtime::{
    BindingError, BindingRegistry, InputValue, ReactiveChannel, UpdateMessage, register_binding,
    with_bindings,
};
use portico_widgets::{LoginScreenBinding, LoginScreens, MARKER_CLASS};

fn channel_with_login_binding() -> (ReactiveChannel, BindingRegistry, LoginScreens) {
    let screens = LoginScreens::new();
    let mut registry = BindingRegistry::new();
    registry.register(Rc::new(LoginScreenBinding::new(screens.clone())));
    (ReactiveChannel::new(), registry, screens)
}

fn page_with_login() -> (Element, Element) {
    let page = Element::new("body");
    let login = Element::new("div")
        .with_class(MARKER_CLASS)
        .with_attr("id", "login1");
    page.append_child(login.clone());
    (page, login)
}

#[test]
fn full_lifecycle_scenario() {
    let (channel, registry, _screens) = channel_with_login_binding();
    let (page, login) = page_with_login();

    // Bind: the login screen is discovered, created, and opened.
    assert_eq!(channel.bind_scope_with(&page, &registry), 1);
    assert_eq!(channel.value(&login), Ok(InputValue::Bool(true)));

    let notifications = Rc::new(Cell::new(0u32));
    let n = Rc::clone(&notifications);
    let _guard = channel
        .watch(&login, move |_| n.set(n.get() + 1))
        .expect("watch");

    // Host sends an update with an empty payload: the screen closes.
    channel
        .deliver(&login, &UpdateMessage::from_json(serde_json::json!({})))
        .expect("deliver");
    assert_eq!(channel.value(&login), Ok(InputValue::Bool(false)));
    assert_eq!(notifications.get(), 1);

    // Host sends again: the screen re-opens (toggle, not set).
    channel
        .deliver(&login, &UpdateMessage::from_json(serde_json::json!({})))
        .expect("deliver");
    assert_eq!(channel.value(&login), Ok(InputValue::Bool(true)));
    assert_eq!(notifications.get(), 2);
}

#[test]
fn rebinding_a_scope_is_idempotent() {
    let (channel, registry, screens) = channel_with_login_binding();
    let (page, login) = page_with_login();

    channel.bind_scope_with(&page, &registry);
    assert_eq!(channel.bind_scope_with(&page, &registry), 0);

    assert_eq!(screens.len(), 1);
    assert_eq!(channel.bound_count(), 1);

    // Exactly one channel notification per user-driven transition.
    let notifications = Rc::new(Cell::new(0u32));
    let n = Rc::clone(&notifications);
    let _guard = channel
        .watch(&login, move |_| n.set(n.get() + 1))
        .expect("watch");

    screens.get(&login).expect("instance").close();
    assert_eq!(notifications.get(), 1);
}

#[test]
fn user_interaction_flows_back_through_the_channel() {
    let (channel, registry, screens) = channel_with_login_binding();
    let (page, login) = page_with_login();
    channel.bind_scope_with(&page, &registry);

    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = Rc::clone(&seen);
    let _guard = channel
        .watch(&login, move |v| s.borrow_mut().push(v.clone()))
        .expect("watch");

    // The user dismisses the screen via the toolkit, then reopens it.
    let screen = screens.get(&login).expect("instance");
    screen.close();
    screen.open();

    assert_eq!(
        *seen.borrow(),
        vec![InputValue::Bool(false), InputValue::Bool(true)]
    );
    assert_eq!(channel.version(&login), Ok(2));
}

#[test]
fn unbind_stops_notifications_but_keeps_the_widget() {
    let (channel, registry, screens) = channel_with_login_binding();
    let (page, login) = page_with_login();
    channel.bind_scope_with(&page, &registry);

    channel.unbind(&login).expect("unbind");
    assert_eq!(
        channel.value(&login),
        Err(BindingError::NotBound {
            element: login.id()
        })
    );

    // The widget instance survives; only the channel let go.
    let screen = screens.get(&login).expect("instance still registered");
    assert!(screen.opened());

    // Transitions after unbind reach no channel listener.
    screen.close();
    assert!(!channel.is_bound(&login));
}

#[test]
fn multiple_login_screens_are_independent() {
    let (channel, registry, _screens) = channel_with_login_binding();
    let page = Element::new("body");
    let first = Element::new("div").with_class(MARKER_CLASS);
    let second = Element::new("div").with_class(MARKER_CLASS);
    page.append_child(first.clone());
    page.append_child(second.clone());

    assert_eq!(channel.bind_scope_with(&page, &registry), 2);

    channel
        .deliver(&first, &UpdateMessage::empty())
        .expect("deliver");
    assert_eq!(channel.value(&first), Ok(InputValue::Bool(false)));
    assert_eq!(
        channel.value(&second),
        Ok(InputValue::Bool(true)),
        "toggling one screen must not touch the other"
    );
}

#[test]
fn shown_forward_is_observable_by_host_listeners() {
    let (channel, registry, screens) = channel_with_login_binding();
    let (page, login) = page_with_login();

    let shown = Rc::new(Cell::new(0u32));
    let s = Rc::clone(&shown);
    login.on(EventKinds::SHOWN, Namespace("host-probe"), move |_| {
        s.set(s.get() + 1);
    });

    // Initialization opens the screen: one Shown forward.
    channel.bind_scope_with(&page, &registry);
    assert_eq!(shown.get(), 1);

    // Every later reopen forwards again.
    let screen = screens.get(&login).expect("instance");
    screen.close();
    screen.open();
    assert_eq!(shown.get(), 2);

    // Emitting Opened by hand exercises the same path.
    login.emit(EventKind::Opened);
    assert_eq!(shown.get(), 3);
}

#[test]
fn composition_root_registration_via_global_registry() {
    // The thread-local registry gives each test thread a fresh instance, so
    // registering here cannot leak into other tests.
    let screens = LoginScreens::new();
    register_binding(Rc::new(LoginScreenBinding::new(screens)));
    assert!(with_bindings(|reg| reg.get("portico.login-screen").is_some()));

    let (page, login) = page_with_login();
    let channel = ReactiveChannel::new();
    assert_eq!(channel.bind_scope(&page), 1);
    assert_eq!(channel.value(&login), Ok(InputValue::Bool(true)));
}
