//! In-process message bus shared by hosted apps: presence, channel pub/sub, and named services.
//!
//! One [`MessageBus`] is created per shell and handed out through context. Every operation runs
//! synchronously on the UI thread; only [`MessageBus::call_service`] returns a future, and it
//! suspends only inside the invoked method.

use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet, HashMap},
    fmt,
    rc::{Rc, Weak},
};

use desktop_app_contract::{BusMessage, ServiceMethod, WindowRuntimeId};
use leptos::logging;
use serde_json::Value;
use thiserror::Error;

/// Subscriber callback. Returning `Err` reports a failed delivery without affecting other
/// subscribers.
pub type SubscriberCallback = Rc<dyn Fn(&BusMessage) -> Result<(), String>>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Failures surfaced to [`MessageBus::call_service`] callers.
pub enum BusError {
    /// No service is registered under the requested name.
    #[error("service `{0}` not found")]
    ServiceNotFound(String),
    /// The service exists but has no such method.
    #[error("method `{method}` not found on service `{service}`")]
    MethodNotFound {
        /// Service name.
        service: String,
        /// Requested method.
        method: String,
    },
    /// The method ran and returned an error.
    #[error("service `{service}` method `{method}` failed: {message}")]
    MethodFailed {
        /// Service name.
        service: String,
        /// Invoked method.
        method: String,
        /// Error reported by the method.
        message: String,
    },
}

struct SubscriberEntry {
    id: u64,
    app_id: String,
    channel: String,
    callback: SubscriberCallback,
}

struct ServiceEntry {
    app_id: String,
    methods: HashMap<String, ServiceMethod>,
}

#[derive(Default)]
struct BusRegistry {
    next_subscription_id: u64,
    /// App id to the windows currently hosting it.
    active_apps: BTreeMap<String, BTreeSet<WindowRuntimeId>>,
    /// Kept in subscription order, which is delivery order.
    subscribers: Vec<SubscriberEntry>,
    services: HashMap<String, ServiceEntry>,
}

impl BusRegistry {
    fn drop_app(&mut self, app_id: &str) {
        self.active_apps.remove(app_id);
        self.subscribers.retain(|entry| entry.app_id != app_id);
        self.services.retain(|_, service| service.app_id != app_id);
    }
}

/// Handle returned by [`MessageBus::subscribe`].
///
/// Dropping the handle keeps the subscription alive; call [`Subscription::unsubscribe`] to end it.
#[derive(Clone)]
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<BusRegistry>>,
}

impl Subscription {
    /// Removes the subscription. Calling it more than once, or after the owning app was
    /// unregistered, does nothing.
    pub fn unsubscribe(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .borrow_mut()
                .subscribers
                .retain(|entry| entry.id != self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// Shared bus handle; clones refer to the same registry.
#[derive(Clone, Default)]
pub struct MessageBus {
    registry: Rc<RefCell<BusRegistry>>,
}

impl fmt::Debug for MessageBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.borrow();
        f.debug_struct("MessageBus")
            .field("active_apps", &registry.active_apps.keys().collect::<Vec<_>>())
            .field("subscribers", &registry.subscribers.len())
            .field("services", &registry.services.len())
            .finish()
    }
}

impl MessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `app_id` active for `window_id`.
    pub fn register_app(&self, app_id: &str, window_id: WindowRuntimeId) {
        self.registry
            .borrow_mut()
            .active_apps
            .entry(app_id.to_string())
            .or_default()
            .insert(window_id);
    }

    /// Removes `app_id` with every subscription and service it owns.
    pub fn unregister_app(&self, app_id: &str) {
        self.registry.borrow_mut().drop_app(app_id);
    }

    /// Detaches one hosting window; the app is unregistered once its last window is gone.
    pub fn release_window(&self, app_id: &str, window_id: WindowRuntimeId) {
        let mut registry = self.registry.borrow_mut();
        let now_empty = match registry.active_apps.get_mut(app_id) {
            Some(windows) => {
                windows.remove(&window_id);
                windows.is_empty()
            }
            None => return,
        };
        if now_empty {
            registry.drop_app(app_id);
        }
    }

    /// Snapshot of registered app ids, sorted.
    pub fn active_apps(&self) -> Vec<String> {
        self.registry.borrow().active_apps.keys().cloned().collect()
    }

    pub fn is_app_active(&self, app_id: &str) -> bool {
        self.registry.borrow().active_apps.contains_key(app_id)
    }

    /// Subscribes `app_id` to `channel`. Callbacks on one channel run in subscription order.
    pub fn subscribe(
        &self,
        app_id: &str,
        channel: &str,
        callback: impl Fn(&BusMessage) -> Result<(), String> + 'static,
    ) -> Subscription {
        let mut registry = self.registry.borrow_mut();
        registry.next_subscription_id += 1;
        let id = registry.next_subscription_id;
        registry.subscribers.push(SubscriberEntry {
            id,
            app_id: app_id.to_string(),
            channel: channel.to_string(),
            callback: Rc::new(callback),
        });
        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.registry
            .borrow()
            .subscribers
            .iter()
            .filter(|entry| entry.channel == channel)
            .count()
    }

    /// Delivers `data` on `channel` and returns how many callbacks ran.
    ///
    /// Without a `target` every subscriber on the channel receives it, the sender included. With a
    /// `target` only that app's subscribers receive it, and never the sender itself.
    pub fn send_message(
        &self,
        sender: &str,
        channel: &str,
        data: Value,
        target: Option<&str>,
    ) -> usize {
        let recipients: Vec<(String, SubscriberCallback)> = self
            .registry
            .borrow()
            .subscribers
            .iter()
            .filter(|entry| entry.channel == channel)
            .filter(|entry| match target {
                None => true,
                Some(target) => entry.app_id == target && entry.app_id != sender,
            })
            .map(|entry| (entry.app_id.clone(), entry.callback.clone()))
            .collect();

        if recipients.is_empty() {
            return 0;
        }

        let message = BusMessage {
            sender: sender.to_string(),
            target: target.map(str::to_string),
            channel: channel.to_string(),
            data,
            timestamp_unix_ms: platform_host::unix_time_ms_now(),
        };

        for (app_id, callback) in &recipients {
            if let Err(err) = callback(&message) {
                logging::warn!(
                    "bus subscriber `{app_id}` failed on channel `{channel}` (from `{sender}`): {err}"
                );
            }
        }
        recipients.len()
    }

    /// Registers `methods` under the global service `name`, replacing any previous holder.
    pub fn register_service(
        &self,
        app_id: &str,
        name: &str,
        methods: HashMap<String, ServiceMethod>,
    ) {
        self.registry.borrow_mut().services.insert(
            name.to_string(),
            ServiceEntry {
                app_id: app_id.to_string(),
                methods,
            },
        );
    }

    pub fn unregister_service(&self, name: &str) {
        self.registry.borrow_mut().services.remove(name);
    }

    pub fn has_service(&self, name: &str) -> bool {
        self.registry.borrow().services.contains_key(name)
    }

    /// Invokes `method` on service `service` with positional `args`.
    ///
    /// # Errors
    ///
    /// [`BusError::ServiceNotFound`] and [`BusError::MethodNotFound`] for lookup failures;
    /// [`BusError::MethodFailed`] carries the method's own error.
    pub async fn call_service(
        &self,
        service: &str,
        method: &str,
        args: Vec<Value>,
    ) -> Result<Value, BusError> {
        let handler = {
            let registry = self.registry.borrow();
            let entry = registry
                .services
                .get(service)
                .ok_or_else(|| BusError::ServiceNotFound(service.to_string()))?;
            entry
                .methods
                .get(method)
                .cloned()
                .ok_or_else(|| BusError::MethodNotFound {
                    service: service.to_string(),
                    method: method.to_string(),
                })?
        };

        handler(args).await.map_err(|message| BusError::MethodFailed {
            service: service.to_string(),
            method: method.to_string(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use desktop_app_contract::service_method;
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn recorder(bus: &MessageBus, app_id: &str, channel: &str) -> Rc<RefCell<Vec<BusMessage>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        bus.subscribe(app_id, channel, move |message| {
            sink.borrow_mut().push(message.clone());
            Ok(())
        });
        seen
    }

    fn echo_methods() -> HashMap<String, ServiceMethod> {
        let mut methods = HashMap::new();
        methods.insert(
            "echo".to_string(),
            service_method(|args: Vec<Value>| async move { Ok::<Value, String>(Value::Array(args)) }),
        );
        methods.insert(
            "fail".to_string(),
            service_method(|_args: Vec<Value>| async move { Err::<Value, String>("boom".to_string()) }),
        );
        methods
    }

    #[test]
    fn targeted_message_reaches_only_the_target() {
        let bus = MessageBus::new();
        bus.register_app("a", 1);
        bus.register_app("b", 2);
        let a_seen = recorder(&bus, "a", "x");
        let b_seen = recorder(&bus, "b", "x");

        let delivered = bus.send_message("a", "x", json!({"n": 1}), Some("b"));

        assert_eq!(delivered, 1);
        assert!(a_seen.borrow().is_empty());
        let b_seen = b_seen.borrow();
        assert_eq!(b_seen.len(), 1);
        assert_eq!(b_seen[0].sender, "a");
        assert_eq!(b_seen[0].target.as_deref(), Some("b"));
        assert_eq!(b_seen[0].data, json!({"n": 1}));
    }

    #[test]
    fn broadcast_includes_sender_but_targeting_self_does_not() {
        let bus = MessageBus::new();
        bus.register_app("a", 1);
        let a_seen = recorder(&bus, "a", "x");

        assert_eq!(bus.send_message("a", "x", json!("hi"), None), 1);
        assert_eq!(a_seen.borrow().len(), 1);
        assert_eq!(a_seen.borrow()[0].sender, "a");

        assert_eq!(bus.send_message("a", "x", json!("me?"), Some("a")), 0);
        assert_eq!(a_seen.borrow().len(), 1);
    }

    #[test]
    fn delivery_follows_subscription_order_and_channel() {
        let bus = MessageBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for name in ["first", "second", "third"] {
            let order = order.clone();
            bus.subscribe(name, "news", move |_| {
                order.borrow_mut().push(name);
                Ok(())
            });
        }
        let other = recorder(&bus, "first", "other");

        bus.send_message("x", "news", Value::Null, None);

        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
        assert!(other.borrow().is_empty());
    }

    #[test]
    fn failing_subscriber_does_not_stop_delivery() {
        let bus = MessageBus::new();
        bus.subscribe("broken", "x", |_| Err("handler exploded".to_string()));
        let healthy = recorder(&bus, "healthy", "x");

        let delivered = bus.send_message("a", "x", json!(1), None);

        assert_eq!(delivered, 2);
        assert_eq!(healthy.borrow().len(), 1);
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let bus = MessageBus::new();
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let subscription = bus.subscribe("a", "x", move |_| {
            counter.set(counter.get() + 1);
            Ok(())
        });

        bus.send_message("b", "x", Value::Null, None);
        subscription.unsubscribe();
        subscription.unsubscribe();
        bus.send_message("b", "x", Value::Null, None);

        assert_eq!(hits.get(), 1);
        assert_eq!(bus.subscriber_count("x"), 0);
    }

    #[test]
    fn callbacks_may_reenter_the_bus() {
        let bus = MessageBus::new();
        let inner_bus = bus.clone();
        let replies = recorder(&bus, "a", "reply");
        bus.subscribe("b", "ping", move |message| {
            inner_bus.send_message("b", "reply", message.data.clone(), Some("a"));
            inner_bus.subscribe("b", "late", |_| Ok(()));
            Ok(())
        });

        bus.send_message("a", "ping", json!("p"), Some("b"));

        assert_eq!(replies.borrow().len(), 1);
        assert_eq!(replies.borrow()[0].data, json!("p"));
        assert_eq!(bus.subscriber_count("late"), 1);
    }

    #[test]
    fn unregister_app_drops_subscriptions_and_services() {
        let bus = MessageBus::new();
        bus.register_app("a", 1);
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        bus.subscribe("a", "x", move |_| {
            counter.set(counter.get() + 1);
            Ok(())
        });
        bus.register_service("a", "svc", echo_methods());

        bus.unregister_app("a");

        assert_eq!(bus.send_message("b", "x", Value::Null, None), 0);
        assert_eq!(hits.get(), 0);
        assert_eq!(
            block_on(bus.call_service("svc", "echo", vec![])),
            Err(BusError::ServiceNotFound("svc".to_string()))
        );
        assert!(bus.active_apps().is_empty());
    }

    #[test]
    fn release_window_keeps_app_until_last_window_goes() {
        let bus = MessageBus::new();
        bus.register_app("me", 1);
        bus.register_app("me", 2);
        bus.register_service("me", "profile", echo_methods());

        bus.release_window("me", 1);
        assert!(bus.is_app_active("me"));
        assert!(bus.has_service("profile"));

        bus.release_window("me", 2);
        assert!(!bus.is_app_active("me"));
        assert!(!bus.has_service("profile"));
    }

    #[test]
    fn active_apps_is_a_sorted_snapshot() {
        let bus = MessageBus::new();
        bus.register_app("settings", 3);
        bus.register_app("explorer", 1);
        assert_eq!(bus.active_apps(), vec!["explorer", "settings"]);
    }

    #[test]
    fn call_service_resolves_and_reports_lookup_failures() {
        let bus = MessageBus::new();
        bus.register_service("a", "svc", echo_methods());

        assert_eq!(
            block_on(bus.call_service("svc", "echo", vec![json!(1), json!("two")])),
            Ok(json!([1, "two"]))
        );
        assert_eq!(
            block_on(bus.call_service("svc", "missing", vec![])),
            Err(BusError::MethodNotFound {
                service: "svc".to_string(),
                method: "missing".to_string(),
            })
        );
        assert_eq!(
            block_on(bus.call_service("nope", "echo", vec![])),
            Err(BusError::ServiceNotFound("nope".to_string()))
        );
        let err = block_on(bus.call_service("svc", "fail", vec![])).expect_err("method fails");
        assert_eq!(err.to_string(), "service `svc` method `fail` failed: boom");
    }

    #[test]
    fn registering_a_taken_service_name_overwrites_it() {
        let bus = MessageBus::new();
        bus.register_service("a", "svc", echo_methods());
        let mut replacement = HashMap::new();
        replacement.insert(
            "echo".to_string(),
            service_method(|_args: Vec<Value>| async move { Ok::<Value, String>(json!("replaced")) }),
        );
        bus.register_service("b", "svc", replacement);

        assert_eq!(
            block_on(bus.call_service("svc", "echo", vec![])),
            Ok(json!("replaced"))
        );

        bus.unregister_app("a");
        assert!(bus.has_service("svc"));
        bus.unregister_service("svc");
        assert!(!bus.has_service("svc"));
    }
}
