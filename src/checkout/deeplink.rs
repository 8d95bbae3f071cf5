use std::sync::{
    Arc, RwLock,
    atomic::{AtomicU64, Ordering},
};

use crate::checkout::presentation::PresentationDelegate;

/// What happened to a forwarded URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Forwarding {
    /// The delegate claimed the URL as a payment redirect.
    Forwarded,
    /// The delegate looked at the URL and declined it.
    Ignored,
    /// Nothing is registered; the event is dropped.
    NoHandler,
}

struct Registration {
    id: u64,
    delegate: Arc<dyn PresentationDelegate>,
}

/// Explicit URL-event registration owned by the process lifecycle. At most
/// one handler is active; registering again replaces the previous one. The
/// returned guard deregisters on drop, and a stale guard cannot unhook a
/// newer registration.
#[derive(Clone, Default)]
pub struct DeepLinkRouter {
    slot: Arc<RwLock<Option<Registration>>>,
    next_id: Arc<AtomicU64>,
}

impl DeepLinkRouter {
    pub fn register(&self, delegate: Arc<dyn PresentationDelegate>) -> RegistrationGuard {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let previous = self
            .slot
            .write()
            .expect("deep link slot lock")
            .replace(Registration { id, delegate });
        if previous.is_some() {
            tracing::debug!("Replaced previous deep link handler");
        }
        RegistrationGuard {
            router: self.clone(),
            id,
        }
    }

    pub async fn forward(&self, url: &str) -> Forwarding {
        let delegate = {
            let slot = self.slot.read().expect("deep link slot lock");
            match slot.as_ref() {
                Some(registration) => registration.delegate.clone(),
                None => {
                    tracing::warn!("Dropping URL event: no deep link handler registered");
                    return Forwarding::NoHandler;
                }
            }
        };
        if delegate.handle_url(url).await {
            tracing::debug!(%url, "URL claimed by payment redirect handler");
            Forwarding::Forwarded
        } else {
            tracing::debug!(%url, "URL ignored by payment redirect handler");
            Forwarding::Ignored
        }
    }

    fn deregister(&self, id: u64) {
        let mut slot = self.slot.write().expect("deep link slot lock");
        if slot.as_ref().is_some_and(|r| r.id == id) {
            *slot = None;
        }
    }
}

pub struct RegistrationGuard {
    router: DeepLinkRouter,
    id: u64,
}

impl Drop for RegistrationGuard {
    fn drop(&mut self) {
        self.router.deregister(self.id);
    }
}
