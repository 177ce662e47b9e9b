//! The attendee-facing reservation page

use shot_reserve_core::{ClaimOutcome, EventSettings, Inventory, Item};
use tracing::warn;

use crate::{Api, Backend};

/// State of the public reservation page
pub struct PublicView<B> {
    api: Api<B>,
    settings: EventSettings,
    inventory: Inventory,
    result: Option<ClaimOutcome>,
    loading: bool,
}

impl<B: Backend> PublicView<B> {
    /// Create the view; nothing is fetched until [`Self::refresh()`]
    pub fn new(backend: B) -> Self {
        Self {
            api: Api::new(backend),
            settings: EventSettings::default(),
            inventory: Inventory::default(),
            result: None,
            loading: false,
        }
    }

    /// Re-read settings and inventory
    ///
    /// A failed read keeps the previously displayed value.
    pub fn refresh(&mut self) {
        match self.api.settings() {
            Ok(settings) => self.settings = settings,
            Err(e) => warn!("loading settings failed: {e}"),
        }
        match self.api.inventory() {
            Ok(inventory) => self.inventory = inventory,
            Err(e) => warn!("loading inventory failed: {e}"),
        }
    }

    /// Whether the claim control for `item` is enabled
    pub fn can_claim(&self, item: Item) -> bool {
        !self.loading && self.settings.is_open && self.inventory.get(item) > 0
    }

    /// Claim one `item` for `name`
    ///
    /// The outcome, success or not, is kept as [`Self::result()`].
    pub fn claim(&mut self, item: Item, name: &str) -> &ClaimOutcome {
        self.result = None;

        let name = name.trim();
        let outcome = if name.is_empty() {
            ClaimOutcome::rejected("Please enter your name.")
        } else {
            self.loading = true;
            let outcome = match self.api.claim_shot(name, item) {
                Ok(outcome) => {
                    self.refresh();
                    outcome
                }
                Err(e) => {
                    let message = e.to_string();
                    if message.is_empty() {
                        ClaimOutcome::rejected("Something went wrong.")
                    } else {
                        ClaimOutcome::rejected(message)
                    }
                }
            };
            self.loading = false;
            outcome
        };

        self.result.insert(outcome)
    }

    /// Current event settings
    pub fn settings(&self) -> &EventSettings {
        &self.settings
    }

    /// Current stock
    pub fn inventory(&self) -> Inventory {
        self.inventory
    }

    /// Outcome of the last claim attempt
    pub fn result(&self) -> Option<&ClaimOutcome> {
        self.result.as_ref()
    }

    /// Whether a claim is in flight
    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use shot_reserve_core::{Config, RequestKind};
    use shot_reserve_rocket::Balancer;
    use uuid::Uuid;

    use super::*;
    use crate::{ClientError, LocalBackend};

    fn backend(habu: u32, tequila: u32) -> LocalBackend<Balancer> {
        let config = Config {
            inventory: Inventory { habu, tequila },
            ..Config::default()
        };
        LocalBackend::new(Arc::new(shot_reserve_rocket::launch(&config)))
    }

    /// Counts the requests passing through
    struct Counting<B> {
        inner: B,
        sent: AtomicUsize,
    }

    impl<B: Backend> Backend for Counting<B> {
        fn send(
            &self,
            kind: RequestKind,
            session: Option<Uuid>,
            body: Option<String>,
        ) -> Result<String, ClientError> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            self.inner.send(kind, session, body)
        }
    }

    /// Refuses everything as if the network were down
    struct Offline;

    impl Backend for Offline {
        fn send(&self, _: RequestKind, _: Option<Uuid>, _: Option<String>) -> Result<String, ClientError> {
            Err(ClientError::Transport(String::new()))
        }
    }

    #[test]
    fn blank_name_never_reaches_the_backend() {
        let counting = Arc::new(Counting {
            inner: backend(1, 1),
            sent: AtomicUsize::new(0),
        });
        let mut view = PublicView::new(counting.clone());

        for name in ["", "   ", "\t\n"] {
            let outcome = view.claim(Item::Habu, name);
            assert!(!outcome.ok);
            assert_eq!(outcome.message, "Please enter your name.");
        }
        assert_eq!(counting.sent.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn claim_shows_code_and_refreshes_stock() {
        let mut view = PublicView::new(backend(1, 2));
        view.refresh();
        assert_eq!(view.inventory(), Inventory { habu: 1, tequila: 2 });
        assert!(view.can_claim(Item::Habu));

        let outcome = view.claim(Item::Habu, " Lina ").clone();
        assert!(outcome.ok);
        assert_eq!(outcome.claim_code.as_deref(), Some("001"));
        assert_eq!(view.result(), Some(&outcome));
        assert!(!view.is_loading());

        assert_eq!(view.inventory().habu, 0);
        assert!(!view.can_claim(Item::Habu));
        assert!(view.can_claim(Item::Tequila));

        let outcome = view.claim(Item::Habu, "Ken");
        assert!(!outcome.ok);
        assert_eq!(outcome.message, "Sorry, Habu Snake Liquor is sold out.");
    }

    #[test]
    fn transport_failure_becomes_generic_message() {
        let mut view = PublicView::new(Offline);
        view.refresh();
        assert_eq!(view.settings(), &EventSettings::default());

        let outcome = view.claim(Item::Tequila, "Lina");
        assert!(!outcome.ok);
        assert_eq!(outcome.message, "Something went wrong.");
        assert_eq!(outcome.claim_code, None);
    }
}
