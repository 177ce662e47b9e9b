//! The staff-facing admin console

use shot_reserve_core::{
    Claim, ClaimStatus, Credentials, EventSettings, Inventory, SessionGrant,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{Api, Backend, ClientError};

/// State of the admin console
///
/// Every successful mutation is followed by a full reload, so the displayed
/// state is always what the backend holds, never an optimistic local copy.
pub struct AdminConsole<B> {
    api: Api<B>,
    session: Option<SessionGrant>,

    settings: EventSettings,
    inventory: Inventory,
    claims: Vec<Claim>,

    /// Raw error text of the last failed action
    message: String,
}

impl<B: Backend> AdminConsole<B> {
    /// Create a signed-out console
    pub fn new(backend: B) -> Self {
        Self {
            api: Api::new(backend),
            session: None,
            settings: EventSettings::default(),
            inventory: Inventory::default(),
            claims: Vec::new(),
            message: String::new(),
        }
    }

    /// Sign in and load everything
    pub fn sign_in(&mut self, email: &str, password: &str) -> Result<(), ClientError> {
        let credentials = Credentials {
            email: email.to_owned(),
            password: password.to_owned(),
        };
        match self.api.sign_in(&credentials) {
            Ok(grant) => {
                info!(email = %grant.email, "admin signed in");
                self.session = Some(grant);
                self.message.clear();
                self.refresh_all();
                Ok(())
            }
            Err(e) => {
                self.message = e.to_string();
                Err(e)
            }
        }
    }

    /// Revoke the session and forget everything only an admin may see
    pub fn sign_out(&mut self) {
        if let Some(grant) = self.session.take() {
            if let Err(e) = self.api.sign_out(grant.session_id) {
                warn!("sign-out failed: {e}");
            }
        }
        self.claims.clear();
    }

    /// Email of the signed-in admin, if any
    pub fn session_email(&self) -> Option<&str> {
        self.session.as_ref().map(|g| g.email.as_str())
    }

    /// Reload settings, inventory and, when signed in, claims
    ///
    /// A failed read keeps the previous value. A session the backend no
    /// longer accepts is dropped.
    pub fn refresh_all(&mut self) {
        match self.api.settings() {
            Ok(settings) => self.settings = settings,
            Err(e) => warn!("loading settings failed: {e}"),
        }
        match self.api.inventory() {
            Ok(inventory) => self.inventory = inventory,
            Err(e) => warn!("loading inventory failed: {e}"),
        }
        let Some(session) = self.session_id() else {
            return;
        };
        match self.api.claims(session) {
            Ok(claims) => self.claims = claims,
            Err(e) if e.is_unauthorized() => {
                warn!("session no longer valid");
                self.session = None;
                self.claims.clear();
            }
            Err(e) => warn!("loading claims failed: {e}"),
        }
    }

    fn session_id(&self) -> Option<Uuid> {
        self.session.as_ref().map(|g| g.session_id)
    }

    /// Run `action` with the session, then reload everything on success
    fn mutate<F>(&mut self, action: F) -> Result<(), ClientError>
    where
        F: FnOnce(&Api<B>, Uuid) -> Result<(), ClientError>,
    {
        let result = match self.session_id() {
            Some(session) => action(&self.api, session),
            None => Err(ClientError::Validation(String::from("Not signed in."))),
        };
        match &result {
            Ok(()) => {
                self.message.clear();
                self.refresh_all();
            }
            Err(e) => self.message = e.to_string(),
        }
        result
    }

    /// Overwrite the event settings
    pub fn save_settings(&mut self, settings: EventSettings) -> Result<(), ClientError> {
        self.mutate(|api, session| api.update_settings(session, &settings).map(drop))
    }

    /// Overwrite the remaining count of every item
    pub fn save_inventory(&mut self, inventory: Inventory) -> Result<(), ClientError> {
        self.mutate(|api, session| api.set_inventory(session, &inventory.rows()))
    }

    /// Move claim `id` to `status`
    pub fn set_claim_status(&mut self, id: u64, status: ClaimStatus) -> Result<(), ClientError> {
        self.mutate(|api, session| api.set_claim_status(session, id, status))
    }

    /// Mark claim `id` as handed out
    pub fn mark_served(&mut self, id: u64) -> Result<(), ClientError> {
        self.set_claim_status(id, ClaimStatus::Served)
    }

    /// Cancel claim `id`
    pub fn void_claim(&mut self, id: u64) -> Result<(), ClientError> {
        self.set_claim_status(id, ClaimStatus::Void)
    }

    /// Delete all claims and restart code sequencing
    ///
    /// Asking for confirmation is up to the caller.
    pub fn reset_reservations(&mut self) -> Result<(), ClientError> {
        let mut reset = false;
        let result = self.mutate(|api, session| {
            api.reset_claims(session)?;
            reset = true;
            Ok(())
        });
        // the stale list goes even if the reload after the reset failed
        if reset {
            self.claims.clear();
        }
        result
    }

    /// Displayed settings
    pub fn settings(&self) -> &EventSettings {
        &self.settings
    }

    /// Displayed stock
    pub fn inventory(&self) -> Inventory {
        self.inventory
    }

    /// Displayed claims, oldest first
    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    /// Error text of the last failed action, empty after a success
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use shot_reserve_core::{AdminAccount, Config, Item, ResetPolicy};
    use shot_reserve_rocket::Balancer;

    use super::*;
    use crate::{LocalBackend, PublicView};

    fn backend(reset_policy: ResetPolicy) -> LocalBackend<Balancer> {
        let config = Config {
            inventory: Inventory { habu: 3, tequila: 3 },
            reset_policy,
            admins: vec![AdminAccount {
                email: "staff@example.com".into(),
                password: "pw".into(),
            }],
            ..Config::default()
        };
        LocalBackend::new(Arc::new(shot_reserve_rocket::launch(&config)))
    }

    fn signed_in(backend: LocalBackend<Balancer>) -> AdminConsole<LocalBackend<Balancer>> {
        let mut console = AdminConsole::new(backend);
        console.sign_in("staff@example.com", "pw").unwrap();
        console
    }

    #[test]
    fn signed_out_console_refuses_mutations() {
        let mut console = AdminConsole::new(backend(ResetPolicy::KeepInventory));
        assert_eq!(console.session_email(), None);

        let err = console.save_inventory(Inventory::default()).unwrap_err();
        assert_eq!(err, ClientError::Validation("Not signed in.".into()));
        assert_eq!(console.message(), "Not signed in.");
        console.sign_in("staff@example.com", "wrong").unwrap_err();
        let err = console.reset_reservations().unwrap_err();
        assert_eq!(err, ClientError::Validation("Not signed in.".into()));
        assert_eq!(console.message(), "Not signed in.");

        let err = console.sign_in("staff@example.com", "wrong").unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(console.message(), "Invalid login credentials.");
    }

    #[test]
    fn mutations_reload_backend_state() {
        let backend = backend(ResetPolicy::KeepInventory);
        let mut public = PublicView::new(backend.clone());
        let mut console = signed_in(backend);
        assert_eq!(console.session_email(), Some("staff@example.com"));
        assert_eq!(console.inventory(), Inventory { habu: 3, tequila: 3 });

        assert!(public.claim(Item::Habu, "Lina").ok);
        assert!(public.claim(Item::Tequila, "Ken").ok);
        console.refresh_all();
        assert_eq!(console.claims().len(), 2);
        assert_eq!(console.claims()[0].name, "Lina");

        let id = console.claims()[0].id;
        console.mark_served(id).unwrap();
        assert_eq!(console.claims()[0].status, ClaimStatus::Served);
        console.void_claim(id).unwrap();
        assert_eq!(console.claims()[0].status, ClaimStatus::Void);

        let err = console.set_claim_status(id, ClaimStatus::Pending).unwrap_err();
        assert!(matches!(err, ClientError::Rejected { status: 409, .. }));
        assert_eq!(console.message(), err.to_string());

        console.save_inventory(Inventory { habu: 9, tequila: 0 }).unwrap();
        assert_eq!(console.inventory(), Inventory { habu: 9, tequila: 0 });
        assert!(console.message().is_empty());

        console
            .save_settings(EventSettings {
                event_time: "19:00".into(),
                location: "Rooftop".into(),
                is_open: false,
            })
            .unwrap();
        public.refresh();
        assert_eq!(public.settings().location, "Rooftop");
        assert!(!public.can_claim(Item::Habu));
    }

    #[test]
    fn reset_clears_claims_and_restarts_codes() {
        let backend = backend(ResetPolicy::RestoreInventory);
        let mut public = PublicView::new(backend.clone());
        let mut console = signed_in(backend);

        console.save_inventory(Inventory { habu: 3, tequila: 5 }).unwrap();
        assert!(public.claim(Item::Tequila, "Lina").ok);
        assert!(public.claim(Item::Tequila, "Ken").ok);

        console.reset_reservations().unwrap();
        assert!(console.claims().is_empty());
        assert_eq!(console.inventory(), Inventory { habu: 3, tequila: 5 });

        let outcome = public.claim(Item::Tequila, "Mia");
        assert_eq!(outcome.claim_code.as_deref(), Some("001"));
    }

    #[test]
    fn sign_out_revokes_the_session() {
        let mut console = signed_in(backend(ResetPolicy::KeepInventory));
        console.sign_out();
        assert_eq!(console.session_email(), None);
        assert!(console.claims().is_empty());
        assert!(console.void_claim(1).is_err());
    }
}
