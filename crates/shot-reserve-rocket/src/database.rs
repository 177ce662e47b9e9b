//! Implementation of the central database for settings, inventory and claims

use chrono::Utc;
use shot_reserve_core::{
    Claim, ClaimOutcome, ClaimStatus, Config, EventSettings, Inventory, InventoryRow, Item,
    ResetPolicy, ServiceError, MAX_CODE_WIDTH, MAX_NAME_CHARS,
};
use tracing::{info, warn};

/// Implementation of the central database
///
/// Every method runs inside the single lock guarding the database, so each
/// call is one atomic transaction.
pub struct Database {
    settings: EventSettings,
    inventory: Inventory,
    /// Counts restored by a reset under [`ResetPolicy::RestoreInventory`]
    baseline: Inventory,
    /// Claims in creation order
    claims: Vec<Claim>,

    next_id: u64,
    next_code: u32,

    initial_code: u32,
    code_width: usize,
    reset_policy: ResetPolicy,
}

impl Database {
    /// Create a new [`Database`] seeded from `config`.
    pub fn new(config: &Config) -> Self {
        Self {
            settings: config.settings.clone(),
            inventory: config.inventory,
            baseline: config.inventory,
            claims: Vec::new(),
            next_id: 1,
            next_code: config.initial_code,
            initial_code: config.initial_code,
            // widths are validated on load; this only keeps `format!` in range
            code_width: config.code_width.min(MAX_CODE_WIDTH),
            reset_policy: config.reset_policy,
        }
    }

    /// Get the event settings.
    pub fn settings(&self) -> &EventSettings {
        &self.settings
    }

    /// Overwrite the event settings.
    pub fn update_settings(&mut self, settings: EventSettings) {
        info!(
            event_time = %settings.event_time,
            location = %settings.location,
            is_open = settings.is_open,
            "settings updated"
        );
        self.settings = settings;
    }

    /// Get the remaining stock.
    pub fn inventory(&self) -> Inventory {
        self.inventory
    }

    /// Overwrite the remaining count of every listed item.
    ///
    /// The written counts also become the baseline a restoring reset returns
    /// to.
    pub fn set_inventory(&mut self, rows: &[InventoryRow]) {
        for row in rows {
            *self.inventory.get_mut(row.item) = row.remaining;
            *self.baseline.get_mut(row.item) = row.remaining;
            info!(item = %row.item, remaining = row.remaining, "inventory overwritten");
        }
    }

    /// Get all claims ordered by creation time.
    pub fn claims(&self) -> Vec<Claim> {
        let mut claims = self.claims.clone();
        claims.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        claims
    }

    /// Claim one unit of `item` for `name`.
    ///
    /// Either the stock is decremented *and* a claim with a fresh code is
    /// recorded, or nothing changes and a rejection is returned.
    pub fn claim(&mut self, name: &str, item: Item) -> ClaimOutcome {
        let name = name.trim();
        if name.is_empty() {
            return ClaimOutcome::rejected("Please enter your name.");
        }
        if name.chars().count() > MAX_NAME_CHARS {
            return ClaimOutcome::rejected(format!(
                "Name must be at most {MAX_NAME_CHARS} characters."
            ));
        }
        if !self.settings.is_open {
            warn!(%item, "claim rejected: reservations closed");
            return ClaimOutcome::rejected("Reservations are closed.");
        }
        if self.inventory.get(item) == 0 {
            warn!(%item, "claim rejected: sold out");
            return ClaimOutcome::rejected(format!("Sorry, {} is sold out.", item.label()));
        }
        let Some(following) = self.next_code.checked_add(1) else {
            warn!(%item, "claim rejected: code sequence exhausted");
            return ClaimOutcome::rejected("No claim codes left.");
        };

        let code = format!("{:0width$}", self.next_code, width = self.code_width);
        self.next_code = following;
        *self.inventory.get_mut(item) -= 1;

        let id = self.next_id;
        self.next_id += 1;
        self.claims.push(Claim {
            id,
            claim_code: code.clone(),
            name: name.to_owned(),
            item,
            status: ClaimStatus::Pending,
            created_at: Utc::now(),
        });

        info!(%item, claim_code = %code, remaining = self.inventory.get(item), "claim accepted");
        ClaimOutcome::reserved(code)
    }

    /// Move the claim `id` to `status`.
    pub fn set_claim_status(&mut self, id: u64, status: ClaimStatus) -> Result<Claim, ServiceError> {
        let Some(claim) = self.claims.iter_mut().find(|c| c.id == id) else {
            return Err(ServiceError::NotFound(format!("Claim {id} does not exist.")));
        };
        if !claim.status.can_become(status) {
            return Err(ServiceError::Conflict(format!(
                "Claim {} is {} and cannot become {status}.",
                claim.claim_code, claim.status
            )));
        }
        claim.status = status;
        info!(id, claim_code = %claim.claim_code, %status, "claim status changed");
        Ok(claim.clone())
    }

    /// Delete all claims and restart the code sequence.
    ///
    /// Row ids keep counting so that an id never names two different claims.
    pub fn reset(&mut self) {
        let deleted = self.claims.len();
        self.claims.clear();
        self.next_code = self.initial_code;
        if self.reset_policy == ResetPolicy::RestoreInventory {
            self.inventory = self.baseline;
        }
        info!(deleted, policy = ?self.reset_policy, "claims reset");
    }
}
