use eyre::Result;
use shot_reserve_core::{AdminAccount, Config, EventSettings, Inventory, ResetPolicy};

mod api;
pub use api::{AdminSession, Api, ApiError, ApiResult};

/// Admin account every test context is started with
pub const ADMIN_EMAIL: &str = "staff@example.com";
/// Password of [`ADMIN_EMAIL`]
pub const ADMIN_PASSWORD: &str = "correct horse battery staple";

pub struct TestCtxBuilder {
    /// Initial stock
    pub inventory: Inventory,
    /// Whether claims are accepted initially
    pub is_open: bool,
    /// First claim code
    pub initial_code: u32,
    /// Digits claim codes are padded to
    pub code_width: usize,
    /// Inventory handling on reset
    pub reset_policy: ResetPolicy,
    /// Admin session lifetime in seconds
    pub session_ttl: u64,
    /// Count of balancer threads
    pub balancer_threads: u16,
}

impl TestCtxBuilder {
    /// Create a new test context builder with defaults
    pub fn new() -> Self {
        TestCtxBuilder {
            inventory: Inventory {
                habu: 10,
                tequila: 10,
            },
            is_open: true,
            initial_code: 1,
            code_width: 3,
            reset_policy: ResetPolicy::KeepInventory,
            session_ttl: 60,
            balancer_threads: 4,
        }
    }

    /// Set the initially available stock
    pub fn with_inventory(mut self, habu: u32, tequila: u32) -> Self {
        self.inventory = Inventory { habu, tequila };
        self
    }

    /// Start with the event closed
    pub fn closed(mut self) -> Self {
        self.is_open = false;
        self
    }

    /// Set the first claim code
    pub fn with_initial_code(mut self, code: u32) -> Self {
        self.initial_code = code;
        self
    }

    /// Set what a reset does to the inventory
    pub fn with_reset_policy(mut self, policy: ResetPolicy) -> Self {
        self.reset_policy = policy;
        self
    }

    /// Set the admin session lifetime (in seconds)
    pub fn with_session_ttl(mut self, ttl: u64) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Set the number of balancer threads to use
    pub fn with_balancer_threads(mut self, threads: u16) -> Self {
        assert_ne!(threads, 0);
        self.balancer_threads = threads;
        self
    }

    /// Get the [`shot_reserve_core::Config`] for launching the reservation system
    fn config(&self) -> Config {
        Config {
            inventory: self.inventory,
            settings: EventSettings {
                is_open: self.is_open,
                ..EventSettings::default()
            },
            initial_code: self.initial_code,
            code_width: self.code_width,
            reset_policy: self.reset_policy,
            session_ttl: self.session_ttl,
            admins: vec![AdminAccount {
                email: ADMIN_EMAIL.to_owned(),
                password: ADMIN_PASSWORD.to_owned(),
            }],
        }
    }

    /// Build the test context
    pub async fn build(self) -> Result<TestCtx> {
        let config = self.config();
        let (balancer, api) = api::mock::start(self.balancer_threads, config).await;

        Ok(TestCtx {
            api,
            balancer,
            inventory: self.inventory,
            initial_code: self.initial_code,
            balancer_threads: self.balancer_threads,
            drop_bomb: DropBomb,
        })
    }
}

impl Default for TestCtxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Test context
pub struct TestCtx {
    /// API allowing to interact with the reservation system
    pub api: Api,
    balancer: api::mock::MockBalancer,
    /// Initial stock
    pub inventory: Inventory,
    /// First claim code
    pub initial_code: u32,
    /// Number of balancer threads
    pub balancer_threads: u16,

    drop_bomb: DropBomb,
}

impl TestCtx {
    /// Sign in with the built-in admin account
    pub async fn admin(&self) -> Result<AdminSession<'_>> {
        self.api
            .create_admin_session(ADMIN_EMAIL, ADMIN_PASSWORD)
            .await
    }

    /// Shut down the reservation system and finish the test
    pub async fn finish(self) {
        std::mem::forget(self.drop_bomb);
        drop(self.api);
        self.balancer.shutdown().await;
    }
}

struct DropBomb;

impl Drop for DropBomb {
    fn drop(&mut self) {
        eprintln!("@TestAuthor: You should call `ctx.finish().await` to shut the reservation system down");
    }
}
