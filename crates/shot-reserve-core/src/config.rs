use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, EventSettings, Inventory, UnknownVariant};

/// Widest claim code padding; a `u32` code never has more digits
pub const MAX_CODE_WIDTH: usize = 10;

/// What a reset does to the inventory counts
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResetPolicy {
    /// Leave the counts untouched
    #[default]
    KeepInventory,
    /// Restore the counts to the last admin overwrite (or the seeded counts)
    RestoreInventory,
}

impl FromStr for ResetPolicy {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keep-inventory" => Ok(ResetPolicy::KeepInventory),
            "restore-inventory" => Ok(ResetPolicy::RestoreInventory),
            _ => Err(UnknownVariant {
                kind: "reset policy",
                value: s.to_owned(),
            }),
        }
    }
}

/// Credentials of an administrator
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminAccount {
    /// Login email
    pub email: String,
    /// Login password
    pub password: String,
}

impl fmt::Debug for AdminAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminAccount")
            .field("email", &self.email)
            .field("password", &format_args!(".."))
            .finish()
    }
}

impl FromStr for AdminAccount {
    type Err = String;

    /// Parse `email:password`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((email, password)) if !email.is_empty() && !password.is_empty() => {
                Ok(AdminAccount {
                    email: email.to_owned(),
                    password: password.to_owned(),
                })
            }
            _ => Err(format!("expected `email:password`, got `{s}`")),
        }
    }
}

/// Configuration of the reservation system
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    /// Stock seeded at startup
    pub inventory: Inventory,
    /// Settings seeded at startup
    pub settings: EventSettings,
    /// First claim code after startup and after every reset
    pub initial_code: u32,
    /// Claim codes are zero-padded to this many digits
    pub code_width: usize,
    /// Inventory handling on reset
    pub reset_policy: ResetPolicy,
    /// Seconds after which an admin session expires
    pub session_ttl: u64,
    /// Accounts allowed to use the admin API
    pub admins: Vec<AdminAccount>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inventory: Inventory::default(),
            settings: EventSettings::default(),
            initial_code: 1,
            code_width: 3,
            reset_policy: ResetPolicy::default(),
            session_ttl: 12 * 60 * 60,
            admins: Vec::new(),
        }
    }
}

impl Config {
    /// Check the values serde and flag parsing cannot rule out
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_CODE_WIDTH).contains(&self.code_width) {
            return Err(ConfigError::CodeWidth(self.code_width));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_width_is_bounded() {
        assert_eq!(Config::default().validate(), Ok(()));
        for width in [1, MAX_CODE_WIDTH] {
            let config = Config {
                code_width: width,
                ..Config::default()
            };
            assert_eq!(config.validate(), Ok(()));
        }
        for width in [0, MAX_CODE_WIDTH + 1, 70_000] {
            let config = Config {
                code_width: width,
                ..Config::default()
            };
            assert_eq!(config.validate(), Err(ConfigError::CodeWidth(width)));
        }
    }

    #[test]
    fn parse_admin_account() {
        let acc: AdminAccount = "staff@example.com:s3cr:et".parse().unwrap();
        assert_eq!(acc.email, "staff@example.com");
        assert_eq!(acc.password, "s3cr:et");
        assert!("staff@example.com".parse::<AdminAccount>().is_err());
        assert!(":pw".parse::<AdminAccount>().is_err());
    }

    #[test]
    fn parse_reset_policy() {
        assert_eq!(
            "restore-inventory".parse::<ResetPolicy>(),
            Ok(ResetPolicy::RestoreInventory)
        );
        assert!("restore".parse::<ResetPolicy>().is_err());
    }
}
