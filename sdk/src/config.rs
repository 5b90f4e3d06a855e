//! Client configuration from environment variables.

use std::str::FromStr;
use std::time::Duration;

use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};

use crate::constants::*;
use crate::variant::{GovernanceProgram, ProgramVariant};

pub const ENV_CLUSTER: &str = "GOVERNANCE_CLUSTER";
pub const ENV_RPC_URL: &str = "GOVERNANCE_RPC_URL";
pub const ENV_PROGRAM_VARIANT: &str = "GOVERNANCE_PROGRAM_VARIANT";
pub const ENV_PROGRAM_ID: &str = "GOVERNANCE_PROGRAM_ID";
pub const ENV_COMMITMENT: &str = "GOVERNANCE_COMMITMENT";
pub const ENV_POLL_INTERVAL_MS: &str = "POLL_INTERVAL_MS";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

fn invalid(key: &'static str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        key,
        reason: reason.to_string(),
    }
}

// ── Clusters ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cluster {
    Devnet,
    Mainnet,
}

impl Cluster {
    pub fn chain_id(self) -> &'static str {
        match self {
            Cluster::Devnet => DEVNET_CHAIN_ID,
            Cluster::Mainnet => MAINNET_CHAIN_ID,
        }
    }

    pub fn default_rpc_url(self) -> &'static str {
        match self {
            Cluster::Devnet => DEVNET_RPC_URL,
            Cluster::Mainnet => MAINNET_RPC_URL,
        }
    }
}

impl FromStr for Cluster {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "devnet" => Ok(Cluster::Devnet),
            "mainnet" | "mainnet-beta" => Ok(Cluster::Mainnet),
            other => Err(format!("unknown cluster '{}'", other)),
        }
    }
}

fn parse_commitment(s: &str) -> Result<CommitmentConfig, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "processed" => Ok(CommitmentConfig::processed()),
        "confirmed" => Ok(CommitmentConfig::confirmed()),
        "finalized" => Ok(CommitmentConfig::finalized()),
        other => Err(format!("unknown commitment '{}'", other)),
    }
}

// ── Config ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub cluster: Cluster,
    pub rpc_url: String,
    pub program: GovernanceProgram,
    pub commitment: CommitmentConfig,
    pub poll_interval: Duration,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source; unset keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let cluster = match lookup(ENV_CLUSTER) {
            Some(v) => v.parse().map_err(|e| invalid(ENV_CLUSTER, e))?,
            None => Cluster::Devnet,
        };

        let rpc_url = lookup(ENV_RPC_URL).unwrap_or_else(|| cluster.default_rpc_url().to_string());

        let variant = match lookup(ENV_PROGRAM_VARIANT) {
            Some(v) => v.parse().map_err(|e| invalid(ENV_PROGRAM_VARIANT, e))?,
            None => ProgramVariant::VotingWithDelegation,
        };

        let program = match lookup(ENV_PROGRAM_ID) {
            Some(id) => {
                let program_id =
                    Pubkey::from_str(id.trim()).map_err(|e| invalid(ENV_PROGRAM_ID, e))?;
                GovernanceProgram::with_program_id(variant, program_id)
            }
            None => GovernanceProgram::new(variant),
        };

        let commitment = match lookup(ENV_COMMITMENT) {
            Some(v) => parse_commitment(&v).map_err(|e| invalid(ENV_COMMITMENT, e))?,
            None => CommitmentConfig::confirmed(),
        };

        let poll_interval_ms: u64 = match lookup(ENV_POLL_INTERVAL_MS) {
            Some(v) => v.trim().parse().map_err(|e| invalid(ENV_POLL_INTERVAL_MS, e))?,
            None => DEFAULT_POLL_INTERVAL_MS,
        };
        if poll_interval_ms == 0 {
            return Err(invalid(ENV_POLL_INTERVAL_MS, "must be greater than zero"));
        }

        Ok(Self {
            cluster,
            rpc_url,
            program,
            commitment,
            poll_interval: Duration::from_millis(poll_interval_ms),
        })
    }

    pub fn chain_id(&self) -> &'static str {
        self.cluster.chain_id()
    }
}
