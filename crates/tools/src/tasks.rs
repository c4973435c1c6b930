//! Tasks registered by extensions.
//!
//! A task is a named external command. Running it hands the selected
//! network's parameters to the command through its environment:
//!
//! | variable              | value                                  |
//! |-----------------------|----------------------------------------|
//! | `CHAINCONF_NETWORK`   | network name                           |
//! | `CHAINCONF_CHAIN_ID`  | chain identifier                       |
//! | `CHAINCONF_RPC_URL`   | RPC URL (absent for in-process network) |

use serde::{Deserialize, Serialize};
use std::process::{Command, ExitStatus};
use thiserror::Error;
use tracing::info;

use crate::network::Network;
use crate::record::ConfigurationRecord;

pub const ENV_NETWORK: &str = "CHAINCONF_NETWORK";
pub const ENV_CHAIN_ID: &str = "CHAINCONF_CHAIN_ID";
pub const ENV_RPC_URL: &str = "CHAINCONF_RPC_URL";

#[derive(Error, Debug)]
pub enum TaskError {
    #[error("unknown task: {0}")]
    UnknownTask(String),

    #[error("task '{0}' needs a network (pass --network or set one in its manifest)")]
    NoNetwork(String),

    #[error("network {0} is not configured")]
    UnknownNetwork(Network),

    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Task definition as written in an extension manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskManifest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Network used when the caller does not choose one
    #[serde(default)]
    pub network: Option<Network>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredTask {
    pub manifest: TaskManifest,
    /// Identifier of the extension that registered the task
    pub origin: String,
}

/// Registered tasks in registration order. Names are unique.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: Vec<RegisteredTask>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `manifest`. Returns the origin of the existing task when the
    /// name is already taken.
    pub fn register(&mut self, manifest: TaskManifest, origin: &str) -> Result<(), String> {
        if let Some(existing) = self.get(&manifest.name) {
            return Err(existing.origin.clone());
        }
        self.tasks.push(RegisteredTask {
            manifest,
            origin: origin.to_string(),
        });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredTask> {
        self.tasks.iter().find(|t| t.manifest.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredTask> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Build the command for `task` against `network` without running it.
pub fn task_command(
    task: &TaskManifest,
    record: &ConfigurationRecord,
    network: Option<Network>,
) -> Result<Command, TaskError> {
    let network = network
        .or(task.network)
        .ok_or_else(|| TaskError::NoNetwork(task.name.clone()))?;
    let descriptor = record
        .network(network)
        .ok_or(TaskError::UnknownNetwork(network))?;

    let mut command = Command::new(&task.program);
    command
        .args(&task.args)
        .env(ENV_NETWORK, network.as_str())
        .env(ENV_CHAIN_ID, descriptor.chain_id.to_string());
    match &descriptor.url {
        Some(url) => command.env(ENV_RPC_URL, url),
        None => command.env_remove(ENV_RPC_URL),
    };
    Ok(command)
}

/// Run `name` from `registry` and wait for it to exit.
pub fn run_task(
    registry: &TaskRegistry,
    name: &str,
    record: &ConfigurationRecord,
    network: Option<Network>,
) -> Result<ExitStatus, TaskError> {
    let task = registry
        .get(name)
        .ok_or_else(|| TaskError::UnknownTask(name.to_string()))?;
    let mut command = task_command(&task.manifest, record, network)?;

    info!(task = name, program = %task.manifest.program, "running task");
    command.status().map_err(|source| TaskError::Spawn {
        program: task.manifest.program.clone(),
        source,
    })
}
