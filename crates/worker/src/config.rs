// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker configuration.
//!
//! A builder over sensible defaults, with optional TOML layering for the
//! knobs operators actually tune. Durations are milliseconds in the file.

use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use wl_core::payload::{DataConverter, DefaultConverter};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Everything a worker needs to know at construction time.
#[derive(Clone)]
pub struct WorkerConfig {
    pub namespace: String,
    pub task_list: String,
    /// Worker identity reported on every poll and response.
    pub identity: String,
    /// Concurrent long-polls per task kind.
    pub workflow_pollers: usize,
    pub activity_pollers: usize,
    pub max_concurrent_activities: usize,
    pub max_concurrent_local_activities: usize,
    pub sticky_cache_size: usize,
    pub sticky_schedule_to_start_timeout: Duration,
    pub disable_sticky: bool,
    pub non_retryable_error_types: Vec<String>,
    pub shutdown_grace: Duration,
    /// Admission rate hint forwarded on activity polls.
    pub activity_tasks_per_second: Option<f64>,
    pub data_converter: Arc<dyn DataConverter>,
}

impl WorkerConfig {
    pub fn builder(
        namespace: impl Into<String>,
        task_list: impl Into<String>,
    ) -> WorkerConfigBuilder {
        WorkerConfigBuilder {
            namespace: namespace.into(),
            task_list: task_list.into(),
            identity: default_identity(),
            workflow_pollers: 2,
            activity_pollers: 2,
            max_concurrent_activities: 100,
            max_concurrent_local_activities: 100,
            sticky_cache_size: 200,
            sticky_schedule_to_start_timeout: Duration::from_secs(5),
            disable_sticky: false,
            non_retryable_error_types: Vec::new(),
            shutdown_grace: Duration::from_secs(10),
            activity_tasks_per_second: None,
            data_converter: Arc::new(DefaultConverter),
        }
    }

    /// The per-worker sticky queue this worker advertises.
    pub fn sticky_task_list(&self) -> String {
        format!("{}:sticky:{}", self.task_list, self.identity)
    }

    pub fn sticky_enabled(&self) -> bool {
        !self.disable_sticky && self.sticky_cache_size > 0
    }
}

impl std::fmt::Debug for WorkerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerConfig")
            .field("namespace", &self.namespace)
            .field("task_list", &self.task_list)
            .field("identity", &self.identity)
            .field("workflow_pollers", &self.workflow_pollers)
            .field("activity_pollers", &self.activity_pollers)
            .field("sticky_cache_size", &self.sticky_cache_size)
            .field("disable_sticky", &self.disable_sticky)
            .finish_non_exhaustive()
    }
}

fn default_identity() -> String {
    format!("{}@{}", std::process::id(), uuid::Uuid::new_v4())
}

#[derive(Debug)]
pub struct WorkerConfigBuilder {
    namespace: String,
    task_list: String,
    identity: String,
    workflow_pollers: usize,
    activity_pollers: usize,
    max_concurrent_activities: usize,
    max_concurrent_local_activities: usize,
    sticky_cache_size: usize,
    sticky_schedule_to_start_timeout: Duration,
    disable_sticky: bool,
    non_retryable_error_types: Vec<String>,
    shutdown_grace: Duration,
    activity_tasks_per_second: Option<f64>,
    data_converter: Arc<dyn DataConverter>,
}

impl WorkerConfigBuilder {
    wl_core::setters! {
        into {
            identity: String,
        }
        set {
            workflow_pollers: usize,
            activity_pollers: usize,
            max_concurrent_activities: usize,
            max_concurrent_local_activities: usize,
            sticky_cache_size: usize,
            sticky_schedule_to_start_timeout: Duration,
            non_retryable_error_types: Vec<String>,
            shutdown_grace: Duration,
            data_converter: Arc<dyn DataConverter>,
        }
        option {
            activity_tasks_per_second: f64,
        }
        flag {
            disable_sticky,
        }
    }

    /// Layer values from a TOML file over the current builder state.
    pub fn from_toml_file(mut self, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().display().to_string();
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|source| ConfigError::Read { path: path_str.clone(), source })?;
        let file: ConfigFile = toml::from_str(&raw)
            .map_err(|source| ConfigError::Parse { path: path_str, source })?;

        if let Some(v) = file.identity {
            self.identity = v;
        }
        if let Some(v) = file.workflow_pollers {
            self.workflow_pollers = v;
        }
        if let Some(v) = file.activity_pollers {
            self.activity_pollers = v;
        }
        if let Some(v) = file.max_concurrent_activities {
            self.max_concurrent_activities = v;
        }
        if let Some(v) = file.max_concurrent_local_activities {
            self.max_concurrent_local_activities = v;
        }
        if let Some(v) = file.sticky_cache_size {
            self.sticky_cache_size = v;
        }
        if let Some(v) = file.sticky_schedule_to_start_timeout_ms {
            self.sticky_schedule_to_start_timeout = Duration::from_millis(v);
        }
        if let Some(v) = file.disable_sticky {
            self.disable_sticky = v;
        }
        if let Some(v) = file.non_retryable_error_types {
            self.non_retryable_error_types = v;
        }
        if let Some(v) = file.shutdown_grace_ms {
            self.shutdown_grace = Duration::from_millis(v);
        }
        if let Some(v) = file.activity_tasks_per_second {
            self.activity_tasks_per_second = Some(v);
        }
        Ok(self)
    }

    pub fn build(self) -> WorkerConfig {
        WorkerConfig {
            namespace: self.namespace,
            task_list: self.task_list,
            identity: self.identity,
            workflow_pollers: self.workflow_pollers.max(1),
            activity_pollers: self.activity_pollers.max(1),
            max_concurrent_activities: self.max_concurrent_activities.max(1),
            max_concurrent_local_activities: self.max_concurrent_local_activities.max(1),
            sticky_cache_size: self.sticky_cache_size,
            sticky_schedule_to_start_timeout: self.sticky_schedule_to_start_timeout,
            disable_sticky: self.disable_sticky,
            non_retryable_error_types: self.non_retryable_error_types,
            shutdown_grace: self.shutdown_grace,
            activity_tasks_per_second: self.activity_tasks_per_second,
            data_converter: self.data_converter,
        }
    }
}

/// TOML surface; everything optional, durations in milliseconds.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    identity: Option<String>,
    workflow_pollers: Option<usize>,
    activity_pollers: Option<usize>,
    max_concurrent_activities: Option<usize>,
    max_concurrent_local_activities: Option<usize>,
    sticky_cache_size: Option<usize>,
    sticky_schedule_to_start_timeout_ms: Option<u64>,
    disable_sticky: Option<bool>,
    non_retryable_error_types: Option<Vec<String>>,
    shutdown_grace_ms: Option<u64>,
    activity_tasks_per_second: Option<f64>,
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
