//! Runtime configuration for the template store and worker pool.

use crate::error::{Error, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Environment variable naming a template override directory.
pub const ENV_TEMPLATE_DIR: &str = "CVDOC_TEMPLATE_DIR";
/// Environment variable for the template cache TTL in seconds.
pub const ENV_TEMPLATE_TTL_SECS: &str = "CVDOC_TEMPLATE_TTL_SECS";
/// Environment variable for the number of core worker threads.
pub const ENV_POOL_MIN_WORKERS: &str = "CVDOC_POOL_MIN_WORKERS";
/// Environment variable for the maximum number of worker threads.
pub const ENV_POOL_MAX_WORKERS: &str = "CVDOC_POOL_MAX_WORKERS";
/// Environment variable for the job backlog capacity.
pub const ENV_POOL_QUEUE_CAPACITY: &str = "CVDOC_POOL_QUEUE_CAPACITY";

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderConfig {
    /// Template cache settings
    pub templates: TemplateConfig,
    /// Worker pool settings
    pub pool: PoolConfig,
}

impl RenderConfig {
    /// Creates a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads overrides from `CVDOC_*` environment variables.
    ///
    /// Unset variables keep their defaults; unparsable values are an error.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`RenderConfig::from_env`], reading values through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(dir) = lookup(ENV_TEMPLATE_DIR).filter(|d| !d.trim().is_empty()) {
            config.templates.template_dir = Some(PathBuf::from(dir));
        }
        if let Some(secs) = parse_var::<u64>(&lookup, ENV_TEMPLATE_TTL_SECS)? {
            config.templates.ttl = Duration::from_secs(secs);
        }
        if let Some(n) = parse_var(&lookup, ENV_POOL_MIN_WORKERS)? {
            config.pool.min_workers = n;
        }
        if let Some(n) = parse_var(&lookup, ENV_POOL_MAX_WORKERS)? {
            config.pool.max_workers = n;
        }
        if let Some(n) = parse_var(&lookup, ENV_POOL_QUEUE_CAPACITY)? {
            config.pool.queue_capacity = n;
        }

        config.validate()?;
        Ok(config)
    }

    /// Sets the template settings.
    pub fn with_templates(mut self, templates: TemplateConfig) -> Self {
        self.templates = templates;
        self
    }

    /// Sets the pool settings.
    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }

    /// Checks cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        self.pool.validate()
    }
}

/// Template cache settings.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateConfig {
    /// Age after which the compiled template snapshot is rebuilt
    pub ttl: Duration,
    /// Directory whose `<id>.html` files override built-in templates
    pub template_dir: Option<PathBuf>,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(3600),
            template_dir: None,
        }
    }
}

impl TemplateConfig {
    /// Creates template settings with defaults (1 hour TTL, built-in sources).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the snapshot TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Reads template overrides from a directory.
    pub fn with_template_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.template_dir = Some(dir.into());
        self
    }
}

/// Worker pool settings.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolConfig {
    /// Threads started eagerly and kept alive
    pub min_workers: usize,
    /// Upper bound on live threads
    pub max_workers: usize,
    /// Jobs that may wait for a worker before the pool grows
    pub queue_capacity: usize,
    /// Idle time after which threads above `min_workers` exit
    pub keep_alive: Duration,
    /// Prefix for worker thread names
    pub thread_name_prefix: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_workers: 10,
            max_workers: 50,
            queue_capacity: 100,
            keep_alive: Duration::from_secs(60),
            thread_name_prefix: "cvdoc-render".to_string(),
        }
    }
}

impl PoolConfig {
    /// Creates pool settings with defaults (10 core, 50 max, 100 queued).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets core and maximum worker counts.
    pub fn with_workers(mut self, min: usize, max: usize) -> Self {
        self.min_workers = min;
        self.max_workers = max;
        self
    }

    /// Sets the backlog capacity.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Sets the idle timeout for extra threads.
    pub fn with_keep_alive(mut self, keep_alive: Duration) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    /// Sets the worker thread name prefix.
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Checks the worker bounds.
    pub fn validate(&self) -> Result<()> {
        if self.max_workers == 0 {
            return Err(Error::InvalidConfig("max_workers must be at least 1".into()));
        }
        if self.min_workers > self.max_workers {
            return Err(Error::InvalidConfig(format!(
                "min_workers ({}) exceeds max_workers ({})",
                self.min_workers, self.max_workers
            )));
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::InvalidConfig(format!("{key}: cannot parse '{raw}'"))),
    }
}
