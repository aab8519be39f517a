//! Collector configuration

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::convert::{MAPPING_FILE, OBJECTS_FILE};
use crate::error::{Error, Result};

use super::store::DEFAULT_CAPACITY;

/// Settings for [`CollectorServer`](super::CollectorServer)
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Bind address, e.g. `"0.0.0.0"` or `"127.0.0.1"`
    pub host: String,
    pub port: u16,
    /// Directory holding `objects.json` and `mapping.json`
    pub data_dir: PathBuf,
    /// Directory served as static files, `None` to disable
    pub static_dir: Option<PathBuf>,
    /// Number of retained events
    pub capacity: usize,
    pub enable_cors: bool,
    /// Log every HTTP request
    pub enable_tracing: bool,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            data_dir: PathBuf::from("."),
            static_dir: Some(PathBuf::from("public")),
            capacity: DEFAULT_CAPACITY,
            enable_cors: true,
            enable_tracing: true,
        }
    }
}

impl CollectorConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| Error::Config(format!("Invalid address: {}", e)))
    }

    pub fn objects_path(&self) -> PathBuf {
        self.data_dir.join(OBJECTS_FILE)
    }

    pub fn mapping_path(&self) -> PathBuf {
        self.data_dir.join(MAPPING_FILE)
    }

    /// Both graph artifacts must exist before the collector starts
    pub fn check_preconditions(&self) -> Result<()> {
        for path in [self.objects_path(), self.mapping_path()] {
            if !path.is_file() {
                return Err(Error::Config(format!(
                    "{} not found; run the converter first",
                    path.display()
                )));
            }
        }
        if self.capacity == 0 {
            return Err(Error::config("capacity must be at least 1"));
        }
        Ok(())
    }

    pub fn with_data_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.data_dir = dir.as_ref().to_path_buf();
        self
    }
}
