use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};

use crate::app::{self, Application, StaticApp};
use crate::server::Strategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyKind {
    Sequential,
    Threaded,
    Prefork,
    Reactor,
}

/// Runtime settings, from command-line flags with environment fallbacks.
#[derive(Debug, Clone, Parser)]
#[command(name = "tube", version, about = "A minimal HTTP server core")]
pub struct Config {
    /// Address to listen on
    #[arg(long = "listen", env = "LISTEN", default_value = "127.0.0.1:3000")]
    pub listen_addr: String,

    /// How connections are scheduled
    #[arg(long, env = "TUBE_STRATEGY", value_enum, default_value_t = StrategyKind::Threaded)]
    pub strategy: StrategyKind,

    /// Worker processes for the prefork strategy
    #[arg(long, env = "TUBE_WORKERS", default_value_t = 4)]
    pub workers: usize,

    /// YAML application file; serves a fixed greeting when absent
    #[arg(long = "app", env = "TUBE_APP")]
    pub app_file: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn strategy(&self) -> Strategy {
        match self.strategy {
            StrategyKind::Sequential => Strategy::Sequential,
            StrategyKind::Threaded => Strategy::Threaded,
            StrategyKind::Prefork => Strategy::Prefork {
                workers: self.workers,
            },
            StrategyKind::Reactor => Strategy::Reactor,
        }
    }

    /// Resolves the application before any connection is accepted.
    pub fn application(&self) -> Result<Arc<dyn Application>, app::LoadError> {
        let app = match &self.app_file {
            Some(path) => app::load_file(path)?,
            None => StaticApp::hello(),
        };
        Ok(Arc::new(app))
    }
}
