use std::net::TcpListener;
use std::sync::Arc;

use anyhow::{Context, ensure};
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::{ForkResult, Pid, fork, getpid};
use tracing::{error, info, warn};

use crate::app::Application;
use crate::server::sequential;

/// Forks `workers` processes that each run the sequential strategy on the
/// inherited listening socket, then waits for all of them.
///
/// The kernel decides which worker accepts a given connection. Must be
/// called before any other thread is started in this process.
pub fn run(
    listener: &TcpListener,
    app: &Arc<dyn Application>,
    workers: usize,
) -> anyhow::Result<()> {
    ensure!(workers > 0, "prefork needs at least one worker");

    let mut children: Vec<Pid> = Vec::with_capacity(workers);

    for worker in 0..workers {
        // SAFETY: the parent is single-threaded here, the child only runs
        // the blocking accept loop.
        match unsafe { fork() }.context("fork failed")? {
            ForkResult::Child => worker_main(worker, listener, app),
            ForkResult::Parent { child } => {
                info!(worker, pid = %child, "worker started");
                children.push(child);
            }
        }
    }

    for child in children {
        match waitpid(child, None) {
            Ok(WaitStatus::Exited(pid, 0)) => info!(%pid, "worker exited"),
            Ok(WaitStatus::Exited(pid, code)) => warn!(%pid, code, "worker exited with failure"),
            Ok(WaitStatus::Signaled(pid, signal, _)) => warn!(%pid, ?signal, "worker killed"),
            Ok(status) => info!(?status, "worker stopped"),
            Err(e) => error!(pid = %child, "waitpid failed: {}", e),
        }
    }

    Ok(())
}

fn worker_main(worker: usize, listener: &TcpListener, app: &Arc<dyn Application>) -> ! {
    let pid = getpid();
    let span = tracing::info_span!("worker", worker, %pid);
    let _guard = span.enter();

    let code = match sequential::run(listener, app) {
        Ok(()) => 0,
        Err(e) => {
            error!("worker failed: {:#}", e);
            1
        }
    };
    std::process::exit(code)
}
