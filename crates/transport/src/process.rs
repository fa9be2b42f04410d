//! Sidecar process management.

use std::{
    path::{Path, PathBuf},
    process::Stdio,
};

use {
    tokio::{
        io::{AsyncBufReadExt, BufReader},
        process::{Child, Command},
    },
    tracing::{info, warn},
};

use crate::error::{Error, Result};

/// How long to wait for a graceful exit before killing the process.
const STOP_GRACE_PERIOD: std::time::Duration = std::time::Duration::from_secs(5);

/// Parameters for launching the sidecar process.
#[derive(Debug, Clone)]
pub struct SidecarLaunch {
    /// Directory containing the sidecar entry point (`index.js`).
    pub dir: PathBuf,
    /// WebSocket port the sidecar should listen on.
    pub port: u16,
    /// Directory for persisted session credentials.
    pub auth_dir: Option<PathBuf>,
}

/// Handle to a running sidecar process.
pub struct SidecarProcess {
    child: Child,
    port: u16,
}

impl SidecarProcess {
    /// Port the sidecar is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Whether the process is still running.
    pub fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Gracefully stop the process: SIGTERM, then kill after a grace period.
    pub async fn stop(&mut self) -> Result<()> {
        info!("stopping sidecar process");

        #[cfg(unix)]
        {
            use nix::{
                sys::signal::{Signal, kill},
                unistd::Pid,
            };

            if let Some(pid) = self.child.id() {
                let _ = kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
            }
        }

        #[cfg(not(unix))]
        {
            let _ = self.child.kill().await;
        }

        match tokio::time::timeout(STOP_GRACE_PERIOD, self.child.wait()).await {
            Ok(Ok(status)) => info!(?status, "sidecar process exited"),
            Ok(Err(e)) => warn!(error = %e, "error waiting for sidecar process"),
            Err(_) => {
                warn!("sidecar process did not exit gracefully, killing");
                let _ = self.child.kill().await;
            },
        }

        Ok(())
    }
}

/// Locate the sidecar directory.
///
/// Probes, in order: the explicit path, `WAGATE_SIDECAR_DIR`, `sidecar/`
/// next to the executable, and `sidecar/` relative to the working directory.
pub fn find_sidecar_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if path.join("index.js").exists() {
            return Ok(path.to_path_buf());
        }
        return Err(Error::sidecar(format!(
            "sidecar directory missing index.js: {}",
            path.display()
        )));
    }

    if let Ok(dir) = std::env::var("WAGATE_SIDECAR_DIR") {
        let path = PathBuf::from(&dir);
        if path.join("index.js").exists() {
            return Ok(path);
        }
        warn!(path = %dir, "WAGATE_SIDECAR_DIR set but index.js not found");
    }

    if let Ok(exe_path) = std::env::current_exe()
        && let Some(exe_dir) = exe_path.parent()
    {
        let candidate = exe_dir.join("sidecar");
        if candidate.join("index.js").exists() {
            return Ok(candidate);
        }
    }

    for rel_path in ["sidecar", "../sidecar"] {
        let path = PathBuf::from(rel_path);
        if path.join("index.js").exists() {
            return Ok(path.canonicalize().unwrap_or(path));
        }
    }

    Err(Error::sidecar(
        "sidecar not found; set WAGATE_SIDECAR_DIR or place it in ./sidecar \
         (run `npm install` there first)",
    ))
}

/// Spawn the sidecar process and forward its output into tracing.
pub async fn start_sidecar(launch: SidecarLaunch) -> Result<SidecarProcess> {
    if !launch.dir.join("index.js").exists() {
        return Err(Error::sidecar(format!(
            "no sidecar entry point at {}; run `npm install` there first",
            launch.dir.display()
        )));
    }

    info!(
        path = %launch.dir.display(),
        port = launch.port,
        "starting sidecar process"
    );

    let mut cmd = Command::new("node");
    cmd.arg("index.js")
        .current_dir(&launch.dir)
        .env("WAGATE_SIDECAR_PORT", launch.port.to_string())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    if let Some(auth_dir) = &launch.auth_dir {
        cmd.env("WAGATE_AUTH_DIR", auth_dir);
    }

    let mut child = cmd
        .spawn()
        .map_err(|e| Error::sidecar(format!("failed to spawn sidecar: {e}")))?;

    if let Some(stdout) = child.stdout.take() {
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                info!(target: "sidecar", "{}", line);
            }
        });
    }

    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                warn!(target: "sidecar", "{}", line);
            }
        });
    }

    // Catch immediate startup failures (missing node, bad port).
    tokio::time::sleep(std::time::Duration::from_millis(500)).await;
    match child.try_wait() {
        Ok(Some(status)) => {
            return Err(Error::sidecar(format!(
                "sidecar process exited immediately with status {status}"
            )));
        },
        Ok(None) => {},
        Err(e) => {
            return Err(Error::sidecar(format!(
                "failed to check sidecar process status: {e}"
            )));
        },
    }

    info!(port = launch.port, "sidecar process started");

    Ok(SidecarProcess {
        child,
        port: launch.port,
    })
}
