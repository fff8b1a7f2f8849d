// Parallel downloader: one worker per file, shared interrupt flag

use crate::constants;
use crate::sources::http;
use crate::ui;
use anyhow::Result;
use futures::StreamExt;
use indicatif::{MultiProgress, ProgressBar};
use log::debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::watch;

const INTERRUPTED_EXIT_CODE: i32 = 130;

/// One file to fetch
#[derive(Debug, Clone)]
pub struct DownloadJob {
    pub url: String,
    pub file_name: String,
    pub destination: PathBuf,
}

impl DownloadJob {
    pub fn new(url: impl Into<String>, file_name: impl Into<String>, output_dir: &Path) -> Self {
        let file_name = file_name.into();
        Self {
            url: url.into(),
            destination: output_dir.join(&file_name),
            file_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Downloaded(PathBuf),
    /// Destination already existed and `force` was not set
    Cached(PathBuf),
}

impl DownloadOutcome {
    pub fn path(&self) -> &Path {
        match self {
            DownloadOutcome::Downloaded(path) | DownloadOutcome::Cached(path) => path,
        }
    }
}

/// Process-wide cancellation signal. Workers race every network wait
/// against [`CancelFlag::cancelled`], so a stalled server cannot hold them.
#[derive(Debug, Clone)]
pub struct CancelFlag(Arc<watch::Sender<bool>>);

impl Default for CancelFlag {
    fn default() -> Self {
        let (tx, _) = watch::channel(false);
        Self(Arc::new(tx))
    }
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel this flag on the first Ctrl-C and exit the process on the
    /// next one. Once the guard is dropped any Ctrl-C exits right away.
    pub fn listen_for_ctrl_c(&self) -> InterruptGuard {
        let flag = self.clone();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if flag.is_cancelled() {
                    ui::warning("Interrupted");
                    std::process::exit(INTERRUPTED_EXIT_CODE);
                }
                ui::warning("Interrupted, removing partial downloads (Ctrl-C again to quit)");
                flag.cancel();
            }
        });
        InterruptGuard { flag: self.clone() }
    }

    pub fn cancel(&self) {
        self.0.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolves once the flag is cancelled
    pub async fn cancelled(&self) {
        let mut rx = self.0.subscribe();
        // the sender lives as long as `self`, so this only returns on cancel
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

/// Keeps Ctrl-C wired to a [`CancelFlag`] while downloads run
pub struct InterruptGuard {
    flag: CancelFlag,
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        // no transfer is left to stop: later interrupts end the process
        self.flag.cancel();
    }
}

/// Where a file lives while it is still being written
pub fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".");
    name.push(constants::PARTIAL_SUFFIX);
    destination.with_file_name(name)
}

/// Download every job with at most `parallel` transfers in flight.
/// Outcomes come back in job order.
pub async fn download_all(
    jobs: Vec<DownloadJob>,
    parallel: usize,
    force: bool,
    cancel: &CancelFlag,
) -> Result<Vec<DownloadOutcome>> {
    let progress = ui::multi_progress();

    let results: Vec<Result<DownloadOutcome>> = futures::stream::iter(jobs)
        .map(|job| {
            let progress = progress.clone();
            let cancel = cancel.clone();
            async move { download_one(job, force, &progress, &cancel).await }
        })
        .buffered(parallel.max(1))
        .collect()
        .await;

    results.into_iter().collect()
}

async fn download_one(
    job: DownloadJob,
    force: bool,
    progress: &MultiProgress,
    cancel: &CancelFlag,
) -> Result<DownloadOutcome> {
    if job.destination.exists() && !force {
        debug!("{} already present", job.destination.display());
        ui::dim(&format!("  {} already present, skipping", job.file_name));
        return Ok(DownloadOutcome::Cached(job.destination));
    }

    if cancel.is_cancelled() {
        anyhow::bail!("Download of {} interrupted", job.file_name);
    }

    if let Some(parent) = job.destination.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    debug!("Downloading {} to {}", job.url, job.destination.display());
    let response = tokio::select! {
        response = http::download_with_response(&job.url) => response?,
        _ = cancel.cancelled() => anyhow::bail!("Download of {} interrupted", job.file_name),
    };
    let bar = progress.add(match response.content_length() {
        Some(total) => ui::download_bar(total),
        None => ui::download_bar_indeterminate(),
    });
    bar.set_message(job.file_name.clone());

    let partial = partial_path(&job.destination);
    if let Err(e) = stream_to_file(response, &partial, &bar, cancel).await {
        ui::clear_bar(&bar);
        // the partial file belongs to this worker only
        if let Err(remove_err) = tokio::fs::remove_file(&partial).await {
            debug!("Could not remove {}: {}", partial.display(), remove_err);
        }
        return Err(e.context(format!("Download of {} failed", job.file_name)));
    }

    tokio::fs::rename(&partial, &job.destination).await?;
    ui::finish_download_success(&bar, &job.file_name);
    Ok(DownloadOutcome::Downloaded(job.destination))
}

async fn stream_to_file(
    response: reqwest::Response,
    partial: &Path,
    bar: &ProgressBar,
    cancel: &CancelFlag,
) -> Result<()> {
    let mut file = tokio::fs::File::create(partial).await?;
    let mut stream = response.bytes_stream();

    loop {
        let chunk = tokio::select! {
            chunk = stream.next() => chunk,
            _ = cancel.cancelled() => anyhow::bail!("interrupted"),
        };
        let Some(chunk) = chunk else {
            break;
        };
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        bar.inc(chunk.len() as u64);
    }

    file.flush().await?;
    file.sync_all().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    /// Serve one connection: read the request, send `head` and `body`, then
    /// go silent with the socket still open
    async fn stalling_server(head: &'static str, body: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(&body).await.unwrap();
            std::future::pending::<()>().await;
        });
        format!("http://{}/EOS-4.29.3M.swi", addr)
    }

    fn cancel_after(flag: &CancelFlag, delay: Duration) {
        let flag = flag.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            flag.cancel();
        });
    }

    #[test]
    fn test_partial_path() {
        assert_eq!(
            partial_path(Path::new("/tmp/out/EOS-4.29.3M.swi")),
            PathBuf::from("/tmp/out/EOS-4.29.3M.swi.part")
        );
    }

    #[test]
    fn test_job_destination() {
        let job = DownloadJob::new("https://x/y", "cEOS-lab-4.29.3M.tar.xz", Path::new("images"));
        assert_eq!(job.destination, PathBuf::from("images/cEOS-lab-4.29.3M.tar.xz"));
    }

    #[test]
    fn test_cancel_flag_is_shared() {
        let flag = CancelFlag::new();
        let clone = flag.clone();
        assert!(!clone.is_cancelled());
        flag.cancel();
        assert!(clone.is_cancelled());
    }

    #[tokio::test]
    async fn test_existing_files_are_not_downloaded_again() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("EOS-4.29.3M.swi"), b"image").unwrap();

        // an unroutable URL proves no request is made
        let jobs = vec![DownloadJob::new(
            "http://127.0.0.1:9/EOS-4.29.3M.swi",
            "EOS-4.29.3M.swi",
            dir.path(),
        )];
        let outcomes = download_all(jobs, 2, false, &CancelFlag::new()).await.unwrap();
        assert_eq!(
            outcomes,
            vec![DownloadOutcome::Cached(dir.path().join("EOS-4.29.3M.swi"))]
        );
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let dir = tempfile::tempdir().unwrap();
        let flag = CancelFlag::new();
        flag.cancel();

        let jobs = vec![DownloadJob::new("http://127.0.0.1:9/a.swi", "a.swi", dir.path())];
        let err = download_all(jobs, 1, false, &flag).await.unwrap_err();
        assert!(err.to_string().contains("interrupted"));
        assert!(!dir.path().join("a.swi").exists());
        assert!(!dir.path().join("a.swi.part").exists());
    }

    #[tokio::test]
    async fn test_cancel_stops_a_stalled_transfer() {
        let dir = tempfile::tempdir().unwrap();
        let url = stalling_server(
            "HTTP/1.1 200 OK\r\nContent-Length: 1048576\r\n\r\n",
            vec![0u8; 4096],
        )
        .await;
        let flag = CancelFlag::new();
        cancel_after(&flag, Duration::from_millis(300));

        let jobs = vec![DownloadJob::new(url, "EOS-4.29.3M.swi", dir.path())];
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            download_all(jobs, 1, false, &flag),
        )
        .await
        .expect("worker kept waiting on the server after cancel");

        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("interrupted"));
        assert!(!dir.path().join("EOS-4.29.3M.swi.part").exists());
        assert!(!dir.path().join("EOS-4.29.3M.swi").exists());
    }

    #[tokio::test]
    async fn test_cancel_while_waiting_for_headers() {
        let dir = tempfile::tempdir().unwrap();
        let url = stalling_server("", Vec::new()).await;
        let flag = CancelFlag::new();
        cancel_after(&flag, Duration::from_millis(300));

        let jobs = vec![DownloadJob::new(url, "EOS-4.29.3M.swi", dir.path())];
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            download_all(jobs, 1, false, &flag),
        )
        .await
        .expect("worker kept waiting for headers after cancel");

        assert!(result.unwrap_err().to_string().contains("interrupted"));
        assert!(!dir.path().join("EOS-4.29.3M.swi.part").exists());
    }

    #[tokio::test]
    async fn test_cancelled_wakes_every_clone() {
        let flag = CancelFlag::new();
        let waiter = flag.clone();
        let handle = tokio::spawn(async move { waiter.cancelled().await });

        flag.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_dropped_guard_leaves_flag_cancelled() {
        let flag = CancelFlag::new();
        let guard = flag.listen_for_ctrl_c();
        assert!(!flag.is_cancelled());

        drop(guard);
        assert!(flag.is_cancelled());
    }
}
