use std::path::{Path, PathBuf};
use std::sync::mpsc;

use eframe::egui;
use tracing::{debug, warn};

use stampgrid_render::{
    decode_image, DecodedImage, FetchRequest, FetchTicket, ImageFetcher, ImageLoadError,
};

/// Outcome of one fetch, sent back to the UI thread.
pub(crate) struct FetchResponse {
    pub(crate) ticket: FetchTicket,
    pub(crate) result: Result<DecodedImage, ImageLoadError>,
}

/// Reads and decodes stamp images off the UI thread.
///
/// Jobs run on a dedicated rayon pool sized to the concurrent-load limit;
/// results come back over a channel and are applied on the UI thread.
pub(crate) struct ImageWorker {
    pool: Option<rayon::ThreadPool>,
    base_dir: PathBuf,
    tx: mpsc::Sender<FetchResponse>,
    rx: mpsc::Receiver<FetchResponse>,
    ctx: egui::Context,
}

impl ImageWorker {
    pub(crate) fn new(ctx: egui::Context, threads: usize, base_dir: PathBuf) -> Self {
        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|i| format!("image-worker-{i}"))
            .build()
        {
            Ok(pool) => Some(pool),
            Err(e) => {
                warn!("Image pool unavailable, using the global pool: {e}");
                None
            }
        };
        let (tx, rx) = mpsc::channel();
        Self {
            pool,
            base_dir,
            tx,
            rx,
            ctx,
        }
    }

    /// Point relative image paths at a new catalog's directory.
    pub(crate) fn set_base_dir(&mut self, base_dir: PathBuf) {
        self.base_dir = base_dir;
    }

    /// Drain every completed fetch.
    pub(crate) fn poll(&self) -> Vec<FetchResponse> {
        self.rx.try_iter().collect()
    }
}

impl ImageFetcher for ImageWorker {
    fn begin(&mut self, request: FetchRequest) {
        let path = self.base_dir.join(&request.path);
        let tx = self.tx.clone();
        let ctx = self.ctx.clone();
        let job = move || {
            let result = load(&path);
            if let Err(e) = &result {
                debug!("Image worker: {e}");
            }
            // The receiver is gone only when the app is shutting down.
            let _ = tx.send(FetchResponse {
                ticket: request.ticket,
                result,
            });
            ctx.request_repaint();
        };
        match &self.pool {
            Some(pool) => pool.spawn(job),
            None => rayon::spawn(job),
        }
    }
}

fn load(path: &Path) -> Result<DecodedImage, ImageLoadError> {
    let bytes = std::fs::read(path).map_err(|e| {
        let path = path.display().to_string();
        if e.kind() == std::io::ErrorKind::NotFound {
            ImageLoadError::NotFound { path }
        } else {
            ImageLoadError::Io {
                path,
                reason: e.to_string(),
            }
        }
    })?;
    decode_image(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_not_found() {
        let err = load(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, ImageLoadError::NotFound { .. }));
    }

    #[test]
    fn unreadable_bytes_fail_to_decode() {
        let path = std::env::temp_dir().join(format!("stampgrid-bad-{}.png", std::process::id()));
        std::fs::write(&path, b"not a png").unwrap();
        let err = load(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, ImageLoadError::Decode(_)));
    }
}
