//! Progress-callback trait for per-slide conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the pipeline converts each slide. The CLI drives a terminal
//! progress bar from it; library callers can forward events anywhere.
//!
//! # Example
//!
//! ```rust
//! use mhb2svg::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     files: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_slide_complete(&self, _index: usize, _total: usize, stem: &str, files: usize) {
//!         self.files.fetch_add(files, Ordering::SeqCst);
//!         eprintln!("{stem}: {files} file(s)");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { files: AtomicUsize::new(0) });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::MetadataEntry;
use std::sync::Arc;

/// Called by the conversion pipeline as it processes each slide.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Slides are converted one after another, so events
/// arrive in order.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once the archive is unpacked and its metadata read, before
    /// slide discovery. `metadata` is empty when the archive has none.
    fn on_metadata(&self, archive_name: &str, metadata: &[MetadataEntry]) {
        let _ = (archive_name, metadata);
    }

    /// Called once the slide files have been discovered, before any is parsed.
    fn on_conversion_start(&self, total_slides: usize) {
        let _ = total_slides;
    }

    /// Called just before a slide's ink XML is parsed.
    ///
    /// # Arguments
    /// * `index` — 1-indexed position in processing order
    /// * `total` — number of slide files found
    /// * `stem`  — slide filename without extension
    fn on_slide_start(&self, index: usize, total: usize, stem: &str) {
        let _ = (index, total, stem);
    }

    /// Called after every SVG file of a slide has been written.
    ///
    /// # Arguments
    /// * `files` — number of SVG files produced (1 unless paginated)
    fn on_slide_complete(&self, index: usize, total: usize, stem: &str, files: usize) {
        let _ = (index, total, stem, files);
    }

    /// Called once after the last slide.
    fn on_conversion_complete(&self, total_slides: usize) {
        let _ = total_slides;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct TrackingCallback {
        started_total: AtomicUsize,
        starts: AtomicUsize,
        files: AtomicUsize,
        stems: Mutex<Vec<String>>,
        completed_total: AtomicUsize,
    }

    impl ConversionProgressCallback for TrackingCallback {
        fn on_conversion_start(&self, total_slides: usize) {
            self.started_total.store(total_slides, Ordering::SeqCst);
        }

        fn on_slide_start(&self, _index: usize, _total: usize, _stem: &str) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_slide_complete(&self, _index: usize, _total: usize, stem: &str, files: usize) {
            self.files.fetch_add(files, Ordering::SeqCst);
            self.stems.lock().unwrap().push(stem.to_string());
        }

        fn on_conversion_complete(&self, total_slides: usize) {
            self.completed_total.store(total_slides, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_metadata("a.mhb", &[]);
        cb.on_conversion_start(2);
        cb.on_slide_start(1, 2, "1");
        cb.on_slide_complete(1, 2, "1", 1);
        cb.on_conversion_complete(2);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();

        tracker.on_conversion_start(2);
        tracker.on_slide_start(1, 2, "a");
        tracker.on_slide_complete(1, 2, "a", 1);
        tracker.on_slide_start(2, 2, "b");
        tracker.on_slide_complete(2, 2, "b", 3);
        tracker.on_conversion_complete(2);

        assert_eq!(tracker.started_total.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.files.load(Ordering::SeqCst), 4);
        assert_eq!(*tracker.stems.lock().unwrap(), vec!["a", "b"]);
        assert_eq!(tracker.completed_total.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_conversion_start(10);
        cb.on_slide_complete(1, 10, "x", 2);
    }
}
