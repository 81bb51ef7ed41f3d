//! The probe state machine.
//!
//! A [`Probe`] drives one fixed sequence against a [`Store`]:
//!
//! ```text
//! Idle → Inserting → Replacing → Finding → DeletingRecord
//!      → UploadingBlob → FindingBlob → DownloadingBlob → DeletingBlob → Done
//! ```
//!
//! Every step waits for the previous one to finish. The first failure moves
//! the probe to [`ProbeState::Failed`] and stops the sequence; earlier writes
//! are left in place.

use std::fmt;

use rand::Rng;
use strongbox_persistence::core::{BlobId, Store};
use strongbox_persistence::record::{Record, RecordGenerator};
use tracing::{info, warn};

use crate::error::{ProbeError, ProbeFailure};
use crate::image::RasterImage;
use crate::report::ReportSink;

/// Default edge length of the synthetic image, in pixels.
pub const DEFAULT_IMAGE_SIZE: u32 = 16;

/// Where a probe is in its sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeState {
    /// Not started.
    Idle,
    /// Inserting a fresh record.
    Inserting,
    /// Replacing the record with a second random one.
    Replacing,
    /// Reading the record back.
    Finding,
    /// Deleting the record.
    DeletingRecord,
    /// Uploading a random PNG.
    UploadingBlob,
    /// Looking the blob up by name.
    FindingBlob,
    /// Downloading and decoding the blob.
    DownloadingBlob,
    /// Deleting the blob.
    DeletingBlob,
    /// Every step succeeded.
    Done,
    /// Absorbing failure state.
    Failed,
}

impl ProbeState {
    /// The state that follows this one when the current step succeeds.
    ///
    /// Terminal states have no successor.
    pub fn next(self) -> Option<ProbeState> {
        use ProbeState::*;
        match self {
            Idle => Some(Inserting),
            Inserting => Some(Replacing),
            Replacing => Some(Finding),
            Finding => Some(DeletingRecord),
            DeletingRecord => Some(UploadingBlob),
            UploadingBlob => Some(FindingBlob),
            FindingBlob => Some(DownloadingBlob),
            DownloadingBlob => Some(DeletingBlob),
            DeletingBlob => Some(Done),
            Done | Failed => None,
        }
    }

    /// Returns `true` for [`ProbeState::Done`] and [`ProbeState::Failed`].
    pub fn is_terminal(self) -> bool {
        matches!(self, ProbeState::Done | ProbeState::Failed)
    }
}

impl fmt::Display for ProbeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProbeState::Idle => "idle",
            ProbeState::Inserting => "inserting",
            ProbeState::Replacing => "replacing",
            ProbeState::Finding => "finding",
            ProbeState::DeletingRecord => "deleting record",
            ProbeState::UploadingBlob => "uploading blob",
            ProbeState::FindingBlob => "finding blob",
            ProbeState::DownloadingBlob => "downloading blob",
            ProbeState::DeletingBlob => "deleting blob",
            ProbeState::Done => "done",
            ProbeState::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// A step that completed, with the summary that was reported for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    /// The step.
    pub state: ProbeState,
    /// Line reported when the step finished.
    pub summary: String,
}

/// Result of a probe run that reached [`ProbeState::Done`].
#[derive(Debug, Clone)]
pub struct ProbeSummary {
    /// Final state, always [`ProbeState::Done`].
    pub state: ProbeState,

    /// Name used for the record and the blob.
    pub test_name: String,

    /// Id the document store assigned on insert.
    pub inserted_id: String,

    /// Id of the blob that was found, downloaded and deleted.
    pub blob_id: BlobId,

    /// Size of the encoded image.
    pub blob_len: usize,

    /// Completed steps, in order.
    pub steps: Vec<StepOutcome>,
}

/// Drives the probe sequence against a store.
///
/// # Examples
///
/// ```
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
/// use strongbox_persistence::backends::memory::MemoryStore;
/// use strongbox_probe::probe::{Probe, ProbeState};
/// use strongbox_probe::report::Transcript;
///
/// # tokio_test::block_on(async {
/// let mut probe = Probe::new(MemoryStore::new(), StdRng::seed_from_u64(1));
/// let mut transcript = Transcript::new();
///
/// let summary = probe.run("test", &mut transcript).await.unwrap();
///
/// assert_eq!(summary.state, ProbeState::Done);
/// assert_eq!(summary.steps.len(), 8);
/// # });
/// ```
#[derive(Debug)]
pub struct Probe<S, R> {
    store: S,
    rng: R,
    generator: RecordGenerator,
    image_size: u32,
    state: ProbeState,
}

impl<S: Store, R: Rng + Send> Probe<S, R> {
    /// Creates a probe over `store`, drawing all randomness from `rng`.
    pub fn new(store: S, rng: R) -> Self {
        Self {
            store,
            rng,
            generator: RecordGenerator::default(),
            image_size: DEFAULT_IMAGE_SIZE,
            state: ProbeState::Idle,
        }
    }

    /// Sets the generator used for test records.
    pub fn with_generator(mut self, generator: RecordGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Sets the edge length of the synthetic image.
    pub fn with_image_size(mut self, image_size: u32) -> Self {
        self.image_size = image_size.max(1);
        self
    }

    /// Returns the current state.
    pub fn state(&self) -> ProbeState {
        self.state
    }

    /// Returns the store under test.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs the full sequence for `test_name`, reporting progress to `sink`.
    ///
    /// The probe starts from [`ProbeState::Idle`] on every call.
    ///
    /// # Errors
    ///
    /// Returns a [`ProbeFailure`] naming the step that failed. The failure
    /// message is also the last line reported to `sink`.
    pub async fn run(
        &mut self,
        test_name: &str,
        sink: &mut dyn ReportSink,
    ) -> Result<ProbeSummary, ProbeFailure> {
        self.state = ProbeState::Idle;
        sink.set_text("");
        info!(
            test_name = %test_name,
            backend = %self.store.backend_name(),
            "Starting probe"
        );

        let mut completed = Vec::new();
        match self.execute(test_name, sink, &mut completed).await {
            Ok((inserted_id, blob_id, blob_len)) => {
                self.state = ProbeState::Done;
                report(sink, ProbeState::Done, "Test finished");
                Ok(ProbeSummary {
                    state: self.state,
                    test_name: test_name.to_string(),
                    inserted_id,
                    blob_id,
                    blob_len,
                    steps: completed,
                })
            }
            Err(error) => {
                let failed_state = self.state;
                self.state = ProbeState::Failed;
                let message = format!("Test failed, error: {}", error);
                warn!(step = %failed_state, error = %error, "Probe failed");
                sink.append_line(&message);
                Err(ProbeFailure {
                    failed_state,
                    completed,
                    error,
                })
            }
        }
    }

    async fn execute(
        &mut self,
        test_name: &str,
        sink: &mut dyn ReportSink,
        completed: &mut Vec<StepOutcome>,
    ) -> Result<(String, BlobId, usize), ProbeError> {
        // Records
        self.advance(ProbeState::Inserting);
        let insert = self.generator.generate(test_name, &mut self.rng);
        report(sink, self.state, &format!("Try uploading data: {}", insert));
        let inserted_id = self.store.insert(&insert).await?.inserted_id;
        self.complete(
            sink,
            completed,
            format!("Success, inserted id: {}", inserted_id),
        );

        self.advance(ProbeState::Replacing);
        let replace = self.generator.generate(test_name, &mut self.rng);
        report(sink, self.state, &format!("Try replacing data with: {}", replace));
        let ack = self.store.replace_by_name(&replace.name, &replace).await?;
        self.complete(
            sink,
            completed,
            format!(
                "Replacement was acknowledged: {}, matched: {}",
                ack.acknowledged, ack.matched
            ),
        );

        self.advance(ProbeState::Finding);
        report(
            sink,
            self.state,
            &format!("Try finding data with name: {}", replace.name),
        );
        let found = self.store.find_by_name(&replace.name).await?;
        let found = verify_record(&replace, found)?;
        self.complete(sink, completed, format!("Found data: {}", found));

        self.advance(ProbeState::DeletingRecord);
        report(
            sink,
            self.state,
            &format!("Try deleting data with name: {}", replace.name),
        );
        let ack = self.store.delete_by_name(&replace.name).await?;
        self.complete(
            sink,
            completed,
            format!(
                "Deleted data: {}, matched: {}",
                ack.acknowledged, ack.matched
            ),
        );

        // Blobs
        self.advance(ProbeState::UploadingBlob);
        let image = RasterImage::random(self.image_size, &mut self.rng);
        let png = image.encode_png()?;
        let blob_len = png.len();
        report(sink, self.state, "Try uploading random texture");
        let uploaded = self.store.upload_blob(test_name, png).await?;
        self.complete(
            sink,
            completed,
            format!("Uploaded texture ({} bytes) with id: {}", blob_len, uploaded),
        );

        self.advance(ProbeState::FindingBlob);
        report(sink, self.state, "Finding uploaded texture");
        let meta = self
            .store
            .find_blob_by_name(test_name)
            .await?
            .ok_or_else(|| ProbeError::BlobMissing {
                filename: test_name.to_string(),
            })?;
        if meta.id != uploaded {
            return Err(ProbeError::BlobIdMismatch {
                filename: test_name.to_string(),
                expected: uploaded,
                found: meta.id,
            });
        }
        self.complete(
            sink,
            completed,
            format!("Found texture {} ({} bytes)", meta.id, meta.length),
        );

        self.advance(ProbeState::DownloadingBlob);
        report(sink, self.state, "Downloading texture again");
        let bytes = self.store.download_blob(&meta.id).await?;
        let loaded = RasterImage::decode_png(&bytes)?;
        if loaded != image {
            return Err(ProbeError::BlobMismatch {
                filename: test_name.to_string(),
            });
        }
        self.complete(sink, completed, "Loaded image data: true".to_string());

        self.advance(ProbeState::DeletingBlob);
        report(sink, self.state, "Deleting texture from server");
        let ack = self.store.delete_blob(&meta.id).await?;
        self.complete(
            sink,
            completed,
            format!("Deleted texture {}: matched: {}", meta.id, ack.matched),
        );

        Ok((inserted_id, meta.id, blob_len))
    }

    fn advance(&mut self, to: ProbeState) {
        debug_assert_eq!(self.state.next(), Some(to));
        self.state = to;
    }

    fn complete(
        &self,
        sink: &mut dyn ReportSink,
        completed: &mut Vec<StepOutcome>,
        summary: String,
    ) {
        report(sink, self.state, &summary);
        completed.push(StepOutcome {
            state: self.state,
            summary,
        });
    }
}

fn verify_record(expected: &Record, found: Option<Record>) -> Result<Record, ProbeError> {
    match found {
        None => Err(ProbeError::RecordMissing {
            name: expected.name.clone(),
        }),
        Some(record) if &record != expected => Err(ProbeError::RecordMismatch {
            name: expected.name.clone(),
        }),
        Some(record) => Ok(record),
    }
}

fn report(sink: &mut dyn ReportSink, state: ProbeState, message: &str) {
    info!(step = %state, "{}", message);
    sink.append_line(message);
}
