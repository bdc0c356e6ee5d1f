//! geo_denylist library: country-based IPv4 denylist generation
//!
//! This library downloads the MaxMind GeoLite2 Country CSV database, verifies
//! it against the published SHA-256 checksum, and writes every IPv4 network
//! belonging to a set of blocked countries to a text file.
//!
//! # Example
//!
//! ```no_run
//! use geo_denylist::{run_pipeline, BlockedSet, Config};
//! use std::path::PathBuf;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     account_id: "123456".to_string(),
//!     license_key: "license".to_string(),
//!     blocked_countries: BlockedSet::from_codes(["RU", "KP"]),
//!     output_dir: PathBuf::from("/etc/firewall"),
//!     ..Default::default()
//! };
//!
//! let report = run_pipeline(&config).await?;
//! println!("Wrote {} networks to {}", report.lines_emitted, report.output_path.display());
//! # Ok(())
//! # }
//! ```
//!
//! # Pipeline
//!
//! Fetch (authenticated, checksum-verified) -> extract the two CSV members ->
//! index blocked geonames from the locations table -> join the IPv4 blocks
//! table against that index -> atomically publish the output. The stages run
//! strictly one after another; any failure aborts the run and leaves a
//! previously published list untouched.

#![warn(missing_docs)]

mod archive;
pub mod config;
mod error_handling;
mod fetch;
pub mod initialization;
mod publish;
pub mod table;
mod workspace;

// Re-export public API
pub use config::{BlockedSet, Config, Endpoints, LogFormat, LogLevel};
pub use error_handling::{InitializationError, PipelineError, Resource, Stage, Table};
pub use run::{run_pipeline, run_pipeline_with, RunReport};

// Internal run module (contains the pipeline driver)
mod run {
    use std::path::PathBuf;
    use std::time::Instant;

    use reqwest::Client;
    use tokio::task::JoinError;

    use crate::archive::extract_members;
    use crate::config::{
        Config, Endpoints, OUTPUT_TIMESTAMP_FORMAT, REQUIRED_MEMBERS, STAGED_OUTPUT_FILENAME,
    };
    use crate::error_handling::{PipelineError, Stage};
    use crate::fetch::fetch_verified_archive;
    use crate::initialization::init_client;
    use crate::publish::publish;
    use crate::table::{select_geonames_from_path, write_denylist};
    use crate::workspace::Scratch;

    /// Results of a completed run.
    #[derive(Debug, Clone)]
    pub struct RunReport {
        /// Path the denylist was published to
        pub output_path: PathBuf,
        /// Size of the downloaded archive in bytes
        pub archive_bytes: u64,
        /// SHA-256 of the verified archive
        pub archive_sha256: String,
        /// Number of geonames that belong to a blocked country
        pub blocked_geonames: usize,
        /// Data rows read from the blocks table
        pub rows_scanned: u64,
        /// Networks written to the output
        pub lines_emitted: u64,
        /// Elapsed time in seconds
        pub elapsed_seconds: f64,
    }

    /// Runs the pipeline against the MaxMind download endpoints.
    ///
    /// # Errors
    ///
    /// Returns the first `PipelineError` raised by any stage. The scratch
    /// directory is removed on both success and failure.
    pub async fn run_pipeline(config: &Config) -> Result<RunReport, PipelineError> {
        config.validate()?;
        let client = init_client()?;
        run_pipeline_with(config, &Endpoints::default(), &client).await
    }

    /// Runs the pipeline against explicit endpoints with a caller-supplied client.
    pub async fn run_pipeline_with(
        config: &Config,
        endpoints: &Endpoints,
        client: &Client,
    ) -> Result<RunReport, PipelineError> {
        config.validate()?;
        let start_time = Instant::now();
        log::info!(
            "Building denylist for {} countries: {}",
            config.blocked_countries.len(),
            config.blocked_countries
        );

        let scratch = Scratch::create(config.scratch_parent.as_deref())?;

        let archive = fetch_verified_archive(client, endpoints, config, &scratch).await?;

        let archive_path = archive.path.clone();
        let dest_dir = scratch.path().to_path_buf();
        let extracted = blocking(Stage::Extract, move || {
            extract_members(&archive_path, &REQUIRED_MEMBERS, &dest_dir)
        })
        .await?;
        let (locations_path, blocks_path) = (extracted[0].clone(), extracted[1].clone());

        let blocked = config.blocked_countries.clone();
        let index = blocking(Stage::Locations, move || {
            select_geonames_from_path(&locations_path, &blocked)
        })
        .await?;
        let blocked_geonames = index.len();
        if index.is_empty() {
            log::warn!("No geonames matched the blocked countries; the list will be empty");
        }

        let staged_path = scratch.file(STAGED_OUTPUT_FILENAME);
        let staged = staged_path.clone();
        let generated_at = chrono::Local::now()
            .format(OUTPUT_TIMESTAMP_FORMAT)
            .to_string();
        let stats = blocking(Stage::Blocks, move || {
            write_denylist(&blocks_path, &index, &staged, &generated_at)
        })
        .await?;

        let output_path = publish(&staged_path, &config.output_path())?;
        drop(scratch);

        Ok(RunReport {
            output_path,
            archive_bytes: archive.size,
            archive_sha256: archive.sha256,
            blocked_geonames,
            rows_scanned: stats.rows_scanned,
            lines_emitted: stats.lines_emitted,
            elapsed_seconds: start_time.elapsed().as_secs_f64(),
        })
    }

    /// Runs a file-bound stage on the blocking pool and waits for it.
    /// A panic inside the stage is propagated to the caller.
    async fn blocking<T, F>(stage: Stage, work: F) -> Result<T, PipelineError>
    where
        F: FnOnce() -> Result<T, PipelineError> + Send + 'static,
        T: Send + 'static,
    {
        match tokio::task::spawn_blocking(work).await {
            Ok(result) => result,
            Err(join_error) => Err(join_failure(stage, join_error)),
        }
    }

    /// Resumes a panic from the task; a cancelled task becomes an error.
    fn join_failure(stage: Stage, join_error: JoinError) -> PipelineError {
        match join_error.try_into_panic() {
            Ok(payload) => std::panic::resume_unwind(payload),
            Err(source) => {
                log::error!("{} stage was cancelled", stage);
                PipelineError::StageCancelledError { stage, source }
            }
        }
    }

}
