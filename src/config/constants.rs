//! Configuration constants.
//!
//! This module defines the fixed parts of the contract with MaxMind (download
//! URLs and archive member names) along with timeouts and size limits.

use std::time::Duration;

/// GeoLite2 Country CSV archive download URL
pub const MAXMIND_ARCHIVE_URL: &str =
    "https://download.maxmind.com/geoip/databases/GeoLite2-Country-CSV/download?suffix=zip";

/// Detached SHA-256 checksum of the archive
pub const MAXMIND_CHECKSUM_URL: &str =
    "https://download.maxmind.com/geoip/databases/GeoLite2-Country-CSV/download?suffix=zip.sha256";

/// Locations table member (geoname_id -> country_iso_code)
pub const LOCATIONS_CSV: &str = "GeoLite2-Country-Locations-en.csv";

/// IPv4 network blocks table member
pub const BLOCKS_CSV: &str = "GeoLite2-Country-Blocks-IPv4.csv";

/// Members that must be present in the archive
pub const REQUIRED_MEMBERS: [&str; 2] = [LOCATIONS_CSV, BLOCKS_CSV];

/// Overall timeout for each HTTP request (connect, headers and body)
pub const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum number of checksum payload bytes read.
/// The payload is `<hex digest>  <file name>\n`, well below this cap.
pub const MAX_CHECKSUM_PAYLOAD_SIZE: usize = 1024;

/// Length of a SHA-256 digest in hex characters
pub const SHA256_HEX_LEN: usize = 64;

/// File name of the downloaded archive inside the scratch directory
pub const ARCHIVE_FILENAME: &str = "db.zip";

/// Name the output is written under inside the scratch directory before it is
/// published. Distinct from the archive and member names.
pub const STAGED_OUTPUT_FILENAME: &str = "denylist.staged";

/// Default output file name
pub const DEFAULT_OUTPUT_FILENAME: &str = "BlockedCountriesBlocks.txt";

/// Default output directory
pub const DEFAULT_OUTPUT_DIR: &str = ".";

/// Environment variable holding the MaxMind account ID
pub const MAXMIND_ACCOUNT_ID_ENV: &str = "MAXMIND_ACCOUNT_ID";

/// Environment variable holding the MaxMind license key
pub const MAXMIND_LICENSE_KEY_ENV: &str = "MAXMIND_LICENSE_KEY";

/// Timestamp format of the output header line (`YYYY/MM/DD-HH:MM`)
pub const OUTPUT_TIMESTAMP_FORMAT: &str = "%Y/%m/%d-%H:%M";
