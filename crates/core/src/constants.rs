//! Constants used throughout the triage core crate.

use std::time::Duration;

/// Default REST listen address for the dashboard service.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";

/// Default refresh cadence (the dashboard originally polled every 3 000 000 ms).
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(3_000);

/// Default timeout for a single backend request.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Organisation that signs outgoing document requests.
pub const DEFAULT_ORGANISATION_NAME: &str = "Corvus Medical Center";

/// Path prefix of the backend REST API.
pub const API_PREFIX: &str = "api";

/// Filter value meaning "no restriction".
pub const FILTER_ALL: &str = "all";

/// Priority score at or above which a patient is shown as high priority.
pub const HIGH_PRIORITY_THRESHOLD: f64 = 75.0;

/// Priority score at or above which a patient is shown as medium priority.
pub const MEDIUM_PRIORITY_THRESHOLD: f64 = 50.0;

/// Number of calendar days ahead that consultation slots are offered for.
pub const SCHEDULING_HORIZON_DAYS: i64 = 5;

/// Hours (UTC) at which consultation slots start.
pub const SLOT_HOURS: [u32; 4] = [9, 11, 14, 16];

/// Surgeons that consultation slots are assigned to, in rotation.
pub const SLOT_PROVIDERS: [&str; 3] = ["Dr. Smith", "Dr. Johnson", "Dr. White"];
