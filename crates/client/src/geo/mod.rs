//! Client geolocation to region matching.
//!
//! ### Detection order
//! 1. A region stored less than `region_ttl` ago (default 24h) is reused.
//! 2. The [`LocationProvider`] is asked for a low-accuracy position, bounded by
//!    `location_timeout` (default 5s).
//! 3. The position is reverse-geocoded into a [`GeocodedPlace`].
//! 4. The region name is `state`, else `region`, else the first known province
//!    found in `display_name`.
//! 5. The name is matched against the canonical regions with [`match_region`].
//!
//! Every failure ends in [`DetectOutcome::NotDetected`] with the reason; nothing
//! is guessed. A successful detection is written back to the [`RegionStore`].

pub mod nominatim;
pub mod store;

pub use nominatim::NominatimGeocoder;
pub use store::{FileRegionStore, MemoryRegionStore, RegionStore, StoredRegion};

use async_trait::async_trait;
use chrono::Utc;
use rumahsubsidi_core::Error;
use rumahsubsidi_core::config::GeoConfig;
use rumahsubsidi_core::model::{Region, find_known_province, match_region};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Both components finite and within their ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Options passed to a [`LocationProvider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
}

/// Why a position could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("position unavailable: {0}")]
    Unavailable(String),

    #[error("location request timed out")]
    Timeout,
}

/// Source of the device position.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self, options: PositionOptions) -> Result<Coordinates, LocationError>;
}

/// Provider answering with a fixed position, e.g. one given on the command line.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_position(&self, _options: PositionOptions) -> Result<Coordinates, LocationError> {
        if self.0.is_valid() {
            Ok(self.0)
        } else {
            Err(LocationError::Unavailable(format!("invalid coordinates {:?}", self.0)))
        }
    }
}

/// Provider for environments without location access.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

#[async_trait]
impl LocationProvider for NoLocation {
    async fn current_position(&self, _options: PositionOptions) -> Result<Coordinates, LocationError> {
        Err(LocationError::PermissionDenied)
    }
}

/// Administrative names for a position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeocodedPlace {
    pub state: Option<String>,
    pub region: Option<String>,
    pub display_name: Option<String>,
}

impl GeocodedPlace {
    /// Free-text region name: `state`, else `region`, else a known province in `display_name`.
    pub fn region_name(&self) -> Option<String> {
        fn non_empty(value: &Option<String>) -> Option<&str> {
            value.as_deref().map(str::trim).filter(|v| !v.is_empty())
        }

        non_empty(&self.state)
            .or_else(|| non_empty(&self.region))
            .map(str::to_string)
            .or_else(|| {
                self.display_name
                    .as_deref()
                    .and_then(find_known_province)
                    .map(str::to_string)
            })
    }
}

/// Converts a position into administrative names.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse(&self, coords: Coordinates) -> Result<GeocodedPlace, Error>;
}

/// Where a detected region came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectSource {
    Stored,
    Geolocation,
}

/// Why no region was detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotDetectedReason {
    PermissionDenied,
    LocationTimeout,
    PositionUnavailable(String),
    Geocoding(String),
    NoRegionName,
    NoMatch(String),
}

impl fmt::Display for NotDetectedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotDetectedReason::PermissionDenied => f.write_str("location permission denied"),
            NotDetectedReason::LocationTimeout => f.write_str("location request timed out"),
            NotDetectedReason::PositionUnavailable(msg) => write!(f, "position unavailable: {msg}"),
            NotDetectedReason::Geocoding(msg) => write!(f, "reverse geocoding failed: {msg}"),
            NotDetectedReason::NoRegionName => f.write_str("no region name for this position"),
            NotDetectedReason::NoMatch(name) => write!(f, "no region matches {name:?}"),
        }
    }
}

/// Result of [`RegionDetector::detect_region`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectOutcome {
    Detected { region: Region, source: DetectSource },
    NotDetected(NotDetectedReason),
}

impl DetectOutcome {
    pub fn region(&self) -> Option<&Region> {
        match self {
            DetectOutcome::Detected { region, .. } => Some(region),
            DetectOutcome::NotDetected(_) => None,
        }
    }
}

/// Resolves the user's region from stored state or geolocation.
#[derive(Clone)]
pub struct RegionDetector {
    location: Arc<dyn LocationProvider>,
    geocoder: Arc<dyn ReverseGeocoder>,
    store: Arc<dyn RegionStore>,
    location_timeout: Duration,
    region_ttl: chrono::Duration,
}

impl fmt::Debug for RegionDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegionDetector")
            .field("location_timeout", &self.location_timeout)
            .field("region_ttl", &self.region_ttl)
            .finish_non_exhaustive()
    }
}

impl RegionDetector {
    pub fn new(
        location: Arc<dyn LocationProvider>, geocoder: Arc<dyn ReverseGeocoder>, store: Arc<dyn RegionStore>,
    ) -> Self {
        let defaults = GeoConfig::default();
        Self {
            location,
            geocoder,
            store,
            location_timeout: defaults.location_timeout(),
            region_ttl: defaults.region_ttl(),
        }
    }

    /// Apply timeouts from configuration.
    pub fn with_config(mut self, config: &GeoConfig) -> Self {
        self.location_timeout = config.location_timeout();
        self.region_ttl = config.region_ttl();
        self
    }

    pub fn with_location_timeout(mut self, timeout: Duration) -> Self {
        self.location_timeout = timeout;
        self
    }

    /// Detect the user's region among `regions`.
    pub async fn detect_region(&self, regions: &[Region]) -> DetectOutcome {
        if let Some(region) = self.stored_region(regions).await {
            tracing::debug!(code = %region.code, "reusing stored region");
            return DetectOutcome::Detected { region, source: DetectSource::Stored };
        }

        let outcome = self.detect_from_position(regions).await;
        match &outcome {
            DetectOutcome::Detected { region, .. } => {
                tracing::info!(code = %region.code, name = %region.name, "region detected");
                if let Err(e) = self.store.save(&StoredRegion::now(&region.code, &region.name)).await {
                    tracing::warn!(error = %e, "failed to remember detected region");
                }
            }
            DetectOutcome::NotDetected(reason) => tracing::info!(%reason, "region not detected"),
        }
        outcome
    }

    /// Forget the stored region so the next detection uses geolocation.
    pub async fn reset(&self) -> Result<(), Error> {
        self.store.clear().await
    }

    async fn stored_region(&self, regions: &[Region]) -> Option<Region> {
        let stored = self.store.load().await?;
        if !stored.is_fresh(self.region_ttl, Utc::now()) {
            return None;
        }
        regions.iter().find(|r| r.code == stored.code).cloned()
    }

    async fn detect_from_position(&self, regions: &[Region]) -> DetectOutcome {
        let options = PositionOptions { high_accuracy: false, timeout: self.location_timeout };
        let position = tokio::time::timeout(self.location_timeout, self.location.current_position(options)).await;

        let coords = match position {
            Err(_) | Ok(Err(LocationError::Timeout)) => {
                return DetectOutcome::NotDetected(NotDetectedReason::LocationTimeout);
            }
            Ok(Err(LocationError::PermissionDenied)) => {
                return DetectOutcome::NotDetected(NotDetectedReason::PermissionDenied);
            }
            Ok(Err(LocationError::Unavailable(msg))) => {
                return DetectOutcome::NotDetected(NotDetectedReason::PositionUnavailable(msg));
            }
            Ok(Ok(coords)) => coords,
        };

        let place = match self.geocoder.reverse(coords).await {
            Ok(place) => place,
            Err(e) => return DetectOutcome::NotDetected(NotDetectedReason::Geocoding(e.details())),
        };

        let Some(name) = place.region_name() else {
            return DetectOutcome::NotDetected(NotDetectedReason::NoRegionName);
        };

        match match_region(&name, regions) {
            Some(region) => DetectOutcome::Detected { region: region.clone(), source: DetectSource::Geolocation },
            None => DetectOutcome::NotDetected(NotDetectedReason::NoMatch(name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubGeocoder {
        place: Result<GeocodedPlace, Error>,
        calls: AtomicUsize,
    }

    impl StubGeocoder {
        fn new(place: Result<GeocodedPlace, Error>) -> Arc<Self> {
            Arc::new(Self { place, calls: AtomicUsize::new(0) })
        }

        fn state(name: &str) -> Arc<Self> {
            Self::new(Ok(GeocodedPlace { state: Some(name.to_string()), ..Default::default() }))
        }
    }

    #[async_trait]
    impl ReverseGeocoder for StubGeocoder {
        async fn reverse(&self, _coords: Coordinates) -> Result<GeocodedPlace, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.place.clone()
        }
    }

    struct SlowLocation;

    #[async_trait]
    impl LocationProvider for SlowLocation {
        async fn current_position(&self, _options: PositionOptions) -> Result<Coordinates, LocationError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Coordinates::new(-6.9, 107.6))
        }
    }

    fn regions() -> Vec<Region> {
        vec![Region::new("32", "Jawa Barat"), Region::new("33", "Jawa Tengah"), Region::new("51", "Bali")]
    }

    fn bandung() -> Arc<FixedLocation> {
        Arc::new(FixedLocation(Coordinates::new(-6.9, 107.6)))
    }

    #[tokio::test]
    async fn test_detects_from_state() {
        let store = Arc::new(MemoryRegionStore::new());
        let detector = RegionDetector::new(bandung(), StubGeocoder::state("JAWA BARAT"), store.clone());

        let outcome = detector.detect_region(&regions()).await;
        assert_eq!(
            outcome,
            DetectOutcome::Detected { region: Region::new("32", "Jawa Barat"), source: DetectSource::Geolocation }
        );
        assert_eq!(store.load().await.map(|r| r.code), Some("32".to_string()));
    }

    #[tokio::test]
    async fn test_reuses_fresh_stored_region() {
        let store = Arc::new(MemoryRegionStore::with_region(StoredRegion::now("51", "Bali")));
        let geocoder = StubGeocoder::state("Jawa Barat");
        let detector = RegionDetector::new(bandung(), geocoder.clone(), store);

        let outcome = detector.detect_region(&regions()).await;
        assert_eq!(outcome, DetectOutcome::Detected { region: Region::new("51", "Bali"), source: DetectSource::Stored });
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_stale_stored_region_is_redetected() {
        let stale = StoredRegion { detected_at: Utc::now() - chrono::Duration::hours(25), ..StoredRegion::now("51", "Bali") };
        let store = Arc::new(MemoryRegionStore::with_region(stale));
        let geocoder = StubGeocoder::state("Jawa Barat");
        let detector = RegionDetector::new(bandung(), geocoder.clone(), store.clone());

        let outcome = detector.detect_region(&regions()).await;
        assert_eq!(outcome.region().map(|r| r.code.as_str()), Some("32"));
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.load().await.map(|r| r.code), Some("32".to_string()));
    }

    #[tokio::test]
    async fn test_falls_back_to_region_then_display_name() {
        let place = GeocodedPlace { state: Some("  ".into()), region: Some("Bali".into()), display_name: None };
        let detector =
            RegionDetector::new(bandung(), StubGeocoder::new(Ok(place)), Arc::new(MemoryRegionStore::new()));
        assert_eq!(detector.detect_region(&regions()).await.region().map(|r| r.code.as_str()), Some("51"));

        let place = GeocodedPlace { display_name: Some("Semarang, Jawa Tengah, Indonesia".into()), ..Default::default() };
        let detector =
            RegionDetector::new(bandung(), StubGeocoder::new(Ok(place)), Arc::new(MemoryRegionStore::new()));
        assert_eq!(detector.detect_region(&regions()).await.region().map(|r| r.code.as_str()), Some("33"));
    }

    #[tokio::test]
    async fn test_permission_denied() {
        let detector = RegionDetector::new(
            Arc::new(NoLocation),
            StubGeocoder::state("Jawa Barat"),
            Arc::new(MemoryRegionStore::new()),
        );
        assert_eq!(
            detector.detect_region(&regions()).await,
            DetectOutcome::NotDetected(NotDetectedReason::PermissionDenied)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_location_timeout() {
        let detector = RegionDetector::new(
            Arc::new(SlowLocation),
            StubGeocoder::state("Jawa Barat"),
            Arc::new(MemoryRegionStore::new()),
        );
        assert_eq!(
            detector.detect_region(&regions()).await,
            DetectOutcome::NotDetected(NotDetectedReason::LocationTimeout)
        );
    }

    #[tokio::test]
    async fn test_ambiguous_name_is_not_guessed() {
        let store = Arc::new(MemoryRegionStore::new());
        let detector = RegionDetector::new(bandung(), StubGeocoder::state("Jawa"), store.clone());

        let outcome = detector.detect_region(&regions()).await;
        assert_eq!(outcome, DetectOutcome::NotDetected(NotDetectedReason::NoMatch("Jawa".into())));
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn test_geocoding_failure_and_missing_name() {
        let failing = StubGeocoder::new(Err(Error::UpstreamUnavailable("down".into())));
        let detector = RegionDetector::new(bandung(), failing, Arc::new(MemoryRegionStore::new()));
        assert!(matches!(
            detector.detect_region(&regions()).await,
            DetectOutcome::NotDetected(NotDetectedReason::Geocoding(_))
        ));

        let empty = StubGeocoder::new(Ok(GeocodedPlace::default()));
        let detector = RegionDetector::new(bandung(), empty, Arc::new(MemoryRegionStore::new()));
        assert_eq!(
            detector.detect_region(&regions()).await,
            DetectOutcome::NotDetected(NotDetectedReason::NoRegionName)
        );
    }

    #[tokio::test]
    async fn test_invalid_fixed_location() {
        let detector = RegionDetector::new(
            Arc::new(FixedLocation(Coordinates::new(120.0, 0.0))),
            StubGeocoder::state("Bali"),
            Arc::new(MemoryRegionStore::new()),
        );
        assert!(matches!(
            detector.detect_region(&regions()).await,
            DetectOutcome::NotDetected(NotDetectedReason::PositionUnavailable(_))
        ));
    }

    #[test]
    fn test_region_name_priority() {
        let place = GeocodedPlace {
            state: Some("Jawa Barat".into()),
            region: Some("Jawa".into()),
            display_name: Some("Bali, Indonesia".into()),
        };
        assert_eq!(place.region_name().as_deref(), Some("Jawa Barat"));
        assert_eq!(GeocodedPlace::default().region_name(), None);
    }
}
