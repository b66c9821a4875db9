//! The cached integration time calculator client (§4.2).

use crate::backend::ItcBackend;
use crate::cache::SingleflightLruCache;
use crate::types::{ItcInput, ItcVersions};
use odb_core::{ExposureTimeMode, GenError, GenParams, IntegrationTime, InstrumentModeKind};
use std::sync::Arc;

/// Default number of distinct inputs held in each of the two caches
/// (integration time, spectroscopy graphs).
pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

/// Configuration for [`ItcClient::init`].
#[derive(Clone, Debug)]
pub struct ItcClientConfig {
    /// Build/commit identifier salting the fingerprint cache key, so a
    /// calculator or model change invalidates cached results without an
    /// explicit sweep (§9 "Cache keys").
    pub commit_hash: String,
    /// Maximum number of distinct inputs held in each cache.
    pub cache_capacity: usize,
}

impl Default for ItcClientConfig {
    fn default() -> Self {
        Self {
            commit_hash: String::new(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

/// The integration time calculator client: dispatches to spectroscopy or
/// imaging per the requested mode, coalesces concurrent identical
/// requests, and caches successful results by fingerprint (§4.2, §9).
pub struct ItcClient {
    backend: Arc<dyn ItcBackend>,
    commit_hash: String,
    integration: SingleflightLruCache<[u8; 16], IntegrationTime>,
    graphs: SingleflightLruCache<[u8; 16], Vec<f64>>,
}

impl ItcClient {
    /// Construct a client backed by `backend`, per `config` (§9 "explicit
    /// `init`/`teardown`, no global mutable singletons").
    pub fn init(backend: Arc<dyn ItcBackend>, config: ItcClientConfig) -> Self {
        Self {
            backend,
            commit_hash: config.commit_hash,
            integration: SingleflightLruCache::new(config.cache_capacity),
            graphs: SingleflightLruCache::new(config.cache_capacity),
        }
    }

    /// Release cached state. The client must not be used afterward.
    pub fn teardown(self) {
        drop(self);
    }

    /// Resolve the integration time for one observation's resolved
    /// parameters.
    ///
    /// If `params.exposure_time_mode` is [`ExposureTimeMode::TimeAndCount`],
    /// the result is constructed directly from the given time and count
    /// without consulting the calculator at all (§4.2). Otherwise this
    /// dispatches to [`Self::spectroscopy`] or [`Self::imaging`] depending
    /// on the instrument mode.
    #[tracing::instrument(skip(self, params))]
    pub fn integration_time(
        &self,
        params: &GenParams,
        use_cache: bool,
    ) -> Result<IntegrationTime, GenError> {
        let requested_snr = match params.exposure_time_mode {
            ExposureTimeMode::TimeAndCount { time, count } => {
                return Ok(IntegrationTime::from_time_and_count(time, count));
            }
            ExposureTimeMode::SignalToNoise(snr) => snr,
        };

        let input = ItcInput {
            asterism: params.asterism.clone(),
            mode: params.mode.clone(),
            constraints: params.constraints,
            requested_snr,
        };

        match &params.mode {
            InstrumentModeKind::GmosImaging { .. } => self.imaging(&input, use_cache),
            InstrumentModeKind::GmosLongSlit { .. } | InstrumentModeKind::Flamingos2LongSlit { .. } => {
                self.spectroscopy(&input, use_cache)
            }
        }
    }

    /// Solve for a spectroscopic integration time, consulting the cache
    /// first unless `use_cache` is `false`.
    pub fn spectroscopy(&self, input: &ItcInput, use_cache: bool) -> Result<IntegrationTime, GenError> {
        self.call(&self.integration, input, use_cache, |i| self.backend.spectroscopy(i))
    }

    /// Solve for an imaging integration time, consulting the cache first
    /// unless `use_cache` is `false`.
    pub fn imaging(&self, input: &ItcInput, use_cache: bool) -> Result<IntegrationTime, GenError> {
        self.call(&self.integration, input, use_cache, |i| self.backend.imaging(i))
    }

    /// Compute the supporting signal/background graphs for a spectroscopic
    /// input, consulting the cache first unless `use_cache` is `false`.
    pub fn spectroscopy_graphs(&self, input: &ItcInput, use_cache: bool) -> Result<Vec<f64>, GenError> {
        self.call(&self.graphs, input, use_cache, |i| self.backend.spectroscopy_graphs(i))
    }

    /// The calculator and reference-data versions currently in use. Never
    /// cached: callers want the live value.
    pub fn versions(&self) -> ItcVersions {
        self.backend.versions()
    }

    fn call<V, F>(
        &self,
        cache: &SingleflightLruCache<[u8; 16], V>,
        input: &ItcInput,
        use_cache: bool,
        compute: F,
    ) -> Result<V, GenError>
    where
        V: Clone,
        F: FnOnce(&ItcInput) -> Result<V, GenError>,
    {
        if !use_cache {
            return compute(input);
        }
        let key = input.fingerprint(&self.commit_hash);
        cache
            .get_or_compute(key, || compute(input).map_err(|e| e.to_string()))
            .map_err(GenError::ItcError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odb_core::{
        Band, Constraints, Extinction, ObservationId, Percentile, ProgramId, SignalToNoise, Site,
        SourceProfile, TargetId,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct CountingBackend {
        calls: AtomicUsize,
        response: Mutex<IntegrationTime>,
    }

    impl ItcBackend for CountingBackend {
        fn spectroscopy(&self, _input: &ItcInput) -> Result<IntegrationTime, GenError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(*self.response.lock().unwrap())
        }
        fn imaging(&self, _input: &ItcInput) -> Result<IntegrationTime, GenError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(*self.response.lock().unwrap())
        }
        fn spectroscopy_graphs(&self, _input: &ItcInput) -> Result<Vec<f64>, GenError> {
            Ok(vec![1.0, 2.0, 3.0])
        }
        fn versions(&self) -> ItcVersions {
            ItcVersions {
                server: "test-1".to_string(),
                data: None,
            }
        }
    }

    fn fixture_backend() -> (Arc<CountingBackend>, ItcClient) {
        let backend = Arc::new(CountingBackend {
            calls: AtomicUsize::new(0),
            response: Mutex::new(IntegrationTime {
                exposure_time: odb_core::TimeSpan::from_seconds(120.0),
                exposure_count: 3,
                signal_to_noise: Some(odb_core::SnrResult::Achieved(
                    SignalToNoise::from_milli(100_000).unwrap(),
                )),
                source_too_bright: false,
            }),
        });
        let client = ItcClient::init(
            backend.clone(),
            ItcClientConfig {
                commit_hash: "test".to_string(),
                cache_capacity: 16,
            },
        );
        (backend, client)
    }

    fn base_params() -> GenParams {
        GenParams {
            observation_id: ObservationId(1),
            program_id: ProgramId(1),
            mode: InstrumentModeKind::GmosImaging {
                site: Site::North,
                filters: vec!["g".to_string()],
                pre_imaging: false,
                interleave_filters: false,
            },
            asterism: vec![odb_core::AsterismMember {
                target_id: TargetId(1),
                profile: SourceProfile::Point,
                band: Band::V,
                has_sed: true,
            }],
            constraints: Constraints {
                image_quality: Percentile::P70,
                cloud_extinction: Extinction::from_millimags(0).unwrap(),
                sky_background: Percentile::Any,
                water_vapor: Percentile::Any,
            },
            exposure_time_mode: ExposureTimeMode::SignalToNoise(
                SignalToNoise::from_milli(100_000).unwrap(),
            ),
            explicit_spatial_offsets: None,
            explicit_wavelength_dithers: None,
            acquisition_overrides: Default::default(),
        }
    }

    #[test]
    fn time_and_count_mode_bypasses_the_backend() {
        let (backend, client) = fixture_backend();
        let mut params = base_params();
        params.exposure_time_mode = ExposureTimeMode::TimeAndCount {
            time: odb_core::TimeSpan::from_seconds(30.0),
            count: 2,
        };
        let result = client.integration_time(&params, true).unwrap();
        assert_eq!(result.exposure_count, 2);
        assert_eq!(result.signal_to_noise, None);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn signal_to_noise_mode_calls_backend_once_then_caches() {
        let (backend, client) = fixture_backend();
        let params = base_params();
        for _ in 0..5 {
            let result = client.integration_time(&params, true).unwrap();
            assert_eq!(result.exposure_count, 3);
        }
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn use_cache_false_always_calls_backend() {
        let (backend, client) = fixture_backend();
        let params = base_params();
        for _ in 0..3 {
            client.integration_time(&params, false).unwrap();
        }
        assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn gmos_imaging_mode_dispatches_to_imaging_not_spectroscopy() {
        let (backend, client) = fixture_backend();
        let params = base_params();
        client.integration_time(&params, true).unwrap();
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn versions_delegates_to_backend() {
        let (_backend, client) = fixture_backend();
        assert_eq!(client.versions().server, "test-1");
    }
}
