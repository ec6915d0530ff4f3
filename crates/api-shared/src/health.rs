use crate::wire::HealthRes;

/// Simple health service used by the REST API and by clients probing a server.
///
/// This service provides a standardised way to check the health status of MedRef.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Creates a new instance of HealthService.
    pub fn new() -> Self {
        Self
    }

    /// Static method to check health without creating an instance
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is healthy.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "MedRef is alive".into(),
        }
    }
}
