//! State shared by the LMS routes.
//!
//! Every handler reaches the course, enrollment and grading operations
//! through [`GatewayState::lms`]. The [`crate::auth`] extractors resolve
//! bearer tokens into a caller with [`GatewayState::jwt_validator`], and the
//! router reads CORS, body-size, timeout and latency settings from
//! [`GatewayState::config`] once at build time.

use std::sync::Arc;

use lms_auth::JwtValidator;
use lms_service::Lms;

use crate::config::GatewayConfig;

/// Handle to the LMS service plus the token validator, cloned into each request.
///
/// Both handles sit behind `Arc`, so cloning copies two pointers and the
/// small config struct.
pub struct GatewayState<L, V>
where
    L: Lms,
    V: JwtValidator,
{
    /// Course, user, enrollment, assignment, material and result operations.
    pub lms: Arc<L>,
    /// Validates bearer tokens and yields the caller's id and role.
    pub jwt_validator: Arc<V>,
    /// Listener, CORS, limits and auth settings.
    pub config: GatewayConfig,
}

impl<L, V> GatewayState<L, V>
where
    L: Lms,
    V: JwtValidator,
{
    /// Bundle a service and validator for the router.
    #[must_use]
    pub fn new(lms: Arc<L>, jwt_validator: Arc<V>, config: GatewayConfig) -> Self {
        Self {
            lms,
            jwt_validator,
            config,
        }
    }
}

impl<L, V> Clone for GatewayState<L, V>
where
    L: Lms,
    V: JwtValidator,
{
    fn clone(&self) -> Self {
        Self {
            lms: Arc::clone(&self.lms),
            jwt_validator: Arc::clone(&self.jwt_validator),
            config: self.config.clone(),
        }
    }
}
