//! Payload construction.
//!
//! The payload must be a pure function of configuration: two builds from an
//! unchanged installation serialize identically, otherwise every call would
//! look like a fingerprint mismatch.

use serde_json::{json, Map, Value};

use crate::checkin::types::CheckInRequest;
use crate::config::Installation;

/// Produces the request reported on each check-in.
pub trait PayloadSource: Send + Sync {
    fn payload(&self) -> CheckInRequest;
}

impl PayloadSource for Installation {
    fn payload(&self) -> CheckInRequest {
        let packages: Map<String, Value> = self
            .packages
            .iter()
            .map(|(name, info)| {
                (
                    name.clone(),
                    json!({ "version": info.version, "edition": info.edition }),
                )
            })
            .collect();

        let mut request = CheckInRequest::new();
        for (key, value) in &self.extra {
            request.insert(key.clone(), value.clone());
        }

        request.insert("key", self.license_key.clone());
        request.insert("host", self.host.clone());
        request.insert("ip", self.ip.clone());
        request.insert("port", self.port);
        request.insert("version", self.version.clone());
        request.insert("pro", self.pro);
        request.insert("runtime_version", self.runtime_version.clone());
        request.insert("packages", packages);
        request
    }
}

/// A fixed payload.
impl PayloadSource for CheckInRequest {
    fn payload(&self) -> CheckInRequest {
        self.clone()
    }
}

/// Payloads computed on demand, e.g. from request context.
impl<F> PayloadSource for F
where
    F: Fn() -> CheckInRequest + Send + Sync,
{
    fn payload(&self) -> CheckInRequest {
        self()
    }
}
