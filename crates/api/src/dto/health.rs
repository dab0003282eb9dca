use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub lifecycle: &'static str,
    pub version: &'static str,
}
