use {crate::error::ReadError, async_trait::async_trait};

mod http;

pub use http::HttpSensor;

#[async_trait]
pub trait Sensor: Send + Sync {
    async fn measure(&self) -> Result<Measurement, ReadError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub name: String,
    pub value: f32,
}
