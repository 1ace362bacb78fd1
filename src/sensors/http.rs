use {
    crate::{
        error::ReadError,
        sensors::{Measurement, Sensor},
        settings::Source,
    },
    anyhow::{Context, Result},
    async_trait::async_trait,
    log::{debug, info, warn},
    reqwest::{Client, Url},
    serde_json::Value,
    std::{
        sync::atomic::{AtomicU32, Ordering},
        time::Duration,
    },
};

/// Upper bound of the CarbonDioxideLevel characteristic, in ppm.
const MAX_LEVEL: f64 = 100_000.0;

/// Reads the CO2 level from a JSON endpoint, one GET per read.
pub struct HttpSensor {
    client: Client,
    url: Url,
    field: String,
    stale_on_parse_error: bool,
    // f32 bits, overwritten by whichever read finishes last
    last_level: AtomicU32,
}

impl HttpSensor {
    pub fn initialize(source: &Source) -> Result<Self> {
        let url = source.endpoint()?;

        let mut builder = Client::builder();
        if source.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(source.timeout_secs));
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            url,
            field: source.field.clone(),
            stale_on_parse_error: source.stale_on_parse_error,
            last_level: AtomicU32::new(0f32.to_bits()),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Last successfully parsed level, 0 before the first one.
    pub fn last_level(&self) -> f32 {
        f32::from_bits(self.last_level.load(Ordering::Relaxed))
    }

    pub async fn read_level(&self) -> Result<f32, ReadError> {
        match self.fetch().await {
            Ok(level) => {
                self.last_level.store(level.to_bits(), Ordering::Relaxed);
                info!("CO2 level: {}", level);
                Ok(level)
            }
            Err(e) if e.is_payload_error() && self.stale_on_parse_error => {
                let level = self.last_level();
                warn!("{}, reporting last known level {}", e, level);
                Ok(level)
            }
            Err(e) => {
                warn!("{}", e);
                Err(e)
            }
        }
    }

    async fn fetch(&self) -> Result<f32, ReadError> {
        debug!("GET {}", self.url);

        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|source| self.transport_error(source))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReadError::HttpStatus {
                url: self.url.to_string(),
                status,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| self.transport_error(source))?;

        let data: Value = serde_json::from_slice(&body)?;

        let level = data
            .get(&self.field)
            .and_then(Value::as_f64)
            .ok_or_else(|| ReadError::MissingField {
                field: self.field.clone(),
            })?;

        // Every integer in range is exact as f32.
        if !(0.0..=MAX_LEVEL).contains(&level) {
            return Err(ReadError::OutOfRange {
                field: self.field.clone(),
                value: level,
            });
        }

        Ok(level as f32)
    }

    fn transport_error(&self, source: reqwest::Error) -> ReadError {
        ReadError::Transport {
            url: self.url.to_string(),
            source,
        }
    }
}

#[async_trait]
impl Sensor for HttpSensor {
    async fn measure(&self) -> Result<Measurement, ReadError> {
        let level = self.read_level().await?;

        Ok(Measurement {
            name: "co2".to_string(),
            value: level,
        })
    }
}
