use {
    crate::{
        error::ReadError,
        sensors::{Measurement, Sensor},
    },
    anyhow::Result,
    log::{debug, info, warn},
    rumqttc::{AsyncClient, QoS},
    std::sync::Arc,
    tokio::task::{self, JoinHandle},
};

/// MQTT topics the hub bridge uses to talk to one accessory.
#[derive(Debug, Clone, PartialEq)]
pub struct Topics {
    /// CarbonDioxideLevel value.
    pub level: String,
    /// `true` after a good read, `false` after a failed one.
    pub online: String,
    /// Inbound characteristic read requests.
    pub get: String,
    pub identify: String,
}

impl Topics {
    pub fn new(prefix: &str) -> Self {
        let prefix = prefix.trim_end_matches('/');

        Self {
            level: format!("{}/co2", prefix),
            online: format!("{}/co2/online", prefix),
            get: format!("{}/co2/get", prefix),
            identify: format!("{}/identify", prefix),
        }
    }

    /// Messages that report one read outcome to the hub.
    pub fn report(&self, outcome: &Result<Measurement, ReadError>) -> Vec<(String, String)> {
        match outcome {
            Ok(measurement) => vec![
                (self.online.clone(), "true".to_string()),
                (self.level.clone(), format!("{}", measurement.value)),
            ],
            Err(_) => vec![(self.online.clone(), "false".to_string())],
        }
    }
}

/// A CarbonDioxideSensor accessory published through an MQTT bridge.
pub struct Co2Monitor {
    name: String,
    sensor: Arc<dyn Sensor>,
    hub: AsyncClient,
    topics: Topics,
}

impl Co2Monitor {
    pub fn new(name: impl Into<String>, sensor: Arc<dyn Sensor>, hub: AsyncClient, topics: Topics) -> Self {
        let monitor = Self {
            name: name.into(),
            sensor,
            hub,
            topics,
        };
        info!("{} finished initializing", monitor.name);

        monitor
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn topics(&self) -> &Topics {
        &self.topics
    }

    /// Reads the sensor once and publishes the outcome.
    pub async fn update(&self) -> Result<()> {
        let outcome = self.sensor.measure().await;
        if let Err(e) = &outcome {
            debug!("{}: reporting offline after {}", self.name, e);
        }

        for (topic, payload) in self.topics.report(&outcome) {
            self.hub
                .publish(topic, QoS::AtLeastOnce, false, payload)
                .await?;
        }

        Ok(())
    }

    pub fn identify(&self) {
        info!("{}: identify", self.name);
    }

    /// Acts on a message the hub sent to `topic`. A read request starts its
    /// own update task, so concurrent requests are never merged.
    pub fn handle(self: &Arc<Self>, topic: &str) -> Option<JoinHandle<()>> {
        if topic == self.topics.get {
            Some(task::spawn(self.clone().refresh()))
        } else {
            if topic == self.topics.identify {
                self.identify();
            }
            None
        }
    }

    /// `update`, with publish failures logged instead of returned.
    pub async fn refresh(self: Arc<Self>) {
        if let Err(e) = self.update().await {
            warn!("{}: failed to publish: {}", self.name, e);
        }
    }
}
