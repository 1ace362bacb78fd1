use {
    crate::{
        accessory::{Co2Monitor, Topics},
        sensors::HttpSensor,
        settings::Settings,
    },
    anyhow::Result,
    log::info,
    rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS},
    std::{sync::Arc, time::Duration},
    tokio::{task, time::interval},
};

pub mod accessory;
pub mod error;
pub mod sensors;
pub mod settings;

pub async fn run(settings: &Settings) -> Result<()> {
    let sensor = Arc::new(HttpSensor::initialize(&settings.source)?);
    info!("Reading CO2 from {}", sensor.url());

    let mqtt = &settings.mqtt;
    info!("MQTT connecting to {}:{}", mqtt.host, mqtt.port);
    let (client, mut eventloop) = {
        let mut mqttoptions = MqttOptions::new(&mqtt.client_id, &mqtt.host, mqtt.port);
        mqttoptions.set_keep_alive(Duration::from_secs(mqtt.keep_alive_secs));

        AsyncClient::new(mqttoptions, 10)
    };

    let monitor = Arc::new(Co2Monitor::new(
        settings.accessory.name.clone(),
        sensor,
        client.clone(),
        Topics::new(&mqtt.topic_prefix),
    ));

    let topics = monitor.topics().clone();
    client.subscribe(&topics.get, QoS::AtLeastOnce).await?;
    client.subscribe(&topics.identify, QoS::AtLeastOnce).await?;

    if settings.poll.interval_secs > 0 {
        task::spawn(poll(
            monitor.clone(),
            Duration::from_secs(settings.poll.interval_secs),
        ));
        info!("Started polling task");
    }

    info!("Initialization complete");

    loop {
        if let Event::Incoming(Packet::Publish(publish)) = eventloop.poll().await? {
            monitor.handle(&publish.topic);
        }
    }
}

async fn poll(monitor: Arc<Co2Monitor>, period: Duration) {
    let mut interval = interval(period);
    loop {
        interval.tick().await;
        monitor.clone().refresh().await;
    }
}
