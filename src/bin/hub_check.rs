//! Stands in for the hub bridge: asks the accessory to identify itself, then
//! requests a reading every second and prints whatever it publishes.

use {
    anyhow::{Context, Result},
    co2_monitor::accessory::Topics,
    log::error,
    rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS},
    std::{env, time::Duration},
    tokio::{task, time},
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    pretty_env_logger::init();
    color_backtrace::install();

    let address = env::var("MQTT_ADDR").context("Failed to find MQTT_ADDR environment variable")?;
    let port = env::var("MQTT_PORT").context("Failed to find MQTT_PORT environment variable")?;
    let prefix = env::var("CO2_TOPIC_PREFIX").unwrap_or_else(|_| "co2-monitor".to_string());

    let mut mqttoptions = MqttOptions::new("co2-hub-check", address, port.parse()?);
    mqttoptions.set_keep_alive(Duration::from_secs(5));

    let (client, mut eventloop) = AsyncClient::new(mqttoptions, 10);
    spawn_requests(client, Topics::new(&prefix));

    loop {
        if let Event::Incoming(Packet::Publish(publish)) = eventloop.poll().await? {
            println!(
                "{} = {}",
                publish.topic,
                String::from_utf8_lossy(&publish.payload)
            );
        }
    }
}

fn spawn_requests(client: AsyncClient, topics: Topics) -> task::JoinHandle<()> {
    task::spawn(async move {
        if let Err(e) = requests(client, topics).await {
            error!("Sending requests failed: {}", e);
        }
    })
}

async fn requests(client: AsyncClient, topics: Topics) -> Result<()> {
    client.subscribe(&topics.level, QoS::AtMostOnce).await?;
    client.subscribe(&topics.online, QoS::AtMostOnce).await?;

    client
        .publish(&topics.identify, QoS::AtLeastOnce, false, Vec::new())
        .await?;

    for _ in 0..10 {
        client
            .publish(&topics.get, QoS::AtLeastOnce, false, Vec::new())
            .await?;
        time::sleep(Duration::from_secs(1)).await;
    }

    Ok(())
}
