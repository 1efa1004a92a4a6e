use anyhow::Result;
use clap::Parser;
use p2psim::{Latency, PacketLoss, Rate, SimConfiguration, SimContext};
use std::{
    thread::sleep,
    time::{Duration, Instant},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Spawn a swarm of probe nodes and watch them discover each other.
///
/// Set `RUST_LOG=p2psim=debug` (or `trace`) to follow the simulation.
#[derive(Parser)]
struct Command {
    /// number of probe nodes to spawn
    #[arg(long, default_value = "12")]
    nodes: usize,

    /// wall-clock duration of the run, in seconds
    #[arg(long, default_value = "10")]
    seconds: u64,

    /// simulation speed multiplier
    #[arg(long, default_value = "1.0")]
    speed: f64,

    #[arg(long, default_value = "30B/s")]
    link_rate: Rate,

    #[arg(long, default_value = "20%")]
    packet_loss: PacketLoss,

    #[arg(long, default_value = "100ms")]
    max_random_latency: Latency,

    #[arg(long, default_value = "12345")]
    seed: u64,

    /// interval between two reports, in seconds
    #[arg(long, default_value = "1")]
    every: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cmd = Command::parse();

    let configuration = SimConfiguration::default()
        .set_link_rate(cmd.link_rate)
        .set_packet_loss(cmd.packet_loss)
        .set_max_random_latency(cmd.max_random_latency)
        .set_seed(cmd.seed);

    let mut context = SimContext::<Vec<u8>>::new(configuration)?;
    context.set_speed(cmd.speed)?;

    for _ in 0..cmd.nodes {
        let address = context.spawn_probe_node()?;
        info!(%address, "spawned");
    }

    let started = Instant::now();
    let duration = Duration::from_secs(cmd.seconds);
    let every = Duration::from_secs(cmd.every.max(1));

    while started.elapsed() < duration {
        sleep(every);
        report(&context);
    }

    context.shutdown()
}

fn report(context: &SimContext<Vec<u8>>) {
    let snapshot = context.snapshot();
    let stats = context.stats();

    let active_links = snapshot.links.iter().filter(|link| link.active).count();
    let congested_links = snapshot.links.iter().filter(|link| link.tokens < 0.0).count();

    println!(
        "[{time}] nodes: {nodes}, links: {active_links}/{links} active ({congested_links} congested), \
        in flight: {in_flight}, delivered: {delivered}, dropped: {dropped}, discarded: {discarded}",
        time = snapshot.time,
        nodes = snapshot.running_nodes().count(),
        links = snapshot.links.len(),
        in_flight = stats.in_flight,
        delivered = stats.delivered,
        dropped = stats.dropped,
        discarded = stats.discarded,
    );
}
