use super::Network;
use p2psim_core::Data;
use std::{
    io,
    thread::{self, JoinHandle},
    time::Duration,
};
use tracing::{debug, trace};

/// Pause between two passes of the scheduler, in wall-clock time.
pub const SCHEDULER_TICK: Duration = Duration::from_millis(2);

/// start the thread delivering the transmissions of `network` as they
/// become due, until the network is stopped
pub(crate) fn spawn_scheduler<T>(network: Network<T>) -> io::Result<JoinHandle<()>>
where
    T: Data,
{
    thread::Builder::new()
        .name("p2psim-scheduler".to_owned())
        .spawn(move || run(network))
}

fn run<T>(network: Network<T>)
where
    T: Data,
{
    while !network.is_stopped() {
        let delivered = network.deliver_due();
        if delivered > 0 {
            trace!(delivered, "scheduler pass");
        }

        thread::sleep(SCHEDULER_TICK);
    }

    debug!("scheduler exited");
}
