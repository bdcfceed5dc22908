//! Headless scenelink client binary.

use std::path::Path;

use scenelink::options::ClientOptions;
use scenelink::scene::backend::HeadlessBackend;
use scenelink::transport::TransportWorker;
use scenelink::util::TickTiming;
use scenelink::SceneClient;

const TICK_HZ: u32 = 60;

fn load_options(path: Option<&str>) -> Result<ClientOptions, scenelink::ClientError> {
    path.map_or_else(|| Ok(ClientOptions::default()), |p| ClientOptions::load(Path::new(p)))
}

fn run(url: &str, options: ClientOptions) -> Result<(), scenelink::ClientError> {
    let transport = TransportWorker::spawn(options.transport.clone())?;
    let mut client = SceneClient::new(transport, HeadlessBackend::new(), options)?;
    client.connect(url)?;
    log::info!("connecting to {url}");

    let mut timing = TickTiming::new(TICK_HZ);
    let mut was_connected = false;
    loop {
        client.tick();
        if client.is_connected() != was_connected {
            was_connected = client.is_connected();
            log::info!(
                "{} ({} scene nodes, {} gui components, {:.0} ticks/s)",
                if was_connected { "connected" } else { "disconnected" },
                client.scene().len(),
                client.gui().len(),
                timing.rate()
            );
        }
        std::thread::sleep(timing.until_next());
        timing.end_tick();
    }
}

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(url) = args.next() else {
        log::error!("Usage: scenelink <ws://host:port> [options.toml]");
        std::process::exit(1);
    };

    let options = match load_options(args.next().as_deref()) {
        Ok(options) => options,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&url, options) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
