use std::process::exit;

use clap::Parser;
use log::{error, info};

use dispatch_queue::{DispatchQueue, Result};

#[derive(Parser)]
#[command(name = "dispatch-demo", version, about = "Dispatch queue demonstration")]
struct Cli {
    /// Number of worker threads
    #[arg(long, value_name = "N", default_value_t = num_cpus::get() as u32)]
    workers: u32,

    /// Number of tasks to dispatch
    #[arg(long, value_name = "N", default_value_t = 6)]
    tasks: u32,
}

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("{}", e);
        exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    info!("dispatch-demo {}", env!("CARGO_PKG_VERSION"));
    info!("Workers: {}", cli.workers);

    let queue = DispatchQueue::new(cli.workers)?;

    for i in 1..=cli.tasks {
        queue.dispatch(move || {
            let thread = std::thread::current();
            let worker = thread.name().unwrap_or("?").to_owned();
            println!("dispatch {i} ({worker})");
        })?;
    }

    // Dropping the queue drains the remaining tasks and joins the pool.
    drop(queue);
    info!("All {} tasks executed", cli.tasks);

    Ok(())
}
