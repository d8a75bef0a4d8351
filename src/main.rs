mod checksum;
mod conf;
mod datalink;
mod error;
mod interfaces;
mod ns_monitor;
mod packets;
mod types;

use clap::Parser;
use log::error;

#[derive(Parser, Debug)]
#[command(version, about = "answers Neighbor Solicitations with ICMPv6 Redirects pointing at this host.")]
struct Args {
    /// the interface to listen on and send from
    iface: String,
    /// link-local address to claim as the better first hop
    #[arg(short, long)]
    source: Option<String>,
    /// the location of an optional config file
    #[arg(short, long)]
    conf: Option<String>,
}

async fn run(args: Args) -> Result<(), error::Error> {
    let myconf = conf::parse_config(&args.iface, args.conf.as_deref(), args.source.as_deref())?;
    let binding = datalink::Binding::open(myconf.get_iface_name(), *myconf.get_source_addr())?;
    ns_monitor::NSMonitor::new(&binding, *binding.get_source_addr())
        .run()
        .await
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    pretty_env_logger::init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        error!("{}", e);
        std::process::exit(1);
    }
}
