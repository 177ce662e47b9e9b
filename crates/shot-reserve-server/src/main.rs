//! Server implementation

#![warn(missing_docs)]

mod http;

use std::path::Path;
use std::thread;

use eyre::{eyre, Result, WrapErr};
use serde::Deserialize;
use shot_reserve_core::{Config, RequestHandler, ResetPolicy};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command line options
#[derive(Debug)]
struct Opts {
    /// Configuration of the reservation system
    config: Config,

    /// Port for the HTTP server to listen on
    port: u16,
    /// Host for the HTTP server to listen on
    host: String,
    /// Number of HTTP worker threads
    balancer_threads: u32,
}

/// `[server]` table of the configuration file
#[derive(Default, Deserialize, Debug)]
#[serde(rename_all = "kebab-case", default)]
struct ServerSection {
    port: Option<u16>,
    host: Option<String>,
    balancer_threads: Option<u32>,
}

/// Layout of the TOML configuration file
#[derive(Default, Deserialize, Debug)]
#[serde(default)]
struct ConfigFile {
    server: ServerSection,
    reservations: Config,
}

impl Default for Opts {
    fn default() -> Self {
        Opts {
            port: 8585,
            host: String::from("127.0.0.1"),
            config: Config::default(),
            balancer_threads: 8,
        }
    }
}

fn parse_flag<T: std::str::FromStr>(opt: &str, arg: &str, what: &str) -> Result<T> {
    arg.parse()
        .map_err(|_| eyre!("{opt} takes {what}, got `{arg}`"))
}

impl Opts {
    /// Build the options from defaults, the optional `-config` file and the
    /// remaining flags, in that order of precedence
    fn from_args(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let args: Vec<String> = args.into_iter().collect();
        let mut opts = Opts::default();

        if let Some(pos) = args.iter().position(|a| a == "-config") {
            let path = args
                .get(pos + 1)
                .ok_or_else(|| eyre!("-config takes a file path"))?;
            opts.apply_file(Path::new(path))?;
        }

        let mut option: Option<&str> = None;
        for arg in &args {
            if let Some(opt) = option {
                match opt {
                    "-config" => {}
                    "-port" => opts.port = parse_flag(opt, arg, "a decimal u16")?,
                    "-host" => opts.host = arg.clone(),
                    "-balancer-threads" => {
                        opts.balancer_threads = parse_flag(opt, arg, "a decimal u32")?
                    }
                    "-habu" => opts.config.inventory.habu = parse_flag(opt, arg, "a decimal u32")?,
                    "-tequila" => {
                        opts.config.inventory.tequila = parse_flag(opt, arg, "a decimal u32")?
                    }
                    "-initial-code" => {
                        opts.config.initial_code = parse_flag(opt, arg, "a decimal u32")?
                    }
                    "-code-width" => {
                        opts.config.code_width = parse_flag(opt, arg, "a decimal width")?
                    }
                    "-session-ttl" => {
                        opts.config.session_ttl = parse_flag(opt, arg, "a number of seconds")?
                    }
                    "-event-time" => opts.config.settings.event_time = arg.clone(),
                    "-location" => opts.config.settings.location = arg.clone(),
                    "-admin" => opts
                        .config
                        .admins
                        .push(arg.parse().map_err(|e: String| eyre!("-admin: {e}"))?),
                    _ => return Err(eyre!("unknown option {opt}")),
                }
                option = None;
            } else {
                match arg.as_str() {
                    "-closed" => opts.config.settings.is_open = false,
                    "-restore-inventory-on-reset" => {
                        opts.config.reset_policy = ResetPolicy::RestoreInventory
                    }
                    _ => option = Some(arg.as_str()),
                }
            }
        }
        if let Some(opt) = option {
            return Err(eyre!("leftover option {opt}"));
        }
        if opts.balancer_threads == 0 {
            return Err(eyre!("-balancer-threads must be at least 1"));
        }
        opts.config.validate().wrap_err("invalid configuration")?;

        Ok(opts)
    }

    fn apply_file(&mut self, path: &Path) -> Result<()> {
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("reading {}", path.display()))?;
        let file: ConfigFile =
            toml::from_str(&contents).wrap_err_with(|| format!("parsing {}", path.display()))?;

        self.config = file.reservations;
        if let Some(port) = file.server.port {
            self.port = port;
        }
        if let Some(host) = file.server.host {
            self.host = host;
        }
        if let Some(threads) = file.server.balancer_threads {
            self.balancer_threads = threads;
        }
        Ok(())
    }
}

fn http_loop<H: RequestHandler>(server: &tiny_http::Server, handler: &H) {
    loop {
        match server.recv() {
            Ok(rq) => {
                if let Some(rq) = http::parse(rq) {
                    handler.handle(rq);
                }
            }
            Err(e) => error!("HTTP receive failed: {e}"),
        }
    }
}

/// Start up to `count` workers with `spawn`, returning how many are running
///
/// A failed spawn is logged and skipped. It is an error only when no worker
/// could be started.
fn spawn_workers<F>(count: u32, mut spawn: F) -> Result<u32>
where
    F: FnMut(u32) -> std::io::Result<()>,
{
    let mut running = 0;
    for i in 0..count {
        match spawn(i) {
            Ok(()) => running += 1,
            Err(e) => error!(thread = i, "spawning balancer thread failed: {e}"),
        }
    }
    if running == 0 {
        return Err(eyre!("no balancer thread could be started"));
    }
    if running < count {
        warn!(running, requested = count, "serving with fewer balancer threads");
    }
    Ok(running)
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shot_reserve_server=info,shot_reserve_rocket=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let opts = Opts::from_args(std::env::args().skip(1))?;
    if opts.config.admins.is_empty() {
        warn!("no admin accounts configured, the admin API is unusable");
    }

    let server = tiny_http::Server::http((opts.host.as_str(), opts.port))
        .map_err(|e| eyre!("binding {}:{} failed: {e}", opts.host, opts.port))?;
    info!(host = %opts.host, port = opts.port, threads = opts.balancer_threads, "listening");

    let balancer = shot_reserve_rocket::launch(&opts.config);

    let (server, balancer) = (&server, &balancer);
    thread::scope(|s| -> Result<()> {
        spawn_workers(opts.balancer_threads, |i| {
            thread::Builder::new()
                .name(format!("balancer_{i}"))
                .spawn_scoped(s, move || http_loop(server, balancer))
                .map(drop)
        })?;
        Ok(())
    })
}
