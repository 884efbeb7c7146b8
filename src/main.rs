//! stashkv - An In-Memory Key to Value-List Store
//!
//! This is the main entry point for the stashkv server.
//! It sets up the TCP listener, the store, the background expiry sweeper,
//! and handles incoming connections.

use stashkv::commands::CommandHandler;
use stashkv::connection::{handle_connection, ConnectionStats};
use stashkv::storage::{Store, Sweeper};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Server configuration
struct Config {
    /// Host to bind to
    host: String,
    /// Port to listen on
    port: u16,
    /// Seconds between expiry sweeps (0 disables the sweeper)
    sweep_interval: u64,
    /// Seconds a connection may sit idle before it is closed (0 = no limit)
    idle_timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: stashkv::DEFAULT_HOST.to_string(),
            port: stashkv::DEFAULT_PORT,
            sweep_interval: 5,
            idle_timeout: 0,
        }
    }
}

impl Config {
    /// Parse configuration from command-line arguments
    fn from_args() -> Self {
        let mut config = Config::default();
        let args: Vec<String> = std::env::args().collect();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--host" | "-h" => {
                    config.host = Self::take_value(&args, &mut i, "--host");
                }
                "--port" | "-p" => {
                    config.port = Self::take_value(&args, &mut i, "--port")
                        .parse()
                        .unwrap_or_else(|_| {
                            eprintln!("Error: invalid port number");
                            std::process::exit(1);
                        });
                }
                "--sweep-interval" => {
                    config.sweep_interval = Self::take_value(&args, &mut i, "--sweep-interval")
                        .parse()
                        .unwrap_or_else(|_| {
                            eprintln!("Error: invalid sweep interval");
                            std::process::exit(1);
                        });
                }
                "--idle-timeout" => {
                    config.idle_timeout = Self::take_value(&args, &mut i, "--idle-timeout")
                        .parse()
                        .unwrap_or_else(|_| {
                            eprintln!("Error: invalid idle timeout");
                            std::process::exit(1);
                        });
                }
                "--help" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("stashkv version {}", stashkv::VERSION);
                    std::process::exit(0);
                }
                _ => {
                    eprintln!("Unknown argument: {}", args[i]);
                    print_help();
                    std::process::exit(1);
                }
            }
            i += 1;
        }

        config
    }

    fn take_value(args: &[String], i: &mut usize, flag: &str) -> String {
        if *i + 1 < args.len() {
            *i += 1;
            args[*i].clone()
        } else {
            eprintln!("Error: {} requires a value", flag);
            std::process::exit(1);
        }
    }

    /// Returns the bind address as a string
    fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn print_help() {
    println!(
        r#"
stashkv - An In-Memory Key to Value-List Store

USAGE:
    stashkv [OPTIONS]

OPTIONS:
    -h, --host <HOST>             Host to bind to (default: 127.0.0.1)
    -p, --port <PORT>             Port to listen on (default: 7070)
        --sweep-interval <SECS>   Seconds between expiry sweeps; 0 disables
                                  background sweeping (default: 5)
        --idle-timeout <SECS>     Close connections idle for this many
                                  seconds; 0 disables (default: 0)
    -v, --version                 Print version information
        --help                    Print this help message

EXAMPLES:
    stashkv                           # Start on 127.0.0.1:7070
    stashkv --port 7071               # Start on port 7071
    stashkv --sweep-interval 1        # Sweep expired keys every second

CONNECTING:
    The protocol is plain text, one command per line:
    $ nc 127.0.0.1 7070
    set name ariz
    OK
    app name dev
    OK
    get name
    ariz dev
"#
    );
}

fn print_banner(config: &Config) {
    println!(
        r#"
         _            _     _
     ___| |_ __ _ ___| |__ | | ____   __
    / __| __/ _` / __| '_ \| |/ /\ \ / /
    \__ \ || (_| \__ \ | | |   <  \ V /
    |___/\__\__,_|___/_| |_|_|\_\  \_/

stashkv v{} - In-Memory Key to Value-List Store
──────────────────────────────────────────────────────────────
Server started on {}
Ready to accept connections.

Use Ctrl+C to shutdown gracefully.
"#,
        stashkv::VERSION,
        config.bind_address()
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let config = Config::from_args();

    // Set up logging
    let _subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    // Print the banner
    print_banner(&config);

    // Create the store (shared across all connections)
    let store = Arc::new(Store::new());
    info!("Store initialized");

    // Start the background expiry sweeper, unless disabled
    let _sweeper = if config.sweep_interval > 0 {
        Some(Sweeper::start(
            Arc::clone(&store),
            Duration::from_secs(config.sweep_interval),
        ))
    } else {
        info!("Background sweeping disabled");
        None
    };

    let idle_timeout = if config.idle_timeout > 0 {
        Some(Duration::from_secs(config.idle_timeout))
    } else {
        None
    };

    // Create connection statistics
    let stats = Arc::new(ConnectionStats::new());

    // Bind the TCP listener
    let listener = TcpListener::bind(config.bind_address()).await?;
    info!("Listening on {}", config.bind_address());

    // Set up graceful shutdown
    let shutdown = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Shutdown signal received, stopping server...");
    };

    // Main accept loop
    tokio::select! {
        _ = accept_loop(listener, store, idle_timeout, stats) => {}
        _ = shutdown => {}
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Main loop that accepts incoming connections
async fn accept_loop(
    listener: TcpListener,
    store: Arc<Store>,
    idle_timeout: Option<Duration>,
    stats: Arc<ConnectionStats>,
) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                // Create a command handler for this connection
                let handler = CommandHandler::new(Arc::clone(&store));
                let stats = Arc::clone(&stats);

                // Spawn a task to handle this connection
                tokio::spawn(async move {
                    handle_connection(stream, addr, handler, idle_timeout, stats).await;
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
