use battleship_arena::{
    init_logging, server::accept_loop, serve_connection, Bot, GameServer, InMemoryTransport,
    ServerConfig, TcpTransport,
};

use clap::Parser;
use log::info;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
enum Commands {
    /// Host a session and wait for two players to connect.
    Serve {
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: String,
        #[arg(long, help = "Fix RNG seed for reproducible fleets (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
    /// Connect a bot player to a running server.
    Play {
        #[arg(long, default_value = "127.0.0.1:8080")]
        connect: String,
        #[arg(long, default_value = "bot")]
        name: String,
        #[arg(long, default_value_t = 1, help = "Number of games to finish before leaving")]
        games: usize,
        #[arg(long, help = "Fix RNG seed for reproducible shots")]
        seed: Option<u64>,
    },
    /// Run a server and two bots in-process.
    Local {
        #[arg(long, default_value_t = 1)]
        games: usize,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
}

fn make_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(s) => SmallRng::seed_from_u64(s),
        None => {
            let mut seed_rng = rand::rng();
            SmallRng::from_rng(&mut seed_rng)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { bind, seed } => {
            if let Some(s) = seed {
                info!("Using fixed seed: {} (fleets will be reproducible)", s);
            }
            let handle = GameServer::spawn(&ServerConfig { seed })?;
            let listener = TcpListener::bind(&bind).await?;
            info!("Listening on {}", listener.local_addr()?);
            accept_loop(listener, handle).await?;
        }
        Commands::Play {
            connect,
            name,
            games,
            seed,
        } => {
            info!("Connecting to {}...", connect);
            let transport = TcpTransport::connect(&connect).await?;
            let report = Bot::new(name, transport, make_rng(seed), games).run().await?;
            println!(
                "Played {} game(s) as {}: {} won, {} shots fired",
                report.games, report.player, report.wins, report.shots
            );
        }
        Commands::Local { games, seed } => {
            let handle = GameServer::spawn(&ServerConfig { seed })?;
            let connect_bot = |name: &str, offset: u64| {
                let (server_end, client_end) = InMemoryTransport::pair();
                tokio::spawn(serve_connection(handle.clone(), server_end));
                let rng = make_rng(seed.map(|s| s.wrapping_add(offset)));
                Bot::new(name, client_end, rng, games)
            };
            let alpha = connect_bot("alpha", 1);
            let bravo = connect_bot("bravo", 2);
            let (a, b) = tokio::try_join!(alpha.run(), bravo.run())?;
            for report in [a, b] {
                println!(
                    "{}: {} of {} game(s) won, {} shots fired",
                    report.player, report.wins, report.games, report.shots
                );
            }
        }
    }
    Ok(())
}
