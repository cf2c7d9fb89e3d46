use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use parlor::prelude::*;
use parlor::{ChatEntry, ChatSender, ProfileStore, StoredProfile};
use parlor_transport::{
    Connection, MemoryConnection, ServerConnection, WebSocketDialer, WebSocketTransport,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "parlor-duel", version)]
#[command(about = "Gomoku and Liar's Dice in the terminal, peer to peer")]
struct Cli {
    /// Name shown to the other side. Overrides the saved profile.
    #[arg(short, long, global = true)]
    name: Option<String>,

    /// JSON file the profile is loaded from and saved to
    #[arg(long, global = true)]
    profile_file: Option<PathBuf>,

    /// Game on screen first: gomoku or dice
    #[arg(short, long, global = true, default_value = "gomoku")]
    game: GameKind,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Wait for a peer to join (you play Black and open at the dice table)
    Host {
        /// Address to listen on
        #[arg(short, long, default_value = "0.0.0.0:4000")]
        addr: String,
    },
    /// Join a host at host:port
    Join {
        addr: String,
    },
    /// Play on this machine: hot-seat, or against automated opponents
    Solo {
        /// pvp (hot-seat) or pve
        #[arg(short, long, default_value = "pve")]
        mode: GameMode,

        /// Automated dice opponents (1-3)
        #[arg(long, default_value_t = 1)]
        opponents: usize,

        /// Seed dice rolls for a reproducible game
        #[arg(long)]
        seed: Option<u64>,
    },
}

// ---------------------------------------------------------------------------
// Keyboard input
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
enum Input {
    Stone(usize, usize),
    Bid(u32, u8),
    Call,
    Deal,
    Setup(usize),
    Restart,
    Say(String),
    Sticker(String),
    Game(GameKind),
    Mode(GameMode),
    Name(String),
    Show,
    Help,
    Quit,
}

const HELP: &str = "\
commands:
  stone X Y        place a stone (0-14)
  bid Q F          bid Q dice showing F (1-6, ones are wild)
  call             call the table bid
  deal             deal the next dice round
  setup N          seat N automated dice opponents (offline)
  restart          start both games over
  say TEXT         chat
  sticker NAME     send a sticker
  game gomoku|dice switch the game on screen
  mode pvp|pve     switch offline mode (leaves online play)
  name NAME        change your name
  show | help | quit";

fn parse_input(line: &str) -> Result<Input, String> {
    let line = line.trim();
    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();
    let args: Vec<&str> = rest.split_whitespace().collect();

    let number = |i: usize| -> Result<u64, String> {
        args.get(i)
            .ok_or_else(|| format!("`{word}` needs {} numbers", i + 1))?
            .parse()
            .map_err(|_| format!("`{}` is not a number", args[i]))
    };
    let text = || {
        if rest.is_empty() {
            Err(format!("`{word}` needs some text"))
        } else {
            Ok(rest.to_string())
        }
    };

    match word.to_ascii_lowercase().as_str() {
        "stone" | "s" => Ok(Input::Stone(number(0)? as usize, number(1)? as usize)),
        "bid" | "b" => {
            let face = u8::try_from(number(1)?).map_err(|_| "face must be 1-6".to_string())?;
            Ok(Input::Bid(number(0)? as u32, face))
        }
        "call" | "c" => Ok(Input::Call),
        "deal" | "d" => Ok(Input::Deal),
        "setup" => Ok(Input::Setup(number(0)? as usize)),
        "restart" => Ok(Input::Restart),
        "say" => text().map(Input::Say),
        "sticker" => text().map(Input::Sticker),
        "game" => rest.parse().map(Input::Game),
        "mode" => rest.parse().map(Input::Mode),
        "name" => text().map(Input::Name),
        "show" | "" => Ok(Input::Show),
        "help" | "?" => Ok(Input::Help),
        "quit" | "exit" => Ok(Input::Quit),
        other => Err(format!("unknown command `{other}` (try `help`)")),
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render(hub: &GameHub) {
    let who = match hub.role() {
        Some(role) => format!("online, {role:?}"),
        None => hub.mode().to_string(),
    };
    println!();
    println!("== {} ({who}) ==", hub.game());
    match hub.game() {
        GameKind::Gomoku => render_gomoku(hub),
        GameKind::LiarsDice => render_dice(hub),
    }
}

fn render_gomoku(hub: &GameHub) {
    let game = hub.gomoku();
    print!("{}", game.grid());

    let status = game.status();
    if status.is_over {
        match status.winner {
            Some(color) => println!("{color} wins"),
            None => println!("draw: the board is full"),
        }
        return;
    }
    println!("{} to move", game.to_move());
    if !game.threats().is_empty() {
        let cells: Vec<String> = game
            .threats()
            .iter()
            .map(|m| format!("({}, {})", m.x, m.y))
            .collect();
        println!("threat: {}", cells.join(" "));
    }
}

fn render_dice(hub: &GameHub) {
    let table = hub.dice();
    let active = table.active_player().map(|p| &p.id);

    for player in table.players() {
        let marker = if active == Some(&player.id) { ">" } else { " " };
        let hand = match player.hand().dice() {
            Some(dice) if &player.id == hub.local_seat() => format!("{dice:?}"),
            _ => "?".repeat(player.dice_count()),
        };
        println!(
            "{marker} {:<12} {} dice  {hand}",
            player.name,
            player.dice_count()
        );
    }
    match table.current_bid() {
        Some(current) => println!("table bid: {}", current.bid),
        None => println!("table bid: none"),
    }
    println!("({})", table.phase());

    let history = table.history();
    for line in &history[history.len().saturating_sub(4)..] {
        println!("  | {line}");
    }
}

fn print_chat(entry: &ChatEntry) {
    let who = match &entry.sender {
        ChatSender::Local => "you",
        ChatSender::Remote => "peer",
        ChatSender::Bot(name) => name.as_str(),
    };
    if entry.is_sticker {
        println!("[{who}] <{}>", entry.content);
    } else {
        println!("[{who}] {}", entry.content);
    }
}

/// What a redraw depends on.
fn fingerprint(hub: &GameHub) -> (u64, GameKind, usize, usize) {
    (
        hub.epoch(),
        hub.game(),
        hub.gomoku().grid().stone_count(),
        hub.dice().history().len(),
    )
}

// ---------------------------------------------------------------------------
// Play loop
// ---------------------------------------------------------------------------

type Saved = Option<(ProfileStore, StoredProfile)>;

async fn apply<C: Connection>(
    parlor: &ParlorHandle<C>,
    input: Input,
    saved: &mut Saved,
) -> Result<(), Box<dyn Error>> {
    match input {
        Input::Stone(x, y) => parlor.place_stone(x, y).await?,
        Input::Bid(quantity, face) => parlor.dice_bid(quantity, face).await?,
        Input::Call => parlor.dice_call().await?,
        Input::Deal => parlor.dice_next_round().await?,
        Input::Setup(count) => parlor.dice_setup(count).await?,
        Input::Restart => parlor.restart().await?,
        Input::Say(text) => parlor.send_chat(text, false).await?,
        Input::Sticker(name) => parlor.send_chat(name, true).await?,
        Input::Game(game) => parlor.switch_game(game).await?,
        Input::Mode(mode) => parlor.switch_mode(mode).await?,
        Input::Name(name) => {
            let mut profile = parlor.snapshot().await?.profile().clone();
            profile.name = name;
            parlor.set_profile(profile.clone()).await?;
            if let Some((store, stored)) = saved {
                stored.set_profile(&profile);
                store.save(stored).await?;
            }
        }
        Input::Show => render(&parlor.snapshot().await?),
        Input::Help => println!("{HELP}"),
        Input::Quit => {}
    }
    Ok(())
}

async fn play<C: Connection>(
    parlor: ParlorHandle<C>,
    mut updates: UnboundedReceiver<Update>,
    mut saved: Saved,
) -> Result<(), Box<dyn Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let hub = parlor.snapshot().await?;
    let mut drawn = fingerprint(&hub);
    render(&hub);
    println!("type `help` for commands");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_input(&line) {
                    Ok(Input::Quit) => break,
                    Ok(input) => {
                        if let Err(e) = apply(&parlor, input, &mut saved).await {
                            eprintln!("! {e}");
                        }
                    }
                    Err(usage) => eprintln!("! {usage}"),
                }
            }
            update = updates.recv() => match update {
                Some(Update::Notice(notice)) => println!("* {notice}"),
                Some(Update::Chat(entry)) => print_chat(&entry),
                Some(Update::Changed { .. }) => {
                    let hub = parlor.snapshot().await?;
                    if fingerprint(&hub) != drawn {
                        drawn = fingerprint(&hub);
                        render(&hub);
                    }
                }
                None => break,
            },
        }
    }

    parlor.shutdown().await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let saved: Saved = match &cli.profile_file {
        Some(path) => {
            let store = ProfileStore::new(path);
            let stored = store.load().await?;
            Some((store, stored))
        }
        None => None,
    };
    let mut profile = saved
        .as_ref()
        .map_or_else(|| Profile::named("Player"), |(_, stored)| stored.profile("Player"));
    if let Some(name) = cli.name {
        profile.name = name;
    }

    let config = ParlorConfig::default()
        .with_game(cli.game)
        .with_profile(profile.clone());

    match cli.command {
        Command::Host { addr } => {
            let mut transport = WebSocketTransport::bind(&addr).await?;
            let local = transport.local_addr()?;
            let (parlor, updates) =
                spawn_driver::<ServerConnection, _, _>(config.clone(), NoAdvisor, NoAdvisor)?;

            tracing::info!(%local, "hosting");
            println!("waiting for a peer on {local} ...");
            let mut session =
                PeerSession::with_id(PeerId(local.to_string()), profile, config.session);
            let events = session.initiate_as_host(&mut transport).await?;
            parlor.attach(session, events).await?;
            play(parlor, updates, saved).await
        }
        Command::Join { addr } => {
            let (parlor, updates) = spawn_driver(config.clone(), NoAdvisor, NoAdvisor)?;

            tracing::info!(%addr, "joining");
            println!("joining {addr} ...");
            let mut session = PeerSession::new(profile, config.session);
            let events = session
                .connect_to(&WebSocketDialer, &PeerId(addr))
                .await?;
            parlor.attach(session, events).await?;
            play(parlor, updates, saved).await
        }
        Command::Solo {
            mode,
            opponents,
            seed,
        } => {
            let mut config = config.with_mode(mode).with_ai_opponents(opponents);
            if let Some(seed) = seed {
                config = config.with_seed(seed);
            }
            let (parlor, updates) =
                spawn_driver::<MemoryConnection, _, _>(config, NoAdvisor, NoAdvisor)?;
            play(parlor, updates, saved).await
        }
    }
}
