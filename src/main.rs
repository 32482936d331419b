use clap::Parser;
use dirshell::fs::SystemClock;
use dirshell::shell::{Dispatcher, ReaderLines, Session, ShellOptions};

#[derive(Parser)]
#[command(name = "dirshell")]
#[command(about = "An in-memory directory tree with a tiny command shell")]
#[command(version)]
struct Cli {
    /// Prompt printed before each command
    #[arg(long)]
    prompt: Option<String>,

    /// Name of the root directory
    #[arg(long = "root")]
    root_name: Option<String>,

    /// Allow siblings of the same kind to share a name
    #[arg(long)]
    allow_duplicate_names: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let defaults = ShellOptions::default();
    let options = ShellOptions {
        prompt: cli.prompt.unwrap_or(defaults.prompt),
        root_name: cli.root_name.unwrap_or(defaults.root_name),
        unique_names: !cli.allow_duplicate_names,
        ..ShellOptions::default()
    };

    let mut session = match Session::bootstrap(options, Box::new(SystemClock)) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("dirshell: cannot build filesystem: {}", e);
            return;
        }
    };

    let stdin = std::io::stdin();
    let mut input = ReaderLines::new(stdin.lock());
    let mut stdout = std::io::stdout();
    let mut dispatcher = Dispatcher::new();

    if let Err(e) = dispatcher.run(&mut session, &mut input, &mut stdout) {
        log::error!("output error: {}", e);
    }
}
