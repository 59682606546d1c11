// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{crate_version, Parser, Subcommand};
use keyloop::clock::TokioClock;
use keyloop::config::{load_tuning, Tuning};
use keyloop::controller::{keyboard, Controller};
use keyloop::session::Session;
use keyloop::sound::TracingPlayer;
use keyloop::status::TracingStatus;
use keyloop::visual::TerminalFeedback;
use keyloop::voices;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "Play piano and drums from the keyboard, record a take and loop it."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Starts an interactive session reading commands from stdin.
    Start {
        /// The path to the settings file.
        #[arg[short, long]]
        config: Option<String>,
    },
    /// Lists the keys bound to each voice.
    Keys {},
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Start { config } => {
            let tuning = match config {
                Some(path) => load_tuning(&PathBuf::from(path))?,
                None => Tuning::default(),
            };

            let session = Session::new(
                tuning,
                Arc::new(TokioClock::new()),
                Arc::new(TracingPlayer::new()),
                Arc::new(TerminalFeedback::new(io::stdout())),
                Arc::new(TracingStatus::new()),
            );
            let mut controller = Controller::new(session, Arc::new(keyboard::Driver::new()));
            controller.join().await?;
        }
        Commands::Keys {} => {
            println!("Piano:");
            for voice in voices::PIANO.iter() {
                println!("- {} = {} ({})", voice.key, voice.label, voice.color);
            }
            println!("Drums:");
            for voice in voices::DRUMS.iter() {
                println!("- {} = {} ({})", voice.key, voice.label, voice.color);
            }
            println!("Toggle recording/looping with t, quit with q.");
        }
    }

    Ok(())
}
