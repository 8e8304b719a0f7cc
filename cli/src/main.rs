/*
    gptune-rs | Rust CLI tool to turn "Artist – Track" lists into Spotify playlists.
    Copyright (C) 2025  Israel Alberto Roldan Vega

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use gptune_core::{
    parse, AuthSession, MusicService, PlaylistOutcome, PlaylistPrompt, Playlister,
    PublishStatus, SpotifyService, SAMPLE_PLAYLIST,
};
use log::debug;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "gptune")]
#[command(about = "Turn 'Artist – Track' lists into Spotify playlists", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prints the request text to hand to a text generator
    Prompt {
        #[arg(long, default_value = "Gritty")]
        mood: String,
        #[arg(long, default_value = "Outlaw Country")]
        genre: String,
        /// Artist the playlist is built around
        #[arg(long, default_value = "Lucinda Williams")]
        artist: String,
        /// Number of songs (10-30)
        #[arg(long, default_value_t = 20)]
        songs: u32,
    },
    /// Shows how a list would be read, without touching Spotify
    Parse {
        /// Text file with one 'Artist – Track' per line (reads stdin when omitted)
        #[arg(long, short = 'i')]
        input: Option<PathBuf>,
        /// Use the built-in sample list
        #[arg(long, conflicts_with = "input")]
        sample: bool,
    },
    /// Logs in to Spotify and shows the authenticated user
    Auth,
    /// Creates a public playlist from a list of tracks
    Create {
        /// Name of the new playlist
        #[arg(long, short = 'n', default_value = "Outlaw Starter Pack")]
        name: String,
        /// Text file with one 'Artist – Track' per line (stdin is kept for the login redirect)
        #[arg(long, short = 'i', required_unless_present = "sample")]
        input: Option<PathBuf>,
        /// Use the built-in sample list
        #[arg(long, conflicts_with = "input")]
        sample: bool,
        /// Output the outcome to a JSON file (e.g., --json=outcome.json)
        #[arg(long)]
        json: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::init();

    if dotenv().is_err() {
        // Silently ignore
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::Prompt {
            mood,
            genre,
            artist,
            songs,
        } => {
            handle_prompt(PlaylistPrompt {
                mood,
                genre,
                anchor_artist: artist,
                num_songs: songs,
            });
        }
        Commands::Parse { input, sample } => {
            handle_parse(input.as_deref(), sample);
        }
        Commands::Auth => {
            handle_auth().await;
        }
        Commands::Create {
            name,
            input,
            sample,
            json,
        } => {
            handle_create(&name, input.as_deref(), sample, json.as_deref()).await;
        }
    }
}

fn read_input(input: Option<&Path>, sample: bool) -> Result<String> {
    if sample {
        return Ok(SAMPLE_PLAYLIST.to_string());
    }

    match input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read '{}'", path.display())),
        None => io::read_to_string(io::stdin()).context("Failed to read stdin"),
    }
}

fn get_service() -> SpotifyService {
    match SpotifyService::from_env() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error initializing Spotify client: {}", e);
            process::exit(1);
        }
    }
}

/// One full authorization round trip: browser, redirect URL, code exchange.
async fn authenticate(service: &SpotifyService) -> AuthSession {
    let mut session = AuthSession::new(service.authorize_params());

    let url = match session.begin_authorization(service) {
        Ok(url) => url,
        Err(e) => {
            eprintln!("[ERROR] {}", e);
            process::exit(1);
        }
    };

    let code = match service.prompt_for_code(&url) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("[ERROR] Could not read the authorization code: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = session.receive_code(service, &code).await {
        eprintln!("[ERROR] {}", e);
        eprintln!("Run the command again to start a new authorization.");
        process::exit(1);
    }

    session
}

fn handle_prompt(prompt: PlaylistPrompt) {
    match prompt.render() {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("[ERROR] {}", e);
            process::exit(1);
        }
    }
}

fn handle_parse(input: Option<&Path>, sample: bool) {
    let text = match read_input(input, sample) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("[ERROR] {:#}", e);
            process::exit(1);
        }
    };

    let tracks = parse(&text);
    println!("Parsed {} entries:", tracks.len());
    for (i, track) in tracks.iter().enumerate() {
        let note = if track.is_searchable() {
            ""
        } else {
            "   (incomplete, will not be searched)"
        };
        println!("{:>3}. {}{}", i + 1, track, note);
    }
}

async fn handle_auth() {
    let service = get_service();
    let session = authenticate(&service).await;

    let user = match session.token() {
        Ok(token) => service.current_user(token).await,
        Err(e) => {
            eprintln!("[ERROR] {}", e);
            process::exit(1);
        }
    };

    match user {
        Ok(user) => println!("[OK] Authenticated as {}", user),
        Err(e) => {
            eprintln!("[ERROR] Could not fetch your profile: {}", e);
            process::exit(1);
        }
    }
}

async fn handle_create(name: &str, input: Option<&Path>, sample: bool, json_path: Option<&str>) {
    let text = match read_input(input, sample) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("[ERROR] {:#}", e);
            process::exit(1);
        }
    };

    let service = Arc::new(get_service());
    let mut session = authenticate(&service).await;
    let playlister = Playlister::new(Arc::clone(&service));

    println!("Creating playlist '{}' on Spotify...", name);
    let result = playlister.create_playlist(&mut session, name, &text).await;
    let status = PublishStatus::from_result(&result);

    let outcome = match &result {
        Ok(outcome) => Some(outcome),
        Err(e) => e.partial_outcome(),
    };

    print_report(status, outcome);

    if let (Some(path), Some(outcome)) = (json_path, outcome) {
        write_json(path, outcome);
    }

    if let Err(e) = result {
        eprintln!();
        eprintln!("[ERROR] {}", e);
        if e.is_retry_safe() {
            eprintln!("Nothing was changed on Spotify, it is safe to try again.");
        } else {
            eprintln!("Spotify may already hold a playlist from this run. Check it before retrying.");
        }
        process::exit(1);
    }
}

fn print_report(status: PublishStatus, outcome: Option<&PlaylistOutcome>) {
    println!();
    println!("---------------------------------------------------");
    match status {
        PublishStatus::Complete => println!("PLAYLIST CREATED"),
        PublishStatus::CreatedWithPartialTracks => println!("PLAYLIST CREATED (PARTIAL)"),
        PublishStatus::CreatedButEmpty => println!("PLAYLIST CREATED (EMPTY)"),
        PublishStatus::NotCreated => println!("PLAYLIST NOT CREATED"),
    }
    println!("---------------------------------------------------");

    let Some(outcome) = outcome else {
        return;
    };

    println!("Name:            {}", outcome.name());
    println!("Playlist ID:     {}", outcome.playlist_id());
    println!("Tracks Found:    {}", outcome.requested_count());
    println!("Tracks Added:    {}", outcome.added_count());
    if outcome.pending_count() > 0 {
        println!("Not Added:       {}", outcome.pending_count());
    }
    println!("Not Found:       {}", outcome.unmatched().len());
    println!("---------------------------------------------------");

    if !outcome.unmatched().is_empty() {
        println!();
        println!("Could not find:");
        for (i, track) in outcome.unmatched().iter().enumerate() {
            println!("{}. {}", i + 1, track);
        }
    }
}

fn write_json(path: &str, outcome: &PlaylistOutcome) {
    match File::create(path) {
        Ok(mut file) => {
            let json_content = serde_json::to_string_pretty(outcome).unwrap_or_default();
            if let Err(e) = file.write_all(json_content.as_bytes()) {
                eprintln!();
                eprintln!("[ERROR] Failed to write outcome to file: {}", e);
            } else {
                debug!("Wrote {} bytes to {}", json_content.len(), path);
                println!();
                println!("[SAVED] Outcome saved to: {}", path);
            }
        }
        Err(e) => eprintln!("[ERROR] Failed to create file '{}': {}", path, e),
    }
}
