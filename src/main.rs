//! Brick Balance command-line host
//!
//! `generate` prints a procedurally generated level. `replay` loads a save
//! file, reports its diagnostics and shows the next level as the adaptive
//! modifiers would shape it.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::{Path, PathBuf};
    use std::time::{SystemTime, UNIX_EPOCH};

    use anyhow::{Context, Result, bail};
    use clap::{Parser, Subcommand};

    use brick_balance::adaptive;
    use brick_balance::consts::STATIC_LEVEL_COUNT;
    use brick_balance::level::{LevelConfig, LevelGenerator};
    use brick_balance::persistence::{Integrity, LoadSource, PersistenceStore};
    use brick_balance::platform::FileStorage;

    /// Level generation and save inspection for the endless hard mode
    #[derive(Parser)]
    #[command(author, version, about, long_about = None)]
    struct Args {
        /// Enable verbose logging
        #[arg(short, long, global = true)]
        verbose: bool,

        #[command(subcommand)]
        command: Command,
    }

    #[derive(Subcommand)]
    enum Command {
        /// Generate a level (11 and up)
        Generate {
            level: u32,
            /// Seed for the layout RNG
            #[arg(long, default_value_t = 0)]
            seed: u64,
            /// Print the level as JSON
            #[arg(long)]
            json: bool,
        },
        /// Load a save file and show the adjusted next level
        Replay {
            #[arg(long)]
            save: PathBuf,
            #[arg(long, default_value_t = 0)]
            seed: u64,
        },
    }

    fn init_logging(verbose: bool) {
        let level = if verbose { "debug" } else { "info" };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    }

    fn now_ms() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    pub fn run() -> Result<()> {
        let args = Args::parse();
        init_logging(args.verbose);

        match args.command {
            Command::Generate { level, seed, json } => generate(level, seed, json),
            Command::Replay { save, seed } => replay(&save, seed),
        }
    }

    fn generate(level: u32, seed: u64, json: bool) -> Result<()> {
        let mut generator = LevelGenerator::seeded(seed);
        let config = generator
            .generate(level)
            .with_context(|| format!("cannot generate level {}", level))?;

        if json {
            println!("{}", serde_json::to_string_pretty(&config)?);
        } else {
            print_level(&config);
        }
        Ok(())
    }

    fn replay(save: &Path, seed: u64) -> Result<()> {
        let (dir, key) = split_save_path(save)?;
        let mut store = PersistenceStore::with_key(FileStorage::new(dir), key);
        let report = store.load(now_ms());

        match report.source {
            LoadSource::Stored => {}
            LoadSource::Empty => bail!("no save data at {}", save.display()),
            LoadSource::Unavailable => bail!("save directory for {} is not usable", save.display()),
            LoadSource::Malformed => bail!("{} is not a readable save", save.display()),
        }

        let state = &report.state;
        println!("Save: {}", save.display());
        println!("  timestamp:     {}", report.timestamp);
        println!(
            "  integrity:     {}",
            match &report.integrity {
                Integrity::Verified => "verified".to_string(),
                Integrity::Missing => "no checksum".to_string(),
                Integrity::Mismatch { stored, computed } =>
                    format!("MISMATCH (stored {}, computed {})", stored, computed),
            }
        );
        if let Some(from) = report.migrated_from {
            println!("  migrated from: v{}", from);
        }
        println!("  level:         {}", state.progress.current_level);
        println!("  high score:    {}", state.progress.high_score);
        println!("  precision:     {}%", state.stats.performance.precision_ratio);
        println!(
            "  streaks:       {} fail / {} success",
            state.stats.progression.fail_streak, state.stats.progression.success_streak
        );

        let labels = adaptive::adjustments(&state.adaptive);
        if labels.is_empty() {
            println!("  adjustments:   none");
        } else {
            println!("  adjustments:   {}", labels.join(", "));
        }

        let next = state.progress.current_level;
        if next <= STATIC_LEVEL_COUNT {
            println!("\nLevel {} comes from the static table", next);
            return Ok(());
        }

        let base = LevelGenerator::seeded(seed).generate(next)?;
        let adjusted = adaptive::apply_to_level(&state.adaptive, &base);
        println!(
            "\nBall speed {:.0} -> {:.0}, paddle {:.1} -> {:.1}, drop rate {:.3} -> {:.3}",
            base.ball_speed,
            adjusted.ball_speed,
            base.paddle_width,
            adjusted.paddle_width,
            base.power_up_drop_rate,
            adjusted.power_up_drop_rate
        );
        print_level(&adjusted);
        Ok(())
    }

    /// `<dir>/<key>.json` → (dir, key)
    fn split_save_path(path: &Path) -> Result<(PathBuf, String)> {
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            bail!("save path must end in .json: {}", path.display());
        }
        let key = path
            .file_stem()
            .and_then(|s| s.to_str())
            .context("save path has no file name")?
            .to_string();
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Ok((dir, key))
    }

    fn print_level(config: &LevelConfig) {
        println!(
            "{} (#{}) - {} bricks, durability mod {:+}",
            config.name,
            config.id,
            config.brick_count(),
            config.brick_durability_mod
        );
        for row in &config.layout {
            let line: String = row
                .iter()
                .map(|&cell| match cell {
                    0 => '.',
                    d => char::from_digit(u32::from(d), 10).unwrap_or('?'),
                })
                .collect();
            println!("  {}", line);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    cli::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // On the web the page drives the library directly
    brick_balance::platform::init_logging(log::Level::Info);
}
