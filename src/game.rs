//! The game module contains the core parts of the game, except for input handling, the screens and
//! the requests to the remote service.
//!
//! It contains the `init()` function to parse the configuration and run the game loop, as well as
//! the terminal setup and the handlers for every phase of a game.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use console::{Key, Term};
use env_logger::{Builder, Env};
use fastrand::Rng;
use indicatif::ProgressBar;
use log::{info, warn};
use serde::Deserialize;

use crate::engine::Engine;
use crate::fusion::FusedPitch;
use crate::input::{take_api_key, KeyPump};
use crate::menu::{self, EndMenu, ResultsMenu, ReviewMenu, WelcomeMenu};
use crate::openrouter::{OpenRouter, ServiceConfig, DEFAULT_API_BASE, DEFAULT_MODEL};
use crate::screen;
use crate::seen::{JsonFileStore, SeenStore};
use crate::service::Service;
use crate::session::{Mode, Phase};
use crate::timer::DEFAULT_ROUND_SECONDS;

/// This struct holds information about the application when it comes to the command-line argument
/// parser of choice, which is clap. Every option can also be set through the environment variable
/// named in its help.
#[derive(Parser, Debug)]
#[command(name = "ideagpt", version, about)]
#[command(next_line_help = true)]
struct Cli {
    /// The root of the OpenRouter API.
    #[arg(long, env = "OPENROUTER_API_BASE", value_name = "URL")]
    #[arg(default_value = DEFAULT_API_BASE)]
    api_base: String,
    /// The OpenRouter API key to provide for the AI opponent and judge.
    ///
    /// If neither this option nor the environment variable OPENROUTER_API_KEY is set, the key is
    /// asked for before the game starts.
    #[arg(long, env = "OPENROUTER_API_KEY", value_name = "YOUR_API_KEY")]
    #[arg(hide_env_values = true)]
    api_key: Option<String>,
    /// The model name to produce the responses; DeepSeek's V3 by default.
    ///
    /// Models are processed by the string right below their public brand name in their respective
    /// OpenRouter model page. If you want to set it to anything other than the default free model,
    /// you will have to use that name; it is checked against the list of available models.
    #[arg(short, long, value_parser = verify_model)]
    #[arg(env = "OPENROUTER_MODEL", value_name = "MODEL_NAME")]
    model: Option<String>,
    /// Ignore any proxy set in the environment when reaching the API.
    #[arg(long, env = "IDEAGPT_NO_PROXY")]
    no_proxy: bool,
    /// The number of seconds each round lasts.
    #[arg(short = 's', long, env = "IDEAGPT_ROUND_SECONDS", value_name = "SECONDS")]
    #[arg(default_value_t = DEFAULT_ROUND_SECONDS)]
    #[arg(value_parser = clap::value_parser!(u32).range(1..=3600))]
    round_seconds: u32,
    /// The file recording the battle challenges already played, so new games avoid them.
    ///
    /// Defaults to seen_challenges.json inside an ideagpt folder of the user's data directory.
    #[arg(long, env = "IDEAGPT_SEEN_FILE", value_name = "PATH")]
    seen_file: Option<PathBuf>,
    /// The number of seconds after which a request to the API is abandoned.
    #[arg(long, env = "IDEAGPT_TIMEOUT_SECS", value_name = "SECONDS")]
    #[arg(default_value_t = 90)]
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: u64,
}

/// It makes up one of the fields the request to fetch models from the OpenRouter API requires. This
/// structure doesn't support all of the mandatory and optional fields because the request is only
/// interested in the model id.
#[derive(Deserialize)]
struct Data {
    /// This field contains the name to be used on post requests in the model field for OpenRouter
    /// POST API requests.
    id: String,
}

/// This structure contains the main form of the response returned by an OpenRouter API request for
/// the list of all models available for use in the API.
#[derive(Deserialize)]
struct ModelResponse {
    /// This field contains the only part of the response that the OpenRouter API returns on their
    /// list all models GET request.
    data: Vec<Data>,
}

/// Initializes the game state and handles literally everything. This is a `main()` function of
/// sorts though it is still called from main.rs.
///
/// Logging goes to the standard error and is silent below warnings unless the IDEAGPT_LOG
/// environment variable asks otherwise.
///
/// # Errors
///
/// The function may return any one of the following errors:
///
/// - io::Error, when the terminal can't be written to or read from
/// - dialoguer::Error, when the API key prompt fails
/// - TransitionError, which would be a bug in the game loop
pub fn init() -> Result<()> {
    Builder::from_env(Env::default().filter_or("IDEAGPT_LOG", "warn")).init();

    let cli = Cli::parse();
    let term = Term::stdout();

    let api_key = match cli.api_key {
        Some(key) => key,
        None => take_api_key(&term)?,
    };
    let service = OpenRouter::new(ServiceConfig {
        api_base: cli.api_base,
        api_key,
        model: cli.model.unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
        timeout: Duration::from_secs(cli.timeout_secs),
        use_env_proxy: !cli.no_proxy,
    });
    let store = JsonFileStore::new(cli.seen_file.unwrap_or_else(|| {
        JsonFileStore::default_path().unwrap_or_else(|| {
            warn!("no data directory found; keeping the seen challenges in the working directory");
            PathBuf::from("seen_challenges.json")
        })
    }));
    info!("recording seen challenges in {}", store.path().display());

    let mut engine = Engine::new(service, store, Rng::new(), cli.round_seconds);

    // prepare the terminal
    init_terminal(&term)?;

    let keys = KeyPump::spawn(term.clone());
    let outcome = run(&term, &keys, &mut engine);

    term.clear_screen()?;
    term.show_cursor()?;
    outcome
}

/// This function initializes the terminal for the game. The screen is cleared, the cursor is hidden
/// and the title of the console window is set to the name of the game.
fn init_terminal(term: &Term) -> Result<()> {
    term.clear_screen()?;
    term.set_title("IdeaGPT");
    term.hide_cursor()?;

    Ok(())
}

/// This function reads keys and advances the countdown of the open round until it is submitted,
/// either with the return key or by running out of time. An empty answer can only be submitted by
/// the countdown.
fn play_round<S: Service, T: SeenStore>(
    term: &Term,
    keys: &KeyPump,
    engine: &mut Engine<S, T>,
) -> Result<()> {
    let second = Duration::from_secs(1);
    let mut deadline = Instant::now() + second;

    while engine.session().phase() == Phase::Playing {
        term.clear_screen()?;
        screen::playing(term, engine.session())?;

        match keys.recv_until(deadline)? {
            None => {
                let _ = engine.tick();
                deadline += second;
            }
            Some(Key::Enter) => {
                let _submitted = engine.submit_draft()?;
            }
            Some(Key::Backspace) => {
                let mut draft = engine.session().draft().to_owned();
                let _ = draft.pop();
                engine.set_draft(draft)?;
            }
            Some(Key::Char(ch)) if !ch.is_control() => {
                let mut draft = engine.session().draft().to_owned();
                draft.push(ch);
                engine.set_draft(draft)?;
            }
            Some(_) => {}
        }
    }

    Ok(())
}

/// This function runs the game loop, handing every phase to its screen until the player exits.
fn run<S: Service, T: SeenStore>(
    term: &Term,
    keys: &KeyPump,
    engine: &mut Engine<S, T>,
) -> Result<()> {
    loop {
        match engine.session().phase() {
            Phase::Welcome => {
                let mode = match menu::choose(term, keys, WelcomeMenu::Battle, screen::welcome)? {
                    WelcomeMenu::Battle => Mode::Battle,
                    WelcomeMenu::Fusion => Mode::Fusion,
                    WelcomeMenu::Exit => break Ok(()),
                };
                engine.start_game(mode)?;
            }
            Phase::Playing => play_round(term, keys, engine)?,
            Phase::Submitting | Phase::Evaluating | Phase::Fusing => wait(term, keys, engine)?,
            Phase::Results => {
                let picked = menu::choose(term, keys, ResultsMenu::PlayAgain, |term| {
                    engine
                        .session()
                        .evaluation()
                        .map_or(Ok(()), |evaluation| screen::results(term, evaluation))
                })?;
                match picked {
                    ResultsMenu::PlayAgain => engine.reset()?,
                    ResultsMenu::Review => engine.review()?,
                    ResultsMenu::Exit => break Ok(()),
                }
            }
            Phase::Review => {
                let ReviewMenu::Back = menu::choose(term, keys, ReviewMenu::Back, |term| {
                    screen::review(term, &engine.session().rounds())
                })?;
                engine.back_to_results()?;
            }
            Phase::FusionResult => {
                let pitch = FusedPitch::parse(engine.session().fused().unwrap_or_default());
                match menu::choose(term, keys, EndMenu::Again, |term| screen::fusion(term, &pitch))? {
                    EndMenu::Again => engine.reset()?,
                    EndMenu::Exit => break Ok(()),
                }
            }
            Phase::Error => {
                let picked = menu::choose(term, keys, EndMenu::Again, |term| {
                    screen::error(term, engine.session().error().unwrap_or_default())
                })?;
                match picked {
                    EndMenu::Again => engine.reset()?,
                    EndMenu::Exit => break Ok(()),
                }
            }
        }
    }
}

/// This function serves a loading phase behind a spinner. Keys pressed while waiting are
/// thrown away once the service answers.
fn wait<S: Service, T: SeenStore>(
    term: &Term,
    keys: &KeyPump,
    engine: &mut Engine<S, T>,
) -> Result<()> {
    term.clear_screen()?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_message(screen::loading_message(engine.session().phase()));
    spinner.enable_steady_tick(Duration::from_millis(50));

    let outcome = engine.resolve();
    spinner.finish_and_clear();
    keys.drain();

    Ok(outcome?)
}

/// This function serves as a value parser for the command line argument parser in the `model`
/// field. It basically makes a request to the OpenRouter API to retrieve the list of available
/// models to use through their API and checks if the string passed by clap matches any one of the
/// strings retrieved in the request.
fn verify_model(model: &str) -> Result<String, String> {
    const CHECK_FAILED: &str =
        "There's been an error checking the requested model with the OpenRouter API.";

    let response = ureq::get(format!("{DEFAULT_API_BASE}/models"))
        .call()
        .map_err(|err| format!("{CHECK_FAILED} ({err})"))?;
    let models: ModelResponse = response
        .into_body()
        .read_json()
        .map_err(|err| format!("{CHECK_FAILED} ({err})"))?;

    if models.data.iter().any(|data| data.id == model) {
        Ok(model.to_owned())
    } else {
        Err("The requested model could not be found with the OpenRouter API.".to_owned())
    }
}
