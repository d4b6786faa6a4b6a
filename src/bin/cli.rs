//! Terminal battle viewer.
//!
//! Logs in against the backend, lets the user pick (or create) a hero, then replays
//! the resolved battle turn by turn.
//!
//! Usage:
//!   API_URL=http://localhost:7070/api cargo run --bin battle-cli

use battle_replay::core::acquisition::{BattleAcquisitionFlow, BattleSession, BattleStatus};
use battle_replay::core::playback::{PlaybackController, PlaybackPhase};
use battle_replay::core::replay::{CombatantView, ReplaySnapshot};
use battle_replay::core::session::Session;
use battle_replay::core::turn_log::{TurnEvent, TurnLog};
use battle_replay::data::roster::{Hero, NewHero};
use battle_replay::data::settings::Settings;
use battle_replay::logging::init_tracing;
use battle_replay::tools::api::ApiClient;
use inquire::{CustomType, Password, Select, Text};
use std::error::Error;
use std::io;
use std::path::Path;
use std::sync::Arc;

const NEXT_TURN: &str = "Next Turn";
const AUTO_PLAY: &str = "Auto Play";
const NEW_BATTLE: &str = "New Battle";
const QUIT: &str = "Quit";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let settings = Settings::load(Some(Path::new("config/battle.yaml")))?;
    init_tracing(&settings.log_level);

    println!("╔═══════════════════════════════════════╗");
    println!("║         ⚔️  Battle Replay CLI ⚔️        ║");
    println!("╚═══════════════════════════════════════╝");
    println!();

    let session = Session::new();
    let api = Arc::new(ApiClient::new(&settings.api, session.clone())?);

    if !login(&api).await? {
        println!("Bye!");
        return Ok(());
    }

    let heroes = api.get_heroes().await?;
    let hero = if heroes.is_empty() {
        println!("You have no heroes yet. Let's create one.");
        create_hero(&api).await?
    } else {
        choose_hero(heroes).await?
    };
    let Some(hero) = hero else {
        return Ok(());
    };

    let flow = BattleAcquisitionFlow::new(api.clone(), api.clone(), Arc::new(session.clone()));
    let controller = PlaybackController::new(TurnLog::empty(), &settings.replay)?;
    let mut battle = BattleSession::new(flow, controller);

    start_battle(&mut battle, &hero).await;

    loop {
        if let BattleStatus::Failed(message) = battle.status() {
            println!("❌ Battle Error: {}", message);
            match choose("What now?", vec![NEW_BATTLE, QUIT]).await? {
                Some(NEW_BATTLE) => {
                    start_battle(&mut battle, &hero).await;
                    continue;
                }
                _ => break,
            }
        }

        let Some(snapshot) = battle.snapshot()? else {
            break;
        };
        print_status(&snapshot);

        let mut options = Vec::new();
        if !snapshot.finished && snapshot.frontier < snapshot.total {
            options.push(NEXT_TURN);
            options.push(AUTO_PLAY);
        }
        options.push(NEW_BATTLE);
        options.push(QUIT);

        match choose("Action:", options).await? {
            Some(NEXT_TURN) => {
                if let Some(event) = battle.controller().step() {
                    print_event(&event);
                }
            }
            Some(AUTO_PLAY) => auto_play(battle.controller()).await?,
            Some(NEW_BATTLE) => start_battle(&mut battle, &hero).await,
            _ => break,
        }
    }

    api.logout();
    println!("Bye!");
    Ok(())
}

async fn login(api: &ApiClient) -> Result<bool, Box<dyn Error>> {
    loop {
        let credentials = tokio::task::spawn_blocking(|| -> Option<(String, String)> {
            let username = Text::new("Username:").prompt().ok()?;
            let password = Password::new("Password:")
                .without_confirmation()
                .prompt()
                .ok()?;
            Some((username, password))
        })
        .await?;

        let Some((username, password)) = credentials else {
            return Ok(false);
        };
        match api.login(&username, &password).await {
            Ok(response) if response.token.is_some() => {
                println!("✅ Welcome, {}!", response.username.unwrap_or(username));
                return Ok(true);
            }
            Ok(_) => println!("❌ Login failed: no token returned"),
            Err(err) => println!("❌ Login failed: {}", err),
        }
    }
}

async fn choose_hero(heroes: Vec<Hero>) -> Result<Option<Hero>, Box<dyn Error>> {
    let labels: Vec<String> = heroes
        .iter()
        .map(|h| format!("{} (Lv {}, HP {}, ATK {}, DEF {})", h.name, h.level, h.hp, h.attack, h.defense))
        .collect();
    let choice = tokio::task::spawn_blocking(move || {
        Select::new("Choose your hero:", labels.clone())
            .prompt()
            .ok()
            .and_then(|label| labels.iter().position(|l| *l == label))
    })
    .await?;
    Ok(choice.map(|idx| heroes[idx].clone()))
}

async fn create_hero(api: &ApiClient) -> Result<Option<Hero>, Box<dyn Error>> {
    loop {
        let form = tokio::task::spawn_blocking(|| -> Option<NewHero> {
            let defaults = NewHero::default();
            let name = Text::new("Hero name:").with_placeholder("e.g. Markus the Brave").prompt().ok()?;
            let hp = CustomType::<i32>::new("HP:").with_default(defaults.hp).prompt().ok()?;
            let attack = CustomType::<i32>::new("Attack:").with_default(defaults.attack).prompt().ok()?;
            let defense = CustomType::<i32>::new("Defense:").with_default(defaults.defense).prompt().ok()?;
            Some(NewHero {
                hp,
                attack,
                defense,
                ..NewHero::named(&name)
            })
        })
        .await?;

        let Some(new_hero) = form else {
            return Ok(None);
        };
        if let Err(err) = new_hero.validate() {
            println!("❌ {}", err);
            continue;
        }
        match api.create_hero(&new_hero).await {
            Ok(hero) => {
                println!("✅ {} is ready for battle!", hero.name);
                return Ok(Some(hero));
            }
            Err(err) => println!("❌ Failed to create hero: {}", err),
        }
    }
}

async fn choose(prompt: &'static str, options: Vec<&'static str>) -> Result<Option<&'static str>, Box<dyn Error>> {
    let choice = tokio::task::spawn_blocking(move || Select::new(prompt, options).prompt().ok()).await?;
    Ok(choice)
}

async fn start_battle(battle: &mut BattleSession, hero: &Hero) {
    println!("Starting battle...");
    if battle.new_battle(Some(hero)).await.is_ok() {
        if let Some(active) = battle.battle() {
            let record = &active.monster_record;
            let area = record.area.as_deref().map(|a| format!(", {}", a)).unwrap_or_default();
            println!();
            println!("════════════════════════════════════════");
            println!("  {} VS {} (Lv {}{})", active.hero.name, active.monster.name, record.level, area);
            println!("════════════════════════════════════════");
        }
    }
}

/// Runs auto-play until the battle ends or the user presses Enter.
async fn auto_play(controller: &PlaybackController) -> Result<(), Box<dyn Error>> {
    let mut updates = controller.subscribe();
    let log = controller.log();
    let mut shown = controller.state().frontier;

    if !controller.toggle_auto_play() {
        return Ok(());
    }
    println!("▶️  Auto-playing (press Enter to stop)");

    let mut enter = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        io::stdin().read_line(&mut line).ok();
    });

    loop {
        let closed = tokio::select! {
            changed = updates.changed() => changed.is_err(),
            _ = &mut enter => {
                if controller.state().auto_playing {
                    controller.toggle_auto_play();
                }
                println!("⏸️  Auto-play stopped");
                return Ok(());
            }
        };
        if closed {
            break;
        }

        let state = *updates.borrow_and_update();
        for event in &log.events()[shown.min(state.frontier)..state.frontier] {
            print_event(event);
        }
        shown = state.frontier;
        if state.phase() == PlaybackPhase::Finished {
            println!("🏁 Battle finished (press Enter)");
            break;
        }
        if !state.auto_playing {
            break;
        }
    }
    enter.await?;
    Ok(())
}

fn print_event(event: &TurnEvent) {
    println!(
        "  Turn {}: {} hit {} for {} damage ({} HP: {})",
        event.turn_number, event.attacker, event.defender, event.damage, event.defender, event.defender_hp_after
    );
}

fn print_status(snapshot: &ReplaySnapshot) {
    println!("─────────────────────────────────────────");
    println!("  Turn: {} / {}", snapshot.frontier, snapshot.total);
    println!("─────────────────────────────────────────");
    println!("  [Hero]    {}", combatant_line(&snapshot.hero));
    println!("  [Monster] {}", combatant_line(&snapshot.opponent));
    match &snapshot.winner {
        Some(winner) => println!("  Battle finished! {} wins!", winner),
        None if snapshot.frontier == 0 => println!("  No turns shown yet."),
        None => println!("  Battle in progress..."),
    }
    println!();
}

fn combatant_line(view: &CombatantView) -> String {
    let bars = (view.hp_percent as usize / 10).min(10);
    format!(
        "{} [{}{}] {}/{} ({}%)",
        view.name,
        "█".repeat(bars),
        "░".repeat(10 - bars),
        view.hp,
        view.max_hp,
        view.hp_percent
    )
}
