use clap::Parser;
use deck_of_many_things::config::Command;
use deck_of_many_things::core::session::SessionState;
use deck_of_many_things::core::ConfigProvider;
use deck_of_many_things::ui::{AssetResolver, ShuffleAnimation, TerminalUi};
use deck_of_many_things::utils::error::ErrorSeverity;
use deck_of_many_things::utils::logger;
use deck_of_many_things::{
    CliConfig, DeckError, DeckManager, DeckSource, LocalStorage, Session, TomlConfig,
};
use std::io::{self, Write};

type CliSession = Session<LocalStorage>;

fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);
    tracing::debug!("CLI config: {:?}", cli);

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(exit_code(&e));
        }
    };

    let manager = DeckManager::from_config(LocalStorage::default(), &config);
    let mut session = Session::new(manager, config.report_path());

    if let Err(e) = run_command(cli.command(), &config, &mut session) {
        tracing::error!(
            "❌ {} failed: {} (Category: {:?}, Severity: {:?})",
            command_name(&cli.command()),
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(exit_code(&e));
    }

    Ok(())
}

fn run_command(
    command: Command,
    config: &TomlConfig,
    session: &mut CliSession,
) -> deck_of_many_things::Result<()> {
    match command {
        Command::Play => {
            let stdin = io::stdin();
            let animation =
                ShuffleAnimation::new(config.shuffle.animation_frames, config.shuffle.frame_delay());
            let mut ui = TerminalUi::new(
                stdin.lock(),
                io::stdout(),
                animation,
                AssetResolver::from_config(config),
            );
            if let Some(shutdown) = ui.run(session)? {
                tracing::info!("✅ Session finished, {} cards remain", shutdown.remaining);
            }
        }
        Command::Status => {
            let source = open_saved_or_start(session)?;
            print_deck(session, &source)?;
        }
        Command::Shuffle => {
            start_for_picking(session)?;
            println!("🔀 Deck shuffled! {} cards ready.", session.deck().len());
        }
        Command::Draw { name } => {
            start_for_drawing(session)?;
            let card = session.draw(&name)?;
            print_card(&card, session.deck().len());
        }
        Command::DrawNext => {
            start_for_drawing(session)?;
            let card = session.draw_next()?;
            print_card(&card, session.deck().len());
        }
        Command::Export { path } => {
            open_saved_or_start(session)?;
            session.manager().export(session.deck(), &path)?;
            println!("💾 Deck saved successfully to {}", path.display());
        }
        Command::Report => {
            open_saved_or_start(session)?;
            let shutdown = session.finalize()?;
            println!(
                "📝 {} cards remaining, report written to {}",
                shutdown.remaining,
                shutdown.report_path.display()
            );
        }
        Command::Reset => {
            session.manager().reset()?;
            println!("🧹 Saved session removed; the next start uses a fresh deck.");
        }
    }
    Ok(())
}

/// 查看或結束 session 的指令直接沿用已儲存的工作牌堆，
/// 即使已經沒有牌 (以耗盡狀態續玩)
fn open_saved_or_start(session: &mut CliSession) -> deck_of_many_things::Result<DeckSource> {
    if session.manager().has_working_deck() {
        match session.resume() {
            Ok(()) => return Ok(DeckSource::Working),
            Err(e) => tracing::warn!("⚠️ Ignoring unreadable working deck: {}", e),
        }
    }
    session.start()
}

/// 一律洗牌：新牌堆經過洗牌步驟，續玩的牌堆就地重洗
fn start_for_picking(session: &mut CliSession) -> deck_of_many_things::Result<()> {
    session.start()?;
    session.begin_shuffle()?;
    session.animation_complete()
}

/// 抽牌需要進行中的 session；新牌堆尚未洗牌，以 session 的狀態錯誤拒絕
fn start_for_drawing(session: &mut CliSession) -> deck_of_many_things::Result<()> {
    session.start()?;
    match session.state() {
        SessionState::Loaded => Err(DeckError::InvalidStateError {
            action: "draw from an unshuffled deck (run `shuffle` first)".to_string(),
            state: session.state().to_string(),
        }),
        _ => Ok(()),
    }
}

fn print_deck(session: &CliSession, source: &DeckSource) -> deck_of_many_things::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(
        out,
        "Using the {} ({} cards, {})",
        source,
        session.deck().len(),
        session.state()
    )?;
    for (i, card) in session.deck().cards().iter().enumerate() {
        writeln!(out, "{:>3}. {}", i + 1, card.name)?;
    }
    out.flush()?;
    Ok(())
}

fn print_card(card: &deck_of_many_things::Card, remaining: usize) {
    println!("🃏 {}", card);
    println!("({} cards left in the deck)", remaining);
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Play => "play",
        Command::Status => "status",
        Command::Shuffle => "shuffle",
        Command::Draw { .. } => "draw",
        Command::DrawNext => "draw-next",
        Command::Export { .. } => "export",
        Command::Report => "report",
        Command::Reset => "reset",
    }
}

// 根據錯誤嚴重程度決定退出碼
fn exit_code(e: &DeckError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low | ErrorSeverity::High => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::Critical => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck_of_many_things::{Card, Deck};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::path::Path;
    use tempfile::TempDir;

    fn card(name: &str) -> Card {
        Card {
            name: name.to_string(),
            theme: "Theme".to_string(),
            effect: "Effect".to_string(),
            image: format!("{}.png", name.to_lowercase()),
        }
    }

    // 每次呼叫模擬一次新的程序啟動
    fn session_in(dir: &TempDir) -> CliSession {
        let manager = DeckManager::new(
            LocalStorage::new(dir.path()),
            "workingDeck.json",
            "major_arcana.json",
        );
        Session::with_rng(manager, "report.txt", StdRng::seed_from_u64(11))
    }

    fn run(dir: &TempDir, command: Command) -> deck_of_many_things::Result<CliSession> {
        let mut session = session_in(dir);
        run_command(command, &TomlConfig::default(), &mut session)?;
        Ok(session)
    }

    fn seed_default_deck(dir: &TempDir, names: &[&str]) {
        let deck = Deck::new(names.iter().map(|name| card(name)).collect());
        session_in(dir)
            .manager()
            .save_to(&deck, Path::new("major_arcana.json"))
            .unwrap();
    }

    #[test]
    fn test_report_after_last_card_drawn() {
        let dir = TempDir::new().unwrap();
        seed_default_deck(&dir, &["Throne"]);

        run(&dir, Command::Shuffle).unwrap();
        run(&dir, Command::DrawNext).unwrap();
        let session = run(&dir, Command::Report).unwrap();

        assert_eq!(session.state(), SessionState::Finalized);
        let report = std::fs::read_to_string(dir.path().join("report.txt")).unwrap();
        assert_eq!(report, "Remaining Cards:\n");
    }

    #[test]
    fn test_status_and_export_of_depleted_session() {
        let dir = TempDir::new().unwrap();
        seed_default_deck(&dir, &["Key"]);
        run(&dir, Command::Shuffle).unwrap();
        run(&dir, Command::DrawNext).unwrap();

        let session = run(&dir, Command::Status).unwrap();
        assert_eq!(session.state(), SessionState::Depleted);
        assert!(session.deck().is_empty());

        let session = run(
            &dir,
            Command::Export {
                path: "exports/left.json".into(),
            },
        )
        .unwrap();
        let exported = session.manager().load(Path::new("exports/left.json")).unwrap();
        assert!(exported.is_empty());
    }

    #[test]
    fn test_report_mid_session_lists_remaining_cards() {
        let dir = TempDir::new().unwrap();
        seed_default_deck(&dir, &["Gem", "Moon", "Sun"]);

        run(&dir, Command::Shuffle).unwrap();
        run(&dir, Command::Draw { name: "Moon".to_string() }).unwrap();
        let session = run(&dir, Command::Report).unwrap();

        let report = std::fs::read_to_string(dir.path().join("report.txt")).unwrap();
        assert!(report.starts_with("Remaining Cards:\n"));
        assert!(!report.contains("Moon"));
        assert_eq!(report.lines().count(), 3);
        assert_eq!(session.deck().len(), 2);
    }

    #[test]
    fn test_draw_requires_shuffle_first() {
        let dir = TempDir::new().unwrap();
        seed_default_deck(&dir, &["Rogue"]);

        assert!(matches!(
            run(&dir, Command::DrawNext),
            Err(DeckError::InvalidStateError { .. })
        ));
        assert!(matches!(
            run(&dir, Command::Report),
            Err(DeckError::InvalidStateError { .. })
        ));
    }

    #[test]
    fn test_reset_then_status_uses_default_deck() {
        let dir = TempDir::new().unwrap();
        seed_default_deck(&dir, &["Skull", "Star"]);
        run(&dir, Command::Shuffle).unwrap();
        run(&dir, Command::DrawNext).unwrap();

        run(&dir, Command::Reset).unwrap();
        let session = run(&dir, Command::Status).unwrap();

        assert_eq!(session.source(), Some(&DeckSource::Default));
        assert_eq!(session.deck().len(), 2);
    }
}
