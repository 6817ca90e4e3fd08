use crate::core::lifecycle::Shutdown;
use crate::core::session::{Session, SessionState};
use crate::core::{Card, DeckStore};
use crate::ui::animation::ShuffleAnimation;
use crate::ui::assets::AssetResolver;
use crate::ui::layout;
use crate::utils::error::{DeckError, Result};
use rand::Rng;
use std::io::{BufRead, Write};
use std::path::Path;

/// [`Session`] 的逐行文字介面。每個使用者動作對應一個 session 操作，
/// 錯誤顯示後繼續執行，除非是致命錯誤。
pub struct TerminalUi<I: BufRead, O: Write> {
    input: I,
    output: O,
    animation: ShuffleAnimation,
    assets: AssetResolver,
    input_closed: bool,
}

enum Step {
    Continue,
    Quit,
    Finished(Shutdown),
}

impl<I: BufRead, O: Write> TerminalUi<I, O> {
    pub fn new(input: I, output: O, animation: ShuffleAnimation, assets: AssetResolver) -> Self {
        Self {
            input,
            output,
            animation,
            assets,
            input_closed: false,
        }
    }

    /// 執行到使用者結束 (寫出報告) 或在無需報告的狀態下離開
    pub fn run<S: DeckStore, R: Rng>(
        &mut self,
        session: &mut Session<S, R>,
    ) -> Result<Option<Shutdown>> {
        writeln!(self.output, "Welcome to the Deck of Many Things")?;

        loop {
            let step = match session.state() {
                SessionState::NoDeck => self.menu(session),
                SessionState::Loaded => self.ready_to_shuffle(session),
                SessionState::Shuffling => self.finish_shuffle(session),
                SessionState::Shuffled => self.pick(session),
                SessionState::Depleted => self.depleted(session),
                SessionState::Finalized => return Ok(None),
            };

            match step {
                Ok(Step::Continue) => {}
                Ok(Step::Quit) => {
                    writeln!(self.output, "Goodbye.")?;
                    return Ok(None);
                }
                Ok(Step::Finished(shutdown)) => return Ok(Some(shutdown)),
                // 沒有輸入可以重試
                Err(e) if self.input_closed => return Err(e),
                Err(e) => self.report_error(e)?,
            }
        }
    }

    fn menu<S: DeckStore, R: Rng>(&mut self, session: &mut Session<S, R>) -> Result<Step> {
        let can_resume = session.can_resume();
        writeln!(self.output)?;
        if can_resume {
            writeln!(self.output, "  1) Resume saved session")?;
        }
        writeln!(self.output, "  2) New deck")?;
        writeln!(self.output, "  3) Load deck from file")?;
        writeln!(self.output, "  q) Quit")?;

        let Some(choice) = self.prompt("> ")? else {
            return Ok(Step::Quit);
        };
        match choice.as_str() {
            "1" if can_resume => {
                session.resume()?;
                self.status(&format!("Resumed with {} cards.", session.deck().len()))?;
            }
            "2" => {
                session.start_fresh()?;
                self.status(&format!("Loaded {} cards.", session.deck().len()))?;
            }
            "3" => {
                let Some(path) = self.prompt("Deck file: ")? else {
                    return Ok(Step::Quit);
                };
                session.load_from(Path::new(&path))?;
                self.status(&format!("Loaded {} cards.", session.deck().len()))?;
            }
            "q" | "Q" => return Ok(Step::Quit),
            other => self.status(&format!("Unknown choice '{}'", other))?,
        }
        Ok(Step::Continue)
    }

    fn ready_to_shuffle<S: DeckStore, R: Rng>(
        &mut self,
        session: &mut Session<S, R>,
    ) -> Result<Step> {
        let Some(choice) = self.prompt("Press Enter to shuffle the deck (q to quit): ")? else {
            return Ok(Step::Quit);
        };
        if choice.eq_ignore_ascii_case("q") {
            return Ok(Step::Quit);
        }
        self.shuffle(session)
    }

    fn shuffle<S: DeckStore, R: Rng>(&mut self, session: &mut Session<S, R>) -> Result<Step> {
        session.begin_shuffle()?;
        if self.assets.shuffle_sound().is_some() {
            // 以終端機鈴聲代替洗牌音效
            write!(self.output, "\x07")?;
        }
        self.animation.play(&mut self.output)?;
        self.finish_shuffle(session)
    }

    fn finish_shuffle<S: DeckStore, R: Rng>(
        &mut self,
        session: &mut Session<S, R>,
    ) -> Result<Step> {
        session.animation_complete()?;
        self.status("Deck shuffled!")?;
        Ok(Step::Continue)
    }

    fn pick<S: DeckStore, R: Rng>(&mut self, session: &mut Session<S, R>) -> Result<Step> {
        let count = session.deck().len();
        writeln!(self.output)?;
        for line in layout::render_spread(count, layout::spread_width(count)) {
            writeln!(self.output, "{}", line)?;
        }

        let prompt = format!(
            "Pick a card (1-{}), n = top card, s = reshuffle, q = finish: ",
            count
        );
        let Some(choice) = self.prompt(&prompt)? else {
            return self.finish(session);
        };

        match choice.as_str() {
            "q" | "Q" => self.finish(session),
            "s" | "S" => self.shuffle(session),
            "n" | "N" => {
                let card = session.draw_next()?;
                self.reveal(&card)?;
                Ok(Step::Continue)
            }
            other => match other.parse::<usize>() {
                Ok(n) if n >= 1 => {
                    let card = session.draw_at(n - 1)?;
                    self.reveal(&card)?;
                    Ok(Step::Continue)
                }
                _ => {
                    self.status(&format!("'{}' is not a card number", other))?;
                    Ok(Step::Continue)
                }
            },
        }
    }

    fn depleted<S: DeckStore, R: Rng>(&mut self, session: &mut Session<S, R>) -> Result<Step> {
        self.status("No cards left in the deck!")?;
        let Some(choice) = self.prompt("n = new deck, f = finish: ")? else {
            return self.finish(session);
        };
        match choice.as_str() {
            "n" | "N" => {
                session.restart()?;
                Ok(Step::Continue)
            }
            "f" | "F" | "q" | "Q" => self.finish(session),
            other => {
                self.status(&format!("Unknown choice '{}'", other))?;
                Ok(Step::Continue)
            }
        }
    }

    fn finish<S: DeckStore, R: Rng>(&mut self, session: &mut Session<S, R>) -> Result<Step> {
        let shutdown = session.finalize()?;
        writeln!(
            self.output,
            "Session saved. {} cards remain; report written to {}",
            shutdown.remaining,
            shutdown.report_path.display()
        )?;
        Ok(Step::Finished(shutdown))
    }

    fn reveal(&mut self, card: &Card) -> Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "{}", card)?;
        if let Some(image) = self.assets.image_for(card) {
            writeln!(self.output, "Image: {}", image.display())?;
        }
        Ok(())
    }

    fn report_error(&mut self, error: DeckError) -> Result<()> {
        tracing::warn!("⚠️ {}", error);
        if error.is_fatal() {
            return Err(error);
        }
        writeln!(self.output, "Error: {}", error.user_friendly_message())?;
        writeln!(self.output, "Hint: {}", error.recovery_suggestion())?;
        Ok(())
    }

    fn status(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{}", message)?;
        Ok(())
    }

    /// 輸入結束時回傳 `None`
    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            self.input_closed = true;
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::LocalStorage;
    use crate::core::DeckManager;
    use crate::domain::model::fixtures::deck;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn run_script(dir: &TempDir, script: &str) -> (Option<Shutdown>, String) {
        let manager = DeckManager::new(
            LocalStorage::new(dir.path()),
            "workingDeck.json",
            "major_arcana.json",
        );
        if !dir.path().join("major_arcana.json").exists() {
            manager
                .save_to(&deck(&["The Fool", "The Sun", "The Moon"]), Path::new("major_arcana.json"))
                .unwrap();
        }
        let mut session = Session::with_rng(manager, "report.txt", StdRng::seed_from_u64(11));
        let mut output = Vec::new();
        let assets = AssetResolver::new(dir.path().join("images"), dir.path().join("sounds"));
        let result = TerminalUi::new(
            Cursor::new(script.as_bytes().to_vec()),
            &mut output,
            ShuffleAnimation::disabled(),
            assets,
        )
        .run(&mut session)
        .unwrap();
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_new_deck_draw_and_finish() {
        let dir = TempDir::new().unwrap();
        let (shutdown, output) = run_script(&dir, "2\n\n1\nq\n");

        let shutdown = shutdown.expect("session should finish with a report");
        assert_eq!(shutdown.remaining, 2);
        assert!(output.contains("Loaded 3 cards."));
        assert!(output.contains("Deck shuffled!"));
        assert!(output.contains("Card: "));
        let report = std::fs::read_to_string(dir.path().join("report.txt")).unwrap();
        assert!(report.starts_with("Remaining Cards:\n"));
        assert_eq!(report.lines().count(), 3);
    }

    #[test]
    fn test_errors_are_shown_and_session_continues() {
        let dir = TempDir::new().unwrap();
        let (shutdown, output) = run_script(&dir, "3\nmissing.json\n2\n\n9\nx\nn\nq\n");

        assert!(output.contains("Error: Failed to load deck"));
        assert!(output.contains("Error: There is no card named '#9'"));
        assert!(output.contains("'x' is not a card number"));
        assert_eq!(shutdown.unwrap().remaining, 2);
    }

    #[test]
    fn test_resume_and_deplete() {
        let dir = TempDir::new().unwrap();
        // 第一次執行：洗牌、抽一張，輸入結束即完成 session
        run_script(&dir, "2\n\n1\n");

        let (shutdown, output) = run_script(&dir, "1\nn\nn\nf\n");
        assert!(output.contains("1) Resume saved session"));
        assert!(output.contains("Resumed with 2 cards."));
        assert!(output.contains("No cards left in the deck!"));
        assert_eq!(shutdown.unwrap().remaining, 0);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("report.txt")).unwrap(),
            "Remaining Cards:\n"
        );
    }

    #[test]
    fn test_quit_from_menu_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let (shutdown, output) = run_script(&dir, "q\n");
        assert!(shutdown.is_none());
        assert!(output.contains("Goodbye."));
        assert!(!dir.path().join("report.txt").exists());
        assert!(!dir.path().join("workingDeck.json").exists());
    }

    #[test]
    fn test_empty_saved_deck_is_not_offered_for_resume() {
        let dir = TempDir::new().unwrap();
        // 抽完三張後重新開始，再試著續玩空牌堆
        let (shutdown, output) = run_script(&dir, "2\n\nn\nn\nn\nn\n1\nq\n");

        assert!(shutdown.is_none());
        assert!(output.contains("No cards left in the deck!"));
        assert!(!output.contains("Resume saved session"));
        assert!(output.contains("Unknown choice '1'"));
    }
}
