//! Background re-indentation engine
//!
//! [`ReindentEngine`] owns a session, the language mode and the debounce
//! scheduler for one editor. It exposes two entry points:
//!
//! - [`ReindentEngine::poll`]: debounced; runs a pass once the quiet period
//!   after the last edit has elapsed. Call it every frame.
//! - [`ReindentEngine::reindent_now`]: manual; runs a pass immediately.
//!
//! A pass walks rows `1..len` top to bottom. Row 0 is never touched since
//! there is no line above it to derive an indent from. Each row gets the
//! indent the mode expects after the row above, is rewritten in place, and
//! then gets the mode's outdent correction. The cursor is captured before
//! the first mutation and put back afterwards, even when the pass fails.

use super::mode::{leading_whitespace, Mode};
use super::scheduler::{Clock, DebounceScheduler, IndentConfig};
use super::session::{ChangeSource, Session, TextSession};
use crate::error::Result;
use log::{debug, warn};
use std::rc::Rc;

/// Summary of one completed pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PassReport {
    /// Rows processed (every row but the first)
    pub rows_visited: usize,
    /// Rows whose content differs after the pass
    pub rows_changed: usize,
}

/// Keeps one session's indentation in line with its mode.
pub struct ReindentEngine<S> {
    session: S,
    mode: Rc<dyn Mode>,
    scheduler: Rc<DebounceScheduler>,
}

impl<S: Session + ChangeSource> ReindentEngine<S> {
    /// Create the engine and hook its scheduler into the session's change
    /// notifications.
    pub fn new(mut session: S, mode: Rc<dyn Mode>, config: IndentConfig, clock: Rc<dyn Clock>) -> Self {
        let scheduler = Rc::new(DebounceScheduler::new(config, clock));
        let hook = Rc::clone(&scheduler);
        session.subscribe(Box::new(move |event| hook.notify_change(event)));

        Self {
            session,
            mode,
            scheduler,
        }
    }
}

impl<S: Session> ReindentEngine<S> {
    pub fn session(&self) -> &S {
        &self.session
    }

    /// Mutable access to the session. Edits made through it are reported to
    /// the scheduler like any other edit.
    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    pub fn mode(&self) -> &Rc<dyn Mode> {
        &self.mode
    }

    pub fn scheduler(&self) -> &DebounceScheduler {
        &self.scheduler
    }

    /// Apply new background options.
    pub fn configure(&self, config: IndentConfig) {
        self.scheduler.set_enabled(config.background_auto_indent);
        self.scheduler.set_quiet_period(config.quiet_period);
    }

    /// Run the scheduled pass if its deadline has passed.
    ///
    /// Returns `None` when nothing was due.
    pub fn poll(&mut self) -> Option<Result<PassReport>> {
        if self.scheduler.is_due() {
            Some(self.reindent_all())
        } else {
            None
        }
    }

    /// Re-indent immediately, bypassing (and cancelling) the debounce.
    pub fn reindent_now(&mut self) -> Result<PassReport> {
        self.scheduler.cancel();
        self.reindent_all()
    }

    /// Recompute the indentation of the whole buffer.
    pub fn reindent_all(&mut self) -> Result<PassReport> {
        let scheduler = Rc::clone(&self.scheduler);
        let Some(_guard) = scheduler.begin_pass() else {
            debug!("Reindent pass already running, request ignored");
            return Ok(PassReport::default());
        };

        let cursor = self.session.cursor_position();
        let result = reindent_rows(&mut self.session, self.mode.as_ref());
        self.session.set_cursor_position(cursor);
        self.session.clear_selection();

        match &result {
            Ok(report) => debug!(
                "Reindent pass ({}): {} row(s) visited, {} changed",
                self.mode.name(),
                report.rows_visited,
                report.rows_changed
            ),
            Err(e) => warn!("Reindent pass aborted: {}", e),
        }
        result
    }
}

impl ReindentEngine<TextSession> {
    /// Switch the language mode of both the engine and its session.
    pub fn set_mode(&mut self, mode: Rc<dyn Mode>) {
        self.session.set_mode(Rc::clone(&mode));
        self.mode = mode;
    }
}

/// The pass body. Stops at the first failing row.
fn reindent_rows<S: Session>(session: &mut S, mode: &dyn Mode) -> Result<PassReport> {
    let line_count = session.line_count();
    let tab = session.tab_string().to_string();
    let mut report = PassReport::default();

    for row in 1..line_count {
        let prior_state = session.lexical_state(row - 1)?;
        let expected = mode.next_line_indent(prior_state, session.line(row - 1)?, &tab)?;

        let original = session.line(row)?.to_string();
        let content = if leading_whitespace(&original) != expected {
            format!("{}{}", expected, original.trim())
        } else {
            original.clone()
        };

        // Always rewritten: the remove/insert refreshes the cached lexical
        // states from this row down.
        session.replace_line(row, content)?;

        let state = session.lexical_state(row)?;
        mode.apply_outdent(state, session, row)?;

        report.rows_visited += 1;
        if session.line(row)? != original {
            report.rows_changed += 1;
        }
    }

    Ok(report)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::indent::mode::{CStyleMode, LineState};
    use crate::indent::scheduler::{ManualClock, SchedulerPhase};
    use crate::indent::session::{CursorPosition, Selection};
    use std::cell::Cell;
    use std::time::Duration;

    /// Indents one level after a line ending in `{` and removes one level
    /// from a line holding only `}`.
    struct TabLevelMode;

    impl Mode for TabLevelMode {
        fn name(&self) -> &str {
            "tab_level"
        }

        fn next_state(&self, state: LineState, _line: &str) -> LineState {
            state
        }

        fn next_line_indent(&self, _state: LineState, prior_line: &str, tab: &str) -> Result<String> {
            let indent = leading_whitespace(prior_line);
            if prior_line.trim_end().ends_with('{') {
                Ok(format!("{}{}", indent, tab))
            } else {
                Ok(indent.to_string())
            }
        }

        fn apply_outdent(&self, _state: LineState, session: &mut dyn Session, row: usize) -> Result<()> {
            let line = session.line(row)?.to_string();
            if line.trim() != "}" {
                return Ok(());
            }
            let indent = leading_whitespace(&line);
            let tab = session.tab_string().to_string();
            let reduced = indent.strip_prefix(tab.as_str()).unwrap_or("");
            session.replace_line(row, format!("{}}}", reduced))
        }
    }

    /// Fails when asked for the indent after a line containing `BOOM`.
    struct FailingMode;

    impl Mode for FailingMode {
        fn name(&self) -> &str {
            "failing"
        }

        fn next_state(&self, state: LineState, _line: &str) -> LineState {
            state
        }

        fn next_line_indent(&self, _state: LineState, prior_line: &str, tab: &str) -> Result<String> {
            if prior_line.contains("BOOM") {
                return Err(Error::IndentComputation {
                    row: 0,
                    message: "scripted failure".to_string(),
                });
            }
            Ok(tab.to_string())
        }

        fn apply_outdent(&self, _state: LineState, _session: &mut dyn Session, _row: usize) -> Result<()> {
            Ok(())
        }
    }

    struct Fixture {
        engine: ReindentEngine<TextSession>,
        clock: Rc<ManualClock>,
        events: Rc<Cell<usize>>,
    }

    fn fixture_with(lines: &[&str], mode: Rc<dyn Mode>, config: IndentConfig, tab_size: usize) -> Fixture {
        let mut session = TextSession::from_lines(
            lines.iter().map(|l| l.to_string()).collect(),
            Rc::clone(&mode),
        );
        session.set_tab_size(tab_size);

        let events = Rc::new(Cell::new(0));
        let seen = Rc::clone(&events);
        session.subscribe(Box::new(move |_| seen.set(seen.get() + 1)));

        let clock = Rc::new(ManualClock::new());
        let shared: Rc<dyn Clock> = clock.clone();
        Fixture {
            engine: ReindentEngine::new(session, mode, config, shared),
            clock,
            events,
        }
    }

    fn fixture(lines: &[&str], mode: Rc<dyn Mode>) -> Fixture {
        fixture_with(lines, mode, IndentConfig::default(), 2)
    }

    fn lines(engine: &ReindentEngine<TextSession>) -> Vec<String> {
        engine.session().text().split('\n').map(String::from).collect()
    }

    fn type_text(engine: &mut ReindentEngine<TextSession>, row: usize, text: &str) {
        engine
            .session_mut()
            .replace_line(row, text.to_string())
            .unwrap();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Pass algorithm
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_brace_scenario_with_tab_level_mode() {
        let mut f = fixture(&["if (x) {", "  foo();", "}"], Rc::new(TabLevelMode));
        f.engine.reindent_all().unwrap();
        assert_eq!(lines(&f.engine), vec!["if (x) {", "  foo();", "}"]);
    }

    #[test]
    fn test_brace_scenario_strips_extra_spaces_before_closing_brace() {
        let mut f = fixture(&["if (x) {", "  foo();", "  }"], Rc::new(TabLevelMode));
        f.engine.reindent_all().unwrap();
        assert_eq!(lines(&f.engine), vec!["if (x) {", "  foo();", "}"]);

        let mut f = fixture(&["if (x) {", "  foo();", "      }"], Rc::new(TabLevelMode));
        let report = f.engine.reindent_all().unwrap();
        assert_eq!(lines(&f.engine), vec!["if (x) {", "  foo();", "}"]);
        assert_eq!(report.rows_visited, 2);
        assert_eq!(report.rows_changed, 1);
    }

    #[test]
    fn test_brace_scenario_with_c_style_mode() {
        let mut f = fixture(&["if (x) {", "  foo();", "  }"], Rc::new(CStyleMode::new()));
        f.engine.reindent_all().unwrap();
        assert_eq!(lines(&f.engine), vec!["if (x) {", "  foo();", "}"]);
    }

    #[test]
    fn test_c_style_nested_blocks() {
        let mut f = fixture(
            &[
                "int main() {",
                "if (x) {",
                "        y();",
                "}",
                "return 0;",
                "    }",
            ],
            Rc::new(CStyleMode::new()),
        );
        f.engine.reindent_all().unwrap();
        assert_eq!(
            lines(&f.engine),
            vec![
                "int main() {",
                "  if (x) {",
                "    y();",
                "  }",
                "  return 0;",
                "}",
            ]
        );
    }

    #[test]
    fn test_row_zero_never_modified() {
        let mut f = fixture(&["      int x;", "int y;"], Rc::new(CStyleMode::new()));
        f.engine.reindent_all().unwrap();
        assert_eq!(f.engine.session().line(0).unwrap(), "      int x;");
        assert_eq!(f.engine.session().line(1).unwrap(), "      int y;");
    }

    #[test]
    fn test_idempotent() {
        let mut f = fixture(
            &[
                "void f() {",
                "      a();",
                "  /* note",
                "        more */",
                "b(); ",
                "        }",
            ],
            Rc::new(CStyleMode::new()),
        );
        f.engine.reindent_all().unwrap();
        let first = lines(&f.engine);
        let report = f.engine.reindent_all().unwrap();
        assert_eq!(lines(&f.engine), first);
        assert_eq!(report.rows_changed, 0);
    }

    #[test]
    fn test_line_count_invariant() {
        let mut f = fixture(
            &["{", "a", "{", "b", "}", "}", "", "c"],
            Rc::new(CStyleMode::new()),
        );
        let before = f.engine.session().line_count();
        f.engine.reindent_all().unwrap();
        assert_eq!(f.engine.session().line_count(), before);
    }

    #[test]
    fn test_empty_buffer_is_noop() {
        let mut f = fixture(&[], Rc::new(CStyleMode::new()));
        let report = f.engine.reindent_all().unwrap();
        assert_eq!(report, PassReport::default());
        assert_eq!(f.engine.session().line_count(), 0);

        let mut f = fixture(&[""], Rc::new(CStyleMode::new()));
        let report = f.engine.reindent_all().unwrap();
        assert_eq!(report.rows_visited, 0);
        assert_eq!(f.engine.session().text(), "");
        assert_eq!(f.engine.scheduler().phase(), SchedulerPhase::Idle);
    }

    #[test]
    fn test_whitespace_only_line_takes_expected_indent() {
        let mut f = fixture(&["{", "", "}"], Rc::new(CStyleMode::new()));
        f.engine.reindent_all().unwrap();
        assert_eq!(lines(&f.engine), vec!["{", "  ", "}"]);
    }

    #[test]
    fn test_code_after_top_level_comment_is_not_shifted() {
        let mut f = fixture_with(
            &["/* doc", "*/", "int f();", "int h();"],
            Rc::new(CStyleMode::new()),
            IndentConfig::default(),
            4,
        );
        f.engine.reindent_all().unwrap();
        assert_eq!(lines(&f.engine), vec!["/* doc", " */", "int f();", "int h();"]);
    }

    #[test]
    fn test_code_after_comment_inside_block_keeps_block_indent() {
        let mut f = fixture_with(
            &[
                "/* doc",
                "*/",
                "int f();",
                "int g() {",
                "/* x",
                "*/",
                "y();",
                "}",
            ],
            Rc::new(CStyleMode::new()),
            IndentConfig::default(),
            4,
        );
        f.engine.reindent_all().unwrap();
        let expected = vec![
            "/* doc",
            " */",
            "int f();",
            "int g() {",
            "    /* x",
            "     */",
            "    y();",
            "}",
        ];
        assert_eq!(lines(&f.engine), expected);

        let report = f.engine.reindent_all().unwrap();
        assert_eq!(report.rows_changed, 0);
        assert_eq!(lines(&f.engine), expected);
    }

    #[test]
    fn test_trailing_comment_does_not_align() {
        let mut f = fixture_with(
            &["{", "a(); /* note", "more */", "b();", "}"],
            Rc::new(CStyleMode::new()),
            IndentConfig::default(),
            4,
        );
        f.engine.reindent_all().unwrap();
        assert_eq!(
            lines(&f.engine),
            vec!["{", "    a(); /* note", "    more */", "    b();", "}"]
        );
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Cursor preservation
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_cursor_restored_when_nothing_changes() {
        let mut f = fixture(&["if (x) {", "  foo();", "}"], Rc::new(CStyleMode::new()));
        let cursor = CursorPosition::new(1, 5);
        f.engine.session_mut().set_cursor_position(cursor);

        f.engine.reindent_all().unwrap();
        assert_eq!(f.engine.session().cursor_position(), cursor);
    }

    #[test]
    fn test_cursor_row_kept_when_indent_shrinks() {
        let mut f = fixture(&["a;", "        b;"], Rc::new(CStyleMode::new()));
        let cursor = CursorPosition::new(1, 10);
        f.engine.session_mut().set_cursor_position(cursor);

        f.engine.reindent_all().unwrap();
        assert_eq!(f.engine.session().line(1).unwrap(), "b;");
        // Past end of line now; the widget clamps it.
        assert_eq!(f.engine.session().cursor_position(), cursor);
    }

    #[test]
    fn test_selection_cleared_after_pass() {
        let mut f = fixture(&["a;", "b;"], Rc::new(CStyleMode::new()));
        f.engine.session_mut().set_selection(Some(Selection {
            anchor: CursorPosition::new(0, 0),
            head: CursorPosition::new(1, 1),
        }));
        f.engine.reindent_all().unwrap();
        assert!(f.engine.session().selection().is_none());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Failure handling
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_failure_aborts_remaining_rows() {
        let mut f = fixture(&["a", "b", "BOOM", "c", "d"], Rc::new(FailingMode));
        let result = f.engine.reindent_all();

        assert!(matches!(result, Err(Error::IndentComputation { .. })));
        // Rows before the failure were processed, rows after it were not.
        assert_eq!(lines(&f.engine), vec!["a", "  b", "  BOOM", "c", "d"]);
    }

    #[test]
    fn test_failure_releases_guard_and_restores_cursor() {
        let mut f = fixture(&["BOOM", "x"], Rc::new(FailingMode));
        let cursor = CursorPosition::new(1, 1);
        f.engine.session_mut().set_cursor_position(cursor);
        f.engine.session_mut().set_selection(Some(Selection {
            anchor: CursorPosition::new(0, 0),
            head: cursor,
        }));

        assert!(f.engine.reindent_all().is_err());
        assert_eq!(f.engine.scheduler().phase(), SchedulerPhase::Idle);
        assert_eq!(f.engine.session().cursor_position(), cursor);
        assert!(f.engine.session().selection().is_none());

        // The scheduler still reacts to edits.
        type_text(&mut f.engine, 1, "y");
        assert_eq!(f.engine.scheduler().phase(), SchedulerPhase::Scheduled);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scheduling & reentrancy
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_pass_does_not_schedule_itself() {
        let mut f = fixture(&["a;", "b;", "c;", "d;"], Rc::new(CStyleMode::new()));
        f.engine.reindent_all().unwrap();

        // Every row but the first is rewritten (remove + insert), even
        // though none of them change.
        assert_eq!(f.events.get(), 6);
        assert_eq!(f.engine.scheduler().suppressed_notifications(), 6);
        assert_eq!(f.engine.scheduler().phase(), SchedulerPhase::Idle);

        f.clock.advance(Duration::from_secs(10));
        assert!(f.engine.poll().is_none());
    }

    #[test]
    fn test_debounce_coalesces_edits_into_one_pass() {
        let mut f = fixture(&["{", "a", "}"], Rc::new(CStyleMode::new()));

        for i in 0..5 {
            type_text(&mut f.engine, 1, &format!("a{}", i));
            f.clock.advance(Duration::from_millis(100));
            assert!(f.engine.poll().is_none());
        }

        // 100ms already elapsed since the last edit.
        f.clock.advance(Duration::from_millis(399));
        assert!(f.engine.poll().is_none());

        f.clock.advance(Duration::from_millis(1));
        let report = f.engine.poll();
        assert!(matches!(report, Some(Ok(_))));
        assert_eq!(f.engine.session().line(1).unwrap(), "  a4");

        f.clock.advance(Duration::from_secs(10));
        assert!(f.engine.poll().is_none());
    }

    #[test]
    fn test_disabled_background_indent_never_runs() {
        let mut f = fixture_with(
            &["{", "a", "}"],
            Rc::new(CStyleMode::new()),
            IndentConfig {
                background_auto_indent: false,
                ..IndentConfig::default()
            },
            2,
        );

        for i in 0..20 {
            type_text(&mut f.engine, 1, &format!("b{}", i));
        }
        f.clock.advance(Duration::from_secs(3600));

        assert!(f.engine.poll().is_none());
        assert_eq!(f.engine.scheduler().phase(), SchedulerPhase::Idle);
        assert_eq!(f.engine.session().line(1).unwrap(), "b19");
    }

    #[test]
    fn test_reindent_now_bypasses_and_cancels_debounce() {
        let mut f = fixture(&["{", "a", "}"], Rc::new(CStyleMode::new()));
        type_text(&mut f.engine, 1, "x;");
        assert_eq!(f.engine.scheduler().phase(), SchedulerPhase::Scheduled);

        f.engine.reindent_now().unwrap();
        assert_eq!(f.engine.session().line(1).unwrap(), "  x;");
        assert_eq!(f.engine.scheduler().phase(), SchedulerPhase::Idle);

        f.clock.advance(Duration::from_secs(1));
        assert!(f.engine.poll().is_none());
    }

    #[test]
    fn test_configure_updates_scheduler() {
        let f = fixture(&["a"], Rc::new(CStyleMode::new()));
        f.engine.configure(IndentConfig {
            background_auto_indent: false,
            quiet_period: Duration::from_millis(250),
        });
        assert!(!f.engine.scheduler().is_enabled());
        assert_eq!(
            f.engine.scheduler().quiet_period(),
            Duration::from_millis(250)
        );
    }

    #[test]
    fn test_set_mode_updates_session() {
        let mut f = fixture(&["{", "x"], Rc::new(CStyleMode::new()));
        f.engine.set_mode(Rc::new(TabLevelMode));
        assert_eq!(f.engine.mode().name(), "tab_level");
        assert_eq!(f.engine.session().mode().name(), "tab_level");
    }
}
