//! Browser front end for the quiz.
//!
//! Game rules live in the pure submodules (`problem`, `session`, `results`,
//! `sound`) so they can be exercised natively. This file owns the page: it looks
//! up the static markup by id, wires listeners, drives the round timer and the
//! short feedback delays, and swaps between the mode, game and results screens.
//!
//! Expected markup ids: `mode-screen`, `game-screen`, `results-screen`,
//! `practice-btn`, `steel-grub-btn`, `mute-checkbox`, `progress-bar`,
//! `problem-display`, `answer-input`, `results-content`, `timer-display`.
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, Window, window};

pub mod config;
pub mod problem;
pub mod results;
pub mod session;
pub mod sound;

use crate::error::{QuizError, Result};
use config::QuizConfig;
use results::{QuizSummary, render_results};
use session::{Advance, Mode, ProgressMarker, Session};
use sound::{SoundBank, SoundCue};

// Feedback pacing (ms).
const CLOCK_TICK_MS: i32 = 100;
const NEXT_PROBLEM_DELAY_MS: i32 = 300;
const FLASH_MS: i32 = 500;
const SHATTER_DELAY_MS: i32 = 500;
const SHATTER_STAGGER_MS: i32 = 20;
const SHATTER_TO_RESULTS_MS: i32 = 1500;
const FINISH_DELAY_MS: i32 = 800;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Screen {
    Mode,
    Game,
    Results,
}

/// Handles to the static page elements.
struct Dom {
    doc: Document,
    mode_screen: Element,
    game_screen: Element,
    results_screen: Element,
    progress_bar: Element,
    problem_display: Element,
    answer_input: HtmlInputElement,
    results_content: Element,
    timer_display: Element,
    mute_checkbox: HtmlInputElement,
}

fn element(doc: &Document, id: &str) -> Result<Element> {
    doc.get_element_by_id(id)
        .ok_or_else(|| QuizError::MissingElement(id.to_string()))
}

fn typed<T: JsCast>(doc: &Document, id: &str) -> Result<T> {
    element(doc, id)?
        .dyn_into::<T>()
        .map_err(|_| QuizError::Dom(format!("#{id} has the wrong element type")))
}

fn browser_window() -> Result<Window> {
    window().ok_or_else(|| QuizError::Dom("no window".into()))
}

fn now_ms() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

impl Dom {
    fn lookup(doc: Document) -> Result<Self> {
        Ok(Self {
            mode_screen: element(&doc, "mode-screen")?,
            game_screen: element(&doc, "game-screen")?,
            results_screen: element(&doc, "results-screen")?,
            progress_bar: element(&doc, "progress-bar")?,
            problem_display: element(&doc, "problem-display")?,
            answer_input: typed(&doc, "answer-input")?,
            results_content: element(&doc, "results-content")?,
            timer_display: element(&doc, "timer-display")?,
            mute_checkbox: typed(&doc, "mute-checkbox")?,
            doc,
        })
    }

    fn show(&self, screen: Screen) -> Result<()> {
        for el in [&self.mode_screen, &self.game_screen, &self.results_screen] {
            el.class_list().remove_1("active")?;
        }
        let target = match screen {
            Screen::Mode => &self.mode_screen,
            Screen::Game => &self.game_screen,
            Screen::Results => &self.results_screen,
        };
        target.class_list().add_1("active")?;
        Ok(())
    }

    fn build_progress_bar(&self, total: usize) -> Result<()> {
        self.progress_bar.set_inner_html("");
        for i in 0..total {
            let circle = self.doc.create_element("div")?;
            circle.set_class_name("progress-circle");
            circle.set_id(&format!("circle-{i}"));
            self.progress_bar.append_child(&circle)?;
        }
        Ok(())
    }

    fn circle(&self, index: usize) -> Option<Element> {
        self.doc.get_element_by_id(&format!("circle-{index}"))
    }

    fn mark_progress(&self, index: usize, marker: ProgressMarker) -> Result<()> {
        let circle = self
            .circle(index)
            .ok_or_else(|| QuizError::MissingElement(format!("circle-{index}")))?;
        match marker {
            ProgressMarker::Correct => circle.class_list().add_1("correct")?,
            ProgressMarker::Incorrect => circle.class_list().add_1("incorrect")?,
            ProgressMarker::Icon(src) => {
                let img = self.doc.create_element("img")?;
                img.set_attribute("src", src)?;
                circle.append_child(&img)?;
                circle.class_list().add_2("correct", "has-icon")?;
            }
            ProgressMarker::Unmarked => {}
        }
        Ok(())
    }

    fn display_problem(&self, session: &Session) {
        if let Some(problem) = session.current_problem() {
            self.problem_display.set_text_content(Some(&problem.question()));
        }
        self.answer_input.set_value("");
    }

    fn flash_input(&self, correct: bool) {
        let class = if correct { "correct-flash" } else { "incorrect-flash" };
        let _ = self.answer_input.class_list().add_1(class);
        let input = self.answer_input.clone();
        after(FLASH_MS, move || {
            let _ = input.class_list().remove_2("correct-flash", "incorrect-flash");
        });
    }

    fn focus_input(&self) {
        let _ = self.answer_input.focus();
    }
}

/// Running `setInterval`; cleared when dropped.
struct Interval {
    handle: i32,
    _callback: Closure<dyn FnMut()>,
}

impl Drop for Interval {
    fn drop(&mut self) {
        if let Some(w) = window() {
            w.clear_interval_with_handle(self.handle);
        }
    }
}

/// Run `f` once after `ms` milliseconds.
fn after(ms: i32, f: impl FnOnce() + 'static) {
    let callback = Closure::once_into_js(f);
    let scheduled = browser_window().and_then(|w| {
        w.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), ms)
            .map_err(QuizError::from)
    });
    if let Err(err) = scheduled {
        log::error!("failed to schedule callback: {err}");
    }
}

struct QuizApp {
    dom: Dom,
    config: QuizConfig,
    sounds: SoundBank,
    muted: bool,
    session: Option<Session>,
    last_summary: Option<QuizSummary>,
    timer: Option<Interval>,
    /// Bumped per round and per mount; delayed callbacks from older rounds are dropped.
    round: u64,
}

thread_local! {
    static QUIZ_APP: std::cell::RefCell<Option<QuizApp>> = const { std::cell::RefCell::new(None) };
}

/// Borrow the mounted app. Returns `None` if not mounted or already borrowed.
fn with_app<R>(f: impl FnOnce(&mut QuizApp) -> R) -> Option<R> {
    QUIZ_APP.with(|cell| match cell.try_borrow_mut() {
        Ok(mut guard) => guard.as_mut().map(f),
        Err(_) => {
            log::warn!("quiz state already borrowed; dropping event");
            None
        }
    })
}

/// Like [`after`], but only runs `f` if round `round` is still the current one.
fn after_in_round(ms: i32, round: u64, f: impl FnOnce(&mut QuizApp) + 'static) {
    after(ms, move || {
        with_app(|app| {
            if app.round == round {
                f(app);
            } else {
                log::debug!("dropping callback from round {round}; now on {}", app.round);
            }
        });
    });
}

impl QuizApp {
    fn begin(&mut self, mode: Mode) -> Result<()> {
        let session = Session::start(mode, &self.config, &mut rand::thread_rng(), now_ms())?;
        self.round += 1;
        self.dom.build_progress_bar(session.total_problems())?;
        self.dom.display_problem(&session);
        self.session = Some(session);
        self.last_summary = None;
        self.start_clock()?;
        self.dom.show(Screen::Game)?;
        self.dom.focus_input();
        Ok(())
    }

    fn start_clock(&mut self) -> Result<()> {
        self.timer = None;
        let callback = Closure::wrap(Box::new(|| {
            with_app(QuizApp::tick_clock);
        }) as Box<dyn FnMut()>);
        let handle = browser_window()?
            .set_interval_with_callback_and_timeout_and_arguments_0(callback.as_ref().unchecked_ref(), CLOCK_TICK_MS)?;
        self.timer = Some(Interval { handle, _callback: callback });
        self.tick_clock();
        Ok(())
    }

    fn tick_clock(&mut self) {
        if let Some(session) = &self.session {
            let text = results::format_clock(session.elapsed_ms(now_ms()));
            self.dom.timer_display.set_text_content(Some(&text));
        }
    }

    fn submit_answer(&mut self) {
        let raw = self.dom.answer_input.value();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let verdict = match session.submit(&raw, now_ms()) {
            Ok(v) => v,
            Err(err) => {
                log::debug!("answer ignored: {err}");
                return;
            }
        };
        if let Err(err) = self.dom.mark_progress(verdict.index, verdict.marker) {
            log::warn!("progress bar not updated: {err}");
        }
        self.sounds.play(verdict.cue, self.muted);
        self.dom.flash_input(verdict.correct);

        let round = self.round;
        match verdict.advance {
            Advance::Failed => after_in_round(SHATTER_DELAY_MS, round, move |app| {
                app.shatter();
                after_in_round(SHATTER_TO_RESULTS_MS, round, QuizApp::end_round);
            }),
            Advance::Completed => after_in_round(FINISH_DELAY_MS, round, QuizApp::end_round),
            Advance::Next(_) => after_in_round(NEXT_PROBLEM_DELAY_MS, round, |app| {
                if let Some(session) = &app.session {
                    app.dom.display_problem(session);
                }
            }),
        }
        self.dom.focus_input();
    }

    fn shatter(&mut self) {
        self.sounds.play(SoundCue::Shatter, self.muted);
        let total = self.session.as_ref().map_or(0, Session::total_problems);
        for i in 0..total {
            after_in_round(i as i32 * SHATTER_STAGGER_MS, self.round, move |app| {
                if let Some(circle) = app.dom.circle(i) {
                    let _ = circle.class_list().add_1("shatter");
                }
            });
        }
    }

    fn end_round(&mut self) {
        self.timer = None;
        let Some(session) = &self.session else {
            return;
        };
        let summary = session.summary(now_ms());
        self.dom
            .results_content
            .set_inner_html(&render_results(&summary, &session.breakdown()));
        log::info!(
            "round over: {:?}, {}/{} completed",
            summary.outcome, summary.problems_completed, summary.total_problems
        );
        self.last_summary = Some(summary);
        if let Err(err) = self.dom.show(Screen::Results) {
            log::error!("could not show results: {err}");
        }
    }

    fn play_again(&mut self) {
        self.timer = None;
        self.session = None;
        self.round += 1;
        if let Err(err) = self.dom.show(Screen::Mode) {
            log::error!("could not show mode screen: {err}");
        }
    }

    fn toggle_breakdown(&self) -> Result<()> {
        let breakdown: HtmlElement = typed(&self.dom.doc, "detailed-breakdown")?;
        let style = breakdown.style();
        let next = if style.get_property_value("display")? == "none" { "block" } else { "none" };
        style.set_property("display", next)?;
        Ok(())
    }

    fn on_results_click(&mut self, target_id: &str) {
        match target_id {
            "breakdown-toggle" => {
                if let Err(err) = self.toggle_breakdown() {
                    log::warn!("breakdown toggle failed: {err}");
                }
            }
            "play-again" => self.play_again(),
            _ => {}
        }
    }
}

fn listen(
    target: &Element,
    event: &str,
    handler: impl FnMut(web_sys::Event) + 'static,
) -> Result<()> {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web_sys::Event)>);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn bind_listeners(doc: &Document) -> Result<()> {
    let start = |mode: Mode| {
        move |_: web_sys::Event| {
            if let Some(Err(err)) = with_app(|app| app.begin(mode)) {
                log::error!("could not start {mode:?} round: {err}");
            }
        }
    };
    listen(&element(doc, "practice-btn")?, "click", start(Mode::Practice))?;
    listen(&element(doc, "steel-grub-btn")?, "click", start(Mode::SteelGrub))?;

    listen(&element(doc, "mute-checkbox")?, "change", |_: web_sys::Event| {
        with_app(|app| {
            app.muted = app.dom.mute_checkbox.checked();
            log::debug!("muted: {}", app.muted);
        });
    })?;

    listen(&element(doc, "answer-input")?, "keydown", |evt: web_sys::Event| {
        let enter = evt
            .dyn_ref::<web_sys::KeyboardEvent>()
            .is_some_and(|k| k.key() == "Enter");
        if enter {
            with_app(QuizApp::submit_answer);
        }
    })?;

    // Results markup is rebuilt every round; delegate from its container.
    listen(&element(doc, "results-content")?, "click", |evt: web_sys::Event| {
        let id = evt
            .target()
            .and_then(|t| t.dyn_into::<Element>().ok())
            .map(|el| el.id())
            .unwrap_or_default();
        with_app(|app| app.on_results_click(&id));
    })?;
    Ok(())
}

// Set on the practice button once listeners are attached to this markup.
const BOUND_ATTR: &str = "data-quiz-bound";

/// Attach the quiz to the current page. Mounting again swaps in the new config,
/// drops any round in progress and returns to the mode screen; listeners are
/// only bound once per set of elements.
pub fn mount(config: QuizConfig) -> Result<()> {
    config.validate()?;
    log::set_max_level(config.log_filter()?);

    let doc = browser_window()?
        .document()
        .ok_or_else(|| QuizError::Dom("no document".into()))?;
    let dom = Dom::lookup(doc.clone())?;
    let practice = element(&doc, "practice-btn")?;
    if !practice.has_attribute(BOUND_ATTR) {
        bind_listeners(&doc)?;
        practice.set_attribute(BOUND_ATTR, "")?;
    }
    dom.show(Screen::Mode)?;

    let muted = dom.mute_checkbox.checked();
    let round = with_app(|app| app.round + 1).unwrap_or(0);
    let app = QuizApp {
        dom,
        sounds: SoundBank::new(config.volume),
        config,
        muted,
        session: None,
        last_summary: None,
        timer: None,
        round,
    };
    // Dropping the previous app clears its interval.
    let previous = QUIZ_APP.with(|cell| cell.replace(Some(app)));
    log::info!("grub trainer mounted (remount: {})", previous.is_some());
    Ok(())
}

fn begin_round(mode: &str) -> Result<()> {
    let mode: Mode = mode.parse()?;
    with_app(|app| app.begin(mode)).unwrap_or(Err(QuizError::NotMounted))
}

fn toggle_mounted_breakdown() -> Result<()> {
    with_app(|app| app.toggle_breakdown()).unwrap_or(Err(QuizError::NotMounted))
}

/// Start a round in `mode` (`"practice"` or `"steel-grub"`) on a mounted quiz.
#[wasm_bindgen]
pub fn start_round(mode: &str) -> Result<(), JsValue> {
    begin_round(mode)?;
    Ok(())
}

#[wasm_bindgen]
pub fn toggle_detailed_breakdown() -> Result<(), JsValue> {
    toggle_mounted_breakdown()?;
    Ok(())
}

/// Summary of the last finished round as JSON, or `undefined`.
#[wasm_bindgen]
pub fn quiz_summary_json() -> Option<String> {
    with_app(|app| app.last_summary.as_ref().map(serde_json::to_string))
        .flatten()
        .and_then(|json| json.map_err(|err| log::error!("summary not serializable: {err}")).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Nothing is mounted on the host, so these never reach the DOM.
    #[test]
    fn test_start_round_requires_mount() {
        assert!(matches!(begin_round("practice"), Err(QuizError::NotMounted)));
        assert!(matches!(begin_round("steel-grub"), Err(QuizError::NotMounted)));
    }

    #[test]
    fn test_start_round_rejects_unknown_mode_first() {
        assert!(matches!(begin_round("zen"), Err(QuizError::UnknownMode(_))));
    }

    #[test]
    fn test_toggle_requires_mount() {
        assert!(matches!(toggle_mounted_breakdown(), Err(QuizError::NotMounted)));
        assert!(quiz_summary_json().is_none());
    }
}
