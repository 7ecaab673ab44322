// Browser tests; run with `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]

use grub_trainer::quiz::{quiz_summary_json, start_round, toggle_detailed_breakdown};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::{Document, HtmlElement, HtmlInputElement, KeyboardEvent, KeyboardEventInit, window};

wasm_bindgen_test_configure!(run_in_browser);

const MARKUP: &str = r#"
<div id="mode-screen" class="screen"><button id="practice-btn"></button><button id="steel-grub-btn"></button>
<input type="checkbox" id="mute-checkbox" checked></div>
<div id="game-screen" class="screen"><div id="timer-display"></div><div id="progress-bar"></div>
<div id="problem-display"></div><input id="answer-input"></div>
<div id="results-screen" class="screen"><div id="results-content"></div></div>
"#;

// Next problem shows after 300 ms, results 800 ms after the last answer and
// 2 s after a Steel-Grub miss; waits leave some slack on top.
const NEXT_WAIT_MS: i32 = 400;
const FINISH_WAIT_MS: i32 = 1_000;
const FAIL_WAIT_MS: i32 = 2_300;

fn document() -> Document {
    window().unwrap().document().unwrap()
}

fn mount_page() {
    document().body().unwrap().set_inner_html(MARKUP);
    grub_trainer::start_game_with_config(
        r#"{"total_problems": 4, "milestones": {"checkpoint1": 1, "checkpoint2": 2, "checkpoint3": 3, "final": 4}}"#,
    )
    .unwrap();
}

fn by_id<T: JsCast>(id: &str) -> T {
    document().get_element_by_id(id).unwrap().dyn_into().unwrap()
}

fn has_class(id: &str, class: &str) -> bool {
    document().get_element_by_id(id).unwrap().class_list().contains(class)
}

async fn sleep(ms: i32) {
    let promise = js_sys::Promise::new(&mut |resolve, _| {
        window()
            .unwrap()
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
            .unwrap();
    });
    JsFuture::from(promise).await.unwrap();
}

/// Answer to the problem on screen, read back from its "a op b" text.
fn shown_answer() -> i64 {
    let text = document().get_element_by_id("problem-display").unwrap().text_content().unwrap();
    let parts: Vec<&str> = text.split_whitespace().collect();
    let (a, b): (i64, i64) = (parts[0].parse().unwrap(), parts[2].parse().unwrap());
    match parts[1] {
        "+" => a + b,
        "-" => a - b,
        "×" => a * b,
        "÷" => a / b,
        other => panic!("unexpected operator {other}"),
    }
}

/// Type `value` and press Enter the way a player would.
fn type_answer(value: &str) {
    let input: HtmlInputElement = by_id("answer-input");
    input.set_value(value);
    let init = KeyboardEventInit::new();
    init.set_key("Enter");
    let event = KeyboardEvent::new_with_keyboard_event_init_dict("keydown", &init).unwrap();
    input.dispatch_event(&event).unwrap();
}

fn click(id: &str) {
    by_id::<HtmlElement>(id).click();
}

#[wasm_bindgen_test]
fn mount_shows_mode_screen() {
    mount_page();
    assert!(has_class("mode-screen", "active"));
    assert!(!has_class("game-screen", "active"));
    assert!(quiz_summary_json().is_none());
}

#[wasm_bindgen_test]
fn starting_a_round_builds_progress_and_shows_problem() {
    mount_page();
    start_round("practice").unwrap();
    assert!(has_class("game-screen", "active"));
    let bar = document().get_element_by_id("progress-bar").unwrap();
    assert_eq!(bar.child_element_count(), 4);
    let problem = document().get_element_by_id("problem-display").unwrap();
    assert!(!problem.text_content().unwrap_or_default().is_empty());
    assert_eq!(by_id::<HtmlInputElement>("answer-input").value(), "");
}

#[wasm_bindgen_test]
fn unknown_mode_is_an_error() {
    mount_page();
    assert!(start_round("zen").is_err());
}

#[wasm_bindgen_test]
fn bad_config_is_rejected() {
    document().body().unwrap().set_inner_html(MARKUP);
    assert!(grub_trainer::start_game_with_config(r#"{"total_problems": 0}"#).is_err());
}

#[wasm_bindgen_test]
fn non_numeric_answer_is_ignored() {
    mount_page();
    start_round("practice").unwrap();
    type_answer("abc");
    assert!(!has_class("circle-0", "correct"));
    assert!(!has_class("circle-0", "incorrect"));
}

#[wasm_bindgen_test]
async fn practice_round_plays_through_to_results() {
    mount_page();
    click("practice-btn");
    assert!(has_class("game-screen", "active"));

    let wrong = shown_answer() + 1;
    type_answer(&wrong.to_string());
    assert!(has_class("circle-0", "incorrect"));
    assert!(has_class("answer-input", "incorrect-flash"));
    sleep(NEXT_WAIT_MS).await;

    for i in 1..4 {
        type_answer(&shown_answer().to_string());
        assert!(has_class(&format!("circle-{i}"), "correct"));
        // Practice never awards grub icons.
        assert!(!has_class(&format!("circle-{i}"), "has-icon"));
        sleep(NEXT_WAIT_MS).await;
    }
    sleep(FINISH_WAIT_MS).await;

    assert!(has_class("results-screen", "active"));
    let json = quiz_summary_json().unwrap();
    assert!(json.contains("\"practice\""));
    assert!(json.contains("\"problems_completed\":4"));

    let breakdown: HtmlElement = by_id("detailed-breakdown");
    assert_eq!(breakdown.style().get_property_value("display").unwrap(), "none");
    click("breakdown-toggle");
    assert_eq!(breakdown.style().get_property_value("display").unwrap(), "block");
    toggle_detailed_breakdown().unwrap();
    assert_eq!(breakdown.style().get_property_value("display").unwrap(), "none");

    click("play-again");
    assert!(has_class("mode-screen", "active"));
    assert!(!has_class("results-screen", "active"));
}

#[wasm_bindgen_test]
async fn steel_grub_miss_shatters_and_ends_round() {
    mount_page();
    start_round("steel-grub").unwrap();

    type_answer(&shown_answer().to_string());
    assert!(has_class("circle-0", "has-icon"));
    sleep(NEXT_WAIT_MS).await;

    type_answer(&(shown_answer() + 1).to_string());
    assert!(has_class("answer-input", "incorrect-flash"));
    assert!(!has_class("circle-1", "correct") && !has_class("circle-1", "incorrect"));
    // Further input is refused once the round has failed.
    type_answer("1");
    assert!(!has_class("circle-2", "correct") && !has_class("circle-2", "incorrect"));

    sleep(FAIL_WAIT_MS).await;
    assert!(has_class("circle-3", "shatter"));
    assert!(has_class("results-screen", "active"));
    let json = quiz_summary_json().unwrap();
    assert!(json.contains("\"steel-grub\""));
    assert!(json.contains("\"grub_trapped\""));
}

#[wasm_bindgen_test]
async fn finished_round_does_not_end_the_next_one() {
    mount_page();
    start_round("practice").unwrap();
    for _ in 0..4 {
        type_answer(&shown_answer().to_string());
        sleep(NEXT_WAIT_MS).await;
    }
    // The previous round's results are still pending when a new round starts.
    start_round("practice").unwrap();
    sleep(FINISH_WAIT_MS).await;

    assert!(has_class("game-screen", "active"));
    assert!(!has_class("results-screen", "active"));
    assert!(quiz_summary_json().is_none());
    assert!(!has_class("circle-0", "correct"));
}

#[wasm_bindgen_test]
async fn remount_drops_pending_failure() {
    mount_page();
    start_round("steel-grub").unwrap();
    type_answer(&(shown_answer() + 1).to_string());
    mount_page();
    sleep(FAIL_WAIT_MS).await;

    assert!(has_class("mode-screen", "active"));
    assert!(!has_class("results-screen", "active"));
    assert!(quiz_summary_json().is_none());
}
